//! Dispatcher lifecycle: idle timeout, explicit close, and what happens
//! to work already in flight.
//!
//! All timing runs on the paused test clock, so a "5 second" timeout
//! costs no wall time and the check-period bounds are exact.

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering::Relaxed;
    use std::sync::Arc;
    use std::time::Duration;

    use relay_bus::{DeliveryOptions, InMemoryBus, MessageBus};
    use relay_proxy::{Dispatcher, DispatcherConfig, ProxyError, NEVER_EXPIRE};
    use tokio::runtime::Handle;
    use tokio::time::sleep;

    use crate::init_tracing;
    use crate::integration::calculator::{Calculator, CalculatorClient, CalculatorDispatch};

    const ADDRESS: &str = "svc.calculator";

    fn bind(bus: &Arc<InMemoryBus>, config: DispatcherConfig) -> (Dispatcher, Arc<Calculator>) {
        let service = Arc::new(Calculator::default());
        let adapter = Arc::new(CalculatorDispatch::new(Arc::clone(&service)));
        let dispatcher = Dispatcher::bind(
            bus.as_ref(),
            &Handle::current(),
            ADDRESS,
            adapter,
            config,
        )
        .expect("bind fixture dispatcher");
        (dispatcher, service)
    }

    fn client(bus: &Arc<InMemoryBus>) -> CalculatorClient {
        CalculatorClient::new(
            Arc::clone(bus) as Arc<dyn MessageBus>,
            ADDRESS,
            DeliveryOptions::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_dispatcher_closes_within_one_check_period() {
        init_tracing();
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = bind(&bus, DispatcherConfig::transient(5));

        // Not yet idle past the timeout.
        sleep(Duration::from_secs(4)).await;
        assert!(!dispatcher.is_closed());

        // Timeout passes at t=5s; the 2.5s checker must catch it by t=7.5s.
        sleep(Duration::from_secs(4)).await;
        assert!(dispatcher.is_closed());

        dispatcher.join().await;
        assert_eq!(bus.consumer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_traffic_keeps_dispatcher_alive() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = bind(&bus, DispatcherConfig::transient(5));
        let stub = client(&bus);

        // Messages every 3s stay under the 5s timeout.
        for i in 0..4 {
            sleep(Duration::from_secs(3)).await;
            assert_eq!(stub.add(i, 1).await.unwrap(), i + 1);
        }
        assert!(!dispatcher.is_closed());

        // Traffic stops; the idle close follows.
        sleep(Duration::from_secs(10)).await;
        assert!(dispatcher.is_closed());

        dispatcher.join().await;
        let err = stub.add(1, 1).await.unwrap_err();
        assert!(matches!(err, ProxyError::Delivery(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_level_dispatcher_never_auto_closes() {
        let bus = Arc::new(InMemoryBus::new());
        let config = DispatcherConfig {
            timeout_seconds: 5,
            top_level: true,
        };
        let (dispatcher, _service) = bind(&bus, config);
        assert!(!dispatcher.has_idle_timer());

        sleep(Duration::from_secs(3600)).await;
        assert!(!dispatcher.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_expire_timeout_never_auto_closes() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = bind(&bus, DispatcherConfig::transient(NEVER_EXPIRE));
        assert!(!dispatcher.has_idle_timer());

        sleep(Duration::from_secs(3600)).await;
        assert!(!dispatcher.is_closed());
    }

    #[tokio::test]
    async fn test_explicit_close_unregisters() {
        init_tracing();
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = bind(&bus, DispatcherConfig::default());
        let stub = client(&bus);

        assert_eq!(stub.add(2, 3).await.unwrap(), 5);

        dispatcher.close();
        dispatcher.join().await;

        let err = stub.add(2, 3).await.unwrap_err();
        assert!(matches!(err, ProxyError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_in_flight_invocation_survives_close() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, service) = bind(&bus, DispatcherConfig::default());
        let stub = Arc::new(client(&bus));

        let call = tokio::spawn({
            let stub = Arc::clone(&stub);
            async move { stub.slow_add(10, 20).await }
        });

        // Wait until the invocation is parked inside the service.
        while dispatcher.stats().invocations_dispatched.load(Relaxed) < 1 {
            tokio::task::yield_now().await;
        }

        // Closing cancels the registration, not the invocation.
        dispatcher.close();
        dispatcher.join().await;

        service.gate.add_permits(1);
        assert_eq!(call.await.unwrap().unwrap(), 30);
    }
}
