//! Full request/reply exchanges over the in-memory bus.
//!
//! Each test wires the fixture pair the way production wiring would:
//! a dispatcher bound to `svc.calculator`, a client stub pointed at it.

#[cfg(test)]
use std::sync::atomic::Ordering::Relaxed;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use relay_bus::{DeliveryOptions, InMemoryBus, MessageBus};
#[cfg(test)]
use relay_proxy::{Dispatcher, DispatcherConfig, ProxyError, ACTION_HEADER};
#[cfg(test)]
use relay_wire::{encode_i32, Body, ReplyEnvelope, ServiceFault, WireValue};
#[cfg(test)]
use tokio::runtime::Handle;

#[cfg(test)]
use super::calculator::{Calculator, CalculatorClient, CalculatorDispatch};

#[cfg(test)]
const ADDRESS: &str = "svc.calculator";

/// Bind the fixture service and return the handles the tests poke at.
#[cfg(test)]
fn start_calculator(bus: &Arc<InMemoryBus>) -> (Dispatcher, Arc<Calculator>) {
    let service = Arc::new(Calculator::default());
    let adapter = Arc::new(CalculatorDispatch::new(Arc::clone(&service)));
    let dispatcher = Dispatcher::bind(
        bus.as_ref(),
        &Handle::current(),
        ADDRESS,
        adapter,
        DispatcherConfig::default(),
    )
    .expect("bind fixture dispatcher");
    (dispatcher, service)
}

#[cfg(test)]
fn client(bus: &Arc<InMemoryBus>) -> CalculatorClient {
    let bus: Arc<dyn MessageBus> = Arc::clone(bus) as Arc<dyn MessageBus>;
    CalculatorClient::new(bus, ADDRESS, DeliveryOptions::new())
}

/// Send a raw request, bypassing the stub, with full control of headers.
#[cfg(test)]
async fn raw_request(
    bus: &Arc<InMemoryBus>,
    options: DeliveryOptions,
    body: Body,
) -> ReplyEnvelope {
    bus.request(ADDRESS, WireValue::Object(body), options)
        .await
        .expect("delivery succeeds")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_round_trip() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, _service) = start_calculator(&bus);

        let sum = client(&bus).add(2, 3).await.unwrap();
        assert_eq!(sum, 5);

        // Exactly one request, exactly one reply.
        assert_eq!(bus.stats().requests_sent.load(Relaxed), 1);
        assert_eq!(bus.stats().replies_received.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_string_round_trip() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, _service) = start_calculator(&bus);

        let echoed = client(&bus).echo("hello".to_owned()).await.unwrap();
        assert_eq!(echoed, "hello");
    }

    #[tokio::test]
    async fn test_command_round_trip_preserves_in_range_values() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, service) = start_calculator(&bus);

        let accepted = client(&bus).command(1, -5, 300).await.unwrap();
        assert!(accepted);
        assert_eq!(service.commands.lock().clone(), vec![(1, -5, 300)]);
    }

    #[tokio::test]
    async fn test_out_of_range_wire_integer_narrows_silently() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, service) = start_calculator(&bus);

        // A hand-built request can put any i32 where the service expects a
        // byte or short; the dispatcher narrows instead of erroring.
        let mut body = Body::new();
        body.insert("device_id".to_owned(), encode_i32(7));
        body.insert("cmd".to_owned(), encode_i32(200));
        body.insert("amount".to_owned(), encode_i32(40_000));

        let options = DeliveryOptions::new().with_header(ACTION_HEADER, "command");
        let reply = raw_request(&bus, options, body).await;
        assert!(reply.is_success());

        let recorded = service.commands.lock().clone();
        assert_eq!(recorded, vec![(7, -56, -25_536)]);
    }

    #[tokio::test]
    async fn test_remote_failure_reaches_caller() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, _service) = start_calculator(&bus);

        let err = client(&bus).fail("boom".to_owned()).await.unwrap_err();
        assert_eq!(err, ProxyError::Remote(ServiceFault::new(500, "boom")));
    }

    #[tokio::test]
    async fn test_unknown_action_yields_invalid_action_fault() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = start_calculator(&bus);

        let options = DeliveryOptions::new().with_header(ACTION_HEADER, "foo");
        let reply = raw_request(&bus, options, Body::new()).await;
        assert_eq!(
            reply,
            ReplyEnvelope::Failure(ServiceFault::new(500, "Invalid action: foo"))
        );

        assert_eq!(dispatcher.stats().protocol_faults.load(Relaxed), 1);
        assert_eq!(dispatcher.stats().invocations_dispatched.load(Relaxed), 0);
    }

    #[tokio::test]
    async fn test_missing_action_yields_not_specified_fault() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, _service) = start_calculator(&bus);

        let reply = raw_request(&bus, DeliveryOptions::new(), Body::new()).await;
        assert_eq!(
            reply,
            ReplyEnvelope::Failure(ServiceFault::new(500, "action not specified"))
        );
        assert_eq!(dispatcher.stats().protocol_faults.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_closed_stub_never_sends() {
        let bus = Arc::new(InMemoryBus::new());
        let (_dispatcher, _service) = start_calculator(&bus);

        let stub = client(&bus);
        stub.close();

        let err = stub.add(2, 3).await.unwrap_err();
        assert_eq!(err, ProxyError::Closed);
        assert_eq!(bus.stats().requests_sent.load(Relaxed), 0);
    }

    #[tokio::test]
    async fn test_invocations_run_concurrently() {
        let bus = Arc::new(InMemoryBus::new());
        let (dispatcher, service) = start_calculator(&bus);

        let stub = Arc::new(client(&bus));

        // Both calls park inside slow_add; neither blocks the other from
        // being dispatched.
        let first = tokio::spawn({
            let stub = Arc::clone(&stub);
            async move { stub.slow_add(1, 2).await }
        });
        let second = tokio::spawn({
            let stub = Arc::clone(&stub);
            async move { stub.slow_add(10, 20).await }
        });

        // Wait until both invocations are in flight.
        while dispatcher.stats().invocations_dispatched.load(Relaxed) < 2 {
            tokio::task::yield_now().await;
        }

        service.gate.add_permits(2);

        let results = futures::future::join_all([first, second]).await;
        let mut sums: Vec<i32> = results
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();
        sums.sort_unstable();
        assert_eq!(sums, vec![3, 30]);
    }
}
