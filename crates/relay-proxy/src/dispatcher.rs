//! Bus-side dispatcher: receive loop, action validation, concurrent
//! invocation, and the idle-timeout lifecycle.

use crate::adapter::ServiceAdapter;
use crate::error::DispatcherError;
use crate::ACTION_HEADER;
use relay_bus::{Consumer, MessageBus};
use relay_wire::{ReplyEnvelope, ServiceFault};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

/// Sentinel timeout: the dispatcher never expires.
pub const NEVER_EXPIRE: i64 = -1;

/// Upper bound on the idle-check period.
const MAX_CHECK_PERIOD_MS: u64 = 10_000;

/// Lifecycle configuration for a dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Idle timeout in seconds; [`NEVER_EXPIRE`] disables expiry.
    pub timeout_seconds: i64,
    /// Top-level dispatchers live for the process lifetime and never
    /// auto-close, regardless of the timeout value.
    pub top_level: bool,
}

impl Default for DispatcherConfig {
    /// A top-level registration with the conventional 300 s timeout value.
    fn default() -> Self {
        Self {
            timeout_seconds: 300,
            top_level: true,
        }
    }
}

impl DispatcherConfig {
    /// A non-top-level registration that closes after `timeout_seconds`
    /// of inactivity.
    #[must_use]
    pub fn transient(timeout_seconds: i64) -> Self {
        Self {
            timeout_seconds,
            top_level: false,
        }
    }

    /// Reject timeouts that are neither [`NEVER_EXPIRE`] nor positive.
    pub fn validate(&self) -> Result<(), DispatcherError> {
        if self.timeout_seconds == NEVER_EXPIRE || self.timeout_seconds > 0 {
            Ok(())
        } else {
            Err(DispatcherError::InvalidTimeout(self.timeout_seconds))
        }
    }

    /// Whether this registration can expire at all.
    fn expires(&self) -> bool {
        self.timeout_seconds != NEVER_EXPIRE && !self.top_level
    }

    fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unsigned_abs())
    }

    /// Half the timeout, capped at 10 s.
    fn check_period(&self) -> Duration {
        let mut period_ms = self.timeout_seconds.unsigned_abs().saturating_mul(1000) / 2;
        if period_ms > MAX_CHECK_PERIOD_MS {
            period_ms = MAX_CHECK_PERIOD_MS;
        }
        Duration::from_millis(period_ms)
    }
}

/// Message counters for a dispatcher.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Messages taken off the bus, valid or not.
    pub messages_received: AtomicU64,
    /// Invocations scheduled for recognized actions.
    pub invocations_dispatched: AtomicU64,
    /// Missing or unknown action tags.
    pub protocol_faults: AtomicU64,
}

/// A service registration on the bus.
///
/// Two states: Active (registered, accepting messages) and Closed
/// (unregistered, timer cancelled). Closing happens on [`close`](Self::close)
/// or when the idle timer finds no recent traffic; there is no way back to
/// Active. Invocations already scheduled keep running through a close and
/// still reply through their own messages.
#[derive(Debug)]
pub struct Dispatcher {
    address: String,
    close: Arc<watch::Sender<bool>>,
    close_rx: watch::Receiver<bool>,
    stats: Arc<DispatcherStats>,
    /// Present iff the registration can expire.
    timer_task: Option<JoinHandle<()>>,
    recv_task: JoinHandle<()>,
}

impl Dispatcher {
    /// Register `adapter` as the service at `address`.
    ///
    /// The receive loop and (for expiring registrations) the idle-check
    /// timer are spawned on `runtime`; invocations are scheduled there
    /// too. Fails if the config is invalid or the address is taken.
    pub fn bind(
        bus: &dyn MessageBus,
        runtime: &Handle,
        address: impl Into<String>,
        adapter: Arc<dyn ServiceAdapter>,
        config: DispatcherConfig,
    ) -> Result<Self, DispatcherError> {
        config.validate()?;
        let address = address.into();
        let consumer = bus.consumer(&address)?;

        let anchor = Instant::now();
        let last_accessed = Arc::new(AtomicU64::new(0));
        let stats = Arc::new(DispatcherStats::default());
        let (close_tx, close_rx) = watch::channel(false);
        let close = Arc::new(close_tx);

        let recv_task = runtime.spawn(
            ReceiveLoop {
                consumer,
                adapter,
                runtime: runtime.clone(),
                anchor,
                last_accessed: Arc::clone(&last_accessed),
                stats: Arc::clone(&stats),
                close: Arc::clone(&close),
                close_rx: close_rx.clone(),
            }
            .run(),
        );

        let timer_task = if config.expires() {
            Some(runtime.spawn(idle_check(
                config.idle_timeout(),
                config.check_period(),
                anchor,
                Arc::clone(&last_accessed),
                Arc::clone(&close),
                close_rx.clone(),
                address.clone(),
            )))
        } else {
            None
        };

        debug!(
            address = %address,
            timeout_seconds = config.timeout_seconds,
            top_level = config.top_level,
            "Dispatcher bound"
        );

        Ok(Self {
            address,
            close,
            close_rx,
            stats,
            timer_task,
            recv_task,
        })
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Whether an idle-check timer is running for this registration.
    #[must_use]
    pub fn has_idle_timer(&self) -> bool {
        self.timer_task.is_some()
    }

    /// Close the registration: stop accepting messages, cancel the timer,
    /// unregister from the bus. Idempotent.
    pub fn close(&self) {
        let _ = self.close.send(true);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.close_rx.borrow()
    }

    /// Resolve once the dispatcher has closed, whichever path got there.
    pub async fn closed(&self) {
        let mut rx = self.close_rx.clone();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Wait for the receive loop to finish. Test and shutdown aid.
    pub async fn join(self) {
        let _ = self.recv_task.await;
        if let Some(timer) = self.timer_task {
            let _ = timer.await;
        }
    }
}

/// The per-dispatcher receive loop.
///
/// Messages are handled one at a time here; only the invocation itself is
/// scheduled out, so the last-accessed timestamp has a single writer.
struct ReceiveLoop {
    consumer: Consumer,
    adapter: Arc<dyn ServiceAdapter>,
    runtime: Handle,
    anchor: Instant,
    last_accessed: Arc<AtomicU64>,
    stats: Arc<DispatcherStats>,
    close: Arc<watch::Sender<bool>>,
    close_rx: watch::Receiver<bool>,
}

impl ReceiveLoop {
    async fn run(mut self) {
        loop {
            let msg = tokio::select! {
                _ = self.close_rx.changed() => break,
                maybe = self.consumer.recv() => match maybe {
                    Some(msg) => msg,
                    None => break,
                },
            };

            self.stats.messages_received.fetch_add(1, Ordering::Relaxed);

            let Some(action) = msg.header(ACTION_HEADER).map(str::to_owned) else {
                self.stats.protocol_faults.fetch_add(1, Ordering::Relaxed);
                error!(
                    address = %self.consumer.address(),
                    correlation_id = %msg.correlation_id(),
                    "Request without action header"
                );
                msg.reply(ReplyEnvelope::Failure(ServiceFault::action_not_specified()));
                continue;
            };

            self.last_accessed
                .store(self.anchor.elapsed().as_millis() as u64, Ordering::Relaxed);

            if !self.adapter.recognizes(&action) {
                self.stats.protocol_faults.fetch_add(1, Ordering::Relaxed);
                error!(
                    address = %self.consumer.address(),
                    action = %action,
                    correlation_id = %msg.correlation_id(),
                    "Request with unknown action"
                );
                msg.reply(ReplyEnvelope::Failure(ServiceFault::invalid_action(&action)));
                continue;
            }

            self.stats
                .invocations_dispatched
                .fetch_add(1, Ordering::Relaxed);

            // Fire-and-forget from the receipt path; the moved message
            // carries the reply slot, so exactly one reply still happens.
            let adapter = Arc::clone(&self.adapter);
            self.runtime.spawn(async move {
                let outcome = match msg.body_object() {
                    Some(body) => adapter.invoke(&action, body).await,
                    None => Err(ServiceFault::internal("request body is not an object")),
                };
                if !msg.reply(ReplyEnvelope::from(outcome)) {
                    debug!(action = %action, "Requester gone before reply");
                }
            });
        }

        // Mark closed for observers regardless of which path ended the loop.
        let _ = self.close.send(true);
        debug!(address = %self.consumer.address(), "Dispatcher closed");
        // Dropping the consumer unregisters the address.
    }
}

/// Periodic idle check for expiring registrations.
async fn idle_check(
    timeout: Duration,
    period: Duration,
    anchor: Instant,
    last_accessed: Arc<AtomicU64>,
    close: Arc<watch::Sender<bool>>,
    mut close_rx: watch::Receiver<bool>,
    address: String,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = close_rx.changed() => break,
            _ = ticker.tick() => {
                let now_ms = anchor.elapsed().as_millis() as u64;
                let idle_ms = now_ms.saturating_sub(last_accessed.load(Ordering::Relaxed));
                if idle_ms > timeout.as_millis() as u64 {
                    debug!(
                        address = %address,
                        idle_ms = idle_ms,
                        "Idle timeout reached, closing dispatcher"
                    );
                    let _ = close.send(true);
                    break;
                }
            }
        }
    }
}
