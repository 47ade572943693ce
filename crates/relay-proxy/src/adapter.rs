//! The seam between the dispatcher runtime and generated dispatch glue.

use async_trait::async_trait;
use relay_wire::{Body, ServiceFault, WireValue};

/// Action-keyed dispatch into one bound service implementation.
///
/// Implementations are emitted by the generator: `recognizes` is a closed
/// match over the descriptor's method names, and `invoke` decodes the
/// parameters for one action, calls the implementation, and encodes the
/// result.
///
/// `invoke` owns failure conversion. A decode error or an implementation
/// failure must come back as `Err(ServiceFault)`; the dispatcher turns it
/// into the failure reply for that message. By the time an invocation runs,
/// the receipt path has moved on, so nothing outside this call can recover
/// a fault into a reply.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Whether `action` names a method of the bound service.
    ///
    /// Checked on the receipt path before an invocation is scheduled.
    fn recognizes(&self, action: &str) -> bool;

    /// Decode parameters from `body`, invoke the implementation, encode
    /// the result.
    async fn invoke(&self, action: &str, body: &Body) -> Result<WireValue, ServiceFault>;
}
