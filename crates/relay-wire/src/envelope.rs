//! Request and reply envelopes.
//!
//! The action travels as a delivery header on the bus; [`RequestEnvelope`]
//! is the logical pairing of that action with the parameter body.

use crate::fault::ServiceFault;
use crate::{Body, WireValue};
use serde::{Deserialize, Serialize};

/// A marshaled method call: the action tag plus the parameter body.
///
/// Parameter order is irrelevant; the dispatcher looks parameters up by
/// name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub action: String,
    pub body: Body,
}

impl RequestEnvelope {
    pub fn new(action: impl Into<String>, body: Body) -> Self {
        Self {
            action: action.into(),
            body,
        }
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&WireValue> {
        self.body.get(name)
    }
}

/// The single reply produced for every accepted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplyEnvelope {
    /// The marshaled return value.
    Success(WireValue),
    /// The failure record, either a protocol fault or a service failure.
    Failure(ServiceFault),
}

impl ReplyEnvelope {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ReplyEnvelope::Success(_))
    }

    pub fn into_result(self) -> Result<WireValue, ServiceFault> {
        match self {
            ReplyEnvelope::Success(v) => Ok(v),
            ReplyEnvelope::Failure(f) => Err(f),
        }
    }
}

impl From<Result<WireValue, ServiceFault>> for ReplyEnvelope {
    fn from(result: Result<WireValue, ServiceFault>) -> Self {
        match result {
            Ok(v) => ReplyEnvelope::Success(v),
            Err(f) => ReplyEnvelope::Failure(f),
        }
    }
}
