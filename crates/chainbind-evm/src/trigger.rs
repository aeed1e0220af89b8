//! Typed log triggers.
//!
//! A [`LogTrigger`] pairs the registration request handed to the trigger
//! capability with an adapter that turns each delivered raw log into the
//! event's typed form.

use chainbind_core::types::FilterLogTriggerRequest;
use chainbind_core::{DecodeError, DecodedLog, Log};

/// Decodes raw logs of one event type.
pub trait LogAdapter: Send + Sync {
    type Event;

    fn adapt(&self, log: &Log) -> Result<Self::Event, DecodeError>;
}

#[derive(Debug, Clone)]
pub struct LogTrigger<A> {
    request: FilterLogTriggerRequest,
    adapter: A,
}

impl<A: LogAdapter> LogTrigger<A> {
    pub fn new(request: FilterLogTriggerRequest, adapter: A) -> Self {
        Self { request, adapter }
    }

    /// The registration to hand to the trigger capability.
    pub fn request(&self) -> &FilterLogTriggerRequest {
        &self.request
    }

    /// Decode a delivered log, keeping the raw log alongside.
    pub fn adapt(&self, log: Log) -> Result<DecodedLog<A::Event>, DecodeError> {
        let data = self.adapter.adapt(&log)?;
        Ok(DecodedLog { log, data })
    }
}
