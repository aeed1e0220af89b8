//! Raw log → generic event values.
//!
//! The returned values follow the event's declared field order, with indexed
//! fields recovered from `topics[1..]` and the rest decoded from `data`.

use alloy_core::dyn_abi::DynSolValue;
use chainbind_core::{DecodeError, Log};

use crate::codec::decode_params;
use crate::descriptor::{EventDescriptor, Field};
use crate::topics::decode_topic;

/// Decode `log` against `event`.
///
/// The log must carry exactly one topic per indexed field after topic-0.
/// Topic-0 itself is not compared with the event hash: the caller selected
/// this event when it subscribed.
pub fn decode_log(event: &EventDescriptor, log: &Log) -> Result<Vec<DynSolValue>, DecodeError> {
    let expected = event.indexed_count();
    let got = log.topics.len().saturating_sub(1);
    if log.topics.is_empty() || got != expected {
        return Err(DecodeError::TopicCount {
            event: event.name.clone(),
            expected,
            got,
        });
    }

    let data_fields: Vec<Field> = event.data_fields().cloned().collect();
    let mut data_values =
        decode_params(&format!("{} data", event.name), &data_fields, &log.data)?.into_iter();
    let mut topics = log.topics[1..].iter();

    let mut values = Vec::with_capacity(event.inputs.len());
    for field in &event.inputs {
        let value = if field.indexed {
            topics.next().map(|t| decode_topic(&field.ty, *t))
        } else {
            data_values.next()
        };
        let value = value.ok_or_else(|| DecodeError::shape(field.name.clone(), "missing value"))?;
        values.push(value);
    }
    Ok(values)
}
