//! Indexed-topic encoding and filter construction.
//!
//! Value types (address, uint, bool, bytesN) occupy their 32-byte word
//! directly. Strings and bytes are stored as `keccak256(raw)`; arrays and
//! tuples as keccak256 of their in-place encoding, where every element is
//! padded to a full word.
//!
//! A filter is a list of [`TopicValues`], one per position. Position 0 is
//! always the event's topic-0 hash; position `i + 1` lists every concrete
//! value supplied for indexed field `i` across all filter records (OR
//! semantics). A position with no concrete value is a wildcard, and trailing
//! wildcards are dropped.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};
use chainbind_core::{EncodeError, TopicValues};

use crate::descriptor::EventDescriptor;
use crate::selector::keccak256;

/// A filter record: one optional value per indexed field, in declared order.
/// `None` leaves the position unconstrained by this record.
pub trait TopicFilter {
    fn topic_args(&self) -> Vec<Option<DynSolValue>>;
}

/// Build the topic filter for `event` from zero or more filter records.
pub fn build_topics<F: TopicFilter>(
    event: &EventDescriptor,
    filters: &[F],
) -> Result<Vec<TopicValues>, EncodeError> {
    let indexed: Vec<_> = event.indexed().collect();
    let mut positions = vec![TopicValues::any(); indexed.len()];

    for filter in filters {
        let args = filter.topic_args();
        if args.len() != indexed.len() {
            return Err(EncodeError::ArgumentCount {
                method: event.name.clone(),
                expected: indexed.len(),
                got: args.len(),
            });
        }
        for ((field, arg), position) in indexed.iter().zip(args).zip(positions.iter_mut()) {
            let Some(value) = arg else { continue };
            if !field.ty.matches(&value) {
                return Err(EncodeError::ShapeMismatch {
                    field: field.name.clone(),
                    expected: field.ty.to_string(),
                });
            }
            // A zero value is how an unset field reads; treat it as unset.
            if is_zero_value(&value) {
                continue;
            }
            let word = encode_topic(&value);
            if position.values.contains(&word) {
                continue;
            }
            position.values.push(word);
        }
    }

    while positions.last().is_some_and(TopicValues::is_wildcard) {
        positions.pop();
    }

    let mut topics = Vec::with_capacity(positions.len() + 1);
    topics.push(TopicValues::exact(event.topic0));
    topics.extend(positions);
    Ok(topics)
}

/// Encode one indexed value as its 32-byte topic word.
pub fn encode_topic(value: &DynSolValue) -> B256 {
    match value {
        DynSolValue::String(s) => keccak256(s.as_bytes()),
        DynSolValue::Bytes(b) => keccak256(b),
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) | DynSolValue::Tuple(_) => {
            let mut preimage = Vec::new();
            encode_in_place(value, &mut preimage);
            keccak256(&preimage)
        }
        other => encode_word(other),
    }
}

/// Recover the generic value carried by a topic word.
///
/// Value types decode back to themselves. Hashed types cannot be inverted and
/// come back as the raw hash bytes.
pub fn decode_topic(ty: &DynSolType, topic: B256) -> DynSolValue {
    match ty {
        DynSolType::Address => DynSolValue::Address(Address::from_word(topic)),
        DynSolType::Uint(bits) => DynSolValue::Uint(U256::from_be_bytes(topic.0), *bits),
        DynSolType::Bool => DynSolValue::Bool(!topic.is_zero()),
        DynSolType::FixedBytes(size) => DynSolValue::FixedBytes(topic, *size),
        _ => DynSolValue::Bytes(topic.to_vec()),
    }
}

/// Whether `value` is the zero value of its type. Composite values are zero
/// when every element is.
fn is_zero_value(value: &DynSolValue) -> bool {
    match value {
        DynSolValue::Address(a) => a.is_zero(),
        DynSolValue::Uint(u, _) => u.is_zero(),
        DynSolValue::Int(i, _) => i.is_zero(),
        DynSolValue::Bool(b) => !b,
        DynSolValue::FixedBytes(word, _) => word.is_zero(),
        DynSolValue::String(s) => s.is_empty(),
        DynSolValue::Bytes(b) => b.is_empty(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items.iter().all(is_zero_value)
        }
        _ => false,
    }
}

fn encode_word(value: &DynSolValue) -> B256 {
    match value {
        DynSolValue::Address(a) => a.into_word(),
        DynSolValue::Uint(u, _) => B256::from(u.to_be_bytes::<32>()),
        DynSolValue::Bool(b) => B256::from(U256::from(u8::from(*b)).to_be_bytes::<32>()),
        DynSolValue::FixedBytes(word, _) => *word,
        // Remaining value types are rejected when the descriptor is parsed.
        _ => B256::ZERO,
    }
}

fn encode_in_place(value: &DynSolValue, out: &mut Vec<u8>) {
    match value {
        DynSolValue::String(s) => pad_to_word(s.as_bytes(), out),
        DynSolValue::Bytes(b) => pad_to_word(b, out),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            for item in items {
                encode_in_place(item, out);
            }
        }
        other => out.extend_from_slice(encode_word(other).as_slice()),
    }
}

fn pad_to_word(raw: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(raw);
    let rem = raw.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ContractAbi;

    const ABI: &str = r#"[
        {"type":"event","name":"MessageEmitted","anonymous":false,"inputs":[
            {"name":"emitter","type":"address","indexed":true},
            {"name":"timestamp","type":"uint256","indexed":true},
            {"name":"message","type":"string","indexed":false}]}
    ]"#;

    struct Filter(Option<Address>, Option<U256>);

    impl TopicFilter for Filter {
        fn topic_args(&self) -> Vec<Option<DynSolValue>> {
            vec![
                self.0.map(DynSolValue::Address),
                self.1.map(|u| DynSolValue::Uint(u, 256)),
            ]
        }
    }

    fn event() -> EventDescriptor {
        ContractAbi::from_json(ABI)
            .unwrap()
            .event("MessageEmitted")
            .unwrap()
            .clone()
    }

    #[test]
    fn no_filters_yields_topic0_only() {
        let ev = event();
        let topics = build_topics::<Filter>(&ev, &[]).unwrap();
        assert_eq!(topics, vec![TopicValues::exact(ev.topic0)]);
    }

    #[test]
    fn single_record_pins_its_positions() {
        let ev = event();
        let emitter = Address::repeat_byte(0xab);
        let topics = build_topics(&ev, &[Filter(Some(emitter), Some(U256::from(100u8)))]).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[1].values, vec![emitter.into_word()]);
        assert_eq!(topics[2].values, vec![B256::with_last_byte(100)]);
    }

    #[test]
    fn records_union_per_position() {
        let ev = event();
        let a = Address::repeat_byte(0x01);
        let b = Address::repeat_byte(0x02);
        let topics = build_topics(&ev, &[Filter(Some(a), None), Filter(Some(b), None)]).unwrap();
        // Trailing wildcard position is dropped.
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[1].values, vec![a.into_word(), b.into_word()]);
    }

    #[test]
    fn unset_leading_position_stays_wildcard() {
        let ev = event();
        let topics = build_topics(&ev, &[Filter(None, Some(U256::from(7u8)))]).unwrap();
        assert_eq!(topics.len(), 3);
        assert!(topics[1].is_wildcard());
        assert_eq!(topics[2].values, vec![B256::with_last_byte(7)]);
    }

    #[test]
    fn zero_value_counts_as_unset() {
        let ev = event();
        let topics = build_topics(&ev, &[Filter(Some(Address::ZERO), None)]).unwrap();
        assert_eq!(topics, vec![TopicValues::exact(ev.topic0)]);
    }

    #[test]
    fn string_topic_is_hashed() {
        let word = encode_topic(&DynSolValue::String("hello".into()));
        assert_eq!(word, keccak256(b"hello"));
        assert_eq!(
            decode_topic(&DynSolType::String, word),
            DynSolValue::Bytes(word.to_vec())
        );
    }

    #[test]
    fn empty_string_counts_as_unset() {
        const LABELLED: &str = r#"[
            {"type":"event","name":"Labelled","anonymous":false,"inputs":[
                {"name":"label","type":"string","indexed":true},
                {"name":"amount","type":"uint256","indexed":true}]}
        ]"#;
        struct Label(String, U256);
        impl TopicFilter for Label {
            fn topic_args(&self) -> Vec<Option<DynSolValue>> {
                vec![
                    Some(DynSolValue::String(self.0.clone())),
                    Some(DynSolValue::Uint(self.1, 256)),
                ]
            }
        }
        let abi = ContractAbi::from_json(LABELLED).unwrap();
        let ev = abi.event("Labelled").unwrap();

        let topics = build_topics(ev, &[Label(String::new(), U256::ZERO)]).unwrap();
        assert_eq!(topics, vec![TopicValues::exact(ev.topic0)]);

        let topics = build_topics(ev, &[Label("gold".into(), U256::ZERO)]).unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[1].values, vec![keccak256(b"gold")]);
    }

    #[test]
    fn composite_zero_values() {
        assert!(is_zero_value(&DynSolValue::Array(vec![])));
        assert!(is_zero_value(&DynSolValue::Tuple(vec![
            DynSolValue::Bool(false),
            DynSolValue::Bytes(vec![]),
        ])));
        assert!(!is_zero_value(&DynSolValue::FixedArray(vec![
            DynSolValue::Uint(U256::ZERO, 256),
            DynSolValue::Uint(U256::from(1u8), 256),
        ])));
    }

    #[test]
    fn array_topic_hashes_padded_elements() {
        let items = vec![
            DynSolValue::Uint(U256::from(1u8), 256),
            DynSolValue::Uint(U256::from(2u8), 256),
        ];
        let mut preimage = [0u8; 64];
        preimage[31] = 1;
        preimage[63] = 2;
        assert_eq!(encode_topic(&DynSolValue::Array(items)), keccak256(&preimage));
    }

    #[test]
    fn value_topics_round_trip() {
        let addr = Address::repeat_byte(0xcd);
        let word = encode_topic(&DynSolValue::Address(addr));
        assert_eq!(decode_topic(&DynSolType::Address, word), DynSolValue::Address(addr));
        let word = encode_topic(&DynSolValue::Bool(true));
        assert_eq!(decode_topic(&DynSolType::Bool, word), DynSolValue::Bool(true));
    }
}
