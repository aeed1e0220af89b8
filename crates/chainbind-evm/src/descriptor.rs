//! Contract descriptors parsed from standard Ethereum ABI JSON.
//!
//! A [`ContractAbi`] is built once per binding and shared behind an `Arc`.
//! Every parameter is resolved to a concrete [`DynSolType`] up front so the
//! codec never re-parses type strings on the hot path.

use alloy_dyn_abi::Specifier;
use alloy_core::dyn_abi::DynSolType;
use alloy_json_abi::{JsonAbi, Param, StateMutability};
use alloy_primitives::B256;
use chainbind_core::DescriptorError;
use std::collections::BTreeMap;

use crate::selector::{event_topic, function_selector};

/// One named parameter of a method, event, or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: DynSolType,
    /// Only meaningful for event fields.
    pub indexed: bool,
}

/// A callable method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
    pub state_mutability: StateMutability,
}

impl MethodDescriptor {
    pub fn input_types(&self) -> Vec<DynSolType> {
        self.inputs.iter().map(|f| f.ty.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<DynSolType> {
        self.outputs.iter().map(|f| f.ty.clone()).collect()
    }

    /// Returns `true` for `view` and `pure` methods.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }
}

/// An event declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: String,
    pub signature: String,
    /// keccak256 of the canonical signature; topics[0] of every emitted log.
    pub topic0: B256,
    /// All fields in declared order, indexed and non-indexed interleaved.
    pub inputs: Vec<Field>,
    pub anonymous: bool,
}

impl EventDescriptor {
    /// Fields carried in topics[1..], in declared order.
    pub fn indexed(&self) -> impl Iterator<Item = &Field> {
        self.inputs.iter().filter(|f| f.indexed)
    }

    /// Fields carried in the log's data section, in declared order.
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.inputs.iter().filter(|f| !f.indexed)
    }

    pub fn indexed_count(&self) -> usize {
        self.indexed().count()
    }
}

/// A custom error declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub name: String,
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<Field>,
}

/// The parsed, resolved ABI of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAbi {
    methods: BTreeMap<String, MethodDescriptor>,
    events: BTreeMap<String, EventDescriptor>,
    errors: BTreeMap<[u8; 4], ErrorDescriptor>,
}

impl ContractAbi {
    /// Parse a standard Ethereum ABI JSON array.
    ///
    /// Overloaded names are rejected: bindings address methods and events by
    /// name alone.
    pub fn from_json(abi_json: &str) -> Result<Self, DescriptorError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)?;
        let mut out = Self::default();

        for func in abi.functions() {
            let signature = func.signature();
            let method = MethodDescriptor {
                name: func.name.clone(),
                selector: function_selector(&signature),
                inputs: resolve_params(&func.name, &func.inputs)?,
                outputs: resolve_params(&func.name, &func.outputs)?,
                state_mutability: func.state_mutability,
                signature,
            };
            if out.methods.insert(method.name.clone(), method).is_some() {
                return Err(DescriptorError::Duplicate {
                    name: func.name.clone(),
                });
            }
        }

        for event in abi.events() {
            let signature = event.signature();
            let mut inputs = Vec::with_capacity(event.inputs.len());
            for param in &event.inputs {
                let ty = param.resolve().map_err(|e| DescriptorError::UnsupportedType {
                    item: format!("{}.{}", event.name, param.name),
                    reason: e.to_string(),
                })?;
                check_supported(&event.name, &param.name, &ty)?;
                inputs.push(Field {
                    name: param.name.clone(),
                    ty,
                    indexed: param.indexed,
                });
            }
            let descriptor = EventDescriptor {
                name: event.name.clone(),
                topic0: event_topic(&signature),
                inputs,
                anonymous: event.anonymous,
                signature,
            };
            if out.events.insert(descriptor.name.clone(), descriptor).is_some() {
                return Err(DescriptorError::Duplicate {
                    name: event.name.clone(),
                });
            }
        }

        for error in abi.errors() {
            let signature = error.signature();
            let selector = function_selector(&signature);
            out.errors.insert(
                selector,
                ErrorDescriptor {
                    name: error.name.clone(),
                    inputs: resolve_params(&error.name, &error.inputs)?,
                    selector,
                    signature,
                },
            );
        }

        Ok(out)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.get(name)
    }

    pub fn error_by_selector(&self, selector: [u8; 4]) -> Option<&ErrorDescriptor> {
        self.errors.get(&selector)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.events.values()
    }
}

fn resolve_params(item: &str, params: &[Param]) -> Result<Vec<Field>, DescriptorError> {
    params
        .iter()
        .map(|param| {
            let ty = param.resolve().map_err(|e| DescriptorError::UnsupportedType {
                item: format!("{item}.{}", param.name),
                reason: e.to_string(),
            })?;
            check_supported(item, &param.name, &ty)?;
            Ok(Field {
                name: param.name.clone(),
                ty,
                indexed: false,
            })
        })
        .collect()
}

/// Bindings cover addresses, unsigned integers, booleans, byte strings,
/// strings, and tuples/arrays of those.
fn check_supported(item: &str, field: &str, ty: &DynSolType) -> Result<(), DescriptorError> {
    match ty {
        DynSolType::Address
        | DynSolType::Bool
        | DynSolType::Uint(_)
        | DynSolType::FixedBytes(_)
        | DynSolType::Bytes
        | DynSolType::String => Ok(()),
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => {
            check_supported(item, field, inner)
        }
        DynSolType::Tuple(inner) => inner
            .iter()
            .try_for_each(|t| check_supported(item, field, t)),
        other => Err(DescriptorError::UnsupportedType {
            item: format!("{item}.{field}"),
            reason: format!("{other} is outside the supported type subset"),
        }),
    }
}
