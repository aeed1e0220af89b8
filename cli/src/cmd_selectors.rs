//! `chainbind selectors`: print method selectors and event topics of the
//! bundled bindings.

use anyhow::{bail, Result};
use chainbind_contracts::balance_reader::BALANCE_READER_ABI;
use chainbind_contracts::ierc20::IERC20_ABI;
use chainbind_contracts::message_emitter::MESSAGE_EMITTER_ABI;
use chainbind_contracts::reserve_manager::RESERVE_MANAGER_ABI;
use chainbind_evm::ContractAbi;

const BINDINGS: &[(&str, &str)] = &[
    ("BalanceReader", BALANCE_READER_ABI),
    ("IERC20", IERC20_ABI),
    ("MessageEmitter", MESSAGE_EMITTER_ABI),
    ("ReserveManager", RESERVE_MANAGER_ABI),
];

pub fn run(contract: Option<&str>, json: bool) -> Result<()> {
    let selected: Vec<_> = BINDINGS
        .iter()
        .filter(|(name, _)| contract.map_or(true, |c| c.eq_ignore_ascii_case(name)))
        .collect();
    if selected.is_empty() {
        let known: Vec<_> = BINDINGS.iter().map(|(n, _)| *n).collect();
        bail!(
            "unknown contract '{}'; known: {}",
            contract.unwrap_or_default(),
            known.join(", ")
        );
    }

    let mut out = serde_json::Map::new();
    for (name, abi_json) in selected {
        let abi = ContractAbi::from_json(abi_json)?;
        if json {
            let methods: serde_json::Map<_, _> = abi
                .methods()
                .map(|m| (m.signature.clone(), format!("0x{}", hex::encode(m.selector)).into()))
                .collect();
            let events: serde_json::Map<_, _> = abi
                .events()
                .map(|e| (e.signature.clone(), format!("{:#x}", e.topic0).into()))
                .collect();
            out.insert(
                name.to_string(),
                serde_json::json!({ "methods": methods, "events": events }),
            );
            continue;
        }

        println!("{name}");
        for m in abi.methods() {
            let view = if m.is_read_only() { " [view]" } else { "" };
            println!("  0x{}  {}{}", hex::encode(m.selector), m.signature, view);
        }
        for e in abi.events() {
            println!("  {:#x}  event {}", e.topic0, e.signature);
        }
        println!();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}
