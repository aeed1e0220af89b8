//! Chain selectors: stable 64-bit identifiers for the chains a workflow can
//! target, keyed by a human-readable chain name.

/// Well-known chain names and their selectors.
const SELECTORS: &[(&str, u64)] = &[
    ("ethereum-mainnet", 5009297550715157269),
    ("ethereum-mainnet-arbitrum-1", 4949039107694359620),
    ("ethereum-mainnet-base-1", 15971525489660198786),
    ("ethereum-mainnet-optimism-1", 3734403246176062136),
    ("polygon-mainnet", 4051577828743386545),
    ("avalanche-mainnet", 6433500567565415381),
    ("ethereum-testnet-sepolia", 16015286601757825753),
    ("ethereum-testnet-sepolia-arbitrum-1", 3478487238524512106),
    ("ethereum-testnet-sepolia-base-1", 10344971235874465080),
    ("ethereum-testnet-sepolia-optimism-1", 5224473277236331295),
    ("polygon-testnet-amoy", 16281711391670634445),
    ("avalanche-testnet-fuji", 14767482510784806043),
];

/// Look up the selector for a chain name.
pub fn selector_from_name(name: &str) -> Option<u64> {
    SELECTORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, sel)| *sel)
}

/// Reverse lookup: the chain name for a selector.
pub fn name_from_selector(selector: u64) -> Option<&'static str> {
    SELECTORS
        .iter()
        .find(|(_, sel)| *sel == selector)
        .map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sepolia_selector() {
        assert_eq!(
            selector_from_name("ethereum-testnet-sepolia"),
            Some(16015286601757825753)
        );
    }

    #[test]
    fn selector_round_trips_to_name() {
        let sel = selector_from_name("ethereum-mainnet-base-1").unwrap();
        assert_eq!(name_from_selector(sel), Some("ethereum-mainnet-base-1"));
    }

    #[test]
    fn unknown_chain() {
        assert_eq!(selector_from_name("not-a-chain"), None);
    }
}
