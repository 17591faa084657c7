//! Chain-wide PoA parameters.

use serde::{Deserialize, Serialize};

/// Consensus constants the governance core depends on.
///
/// `max_reorg_length` doubles as the activation delay: an approved poll is
/// executed exactly that many blocks after the majority was reached, so a
/// permitted reorg can never unwind state the chain considers final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoaParams {
    /// Target seconds between blocks; also the width of a producer slot.
    pub slot_duration_secs: u64,
    /// Maximum permitted reorganization depth, in blocks.
    pub max_reorg_length: u64,
    /// Idle threshold after which a member becomes a kick candidate.
    pub max_idle_secs: u64,
}

impl Default for PoaParams {
    fn default() -> Self {
        Self {
            slot_duration_secs: 16,
            max_reorg_length: 500,
            max_idle_secs: 6 * 60 * 60,
        }
    }
}

impl PoaParams {
    /// Compressed timelines for local development networks.
    pub fn devnet_defaults() -> Self {
        Self {
            slot_duration_secs: 4,
            max_reorg_length: 4,
            max_idle_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devnet_is_faster_than_mainnet() {
        let mainnet = PoaParams::default();
        let devnet = PoaParams::devnet_defaults();
        assert!(devnet.max_reorg_length < mainnet.max_reorg_length);
        assert!(devnet.max_idle_secs < mainnet.max_idle_secs);
    }
}
