//! Per-client exclusive ownership of realtime channels.
//!
//! A game's channel may be held by at most one transport of the same client
//! at a time; a second subscription would double-deliver every event.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::sync::transport::TransportError;

/// Tracks which game channels this client currently holds open.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    claims: Arc<DashMap<String, ()>>,
}

impl ChannelRegistry {
    /// Fresh registry with no claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the channel for `game_id`, failing when another transport of
    /// this client already holds it. The claim is released when the returned
    /// guard is dropped.
    pub fn claim(&self, game_id: &str) -> Result<ChannelClaim, TransportError> {
        match self.claims.entry(game_id.to_string()) {
            Entry::Occupied(_) => Err(TransportError::ChannelBusy {
                game_id: game_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(ChannelClaim {
                    registry: self.clone(),
                    game_id: game_id.to_string(),
                })
            }
        }
    }

    /// Whether the channel for `game_id` is currently claimed.
    pub fn is_claimed(&self, game_id: &str) -> bool {
        self.claims.contains_key(game_id)
    }
}

/// Guard representing ownership of one game channel.
pub struct ChannelClaim {
    registry: ChannelRegistry,
    game_id: String,
}

impl ChannelClaim {
    /// Game whose channel this claim owns.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }
}

impl Drop for ChannelClaim {
    fn drop(&mut self) {
        self.registry.claims.remove(&self.game_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_exclusive_per_game() {
        let registry = ChannelRegistry::new();
        let claim = registry.claim("g-1").unwrap();
        assert_eq!(claim.game_id(), "g-1");

        assert!(matches!(
            registry.claim("g-1"),
            Err(TransportError::ChannelBusy { game_id }) if game_id == "g-1"
        ));

        // A different game is unaffected.
        let other = registry.claim("g-2").unwrap();
        drop(other);
    }

    #[test]
    fn dropping_the_claim_releases_the_channel() {
        let registry = ChannelRegistry::new();
        let claim = registry.claim("g-1").unwrap();
        assert!(registry.is_claimed("g-1"));

        drop(claim);
        assert!(!registry.is_claimed("g-1"));
        let _again = registry.claim("g-1").unwrap();
    }
}
