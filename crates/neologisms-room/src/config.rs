//! Room configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Registry-wide settings applied to every room it spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Finish a room as soon as the deck is empty and every drawn card
    /// has been solved, even with time left on the clock.
    pub finish_when_exhausted: bool,

    /// Longest game length `new_game` accepts, in seconds.
    pub max_timer_secs: u32,

    /// Capacity of each room actor's command channel. Callers wait when
    /// it is full.
    pub command_channel_size: usize,

    /// Rate of the countdown clock in Hz. The countdown itself is always
    /// in whole seconds; a faster clock only tightens the granularity.
    pub tick_rate_hz: u32,

    /// Fixed RNG seed for board generation, mixed with each room's id so
    /// rooms still differ from one another. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            finish_when_exhausted: true,
            max_timer_secs: 3600,
            command_channel_size: 64,
            tick_rate_hz: 1,
            seed: None,
        }
    }
}

impl RoomConfig {
    pub fn with_finish_when_exhausted(mut self, enabled: bool) -> Self {
        self.finish_when_exhausted = enabled;
        self
    }

    pub fn with_max_timer_secs(mut self, secs: u32) -> Self {
        self.max_timer_secs = secs;
        self
    }

    pub fn with_command_channel_size(mut self, size: usize) -> Self {
        self.command_channel_size = size.max(1);
        self
    }

    pub fn with_tick_rate_hz(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Makes every generated board and deck reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// Per-room settings fixed at creation and kept across refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    /// Game length in seconds; 0 disables the timer.
    pub timer_secs: u32,
    /// See [`RoomConfig::finish_when_exhausted`].
    pub finish_when_exhausted: bool,
}

impl RoomSettings {
    pub fn new(timer_secs: u32) -> Self {
        Self {
            timer_secs,
            finish_when_exhausted: true,
        }
    }

    pub fn with_finish_when_exhausted(mut self, enabled: bool) -> Self {
        self.finish_when_exhausted = enabled;
        self
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert!(config.finish_when_exhausted);
        assert_eq!(config.max_timer_secs, 3600);
        assert_eq!(config.command_channel_size, 64);
        assert_eq!(config.tick_rate_hz, 1);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_methods() {
        let config = RoomConfig::default()
            .with_finish_when_exhausted(false)
            .with_max_timer_secs(60)
            .with_command_channel_size(0)
            .with_seed(9);
        assert!(!config.finish_when_exhausted);
        assert_eq!(config.max_timer_secs, 60);
        assert_eq!(config.command_channel_size, 1);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_room_config_deserializes_without_seed() {
        let json = r#"{"finish_when_exhausted":false,"max_timer_secs":10,"command_channel_size":8,"tick_rate_hz":1}"#;
        let config: RoomConfig = serde_json::from_str(json).unwrap();
        assert!(!config.finish_when_exhausted);
        assert_eq!(config.seed, None);
    }
}
