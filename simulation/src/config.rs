use serde::{Deserialize, Serialize};
use wave_defence_core::{DEFAULT_INITIAL_GOLD, DEFAULT_INITIAL_LIFE};

/// Tunables applied when a session is created.
///
/// Every field falls back to its default when omitted from serialised input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length of a grid cell in world units.
    pub tile_size: f32,
    /// Starts the first wave as soon as the session is created.
    pub auto_start_first_wave: bool,
    /// Gold granted when the level does not specify any.
    pub default_initial_gold: u32,
    /// Life granted when the level does not specify any.
    pub default_initial_life: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            auto_start_first_wave: true,
            default_initial_gold: DEFAULT_INITIAL_GOLD,
            default_initial_life: DEFAULT_INITIAL_LIFE,
        }
    }
}
