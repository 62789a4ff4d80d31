//! Hourly weather for the Acequia simulation.
//!
//! Weather is rolled once per simulated hour from a seeded pseudo-random
//! number generator and applied uniformly to every region after canal
//! transfers:
//!
//! | Weather | Weight | Effect on every region          |
//! |---------|--------|---------------------------------|
//! | Clear   | 60     | none                            |
//! | Rain    | 25     | `+rain_gain`                    |
//! | Heat    | 15     | `-evaporation_loss` (floor 0)   |
//!
//! # Determinism
//!
//! The RNG is `xorshift64` seeded from `(seed, hour)`, so the same seed and
//! hour always produce the same weather and runs are reproducible.

use acequia_types::Weather;
use serde::{Deserialize, Serialize};

use crate::network::WaterNetwork;

/// Weighted weather table: `(weather, weight)`.
const WEATHER_WEIGHTS: [(Weather, u64); 3] = [
    (Weather::Clear, 60),
    (Weather::Rain, 25),
    (Weather::Heat, 15),
];

/// Magnitudes applied to every region for each weather kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffects {
    /// Level gained by every region during [`Weather::Rain`].
    pub rain_gain: f64,
    /// Level lost by every region during [`Weather::Heat`].
    pub evaporation_loss: f64,
}

impl WeatherEffects {
    /// Level change for a given weather.
    pub fn delta(&self, weather: Weather) -> f64 {
        match weather {
            Weather::Clear => 0.0,
            Weather::Rain => self.rain_gain,
            Weather::Heat => -self.evaporation_loss,
        }
    }
}

/// Deterministic hourly weather generator.
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    /// Seed used to derive per-hour randomness.
    seed: u64,
    /// Effect magnitudes.
    effects: WeatherEffects,
}

impl WeatherSystem {
    /// Create a weather system with the given seed and effect magnitudes.
    pub const fn new(seed: u64, effects: WeatherEffects) -> Self {
        Self { seed, effects }
    }

    /// Roll the weather for an hour.
    pub fn roll(&self, hour: u64) -> Weather {
        let total: u64 = WEATHER_WEIGHTS.iter().map(|&(_, w)| w).sum();
        let roll = deterministic_random(self.seed, hour)
            .checked_rem(total)
            .unwrap_or(0);

        let mut cumulative: u64 = 0;
        for &(weather, weight) in &WEATHER_WEIGHTS {
            cumulative = cumulative.saturating_add(weight);
            if roll < cumulative {
                return weather;
            }
        }
        Weather::Clear
    }

    /// Roll the weather for an hour and apply it to every region.
    /// Returns the weather that was applied.
    pub fn apply(&self, hour: u64, network: &mut WaterNetwork) -> Weather {
        let weather = self.roll(hour);
        let delta = self.effects.delta(weather);
        if delta != 0.0 {
            network.adjust_all_levels(delta);
        }
        weather
    }

    /// Return the effect magnitudes.
    pub const fn effects(&self) -> WeatherEffects {
        self.effects
    }
}

/// `xorshift64` over a mix of the seed and hour.
const fn deterministic_random(seed: u64, hour: u64) -> u64 {
    let mut state = seed.wrapping_add(hour.wrapping_mul(0x517c_c1b7_2722_0a95));

    // xorshift requires a non-zero state.
    if state == 0 {
        state = 0xdead_beef_cafe_babe;
    }

    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    state
}
