//! Battle tempo
//!
//! Tempo only paces the autonomous loop and scales animation durations for a
//! presentation layer. It never changes what happens in a match.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Timing numbers for one speed setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Delay between autonomous actions
    pub tick_ms: u64,
    /// Multiplier applied to nominal animation durations
    pub anim_scale: f64,
}

impl BattleSpeed {
    pub const ALL: [BattleSpeed; 3] = [BattleSpeed::Slow, BattleSpeed::Normal, BattleSpeed::Fast];

    pub fn profile(&self) -> SpeedProfile {
        match self {
            BattleSpeed::Slow => SpeedProfile {
                tick_ms: 2400,
                anim_scale: 6.4,
            },
            BattleSpeed::Normal => SpeedProfile {
                tick_ms: 1200,
                anim_scale: 3.2,
            },
            BattleSpeed::Fast => SpeedProfile {
                tick_ms: 600,
                anim_scale: 1.6,
            },
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.profile().tick_ms)
    }

    /// Scale a nominal animation duration for this speed
    pub fn duration_for(&self, normal: Duration) -> Duration {
        normal.mul_f64(self.profile().anim_scale)
    }
}

impl std::str::FromStr for BattleSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(BattleSpeed::Slow),
            "normal" => Ok(BattleSpeed::Normal),
            "fast" => Ok(BattleSpeed::Fast),
            _ => Err(format!("invalid speed '{s}' (expected: slow, normal, fast)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        assert_eq!(BattleSpeed::Slow.tick(), Duration::from_millis(2400));
        assert_eq!(BattleSpeed::Normal.tick(), Duration::from_millis(1200));
        assert_eq!(BattleSpeed::Fast.tick(), Duration::from_millis(600));
    }

    #[test]
    fn test_duration_scaling() {
        let base = Duration::from_millis(100);
        assert_eq!(BattleSpeed::Fast.duration_for(base), Duration::from_millis(160));
        assert!(BattleSpeed::Slow.duration_for(base) > BattleSpeed::Normal.duration_for(base));
    }

    #[test]
    fn test_parse() {
        assert_eq!("FAST".parse::<BattleSpeed>(), Ok(BattleSpeed::Fast));
        assert!("warp".parse::<BattleSpeed>().is_err());
    }
}
