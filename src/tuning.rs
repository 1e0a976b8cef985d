//! Data-driven game balance
//!
//! Every timing, score and stat constant the simulation uses. Missing JSON
//! fields fall back to the values in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Millis;
use crate::consts::*;
use crate::sim::PlayerStats;

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("powerup_drop_chance {0} must be within [0, 1]")]
    DropChance(f64),
    #[error("min_move_speed {min} must be positive and not exceed initial_move_speed {initial}")]
    SpeedFloor { min: f32, initial: f32 },
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing (ms) ===
    pub bomb_fuse_ms: Millis,
    pub explosion_ms: Millis,
    pub enemy_step_ms: Millis,
    pub detonation_poll_ms: Millis,
    pub countdown_unit_ms: Millis,
    pub ready_delay_ms: Millis,
    /// Round length in countdown units
    pub level_time_secs: u32,

    // === Cosmetics (ms) ===
    pub particle_ms: Millis,
    pub feedback_ms: Millis,
    pub glow_ms: Millis,
    pub shake_ms: Millis,

    // === Scoring ===
    pub partition_score: u64,
    pub enemy_score: u64,
    pub powerup_drop_chance: f64,

    // === Player ===
    pub initial_max_bombs: u32,
    pub initial_bomb_range: u32,
    /// Seconds per tile
    pub initial_move_speed: f32,
    pub speed_step: f32,
    pub min_move_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bomb_fuse_ms: BOMB_FUSE_MS,
            explosion_ms: EXPLOSION_MS,
            enemy_step_ms: ENEMY_STEP_MS,
            detonation_poll_ms: DETONATION_POLL_MS,
            countdown_unit_ms: COUNTDOWN_UNIT_MS,
            ready_delay_ms: READY_DELAY_MS,
            level_time_secs: LEVEL_TIME_SECS,

            particle_ms: PARTICLE_MS,
            feedback_ms: FEEDBACK_MS,
            glow_ms: GLOW_MS,
            shake_ms: SHAKE_MS,

            partition_score: PARTITION_SCORE,
            enemy_score: ENEMY_SCORE,
            powerup_drop_chance: POWERUP_DROP_CHANCE,

            initial_max_bombs: INITIAL_MAX_BOMBS,
            initial_bomb_range: INITIAL_BOMB_RANGE,
            initial_move_speed: INITIAL_MOVE_SPEED,
            speed_step: SPEED_STEP,
            min_move_speed: MIN_MOVE_SPEED,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), TuningError> {
        let intervals = [
            ("bomb_fuse_ms", self.bomb_fuse_ms),
            ("explosion_ms", self.explosion_ms),
            ("enemy_step_ms", self.enemy_step_ms),
            ("detonation_poll_ms", self.detonation_poll_ms),
            ("countdown_unit_ms", self.countdown_unit_ms),
        ];
        if let Some(&(field, _)) = intervals.iter().find(|(_, v)| *v == 0) {
            return Err(TuningError::NonPositive { field });
        }
        if self.level_time_secs == 0 {
            return Err(TuningError::NonPositive {
                field: "level_time_secs",
            });
        }
        if self.initial_max_bombs == 0 {
            return Err(TuningError::NonPositive {
                field: "initial_max_bombs",
            });
        }
        if self.initial_bomb_range == 0 {
            return Err(TuningError::NonPositive {
                field: "initial_bomb_range",
            });
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(TuningError::DropChance(self.powerup_drop_chance));
        }
        if self.speed_step < 0.0 {
            return Err(TuningError::NonPositive { field: "speed_step" });
        }
        if self.min_move_speed <= 0.0 || self.min_move_speed > self.initial_move_speed {
            return Err(TuningError::SpeedFloor {
                min: self.min_move_speed,
                initial: self.initial_move_speed,
            });
        }
        Ok(())
    }

    /// Stats a player starts every round with
    pub fn initial_stats(&self) -> PlayerStats {
        PlayerStats {
            max_bombs: self.initial_max_bombs,
            bomb_range: self.initial_bomb_range,
            move_speed: self.initial_move_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "bomb_fuse_ms": 1000, "enemy_score": 250 }"#).unwrap();
        assert_eq!(tuning.bomb_fuse_ms, 1000);
        assert_eq!(tuning.enemy_score, 250);
        assert_eq!(tuning.explosion_ms, EXPLOSION_MS);
        assert_eq!(tuning.initial_max_bombs, INITIAL_MAX_BOMBS);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Tuning::from_json(r#"{ "detonation_poll_ms": 0 }"#),
            Err(TuningError::NonPositive {
                field: "detonation_poll_ms"
            })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "powerup_drop_chance": 1.5 }"#),
            Err(TuningError::DropChance(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "min_move_speed": 0.5 }"#),
            Err(TuningError::SpeedFloor { .. })
        ));
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning {
            level_time_secs: 60,
            ..Default::default()
        };
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
