//! Data-driven tuning for damage and probe modifiers
//!
//! Upgrade systems write these values; the collision pipeline only reads them,
//! looked up by probe kind.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::ProbeKind;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

/// Chance to pass through destroyed targets, optionally for a duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piercing {
    /// Probability per hit (0.0 - 1.0)
    pub chance: f32,
    /// Seconds piercing stays on after a successful roll (0 = this hit only)
    #[serde(default)]
    pub duration: f32,
}

/// Chance to multiply damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Critical {
    pub chance: f32,
    pub multiplier: f32,
}

/// Chance to damage everything near the struck target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub chance: f32,
    pub base_radius: f32,
    #[serde(default = "one")]
    pub radius_multiplier: f32,
    /// Damage dealt to each splash victim (usually below the primary hit)
    pub damage: f32,
}

fn one() -> f32 {
    1.0
}

impl Splash {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.base_radius * self.radius_multiplier
    }
}

/// Compositional modifiers carried by a probe kind
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub piercing: Option<Piercing>,
    pub critical: Option<Critical>,
    pub splash: Option<Splash>,
}

/// Per-kind probe tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeTuning {
    pub base_damage: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl ProbeTuning {
    pub fn plain(base_damage: f32) -> Self {
        Self {
            base_damage,
            modifiers: Modifiers::default(),
        }
    }
}

/// Complete tuning record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Spatial grid cell size
    pub cell_size: f32,
    /// Seed for modifier rolls
    pub seed: u64,
    pub ball: ProbeTuning,
    pub projectile: ProbeTuning,
    pub bomb: ProbeTuning,
    /// Damage a boss hazard deals to the paddle
    pub hazard_damage: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            seed: 0x5eed,
            ball: ProbeTuning::plain(BALL_DAMAGE),
            projectile: ProbeTuning::plain(PROJECTILE_DAMAGE),
            // Bombs always splash
            bomb: ProbeTuning {
                base_damage: BOMB_DAMAGE,
                modifiers: Modifiers {
                    splash: Some(Splash {
                        chance: 1.0,
                        base_radius: BOMB_SPLASH_RADIUS,
                        radius_multiplier: 1.0,
                        damage: BOMB_DAMAGE / 2.0,
                    }),
                    ..Default::default()
                },
            },
            hazard_damage: HAZARD_DAMAGE,
        }
    }
}

impl Tuning {
    /// Tuning for a probe kind
    pub fn probe(&self, kind: ProbeKind) -> &ProbeTuning {
        match kind {
            ProbeKind::Ball => &self.ball,
            ProbeKind::Projectile => &self.projectile,
            ProbeKind::Bomb => &self.bomb,
        }
    }

    /// Parse and validate JSON tuning. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.hazard_damage < 0.0 {
            return Err(ConfigError::Invalid("hazard_damage is negative".into()));
        }
        for kind in [ProbeKind::Ball, ProbeKind::Projectile, ProbeKind::Bomb] {
            validate_probe(kind, self.probe(kind))?;
        }
        Ok(())
    }
}

fn validate_probe(kind: ProbeKind, tuning: &ProbeTuning) -> Result<(), ConfigError> {
    let invalid = |what: &str| Err(ConfigError::Invalid(format!("{:?}: {}", kind, what)));

    if tuning.base_damage < 0.0 {
        return invalid("base_damage is negative");
    }
    let m = &tuning.modifiers;
    if let Some(p) = m.piercing {
        if !(0.0..=1.0).contains(&p.chance) {
            return invalid("piercing chance outside [0, 1]");
        }
        if p.duration < 0.0 {
            return invalid("piercing duration is negative");
        }
    }
    if let Some(c) = m.critical {
        if !(0.0..=1.0).contains(&c.chance) {
            return invalid("critical chance outside [0, 1]");
        }
        if !(c.multiplier > 0.0) {
            return invalid("critical multiplier must be positive");
        }
    }
    if let Some(s) = m.splash {
        if !(0.0..=1.0).contains(&s.chance) {
            return invalid("splash chance outside [0, 1]");
        }
        if !(s.base_radius > 0.0) || !(s.radius_multiplier > 0.0) {
            return invalid("splash radius must be positive");
        }
        if s.damage < 0.0 {
            return invalid("splash damage is negative");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert!(tuning.probe(ProbeKind::Bomb).modifiers.splash.is_some());
        assert!(tuning.probe(ProbeKind::Ball).modifiers.splash.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "cell_size": 32.0,
            "ball": {
                "base_damage": 2.0,
                "modifiers": { "critical": { "chance": 0.25, "multiplier": 2.0 } }
            }
        }"#;
        let tuning = Tuning::from_json(json).expect("valid tuning");
        assert_eq!(tuning.cell_size, 32.0);
        assert_eq!(tuning.ball.base_damage, 2.0);
        assert_eq!(tuning.ball.modifiers.critical.map(|c| c.multiplier), Some(2.0));
        assert_eq!(tuning.projectile, Tuning::default().projectile);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut tuning = Tuning::default();
        tuning.ball.modifiers.piercing = Some(Piercing {
            chance: 1.5,
            duration: 0.0,
        });
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let err = Tuning::from_json(r#"{ "cell_size": 0.0 }"#).unwrap_err();
        assert!(err.to_string().contains("cell_size"));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(Tuning::from_json("{ not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_roundtrip_preserves_splash_radius() {
        let tuning = Tuning::default();
        let json = tuning.to_json().expect("serializes");
        let back = Tuning::from_json(&json).expect("parses");
        let splash = back.bomb.modifiers.splash.expect("bomb splash");
        assert!((splash.radius() - BOMB_SPLASH_RADIUS).abs() < 1e-6);
    }
}
