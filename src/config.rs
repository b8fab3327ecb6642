//! Game balance configuration
//!
//! Every tunable the simulation reads lives here. Defaults come from
//! [`crate::consts`]; a JSON document may override any subset of fields.
//! A config is validated once, before a session is created, and never
//! clamped silently afterwards.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A configuration value that cannot produce a sane game
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("ball radius range is inverted: min {min} > max {max}")]
    InvertedRadiusRange { min: f32, max: f32 },
    #[error("blue radius cap {cap} is below the ball max radius {max}")]
    BlueCapBelowMax { cap: f32, max: f32 },
    #[error("blue and green spawn probabilities sum to {sum}, above 1")]
    ProbabilityOverflow { sum: f32 },
    #[error("size value bounds are inverted: min {min} > max {max}")]
    InvertedSizeBounds { min: i32, max: i32 },
    #[error("initial size value {value} is outside [{min}, {max}]")]
    InitialSizeOutOfBounds { value: i32, min: i32, max: i32 },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("player.friction must be below 1 so motion decays, got {value}")]
    NoFriction { value: f32 },
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_size_value: i32,
    pub min_size_value: i32,
    pub max_size_value: i32,
    pub base_radius: f32,
    pub size_scale: f32,
    pub drag_accel: f32,
    pub friction: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_size_value: INITIAL_SIZE_VALUE,
            min_size_value: MIN_SIZE_VALUE,
            max_size_value: MAX_SIZE_VALUE,
            base_radius: PLAYER_BASE_RADIUS,
            size_scale: PLAYER_SIZE_SCALE,
            drag_accel: PLAYER_DRAG_ACCEL,
            friction: PLAYER_FRICTION,
        }
    }
}

impl PlayerConfig {
    /// Radius for a given size value
    pub fn radius_for(&self, size_value: i32) -> f32 {
        self.base_radius + size_value as f32 * self.size_scale
    }
}

/// Per-type settings for the plain ball kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KindConfig {
    pub color: u32,
    /// Spawn probability; ignored for orange, which takes the remainder
    pub probability: f32,
    pub score_impact: i32,
}

/// Blue ball tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlueConfig {
    pub color: u32,
    pub probability: f32,
    pub spawn_delay_secs: f32,
    pub eat_threshold: u32,
    pub growth_per_eat: f32,
    pub max_radius: f32,
    pub detonation_delay_ms: f32,
    pub pulse_rate: f32,
}

impl Default for BlueConfig {
    fn default() -> Self {
        Self {
            color: BLUE_COLOR,
            probability: BLUE_PROBABILITY,
            spawn_delay_secs: BLUE_SPAWN_DELAY_SECS,
            eat_threshold: BLUE_EAT_THRESHOLD,
            growth_per_eat: BLUE_GROWTH_PER_EAT,
            max_radius: BLUE_MAX_RADIUS,
            detonation_delay_ms: BLUE_DETONATION_DELAY_MS,
            pulse_rate: BLUE_PULSE_RATE,
        }
    }
}

/// Ball spawning, motion and per-type tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallConfig {
    pub min_radius: f32,
    pub max_radius: f32,
    pub max_speed: f32,
    pub speed_floor: f32,
    pub direction_jitter: f32,
    pub initial_count: usize,
    pub max_count: usize,
    pub spawn_rate: f32,
    pub spawn_ramp_secs: f32,
    pub offscreen_margin: f32,
    pub elasticity: f32,
    pub orange: KindConfig,
    pub green: KindConfig,
    pub blue: BlueConfig,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            min_radius: BALL_MIN_RADIUS,
            max_radius: BALL_MAX_RADIUS,
            max_speed: BALL_MAX_SPEED,
            speed_floor: BALL_SPEED_FLOOR,
            direction_jitter: BALL_DIRECTION_JITTER,
            initial_count: BALL_INITIAL_COUNT,
            max_count: BALL_MAX_COUNT,
            spawn_rate: BALL_SPAWN_RATE,
            spawn_ramp_secs: BALL_SPAWN_RAMP_SECS,
            offscreen_margin: OFFSCREEN_MARGIN,
            elasticity: ELASTICITY,
            orange: KindConfig {
                color: ORANGE_COLOR,
                probability: 1.0 - GREEN_PROBABILITY,
                score_impact: ORANGE_SCORE_IMPACT,
            },
            green: KindConfig {
                color: GREEN_COLOR,
                probability: GREEN_PROBABILITY,
                score_impact: GREEN_SCORE_IMPACT,
            },
            blue: BlueConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VegetableConfig {
    pub radius: f32,
    pub score_impact: i32,
    pub spin: f32,
}

impl Default for VegetableConfig {
    fn default() -> Self {
        Self {
            radius: VEGETABLE_RADIUS,
            score_impact: VEGETABLE_SCORE_IMPACT,
            spin: VEGETABLE_SPIN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplosionConfig {
    pub radius: f32,
    pub duration_ms: f32,
    pub particle_count: usize,
    pub start_radius: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            radius: EXPLOSION_RADIUS,
            duration_ms: EXPLOSION_DURATION_MS,
            particle_count: EXPLOSION_PARTICLES,
            start_radius: EXPLOSION_START_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub pool_capacity: usize,
    pub gravity: f32,
    pub drag: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            pool_capacity: PARTICLE_POOL_CAPACITY,
            gravity: PARTICLE_GRAVITY,
            drag: PARTICLE_DRAG,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub balls: BallConfig,
    pub vegetable: VegetableConfig,
    pub explosion: ExplosionConfig,
    pub particles: ParticleConfig,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // `!(v > 0)` also rejects NaN
    if !(value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value >= 0.0) {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        log::debug!("Loaded game config from JSON");
        Ok(config)
    }

    /// Check every tunable; returns the first violation found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        if p.min_size_value > p.max_size_value {
            return Err(ConfigError::InvertedSizeBounds {
                min: p.min_size_value,
                max: p.max_size_value,
            });
        }
        if !(p.min_size_value..=p.max_size_value).contains(&p.initial_size_value) {
            return Err(ConfigError::InitialSizeOutOfBounds {
                value: p.initial_size_value,
                min: p.min_size_value,
                max: p.max_size_value,
            });
        }
        positive("player.base_radius", p.base_radius)?;
        non_negative("player.size_scale", p.size_scale)?;
        positive("player.radius at min size", p.radius_for(p.min_size_value))?;
        non_negative("player.drag_accel", p.drag_accel)?;
        positive("player.friction", p.friction)?;
        if !(p.friction < 1.0) {
            return Err(ConfigError::NoFriction { value: p.friction });
        }

        let b = &self.balls;
        positive("balls.min_radius", b.min_radius)?;
        positive("balls.max_radius", b.max_radius)?;
        if b.min_radius > b.max_radius {
            return Err(ConfigError::InvertedRadiusRange {
                min: b.min_radius,
                max: b.max_radius,
            });
        }
        non_negative("balls.max_speed", b.max_speed)?;
        non_negative("balls.speed_floor", b.speed_floor)?;
        non_negative("balls.direction_jitter", b.direction_jitter)?;
        if b.max_count == 0 {
            return Err(ConfigError::Zero { field: "balls.max_count" });
        }
        positive("balls.spawn_rate", b.spawn_rate)?;
        positive("balls.spawn_ramp_secs", b.spawn_ramp_secs)?;
        non_negative("balls.offscreen_margin", b.offscreen_margin)?;
        non_negative("balls.elasticity", b.elasticity)?;
        unit("balls.orange.probability", b.orange.probability)?;
        unit("balls.green.probability", b.green.probability)?;
        unit("balls.blue.probability", b.blue.probability)?;
        let sum = b.green.probability + b.blue.probability;
        if sum > 1.0 {
            return Err(ConfigError::ProbabilityOverflow { sum });
        }

        let blue = &b.blue;
        non_negative("balls.blue.spawn_delay_secs", blue.spawn_delay_secs)?;
        if blue.eat_threshold == 0 {
            return Err(ConfigError::Zero { field: "balls.blue.eat_threshold" });
        }
        non_negative("balls.blue.growth_per_eat", blue.growth_per_eat)?;
        if blue.max_radius < b.max_radius {
            return Err(ConfigError::BlueCapBelowMax {
                cap: blue.max_radius,
                max: b.max_radius,
            });
        }
        non_negative("balls.blue.detonation_delay_ms", blue.detonation_delay_ms)?;
        non_negative("balls.blue.pulse_rate", blue.pulse_rate)?;

        positive("vegetable.radius", self.vegetable.radius)?;

        let e = &self.explosion;
        positive("explosion.radius", e.radius)?;
        positive("explosion.duration_ms", e.duration_ms)?;
        non_negative("explosion.start_radius", e.start_radius)?;

        let pc = &self.particles;
        non_negative("particles.gravity", pc.gravity)?;
        unit("particles.drag", pc.drag)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut config = GameConfig::default();
        config.balls.min_radius = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "balls.min_radius", .. })
        ));
    }

    #[test]
    fn test_inverted_radius_range_rejected() {
        let mut config = GameConfig::default();
        config.balls.min_radius = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRadiusRange { .. })
        ));
    }

    #[test]
    fn test_probability_overflow_rejected() {
        let mut config = GameConfig::default();
        config.balls.green.probability = 0.8;
        config.balls.blue.probability = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOverflow { .. })
        ));
    }

    #[test]
    fn test_nan_friction_rejected() {
        let mut config = GameConfig::default();
        config.player.friction = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_friction_of_one_rejected() {
        let mut config = GameConfig::default();
        config.player.friction = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NoFriction { value: 1.0 })
        );
        config.player.friction = 0.999;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initial_size_outside_bounds_rejected() {
        let mut config = GameConfig::default();
        config.player.initial_size_value = 60;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialSizeOutOfBounds { value: 60, .. })
        ));
    }

    #[test]
    fn test_partial_json_override() {
        let config =
            GameConfig::from_json(r#"{ "balls": { "max_count": 42 }, "explosion": { "radius": 80.0 } }"#)
                .unwrap();
        assert_eq!(config.balls.max_count, 42);
        assert_eq!(config.explosion.radius, 80.0);
        assert_eq!(config.balls.min_radius, BALL_MIN_RADIUS);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_invalid_json_override_fails_fast() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "balls": { "max_count": 0 } }"#),
            Err(ConfigError::Zero { .. })
        ));
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_player_radius_formula() {
        let p = PlayerConfig::default();
        assert_eq!(p.radius_for(0), 20.0);
        assert_eq!(p.radius_for(10), 40.0);
    }
}
