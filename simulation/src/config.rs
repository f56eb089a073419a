//! Simulation configuration
//!
//! Every field has a default, so a partial JSON document only overrides the
//! values it names.

use std::ops::{Range, RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::systems::{aging, birth, death, family, matchmaking};
use crate::world::INFERTILITY_RATE;

/// Where per-person decisions draw their randomness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngMode {
    /// One stream for the whole world.
    Shared,
    /// Each person owns a stream, seeded from the world stream when the
    /// person is created.
    #[default]
    PerEntity,
}

/// Rates and thresholds of the life-event rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeRules {
    pub marrying_ages: RangeInclusive<i32>,
    pub breeding_ages: RangeInclusive<i32>,
    pub marriage_rate: f64,
    /// Multiplier on `marriage_rate` when both parties count each other as friends.
    pub friendship_bonus: f64,
    pub max_procreation_attempts: i32,
    pub attempts_lost_per_child: i32,
    pub procreation_success_rate: f64,
    pub triplets_below: f64,
    pub twins_below: f64,
    pub infant_mortality: f64,
    pub infertility_rate: f64,
    pub max_age: i32,
}

impl Default for LifeRules {
    fn default() -> Self {
        Self {
            marrying_ages: matchmaking::MINIMUM_MARRYING_AGE..=matchmaking::MAXIMUM_MARRYING_AGE,
            breeding_ages: aging::MINIMUM_BREEDING_AGE..=aging::MAXIMUM_BREEDING_AGE,
            marriage_rate: matchmaking::MARRIAGE_RATE,
            friendship_bonus: matchmaking::FRIENDSHIP_BONUS,
            max_procreation_attempts: birth::MAXIMUM_PROCREATION_ATTEMPTS,
            attempts_lost_per_child: birth::ATTEMPTS_LOST_PER_CHILD,
            procreation_success_rate: birth::PROCREATION_SUCCESS_RATE,
            triplets_below: birth::TRIPLETS_BELOW,
            twins_below: birth::TWINS_BELOW,
            infant_mortality: family::INFANT_MORTALITY,
            infertility_rate: INFERTILITY_RATE,
            max_age: death::MAXIMUM_AGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Calendar year of the first tick.
    pub start_year: i32,
    pub rng_mode: RngMode,
    /// Birth years of randomly created people, end exclusive.
    pub seed_birth_years: Range<i32>,
    /// Syllable counts for generated names.
    pub name_syllables: RangeInclusive<usize>,
    pub rules: LifeRules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_year: 20,
            rng_mode: RngMode::default(),
            seed_birth_years: 1..21,
            name_syllables: 2..=3,
            rules: LifeRules::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate an in-memory JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        for (field, p) in [
            ("marriage_rate", rules.marriage_rate),
            ("procreation_success_rate", rules.procreation_success_rate),
            ("triplets_below", rules.triplets_below),
            ("twins_below", rules.twins_below),
            ("infant_mortality", rules.infant_mortality),
            ("infertility_rate", rules.infertility_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{field} must be within [0, 1], got {p}")));
            }
        }
        if !(rules.friendship_bonus >= 0.0) {
            return Err(invalid(format!(
                "friendship_bonus must be non-negative, got {}",
                rules.friendship_bonus
            )));
        }
        if rules.triplets_below > rules.twins_below {
            return Err(invalid("triplets_below must not exceed twins_below".into()));
        }
        for (field, ages) in [
            ("marrying_ages", &rules.marrying_ages),
            ("breeding_ages", &rules.breeding_ages),
        ] {
            if ages.is_empty() {
                return Err(invalid(format!("{field} is empty: {ages:?}")));
            }
        }
        if rules.max_age <= 0 {
            return Err(invalid(format!("max_age must be positive, got {}", rules.max_age)));
        }
        if self.name_syllables.is_empty() || *self.name_syllables.start() < 1 {
            return Err(invalid(format!(
                "name_syllables must be a non-empty range starting at 1 or more, got {:?}",
                self.name_syllables
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_the_design_values() {
        let rules = LifeRules::default();
        assert_eq!(rules.marrying_ages, 20..=60);
        assert_eq!(rules.breeding_ages, 16..=40);
        assert_eq!(rules.max_procreation_attempts, 52);
        assert_eq!(rules.attempts_lost_per_child, 5);
        assert_eq!(rules.max_age, 80);
        assert!((rules.infant_mortality - 0.2).abs() < f64::EPSILON);
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(
            r#"{ "seed": 9, "rng_mode": "shared", "rules": { "max_age": 120 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.rng_mode, RngMode::Shared);
        assert_eq!(config.rules.max_age, 120);
        assert_eq!(config.rules.marrying_ages, 20..=60);
        assert_eq!(config.start_year, 20);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let err = SimConfig::from_json(r#"{ "rules": { "infant_mortality": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn test_rejects_inverted_age_range() {
        let mut config = SimConfig::default();
        config.rules.marrying_ages = 60..=20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_syllables() {
        let mut config = SimConfig::default();
        config.name_syllables = 0..=2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(SimError::Config(_))
        ));
    }
}
