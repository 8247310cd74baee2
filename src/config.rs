//! TOML configuration.
//!
//! Every key is optional. Without a file the built-in defaults apply: a
//! 50³ lattice, the classic 2/3/3 rule, aggressive breeding for fresh runs
//! and plain parameters for loaded automata. A file only overrides the keys
//! it names; everything else keeps the default of its own section.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::automaton::grid::validate_side;
use crate::automaton::rule::TransitionRule;
use crate::error::{LifeError, Result};
use crate::simulation::SimParams;

pub const DEFAULT_GRID_SIZE: usize = 50;
pub const DEFAULT_AUTOMATON_DIR: &str = "automaton_examples/";

/// Rule thresholds as written in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub starvation_limit: u8,
    pub overcrowding_limit: u8,
    pub reproduction: u8,
    pub reproduction_disabled: bool,
    pub life_size: f32,
    pub dead_size: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        let rule = TransitionRule::default();
        RuleConfig {
            starvation_limit: rule.starvation_limit,
            overcrowding_limit: rule.overcrowding_limit,
            reproduction: 3,
            reproduction_disabled: false,
            life_size: rule.life_size,
            dead_size: rule.dead_size,
        }
    }
}

impl RuleConfig {
    pub fn to_rule(&self) -> TransitionRule {
        TransitionRule {
            starvation_limit: self.starvation_limit,
            overcrowding_limit: self.overcrowding_limit,
            reproduction: (!self.reproduction_disabled).then_some(self.reproduction),
            life_size: self.life_size,
            dead_size: self.dead_size,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, size) in [("life_size", self.life_size), ("dead_size", self.dead_size)] {
            if !size.is_finite() || size < 0.0 {
                return Err(LifeError::config(format!(
                    "{name} must be a non-negative number, got {size}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_size: usize,
    pub automaton_dir: PathBuf,
    /// Fixed RNG seed for reproducible breeding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub rule: RuleConfig,
    /// Parameters for runs that start from the axis-line seed.
    pub fresh: SimParams,
    /// Parameters for runs that start from a saved automaton.
    pub loaded: SimParams,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grid_size: DEFAULT_GRID_SIZE,
            automaton_dir: PathBuf::from(DEFAULT_AUTOMATON_DIR),
            seed: None,
            rule: RuleConfig::default(),
            fresh: SimParams::aggressive(),
            loaded: SimParams::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document over the defaults and validate the result.
    pub fn from_toml(content: &str) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(content)?;
        let mut merged = toml::Value::try_from(Config::default())
            .map_err(|e| LifeError::config(format!("cannot encode defaults: {e}")))?;
        merge(&mut merged, toml::Value::Table(overrides));

        let config: Config = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    LifeError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_side(self.grid_size)?;
        self.rule.validate()?;
        self.fresh.validate()?;
        self.loaded.validate()?;
        Ok(())
    }
}

/// Recursively overlay `overlay` onto `base`, table by table.
fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayMode;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grid_size, 50);
        assert!(config.fresh.breeding.enabled);
        assert!(!config.loaded.breeding.enabled);
        assert_eq!(config.rule.to_rule(), TransitionRule::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml(
            r#"
            grid_size = 20
            seed = 9

            [rule]
            reproduction_disabled = true

            [fresh]
            delay_secs = 0.1
            max_life = 100
            breed = true
            display_mode = "hidden"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid_size, 20);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.rule.to_rule().reproduction, None);
        assert_eq!(config.fresh.delay_secs, 0.1);
        assert_eq!(config.fresh.breeding.max_life, 100);
        // Unset keys keep the section's own defaults
        assert_eq!(config.fresh.breeding.min_life, 12);
        assert!(config.fresh.breeding.enabled);
        assert_eq!(config.fresh.display_mode, DisplayMode::Hidden);
        assert_eq!(config.loaded, SimParams::default());
    }

    #[test]
    fn test_odd_grid_size_rejected() {
        let err = Config::from_toml("grid_size = 49").unwrap_err();
        assert!(matches!(err, LifeError::OddGridSize(49)));
    }

    #[test]
    fn test_negative_size_rejected() {
        let err = Config::from_toml("[rule]\nlife_size = -1.0").unwrap_err();
        assert!(matches!(err, LifeError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join("voxel-life-no-such-config.toml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load(None).is_ok());
    }
}
