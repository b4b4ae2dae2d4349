//! Demo configuration, loaded from an optional YAML file.

use std::path::Path;

use anyhow::{Context, Result};
use goap_planner::BrainConfig;
use serde::{Deserialize, Serialize};

/// Which goal the demo worker pursues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Stock up on firewood, by splitting logs with a tool or bundling branches.
    #[default]
    Woodcutter,
    /// Reach the treasure behind the wall, through the locked door or by force.
    Pirate,
    /// Gather mushrooms and pray on the mountain.
    Creature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub role: Role,
    /// Seed for rolling the contents of unknown piles.
    pub seed: u64,
    /// Probability that an unknown pile really holds each rumored item.
    pub find_chance: f32,
    pub dt_seconds: f32,
    /// Distance the worker covers per second.
    pub move_speed: f32,
    pub max_ticks: u64,
    /// Firewood the woodcutter wants.
    pub firewood_wanted: i64,
    /// Strength needed to bash through the wall.
    pub wall_strength: i64,
    pub brain: BrainConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            role: Role::default(),
            seed: 0x5EED,
            find_chance: 0.2,
            dt_seconds: 0.1,
            move_speed: 4.0,
            max_ticks: 2_000,
            firewood_wanted: 2,
            wall_strength: 5,
            brain: BrainConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DemoConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
