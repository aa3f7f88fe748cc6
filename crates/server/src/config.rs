//! Server and per-level configuration, loaded from TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use voxflow_engine::physics::scheduler::OverloadLimits;
use voxflow_engine::world::position::BlockPos;

/// Physics fidelity of a level. Ordered: each level includes the behaviour
/// of the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicsLevel {
    Off,
    #[default]
    Simple,
    Advanced,
    /// Advanced physics with conservation-based liquids.
    Finite,
}

impl PhysicsLevel {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Off),
            1 => Some(Self::Simple),
            2 => Some(Self::Advanced),
            3 => Some(Self::Finite),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Tree shape grown from saplings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeSpecies {
    #[default]
    Fern,
    Oak,
    Cactus,
}

/// Inclusive box liquids never spread into (lava-survival refuges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeZone {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl SafeZone {
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min[0]..=self.max[0]).contains(&pos.x)
            && (self.min[1]..=self.max[1]).contains(&pos.y)
            && (self.min[2]..=self.max[2]).contains(&pos.z)
    }
}

/// Initial contents of a freshly loaded level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Empty,
    /// Bedrock floor, stone, then a dirt layer at `ground`.
    Flat { ground: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub length: u16,
    /// Seed for the level's physics generator. Random when absent.
    pub seed: Option<u64>,
    pub terrain: Terrain,

    pub physics: PhysicsLevel,
    pub random_flow: bool,
    pub finite_liquids: bool,
    pub grass_growth: bool,
    pub grow_trees: bool,
    pub tree_species: TreeSpecies,
    /// Maximum checks dispatched per tick.
    pub overload: usize,
    /// Milliseconds between ticks.
    pub speed_ms: u64,
    pub queue_ceiling: usize,
    pub recovery_threshold: usize,
    /// How far a sponge reaches when holding back liquid.
    pub sponge_radius: u8,
    pub safe_zones: Vec<SafeZone>,
    /// Extra block ids treated as portals.
    pub portals: Vec<u8>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let limits = OverloadLimits::default();
        Self {
            name: "main".into(),
            width: 64,
            height: 64,
            length: 64,
            seed: None,
            terrain: Terrain::Empty,
            physics: PhysicsLevel::Simple,
            random_flow: true,
            finite_liquids: false,
            grass_growth: true,
            grow_trees: false,
            tree_species: TreeSpecies::Fern,
            overload: limits.max_checks_per_tick,
            speed_ms: 250,
            queue_ceiling: limits.queue_ceiling,
            recovery_threshold: limits.recovery_threshold,
            sponge_radius: 2,
            safe_zones: Vec::new(),
            portals: Vec::new(),
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.length == 0 {
            bail!(
                "level '{}': dimensions must be non-zero (got {}x{}x{})",
                self.name,
                self.width,
                self.height,
                self.length
            );
        }
        if self.overload == 0 {
            bail!("level '{}': overload must be at least 1", self.name);
        }
        if self.speed_ms == 0 {
            bail!("level '{}': speed_ms must be at least 1", self.name);
        }
        if self.recovery_threshold >= self.queue_ceiling {
            bail!(
                "level '{}': recovery_threshold ({}) must be below queue_ceiling ({})",
                self.name,
                self.recovery_threshold,
                self.queue_ceiling
            );
        }
        Ok(())
    }

    pub fn limits(&self) -> OverloadLimits {
        OverloadLimits {
            max_checks_per_tick: self.overload,
            queue_ceiling: self.queue_ceiling,
            recovery_threshold: self.recovery_threshold,
        }
    }

    /// Advanced rules (plants die in liquid, sand crushes plants, lava
    /// burns wool) are active.
    pub fn advanced(&self) -> bool {
        self.physics >= PhysicsLevel::Advanced
    }

    pub fn finite(&self) -> bool {
        self.finite_liquids || self.physics == PhysicsLevel::Finite
    }

    pub fn in_safe_zone(&self, pos: BlockPos) -> bool {
        self.safe_zones.iter().any(|zone| zone.contains(pos))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(rename = "level")]
    pub levels: Vec<LevelConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            levels: vec![LevelConfig {
                terrain: Terrain::Flat { ground: 16 },
                ..LevelConfig::default()
            }],
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(contents).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, level) in self.levels.iter().enumerate() {
            level.validate()?;
            if self.levels[..i].iter().any(|other| other.name == level.name) {
                bail!("duplicate level name '{}'", level.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_with_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            [[level]]
            name = "lava"
            physics = "advanced"
            random_flow = false
            overload = 100
            terrain = { kind = "flat", ground = 8 }
            safe_zones = [{ min = [0, 0, 0], max = [3, 3, 3] }]

            [[level]]
            name = "calm"
            physics = "off"
            "#,
        )
        .unwrap();

        assert_eq!(config.levels.len(), 2);
        let lava = &config.levels[0];
        assert_eq!(lava.physics, PhysicsLevel::Advanced);
        assert!(!lava.random_flow);
        assert_eq!(lava.overload, 100);
        assert_eq!(lava.terrain, Terrain::Flat { ground: 8 });
        assert!(lava.in_safe_zone(BlockPos::new(2, 3, 1)));
        assert!(!lava.in_safe_zone(BlockPos::new(4, 0, 0)));
        assert_eq!(lava.speed_ms, 250);
        assert_eq!(lava.sponge_radius, 2);

        assert_eq!(config.levels[1].physics, PhysicsLevel::Off);
        assert!(config.levels[1].grass_growth);
    }

    #[test]
    fn rejects_bad_limits() {
        let err = ServerConfig::from_toml_str(
            r#"
            [[level]]
            name = "broken"
            queue_ceiling = 10
            recovery_threshold = 10
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("recovery_threshold"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = ServerConfig::from_toml_str(
            r#"
            [[level]]
            name = "a"
            [[level]]
            name = "a"
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("duplicate"));
    }

    #[test]
    fn physics_levels_are_ordered() {
        assert!(PhysicsLevel::Finite > PhysicsLevel::Advanced);
        assert_eq!(PhysicsLevel::from_level(2), Some(PhysicsLevel::Advanced));
        assert_eq!(PhysicsLevel::from_level(9), None);
        let finite = LevelConfig {
            physics: PhysicsLevel::Finite,
            ..LevelConfig::default()
        };
        assert!(finite.advanced() && finite.finite());
    }
}
