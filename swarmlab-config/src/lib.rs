use std::fs;
use std::path::Path;
use thiserror::Error;

// Re-export types
pub use self::blueprint::SwarmBlueprint;
pub use self::types::{
    AlignmentConfig, BoundingBoxConfig, CohesionConfig, Interactions, OutputConfig, RuleConfig,
    SenderConfig, SeparationConfig, SerializerType, SimulationSettings, SpeciesConfig, SwarmConfig,
};

mod blueprint;
mod types;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Unsupported config format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// --- CLI Overrides ---

/// Command line values that take precedence over the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override the simulation frame rate
    #[arg(long)]
    pub frame_rate: Option<u32>,

    /// Seed for reproducible spawning
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the global velocity ceiling
    #[arg(long)]
    pub max_velocity: Option<f32>,

    /// Compute forces on all cores
    #[arg(long)]
    pub parallel: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut SwarmConfig) {
        if let Some(frame_rate) = self.frame_rate {
            config.simulation.frame_rate = frame_rate;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(max_velocity) = self.max_velocity {
            config.simulation.max_velocity = max_velocity;
        }
        if self.parallel {
            config.simulation.parallel = true;
        }
    }
}

// --- Loading ---

pub fn parse_json(content: &str) -> Result<SwarmConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<SwarmConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

// Config loader implementation
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads and parses a config file, choosing the format from its extension.
    /// Does not validate.
    pub fn from_file(path: &Path) -> Result<SwarmConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let content = fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => parse_json(&content),
            "toml" => parse_toml(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn validate(config: &SwarmConfig) -> Result<(), ConfigError> {
        let sim = &config.simulation;
        if sim.frame_rate == 0 {
            return invalid("Frame rate must be greater than 0");
        }
        if !(sim.max_velocity.is_finite() && sim.max_velocity > 0.0) {
            return invalid("max_velocity must be a positive number");
        }
        non_negative("turn_rate", sim.turn_rate)?;
        non_negative("orientation_threshold", sim.orientation_threshold)?;
        non_negative("initial_speed", sim.initial_speed)?;

        if config.output.every_n_ticks == 0 {
            return invalid("every_n_ticks must be greater than 0");
        }

        if config.species.is_empty() {
            return invalid("At least one species must be configured");
        }

        for species in &config.species {
            if species.name.trim().is_empty() {
                return invalid("Species name cannot be empty");
            }
            let scope = |field: &str| format!("{}.{}", species.name, field);
            non_negative(&scope("max_speed"), species.max_speed)?;
            non_negative(&scope("spawn_radius"), species.spawn_radius)?;
            if !species.spawn_offset.iter().all(|v| v.is_finite()) {
                return invalid(&format!("{} must be finite", scope("spawn_offset")));
            }

            for rule in &species.rules {
                Self::validate_rule(&species.name, rule)?;
            }
        }

        Ok(())
    }

    fn validate_rule(owner: &str, rule: &RuleConfig) -> Result<(), ConfigError> {
        let scope = |field: &str| format!("{}.{}.{}", owner, rule.kind(), field);

        if !rule.weight().is_finite() {
            return invalid(&format!("{} must be finite", scope("weight")));
        }

        match rule {
            RuleConfig::Cohesion(c) => {
                non_negative(&scope("vision_radius"), c.vision_radius)?;
                non_negative(&scope("max_force"), c.max_force)?;
            }
            RuleConfig::Separation(c) => {
                non_negative(&scope("min_distance"), c.min_distance)?;
                non_negative(&scope("max_force"), c.max_force)?;
            }
            RuleConfig::Alignment(c) => {
                non_negative(&scope("neighbor_radius"), c.neighbor_radius)?;
                non_negative(&scope("max_force"), c.max_force)?;
            }
            RuleConfig::BoundingBox(c) => {
                if !c.center.iter().all(|v| v.is_finite()) {
                    return invalid(&format!("{} must be finite", scope("center")));
                }
                for extent in c.size {
                    non_negative(&scope("size"), extent)?;
                }
                non_negative(&scope("edge_threshold"), c.edge_threshold)?;
                non_negative(&scope("max_force"), c.max_force)?;
            }
        }

        if let Some(interactions) = rule.interactions() {
            for (name, weight) in interactions {
                if !weight.is_finite() {
                    return invalid(&format!("{} must be finite", scope(&format!("interactions.{}", name))));
                }
            }
        }

        Ok(())
    }
}

/// Reads, parses and validates a config file.
pub fn load_config(path: &Path) -> Result<SwarmConfig, ConfigError> {
    let config = ConfigLoader::from_file(path)?;
    ConfigLoader::validate(&config)?;
    Ok(config)
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(message.to_string()))
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(&format!("{} must be a finite, non-negative number (got {})", field, value))
    }
}
