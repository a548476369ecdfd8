use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SwarmConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,
    pub species: Vec<SpeciesConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// --- Simulation ---

/// Integrator and clock settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulationSettings {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Speed ceiling applied after forces, independent of species max speed.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f32,
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
    #[serde(default = "default_orientation_threshold")]
    pub orientation_threshold: f32,
    /// Magnitude of the random velocity each entity is spawned with.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: bool,
}

fn default_frame_rate() -> u32 { 60 }
fn default_max_velocity() -> f32 { 5.0 }
fn default_turn_rate() -> f32 { 5.0 }
fn default_orientation_threshold() -> f32 { 0.1 }
fn default_initial_speed() -> f32 { 2.0 }

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            max_velocity: default_max_velocity(),
            turn_rate: default_turn_rate(),
            orientation_threshold: default_orientation_threshold(),
            initial_speed: default_initial_speed(),
            seed: None,
            parallel: false,
        }
    }
}

// --- Species ---

/// One species: its constants, its population and its rules.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeciesConfig {
    pub name: String,
    pub max_speed: f32,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub spawn_offset: [f32; 3],
    #[serde(default)]
    pub spawn_radius: f32,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

// --- Rules ---

/// Neighbor species name -> interaction weight.
pub type Interactions = BTreeMap<String, f32>;

fn default_rule_weight() -> f32 { 1.0 }

/// Enum defining the rule type and its parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleConfig {
    Cohesion(CohesionConfig),
    Separation(SeparationConfig),
    Alignment(AlignmentConfig),
    BoundingBox(BoundingBoxConfig),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CohesionConfig {
    #[serde(default = "default_rule_weight")]
    pub weight: f32,
    #[serde(default = "default_vision_radius")]
    pub vision_radius: f32,
    #[serde(default = "default_cohesion_force")]
    pub max_force: f32,
    #[serde(default)]
    pub interactions: Interactions,
}

fn default_vision_radius() -> f32 { 100.0 }
fn default_cohesion_force() -> f32 { 2.0 }

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeparationConfig {
    #[serde(default = "default_rule_weight")]
    pub weight: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_separation_force")]
    pub max_force: f32,
    #[serde(default)]
    pub interactions: Interactions,
}

fn default_min_distance() -> f32 { 2.5 }
fn default_separation_force() -> f32 { 5.0 }

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentConfig {
    #[serde(default = "default_rule_weight")]
    pub weight: f32,
    #[serde(default = "default_neighbor_radius")]
    pub neighbor_radius: f32,
    #[serde(default = "default_alignment_force")]
    pub max_force: f32,
    #[serde(default)]
    pub interactions: Interactions,
}

fn default_neighbor_radius() -> f32 { 10.0 }
fn default_alignment_force() -> f32 { 2.0 }

/// Walls act on every species alike, so this rule takes no interactions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BoundingBoxConfig {
    #[serde(default = "default_rule_weight")]
    pub weight: f32,
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default = "default_box_size")]
    pub size: [f32; 3],
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f32,
    #[serde(default = "default_box_force")]
    pub max_force: f32,
}

fn default_box_size() -> [f32; 3] { [20.0, 20.0, 20.0] }
fn default_edge_threshold() -> f32 { 5.0 }
fn default_box_force() -> f32 { 10.0 }

impl RuleConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleConfig::Cohesion(_) => "cohesion",
            RuleConfig::Separation(_) => "separation",
            RuleConfig::Alignment(_) => "alignment",
            RuleConfig::BoundingBox(_) => "bounding_box",
        }
    }

    pub fn weight(&self) -> f32 {
        match self {
            RuleConfig::Cohesion(c) => c.weight,
            RuleConfig::Separation(c) => c.weight,
            RuleConfig::Alignment(c) => c.weight,
            RuleConfig::BoundingBox(c) => c.weight,
        }
    }

    pub fn interactions(&self) -> Option<&Interactions> {
        match self {
            RuleConfig::Cohesion(c) => Some(&c.interactions),
            RuleConfig::Separation(c) => Some(&c.interactions),
            RuleConfig::Alignment(c) => Some(&c.interactions),
            RuleConfig::BoundingBox(_) => None,
        }
    }
}

// --- Output ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

/// Where serialized frames go
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SenderConfig {
    Stdout,
    File { path: PathBuf },
    #[default]
    Null,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub serializer: SerializerType,
    #[serde(default)]
    pub sender: SenderConfig,
    /// Emit a frame every N ticks.
    #[serde(default = "default_every_n_ticks")]
    pub every_n_ticks: u32,
}

fn default_every_n_ticks() -> u32 { 1 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerType::default(),
            sender: SenderConfig::default(),
            every_n_ticks: default_every_n_ticks(),
        }
    }
}
