//! Scenario files driving a headless simulation
//!
//! A scenario names the neurons to build, the engine step size, and a
//! stimulus schedule. The schedule mirrors an interactive session: for each
//! iteration, optionally inject stimuli, then run the engine for
//! `run_length` ms.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use xon_core::{LifParams, SimulationParams};

use crate::error::{CliError, CliResult};

/// Complete scenario description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Engine settings
    #[serde(default)]
    pub engine: SimulationParams,

    /// Stimulus schedule
    #[serde(default)]
    pub stimulus: StimulusConfig,

    /// Neurons, stepped in this order
    #[serde(default)]
    pub neurons: Vec<NeuronConfig>,
}

/// A named LIF neuron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronConfig {
    /// Label used in exported traces
    pub name: String,

    /// Model parameters; missing fields take the model defaults
    #[serde(flatten)]
    pub params: LifParams,
}

/// Injection schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Number of inject-then-run iterations
    pub iterations: u64,
    /// Length of each run (ms)
    pub run_length: f64,
    /// Inject every N iterations; 0 never injects
    pub every: u64,
    /// First iteration that receives an injection
    pub offset: u64,
    /// Injections per stimulus event
    pub count: u32,
    /// Neuron names to stimulate; empty targets every neuron
    pub targets: Vec<String>,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            iterations: 101,
            run_length: 1.0,
            every: 30,
            offset: 0,
            count: 1,
            targets: Vec::new(),
        }
    }
}

impl StimulusConfig {
    /// Whether iteration `i` receives stimuli
    pub fn injects_at(&self, i: u64) -> bool {
        self.every > 0 && i >= self.offset && (i - self.offset) % self.every == 0
    }

    /// Whether the neuron called `name` is a stimulus target
    pub fn targets(&self, name: &str) -> bool {
        self.targets.is_empty() || self.targets.iter().any(|target| target == name)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            engine: SimulationParams::default(),
            stimulus: StimulusConfig::default(),
            neurons: vec![NeuronConfig {
                name: "lif-0".to_string(),
                params: LifParams::default()
                    .with_in_strength(100.0)
                    .with_leak_fraction(0.05),
            }],
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a scenario from TOML text
    pub fn from_toml(content: &str) -> CliResult<Self> {
        let scenario: Self = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Save the scenario as pretty TOML
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::scenario(format!("Failed to serialize scenario: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check engine and neuron parameters plus the stimulus schedule
    pub fn validate(&self) -> CliResult<()> {
        self.engine.validate()?;

        if self.neurons.is_empty() {
            return Err(CliError::scenario("at least one [[neurons]] entry is required"));
        }

        let mut names = HashSet::new();
        for neuron in &self.neurons {
            if !names.insert(neuron.name.as_str()) {
                return Err(CliError::scenario(format!("duplicate neuron name '{}'", neuron.name)));
            }
            neuron
                .params
                .validate()
                .map_err(|e| CliError::scenario(format!("neuron '{}': {}", neuron.name, e)))?;
        }

        for target in &self.stimulus.targets {
            if !names.contains(target.as_str()) {
                return Err(CliError::scenario(format!("unknown stimulus target '{}'", target)));
            }
        }

        if !self.stimulus.run_length.is_finite() {
            return Err(CliError::scenario("stimulus.run_length must be finite"));
        }

        Ok(())
    }
}
