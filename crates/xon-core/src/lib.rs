//! Fixed-step spiking neuron simulation core
//!
//! This crate provides the time-stepped scheduler for small spiking networks
//! together with the neuron model abstraction and its leaky
//! integrate-and-fire implementation. Rendering, dashboards and GPU encoding
//! live elsewhere and only consume the spike notifications and voltage traces
//! produced here.
//!
//! ```
//! use xon_core::{LifNeuron, NeuronModel, SimulationEngine};
//!
//! let mut engine = SimulationEngine::new();
//! let neuron = engine.add_neuron(LifNeuron::default());
//! neuron.lock().inject_single_spike();
//! engine.run(1.0).unwrap();
//!
//! assert_eq!(neuron.lock().voltage(), 39.0);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod model;
pub mod neuron;
pub mod simulation;
pub mod trace;

// Re-export essential types
pub use error::{Result, SimError};
pub use model::{NeuronModel, ObserverSlot, SharedModel, SharedObserver, SpikeObserver};
pub use neuron::{LifNeuron, LifParams};
pub use simulation::{
    run_fixed_step, CancelToken, RunReport, SimulationEngine, SimulationParams, SimulationState,
};
pub use trace::{SpikeRecord, SpikeRecorder, VoltageSample};

/// Default tick duration (ms)
pub const DEFAULT_STEP_SIZE_MS: f64 = 1.0;

/// Default `run` length (ms)
pub const DEFAULT_RUN_LENGTH_MS: f64 = 1.0;
