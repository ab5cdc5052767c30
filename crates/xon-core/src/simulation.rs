//! Fixed-step simulation engine

use crate::{
    error::*,
    model::{NeuronModel, SharedModel},
    DEFAULT_RUN_LENGTH_MS, DEFAULT_STEP_SIZE_MS,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationParams {
    /// Tick duration (ms)
    pub step_size: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE_MS,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(step_size: f64) -> Result<Self> {
        let params = Self { step_size };
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        ensure_finite("step_size", self.step_size)?;
        if self.step_size <= 0.0 {
            return Err(SimError::invalid_parameter(
                "step_size",
                self.step_size.to_string(),
                "> 0",
            ));
        }
        Ok(())
    }

    /// Number of whole ticks that fit in `length` ms.
    ///
    /// Lengths shorter than one tick (including negative ones) yield zero.
    pub fn num_ticks(&self, length: f64) -> u64 {
        let ticks = (length / self.step_size).floor();
        if ticks >= 1.0 {
            ticks as u64
        } else {
            0
        }
    }
}

/// Coarse run state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    /// Not inside `run`
    #[default]
    Stopped,
    /// Ticks are being executed
    Running,
}

/// Outcome of a single `run` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Ticks actually executed
    pub ticks: u64,
    /// Wall time when the run started (ms)
    pub start_time: f64,
    /// Wall time when the run returned (ms)
    pub end_time: f64,
    /// Whether the run stopped early on a cancellation request
    pub cancelled: bool,
}

impl RunReport {
    /// Simulated time covered by this run (ms)
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Cooperative cancellation flag checked by the engine between ticks
///
/// Clones share the same flag, so a handle can be moved to another thread
/// (a signal handler, a UI) while the engine runs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running engine to stop before its next tick
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested and not yet consumed
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Consume a pending request, returning whether there was one
    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Simulation engine
///
/// Owns an ordered list of shared neuron handles and advances them in
/// fixed ticks. Every tick first bumps the wall time by the step size, then
/// steps each member in insertion order with the new wall time. Wall time
/// carries over between `run` calls until `reset`.
///
/// All mutating methods take `&mut self`: registration can never interleave
/// with a run in progress.
pub struct SimulationEngine {
    params: SimulationParams,
    wall_time: f64,
    state: SimulationState,
    members: Vec<SharedModel>,
    cancel: CancelToken,
}

impl SimulationEngine {
    /// Create an empty engine with a 1 ms step
    pub fn new() -> Self {
        Self {
            params: SimulationParams::default(),
            wall_time: 0.0,
            state: SimulationState::Stopped,
            members: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Create an empty engine with custom parameters
    pub fn with_params(params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::new()
        })
    }

    /// Register a model. No deduplication: adding the same handle twice
    /// steps it twice per tick.
    pub fn add(&mut self, model: SharedModel) {
        self.members.push(model);
        log::trace!("Registered model #{}", self.members.len());
    }

    /// Wrap `model` in a shared handle, register it, and hand the typed
    /// handle back for later inspection
    pub fn add_neuron<M: NeuronModel + 'static>(&mut self, model: M) -> Arc<Mutex<M>> {
        let handle = Arc::new(Mutex::new(model));
        self.add(handle.clone());
        handle
    }

    /// Run the simulation for `length` ms.
    ///
    /// Executes `floor(length / step_size)` ticks; a length shorter than one
    /// tick is a successful no-op. Only a non-finite length is rejected.
    pub fn run(&mut self, length: f64) -> Result<RunReport> {
        ensure_finite("length", length)?;

        let num_ticks = self.params.num_ticks(length);
        let step_size = self.params.step_size;
        let start_time = self.wall_time;

        log::debug!(
            "Starting simulation: {} ticks of {}ms over {} models from t={}ms",
            num_ticks,
            step_size,
            self.members.len(),
            start_time
        );

        self.state = SimulationState::Running;

        let mut executed = 0;
        let mut cancelled = false;

        for tick in 0..num_ticks {
            if self.cancel.take() {
                log::debug!("Simulation cancelled at t={}ms after {} ticks", self.wall_time, executed);
                cancelled = true;
                break;
            }

            self.wall_time += step_size;
            for member in &self.members {
                member.lock().step(step_size, self.wall_time);
            }
            executed += 1;

            if tick % (num_ticks / 10).max(1) == 0 {
                log::debug!(
                    "Simulation progress: {:.1}%",
                    (tick as f64 / num_ticks as f64) * 100.0
                );
            }
        }

        self.state = SimulationState::Stopped;

        log::debug!("Simulation finished: {} ticks, t={}ms", executed, self.wall_time);

        Ok(RunReport {
            ticks: executed,
            start_time,
            end_time: self.wall_time,
            cancelled,
        })
    }

    /// Run for the default length of 1 ms
    pub fn run_default(&mut self) -> Result<RunReport> {
        self.run(DEFAULT_RUN_LENGTH_MS)
    }

    /// Drop every registered model and rewind the wall time to zero.
    ///
    /// The models themselves are left untouched, and so is `state`.
    pub fn reset(&mut self) {
        log::debug!("Resetting engine: dropping {} models", self.members.len());
        self.members.clear();
        self.wall_time = 0.0;
    }

    /// Accumulated simulated time (ms)
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    /// Current run state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Tick duration (ms)
    pub fn step_size(&self) -> f64 {
        self.params.step_size
    }

    /// Change the tick duration for subsequent runs
    pub fn set_step_size(&mut self, step_size: f64) -> Result<()> {
        let params = SimulationParams::new(step_size)?;
        self.params = params;
        Ok(())
    }

    /// Simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Registered models in tick order
    pub fn members(&self) -> &[SharedModel] {
        &self.members
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no models are registered
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Handle for requesting cancellation of the current or next run
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("params", &self.params)
            .field("wall_time", &self.wall_time)
            .field("state", &self.state)
            .field("members", &self.members.len())
            .finish()
    }
}

/// Build an engine over `models`, run it once for `length` ms and return the
/// engine together with the run report
pub fn run_fixed_step<I>(models: I, step_size: f64, length: f64) -> Result<(SimulationEngine, RunReport)>
where
    I: IntoIterator<Item = SharedModel>,
{
    let mut engine = SimulationEngine::with_params(SimulationParams::new(step_size)?)?;
    for model in models {
        engine.add(model);
    }
    let report = engine.run(length)?;
    Ok((engine, report))
}
