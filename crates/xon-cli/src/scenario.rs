//! Scenario execution: build the engine, drive the stimulus schedule, and
//! collect traces

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};
use xon_core::{
    CancelToken, LifNeuron, NeuronModel, SharedObserver, SimulationEngine, SpikeRecord,
    SpikeRecorder, VoltageSample,
};

use crate::config::ScenarioConfig;
use crate::error::CliResult;

/// Everything recorded for one neuron
#[derive(Debug, Clone, Serialize)]
pub struct NeuronTrace {
    /// Neuron label from the scenario
    pub name: String,
    /// Membrane potential when the scenario finished (mV)
    pub final_voltage: f64,
    /// Threshold crossings in order
    pub spikes: Vec<SpikeRecord>,
    /// One sample per tick
    pub voltage_history: Vec<VoltageSample>,
}

/// Result of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct TraceExport {
    /// Simulated time at the end (ms)
    pub wall_time: f64,
    /// Ticks executed across all iterations
    pub ticks: u64,
    /// Inject-then-run iterations completed
    pub iterations: u64,
    /// Whether the run was interrupted
    pub cancelled: bool,
    /// Per-neuron traces in registration order
    pub neurons: Vec<NeuronTrace>,
}

impl TraceExport {
    /// Total number of spikes across all neurons
    pub fn total_spikes(&self) -> usize {
        self.neurons.iter().map(|neuron| neuron.spikes.len()).sum()
    }
}

struct Member {
    name: String,
    neuron: Arc<Mutex<LifNeuron>>,
    // Neurons only hold weak references; this keeps the recorder alive
    recorder: Arc<Mutex<SpikeRecorder>>,
}

/// A scenario wired into an engine, ready to execute
pub struct ScenarioRun {
    scenario: ScenarioConfig,
    engine: SimulationEngine,
    members: Vec<Member>,
}

impl ScenarioRun {
    /// Build neurons and engine from a validated scenario
    pub fn build(scenario: ScenarioConfig) -> CliResult<Self> {
        scenario.validate()?;

        let mut engine = SimulationEngine::with_params(scenario.engine.clone())?;
        let mut members = Vec::with_capacity(scenario.neurons.len());

        for config in &scenario.neurons {
            let neuron = engine.add_neuron(LifNeuron::new(config.params.clone())?);
            let recorder = SpikeRecorder::shared();
            let observer: SharedObserver = recorder.clone();
            neuron.lock().set_observer(&observer);
            debug!("Registered neuron '{}'", config.name);

            members.push(Member {
                name: config.name.clone(),
                neuron,
                recorder,
            });
        }

        Ok(Self {
            scenario,
            engine,
            members,
        })
    }

    /// Token that interrupts `execute` between ticks
    pub fn cancel_token(&self) -> CancelToken {
        self.engine.cancel_token()
    }

    /// Run every iteration of the stimulus schedule and collect traces
    pub fn execute(mut self) -> CliResult<TraceExport> {
        let stimulus = self.scenario.stimulus.clone();
        let token = self.engine.cancel_token();

        info!(
            "Running scenario: {} neurons, {} iterations of {}ms",
            self.members.len(),
            stimulus.iterations,
            stimulus.run_length
        );

        let mut ticks = 0;
        let mut iterations = 0;
        let mut cancelled = false;

        for i in 0..stimulus.iterations {
            // Requests made while no tick is running are honoured here
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            if stimulus.injects_at(i) {
                for member in self.members.iter().filter(|m| stimulus.targets(&m.name)) {
                    let mut neuron = member.neuron.lock();
                    for _ in 0..stimulus.count {
                        neuron.inject_single_spike();
                    }
                }
            }

            let report = self.engine.run(stimulus.run_length)?;
            ticks += report.ticks;
            if report.cancelled {
                cancelled = true;
                break;
            }
            iterations += 1;
        }

        let neurons = self
            .members
            .iter()
            .map(|member| {
                let neuron = member.neuron.lock();
                NeuronTrace {
                    name: member.name.clone(),
                    final_voltage: neuron.voltage(),
                    spikes: member.recorder.lock().spikes().to_vec(),
                    voltage_history: neuron.voltage_history().to_vec(),
                }
            })
            .collect();

        Ok(TraceExport {
            wall_time: self.engine.wall_time(),
            ticks,
            iterations,
            cancelled,
            neurons,
        })
    }
}
