//! Voltage and spike records produced during a simulation

use crate::model::{NeuronModel, SpikeObserver};
use parking_lot::Mutex;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One entry of a neuron's voltage history
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoltageSample {
    /// Simulated wall time of the sample (ms)
    pub time: f64,
    /// Membrane potential after the leak was applied (mV)
    pub voltage: f64,
}

impl VoltageSample {
    /// Create a new sample
    pub const fn new(time: f64, voltage: f64) -> Self {
        Self { time, voltage }
    }
}

impl From<VoltageSample> for (f64, f64) {
    fn from(sample: VoltageSample) -> Self {
        (sample.time, sample.voltage)
    }
}

impl From<(f64, f64)> for VoltageSample {
    fn from((time, voltage): (f64, f64)) -> Self {
        Self { time, voltage }
    }
}

/// A recorded threshold crossing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeRecord {
    /// Wall time of the tick that fired (ms)
    pub timestamp: f64,
    /// Source potential at the crossing, before reset (mV)
    pub voltage: f64,
}

/// Observer that keeps every spike it is told about
#[derive(Debug, Clone, Default)]
pub struct SpikeRecorder {
    spikes: Vec<SpikeRecord>,
}

impl SpikeRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty recorder behind a shared handle, ready for
    /// registration with a neuron
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// All recorded spikes in arrival order
    pub fn spikes(&self) -> &[SpikeRecord] {
        &self.spikes
    }

    /// Timestamps of all recorded spikes
    pub fn spike_times(&self) -> Vec<f64> {
        self.spikes.iter().map(|spike| spike.timestamp).collect()
    }

    /// Number of recorded spikes
    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    /// Whether nothing has fired yet
    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    /// Forget all recorded spikes
    pub fn clear(&mut self) {
        self.spikes.clear();
    }
}

impl SpikeObserver for SpikeRecorder {
    fn on_spike(&mut self, source: &dyn NeuronModel, timestamp: f64) {
        self.spikes.push(SpikeRecord {
            timestamp,
            voltage: source.membrane_potential(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tuple_conversions() {
        let sample = VoltageSample::new(1.0, 39.0);
        let tuple: (f64, f64) = sample.into();
        assert_eq!(tuple, (1.0, 39.0));
        assert_eq!(VoltageSample::from((2.0, -30.0)), VoltageSample::new(2.0, -30.0));
    }

    #[test]
    fn test_recorder_starts_empty() {
        let recorder = SpikeRecorder::new();
        assert!(recorder.is_empty());
        assert_eq!(recorder.len(), 0);
        assert!(recorder.spike_times().is_empty());
    }
}
