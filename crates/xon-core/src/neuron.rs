//! Leaky integrate-and-fire neuron model

use crate::{
    error::*,
    model::{NeuronModel, ObserverSlot, SharedObserver},
    trace::VoltageSample,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for Leaky Integrate-and-Fire neurons
///
/// All values are in mV except `leak_fraction`, which is the dimensionless
/// fraction of the gap to `resting_potential` that leaks away each ms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LifParams {
    /// Voltage added per injected stimulus event (mV)
    pub in_strength: f64,
    /// Output spike strength (mV). Carried as configuration only; no
    /// dynamics read it.
    pub out_strength: f64,
    /// Initial membrane potential (mV)
    pub membrane_potential: f64,
    /// Per-ms leak fraction toward rest
    pub leak_fraction: f64,
    /// Firing threshold (mV)
    pub spike_threshold: f64,
    /// Resting potential (mV)
    pub resting_potential: f64,
}

impl Default for LifParams {
    fn default() -> Self {
        Self {
            in_strength: 10.0,
            out_strength: 50.0,
            membrane_potential: 30.0,
            leak_fraction: 0.1,
            spike_threshold: 70.0,
            resting_potential: 30.0,
        }
    }
}

impl LifParams {
    /// Create new LIF parameters with validation
    pub fn new(
        in_strength: f64,
        out_strength: f64,
        membrane_potential: f64,
        leak_fraction: f64,
        spike_threshold: f64,
        resting_potential: f64,
    ) -> Result<Self> {
        let params = Self {
            in_strength,
            out_strength,
            membrane_potential,
            leak_fraction,
            spike_threshold,
            resting_potential,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        ensure_finite("in_strength", self.in_strength)?;
        ensure_finite("out_strength", self.out_strength)?;
        ensure_finite("membrane_potential", self.membrane_potential)?;
        ensure_finite("leak_fraction", self.leak_fraction)?;
        ensure_finite("spike_threshold", self.spike_threshold)?;
        ensure_finite("resting_potential", self.resting_potential)?;

        if !(0.0..=1.0).contains(&self.leak_fraction) {
            return Err(SimError::invalid_parameter(
                "leak_fraction",
                self.leak_fraction.to_string(),
                "within [0, 1]",
            ));
        }
        if self.spike_threshold <= self.resting_potential {
            return Err(SimError::invalid_parameter(
                "spike_threshold",
                format!("{} (with resting_potential={})", self.spike_threshold, self.resting_potential),
                "> resting_potential",
            ));
        }
        // The post-spike value is -resting_potential; it has to land below
        // threshold or the neuron would sit above threshold after firing.
        if -self.resting_potential >= self.spike_threshold {
            return Err(SimError::invalid_parameter(
                "spike_threshold",
                format!("{} (with reset potential={})", self.spike_threshold, -self.resting_potential),
                "> -resting_potential",
            ));
        }
        Ok(())
    }

    /// Set the stimulus strength
    pub fn with_in_strength(mut self, in_strength: f64) -> Self {
        self.in_strength = in_strength;
        self
    }

    /// Set the output spike strength
    pub fn with_out_strength(mut self, out_strength: f64) -> Self {
        self.out_strength = out_strength;
        self
    }

    /// Set the initial membrane potential
    pub fn with_membrane_potential(mut self, membrane_potential: f64) -> Self {
        self.membrane_potential = membrane_potential;
        self
    }

    /// Set the per-ms leak fraction
    pub fn with_leak_fraction(mut self, leak_fraction: f64) -> Self {
        self.leak_fraction = leak_fraction;
        self
    }

    /// Set the firing threshold
    pub fn with_spike_threshold(mut self, spike_threshold: f64) -> Self {
        self.spike_threshold = spike_threshold;
        self
    }

    /// Set the resting potential
    pub fn with_resting_potential(mut self, resting_potential: f64) -> Self {
        self.resting_potential = resting_potential;
        self
    }

    /// Potential a neuron is set to right after it fires
    pub fn reset_potential(&self) -> f64 {
        -self.resting_potential
    }
}

/// Leaky Integrate-and-Fire neuron implementation
///
/// Parameters are fixed at construction; only the membrane potential and the
/// voltage history change afterwards. The history gains exactly one sample
/// per `step` and is never pruned.
#[derive(Debug, Clone)]
pub struct LifNeuron {
    params: LifParams,
    membrane_potential: f64,
    voltage_history: Vec<VoltageSample>,
    observer: ObserverSlot,
}

impl LifNeuron {
    /// Create a new LIF neuron
    pub fn new(params: LifParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::from_validated(params))
    }

    fn from_validated(params: LifParams) -> Self {
        Self {
            membrane_potential: params.membrane_potential,
            params,
            voltage_history: Vec::new(),
            observer: ObserverSlot::new(),
        }
    }

    /// Neuron parameters
    pub fn params(&self) -> &LifParams {
        &self.params
    }

    /// Current membrane potential (mV)
    pub fn voltage(&self) -> f64 {
        self.membrane_potential
    }

    /// Chronological `(wall time, voltage)` samples, one per step
    pub fn voltage_history(&self) -> &[VoltageSample] {
        &self.voltage_history
    }

    /// Number of steps taken since construction
    pub fn steps_taken(&self) -> usize {
        self.voltage_history.len()
    }
}

impl Default for LifNeuron {
    fn default() -> Self {
        Self::from_validated(LifParams::default())
    }
}

impl NeuronModel for LifNeuron {
    fn step(&mut self, dt: f64, wall_time: f64) {
        // Explicit Euler leak toward rest
        let leak_amount = self.params.leak_fraction * (self.membrane_potential - self.params.resting_potential);
        self.membrane_potential -= leak_amount * dt;

        // Recorded before the threshold check, so the firing tick keeps its peak
        self.voltage_history
            .push(VoltageSample::new(wall_time, self.membrane_potential));

        if self.membrane_potential >= self.params.spike_threshold {
            log::debug!(
                "LIF neuron fired at t={}ms (v={}mV)",
                wall_time,
                self.membrane_potential
            );
            self.observer.notify(&*self, wall_time);
            self.membrane_potential = self.params.reset_potential();
        }
    }

    fn inject_single_spike(&mut self) {
        self.membrane_potential += self.params.in_strength;
    }

    fn membrane_potential(&self) -> f64 {
        self.membrane_potential
    }

    fn set_observer(&mut self, observer: &SharedObserver) {
        self.observer.set(observer);
    }

    fn clear_observer(&mut self) {
        self.observer.clear();
    }

    fn observer(&self) -> Option<SharedObserver> {
        self.observer.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::SpikeRecorder;

    fn recorder_for(neuron: &mut LifNeuron) -> std::sync::Arc<parking_lot::Mutex<SpikeRecorder>> {
        let recorder = SpikeRecorder::shared();
        let observer: SharedObserver = recorder.clone();
        neuron.set_observer(&observer);
        recorder
    }

    #[test]
    fn test_lif_params_default() {
        let params = LifParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.in_strength, 10.0);
        assert_eq!(params.out_strength, 50.0);
        assert_eq!(params.membrane_potential, 30.0);
        assert_eq!(params.leak_fraction, 0.1);
        assert_eq!(params.spike_threshold, 70.0);
        assert_eq!(params.resting_potential, 30.0);
        assert_eq!(params.reset_potential(), -30.0);
    }

    #[test]
    fn test_lif_params_validation() {
        // Leak fraction out of range
        assert!(LifParams::new(10.0, 50.0, 30.0, 1.5, 70.0, 30.0).is_err());
        assert!(LifParams::new(10.0, 50.0, 30.0, -0.1, 70.0, 30.0).is_err());

        // Threshold not above rest
        assert!(LifParams::new(10.0, 50.0, 30.0, 0.1, 30.0, 30.0).is_err());

        // Reset potential would land above threshold
        assert!(LifParams::new(10.0, 50.0, -70.0, 0.1, -50.0, -70.0).is_err());

        // Non-finite values
        assert!(LifParams::new(f64::NAN, 50.0, 30.0, 0.1, 70.0, 30.0).is_err());
        assert!(LifParams::new(10.0, 50.0, f64::INFINITY, 0.1, 70.0, 30.0).is_err());

        // Boundaries of the leak range are fine
        assert!(LifParams::new(10.0, 50.0, 30.0, 0.0, 70.0, 30.0).is_ok());
        assert!(LifParams::new(30.0, 50.0, 30.0, 1.0, 70.0, 30.0).is_ok());
    }

    #[test]
    fn test_builder_validation_happens_at_construction() {
        let params = LifParams::default().with_leak_fraction(2.0);
        let err = LifNeuron::new(params).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { ref parameter, .. } if parameter == "leak_fraction"));
    }

    #[test]
    fn test_default_matches_validated_construction() {
        let built = LifNeuron::new(LifParams::default()).unwrap();
        let default = LifNeuron::default();
        assert_eq!(default.params(), built.params());
        assert_eq!(default.voltage(), built.voltage());
        assert!(default.voltage_history().is_empty());
        assert!(default.observer().is_none());
    }

    #[test]
    fn test_neuron_at_rest_stays_at_rest() {
        let mut neuron = LifNeuron::default();
        for t in 1..=20 {
            neuron.step(1.0, t as f64);
            assert_eq!(neuron.voltage(), 30.0);
        }
        assert_eq!(neuron.voltage_history().len(), 20);
    }

    #[test]
    fn test_single_injection_then_step() {
        let mut neuron = LifNeuron::default();
        neuron.inject_single_spike();
        assert_eq!(neuron.voltage(), 40.0);

        neuron.step(1.0, 1.0);
        assert_eq!(neuron.voltage(), 39.0);
        assert_eq!(neuron.voltage_history(), &[VoltageSample::new(1.0, 39.0)]);
    }

    #[test]
    fn test_injection_neither_leaks_nor_logs() {
        let mut neuron = LifNeuron::default();
        for _ in 0..5 {
            neuron.inject_single_spike();
        }
        assert_eq!(neuron.voltage(), 80.0);
        assert!(neuron.voltage_history().is_empty());
    }

    #[test]
    fn test_leak_scales_linearly_with_dt() {
        let mut neuron = LifNeuron::new(LifParams::default().with_membrane_potential(50.0)).unwrap();
        // leak = 0.1 * 20 = 2, times dt = 2.5
        neuron.step(2.5, 2.5);
        assert_eq!(neuron.voltage(), 45.0);
    }

    #[test]
    fn test_spike_resets_and_notifies_once() {
        let mut neuron = LifNeuron::default();
        let recorder = recorder_for(&mut neuron);

        for _ in 0..5 {
            neuron.inject_single_spike();
        }
        // 80 - 0.1 * 50 = 75 >= 70
        neuron.step(1.0, 1.0);

        assert_eq!(neuron.voltage(), -30.0);
        assert_eq!(neuron.voltage_history(), &[VoltageSample::new(1.0, 75.0)]);

        let recorder = recorder.lock();
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.spikes()[0].timestamp, 1.0);
        assert_eq!(recorder.spikes()[0].voltage, 75.0);
    }

    #[test]
    fn test_exactly_at_threshold_fires() {
        // No leak, so the potential stays exactly at threshold after the step
        let params = LifParams::default()
            .with_leak_fraction(0.0)
            .with_membrane_potential(70.0);
        let mut neuron = LifNeuron::new(params).unwrap();
        let recorder = recorder_for(&mut neuron);

        neuron.step(1.0, 1.0);
        assert_eq!(neuron.voltage(), -30.0);
        assert_eq!(recorder.lock().spike_times(), vec![1.0]);
    }

    #[test]
    fn test_spike_without_observer_still_resets() {
        let params = LifParams::default().with_membrane_potential(100.0);
        let mut neuron = LifNeuron::new(params).unwrap();
        assert!(neuron.observer().is_none());

        neuron.step(1.0, 1.0);
        assert_eq!(neuron.voltage(), -30.0);
    }

    #[test]
    fn test_recovery_after_hyperpolarizing_reset() {
        let params = LifParams::default().with_membrane_potential(100.0);
        let mut neuron = LifNeuron::new(params).unwrap();
        neuron.step(1.0, 1.0);
        assert_eq!(neuron.voltage(), -30.0);

        // Gap to rest is -60, so the leak pulls the potential up by 6
        neuron.step(1.0, 2.0);
        assert_eq!(neuron.voltage(), -24.0);
    }

    #[test]
    fn test_replacing_observer() {
        let params = LifParams::default().with_membrane_potential(100.0);
        let mut neuron = LifNeuron::new(params).unwrap();
        let first = recorder_for(&mut neuron);
        let second = recorder_for(&mut neuron);

        neuron.step(1.0, 1.0);
        assert!(first.lock().is_empty());
        assert_eq!(second.lock().len(), 1);

        neuron.clear_observer();
        assert!(neuron.observer().is_none());
    }

    #[test]
    fn test_history_accessor_is_stable() {
        let mut neuron = LifNeuron::default();
        neuron.inject_single_spike();
        neuron.step(1.0, 1.0);
        neuron.step(1.0, 2.0);

        let first = neuron.voltage_history().to_vec();
        let second = neuron.voltage_history().to_vec();
        assert_eq!(first, second);
        assert_eq!(neuron.steps_taken(), 2);
    }

    #[test]
    fn test_out_strength_has_no_effect() {
        let mut a = LifNeuron::new(LifParams::default().with_out_strength(0.0)).unwrap();
        let mut b = LifNeuron::new(LifParams::default().with_out_strength(500.0)).unwrap();
        for t in 1..=10 {
            a.inject_single_spike();
            b.inject_single_spike();
            a.step(1.0, t as f64);
            b.step(1.0, t as f64);
        }
        assert_eq!(a.voltage_history(), b.voltage_history());
    }
}
