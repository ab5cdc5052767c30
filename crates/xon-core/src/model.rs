//! Capability traits for simulatable units and spike sinks
//!
//! A [`NeuronModel`] is anything the [`SimulationEngine`](crate::SimulationEngine)
//! can advance tick by tick. A [`SpikeObserver`] is notified synchronously,
//! on the same call stack as the triggering `step`, whenever a model fires.
//!
//! Models are shared with the engine as [`SharedModel`] handles so the caller
//! can keep inspecting a neuron after registering it. Observers are only ever
//! referenced weakly by the models they watch: dropping the last strong
//! handle to an observer silently detaches it.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Shared, lockable handle to a neuron model as stored by the engine
pub type SharedModel = Arc<Mutex<dyn NeuronModel>>;

/// Shared, lockable handle to a spike observer
pub type SharedObserver = Arc<Mutex<dyn SpikeObserver>>;

/// Contract every simulatable unit implements
pub trait NeuronModel: Send {
    /// Advance internal state by `dt` milliseconds.
    ///
    /// `wall_time` is the absolute simulated clock value once this step
    /// completes. May notify the registered observer; never fails for finite
    /// inputs.
    fn step(&mut self, dt: f64, wall_time: f64);

    /// Apply one instantaneous external stimulus event.
    fn inject_single_spike(&mut self);

    /// Current membrane potential (mV)
    fn membrane_potential(&self) -> f64;

    /// Register `observer`, replacing any previously registered one.
    fn set_observer(&mut self, observer: &SharedObserver);

    /// Detach the registered observer, if any.
    fn clear_observer(&mut self);

    /// The registered observer, if one is set and still alive
    fn observer(&self) -> Option<SharedObserver>;
}

/// Sink notified when a neuron crosses its firing threshold
///
/// Implementations must not lock the `source` model's handle (it is already
/// held for the duration of the step) and must not drive the engine.
pub trait SpikeObserver: Send {
    /// Called exactly once per threshold crossing with the tick's wall time.
    fn on_spike(&mut self, source: &dyn NeuronModel, timestamp: f64);
}

/// Single-observer registration slot
///
/// Holds at most one weak observer reference; `set` replaces, there is no
/// multicast.
#[derive(Clone, Default)]
pub struct ObserverSlot {
    observer: Option<Weak<Mutex<dyn SpikeObserver>>>,
}

impl ObserverSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`, replacing the previous one
    pub fn set(&mut self, observer: &SharedObserver) {
        self.observer = Some(Arc::downgrade(observer));
    }

    /// Remove the registered observer
    pub fn clear(&mut self) {
        self.observer = None;
    }

    /// Upgrade the registered observer if it is still alive
    pub fn get(&self) -> Option<SharedObserver> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }

    /// Whether an observer is registered and alive
    pub fn is_attached(&self) -> bool {
        self.get().is_some()
    }

    /// Forward a spike to the registered observer. Returns whether anyone
    /// was notified.
    pub fn notify(&self, source: &dyn NeuronModel, timestamp: f64) -> bool {
        match self.get() {
            Some(observer) => {
                observer.lock().on_spike(source, timestamp);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}
