//! Breathing animation: an independent layered oscillation of scale and
//! opacity pushed to registered elements at a throttled rate.
//!
//! The engine owns its own clock. Host ticks advance it every call; values
//! are computed and pushed only every `1 / update_rate_hz` seconds of host
//! time. Elements are held weakly, so an element dropped by its owner simply
//! disappears from the registry on the next push.

mod element;

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::{Rc, Weak};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::params::{BreathingElementConfig, BreathingSettings};

pub use element::{
    compute_breathing, BreathingReceiver, BreathingValue, ElementHandle, ElementId, ElementState,
};

struct Registration {
    id: ElementId,
    handle: Weak<RefCell<dyn BreathingReceiver>>,
    state: ElementState,
}

pub struct BreathingEngine {
    settings: BreathingSettings,
    time: f32,
    since_push: f32,
    registry: Vec<Registration>,
    next_id: u64,
    rng: SmallRng,
}

impl BreathingEngine {
    pub fn new(settings: BreathingSettings) -> Self {
        let seed: u64 = rand::random();
        Self::with_rng(settings, SmallRng::seed_from_u64(seed))
    }

    /// Engine whose phase offsets are reproducible
    pub fn with_seed(settings: BreathingSettings, seed: u64) -> Self {
        Self::with_rng(settings, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(settings: BreathingSettings, rng: SmallRng) -> Self {
        let settings = settings.sanitized();
        Self {
            // First tick pushes immediately
            since_push: settings.update_interval_s(),
            settings,
            time: 0.0,
            registry: Vec::new(),
            next_id: 0,
            rng,
        }
    }

    pub fn settings(&self) -> &BreathingSettings {
        &self.settings
    }

    /// Engine clock (seconds, already scaled by `global_time_scale`)
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Registered elements, including any not yet pruned after being dropped
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.registry.iter().any(|entry| entry.id == id)
    }

    /// Register an element with a random phase offset in `[0, 2π)`.
    ///
    /// Uses the settings' default intensities when `config` is `None`.
    /// Registering an already registered handle returns its existing id.
    /// Returns `None` once `max_elements` live elements are registered.
    pub fn register(
        &mut self,
        element: &ElementHandle,
        config: Option<BreathingElementConfig>,
    ) -> Option<ElementId> {
        let weak = Rc::downgrade(element);
        if let Some(existing) = self.registry.iter().find(|entry| entry.handle.ptr_eq(&weak)) {
            log::debug!("Breathing element {} already registered", existing.id.0);
            return Some(existing.id);
        }

        self.prune();
        if self.registry.len() >= self.settings.max_elements {
            log::warn!(
                "Breathing registry full ({} elements), registration rejected",
                self.settings.max_elements
            );
            return None;
        }

        let config = config.unwrap_or_else(|| BreathingElementConfig::from_settings(&self.settings));
        let phase_offset = self.rng.gen_range(0.0..TAU);
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.registry.push(Registration {
            id,
            handle: weak,
            state: ElementState::new(phase_offset, config),
        });
        log::debug!(
            "Registered breathing element {} (phase offset {:.3})",
            id.0,
            phase_offset
        );
        Some(id)
    }

    /// Remove an element. Returns false if it was not registered.
    pub fn unregister(&mut self, id: ElementId) -> bool {
        let before = self.registry.len();
        self.registry.retain(|entry| entry.id != id);
        let removed = self.registry.len() != before;
        if removed {
            log::debug!("Unregistered breathing element {}", id.0);
        }
        removed
    }

    /// Advance the clock by `delta_s · global_time_scale` and push values
    /// when the update interval has elapsed. Returns how many elements
    /// received a value this tick.
    pub fn tick(&mut self, delta_s: f32) -> usize {
        if !delta_s.is_finite() || delta_s < 0.0 {
            log::warn!("Breathing tick: ignoring delta {}", delta_s);
            return 0;
        }
        self.time += delta_s * self.settings.global_time_scale;
        self.since_push += delta_s;

        let interval = self.settings.update_interval_s();
        if self.since_push < interval {
            return 0;
        }
        self.since_push -= interval;
        if self.since_push >= interval {
            // Host stalled; skip missed pushes rather than bursting
            self.since_push = 0.0;
        }
        self.push_all()
    }

    /// Breathing value for an element state at engine time `time`
    pub fn compute_breathing(&self, state: &ElementState, time: f32) -> BreathingValue {
        compute_breathing(state, time, &self.settings)
    }

    /// Current value of a registered element
    pub fn breathing_value(&self, id: ElementId) -> Option<BreathingValue> {
        self.state_of(id)
            .map(|state| self.compute_breathing(&state, self.time))
    }

    pub fn state_of(&self, id: ElementId) -> Option<ElementState> {
        self.registry
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.state)
    }

    /// Primary rhythm of the engine clock, without per-element offsets
    pub fn global_phase(&self) -> f32 {
        (self.time * self.settings.primary_frequency_hz * TAU).sin()
    }

    /// Replace all settings. Takes effect on the next push; registered
    /// elements keep their phase offsets and intensities.
    pub fn update_settings(&mut self, settings: BreathingSettings) {
        self.settings = settings.sanitized();
        log::info!(
            "Breathing settings replaced (primary {} Hz, curve {})",
            self.settings.primary_frequency_hz,
            self.settings.breathing_curve
        );
    }

    fn prune(&mut self) {
        let before = self.registry.len();
        self.registry.retain(|entry| entry.handle.strong_count() > 0);
        let dropped = before - self.registry.len();
        if dropped > 0 {
            log::debug!("Pruned {} dropped breathing elements", dropped);
        }
    }

    fn push_all(&mut self) -> usize {
        self.prune();
        let mut pushed = 0;
        for entry in &self.registry {
            let Some(handle) = entry.handle.upgrade() else {
                continue;
            };
            let value = compute_breathing(&entry.state, self.time, &self.settings);
            if let Ok(mut receiver) = handle.try_borrow_mut() {
                receiver.apply_breathing(value);
                pushed += 1;
            } else {
                log::warn!("Breathing element {} busy, skipping update", entry.id.0);
            };
        }
        log::trace!("Breathing push: {} elements at t={:.3}", pushed, self.time);
        pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        values: Vec<BreathingValue>,
    }

    impl BreathingReceiver for Recorder {
        fn apply_breathing(&mut self, value: BreathingValue) {
            self.values.push(value);
        }
    }

    fn recorder() -> (Rc<RefCell<Recorder>>, ElementHandle) {
        let concrete = Rc::new(RefCell::new(Recorder::default()));
        let handle: ElementHandle = concrete.clone();
        (concrete, handle)
    }

    #[test]
    fn test_three_elements_desynchronise() {
        let settings = BreathingSettings::default();
        let mut engine = BreathingEngine::with_seed(settings.clone(), 7);
        let elements: Vec<_> = (0..3).map(|_| recorder()).collect();
        let ids: Vec<ElementId> = elements
            .iter()
            .map(|(_, handle)| engine.register(handle, None).unwrap())
            .collect();

        engine.tick(0.5);
        let values: Vec<BreathingValue> = ids
            .iter()
            .map(|&id| engine.breathing_value(id).unwrap())
            .collect();

        for (i, a) in values.iter().enumerate() {
            assert!(a.scale >= settings.min_scale && a.scale <= settings.max_scale);
            assert!(a.opacity >= settings.min_opacity && a.opacity <= settings.max_opacity);
            for b in &values[i + 1..] {
                assert!((a.phase - b.phase).abs() > 1e-6, "phases should differ");
            }
        }
        for (concrete, _) in &elements {
            assert_eq!(concrete.borrow().values.len(), 1);
        }
    }

    #[test]
    fn test_push_rate_is_throttled() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 1);
        let (concrete, handle) = recorder();
        engine.register(&handle, None);

        // One second at 90 Hz host rate, 15 Hz push rate
        let mut pushes = 0;
        for _ in 0..90 {
            pushes += engine.tick(1.0 / 90.0);
        }
        assert!((14..=16).contains(&pushes), "pushes = {}", pushes);
        assert_eq!(concrete.borrow().values.len(), pushes);
        assert!((engine.time() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_time_scale_applies_to_clock() {
        let settings = BreathingSettings {
            global_time_scale: 2.0,
            ..Default::default()
        };
        let mut engine = BreathingEngine::with_seed(settings, 1);
        engine.tick(0.25);
        assert!((engine.time() - 0.5).abs() < 1e-6);
        assert_eq!(engine.tick(f32::NAN), 0);
        assert!((engine.time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 3);
        let (_concrete, handle) = recorder();
        let id = engine.register(&handle, None).unwrap();
        assert!(engine.unregister(id));
        assert!(!engine.unregister(id));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_registry_full_rejects() {
        let settings = BreathingSettings {
            max_elements: 2,
            ..Default::default()
        };
        let mut engine = BreathingEngine::with_seed(settings, 3);
        let elements: Vec<_> = (0..3).map(|_| recorder()).collect();
        assert!(engine.register(&elements[0].1, None).is_some());
        assert!(engine.register(&elements[1].1, None).is_some());
        assert!(engine.register(&elements[2].1, None).is_none());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_returns_same_id() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 3);
        let (_concrete, handle) = recorder();
        let first = engine.register(&handle, None);
        assert_eq!(engine.register(&handle, None), first);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_dropped_elements_are_pruned() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 5);
        let (kept, kept_handle) = recorder();
        let (dropped, dropped_handle) = recorder();
        engine.register(&kept_handle, None);
        engine.register(&dropped_handle, None);
        assert_eq!(engine.len(), 2);

        drop(dropped);
        drop(dropped_handle);
        assert_eq!(engine.len(), 2);

        assert_eq!(engine.tick(0.1), 1);
        assert_eq!(engine.len(), 1);
        assert_eq!(kept.borrow().values.len(), 1);
    }

    #[test]
    fn test_busy_element_is_skipped() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 6);
        let (busy, busy_handle) = recorder();
        let (_free, free_handle) = recorder();
        engine.register(&busy_handle, None);
        engine.register(&free_handle, None);

        let guard = busy.borrow_mut();
        assert_eq!(engine.tick(0.1), 1);
        drop(guard);
        assert!(busy.borrow().values.is_empty());
    }

    #[test]
    fn test_custom_config_is_used() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 9);
        let (_concrete, handle) = recorder();
        let config = BreathingElementConfig {
            scale_intensity: 0.05,
            opacity_intensity: 0.1,
            base_opacity: 0.9,
        };
        let id = engine.register(&handle, Some(config)).unwrap();
        let state = engine.state_of(id).unwrap();
        assert_eq!(state.base_opacity, 0.9);
        assert!((0.0..TAU).contains(&state.phase_offset));
    }

    #[test]
    fn test_global_phase_follows_primary_rhythm() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 2);
        assert!(engine.global_phase().abs() < 1e-6);
        // Quarter period of 0.25 Hz
        engine.tick(1.0);
        assert!((engine.global_phase() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_update_settings_applies_on_next_push() {
        let mut engine = BreathingEngine::with_seed(BreathingSettings::default(), 4);
        let (concrete, handle) = recorder();
        engine.register(&handle, None);
        engine.update_settings(BreathingSettings {
            min_scale: 1.0,
            max_scale: 1.0,
            ..Default::default()
        });
        engine.tick(0.1);
        assert_eq!(concrete.borrow().values[0].scale, 1.0);
    }
}
