//! Per-element breathing state and the layered breathing curve.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use crate::params::{BreathingElementConfig, BreathingSettings};

/// Values pushed to a registered element each breathing update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingValue {
    /// Uniform scale multiplier
    pub scale: f32,
    pub opacity: f32,
    /// Primary-layer phase angle in `[0, 2π]`
    pub phase: f32,
}

/// Anything that can display a breathing value
pub trait BreathingReceiver {
    fn apply_breathing(&mut self, value: BreathingValue);
}

/// Shared handle the caller keeps alive; the engine only holds a weak reference
pub type ElementHandle = Rc<RefCell<dyn BreathingReceiver>>;

/// Registry key returned by `BreathingEngine::register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u64);

impl ElementId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Per-element parameters fixed at registration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementState {
    /// Seconds added to the engine clock, desynchronising elements
    pub phase_offset: f32,
    pub scale_intensity: f32,
    pub opacity_intensity: f32,
    pub base_opacity: f32,
}

impl ElementState {
    pub fn new(phase_offset: f32, config: BreathingElementConfig) -> Self {
        Self {
            phase_offset,
            scale_intensity: config.scale_intensity,
            opacity_intensity: config.opacity_intensity,
            base_opacity: config.base_opacity,
        }
    }
}

/// Breathing value of one element at engine time `time`.
///
/// Three sinusoids (frequencies in Hz) are summed, mapped to [0, 1], shaped
/// by `breathing_curve` and mapped back to [-1, 1] before scaling. Outputs
/// are always inside the settings' scale and opacity clamps.
pub fn compute_breathing(state: &ElementState, time: f32, settings: &BreathingSettings) -> BreathingValue {
    let personal = time + state.phase_offset;
    let primary_angle = personal * settings.primary_frequency_hz * TAU;

    let combined = settings.primary_amplitude * primary_angle.sin()
        + settings.secondary_amplitude * (personal * settings.secondary_frequency_hz * TAU).sin()
        + settings.tertiary_amplitude * (personal * settings.tertiary_frequency_hz * TAU).sin();

    // Layer amplitudes may sum past 1; keep powf on [0, 1]
    let normalised = ((combined + 1.0) * 0.5).clamp(0.0, 1.0);
    let shaped = normalised.powf(settings.breathing_curve) * 2.0 - 1.0;

    BreathingValue {
        scale: bounded(1.0 + shaped * state.scale_intensity, settings.min_scale, settings.max_scale),
        opacity: bounded(
            state.base_opacity + shaped * state.opacity_intensity,
            settings.min_opacity,
            settings.max_opacity,
        ),
        phase: primary_angle.rem_euclid(TAU),
    }
}

/// Like `f32::clamp` but never panics; NaN lands on `min`
fn bounded(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
