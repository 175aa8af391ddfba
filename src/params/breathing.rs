//! Breathing animation parameters (scale/opacity oscillation).

use serde::{Deserialize, Serialize};

/// Global breathing configuration shared by every registered element.
///
/// Replaced wholesale through `BreathingEngine::update_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingSettings {
    /// Multiplier applied to host delta time
    pub global_time_scale: f32,

    /// Dominant breath rate (Hz)
    pub primary_frequency_hz: f32,
    pub primary_amplitude: f32,

    /// Faster flutter layered over the main breath (Hz)
    pub secondary_frequency_hz: f32,
    pub secondary_amplitude: f32,

    /// Slow drift layer (Hz)
    pub tertiary_frequency_hz: f32,
    pub tertiary_amplitude: f32,

    /// Exponent applied to the normalised wave (> 1 lengthens the exhale)
    pub breathing_curve: f32,

    pub min_scale: f32,
    pub max_scale: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,

    /// Used when an element registers without its own config
    pub default_scale_intensity: f32,
    pub default_opacity_intensity: f32,
    pub default_base_opacity: f32,

    /// Registry capacity
    pub max_elements: usize,

    /// Rate at which values are pushed to elements (Hz), independent of host rate
    pub update_rate_hz: f32,
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self {
            global_time_scale: 1.0,
            primary_frequency_hz: 0.25, // one breath every 4s
            primary_amplitude: 0.6,
            secondary_frequency_hz: 0.4,
            secondary_amplitude: 0.25,
            tertiary_frequency_hz: 0.1,
            tertiary_amplitude: 0.15,
            breathing_curve: 1.5,
            min_scale: 0.8,
            max_scale: 1.3,
            min_opacity: 0.6,
            max_opacity: 1.0,
            default_scale_intensity: 0.15,
            default_opacity_intensity: 0.2,
            default_base_opacity: 0.8,
            max_elements: 100,
            update_rate_hz: 15.0,
        }
    }
}

impl BreathingSettings {
    /// Slow, subtle breathing
    pub fn calm() -> Self {
        Self {
            global_time_scale: 0.7,
            primary_frequency_hz: 0.15,
            secondary_frequency_hz: 0.3,
            breathing_curve: 1.8,
            default_scale_intensity: 0.08,
            default_opacity_intensity: 0.1,
            ..Self::default()
        }
    }

    /// Quicker, deeper breathing
    pub fn energetic() -> Self {
        Self {
            global_time_scale: 1.3,
            primary_frequency_hz: 0.4,
            secondary_frequency_hz: 0.7,
            tertiary_frequency_hz: 0.2,
            breathing_curve: 1.2,
            default_scale_intensity: 0.25,
            default_opacity_intensity: 0.3,
            ..Self::default()
        }
    }

    /// Copy with every field forced into a usable range.
    ///
    /// Swaps inverted clamp pairs, replaces non-finite values with defaults
    /// and keeps the curve exponent and update rate positive.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        let mut s = self.clone();
        s.global_time_scale = finite_or(s.global_time_scale, defaults.global_time_scale);
        s.primary_frequency_hz = finite_or(s.primary_frequency_hz, defaults.primary_frequency_hz);
        s.primary_amplitude = finite_or(s.primary_amplitude, defaults.primary_amplitude);
        s.secondary_frequency_hz =
            finite_or(s.secondary_frequency_hz, defaults.secondary_frequency_hz);
        s.secondary_amplitude = finite_or(s.secondary_amplitude, defaults.secondary_amplitude);
        s.tertiary_frequency_hz = finite_or(s.tertiary_frequency_hz, defaults.tertiary_frequency_hz);
        s.tertiary_amplitude = finite_or(s.tertiary_amplitude, defaults.tertiary_amplitude);

        s.breathing_curve = finite_or(s.breathing_curve, defaults.breathing_curve);
        if s.breathing_curve <= 0.0 {
            s.breathing_curve = defaults.breathing_curve;
        }

        s.min_scale = finite_or(s.min_scale, defaults.min_scale);
        s.max_scale = finite_or(s.max_scale, defaults.max_scale);
        if s.min_scale > s.max_scale {
            std::mem::swap(&mut s.min_scale, &mut s.max_scale);
        }

        s.min_opacity = finite_or(s.min_opacity, defaults.min_opacity).clamp(0.0, 1.0);
        s.max_opacity = finite_or(s.max_opacity, defaults.max_opacity).clamp(0.0, 1.0);
        if s.min_opacity > s.max_opacity {
            std::mem::swap(&mut s.min_opacity, &mut s.max_opacity);
        }

        s.default_scale_intensity =
            finite_or(s.default_scale_intensity, defaults.default_scale_intensity);
        s.default_opacity_intensity =
            finite_or(s.default_opacity_intensity, defaults.default_opacity_intensity);
        s.default_base_opacity = finite_or(s.default_base_opacity, defaults.default_base_opacity);

        s.update_rate_hz = finite_or(s.update_rate_hz, defaults.update_rate_hz);
        if s.update_rate_hz <= 0.0 {
            s.update_rate_hz = defaults.update_rate_hz;
        }
        s
    }

    /// Seconds between value pushes
    pub fn update_interval_s(&self) -> f32 {
        1.0 / self.update_rate_hz
    }
}

/// Per-element overrides supplied at registration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathingElementConfig {
    pub scale_intensity: f32,
    pub opacity_intensity: f32,
    pub base_opacity: f32,
}

impl BreathingElementConfig {
    /// Config carrying the settings' default intensities
    pub fn from_settings(settings: &BreathingSettings) -> Self {
        Self {
            scale_intensity: settings.default_scale_intensity,
            opacity_intensity: settings.default_opacity_intensity,
            base_opacity: settings.default_base_opacity,
        }
    }
}
