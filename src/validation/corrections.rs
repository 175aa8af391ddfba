//! Deterministic corrections for Warning-or-above findings.

use super::checks::parameter_kind;
use super::ranges::{MAX_GRID_CELLS, RECOMMENDED_MAX_GRID_DIMENSION};
use super::types::{Parameter, Severity, ValidationResult};
use crate::params::WaveMatrixSettings;

/// Clamp every field flagged at Warning or above into the recommended range.
///
/// Non-finite values are first replaced by the default preset's value. A
/// grid too small for `expected_elements` grows to the smallest square that
/// holds them, within the hard cell cap. Applying the result of a second
/// validation changes nothing further.
pub fn suggest_corrections(
    settings: &WaveMatrixSettings,
    result: &ValidationResult,
    expected_elements: Option<usize>,
) -> WaveMatrixSettings {
    let defaults = WaveMatrixSettings::default();
    let mut fixed = settings.clone();
    let max_side = RECOMMENDED_MAX_GRID_DIMENSION;

    for issue in result
        .issues
        .iter()
        .filter(|issue| issue.severity >= Severity::Warning)
    {
        match issue.parameter {
            Parameter::Amplitude(layer) => {
                let fallback = defaults.component(layer).amplitude;
                let component = fixed.component_mut(layer);
                component.amplitude = clamp_recommended(issue.parameter, component.amplitude, fallback);
            }
            Parameter::Frequency(layer) => {
                let fallback = defaults.component(layer).frequency;
                let component = fixed.component_mut(layer);
                component.frequency = clamp_recommended(issue.parameter, component.frequency, fallback);
            }
            Parameter::Speed(layer) => {
                let fallback = defaults.component(layer).speed;
                let component = fixed.component_mut(layer);
                component.speed = clamp_recommended(issue.parameter, component.speed, fallback);
            }
            Parameter::CellSize => {
                fixed.cell_spacing =
                    clamp_recommended(issue.parameter, fixed.cell_spacing, defaults.cell_spacing);
            }
            Parameter::GridSize | Parameter::MemoryUsage => {
                fixed.grid_width = fixed.grid_width.clamp(1, max_side);
                fixed.grid_height = fixed.grid_height.clamp(1, max_side);
            }
            Parameter::TimeScale => {
                if !fixed.time_scale.is_finite() || fixed.time_scale <= 0.0 {
                    fixed.time_scale = defaults.time_scale;
                }
            }
            Parameter::AiDistanceScale => {
                if !fixed.ai_distance_scale.is_finite() {
                    fixed.ai_distance_scale = defaults.ai_distance_scale;
                }
            }
            Parameter::InterferenceAmplitude => {
                if !fixed.interference_amplitude.is_finite() || fixed.interference_amplitude < 0.0 {
                    fixed.interference_amplitude = defaults.interference_amplitude;
                }
            }
            Parameter::InterferenceFrequency => {
                let f = fixed.interference_frequency;
                if !f.is_finite() || f <= 0.0 {
                    fixed.interference_frequency = defaults.interference_frequency;
                } else if fixed.cell_spacing.is_finite() && fixed.cell_spacing > 0.0 {
                    fixed.interference_frequency = f.min(defaults.interference_frequency.max(
                        std::f32::consts::TAU / (4.0 * fixed.cell_spacing),
                    ));
                }
            }
            Parameter::BubbleCount | Parameter::StabilitySimulation => {}
        }
    }

    if let Some(count) = expected_elements {
        fit_elements(&mut fixed, count);
    }

    if fixed != *settings {
        log::info!("Suggested corrections changed {} flagged settings", changed_fields(settings, &fixed));
    }
    fixed
}

/// Grow the grid to the smallest square holding `count` when it is too small.
///
/// Runs after the per-issue clamps so a grid shrunk to 50x50 is regrown. A
/// square may exceed the recommended 2,500 cells (a Warning) but never the
/// hard cap; counts above the cap get the largest square and stay invalid.
fn fit_elements(fixed: &mut WaveMatrixSettings, count: usize) {
    if fixed.total_cells() >= count {
        return;
    }
    let cap_side = (MAX_GRID_CELLS as f32).sqrt() as usize;
    let side = ((count as f32).sqrt().ceil() as usize).max(1);
    if side > cap_side {
        log::warn!(
            "{} elements exceed the {}-cell grid cap; using {}x{}",
            count,
            MAX_GRID_CELLS,
            cap_side,
            cap_side
        );
    }
    let side = side.min(cap_side);
    fixed.grid_width = side;
    fixed.grid_height = side;
}

fn clamp_recommended(parameter: Parameter, value: f32, fallback: f32) -> f32 {
    let value = if value.is_finite() { value } else { fallback };
    match parameter_kind(parameter) {
        Some(kind) => kind.recommended().clamp(value),
        None => value,
    }
}

fn changed_fields(before: &WaveMatrixSettings, after: &WaveMatrixSettings) -> usize {
    let pairs = [
        (before.grid_width as f32, after.grid_width as f32),
        (before.grid_height as f32, after.grid_height as f32),
        (before.cell_spacing, after.cell_spacing),
        (before.time_scale, after.time_scale),
        (before.ai_distance_scale, after.ai_distance_scale),
        (before.primary.amplitude, after.primary.amplitude),
        (before.primary.frequency, after.primary.frequency),
        (before.primary.speed, after.primary.speed),
        (before.secondary.amplitude, after.secondary.amplitude),
        (before.secondary.frequency, after.secondary.frequency),
        (before.secondary.speed, after.secondary.speed),
        (before.tertiary.amplitude, after.tertiary.amplitude),
        (before.tertiary.frequency, after.tertiary.frequency),
        (before.tertiary.speed, after.tertiary.speed),
        (before.interference_frequency, after.interference_frequency),
        (before.interference_amplitude, after.interference_amplitude),
    ];
    pairs
        .iter()
        .filter(|(a, b)| a.to_bits() != b.to_bits())
        .count()
}
