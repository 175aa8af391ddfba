//! Independent validation checks. Each returns its own scored sub-result.

use std::f32::consts::TAU;

use super::ranges::{
    estimated_memory_bytes, ParameterKind, ESTIMATED_NS_PER_POSITION, FRAME_BUDGET_SHARE,
    MAX_COMPLEXITY, MAX_GRID_CELLS, MAX_MOTION_INTENSITY, MEMORY_BUDGET_BYTES,
    MIN_CELLS_PER_WAVELENGTH, RECOMMENDED_MAX_BUBBLES, RECOMMENDED_MAX_GRID_CELLS,
    RECOMMENDED_MAX_GRID_DIMENSION,
};
use super::types::{IssueType, Parameter, Severity, ValidationIssue, ValidationResult};
use crate::params::{WaveLayer, WaveMatrixSettings};

pub(crate) fn parameter_kind(parameter: Parameter) -> Option<ParameterKind> {
    match parameter {
        Parameter::Amplitude(_) => Some(ParameterKind::Amplitude),
        Parameter::Frequency(_) => Some(ParameterKind::Frequency),
        Parameter::Speed(_) => Some(ParameterKind::Speed),
        Parameter::CellSize => Some(ParameterKind::CellSize),
        _ => None,
    }
}

/// Per-parameter values of a settings object that have published bounds
pub fn bounded_values(settings: &WaveMatrixSettings) -> Vec<(Parameter, f32)> {
    let mut values = Vec::with_capacity(10);
    for layer in WaveLayer::ALL {
        let component = settings.component(layer);
        values.push((Parameter::Amplitude(layer), component.amplitude));
        values.push((Parameter::Frequency(layer), component.frequency));
        values.push((Parameter::Speed(layer), component.speed));
    }
    values.push((Parameter::CellSize, settings.cell_spacing));
    values
}

/// True when the safety check owns this value (non-finite or non-positive)
fn owned_by_safety(kind: ParameterKind, value: f32) -> bool {
    !value.is_finite() || value < 0.0 || (value == 0.0 && !kind.allows_zero())
}

/// Bounds check for one value.
///
/// Below the hard minimum: Warning while still positive, Error at zero.
/// Above the hard maximum: Warning up to twice the maximum, Error beyond.
/// Inside the hard bounds but outside the recommended range: Info.
pub fn check_bounds(parameter: Parameter, value: f32) -> Option<ValidationIssue> {
    let kind = parameter_kind(parameter)?;
    if owned_by_safety(kind, value) {
        return None;
    }
    let hard = kind.hard_bounds();
    let recommended = kind.recommended();
    let target = recommended.clamp(value);
    let name = parameter.name();

    let issue = if value < hard.min {
        let severity = if value <= 0.0 {
            Severity::Error
        } else {
            Severity::Warning
        };
        ValidationIssue::new(
            IssueType::StabilityRisk,
            parameter,
            severity,
            value,
            target,
            format!(
                "{} = {} is below the minimum {}; the field degenerates",
                name, value, hard.min
            ),
        )
    } else if value > hard.max {
        let severity = if value > hard.max * 2.0 {
            Severity::Error
        } else {
            Severity::Warning
        };
        let issue_type = if kind == ParameterKind::CellSize {
            IssueType::PerformanceImpact
        } else {
            IssueType::StabilityRisk
        };
        ValidationIssue::new(
            issue_type,
            parameter,
            severity,
            value,
            target,
            format!("{} = {} exceeds the maximum {}", name, value, hard.max),
        )
    } else if !recommended.contains(value) {
        ValidationIssue::new(
            IssueType::Advisory,
            parameter,
            Severity::Info,
            value,
            target,
            format!(
                "{} = {} is outside the recommended range [{}, {}]",
                name, value, recommended.min, recommended.max
            ),
        )
    } else {
        return None;
    };

    Some(issue.with_suggestion(format!("Set {} to {}", name, target)))
}

/// Safety check for one value: non-finite is Critical, sign errors are Error
pub fn check_safety(parameter: Parameter, value: f32) -> Option<ValidationIssue> {
    let name = parameter.name();
    if !value.is_finite() {
        return Some(
            ValidationIssue::new(
                IssueType::SafetyViolation,
                parameter,
                Severity::Critical,
                value,
                safe_fallback(parameter),
                format!("{} is {}, the wave maths cannot be evaluated", name, value),
            )
            .with_suggestion(format!("Replace {} with a finite value", name)),
        );
    }

    let (must_be_positive, must_be_non_negative) = match parameter {
        Parameter::Amplitude(_) | Parameter::InterferenceAmplitude => (false, true),
        Parameter::Frequency(_) | Parameter::Speed(_) | Parameter::CellSize => (true, false),
        Parameter::TimeScale => (true, false),
        _ => (false, false),
    };

    let violated = (must_be_positive && value <= 0.0) || (must_be_non_negative && value < 0.0);
    if !violated {
        return None;
    }
    let requirement = if must_be_positive {
        "positive"
    } else {
        "non-negative"
    };
    Some(
        ValidationIssue::new(
            IssueType::SafetyViolation,
            parameter,
            Severity::Error,
            value,
            safe_fallback(parameter),
            format!("{} = {} must be {}", name, value, requirement),
        )
        .with_suggestion(format!("Set {} to {}", name, safe_fallback(parameter))),
    )
}

/// Value proposed when the current one is unusable
fn safe_fallback(parameter: Parameter) -> f32 {
    let defaults = WaveMatrixSettings::default();
    match parameter {
        Parameter::Amplitude(layer) => defaults.component(layer).amplitude,
        Parameter::Frequency(layer) => defaults.component(layer).frequency,
        Parameter::Speed(layer) => defaults.component(layer).speed,
        Parameter::CellSize => defaults.cell_spacing,
        Parameter::TimeScale => defaults.time_scale,
        Parameter::AiDistanceScale => defaults.ai_distance_scale,
        Parameter::InterferenceAmplitude => defaults.interference_amplitude,
        Parameter::InterferenceFrequency => defaults.interference_frequency,
        _ => 0.0,
    }
}

/// Check 1: per-parameter bounds
pub fn validate_parameter_bounds(values: &[(Parameter, f32)]) -> ValidationResult {
    let issues = values
        .iter()
        .filter_map(|&(parameter, value)| check_bounds(parameter, value))
        .collect();
    ValidationResult::from_issues(issues)
}

/// Check 4 over explicit values
pub fn validate_safety_values(values: &[(Parameter, f32)]) -> ValidationResult {
    let issues = values
        .iter()
        .filter_map(|&(parameter, value)| check_safety(parameter, value))
        .collect();
    ValidationResult::from_issues(issues)
}

/// Check 4: NaN/Infinity and sign violations across every numeric setting
pub fn validate_safety_bounds(settings: &WaveMatrixSettings) -> ValidationResult {
    let mut values = bounded_values(settings);
    values.push((Parameter::TimeScale, settings.time_scale));
    values.push((Parameter::AiDistanceScale, settings.ai_distance_scale));
    if settings.interference_enabled {
        values.push((
            Parameter::InterferenceAmplitude,
            settings.interference_amplitude,
        ));
        values.push((
            Parameter::InterferenceFrequency,
            settings.interference_frequency,
        ));
    }
    validate_safety_values(&values)
}

/// Check 2: grid capacity, bubble count, memory and frame cost.
///
/// `bubble_count` of 0 means no expected count is known.
pub fn validate_grid_settings(
    grid_width: usize,
    grid_height: usize,
    cell_size: f32,
    bubble_count: usize,
    target_frame_ms: f32,
) -> ValidationResult {
    let mut issues = Vec::new();
    let cells = grid_width.saturating_mul(grid_height);
    let side_limit = RECOMMENDED_MAX_GRID_DIMENSION;

    if cells == 0 {
        issues.push(
            ValidationIssue::new(
                IssueType::ParameterConflict,
                Parameter::GridSize,
                Severity::Error,
                0.0,
                1.0,
                format!("Grid {}x{} has no cells", grid_width, grid_height),
            )
            .with_suggestion("Use at least a 1x1 grid"),
        );
    } else if cells > MAX_GRID_CELLS {
        issues.push(
            ValidationIssue::new(
                IssueType::PerformanceImpact,
                Parameter::GridSize,
                Severity::Error,
                cells as f32,
                RECOMMENDED_MAX_GRID_CELLS as f32,
                format!(
                    "Grid {}x{} = {} cells exceeds the hard cap of {}",
                    grid_width, grid_height, cells, MAX_GRID_CELLS
                ),
            )
            .with_suggestion(format!("Reduce grid to <= {}x{}", side_limit, side_limit)),
        );
    } else if cells > RECOMMENDED_MAX_GRID_CELLS {
        issues.push(
            ValidationIssue::new(
                IssueType::PerformanceImpact,
                Parameter::GridSize,
                Severity::Warning,
                cells as f32,
                RECOMMENDED_MAX_GRID_CELLS as f32,
                format!(
                    "Grid {}x{} = {} cells is above the recommended {}",
                    grid_width, grid_height, cells, RECOMMENDED_MAX_GRID_CELLS
                ),
            )
            .with_suggestion(format!("Reduce grid to <= {}x{}", side_limit, side_limit)),
        );
    }

    if bubble_count > cells {
        let side = (bubble_count as f32).sqrt().ceil() as usize;
        let suggestion = if bubble_count > MAX_GRID_CELLS {
            format!(
                "Reduce bubbles to <= {}; no grid within the {}-cell cap holds {}",
                MAX_GRID_CELLS, MAX_GRID_CELLS, bubble_count
            )
        } else {
            format!(
                "Grow grid to at least {}x{} or reduce bubbles to {}",
                side, side, cells
            )
        };
        issues.push(
            ValidationIssue::new(
                IssueType::ParameterConflict,
                Parameter::BubbleCount,
                Severity::Error,
                bubble_count as f32,
                cells as f32,
                format!(
                    "{} bubbles do not fit in {} grid cells",
                    bubble_count, cells
                ),
            )
            .with_suggestion(suggestion),
        );
    }
    if bubble_count > RECOMMENDED_MAX_BUBBLES {
        issues.push(
            ValidationIssue::new(
                IssueType::PerformanceImpact,
                Parameter::BubbleCount,
                Severity::Warning,
                bubble_count as f32,
                RECOMMENDED_MAX_BUBBLES as f32,
                format!(
                    "{} bubbles is above the recommended {}",
                    bubble_count, RECOMMENDED_MAX_BUBBLES
                ),
            )
            .with_suggestion(format!("Reduce bubbles to <= {}", RECOMMENDED_MAX_BUBBLES)),
        );
    }

    let memory = estimated_memory_bytes(cells, bubble_count);
    if memory > MEMORY_BUDGET_BYTES {
        issues.push(
            ValidationIssue::new(
                IssueType::PerformanceImpact,
                Parameter::MemoryUsage,
                Severity::Error,
                memory as f32,
                MEMORY_BUDGET_BYTES as f32,
                format!(
                    "Estimated {:.1} MB exceeds the {} MB budget",
                    memory as f32 / (1024.0 * 1024.0),
                    MEMORY_BUDGET_BYTES / (1024 * 1024)
                ),
            )
            .with_suggestion(format!("Reduce grid to <= {}x{}", side_limit, side_limit)),
        );
    }

    if target_frame_ms.is_finite() && target_frame_ms > 0.0 {
        let evaluated = if bubble_count > 0 { bubble_count } else { cells };
        let cost_ms = evaluated as f32 * ESTIMATED_NS_PER_POSITION / 1_000_000.0;
        let budget_ms = target_frame_ms * FRAME_BUDGET_SHARE;
        if cost_ms > budget_ms {
            let parameter = if bubble_count > 0 {
                Parameter::BubbleCount
            } else {
                Parameter::GridSize
            };
            let affordable = (budget_ms * 1_000_000.0 / ESTIMATED_NS_PER_POSITION) as usize;
            issues.push(
                ValidationIssue::new(
                    IssueType::PerformanceImpact,
                    parameter,
                    Severity::Warning,
                    evaluated as f32,
                    affordable as f32,
                    format!(
                        "Updating {} positions costs ~{:.2} ms, over {:.2} ms of a {:.1} ms frame",
                        evaluated, cost_ms, budget_ms, target_frame_ms
                    ),
                )
                .with_suggestion(format!("Keep updated positions <= {}", affordable)),
            );
        }
    }

    if cell_size.is_finite() && cell_size > 0.0 && !issues.is_empty() {
        log::debug!(
            "Grid check: {}x{} cells spanning {:.1}x{:.1} units, {} issues",
            grid_width,
            grid_height,
            grid_width as f32 * cell_size,
            grid_height as f32 * cell_size,
            issues.len()
        );
    }

    ValidationResult::from_issues(issues)
}

/// Check 3: anti-aliasing, motion comfort and complexity
pub fn validate_parameter_interactions(settings: &WaveMatrixSettings) -> ValidationResult {
    let mut issues = Vec::new();
    let spacing = settings.cell_spacing;
    let spacing_usable = spacing.is_finite() && spacing > 0.0;
    let cells = settings.total_cells() as f32;

    let mut frequencies: Vec<(Parameter, f32)> = WaveLayer::ALL
        .iter()
        .map(|&layer| (Parameter::Frequency(layer), settings.component(layer).frequency))
        .collect();
    if settings.interference_enabled {
        frequencies.push((
            Parameter::InterferenceFrequency,
            settings.interference_frequency,
        ));
    }

    for &(parameter, frequency) in &frequencies {
        if !spacing_usable || !frequency.is_finite() || frequency <= 0.0 {
            continue;
        }
        let cells_per_wavelength = (TAU / frequency) / spacing;
        if cells_per_wavelength < MIN_CELLS_PER_WAVELENGTH {
            let max_frequency = TAU / (MIN_CELLS_PER_WAVELENGTH * spacing);
            issues.push(
                ValidationIssue::new(
                    IssueType::StabilityRisk,
                    parameter,
                    Severity::Warning,
                    frequency,
                    max_frequency,
                    format!(
                        "{} gives {:.2} cells per wavelength (< {}): insufficient resolution, aliasing risk",
                        parameter, cells_per_wavelength, MIN_CELLS_PER_WAVELENGTH
                    ),
                )
                .with_suggestion(format!(
                    "Lower {} to <= {:.3} or shrink cell size",
                    parameter, max_frequency
                )),
            );
        }
    }

    for layer in WaveLayer::ALL {
        let component = settings.component(layer);
        if !component.is_finite() {
            continue;
        }
        let intensity = component.amplitude.abs() * component.speed.abs();
        if intensity > MAX_MOTION_INTENSITY {
            let parameter = Parameter::Amplitude(layer);
            let target = if component.speed.abs() > 0.0 {
                MAX_MOTION_INTENSITY / component.speed.abs()
            } else {
                component.amplitude
            };
            issues.push(
                ValidationIssue::new(
                    IssueType::StabilityRisk,
                    parameter,
                    Severity::Warning,
                    component.amplitude,
                    target,
                    format!(
                        "{} x speed = {:.2} exceeds {}: risk of motion discomfort",
                        parameter, intensity, MAX_MOTION_INTENSITY
                    ),
                )
                .with_suggestion(format!("Lower {} to <= {:.3}", parameter, target)),
            );
        }
    }

    let max_frequency = frequencies
        .iter()
        .map(|&(_, f)| f)
        .filter(|f| f.is_finite())
        .fold(0.0_f32, f32::max);
    let complexity = cells * max_frequency;
    if complexity > MAX_COMPLEXITY {
        issues.push(
            ValidationIssue::new(
                IssueType::PerformanceImpact,
                Parameter::GridSize,
                Severity::Warning,
                complexity,
                MAX_COMPLEXITY,
                format!(
                    "cells x frequency = {:.0} exceeds {}",
                    complexity, MAX_COMPLEXITY
                ),
            )
            .with_suggestion("Reduce grid size or the highest wave frequency"),
        );
    }

    ValidationResult::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMP: Parameter = Parameter::Amplitude(WaveLayer::Primary);
    const FREQ: Parameter = Parameter::Frequency(WaveLayer::Primary);

    #[test]
    fn test_bounds_zero_amplitude_is_error() {
        let issue = check_bounds(AMP, 0.0).unwrap();
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.issue_type, IssueType::StabilityRisk);
        assert_eq!(issue.recommended_value, 0.1);
    }

    #[test]
    fn test_bounds_degrees() {
        assert_eq!(check_bounds(AMP, 0.0005).unwrap().severity, Severity::Warning);
        assert!(check_bounds(AMP, 1.0).is_none());
        assert_eq!(check_bounds(AMP, 3.0).unwrap().severity, Severity::Info);
        assert_eq!(check_bounds(AMP, 15.0).unwrap().severity, Severity::Warning);
        assert_eq!(check_bounds(AMP, 100.0).unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_bounds_skips_values_owned_by_safety() {
        assert!(check_bounds(AMP, -1.0).is_none());
        assert!(check_bounds(FREQ, 0.0).is_none());
        assert!(check_bounds(FREQ, f32::NAN).is_none());
    }

    #[test]
    fn test_safety_nan_is_critical() {
        let result = validate_safety_values(&[(FREQ, f32::NAN)]);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.score, 0.0);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_safety_sign_violations() {
        assert_eq!(check_safety(AMP, -0.5).unwrap().severity, Severity::Error);
        assert!(check_safety(AMP, 0.0).is_none());
        assert_eq!(check_safety(FREQ, 0.0).unwrap().severity, Severity::Error);
        assert_eq!(
            check_safety(Parameter::CellSize, -1.0).unwrap().severity,
            Severity::Error
        );
        assert_eq!(
            check_safety(Parameter::TimeScale, f32::INFINITY).unwrap().severity,
            Severity::Critical
        );
    }

    #[test]
    fn test_safety_bounds_on_settings() {
        let mut settings = WaveMatrixSettings::default();
        assert!(validate_safety_bounds(&settings).issues.is_empty());

        settings.primary.frequency = f32::NAN;
        let result = validate_safety_bounds(&settings);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.score, 0.0);
        assert!(result.has_issue("WaveFrequency", IssueType::SafetyViolation));
    }

    #[test]
    fn test_grid_bubble_conflict() {
        let result = validate_grid_settings(10, 10, 1.0, 150, 13.9);
        assert!(!result.is_valid);
        assert!(result.has_issue("BubbleCount", IssueType::ParameterConflict));
    }

    #[test]
    fn test_grid_caps() {
        let warn = validate_grid_settings(60, 60, 1.0, 0, 13.9);
        assert!(warn.is_valid);
        assert!(warn.has_issue("GridSize", IssueType::PerformanceImpact));

        let error = validate_grid_settings(200, 200, 1.0, 0, 13.9);
        assert!(!error.is_valid);
        assert_eq!(error.severity, Severity::Error);

        let empty = validate_grid_settings(0, 10, 1.0, 0, 13.9);
        assert!(empty.has_issue("GridSize", IssueType::ParameterConflict));
    }

    #[test]
    fn test_grid_memory_budget() {
        let result = validate_grid_settings(10, 10, 1.0, 700_000, 0.0);
        assert!(result.has_issue("MemoryUsage", IssueType::PerformanceImpact));
    }

    #[test]
    fn test_grid_frame_budget() {
        // 10,000 cells x 250ns = 2.5ms, over 10% of a 13.9ms frame
        let result = validate_grid_settings(100, 100, 1.0, 0, 13.9);
        assert!(result
            .issues_for("GridSize")
            .any(|issue| issue.description.contains("ms frame")));
    }

    #[test]
    fn test_defaults_have_no_interaction_issues() {
        for settings in [
            WaveMatrixSettings::default(),
            WaveMatrixSettings::calm(),
            WaveMatrixSettings::dynamic(),
        ] {
            let result = validate_parameter_interactions(&settings);
            assert!(result.issues.is_empty(), "{}", result.report);
        }
    }

    #[test]
    fn test_aliasing_warning() {
        let mut settings = WaveMatrixSettings::default();
        settings.primary.frequency = 2.0; // 2π/2 / 1.5 ≈ 2.09 cells per wavelength
        let result = validate_parameter_interactions(&settings);
        assert!(result.has_issue("WaveFrequency", IssueType::StabilityRisk));
        assert!(result.is_valid);
    }

    #[test]
    fn test_motion_comfort_warning() {
        let mut settings = WaveMatrixSettings::default();
        settings.primary.amplitude = 3.0;
        settings.primary.speed = 2.0;
        let result = validate_parameter_interactions(&settings);
        let issue = result.issues_for("WaveAmplitude").next().unwrap();
        assert!(issue.description.contains("motion discomfort"));
        assert!((issue.recommended_value - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_complexity_warning() {
        let settings = WaveMatrixSettings {
            grid_width: 100,
            grid_height: 100,
            cell_spacing: 0.1,
            primary: crate::params::WaveComponent::new(0.5, 6.0, 1.0),
            ..Default::default()
        };
        let result = validate_parameter_interactions(&settings);
        assert!(result.has_issue("GridSize", IssueType::PerformanceImpact));
    }
}
