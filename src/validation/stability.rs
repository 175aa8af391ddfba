//! Check 5: sample the field over time and look for numerical trouble.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::{IssueType, Parameter, Severity, ValidationIssue, ValidationResult};
use crate::params::{WaveLayer, WaveMatrixSettings};
use crate::wave::raw_wave_height;

/// Score deducted per artifact finding
const ARTIFACT_PENALTY: f32 = 0.2;

/// Sampling window for the stability simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub duration_s: f32,
    pub samples: usize,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            duration_s: 10.0,
            samples: 100,
        }
    }
}

/// Outcome of the stability simulation
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityReport {
    /// Some sample was NaN or infinite
    pub numerical_issues_detected: bool,
    /// Deviation bound exceeded or a frequency above the Nyquist limit
    pub artifacts_detected: bool,
    /// Largest |height| seen across all samples
    pub max_deviation: f32,
    pub samples_evaluated: usize,
    pub stability_score: f32,
    pub result: ValidationResult,
}

/// Flat positions of corners and centre, computed without guarding so
/// broken spacing shows up as non-finite samples.
fn representative_points(settings: &WaveMatrixSettings) -> Vec<Vec2> {
    let (w, h) = (settings.grid_width, settings.grid_height);
    if w == 0 || h == 0 {
        return vec![Vec2::ZERO];
    }
    let half = settings.half_extent();
    let spacing = settings.cell_spacing;
    let cell = |col: usize, row: usize| {
        Vec2::new(
            col as f32 * spacing - half.x,
            row as f32 * spacing - half.y,
        )
    };

    let mut cells = vec![(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1), (w / 2, h / 2)];
    cells.sort_unstable();
    cells.dedup();
    cells.into_iter().map(|(c, r)| cell(c, r)).collect()
}

/// Sample heights over `config.duration_s` and flag non-finite values,
/// excessive deviation and frequencies above the grid's Nyquist limit.
pub fn simulate_stability(
    settings: &WaveMatrixSettings,
    config: &StabilityConfig,
) -> StabilityReport {
    let points = representative_points(settings);
    let samples = config.samples.max(1);
    let step = if samples > 1 {
        config.duration_s / (samples - 1) as f32
    } else {
        0.0
    };

    let mut numerical_issues = false;
    let mut max_deviation = 0.0_f32;
    let mut evaluated = 0;

    for i in 0..samples {
        let t = i as f32 * step;
        for &point in &points {
            evaluated += 1;
            let height = raw_wave_height(point, t, settings);
            if !height.is_finite() || !point.is_finite() {
                numerical_issues = true;
                continue;
            }
            max_deviation = max_deviation.max(height.abs());
        }
    }

    let mut issues = Vec::new();
    if numerical_issues {
        issues.push(
            ValidationIssue::new(
                IssueType::SafetyViolation,
                Parameter::StabilitySimulation,
                Severity::Critical,
                f32::NAN,
                0.0,
                "NumericalIssuesDetected: non-finite wave values during simulation",
            )
            .with_suggestion("Fix the non-finite settings reported by the safety check"),
        );
    }

    let bound = 2.0 * settings.amplitude_envelope();
    if max_deviation > bound {
        issues.push(
            ValidationIssue::new(
                IssueType::StabilityRisk,
                Parameter::StabilitySimulation,
                Severity::Warning,
                max_deviation,
                bound,
                format!(
                    "ArtifactsDetected: deviation {:.3} exceeds 2x amplitude envelope {:.3}",
                    max_deviation, bound
                ),
            )
            .with_suggestion("Lower wave amplitudes"),
        );
    }

    let spacing = settings.cell_spacing;
    if spacing.is_finite() && spacing > 0.0 {
        let nyquist = 1.0 / (2.0 * spacing);
        for layer in WaveLayer::ALL {
            let frequency = settings.component(layer).frequency;
            let cycles_per_unit = frequency / TAU;
            if cycles_per_unit.is_finite() && cycles_per_unit > nyquist {
                let parameter = Parameter::Frequency(layer);
                let limit = nyquist * TAU;
                issues.push(
                    ValidationIssue::new(
                        IssueType::StabilityRisk,
                        parameter,
                        Severity::Warning,
                        frequency,
                        limit,
                        format!(
                            "ArtifactsDetected: {} = {} is above the Nyquist limit {:.3} for cell size {}",
                            parameter, frequency, limit, spacing
                        ),
                    )
                    .with_suggestion(format!("Lower {} to <= {:.3}", parameter, limit)),
                );
            }
        }
    }

    let artifacts = issues
        .iter()
        .filter(|issue| issue.issue_type == IssueType::StabilityRisk)
        .count();
    let stability_score = if numerical_issues {
        0.0
    } else {
        (1.0 - ARTIFACT_PENALTY * artifacts as f32).max(0.0)
    };

    log::debug!(
        "Stability simulation: {} samples, max deviation {:.3}, score {:.2}",
        evaluated,
        max_deviation,
        stability_score
    );

    StabilityReport {
        numerical_issues_detected: numerical_issues,
        artifacts_detected: artifacts > 0,
        max_deviation,
        samples_evaluated: evaluated,
        stability_score,
        result: ValidationResult::from_issues_with_score(issues, stability_score),
    }
}
