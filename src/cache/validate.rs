//! Sanity checks over a set of computed positions.

use glam::Vec3;

use crate::params::WaveMatrixSettings;

/// Positions beyond this count are a performance concern
const PERFORMANCE_CONCERN_COUNT: usize = 100;

/// Coarse cost of updating a position set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PerformanceImpact {
    None,
    Low,
    Medium,
    High,
}

impl PerformanceImpact {
    pub fn for_count(count: usize) -> Self {
        match count {
            0..=50 => PerformanceImpact::None,
            51..=100 => PerformanceImpact::Low,
            101..=200 => PerformanceImpact::Medium,
            _ => PerformanceImpact::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub out_of_bounds_indices: Vec<usize>,
    pub invalid_value_indices: Vec<usize>,
    pub performance_impact: PerformanceImpact,
}

/// Check every position for finiteness and plausible bounds.
///
/// X/Z must lie within the grid half-extent plus two cells (Z also allows
/// one unit of AI distance offset); |Y| within twice the amplitude envelope.
pub fn validate_positions(positions: &[Vec3], settings: &WaveMatrixSettings) -> PositionValidation {
    let half = settings.half_extent();
    let margin = 2.0 * settings.cell_spacing.abs();
    let x_limit = half.x + margin;
    let z_limit = half.y + margin + settings.ai_distance_scale.abs();
    let y_limit = 2.0 * settings.amplitude_envelope();

    let mut out_of_bounds = Vec::new();
    let mut invalid = Vec::new();
    for (index, pos) in positions.iter().enumerate() {
        if !pos.is_finite() {
            invalid.push(index);
        } else if pos.x.abs() > x_limit || pos.z.abs() > z_limit || pos.y.abs() > y_limit {
            out_of_bounds.push(index);
        }
    }

    let mut issues = Vec::new();
    if !invalid.is_empty() {
        issues.push(format!("{} positions contain NaN or infinite values", invalid.len()));
    }
    if !out_of_bounds.is_empty() {
        issues.push(format!(
            "{} positions outside bounds (|x| <= {:.2}, |y| <= {:.2}, |z| <= {:.2})",
            out_of_bounds.len(),
            x_limit,
            y_limit,
            z_limit
        ));
    }
    if positions.len() > PERFORMANCE_CONCERN_COUNT {
        issues.push(format!(
            "{} positions exceeds {}; consider fewer active bubbles",
            positions.len(),
            PERFORMANCE_CONCERN_COUNT
        ));
    }

    PositionValidation {
        is_valid: invalid.is_empty() && out_of_bounds.is_empty(),
        issues,
        out_of_bounds_indices: out_of_bounds,
        invalid_value_indices: invalid,
        performance_impact: PerformanceImpact::for_count(positions.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_nan_and_out_of_bounds() {
        let settings = WaveMatrixSettings::default();
        let positions = vec![
            Vec3::ZERO,
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0), // envelope 1.0, limit 2.0
        ];
        let report = validate_positions(&positions, &settings);
        assert!(!report.is_valid);
        assert_eq!(report.invalid_value_indices, vec![1]);
        assert_eq!(report.out_of_bounds_indices, vec![2, 3]);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_large_sets_flag_performance() {
        let settings = WaveMatrixSettings::default();
        let positions = vec![Vec3::ZERO; 150];
        let report = validate_positions(&positions, &settings);
        assert!(report.is_valid);
        assert_eq!(report.performance_impact, PerformanceImpact::Medium);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_impact_thresholds() {
        assert_eq!(PerformanceImpact::for_count(50), PerformanceImpact::None);
        assert_eq!(PerformanceImpact::for_count(100), PerformanceImpact::Low);
        assert_eq!(PerformanceImpact::for_count(201), PerformanceImpact::High);
    }
}
