//! Parameter validation for wave matrix settings.
//!
//! Five independent checks (per-parameter bounds, grid capacity,
//! parameter interactions, safety bounds, stability simulation) each
//! produce a scored sub-result. `ParameterValidator::validate` merges them:
//! mean score, highest severity, concatenated issues. Findings are always
//! returned as data, nothing here panics or errors on bad settings.

mod checks;
mod corrections;
mod ranges;
mod report;
mod stability;
mod types;

use serde::{Deserialize, Serialize};

use crate::params::{WaveLayer, WaveMatrixSettings};

pub use checks::{
    bounded_values, check_bounds, check_safety, validate_parameter_bounds,
    validate_parameter_interactions, validate_safety_bounds, validate_safety_values,
};
pub use corrections::suggest_corrections;
pub use ranges::{
    estimated_memory_bytes, ParameterKind, ParameterRange, MAX_GRID_CELLS,
    MEMORY_BUDGET_BYTES, RECOMMENDED_MAX_BUBBLES, RECOMMENDED_MAX_GRID_CELLS,
    RECOMMENDED_MAX_GRID_DIMENSION,
};
pub use stability::{simulate_stability, StabilityConfig, StabilityReport};
pub use types::{IssueType, Parameter, Severity, ValidationIssue, ValidationResult};

/// What the settings will be asked to support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationContext {
    /// Bubbles the host intends to place on the grid
    pub expected_elements: Option<usize>,

    /// Frame budget in milliseconds (72 Hz headset ≈ 13.9 ms)
    pub target_frame_ms: f32,

    pub stability: StabilityConfig,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            expected_elements: None,
            target_frame_ms: 1000.0 / 72.0,
            stability: StabilityConfig::default(),
        }
    }
}

impl ValidationContext {
    pub fn with_expected_elements(mut self, count: usize) -> Self {
        self.expected_elements = Some(count);
        self
    }
}

/// Stateless validator bound to a `ValidationContext`
#[derive(Debug, Clone, Default)]
pub struct ParameterValidator {
    context: ValidationContext,
}

impl ParameterValidator {
    pub fn new(context: ValidationContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Run all five checks and merge them
    pub fn validate(&self, settings: &WaveMatrixSettings) -> ValidationResult {
        let parts = vec![
            validate_parameter_bounds(&bounded_values(settings)),
            self.validate_grid_settings(
                (settings.grid_width, settings.grid_height),
                settings.cell_spacing,
                self.context.expected_elements.unwrap_or(0),
            ),
            validate_parameter_interactions(settings),
            validate_safety_bounds(settings),
            self.simulate_stability(settings).result,
        ];
        let result = ValidationResult::merge(parts);
        log::debug!(
            "Validated settings: valid={} severity={} score={:.2} issues={}",
            result.is_valid,
            result.severity,
            result.score,
            result.issues.len()
        );
        result
    }

    /// Bounds and safety for a single primary wave layer plus cell size
    pub fn validate_wave_parameters(
        &self,
        amplitude: f32,
        frequency: f32,
        speed: f32,
        cell_size: f32,
    ) -> ValidationResult {
        let layer = WaveLayer::Primary;
        let values = [
            (Parameter::Amplitude(layer), amplitude),
            (Parameter::Frequency(layer), frequency),
            (Parameter::Speed(layer), speed),
            (Parameter::CellSize, cell_size),
        ];
        ValidationResult::merge(vec![
            validate_parameter_bounds(&values),
            validate_safety_values(&values),
        ])
    }

    pub fn validate_grid_settings(
        &self,
        grid_size: (usize, usize),
        cell_size: f32,
        bubble_count: usize,
    ) -> ValidationResult {
        checks::validate_grid_settings(
            grid_size.0,
            grid_size.1,
            cell_size,
            bubble_count,
            self.context.target_frame_ms,
        )
    }

    pub fn validate_parameter_interactions(&self, settings: &WaveMatrixSettings) -> ValidationResult {
        validate_parameter_interactions(settings)
    }

    pub fn validate_safety_bounds(&self, settings: &WaveMatrixSettings) -> ValidationResult {
        validate_safety_bounds(settings)
    }

    pub fn simulate_stability(&self, settings: &WaveMatrixSettings) -> StabilityReport {
        simulate_stability(settings, &self.context.stability)
    }

    /// Settings with every Warning-or-above finding clamped into range
    pub fn suggest_corrections(
        &self,
        settings: &WaveMatrixSettings,
        result: &ValidationResult,
    ) -> WaveMatrixSettings {
        suggest_corrections(settings, result, self.context.expected_elements)
    }

    pub fn recommended_range(&self, kind: ParameterKind) -> ParameterRange {
        kind.recommended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ParameterValidator {
        ParameterValidator::default()
    }

    #[test]
    fn test_presets_validate_clean() {
        for settings in [
            WaveMatrixSettings::default(),
            WaveMatrixSettings::calm(),
            WaveMatrixSettings::dynamic(),
        ] {
            let result = validator().validate(&settings);
            assert!(result.is_valid, "{}", result.report);
            assert_eq!(result.severity, Severity::None, "{}", result.report);
            assert_eq!(result.score, 1.0);
        }
    }

    #[test]
    fn test_zero_amplitude_scenario() {
        let result = validator().validate_wave_parameters(0.0, 2.0, 1.5, 1.0);
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.parameter_name(), "WaveAmplitude");
        assert_eq!(issue.issue_type, IssueType::StabilityRisk);
    }

    #[test]
    fn test_bubble_overflow_scenario() {
        let result = validator().validate_grid_settings((10, 10), 1.0, 150);
        assert!(!result.is_valid);
        assert!(result.has_issue("BubbleCount", IssueType::ParameterConflict));
    }

    #[test]
    fn test_nan_frequency_is_rejected() {
        let mut settings = WaveMatrixSettings::default();
        settings.primary.frequency = f32::NAN;

        let safety = validator().validate_safety_bounds(&settings);
        assert_eq!(safety.severity, Severity::Critical);
        assert_eq!(safety.score, 0.0);

        let full = validator().validate(&settings);
        assert!(!full.is_valid);
        assert_eq!(full.score, 0.0);
    }

    #[test]
    fn test_score_never_rises_with_amplitude() {
        let validator = validator();
        let mut previous = f32::INFINITY;
        let mut amplitude = 1.0_f32;
        while amplitude <= 50.0 {
            let settings = WaveMatrixSettings {
                primary: crate::params::WaveComponent {
                    amplitude,
                    ..WaveMatrixSettings::default().primary
                },
                ..Default::default()
            };
            let score = validator.validate(&settings).score;
            assert!(
                score <= previous + 1e-6,
                "score rose from {} to {} at amplitude {}",
                previous,
                score,
                amplitude
            );
            previous = score;
            amplitude += 0.5;
        }
    }

    #[test]
    fn test_extreme_amplitude_is_invalid() {
        let mut settings = WaveMatrixSettings::default();
        settings.primary.amplitude = 100.0;
        let result = validator().validate(&settings);
        assert!(!result.is_valid);
        assert!(result.issues_for("WaveAmplitude").any(|issue| {
            issue.severity >= Severity::Error
                && matches!(
                    issue.issue_type,
                    IssueType::StabilityRisk | IssueType::SafetyViolation
                )
        }));
    }

    #[test]
    fn test_corrections_make_settings_valid() {
        let validator = ParameterValidator::new(ValidationContext::default().with_expected_elements(150));
        let broken = WaveMatrixSettings {
            grid_width: 10,
            grid_height: 10,
            cell_spacing: 25.0,
            time_scale: f32::NAN,
            primary: crate::params::WaveComponent::new(100.0, f32::INFINITY, -2.0),
            secondary: crate::params::WaveComponent::new(-1.0, 0.0, 40.0),
            ..Default::default()
        };

        let result = validator.validate(&broken);
        assert!(!result.is_valid);

        let fixed = validator.suggest_corrections(&broken, &result);
        let revalidated = validator.validate(&fixed);
        assert!(revalidated.is_valid, "{}", revalidated.report);
        assert!(fixed.total_cells() >= 150);
    }

    #[test]
    fn test_corrections_are_idempotent() {
        let validator = validator();
        let mut settings = WaveMatrixSettings::default();
        settings.primary.amplitude = 30.0;
        settings.tertiary.frequency = 2.5;

        let once = validator.suggest_corrections(&settings, &validator.validate(&settings));
        let twice = validator.suggest_corrections(&once, &validator.validate(&once));
        assert_eq!(once, twice);
        assert!(validator.validate(&once).is_valid);
        assert_eq!(once.primary.amplitude, 2.0);
    }

    #[test]
    fn test_corrections_shrink_oversized_grid() {
        let validator = validator();
        let settings = WaveMatrixSettings {
            grid_width: 200,
            grid_height: 120,
            ..Default::default()
        };
        let result = validator.validate(&settings);
        assert!(!result.is_valid);

        let fixed = validator.suggest_corrections(&settings, &result);
        assert_eq!((fixed.grid_width, fixed.grid_height), (50, 50));
        assert!(validator.validate(&fixed).is_valid);
    }

    #[test]
    fn test_corrections_grow_grid_past_recommended_cells() {
        let validator = ParameterValidator::new(ValidationContext::default().with_expected_elements(3000));
        let settings = WaveMatrixSettings::default();
        let result = validator.validate(&settings);
        assert!(result.has_issue("BubbleCount", IssueType::ParameterConflict));

        let fixed = validator.suggest_corrections(&settings, &result);
        assert_eq!((fixed.grid_width, fixed.grid_height), (55, 55));
        let revalidated = validator.validate(&fixed);
        assert!(revalidated.is_valid, "{}", revalidated.report);

        let again = validator.suggest_corrections(&fixed, &revalidated);
        assert_eq!(again, fixed);
    }

    #[test]
    fn test_grid_shrink_keeps_room_for_elements() {
        // 60x60 draws a GridSize warning; clamping to 50x50 alone would not hold 3000
        let validator = ParameterValidator::new(ValidationContext::default().with_expected_elements(3000));
        let settings = WaveMatrixSettings {
            grid_width: 60,
            grid_height: 60,
            ..Default::default()
        };
        let fixed = validator.suggest_corrections(&settings, &validator.validate(&settings));
        assert!(fixed.total_cells() >= 3000);
        assert!(validator.validate(&fixed).is_valid);
    }

    #[test]
    fn test_elements_beyond_cell_cap_stay_invalid() {
        let validator = ParameterValidator::new(ValidationContext::default().with_expected_elements(12_000));
        let settings = WaveMatrixSettings::default();
        let result = validator.validate(&settings);
        let conflict = result
            .issues_for("BubbleCount")
            .find(|issue| issue.issue_type == IssueType::ParameterConflict)
            .unwrap();
        assert!(conflict
            .suggestion
            .as_deref()
            .unwrap()
            .contains("Reduce bubbles to <= 10000"));

        let fixed = validator.suggest_corrections(&settings, &result);
        assert_eq!(fixed.total_cells(), MAX_GRID_CELLS);
        let revalidated = validator.validate(&fixed);
        assert!(!revalidated.is_valid);
        assert!(revalidated.has_issue("BubbleCount", IssueType::ParameterConflict));
    }

    #[test]
    fn test_report_mentions_status() {
        let mut settings = WaveMatrixSettings::default();
        settings.primary.amplitude = 0.0;
        let result = validator().validate(&settings);
        assert!(result.report.contains("INVALID"));
        assert!(result.report.contains("WaveAmplitude"));
        assert!(!result.recommended_actions.is_empty());
    }
}
