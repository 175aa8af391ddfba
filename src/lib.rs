//! Bubblewave library - wave-driven bubble positioning core
//!
//! Maps grid cells to positions on a layered sinusoid surface, validates
//! the wave configuration, caches positions for a bounded set of bubbles,
//! and drives an independent breathing (scale/opacity) animation.

pub mod breathing;
pub mod cache;
pub mod cli;
pub mod error;
pub mod params;
pub mod provider;
pub mod validation;
pub mod wave;

pub use error::{Result, WaveError};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use crate::breathing::{BreathingEngine, BreathingReceiver, BreathingValue, ElementHandle};
    use crate::params::{BreathingSettings, Preset, SimulationConfig, WaveMatrixSettings};
    use crate::provider::WavePositionProvider;
    use crate::validation::{IssueType, ParameterValidator};
    use crate::wave::grid_position;

    #[test]
    fn test_grid_corner_scenario() {
        let settings = WaveMatrixSettings {
            grid_width: 8,
            grid_height: 8,
            cell_spacing: 1.5,
            ..Default::default()
        };
        let pos = grid_position(0, &settings);
        assert!(pos.abs_diff_eq(Vec3::new(-5.25, 0.0, -5.25), 1e-6));
    }

    #[test]
    fn test_validator_scenarios() {
        let validator = ParameterValidator::default();

        let amplitude = validator.validate_wave_parameters(0.0, 2.0, 1.5, 1.0);
        assert!(!amplitude.is_valid);
        assert_eq!(amplitude.issues.len(), 1);
        assert!(amplitude.has_issue("WaveAmplitude", IssueType::StabilityRisk));

        let grid = validator.validate_grid_settings((10, 10), 1.0, 150);
        assert!(!grid.is_valid);
        assert!(grid.has_issue("BubbleCount", IssueType::ParameterConflict));
    }

    #[derive(Default)]
    struct Bubble {
        last: Option<BreathingValue>,
    }

    impl BreathingReceiver for Bubble {
        fn apply_breathing(&mut self, value: BreathingValue) {
            self.last = Some(value);
        }
    }

    #[test]
    fn test_host_loop_drives_both_subsystems() {
        let config = SimulationConfig::from_preset(Preset::Dynamic);
        assert!(ParameterValidator::new(config.validation.clone())
            .validate(&config.wave)
            .is_valid);

        let mut provider = WavePositionProvider::from_config(&config);
        let mut breathing = BreathingEngine::with_seed(config.breathing.clone(), 11);
        let bubbles: Vec<Rc<RefCell<Bubble>>> =
            (0..5).map(|_| Rc::new(RefCell::new(Bubble::default()))).collect();
        for bubble in &bubbles {
            let handle: ElementHandle = bubble.clone();
            assert!(breathing.register(&handle, None).is_some());
        }

        for _ in 0..72 {
            provider.tick(1.0 / 72.0);
            breathing.tick(1.0 / 72.0);
        }

        assert!(provider.validate_positions().is_valid);
        assert!(provider.positions().iter().all(|p| p.is_finite()));

        let limits = BreathingSettings::energetic();
        for bubble in &bubbles {
            let value = bubble.borrow().last.expect("bubble received a breathing value");
            assert!(value.scale >= limits.min_scale && value.scale <= limits.max_scale);
            assert!(value.opacity >= limits.min_opacity && value.opacity <= limits.max_opacity);
        }
    }
}
