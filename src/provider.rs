//! Per-frame orchestration of the wave field and position cache.

use glam::Vec3;

use crate::cache::{BatchPositionCalculator, BubbleData, CacheStats, PositionValidation};
use crate::params::{ProviderConfig, SimulationConfig, WaveMatrixSettings};
use crate::wave::WaveField;

/// What a single `tick` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Wave time after the tick
    pub time: f32,
    /// Cache entries recomputed this tick
    pub refreshed: usize,
    /// Whether the throttled full recompute ran
    pub full_update: bool,
}

/// Owns the single wave clock, the current settings and the position cache.
///
/// Time advances on every tick. All positions are recomputed at most
/// `update_rate_hz` times per second of host time; in between, only
/// entries marked dirty are refreshed.
#[derive(Debug)]
pub struct WavePositionProvider {
    settings: WaveMatrixSettings,
    calculator: BatchPositionCalculator<WaveField>,
    update_interval_s: f32,
    since_update_s: f32,
}

impl WavePositionProvider {
    pub fn new(settings: WaveMatrixSettings, config: &ProviderConfig) -> Self {
        let field = WaveField::with_settings(&settings);
        let calculator = BatchPositionCalculator::with_source(field, config.max_elements);
        let update_interval_s = if config.update_rate_hz.is_finite() && config.update_rate_hz > 0.0 {
            1.0 / config.update_rate_hz
        } else {
            log::warn!(
                "Invalid position update rate {}, using {} Hz",
                config.update_rate_hz,
                ProviderConfig::default().update_rate_hz
            );
            1.0 / ProviderConfig::default().update_rate_hz
        };
        log::info!(
            "Position provider: {} elements, {:.1} Hz refresh, grid {}x{}",
            config.max_elements,
            1.0 / update_interval_s,
            settings.grid_width,
            settings.grid_height
        );
        Self {
            settings,
            calculator,
            update_interval_s,
            // First tick runs a full update
            since_update_s: update_interval_s,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.wave.clone(), &config.provider)
    }

    pub fn settings(&self) -> &WaveMatrixSettings {
        &self.settings
    }

    /// Current wave time
    pub fn time(&self) -> f32 {
        self.calculator.source().current_time()
    }

    pub fn calculator(&self) -> &BatchPositionCalculator<WaveField> {
        &self.calculator
    }

    pub fn stats(&self) -> &CacheStats {
        self.calculator.stats()
    }

    pub fn tick(&mut self, delta_s: f32) -> TickOutcome {
        let time = self
            .calculator
            .source_mut()
            .advance_time(delta_s, &self.settings);
        if delta_s.is_finite() && delta_s > 0.0 {
            self.since_update_s += delta_s;
        }

        let full_update = self.since_update_s >= self.update_interval_s;
        let refreshed = if full_update {
            self.since_update_s -= self.update_interval_s;
            if self.since_update_s >= self.update_interval_s {
                self.since_update_s = 0.0;
            }
            self.calculator.calculate_all(time, &self.settings).len()
        } else {
            self.calculator.update_dirty_only(time, &self.settings)
        };

        if refreshed > 0 {
            log::trace!(
                "Position tick t={:.3}: {} refreshed (full: {})",
                time,
                refreshed,
                full_update
            );
        }
        TickOutcome {
            time,
            refreshed,
            full_update,
        }
    }

    /// Swap in new settings; every cached position becomes stale
    pub fn replace_settings(&mut self, settings: WaveMatrixSettings) {
        self.calculator.source_mut().sync_layout(&settings);
        self.settings = settings;
        self.calculator.mark_all_dirty();
        log::info!(
            "Wave settings replaced (grid {}x{}, spacing {})",
            self.settings.grid_width,
            self.settings.grid_height,
            self.settings.cell_spacing
        );
    }

    pub fn set_max_elements(&mut self, max_elements: usize) {
        self.calculator.set_max_elements(max_elements);
    }

    /// Store an element's AI distance offset; refreshed on the next tick
    pub fn set_distance_offset(&mut self, index: usize, offset: f32) {
        if !offset.is_finite() {
            log::warn!("Ignoring non-finite distance offset for element {}", index);
            return;
        }
        self.calculator.set_distance_offset(index, offset);
    }

    /// Last computed position of an element, `None` while it is stale
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.calculator.position(index)
    }

    pub fn positions(&self) -> &[Vec3] {
        self.calculator.positions()
    }

    /// Positions for `indices` at the current wave time, served from cache where possible
    pub fn positions_for(&mut self, indices: &[usize]) -> Vec<Vec3> {
        let time = self.time();
        self.calculator.calculate(indices, time, &self.settings)
    }

    /// Positions of active bubbles at the current wave time, highest priority first
    pub fn positions_by_priority(&mut self, bubbles: &[BubbleData]) -> Vec<Vec3> {
        let time = self.time();
        self.calculator
            .calculate_with_priority(bubbles, time, &self.settings)
    }

    pub fn closest(&self, point: Vec3, max_distance: f32) -> Option<usize> {
        self.calculator.closest(point, max_distance)
    }

    pub fn in_radius(&self, center: Vec3, radius: f32) -> Vec<usize> {
        self.calculator.in_radius(center, radius)
    }

    /// Sanity check of the cached positions
    pub fn validate_positions(&self) -> PositionValidation {
        self.calculator
            .validate(self.calculator.positions(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::WavePositionSource;

    fn provider() -> WavePositionProvider {
        WavePositionProvider::new(WaveMatrixSettings::default(), &ProviderConfig::default())
    }

    #[test]
    fn test_first_tick_fills_cache() {
        let mut provider = provider();
        let outcome = provider.tick(0.01);
        assert!(outcome.full_update);
        assert_eq!(outcome.refreshed, 100);
        assert!((outcome.time - 0.01).abs() < 1e-6);
        assert_eq!(provider.calculator().dirty_count(), 0);
    }

    #[test]
    fn test_full_updates_are_throttled() {
        let mut provider = provider();
        let mut full_updates = 0;
        for _ in 0..90 {
            if provider.tick(1.0 / 90.0).full_update {
                full_updates += 1;
            }
        }
        assert!((14..=16).contains(&full_updates), "full updates = {}", full_updates);
        assert!((provider.time() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_change_refreshes_one_entry() {
        let mut provider = provider();
        provider.tick(0.01);
        provider.set_distance_offset(4, 0.5);
        provider.set_distance_offset(5, f32::NAN);

        let outcome = provider.tick(0.01);
        assert!(!outcome.full_update);
        assert_eq!(outcome.refreshed, 1);

        let field = WaveField::new();
        let expected = field.position(4, outcome.time, 0.5, provider.settings());
        assert_eq!(provider.position(4), Some(expected));
    }

    #[test]
    fn test_replace_settings_dirties_everything() {
        let mut provider = provider();
        provider.tick(0.01);
        provider.replace_settings(WaveMatrixSettings::calm());
        assert_eq!(provider.position(0), None);

        let outcome = provider.tick(0.01);
        assert_eq!(outcome.refreshed, 100);
        assert!(provider.validate_positions().is_valid);
    }

    #[test]
    fn test_bad_delta_keeps_time() {
        let mut provider = provider();
        provider.tick(0.5);
        let outcome = provider.tick(f32::NAN);
        assert!((outcome.time - 0.5).abs() < 1e-6);
        let outcome = provider.tick(-1.0);
        assert!((outcome.time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_queries_hit_cache_after_full_update() {
        let mut provider = provider();
        provider.tick(0.01);
        let before = provider.stats().batch_calls;
        let positions = provider.positions_for(&[0, 1, 2]);
        assert_eq!(positions.len(), 3);
        assert_eq!(provider.stats().batch_calls, before);
        assert_eq!(provider.stats().cache_hits, 3);

        let nearest = provider.closest(positions[1], 0.01);
        assert_eq!(nearest, Some(1));
    }
}
