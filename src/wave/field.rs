//! Layered sinusoid wave field.
//!
//! Height is the sum of an X-axis layer, a Z-axis layer and a radial layer,
//! plus an optional interference term. Mixing axis-aligned and radial terms
//! keeps the surface from tiling visibly.
//!
//! Every evaluation is a pure function of its arguments. The only state a
//! `WaveField` carries is the time accumulator and a grid layout table that
//! is keyed by grid shape and never changes results.

use glam::{Vec2, Vec3};

use super::grid::GridLayout;
use super::WavePositionSource;
use crate::error::{Result, WaveError};
use crate::params::WaveMatrixSettings;

/// Raw field height with no guarding. Non-finite settings propagate.
///
/// Used by the stability simulation, which needs to see what the maths
/// actually produces.
pub(crate) fn raw_wave_height(point: Vec2, time: f32, settings: &WaveMatrixSettings) -> f32 {
    let p = &settings.primary;
    let s = &settings.secondary;
    let t = &settings.tertiary;
    let radius = point.length();

    let mut height = p.amplitude * (point.x * p.frequency + time * p.speed).sin()
        + s.amplitude * (point.y * s.frequency + time * s.speed).sin()
        + t.amplitude * (radius * t.frequency + time * t.speed).sin();

    if settings.interference_enabled {
        let f = settings.interference_frequency;
        height += settings.interference_amplitude
            * (point.x * f + time).sin()
            * (point.y * f + time).cos();
    }
    height
}

/// Guarded field height at a point on the XZ plane (`point.y` is world Z).
///
/// Malformed settings or a non-finite result give 0.0 and a warning.
pub fn wave_height(point: Vec2, time: f32, settings: &WaveMatrixSettings) -> f32 {
    if !settings.is_well_formed() {
        log::warn!("wave_height: malformed settings, returning flat height");
        return 0.0;
    }
    guarded_height(point, time, settings)
}

fn guarded_height(point: Vec2, time: f32, settings: &WaveMatrixSettings) -> f32 {
    let height = raw_wave_height(point, time, settings);
    if height.is_finite() {
        height
    } else {
        log::warn!(
            "wave_height: non-finite height at ({}, {}) t={}, returning 0",
            point.x,
            point.y,
            time
        );
        0.0
    }
}

/// Wave field evaluator with the simulation's single time accumulator
#[derive(Debug, Clone, Default)]
pub struct WaveField {
    current_time: f32,
    layout: GridLayout,
}

impl WaveField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field with its grid table already built for `settings`
    pub fn with_settings(settings: &WaveMatrixSettings) -> Self {
        Self {
            current_time: 0.0,
            layout: GridLayout::for_settings(settings),
        }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn reset_time(&mut self) {
        self.current_time = 0.0;
    }

    /// Rebuild the grid table when the grid shape changes
    pub fn sync_layout(&mut self, settings: &WaveMatrixSettings) -> bool {
        self.layout.sync(settings)
    }

    /// Advance the accumulator by `delta_s · time_scale` and return the new time.
    ///
    /// Non-finite or negative input leaves the time unchanged.
    pub fn advance_time(&mut self, delta_s: f32, settings: &WaveMatrixSettings) -> f32 {
        if !delta_s.is_finite() || delta_s < 0.0 {
            log::warn!("advance_time: ignoring delta {}", delta_s);
            return self.current_time;
        }
        if !settings.time_scale.is_finite() {
            log::warn!("advance_time: non-finite time scale, time unchanged");
            return self.current_time;
        }
        self.current_time += delta_s * settings.time_scale;
        self.current_time
    }

    /// Flat (y = 0) position of a grid cell
    pub fn grid_position(&self, index: i32, settings: &WaveMatrixSettings) -> Vec3 {
        self.layout.position(index, settings)
    }

    pub fn wave_height(&self, point: Vec2, time: f32, settings: &WaveMatrixSettings) -> f32 {
        wave_height(point, time, settings)
    }

    /// Assumes `settings` are well formed; logs only per-element problems
    fn evaluate(
        &self,
        index: i32,
        time: f32,
        distance_offset: f32,
        settings: &WaveMatrixSettings,
    ) -> Vec3 {
        if index < 0 {
            log::warn!("position: negative index {}, returning origin", index);
            return Vec3::ZERO;
        }
        let offset = if distance_offset.is_finite() {
            distance_offset
        } else {
            log::warn!(
                "position: non-finite distance offset for index {}, ignoring",
                index
            );
            0.0
        };

        let mut pos = self.layout.position(index, settings);
        pos.z += offset * settings.ai_distance_scale;
        pos.y = guarded_height(Vec2::new(pos.x, pos.z), time, settings);
        pos
    }
}

impl WavePositionSource for WaveField {
    fn position(
        &self,
        index: i32,
        time: f32,
        distance_offset: f32,
        settings: &WaveMatrixSettings,
    ) -> Vec3 {
        if !settings.is_well_formed() {
            log::warn!("position: malformed settings, returning origin");
            return Vec3::ZERO;
        }
        self.evaluate(index, time, distance_offset, settings)
    }

    fn positions_batch(
        &self,
        indices: &[i32],
        time: f32,
        distance_offsets: Option<&[f32]>,
        settings: &WaveMatrixSettings,
    ) -> Result<Vec<Vec3>> {
        if let Some(offsets) = distance_offsets {
            if offsets.len() != indices.len() {
                return Err(WaveError::MismatchedLengths {
                    indices: indices.len(),
                    offsets: offsets.len(),
                });
            }
        }
        if !settings.is_well_formed() {
            log::warn!(
                "positions_batch: malformed settings, returning {} origins",
                indices.len()
            );
            return Ok(vec![Vec3::ZERO; indices.len()]);
        }

        let positions = indices
            .iter()
            .enumerate()
            .map(|(k, &index)| {
                let offset = distance_offsets.map_or(0.0, |offsets| offsets[k]);
                self.evaluate(index, time, offset, settings)
            })
            .collect();
        Ok(positions)
    }
}
