//! Wave field: grid layout and layered-sinusoid positions.

mod field;
mod grid;

use glam::Vec3;

use crate::error::Result;
use crate::params::WaveMatrixSettings;

pub(crate) use field::raw_wave_height;
pub use field::{wave_height, WaveField};
pub use grid::{grid_position, world_to_grid_index, GridLayout};

/// Source of per-index wave positions consumed by the position cache.
///
/// `positions_batch(indices, t, offsets, s)[k]` must equal
/// `position(indices[k], t, offsets[k], s)` bit for bit.
pub trait WavePositionSource {
    fn position(
        &self,
        index: i32,
        time: f32,
        distance_offset: f32,
        settings: &WaveMatrixSettings,
    ) -> Vec3;

    /// Batch evaluation. Fails only when `distance_offsets` is given with a
    /// different length than `indices`.
    fn positions_batch(
        &self,
        indices: &[i32],
        time: f32,
        distance_offsets: Option<&[f32]>,
        settings: &WaveMatrixSettings,
    ) -> Result<Vec<Vec3>>;
}
