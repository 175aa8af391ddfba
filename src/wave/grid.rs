//! Grid ↔ world conversion for the centred bubble grid.
//!
//! Cell `i` sits at column `i % width`, row `i / width`. The grid is centred
//! on the origin, so cell 0 of an 8×8 grid with 1.5 spacing is (-5.25, 0, -5.25).

use glam::Vec3;

use crate::params::WaveMatrixSettings;

/// Layouts above this many cells are computed on demand instead of tabled
const MAX_LAYOUT_CELLS: usize = 10_000;

/// Flat (y = 0) position of a grid cell.
///
/// Negative indices and malformed grids yield `Vec3::ZERO` with a warning.
/// Indices past the last cell continue the row layout beyond the grid.
pub fn grid_position(index: i32, settings: &WaveMatrixSettings) -> Vec3 {
    if index < 0 {
        log::warn!("grid_position: negative index {}, returning origin", index);
        return Vec3::ZERO;
    }
    if !grid_is_usable(settings) {
        log::warn!(
            "grid_position: unusable grid {}x{} spacing {}, returning origin",
            settings.grid_width,
            settings.grid_height,
            settings.cell_spacing
        );
        return Vec3::ZERO;
    }
    cell_position(index as usize, settings)
}

/// Inverse of [`grid_position`], rounding to the nearest cell.
///
/// Returns `None` when the point falls outside `[0, width) × [0, height)`.
pub fn world_to_grid_index(world: Vec3, settings: &WaveMatrixSettings) -> Option<i32> {
    if !grid_is_usable(settings) || !world.x.is_finite() || !world.z.is_finite() {
        return None;
    }
    let half = settings.half_extent();
    let col = ((world.x + half.x) / settings.cell_spacing).round();
    let row = ((world.z + half.y) / settings.cell_spacing).round();

    if col < 0.0 || row < 0.0 {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    if col >= settings.grid_width || row >= settings.grid_height {
        return None;
    }
    i32::try_from(row * settings.grid_width + col).ok()
}

fn grid_is_usable(settings: &WaveMatrixSettings) -> bool {
    settings.grid_width > 0
        && settings.grid_height > 0
        && settings.cell_spacing.is_finite()
        && settings.cell_spacing > 0.0
}

fn cell_position(index: usize, settings: &WaveMatrixSettings) -> Vec3 {
    let half = settings.half_extent();
    let col = index % settings.grid_width;
    let row = index / settings.grid_width;
    Vec3::new(
        col as f32 * settings.cell_spacing - half.x,
        0.0,
        row as f32 * settings.cell_spacing - half.y,
    )
}

/// Identity of a grid layout by value rather than by settings instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridKey {
    width: usize,
    height: usize,
    spacing_bits: u32,
}

impl GridKey {
    fn of(settings: &WaveMatrixSettings) -> Self {
        Self {
            width: settings.grid_width,
            height: settings.grid_height,
            spacing_bits: settings.cell_spacing.to_bits(),
        }
    }
}

/// Precomputed flat cell positions for one grid shape.
///
/// A table hit is bit-identical to [`grid_position`]; a stale table or an
/// out-of-table index falls through to the formula.
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    key: Option<GridKey>,
    cells: Vec<Vec3>,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for `settings`
    pub fn for_settings(settings: &WaveMatrixSettings) -> Self {
        let mut layout = Self::new();
        layout.sync(settings);
        layout
    }

    pub fn matches(&self, settings: &WaveMatrixSettings) -> bool {
        self.key == Some(GridKey::of(settings))
    }

    /// Rebuild the table if the grid shape changed. Returns true on rebuild.
    pub fn sync(&mut self, settings: &WaveMatrixSettings) -> bool {
        if self.matches(settings) {
            return false;
        }
        self.cells.clear();
        self.key = Some(GridKey::of(settings));

        let cells = settings.total_cells();
        if grid_is_usable(settings) && cells <= MAX_LAYOUT_CELLS {
            self.cells.extend((0..cells).map(|i| cell_position(i, settings)));
        }
        log::debug!(
            "Grid layout rebuilt: {}x{} spacing {} ({} cells tabled)",
            settings.grid_width,
            settings.grid_height,
            settings.cell_spacing,
            self.cells.len()
        );
        true
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat cell position, from the table when it is current
    pub fn position(&self, index: i32, settings: &WaveMatrixSettings) -> Vec3 {
        if index >= 0 && self.matches(settings) {
            if let Some(cell) = self.cells.get(index as usize) {
                return *cell;
            }
        }
        grid_position(index, settings)
    }
}
