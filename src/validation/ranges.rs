//! Published limits: hard bounds, recommended safe ranges and budgets.

use serde::{Deserialize, Serialize};

/// Inclusive value range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
}

impl ParameterRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Families of per-parameter limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Amplitude,
    Frequency,
    Speed,
    CellSize,
}

impl ParameterKind {
    /// Outside these the value is flagged Warning or Error
    pub fn hard_bounds(self) -> ParameterRange {
        match self {
            ParameterKind::Amplitude => ParameterRange::new(0.001, 10.0),
            ParameterKind::Frequency => ParameterRange::new(0.1, 20.0),
            ParameterKind::Speed => ParameterRange::new(0.1, 10.0),
            ParameterKind::CellSize => ParameterRange::new(0.1, 10.0),
        }
    }

    /// Recommended safe range, also the clamp target for corrections
    pub fn recommended(self) -> ParameterRange {
        match self {
            ParameterKind::Amplitude => ParameterRange::new(0.1, 2.0),
            ParameterKind::Frequency => ParameterRange::new(0.5, 5.0),
            ParameterKind::Speed => ParameterRange::new(0.5, 3.0),
            ParameterKind::CellSize => ParameterRange::new(0.5, 2.0),
        }
    }

    /// Amplitude may be zero before it becomes a safety problem; the rest may not
    pub fn allows_zero(self) -> bool {
        matches!(self, ParameterKind::Amplitude)
    }
}

/// Hard cap on grid cells
pub const MAX_GRID_CELLS: usize = 10_000;

/// Cells above this draw a performance warning
pub const RECOMMENDED_MAX_GRID_CELLS: usize = 2_500;

/// Largest grid side the corrections will produce
pub const RECOMMENDED_MAX_GRID_DIMENSION: usize = 50;

/// Bubble counts above this draw a performance warning
pub const RECOMMENDED_MAX_BUBBLES: usize = 100;

/// Memory estimate: one cached position per cell
pub const BYTES_PER_CELL: usize = 16;

/// Memory estimate: element state plus render-side bookkeeping
pub const BYTES_PER_ELEMENT: usize = 64 + 48;

pub const MEMORY_BUDGET_BYTES: usize = 64 * 1024 * 1024;

/// Anti-aliasing: grid cells needed per wavelength
pub const MIN_CELLS_PER_WAVELENGTH: f32 = 4.0;

/// Motion comfort: amplitude × speed ceiling
pub const MAX_MOTION_INTENSITY: f32 = 5.0;

/// cells × frequency ceiling
pub const MAX_COMPLEXITY: f32 = 50_000.0;

/// Conservative cost of one position evaluation on standalone VR hardware
pub const ESTIMATED_NS_PER_POSITION: f32 = 250.0;

/// Share of the frame budget the position update may use
pub const FRAME_BUDGET_SHARE: f32 = 0.1;

/// Estimated bytes for a grid and bubble count
pub fn estimated_memory_bytes(cells: usize, bubble_count: usize) -> usize {
    cells
        .saturating_mul(BYTES_PER_CELL)
        .saturating_add(bubble_count.saturating_mul(BYTES_PER_ELEMENT))
}
