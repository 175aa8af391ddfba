//! Batched, cached bubble positions with spatial queries.

mod batch;
mod stats;
mod validate;

pub use batch::BatchPositionCalculator;
pub use stats::CacheStats;
pub use validate::{validate_positions, PerformanceImpact, PositionValidation};

/// Host-side description of one bubble for priority-ordered calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleData {
    /// Grid cell index
    pub index: i32,
    /// Semantic distance; shifts the bubble along Z by `ai_distance_scale`
    pub ai_distance_offset: f32,
    /// Higher is computed and returned first
    pub priority: i32,
    pub is_active: bool,
}

impl BubbleData {
    pub fn new(index: i32, ai_distance_offset: f32, priority: i32, is_active: bool) -> Self {
        Self {
            index,
            ai_distance_offset,
            priority,
            is_active,
        }
    }
}
