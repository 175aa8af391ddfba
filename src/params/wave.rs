//! Wave matrix parameters: the three layered sinusoids and the bubble grid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One sinusoid of the wave field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    /// Peak height contribution in world units
    pub amplitude: f32,

    /// Spatial frequency (radians per world unit, wavelength = 2π / frequency)
    pub frequency: f32,

    /// Temporal speed (radians per second of scaled time)
    pub speed: f32,
}

impl WaveComponent {
    pub const fn new(amplitude: f32, frequency: f32, speed: f32) -> Self {
        Self {
            amplitude,
            frequency,
            speed,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.frequency.is_finite() && self.speed.is_finite()
    }
}

/// Which of the three layered sinusoids a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveLayer {
    /// Axis-aligned along X
    Primary,
    /// Axis-aligned along Z
    Secondary,
    /// Radial from the grid origin
    Tertiary,
}

impl WaveLayer {
    pub const ALL: [WaveLayer; 3] = [WaveLayer::Primary, WaveLayer::Secondary, WaveLayer::Tertiary];

    /// Prefix used for parameter names in validation reports
    pub fn name_prefix(self) -> &'static str {
        match self {
            WaveLayer::Primary => "",
            WaveLayer::Secondary => "Secondary",
            WaveLayer::Tertiary => "Tertiary",
        }
    }
}

/// Wave matrix configuration for the bubble grid.
///
/// Treated as an immutable value while in use: callers build a new instance
/// and hand it over wholesale rather than editing fields of a live one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveMatrixSettings {
    /// Grid cells along X
    pub grid_width: usize,

    /// Grid cells along Z
    pub grid_height: usize,

    /// Distance between neighbouring cell centres (world units)
    pub cell_spacing: f32,

    /// Multiplier applied to host delta time before it reaches the field
    pub time_scale: f32,

    /// Depth shift per unit of AI distance offset (world units)
    pub ai_distance_scale: f32,

    /// X-axis layer
    pub primary: WaveComponent,

    /// Z-axis layer
    pub secondary: WaveComponent,

    /// Radial layer
    pub tertiary: WaveComponent,

    /// Adds `A·sin(x·f + t)·cos(z·f + t)` on top of the layers
    pub interference_enabled: bool,

    /// Spatial frequency of the interference term (radians per unit)
    pub interference_frequency: f32,

    /// Height of the interference term (world units)
    pub interference_amplitude: f32,
}

impl Default for WaveMatrixSettings {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10, // 100 cells, one per default bubble slot
            cell_spacing: 1.5,
            time_scale: 1.0,
            ai_distance_scale: 2.0,
            primary: WaveComponent::new(0.5, 0.8, 1.0),
            secondary: WaveComponent::new(0.3, 0.6, 0.7),
            tertiary: WaveComponent::new(0.2, 1.0, 1.3),
            interference_enabled: false,
            interference_frequency: 0.5,
            interference_amplitude: 0.1,
        }
    }
}

impl WaveMatrixSettings {
    /// Slow, shallow swell for reading-heavy sessions
    pub fn calm() -> Self {
        Self {
            time_scale: 0.8,
            primary: WaveComponent::new(0.3, 0.5, 0.6),
            secondary: WaveComponent::new(0.15, 0.6, 0.5),
            tertiary: WaveComponent::new(0.1, 0.8, 0.7),
            ..Self::default()
        }
    }

    /// Livelier motion with interference enabled
    pub fn dynamic() -> Self {
        Self {
            time_scale: 1.2,
            primary: WaveComponent::new(1.2, 1.0, 2.0),
            secondary: WaveComponent::new(0.6, 0.9, 1.6),
            tertiary: WaveComponent::new(0.4, 1.0, 2.4),
            interference_enabled: true,
            interference_frequency: 0.8,
            interference_amplitude: 0.25,
            ..Self::default()
        }
    }

    pub fn total_cells(&self) -> usize {
        self.grid_width.saturating_mul(self.grid_height)
    }

    /// Half of the centred grid extent on X (`x`) and Z (`y`)
    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(
            self.grid_width.saturating_sub(1) as f32 * self.cell_spacing * 0.5,
            self.grid_height.saturating_sub(1) as f32 * self.cell_spacing * 0.5,
        )
    }

    pub fn component(&self, layer: WaveLayer) -> &WaveComponent {
        match layer {
            WaveLayer::Primary => &self.primary,
            WaveLayer::Secondary => &self.secondary,
            WaveLayer::Tertiary => &self.tertiary,
        }
    }

    pub fn component_mut(&mut self, layer: WaveLayer) -> &mut WaveComponent {
        match layer {
            WaveLayer::Primary => &mut self.primary,
            WaveLayer::Secondary => &mut self.secondary,
            WaveLayer::Tertiary => &mut self.tertiary,
        }
    }

    /// Largest height the field can reach: sum of every active amplitude
    pub fn amplitude_envelope(&self) -> f32 {
        let layers: f32 = WaveLayer::ALL
            .iter()
            .map(|&layer| self.component(layer).amplitude.abs())
            .sum();
        if self.interference_enabled {
            layers + self.interference_amplitude.abs()
        } else {
            layers
        }
    }

    /// Cheap structural check used on the hot path.
    ///
    /// Only rejects settings that would make the field itself meaningless;
    /// the full assessment lives in `validation`.
    pub fn is_well_formed(&self) -> bool {
        self.grid_width > 0
            && self.grid_height > 0
            && self.cell_spacing.is_finite()
            && self.cell_spacing > 0.0
            && self.time_scale.is_finite()
            && self.ai_distance_scale.is_finite()
            && self.primary.is_finite()
            && self.secondary.is_finite()
            && self.tertiary.is_finite()
            && (!self.interference_enabled
                || (self.interference_frequency.is_finite()
                    && self.interference_amplitude.is_finite()))
    }
}
