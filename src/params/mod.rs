//! Parameter definitions with units and documented semantics.
//!
//! Settings are plain values with `Default` plus named presets. They are
//! swapped wholesale on change, never edited in place while in use.

mod breathing;
mod config;
mod wave;

// Re-export all types
pub use breathing::{BreathingElementConfig, BreathingSettings};
pub use config::{Preset, ProviderConfig, SimulationConfig};
pub use wave::{WaveComponent, WaveLayer, WaveMatrixSettings};
