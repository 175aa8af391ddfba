//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::params::{Preset, SimulationConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "bubblewave")]
#[command(about = "Validate and exercise wave-driven bubble layouts", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate wave settings and print the report (non-zero exit when invalid)
    Validate {
        #[command(flatten)]
        source: ConfigSource,

        /// Bubbles the layout must hold
        #[arg(long, value_name = "COUNT")]
        bubbles: Option<usize>,

        /// Print corrected settings as TOML
        #[arg(long)]
        fix: bool,
    },

    /// Run the position provider and breathing engine headless
    Simulate {
        #[command(flatten)]
        source: ConfigSource,

        /// Simulated duration
        #[arg(long, value_name = "SECONDS", default_value = "10")]
        seconds: f32,

        /// Host tick rate
        #[arg(long, value_name = "HZ", default_value = "72")]
        fps: f32,

        /// Breathing elements to register
        #[arg(long, value_name = "COUNT", default_value = "20")]
        breathing_elements: usize,
    },

    /// Print the named presets as TOML
    Presets,
}

/// Where settings come from: a named preset or a TOML file
#[derive(clap::Args, Debug)]
pub struct ConfigSource {
    /// Named preset
    #[arg(long, value_enum, default_value = "default", conflicts_with = "config")]
    pub preset: Preset,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    pub fn load(&self) -> Result<SimulationConfig> {
        match &self.config {
            Some(path) => SimulationConfig::load_from_path(path),
            None => Ok(SimulationConfig::from_preset(self.preset)),
        }
    }
}
