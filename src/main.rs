//! Bubblewave - validation and headless simulation wrapper
//!
//! Runs the wave settings validator for CI and exercises the position
//! provider and breathing engine without a renderer.

use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bubblewave::breathing::{BreathingEngine, BreathingReceiver, BreathingValue, ElementHandle};
use bubblewave::cli::{Args, Command, ConfigSource};
use bubblewave::params::{Preset, SimulationConfig};
use bubblewave::provider::WavePositionProvider;
use bubblewave::validation::ParameterValidator;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let outcome = match args.command {
        Command::Validate {
            source,
            bubbles,
            fix,
        } => run_validate(&source, bubbles, fix),
        Command::Simulate {
            source,
            seconds,
            fps,
            breathing_elements,
        } => run_simulate(&source, seconds, fps, breathing_elements).map(|()| true),
        Command::Presets => run_presets().map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the (possibly corrected) settings are valid
fn run_validate(source: &ConfigSource, bubbles: Option<usize>, fix: bool) -> Result<bool> {
    let mut config = source.load().context("Failed to load configuration")?;
    if let Some(count) = bubbles {
        config.validation.expected_elements = Some(count);
    }

    let validator = ParameterValidator::new(config.validation.clone());
    let result = validator.validate(&config.wave);
    print!("{}", result.report);

    if !fix {
        return Ok(result.is_valid);
    }

    let corrected = SimulationConfig {
        wave: validator.suggest_corrections(&config.wave, &result),
        ..config
    };
    let revalidated = validator.validate(&corrected.wave);
    println!("\n# Corrected configuration");
    print!(
        "{}",
        corrected
            .to_toml_string()
            .context("Failed to render corrected configuration")?
    );
    println!(
        "\n# Corrected settings are {} (score {:.2})",
        if revalidated.is_valid { "VALID" } else { "INVALID" },
        revalidated.score
    );
    Ok(revalidated.is_valid)
}

/// Receiver that only keeps the latest value
#[derive(Default)]
struct HeadlessBubble {
    updates: usize,
    last: Option<BreathingValue>,
}

impl BreathingReceiver for HeadlessBubble {
    fn apply_breathing(&mut self, value: BreathingValue) {
        self.updates += 1;
        self.last = Some(value);
    }
}

fn run_simulate(source: &ConfigSource, seconds: f32, fps: f32, breathing_elements: usize) -> Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be positive, got {}", fps);
    }
    if !(seconds.is_finite() && seconds >= 0.0) {
        bail!("--seconds must be non-negative, got {}", seconds);
    }
    let config = source.load().context("Failed to load configuration")?;

    let validation = ParameterValidator::new(config.validation.clone()).validate(&config.wave);
    if !validation.is_valid {
        log::warn!("Simulating with invalid settings:\n{}", validation.report);
    }

    let mut provider = WavePositionProvider::from_config(&config);
    let mut breathing = BreathingEngine::new(config.breathing.clone());
    let bubbles: Vec<Rc<RefCell<HeadlessBubble>>> = (0..breathing_elements)
        .map(|_| Rc::new(RefCell::new(HeadlessBubble::default())))
        .collect();
    let registered = bubbles
        .iter()
        .filter(|bubble| {
            let handle: ElementHandle = Rc::clone(bubble) as ElementHandle;
            breathing.register(&handle, None).is_some()
        })
        .count();

    let dt = 1.0 / fps;
    let ticks = (seconds * fps).round() as u64;
    log::info!(
        "Simulating {} ticks at {} Hz with {} breathing elements",
        ticks,
        fps,
        registered
    );

    let start = Instant::now();
    let mut full_updates = 0u64;
    let mut refreshed = 0u64;
    let mut pushes = 0u64;
    for _ in 0..ticks {
        let outcome = provider.tick(dt);
        if outcome.full_update {
            full_updates += 1;
        }
        refreshed += outcome.refreshed as u64;
        pushes += breathing.tick(dt) as u64;
    }
    let elapsed = start.elapsed();

    let stats = provider.stats();
    let positions = provider.validate_positions();
    println!("Simulated {:.1}s in {:.2?}", provider.time(), elapsed);
    println!(
        "Positions: {} full updates, {} entries refreshed, avg batch {:.4} ms, {} batch calls",
        full_updates,
        refreshed,
        stats.average_batch_time_ms(),
        stats.batch_calls
    );
    println!(
        "Position check: {} ({:?} impact)",
        if positions.is_valid { "ok" } else { "FAILED" },
        positions.performance_impact
    );
    for issue in &positions.issues {
        println!("  - {}", issue);
    }
    println!(
        "Breathing: {} pushes, global phase {:.3}",
        pushes,
        breathing.global_phase()
    );
    if let Some(bubble) = bubbles.first() {
        let bubble = bubble.borrow();
        if let Some(value) = bubble.last {
            println!(
                "  element 0: {} updates, scale {:.3}, opacity {:.3}",
                bubble.updates, value.scale, value.opacity
            );
        }
    }
    Ok(())
}

fn run_presets() -> Result<()> {
    for preset in [Preset::Default, Preset::Calm, Preset::Dynamic] {
        let toml = SimulationConfig::from_preset(preset)
            .to_toml_string()
            .with_context(|| format!("Failed to render preset {:?}", preset))?;
        println!("# preset: {:?}\n{}", preset, toml);
    }
    Ok(())
}
