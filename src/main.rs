//! Meteor Dodge entry point
//!
//! Native builds run a headless autopilot session and log what happens.
//! The browser build is driven from JS through `meteor_dodge::web`.
//!
//! ```bash
//! meteor-dodge classic --seed 42
//! meteor-dodge --tuning tuning.json
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;

    use meteor_dodge::consts::SIM_DT_MS;
    use meteor_dodge::sim::GameEvent;
    use meteor_dodge::{App, DifficultyPreset, Tuning};

    #[derive(Parser)]
    #[command(name = "meteor-dodge")]
    #[command(author, version, about = "Meteor Dodge - headless autopilot run")]
    struct Args {
        /// Difficulty preset (standard, classic)
        #[arg(default_value = "standard", value_parser = parse_preset)]
        preset: DifficultyPreset,

        /// JSON tuning file, overrides the preset
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Session seed
        #[arg(long, default_value_t = 0xD0D6E)]
        seed: u64,
    }

    fn parse_preset(s: &str) -> Result<DifficultyPreset, String> {
        DifficultyPreset::parse(s).ok_or_else(|| format!("unknown preset '{s}' (expected standard or classic)"))
    }

    fn load_tuning(path: &Path) -> Result<Tuning> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tuning file: {}", path.display()))?;
        let tuning = Tuning::from_json(&json)
            .with_context(|| format!("Invalid tuning file: {}", path.display()))?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        log::info!("Meteor Dodge (native) starting...");

        let args = Args::parse();
        let tuning = match &args.tuning {
            Some(path) => load_tuning(path)?,
            None => Tuning::from_preset(args.preset),
        };

        log::info!("Preset {}, seed {}", args.preset.as_str(), args.seed);
        let mut app = App::new(tuning, args.seed);
        app.input.autopilot = true;
        app.start_game();

        // Five minutes of play at most
        let max_frames = (5.0 * 60.0 * 1000.0 / SIM_DT_MS) as u32;
        let mut final_score = None;
        for _ in 0..max_frames {
            for event in app.update(SIM_DT_MS) {
                log::debug!("{event:?}");
                if let GameEvent::GameOver { score } = event {
                    final_score = Some(score);
                }
            }
            if final_score.is_some() {
                break;
            }
        }

        match final_score {
            Some(score) => println!("Game over - score {score}"),
            None => println!("Survived five minutes - score {}", app.score()),
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is meteor_dodge::web, this is just to satisfy the compiler
}
