#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("The ratio-snap CLI requires the \"cli\" feature. Rebuild with `--features cli`.");
}

#[cfg(feature = "cli")]
mod cli {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};
    use serde::Serialize;
    use tracing_subscriber::EnvFilter;

    use ratio_snap::{round_to_fraction_with_error, Fraction, RateSnapper, SnapConfig};

    /// How input values are interpreted.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    enum Mode {
        /// Plain real number
        Value,
        /// Playback speed multiplier (clamped to the configured range)
        Speed,
        /// Pitch shift in semitones
        Pitch,
    }

    #[derive(Parser, Debug)]
    #[command(name = "ratio-snap")]
    #[command(about = "Round ratios to the simplest nearby fraction")]
    struct Args {
        /// Values to approximate
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Maximum relative error, in (0, 1)
        #[arg(short, long, env = "RATIO_SNAP_ACCURACY")]
        accuracy: Option<f64>,

        /// JSON snap configuration (accuracy, min_rate, max_rate)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Interpretation of the values
        #[arg(short, long, value_enum, default_value_t = Mode::Value)]
        mode: Mode,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Pretty print JSON output
        #[arg(long)]
        pretty: bool,
    }

    #[derive(Serialize, Debug)]
    struct Entry {
        input: f64,
        fraction: Fraction,
        value: f64,
        error: f64,
    }

    fn load_config(args: &Args) -> Result<SnapConfig> {
        let mut config = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                SnapConfig::from_json_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SnapConfig::default(),
        };
        if let Some(accuracy) = args.accuracy {
            config.accuracy = accuracy;
        }
        config.validate()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    fn snap_one(mode: Mode, snapper: &RateSnapper, input: f64) -> Result<Entry> {
        let entry = match mode {
            Mode::Value => {
                let rounded = round_to_fraction_with_error(input, snapper.config().accuracy)?;
                Entry {
                    input,
                    fraction: rounded.fraction,
                    value: rounded.value,
                    error: rounded.error,
                }
            }
            Mode::Speed | Mode::Pitch => {
                let snapped = if mode == Mode::Speed {
                    snapper.snap_speed(input)?
                } else {
                    snapper.snap_pitch_semitones(input)?
                };
                Entry {
                    input,
                    fraction: snapped.fraction,
                    value: snapped.value,
                    error: snapped.error,
                }
            }
        };
        Ok(entry)
    }

    pub fn run() -> Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();

        let args = Args::parse();
        let config = load_config(&args)?;
        let snapper = RateSnapper::new(config)?;
        tracing::info!(
            count = args.values.len(),
            mode = ?args.mode,
            accuracy = config.accuracy,
            "snapping values"
        );

        let entries = args
            .values
            .iter()
            .map(|&v| snap_one(args.mode, &snapper, v).with_context(|| format!("snapping {v}")))
            .collect::<Result<Vec<_>>>()?;

        if args.json {
            let out = if args.pretty {
                serde_json::to_string_pretty(&entries)?
            } else {
                serde_json::to_string(&entries)?
            };
            println!("{out}");
        } else {
            for e in &entries {
                println!("{} -> {} ({}, error {:+.6})", e.input, e.fraction, e.value, e.error);
            }
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
