//! LogicVision CLI — entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use logic_vision::{SynthesisMode, DEFAULT_PRECISION};
use logic_vision_cli::config::{resolve_log_level, resolve_mode};

#[derive(Parser)]
#[command(
    name = "logic-vision",
    about = "Derive luminance and gradient logic from images and re-synthesize them",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    /// Falls back to LOGIC_VISION_LOG, then info.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the logic tensor of an image and write a synthesized result.
    Run {
        /// Input image (png, jpg, bmp, tiff).
        input: PathBuf,

        /// Output image; the format follows the extension.
        output: PathBuf,

        /// reconstruct, visualize_flow, quantum_inverse or energy_boost.
        /// Falls back to LOGIC_VISION_MODE, then reconstruct.
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Convert an image into its JSON text representation.
    ToText {
        image: PathBuf,
        json: PathBuf,

        /// Decimal digits kept per value.
        #[arg(long, default_value_t = DEFAULT_PRECISION)]
        precision: u32,
    },

    /// Rebuild an image from its JSON text representation.
    FromText { json: PathBuf, image: PathBuf },

    /// Print the logic sample at one pixel as JSON.
    Inspect {
        image: PathBuf,

        /// Column.
        #[arg(long, allow_negative_numbers = true)]
        x: i64,

        /// Row.
        #[arg(long, allow_negative_numbers = true)]
        y: i64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = resolve_log_level(cli.log_level.as_deref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            mode,
        } => {
            let mode = resolve_mode(mode.as_deref()).with_context(|| {
                format!("accepted modes: {}", SynthesisMode::names().join(", "))
            })?;
            tracing::debug!("Resolved synthesis mode: {mode}");
            let report = logic_vision::run(&input, &output, mode)
                .with_context(|| format!("failed to process {}", input.display()))?;
            println!(
                "{}: {}x{} in {:.4}s -> {}",
                report.mode,
                report.width,
                report.height,
                report.elapsed.as_secs_f64(),
                output.display()
            );
        }

        Commands::ToText {
            image,
            json,
            precision,
        } => {
            logic_vision::image_to_text(&image, &json, precision)
                .with_context(|| format!("failed to convert {}", image.display()))?;
            println!("Wrote {}", json.display());
        }

        Commands::FromText { json, image } => {
            logic_vision::text_to_image(&json, &image)
                .with_context(|| format!("failed to rebuild from {}", json.display()))?;
            println!("Wrote {}", image.display());
        }

        Commands::Inspect { image, x, y } => {
            match logic_vision::inspect(&image, x, y)
                .with_context(|| format!("failed to inspect {}", image.display()))?
            {
                Some(atom) => println!("{}", serde_json::to_string_pretty(&atom)?),
                None => {
                    eprintln!("({x}, {y}) is out of bounds for {}", image.display());
                    std::process::exit(1);
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "logic-vision", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_mode() {
        let cli = Cli::try_parse_from([
            "logic-vision",
            "run",
            "in.png",
            "out.png",
            "--mode",
            "energy_boost",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { mode, output, .. } => {
                assert_eq!(mode.as_deref(), Some("energy_boost"));
                assert_eq!(output, PathBuf::from("out.png"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_to_text_default_precision() {
        let cli = Cli::try_parse_from(["logic-vision", "to-text", "a.png", "a.json"]).unwrap();
        match cli.command {
            Commands::ToText { precision, .. } => assert_eq!(precision, DEFAULT_PRECISION),
            _ => panic!("expected to-text"),
        }
    }

    #[test]
    fn test_parse_inspect_negative_row() {
        let cli =
            Cli::try_parse_from(["logic-vision", "inspect", "a.png", "--x", "0", "--y", "-1"])
                .unwrap();
        match cli.command {
            Commands::Inspect { x, y, .. } => assert_eq!((x, y), (0, -1)),
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["logic-vision"]).is_err());
    }
}
