use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::bail;
use fibersweep::{commands, default_data_dir, init_logging};
use fibersweep_core::SaveOutcome;

#[derive(Parser, Debug)]
#[command(name = "fibersweep")]
#[command(about = "Parametric sweeps over layered optical fiber models")]
struct Args {
    /// Path to the data directory (default: ~/.fibersweep/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a sweep file against a model for missing or duplicate paths
    Check {
        /// Model description (.yaml or .json)
        model: PathBuf,
        /// Sweep description (.yaml)
        sweep: PathBuf,
    },
    /// Summarize a saved sweep output (.json or .fsim)
    Inspect { path: PathBuf },
    /// Convert a saved sweep output to the other format
    Convert {
        input: PathBuf,
        /// Target path; its extension selects the format
        output: PathBuf,
        /// Overwrite an existing target
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    match args.command {
        Command::Check { model, sweep } => {
            let report = commands::check(&model, &sweep)?;
            print!("{}", commands::format_report(&report));
            if !report.ready {
                bail!("sweep is not ready");
            }
        }
        Command::Inspect { path } => {
            print!("{}", commands::inspect(&path)?);
        }
        Command::Convert {
            input,
            output,
            force,
        } => match commands::convert(&input, &output, force)? {
            SaveOutcome::Saved(path) => println!("Saved {}", path.display()),
            SaveOutcome::OverwriteDeclined(path) => {
                bail!("{} exists; pass --force to overwrite", path.display())
            }
            SaveOutcome::Incomplete => bail!("{} holds no sweep data", input.display()),
        },
    }

    tracing::info!("fibersweep finished");
    Ok(())
}
