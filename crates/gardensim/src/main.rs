use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use gardensim::{Overrides, TEMPLATE, init_logging, load_scenario, render_summary};
use gardensim_core::simulation::{SimulationOptions, run_simulation};
use jiff::Zoned;

#[derive(Parser, Debug)]
#[command(name = "gardensim")]
#[command(about = "Monte Carlo harvest and investment forecasts for a garden plan")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file and print the result
    Run {
        /// Path to the YAML scenario
        scenario: PathBuf,

        /// Number of Monte Carlo iterations
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Histogram bin count
        #[arg(short, long)]
        bins: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print a text summary instead of JSON
        #[arg(long, conflicts_with = "pretty")]
        summary: bool,
    },
    /// Print an example scenario file
    Template,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let mut stdout = std::io::stdout().lock();

    match args.command {
        Command::Template => {
            stdout.write_all(TEMPLATE.as_bytes())?;
        }
        Command::Run {
            scenario,
            iterations,
            seed,
            bins,
            pretty,
            summary,
        } => {
            let today = Zoned::now().date();
            let mut config = load_scenario(&scenario, today)?;
            Overrides {
                iterations,
                seed,
                histogram_bins: bins,
            }
            .apply(&mut config);

            let result = run_simulation(&config, SimulationOptions::default())
                .wrap_err("Simulation failed")?;

            if summary {
                stdout.write_all(render_summary(&result).as_bytes())?;
            } else {
                if pretty {
                    serde_json::to_writer_pretty(&mut stdout, &result)?;
                } else {
                    serde_json::to_writer(&mut stdout, &result)?;
                }
                writeln!(stdout)?;
            }
        }
    }

    tracing::debug!("gardensim finished");
    Ok(())
}
