use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use instant::Duration;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use xwfill::{find_fill_with_options, render_grid, FillFailure, FillOptions, Puzzle, WordList};

/// Fill a crossword grid from a word list.
#[derive(Parser, Debug)]
#[command(name = "xwfill", version)]
struct Args {
    /// Structure file: one line per row, `_` for open cells and `#` for blocks
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Log more; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _ = TermLogger::init(args.log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    let puzzle = Puzzle::load(&args.structure)
        .with_context(|| format!("Unable to load structure from {}", args.structure.display()))?;
    let words = WordList::load(&args.words)
        .with_context(|| format!("Unable to load words from {}", args.words.display()))?;

    let options = FillOptions {
        deadline: args.timeout.map(Duration::from_secs_f64),
    };

    match find_fill_with_options(&puzzle, &words, &options) {
        Ok(result) => {
            info!("{:?}", result.statistics);

            let display_grid = render_grid(&puzzle, &words, &result.assignment);
            println!("{}", display_grid);

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n")
                    .with_context(|| format!("Unable to write {}", output.display()))?;
                info!("written grid to {}", output.display());
            }
        }
        Err(FillFailure::DeadlineExceeded) => {
            info!("{}", FillFailure::DeadlineExceeded);
            println!("No solution found in time.");
        }
        Err(failure) => {
            info!("{}", failure);
            println!("No solution.");
        }
    }

    Ok(())
}
