use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use instant::Duration;

use crossfill::{find_fill, render_grid, FillFailure, FillOptions, Grid, Puzzle, WordList};

/// Fill a crossword structure with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Structure file: one line per row, `_` for a fillable cell, `#` for a block
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Where to write the rendered fill, if anywhere
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Give up after visiting this many search states
    #[arg(long)]
    state_limit: Option<u64>,

    /// Log debug output (also enabled by CROSSFILL_DEBUG)
    #[arg(long)]
    debug: bool,
}

fn load_word_list(path: &Path) -> Result<WordList, std::io::Error> {
    let contents = fs::read_to_string(path)?;

    Ok(WordList::new(
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_uppercase),
    ))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug_enabled = cli.debug || std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::log::init_logger(debug_enabled);

    if let Err(e) = try_main(cli) {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let grid = Grid::from_template(&fs::read_to_string(&cli.structure)?)?;
    let puzzle = Puzzle::new(grid);
    let words = load_word_list(&cli.words)?;

    log::info!("Loaded {} slots and {} words", puzzle.slot_count(), words.len());

    let options = FillOptions {
        time_limit: cli.time_limit_secs.map(Duration::from_secs),
        state_limit: cli.state_limit,
    };

    let result = match find_fill(&puzzle, &words, options) {
        Ok(result) => result,
        Err(FillFailure::Unsatisfiable) => {
            println!("No solution.");
            return Ok(());
        }
        Err(failure) => return Err(failure.into()),
    };

    let display_grid = render_grid(&puzzle, &words, &result.assignment);

    println!("{:?}", result.statistics);
    println!("{}", display_grid);

    if let Some(output) = &cli.output {
        fs::write(output, &display_grid)?;
        log::info!("Wrote fill to {}", output.display());
    }

    Ok(())
}
