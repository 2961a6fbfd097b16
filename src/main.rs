use clap::Parser;
use crossword_csp::{
    find_fill, generate_grid_config_from_template_string, render_grid, FillFailure, FillOptions,
    WordList,
};
use log::info;
use std::fmt::{Debug, Formatter};
use std::fs;

/// crossword_csp: fill a crossword structure with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with _ (or .) for fillable cells and anything else for blocks
    structure: String,

    /// Path to the word list, one word per line
    words: String,

    /// Optional path to write the filled grid to
    output: Option<String>,

    /// Give up after visiting this many search states [default: no limit]
    #[arg(long)]
    max_states: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn read_file(path: &str) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|err| Error(format!("Couldn't read file '{path}': {err}")))
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let grid_config = generate_grid_config_from_template_string(&read_file(&args.structure)?)
        .map_err(|err| Error(err.to_string()))?;
    let word_list = WordList::from_file_contents(&read_file(&args.words)?);

    info!(
        "loaded {} slots and {} words",
        grid_config.slot_count(),
        word_list.len()
    );

    let options = FillOptions {
        max_states: args.max_states,
    };

    match find_fill(&grid_config, &word_list, &options) {
        Ok(result) => {
            info!("{:?}", result.statistics);

            let display_grid = render_grid(&grid_config, &word_list, &result.assignment);
            println!("{display_grid}");

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n")
                    .map_err(|err| Error(format!("Couldn't write file '{output}': {err}")))?;
            }
        }
        Err(failure @ FillFailure::StateLimitReached { .. }) => {
            return Err(Error(failure.to_string()));
        }
        Err(failure) => {
            info!("{failure}");
            println!("No solution.");
        }
    }

    Ok(())
}
