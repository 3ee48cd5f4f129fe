use std::process;
use std::sync::atomic::AtomicBool;

use log::error;

use gridword::config::Cli;
use gridword::dictionary::Dictionary;
use gridword::display::RenderSnapshot;
use gridword::logging;
use gridword::output;
use gridword::search::{self, SearchSettings};

fn main() {
    logging::init_logger(false);
    let cli = Cli::parse();

    let dictionary = match Dictionary::load(&cli.special_dict_path, &cli.ordinary_dict_path, cli.seed) {
        Ok(dictionary) => dictionary,
        Err(e) => {
            error!("failed to load dictionary: {}", e);
            process::exit(1);
        }
    };

    let settings = SearchSettings::new(cli.height, cli.width, cli.seed, cli.time_budget);
    // Not wired to a signal handler here; stays available for embedders
    // that want to cancel a run from another thread.
    let interrupt = AtomicBool::new(false);

    let outcome = search::run(&dictionary, &settings, &interrupt);
    let snapshot = RenderSnapshot::new(&outcome.crossword, outcome.score);
    println!("{}", snapshot);

    if let Err(e) = output::save(&cli.output_path, &outcome.crossword, outcome.score) {
        error!("failed to save grid: {}", e);
        process::exit(1);
    }
}
