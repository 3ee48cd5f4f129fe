use std::time::Duration;

use clap::{App, Arg};

/// Default wall-clock budget for one search run, in seconds.
const DEFAULT_TIME_BUDGET_SECS: u64 = 30;
const DEFAULT_SEED: u64 = 13;
const DEFAULT_HEIGHT: usize = 15;
const DEFAULT_WIDTH: usize = 15;

/// Parsed command-line configuration: dictionary paths, output path, grid
/// dimensions, RNG seed, and the search time budget, each with a default.
#[derive(Debug, Clone)]
pub struct Cli {
    pub special_dict_path: String,
    pub ordinary_dict_path: String,
    pub output_path: String,
    pub height: usize,
    pub width: usize,
    pub seed: u64,
    pub time_budget: Duration,
}

impl Cli {
    pub fn parse() -> Self {
        let matches = App::new("gridword")
            .version("0.1.0")
            .about("Fills a rectangular grid so every maximal letter run is a dictionary word")
            .arg(
                Arg::with_name("special-dict")
                    .long("special-dict")
                    .value_name("FILE")
                    .help("path to the special word list")
                    .default_value("feff.txt"),
            )
            .arg(
                Arg::with_name("ordinary-dict")
                    .long("ordinary-dict")
                    .value_name("FILE")
                    .help("path to the ordinary word list")
                    .default_value("words.txt"),
            )
            .arg(
                Arg::with_name("output")
                    .long("output")
                    .value_name("FILE")
                    .help("where to write the finished grid")
                    .default_value("sparade.txt"),
            )
            .arg(
                Arg::with_name("height")
                    .long("height")
                    .value_name("ROWS")
                    .help("grid height")
                    .default_value("15"),
            )
            .arg(
                Arg::with_name("width")
                    .long("width")
                    .value_name("COLS")
                    .help("grid width")
                    .default_value("15"),
            )
            .arg(
                Arg::with_name("seed")
                    .long("seed")
                    .value_name("N")
                    .help("RNG seed, for reproducible runs")
                    .default_value("13"),
            )
            .arg(
                Arg::with_name("time-budget-secs")
                    .long("time-budget-secs")
                    .value_name("SECS")
                    .help("wall-clock budget for the search")
                    .default_value("30"),
            )
            .get_matches();

        Cli {
            special_dict_path: matches.value_of("special-dict").unwrap().to_string(),
            ordinary_dict_path: matches.value_of("ordinary-dict").unwrap().to_string(),
            output_path: matches.value_of("output").unwrap().to_string(),
            height: parse_or(matches.value_of("height"), DEFAULT_HEIGHT),
            width: parse_or(matches.value_of("width"), DEFAULT_WIDTH),
            seed: parse_or(matches.value_of("seed"), DEFAULT_SEED),
            time_budget: Duration::from_secs(parse_or(matches.value_of("time-budget-secs"), DEFAULT_TIME_BUDGET_SECS)),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_unparseable_input() {
        assert_eq!(parse_or(Some("not-a-number"), 7usize), 7usize);
        assert_eq!(parse_or(Some("42"), 7usize), 42usize);
        assert_eq!(parse_or(None, 7usize), 7usize);
    }
}
