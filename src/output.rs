use std::fs::OpenOptions;
use std::io::Write;

use log::info;

use crate::crossword::Crossword;
use crate::error::OutputError;
use crate::scoring::Score;

/// Append the finished grid's render string plus a `Poäng: <score>` line and
/// a trailing blank line to `path`. Opens in append mode so every run
/// accumulates rather than overwriting the last one.
pub fn save(path: &str, crossword: &Crossword, score: Score) -> Result<(), OutputError> {
    let mut bank = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| OutputError::Write {
            path: path.to_string(),
            source,
        })?;
    write!(bank, "{}\nPoäng: {:.2}\n\n", crossword.grid().to_render_string(), score.total())
        .map_err(|source| OutputError::Write {
            path: path.to_string(),
            source,
        })?;
    info!("appended grid to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Placement, Position};

    fn score() -> Score {
        Score {
            word_score_total: 10.0,
            average_placement_length: 2.0,
            coverage: 0.5,
        }
    }

    #[test]
    fn save_appends_the_grid_and_score_line() {
        let mut cw = Crossword::new(2, 2);
        cw.apply(Placement::new("AB", Position::new(0, 0, Direction::Horizontal))).unwrap();
        let path = std::env::temp_dir().join(format!("gridword-output-test-{:?}", std::thread::current().id()));
        let path = path.to_str().unwrap().to_string();
        let _ = std::fs::remove_file(&path);

        save(&path, &cw, score()).unwrap();
        save(&path, &cw, score()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Poäng:").count(), 2, "each save call should append, not overwrite");
        assert!(contents.contains(&cw.grid().to_render_string()));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_reports_an_error_for_an_unwritable_path() {
        let cw = Crossword::new(2, 2);
        let result = save("/no/such/directory/out.txt", &cw, score());
        assert!(result.is_err());
    }
}
