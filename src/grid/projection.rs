use super::Cell;

/// Split a row/column into maximal letter runs, on EMPTY first and then on
/// BLOCK, keeping runs of length >= 2. Returns each run's starting index
/// along the axis plus its text.
pub fn extract_runs(cells: &[Cell]) -> Vec<(usize, String)> {
    let mut runs = vec![];
    let mut current_start: Option<usize> = None;
    let mut current_text = String::new();

    for (i, cell) in cells.iter().enumerate() {
        match cell {
            Cell::Letter(c) => {
                if current_start.is_none() {
                    current_start = Some(i);
                }
                current_text.push(*c);
            }
            Cell::Empty | Cell::Block => {
                if let Some(start) = current_start.take() {
                    if current_text.chars().count() >= 2 {
                        runs.push((start, std::mem::take(&mut current_text)));
                    } else {
                        current_text.clear();
                    }
                }
            }
        }
    }
    if let Some(start) = current_start.take() {
        if current_text.chars().count() >= 2 {
            runs.push((start, current_text));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(s: &str) -> Vec<Cell> {
        s.chars()
            .map(|c| match c {
                ' ' => Cell::Empty,
                '#' => Cell::Block,
                letter => Cell::Letter(letter),
            })
            .collect()
    }

    #[test]
    fn splits_on_empty_and_block() {
        let row = cells("CAT DOG#AT A");
        let runs = extract_runs(&row);
        assert_eq!(
            runs,
            vec![(0, "CAT".to_string()), (4, "DOG".to_string()), (8, "AT".to_string())]
        );
    }

    #[test]
    fn single_letter_runs_are_dropped() {
        let row = cells("A B C");
        assert!(extract_runs(&row).is_empty());
    }

    #[test]
    fn whole_row_is_one_run() {
        let row = cells("CAT");
        assert_eq!(extract_runs(&row), vec![(0, "CAT".to_string())]);
    }
}
