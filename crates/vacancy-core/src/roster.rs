use thiserror::Error;

/// An employer the operator can pick for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub employer_id: i64,
    pub name: &'static str,
}

/// The fixed set of employers offered for ingestion, shown 1-based.
pub const ROSTER: &[RosterEntry] = &[
    RosterEntry { employer_id: 1740, name: "Yandex" },
    RosterEntry { employer_id: 87021, name: "Wildberries" },
    RosterEntry { employer_id: 15478, name: "VK" },
    RosterEntry { employer_id: 3529, name: "Sberbank" },
    RosterEntry { employer_id: 4181, name: "VTB" },
    RosterEntry { employer_id: 3776, name: "MTS" },
    RosterEntry { employer_id: 39305, name: "Gazprom" },
    RosterEntry { employer_id: 6596, name: "Rosneft" },
    RosterEntry { employer_id: 80, name: "Alfabank" },
    RosterEntry { employer_id: 2180, name: "Ozon" },
];

/// Rejected company selection input. The caller re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no companies selected")]
    Empty,

    #[error("'{0}' is not a company number")]
    NotANumber(String),

    #[error("invalid indices: {}. Choose numbers from 1 to {max}", join(.indices))]
    OutOfRange { indices: Vec<usize>, max: usize },
}

fn join(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse comma-separated 1-based indices into 0-based positions.
///
/// Blank tokens are ignored and repeated indices collapse onto their first
/// occurrence. Every out-of-range index is collected into one error.
pub fn parse_selection(input: &str, roster_len: usize) -> Result<Vec<usize>, SelectionError> {
    let mut selected = Vec::new();
    let mut out_of_range = Vec::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let index: usize = token
            .parse()
            .map_err(|_| SelectionError::NotANumber(token.to_string()))?;
        if !(1..=roster_len).contains(&index) {
            out_of_range.push(index);
        } else if !selected.contains(&(index - 1)) {
            selected.push(index - 1);
        }
    }

    if !out_of_range.is_empty() {
        return Err(SelectionError::OutOfRange {
            indices: out_of_range,
            max: roster_len,
        });
    }
    if selected.is_empty() {
        return Err(SelectionError::Empty);
    }
    Ok(selected)
}

/// Resolve a selection string against [`ROSTER`].
pub fn select_companies(input: &str) -> Result<Vec<RosterEntry>, SelectionError> {
    Ok(parse_selection(input, ROSTER.len())?
        .into_iter()
        .map(|i| ROSTER[i])
        .collect())
}
