use crate::core::models::perturbation::TargetClassification;
use crate::core::models::sequence::{Nucleotide, Sequence};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Reactivity assigned to positions absent from a probing file.
pub const MISSING_REACTIVITY: f64 = -1.0;

#[derive(Debug, Error)]
pub enum ProbingError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ProbingParseErrorKind,
    },
    #[error("Position {position} is outside the sequence (length {length})")]
    PositionOutOfRange { position: usize, length: usize },
    #[error("Nucleotide '{found}' at position {position} does not match sequence symbol '{expected}'")]
    NucleotideMismatch {
        position: usize,
        expected: char,
        found: String,
    },
    #[error("Probing data contains no reactivity values")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ProbingParseErrorKind {
    #[error("Expected 2 or 3 fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid position '{0}'")]
    InvalidPosition(String),
    #[error("Invalid reactivity '{0}'")]
    InvalidReactivity(String),
}

#[derive(Debug, Deserialize)]
struct ProbingRecord {
    position: usize,
    #[serde(default)]
    nucleotide: Option<String>,
    reactivity: f64,
}

/// Per-position reactivities aligned to a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbingData {
    reactivities: Vec<f64>,
}

impl ProbingData {
    /// Reads whitespace-separated `<position> [<nucleotide>] <reactivity>` lines. Blank lines
    /// and lines starting with `#` are skipped.
    pub fn read_from(
        reader: &mut impl BufRead,
        sequence: &Sequence,
    ) -> Result<Self, ProbingError> {
        let mut data = Self::unassigned(sequence);
        let mut assigned = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let (position_str, nucleotide, reactivity_str) = match fields.as_slice() {
                [p, r] => (*p, None, *r),
                [p, n, r] => (*p, Some(*n), *r),
                _ => {
                    return Err(ProbingError::Parse {
                        line: line_num,
                        kind: ProbingParseErrorKind::FieldCount(fields.len()),
                    });
                }
            };
            let position: usize = position_str.parse().map_err(|_| ProbingError::Parse {
                line: line_num,
                kind: ProbingParseErrorKind::InvalidPosition(position_str.to_string()),
            })?;
            let reactivity: f64 = reactivity_str.parse().map_err(|_| ProbingError::Parse {
                line: line_num,
                kind: ProbingParseErrorKind::InvalidReactivity(reactivity_str.to_string()),
            })?;

            data.assign(sequence, position, nucleotide, reactivity)?;
            assigned += 1;
        }

        if assigned == 0 {
            return Err(ProbingError::Empty);
        }
        Ok(data)
    }

    /// Reads a CSV file with a `position,nucleotide,reactivity` header.
    pub fn read_csv_from(path: &Path, sequence: &Sequence) -> Result<Self, ProbingError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut data = Self::unassigned(sequence);
        let mut assigned = 0;

        for result in reader.deserialize::<ProbingRecord>() {
            let record = result?;
            data.assign(
                sequence,
                record.position,
                record.nucleotide.as_deref().filter(|n| !n.trim().is_empty()),
                record.reactivity,
            )?;
            assigned += 1;
        }

        if assigned == 0 {
            return Err(ProbingError::Empty);
        }
        Ok(data)
    }

    /// Dispatches on the file extension: `.csv` files go through the CSV reader, anything
    /// else is read as whitespace-separated columns.
    pub fn read_from_path<P: AsRef<Path>>(
        path: P,
        sequence: &Sequence,
    ) -> Result<Self, ProbingError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::read_csv_from(path, sequence)
        } else {
            let file = File::open(path)?;
            let mut reader = BufReader::new(file);
            Self::read_from(&mut reader, sequence)
        }
    }

    pub fn from_reactivities(reactivities: Vec<f64>) -> Self {
        Self { reactivities }
    }

    fn unassigned(sequence: &Sequence) -> Self {
        Self {
            reactivities: vec![MISSING_REACTIVITY; sequence.len()],
        }
    }

    fn assign(
        &mut self,
        sequence: &Sequence,
        position: usize,
        nucleotide: Option<&str>,
        reactivity: f64,
    ) -> Result<(), ProbingError> {
        let length = sequence.len();
        if position == 0 || position > length {
            return Err(ProbingError::PositionOutOfRange { position, length });
        }
        if let Some(symbol) = nucleotide {
            let mut chars = symbol.trim().chars();
            let parsed = match (chars.next(), chars.next()) {
                (Some(c), None) => Nucleotide::from_symbol(c.to_ascii_uppercase()),
                _ => None,
            };
            if parsed != Some(sequence.at(position)) {
                return Err(ProbingError::NucleotideMismatch {
                    position,
                    expected: sequence.symbol_at(position),
                    found: symbol.to_string(),
                });
            }
        }
        self.reactivities[position - 1] = reactivity;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.reactivities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactivities.is_empty()
    }

    pub fn reactivities(&self) -> &[f64] {
        &self.reactivities
    }

    /// Thresholds the reactivities into paired (0) / unpaired (1) targets.
    pub fn classify(&self, cutoff: f64) -> TargetClassification {
        TargetClassification::from_reactivities(&self.reactivities, cutoff)
    }
}
