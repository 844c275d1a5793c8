use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::engine::ApplicantScores;

/// Column holding the applicant reference in batch files.
pub const APPLICANT_COLUMN: &str = "applicant";

#[derive(Debug)]
pub enum ApplicantImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingApplicantColumn,
    InvalidScore {
        line: usize,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for ApplicantImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicantImportError::Io(err) => write!(f, "failed to read applicant scores: {}", err),
            ApplicantImportError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
            ApplicantImportError::MissingApplicantColumn => {
                write!(f, "applicant CSV must contain an '{}' column", APPLICANT_COLUMN)
            }
            ApplicantImportError::InvalidScore {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: score '{}' for {} is not a number",
                line, value, column
            ),
        }
    }
}

impl std::error::Error for ApplicantImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicantImportError::Io(err) => Some(err),
            ApplicantImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ApplicantImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ApplicantImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One applicant row from a batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRow {
    pub applicant: String,
    pub scores: ApplicantScores,
}

/// Reads batch files with an `applicant` column and one column per leaf id.
///
/// Blank cells are treated as unanswered and left out of the score map.
pub struct ApplicantBatchImporter;

impl ApplicantBatchImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ApplicantRow>, ApplicantImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicantRow>, ApplicantImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        if !csv_reader
            .headers()?
            .iter()
            .any(|header| header == APPLICANT_COLUMN)
        {
            return Err(ApplicantImportError::MissingApplicantColumn);
        }

        let mut rows = Vec::new();
        for (offset, record) in csv_reader
            .deserialize::<BTreeMap<String, String>>()
            .enumerate()
        {
            let mut cells = record?;
            let line = offset + 2;
            let applicant = cells.remove(APPLICANT_COLUMN).unwrap_or_default();

            let mut scores = ApplicantScores::new();
            for (column, value) in cells {
                if value.is_empty() {
                    continue;
                }
                let score = value
                    .parse::<f64>()
                    .map_err(|_| ApplicantImportError::InvalidScore {
                        line,
                        column: column.clone(),
                        value: value.clone(),
                    })?;
                scores.insert(column, score);
            }

            rows.push(ApplicantRow { applicant, scores });
        }

        Ok(rows)
    }
}
