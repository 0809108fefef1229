pub mod accommodations;
pub mod assignments;
pub mod categories;
pub mod extensions;
pub mod grades;
pub mod roster;

/// Loader-boundary failures abort the whole run; a partial report is
/// worse than no report.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("assignment '{assignment}' references unknown category '{category}'")]
    UnknownCategory {
        assignment: String,
        category: String,
    },
    #[error("grade export is missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("invalid score '{value}' for assignment '{assignment}'")]
    InvalidScore { assignment: String, value: String },
    #[error("invalid lateness '{value}': expected H:M:S")]
    InvalidLateness { value: String },
}

pub(crate) fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}
