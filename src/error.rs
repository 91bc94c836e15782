use thiserror::Error;

/// Failures while reading and normalizing a source spreadsheet.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("not a facility income report (no recognizable columns): {0}")]
    Unrecognized(String),

    #[error("invalid report month: {0}")]
    InvalidMonth(String),

    #[error("invalid report year: {0}")]
    InvalidYear(String),
}

/// Failures in the persistence engine. A failed store rolls back the
/// whole period replace.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("records span more than one period: expected {expected}, found {found}")]
    MixedPeriods { expected: String, found: String },
}

/// Failures while building or writing the Sage GLS export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("mapping file error: {0}")]
    Mapping(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SiloError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SiloError>;
