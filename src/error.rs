use std::path::PathBuf;

use thiserror::Error;

/// Every failure the library can report.
///
/// Nothing in the crate terminates the process: missing files, missing
/// keywords and unparseable tokens all surface here and are returned to the
/// caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} does not exist", .path.display())]
    DocumentNotFound { path: PathBuf },

    #[error("keywords '{keywords}' not found in {}", .path.display())]
    KeywordNotFound { keywords: String, path: PathBuf },

    #[error("keywords '{keywords}' have no value in {}", .path.display())]
    MissingValue { keywords: String, path: PathBuf },

    #[error("keyword query is empty")]
    EmptyKeywords,

    #[error("cannot convert '{token}' to {target} (keywords '{keywords}')")]
    ValueConversion {
        token: String,
        target: &'static str,
        keywords: String,
    },

    /// `line` is the 1-based line of the record in the file, metadata and
    /// header rows included.
    #[error("line {line}, column '{column}': cannot convert '{value}' to {target}")]
    CellConversion {
        line: usize,
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("{} is not a file", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("{} already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("column '{column}' not found in {}", .path.display())]
    ColumnNotFound { column: String, path: PathBuf },

    #[error("{0}")]
    ShapeMismatch(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to parse {format} in {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach a path to a bare `io::Error`.
pub(crate) trait IoContext<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
