use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the line-count file. All of them abort the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("the file '{}' was not found", path.display())]
    NotFound { path: PathBuf },
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: could not read: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 3 fields (date source_lines test_lines), found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid date '{value}': {source}")]
    Date {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("line {line}: invalid {column} count '{value}': {source}")]
    Count {
        line: usize,
        column: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("no measurements found")]
    Empty,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot, the line counts are empty")]
    NoData,
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("could not display the figure: {0}")]
    Display(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Load(LoadError::NotFound { .. }))
    }

    /// The message printed on stdout when a run fails.
    pub fn user_message(&self) -> String {
        match self {
            Error::Load(LoadError::NotFound { path }) => format!(
                "Error: The file '{}' was not found. \
                Make sure the line counting script output is saved to this path.",
                path.display()
            ),
            e => format!("An error occurred: {}", e),
        }
    }
}
