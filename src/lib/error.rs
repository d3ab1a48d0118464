use std::path::PathBuf;

/// Errors which abort the construction of the caller.
/// Anything which is only a missing call is returned
/// as `None` by the factories and never ends up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ERROR: required input collection missing: {0}")]
    MissingInput(&'static str),

    #[error("ERROR: Variant mate attributes did not match: {first}\t{second}")]
    MateMismatch {
        first: String,
        second: String,
    },

    #[error("ERROR: breakpoint ID {0} waits twice for a mate")]
    DuplicateBreakpointId(String),

    #[error("ERROR: contig {0} not present in the sequence dictionary")]
    UnknownContig(String),

    #[error("ERROR: invalid interval on contig {contig}: start {start} > end {end}")]
    InvalidInterval {
        contig: u32,
        start: u64,
        end: u64,
    },

    #[error("ERROR: invalid parameter: {0}")]
    Parameter(String),

    #[error("ERROR: I/O error: {source} ({path:?})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("ERROR: could not parse tab-separated input: {0}")]
    Csv(#[from] csv::Error),

    #[error("ERROR: malformed entry in {path:?} line {line}: {msg}")]
    Parse {
        path: PathBuf,
        line: u64,
        msg: String,
    },
}

impl Error {
    /// wraps an `io::Error` together with the file it came from
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}
