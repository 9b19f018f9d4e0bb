use std::{error::Error, fmt, io, path::PathBuf};

/// A trace line that did not match `<kind> <hex-address>,<size>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub line_number: usize,
    pub text: String,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {:?}", self.line_number, self.text)
    }
}

#[derive(Debug)]
pub enum SimError {
    InvalidGeometry(String),
    TraceUnavailable { path: PathBuf, source: io::Error },
    MalformedRecord(MalformedRecord),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidGeometry(reason) => write!(f, "invalid cache geometry: {reason}"),
            SimError::TraceUnavailable { path, .. } => {
                write!(f, "unable to read trace file {}", path.display())
            }
            SimError::MalformedRecord(record) => write!(f, "malformed trace record at {record}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::TraceUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MalformedRecord> for SimError {
    fn from(record: MalformedRecord) -> Self {
        SimError::MalformedRecord(record)
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
