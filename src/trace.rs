use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::{info, warn};

use crate::error::{MalformedRecord, Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Instruction,
    Load,
    Store,
    Modify,
    /// A well-formed record whose kind letter is not one of `I`, `L`, `S`, `M`.
    Other(char),
}

impl AccessKind {
    pub fn from_char(c: char) -> Self {
        match c {
            'I' => AccessKind::Instruction,
            'L' => AccessKind::Load,
            'S' => AccessKind::Store,
            'M' => AccessKind::Modify,
            other => AccessKind::Other(other),
        }
    }

    /// Number of cache accesses a record of this kind issues.
    pub fn access_count(&self) -> usize {
        match self {
            AccessKind::Load | AccessKind::Store => 1,
            AccessKind::Modify => 2,
            AccessKind::Instruction | AccessKind::Other(_) => 0,
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Instruction => write!(f, "I"),
            AccessKind::Load => write!(f, "L"),
            AccessKind::Store => write!(f, "S"),
            AccessKind::Modify => write!(f, "M"),
            AccessKind::Other(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceAccess {
    pub kind: AccessKind,
    pub address: u64,
    /// Access width in bytes; carried for display only.
    pub size: i32,
}

impl fmt::Display for TraceAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind, self.address, self.size)
    }
}

/// Parses one `<kind> <hex-address>,<size>` record. Leading whitespace is allowed.
pub fn parse_record(line: &str) -> Option<TraceAccess> {
    let line = line.trim_start();
    let mut chars = line.chars();
    let kind = chars.next()?;
    let rest = chars.as_str();
    // At least one separator between the kind and the address.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (addr, size) = rest.trim().split_once(',')?;
    let address = parse_address(addr)?;
    // Whitespace before the size is tolerated, as a `%d` scan would.
    let size = size.trim_start().parse::<i32>().ok()?;
    Some(TraceAccess {
        kind: AccessKind::from_char(kind),
        address,
        size,
    })
}

fn parse_address(token: &str) -> Option<u64> {
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(hex, 16).ok()
}

#[derive(Debug, Clone)]
pub struct TraceFile {
    pub name: String,
    pub entries: Vec<TraceAccess>,
    /// First record that failed to parse; nothing after it was read.
    pub truncated_at: Option<MalformedRecord>,
}

impl TraceFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source: io::Error| SimError::TraceUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unavailable)?;
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(name, BufReader::new(file)).map_err(unavailable)
    }

    /// Reads records until end of input or the first malformed line.
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead) -> io::Result<Self> {
        let name = name.into();
        let mut entries = Vec::new();
        let mut truncated_at = None;
        for (idx, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    truncated_at = Some(MalformedRecord {
                        line_number: idx + 1,
                        text: String::from("<invalid UTF-8>"),
                    });
                    break;
                }
                Err(e) => return Err(e),
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(&line) {
                Some(access) => entries.push(access),
                None => {
                    truncated_at = Some(MalformedRecord {
                        line_number: idx + 1,
                        text: line,
                    });
                    break;
                }
            }
        }
        if let Some(record) = &truncated_at {
            warn!("{name}: stopped reading at malformed record {record}");
        }
        info!("{name}: {} records", entries.len());
        Ok(Self {
            name,
            entries,
            truncated_at,
        })
    }

    /// Total cache accesses the trace issues; instruction fetches count zero, modifies two.
    pub fn access_count(&self) -> usize {
        self.entries.iter().map(|e| e.kind.access_count()).sum()
    }
}
