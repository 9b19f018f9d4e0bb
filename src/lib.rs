//! LRU set-associative cache simulator for Valgrind memory traces.

pub mod cache;
pub mod error;
pub mod experiments;
pub mod geometry;
pub mod simulator;
pub mod summary;
pub mod trace;

pub use error::{MalformedRecord, SimError};
pub use geometry::Geometry;
pub use simulator::{AccessOutcome, CacheStats, RecordOutcome, Simulator};
pub use summary::Summary;
pub use trace::{AccessKind, TraceAccess, TraceFile};
