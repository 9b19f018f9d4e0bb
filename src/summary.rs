use std::{fmt, fs, io, path::Path};

use crate::simulator::CacheStats;

/// Final counters in the grader's `hits:H misses:M evictions:E` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary(pub CacheStats);

impl Summary {
    /// Writes `H M E` on a single line, the format graders compare against.
    pub fn write_results(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let CacheStats {
            hits,
            misses,
            evictions,
        } = self.0;
        fs::write(path, format!("{hits} {misses} {evictions}\n"))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.0.hits, self.0.misses, self.0.evictions
        )
    }
}
