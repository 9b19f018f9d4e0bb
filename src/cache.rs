use crate::{
    error::{Result, SimError},
    geometry::Geometry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
    /// Tick of the last touch; higher is more recent. Only meaningful when valid.
    pub last_used: u64,
}

impl CacheLine {
    fn invalid() -> Self {
        Self {
            valid: false,
            tag: 0,
            last_used: 0,
        }
    }

    pub fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}

/// Line storage for every set, laid out flat as `set_index * lines_per_set + way`.
#[derive(Debug, Clone)]
pub struct Cache {
    lines: Vec<CacheLine>,
    lines_per_set: usize,
    set_count: usize,
}

impl Cache {
    /// Allocates every line up front; fails instead of aborting when memory runs out.
    pub fn new(geometry: &Geometry) -> Result<Self> {
        let line_count = geometry.line_count();
        let mut lines = Vec::new();
        lines.try_reserve_exact(line_count).map_err(|e| {
            SimError::InvalidGeometry(format!("cannot allocate {line_count} cache lines: {e}"))
        })?;
        lines.resize(line_count, CacheLine::invalid());
        Ok(Self {
            lines,
            lines_per_set: geometry.lines_per_set(),
            set_count: line_count / geometry.lines_per_set(),
        })
    }

    pub fn set_count(&self) -> usize {
        self.set_count
    }

    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set
    }

    pub fn set(&self, set_index: usize) -> &[CacheLine] {
        let range = self.set_range(set_index);
        &self.lines[range]
    }

    pub fn set_mut(&mut self, set_index: usize) -> &mut [CacheLine] {
        let range = self.set_range(set_index);
        &mut self.lines[range]
    }

    pub fn line(&self, set_index: usize, way: usize) -> &CacheLine {
        assert!(way < self.lines_per_set, "way {way} out of range");
        &self.set(set_index)[way]
    }

    pub fn valid_lines(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    fn set_range(&self, set_index: usize) -> std::ops::Range<usize> {
        assert!(
            set_index < self.set_count,
            "set index {set_index} out of range for {} sets",
            self.set_count
        );
        let start = set_index * self.lines_per_set;
        start..start + self.lines_per_set
    }
}

/// Slot selection within one set.
pub(crate) trait SetExt {
    fn find_line(&self, tag: u64) -> Option<usize>;
    fn first_invalid(&self) -> Option<usize>;
    fn lru_way(&self) -> usize;
}

impl SetExt for [CacheLine] {
    fn find_line(&self, tag: u64) -> Option<usize> {
        self.iter().position(|line| line.holds(tag))
    }

    fn first_invalid(&self) -> Option<usize> {
        self.iter().position(|line| !line.valid)
    }

    /// Least recently used way; the lowest index wins a tie.
    fn lru_way(&self) -> usize {
        // min_by_key keeps the first of equal minima.
        self.iter()
            .enumerate()
            .min_by_key(|(_, line)| line.last_used)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}
