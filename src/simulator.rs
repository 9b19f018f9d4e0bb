use std::fmt;

use log::debug;

use crate::{
    cache::{Cache, SetExt},
    error::Result,
    geometry::Geometry,
    trace::{AccessKind, TraceAccess},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses() as f64
        }
    }
}

/// Result of a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
    /// Miss in a full set; carries the tag that was replaced.
    MissEviction { evicted_tag: u64 },
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOutcome::Hit => write!(f, "hit"),
            AccessOutcome::Miss => write!(f, "miss"),
            AccessOutcome::MissEviction { .. } => write!(f, "miss eviction"),
        }
    }
}

/// What replaying one trace record did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Skipped,
    Single(AccessOutcome),
    /// A modify: the load, then the store to the same address.
    Modify(AccessOutcome, AccessOutcome),
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOutcome::Skipped => Ok(()),
            RecordOutcome::Single(outcome) => write!(f, "{outcome}"),
            RecordOutcome::Modify(first, second) => write!(f, "{first} {second}"),
        }
    }
}

/// One simulation run: the cache, its counters and the recency clock.
pub struct Simulator {
    geometry: Geometry,
    cache: Cache,
    stats: CacheStats,
    tick: u64,
}

impl Simulator {
    pub fn new(geometry: Geometry) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(&geometry)?,
            geometry,
            stats: CacheStats::default(),
            tick: 0,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn run_trace(&mut self, trace: &[TraceAccess]) -> CacheStats {
        self.run_trace_with(trace, |_, _| {})
    }

    /// Replays `trace` in order, reporting each record's outcome to `observe`.
    pub fn run_trace_with<F>(&mut self, trace: &[TraceAccess], mut observe: F) -> CacheStats
    where
        F: FnMut(&TraceAccess, RecordOutcome),
    {
        for access in trace {
            let outcome = self.apply(access);
            observe(access, outcome);
        }
        self.stats
    }

    pub fn apply(&mut self, access: &TraceAccess) -> RecordOutcome {
        match access.kind {
            AccessKind::Load | AccessKind::Store => {
                RecordOutcome::Single(self.access(access.address))
            }
            AccessKind::Modify => {
                let load = self.access(access.address);
                let store = self.access(access.address);
                RecordOutcome::Modify(load, store)
            }
            AccessKind::Instruction | AccessKind::Other(_) => RecordOutcome::Skipped,
        }
    }

    pub fn access(&mut self, address: u64) -> AccessOutcome {
        let (tag, set_index) = self.geometry.decompose(address);
        self.tick += 1;
        let tick = self.tick;
        let set = self.cache.set_mut(set_index);

        if let Some(way) = set.find_line(tag) {
            set[way].last_used = tick;
            self.stats.hits += 1;
            return AccessOutcome::Hit;
        }

        self.stats.misses += 1;
        if let Some(way) = set.first_invalid() {
            let line = &mut set[way];
            line.valid = true;
            line.tag = tag;
            line.last_used = tick;
            return AccessOutcome::Miss;
        }

        let way = set.lru_way();
        let line = &mut set[way];
        let evicted_tag = line.tag;
        line.tag = tag;
        line.last_used = tick;
        self.stats.evictions += 1;
        debug!("set {set_index} way {way}: evict tag {evicted_tag:#x} for {tag:#x}");
        AccessOutcome::MissEviction { evicted_tag }
    }
}
