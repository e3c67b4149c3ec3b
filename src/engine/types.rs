//! Sync tuning knobs and counters

/// Records between incremental state checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Per-run tuning for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records between checkpoints on incremental streams (0 = only at slice end)
    pub checkpoint_interval: usize,
    /// Cap on records per stream (0 = unlimited)
    pub max_records: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            max_records: 0,
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint every `interval` records instead of the default
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Stop each stream after `max` records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }
}

/// Counters the engine accumulates while a sync runs
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub records_synced: usize,
    pub pages_fetched: usize,
    pub streams_synced: usize,
    pub slices_synced: usize,
    pub duration_ms: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    pub fn add_slice(&mut self) {
        self.slices_synced += 1;
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
