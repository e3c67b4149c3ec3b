//! The read loop
//!
//! [`SyncEngine`] walks one stream at a time: slices in order, pages
//! in ascending offset order within a slice. The stream definition
//! supplies the strategies (path, slicing, extraction, cursor) and
//! the engine composes them around the HTTP client. Retry, backoff,
//! and rate limiting all live in the client; the engine only decides
//! what to fetch next and what to emit.

mod types;

pub use types::{SyncConfig, SyncStats, DEFAULT_CHECKPOINT_INTERVAL};

use crate::cursor::CursorTracker;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{HeaderPaginator, PaginationState, Paginator};
use crate::records::RecordExtractor;
use crate::slices::StreamSlice;
use crate::source::Message;
use crate::state::StateManager;
use crate::streams::StreamDef;
use crate::types::SyncMode;
use serde_json::Value;
use std::time::Instant;

/// Drives the per-stream fetch loop
pub struct SyncEngine {
    client: HttpClient,
    state: StateManager,
    config: SyncConfig,
    stats: SyncStats,
}

impl SyncEngine {
    pub fn new(client: HttpClient, state: StateManager) -> Self {
        Self {
            client,
            state,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Counters accumulated since the last reset
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SyncStats::default();
    }

    /// Sync a single stream across all its slices
    ///
    /// Incremental streams are seeded from persisted state before the
    /// first slice, checkpointed every `checkpoint_interval` records,
    /// and checkpointed again after each slice completes. A stream
    /// run under full refresh never touches state, even when the
    /// stream could sync incrementally.
    pub async fn sync_stream(
        &mut self,
        def: &StreamDef,
        sync_mode: SyncMode,
        project_ids: &[u64],
    ) -> Result<Vec<Message>> {
        let start = Instant::now();
        let mut messages = vec![Message::info(format!(
            "Starting sync for stream: {}",
            def.name
        ))];

        let mut cursor = match sync_mode {
            SyncMode::Incremental => def.cursor(),
            SyncMode::FullRefresh => None,
        };
        if let Some(tracker) = cursor.as_mut() {
            if let Some(stream_state) = self.state.get_stream(def.name).await {
                tracker.set_state(&stream_state)?;
            }
        }

        let slices = def.slice_generator(project_ids).slices();
        let extractor = def.extractor();

        let mut emitted = 0usize;
        let mut since_checkpoint = 0usize;
        let mut pages = 0usize;

        for slice in slices {
            let limit_reached = self
                .sync_slice(
                    def,
                    slice,
                    extractor.as_ref(),
                    &mut cursor,
                    &mut emitted,
                    &mut since_checkpoint,
                    &mut pages,
                    &mut messages,
                )
                .await?;

            if let Some(tracker) = cursor.as_ref() {
                let snapshot = tracker.snapshot();
                self.state.set_stream(def.name, snapshot.clone()).await?;
                messages.push(Message::state(def.name, Value::Object(snapshot)));
                since_checkpoint = 0;
            }
            self.stats.add_slice();

            if limit_reached {
                break;
            }
        }

        self.stats.add_stream();
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        messages.push(Message::info(format!(
            "Completed sync for {}: {emitted} records in {pages} pages",
            def.name
        )));

        Ok(messages)
    }

    /// Fetch every page of one slice
    ///
    /// Returns true when the per-stream record limit was hit.
    #[allow(clippy::too_many_arguments)]
    async fn sync_slice(
        &mut self,
        def: &StreamDef,
        slice: StreamSlice,
        extractor: &dyn RecordExtractor,
        cursor: &mut Option<CursorTracker>,
        emitted: &mut usize,
        since_checkpoint: &mut usize,
        pages: &mut usize,
        messages: &mut Vec<Message>,
    ) -> Result<bool> {
        let path = def.path_for(&slice)?;

        // One lower bound for every page of this slice. Records seen
        // here advance the watermark for later slices and syncs only.
        let filter_params = cursor.as_ref().map(CursorTracker::filter_params);

        let paginator = HeaderPaginator::new();
        let mut pagination_state = PaginationState::new();

        loop {
            let mut request = RequestConfig::new();
            if let Some(params) = &filter_params {
                for (key, value) in params {
                    request = request.query(key, value);
                }
            }
            for (key, value) in paginator.initial_params(&pagination_state) {
                request = request.query(&key, &value);
            }

            let response = self.client.get_with_config(&path, request).await?;
            let headers = response.headers().clone();
            let body: Value = response.json().await?;

            let records = extractor.extract(&body)?;
            let record_count = records.len();

            *pages += 1;
            self.stats.add_page();
            messages.push(Message::debug(format!(
                "Page {pages}: fetched {record_count} records from {path}"
            )));

            for record in records {
                if let Some(tracker) = cursor.as_mut() {
                    tracker.advance(&record);
                }
                messages.push(Message::record(def.name, Value::Object(record)));
                self.stats.add_records(1);
                *emitted += 1;
                *since_checkpoint += 1;

                if let Some(tracker) = cursor.as_ref() {
                    if self.config.checkpoint_interval > 0
                        && *since_checkpoint >= self.config.checkpoint_interval
                    {
                        let snapshot = tracker.snapshot();
                        self.state.set_stream(def.name, snapshot.clone()).await?;
                        messages.push(Message::state(def.name, Value::Object(snapshot)));
                        *since_checkpoint = 0;
                    }
                }

                if self.config.max_records > 0 && *emitted >= self.config.max_records {
                    return Ok(true);
                }
            }

            let next = paginator.process_response(&headers, record_count, &mut pagination_state)?;
            if next.is_done() {
                break;
            }
        }

        Ok(false)
    }
}
