//! Stream descriptor types

use crate::cursor::CursorTracker;
use crate::error::{Error, Result};
use crate::records::{ActivityExtractor, RecordExtractor, RootArrayExtractor};
use crate::slices::{ProjectSlices, SingleSlice, SliceGenerator, StreamSlice};
use crate::types::SyncMode;

// ============================================================================
// Stream Capabilities
// ============================================================================

/// Where a stream's endpoint lives relative to the API root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamScope {
    /// One endpoint for the whole account
    Global { path: &'static str },

    /// One endpoint per project, under `projects/{id}/`
    PerProject { subpath: &'static str },
}

impl StreamScope {
    /// Whether the stream reads a single account-wide endpoint
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global { .. })
    }
}

/// How a stream syncs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Re-read everything on every sync
    FullRefresh,

    /// Watermark on a record timestamp, filtered server-side
    Incremental {
        /// Record field carrying the watermark timestamp
        cursor_field: &'static str,
        /// Query parameter carrying the watermark on requests
        filter_param: &'static str,
    },
}

/// How response records are reshaped before emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Array elements pass through as returned
    Bare,

    /// `project.id` is lifted to a top-level `project_id` field
    LiftProjectId,
}

// ============================================================================
// Stream Definition
// ============================================================================

/// Static description of one stream's endpoint and sync capabilities
///
/// The read engine is generic over these capabilities: the scope picks
/// the path and slicing strategy, the mode picks the cursor strategy,
/// and the shape picks the record extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDef {
    /// Unique stream name
    pub name: &'static str,

    /// Endpoint location
    pub scope: StreamScope,

    /// Sync mode capabilities
    pub mode: StreamMode,

    /// Primary key field
    pub primary_key: &'static str,

    /// Record reshaping applied after extraction
    pub shape: RecordShape,
}

impl StreamDef {
    /// Resolve the request path for one slice
    pub fn path_for(&self, slice: &StreamSlice) -> Result<String> {
        match self.scope {
            StreamScope::Global { path } => Ok(path.to_string()),
            StreamScope::PerProject { subpath } => {
                let project_id = slice.project_id.ok_or_else(|| {
                    Error::config(format!("stream '{}' requires a project slice", self.name))
                })?;
                Ok(format!("projects/{project_id}/{subpath}"))
            }
        }
    }

    /// Build the slice generator for a resolved project-id list
    pub fn slice_generator(&self, project_ids: &[u64]) -> Box<dyn SliceGenerator> {
        match self.scope {
            StreamScope::Global { .. } => Box::new(SingleSlice::new()),
            StreamScope::PerProject { .. } => Box::new(ProjectSlices::new(project_ids.to_vec())),
        }
    }

    /// Build the record extractor for this stream's response shape
    pub fn extractor(&self) -> Box<dyn RecordExtractor> {
        match self.shape {
            RecordShape::Bare => Box::new(RootArrayExtractor::new()),
            RecordShape::LiftProjectId => Box::new(ActivityExtractor::new()),
        }
    }

    /// Build the cursor tracker, if the stream syncs incrementally
    pub fn cursor(&self) -> Option<CursorTracker> {
        match self.mode {
            StreamMode::FullRefresh => None,
            StreamMode::Incremental {
                cursor_field,
                filter_param,
            } => Some(CursorTracker::new(cursor_field, filter_param)),
        }
    }

    /// Whether the stream supports incremental sync
    pub fn is_incremental(&self) -> bool {
        matches!(self.mode, StreamMode::Incremental { .. })
    }

    /// The cursor field name, if incremental
    pub fn cursor_field(&self) -> Option<&'static str> {
        match self.mode {
            StreamMode::FullRefresh => None,
            StreamMode::Incremental { cursor_field, .. } => Some(cursor_field),
        }
    }

    /// Sync modes this stream can run under
    pub fn supported_sync_modes(&self) -> Vec<SyncMode> {
        match self.mode {
            StreamMode::FullRefresh => vec![SyncMode::FullRefresh],
            StreamMode::Incremental { .. } => vec![SyncMode::FullRefresh, SyncMode::Incremental],
        }
    }
}
