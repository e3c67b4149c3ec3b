//! Built-in stream definitions

use super::types::{RecordShape, StreamDef, StreamMode, StreamScope};
use crate::error::{Error, Result};

/// Every stream the connector serves
///
/// `projects` is the only global stream; the rest hang off a project
/// id. `stories` and `activity` carry server-side timestamp filters
/// and sync incrementally.
pub static STREAMS: &[StreamDef] = &[
    StreamDef {
        name: "projects",
        scope: StreamScope::Global { path: "projects" },
        mode: StreamMode::FullRefresh,
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "stories",
        scope: StreamScope::PerProject { subpath: "stories" },
        mode: StreamMode::Incremental {
            cursor_field: "updated_at",
            filter_param: "updated_after",
        },
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "project_memberships",
        scope: StreamScope::PerProject {
            subpath: "memberships",
        },
        mode: StreamMode::FullRefresh,
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "labels",
        scope: StreamScope::PerProject { subpath: "labels" },
        mode: StreamMode::FullRefresh,
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "releases",
        scope: StreamScope::PerProject { subpath: "releases" },
        mode: StreamMode::FullRefresh,
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "epics",
        scope: StreamScope::PerProject { subpath: "epics" },
        mode: StreamMode::FullRefresh,
        primary_key: "id",
        shape: RecordShape::Bare,
    },
    StreamDef {
        name: "activity",
        scope: StreamScope::PerProject { subpath: "activity" },
        mode: StreamMode::Incremental {
            cursor_field: "occurred_at",
            filter_param: "occurred_after",
        },
        primary_key: "guid",
        shape: RecordShape::LiftProjectId,
    },
];

/// Look up a stream definition by name
pub fn get(name: &str) -> Result<&'static StreamDef> {
    STREAMS
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

/// Names of every stream, in catalog order
pub fn names() -> Vec<&'static str> {
    STREAMS.iter().map(|def| def.name).collect()
}
