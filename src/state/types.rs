//! Serialized shape of persisted sync state

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the connector remembers between syncs
///
/// Each stream stores the object its cursor tracker snapshots, keyed
/// by stream name. Full-refresh streams never appear; an incremental
/// stream that has not synced yet stores an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub streams: HashMap<String, JsonObject>,
}

impl State {
    /// Empty state, as used on a first sync
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved cursor object for one stream
    pub fn get_stream(&self, stream: &str) -> Option<&JsonObject> {
        self.streams.get(stream)
    }

    /// Replace the cursor object for one stream
    pub fn set_stream(&mut self, stream: &str, state: JsonObject) {
        self.streams.insert(stream.to_string(), state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cursor_state(field: &str, value: &str) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert(field.to_string(), json!(value));
        obj
    }

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.streams.is_empty());
        assert!(state.get_stream("stories").is_none());
    }

    #[test]
    fn test_state_set_and_get() {
        let mut state = State::new();
        state.set_stream("stories", cursor_state("updated_at", "2024-03-01T12:00:00Z"));

        let stories = state.get_stream("stories").unwrap();
        assert_eq!(stories.get("updated_at"), Some(&json!("2024-03-01T12:00:00Z")));
    }

    #[test]
    fn test_state_serialization() {
        let mut state = State::new();
        state.set_stream("stories", cursor_state("updated_at", "2024-03-01T12:00:00Z"));
        state.set_stream("activity", cursor_state("occurred_at", "2024-03-02T08:00:00Z"));

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(
            restored.get_stream("activity").unwrap().get("occurred_at"),
            Some(&json!("2024-03-02T08:00:00Z"))
        );
    }

    #[test]
    fn test_state_deserializes_empty_object() {
        let state: State = serde_json::from_str("{}").unwrap();
        assert!(state.streams.is_empty());
    }
}
