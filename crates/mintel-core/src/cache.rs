//! Capture-cache reader.
//!
//! The capture tool keeps a JSON envelope `{ "cache": "<json string>" }`; the string is a
//! second JSON document whose `state` object holds `documents`, `transcripts` and `people`.
//! Nothing here validates a schema: every field is optional and a malformed field decodes
//! as absent, so one odd record never blocks the rest of the cache.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SyncError, SyncResult};

/// Decode to `Some(T)` when the value fits, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode an array keeping only the elements that fit; anything else is empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonName {
    #[serde(default, rename = "fullName", deserialize_with = "lenient")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<PersonName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendeeDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub person: Option<PersonDetails>,
}

/// Calendar attendee attached to a document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attendee {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: Option<AttendeeDetails>,
}

impl Attendee {
    /// Best display name: nested full name, then plain name, then email.
    pub fn display_name(&self) -> Option<&str> {
        let full = self
            .details
            .as_ref()
            .and_then(|d| d.person.as_ref())
            .and_then(|p| p.name.as_ref())
            .and_then(|n| n.full_name.as_deref());
        [full, self.name.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Creator {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPeople {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub attendees: Vec<Attendee>,
    #[serde(default, deserialize_with = "lenient")]
    pub creator: Option<Creator>,
}

/// One document from `state.documents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheDocument {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub doc_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub notes_markdown: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub people: Option<DocumentPeople>,
    #[serde(default, deserialize_with = "lenient")]
    pub meeting_end_count: Option<u32>,
}

impl CacheDocument {
    pub fn is_meeting(&self) -> bool {
        self.doc_type.as_deref() == Some("meeting")
    }

    /// Any non-empty deletion marker counts.
    pub fn is_deleted(&self) -> bool {
        match &self.deleted_at {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn notes(&self) -> &str {
        self.notes_markdown.as_deref().unwrap_or("")
    }
}

/// One transcript utterance from `state.transcripts[<doc id>]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptFragment {
    #[serde(default, deserialize_with = "lenient")]
    pub start_timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// Decoded cache contents.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub documents: BTreeMap<String, CacheDocument>,
    pub transcripts: BTreeMap<String, Vec<TranscriptFragment>>,
    pub people: Value,
}

impl CacheSnapshot {
    pub fn transcript_for(&self, doc_id: &str) -> &[TranscriptFragment] {
        self.transcripts
            .get(doc_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Deserialize)]
struct Envelope {
    cache: Option<Value>,
}

#[derive(Deserialize, Default)]
struct InnerCache {
    #[serde(default, deserialize_with = "lenient")]
    state: Option<InnerState>,
}

#[derive(Deserialize, Default)]
struct InnerState {
    #[serde(default, deserialize_with = "lenient")]
    documents: Option<BTreeMap<String, Value>>,
    #[serde(default, deserialize_with = "lenient")]
    transcripts: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    people: Option<Value>,
}

/// Read and decode the cache at `path`.
pub fn read_cache(path: &Path) -> SyncResult<CacheSnapshot> {
    if !path.exists() {
        return Err(SyncError::CacheNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SyncError::CacheParse(format!("{}: {}", path.display(), e)))?;
    parse_cache(&raw)
}

/// Decode the double-encoded cache text.
pub fn parse_cache(raw: &str) -> SyncResult<CacheSnapshot> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|e| SyncError::CacheParse(format!("outer envelope: {}", e)))?;
    let inner_text = match envelope.cache {
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(SyncError::CacheParse(
                "`cache` field is not a JSON string".to_string(),
            ))
        }
        None => return Err(SyncError::CacheParse("missing `cache` field".to_string())),
    };
    let inner: InnerCache = serde_json::from_str(&inner_text)
        .map_err(|e| SyncError::CacheParse(format!("inner cache document: {}", e)))?;
    let state = inner.state.unwrap_or_default();

    let mut documents = BTreeMap::new();
    for (id, value) in state.documents.unwrap_or_default() {
        match serde_json::from_value::<CacheDocument>(value) {
            Ok(doc) => {
                documents.insert(id, doc);
            }
            Err(e) => {
                tracing::debug!(target: "mintel::cache", doc_id = %id, error = %e, "skipping non-object document");
            }
        }
    }

    let transcripts = state
        .transcripts
        .unwrap_or_default()
        .into_iter()
        .map(|(id, value)| {
            let fragments = match value {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
                _ => Vec::new(),
            };
            (id, fragments)
        })
        .collect();

    Ok(CacheSnapshot {
        documents,
        transcripts,
        people: state
            .people
            .unwrap_or_else(|| Value::Object(Default::default())),
    })
}
