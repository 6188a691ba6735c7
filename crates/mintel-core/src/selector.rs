//! Meeting selection: turns decoded cache documents into the meetings this run should analyze.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::{CacheDocument, CacheSnapshot, TranscriptFragment};
use crate::state::ProcessingState;

const UNTITLED: &str = "Untitled Meeting";
/// Each `meeting_end_count` tick is a five-minute block in the capture tool.
const MINUTES_PER_END_COUNT: u32 = 5;

static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)\s*(?:call|meeting|sync|1:1|check-?in)",
        r"(?i)meeting with ([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)",
        r"^([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*)\s*[-–—]",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// A meeting ready for analysis. Built fresh every run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRecord {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub transcript: String,
    pub participants: Vec<String>,
    /// Empty when no title pattern matched.
    pub company: String,
    /// Minutes.
    pub duration: Option<u32>,
}

impl MeetingRecord {
    /// `YYYY-MM-DD` of the creation timestamp (UTC).
    pub fn date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM` of the creation timestamp (UTC).
    pub fn time(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }

    pub fn company(&self) -> Option<&str> {
        Some(self.company.as_str()).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectorOptions {
    pub lookback_days: i64,
    pub min_notes_length: usize,
    /// Reprocess already-seen meetings created today.
    pub force_today: bool,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            min_notes_length: 50,
            force_today: false,
        }
    }
}

/// Pick the meetings to analyze, newest first.
pub fn select_meetings(
    cache: &CacheSnapshot,
    state: &ProcessingState,
    opts: &SelectorOptions,
    now: DateTime<Utc>,
) -> Vec<MeetingRecord> {
    let cutoff = now - Duration::days(opts.lookback_days);
    let today = now.date_naive();
    let mut selected = Vec::new();

    for (id, doc) in &cache.documents {
        if !doc.is_meeting() || doc.is_deleted() {
            continue;
        }
        let Some(created_at) = doc.created_at.as_deref().and_then(parse_timestamp) else {
            tracing::debug!(target: "mintel::selector", doc_id = %id, "skipping meeting without a usable created_at");
            continue;
        };
        if state.contains(id) && !(opts.force_today && created_at.date_naive() == today) {
            continue;
        }
        if created_at < cutoff {
            continue;
        }

        let fragments = cache.transcript_for(id);
        if doc.notes().chars().count() < opts.min_notes_length && fragments.is_empty() {
            tracing::debug!(target: "mintel::selector", doc_id = %id, "skipping meeting with too little content");
            continue;
        }

        selected.push(build_record(id, doc, fragments, created_at));
    }

    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected
}

fn build_record(
    id: &str,
    doc: &CacheDocument,
    fragments: &[TranscriptFragment],
    created_at: DateTime<Utc>,
) -> MeetingRecord {
    let title = doc
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();
    let company = infer_company(&title);
    MeetingRecord {
        id: id.to_string(),
        company,
        created_at,
        updated_at: doc.updated_at.as_deref().and_then(parse_timestamp),
        notes: doc.notes().to_string(),
        transcript: flatten_transcript(fragments),
        participants: extract_participants(doc),
        duration: doc
            .meeting_end_count
            .filter(|n| *n > 0)
            .map(|n| n * MINUTES_PER_END_COUNT),
        title,
    }
}

/// RFC 3339, or a zone-less ISO timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Utterances ordered by start time, joined, whitespace collapsed.
pub fn flatten_transcript(fragments: &[TranscriptFragment]) -> String {
    let mut ordered: Vec<&TranscriptFragment> = fragments.iter().collect();
    ordered.sort_by(|a, b| a.start_timestamp.cmp(&b.start_timestamp));
    ordered
        .iter()
        .filter_map(|f| f.text.as_deref())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attendee display names then the creator, first occurrence wins.
pub fn extract_participants(doc: &CacheDocument) -> Vec<String> {
    let Some(people) = doc.people.as_ref() else {
        return Vec::new();
    };
    let creator = people
        .creator
        .as_ref()
        .and_then(|c| c.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let mut names: Vec<String> = Vec::new();
    for name in people
        .attendees
        .iter()
        .filter_map(|a| a.display_name())
        .chain(creator)
    {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Company name guessed from the title; empty when nothing matches.
pub fn infer_company(title: &str) -> String {
    COMPANY_PATTERNS
        .iter()
        .find_map(|re| re.captures(title))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
