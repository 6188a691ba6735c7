//! Meeting note materialization: model reply + meeting -> `{meetings_dir}/{date}/{slug}.md`.
//!
//! The path depends only on title and creation date. Re-processing a meeting overwrites its
//! earlier note; the processing state, not file existence, decides what gets processed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::MeetingAnalysis;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::persist::write_atomic;
use crate::profile::{PillarTaxonomy, UserProfile};
use crate::prompts::truncate_chars;
use crate::selector::MeetingRecord;

const SLUG_MAX_CHARS: usize = 60;
const EMPTY_SLUG: &str = "untitled-meeting";
const TRANSCRIPT_EXCERPT_CHARS: usize = 5_000;
const NOTE_TYPE: &str = "meeting-note";

/// `duration` is minutes when known, the literal `unknown` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteDuration {
    Minutes(u32),
    Unknown(String),
}

impl From<Option<u32>> for NoteDuration {
    fn from(minutes: Option<u32>) -> Self {
        match minutes {
            Some(m) => NoteDuration::Minutes(m),
            None => NoteDuration::Unknown("unknown".to_string()),
        }
    }
}

/// YAML header of a meeting note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub source: String,
    pub title: String,
    pub participants: Vec<String>,
    pub company: String,
    pub pillar: String,
    pub duration: NoteDuration,
    pub source_id: String,
    pub processed: DateTime<Utc>,
}

impl FrontMatter {
    /// Parse the header of a rendered note.
    pub fn from_note(content: &str) -> Option<Self> {
        let rest = content.strip_prefix("---\n")?;
        let end = rest.find("\n---")?;
        serde_yaml::from_str(&rest[..end]).ok()
    }
}

/// Where a note landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenNote {
    pub filepath: PathBuf,
    /// Vault-relative path, forward slashes.
    pub wikilink: String,
    pub pillar: String,
}

/// Lowercase, non-alphanumeric runs to single hyphens, trimmed, at most 60 characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let (capped, _) = truncate_chars(slug, SLUG_MAX_CHARS);
    capped.trim_end_matches('-').to_string()
}

/// Drop the vault owner: exact name (case-insensitive), or any participant whose name
/// contains the owner's first name as a whole word.
pub fn filter_participants(participants: &[String], owner: &str) -> Vec<String> {
    let owner = owner.trim().to_lowercase();
    let Some(first_name) = owner.split_whitespace().next().map(str::to_string) else {
        return participants.to_vec();
    };
    participants
        .iter()
        .filter(|p| {
            let lower = p.to_lowercase();
            lower != owner && !lower.split_whitespace().any(|word| word == first_name)
        })
        .cloned()
        .collect()
}

/// Renders and writes meeting notes under the configured vault layout.
#[derive(Debug, Clone)]
pub struct NoteWriter {
    meetings_dir: PathBuf,
    meetings_link_prefix: String,
    people_link_prefix: String,
    companies_link_prefix: String,
    source_label: String,
}

impl NoteWriter {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            meetings_dir: config.meetings_path(),
            meetings_link_prefix: config.meetings_link_prefix(),
            people_link_prefix: config.people_link_prefix(),
            companies_link_prefix: config.companies_link_prefix(),
            source_label: config.source_label.clone(),
        }
    }

    /// Parse `reply`, write the note, and return its location.
    pub fn materialize(
        &self,
        meeting: &MeetingRecord,
        reply: &str,
        profile: &UserProfile,
        pillars: &PillarTaxonomy,
        now: DateTime<Utc>,
    ) -> SyncResult<WrittenNote> {
        let pillar = MeetingAnalysis::parse(reply).resolve_pillar(pillars);
        let date = meeting.date();
        let slug = match slugify(&meeting.title) {
            s if s.is_empty() => EMPTY_SLUG.to_string(),
            s => s,
        };
        let filepath = self.meetings_dir.join(&date).join(format!("{}.md", slug));

        let front_matter = FrontMatter {
            date: date.clone(),
            time: meeting.time(),
            note_type: NOTE_TYPE.to_string(),
            source: self.source_label.clone(),
            title: meeting.title.clone(),
            participants: filter_participants(&meeting.participants, &profile.name),
            company: meeting.company.clone(),
            pillar: pillar.clone(),
            duration: meeting.duration.into(),
            source_id: meeting.id.clone(),
            processed: now,
        };
        let content = self.render_note(meeting, reply, &front_matter)?;

        write_atomic(&filepath, content.as_bytes()).map_err(|source| SyncError::NoteWrite {
            path: filepath.clone(),
            source,
        })?;
        tracing::info!(target: "mintel::note", path = %filepath.display(), pillar = %pillar, "Created meeting note");

        Ok(WrittenNote {
            wikilink: format!("{}/{}/{}.md", self.meetings_link_prefix, date, slug),
            filepath,
            pillar,
        })
    }

    /// Full note text: front-matter, link header, analysis, raw capture.
    pub fn render_note(
        &self,
        meeting: &MeetingRecord,
        analysis: &str,
        front_matter: &FrontMatter,
    ) -> SyncResult<String> {
        let yaml = serde_yaml::to_string(front_matter)?;
        let participant_links = if front_matter.participants.is_empty() {
            "Unknown".to_string()
        } else {
            front_matter
                .participants
                .iter()
                .map(|p| self.person_link(p))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut note = format!(
            "---\n{yaml}---\n\n# {title}\n\n**Date:** {date} {time}\n**Participants:** {participant_links}\n",
            yaml = yaml,
            title = meeting.title,
            date = front_matter.date,
            time = front_matter.time,
            participant_links = participant_links,
        );
        if let Some(company) = meeting.company() {
            note.push_str(&format!(
                "**Company:** {}/{}.md\n",
                self.companies_link_prefix, company
            ));
        }
        note.push_str(&format!("\n---\n\n{}\n\n---\n\n## Raw Content\n\n", analysis.trim_end()));
        note.push_str(&format!(
            "<details>\n<summary>Original Notes</summary>\n\n{}\n\n</details>\n",
            if meeting.notes.is_empty() {
                "No notes captured"
            } else {
                meeting.notes.as_str()
            }
        ));
        if !meeting.transcript.is_empty() {
            let (excerpt, truncated) = truncate_chars(&meeting.transcript, TRANSCRIPT_EXCERPT_CHARS);
            note.push_str(&format!(
                "\n<details>\n<summary>Transcript ({} words)</summary>\n\n{}{}\n\n</details>\n",
                meeting.transcript.split_whitespace().count(),
                excerpt,
                if truncated { "\n\n[Truncated...]" } else { "" }
            ));
        }
        Ok(note)
    }

    fn person_link(&self, name: &str) -> String {
        format!(
            "{}/{}.md",
            self.people_link_prefix,
            name.split_whitespace().collect::<Vec<_>>().join("_")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn meeting() -> MeetingRecord {
        MeetingRecord {
            id: "doc-42".into(),
            title: "Acme Corp — Q3 Sync!!".into(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
            updated_at: None,
            notes: "Renewal discussion".into(),
            transcript: String::new(),
            participants: names(&["Jane Doe", "Ada Lovelace"]),
            company: "Acme Corp".into(),
            duration: Some(30),
        }
    }

    #[test]
    fn slugify_is_deterministic_and_bounded() {
        assert_eq!(slugify("Acme Corp — Q3 Sync!!"), "acme-corp-q3-sync");
        assert_eq!(slugify("  --Hello, World--  "), "hello-world");
        assert_eq!(slugify("!!!"), "");

        let long = slugify(&"word ".repeat(40));
        assert!(long.chars().count() <= 60);
        assert!(!long.starts_with('-') && !long.ends_with('-'));
    }

    #[test]
    fn owner_is_filtered_by_full_or_first_name() {
        let participants = names(&["Jane Doe", "Jane", "Janet Smith", "jane doe", "Bob"]);
        assert_eq!(
            filter_participants(&participants, "Jane Doe"),
            names(&["Janet Smith", "Bob"])
        );
        assert_eq!(filter_participants(&participants, ""), participants);
    }

    #[test]
    fn materialize_writes_dated_note() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig::for_vault(dir.path());
        let writer = NoteWriter::new(&config);
        let profile = UserProfile {
            name: "Jane Doe".into(),
            ..UserProfile::default()
        };
        let pillars = PillarTaxonomy::from_names(["Deals", "Product"]);
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        let reply = "## Summary\n\nGood call.\n\n## Pillar Assignment\n\nProduct\n\nRationale: roadmap.";

        let written = writer
            .materialize(&meeting(), reply, &profile, &pillars, now)
            .unwrap();
        assert_eq!(
            written.filepath,
            dir.path().join("Inbox/Meetings/2026-10-19/acme-corp-q3-sync.md")
        );
        assert_eq!(written.wikilink, "Inbox/Meetings/2026-10-19/acme-corp-q3-sync.md");
        assert_eq!(written.pillar, "Product");

        let content = std::fs::read_to_string(&written.filepath).unwrap();
        let fm = FrontMatter::from_note(&content).unwrap();
        assert_eq!(fm.date, "2026-10-19");
        assert_eq!(fm.time, "14:05");
        assert_eq!(fm.note_type, "meeting-note");
        assert_eq!(fm.participants, names(&["Ada Lovelace"]));
        assert_eq!(fm.company, "Acme Corp");
        assert_eq!(fm.duration, NoteDuration::Minutes(30));
        assert_eq!(fm.source_id, "doc-42");
        assert!(content.contains("**Participants:** 05-Areas/People/External/Ada_Lovelace.md"));
        assert!(content.contains("**Company:** 05-Areas/Companies/Acme Corp.md"));
        assert!(content.contains("## Summary\n\nGood call."));
        assert!(content.contains("<summary>Original Notes</summary>\n\nRenewal discussion"));
        assert!(!content.contains("Transcript ("));
    }

    #[test]
    fn transcript_excerpt_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let writer = NoteWriter::new(&SyncConfig::for_vault(dir.path()));
        let mut m = meeting();
        m.title = "!!!".into();
        m.duration = None;
        m.transcript = "word ".repeat(2_000).trim_end().to_string();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();

        let written = writer
            .materialize(&m, "no template", &UserProfile::default(), &PillarTaxonomy::default(), now)
            .unwrap();
        assert!(written.filepath.ends_with("2026-10-19/untitled-meeting.md"));
        assert_eq!(written.pillar, "General");

        let content = std::fs::read_to_string(&written.filepath).unwrap();
        assert!(content.contains("Transcript (2000 words)"));
        assert!(content.contains("[Truncated...]"));
        let fm = FrontMatter::from_note(&content).unwrap();
        assert_eq!(fm.duration, NoteDuration::Unknown("unknown".into()));
    }
}
