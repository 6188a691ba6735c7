//! Meeting analysis prompt: meeting record + owner profile + pillars -> LLM instructions.
//!
//! The section headers in [`MEETING_ANALYSIS_TEMPLATE`] are the contract with
//! [`crate::analysis`]; change them together.

use chrono::NaiveDate;

use super::truncate_chars;
use crate::profile::{MeetingIntelFlags, PillarTaxonomy, UserProfile};
use crate::selector::MeetingRecord;

/// Transcript characters sent to the model.
pub const MAX_TRANSCRIPT_CHARS: usize = 30_000;
pub const TRANSCRIPT_TRUNCATED_MARKER: &str = "\n\n[Transcript truncated...]";
pub const NO_CONTENT_PLACEHOLDER: &str =
    "[No detailed content available - meeting may have been brief or not transcribed]";

/// Full prompt; `{placeholders}` are filled by [`meeting_analysis_prompt`].
pub const MEETING_ANALYSIS_TEMPLATE: &str = r#"You are analyzing a meeting for a {role}. Extract structured intelligence from this meeting.

{header}

**Content:**
{content}

---

Generate a structured analysis in this exact markdown format:

## Summary

[2-3 sentence overview of what the meeting was about and key outcomes]

## Key Discussion Points

### [Topic 1]
[Key details and context]

### [Topic 2]
[Key details and context]

{decisions}{action_items}{intelligence}## Pillar Assignment

[Choose ONE primary pillar from: {pillars}]

Rationale: [One sentence explaining why this pillar fits]

---

Be concise but thorough. Extract real insights, not generic summaries. If something isn't clear from the content, say so rather than making things up."#;

const DECISIONS_SECTION: &str = r#"## Decisions Made

- [Decision 1]
- [Decision 2]

"#;

const ACTION_ITEMS_SECTION: &str = r#"## Action Items

### For Me
- [ ] [Specific task] - by [timeframe if mentioned] {task_anchor}

### For Others
- [ ] @[Person]: [Specific task]

"#;

const CUSTOMER_INTEL_SECTION: &str = r#"## Meeting Intelligence

**Pain Points:**
- [Any pain points or challenges mentioned, or "None identified"]

**Requests/Needs:**
- [Any requests or feature needs mentioned, or "None identified"]"#;

const COMPETITIVE_INTEL_SECTION: &str = r#"**Competitive Mentions:**
- [Any competitors or alternatives mentioned, or "None identified"]"#;

/// Build the analysis prompt. Pure: `today` dates the task anchor.
pub fn meeting_analysis_prompt(
    meeting: &MeetingRecord,
    profile: &UserProfile,
    pillars: &PillarTaxonomy,
    today: NaiveDate,
) -> String {
    let flags = &profile.meeting_intelligence;
    let role = if profile.company.trim().is_empty() {
        profile.role.clone()
    } else {
        format!("{} at {}", profile.role, profile.company)
    };
    let decisions = if flags.extract_decisions {
        DECISIONS_SECTION
    } else {
        ""
    };
    let action_items = if flags.extract_action_items {
        ACTION_ITEMS_SECTION.replace("{task_anchor}", &task_anchor(&meeting.id, today))
    } else {
        String::new()
    };
    let intelligence = match intelligence_section(flags) {
        s if s.is_empty() => s,
        s => format!("{}\n\n", s),
    };

    MEETING_ANALYSIS_TEMPLATE
        .replace("{role}", &role)
        .replace("{decisions}", decisions)
        .replace("{action_items}", &action_items)
        .replace("{intelligence}", &intelligence)
        .replace("{pillars}", &pillars.names().join(", "))
        // Meeting text goes in last so it is not scanned for placeholders.
        .replace("{content}", &meeting_content(meeting))
        .replacen("{header}", &meeting_header(meeting), 1)
}

fn meeting_header(meeting: &MeetingRecord) -> String {
    let participants = if meeting.participants.is_empty() {
        "Unknown".to_string()
    } else {
        meeting.participants.join(", ")
    };
    let mut header = format!(
        "**Meeting:** {}\n**Date:** {}\n**Participants:** {}",
        meeting.title,
        meeting.created_at.to_rfc3339(),
        participants
    );
    if let Some(company) = meeting.company() {
        header.push_str(&format!("\n**Company:** {}", company));
    }
    header
}

fn intelligence_section(flags: &MeetingIntelFlags) -> String {
    let mut sections = Vec::new();
    if flags.extract_customer_intel {
        sections.push(CUSTOMER_INTEL_SECTION);
    }
    if flags.extract_competitive_intel {
        sections.push(COMPETITIVE_INTEL_SECTION);
    }
    sections.join("\n\n")
}

/// Notes and transcript blocks, or the placeholder when both are empty.
pub fn meeting_content(meeting: &MeetingRecord) -> String {
    let mut content = String::new();
    if !meeting.notes.is_empty() {
        content.push_str(&format!("## Notes\n\n{}\n\n", meeting.notes));
    }
    if !meeting.transcript.is_empty() {
        let (kept, truncated) = truncate_chars(&meeting.transcript, MAX_TRANSCRIPT_CHARS);
        content.push_str("## Transcript\n\n");
        content.push_str(kept);
        if truncated {
            content.push_str(TRANSCRIPT_TRUNCATED_MARKER);
        }
        content.push_str("\n\n");
    }
    if content.trim().is_empty() {
        return NO_CONTENT_PLACEHOLDER.to_string();
    }
    content
}

/// Block-reference anchor `^task-YYYYMMDD-NNN`; NNN (001-999) is derived from the meeting id.
pub fn task_anchor(meeting_id: &str, today: NaiveDate) -> String {
    // FNV-1a, folded into 1..=999.
    let hash = meeting_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    format!("^task-{}-{:03}", today.format("%Y%m%d"), hash % 999 + 1)
}
