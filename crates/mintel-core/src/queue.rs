//! Rolling queue index (`{meetings_dir}/queue.md`).
//!
//! New lines go directly under the `## Processed` header, so the newest run reads first.
//! Any line carrying `| YYYY-MM-DD |` older than the retention window is pruned; the prune
//! is textual and leaves every other line alone.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::error::{SyncError, SyncResult};
use crate::persist::write_atomic;

const PROCESSED_HEADER_PREFIX: &str = "## Processed";

static DATED_FIELD: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\| (\d{4}-\d{2}-\d{2}) \|").ok());

/// One processed meeting to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub title: String,
    pub company: String,
    pub wikilink: String,
}

impl QueueEntry {
    /// `- [x] {title} | {company or N/A} | {date} | {wikilink}`
    pub fn line(&self, date: NaiveDate) -> String {
        let company = if self.company.trim().is_empty() {
            "N/A".to_string()
        } else {
            cell(&self.company)
        };
        format!(
            "- [x] {} | {} | {} | {}",
            cell(&self.title),
            company,
            date.format("%Y-%m-%d"),
            self.wikilink
        )
    }
}

/// One line, no column separators: whitespace runs (newlines included) collapse to a space
/// and `|` becomes `/`.
fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "/")
}

/// Index document used when none exists yet.
pub fn seed_skeleton(retention_days: i64) -> String {
    format!(
        "# Meeting Intel Queue\n\n\
         Meetings pending processing and recently processed.\n\n\
         ## Pending\n\n\
         <!-- Meetings from the capture tool will appear here -->\n\n\
         ## Processing\n\n\
         <!-- Meetings currently being processed -->\n\n\
         ## Processed (Last {} Days)\n\n\
         <!-- Processed meetings will appear here -->\n",
        retention_days
    )
}

/// Insert `new_lines` under the Processed header and prune stale dated lines.
///
/// Returns the new document and whether the header was found. Without the header nothing is
/// inserted, but pruning still runs.
pub fn apply_update(
    content: &str,
    new_lines: &[String],
    today: NaiveDate,
    retention_days: i64,
) -> (String, bool) {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    let header = lines
        .iter()
        .position(|l| l.trim_end().starts_with(PROCESSED_HEADER_PREFIX));
    if let Some(idx) = header {
        let mut at = idx + 1;
        if lines.get(at).is_some_and(|l| l.trim().is_empty()) {
            at += 1;
        }
        lines.splice(at..at, new_lines.iter().cloned());
    }

    let cutoff = (today - Duration::days(retention_days))
        .format("%Y-%m-%d")
        .to_string();
    lines.retain(|line| match DATED_FIELD.as_ref().and_then(|re| re.captures(line)) {
        Some(caps) => caps
            .get(1)
            .map_or(true, |date| date.as_str() >= cutoff.as_str()),
        None => true,
    });

    (lines.join("\n"), header.is_some())
}

/// Load (or seed) the queue, add `entries` dated today, prune, and write it back.
pub fn update_queue(
    path: &Path,
    entries: &[QueueEntry],
    now: DateTime<Utc>,
    retention_days: i64,
) -> SyncResult<()> {
    let today = now.date_naive();
    let current = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => seed_skeleton(retention_days),
        Err(source) => {
            return Err(SyncError::QueueWrite {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let new_lines: Vec<String> = entries.iter().map(|e| e.line(today)).collect();
    let (updated, found_header) = apply_update(&current, &new_lines, today, retention_days);
    if !found_header && !new_lines.is_empty() {
        tracing::warn!(
            target: "mintel::queue",
            path = %path.display(),
            "Queue has no Processed section; new entries were not listed"
        );
    }

    write_atomic(path, updated.as_bytes()).map_err(|source| SyncError::QueueWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(target: "mintel::queue", path = %path.display(), added = new_lines.len(), "Updated meeting queue");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn entry(title: &str) -> QueueEntry {
        QueueEntry {
            title: title.into(),
            company: String::new(),
            wikilink: format!("Inbox/Meetings/2026-10-19/{}.md", title),
        }
    }

    #[test]
    fn date_pattern_compiles() {
        assert!(DATED_FIELD.is_some());
    }

    #[test]
    fn title_cannot_break_the_line_format() {
        let e = QueueEntry {
            title: "Retro | 2020-01-01 | old\nsecond line".into(),
            company: "A|B".into(),
            wikilink: "Inbox/Meetings/2026-10-19/retro.md".into(),
        };
        let line = e.line(today());
        assert_eq!(
            line,
            "- [x] Retro / 2020-01-01 / old second line | A/B | 2026-10-19 | Inbox/Meetings/2026-10-19/retro.md"
        );

        let (updated, _) = apply_update(&seed_skeleton(7), &[line.clone()], today(), 7);
        assert!(updated.lines().any(|l| l == line));
    }

    #[test]
    fn inserts_newest_run_first() {
        let skeleton = seed_skeleton(7);
        let (first, found) = apply_update(&skeleton, &[entry("a").line(today())], today(), 7);
        assert!(found);
        let (second, _) = apply_update(&first, &[entry("b").line(today())], today(), 7);

        let a = second.find("- [x] a |").unwrap();
        let b = second.find("- [x] b |").unwrap();
        let header = second.find("## Processed (Last 7 Days)").unwrap();
        assert!(header < b && b < a);
        assert!(second.contains("- [x] a | N/A | 2026-10-19 | Inbox/Meetings/2026-10-19/a.md"));
        assert!(second.contains("## Pending") && second.contains("## Processing"));
    }

    #[test]
    fn retention_drops_eight_day_old_lines_only() {
        let doc = format!(
            "{}- [x] old | N/A | 2026-10-11 | x.md\n- [x] recent | N/A | 2026-10-13 | y.md\n- [x] edge | N/A | 2026-10-12 | z.md\nfree text 2026-01-01\n",
            seed_skeleton(7)
        );
        let (updated, _) = apply_update(&doc, &[], today(), 7);
        assert!(!updated.contains("| 2026-10-11 |"));
        assert!(updated.contains("| 2026-10-13 |"));
        assert!(updated.contains("| 2026-10-12 |"));
        assert!(updated.contains("free text 2026-01-01"));
    }

    #[test]
    fn missing_header_skips_insert() {
        let (updated, found) = apply_update("# Custom\n", &[entry("a").line(today())], today(), 7);
        assert!(!found);
        assert_eq!(updated, "# Custom\n");
    }

    #[test]
    fn update_queue_seeds_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Inbox/Meetings/queue.md");
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let mut e = entry("acme-sync");
        e.company = "Acme".into();

        update_queue(&path, &[e], now, 7).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Meeting Intel Queue"));
        assert_eq!(content.matches("- [x] ").count(), 1);
        assert!(content.contains("| Acme | 2026-10-19 |"));
    }
}
