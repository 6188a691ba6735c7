//! Sync orchestrator: cache -> selection -> analysis -> notes -> state -> queue.
//!
//! Strictly sequential. The only suspension points are the model call and the pause between
//! calls. A meeting is recorded in the state only after its note is on disk, and the state is
//! saved once at the end of the run; a crash in between reprocesses that meeting next time.
//!
//! Each model call is bounded by `llm_timeout_secs` (default 120) and a timeout counts as a
//! per-meeting failure. Set it to 0 to let a call wait indefinitely.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

use crate::cache::read_cache;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::llm::{GenerateOptions, LlmProvider};
use crate::note::NoteWriter;
use crate::profile::{PillarTaxonomy, UserProfile};
use crate::prompts::meeting_analysis_prompt;
use crate::queue::{update_queue, QueueEntry};
use crate::selector::{select_meetings, MeetingRecord, SelectorOptions};
use crate::state::{ProcessedMeeting, ProcessingState};

const BANNER: &str = "==================================================";

/// Run stages, logged as the `phase` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    LoadingConfig,
    LoadingState,
    ReadingCache,
    Selecting,
    DryRunReport,
    Processing,
    SavingState,
    UpdatingQueue,
    Done,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::LoadingConfig => "loading-config",
            SyncPhase::LoadingState => "loading-state",
            SyncPhase::ReadingCache => "reading-cache",
            SyncPhase::Selecting => "selecting",
            SyncPhase::DryRunReport => "dry-run-report",
            SyncPhase::Processing => "processing",
            SyncPhase::SavingState => "saving-state",
            SyncPhase::UpdatingQueue => "updating-queue",
            SyncPhase::Done => "done",
        }
    }

    pub fn enter(self) {
        tracing::info!(target: "mintel::sync", phase = %self, "Entering phase");
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Reprocess meetings created today even if already processed.
    pub force: bool,
    /// Read and select only: no model calls, no writes.
    pub dry_run: bool,
}

/// What a dry run would have analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunCandidate {
    pub meeting_id: String,
    pub title: String,
    pub date: String,
    pub notes_chars: usize,
    pub transcript_chars: usize,
    pub participants: Vec<String>,
}

impl From<&MeetingRecord> for DryRunCandidate {
    fn from(m: &MeetingRecord) -> Self {
        Self {
            meeting_id: m.id.clone(),
            title: m.title.clone(),
            date: m.date(),
            notes_chars: m.notes.chars().count(),
            transcript_chars: m.transcript.chars().count(),
            participants: m.participants.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedOutcome {
    pub meeting_id: String,
    pub title: String,
    pub company: String,
    pub filepath: PathBuf,
    pub wikilink: String,
    pub pillar: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMeeting {
    pub meeting_id: String,
    pub title: String,
    pub error: String,
}

/// Per-run totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub candidates: usize,
    pub processed: Vec<ProcessedOutcome>,
    pub failed: Vec<FailedMeeting>,
    /// Populated only in dry-run mode.
    pub dry_run: Vec<DryRunCandidate>,
}

impl SyncSummary {
    pub fn wikilinks(&self) -> Vec<&str> {
        self.processed.iter().map(|p| p.wikilink.as_str()).collect()
    }
}

/// One sync run over already-loaded inputs.
pub struct MeetingSync<'a> {
    config: &'a SyncConfig,
    profile: &'a UserProfile,
    pillars: &'a PillarTaxonomy,
    llm: &'a dyn LlmProvider,
    state: ProcessingState,
    writer: NoteWriter,
}

impl<'a> MeetingSync<'a> {
    pub fn new(
        config: &'a SyncConfig,
        profile: &'a UserProfile,
        pillars: &'a PillarTaxonomy,
        state: ProcessingState,
        llm: &'a dyn LlmProvider,
    ) -> Self {
        Self {
            config,
            profile,
            pillars,
            llm,
            state,
            writer: NoteWriter::new(config),
        }
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn into_state(self) -> ProcessingState {
        self.state
    }

    pub async fn run(&mut self, options: SyncOptions) -> SyncResult<SyncSummary> {
        self.run_at(options, Utc::now()).await
    }

    /// Run with an explicit clock.
    pub async fn run_at(
        &mut self,
        options: SyncOptions,
        now: DateTime<Utc>,
    ) -> SyncResult<SyncSummary> {
        tracing::info!(target: "mintel::sync", "{}", BANNER);
        tracing::info!(
            target: "mintel::sync",
            force = options.force,
            dry_run = options.dry_run,
            provider = self.llm.name(),
            "Meeting sync starting"
        );

        SyncPhase::ReadingCache.enter();
        let cache_path = self.config.cache_path();
        let cache = read_cache(&cache_path)?;
        tracing::info!(
            target: "mintel::sync",
            path = %cache_path.display(),
            documents = cache.documents.len(),
            transcripts = cache.transcripts.len(),
            "Read capture cache"
        );

        SyncPhase::Selecting.enter();
        let selector = SelectorOptions {
            lookback_days: self.config.lookback_days,
            min_notes_length: self.config.min_notes_length,
            force_today: options.force,
        };
        let meetings = select_meetings(&cache, &self.state, &selector, now);
        let mut summary = SyncSummary {
            candidates: meetings.len(),
            ..SyncSummary::default()
        };
        tracing::info!(target: "mintel::sync", count = meetings.len(), "Found new meetings to process");

        if options.dry_run {
            SyncPhase::DryRunReport.enter();
            for m in &meetings {
                let candidate = DryRunCandidate::from(m);
                tracing::info!(
                    target: "mintel::sync",
                    title = %candidate.title,
                    date = %candidate.date,
                    notes_chars = candidate.notes_chars,
                    transcript_chars = candidate.transcript_chars,
                    participants = %candidate.participants.join(", "),
                    "[dry run] would process"
                );
                summary.dry_run.push(candidate);
            }
            self.finish(&summary);
            return Ok(summary);
        }

        if meetings.is_empty() {
            SyncPhase::SavingState.enter();
            self.state.save(&self.config.state_path(), now)?;
            self.finish(&summary);
            return Ok(summary);
        }

        SyncPhase::Processing.enter();
        let generate = GenerateOptions::default().with_max_output_tokens(self.config.max_output_tokens);
        let today = now.date_naive();
        for (i, meeting) in meetings.iter().enumerate() {
            if i > 0 && !self.config.llm_delay().is_zero() {
                tokio::time::sleep(self.config.llm_delay()).await;
            }
            tracing::info!(target: "mintel::sync", title = %meeting.title, provider = self.llm.name(), "Analyzing meeting");

            let prompt = meeting_analysis_prompt(meeting, self.profile, self.pillars, today);
            let reply = match self.llm.generate(&prompt, &generate).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(
                        target: "mintel::sync",
                        title = %meeting.title,
                        timeout = e.is_timeout(),
                        error = %e,
                        "LLM analysis failed; skipping meeting"
                    );
                    summary.failed.push(FailedMeeting {
                        meeting_id: meeting.id.clone(),
                        title: meeting.title.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let written = match self
                .writer
                .materialize(meeting, &reply, self.profile, self.pillars, now)
            {
                Ok(w) => w,
                Err(e) => return Err(self.abort_with(e, &summary, now)),
            };
            self.state.record(
                meeting.id.clone(),
                ProcessedMeeting {
                    title: meeting.title.clone(),
                    processed_at: now,
                    filepath: written.filepath.clone(),
                },
            );
            summary.processed.push(ProcessedOutcome {
                meeting_id: meeting.id.clone(),
                title: meeting.title.clone(),
                company: meeting.company.clone(),
                filepath: written.filepath,
                wikilink: written.wikilink,
                pillar: written.pillar,
            });
        }

        SyncPhase::SavingState.enter();
        self.state.save(&self.config.state_path(), now)?;

        if !summary.processed.is_empty() {
            SyncPhase::UpdatingQueue.enter();
            self.list_in_queue(&summary.processed, now)?;
        }

        self.finish(&summary);
        Ok(summary)
    }

    fn list_in_queue(&self, processed: &[ProcessedOutcome], now: DateTime<Utc>) -> SyncResult<()> {
        let entries: Vec<QueueEntry> = processed
            .iter()
            .map(|p| QueueEntry {
                title: p.title.clone(),
                company: p.company.clone(),
                wikilink: p.wikilink.clone(),
            })
            .collect();
        update_queue(
            &self.config.queue_path(),
            &entries,
            now,
            self.config.retention_days,
        )
    }

    /// Keep what this run already wrote (ledger and queue), then surface the fatal error.
    /// A meeting in the ledger is never revisited, so its queue line has to land now.
    fn abort_with(&mut self, error: SyncError, summary: &SyncSummary, now: DateTime<Utc>) -> SyncError {
        tracing::error!(target: "mintel::sync", error = %error, "Fatal write failure; saving state and aborting");
        if let Err(save_err) = self.state.save(&self.config.state_path(), now) {
            tracing::error!(target: "mintel::sync", error = %save_err, "Could not save state after failure");
        }
        if !summary.processed.is_empty() {
            if let Err(queue_err) = self.list_in_queue(&summary.processed, now) {
                tracing::error!(target: "mintel::sync", error = %queue_err, "Could not update queue after failure");
            }
        }
        error
    }

    fn finish(&self, summary: &SyncSummary) {
        SyncPhase::Done.enter();
        tracing::info!(target: "mintel::sync", "{}", BANNER);
        tracing::info!(
            target: "mintel::sync",
            candidates = summary.candidates,
            processed = summary.processed.len(),
            failed = summary.failed.len(),
            "Meeting sync complete"
        );
        for link in summary.wikilinks() {
            tracing::info!(target: "mintel::sync", wikilink = %link, "Processed");
        }
    }
}
