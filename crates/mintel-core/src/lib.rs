//! mintel-core: meeting intelligence sync pipeline.
//!
//! Reads the meeting-capture tool's local cache, selects meetings not yet processed, asks an
//! LLM for a structured analysis, writes one dated markdown note per meeting into the vault,
//! and keeps a rolling queue index plus a processed-meeting ledger.

mod analysis;
mod cache;
mod config;
mod error;
mod note;
mod persist;
mod profile;
mod queue;
mod selector;
mod state;
mod sync;
pub mod llm;
pub mod logging;
pub mod prompts;

pub use analysis::{AnalysisSection, MeetingAnalysis, PILLAR_HEADER};
pub use cache::{
    parse_cache, read_cache, Attendee, CacheDocument, CacheSnapshot, DocumentPeople,
    TranscriptFragment,
};
pub use config::{default_cache_path, vault_relative, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use llm::{
    GenerateOptions, LlmError, LlmGateway, LlmProvider, ProviderKind, DEFAULT_MAX_OUTPUT_TOKENS,
};
pub use note::{filter_participants, slugify, FrontMatter, NoteDuration, NoteWriter, WrittenNote};
pub use profile::{MeetingIntelFlags, Pillar, PillarTaxonomy, UserProfile};
pub use queue::{apply_update, seed_skeleton, update_queue, QueueEntry};
pub use selector::{
    extract_participants, flatten_transcript, infer_company, select_meetings, MeetingRecord,
    SelectorOptions,
};
pub use state::{ProcessedMeeting, ProcessingState};
pub use sync::{
    DryRunCandidate, FailedMeeting, MeetingSync, ProcessedOutcome, SyncOptions, SyncPhase,
    SyncSummary,
};
