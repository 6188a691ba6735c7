//! Sync configuration: vault layout, capture-cache location, and pipeline tunables.
//!
//! Load order mirrors the rest of the workspace: built-in defaults, then an optional TOML
//! file (`MINTEL_CONFIG`, default `config/mintel.toml`), then `MINTEL__*` environment
//! overrides. Relative paths resolve against `vault_root`.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | vault_root | `.` | Root of the markdown vault. |
//! | cache_path | per-OS | Capture tool cache (`cache-v3.json`). |
//! | state_file | `System/meeting-sync-state.json` | Processed-meeting ledger. |
//! | meetings_dir | `Inbox/Meetings` | Date-bucketed note output. |
//! | queue_file_name | `queue.md` | Rolling queue index inside `meetings_dir`. |
//! | log_dir | `System/logs` | Append-only text logs. |
//! | lookback_days | 7 | Oldest creation date still eligible. |
//! | min_notes_length | 50 | Content gate when no transcript exists. |
//! | retention_days | 7 | Queue lines older than this are pruned. |
//! | llm_delay_ms | 1000 | Pause between successive LLM calls. |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "MINTEL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/mintel";
const CACHE_FILE_NAME: &str = "cache-v3.json";
const CACHE_APP_DIR: &str = "Granola";

fn default_vault_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("System/meeting-sync-state.json")
}

fn default_meetings_dir() -> PathBuf {
    PathBuf::from("Inbox/Meetings")
}

fn default_queue_file_name() -> String {
    "queue.md".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("System/logs")
}

fn default_pillars_file() -> PathBuf {
    PathBuf::from("System/pillars.yaml")
}

fn default_profile_file() -> PathBuf {
    PathBuf::from("System/user-profile.yaml")
}

fn default_people_dir() -> PathBuf {
    PathBuf::from("05-Areas/People")
}

fn default_companies_dir() -> PathBuf {
    PathBuf::from("05-Areas/Companies")
}

fn default_accounts_dir() -> PathBuf {
    PathBuf::from("05-Areas/Accounts")
}

fn default_lookback_days() -> i64 {
    7
}

fn default_min_notes_length() -> usize {
    50
}

fn default_retention_days() -> i64 {
    7
}

fn default_llm_delay_ms() -> u64 {
    1000
}

fn default_max_output_tokens() -> u32 {
    3000
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_source_label() -> String {
    "granola".to_string()
}

/// Pipeline configuration. Every field has a default so a bare vault works out of the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_vault_root")]
    pub vault_root: PathBuf,
    /// Explicit capture cache path. `None` => the capture tool's per-OS location.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_meetings_dir")]
    pub meetings_dir: PathBuf,
    #[serde(default = "default_queue_file_name")]
    pub queue_file_name: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_pillars_file")]
    pub pillars_file: PathBuf,
    #[serde(default = "default_profile_file")]
    pub profile_file: PathBuf,
    /// Person pages live in `{people_dir}/{Internal,External,CPO_Network}`.
    #[serde(default = "default_people_dir")]
    pub people_dir: PathBuf,
    #[serde(default = "default_companies_dir")]
    pub companies_dir: PathBuf,
    /// Legacy location for company pages.
    #[serde(default = "default_accounts_dir")]
    pub accounts_dir: PathBuf,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default = "default_min_notes_length")]
    pub min_notes_length: usize,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_llm_delay_ms")]
    pub llm_delay_ms: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Written to the note front-matter `source` key.
    #[serde(default = "default_source_label")]
    pub source_label: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            vault_root: default_vault_root(),
            cache_path: None,
            state_file: default_state_file(),
            meetings_dir: default_meetings_dir(),
            queue_file_name: default_queue_file_name(),
            log_dir: default_log_dir(),
            pillars_file: default_pillars_file(),
            profile_file: default_profile_file(),
            people_dir: default_people_dir(),
            companies_dir: default_companies_dir(),
            accounts_dir: default_accounts_dir(),
            lookback_days: default_lookback_days(),
            min_notes_length: default_min_notes_length(),
            retention_days: default_retention_days(),
            llm_delay_ms: default_llm_delay_ms(),
            max_output_tokens: default_max_output_tokens(),
            llm_timeout_secs: default_llm_timeout_secs(),
            source_label: default_source_label(),
        }
    }
}

impl SyncConfig {
    /// Defaults rooted at `vault_root`.
    pub fn for_vault(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            ..Self::default()
        }
    }

    /// Load config from file and environment. Precedence: `MINTEL__*` env > `MINTEL_CONFIG` file
    /// (or `config/mintel.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`SyncConfig::load`] with an explicit file path (extension optional).
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("vault_root", ".")?
            .set_default("lookback_days", default_lookback_days())?
            .set_default("retention_days", default_retention_days())?;

        let builder = if path.exists() || path.with_extension("toml").exists() {
            builder.add_source(config::File::from(path).required(false))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("MINTEL").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.vault_root.join(path)
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        match &self.cache_path {
            Some(p) => self.resolve(p),
            None => default_cache_path(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.state_file)
    }

    pub fn meetings_path(&self) -> PathBuf {
        self.resolve(&self.meetings_dir)
    }

    pub fn queue_path(&self) -> PathBuf {
        self.meetings_path().join(&self.queue_file_name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.log_dir)
    }

    pub fn pillars_path(&self) -> PathBuf {
        self.resolve(&self.pillars_file)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.resolve(&self.profile_file)
    }

    pub fn people_path(&self) -> PathBuf {
        self.resolve(&self.people_dir)
    }

    pub fn companies_path(&self) -> PathBuf {
        self.resolve(&self.companies_dir)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.resolve(&self.accounts_dir)
    }

    /// Vault-relative prefix for note wikilinks (forward slashes).
    pub fn meetings_link_prefix(&self) -> String {
        vault_relative(&self.vault_root, &self.meetings_path())
    }

    /// Vault-relative prefix for participant page links.
    pub fn people_link_prefix(&self) -> String {
        format!("{}/External", vault_relative(&self.vault_root, &self.people_path()))
    }

    pub fn companies_link_prefix(&self) -> String {
        vault_relative(&self.vault_root, &self.companies_path())
    }

    pub fn llm_delay(&self) -> Duration {
        Duration::from_millis(self.llm_delay_ms)
    }

    /// Per-call model timeout. Zero disables it.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// Render `path` relative to `root` with forward slashes. Falls back to the full path when
/// `path` is outside the vault.
pub fn vault_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Per-OS location of the capture tool's cache.
///
/// macOS: `~/Library/Application Support/Granola/`; Windows: roaming AppData, then local
/// AppData (first that exists, else roaming); Linux: `~/.config/Granola/`.
pub fn default_cache_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if cfg!(target_os = "macos") {
        return home
            .join("Library/Application Support")
            .join(CACHE_APP_DIR)
            .join(CACHE_FILE_NAME);
    }
    if cfg!(target_os = "windows") {
        let roaming = dirs::config_dir().unwrap_or_else(|| home.join("AppData/Roaming"));
        let local = dirs::data_local_dir().unwrap_or_else(|| home.join("AppData/Local"));
        for base in [&roaming, &local] {
            let candidate = base.join(CACHE_APP_DIR).join(CACHE_FILE_NAME);
            if candidate.exists() {
                return candidate;
            }
        }
        return roaming.join(CACHE_APP_DIR).join(CACHE_FILE_NAME);
    }
    home.join(".config").join(CACHE_APP_DIR).join(CACHE_FILE_NAME)
}
