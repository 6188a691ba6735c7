//! User profile and pillar taxonomy (`System/user-profile.yaml`, `System/pillars.yaml`).
//!
//! Both are owned by the user and only read here. Missing or unparsable documents fall
//! back to built-in defaults with a warning; they never fail a run.

use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_PILLAR: &str = "General";

fn default_true() -> bool {
    true
}

fn default_name() -> String {
    "User".to_string()
}

fn default_role() -> String {
    "Professional".to_string()
}

/// Which optional sections the analysis prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingIntelFlags {
    #[serde(default = "default_true")]
    pub extract_customer_intel: bool,
    #[serde(default = "default_true")]
    pub extract_competitive_intel: bool,
    #[serde(default = "default_true")]
    pub extract_action_items: bool,
    #[serde(default = "default_true")]
    pub extract_decisions: bool,
}

impl Default for MeetingIntelFlags {
    fn default() -> Self {
        Self {
            extract_customer_intel: true,
            extract_competitive_intel: true,
            extract_action_items: true,
            extract_decisions: true,
        }
    }
}

/// The vault owner. `name` drives participant filtering; `role`/`company` frame the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub meeting_intelligence: MeetingIntelFlags,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            role: default_role(),
            company: String::new(),
            meeting_intelligence: MeetingIntelFlags::default(),
        }
    }
}

impl UserProfile {
    /// Load from YAML; unknown keys are ignored and absent keys take their defaults.
    pub fn load(path: &Path) -> Self {
        match read_yaml::<UserProfile>(path, "user profile") {
            Some(profile) => profile,
            None => Self::default(),
        }
    }
}

/// One pillar entry. Either `name` or `id` identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Pillar {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: None,
            keywords: Vec::new(),
        }
    }

    /// Display label: `name`, else `id`.
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Ordered pillar list. The first pillar is the classification fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarTaxonomy {
    pub pillars: Vec<Pillar>,
}

impl Default for PillarTaxonomy {
    fn default() -> Self {
        Self {
            pillars: vec![Pillar::named(DEFAULT_PILLAR)],
        }
    }
}

impl PillarTaxonomy {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pillars: names.into_iter().map(Pillar::named).collect(),
        }
    }

    /// Load from YAML (`pillars: [{id, name, ...}]`). An empty or unlabeled list is treated
    /// as malformed.
    pub fn load(path: &Path) -> Self {
        match read_yaml::<PillarTaxonomy>(path, "pillar taxonomy") {
            Some(t) if !t.names().is_empty() => t,
            Some(_) => {
                tracing::warn!(
                    target: "mintel::config",
                    path = %path.display(),
                    "Pillar taxonomy has no named pillars; using default pillars"
                );
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.pillars
            .iter()
            .filter_map(|p| p.label().map(str::to_string))
            .collect()
    }

    /// First configured pillar (`General` when the list is empty).
    pub fn primary(&self) -> String {
        self.names()
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_PILLAR.to_string())
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::warn!(
                target: "mintel::config",
                path = %path.display(),
                "{} not found; using defaults",
                what
            );
            return None;
        }
    };
    match serde_yaml::from_str::<T>(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(
                target: "mintel::config",
                path = %path.display(),
                error = %e,
                "Could not parse {}; using defaults",
                what
            );
            None
        }
    }
}
