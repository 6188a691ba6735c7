//! Pre-read hook payloads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const HOOK_EVENT_NAME: &str = "PreToolUse";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Hook input read from stdin. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

impl HookInput {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// `path` wins over `file_path`; blank values count as missing.
    pub fn target_path(&self) -> Option<&str> {
        let input = self.tool_input.as_ref()?;
        [input.path.as_deref(), input.file_path.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    #[serde(rename = "continue")]
    pub continue_: bool,
    pub hook_specific_output: HookSpecificOutput,
}

impl HookOutput {
    pub fn with_context(block: &str) -> Self {
        Self {
            continue_: true,
            hook_specific_output: HookSpecificOutput {
                hook_event_name: HOOK_EVENT_NAME.to_string(),
                additional_context: format!("\n{}", block),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn non_blank_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// `CLAUDE_PROJECT_DIR`, then `VAULT_PATH`, then the working directory.
pub fn vault_root_from_env() -> PathBuf {
    non_blank_var("CLAUDE_PROJECT_DIR")
        .or_else(|| non_blank_var("VAULT_PATH"))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_path_prefers_path_then_file_path() {
        let input = HookInput::from_json(r#"{"tool_input": {"file_path": "b.md", "path": "a.md"}}"#).unwrap();
        assert_eq!(input.target_path(), Some("a.md"));

        let input = HookInput::from_json(r#"{"tool_input": {"path": "  ", "file_path": "b.md"}}"#).unwrap();
        assert_eq!(input.target_path(), Some("b.md"));

        let input = HookInput::from_json(r#"{"session_id": "x"}"#).unwrap();
        assert_eq!(input.target_path(), None);
    }

    #[test]
    fn output_shape() {
        let out = HookOutput::with_context("<person_context>\n</person_context>");
        let value: serde_json::Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "continue": true,
                "hookSpecificOutput": {
                    "hookEventName": "PreToolUse",
                    "additionalContext": "\n<person_context>\n</person_context>"
                }
            })
        );
    }
}
