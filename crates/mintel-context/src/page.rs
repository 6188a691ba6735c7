//! Person and company page parsing.
//!
//! Pages are user-maintained markdown with optional YAML front-matter. Anything missing is
//! simply absent from the rendered context; a page that cannot be read yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

const MAX_CONTACTS_FROM_SECTION: usize = 5;

static OPEN_TASK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?m)^- \[ \] (.+)$").ok());
static LAST_MEETING: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)(?:last meeting|met on|call on)[:\s]+(\d{4}-\d{2}-\d{2}|\w+ \d{1,2},? \d{4})")
        .ok()
});
static CONTACTS_HEADER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^##\s*(?:key\s+)?contacts\b").ok());

/// Front-matter as flat string fields plus string lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFrontMatter {
    scalars: BTreeMap<String, String>,
    lists: BTreeMap<String, Vec<String>>,
}

impl PageFrontMatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scalars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Split `content` into front-matter and body. Unparsable YAML falls back to `key: value` lines.
pub fn split_front_matter(content: &str) -> (PageFrontMatter, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (PageFrontMatter::default(), content);
    };
    let Some(end) = rest.find("\n---") else {
        return (PageFrontMatter::default(), content);
    };
    let raw = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.split_once('\n').map_or("", |(_, b)| b);

    let front_matter = match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Mapping(map)) => from_mapping(&map),
        _ => from_lines(raw),
    };
    (front_matter, body)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn from_mapping(map: &serde_yaml::Mapping) -> PageFrontMatter {
    let mut fm = PageFrontMatter::default();
    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        match value {
            Value::Sequence(items) => {
                fm.lists.insert(
                    key.to_string(),
                    items.iter().filter_map(scalar_string).collect(),
                );
            }
            other => {
                if let Some(s) = scalar_string(other) {
                    fm.scalars.insert(key.to_string(), s);
                }
            }
        }
    }
    fm
}

fn from_lines(raw: &str) -> PageFrontMatter {
    let mut fm = PageFrontMatter::default();
    for line in raw.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() && !key.contains(' ') {
                fm.scalars
                    .insert(key.to_string(), value.trim().trim_matches('"').to_string());
            }
        }
    }
    fm
}

/// Unchecked `- [ ] ...` items with bold markers removed.
pub fn open_tasks(content: &str) -> Vec<String> {
    let Some(re) = OPEN_TASK.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().replace("**", "").trim().to_string())
        .collect()
}

pub fn last_meeting(content: &str) -> Option<String> {
    LAST_MEETING
        .as_ref()?
        .captures(content)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// First body paragraph, unless it is a heading or a list.
pub fn context_paragraph(body: &str) -> Option<String> {
    let first = body.trim().split("\n\n").next()?.trim();
    if first.is_empty() || first.starts_with('#') || first.starts_with('-') {
        return None;
    }
    Some(first.to_string())
}

/// Bullet entries under `## Contacts` / `## Key Contacts`.
pub fn contacts_section(content: &str) -> Vec<String> {
    let Some(header) = CONTACTS_HEADER.as_ref() else {
        return Vec::new();
    };
    let mut lines = content.lines().skip_while(|l| !header.is_match(l.trim()));
    if lines.next().is_none() {
        return Vec::new();
    }
    lines
        .take_while(|l| !l.trim_start().starts_with("##"))
        .filter_map(|l| {
            let l = l.trim();
            l.strip_prefix("- ").or_else(|| l.strip_prefix("* "))
        })
        .map(|c| c.replace("**", "").trim().to_string())
        .filter(|c| !c.is_empty())
        .take(MAX_CONTACTS_FROM_SECTION)
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonPage {
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub last_interaction: Option<String>,
    pub open_items: Vec<String>,
}

impl PersonPage {
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&file_stem(path), &content))
    }

    pub fn parse(stem: &str, content: &str) -> Self {
        let (fm, _) = split_front_matter(content);
        Self {
            name: fm
                .get("name")
                .map(str::to_string)
                .unwrap_or_else(|| stem.replace('_', " ")),
            role: fm.get("role").map(str::to_string),
            company: fm.get("company").map(str::to_string),
            last_interaction: fm.get("last_interaction").map(str::to_string),
            open_items: open_tasks(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyPage {
    pub name: String,
    pub status: Option<String>,
    pub contacts: Vec<String>,
    pub last_meeting: Option<String>,
    pub open_tasks: Vec<String>,
    pub context: Option<String>,
}

impl CompanyPage {
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&file_stem(path), &content))
    }

    pub fn parse(stem: &str, content: &str) -> Self {
        let (fm, body) = split_front_matter(content);
        let mut contacts = fm.list("contacts").to_vec();
        if contacts.is_empty() {
            contacts = contacts_section(content);
        }
        Self {
            name: fm
                .get("name")
                .map(str::to_string)
                .unwrap_or_else(|| stem.replace(['_', '-'], " ")),
            status: fm.get("status").map(str::to_string),
            contacts,
            last_meeting: last_meeting(content),
            open_tasks: open_tasks(content),
            context: context_paragraph(body),
        }
    }
}
