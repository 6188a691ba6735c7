//! Context injection: given a file about to be read, find the people or companies it
//! references and render a short context block from their pages.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::index::{build_company_index, build_person_index, NameIndex};
use crate::page::{CompanyPage, PersonPage};

const ITEM_PREVIEW_CHARS: usize = 60;
const CONTEXT_PREVIEW_CHARS: usize = 100;
const MAX_KEY_CONTACTS: usize = 3;
const MAX_LISTED_ITEMS: usize = 2;
/// Shorter company names are only matched through explicit page paths.
const MIN_COMPANY_NAME_CHARS: usize = 4;

const MEETING_CUES: [&str; 4] = ["meeting", "attendee", "call with", "met with"];
const BUSINESS_CUES: [&str; 6] = ["meeting", "call", "demo", "account", "deal", "opportunity"];

static PERSON_REF: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"People/(?:Internal|External|CPO_Network)/([A-Za-z0-9_-]+)(?:\.md)?").ok()
});
static COMPANY_REF: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?:Companies|Accounts)/(?:[^\s/]+/)*([A-Za-z0-9_-]+)(?:\.md)?").ok()
});

/// Which page family to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectorKind {
    Person,
    Company,
}

/// Vault directories the injectors read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    pub root: PathBuf,
    pub people_dir: PathBuf,
    pub companies_dir: PathBuf,
    /// Legacy company location.
    pub accounts_dir: PathBuf,
}

impl VaultLayout {
    /// Standard layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            people_dir: root.join("05-Areas/People"),
            companies_dir: root.join("05-Areas/Companies"),
            accounts_dir: root.join("05-Areas/Accounts"),
            root,
        }
    }

    /// Absolute paths stay; anything else is vault-relative.
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        let p = Path::new(file_path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    fn relative_marker(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(&self.root).ok()?;
        let joined = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        (!joined.is_empty()).then(|| format!("{}/", joined))
    }

    /// True when `file_path` is itself a page of the given family.
    pub fn is_own_page(&self, kind: InjectorKind, file_path: &str) -> bool {
        let resolved = self.resolve(file_path);
        let dirs: Vec<&Path> = match kind {
            InjectorKind::Person => vec![&self.people_dir],
            InjectorKind::Company => vec![&self.companies_dir, &self.accounts_dir],
        };
        let normalized = file_path.replace('\\', "/");
        dirs.iter().any(|dir| {
            resolved.starts_with(dir)
                || self
                    .relative_marker(dir)
                    .is_some_and(|marker| normalized.contains(&marker))
        })
    }
}

/// Build the context block for `file_path`, or `None` when there is nothing to add.
pub fn inject(kind: InjectorKind, layout: &VaultLayout, file_path: &str) -> Option<String> {
    if file_path.trim().is_empty() || layout.is_own_page(kind, file_path) {
        return None;
    }
    let content = std::fs::read_to_string(layout.resolve(file_path)).ok()?;
    match kind {
        InjectorKind::Person => person_context(layout, &content),
        InjectorKind::Company => company_context(layout, &content),
    }
}

fn push_unique(found: &mut Vec<PathBuf>, path: &Path) {
    if !found.iter().any(|p| p == path) {
        found.push(path.to_path_buf());
    }
}

fn path_references(re: &Lazy<Option<Regex>>, index: &NameIndex, content: &str, found: &mut Vec<PathBuf>) {
    let Some(re) = re.as_ref() else { return };
    for caps in re.captures_iter(content) {
        if let Some(page) = caps.get(1).and_then(|m| index.get(m.as_str())) {
            push_unique(found, page);
        }
    }
}

/// Pages referenced by path or, in meeting-like content, by full name.
pub fn find_people(index: &NameIndex, content: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    path_references(&PERSON_REF, index, content, &mut found);

    let lower = content.to_lowercase();
    if MEETING_CUES.iter().any(|cue| lower.contains(cue)) {
        for (name, page) in index.names() {
            let full_name = name.contains(' ') || name.contains('_');
            if full_name && lower.contains(&name.replace('_', " ")) {
                push_unique(&mut found, page);
            }
        }
    }
    found
}

/// Pages referenced by path or, in business content, by a name longer than three characters.
pub fn find_companies(index: &NameIndex, content: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    path_references(&COMPANY_REF, index, content, &mut found);

    let lower = content.to_lowercase();
    if BUSINESS_CUES.iter().any(|cue| lower.contains(cue)) {
        for (name, page) in index.names() {
            if name.chars().count() >= MIN_COMPANY_NAME_CHARS
                && lower.contains(&name.replace(['_', '-'], " "))
            {
                push_unique(&mut found, page);
            }
        }
    }
    found
}

fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn push_items(lines: &mut Vec<String>, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("  {}: {}", label, items.len()));
    for item in items.iter().take(MAX_LISTED_ITEMS) {
        lines.push(format!("    - {}", preview(item, ITEM_PREVIEW_CHARS)));
    }
}

pub fn render_people(people: &[PersonPage]) -> String {
    let mut lines = vec!["<person_context>".to_string(), "Referenced people:".to_string()];
    for p in people {
        lines.push(format!(
            "{} - {} @ {}",
            p.name,
            p.role.as_deref().unwrap_or("No role"),
            p.company.as_deref().unwrap_or("Unknown")
        ));
        if let Some(last) = &p.last_interaction {
            lines.push(format!("  Last interaction: {}", last));
        }
        push_items(&mut lines, "Open items", &p.open_items);
    }
    lines.push("</person_context>".to_string());
    lines.join("\n")
}

pub fn render_companies(companies: &[CompanyPage]) -> String {
    let mut lines = vec!["<company_context>".to_string(), "Referenced companies:".to_string()];
    for c in companies {
        match &c.status {
            Some(status) => lines.push(format!("{} - {}", c.name, status)),
            None => lines.push(c.name.clone()),
        }
        if !c.contacts.is_empty() {
            let shown: Vec<&str> = c
                .contacts
                .iter()
                .take(MAX_KEY_CONTACTS)
                .map(String::as_str)
                .collect();
            lines.push(format!("  Key contacts: {}", shown.join(", ")));
        }
        if let Some(last) = &c.last_meeting {
            lines.push(format!("  Last meeting: {}", last));
        }
        push_items(&mut lines, "Open tasks", &c.open_tasks);
        if let Some(context) = &c.context {
            lines.push(format!("  Context: {}", preview(context, CONTEXT_PREVIEW_CHARS)));
        }
    }
    lines.push("</company_context>".to_string());
    lines.join("\n")
}

fn person_context(layout: &VaultLayout, content: &str) -> Option<String> {
    let index = build_person_index(&layout.people_dir);
    if index.is_empty() {
        return None;
    }
    let pages: Vec<PersonPage> = find_people(&index, content)
        .iter()
        .filter_map(|p| PersonPage::load(p))
        .collect();
    (!pages.is_empty()).then(|| render_people(&pages))
}

fn company_context(layout: &VaultLayout, content: &str) -> Option<String> {
    let index = build_company_index(&[layout.companies_dir.clone(), layout.accounts_dir.clone()]);
    if index.is_empty() {
        return None;
    }
    let pages: Vec<CompanyPage> = find_companies(&index, content)
        .iter()
        .filter_map(|p| CompanyPage::load(p))
        .collect();
    (!pages.is_empty()).then(|| render_companies(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_patterns_compile() {
        assert!(PERSON_REF.is_some());
        assert!(COMPANY_REF.is_some());
    }

    #[test]
    fn preview_caps_on_chars() {
        assert_eq!(preview("short", 60), "short");
        assert_eq!(preview(&"a".repeat(61), 60), format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn own_pages_are_detected() {
        let layout = VaultLayout::new("/vault");
        assert!(layout.is_own_page(InjectorKind::Person, "05-Areas/People/External/Ada.md"));
        assert!(layout.is_own_page(InjectorKind::Person, "/vault/05-Areas/People/Internal/Bob.md"));
        assert!(layout.is_own_page(InjectorKind::Company, "/elsewhere/05-Areas/Accounts/Acme.md"));
        assert!(!layout.is_own_page(InjectorKind::Company, "Inbox/Meetings/2026-10-19/acme.md"));
        assert!(!layout.is_own_page(InjectorKind::Person, "05-Areas/Companies/Acme.md"));
    }

    #[test]
    fn render_people_lists_first_two_items() {
        let page = PersonPage {
            name: "Ada Lovelace".into(),
            role: Some("CTO".into()),
            company: None,
            last_interaction: Some("2026-10-01".into()),
            open_items: vec!["one".into(), "two".into(), "three".into()],
        };
        let block = render_people(&[page]);
        assert_eq!(
            block,
            "<person_context>\nReferenced people:\nAda Lovelace - CTO @ Unknown\n  Last interaction: 2026-10-01\n  Open items: 3\n    - one\n    - two\n</person_context>"
        );
    }

    #[test]
    fn short_company_names_need_a_path_reference() {
        let dir = tempfile::tempdir().unwrap();
        let companies = dir.path().join("Companies");
        std::fs::create_dir_all(&companies).unwrap();
        std::fs::write(companies.join("IBM.md"), "").unwrap();
        std::fs::write(companies.join("Acme_Corp.md"), "").unwrap();
        let index = build_company_index(&[companies]);

        let found = find_companies(&index, "Demo with IBM and Acme Corp");
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("Acme_Corp.md"));

        let found = find_companies(&index, "see Companies/IBM.md");
        assert_eq!(found.len(), 1);
    }
}
