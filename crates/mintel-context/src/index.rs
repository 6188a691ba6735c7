//! Name -> page index, rebuilt from the vault on every invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Person pages live one level below the people directory in these groups.
pub const PERSON_GROUPS: [&str; 3] = ["Internal", "External", "CPO_Network"];

/// Lowercased name variants mapped to the page they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    entries: BTreeMap<String, PathBuf>,
}

impl NameIndex {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(&name.to_lowercase()).map(PathBuf::as_path)
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    fn insert_variants(&mut self, stem: &str, path: &Path, hyphen_variant: bool) {
        let lower = stem.to_lowercase();
        let mut variants = vec![lower.clone(), lower.replace('_', " ")];
        if hyphen_variant {
            variants.push(lower.replace('-', " "));
        }
        for v in variants {
            self.entries.insert(v, path.to_path_buf());
        }
    }
}

fn markdown_pages(dir: &Path, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Index `{people_dir}/{Internal,External,CPO_Network}/*.md`.
pub fn build_person_index(people_dir: &Path) -> NameIndex {
    let mut index = NameIndex::default();
    for group in PERSON_GROUPS {
        let dir = people_dir.join(group);
        if !dir.is_dir() {
            continue;
        }
        for page in markdown_pages(&dir, 1) {
            if let Some(stem) = stem(&page) {
                index.insert_variants(&stem, &page, false);
            }
        }
    }
    tracing::debug!(target: "mintel::context", names = index.len(), "Built person index");
    index
}

/// Index every `.md` under the given directories, recursively. Later directories win on clashes.
pub fn build_company_index(dirs: &[PathBuf]) -> NameIndex {
    let mut index = NameIndex::default();
    for dir in dirs.iter().filter(|d| d.is_dir()) {
        for page in markdown_pages(dir, usize::MAX) {
            if let Some(stem) = stem(&page) {
                index.insert_variants(&stem, &page, true);
            }
        }
    }
    tracing::debug!(target: "mintel::context", names = index.len(), "Built company index");
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn person_index_covers_groups_only() {
        let dir = tempfile::tempdir().unwrap();
        let people = dir.path().join("People");
        touch(&people.join("External/Ada_Lovelace.md"));
        touch(&people.join("Internal/Bob.md"));
        touch(&people.join("Archive/Old_Person.md"));
        touch(&people.join("External/notes.txt"));

        let index = build_person_index(&people);
        assert!(index.get("ada_lovelace").is_some());
        assert!(index.get("Ada Lovelace").is_some());
        assert!(index.get("bob").is_some());
        assert!(index.get("old person").is_none());
        assert!(index.get("notes").is_none());
    }

    #[test]
    fn company_index_is_recursive_with_hyphen_variant() {
        let dir = tempfile::tempdir().unwrap();
        let companies = dir.path().join("Companies");
        let accounts = dir.path().join("Accounts");
        touch(&companies.join("Enterprise/Acme-Corp.md"));
        touch(&accounts.join("Globex_Inc.md"));

        let index = build_company_index(&[companies, accounts, dir.path().join("missing")]);
        assert!(index.get("acme corp").is_some());
        assert!(index.get("acme-corp").is_some());
        assert!(index.get("globex inc").is_some());
    }
}
