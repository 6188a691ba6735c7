//! Context injection for person and company pages in the notes vault.
//!
//! Both injectors rebuild their name index on every call, scan the file about to be read for
//! references, and render a compact block from the referenced pages.

mod hook;
mod index;
mod inject;
mod page;

pub use hook::{vault_root_from_env, HookInput, HookOutput, HookSpecificOutput, ToolInput, HOOK_EVENT_NAME};
pub use index::{build_company_index, build_person_index, NameIndex, PERSON_GROUPS};
pub use inject::{
    find_companies, find_people, inject, render_companies, render_people, InjectorKind,
    VaultLayout,
};
pub use page::{split_front_matter, CompanyPage, PageFrontMatter, PersonPage};
