//! Integration test: person and company injection against a temp vault.
//!
//! ## Scenario
//! 1. Lay out person pages in the three groups and company pages (including a legacy account).
//! 2. Inject for a meeting note that references them by path and by name.
//! 3. Confirm the rendered blocks and the skip rules (own pages, missing files, no matches).

use mintel_context::{inject, HookOutput, InjectorKind, VaultLayout};
use std::path::Path;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, content).expect("write");
}

fn seeded_vault() -> (tempfile::TempDir, VaultLayout) {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = VaultLayout::new(dir.path());

    write(
        &layout.people_dir.join("External/Ada_Lovelace.md"),
        "---\nrole: CTO\ncompany: Acme Corp\nlast_interaction: 2026-10-12\n---\n# Ada\n\n- [ ] Send the **revised** integration plan to the architecture review board before Friday\n- [ ] Book onsite\n- [ ] Intro to finance\n- [x] Old item\n",
    );
    write(&layout.people_dir.join("Internal/Bob.md"), "# Bob\n");
    write(
        &layout.companies_dir.join("Enterprise/Acme_Corp.md"),
        "---\nstatus: Active customer\ncontacts:\n  - Ada Lovelace\n  - Grace Hopper\n  - Alan Turing\n  - Extra Person\n---\nAcme is mid-way through a platform migration and wants a phased rollout with weekly checkpoints across three regions.\n\n- [ ] Send renewal quote\n\nLast meeting: 2026-10-12\n",
    );
    write(
        &layout.accounts_dir.join("Globex.md"),
        "# Globex\n\n## Key Contacts\n- Hank Scorpio\n",
    );
    (dir, layout)
}

#[test]
fn person_block_from_name_mention_and_path_reference() {
    let (_dir, layout) = seeded_vault();
    write(
        &layout.root.join("Inbox/Meetings/2026-10-19/acme.md"),
        "# Acme sync\n\nMeeting with Ada Lovelace about the rollout.\nSee [[05-Areas/People/Internal/Bob.md]].\n",
    );

    let block = inject(InjectorKind::Person, &layout, "Inbox/Meetings/2026-10-19/acme.md")
        .expect("people referenced");
    assert_eq!(
        block,
        "<person_context>\n\
         Referenced people:\n\
         Bob - No role @ Unknown\n\
         Ada Lovelace - CTO @ Acme Corp\n  \
         Last interaction: 2026-10-12\n  \
         Open items: 3\n    \
         - Send the revised integration plan to the architecture review...\n    \
         - Book onsite\n\
         </person_context>"
    );
}

#[test]
fn company_block_covers_companies_and_legacy_accounts() {
    let (_dir, layout) = seeded_vault();
    let note = layout.root.join("Inbox/call.md");
    write(
        &note,
        "Call with the Acme Corp team. Background in 05-Areas/Accounts/Globex.md\n",
    );

    let block = inject(InjectorKind::Company, &layout, &note.to_string_lossy())
        .expect("companies referenced");
    let lines: Vec<&str> = block.lines().collect();
    assert_eq!(lines[0], "<company_context>");
    assert_eq!(lines[1], "Referenced companies:");
    assert_eq!(lines[2], "Globex");
    assert_eq!(lines[3], "  Key contacts: Hank Scorpio");
    assert_eq!(lines[4], "Acme Corp - Active customer");
    assert_eq!(lines[5], "  Key contacts: Ada Lovelace, Grace Hopper, Alan Turing");
    assert_eq!(lines[6], "  Last meeting: 2026-10-12");
    assert_eq!(lines[7], "  Open tasks: 1");
    assert_eq!(lines[8], "    - Send renewal quote");
    assert!(lines[9].starts_with("  Context: Acme is mid-way"));
    assert!(lines[9].ends_with("..."));
    assert_eq!(*lines.last().expect("closing tag"), "</company_context>");
}

#[test]
fn skip_rules() {
    let (_dir, layout) = seeded_vault();

    // A person page is never annotated by the person injector.
    assert!(inject(InjectorKind::Person, &layout, "05-Areas/People/External/Ada_Lovelace.md").is_none());
    // Company and account pages are skipped by the company injector.
    assert!(inject(InjectorKind::Company, &layout, "05-Areas/Companies/Enterprise/Acme_Corp.md").is_none());
    assert!(inject(InjectorKind::Company, &layout, "05-Areas/Accounts/Globex.md").is_none());
    // Missing or empty paths.
    assert!(inject(InjectorKind::Person, &layout, "Inbox/missing.md").is_none());
    assert!(inject(InjectorKind::Company, &layout, "").is_none());

    // Names only count in meeting-like content.
    write(&layout.root.join("Inbox/plain.md"), "Ada Lovelace wrote a note.\n");
    assert!(inject(InjectorKind::Person, &layout, "Inbox/plain.md").is_none());
}

#[test]
fn empty_vault_injects_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = VaultLayout::new(dir.path());
    write(&dir.path().join("note.md"), "Meeting with Ada Lovelace at Acme Corp\n");
    assert!(inject(InjectorKind::Person, &layout, "note.md").is_none());
    assert!(inject(InjectorKind::Company, &layout, "note.md").is_none());
}

#[test]
fn hook_payload_wraps_block() {
    let (_dir, layout) = seeded_vault();
    write(&layout.root.join("demo.md"), "Demo for Acme Corp\n");
    let block = inject(InjectorKind::Company, &layout, "demo.md").expect("company referenced");
    let json = HookOutput::with_context(&block).to_json().expect("serialize");
    assert!(json.starts_with(r#"{"continue":true,"hookSpecificOutput":{"hookEventName":"PreToolUse","additionalContext":"\n<company_context>"#));
}
