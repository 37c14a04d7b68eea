//! Tests for plan execution

mod common;

use std::collections::BTreeSet;
use std::io;

use common::{FakePrimitives, item, out, run_once};
use mirror_core::plan::PlannedEntry;
use mirror_core::sync::FailureKind;
use mirror_core::{
    ExecOptions, SkipReason, SyncIndex, SyncMode, SyncPlan, compute_plan, compute_replacement_plan,
    execute,
};
use mirror_fs::NormalizedPath;
use pretty_assertions::assert_eq;

#[test]
fn missing_source_is_skipped_not_failed() {
    let present = item("A1", "a", "png");
    let absent = item("B2", "b", "png");
    let fake = FakePrimitives::new().with_sources(std::slice::from_ref(&present));

    let (_, result) = run_once(&[present, absent], &SyncIndex::new(), SyncMode::EntryFile, &fake);

    assert_eq!(result.created_count, 1);
    assert_eq!(result.skipped_count, 1);
    assert!(result.errors.is_empty());
    assert_eq!(result.skipped[0].item.id, "B2");
    assert!(matches!(result.skipped[0].reason, SkipReason::SourceMissing { .. }));
    assert!(result.new_index.contains("A1"));
    assert!(!result.new_index.contains("B2"));
}

#[test]
fn skipped_item_is_planned_again_next_run() {
    let absent = item("B2", "b", "png");
    let fake = FakePrimitives::new();

    let desired = std::slice::from_ref(&absent);
    let (_, result) = run_once(desired, &SyncIndex::new(), SyncMode::Copy, &fake);
    let (plan, _) = run_once(&[absent], &result.new_index, SyncMode::Copy, &fake);

    assert_eq!(plan.to_create.len(), 1);
}

#[test]
fn entry_directory_does_not_check_source() {
    let fake = FakePrimitives::new();

    let desired = [item("A1", "a", "png")];
    let (_, result) = run_once(&desired, &SyncIndex::new(), SyncMode::EntryDirectory, &fake);

    assert_eq!(result.created_count, 1);
    assert!(fake.has_entry("/out/A1.info"));
}

#[test]
fn absent_removal_is_neither_error_nor_count() {
    let mut previous = SyncIndex::new();
    previous.insert("GONE", NormalizedPath::new("/out/gone.png"));
    let fake = FakePrimitives::new();

    let (plan, result) = run_once(&[], &previous, SyncMode::EntryFile, &fake);

    assert_eq!(plan.to_remove.len(), 1);
    assert_eq!(result.removed_count, 0);
    assert!(result.errors.is_empty());
    assert!(result.new_index.is_empty());
}

#[test]
fn present_removal_is_counted() {
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/old.png"));
    let fake = FakePrimitives::new().with_entry("/out/old.png");

    let (_, result) = run_once(&[], &previous, SyncMode::EntryFile, &fake);

    assert_eq!(result.removed_count, 1);
    assert!(!fake.has_entry("/out/old.png"));
    assert!(result.new_index.is_empty());
}

#[test]
fn failed_removal_keeps_index_entry() {
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/old.png"));
    let fake = FakePrimitives::new()
        .with_entry("/out/old.png")
        .fail_remove("/out/old.png", io::ErrorKind::PermissionDenied);

    let (_, result) = run_once(&[], &previous, SyncMode::EntryFile, &fake);

    assert_eq!(result.removed_count, 0);
    assert_eq!(result.errors.len(), 1);
    let failure = &result.errors[0];
    assert_eq!(failure.kind, FailureKind::PermissionDenied);
    assert_eq!(failure.path.as_ref().map(NormalizedPath::as_str), Some("/out/old.png"));
    assert!(failure.item.is_none());
    assert!(result.new_index.contains("OLD"));
    assert!(result.has_permission_errors());
}

#[test]
fn failed_creation_is_reported_and_run_continues() {
    let items = vec![item("A1", "a", "png"), item("B2", "b", "png")];
    let fake = FakePrimitives::new()
        .with_sources(&items)
        .fail_create("/out/a.png", io::ErrorKind::Other);

    let (_, result) = run_once(&items, &SyncIndex::new(), SyncMode::EntryFile, &fake);

    assert_eq!(result.created_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, FailureKind::OperationFailed);
    assert_eq!(result.errors[0].item.as_ref().map(|i| i.id.as_str()), Some("A1"));
    assert!(!result.new_index.contains("A1"));
    assert!(result.new_index.contains("B2"));
    assert!(!result.has_permission_errors());
}

#[test]
fn removals_run_before_creations() {
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/x.png"));
    let new = item("NEW", "x", "png");
    let fake = FakePrimitives::new()
        .with_entry("/out/x.png")
        .with_sources(std::slice::from_ref(&new));

    let (_, result) = run_once(&[new], &previous, SyncMode::EntryFile, &fake);

    let calls = fake.calls.borrow().clone();
    assert_eq!(calls, vec!["remove /out/x.png".to_string(), "link_file /out/x.png".to_string()]);
    assert_eq!(result.removed_count, 1);
    assert_eq!(result.new_index.get("NEW").map(NormalizedPath::as_str), Some("/out/x.png"));
    assert!(!result.new_index.contains("OLD"));
}

#[test]
fn overwrite_drops_other_entries_at_same_path() {
    // A plan built by hand where the created path is still indexed for
    // another id; the overwrite leaves only the new owner
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/x.png"));
    let new = item("NEW", "x", "png");
    let plan = SyncPlan {
        to_create: vec![PlannedEntry {
            item: new.clone(),
            target: NormalizedPath::new("/out/x.png"),
        }],
        to_remove: BTreeSet::new(),
        skipped: Vec::new(),
    };
    let fake = FakePrimitives::new().with_sources(std::slice::from_ref(&new));

    let result = execute(&plan, SyncMode::Copy, &previous, &ExecOptions::new(&fake));

    let ids: Vec<&str> = result.new_index.ids().collect();
    assert_eq!(ids, vec!["NEW"]);
}

#[test]
fn previous_index_is_not_mutated() {
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/old.png"));
    let snapshot = previous.clone();
    let fake = FakePrimitives::new().with_entry("/out/old.png");

    let (_, result) = run_once(&[], &previous, SyncMode::EntryFile, &fake);

    assert_eq!(previous, snapshot);
    assert!(result.new_index.is_empty());
}

#[test]
fn entry_directory_without_library_root_uses_media_parent() {
    let fake = FakePrimitives::new();
    let desired = [item("A1", "a", "png")];
    let plan = compute_plan(&desired, &SyncIndex::new(), SyncMode::EntryDirectory, &out());

    let options = ExecOptions::new(&fake);
    let result = execute(&plan, SyncMode::EntryDirectory, &SyncIndex::new(), &options);

    assert_eq!(result.created_count, 1);
    assert!(result.errors.is_empty());
}

#[test]
fn rebuild_drops_item_whose_creation_is_skipped() {
    // The old entry can not be removed and the new one can not be created;
    // the item must not stay indexed under its old path
    let mut previous = SyncIndex::new();
    previous.insert("A1", NormalizedPath::new("/old/x.png"));
    let a1 = item("A1", "x", "png");
    let fake = FakePrimitives::new()
        .with_entry("/old/x.png")
        .fail_remove("/old/x.png", io::ErrorKind::PermissionDenied);

    let desired = std::slice::from_ref(&a1);
    let plan = compute_replacement_plan(desired, &previous, SyncMode::Copy, &out());
    let result = execute(&plan, SyncMode::Copy, &previous, &ExecOptions::new(&fake));

    assert_eq!(result.skipped_count, 1);
    assert!(!result.new_index.contains("A1"));
    assert!(result.unremoved_paths().contains(&NormalizedPath::new("/old/x.png")));

    let next = compute_plan(&[a1], &result.new_index, SyncMode::Copy, &out());
    assert_eq!(next.to_create.len(), 1);
}

#[test]
fn rebuild_drops_item_whose_creation_fails() {
    let mut previous = SyncIndex::new();
    previous.insert("A1", NormalizedPath::new("/old/x.png"));
    let a1 = item("A1", "x", "png");
    let fake = FakePrimitives::new()
        .with_sources(std::slice::from_ref(&a1))
        .with_entry("/old/x.png")
        .fail_remove("/old/x.png", io::ErrorKind::PermissionDenied)
        .fail_create("/out/x.png", io::ErrorKind::Other);

    let desired = std::slice::from_ref(&a1);
    let plan = compute_replacement_plan(desired, &previous, SyncMode::EntryFile, &out());
    let result = execute(&plan, SyncMode::EntryFile, &previous, &ExecOptions::new(&fake));

    assert_eq!(result.errors.len(), 2);
    assert!(result.new_index.is_empty());
    let unremoved = result.unremoved_paths();
    let unremoved: Vec<&str> = unremoved.iter().map(NormalizedPath::as_str).collect();
    assert_eq!(unremoved, vec!["/old/x.png"]);
}

#[test]
fn failed_removal_still_indexed_is_not_unremoved() {
    let mut previous = SyncIndex::new();
    previous.insert("OLD", NormalizedPath::new("/out/old.png"));
    let fake = FakePrimitives::new()
        .with_entry("/out/old.png")
        .fail_remove("/out/old.png", io::ErrorKind::PermissionDenied);

    let (_, result) = run_once(&[], &previous, SyncMode::EntryFile, &fake);

    assert!(result.new_index.contains("OLD"));
    assert!(result.unremoved_paths().is_empty());
}

#[cfg(unix)]
mod native {
    use super::*;
    use pretty_assertions::assert_eq;
    use mirror_core::NativePrimitives;
    use mirror_test_utils::library::TestLibrary;
    use std::fs;

    fn library_item(lib: &TestLibrary, id: &str, name: &str) -> mirror_core::Item {
        mirror_core::Item::new(id, name, "png", lib.media_path(id, name, "png"))
    }

    /// Plan and apply one run on the real filesystem
    fn sync(
        lib: &TestLibrary,
        items: &[mirror_core::Item],
        previous: &SyncIndex,
        mode: SyncMode,
    ) -> mirror_core::SyncResult {
        let target = NormalizedPath::new(lib.target());
        let plan = compute_plan(items, previous, mode, &target);
        let options = ExecOptions::new(&NativePrimitives).with_library_root(lib.path().as_path());
        execute(&plan, mode, previous, &options)
    }

    #[test]
    fn entry_file_links_point_into_library() {
        let mut lib = TestLibrary::new();
        lib.add_item("KX1", "sunset", "png", &[]);
        fs::create_dir_all(lib.target()).unwrap();

        let items = vec![library_item(&lib, "KX1", "sunset")];
        let result = sync(&lib, &items, &SyncIndex::new(), SyncMode::EntryFile);

        assert_eq!(result.created_count, 1);
        let link = lib.target().join("sunset.png");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).unwrap(), "media of KX1");
    }

    #[test]
    fn entry_directory_links_storage_folder() {
        let mut lib = TestLibrary::new();
        lib.add_item("KX1", "sunset", "png", &[]);
        fs::create_dir_all(lib.target()).unwrap();

        let items = vec![library_item(&lib, "KX1", "sunset")];
        let result = sync(&lib, &items, &SyncIndex::new(), SyncMode::EntryDirectory);

        assert!(result.errors.is_empty());
        assert!(lib.target().join("KX1.info").join("metadata.json").exists());
    }

    #[test]
    fn copy_removal_leaves_library_intact() {
        let mut lib = TestLibrary::new();
        lib.add_item("KX1", "sunset", "png", &[]);
        fs::create_dir_all(lib.target()).unwrap();

        let items = vec![library_item(&lib, "KX1", "sunset")];
        let first = sync(&lib, &items, &SyncIndex::new(), SyncMode::Copy);
        assert_eq!(first.created_count, 1);

        let second = sync(&lib, &[], &first.new_index, SyncMode::Copy);

        assert_eq!(second.removed_count, 1);
        assert!(lib.target_entries().is_empty());
        assert!(lib.media_path("KX1", "sunset", "png").exists());
    }

    #[test]
    fn dangling_link_is_still_removed() {
        let mut lib = TestLibrary::new();
        lib.add_item("KX1", "sunset", "png", &[]);
        fs::create_dir_all(lib.target()).unwrap();

        let items = vec![library_item(&lib, "KX1", "sunset")];
        let first = sync(&lib, &items, &SyncIndex::new(), SyncMode::EntryFile);

        lib.remove_item("KX1");
        let second = sync(&lib, &[], &first.new_index, SyncMode::EntryFile);

        assert_eq!(second.removed_count, 1);
        lib.assert_not_exists("mirror/sunset.png");
    }
}
