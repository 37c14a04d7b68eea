//! Mission-based Integration Tests
//!
//! Each test plays a user scenario across several runs against a real
//! library on disk and checks the target directory after every run.

use std::fs;

use mirror_core::{
    CheckStatus, Item, ItemFilter, MirrorConfig, SyncEngine, SyncIndex, SyncMode, SyncOptions,
};
use mirror_test_utils::library::TestLibrary;
use pretty_assertions::assert_eq;

fn tagged_config(lib: &TestLibrary, mode: SyncMode, tag: &str) -> MirrorConfig {
    let mut config = MirrorConfig::new(lib.path(), lib.target(), mode);
    config.filter = ItemFilter {
        any_tags: vec![tag.to_string()],
        ..ItemFilter::default()
    };
    config
}

fn sync(engine: &SyncEngine) -> mirror_core::SyncResult {
    let items = engine.desired_items().unwrap();
    engine
        .run(&items, SyncOptions::default())
        .unwrap()
        .result
        .unwrap()
}

fn indexed(engine: &SyncEngine) -> SyncIndex {
    engine.stored_index().unwrap().map(|s| s.index).unwrap_or_default()
}

// =============================================================================
// Mission 1: a tag-driven folder follows the library over time
// =============================================================================

#[test]
fn mission_tagged_folder_follows_library() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "beach", "jpg", &["travel"])
        .add_item("BBBB0002XYZ", "Beach", "jpg", &["travel"])
        .add_item("CCCC0003XYZ", "desk", "jpg", &["work"]);
    let engine = SyncEngine::native(lib.profile(), tagged_config(&lib, SyncMode::Copy, "travel"));

    // Run 1: two travel photos, the second one suffixed
    let result = sync(&engine);
    assert_eq!(result.created_count, 2);
    assert_eq!(lib.target_entries(), vec!["Beach (BBBB0002).jpg", "beach.jpg"]);

    // Run 2: desk gets tagged travel
    lib.set_tags("CCCC0003XYZ", "desk", "jpg", &["work", "travel"]);
    let result = sync(&engine);
    assert_eq!((result.created_count, result.removed_count), (1, 0));
    assert_eq!(
        lib.target_entries(),
        vec!["Beach (BBBB0002).jpg", "beach.jpg", "desk.jpg"]
    );

    // Run 3: the first beach photo loses its tag, freeing "beach.jpg"
    lib.set_tags("AAAA0001XYZ", "beach", "jpg", &[]);
    let result = sync(&engine);
    assert_eq!((result.created_count, result.removed_count), (0, 1));
    assert_eq!(lib.target_entries(), vec!["Beach (BBBB0002).jpg", "desk.jpg"]);

    // Run 4: a new beach photo reuses the freed name
    lib.add_item("DDDD0004XYZ", "BEACH", "jpg", &["travel"]);
    let result = sync(&engine);
    assert_eq!(result.created_count, 1);
    assert_eq!(
        lib.target_entries(),
        vec!["BEACH.jpg", "Beach (BBBB0002).jpg", "desk.jpg"]
    );

    // Run 5: nothing changed
    let result = sync(&engine);
    assert_eq!((result.created_count, result.removed_count), (0, 0));
    assert_eq!(engine.check().unwrap().status, CheckStatus::Healthy);

    // The index describes exactly what is on disk
    let index = indexed(&engine);
    assert_eq!(index.len(), 3);
    for (_, path) in index.iter() {
        assert!(path.to_native().exists(), "{} should exist", path);
    }
}

// =============================================================================
// Mission 2: switching modes rebuilds the mirror without touching the library
// =============================================================================

#[cfg(unix)]
#[test]
fn mission_mode_switch_round_trip() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "one", "png", &["pick"])
        .add_item("BBBB0002XYZ", "two", "png", &["pick"]);

    let modes = [
        SyncMode::EntryFile,
        SyncMode::EntryDirectory,
        SyncMode::Copy,
        SyncMode::EntryFile,
    ];
    for mode in modes {
        let engine = SyncEngine::native(lib.profile(), tagged_config(&lib, mode, "pick"));
        let result = sync(&engine);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.created_count, 2, "mode {}", mode);

        let expected = match mode {
            SyncMode::EntryDirectory => vec!["AAAA0001XYZ.info", "BBBB0002XYZ.info"],
            _ => vec!["one.png", "two.png"],
        };
        assert_eq!(lib.target_entries(), expected);
        assert_eq!(engine.check().unwrap().status, CheckStatus::Healthy);
    }

    assert_eq!(
        fs::read_to_string(lib.media_path("AAAA0001XYZ", "one", "png")).unwrap(),
        "media of AAAA0001XYZ"
    );
    assert!(lib.info_dir("BBBB0002XYZ").join("metadata.json").exists());
}

// =============================================================================
// Mission 3: moving the target directory leaves nothing behind
// =============================================================================

#[test]
fn mission_target_move_cleans_old_directory() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "one", "png", &["pick"]);

    let first = SyncEngine::native(lib.profile(), tagged_config(&lib, SyncMode::Copy, "pick"));
    sync(&first);
    assert_eq!(lib.target_entries(), vec!["one.png"]);

    let mut moved = tagged_config(&lib, SyncMode::Copy, "pick");
    moved.mirror.target_dir = lib.root().join("elsewhere");
    let second = SyncEngine::native(lib.profile(), moved);
    let result = sync(&second);

    assert_eq!((result.created_count, result.removed_count), (1, 1));
    assert!(lib.target_entries().is_empty());
    assert!(lib.root().join("elsewhere").join("one.png").exists());
}

// =============================================================================
// Mission 4: items whose media disappeared are skipped until they return
// =============================================================================

#[test]
fn mission_missing_media_is_retried() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "one", "png", &["pick"])
        .add_item("BBBB0002XYZ", "two", "png", &["pick"]);
    lib.remove_media("BBBB0002XYZ", "two", "png");
    let engine = SyncEngine::native(lib.profile(), tagged_config(&lib, SyncMode::Copy, "pick"));

    let result = sync(&engine);
    assert_eq!((result.created_count, result.skipped_count), (1, 1));
    assert!(result.errors.is_empty());

    // Media comes back
    lib.add_item("BBBB0002XYZ", "two", "png", &["pick"]);
    let result = sync(&engine);
    assert_eq!((result.created_count, result.skipped_count), (1, 0));
    assert_eq!(lib.target_entries(), vec!["one.png", "two.png"]);
}

// =============================================================================
// Mission 5: losing the index leaves old entries behind (documented limit)
// =============================================================================

#[test]
fn mission_lost_index_overwrites_in_place() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "one", "png", &["pick"]);
    let engine = SyncEngine::native(lib.profile(), tagged_config(&lib, SyncMode::Copy, "pick"));
    sync(&engine);

    fs::remove_file(engine.index_path()).unwrap();
    let result = sync(&engine);

    // The entry is recreated over the existing file; no duplicate appears
    assert_eq!(result.created_count, 1);
    assert!(result.errors.is_empty());
    assert_eq!(lib.target_entries(), vec!["one.png"]);
}

// =============================================================================
// Mission 6: preview matches what the run then does
// =============================================================================

#[test]
fn mission_preview_matches_run() {
    let mut lib = TestLibrary::new();
    lib.add_item("AAAA0001XYZ", "x", "png", &["pick"])
        .add_item("BBBB0002XYZ", "x", "png", &["pick"])
        .add_item("CCCC0003XYZ", "y", "png", &["pick"]);
    let engine = SyncEngine::native(lib.profile(), tagged_config(&lib, SyncMode::Copy, "pick"));
    let items: Vec<Item> = engine.desired_items().unwrap();

    let preview = engine.preview(&items).unwrap();
    let report = engine.run(&items, SyncOptions::default()).unwrap();

    assert_eq!(preview, report.plan);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["result"]["created_count"], 3);
}
