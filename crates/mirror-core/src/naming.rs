//! Target name generation
//!
//! Derives the filesystem entry name an item occupies in the target
//! directory. Pure: the result depends only on the item, the mode and the
//! names already claimed, never on filesystem state.

use std::collections::HashSet;

use mirror_fs::NormalizedPath;

use crate::item::{Item, SyncMode};

/// Characters replaced with `_` when an item name becomes a file name.
pub const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Length of the id prefix appended to disambiguate colliding names.
const ID_SUFFIX_LEN: usize = 8;

/// Replace every character that is illegal in a file name with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Case-insensitive key used for collision checks on a final path component.
pub fn name_key(file_name: &str) -> String {
    file_name.to_lowercase()
}

/// Collision key of a path's final component.
pub fn path_key(path: &NormalizedPath) -> Option<String> {
    path.file_name().map(name_key)
}

/// Compute the target path for `item` in `target_dir`.
///
/// `names_in_use` holds lower-cased final components already claimed in this
/// run. It is only consulted for [`SyncMode::EntryFile`] and
/// [`SyncMode::Copy`]; directory entries are named by id and can not collide.
pub fn target_path_for(
    item: &Item,
    target_dir: &NormalizedPath,
    mode: SyncMode,
    names_in_use: &HashSet<String>,
) -> NormalizedPath {
    match mode {
        SyncMode::EntryDirectory => target_dir.join(&format!("{}.info", item.id)),
        SyncMode::EntryFile | SyncMode::Copy => {
            let stem = display_stem(item);
            let extension = sanitize(&item.extension);
            let base_name = with_extension(&stem, &extension);

            if !names_in_use.contains(&name_key(&base_name)) {
                return target_dir.join(&base_name);
            }

            let id = sanitize(&item.id);
            let suffixed = suffix_candidates(&id)
                .map(|suffix| with_extension(&format!("{} ({})", stem, suffix), &extension))
                .find(|name| !names_in_use.contains(&name_key(name)))
                .unwrap_or(base_name);
            target_dir.join(&suffixed)
        }
    }
}

/// Disambiguating suffixes in order of preference: the first eight
/// characters of the id, then the whole id, then the whole id numbered.
///
/// Only ids sharing an eight-character prefix ever get past the first.
fn suffix_candidates(id: &str) -> impl Iterator<Item = String> {
    let short = id.chars().take(ID_SUFFIX_LEN).collect::<String>().to_uppercase();
    let full = id.to_uppercase();
    let whole = (id.chars().count() > ID_SUFFIX_LEN).then(|| full.clone());
    std::iter::once(short)
        .chain(whole)
        .chain((2..).map(move |n| format!("{} {}", full, n)))
}

/// Sanitized display name, falling back to the id for names that would not
/// form a usable entry (empty, `.` or `..`).
fn display_stem(item: &Item) -> String {
    let stem = sanitize(&item.name);
    if stem.trim_matches('.').is_empty() {
        sanitize(&item.id)
    } else {
        stem
    }
}

fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}
