//! Path Normalization
//!
//! Lexical path handling: nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

use super::types::Config;

/// Make `path` absolute against `base` and clean it up
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(path))
}

/// Join `entry` under `root`, treating `entry` as relative even when it
/// starts with a separator
pub fn join_under(root: &Path, entry: &Path) -> PathBuf {
    let relative: PathBuf = entry
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    normalize(&root.join(relative))
}

/// Drop `.` segments and fold `..` into their parent
///
/// Leading `..` segments of a relative path are kept; an empty result
/// becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Rewrite every `watch` and `ignore` entry to live under `config.root`
pub fn normalize_watch_paths(config: &mut Config) {
    let root = config.root.clone();
    for list in [&mut config.watch, &mut config.ignore].into_iter().flatten() {
        for entry in list.iter_mut() {
            *entry = join_under(&root, entry);
        }
    }
}
