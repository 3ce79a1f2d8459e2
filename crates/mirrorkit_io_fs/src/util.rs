use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::spec::{EnumMirrorPatternMode, MirrorTreeError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Compiled exclude set, matched against entry basenames.
#[derive(Debug, Clone)]
pub(crate) enum SpecExcludeNames {
    Exact(HashSet<OsString>),
    Glob(GlobSet),
    Regex(Vec<Regex>),
}

impl SpecExcludeNames {
    pub(crate) fn from_raw(
        names_exclude: &[String],
        rule_pattern: EnumMirrorPatternMode,
    ) -> Result<Self, MirrorTreeError> {
        match rule_pattern {
            EnumMirrorPatternMode::Exact => Ok(Self::Exact(
                names_exclude.iter().map(OsString::from).collect(),
            )),
            EnumMirrorPatternMode::Glob => {
                let mut builder_globs = GlobSetBuilder::new();
                for pattern in names_exclude {
                    let glob = Glob::new(pattern)
                        .map_err(|e| MirrorTreeError::InvalidPattern(e.to_string()))?;
                    builder_globs.add(glob);
                }
                let set_globs = builder_globs
                    .build()
                    .map_err(|e| MirrorTreeError::InvalidPattern(e.to_string()))?;
                Ok(Self::Glob(set_globs))
            }
            EnumMirrorPatternMode::Regex => {
                let mut l_regex = Vec::with_capacity(names_exclude.len());
                for pattern in names_exclude {
                    let regex = Regex::new(pattern)
                        .map_err(|e| MirrorTreeError::InvalidPattern(e.to_string()))?;
                    l_regex.push(regex);
                }
                Ok(Self::Regex(l_regex))
            }
        }
    }

    /// Whether an entry named `name` (basename, not a path) is excluded.
    pub(crate) fn is_excluded(&self, name: &OsStr) -> bool {
        match self {
            Self::Exact(set_names) => set_names.contains(name),
            Self::Glob(set_globs) => set_globs.is_match(Path::new(name)),
            Self::Regex(l_regex) => {
                let name = name.to_string_lossy();
                l_regex.iter().any(|regex| regex.is_match(&name))
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Absolute, lexically cleaned path; symlinks resolved for the longest existing
/// prefix, with the missing tail re-attached.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    let mut path_abs = PathBuf::new();
    for component in path_joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                path_abs.pop();
            }
            other => path_abs.push(other.as_os_str()),
        }
    }

    let mut l_tail: Vec<OsString> = Vec::new();
    let mut path_cursor = path_abs.as_path();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_cursor) {
            return l_tail
                .iter()
                .rev()
                .fold(resolved, |acc, part| acc.join(part));
        }
        match (path_cursor.parent(), path_cursor.file_name()) {
            (Some(parent), Some(name)) => {
                l_tail.push(name.to_os_string());
                path_cursor = parent;
            }
            _ => break,
        }
    }
    path_abs
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryOperations

/// Kind of a source entry, as reported by `stat` (links followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumEntryKind {
    Directory,
    File,
    Other,
}

pub(crate) fn classify_entry(path_src: &Path) -> io::Result<EnumEntryKind> {
    let meta_src = fs::metadata(path_src)?;
    let kind = if meta_src.is_dir() {
        EnumEntryKind::Directory
    } else if meta_src.is_file() {
        EnumEntryKind::File
    } else {
        EnumEntryKind::Other
    };
    Ok(kind)
}

/// Remove whatever sits at `path_dst` (file, link or whole directory tree).
///
/// A missing destination is not an error.
pub(crate) fn remove_existing_destination(path_dst: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path_dst) {
        Ok(meta_dst) if meta_dst.is_dir() => fs::remove_dir_all(path_dst),
        Ok(_) => fs::remove_file(path_dst),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Child names of `path_dir`, sorted by name.
pub(crate) fn list_child_names(path_dir: &Path) -> io::Result<Vec<OsString>> {
    let mut l_names = fs::read_dir(path_dir)?
        .map(|entry| entry.map(|v| v.file_name()))
        .collect::<io::Result<Vec<_>>>()?;
    l_names.sort();
    Ok(l_names)
}

pub(crate) fn copy_file_fresh(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> io::Result<()> {
    fs::copy(path_file_src, path_file_dst)?;
    if if_preserve_metadata {
        apply_metadata(path_file_src, path_file_dst)?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(
                "Extended attributes unavailable on {} ({e})",
                path_file_src.display()
            );
            return;
        }
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "Failed to copy xattr {:?} to {} ({e})",
                name,
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_names_match_whole_basename_only() {
        let spec_ex_names =
            SpecExcludeNames::from_raw(&names(&["node_modules"]), EnumMirrorPatternMode::Exact)
                .expect("compile");
        assert!(spec_ex_names.is_excluded(OsStr::new("node_modules")));
        assert!(!spec_ex_names.is_excluded(OsStr::new("node_modules_old")));
        assert!(!spec_ex_names.is_excluded(OsStr::new("modules")));
    }

    #[test]
    fn empty_exclude_set_matches_nothing() {
        for rule_pattern in [
            EnumMirrorPatternMode::Exact,
            EnumMirrorPatternMode::Glob,
            EnumMirrorPatternMode::Regex,
        ] {
            let spec_ex_names = SpecExcludeNames::from_raw(&[], rule_pattern).expect("compile");
            assert!(!spec_ex_names.is_excluded(OsStr::new("anything")));
        }
    }

    #[test]
    fn glob_and_regex_modes() {
        let spec_ex_glob =
            SpecExcludeNames::from_raw(&names(&["*.tmp", ".v?code"]), EnumMirrorPatternMode::Glob)
                .expect("compile glob");
        assert!(spec_ex_glob.is_excluded(OsStr::new("build.tmp")));
        assert!(spec_ex_glob.is_excluded(OsStr::new(".vscode")));
        assert!(!spec_ex_glob.is_excluded(OsStr::new("main.rs")));

        let spec_ex_regex =
            SpecExcludeNames::from_raw(&names(&[r"^cache_\d+$"]), EnumMirrorPatternMode::Regex)
                .expect("compile regex");
        assert!(spec_ex_regex.is_excluded(OsStr::new("cache_42")));
        assert!(!spec_ex_regex.is_excluded(OsStr::new("cache_x")));
    }

    #[test]
    fn invalid_patterns_rejected() {
        let err = SpecExcludeNames::from_raw(&names(&["["]), EnumMirrorPatternMode::Glob)
            .expect_err("invalid glob");
        assert!(matches!(err, MirrorTreeError::InvalidPattern(_)));
        let err = SpecExcludeNames::from_raw(&names(&["("]), EnumMirrorPatternMode::Regex)
            .expect_err("invalid regex");
        assert!(matches!(err, MirrorTreeError::InvalidPattern(_)));
    }

    #[test]
    fn overlap_detects_missing_nested_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).expect("mkdir src");

        assert!(is_overlap(&src, &src.join("not/yet/there")));
        assert!(is_overlap(&src.join("inner"), &src));
        assert!(is_overlap(&src, &tmp.path().join("x/../src/deep")));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
        assert!(!is_overlap(&src, &tmp.path().join("src_copy")));
    }

    #[test]
    fn remove_existing_destination_handles_all_kinds() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file = tmp.path().join("f.txt");
        let path_dir = tmp.path().join("d");
        fs::write(&path_file, "x").expect("write");
        fs::create_dir_all(path_dir.join("nested")).expect("mkdir");
        fs::write(path_dir.join("nested/g.txt"), "y").expect("write");

        remove_existing_destination(&path_file).expect("remove file");
        remove_existing_destination(&path_dir).expect("remove dir");
        remove_existing_destination(&tmp.path().join("missing")).expect("missing is ok");

        assert!(!path_file.exists());
        assert!(!path_dir.exists());
    }

    #[test]
    fn list_child_names_is_sorted() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for name in ["c", "a", "b"] {
            fs::write(tmp.path().join(name), name).expect("write");
        }
        let l_names = list_child_names(tmp.path()).expect("list");
        assert_eq!(l_names, vec!["a", "b", "c"]);
    }
}
