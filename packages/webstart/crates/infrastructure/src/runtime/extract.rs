//! Unpacking of downloaded runtime archives (`.tar.gz`).
//!
//! Entry paths and symlink targets must stay inside the destination; hard
//! links and device nodes are rejected.

use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use super::release::is_runtime_home;
use super::remote::DownloadError;

const MAX_ENTRY_COUNT: usize = 100_000;

/// A full JDK unpacks to well under this.
const MAX_EXTRACTED_SIZE: u64 = 4_000_000_000;

/// Runtime homes sit at most this deep inside an archive
/// (`jdk-17.0.9+9/Contents/Home` on macOS).
const MAX_HOME_DEPTH: usize = 3;

/// Unpacks the gzip-compressed tarball read from `reader` into `dest` and
/// returns the runtime home inside it.
pub fn extract_runtime(reader: impl Read, dest: &Path) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(dest)?;
    let dest = dest.canonicalize()?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut entry_count = 0usize;
    let mut total_size: u64 = 0;

    for entry in archive.entries().map_err(archive_error)? {
        let mut entry = entry.map_err(archive_error)?;

        entry_count += 1;
        if entry_count > MAX_ENTRY_COUNT {
            return Err(DownloadError::Archive(format!(
                "more than {MAX_ENTRY_COUNT} entries"
            )));
        }

        total_size = total_size.saturating_add(entry.header().size().map_err(archive_error)?);
        if total_size > MAX_EXTRACTED_SIZE {
            return Err(DownloadError::Archive(format!(
                "more than {MAX_EXTRACTED_SIZE} bytes when extracted"
            )));
        }

        let path = entry.path().map_err(archive_error)?.into_owned();
        validate_entry_path(&path)?;

        match entry.header().entry_type() {
            EntryType::Regular
            | EntryType::Directory
            | EntryType::GNULongName
            | EntryType::GNULongLink
            | EntryType::XHeader
            | EntryType::XGlobalHeader => {}
            EntryType::Symlink => {
                let target = entry
                    .link_name()
                    .map_err(archive_error)?
                    .ok_or_else(|| DownloadError::Archive(format!("{} has no link target", path.display())))?;
                validate_link_target(&path, &target)?;
            }
            other => {
                return Err(DownloadError::UnsafeEntry {
                    path: path.display().to_string(),
                    reason: format!("entry type {other:?}"),
                })
            }
        }

        // unpack_in re-checks that the resolved target stays below dest
        let unpacked = entry.unpack_in(&dest).map_err(archive_error)?;
        if !unpacked {
            return Err(DownloadError::UnsafeEntry {
                path: path.display().to_string(),
                reason: "escapes the destination".into(),
            });
        }
    }

    if entry_count == 0 {
        return Err(DownloadError::Archive("archive is empty".into()));
    }

    find_runtime_home(&dest, MAX_HOME_DEPTH)
        .ok_or_else(|| DownloadError::Archive("archive does not contain a runtime".into()))
}

fn archive_error(e: std::io::Error) -> DownloadError {
    DownloadError::Archive(e.to_string())
}

fn validate_entry_path(path: &Path) -> Result<(), DownloadError> {
    let escapes = path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::Prefix(_) | Component::RootDir
            )
        });

    if escapes {
        return Err(DownloadError::UnsafeEntry {
            path: path.display().to_string(),
            reason: "absolute or parent path".into(),
        });
    }
    Ok(())
}

/// Resolves `target` relative to the link's directory without touching the
/// file system and rejects it if it climbs above the archive root.
fn validate_link_target(link: &Path, target: &Path) -> Result<(), DownloadError> {
    let unsafe_link = || DownloadError::UnsafeEntry {
        path: link.display().to_string(),
        reason: format!("symlink to {}", target.display()),
    };

    if target.is_absolute() {
        return Err(unsafe_link());
    }

    let mut depth = link.components().count().saturating_sub(1) as isize;
    for component in target.components() {
        match component {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_link()),
        }
        if depth < 0 {
            return Err(unsafe_link());
        }
    }
    Ok(())
}

fn find_runtime_home(dir: &Path, depth: usize) -> Option<PathBuf> {
    if is_runtime_home(dir) {
        return Some(dir.to_path_buf());
    }
    if depth == 0 {
        return None;
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    children.sort();

    children
        .iter()
        .find_map(|child| find_runtime_home(child, depth - 1))
}
