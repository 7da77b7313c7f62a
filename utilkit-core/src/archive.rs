//! Directory zipping.
//!
//! Every regular file under the source directory is stored deflate-compressed
//! under its path relative to that directory, using `/` separators.

use crate::error::{CoreError, CoreResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// What ended up in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub destination: PathBuf,
    pub files_added: usize,
    /// Uncompressed size of all stored files.
    pub bytes_in: u64,
}

/// Zips the contents of `source` into `destination`.
///
/// The archive is skipped if it lies inside `source`. Parent directories of
/// `destination` are created.
pub fn zip_directory(source: &Path, destination: &Path) -> CoreResult<ArchiveSummary> {
    if !source.is_dir() {
        return Err(CoreError::InputNotFound(format!(
            "source directory {} does not exist",
            source.display()
        )));
    }
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let root = source.canonicalize()?;
    let file = File::create(destination)?;
    let archive_path = destination.canonicalize()?;

    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files_added = 0;
    let mut bytes_in = 0;
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        // Linked files are stored with their content; linked directories are not descended.
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file || entry.path() == archive_path {
            continue;
        }

        let name = entry_name(&root, entry.path())?;
        log::debug!("Adding {name}");
        writer.start_file(name, options)?;
        let mut input = File::open(entry.path())?;
        bytes_in += io::copy(&mut input, &mut writer)?;
        files_added += 1;
    }
    writer.finish()?;

    Ok(ArchiveSummary {
        destination: destination.to_path_buf(),
        files_added,
        bytes_in,
    })
}

fn entry_name(root: &Path, path: &Path) -> CoreResult<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        CoreError::PathError(format!("{} is outside {}", path.display(), root.display()))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
