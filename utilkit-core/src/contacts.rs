// ============================================================================
// utilkit-core/src/contacts.rs
// ============================================================================
//
// CONTACTS: Phone and E-mail Extraction from PDF Files
//
// Each subdirectory of the input directory is a group of PDF files. The text
// of every file is scanned for phone numbers and e-mail addresses and one
// line per file is appended to `<output_dir>/<group>.txt`. Afterwards the
// input directory is emptied unless the caller opts out.
//
// KEY COMPONENTS:
// - TextExtractor / PdfExtractor: Text extraction seam (pdf-extract in production)
// - find_contacts: Pattern matching on extracted text
// - list_input_groups: Group discovery
// - extract_contacts: The full run
// - empty_directory: Removal of processed input
//
// AI-ASSISTANT-INFO: PDF phone/e-mail scraper with group-per-directory output

use crate::config::utils::get_env_bool;
use crate::error::{CoreError, CoreResult};
use crate::terminal;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]{3}").expect("valid e-mail pattern")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([-.\s]??\d{3}[-.\s]??\d{3}[-.\s]??\d{5}|\(\d{3}\)\s*\d{3}[-.\s]??\d{5}|\d{3}[-.\s]??\d{5})",
    )
    .expect("valid phone pattern")
});

/// Contacts found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub phones: Vec<String>,
    pub emails: Vec<String>,
}

impl ContactRecord {
    /// `"<phones separated by spaces>, <emails separated by ', '>"`
    pub fn to_line(&self) -> String {
        format!("{}, {}", self.phones.join(" "), self.emails.join(", "))
    }
}

/// Scans `text` for phone numbers and e-mail addresses, in order of appearance.
pub fn find_contacts(text: &str) -> ContactRecord {
    let phones = PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .collect();
    let emails = EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()).collect();
    ContactRecord { phones, emails }
}

/// Source of document text.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> CoreResult<String>;
}

/// Extracts the text of every page with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, path: &Path) -> CoreResult<String> {
        // pdf-extract panics on some malformed files
        let owned = path.to_path_buf();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text(&owned)
        }));

        match result {
            Ok(Ok(text)) => {
                log::debug!("Extracted {} chars from {}", text.len(), path.display());
                Ok(text)
            }
            Ok(Err(e)) => Err(CoreError::PdfExtract(format!("{}: {e}", path.display()))),
            Err(_) => Err(CoreError::PdfExtract(format!(
                "{}: extraction panicked (malformed PDF)",
                path.display()
            ))),
        }
    }
}

/// Options for [`extract_contacts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Leave the input directory untouched after the run.
    pub keep_input: bool,
}

impl ExtractOptions {
    /// Reads `UTILKIT_KEEP_INPUT`.
    pub fn from_env() -> Self {
        Self {
            keep_input: get_env_bool("UTILKIT_KEEP_INPUT", false),
        }
    }
}

/// Totals of an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub groups: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    /// Top-level entries removed from the input directory.
    pub deleted_entries: usize,
}

/// Maps each subdirectory name of `input_dir` to its regular files, sorted.
pub fn list_input_groups(input_dir: &Path) -> CoreResult<BTreeMap<String, Vec<PathBuf>>> {
    if !input_dir.is_dir() {
        return Err(CoreError::InputNotFound(format!(
            "input directory {} does not exist",
            input_dir.display()
        )));
    }

    let mut groups = BTreeMap::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            log::warn!("Skipping {}: not a group directory", path.display());
            continue;
        }

        let mut files = Vec::new();
        for file in fs::read_dir(&path)? {
            let file = file?.path();
            if file.is_file() {
                files.push(file);
            }
        }
        files.sort();
        groups.insert(entry.file_name().to_string_lossy().into_owned(), files);
    }
    Ok(groups)
}

fn process_file<E: TextExtractor>(extractor: &E, file: &Path, output: &Path) -> CoreResult<()> {
    let text = extractor.extract_text(file)?;
    let record = find_contacts(&text);
    let mut out = OpenOptions::new().create(true).append(true).open(output)?;
    writeln!(out, "{}", record.to_line())?;
    Ok(())
}

/// Runs the extraction over every group of `input_dir`.
///
/// Per-file failures are logged and counted, never returned. Unless
/// `options.keep_input` is set, the input directory is emptied afterwards even
/// when some files failed.
pub fn extract_contacts<E: TextExtractor>(
    extractor: &E,
    input_dir: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> CoreResult<ExtractionSummary> {
    let groups = list_input_groups(input_dir)?;
    ensure_output_outside_input(input_dir, output_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut summary = ExtractionSummary {
        groups: groups.len(),
        ..Default::default()
    };

    for (group, files) in &groups {
        terminal::print_processing(&format!("{group}..."));
        let output = output_dir.join(format!("{group}.txt"));
        for file in files {
            match process_file(extractor, file, &output) {
                Ok(()) => summary.files_processed += 1,
                Err(e) => {
                    log::debug!("Skipping {}: {e}", file.display());
                    summary.files_failed += 1;
                }
            }
        }
    }

    if summary.files_failed > 0 {
        log::warn!("{} file(s) could not be read", summary.files_failed);
    }

    if options.keep_input {
        log::info!("Keeping input directory {}", input_dir.display());
    } else {
        summary.deleted_entries = empty_directory(input_dir)?;
    }

    Ok(summary)
}

/// Rejects an output directory equal to or nested in the input directory,
/// which the clean-up would otherwise wipe.
fn ensure_output_outside_input(input_dir: &Path, output_dir: &Path) -> CoreResult<()> {
    let input = input_dir.canonicalize()?;
    let output = resolve_path(output_dir)?;
    if output.starts_with(&input) {
        return Err(CoreError::PathError(format!(
            "output directory {} must not be inside the input directory {}",
            output_dir.display(),
            input_dir.display()
        )));
    }
    Ok(())
}

/// Canonicalizes the longest existing prefix of `path` and appends the rest.
fn resolve_path(path: &Path) -> CoreResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(base) = existing.canonicalize() {
            return Ok(missing.iter().rev().fold(base, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

/// Removes every file, link and subdirectory inside `dir`, keeping `dir`.
///
/// A failed removal is reported and the next entry is attempted. Returns the
/// number of entries removed.
pub fn empty_directory(dir: &Path) -> CoreResult<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_real_dir = fs::symlink_metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
        let result = if is_real_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => terminal::print_warning(&format!(
                "Failed to delete {}. Reason: {e}",
                path.display()
            )),
        }
    }
    Ok(removed)
}
