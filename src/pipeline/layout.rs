//! On-disk layout of one run and the `page_<N>` naming scheme.
//!
//! Every staged file is named after the page number it belongs to
//! (`page_<N>.png`, `page_<N>.txt`), so no two pages ever share a path and
//! position can always be recovered from an unordered directory listing.
//! Parsing the ordinal back out is strict: a staged file that does not match
//! the scheme is an error, never silently sorted first.

use crate::error::Pdf2TextError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Staging directories of one run.
///
/// ```text
/// <root>/
///   images/page_<N>.png     rendered pages, deleted post-attempt unless kept
///   text/page_<N>.txt       per-page transcriptions
///   merged_output.txt       the final ordered artifact
/// ```
#[derive(Debug, Clone)]
pub struct RunDirs {
    root: PathBuf,
    images: PathBuf,
    text: PathBuf,
}

impl RunDirs {
    /// Create the staging directories under `root`.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, Pdf2TextError> {
        let root = root.into();
        let images = root.join("images");
        let text = root.join("text");

        for dir in [&images, &text] {
            std::fs::create_dir_all(dir).map_err(|e| Pdf2TextError::OutputWriteFailed {
                path: dir.clone(),
                source: e,
            })?;
        }

        Ok(Self { root, images, text })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_dir(&self) -> &Path {
        &self.images
    }

    pub fn text_dir(&self) -> &Path {
        &self.text
    }

    /// Staged image path for a page.
    pub fn image_path(&self, page: u32) -> PathBuf {
        self.images.join(format!("page_{page}.png"))
    }

    /// Staged transcription path for a page.
    pub fn text_path(&self, page: u32) -> PathBuf {
        self.text.join(format!("page_{page}.txt"))
    }

    /// Path of the merged artifact.
    pub fn merged_path(&self) -> PathBuf {
        self.root.join("merged_output.txt")
    }
}

static PAGE_STEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^page_([0-9]+)$").unwrap());

/// Parse the page number out of a staged file stem like `page_12`.
///
/// Strict by design: anything that does not match `page_<N>` exactly fails
/// loudly rather than degrading to a fallback ordinal that would silently
/// misplace the page.
pub fn page_ordinal(stem: &str) -> Result<u32, Pdf2TextError> {
    let caps = PAGE_STEM
        .captures(stem)
        .ok_or_else(|| Pdf2TextError::MalformedPageFile {
            name: stem.to_string(),
        })?;
    caps[1]
        .parse::<u32>()
        .map_err(|_| Pdf2TextError::MalformedPageFile {
            name: stem.to_string(),
        })
}
