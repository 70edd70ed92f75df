//! Strict-order merge of per-page transcriptions into one artifact.
//!
//! Ordering is determined solely by page number — never by the order pages
//! were discovered, created, or listed by the filesystem. Failed pages are
//! simply absent: they leave no placeholder and never displace a successor.
//! Each page's text is followed by exactly one blank separator line, so
//! merging the same staging directory twice produces byte-identical output.

use crate::error::Pdf2TextError;
use crate::output::PageRecord;
use crate::pipeline::layout::page_ordinal;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Merge the successful pages of a run into `out_path`.
///
/// Records are sorted by page number here regardless of the order the caller
/// accumulated them in; the invariant is structural, not an accident of the
/// processing loop.
pub fn merge_records(records: &[PageRecord], out_path: &Path) -> Result<PathBuf, Pdf2TextError> {
    let mut entries: Vec<(u32, &Path)> = records
        .iter()
        .filter_map(|r| r.text_path.as_deref().map(|p| (r.number, p)))
        .collect();
    entries.sort_by_key(|(number, _)| *number);
    write_merged(&entries, out_path)
}

/// Re-merge an existing text staging directory.
///
/// Lists `*.txt` files, recovers each page number from its `page_<N>` stem
/// (strictly — a malformed name aborts the merge), sorts, and concatenates.
/// Running this twice over an unchanged directory is idempotent.
pub fn merge_directory(text_dir: &Path, out_path: &Path) -> Result<PathBuf, Pdf2TextError> {
    let mut entries: Vec<(u32, PathBuf)> = Vec::new();

    let listing = std::fs::read_dir(text_dir).map_err(|e| Pdf2TextError::StagedReadFailed {
        path: text_dir.to_path_buf(),
        source: e,
    })?;

    for item in listing {
        let item = item.map_err(|e| Pdf2TextError::StagedReadFailed {
            path: text_dir.to_path_buf(),
            source: e,
        })?;
        let path = item.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Pdf2TextError::MalformedPageFile {
                name: path.display().to_string(),
            })?;
        entries.push((page_ordinal(stem)?, path));
    }

    entries.sort_by_key(|(number, _)| *number);
    let borrowed: Vec<(u32, &Path)> = entries.iter().map(|(n, p)| (*n, p.as_path())).collect();
    write_merged(&borrowed, out_path)
}

fn write_merged(entries: &[(u32, &Path)], out_path: &Path) -> Result<PathBuf, Pdf2TextError> {
    let file = File::create(out_path).map_err(|e| Pdf2TextError::OutputWriteFailed {
        path: out_path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    for (number, text_path) in entries {
        let text =
            std::fs::read_to_string(text_path).map_err(|e| Pdf2TextError::StagedReadFailed {
                path: text_path.to_path_buf(),
                source: e,
            })?;
        // page text, then one blank separator line
        writeln!(writer, "{text}").map_err(|e| write_failed(out_path, e))?;
        writeln!(writer).map_err(|e| write_failed(out_path, e))?;
        debug!("merged page {number} ({} bytes)", text.len());
    }

    writer.flush().map_err(|e| write_failed(out_path, e))?;
    info!("Merged {} pages into {}", entries.len(), out_path.display());
    Ok(out_path.to_path_buf())
}

fn write_failed(path: &Path, e: std::io::Error) -> Pdf2TextError {
    Pdf2TextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageFailure;
    use tempfile::tempdir;

    fn record(number: u32, text_path: Option<PathBuf>) -> PageRecord {
        PageRecord {
            number,
            text_path,
            error: None,
        }
    }

    #[test]
    fn pages_are_merged_by_number_not_record_order() {
        let tmp = tempdir().unwrap();
        let p3 = tmp.path().join("page_3.txt");
        let p1 = tmp.path().join("page_1.txt");
        std::fs::write(&p3, "third").unwrap();
        std::fs::write(&p1, "first").unwrap();

        let records = vec![record(3, Some(p3)), record(1, Some(p1))];
        let out = tmp.path().join("merged_output.txt");
        merge_records(&records, &out).unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "first\n\nthird\n\n"
        );
    }

    #[test]
    fn failed_pages_leave_no_placeholder() {
        let tmp = tempdir().unwrap();
        let p2 = tmp.path().join("page_2.txt");
        std::fs::write(&p2, "Hello").unwrap();

        let records = vec![
            record(2, Some(p2)),
            PageRecord {
                number: 3,
                text_path: None,
                error: Some(PageFailure::Service {
                    status: 500,
                    body: "oom".into(),
                }),
            },
        ];
        let out = tmp.path().join("merged_output.txt");
        merge_records(&records, &out).unwrap();

        // the worked example from the tool's docs: one entry, one separator
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "Hello\n\n");
    }

    #[test]
    fn empty_run_produces_an_empty_artifact() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("merged_output.txt");
        merge_records(&[], &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn directory_merge_sorts_numerically_not_lexically() {
        let tmp = tempdir().unwrap();
        // lexical order would put page_10 before page_2
        std::fs::write(tmp.path().join("page_10.txt"), "ten").unwrap();
        std::fs::write(tmp.path().join("page_2.txt"), "two").unwrap();
        std::fs::write(tmp.path().join("page_1.txt"), "one").unwrap();

        let out = tmp.path().join("merged_output.txt");
        merge_directory(tmp.path(), &out).unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "one\n\ntwo\n\nten\n\n"
        );
    }

    #[test]
    fn directory_merge_is_idempotent() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("page_1.txt"), "alpha").unwrap();
        std::fs::write(tmp.path().join("page_2.txt"), "beta").unwrap();

        let out = tmp.path().join("merged_output.txt");
        merge_directory(tmp.path(), &out).unwrap();
        let first = std::fs::read(&out).unwrap();
        merge_directory(tmp.path(), &out).unwrap();
        let second = std::fs::read(&out).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn malformed_staged_name_aborts_the_directory_merge() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("page_1.txt"), "fine").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "stray file").unwrap();

        let out = tmp.path().join("merged_output.txt");
        let err = merge_directory(tmp.path(), &out).unwrap_err();
        assert!(matches!(err, Pdf2TextError::MalformedPageFile { .. }));
    }

    #[test]
    fn non_txt_files_are_ignored() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("page_1.txt"), "kept").unwrap();
        std::fs::write(tmp.path().join("page_1.png"), b"\x89PNG").unwrap();

        let out = tmp.path().join("merged_output.txt");
        merge_directory(tmp.path(), &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "kept\n\n");
    }
}
