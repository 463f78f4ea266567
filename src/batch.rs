//! Batch processing of PNG files
//!
//! [`run`] finds every `.png` file under the input directory, pushes each
//! one through decode → rewrite → encode and writes the result under the
//! same file name into the output directory. A failing file is logged and
//! skipped; only setup failures end the run early.

use crate::{
    chunk::Chunk,
    codec::{self, DecodeMode},
    config::Config,
    error::{Error, Result},
    rewrite::{RewriteStats, Rewriter},
};
use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, info_span, warn};
use walkdir::WalkDir;

/// Outcome of one successfully processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Chunks decoded (and written)
    pub chunks: usize,
    pub stats: RewriteStats,
}

/// Outcome of a whole batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, in processing order
    pub processed: Vec<FileReport>,
    /// Per-file failures, each an [`Error::File`]
    pub failures: Vec<Error>,
}

impl BatchReport {
    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Sum of the rewrite counters over all processed files
    pub fn totals(&self) -> RewriteStats {
        self.processed
            .iter()
            .fold(RewriteStats::default(), |acc, r| RewriteStats {
                text_chunks: acc.text_chunks + r.stats.text_chunks,
                modified_chunks: acc.modified_chunks + r.stats.modified_chunks,
                bytes_removed: acc.bytes_removed + r.stats.bytes_removed,
            })
    }
}

/// Rewrite a complete PNG held in memory
///
/// Returns the new file bytes, the number of chunks and the rewrite counters.
pub fn scrub_png(
    bytes: &[u8],
    rewriter: &Rewriter,
    mode: DecodeMode,
) -> Result<(Vec<u8>, usize, RewriteStats)> {
    let (chunks, stats) = rewrite_png(bytes, rewriter, mode)?;
    Ok((codec::encode(&chunks), chunks.len(), stats))
}

/// Decode a whole PNG and rewrite its chunks in place
fn rewrite_png(
    bytes: &[u8],
    rewriter: &Rewriter,
    mode: DecodeMode,
) -> Result<(Vec<Chunk>, RewriteStats)> {
    let mut chunks = codec::read_png(bytes, mode)?;
    let stats = rewriter.rewrite_stream(&mut chunks);
    Ok((chunks, stats))
}

/// Rewrite one file from `input` to `output`
///
/// The output is written to a temporary file next to `output` and renamed
/// into place only once complete, so a failure never leaves a partial file.
pub fn process_file(
    input: &Path,
    output: &Path,
    rewriter: &Rewriter,
    mode: DecodeMode,
) -> Result<FileReport> {
    let bytes = fs::read(input)?;
    let (chunks, stats) = rewrite_png(&bytes, rewriter, mode)?;

    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        codec::write_png(&mut writer, &chunks)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        chunks: chunks.len(),
        stats,
    })
}

/// Whether the file name of `path` ends in `.png` in any letter case
///
/// A file named just `.png` counts.
pub fn is_png_path(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.as_encoded_bytes();
        name.len() >= 4 && name[name.len() - 4..].eq_ignore_ascii_case(b".png")
    })
}

/// All `.png` files below `dir`, sorted by path
///
/// Symlinks to files are included; symlinked directories are not descended
/// into. Any traversal error is returned.
pub fn discover_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !is_png_path(entry.path()) {
            continue;
        }
        if entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        } else if entry.path_is_symlink() {
            debug!(path = %entry.path().display(), "skipping symlink that does not point to a file");
        }
    }
    Ok(files)
}

/// Process every PNG under `config.input_dir`
///
/// Creating the output directory and walking the input directory are the
/// only errors returned; per-file errors end up in [`BatchReport::failures`].
pub fn run(config: &Config) -> Result<BatchReport> {
    fs::create_dir_all(&config.output_dir)?;
    let files = discover_pngs(&config.input_dir)?;
    let rewriter = config.rewriter();

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        files = files.len(),
        removals = rewriter.removals().len(),
        "starting batch"
    );

    let mut report = BatchReport::default();
    let mut written = HashSet::new();

    for input in files {
        let Some(name) = input.file_name() else {
            continue;
        };
        let output = config.output_dir.join(name);

        let span = info_span!("file", path = %input.display());
        let _enter = span.enter();

        match process_file(&input, &output, &rewriter, config.decode_mode) {
            Ok(file) => {
                if !written.insert(name.to_os_string()) {
                    warn!(output = %output.display(), "output name already used in this run, overwritten");
                }
                info!(
                    chunks = file.chunks,
                    modified = file.stats.modified_chunks,
                    removed = file.stats.bytes_removed,
                    "wrote {}",
                    file.output.display()
                );
                report.processed.push(file);
            }
            Err(e) => {
                error!(error = %e, "failed to process file");
                report.failures.push(e.in_file(&input));
            }
        }
    }

    let totals = report.totals();
    info!(
        processed = report.processed.len(),
        failed = report.failures.len(),
        modified_chunks = totals.modified_chunks,
        bytes_removed = totals.bytes_removed,
        "all PNG files have been processed"
    );
    debug!(?totals, "batch totals");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ihdr_chunk, png_bytes, text_png};

    #[test]
    fn test_is_png_path() {
        assert!(is_png_path(Path::new("a/b.png")));
        assert!(is_png_path(Path::new("B.PNG")));
        assert!(is_png_path(Path::new("c.Png")));
        assert!(is_png_path(Path::new("dir/.png")));
        assert!(!is_png_path(Path::new("png")));
        assert!(!is_png_path(Path::new("xpng")));
        assert!(!is_png_path(Path::new("d.png.bak")));
        assert!(!is_png_path(Path::new("e.jpg")));
    }

    #[test]
    fn test_scrub_png() {
        let input = text_png(&[("Author", "John Secret Smith")]);
        let rewriter = Rewriter::new(["Secret "]);

        let (out, chunks, stats) = scrub_png(&input, &rewriter, DecodeMode::Lenient).unwrap();

        assert_eq!(chunks, 3);
        assert_eq!(stats.modified_chunks, 1);
        assert_eq!(stats.bytes_removed, 7);
        assert_eq!(out, text_png(&[("Author", "John Smith")]));
    }

    #[test]
    fn test_scrub_png_rejects_bad_signature() {
        let rewriter = Rewriter::default();
        assert!(matches!(
            scrub_png(b"not a png at all", &rewriter, DecodeMode::Lenient),
            Err(Error::InvalidSignature)
        ));
    }

    #[test]
    fn test_process_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        fs::write(&input, text_png(&[("Comment", "made by ACME")])).unwrap();

        let rewriter = Rewriter::new([" by ACME"]);
        let report = process_file(&input, &output, &rewriter, DecodeMode::Strict).unwrap();

        assert_eq!(report.chunks, 3);
        assert_eq!(report.output, output);
        assert_eq!(
            fs::read(&output).unwrap(),
            text_png(&[("Comment", "made")])
        );
    }

    #[test]
    fn test_process_file_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.png");
        let output = dir.path().join("out.png");

        let mut bytes = png_bytes(&[ihdr_chunk()]);
        bytes.extend_from_slice(&[0, 0, 0, 9]);
        fs::write(&input, &bytes).unwrap();

        let err = process_file(&input, &output, &Rewriter::default(), DecodeMode::Strict)
            .unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
        assert!(!output.exists());

        // Nothing but the input is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_discover_pngs_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::create_dir_all(dir.path().join("dir.png")).unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "sub/c.png", "sub/deeper/d.Png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found: Vec<_> = discover_pngs(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("a.PNG"),
                PathBuf::from("b.png"),
                PathBuf::from("sub/c.png"),
                PathBuf::from("sub/deeper/d.Png"),
            ]
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_discover_follows_file_symlinks() {
        use std::os::unix::fs::symlink;

        let root = tempfile::tempdir().unwrap();
        let outside = root.path().join("outside");
        let input = root.path().join("in");
        fs::create_dir_all(outside.join("nested")).unwrap();
        fs::create_dir_all(&input).unwrap();

        let target = outside.join("real.png");
        fs::write(&target, text_png(&[("Author", "John Secret Smith")])).unwrap();
        fs::write(outside.join("nested/hidden.png"), b"").unwrap();

        symlink(&target, input.join("link.png")).unwrap();
        symlink(outside.join("nested"), input.join("dirlink.png")).unwrap();
        symlink(outside.join("missing.png"), input.join("dangling.png")).unwrap();

        let found = discover_pngs(&input).unwrap();
        assert_eq!(found, vec![input.join("link.png")]);

        let mut config = Config::new(&input, root.path().join("out"));
        config.remove_strings = vec!["Secret ".into()];
        let report = run(&config).unwrap();

        assert_eq!(report.processed.len(), 1);
        assert!(report.is_success());
        assert_eq!(
            fs::read(root.path().join("out/link.png")).unwrap(),
            text_png(&[("Author", "John Smith")])
        );
        // The link target itself is left alone
        assert_eq!(
            fs::read(&target).unwrap(),
            text_png(&[("Author", "John Secret Smith")])
        );
    }

    #[test]
    fn test_run_processes_file_named_dot_png() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join(".png"), text_png(&[("k", "v")])).unwrap();

        let report = run(&Config::new(&input, root.path().join("out"))).unwrap();
        assert_eq!(report.processed.len(), 1);
        assert!(root.path().join("out/.png").is_file());
    }

    #[test]
    fn test_run_failed_file_does_not_claim_output_name() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        fs::create_dir_all(input.join("a")).unwrap();
        fs::create_dir_all(input.join("b")).unwrap();
        fs::write(input.join("a/same.png"), b"not a png").unwrap();
        fs::write(input.join("b/same.png"), text_png(&[("k", "v")])).unwrap();

        let report = run(&Config::new(&input, root.path().join("out"))).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.processed.len(), 1);
        assert_eq!(
            fs::read(root.path().join("out/same.png")).unwrap(),
            text_png(&[("k", "v")])
        );
    }

    #[test]
    fn test_discover_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_pngs(&dir.path().join("missing")),
            Err(Error::Walk(_))
        ));
    }

    #[test]
    fn test_report_totals() {
        let stats = |m, b| RewriteStats {
            text_chunks: 1,
            modified_chunks: m,
            bytes_removed: b,
        };
        let file = |s| FileReport {
            input: PathBuf::new(),
            output: PathBuf::new(),
            chunks: 3,
            stats: s,
        };
        let report = BatchReport {
            processed: vec![file(stats(1, 4)), file(stats(0, 0)), file(stats(2, 10))],
            failures: Vec::new(),
        };

        assert!(report.is_success());
        assert_eq!(
            report.totals(),
            RewriteStats {
                text_chunks: 3,
                modified_chunks: 3,
                bytes_removed: 14,
            }
        );
    }
}
