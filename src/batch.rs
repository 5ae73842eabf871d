//! Batch TREC conversion
//!
//! Converts every regular file under an input directory into a
//! gzip-compressed TREC text file in an output directory, one output per
//! input with the file name preserved. Files are converted in parallel,
//! one reader/encoder/sink triple per worker with no shared mutable state;
//! a failing file is logged and skipped without halting its siblings.

use crate::prefs::Prefs;
use crate::reader::{DecodeError, DocumentReader};
use crate::writers::trec_record;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{error, info};
use pariter::IteratorExt as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Totals for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: usize,
    pub docs: usize,
}

/// Convert all regular files under `input_dir` to gzipped TREC text in
/// `output_dir`. Per-file decode and I/O failures are logged and counted;
/// only setup errors (unreadable input directory, uncreatable output
/// directory) abort the run.
pub fn convert_trectext_dir(input_dir: &Path, output_dir: &Path) -> io::Result<BatchSummary> {
    let pattern = format!("{}/**/*", input_dir.display());
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(io::Error::other)?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    // Sorted for deterministic processing order.
    paths.sort();

    std::fs::create_dir_all(output_dir)?;
    let out_dir = output_dir.to_path_buf();

    let mut summary = BatchSummary {
        files: paths.len(),
        ..BatchSummary::default()
    };
    let results = paths
        .into_iter()
        .parallel_map(move |path| {
            let outcome = convert_file(&path, &out_dir);
            (path, outcome)
        })
        .collect::<Vec<_>>();

    for (path, outcome) in results {
        match outcome {
            Ok(docs) => {
                info!("converted {:?}: {} docs", path, docs);
                summary.docs += docs;
            }
            Err(e) => {
                error!("failed to convert {:?}: {}", path, e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Convert one corpus file; returns the number of documents written.
/// Records are built whole before any byte reaches the sink, so a failure
/// mid-document never emits a partial record. The gzip sink is finalized on
/// the success path and flushed by drop otherwise.
fn convert_file(input: &Path, output_dir: &Path) -> Result<usize, DecodeError> {
    let name = input
        .file_name()
        .ok_or_else(|| io::Error::other("input path has no file name"))?;
    let out_path = output_dir.join(name);

    let mut prefs = Prefs::none();
    prefs.word = true;
    prefs.headline = true;
    prefs.dateline = true;
    let reader = DocumentReader::from_file(input, prefs)?;

    let sink = File::create(&out_path)?;
    let mut enc = GzEncoder::new(BufWriter::new(sink), Compression::default());

    let mut docs = 0;
    for doc in reader {
        let doc = doc?;
        enc.write_all(trec_record(&doc).as_bytes())?;
        docs += 1;
    }
    enc.finish()?.flush()?;
    Ok(docs)
}
