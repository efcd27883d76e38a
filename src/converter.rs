/*!
 * Conversion of the selected files into the flat output folder
 */

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::compress::{compress_file, CompressionLevel};
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::merge::write_merged;
use crate::structure::write_structure;
use crate::types::{ConversionOutcome, ConvertedFile, FailedFile};
use crate::utils::file_name_of;

/// One planned copy: source and flat destination name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Source path
    pub source: PathBuf,
    /// File name inside the output folder
    pub flat_name: String,
}

/// Runs the conversion and writes the reports
pub struct Converter {
    config: Config,
    progress: Arc<ProgressBar>,
    stop: Arc<AtomicBool>,
}

impl Converter {
    /// Create a new converter
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a stop flag, usually raised by the Ctrl+C handler
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Convert `files` and write the structure report and merged dump
    pub fn run(&self, files: &[PathBuf]) -> Result<ConversionOutcome> {
        let start = Instant::now();
        let output_dir = self.prepare_output_dir()?;
        let jobs = plan_destinations(files, &self.config.source_dir);

        info!(
            files = jobs.len(),
            compression = %self.config.compression,
            output = %output_dir.display(),
            "converting"
        );
        self.progress.set_length(jobs.len() as u64);

        let results: Vec<Option<std::result::Result<ConvertedFile, FailedFile>>> = jobs
            .par_iter()
            .map(|job| {
                if self.stop.load(Ordering::Relaxed) {
                    return None;
                }

                let result = self.convert_one(job, &output_dir).map_err(|e| {
                    tracing::error!(file = %job.source.display(), error = %e, "conversion failed");
                    FailedFile {
                        source: job.source.clone(),
                        message: e.to_string(),
                    }
                });

                self.progress.inc(1);
                Some(result)
            })
            .collect();

        let mut outcome = ConversionOutcome {
            output_dir: output_dir.clone(),
            ..Default::default()
        };
        for result in results {
            match result {
                Some(Ok(file)) => outcome.converted.push(file),
                Some(Err(failed)) => outcome.failed.push(failed),
                None => outcome.skipped += 1,
            }
        }
        outcome.interrupted = self.stop.load(Ordering::Relaxed);

        if outcome.interrupted {
            warn!(skipped = outcome.skipped, "stopped before all files were converted");
        } else {
            if self.config.generate_structure {
                outcome.structure_file = Some(write_structure(&self.config, &outcome.converted)?);
            }
            if self.config.generate_merged && !outcome.converted.is_empty() {
                outcome.merged_file = Some(write_merged(&self.config, &outcome.converted)?);
            }
        }

        outcome.duration = start.elapsed();
        info!(
            converted = outcome.converted.len(),
            failed = outcome.failed.len(),
            "conversion finished"
        );
        Ok(outcome)
    }

    /// Recreate the output folder from scratch
    fn prepare_output_dir(&self) -> Result<PathBuf> {
        let output_dir = self.config.output_dir();
        if output_dir.exists() {
            debug!(dir = %output_dir.display(), "removing previous output");
            fs::remove_dir_all(&output_dir)?;
        }
        fs::create_dir_all(&output_dir)?;
        Ok(output_dir)
    }

    /// Copy or compress a single file
    fn convert_one(&self, job: &Job, output_dir: &Path) -> Result<ConvertedFile> {
        let dest = output_dir.join(&job.flat_name);
        let name = file_name_of(&job.source);
        self.progress.set_message(name.clone());

        let raw = fs::read(&job.source).with_context(|| format!("reading {}", job.source.display()))?;
        let verbatim = self.config.compression == CompressionLevel::None || is_markdown(&name);

        let written = if verbatim {
            raw
        } else {
            match String::from_utf8(raw) {
                Ok(text) => compress_file(&text, &name, self.config.compression).into_bytes(),
                Err(e) => {
                    debug!(file = %job.source.display(), "not UTF-8, copying unchanged");
                    e.into_bytes()
                }
            }
        };

        fs::write(&dest, &written).with_context(|| format!("writing {}", dest.display()))?;

        let text = String::from_utf8_lossy(&written);
        let file = ConvertedFile {
            source: job.source.clone(),
            relative: relative_to(&job.source, &self.config.source_dir),
            bytes_in: fs::metadata(&job.source).map(|m| m.len()).unwrap_or(0),
            bytes_out: written.len() as u64,
            lines: text.lines().count(),
            chars: text.chars().count(),
            dest,
        };
        debug!(file = %file.relative.display(), out = file.bytes_out, "converted");
        Ok(file)
    }
}

/// Assign each source a unique flat file name
///
/// `.md` files keep their name and everything else gets `.txt` appended.
/// Clashing names are prefixed with their parent folders joined by `_`,
/// and any clash left after that gets a `_<n>` suffix.
pub fn plan_destinations(files: &[PathBuf], root: &Path) -> Vec<Job> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for file in files {
        *counts.entry(flat_name(file)).or_default() += 1;
    }

    let mut used = HashSet::new();
    files
        .iter()
        .map(|file| {
            let base = flat_name(file);
            let mut name = if counts[&base] > 1 {
                prefixed_name(file, root, &base)
            } else {
                base
            };

            if used.contains(&name) {
                let mut n = 2;
                while used.contains(&numbered_name(&name, n)) {
                    n += 1;
                }
                name = numbered_name(&name, n);
            }
            used.insert(name.clone());

            Job {
                source: file.clone(),
                flat_name: name,
            }
        })
        .collect()
}

fn flat_name(path: &Path) -> String {
    let name = file_name_of(path);
    if is_markdown(&name) {
        name
    } else {
        format!("{}.txt", name)
    }
}

fn prefixed_name(path: &Path, root: &Path, base: &str) -> String {
    let parents: Vec<String> = relative_to(path, root)
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();

    if parents.is_empty() {
        base.to_string()
    } else {
        format!("{}_{}", parents.join("_"), base)
    }
}

fn numbered_name(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}_{}", name, n),
    }
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn is_markdown(name: &str) -> bool {
    name.to_lowercase().ends_with(".md")
}
