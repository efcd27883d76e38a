/*!
 * Directory scanning: picks the files that will be converted
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::utils::{file_name_of, matches_any, OUTPUT_DIR_NAME};

/// Name based filters shared by both walkers
#[derive(Debug, Clone)]
pub struct ScanFilter {
    extensions: Vec<String>,
    ignored_folders: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl ScanFilter {
    /// Build the filter from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            extensions: config.extensions.clone(),
            ignored_folders: config.ignored_folders.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    /// Whether the walker should not enter or yield this entry
    pub fn should_skip(&self, name: &str, is_dir: bool) -> bool {
        if matches_any(&self.ignore_patterns, name) {
            return true;
        }
        if is_dir {
            return name == OUTPUT_DIR_NAME || self.ignored_folders.contains(&name.to_lowercase());
        }
        false
    }

    /// Whether a file name is selected for conversion
    pub fn is_selected(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        if lower.ends_with(".md") {
            return true;
        }
        if self.extensions.contains(&lower) {
            return true;
        }

        match lower.rfind('.') {
            Some(dot) if dot > 0 => self.extensions.iter().any(|ext| *ext == lower[dot + 1..]),
            _ => false,
        }
    }
}

/// Scanner for project files
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Name filters
    filter: ScanFilter,
    /// Progress spinner
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        let filter = ScanFilter::from_config(&config);
        Self {
            config,
            filter,
            progress,
        }
    }

    /// Walk the source directory and return the selected files, sorted
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.source_dir;
        info!(root = %root.display(), gitignore = self.config.respect_gitignore, "scanning");

        let mut files = if self.config.respect_gitignore {
            self.scan_with_gitignore(root)?
        } else {
            self.scan_with_walkdir(root)?
        };
        files.sort();

        info!(selected = files.len(), "scan finished");
        Ok(files)
    }

    fn scan_with_walkdir(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !self.filter.should_skip(
                    &entry.file_name().to_string_lossy(),
                    entry.file_type().is_dir(),
                )
        });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if let Some(path) = self.consider(entry.into_path()) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }

        Ok(files)
    }

    fn scan_with_gitignore(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let filter = self.filter.clone();
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .require_git(false)
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !filter.should_skip(
                        &entry.file_name().to_string_lossy(),
                        entry.file_type().is_some_and(|t| t.is_dir()),
                    )
            });

        let mut files = Vec::new();
        for entry in builder.build() {
            match entry {
                Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                    if let Some(path) = self.consider(entry.into_path()) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) if e.depth() == Some(0) => return Err(e.into()),
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }

        Ok(files)
    }

    /// Keep a walked file when its name is selected
    fn consider(&self, path: PathBuf) -> Option<PathBuf> {
        let name = file_name_of(&path);
        if !self.filter.is_selected(&name) {
            return None;
        }

        self.progress.inc(1);
        self.progress.set_message(format!("Found: {}", truncate_name(&name)));
        debug!(file = %path.display(), "selected");
        Some(path)
    }
}

/// Truncate long names to keep the progress line on one row
fn truncate_name(name: &str) -> String {
    let count = name.chars().count();
    if count > 40 {
        let tail: String = name.chars().skip(count - 37).collect();
        format!("...{}", tail)
    } else {
        name.to_string()
    }
}
