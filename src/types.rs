/*!
 * Core types and data structures for the txtdump pipeline
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// How a file shows up in the structure report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Converted and included in full in the merged dump
    Merged,
    /// Converted but written as a stub in the merged dump
    Stub,
    /// Not selected for conversion
    NotConverted,
}

impl FileStatus {
    /// Marker used in the detailed tree
    pub fn marker(&self) -> &'static str {
        match self {
            FileStatus::Merged => "[ M ]",
            FileStatus::Stub => "[ S ]",
            FileStatus::NotConverted => "[ - ]",
        }
    }
}

/// A file copied into the flat output folder
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedFile {
    /// Path of the source file
    pub source: PathBuf,
    /// Source path relative to the project root
    pub relative: PathBuf,
    /// Path of the written file in the output folder
    pub dest: PathBuf,
    /// Size of the source file
    pub bytes_in: u64,
    /// Size of the written file
    pub bytes_out: u64,
    /// Lines in the written file
    pub lines: usize,
    /// Characters in the written file
    pub chars: usize,
}

impl ConvertedFile {
    /// File name of the source
    pub fn name(&self) -> String {
        crate::utils::file_name_of(&self.source)
    }
}

/// A file that could not be converted
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    /// Path of the source file
    pub source: PathBuf,
    /// Error message
    pub message: String,
}

/// Result of a converter run
#[derive(Debug, Clone, Default)]
pub struct ConversionOutcome {
    /// Files written to the output folder, in input order
    pub converted: Vec<ConvertedFile>,
    /// Files that failed, in input order
    pub failed: Vec<FailedFile>,
    /// Files not attempted because the run was stopped
    pub skipped: usize,
    /// Whether the stop flag was raised during the run
    pub interrupted: bool,
    /// Output folder
    pub output_dir: PathBuf,
    /// Structure report, when written
    pub structure_file: Option<PathBuf>,
    /// Merged dump, when written
    pub merged_file: Option<PathBuf>,
    /// Wall time of the run
    pub duration: Duration,
}

impl ConversionOutcome {
    /// Whether `relative` was converted
    pub fn contains(&self, relative: &Path) -> bool {
        self.converted.iter().any(|file| file.relative == relative)
    }

    /// Total size of the converted sources
    pub fn bytes_in(&self) -> u64 {
        self.converted.iter().map(|file| file.bytes_in).sum()
    }

    /// Total size of the written files
    pub fn bytes_out(&self) -> u64 {
        self.converted.iter().map(|file| file.bytes_out).sum()
    }

    /// Total lines written
    pub fn lines(&self) -> usize {
        self.converted.iter().map(|file| file.lines).sum()
    }

    /// Total characters written
    pub fn chars(&self) -> usize {
        self.converted.iter().map(|file| file.chars).sum()
    }
}
