/*!
 * Merged dump writer (`_<project>_Full_Source_code.txt`)
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

use crate::compress::CompressionLevel;
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::types::ConvertedFile;
use crate::utils::{matches_any, MERGED_FILE_SUFFIX};

/// Concatenates converted files into one text file
pub struct MergeWriter {
    /// Writer configuration
    config: Config,
}

impl MergeWriter {
    /// Create a new merge writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Path of the merged dump for this project
    pub fn output_path(&self) -> PathBuf {
        self.config.output_dir().join(format!(
            "_{}{}",
            self.config.project_name(),
            MERGED_FILE_SUFFIX
        ))
    }

    /// Write the dump next to the converted files
    pub fn write(&self, converted: &[ConvertedFile]) -> Result<PathBuf> {
        let path = self.output_path();
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        self.write_to(converted, &mut writer)
            .and_then(|_| writer.flush())
            .with_context(|| format!("writing {}", path.display()))?;

        info!(file = %path.display(), files = converted.len(), "merged dump written");
        Ok(path)
    }

    /// Stream the dump into any writer
    pub fn write_to<W: Write>(&self, converted: &[ConvertedFile], out: &mut W) -> io::Result<()> {
        let project = self.config.project_name();
        let verbose = self.config.compression == CompressionLevel::None;

        if verbose {
            writeln!(out, "# Full Source Code: {}", project)?;
            writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        } else {
            writeln!(out, "# Project: {}\n", project)?;
        }

        for file in converted {
            let name = file.name();
            if verbose {
                write!(out, "\n--- File: {} ---\n", name)?;
            } else {
                write!(out, "\n>>> {}\n", name)?;
            }

            if matches_any(&self.config.stub_patterns, &name) {
                write!(out, "(Stub)\n\n")?;
                continue;
            }

            match fs::read_to_string(&file.dest) {
                Ok(content) => writeln!(out, "{}", content)?,
                Err(e) => {
                    warn!(file = %file.dest.display(), error = %e, "cannot read converted file");
                    writeln!(out, "!!! Error: {}", e)?;
                }
            }
        }

        Ok(())
    }
}

/// Write the merged dump for `converted`
pub fn write_merged(config: &Config, converted: &[ConvertedFile]) -> Result<PathBuf> {
    MergeWriter::new(config.clone()).write(converted)
}
