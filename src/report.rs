/*!
 * Reporting functionality for txtdump
 *
 * Summarises a conversion run either as console tables (tabled) or as a
 * JSON document for scripts.
 */

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::compress::CompressionLevel;
use crate::config::Config;
use crate::error::Result;
use crate::types::{ConversionOutcome, FailedFile};
use crate::utils::format_file_size;

/// Files listed individually before switching to a top-N view
const FULL_LIST_LIMIT: usize = 15;

/// Largest files shown in the top-N view
const TOP_FILES: usize = 10;

/// Information about a converted file in the report
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReportInfo {
    /// Source path relative to the project
    pub path: String,
    /// Number of lines written
    pub lines: usize,
    /// Number of characters written
    pub chars: usize,
    /// Estimated LLM tokens (chars / 4)
    pub tokens: usize,
}

/// Statistics for a conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Output folder
    pub output_dir: String,
    /// Merged dump, when written
    pub merged_file: Option<String>,
    /// Structure report, when written
    pub structure_file: Option<String>,
    /// Compression level used
    pub compression: CompressionLevel,
    /// Time taken to convert
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    /// Number of files converted
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Estimated tokens for the whole output
    pub total_tokens: usize,
    /// Size of the converted sources
    pub bytes_in: u64,
    /// Size of the written files
    pub bytes_out: u64,
    /// Output size relative to input size
    pub ratio: f64,
    /// Files that failed
    pub failed: Vec<FailedFile>,
    /// Files not attempted after a stop request
    pub skipped: usize,
    /// Details for each file, largest first
    pub file_details: Vec<FileReportInfo>,
}

impl ScanReport {
    /// Collect report data from a finished run
    pub fn from_outcome(outcome: &ConversionOutcome, config: &Config) -> Self {
        let mut file_details: Vec<FileReportInfo> = outcome
            .converted
            .iter()
            .map(|file| FileReportInfo {
                path: file.relative.to_string_lossy().replace('\\', "/"),
                lines: file.lines,
                chars: file.chars,
                tokens: estimate_tokens(file.chars),
            })
            .collect();
        file_details.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.path.cmp(&b.path)));

        let bytes_in = outcome.bytes_in();
        let bytes_out = outcome.bytes_out();
        let ratio = if bytes_in > 0 {
            bytes_out as f64 / bytes_in as f64
        } else {
            1.0
        };

        Self {
            output_dir: outcome.output_dir.display().to_string(),
            merged_file: outcome.merged_file.as_ref().map(|p| p.display().to_string()),
            structure_file: outcome
                .structure_file
                .as_ref()
                .map(|p| p.display().to_string()),
            compression: config.compression,
            duration: outcome.duration,
            files_processed: outcome.converted.len(),
            total_lines: outcome.lines(),
            total_chars: outcome.chars(),
            total_tokens: estimate_tokens(outcome.chars()),
            bytes_in,
            bytes_out,
            ratio,
            failed: outcome.failed.clone(),
            skipped: outcome.skipped,
            file_details,
        }
    }
}

fn serialize_duration<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Rough token estimate used throughout the report
pub fn estimate_tokens(chars: usize) -> usize {
    chars / 4
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Console tables
    Table,
    /// JSON document
    Json,
}

/// Report generator for conversion results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            ReportFormat::Table => Ok(self.generate_console_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) -> Result<()> {
        println!("\n{}", self.generate_report(report)?);
        Ok(())
    }

    // Keep the tail of long paths, where the file name is
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3;
        for part in path.split('/').rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .skip(path.chars().count() - (max_len - 3))
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output Folder".to_string(),
                value: report.output_dir.clone(),
            },
            SummaryRow {
                key: "🗜️ Compression".to_string(),
                value: report.compression.to_string(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Converted".to_string(),
                value: self.format_number(report.files_processed),
            },
            SummaryRow {
                key: "📝 Total Lines".to_string(),
                value: self.format_number(report.total_lines),
            },
            SummaryRow {
                key: "🔤 Total Characters".to_string(),
                value: self.format_number(report.total_chars),
            },
            SummaryRow {
                key: "💾 Size".to_string(),
                value: format!(
                    "{} → {} ({:.0}%)",
                    format_file_size(report.bytes_in),
                    format_file_size(report.bytes_out),
                    report.ratio * 100.0
                ),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: format!("{} tokens (estimated)", self.format_number(report.total_tokens)),
            },
        ];

        if let Some(merged) = &report.merged_file {
            rows.push(SummaryRow {
                key: "📚 Merged Dump".to_string(),
                value: merged.clone(),
            });
        }
        if !report.failed.is_empty() {
            rows.push(SummaryRow {
                key: "❌ Failed".to_string(),
                value: report.failed.len().to_string(),
            });
        }
        if report.skipped > 0 {
            rows.push(SummaryRow {
                key: "⏹️ Skipped (stopped)".to_string(),
                value: report.skipped.to_string(),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        let files_to_show = if report.file_details.len() > FULL_LIST_LIMIT {
            &report.file_details[..TOP_FILES]
        } else {
            &report.file_details[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|info| FileRow {
                path: self.format_path(&info.path, 60),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.tokens),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = if report.skipped > 0 {
            "⚠️  CONVERSION STOPPED"
        } else {
            "✅  CONVERSION COMPLETE"
        };
        let files_title = if report.file_details.len() > FULL_LIST_LIMIT {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  CONVERTED FILES"
        };

        let mut out = format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        );
        for failed in &report.failed {
            out.push_str(&format!("\n❌ {}: {}", failed.source.display(), failed.message));
        }
        out
    }
}
