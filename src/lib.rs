/*!
 * txtdump - Flatten a project into .txt files for LLM context
 *
 * Scans a project, copies the selected sources into a flat folder as text
 * (compressing them on request), and writes a structure report plus one
 * merged dump. Godot `.tscn`/`.tres` files go through a semantic compactor
 * that keeps only the scene structure.
 */

pub mod compress;
pub mod config;
pub mod converter;
pub mod error;
pub mod godot;
pub mod logging;
pub mod merge;
pub mod presets;
pub mod report;
pub mod scanner;
pub mod structure;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use compress::{compress_file, CompressionLevel};
pub use config::{Args, Config};
pub use converter::Converter;
pub use error::{Result, TxtDumpError};
pub use godot::compact;
pub use merge::MergeWriter;
pub use presets::Preset;
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use scanner::Scanner;
pub use types::{ConversionOutcome, ConvertedFile, FailedFile, FileStatus};
pub use utils::format_file_size;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
