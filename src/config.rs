/*!
 * Configuration handling for txtdump
 */

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::compress::CompressionLevel;
use crate::error::Result;
use crate::presets::{split_list, Preset};
use crate::report::ReportFormat;
use crate::utils::OUTPUT_DIR_NAME;
use crate::{bail, ensure};

/// Command-line arguments for txtdump
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "txtdump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flatten a source tree into .txt files for LLM context",
    long_about = "Copies the selected source files of a project into a flat `_ConvertedToTxt` folder as .txt files, optionally compressing them, and writes a structure report and a single merged dump. Godot .tscn/.tres files are rewritten into a compact structural notation."
)]
pub struct Args {
    /// Project directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Project preset (auto-detected when omitted)
    #[clap(long, value_enum)]
    pub preset: Option<Preset>,

    /// Comma-separated extensions to convert (overrides the preset)
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Comma-separated folder names to skip (overrides the preset)
    #[clap(long, value_delimiter = ',')]
    pub ignore_dirs: Vec<String>,

    /// Comma-separated glob patterns of file or folder names to skip
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Also honour .gitignore files
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Compression applied to converted files
    #[clap(long, value_enum, default_value_t = CompressionLevel::default())]
    pub compression: CompressionLevel,

    /// Skip the structure report
    #[clap(long)]
    pub no_structure: bool,

    /// Skip the merged dump
    #[clap(long)]
    pub no_merge: bool,

    /// Only list converted files in the structure report
    #[clap(long)]
    pub only_converted: bool,

    /// Comma-separated glob patterns of files written as stubs in the merged dump
    #[clap(long, value_delimiter = ',')]
    pub stub: Vec<String>,

    /// Number of threads to use for processing
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Format of the final summary
    #[clap(long, value_enum, default_value_t = ReportFormat::Table)]
    pub report_format: ReportFormat,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `info`, `txtdump=trace`)
    #[clap(long)]
    pub log_level: Option<String>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project directory to process
    pub source_dir: PathBuf,

    /// Preset the extension and folder lists came from
    pub preset: Option<Preset>,

    /// Lower-cased extensions (or bare file names) to convert
    pub extensions: Vec<String>,

    /// Lower-cased folder names to skip
    pub ignored_folders: Vec<String>,

    /// Glob patterns of names to skip
    pub ignore_patterns: Vec<String>,

    /// Whether to honour .gitignore files
    pub respect_gitignore: bool,

    /// Compression applied to converted files
    pub compression: CompressionLevel,

    /// Write the structure report
    pub generate_structure: bool,

    /// Write the merged dump
    pub generate_merged: bool,

    /// Hide unconverted files in the structure report
    pub only_converted: bool,

    /// Glob patterns of files stubbed in the merged dump
    pub stub_patterns: Vec<String>,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Format of the final summary
    pub report_format: ReportFormat,
}

impl Config {
    /// Default configuration for a project directory
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            preset: None,
            extensions: Vec::new(),
            ignored_folders: Vec::new(),
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
            compression: CompressionLevel::default(),
            generate_structure: true,
            generate_merged: true,
            only_converted: false,
            stub_patterns: Vec::new(),
            num_threads: 4,
            report_format: ReportFormat::Table,
        }
    }

    /// Use a preset's extension and folder lists
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self.extensions = preset.extensions();
        self.ignored_folders = preset.ignored_folders();
        self
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let source_dir = PathBuf::from(&args.directory_path);
        let preset = args.preset.or_else(|| Preset::detect(&source_dir));

        let mut config = Self::new(source_dir);
        if let Some(preset) = preset {
            config = config.with_preset(preset);
        }
        if !args.extensions.is_empty() {
            config.extensions = split_list(&args.extensions.join(","));
        }
        if !args.ignore_dirs.is_empty() {
            config.ignored_folders = split_list(&args.ignore_dirs.join(","));
        }

        config.ignore_patterns = args.ignore_patterns;
        config.respect_gitignore = args.respect_gitignore;
        config.compression = args.compression;
        config.generate_structure = !args.no_structure;
        config.generate_merged = !args.no_merge;
        config.only_converted = args.only_converted;
        config.stub_patterns = args.stub;
        config.num_threads = args.threads;
        config.report_format = args.report_format;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.source_dir.exists() {
            bail!(PathNotFound, "{}", self.source_dir.display());
        }
        ensure!(
            self.source_dir.is_dir(),
            Config,
            "not a directory: {}",
            self.source_dir.display()
        );
        ensure!(
            !self.extensions.is_empty(),
            Config,
            "no extensions selected and no preset detected; pass --extensions or --preset"
        );
        ensure!(self.num_threads > 0, InvalidArgument, "--threads must be at least 1");

        Ok(())
    }

    /// Flat output folder inside the project
    pub fn output_dir(&self) -> PathBuf {
        self.source_dir.join(OUTPUT_DIR_NAME)
    }

    /// Name of the project folder
    pub fn project_name(&self) -> String {
        fs::canonicalize(&self.source_dir)
            .ok()
            .and_then(|path| path.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "project".to_string())
    }
}
