/*!
 * Project structure report (`_FileStructure.md`)
 *
 * Three layouts, picked by compression level: a boxed ASCII tree with
 * sizes and merge markers, a compact indented tree, and a flat path list.
 */

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::compress::CompressionLevel;
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::types::{ConvertedFile, FileStatus};
use crate::utils::{
    display_relative, extension_label, file_name_of, format_tree_size, matches_any,
    HIDDEN_SUFFIXES, OUTPUT_DIR_NAME, STRUCTURE_FILE_NAME,
};

/// Unconverted files in one folder are listed one by one up to this count
pub const COLLAPSE_THRESHOLD: usize = 5;

/// Write the structure report into the output folder
pub fn write_structure(config: &Config, converted: &[ConvertedFile]) -> Result<PathBuf> {
    let path = config.output_dir().join(STRUCTURE_FILE_NAME);
    let report = render_structure(config, converted);
    fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;

    info!(file = %path.display(), "structure report written");
    Ok(path)
}

/// Render the structure report for the current state of the project
pub fn render_structure(config: &Config, converted: &[ConvertedFile]) -> String {
    let mut writer = StructureWriter::new(config, converted);
    writer.render();
    writer.out
}

struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

struct StructureWriter<'a> {
    config: &'a Config,
    statuses: HashMap<PathBuf, FileStatus>,
    out: String,
}

impl<'a> StructureWriter<'a> {
    fn new(config: &'a Config, converted: &[ConvertedFile]) -> Self {
        let statuses = converted
            .iter()
            .map(|file| {
                let status = if matches_any(&config.stub_patterns, &file.name()) {
                    FileStatus::Stub
                } else {
                    FileStatus::Merged
                };
                (file.relative.clone(), status)
            })
            .collect();

        Self {
            config,
            statuses,
            out: String::new(),
        }
    }

    fn render(&mut self) {
        let root = self.config.source_dir.clone();
        let root_name = fs::canonicalize(&root)
            .map(|path| file_name_of(&path))
            .unwrap_or_else(|_| file_name_of(&root));

        self.out.push_str("# Project Structure\n");
        let _ = writeln!(
            self.out,
            "Generated: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        match self.config.compression {
            CompressionLevel::None => {
                self.out.push_str("### Legend:\n");
                self.out.push_str("- `[ M ]` Merged: Full content included.\n");
                self.out.push_str("- `[ S ]` Stub: File included as a stub.\n\n");
                self.out.push_str("```text\n");
                let _ = writeln!(self.out, "[ROOT] {}", root_name);
                self.walk_tree(&root, "", false);
                self.out.push_str("```\n");
            }
            CompressionLevel::Smart => {
                self.out.push_str("(Compact Tree Mode)\n");
                let _ = writeln!(self.out, "{}/", root_name);
                self.walk_tree(&root, "", true);
            }
            CompressionLevel::Maximum => {
                self.out.push_str("(Flat Structure Mode)\n");
                self.write_flat(&root);
            }
        }
    }

    fn status(&self, path: &Path) -> FileStatus {
        let relative = path.strip_prefix(&self.config.source_dir).unwrap_or(path);
        self.statuses
            .get(relative)
            .copied()
            .unwrap_or(FileStatus::NotConverted)
    }

    fn is_visible(&self, name: &str, is_dir: bool) -> bool {
        if name == OUTPUT_DIR_NAME {
            return false;
        }
        if HIDDEN_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            return false;
        }
        if name.starts_with('.') && name != ".gitignore" {
            return false;
        }
        !(is_dir && self.config.ignored_folders.contains(&name.to_lowercase()))
    }

    fn list(&self, dir: &Path) -> Vec<Entry> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| Entry {
                is_dir: entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
            })
            .filter(|entry| self.is_visible(&entry.name, entry.is_dir))
            .collect()
    }

    fn walk_tree(&mut self, dir: &Path, prefix: &str, simple: bool) {
        let mut shown = Vec::new();
        let mut collapsed = Vec::new();

        for entry in self.list(dir) {
            if entry.is_dir || self.status(&entry.path) != FileStatus::NotConverted {
                shown.push(entry);
            } else if !self.config.only_converted {
                collapsed.push(entry);
            }
        }

        if collapsed.len() <= COLLAPSE_THRESHOLD {
            shown.append(&mut collapsed);
        }
        shown.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

        let total = shown.len() + usize::from(!collapsed.is_empty());
        for (index, entry) in shown.iter().enumerate() {
            self.write_node(entry, prefix, index + 1 == total, simple);
        }

        if !collapsed.is_empty() {
            let summary = extension_summary(&collapsed);
            if simple {
                let _ = writeln!(self.out, "{}  ... ({}: {})", prefix, collapsed.len(), summary);
            } else {
                let _ = writeln!(
                    self.out,
                    "{}└── [ ... {} ignored: {} ... ]",
                    prefix,
                    collapsed.len(),
                    summary
                );
            }
        }
    }

    fn write_node(&mut self, entry: &Entry, prefix: &str, is_last: bool, simple: bool) {
        if simple {
            let indent = format!("{}  ", prefix);
            if entry.is_dir {
                let _ = writeln!(self.out, "{}{}/", indent, entry.name);
                self.walk_tree(&entry.path, &indent, true);
            } else {
                let _ = writeln!(self.out, "{}{}", indent, entry.name);
            }
            return;
        }

        let connector = if is_last { "└── " } else { "├── " };
        if entry.is_dir {
            let _ = writeln!(self.out, "{}{}[DIR] {}", prefix, connector, entry.name);
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            self.walk_tree(&entry.path, &child_prefix, false);
        } else {
            let size = fs::metadata(&entry.path)
                .map(|m| format_tree_size(m.len()))
                .unwrap_or_else(|_| "?".to_string());
            let _ = writeln!(
                self.out,
                "{}{}[FILE] {} ({}) {}",
                prefix,
                connector,
                entry.name,
                size,
                self.status(&entry.path).marker()
            );
        }
    }

    fn write_flat(&mut self, root: &Path) {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || self.is_visible(
                        &entry.file_name().to_string_lossy(),
                        entry.file_type().is_dir(),
                    )
            });

        let mut lines = Vec::new();
        for entry in walker.filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let converted = self.status(entry.path()) != FileStatus::NotConverted;
            if self.config.only_converted && !converted {
                continue;
            }

            let relative = display_relative(entry.path(), root);
            lines.push(if converted {
                relative
            } else {
                format!("{} [ignore]", relative)
            });
        }

        for line in lines {
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }
}

/// `.ext(n)` for the three most common extensions
fn extension_summary(entries: &[Entry]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(extension_label(&entry.path)).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
        .into_iter()
        .take(3)
        .map(|(ext, n)| format!("{}({})", ext, n))
        .collect::<Vec<_>>()
        .join(", ")
}
