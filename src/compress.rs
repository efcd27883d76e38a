/*!
 * Text compression applied to converted files
 *
 * Two regex/line based filters trade readability for fewer tokens. Godot
 * scene and resource files are routed to the semantic compactor instead.
 */

use std::path::Path;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::godot;

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("valid block comment regex"));

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\r?\n){3,}").expect("valid newline regex"));

/// Extensions whose leading indentation is significant
const WHITESPACE_SENSITIVE: &[&str] = &["gd", "py", "yaml", "yml"];

/// How aggressively converted files are compressed
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Copy files verbatim
    None,
    /// Collapse runs of blank lines
    #[default]
    Smart,
    /// Strip comments, blank lines and (where safe) indentation
    Maximum,
}

/// Compress one file's content according to `level`
pub fn compress_file(content: &str, file_name: &str, level: CompressionLevel) -> String {
    match level {
        CompressionLevel::None => content.to_string(),
        _ if godot::is_godot_text_file(file_name) => godot::compact(content, file_name),
        CompressionLevel::Smart => compress_smart(content),
        CompressionLevel::Maximum => compress_max(content, file_name),
    }
}

/// Keep paragraphs but drop repeated blank lines
pub fn compress_smart(content: &str) -> String {
    EXCESS_NEWLINES
        .replace_all(content, "\n\n")
        .trim()
        .to_string()
}

/// Remove comments and blank lines; flatten indentation for safe languages
pub fn compress_max(content: &str, file_name: &str) -> String {
    let content = BLOCK_COMMENT.replace_all(content, "");
    let keep_indent = is_whitespace_sensitive(file_name);
    let mut out = String::with_capacity(content.len() / 2);

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
            continue;
        }

        let line = strip_inline_comment(line);
        if line.trim().is_empty() {
            continue;
        }

        if keep_indent {
            out.push_str(line.trim_end());
        } else {
            out.push_str(line.trim());
        }
        out.push('\n');
    }

    out.trim().to_string()
}

/// Cut a line at `//` (unless it follows `:`, as in a URL) or at `#`
fn strip_inline_comment(line: &str) -> &str {
    if let Some(pos) = line.find("//") {
        if !line[..pos].ends_with(':') {
            return &line[..pos];
        }
    }
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn is_whitespace_sensitive(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| WHITESPACE_SENSITIVE.contains(&ext.as_str()))
}
