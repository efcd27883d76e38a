/*!
 * Utility functions and shared names for txtdump
 */

use std::path::Path;

use glob_match::glob_match;

/// Flat output folder created inside the project
pub const OUTPUT_DIR_NAME: &str = "_ConvertedToTxt";

/// Structure report file name
pub const STRUCTURE_FILE_NAME: &str = "_FileStructure.md";

/// Suffix of the merged dump file (`_<project><suffix>`)
pub const MERGED_FILE_SUFFIX: &str = "_Full_Source_code.txt";

/// Name suffixes that never appear in the structure report
pub const HIDDEN_SUFFIXES: &[&str] = &[".import", ".tmp", ".uid"];

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Coarse size used in the structure tree: `N B` below 1 KiB, else `N KB`
pub fn format_tree_size(size: u64) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else {
        format!("{} KB", size / 1024)
    }
}

/// File name of a path as an owned string
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Extension with leading dot, or `no-ext`
pub fn extension_label(path: &Path) -> String {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[dot..].to_string(),
        _ => "no-ext".to_string(),
    }
}

/// Whether `name` matches any of the glob patterns
pub fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|pattern| glob_match(pattern, name))
}

/// Forward-slash relative path for display
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sizes() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_tree_size(1023), "1023 B");
        assert_eq!(format_tree_size(5000), "4 KB");
    }

    #[test]
    fn test_extension_label() {
        assert_eq!(extension_label(&PathBuf::from("a/b/main.rs")), ".rs");
        assert_eq!(extension_label(&PathBuf::from("Makefile")), "no-ext");
        assert_eq!(extension_label(&PathBuf::from(".env")), "no-ext");
        assert_eq!(extension_label(&PathBuf::from("x.tar.gz")), ".gz");
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["*.log".to_string(), "secret*".to_string()];
        assert!(matches_any(&patterns, "build.log"));
        assert!(matches_any(&patterns, "secret.txt"));
        assert!(!matches_any(&patterns, "main.rs"));
    }
}
