//! Project-type presets: which extensions to convert and which folders to skip

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumProperty};

/// Known project layouts
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
    EnumProperty,
)]
pub enum Preset {
    #[strum(props(
        label = "Godot Engine",
        extensions = "gd, tscn, tres, gdshader, godot",
        ignored = ".godot, export_presets, .import"
    ))]
    Godot,

    #[strum(props(
        label = "Unity Engine",
        extensions = "cs, shader, cginc, txt, json, xml, asmdef, asset, inputactions",
        ignored = "Library, Temp, obj, bin, ProjectSettings, Logs, UserSettings, .vs, .idea"
    ))]
    Unity,

    #[strum(props(
        label = "C# (.NET / Visual Studio)",
        extensions = "cs, csproj, sln, xaml, config, json, cshtml, razor, sql, xml, props, targets",
        ignored = "bin, obj, .vs, packages, TestResults, .git, .idea, .vscode"
    ))]
    Dotnet,

    #[strum(props(
        label = "Java (Maven/Gradle)",
        extensions = "java, xml, properties, fxml, gradle, groovy",
        ignored = "target, .idea, build, .settings, bin, out"
    ))]
    Java,

    #[strum(props(
        label = "Web (JavaScript / Classic)",
        extensions = "js, mjs, html, css, json",
        ignored = "node_modules, dist, build, .next, .nuxt, coverage, .git, .vscode, .idea"
    ))]
    WebJs,

    #[strum(props(
        label = "Web (TypeScript / React)",
        extensions = "ts, tsx, jsx, html, css, scss, less, json, vue, svelte",
        ignored = "node_modules, dist, build, .next, .nuxt, coverage, .git, .vscode, .idea"
    ))]
    WebTs,

    #[strum(props(
        label = "Python",
        extensions = "py, requirements.txt, yaml, yml, json",
        ignored = "__pycache__, venv, env, .venv, .git, .idea, .vscode, build, dist, egg-info"
    ))]
    Python,
}

impl Preset {
    /// Human readable name
    pub fn label(&self) -> &'static str {
        self.get_str("label").unwrap_or("Manual")
    }

    /// Lower-cased extensions (or bare file names) selected by this preset
    pub fn extensions(&self) -> Vec<String> {
        split_list(self.get_str("extensions").unwrap_or_default())
    }

    /// Lower-cased folder names skipped by this preset
    pub fn ignored_folders(&self) -> Vec<String> {
        split_list(self.get_str("ignored").unwrap_or_default())
    }

    /// Guess the preset from marker files in the project root
    pub fn detect(root: &Path) -> Option<Self> {
        let has = |name: &str| root.join(name).exists();

        if has("project.godot") {
            return Some(Self::Godot);
        }
        if has("Assets") && has("ProjectSettings") {
            return Some(Self::Unity);
        }
        if has_extension(root, "sln") || has_extension(root, "csproj") {
            return Some(Self::Dotnet);
        }
        if has("pom.xml") || has("build.gradle") || has("build.gradle.kts") {
            return Some(Self::Java);
        }
        if has("requirements.txt") || has("pyproject.toml") || has("venv") || has(".venv") {
            return Some(Self::Python);
        }
        if has("package.json") {
            if has("tsconfig.json") || has("vite.config.ts") {
                return Some(Self::WebTs);
            }
            return Some(Self::WebJs);
        }

        None
    }
}

/// Split a comma separated list into trimmed, lower-cased, non-empty items
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().trim_start_matches("*.").to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Whether `dir` directly contains a file with the given extension
fn has_extension(dir: &Path, extension: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    })
}
