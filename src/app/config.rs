use crate::app::cli::{Command, ScopeArg};
use crate::app::models::{Extensions, Operation, RuntimeConfig, Scope};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_INDENT_SIZE: usize = 4;
const DEFAULT_TAB_SIZE: usize = 4;

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
struct PresetConfig {
    indent_size: Option<usize>,
    tab_size: Option<usize>,
    indent_only: Option<bool>,
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("respacer").join("presets.toml"))
}

fn load_presets_file(config_path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_presets(&content)
}

fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

pub fn resolve_config(command: Command, project_name: Option<&str>) -> Result<RuntimeConfig> {
    let presets = load_presets_file(&presets_path()?)?;
    build_config(command, project_name, &presets)
}

fn build_config(
    command: Command,
    project_name: Option<&str>,
    presets: &HashMap<String, PresetConfig>,
) -> Result<RuntimeConfig> {
    let (operation, args) = match command {
        Command::Untabify(args) => (Operation::ToSpaces, args),
        Command::Tabify(args) => (Operation::ToTabs, args),
    };

    // Determine preset to use: CLI flag > Auto-detect > None
    let preset = match args.preset.as_deref() {
        Some(name) => presets
            .get(name)
            .cloned()
            .with_context(|| format!("Unknown preset '{}'", name))?,
        None => project_name
            .and_then(|k| presets.get(k))
            .cloned()
            .unwrap_or_default(),
    };

    let indent_only = if args.all_runs {
        false
    } else if args.indent_only {
        true
    } else {
        preset.indent_only.unwrap_or(true)
    };

    let extensions = match args.extensions.or(preset.extensions) {
        Some(list) => Extensions::new(list),
        None => Extensions::default(),
    };

    let scope = match args.scope {
        ScopeArg::Selection => Scope::Selection,
        ScopeArg::File => Scope::File,
        ScopeArg::Folder => Scope::Folder,
        ScopeArg::Project => Scope::Project,
        ScopeArg::Solution => Scope::Solution,
    };
    if args.lines.is_some() && scope != Scope::Selection {
        bail!("--lines only applies to --scope selection");
    }

    Ok(RuntimeConfig {
        operation,
        scope,
        paths: args.paths,
        indent_size: args
            .indent_size
            .or(preset.indent_size)
            .unwrap_or(DEFAULT_INDENT_SIZE),
        tab_size: args
            .tab_size
            .or(preset.tab_size)
            .unwrap_or(DEFAULT_TAB_SIZE),
        indent_only,
        extensions,
        exclude: merge_vecs(preset.exclude, args.exclude),
        lines: args.lines,
        dry_run: args.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cli::Cli;
    use clap::Parser;

    const PRESETS: &str = r#"
[webapp]
indent_size = 2
tab_size = 8
indent_only = false
extensions = [".ts", ".tsx"]
exclude = ["node_modules", "dist"]

[legacy]
indent_size = 8
"#;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["respacer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn defaults_without_presets() {
        let config = build_config(command(&["untabify"]), None, &HashMap::new()).unwrap();
        assert_eq!(config.operation, Operation::ToSpaces);
        assert_eq!(config.scope, Scope::File);
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.tab_size, 4);
        assert!(config.indent_only);
        assert_eq!(config.extensions, Extensions::default());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn line_range_requires_selection_scope() {
        let err = build_config(
            command(&["untabify", "--scope", "folder", "--lines", "1:2"]),
            None,
            &HashMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("--lines"));
        assert!(build_config(command(&["untabify", "--lines", "1:2"]), None, &HashMap::new()).is_err());

        let config = build_config(
            command(&["untabify", "--scope", "selection", "--lines", "1:2", "a.c"]),
            None,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(config.lines, Some((1, 2)));
    }

    #[test]
    fn project_name_selects_preset() {
        let presets = parse_presets(PRESETS).unwrap();
        let config = build_config(
            command(&["tabify", "--exclude", "dist", "coverage"]),
            Some("webapp"),
            &presets,
        )
        .unwrap();
        assert_eq!(config.operation, Operation::ToTabs);
        assert_eq!(config.indent_size, 2);
        assert_eq!(config.tab_size, 8);
        assert!(!config.indent_only);
        assert!(config.extensions.matches("app.tsx"));
        assert!(!config.extensions.matches("main.c"));
        assert_eq!(config.exclude, vec!["node_modules", "dist", "coverage"]);
    }

    #[test]
    fn cli_values_override_preset() {
        let presets = parse_presets(PRESETS).unwrap();
        let config = build_config(
            command(&[
                "untabify",
                "--preset",
                "webapp",
                "--indent-size",
                "3",
                "--indent-only",
                "--ext",
                ".c",
            ]),
            Some("other"),
            &presets,
        )
        .unwrap();
        assert_eq!(config.indent_size, 3);
        assert_eq!(config.tab_size, 8);
        assert!(config.indent_only);
        assert!(config.extensions.matches("main.c"));
        assert!(!config.extensions.matches("app.ts"));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let presets = parse_presets(PRESETS).unwrap();
        assert!(build_config(command(&["untabify", "--preset", "nope"]), None, &presets).is_err());
    }

    #[test]
    fn malformed_presets_are_an_error() {
        assert!(parse_presets("[webapp]\nindent_size = \"four\"\n").is_err());
    }

    #[test]
    fn missing_presets_file_is_empty() {
        let presets = load_presets_file(Path::new("/nonexistent/respacer/presets.toml")).unwrap();
        assert!(presets.is_empty());
    }

    #[test]
    fn merge_keeps_order_and_drops_duplicates() {
        let merged = merge_vecs(
            Some(vec!["a".into(), "b".into()]),
            Some(vec!["b".into(), "c".into()]),
        );
        assert_eq!(merged, vec!["a", "b", "c"]);
    }
}
