use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::analysis::Analyzer;
use crate::cli::InputArgs;
use crate::filter::Filter;

pub const CONFIG_ENV: &str = "CLASS_DEPS_CONFIG";

/// Settings read from the optional JSON config file.
///
/// ```json
/// { "paths": ["target/classes"], "excludes": ["com.acme.gen."], "include_inner_classes": false }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    #[serde(flatten)]
    pub filter: Filter,
}

pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = cli_path {
        return Ok(Some(p.to_path_buf()));
    }

    if let Ok(p) = env::var(CONFIG_ENV) {
        return Ok(Some(PathBuf::from(p)));
    }

    let default_path = class_deps_config_dir()?.join("config.json");
    if default_path.exists() {
        return Ok(Some(default_path));
    }
    Ok(None)
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

impl AnalysisConfig {
    /// Command-line paths and prefixes are appended; `--no-inner-classes` overrides.
    pub fn merge(mut self, args: &InputArgs) -> Self {
        self.paths.extend(args.paths.iter().cloned());
        self.filter.includes.extend(args.includes.iter().cloned());
        self.filter.excludes.extend(args.excludes.iter().cloned());
        if args.no_inner_classes {
            self.filter.include_inner_classes = false;
        }
        self
    }

    pub fn analyzer(self) -> Analyzer {
        Analyzer::new()
            .with_paths(self.paths)
            .with_filter(self.filter)
    }
}

fn class_deps_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve config directory"))?;
    Ok(base.join("class-deps"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(paths: &[&str], includes: &[&str], no_inner_classes: bool) -> InputArgs {
        InputArgs {
            paths: paths.iter().map(PathBuf::from).collect(),
            includes: includes.iter().map(|s| s.to_string()).collect(),
            excludes: Vec::new(),
            no_inner_classes,
        }
    }

    #[test]
    fn explicit_path_wins() {
        let p = PathBuf::from("/etc/class-deps.json");
        assert_eq!(resolve_config_path(Some(p.as_path())).unwrap(), Some(p));
    }

    #[test]
    fn config_file_fields_are_optional() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "excludes": ["gen."] }"#).unwrap();
        assert!(config.paths.is_empty());
        assert!(config.filter.include_inner_classes);
        assert_eq!(config.filter.excludes, vec!["gen."]);
    }

    #[test]
    fn command_line_is_appended_to_file_settings() {
        let config = AnalysisConfig {
            paths: vec![PathBuf::from("build/classes")],
            filter: Filter::new(true, vec!["com.acme.".to_string()], Vec::new()),
        };
        let merged = config.merge(&args(&["lib/dep.jar"], &["org.acme."], true));

        assert_eq!(
            merged.paths,
            vec![PathBuf::from("build/classes"), PathBuf::from("lib/dep.jar")]
        );
        assert_eq!(merged.filter.includes, vec!["com.acme.", "org.acme."]);
        assert!(!merged.filter.include_inner_classes);

        let analyzer = merged.analyzer();
        assert_eq!(analyzer.paths().len(), 2);
        assert!(!analyzer.filter().include_inner_classes);
    }

    #[test]
    fn load_config_reports_the_path_on_error() {
        let path = std::env::temp_dir().join(format!(
            "class-deps-config-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, "not json").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        std::fs::write(&path, r#"{ "paths": ["a"], "include_inner_classes": false }"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.paths, vec![PathBuf::from("a")]);
        assert!(!config.filter.include_inner_classes);
        let _ = std::fs::remove_file(path);
    }
}
