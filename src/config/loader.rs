//! Configuration and workflow loading
//!
//! Workflow definitions resolve project-first, then the user config dir,
//! then the built-ins embedded in the binary. The optional top-level
//! config can add one extra search directory.

use super::WorkflowConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Built-in workflow definitions, embedded at compile time
const BUILTIN_WORKFLOWS: &[(&str, &str)] = &[
    ("recovery", include_str!("../workflows/recovery.toml")),
    ("visit", include_str!("../workflows/visit.toml")),
];

/// Top-level portal configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Global defaults
    #[serde(default)]
    pub defaults: Defaults,
}

/// Global default settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Extra directory searched for workflow definitions (tilde-expanded)
    pub workflows_dir: Option<String>,

    /// Display name used by the dashboard greeting after the mock sign-in
    pub doctor_name: Option<String>,
}

impl PortalConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/clinic-flow/config.toml
    /// 3. .clinicflow/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let user_config = Self::load_file(&user_config_path)
                    .with_context(|| format!("loading {}", user_config_path.display()))?;
                config.merge(user_config);
            }
        }

        let project_config_path = project_dir
            .map(|p| p.join(".clinicflow/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".clinicflow/config.toml"));

        if project_config_path.exists() {
            let project_config = Self::load_file(&project_config_path)
                .with_context(|| format!("loading {}", project_config_path.display()))?;
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Get the user config path (~/.config/clinic-flow/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clinic-flow/config.toml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.defaults.workflows_dir.is_some() {
            self.defaults.workflows_dir = other.defaults.workflows_dir;
        }
        if other.defaults.doctor_name.is_some() {
            self.defaults.doctor_name = other.defaults.doctor_name;
        }
    }

    /// The configured extra workflows directory, tilde-expanded
    pub fn extra_workflows_dir(&self) -> Option<PathBuf> {
        self.defaults
            .workflows_dir
            .as_deref()
            .map(|raw| PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }
}

/// Load a workflow from the standard hierarchy
///
/// Search order (first match wins):
/// 1. .clinicflow/workflows/{name}.toml (project)
/// 2. defaults.workflows_dir from the config, if set
/// 3. ~/.config/clinic-flow/workflows/{name}.toml (user)
/// 4. Built-in workflows (embedded)
pub fn load_workflow(
    name: &str,
    project_dir: Option<&Path>,
    config: &PortalConfig,
) -> Result<WorkflowConfig> {
    let filename = format!("{}.toml", name);

    let project_path = project_dir
        .map(|p| p.join(".clinicflow/workflows").join(&filename))
        .unwrap_or_else(|| PathBuf::from(".clinicflow/workflows").join(&filename));

    if project_path.exists() {
        return load_workflow_file(&project_path);
    }

    if let Some(extra_dir) = config.extra_workflows_dir() {
        let extra_path = extra_dir.join(&filename);
        if extra_path.exists() {
            return load_workflow_file(&extra_path);
        }
    }

    if let Some(user_dir) = dirs::config_dir() {
        let user_path = user_dir.join("clinic-flow/workflows").join(&filename);
        if user_path.exists() {
            return load_workflow_file(&user_path);
        }
    }

    if let Some((_, contents)) = BUILTIN_WORKFLOWS.iter().find(|(n, _)| *n == name) {
        return parse_workflow(contents)
            .with_context(|| format!("parsing built-in workflow '{}'", name));
    }

    anyhow::bail!("workflow '{}' not found", name)
}

/// Names of all available workflows: built-ins plus project overrides
pub fn list_workflows(project_dir: Option<&Path>) -> Vec<(String, &'static str)> {
    let mut entries: Vec<(String, &'static str)> = Vec::new();

    let project_workflows = project_dir
        .map(|p| p.join(".clinicflow/workflows"))
        .unwrap_or_else(|| PathBuf::from(".clinicflow/workflows"));

    if let Ok(dir) = std::fs::read_dir(&project_workflows) {
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    entries.push((stem.to_string(), "project"));
                }
            }
        }
    }

    for (name, _) in BUILTIN_WORKFLOWS {
        if !entries.iter().any(|(n, _)| n == name) {
            entries.push((name.to_string(), "built-in"));
        }
    }

    entries.sort();
    entries
}

fn load_workflow_file(path: &Path) -> Result<WorkflowConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_workflow(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn parse_workflow(contents: &str) -> Result<WorkflowConfig> {
    let workflow: WorkflowConfig = toml::from_str(contents)?;

    workflow.validate().map_err(|errors| {
        anyhow::anyhow!("workflow validation failed:\n  {}", errors.join("\n  "))
    })?;

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_recovery_loads_and_validates() {
        let config = PortalConfig::default();
        let workflow = load_workflow("recovery", Some(Path::new("/nonexistent")), &config).unwrap();

        assert_eq!(workflow.name, "recovery");
        let names: Vec<_> = workflow.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["request", "verify", "reset"]);
        assert!(workflow.steps[2].terminal);
        assert_eq!(workflow.steps[2].clears, vec!["email", "code"]);
    }

    #[test]
    fn test_builtin_visit_loads_and_validates() {
        let config = PortalConfig::default();
        let workflow = load_workflow("visit", Some(Path::new("/nonexistent")), &config).unwrap();

        assert_eq!(workflow.steps.len(), 2);
        assert_eq!(workflow.steps[0].fields[0].options.len(), 4);
        assert!(workflow.steps[1].fields.is_empty());
    }

    #[test]
    fn test_unknown_workflow_errors() {
        let config = PortalConfig::default();
        let err = load_workflow("nope", Some(Path::new("/nonexistent")), &config).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_project_workflow_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        let workflows_dir = dir.path().join(".clinicflow/workflows");
        std::fs::create_dir_all(&workflows_dir).unwrap();

        let mut file = std::fs::File::create(workflows_dir.join("recovery.toml")).unwrap();
        writeln!(
            file,
            r#"
            name = "recovery"
            description = "project override"

            [[steps]]
            name = "only"
            terminal = true
        "#
        )
        .unwrap();

        let config = PortalConfig::default();
        let workflow = load_workflow("recovery", Some(dir.path()), &config).unwrap();
        assert_eq!(workflow.description, "project override");
        assert_eq!(workflow.steps.len(), 1);
    }

    #[test]
    fn test_extra_workflows_dir_is_searched() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("triage.toml")).unwrap();
        writeln!(
            file,
            r#"
            name = "triage"

            [[steps]]
            name = "done"
            terminal = true
        "#
        )
        .unwrap();

        let config = PortalConfig {
            defaults: Defaults {
                workflows_dir: Some(dir.path().to_string_lossy().into_owned()),
                doctor_name: None,
            },
        };

        let workflow = load_workflow("triage", Some(Path::new("/nonexistent")), &config).unwrap();
        assert_eq!(workflow.name, "triage");
    }

    #[test]
    fn test_invalid_workflow_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let workflows_dir = dir.path().join(".clinicflow/workflows");
        std::fs::create_dir_all(&workflows_dir).unwrap();

        // 'reset' requires a key nothing produces
        let mut file = std::fs::File::create(workflows_dir.join("broken.toml")).unwrap();
        writeln!(
            file,
            r#"
            name = "broken"

            [[steps]]
            name = "reset"
            requires = ["code"]
            terminal = true
        "#
        )
        .unwrap();

        let config = PortalConfig::default();
        let err = load_workflow("broken", Some(dir.path()), &config).unwrap_err();
        assert!(format!("{:#}", err).contains("no earlier step produces"));
    }

    #[test]
    fn test_config_merge_other_wins() {
        let mut base = PortalConfig::default();
        base.defaults.doctor_name = Some("Dr. Jane".into());

        let mut other = PortalConfig::default();
        other.defaults.doctor_name = Some("Dr. Smith".into());
        other.defaults.workflows_dir = Some("~/flows".into());

        base.merge(other);
        assert_eq!(base.defaults.doctor_name.as_deref(), Some("Dr. Smith"));
        assert!(base.defaults.workflows_dir.is_some());
    }

    #[test]
    fn test_list_workflows_includes_builtins() {
        let names: Vec<_> = list_workflows(Some(Path::new("/nonexistent")))
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert!(names.contains(&"recovery".to_string()));
        assert!(names.contains(&"visit".to_string()));
    }
}
