//! Global context for Quay operations.
//!
//! Provides centralized access to the working directory, the user-wide
//! configuration and output preferences.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::util::config::{load_config, Config, PROJECT_FILE};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::find_upwards;

/// Environment variable overriding the Quay home directory.
pub const QUAY_HOME_ENV: &str = "QUAY_HOME";

/// No `Quay.toml` in the working directory or any parent.
#[derive(Debug, Error)]
#[error("could not find `{}` in `{}` or any parent directory", PROJECT_FILE, dir.display())]
pub struct ProjectNotFound {
    pub dir: PathBuf,
}

impl ProjectNotFound {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string()).with_suggestion(suggestions::NO_PROJECT)
    }
}

/// A located project: its root directory and merged configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for user-wide settings (~/.quay/)
    home: Option<PathBuf>,

    verbose: bool,

    color: bool,
}

impl GlobalContext {
    /// Create a context for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = std::env::var_os(QUAY_HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| directories::BaseDirs::new().map(|b| b.home_dir().join(".quay")));

        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
        }
    }

    /// Replace the home directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The Quay home directory, if one could be determined.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// The global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join("config.toml"))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Find `Quay.toml` starting from cwd and searching upward.
    pub fn find_project_file(&self) -> Result<PathBuf, ProjectNotFound> {
        find_upwards(&self.cwd, PROJECT_FILE).ok_or_else(|| ProjectNotFound {
            dir: self.cwd.clone(),
        })
    }

    /// Locate the project and load its configuration.
    pub fn load_project(&self) -> Result<ProjectContext> {
        let project_file = self.find_project_file()?;
        let root = project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        let config = load_config(self.config_path().as_deref(), &project_file)?;
        tracing::debug!("loaded {}", project_file.display());
        Ok(ProjectContext { root, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(dir: &Path) {
        std::fs::write(
            dir.join(PROJECT_FILE),
            "[project]\nname = \"example-udfs\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
    }

    #[test]
    fn test_find_project_file_in_parent() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let nested = tmp.path().join("src/hive/java");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested).with_home(tmp.path().join("home"));
        assert_eq!(
            ctx.find_project_file().unwrap(),
            tmp.path().join(PROJECT_FILE)
        );

        let project = ctx.load_project().unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(project.config.project.unwrap().name, "example-udfs");
    }

    #[test]
    fn test_project_not_found() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let err = ctx.find_project_file().unwrap_err();
        assert!(err.to_diagnostic().format(false).contains("Quay.toml"));
    }

    #[test]
    fn test_global_config_supplies_defaults() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join("config.toml"), "[build]\njobs = 3\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_home(&home);
        let project = ctx.load_project().unwrap();
        assert_eq!(project.config.build.jobs, Some(3));
    }
}
