//! src/python/environment.rs
//! ============================================================================
//! # Local Python environment collaborator
//!
//! Shells out to the active package manager to list and install packages,
//! reads the project manifest, and asks the interpreter for its version.
//! Parsing is kept in free functions so it can be tested without a Python
//! toolchain on the machine.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::controller::traits::PythonEnvironment;
use crate::error::AppError;
use crate::python::scripts::{LocalScript, scan_scripts};

/// The package managers lazypy can drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Pip,
    Uv,
}

impl PackageManager {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pip => Self::Uv,
            Self::Uv => Self::Pip,
        }
    }

    pub const fn program(self) -> &'static str {
        match self {
            Self::Pip => "pip",
            Self::Uv => "uv",
        }
    }

    /// Arguments that print the installed set as `name==version` lines.
    pub const fn list_args(self) -> &'static [&'static str] {
        match self {
            Self::Pip => &["freeze"],
            Self::Uv => &["pip", "freeze"],
        }
    }

    pub fn install_args(self, package: &str) -> Vec<String> {
        match self {
            Self::Pip => vec!["install".to_string(), package.to_string()],
            Self::Uv => vec!["add".to_string(), package.to_string()],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// One installed or declared package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPackage {
    pub name: CompactString,
    pub version: CompactString,
}

impl LocalPackage {
    pub fn new(name: impl Into<CompactString>, version: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Everything the local scan produces for the Home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerSnapshot {
    pub python_version: String,
    pub packages: Vec<LocalPackage>,
    pub scripts: Vec<LocalScript>,
}

/// PEP 503 name normalization: lowercase, runs of `-`, `_`, `.` become `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_sep {
                out.push('-');
            }
            in_sep = true;
        } else {
            out.extend(c.to_lowercase());
            in_sep = false;
        }
    }
    out
}

/// Parse `pip freeze` style output. Lines that are not `name==version` are skipped.
pub fn parse_freeze(output: &str) -> Vec<LocalPackage> {
    output
        .lines()
        .filter_map(|line| {
            let (name, version) = line.trim().split_once("==")?;
            let name = name.trim();
            (!name.is_empty()).then(|| LocalPackage::new(name, version.trim()))
        })
        .collect()
}

/// Parse one PEP 508 requirement into a name and a display version.
///
/// `flask>=2.0` gives `("flask", "2.0")`; a bare name gives version `*`.
pub fn parse_requirement(spec: &str) -> Option<LocalPackage> {
    let spec = spec.split(';').next().unwrap_or_default().trim();
    let name_end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(spec.len());
    let name = &spec[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = spec[name_end..].trim_start();
    if rest.starts_with('[') {
        rest = rest.find(']').map_or("", |end| &rest[end + 1..]);
    }
    let version = rest
        .split(',')
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| matches!(c, '<' | '>' | '=' | '!' | '~') || c.is_whitespace())
        .trim();

    Some(LocalPackage::new(name, if version.is_empty() { "*" } else { version }))
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    project: ManifestProject,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestProject {
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Declared dependencies of a `pyproject.toml` / `uv.toml` document.
pub fn parse_manifest(text: &str) -> Result<Vec<LocalPackage>, AppError> {
    let manifest: Manifest = toml::from_str(text)?;
    Ok(manifest
        .project
        .dependencies
        .iter()
        .filter_map(|dep| parse_requirement(dep))
        .collect())
}

/// Installed packages first, then manifest entries whose name is not installed.
pub fn merge_packages(installed: Vec<LocalPackage>, declared: Vec<LocalPackage>) -> Vec<LocalPackage> {
    let mut known: HashSet<String> = installed.iter().map(|p| normalize_name(&p.name)).collect();
    let mut merged = installed;
    for pkg in declared {
        if known.insert(normalize_name(&pkg.name)) {
            merged.push(pkg);
        }
    }
    merged
}

/// How much of a command's stderr counts as failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strictness {
    /// Only a spawn failure or a non-zero exit fails; stderr is logged.
    ExitCode,
    /// Any stderr output fails too.
    AnyStderr,
}

/// Run a command to completion and return its stdout.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    strictness: Strictness,
) -> Result<String, AppError> {
    let cmdline = format!("{} {}", program, args.join(" "));
    debug!("Running `{}`", cmdline);

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| AppError::external_cmd(&cmdline, None, e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let noisy = !stderr.trim().is_empty();

    if !output.status.success() || (noisy && strictness == Strictness::AnyStderr) {
        return Err(AppError::external_cmd(cmdline, output.status.code(), stderr));
    }
    if noisy {
        warn!("`{}` wrote to stderr: {}", cmdline, stderr.trim());
    }
    Ok(stdout)
}

/// Non-zero exit or non-empty stderr is an error.
pub(crate) async fn run_checked(program: &str, args: &[String]) -> Result<String, AppError> {
    run_command(program, args, Strictness::AnyStderr).await
}

/// The real environment: subprocesses and files relative to a project root.
#[derive(Debug, Clone)]
pub struct SystemEnvironment {
    project_root: PathBuf,
    script_root: PathBuf,
    venv_dir_name: String,
}

impl SystemEnvironment {
    pub fn new(
        project_root: impl Into<PathBuf>,
        script_root: impl Into<PathBuf>,
        venv_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            script_root: script_root.into(),
            venv_dir_name: venv_dir_name.into(),
        }
    }

    /// `uv.toml` wins over `pyproject.toml` when both exist.
    async fn manifest_path(&self) -> Option<PathBuf> {
        for name in ["uv.toml", "pyproject.toml"] {
            let path = self.project_root.join(name);
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                return Some(path);
            }
        }
        None
    }
}

#[async_trait]
impl PythonEnvironment for SystemEnvironment {
    #[instrument(level = "debug", skip(self))]
    async fn installed_packages(&self, manager: PackageManager) -> Result<Vec<LocalPackage>, AppError> {
        let args: Vec<String> = manager.list_args().iter().map(|s| s.to_string()).collect();
        let stdout = run_command(manager.program(), &args, Strictness::ExitCode).await?;
        let packages = parse_freeze(&stdout);
        info!("{} reports {} installed packages", manager, packages.len());
        Ok(packages)
    }

    async fn declared_packages(&self) -> Result<Vec<LocalPackage>, AppError> {
        let Some(path) = self.manifest_path().await else {
            debug!("No project manifest in {}", self.project_root.display());
            return Ok(Vec::new());
        };
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::path_io(&path, e))?;
        parse_manifest(&text)
    }

    async fn python_version(&self) -> String {
        match Command::new("python").arg("--version").output().await {
            Ok(out) if out.status.success() => {
                // Python 2 prints its version on stderr.
                let text = if out.stdout.is_empty() { out.stderr } else { out.stdout };
                String::from_utf8_lossy(&text).trim().to_string()
            }
            Ok(_) | Err(_) => {
                warn!("python --version unavailable");
                "NONE".to_string()
            }
        }
    }

    async fn scripts(&self) -> Result<Vec<LocalScript>, AppError> {
        let root = self.script_root.clone();
        let venv = self.venv_dir_name.clone();
        tokio::task::spawn_blocking(move || scan_scripts(&root, &venv))
            .await
            .map_err(|e| AppError::Other(format!("script scan panicked: {e}")))?
    }

    #[instrument(level = "info", skip(self))]
    async fn install(&self, manager: PackageManager, package: &str) -> Result<String, AppError> {
        let stdout = run_checked(manager.program(), &manager.install_args(package)).await?;
        Ok(stdout.trim().to_string())
    }
}
