use async_trait::async_trait;
use compact_str::CompactString;

use crate::error::AppError;
use crate::python::environment::{LocalPackage, PackageManager};
use crate::python::pypi::PackageDetail;
use crate::python::scripts::LocalScript;

/// Remote package index: the full name list and per-package detail.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    async fn fetch_names(&self) -> Result<Vec<CompactString>, AppError>;
    async fn fetch_detail(&self, name: &str) -> Result<PackageDetail, AppError>;
}

/// The local interpreter, its package manager and the project on disk.
#[async_trait]
pub trait PythonEnvironment: Send + Sync {
    /// Packages reported by the manager's installed listing.
    async fn installed_packages(&self, manager: PackageManager) -> Result<Vec<LocalPackage>, AppError>;

    /// Dependencies declared by the project manifest. No manifest is not an error.
    async fn declared_packages(&self) -> Result<Vec<LocalPackage>, AppError>;

    /// Interpreter version string, `"NONE"` when unavailable.
    async fn python_version(&self) -> String;

    async fn scripts(&self) -> Result<Vec<LocalScript>, AppError>;

    /// Run the install command. `Ok` carries the command's stdout.
    async fn install(&self, manager: PackageManager, package: &str) -> Result<String, AppError>;
}
