//! ActionDispatcher: runs the commands requested by `transition`.
//!
//! Every command becomes one independent tokio task that resolves to exactly
//! one [`CommandResult`], sent back to the control loop over the task
//! channel. Tasks are never cancelled and have no timeout.
//!
//! The index load runs at most once per process. Local scans are limited by
//! the state machine (`scan_in_flight`); installs are not de-duplicated.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::cache::index_cache::IndexCache;
use crate::controller::actions::{Command, CommandResult, IndexOrigin, Message};
use crate::controller::traits::{PackageIndex, PythonEnvironment};
use crate::error::AppError;
use crate::python::environment::{ManagerSnapshot, PackageManager, merge_packages};

pub struct ActionDispatcher {
    task_tx: UnboundedSender<Message>,
    index: Arc<dyn PackageIndex>,
    env: Arc<dyn PythonEnvironment>,
    cache: IndexCache,
    index_started: AtomicBool,
}

impl ActionDispatcher {
    pub fn new(
        task_tx: UnboundedSender<Message>,
        index: Arc<dyn PackageIndex>,
        env: Arc<dyn PythonEnvironment>,
        cache: IndexCache,
    ) -> Self {
        Self {
            task_tx,
            index,
            env,
            cache,
            index_started: AtomicBool::new(false),
        }
    }

    /// Start the task for `command`. Returns `false` when the application
    /// should terminate.
    pub fn dispatch(&self, command: Command) -> bool {
        debug!("Dispatching command: {:?}", command);

        match command {
            Command::Quit => return false,

            Command::LoadIndex => {
                if self.index_started.swap(true, Ordering::AcqRel) {
                    debug!("Index load already started, ignoring");
                    return true;
                }
                let index = Arc::clone(&self.index);
                let cache = self.cache.clone();
                self.spawn(async move { load_index(index.as_ref(), &cache, Utc::now()).await });
            }

            Command::ScanLocal { manager } => {
                let env = Arc::clone(&self.env);
                self.spawn(async move { scan_local(env.as_ref(), manager).await });
            }

            Command::Install { manager, package } => {
                let env = Arc::clone(&self.env);
                self.spawn(async move { install(env.as_ref(), manager, package).await });
            }

            Command::FetchDetail { name } => {
                let index = Arc::clone(&self.index);
                self.spawn(async move { fetch_detail(index.as_ref(), name).await });
            }
        }

        true
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = CommandResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            if tx.send(Message::Task(result)).is_err() {
                debug!("Control loop closed, dropping task result");
            }
        });
    }
}

/// Cached names if fresh, otherwise a live fetch. A successful non-empty
/// fetch replaces the cache; failures never do.
#[instrument(level = "info", skip(index, cache))]
pub async fn load_index(
    index: &dyn PackageIndex,
    cache: &IndexCache,
    now: DateTime<Utc>,
) -> CommandResult {
    let cached = cache.load_at(now).await;
    if cached.valid {
        return CommandResult::IndexLoaded {
            names: cached.names.into(),
            origin: IndexOrigin::Cache,
        };
    }

    match index.fetch_names().await {
        Ok(names) => {
            if names.is_empty() {
                warn!("Remote index returned no names, cache left untouched");
            } else if let Err(e) = cache.save_at(&names, now).await {
                warn!("Failed to save index cache: {}", e);
            }
            CommandResult::IndexLoaded {
                names: names.into(),
                origin: IndexOrigin::Live,
            }
        }
        Err(e) => {
            warn!("Remote index fetch failed: {}", e);
            CommandResult::IndexLoaded {
                names: Arc::<[CompactString]>::from(Vec::new()),
                origin: IndexOrigin::Failed(e.to_string()),
            }
        }
    }
}

fn keep_first<T: Default>(first: &mut Option<String>, result: Result<T, AppError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Local scan step failed: {}", e);
        first.get_or_insert_with(|| e.user_message());
        T::default()
    })
}

/// Query the environment concurrently. Partial results survive; the first
/// error is reported with them.
#[instrument(level = "info", skip(env))]
pub async fn scan_local(env: &dyn PythonEnvironment, manager: PackageManager) -> CommandResult {
    let (installed, declared, python_version, scripts) = tokio::join!(
        env.installed_packages(manager),
        env.declared_packages(),
        env.python_version(),
        env.scripts(),
    );

    let mut error = None;
    let installed = keep_first(&mut error, installed);
    let declared = keep_first(&mut error, declared);
    let scripts = keep_first(&mut error, scripts);

    let packages = merge_packages(installed, declared);
    info!(
        "Local scan: {} packages, {} scripts",
        packages.len(),
        scripts.len()
    );

    CommandResult::LocalScanLoaded {
        snapshot: ManagerSnapshot {
            python_version,
            packages,
            scripts,
        },
        error,
    }
}

/// A failure to start the manager reads the same as a failed install.
#[instrument(level = "info", skip(env))]
pub async fn install(
    env: &dyn PythonEnvironment,
    manager: PackageManager,
    package: CompactString,
) -> CommandResult {
    match env.install(manager, &package).await {
        Ok(text) => {
            info!("Installed {} with {}", package, manager);
            CommandResult::InstallFinished {
                package,
                text,
                is_error: false,
            }
        }
        Err(e) => {
            warn!("Install of {} failed: {}", package, e);
            CommandResult::InstallFinished {
                package,
                text: e.user_message(),
                is_error: true,
            }
        }
    }
}

#[instrument(level = "info", skip(index))]
pub async fn fetch_detail(index: &dyn PackageIndex, name: CompactString) -> CommandResult {
    match index.fetch_detail(&name).await {
        Ok(detail) => CommandResult::DetailLoaded { name, detail },
        Err(e) => {
            warn!("Detail fetch for {} failed: {}", name, e);
            CommandResult::InfoNote(format!("Could not load details for {name}"))
        }
    }
}
