// lazypy-core/src/model/app_state.rs
// Immutable application state. Every transition produces a fresh value.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use compact_str::CompactString;

use crate::model::ui_state::{FocusTarget, ListCursor, QueryInput, Screen, WindowSize};
use crate::python::environment::{LocalPackage, PackageManager};
use crate::python::pypi::PackageDetail;
use crate::python::scripts::LocalScript;
use crate::util::spinner::Spinner;

/// Oldest log entries are dropped beyond this.
pub const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        })
    }
}

/// A row of the in-app log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

/// Remote package names, published once by the index loader.
///
/// Shared by reference: cloning the state never copies the list.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RemoteIndex(Option<Arc<[CompactString]>>);

impl RemoteIndex {
    pub fn new(names: Arc<[CompactString]>) -> Self {
        Self(Some(names))
    }

    pub fn is_published(&self) -> bool {
        self.0.is_some()
    }

    pub fn names(&self) -> &[CompactString] {
        self.0.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl fmt::Debug for RemoteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(names) => write!(f, "RemoteIndex({} names)", names.len()),
            None => f.write_str("RemoteIndex(pending)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    // Screen and focus
    pub screen: Screen,
    pub focus: FocusTarget,
    /// Focus restored when returning to Home.
    pub home_focus: FocusTarget,
    /// The install picker stays open underneath the help overlay.
    pub picker_open: bool,

    // Environment
    pub window: WindowSize,
    pub manager: PackageManager,
    pub loading: bool,
    pub scan_in_flight: bool,
    pub last_error: Option<String>,
    pub info: String,
    pub python_version: String,

    // Home lists
    pub local_packages: Vec<LocalPackage>,
    pub local_scripts: Vec<LocalScript>,
    pub package_cursor: ListCursor,
    pub script_cursor: ListCursor,

    // Install picker
    pub remote_index: RemoteIndex,
    pub query: QueryInput,
    pub filtered_candidates: Vec<CompactString>,
    pub candidate_cursor: ListCursor,
    /// Query text and index size the candidates were computed from.
    pub filter_key: Option<(String, usize)>,
    pub selected_remote_package: Option<PackageDetail>,
    pub pending_detail: Option<CompactString>,

    // Logs and status
    pub log_entries: Vec<LogEntry>,
    pub log_cursor: ListCursor,
    pub index_ready: bool,
    pub spinner: Spinner,
    /// Wall clock of the most recent tick.
    pub clock: DateTime<Local>,
    pub min_index_names: usize,
}

impl AppState {
    pub fn new(manager: PackageManager, min_index_names: usize, entropy: u32, now: DateTime<Local>) -> Self {
        Self {
            screen: Screen::Home,
            focus: FocusTarget::LocalPackageList,
            home_focus: FocusTarget::LocalPackageList,
            picker_open: false,
            window: WindowSize::default(),
            manager,
            loading: true,
            scan_in_flight: false,
            last_error: None,
            info: String::new(),
            python_version: "NONE".to_owned(),
            local_packages: Vec::new(),
            local_scripts: Vec::new(),
            package_cursor: ListCursor::top(),
            script_cursor: ListCursor::blurred(),
            remote_index: RemoteIndex::default(),
            query: QueryInput::default(),
            filtered_candidates: Vec::new(),
            candidate_cursor: ListCursor::blurred(),
            filter_key: None,
            selected_remote_package: None,
            pending_detail: None,
            log_entries: Vec::new(),
            log_cursor: ListCursor::top(),
            index_ready: false,
            spinner: Spinner::with_seed(entropy),
            clock: now,
            min_index_names,
        }
    }

    /// The screen to draw. The stored screen survives a too-small viewport.
    pub fn visible_screen(&self) -> Screen {
        if self.window.is_too_small() {
            Screen::TooSmall
        } else {
            self.screen
        }
    }

    /// Whether printable keys go to the query input.
    pub fn accepts_text(&self) -> bool {
        self.visible_screen() == Screen::InstallPicker && self.focus == FocusTarget::QueryInput
    }

    pub fn selected_candidate(&self) -> Option<&CompactString> {
        self.candidate_cursor
            .selected()
            .and_then(|i| self.filtered_candidates.get(i))
    }

    /// Appends an entry, dropping the oldest past [`MAX_LOG_ENTRIES`].
    pub fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_entries.push(LogEntry {
            level,
            timestamp: self.clock,
            message: message.into(),
        });
        if self.log_entries.len() > MAX_LOG_ENTRIES {
            let excess = self.log_entries.len() - MAX_LOG_ENTRIES;
            self.log_entries.drain(..excess);
            self.log_cursor.clamp(self.log_entries.len());
        }
    }
}
