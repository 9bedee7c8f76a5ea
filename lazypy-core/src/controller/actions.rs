//! src/controller/actions.rs
//! ============================================================================
//! # Actions: the message alphabet of the state machine
//!
//! - [`Intent`]: what the user asked for, already decoupled from key syntax.
//! - [`CommandResult`]: what a background task resolved to.
//! - [`Message`]: everything the control loop feeds into `transition`.
//! - [`Command`]: side effects requested by a transition.

use std::sync::Arc;

use chrono::{DateTime, Local};
use compact_str::CompactString;

use crate::python::environment::{ManagerSnapshot, PackageManager};
use crate::python::pypi::PackageDetail;

/// Abstract user intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    ToggleHelp,
    ToggleManager,
    ToggleInstallPicker,
    ToggleLogs,
    Cancel,
    FocusNext,
    FocusDown,
    FocusUp,
    Confirm,
    InstallSelected,
    /// A printable character for the query input.
    TextInput(char),
    /// Delete the last character of the query input.
    Backspace,
}

/// Where the remote name list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOrigin {
    Cache,
    Live,
    /// Live fetch failed; the names list is empty.
    Failed(String),
}

/// The single message each background task resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    IndexLoaded {
        names: Arc<[CompactString]>,
        origin: IndexOrigin,
    },

    LocalScanLoaded {
        snapshot: ManagerSnapshot,
        error: Option<String>,
    },

    InstallFinished {
        package: CompactString,
        text: String,
        is_error: bool,
    },

    DetailLoaded {
        name: CompactString,
        detail: PackageDetail,
    },

    InfoNote(String),
}

/// Input to `transition`.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Intent(Intent),

    /// A terminal resize event.
    Resize { width: u16, height: u16 },

    /// Periodic tick. `entropy` feeds the cosmetic spinner, `now` is the
    /// loop's wall clock used to timestamp log entries.
    Tick { entropy: u32, now: DateTime<Local> },

    Task(CommandResult),
}

impl From<Intent> for Message {
    fn from(intent: Intent) -> Self {
        Self::Intent(intent)
    }
}

impl From<CommandResult> for Message {
    fn from(result: CommandResult) -> Self {
        Self::Task(result)
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the remote index from cache, or fetch and cache it.
    LoadIndex,
    ScanLocal { manager: PackageManager },
    Install { manager: PackageManager, package: CompactString },
    FetchDetail { name: CompactString },
    Quit,
}
