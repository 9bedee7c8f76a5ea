//! src/controller/state_machine.rs
//! ============================================================================
//! # The screen/focus state machine
//!
//! `transition` is the only code that produces application state. It takes
//! the current state by reference and returns a fresh state together with
//! the side effects to run, so it never blocks and never touches I/O.
//!
//! Screen rules:
//! - Help, InstallPicker and Logs are overlays over Home.
//! - Help may sit over an open install picker; dismissing it reveals the
//!   picker again.
//! - Logs is exclusive and closes the picker.
//! - A viewport below the minimum suspends interaction except quit. The
//!   stored screen is kept so the layout comes back after a resize.
//! - A focus target that does not belong to the stored screen moves to the
//!   Error screen, which only accepts cancel and quit.

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::controller::actions::{Command, CommandResult, IndexOrigin, Intent, Message};
use crate::model::app_state::{AppState, LogLevel, RemoteIndex};
use crate::model::ui_state::{FocusTarget, ListCursor, Screen, WindowSize};
use crate::python::environment::PackageManager;
use crate::search::tiered::tiered_filter;

pub const GREETING: &str = "Hello from lazypy";

/// A new state and the commands it requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub commands: Vec<Command>,
}

/// Initial state plus the startup tasks: the index load and the first scan.
pub fn init(
    manager: PackageManager,
    min_index_names: usize,
    window: WindowSize,
    entropy: u32,
    now: DateTime<Local>,
) -> Transition {
    let mut state = AppState::new(manager, min_index_names, entropy, now);
    state.window = window;
    state.info = GREETING.to_owned();
    state.scan_in_flight = true;

    Transition {
        state,
        commands: vec![Command::LoadIndex, Command::ScanLocal { manager }],
    }
}

pub fn transition(state: &AppState, message: Message) -> Transition {
    let mut next = state.clone();
    let mut commands = Vec::new();

    ensure_consistent(&mut next);

    match message {
        Message::Intent(intent) => on_intent(&mut next, intent, &mut commands),
        Message::Resize { width, height } => on_resize(&mut next, width, height, &mut commands),
        Message::Tick { entropy, now } => on_tick(&mut next, entropy, now),
        Message::Task(result) => on_result(&mut next, result),
    }

    ensure_consistent(&mut next);

    Transition {
        state: next,
        commands,
    }
}

fn ensure_consistent(state: &mut AppState) {
    if !state.focus.belongs_to(state.screen) {
        warn!(
            "Focus {:?} does not belong to screen {:?}, falling back",
            state.focus, state.screen
        );
        state.screen = Screen::Error;
        state.focus = FocusTarget::Notice;
        state.picker_open = false;
    }
}

fn go_home(state: &mut AppState) {
    state.screen = Screen::Home;
    state.focus = if state.home_focus.belongs_to(Screen::Home) {
        state.home_focus
    } else {
        FocusTarget::default_for(Screen::Home)
    };
}

fn open_picker(state: &mut AppState) {
    state.screen = Screen::InstallPicker;
    state.focus = FocusTarget::QueryInput;
    state.picker_open = true;
    state.candidate_cursor = ListCursor::blurred();
    state.filter_key = None;
    refresh_candidates(state);
}

fn close_picker(state: &mut AppState) {
    state.picker_open = false;
    state.selected_remote_package = None;
    state.pending_detail = None;
}

/// Recompute the candidates when the query or the index changed.
fn refresh_candidates(state: &mut AppState) {
    let key = (state.query.as_str().trim().to_owned(), state.remote_index.len());
    if state.filter_key.as_ref() == Some(&key) {
        return;
    }
    state.filtered_candidates = tiered_filter(state.remote_index.names(), &key.0);
    state.candidate_cursor = ListCursor::top();
    state.filter_key = Some(key);
}

fn on_intent(state: &mut AppState, intent: Intent, commands: &mut Vec<Command>) {
    if intent == Intent::Quit {
        commands.push(Command::Quit);
        return;
    }

    if state.visible_screen() == Screen::TooSmall {
        debug!("Ignoring {:?} while the viewport is too small", intent);
        return;
    }

    if state.screen == Screen::Error {
        if intent == Intent::Cancel {
            go_home(state);
        }
        return;
    }

    match intent {
        Intent::Quit => {}

        Intent::ToggleHelp => match state.screen {
            Screen::Help if state.picker_open => {
                state.screen = Screen::InstallPicker;
                state.focus = FocusTarget::QueryInput;
                state.candidate_cursor = ListCursor::blurred();
            }
            Screen::Help => go_home(state),
            _ => {
                state.screen = Screen::Help;
                state.focus = FocusTarget::Notice;
            }
        },

        Intent::ToggleInstallPicker => match state.screen {
            Screen::InstallPicker => {
                close_picker(state);
                go_home(state);
            }
            Screen::Help if state.picker_open => close_picker(state),
            _ => open_picker(state),
        },

        Intent::Cancel => {
            state.selected_remote_package = None;
            state.pending_detail = None;
            match state.screen {
                Screen::Help if state.picker_open => {
                    state.screen = Screen::InstallPicker;
                    state.focus = FocusTarget::QueryInput;
                    state.candidate_cursor = ListCursor::blurred();
                }
                _ => {
                    close_picker(state);
                    state.filtered_candidates.clear();
                    state.filter_key = None;
                    go_home(state);
                }
            }
        }

        Intent::ToggleLogs => {
            if state.screen == Screen::Logs {
                go_home(state);
            } else {
                close_picker(state);
                state.screen = Screen::Logs;
                state.focus = FocusTarget::LogTable;
                state.log_cursor.clamp(state.log_entries.len());
            }
        }

        Intent::ToggleManager => {
            if state.screen == Screen::Home {
                state.manager = state.manager.toggled();
            }
        }

        Intent::FocusNext => focus_next(state),
        Intent::FocusDown => focus_down(state),
        Intent::FocusUp => focus_up(state),

        Intent::Confirm => {
            if state.focus != FocusTarget::CandidateList {
                return;
            }
            if let Some(name) = state.selected_candidate().cloned() {
                state.info = format!("{} Fetching details for {}...", state.spinner.glyph(), name);
                state.pending_detail = Some(name.clone());
                commands.push(Command::FetchDetail { name });
            }
        }

        Intent::InstallSelected => {
            if state.focus != FocusTarget::CandidateList {
                return;
            }
            if let Some(package) = state.selected_candidate().cloned() {
                state.info = format!("{} Installing {}...", state.spinner.glyph(), package);
                commands.push(Command::Install {
                    manager: state.manager,
                    package,
                });
            }
        }

        Intent::TextInput(c) => {
            if state.accepts_text() {
                state.query.push(c);
                refresh_candidates(state);
            }
        }

        Intent::Backspace => {
            if state.accepts_text() && state.query.pop() {
                refresh_candidates(state);
            }
        }
    }
}

fn focus_next(state: &mut AppState) {
    let next = state.focus.next();
    match (state.focus, next) {
        (FocusTarget::LocalPackageList, FocusTarget::ScriptList) => {
            state.package_cursor = ListCursor::blurred();
            state.script_cursor = ListCursor::top();
        }
        (FocusTarget::ScriptList, FocusTarget::LocalPackageList) => {
            state.script_cursor = ListCursor::blurred();
            state.package_cursor = ListCursor::top();
        }
        (FocusTarget::QueryInput, FocusTarget::CandidateList) => {
            state.candidate_cursor = ListCursor::top();
        }
        (FocusTarget::CandidateList, FocusTarget::QueryInput) => {
            state.candidate_cursor = ListCursor::blurred();
        }
        _ => {}
    }
    state.focus = next;
    if state.screen == Screen::Home {
        state.home_focus = next;
    }
}

fn focus_down(state: &mut AppState) {
    match state.focus {
        FocusTarget::QueryInput => {
            state.focus = FocusTarget::CandidateList;
            if state.candidate_cursor.selected().is_none() {
                state.candidate_cursor = ListCursor::top();
            }
        }
        FocusTarget::CandidateList => state.candidate_cursor.down(state.filtered_candidates.len()),
        FocusTarget::LocalPackageList => state.package_cursor.down(state.local_packages.len()),
        FocusTarget::ScriptList => state.script_cursor.down(state.local_scripts.len()),
        FocusTarget::LogTable => state.log_cursor.down(state.log_entries.len()),
        FocusTarget::Notice => {}
    }
}

fn focus_up(state: &mut AppState) {
    match state.focus {
        FocusTarget::CandidateList if state.candidate_cursor.is_at_top() => {
            state.focus = FocusTarget::QueryInput;
            state.candidate_cursor = ListCursor::blurred();
        }
        FocusTarget::CandidateList => state.candidate_cursor.up(),
        FocusTarget::LocalPackageList => state.package_cursor.up(),
        FocusTarget::ScriptList => state.script_cursor.up(),
        FocusTarget::LogTable => state.log_cursor.up(),
        FocusTarget::QueryInput | FocusTarget::Notice => {}
    }
}

fn on_resize(state: &mut AppState, width: u16, height: u16, commands: &mut Vec<Command>) {
    state.window = WindowSize::new(width, height);

    if state.screen != Screen::Home || state.window.is_too_small() {
        return;
    }

    state.loading = true;
    if !state.scan_in_flight {
        state.scan_in_flight = true;
        commands.push(Command::ScanLocal {
            manager: state.manager,
        });
    }
}

fn on_tick(state: &mut AppState, entropy: u32, now: DateTime<Local>) {
    state.clock = now;
    state.spinner.tick(entropy);

    if !state.index_ready {
        state.info = format!("{} Indexing remote packages on PyPI...", state.spinner.glyph());
    }

    if !state.picker_open {
        state.filtered_candidates.clear();
        state.filter_key = None;
        return;
    }
    if state.screen == Screen::InstallPicker && state.focus == FocusTarget::QueryInput {
        refresh_candidates(state);
    }
}

fn on_result(state: &mut AppState, result: CommandResult) {
    match result {
        CommandResult::IndexLoaded { names, origin } => {
            if state.remote_index.is_published() {
                warn!("Remote index already published, ignoring a second load");
                return;
            }
            state.remote_index = RemoteIndex::new(names);
            state.index_ready = true;

            state.info = match origin {
                IndexOrigin::Cache => "Packages loaded from cache!".to_owned(),
                IndexOrigin::Live => "Remote packages indexed successfully!".to_owned(),
                IndexOrigin::Failed(err) => {
                    state.push_log(LogLevel::Warn, format!("Remote index unavailable: {err}"));
                    String::new()
                }
            };

            let count = state.remote_index.len();
            if count < state.min_index_names {
                state.info = "Indexing process failed! restart the app to resolve".to_owned();
                state.push_log(
                    LogLevel::Warn,
                    format!("Only {count} remote package names indexed"),
                );
            }
        }

        CommandResult::LocalScanLoaded { snapshot, error } => {
            state.spinner.request_reshuffle();
            state.local_packages = snapshot.packages;
            state.local_scripts = snapshot.scripts;
            state.python_version = snapshot.python_version;
            state.package_cursor.clamp(state.local_packages.len());
            state.script_cursor.clamp(state.local_scripts.len());
            state.loading = false;
            state.scan_in_flight = false;

            if let Some(err) = &error {
                state.info = format!("err: {err}");
                state.push_log(LogLevel::Warn, err.clone());
            }
            state.last_error = error;
        }

        CommandResult::InstallFinished {
            package,
            text,
            is_error,
        } => {
            state.spinner.request_reshuffle();
            if is_error {
                state.info = "Failed to install package! Ctrl + L for logs".to_owned();
                state.push_log(LogLevel::Error, text.clone());
                state.last_error = Some(text);
            } else {
                state.info = "Package installed successfully!".to_owned();
                state.push_log(LogLevel::Info, format!("Installed {package}"));
            }
        }

        CommandResult::DetailLoaded { name, detail } => {
            if state.picker_open && state.pending_detail.as_ref() == Some(&name) {
                state.info = format!("Showing {name}");
                state.selected_remote_package = Some(detail);
                state.pending_detail = None;
            } else {
                debug!("Dropping stale detail for {}", name);
            }
        }

        CommandResult::InfoNote(text) => state.info = text,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use compact_str::CompactString;

    use super::*;
    use crate::python::environment::{LocalPackage, ManagerSnapshot};
    use crate::python::pypi::PackageDetail;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap()
    }

    fn names(list: &[&str]) -> Arc<[CompactString]> {
        list.iter().map(|s| CompactString::from(*s)).collect()
    }

    fn run(state: &AppState, messages: impl IntoIterator<Item = Message>) -> AppState {
        messages
            .into_iter()
            .fold(state.clone(), |s, m| transition(&s, m).state)
    }

    fn intent(state: &AppState, intent: Intent) -> Transition {
        transition(state, Message::Intent(intent))
    }

    /// Home with a finished scan and a published index.
    fn ready() -> AppState {
        let start = init(PackageManager::Pip, 2, WindowSize::new(120, 40), 2, now()).state;
        run(
            &start,
            [
                CommandResult::LocalScanLoaded {
                    snapshot: ManagerSnapshot {
                        python_version: "Python 3.12.1".into(),
                        packages: vec![LocalPackage::new("flask", "3.0.0"), LocalPackage::new("rich", "13.7.0")],
                        scripts: Vec::new(),
                    },
                    error: None,
                }
                .into(),
                CommandResult::IndexLoaded {
                    names: names(&["requests", "requests-oauthlib", "flask"]),
                    origin: IndexOrigin::Cache,
                }
                .into(),
            ],
        )
    }

    fn picker_with_query(query: &str) -> AppState {
        let state = intent(&ready(), Intent::ToggleInstallPicker).state;
        run(&state, query.chars().map(|c| Message::Intent(Intent::TextInput(c))))
    }

    #[test]
    fn test_init_requests_startup_tasks() {
        let t = init(PackageManager::Pip, 50, WindowSize::new(80, 30), 0, now());
        assert_eq!(t.state.screen, Screen::Home);
        assert_eq!(t.state.focus, FocusTarget::LocalPackageList);
        assert_eq!(t.state.manager, PackageManager::Pip);
        assert!(t.state.loading);
        assert_eq!(t.state.info, GREETING);
        assert_eq!(
            t.commands,
            vec![Command::LoadIndex, Command::ScanLocal { manager: PackageManager::Pip }]
        );
    }

    #[test]
    fn test_transition_leaves_input_untouched() {
        let before = ready();
        let snapshot = before.clone();
        let after = intent(&before, Intent::ToggleLogs).state;
        assert_eq!(before, snapshot);
        assert_eq!(after.screen, Screen::Logs);
    }

    #[test]
    fn test_tab_twice_restores_focus() {
        let home = ready();
        let once = intent(&home, Intent::FocusNext).state;
        assert_eq!(once.focus, FocusTarget::ScriptList);
        assert_eq!(once.script_cursor.selected(), Some(0));
        assert_eq!(once.package_cursor.selected(), None);

        let twice = intent(&once, Intent::FocusNext).state;
        assert_eq!(twice.focus, FocusTarget::LocalPackageList);
        assert_eq!(twice.package_cursor.selected(), Some(0));
        assert_eq!(twice.script_cursor.selected(), None);

        let picker = picker_with_query("req");
        let back = run(&picker, [Intent::FocusNext.into(), Intent::FocusNext.into()]);
        assert_eq!(back.focus, picker.focus);
    }

    #[test]
    fn test_help_over_picker_returns_to_picker() {
        let picker = picker_with_query("fl");
        let help = intent(&picker, Intent::ToggleHelp).state;
        assert_eq!(help.screen, Screen::Help);
        assert!(help.picker_open);

        let back = intent(&help, Intent::ToggleHelp).state;
        assert_eq!(back.screen, Screen::InstallPicker);
        assert_eq!(back.focus, FocusTarget::QueryInput);
        assert_eq!(back.query.as_str(), "fl");

        let dismissed = intent(&help, Intent::Cancel).state;
        assert_eq!(dismissed.screen, Screen::InstallPicker);
    }

    #[test]
    fn test_cancel_clears_detail_and_returns_home() {
        let mut picker = picker_with_query("requests");
        picker.selected_remote_package = Some(PackageDetail::default());
        picker.focus = FocusTarget::CandidateList;

        let home = intent(&picker, Intent::Cancel).state;
        assert_eq!(home.screen, Screen::Home);
        assert_eq!(home.focus, FocusTarget::LocalPackageList);
        assert!(!home.picker_open);
        assert!(home.selected_remote_package.is_none());
        assert!(home.filtered_candidates.is_empty());
    }

    #[test]
    fn test_logs_are_exclusive() {
        let picker = picker_with_query("re");
        let logs = intent(&picker, Intent::ToggleLogs).state;
        assert_eq!(logs.screen, Screen::Logs);
        assert!(!logs.picker_open);

        let home = intent(&logs, Intent::ToggleLogs).state;
        assert_eq!(home.screen, Screen::Home);
    }

    #[test]
    fn test_manager_toggles_only_on_home() {
        let home = ready();
        assert_eq!(intent(&home, Intent::ToggleManager).state.manager, PackageManager::Uv);

        let logs = intent(&home, Intent::ToggleLogs).state;
        assert_eq!(intent(&logs, Intent::ToggleManager).state.manager, PackageManager::Pip);
    }

    #[test]
    fn test_search_on_keystrokes() {
        let picker = picker_with_query("requests");
        assert_eq!(picker.filtered_candidates, vec!["requests", "requests-oauthlib"]);
        assert_eq!(picker.candidate_cursor.selected(), Some(0));

        let cleared = run(&picker, (0..8).map(|_| Message::Intent(Intent::Backspace)));
        assert!(cleared.filtered_candidates.is_empty());
    }

    #[test]
    fn test_two_zone_focus_ring() {
        let picker = picker_with_query("requests");
        let list = intent(&picker, Intent::FocusDown).state;
        assert_eq!(list.focus, FocusTarget::CandidateList);

        let second = intent(&list, Intent::FocusDown).state;
        assert_eq!(second.candidate_cursor.selected(), Some(1));

        let first = intent(&second, Intent::FocusUp).state;
        assert_eq!(first.focus, FocusTarget::CandidateList);
        let query = intent(&first, Intent::FocusUp).state;
        assert_eq!(query.focus, FocusTarget::QueryInput);

        let typed = intent(&list, Intent::TextInput('x')).state;
        assert_eq!(typed.query.as_str(), "requests");
    }

    #[test]
    fn test_confirm_and_install_need_focused_list() {
        let picker = picker_with_query("requests");
        assert!(intent(&picker, Intent::InstallSelected).commands.is_empty());
        assert!(intent(&picker, Intent::Confirm).commands.is_empty());

        let list = intent(&picker, Intent::FocusDown).state;
        let install = intent(&list, Intent::InstallSelected);
        assert_eq!(
            install.commands,
            vec![Command::Install { manager: PackageManager::Pip, package: "requests".into() }]
        );
        assert!(install.state.info.ends_with("Installing requests..."));

        let confirm = intent(&list, Intent::Confirm);
        assert_eq!(confirm.commands, vec![Command::FetchDetail { name: "requests".into() }]);

        let detail = PackageDetail { name: "requests".into(), ..PackageDetail::default() };
        let shown = transition(
            &confirm.state,
            CommandResult::DetailLoaded { name: "requests".into(), detail: detail.clone() }.into(),
        )
        .state;
        assert_eq!(shown.selected_remote_package, Some(detail));
    }

    #[test]
    fn test_resize_rescans_only_on_home() {
        let home = ready();
        let t = transition(&home, Message::Resize { width: 100, height: 50 });
        assert_eq!(t.state.window, WindowSize::new(100, 50));
        assert!(t.state.loading);
        assert_eq!(t.commands, vec![Command::ScanLocal { manager: PackageManager::Pip }]);

        let again = transition(&t.state, Message::Resize { width: 90, height: 50 });
        assert!(again.commands.is_empty());

        let logs = intent(&home, Intent::ToggleLogs).state;
        let t = transition(&logs, Message::Resize { width: 100, height: 50 });
        assert_eq!(t.state.window, WindowSize::new(100, 50));
        assert!(!t.state.loading);
        assert!(t.commands.is_empty());
    }

    #[test]
    fn test_install_failure_is_logged() {
        let failed = transition(
            &ready(),
            CommandResult::InstallFinished {
                package: "nope".into(),
                text: "No matching distribution".into(),
                is_error: true,
            }
            .into(),
        )
        .state;

        let entry = failed.log_entries.last().unwrap();
        assert_eq!(entry.level.to_string(), "Error");
        assert_eq!(entry.message, "No matching distribution");
        assert_eq!(entry.timestamp, now());
        assert_eq!(failed.info, "Failed to install package! Ctrl + L for logs");
        assert_eq!(failed.screen, Screen::Home);
    }

    #[test]
    fn test_small_index_is_degraded_not_fatal() {
        let start = init(PackageManager::Uv, 50, WindowSize::new(120, 40), 0, now()).state;
        let state = transition(
            &start,
            CommandResult::IndexLoaded { names: names(&["flask"]), origin: IndexOrigin::Live }.into(),
        )
        .state;

        assert!(state.index_ready);
        assert_eq!(state.info, "Indexing process failed! restart the app to resolve");
        assert_eq!(state.screen, Screen::Home);
        assert_eq!(state.log_entries.last().map(|e| e.level), Some(LogLevel::Warn));
    }

    #[test]
    fn test_results_arrive_in_any_order() {
        let start = init(PackageManager::Pip, 1, WindowSize::new(120, 40), 0, now()).state;
        let index: Message = CommandResult::IndexLoaded {
            names: names(&["flask"]),
            origin: IndexOrigin::Cache,
        }
        .into();
        let scan: Message = CommandResult::LocalScanLoaded {
            snapshot: ManagerSnapshot::default(),
            error: Some("pip: not found".into()),
        }
        .into();

        let a = run(&start, [index.clone(), scan.clone()]);
        let b = run(&start, [scan, index]);
        assert_eq!(a.remote_index, b.remote_index);
        assert_eq!(a.local_packages, b.local_packages);
        assert!(!a.loading && !b.loading);
        assert_eq!(b.last_error.as_deref(), Some("pip: not found"));
    }

    #[test]
    fn test_clean_rescan_clears_last_error() {
        let failed: Message = CommandResult::LocalScanLoaded {
            snapshot: ManagerSnapshot::default(),
            error: Some("pip: not found".into()),
        }
        .into();
        let clean: Message = CommandResult::LocalScanLoaded {
            snapshot: ManagerSnapshot {
                python_version: "Python 3.12.1".into(),
                packages: vec![LocalPackage::new("flask", "3.0.0")],
                scripts: Vec::new(),
            },
            error: None,
        }
        .into();

        let state = run(&ready(), [failed, clean]);
        assert_eq!(state.last_error, None);
        assert_eq!(state.local_packages, vec![LocalPackage::new("flask", "3.0.0")]);
    }

    #[test]
    fn test_too_small_suspends_interaction() {
        let tiny = transition(&ready(), Message::Resize { width: 40, height: 20 });
        assert!(tiny.commands.is_empty());
        assert_eq!(tiny.state.visible_screen(), Screen::TooSmall);

        let ignored = intent(&tiny.state, Intent::ToggleLogs).state;
        assert_eq!(ignored.screen, Screen::Home);
        assert_eq!(intent(&tiny.state, Intent::Quit).commands, vec![Command::Quit]);
    }

    #[test]
    fn test_inconsistent_focus_falls_back_to_error() {
        let mut broken = ready();
        broken.focus = FocusTarget::CandidateList;

        let error = intent(&broken, Intent::FocusNext).state;
        assert_eq!(error.screen, Screen::Error);
        assert_eq!(error.focus, FocusTarget::Notice);

        assert_eq!(intent(&error, Intent::ToggleLogs).state.screen, Screen::Error);
        let home = intent(&error, Intent::Cancel).state;
        assert_eq!(home.screen, Screen::Home);
        assert_eq!(home.focus, FocusTarget::LocalPackageList);
    }

    #[test]
    fn test_tick_drives_spinner_and_index_note() {
        let start = init(PackageManager::Pip, 50, WindowSize::new(120, 40), 2, now()).state;
        let later = now() + chrono::Duration::seconds(5);
        let ticked = transition(&start, Message::Tick { entropy: 9, now: later }).state;

        assert_eq!(ticked.clock, later);
        assert_eq!(ticked.info, "/ Indexing remote packages on PyPI...");
    }
}
