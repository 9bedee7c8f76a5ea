//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the whole TUI from an immutable
//! `AppState`. Rendering never mutates state and never does I/O.

use std::time::{Duration, Instant};

use ratatui::{prelude::*, widgets::Block};
use tracing::{instrument, warn};

use crate::{
    model::{app_state::AppState, ui_state::Screen},
    view::{
        components::{
            error_overlay::ErrorOverlay, help_overlay::HelpOverlay, home_screen::HomeScreen,
            install_picker::InstallPicker, loading_overlay::LoadingOverlay, logs_table::LogsTable,
            status_bar::StatusBar,
        },
        theme,
    },
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

pub struct UIRenderer {
    home: HomeScreen,
    help: HelpOverlay,
    picker: InstallPicker,
    logs: LogsTable,
    error: ErrorOverlay,
    loading: LoadingOverlay,
    status: StatusBar,
    stats: RenderStats,
}

impl UIRenderer {
    pub fn new() -> Self {
        Self {
            home: HomeScreen::new(),
            help: HelpOverlay::new(),
            picker: InstallPicker::new(),
            logs: LogsTable::new(),
            error: ErrorOverlay::default(),
            loading: LoadingOverlay::new(),
            status: StatusBar::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, frame: &mut Frame<'_>, state: &AppState) {
        let start = Instant::now();
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base_style()), area);

        match state.visible_screen() {
            Screen::TooSmall => self.loading.render_too_small(frame, area),
            screen => {
                let [main, status] =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

                if state.loading {
                    self.loading.render(frame, &state.spinner, main);
                } else {
                    self.draw_screen(frame, state, screen, main);
                }
                self.status.render(frame, state, status);
            }
        }

        let elapsed = start.elapsed();
        self.stats.frames += 1;
        self.stats.total += elapsed;
        if elapsed.as_millis() > 16 {
            self.stats.slow += 1;
            warn!("Slow render: {}ms (target: <16ms)", elapsed.as_millis());
        }
    }

    fn draw_screen(&self, frame: &mut Frame<'_>, state: &AppState, screen: Screen, area: Rect) {
        match screen {
            Screen::Home => self.home.render(frame, state, area),
            Screen::Help => {
                if state.picker_open {
                    self.picker.render(frame, state, area);
                } else {
                    self.home.render(frame, state, area);
                }
                self.help.render(frame, area);
            }
            Screen::InstallPicker => self.picker.render(frame, state, area),
            Screen::Logs => self.logs.render(frame, state, area),
            Screen::Error | Screen::TooSmall => self.error.render(frame, area),
        }
    }
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use ratatui::{Terminal, backend::TestBackend};

    use compact_str::CompactString;

    use super::*;
    use crate::model::app_state::{LogLevel, RemoteIndex};
    use crate::model::ui_state::{FocusTarget, WindowSize};
    use crate::python::environment::{LocalPackage, PackageManager};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(state.window.width, state.window.height)).unwrap();
        let mut renderer = UIRenderer::new();
        terminal.draw(|f| renderer.render(f, state)).unwrap();
        assert_eq!(renderer.stats().frames, 1);
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn home() -> AppState {
        let mut state = AppState::new(PackageManager::Uv, 50, 2, Local::now());
        state.window = WindowSize::new(100, 30);
        state.loading = false;
        state.python_version = "Python 3.12.1".into();
        state.local_packages = vec![LocalPackage::new("flask", "3.0.0")];
        state.info = "Packages loaded from cache!".into();
        state
    }

    #[test]
    fn test_home_shows_packages_and_info() {
        let screen = draw(&home());
        assert!(screen.contains("flask"));
        assert!(screen.contains("3.0.0"));
        assert!(screen.contains("Python 3.12.1"));
        assert!(screen.contains("uv"));
        assert!(screen.contains("Packages loaded from cache!"));
    }

    #[test]
    fn test_too_small_hides_everything() {
        let mut state = home();
        state.window = WindowSize::new(50, 20);
        let screen = draw(&state);
        assert!(screen.contains("Terminal size too small!"));
        assert!(!screen.contains("flask"));
    }

    #[test]
    fn test_loading_and_error_screens() {
        let mut state = home();
        state.loading = true;
        assert!(draw(&state).contains("Loading..."));

        state.loading = false;
        state.screen = Screen::Error;
        state.focus = FocusTarget::Notice;
        assert!(draw(&state).contains("press the Esc key"));
    }

    #[test]
    fn test_picker_with_empty_index_and_long_query() {
        let mut state = home();
        state.screen = Screen::InstallPicker;
        state.focus = FocusTarget::QueryInput;
        state.picker_open = true;
        state.remote_index = RemoteIndex::new(Vec::<CompactString>::new().into());
        for _ in 0..70_000 {
            state.query.push('a');
        }
        let screen = draw(&state);
        assert!(screen.contains("Results (index unavailable)"));
        assert!(screen.contains("Search PyPI"));
    }

    #[test]
    fn test_logs_screen_titled() {
        let mut state = home();
        state.screen = Screen::Logs;
        state.focus = FocusTarget::LogTable;
        state.push_log(LogLevel::Warn, "pip: not found");
        let screen = draw(&state);
        assert!(screen.contains("Application Logs"));
        assert!(screen.contains("pip: not found"));
    }

    #[test]
    fn test_help_lists_bindings() {
        let mut state = home();
        state.screen = Screen::Help;
        state.focus = FocusTarget::Notice;
        let screen = draw(&state);
        assert!(screen.contains("HELP"));
        assert!(screen.contains("Ctrl+P"));
    }
}
