//! src/view/components/status_bar.rs
//!
//! Bottom line: the current info note on the left and the key hints of the
//! active screen on the right.

use crate::{
    model::{app_state::AppState, ui_state::Screen},
    view::theme,
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn hints(screen: Screen) -> &'static str {
        match screen {
            Screen::Home => "p manager | Tab focus | Ctrl+P install | Ctrl+L logs | Ctrl+H help",
            Screen::InstallPicker => "Enter details | Ctrl+A install | Tab focus | Esc back",
            Screen::Logs => "Ctrl+L / Esc back",
            Screen::Help => "Ctrl+H / Esc close",
            Screen::Error | Screen::TooSmall => "Esc home | Ctrl+C quit",
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let info_style = if state.last_error.is_some() && state.info.starts_with("Failed") {
            theme::error_style().bg(theme::BACKGROUND)
        } else {
            theme::info_style()
        };

        Paragraph::new(state.info.as_str())
            .style(info_style)
            .alignment(Alignment::Left)
            .render(layout[0], frame.buffer_mut());

        Paragraph::new(Self::hints(state.visible_screen()))
            .style(theme::hint_style())
            .alignment(Alignment::Right)
            .render(layout[1], frame.buffer_mut());
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
