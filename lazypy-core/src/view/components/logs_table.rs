//! src/view/components/logs_table.rs

use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table, TableState},
};

use crate::{
    model::{
        app_state::{AppState, LogLevel},
        ui_state::Screen,
    },
    view::{components::home_screen::pane, theme},
};

pub struct LogsTable;

impl LogsTable {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let rows = state.log_entries.iter().map(|entry| {
            let level_style = match entry.level {
                LogLevel::Info => theme::info_style(),
                LogLevel::Warn => theme::warn_style(),
                LogLevel::Error => theme::error_style(),
            };
            Row::new(vec![
                Cell::from(entry.level.to_string()).style(level_style),
                Cell::from(entry.timestamp.format("%H:%M:%S").to_string()),
                Cell::from(entry.message.as_str()),
            ])
        });

        let widths = [Constraint::Length(6), Constraint::Length(9), Constraint::Fill(1)];
        let table = Table::new(rows, widths)
            .header(Row::new(vec!["Level", "Time", "Message"]).style(theme::header_style()));

        let selected = if state.log_entries.is_empty() {
            None
        } else {
            state.log_cursor.selected()
        };
        let mut table_state = TableState::default().with_selected(selected);
        let title = format!(" {} ", Screen::Logs.title());
        frame.render_stateful_widget(pane(table, &title, true), area, &mut table_state);
    }
}

impl Default for LogsTable {
    fn default() -> Self {
        Self::new()
    }
}
