//! src/view/components/home_screen.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
};

use crate::{
    model::{app_state::AppState, ui_state::FocusTarget},
    view::theme,
};

pub struct HomeScreen;

impl HomeScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.render_header(frame, state, chunks[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.render_packages(frame, state, panes[0]);
        self.render_scripts(frame, state, panes[1]);
    }

    fn render_header(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let line = Line::from(vec![
            Span::styled("Python: ", theme::label_style()),
            Span::raw(state.python_version.as_str()),
            Span::raw("   "),
            Span::styled("Manager: ", theme::label_style()),
            Span::styled(state.manager.to_string(), theme::header_style()),
            Span::raw("   "),
            Span::styled("Packages: ", theme::label_style()),
            Span::raw(state.local_packages.len().to_string()),
        ]);

        let header = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lazypy ")
                .title_style(theme::title_style())
                .border_style(theme::border_style(false))
                .style(theme::base_style()),
        );
        frame.render_widget(header, area);
    }

    fn render_packages(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let focused = state.focus == FocusTarget::LocalPackageList;
        let rows = state
            .local_packages
            .iter()
            .map(|pkg| Row::new(vec![Cell::from(pkg.name.as_str()), Cell::from(pkg.version.as_str())]));

        let table = Table::new(rows, [Constraint::Fill(1), Constraint::Length(14)])
            .header(Row::new(vec!["Name", "Version"]).style(theme::header_style()));

        let mut table_state = TableState::default().with_selected(state.package_cursor.selected());
        frame.render_stateful_widget(
            pane(table, " Local Packages ", focused),
            area,
            &mut table_state,
        );
    }

    fn render_scripts(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let focused = state.focus == FocusTarget::ScriptList;
        let rows = state.local_scripts.iter().map(|script| {
            Row::new(vec![
                Cell::from(script.path.display().to_string()),
                Cell::from(script.line_count.to_string()),
                Cell::from(script.function_count.to_string()),
                Cell::from(script.class_count.to_string()),
            ])
        });

        let widths = [
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths)
            .header(Row::new(vec!["Script", "Lines", "Funcs", "Classes"]).style(theme::header_style()));

        let mut table_state = TableState::default().with_selected(state.script_cursor.selected());
        frame.render_stateful_widget(
            pane(table, " Python Scripts ", focused),
            area,
            &mut table_state,
        );
    }
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared chrome of a selectable table pane.
pub(crate) fn pane<'a>(table: Table<'a>, title: &'a str, focused: bool) -> Table<'a> {
    table
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(theme::title_style())
                .border_style(theme::border_style(focused))
                .style(theme::base_style()),
        )
        .row_highlight_style(theme::highlight_style())
        .highlight_symbol("▶ ")
        .highlight_spacing(HighlightSpacing::Always)
}
