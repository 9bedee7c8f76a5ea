//! src/view/components/install_picker.rs
//! ============================================================
//! Query input, ranked candidates and the selected package's detail.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    model::{app_state::AppState, ui_state::FocusTarget},
    python::pypi::PackageDetail,
    util::humanize::{grouped, release_size},
    view::{components::home_screen::pane, theme},
};

pub struct InstallPicker;

impl InstallPicker {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.render_query(frame, state, chunks[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        self.render_candidates(frame, state, panes[0]);
        self.render_detail(frame, state, panes[1]);
    }

    fn render_query(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let focused = state.focus == FocusTarget::QueryInput;
        let input = Paragraph::new(state.query.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search PyPI ")
                .title_style(theme::title_style())
                .border_style(theme::border_style(focused))
                .style(theme::base_style()),
        );
        frame.render_widget(input, area);

        if focused {
            let width = u16::try_from(state.query.as_str().chars().count()).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(1).saturating_add(width);
            frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_candidates(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let focused = state.focus == FocusTarget::CandidateList;
        let rows = state
            .filtered_candidates
            .iter()
            .map(|name| Row::new(vec![Cell::from(name.as_str())]));

        let title = match (state.remote_index.is_published(), state.remote_index.is_empty()) {
            (false, _) => " Results (indexing...) ",
            (true, true) => " Results (index unavailable) ",
            (true, false) => " Results ",
        };

        let table = Table::new(rows, [Constraint::Fill(1)]);
        let mut table_state = TableState::default().with_selected(state.candidate_cursor.selected());
        frame.render_stateful_widget(pane(table, title, focused), area, &mut table_state);
    }

    fn render_detail(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let lines = match (&state.selected_remote_package, &state.pending_detail) {
            (Some(detail), _) => detail_lines(detail),
            (None, Some(name)) => vec![Line::from(format!("{} Loading {name}...", state.spinner.glyph()))],
            (None, None) => vec![Line::styled(
                "Press Enter on a result to see its details",
                theme::hint_style(),
            )],
        };

        let detail = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Package ")
                    .title_style(theme::title_style())
                    .border_style(theme::border_style(false))
                    .style(theme::base_style()),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(detail, area);
    }
}

impl Default for InstallPicker {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![Span::styled(format!("{label:<12}"), theme::label_style()), Span::raw(value)])
}

fn detail_lines(detail: &PackageDetail) -> Vec<Line<'_>> {
    let downloads = detail.downloads;
    vec![
        Line::styled(detail.name.as_str(), theme::header_style()),
        Line::from(""),
        field("Version", detail.version.clone()),
        field("Author", detail.author_email.clone()),
        field("Size", release_size(detail.size_bytes)),
        Line::from(""),
        Line::styled("Downloads", theme::label_style()),
        field("  day", grouped(downloads.last_day)),
        field("  week", grouped(downloads.last_week)),
        field("  month", grouped(downloads.last_month)),
        Line::from(""),
        Line::from(detail.summary.as_str()),
    ]
}
