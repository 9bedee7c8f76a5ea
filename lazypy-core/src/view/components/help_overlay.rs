//! Key binding reference, drawn over Home.
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+H / Esc", "Close this screen"),
    ("Ctrl+C", "Exit the application"),
    ("Ctrl+P", "Find (and install) a package"),
    ("Ctrl+L", "Open the application logs"),
    ("p", "Toggle package manager (Home)"),
    ("Tab", "Switch focus between panes"),
    ("Up / Down", "Move between query and results"),
    ("Enter", "Show package details"),
    ("Ctrl+A", "Install the selected package"),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let overlay_area = centered(area, 56, BINDINGS.len() as u16 + 4);
        frame.render_widget(Clear, overlay_area);

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(keys, what)| {
                Line::from(vec![
                    Span::styled(format!("{keys:<14}"), theme::label_style()),
                    Span::raw(*what),
                ])
            })
            .collect();

        let help = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" HELP ")
                    .title_alignment(Alignment::Center)
                    .title_style(theme::title_style())
                    .border_style(theme::border_style(true))
                    .style(theme::base_style()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, overlay_area);
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` box centered in `area`, shrunk to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
