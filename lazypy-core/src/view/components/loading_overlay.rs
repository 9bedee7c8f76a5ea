//! src/view/components/loading_overlay.rs
//! ============================================================
//! Full-screen notices: the loading spinner and the "too small" warning.

use crate::model::ui_state::{MIN_HEIGHT, MIN_WIDTH};
use crate::util::spinner::Spinner;
use crate::view::{components::help_overlay::centered, theme};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct LoadingOverlay;

impl LoadingOverlay {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, spinner: &Spinner, area: Rect) {
        let rect = centered(area, 30, 3);
        frame.render_widget(Clear, rect);

        let chrome = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_style(true))
            .style(theme::base_style());

        frame.render_widget(
            Paragraph::new(format!("{} Loading...", spinner.glyph()))
                .block(chrome)
                .alignment(Alignment::Center),
            rect,
        );
    }

    /// Drawn instead of everything else below the minimum viewport.
    pub fn render_too_small(&self, frame: &mut Frame<'_>, area: Rect) {
        let text = Text::from(vec![
            Line::styled("Terminal size too small!", theme::warn_style()),
            Line::from(format!("Must be at least {MIN_WIDTH}, {MIN_HEIGHT}")),
            Line::from(format!("Current: {}, {}", area.width, area.height)),
        ]);

        let rect = centered(area, area.width, 3);
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}
