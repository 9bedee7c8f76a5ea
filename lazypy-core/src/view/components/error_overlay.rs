//! src/view/components/error_overlay.rs
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::model::ui_state::Screen;
use crate::view::{components::help_overlay::centered, theme};

pub const FALLBACK_MESSAGE: &str = "Somehow this page showed up even though it isn't supposed to, \
     press the Esc key to return to Home... restart if this persists.";

/// Fallback for an undefined screen/focus combination.
pub struct ErrorOverlay {
    message: String,
}

impl ErrorOverlay {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let rect = centered(area, 60, 7);
        let title = format!(" {} ", Screen::Error.title());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme::error_style())
            .style(theme::base_style());

        let text = Paragraph::new(self.message.as_str())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(Clear, rect);
        frame.render_widget(text, rect);
    }
}

impl Default for ErrorOverlay {
    fn default() -> Self {
        Self::new(FALLBACK_MESSAGE)
    }
}
