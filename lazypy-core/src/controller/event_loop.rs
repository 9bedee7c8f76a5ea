//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event loop: the single inbound message stream
//!
//! Merges terminal input, task results and the periodic tick into one
//! ordered sequence of [`Message`]s. Key syntax is resolved here so the state
//! machine only ever sees abstract intents.

use std::time::Duration;

use chrono::Local;
use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::controller::actions::{Intent, Message};

pub struct EventLoop {
    event_stream: EventStream,
    task_rx: UnboundedReceiver<Message>,
    ticker: Interval,
}

impl EventLoop {
    pub fn new(task_rx: UnboundedReceiver<Message>, tick_rate: Duration) -> Self {
        let mut ticker = tokio::time::interval(tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            event_stream: EventStream::new(),
            task_rx,
            ticker,
        }
    }

    /// Wait for the next message. `typing` routes printable keys to the
    /// query input. `None` means the terminal input stream ended.
    pub async fn next_message(&mut self, typing: bool) -> Option<Message> {
        loop {
            tokio::select! {
                maybe_event = self.event_stream.next() => match maybe_event {
                    Some(Ok(event)) => {
                        trace!("Terminal event received: {:?}", event);
                        if let Some(message) = message_for_event(event, typing) {
                            return Some(message);
                        }
                    }
                    Some(Err(e)) => warn!("Terminal event error: {}", e),
                    None => {
                        info!("Terminal event stream closed");
                        return None;
                    }
                },

                Some(message) = self.task_rx.recv() => {
                    debug!("Task result received: {:?}", message);
                    return Some(message);
                }

                _ = self.ticker.tick() => {
                    return Some(Message::Tick {
                        entropy: rand::random(),
                        now: Local::now(),
                    });
                }
            }
        }
    }
}

pub fn message_for_event(event: TermEvent, typing: bool) -> Option<Message> {
    match event {
        TermEvent::Key(key) if key.kind != KeyEventKind::Release => {
            intent_for_key(&key, typing).map(Message::Intent)
        }
        TermEvent::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    }
}

/// Key bindings. Control chords work everywhere; bare letters are text
/// while the query input has focus.
pub fn intent_for_key(key: &KeyEvent, typing: bool) -> Option<Intent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => Some(Intent::Quit),
            'h' => Some(Intent::ToggleHelp),
            'p' => Some(Intent::ToggleInstallPicker),
            'l' => Some(Intent::ToggleLogs),
            'a' => Some(Intent::InstallSelected),
            _ => None,
        },
        KeyCode::F(1) => Some(Intent::ToggleHelp),
        KeyCode::Esc => Some(Intent::Cancel),
        KeyCode::Tab => Some(Intent::FocusNext),
        KeyCode::Down => Some(Intent::FocusDown),
        KeyCode::Up => Some(Intent::FocusUp),
        KeyCode::Enter => Some(Intent::Confirm),
        KeyCode::Backspace if typing => Some(Intent::Backspace),
        KeyCode::Char(c) if typing && !alt => Some(Intent::TextInput(c)),
        KeyCode::Char('p') if !alt => Some(Intent::ToggleManager),
        KeyCode::Char('j') if !alt => Some(Intent::FocusDown),
        KeyCode::Char('k') if !alt => Some(Intent::FocusUp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_chords_work_while_typing() {
        for typing in [false, true] {
            let intent = |c| intent_for_key(&key(KeyCode::Char(c), KeyModifiers::CONTROL), typing);
            assert_eq!(intent('c'), Some(Intent::Quit));
            assert_eq!(intent('h'), Some(Intent::ToggleHelp));
            assert_eq!(intent('p'), Some(Intent::ToggleInstallPicker));
            assert_eq!(intent('l'), Some(Intent::ToggleLogs));
            assert_eq!(intent('a'), Some(Intent::InstallSelected));
        }
    }

    #[test]
    fn test_letters_depend_on_typing() {
        let p = key(KeyCode::Char('p'), KeyModifiers::NONE);
        assert_eq!(intent_for_key(&p, false), Some(Intent::ToggleManager));
        assert_eq!(intent_for_key(&p, true), Some(Intent::TextInput('p')));

        let upper = key(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(intent_for_key(&upper, true), Some(Intent::TextInput('R')));
        assert_eq!(intent_for_key(&upper, false), None);

        let backspace = key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(intent_for_key(&backspace, true), Some(Intent::Backspace));
        assert_eq!(intent_for_key(&backspace, false), None);
    }

    #[test]
    fn test_navigation_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(intent_for_key(&key(KeyCode::Tab, none), true), Some(Intent::FocusNext));
        assert_eq!(intent_for_key(&key(KeyCode::Down, none), true), Some(Intent::FocusDown));
        assert_eq!(intent_for_key(&key(KeyCode::Char('k'), none), false), Some(Intent::FocusUp));
        assert_eq!(intent_for_key(&key(KeyCode::Enter, none), false), Some(Intent::Confirm));
        assert_eq!(intent_for_key(&key(KeyCode::Esc, none), true), Some(Intent::Cancel));
    }

    #[test]
    fn test_resize_and_release_events() {
        assert_eq!(
            message_for_event(TermEvent::Resize(80, 24), false),
            Some(Message::Resize { width: 80, height: 24 })
        );

        let mut released = key(KeyCode::Esc, KeyModifiers::NONE);
        released.kind = KeyEventKind::Release;
        assert_eq!(message_for_event(TermEvent::Key(released), false), None);
    }
}
