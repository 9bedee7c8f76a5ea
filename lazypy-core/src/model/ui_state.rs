//! Screens, focus targets and list cursors.

/// Minimum usable viewport.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 30;

/// Top-level views. Exactly one is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Home,
    Help,
    InstallPicker,
    Logs,
    /// Fallback for an inconsistent screen/focus combination.
    Error,
    /// Viewport below [`MIN_WIDTH`] x [`MIN_HEIGHT`].
    TooSmall,
}

impl Screen {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Help => "Help",
            Self::InstallPicker => "Install Python Package",
            Self::Logs => "Application Logs",
            Self::Error => "Error",
            Self::TooSmall => "Terminal too small",
        }
    }
}

/// The sub-element of the active screen receiving input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    LocalPackageList,
    ScriptList,
    QueryInput,
    CandidateList,
    LogTable,
    /// Screens with nothing to focus except dismissal.
    Notice,
}

impl FocusTarget {
    /// Focus a screen starts with when entered.
    pub const fn default_for(screen: Screen) -> Self {
        match screen {
            Screen::Home => Self::LocalPackageList,
            Screen::InstallPicker => Self::QueryInput,
            Screen::Logs => Self::LogTable,
            Screen::Help | Screen::Error | Screen::TooSmall => Self::Notice,
        }
    }

    pub const fn belongs_to(self, screen: Screen) -> bool {
        match self {
            Self::LocalPackageList | Self::ScriptList => matches!(screen, Screen::Home),
            Self::QueryInput | Self::CandidateList => matches!(screen, Screen::InstallPicker),
            Self::LogTable => matches!(screen, Screen::Logs),
            Self::Notice => matches!(screen, Screen::Help | Screen::Error | Screen::TooSmall),
        }
    }

    /// Tab order within a screen. Applying it twice is the identity.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::LocalPackageList => Self::ScriptList,
            Self::ScriptList => Self::LocalPackageList,
            Self::QueryInput => Self::CandidateList,
            Self::CandidateList => Self::QueryInput,
            Self::LogTable => Self::LogTable,
            Self::Notice => Self::Notice,
        }
    }
}

/// Cursor of a list view. `None` is the blurred sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListCursor(Option<usize>);

impl ListCursor {
    pub const fn top() -> Self {
        Self(Some(0))
    }

    pub const fn blurred() -> Self {
        Self(None)
    }

    pub const fn selected(self) -> Option<usize> {
        self.0
    }

    /// True at the first row, and when blurred.
    pub const fn is_at_top(self) -> bool {
        matches!(self.0, None | Some(0))
    }

    pub fn up(&mut self) {
        if let Some(i) = self.0 {
            self.0 = Some(i.saturating_sub(1));
        }
    }

    pub fn down(&mut self, len: usize) {
        if let Some(i) = self.0 {
            self.0 = Some((i + 1).min(len.saturating_sub(1)));
        }
    }

    /// Keep a focused cursor inside `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if let Some(i) = self.0 {
            self.0 = Some(i.min(len.saturating_sub(1)));
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u16,
    pub height: u16,
}

impl WindowSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub const fn is_too_small(self) -> bool {
        self.width < MIN_WIDTH || self.height < MIN_HEIGHT
    }
}

/// Single-line text input; edits happen at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryInput {
    text: String,
}

impl QueryInput {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
