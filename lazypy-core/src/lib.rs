pub mod error;

pub mod config;

pub mod cache {
    pub mod index_cache;
    pub use index_cache::{CacheLoad, CacheSnapshot, IndexCache};
}

pub mod search {
    pub mod tiered;
    pub use tiered::tiered_filter;
}

pub mod controller {
    pub mod actions;
    pub use actions::{Command, CommandResult, Intent, Message};

    pub mod traits;

    pub mod state_machine;
    pub use state_machine::{Transition, init, transition};

    pub mod action_dispatcher;

    pub mod event_loop;
    pub use event_loop::EventLoop;
}

pub mod model {
    pub mod app_state;
    pub use app_state::{AppState, LogEntry, LogLevel, RemoteIndex};

    pub mod ui_state;
    pub use ui_state::{FocusTarget, ListCursor, Screen, WindowSize};
}

pub mod python {
    pub mod environment;
    pub use environment::{LocalPackage, ManagerSnapshot, PackageManager, SystemEnvironment};

    pub mod scripts;

    pub mod pypi;
}

pub mod view {
    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod error_overlay;
        pub use error_overlay::ErrorOverlay;
        pub mod help_overlay;
        pub use help_overlay::HelpOverlay;
        pub mod home_screen;
        pub use home_screen::HomeScreen;
        pub mod install_picker;
        pub use install_picker::InstallPicker;
        pub mod loading_overlay;
        pub use loading_overlay::LoadingOverlay;
        pub mod logs_table;
        pub use logs_table::LogsTable;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod humanize;
    pub mod spinner;
}

pub use error::AppError;

pub use model::app_state::AppState;
