//! src/main.rs
//! lazypy: terminal dashboard for a local Python environment

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use lazypy_core::{
    Logger,
    cache::index_cache::IndexCache,
    config::Config,
    controller::{
        action_dispatcher::ActionDispatcher,
        actions::{Command, Message},
        event_loop::EventLoop,
        state_machine::{self, Transition},
    },
    model::{app_state::AppState, ui_state::WindowSize},
    python::{environment::SystemEnvironment, pypi::HttpPackageIndex},
    view::ui::UIRenderer,
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let (config, config_error) = match Config::load().await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _guard = Logger::init_tracing(&config.log, &config.log_dir()?)
        .context("Failed to initialize logging")?;
    info!("Starting lazypy {}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("Failed to load config, using defaults: {:#}", e);
    }

    let app = App::new(config).await.context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    dispatcher: ActionDispatcher,
    ui_renderer: UIRenderer,
    state: AppState,
    startup: Vec<Command>,
}

impl App {
    async fn new(config: Config) -> Result<Self> {
        let project_root = tokio::fs::canonicalize(".")
            .await
            .context("Failed to get current directory")?;

        let index = HttpPackageIndex::new(config.index.clone()).context("Failed to build HTTP client")?;
        let env = SystemEnvironment::new(
            project_root.clone(),
            project_root.join(&config.script_root),
            config.venv_dir_name.clone(),
        );
        let cache = IndexCache::default_location().context("Failed to locate cache directory")?;
        info!("Index cache at {}", cache.path().display());

        let (task_tx, task_rx) = mpsc::unbounded_channel::<Message>();
        let dispatcher = ActionDispatcher::new(task_tx, Arc::new(index), Arc::new(env), cache);
        let event_loop = EventLoop::new(task_rx, config.tick_rate);

        let terminal = setup_terminal().context("Failed to initialize terminal")?;
        let size = terminal.size().context("Failed to query terminal size")?;

        let Transition { state, commands } = state_machine::init(
            config.default_manager,
            config.index.min_index_names,
            WindowSize::new(size.width, size.height),
            rand::random(),
            Local::now(),
        );

        info!(
            "Application initialized in {} with {}",
            project_root.display(),
            config.default_manager
        );

        Ok(Self {
            terminal,
            event_loop,
            dispatcher,
            ui_renderer: UIRenderer::new(),
            state,
            startup: commands,
        })
    }

    /// Returns `false` once any command asked to quit.
    fn dispatch_all(&self, commands: Vec<Command>) -> bool {
        commands
            .into_iter()
            .fold(true, |keep_going, command| self.dispatcher.dispatch(command) && keep_going)
    }

    async fn run(mut self) -> Result<()> {
        let startup = std::mem::take(&mut self.startup);
        if !self.dispatch_all(startup) {
            return Ok(());
        }

        loop {
            self.render()?;

            let typing = self.state.accepts_text();
            let Some(message) = self.event_loop.next_message(typing).await else {
                info!("Input closed, shutting down");
                break;
            };

            let Transition { state, commands } = state_machine::transition(&self.state, message);
            self.state = state;

            if !self.dispatch_all(commands) {
                info!("Quit requested");
                break;
            }
        }

        let stats = self.ui_renderer.stats();
        debug!(
            "Rendered {} frames ({} slow, {:?} total)",
            stats.frames, stats.slow, stats.total
        );
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let state = &self.state;
        let renderer = &mut self.ui_renderer;
        self.terminal
            .draw(|frame: &mut Frame<'_>| renderer.render(frame, state))
            .context("Failed to draw terminal")?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
