pub mod app;
pub mod events;
pub mod forms;
pub mod routes;
pub mod services;
pub mod ui;

pub use app::{App, Screen};
pub use events::{Event, EventHandler};

use ccr_core::{CcrResult, ClusterApi, ConsoleConfig, IndexCatalog};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing::info;

/// Run the console until the user quits, starting at `initial_path`.
pub async fn run(
    config: ConsoleConfig,
    api: Arc<dyn ClusterApi>,
    catalog: Arc<dyn IndexCatalog>,
    initial_path: &str,
) -> CcrResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, api, catalog, initial_path).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: ConsoleConfig,
    api: Arc<dyn ClusterApi>,
    catalog: Arc<dyn IndexCatalog>,
    initial_path: &str,
) -> CcrResult<()> {
    let mut events = EventHandler::new(config.tui.tick_rate);
    let mut app = App::new(config, api, catalog, events.sender());

    info!(path = initial_path, "starting console");
    app.navigate(initial_path);

    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        let event = events.next().await?;
        app.handle_event(event);

        if app.should_quit {
            info!("console closed");
            return Ok(());
        }
    }
}
