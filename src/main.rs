use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use boutique_chat::config::Config;

/// Log to a file: the alternate screen owns the terminal while the widget
/// runs, so nothing may be written to stdout/stderr.
fn init_tracing() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("boutique-chat");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("boutique.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::load().unwrap_or_else(|_| Config::new());
    tracing::info!(endpoint = %config.endpoint, "starting boutique chat widget");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(config);
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }

        // Apply a settled backend response, if any; ticks guarantee this
        // runs at least a few times per second.
        app.poll_pending().await;
    }
    Ok(())
}
