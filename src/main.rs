use anyhow::{anyhow, Result};

mod app;
mod backend;
mod chat;
mod config;
mod handler;
mod tui;
mod ui;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(&config);

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;

        settle_exchange(app).await;
    }
    Ok(())
}

/// Join the in-flight exchange once it has finished and fold the result
/// back into the session. A panicked task settles as a failed exchange;
/// nothing here can take the whole client down.
async fn settle_exchange(app: &mut App) {
    let finished = app
        .exchange_task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    if let Some(task) = app.exchange_task.take() {
        let result = match task.await {
            Ok(result) => result,
            Err(join_err) => Err(anyhow!("exchange task failed: {}", join_err)),
        };
        app.finish_exchange(result);
    }
}
