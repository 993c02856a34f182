use std::{
    fs::OpenOptions,
    io::stdout,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use simplelog::{Config, WriteLogger};

mod app;
mod clock;
mod countdown;
mod editor;
mod flow;
mod log_form;
mod model;
mod scheduler;
mod settings;
mod storage;
mod ui;
mod validation;
mod vault;

use app::App;
use clock::{Clock, SystemClock};
use flow::Session;
use settings::{Args, Settings};
use storage::Storage;

fn main() -> Result<()> {
    let settings = Settings::from_args(Args::parse());

    // The data directory has to exist before the log file can be opened.
    let storage = Storage::new(&settings);
    storage.ensure()?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(settings.log_path())
        .with_context(|| format!("Failed to open {}", settings.log_path().display()))?;
    WriteLogger::init(settings.log_level, Config::default(), log_file)?;

    info!("Starting readnudge");
    info!("Reading list at {}", storage.data_path().display());

    if settings.reset {
        clear_snooze(&storage)?;
        println!("Reset: next_popup_not_before cleared");
    }

    let session = Session::start(&settings, SystemClock)?;
    let mut app = App::new(session);

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {:?}", err);
        println!("{err:?}");
    }

    info!("Shutting down readnudge");
    Ok(())
}

fn clear_snooze(storage: &Storage) -> Result<()> {
    let mut doc = storage.load()?;
    info!("Clearing snooze (was {:?})", doc.raw_not_before());
    doc.set_not_before(None);
    storage.save(&doc)?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
                if app.should_quit {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use tempfile::TempDir;

    #[test]
    fn reset_clears_future_snooze() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(&Settings::rooted_at(dir.path()));
        storage.ensure().unwrap();
        let mut doc = storage.load().unwrap();
        doc.set_not_before(Some(Utc::now() + ChronoDuration::hours(3)));
        storage.save(&doc).unwrap();

        clear_snooze(&storage).unwrap();

        let doc = storage.load().unwrap();
        assert_eq!(doc.raw_not_before(), None);
        assert_eq!(doc.active.len(), 3);
    }
}
