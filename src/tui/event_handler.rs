use super::app_logic::TuiApp;
use super::app_state::AppMode;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    // Network results land between key presses, so the poll stays short.
    app.drain_worker_messages();
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                match app.mode {
                    AppMode::Normal => app.handle_normal_mode_input(key_event),
                    AppMode::EditingPath | AppMode::EditingSearch => {
                        app.handle_editing_mode_input(key_event)
                    }
                }
            }
        }
    }
    Ok(())
}
