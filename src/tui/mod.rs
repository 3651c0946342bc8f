pub mod input;
pub mod render;
pub mod state;

use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{mpsc as tokio_mpsc, watch};

use crate::events::{ControlMessage, UiNotice};
use crate::tui::input::map_key;
use crate::tui::render::draw;
use crate::tui::state::{ConsoleState, PanelStack};

#[derive(Debug, Clone)]
pub struct TuiConfig {
    pub stack: PanelStack,
    pub prompt: String,
    pub refresh_ms: u64,
    pub history_entries: usize,
    pub max_panel_lines: usize,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            stack: PanelStack::default(),
            prompt: "Enter command>".to_string(),
            refresh_ms: 50,
            history_entries: 200,
            max_panel_lines: 1000,
        }
    }
}

/// Runs the console until the user exits. Control messages arrive on `rx`;
/// entered commands and the exit notice go out through `notices_tx`;
/// `cancel_tx` flips to true on teardown so async collaborators can stop.
pub fn run_live(
    rx: Receiver<ControlMessage>,
    notices_tx: tokio_mpsc::UnboundedSender<UiNotice>,
    cfg: TuiConfig,
    cancel_tx: watch::Sender<bool>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ConsoleState::new(cfg.stack, cfg.history_entries, cfg.max_panel_lines);
    state.prompt = cfg.prompt;

    loop {
        while let Ok(msg) = rx.try_recv() {
            state.apply_message(&msg);
        }

        terminal.draw(|f| draw(f, &state))?;

        if event::poll(Duration::from_millis(cfg.refresh_ms))? {
            if let CEvent::Key(key) = event::read()? {
                if let Some(action) = map_key(key) {
                    if let Some(notice) = state.handle_action(action) {
                        let _ = notices_tx.send(notice);
                    }
                }
            }
        }

        if state.exit_requested {
            let _ = cancel_tx.send(true);
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
