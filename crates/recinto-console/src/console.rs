//! Interactive terminal loop for the seating panel.
//!
//! The poll driver writes into the shared panel; this loop only reads it,
//! redraws at a fixed rate and watches the keyboard for a quit key.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{watch, RwLock};

use recinto_overlay::SeatingPanel;
use recinto_poll::PollStatus;

use crate::seating_view::render_panel;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// `q`, `Esc` and `Ctrl+C` close the console.
pub fn is_quit_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Draw the panel until the operator quits.
pub async fn run_console(
    panel: Arc<RwLock<SeatingPanel>>,
    status: watch::Receiver<PollStatus>,
    cell_gap: u16,
) -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdout().is_terminal() {
        anyhow::bail!("the seating console needs a terminal; use --headless instead");
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = draw_loop(&mut terminal, &panel, &status, cell_gap).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn draw_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    panel: &RwLock<SeatingPanel>,
    status: &watch::Receiver<PollStatus>,
    cell_gap: u16,
) -> anyhow::Result<()> {
    loop {
        {
            let panel = panel.read().await;
            let status = status.borrow().clone();
            terminal.draw(|frame| {
                let area = frame.area();
                render_panel(frame, area, &panel, &status, cell_gap);
            })?;
        }

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && is_quit_key(key.code, key.modifiers) {
                    tracing::info!("Console closed by operator");
                    return Ok(());
                }
            }
        }
    }
}
