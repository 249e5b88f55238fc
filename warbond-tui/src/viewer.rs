//! Full-screen chart viewer.
//!
//! Takes over the terminal, draws the growth chart until the user presses
//! `q`, `Esc` or `Enter`, then hands the terminal back.

use std::io::{self, stdout};
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use warbond_core::GrowthSeries;

use crate::chart::GrowthChart;
use crate::theme::Theme;

pub const FOOTER_HINT: &str = "q / Esc / Enter: close";

/// Show `series` in the terminal and block until dismissed.
pub fn show(series: &[GrowthSeries]) -> Result<()> {
    let _hook = PanicHookGuard::install(restore_terminal);
    let _session = TerminalSession::enter()?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let theme = Theme::default();
    run_viewer(&mut terminal, series, &theme)
}

/// Raw mode plus alternate screen, undone on drop.
struct TerminalSession;

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let session = TerminalSession;
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Runs `on_panic` before the previous panic hook while alive, then puts the
/// previous hook back.
pub struct PanicHookGuard {
    restore: Option<Box<dyn FnOnce() + Send>>,
}

impl PanicHookGuard {
    pub fn install(on_panic: impl Fn() + Send + Sync + 'static) -> Self {
        let previous = Arc::new(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            on_panic();
            (**chained)(info);
        }));

        let restore = move || {
            // Drops the chaining hook along with its reference to `previous`.
            drop(std::panic::take_hook());
            std::panic::set_hook(Box::new(move |info| (**previous)(info)));
        };
        Self {
            restore: Some(Box::new(restore)),
        }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // The hook cannot be swapped from a panicking thread.
        if std::thread::panicking() {
            return;
        }
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

fn run_viewer<B: Backend>(
    terminal: &mut Terminal<B>,
    series: &[GrowthSeries],
    theme: &Theme,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, series, theme))?;

        if let Event::Key(key) = event::read()? {
            if is_dismiss_key(&key) {
                return Ok(());
            }
        }
    }
}

/// Chart on top, one-line key hint at the bottom.
pub fn draw(f: &mut Frame, series: &[GrowthSeries], theme: &Theme) {
    let [chart_area, footer_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(f.area());

    f.render_widget(GrowthChart::new(series, theme), chart_area);
    f.render_widget(
        Paragraph::new(Span::styled(FOOTER_HINT, Style::default().fg(theme.muted))),
        footer_area,
    );
}

pub fn is_dismiss_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
}
