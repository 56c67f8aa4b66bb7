//! Terminal frontend: live event log plus the port selectors.

use std::collections::VecDeque;
use std::io::stdout;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::Terminal;

use midithru_io::{EventReceiver, OpenSummary, PortConfig, PortRegistry};

mod widgets;
use widgets::{draw_main, draw_selector, PortKind, SelectorState, Term};

const TICK: Duration = Duration::from_millis(50);
const EVENT_LOG_CAPACITY: usize = 300;

struct App<'a> {
    registry: &'a PortRegistry,
    events: &'a EventReceiver,
    config: &'a mut PortConfig,
    config_path: &'a Path,
    log: VecDeque<String>,
    status: Option<String>,
    selector: Option<SelectorState>,
}

/// Run the TUI until the user quits or `shutdown` is set (termination
/// signal). Terminal state is restored on the way out even when the loop
/// errors.
pub fn run(
    registry: &PortRegistry,
    events: &EventReceiver,
    config: &mut PortConfig,
    config_path: &Path,
    initial_status: Option<String>,
    shutdown: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        registry,
        events,
        config,
        config_path,
        log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        status: initial_status,
        selector: None,
    };
    let result = run_loop(&mut terminal, &mut app, shutdown);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
}

fn run_loop(
    terminal: &mut Term,
    app: &mut App,
    shutdown: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        app.drain_events();

        terminal.draw(|f| match &app.selector {
            Some(selector) => draw_selector(f, selector),
            None => draw_main(
                f,
                &app.registry.open_input_names(),
                &app.registry.open_output_names(),
                &app.log,
                app.status.as_deref(),
            ),
        })?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        // Raw mode delivers Ctrl+C as a plain key event.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(());
        }

        match app.selector {
            Some(_) => app.handle_selector_key(key.code),
            None => {
                if !app.handle_main_key(key.code) {
                    return Ok(());
                }
            }
        }
    }
}

impl App<'_> {
    /// Pull whatever the engine has published since the last tick into the
    /// bounded log, oldest lines evicted first.
    fn drain_events(&mut self) {
        for event in self.events.drain() {
            if self.log.len() == EVENT_LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(event.log_line());
        }
    }

    /// Returns false when the user wants to quit.
    fn handle_main_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
            KeyCode::Char('i') | KeyCode::Char('I') => self.open_selector(PortKind::Input),
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_selector(PortKind::Output),
            KeyCode::Char('c') | KeyCode::Char('C') => self.log.clear(),
            _ => {}
        }
        true
    }

    fn handle_selector_key(&mut self, code: KeyCode) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.selector = None,
            KeyCode::Up => selector.cursor_up(),
            KeyCode::Down => selector.cursor_down(),
            KeyCode::Char(' ') => selector.toggle(),
            KeyCode::Char('a') | KeyCode::Char('A') => selector.check_all(),
            KeyCode::Char('n') | KeyCode::Char('N') => selector.check_none(),
            KeyCode::Enter => self.apply_selector(false),
            KeyCode::Char('s') | KeyCode::Char('S') => self.apply_selector(true),
            _ => {}
        }
    }

    fn open_selector(&mut self, kind: PortKind) {
        let (listed, selected) = match kind {
            PortKind::Input => (self.registry.list_inputs(), &self.config.inputs),
            PortKind::Output => (self.registry.list_outputs(), &self.config.outputs),
        };
        match listed {
            Ok(ports) => {
                self.selector = Some(SelectorState::new(kind, ports, selected));
            }
            Err(e) => {
                self.status = Some(format!("failed to list {}: {e}", kind.label()));
            }
        }
    }

    /// Reopen ports from the selector's checked set, update the config,
    /// and optionally persist it right away.
    fn apply_selector(&mut self, persist: bool) {
        let Some(selector) = self.selector.take() else {
            return;
        };
        let names = selector.selected_names();
        let summary = match selector.kind {
            PortKind::Input => {
                let summary = self.registry.open_inputs(&names);
                self.config.set_inputs(names);
                summary
            }
            PortKind::Output => {
                let summary = self.registry.open_outputs(&names);
                self.config.set_outputs(names);
                summary
            }
        };
        self.status = apply_status(selector.kind, &summary);

        if persist {
            if let Err(e) = self.config.save(self.config_path) {
                self.status = Some(format!("failed to save config: {e}"));
            } else if self.status.is_none() {
                self.status = Some("config saved".to_string());
            }
        }
    }
}

fn apply_status(kind: PortKind, summary: &OpenSummary) -> Option<String> {
    if summary.all_ok() {
        return None;
    }
    let failed: Vec<String> = summary
        .failed
        .iter()
        .map(|(name, e)| format!("{name} ({e})"))
        .collect();
    Some(format!("failed to open {}: {}", kind.label(), failed.join(", ")))
}
