//! Selector state and rendering for the midithru TUI.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};

/// Terminal type alias used across TUI modules.
pub type Term = Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;

// ═════════════════════════════════════════════════════════════════════════════
// Port selector (checkbox list)
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

impl PortKind {
    pub fn label(self) -> &'static str {
        match self {
            PortKind::Input => "inputs",
            PortKind::Output => "outputs",
        }
    }
}

pub struct SelectorState {
    pub kind: PortKind,
    pub ports: Vec<String>,
    pub checked: Vec<bool>,
    pub cursor: usize,
}

impl SelectorState {
    /// Checkbox list over `ports`, pre-checking the names in `selected`.
    pub fn new(kind: PortKind, ports: Vec<String>, selected: &[String]) -> Self {
        let checked = ports.iter().map(|p| selected.contains(p)).collect();
        Self {
            kind,
            ports,
            checked,
            cursor: 0,
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.ports.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle(&mut self) {
        if let Some(c) = self.checked.get_mut(self.cursor) {
            *c = !*c;
        }
    }

    pub fn check_all(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = true);
    }

    pub fn check_none(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = false);
    }

    /// Checked names in display order. Duplicates cannot occur: each
    /// enumerated port appears once in the list.
    pub fn selected_names(&self) -> Vec<String> {
        self.ports
            .iter()
            .zip(&self.checked)
            .filter(|(_, &checked)| checked)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Rendering
// ═════════════════════════════════════════════════════════════════════════════

pub fn draw_main(
    frame: &mut Frame,
    inputs: &[String],
    outputs: &[String],
    log: &std::collections::VecDeque<String>,
    status: Option<&str>,
) {
    let area = frame.area();

    if area.width < 40 || area.height < 10 {
        let msg = Paragraph::new("Terminal too small!\nResize to at least 40x10.")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let outer = Block::default()
        .title("  MIDITHRU  ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::White));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let v_chunks = Layout::vertical([
        Constraint::Length(1), // selection header
        Constraint::Length(1), // separator
        Constraint::Min(3),    // event log
        Constraint::Length(1), // status
        Constraint::Length(1), // help
    ])
    .split(inner);

    let header = Line::from(vec![
        Span::styled(" in: ", Style::default().fg(Color::Cyan)),
        Span::raw(join_or_none(inputs)),
        Span::styled("  out: ", Style::default().fg(Color::Cyan)),
        Span::raw(join_or_none(outputs)),
    ]);
    frame.render_widget(Paragraph::new(header), v_chunks[0]);
    frame.render_widget(Block::default().borders(Borders::TOP), v_chunks[1]);

    draw_event_log(frame, v_chunks[2], log);

    if let Some(status) = status {
        let line = Paragraph::new(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(line, v_chunks[3]);
    }

    let help = Paragraph::new(help_line(&[
        ("I", "inputs"),
        ("O", "outputs"),
        ("C", "clear log"),
        ("Q", "quit"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(help, v_chunks[4]);
}

fn draw_event_log(frame: &mut Frame, area: Rect, log: &std::collections::VecDeque<String>) {
    if log.is_empty() {
        let msg = Paragraph::new(Span::styled(
            " (waiting for MIDI events)",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(msg, area);
        return;
    }

    // Newest at the bottom; show only what fits.
    let visible = area.height as usize;
    let items: Vec<ListItem> = log
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    frame.render_widget(List::new(items), area);
}

pub fn draw_selector(frame: &mut Frame, state: &SelectorState) {
    let area = frame.area();

    let outer = Block::default()
        .title(format!("  Select {}  ", state.kind.label()))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::White));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let v_chunks = Layout::vertical([
        Constraint::Length(1), // top padding
        Constraint::Min(3),    // checkbox list
        Constraint::Length(1), // help
    ])
    .split(inner);

    if state.ports.is_empty() {
        let msg = Paragraph::new(Span::styled(
            " (no ports found)",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(msg, v_chunks[1]);
    } else {
        let items: Vec<ListItem> = state
            .ports
            .iter()
            .zip(&state.checked)
            .enumerate()
            .map(|(i, (name, &checked))| {
                let cursor = if i == state.cursor { ">" } else { " " };
                let mark = if checked { "[x]" } else { "[ ]" };
                let style = if i == state.cursor {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Span::styled(format!("{cursor} {mark} {name}"), style))
            })
            .collect();
        frame.render_widget(List::new(items), v_chunks[1]);
    }

    let help = Paragraph::new(help_line(&[
        ("↑↓", "move"),
        ("Space", "toggle"),
        ("A", "all"),
        ("N", "none"),
        ("Enter", "apply"),
        ("S", "apply+save"),
        ("Esc", "cancel"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(help, v_chunks[2]);
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn help_line(entries: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, desc)) in entries.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw(format!(" {desc}")));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(selected: &[&str]) -> SelectorState {
        SelectorState::new(
            PortKind::Input,
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            &selected.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_prechecks_current_selection() {
        let state = selector(&["B"]);
        assert_eq!(state.checked, vec![false, true, false]);
        assert_eq!(state.selected_names(), vec!["B"]);
    }

    #[test]
    fn test_toggle_all_none() {
        let mut state = selector(&[]);
        state.toggle();
        assert_eq!(state.selected_names(), vec!["A"]);
        state.check_all();
        assert_eq!(state.selected_names(), vec!["A", "B", "C"]);
        state.check_none();
        assert!(state.selected_names().is_empty());
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut state = selector(&[]);
        state.cursor_up();
        assert_eq!(state.cursor, 0);
        for _ in 0..10 {
            state.cursor_down();
        }
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn test_empty_port_list_is_inert() {
        let mut state = SelectorState::new(PortKind::Output, Vec::new(), &[]);
        state.toggle();
        state.cursor_down();
        assert!(state.selected_names().is_empty());
        assert_eq!(state.cursor, 0);
    }
}
