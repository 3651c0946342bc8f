use std::str::FromStr;

use anyhow::{anyhow, bail};

use crate::events::{ControlMessage, UiNotice};
use crate::history::ReadlineHistory;
use crate::tui::input::UiAction;

/// The three console panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Output,
    Aux,
    Command,
}

/// What the auxiliary panel shows: error output or the history of entered
/// commands. Chosen at startup, one or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxMode {
    Errors,
    History,
}

/// Top-to-bottom panel order plus the auxiliary panel's role, parsed from a
/// three-letter string: o=output, e=errors, h=history, c=command. Exactly
/// one of e/h, each panel exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelStack {
    pub order: [Panel; 3],
    pub aux_mode: AuxMode,
}

impl Default for PanelStack {
    fn default() -> Self {
        Self {
            order: [Panel::Output, Panel::Aux, Panel::Command],
            aux_mode: AuxMode::Errors,
        }
    }
}

impl FromStr for PanelStack {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let letters: Vec<char> = s.chars().collect();
        if letters.len() != 3 {
            bail!("panel order must be exactly three of o, e, h, c; got {s:?}");
        }
        let mut order = Vec::with_capacity(3);
        let mut aux_mode = None;
        for letter in letters {
            let panel = match letter {
                'o' => Panel::Output,
                'c' => Panel::Command,
                'e' | 'h' => {
                    let mode = if letter == 'e' {
                        AuxMode::Errors
                    } else {
                        AuxMode::History
                    };
                    if aux_mode.replace(mode).is_some() {
                        bail!("panel order {s:?} places more than one error/history panel");
                    }
                    Panel::Aux
                }
                other => bail!("unknown panel letter {other:?} in {s:?}"),
            };
            if order.contains(&panel) {
                bail!("panel order {s:?} repeats a panel");
            }
            order.push(panel);
        }
        let aux_mode = aux_mode.ok_or_else(|| {
            anyhow!("panel order {s:?} is missing an error (e) or history (h) panel")
        })?;
        Ok(Self {
            order: [order[0], order[1], order[2]],
            aux_mode,
        })
    }
}

/// All state behind the console: panel contents, focus, scroll positions,
/// the command line editor, and the readline history.
pub struct ConsoleState {
    pub stack: PanelStack,
    pub prompt: String,
    pub focus: Panel,
    pub general_lines: Vec<String>,
    pub aux_lines: Vec<String>,
    pub general_scroll: usize,
    pub aux_scroll: usize,
    pub input: String,
    pub cursor: usize,
    pub exit_requested: bool,
    history: ReadlineHistory,
    max_panel_lines: usize,
}

impl ConsoleState {
    pub fn new(stack: PanelStack, history_entries: usize, max_panel_lines: usize) -> Self {
        Self {
            stack,
            prompt: "Enter command>".to_string(),
            focus: Panel::Command,
            general_lines: Vec::new(),
            aux_lines: Vec::new(),
            general_scroll: 0,
            aux_scroll: 0,
            input: String::new(),
            cursor: 0,
            exit_requested: false,
            history: ReadlineHistory::new(history_entries),
            max_panel_lines,
        }
    }

    pub fn apply_message(&mut self, msg: &ControlMessage) {
        match msg {
            ControlMessage::AppendToGeneralOutput(line) => self.push_general(line.clone()),
            ControlMessage::AppendToErrorOutput(line) => self.push_error(line.clone()),
            ControlMessage::ReplaceCommandText(text) => self.replace_command_text(text.clone()),
        }
    }

    pub fn push_general(&mut self, line: String) {
        push_capped(&mut self.general_lines, line, self.max_panel_lines);
    }

    /// Error output lands in the auxiliary panel when it is an error panel;
    /// with a history panel in place it falls back to general output so the
    /// text is not lost.
    pub fn push_error(&mut self, line: String) {
        match self.stack.aux_mode {
            AuxMode::Errors => push_capped(&mut self.aux_lines, line, self.max_panel_lines),
            AuxMode::History => push_capped(&mut self.general_lines, line, self.max_panel_lines),
        }
    }

    pub fn replace_command_text(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.input = text;
    }

    /// Applies one mapped key gesture. Returns a notice when the gesture
    /// produced something the application must see.
    pub fn handle_action(&mut self, action: UiAction) -> Option<UiNotice> {
        match action {
            UiAction::Quit => {
                self.exit_requested = true;
                return Some(UiNotice::UiExited);
            }
            UiAction::CycleFocus => {
                self.focus = self.next_panel_in_stack();
                return None;
            }
            _ => {}
        }
        if self.focus == Panel::Command {
            self.handle_command_action(action)
        } else {
            self.handle_scroll_action(action);
            None
        }
    }

    fn next_panel_in_stack(&self) -> Panel {
        let pos = self
            .stack
            .order
            .iter()
            .position(|p| *p == self.focus)
            .unwrap_or(0);
        self.stack.order[(pos + 1) % 3]
    }

    fn handle_command_action(&mut self, action: UiAction) -> Option<UiNotice> {
        match action {
            UiAction::Submit => {
                let entered = self.input.trim().to_string();
                self.input.clear();
                self.cursor = 0;
                if entered.is_empty() {
                    self.history.reset_iteration();
                    return None;
                }
                if self.stack.aux_mode == AuxMode::History {
                    push_capped(&mut self.aux_lines, entered.clone(), self.max_panel_lines);
                }
                self.history.submit(entered.clone());
                Some(UiNotice::CommandEntered(entered))
            }
            UiAction::Up => {
                let recalled = self.history.up().to_string();
                self.replace_command_text(recalled);
                None
            }
            UiAction::Down => {
                let recalled = self.history.down().to_string();
                self.replace_command_text(recalled);
                None
            }
            UiAction::Insert(c) => {
                let at = self.byte_index(self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
                None
            }
            UiAction::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.input.remove(at);
                }
                None
            }
            UiAction::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.input.remove(at);
                }
                None
            }
            UiAction::CursorLeft => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            UiAction::CursorRight => {
                self.cursor = (self.cursor + 1).min(self.char_count());
                None
            }
            UiAction::CursorHome => {
                self.cursor = 0;
                None
            }
            UiAction::CursorEnd => {
                self.cursor = self.char_count();
                None
            }
            UiAction::KillToStart => {
                let at = self.byte_index(self.cursor);
                self.input = self.input[at..].to_string();
                self.cursor = 0;
                None
            }
            UiAction::KillToEnd => {
                let at = self.byte_index(self.cursor);
                self.input.truncate(at);
                None
            }
            UiAction::PageUp | UiAction::PageDown => None,
            UiAction::Quit | UiAction::CycleFocus => None,
        }
    }

    fn handle_scroll_action(&mut self, action: UiAction) {
        let (scroll, lines) = match self.focus {
            Panel::Output => (&mut self.general_scroll, self.general_lines.len()),
            Panel::Aux => (&mut self.aux_scroll, self.aux_lines.len()),
            Panel::Command => return,
        };
        match action {
            UiAction::Up => *scroll = scroll.saturating_sub(1),
            UiAction::Down => *scroll = (*scroll + 1).min(lines.saturating_sub(1)),
            UiAction::PageUp => *scroll = scroll.saturating_sub(10),
            UiAction::PageDown => *scroll = (*scroll + 10).min(lines.saturating_sub(1)),
            _ => {}
        }
    }

    pub fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

fn push_capped(lines: &mut Vec<String>, line: String, cap: usize) {
    lines.push(line);
    if lines.len() > cap {
        let drain = lines.len() - cap;
        lines.drain(0..drain);
    }
}
