use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key gesture after mapping, independent of the key that produced it.
///
/// `Up`/`Down` mean history navigation when the command panel has focus and
/// scrolling when an output panel does; the state decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    Submit,
    Up,
    Down,
    PageUp,
    PageDown,
    CycleFocus,
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    KillToStart,
    KillToEnd,
}

pub fn map_key(key: KeyEvent) -> Option<UiAction> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') => Some(UiAction::Quit),
            KeyCode::Char('a') => Some(UiAction::CursorHome),
            KeyCode::Char('e') => Some(UiAction::CursorEnd),
            KeyCode::Char('u') => Some(UiAction::KillToStart),
            KeyCode::Char('k') => Some(UiAction::KillToEnd),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(UiAction::Quit),
        KeyCode::Enter => Some(UiAction::Submit),
        KeyCode::Up => Some(UiAction::Up),
        KeyCode::Down => Some(UiAction::Down),
        KeyCode::PageUp => Some(UiAction::PageUp),
        KeyCode::PageDown => Some(UiAction::PageDown),
        KeyCode::Tab => Some(UiAction::CycleFocus),
        KeyCode::Left => Some(UiAction::CursorLeft),
        KeyCode::Right => Some(UiAction::CursorRight),
        KeyCode::Home => Some(UiAction::CursorHome),
        KeyCode::End => Some(UiAction::CursorEnd),
        KeyCode::Backspace => Some(UiAction::Backspace),
        KeyCode::Delete => Some(UiAction::Delete),
        KeyCode::Char(c) => Some(UiAction::Insert(c)),
        _ => None,
    }
}
