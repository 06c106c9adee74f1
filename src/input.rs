//! Key bindings (normal and vim-style) and mouse button mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Start a drag at the cursor, or release it when one is live.
    Grab,
    Release,
    PopLast,
    Restart,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Char(' ') => Action::Grab,
        KeyCode::Enter => Action::Release,
        KeyCode::Backspace | KeyCode::Char('u') => Action::PopLast,
        KeyCode::Char('r' | 'R') => Action::Restart,
        _ => Action::None,
    }
}

/// Mouse gesture, before translation to a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseIntent {
    Press,
    Drag,
    Release,
    /// Right click: drop the last pick.
    Secondary,
}

pub fn mouse_to_intent(kind: MouseEventKind) -> Option<MouseIntent> {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(MouseIntent::Press),
        MouseEventKind::Drag(MouseButton::Left) => Some(MouseIntent::Drag),
        MouseEventKind::Up(MouseButton::Left) => Some(MouseIntent::Release),
        MouseEventKind::Down(MouseButton::Right) => Some(MouseIntent::Secondary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vim_keys_agree() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::CursorLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::CursorLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::CursorDown);
    }

    #[test]
    fn ctrl_c_quits_other_chords_ignored() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(ctrl('h')), Action::None);
    }

    #[test]
    fn mouse_buttons() {
        assert_eq!(
            mouse_to_intent(MouseEventKind::Down(MouseButton::Left)),
            Some(MouseIntent::Press)
        );
        assert_eq!(
            mouse_to_intent(MouseEventKind::Down(MouseButton::Right)),
            Some(MouseIntent::Secondary)
        );
        assert_eq!(mouse_to_intent(MouseEventKind::Moved), None);
    }
}
