//! Keyboard input mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::menu::ChooserAction;

/// Convert a keyboard event to a chooser action
pub fn key_to_action(key: KeyEvent) -> Option<ChooserAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(ChooserAction::Abort),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(ChooserAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(ChooserAction::Down),
        KeyCode::PageUp => Some(ChooserAction::PageUp),
        KeyCode::PageDown => Some(ChooserAction::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(ChooserAction::Home),
        KeyCode::End | KeyCode::Char('G') => Some(ChooserAction::End),
        KeyCode::Right | KeyCode::Char('l') => Some(ChooserAction::Expand),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => Some(ChooserAction::Collapse),
        KeyCode::Char(' ') => Some(ChooserAction::Toggle),
        KeyCode::Char('i') => Some(ChooserAction::Include),
        KeyCode::Char('e') => Some(ChooserAction::Exclude),
        KeyCode::Char('n') => Some(ChooserAction::EditNotes),
        KeyCode::Enter | KeyCode::Char('q') => Some(ChooserAction::Done),
        KeyCode::Esc => Some(ChooserAction::Abort),
        _ => None,
    }
}
