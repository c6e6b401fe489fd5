use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::layout::Section;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    JumpToTop,
    JumpToBottom,
    /// Smooth scroll to a section (1-5 or a nav click)
    JumpTo(Section),
    /// Narrow-terminal navigation menu
    ToggleMenu,
    CloseMenu,
    NextLink,
    PrevLink,
    OpenLink,
    CarouselNext,
    CarouselPrev,
    /// Mouse wheel notches, positive = down
    Wheel(i32),
    PointerMoved { column: u16, row: u16 },
    Click { column: u16, row: u16 },
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    // While the menu is open Esc and q close it instead of quitting
    if app.menu_open {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => return Action::CloseMenu,
            _ => {}
        }
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::ScrollUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::ScrollUp,

        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ScrollHalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,
        (KeyCode::PageDown, _) => Action::ScrollHalfPageDown,
        (KeyCode::PageUp, _) => Action::ScrollHalfPageUp,

        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::JumpToTop,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::JumpToBottom,

        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Section::from_digit(c).map(Action::JumpTo).unwrap_or(Action::None)
        }

        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::ToggleMenu,

        (KeyCode::Tab, KeyModifiers::NONE) => Action::NextLink,
        (KeyCode::BackTab, _) => Action::PrevLink,
        (KeyCode::Enter, KeyModifiers::NONE) | (KeyCode::Char('o'), KeyModifiers::NONE) => {
            Action::OpenLink
        }

        (KeyCode::Char(']'), KeyModifiers::NONE) | (KeyCode::Right, KeyModifiers::NONE) => {
            Action::CarouselNext
        }
        (KeyCode::Char('['), KeyModifiers::NONE) | (KeyCode::Left, KeyModifiers::NONE) => {
            Action::CarouselPrev
        }

        (KeyCode::Esc, KeyModifiers::NONE) => Action::CloseMenu,

        _ => Action::None,
    }
}

/// Map mouse input onto actions
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel(1),
        MouseEventKind::ScrollUp => Action::Wheel(-1),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Action::PointerMoved {
            column: mouse.column,
            row: mouse.row,
        },
        MouseEventKind::Down(MouseButton::Left) => Action::Click {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use vitrine_core::{AppConfig, Profile};

    use crate::theme::Theme;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_mouse_mapping() {
        assert_eq!(handle_mouse_event(mouse(MouseEventKind::ScrollDown)), Action::Wheel(1));
        assert_eq!(handle_mouse_event(mouse(MouseEventKind::ScrollUp)), Action::Wheel(-1));
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Moved)),
            Action::PointerMoved { column: 7, row: 3 }
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::Click { column: 7, row: 3 }
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Right))),
            Action::None
        );
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[tokio::test]
    async fn test_key_mapping() {
        let mut app = App::new(
            Arc::new(AppConfig::default()),
            Profile::sample(),
            Theme::default(),
        )
        .unwrap();

        let none = KeyModifiers::NONE;
        assert_eq!(handle_key_event(press(KeyCode::Char('q'), none), &app), Action::Quit);
        assert_eq!(
            handle_key_event(press(KeyCode::Char('3'), none), &app),
            Action::JumpTo(Section::About)
        );
        assert_eq!(handle_key_event(press(KeyCode::Char('9'), none), &app), Action::None);
        assert_eq!(
            handle_key_event(press(KeyCode::Char('d'), KeyModifiers::CONTROL), &app),
            Action::ScrollHalfPageDown
        );
        assert_eq!(handle_key_event(press(KeyCode::Tab, none), &app), Action::NextLink);
        assert_eq!(handle_key_event(press(KeyCode::Char(']'), none), &app), Action::CarouselNext);

        app.menu_open = true;
        assert_eq!(handle_key_event(press(KeyCode::Char('q'), none), &app), Action::CloseMenu);
    }
}
