//! Input handling and keybindings.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};

use crate::source::FilterAxis;

/// Everything the dispatcher can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// User asked to leave.
    Quit,
    /// SIGINT or SIGTERM arrived.
    Terminate,
    NavigateUp,
    NavigateDown,
    ScrollTop,
    ScrollBottom,
    HalfPageUp,
    HalfPageDown,
    PageUp,
    PageDown,
    Confirm,
    Back,
    TabForward,
    TabBackward,
    TogglePause,
    OpenSortMenu,
    OpenFilterMenu(FilterAxis),
    /// Refetch now, even while paused.
    Refresh,
    Resize(u16, u16),
}

/// Translates one terminal event. Unbound input yields `None`.
pub fn translate(event: &CrosstermEvent) -> Option<Command> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => translate_key(key),
        CrosstermEvent::Mouse(mouse) => translate_mouse(mouse),
        CrosstermEvent::Resize(w, h) => Some(Command::Resize(*w, *h)),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('d') => Some(Command::HalfPageDown),
            KeyCode::Char('u') => Some(Command::HalfPageUp),
            _ => None,
        };
    }

    let cmd = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('k') | KeyCode::Up => Command::NavigateUp,
        KeyCode::Char('j') | KeyCode::Down => Command::NavigateDown,
        KeyCode::Char('g') | KeyCode::Home => Command::ScrollTop,
        KeyCode::Char('G') | KeyCode::End => Command::ScrollBottom,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::PageDown => Command::PageDown,
        KeyCode::Enter => Command::Confirm,
        KeyCode::Esc => Command::Back,
        KeyCode::Tab => Command::TabForward,
        KeyCode::BackTab => Command::TabBackward,
        KeyCode::Char('p') | KeyCode::Char(' ') => Command::TogglePause,
        KeyCode::Char('r') => Command::Refresh,
        KeyCode::F(1) | KeyCode::Char('s') => Command::OpenSortMenu,
        KeyCode::F(2) => Command::OpenFilterMenu(FilterAxis::Namespace),
        KeyCode::F(3) => Command::OpenFilterMenu(FilterAxis::Node),
        KeyCode::F(4) => Command::OpenFilterMenu(FilterAxis::Status),
        _ => return None,
    };
    Some(cmd)
}

fn translate_mouse(mouse: &MouseEvent) -> Option<Command> {
    match mouse.kind {
        MouseEventKind::ScrollUp => Some(Command::NavigateUp),
        MouseEventKind::ScrollDown => Some(Command::NavigateDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> CrosstermEvent {
        key_with(code, KeyModifiers::NONE)
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(&key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            translate(&key_with(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn vim_and_arrow_navigation() {
        assert_eq!(translate(&key(KeyCode::Char('j'))), Some(Command::NavigateDown));
        assert_eq!(translate(&key(KeyCode::Down)), Some(Command::NavigateDown));
        assert_eq!(translate(&key(KeyCode::Char('k'))), Some(Command::NavigateUp));
        assert_eq!(translate(&key(KeyCode::Char('g'))), Some(Command::ScrollTop));
        assert_eq!(translate(&key(KeyCode::Char('G'))), Some(Command::ScrollBottom));
        assert_eq!(
            translate(&key_with(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Command::HalfPageDown)
        );
        assert_eq!(translate(&key(KeyCode::PageUp)), Some(Command::PageUp));
    }

    #[test]
    fn drill_and_menus() {
        assert_eq!(translate(&key(KeyCode::Enter)), Some(Command::Confirm));
        assert_eq!(translate(&key(KeyCode::Esc)), Some(Command::Back));
        assert_eq!(translate(&key(KeyCode::BackTab)), Some(Command::TabBackward));
        assert_eq!(translate(&key(KeyCode::F(1))), Some(Command::OpenSortMenu));
        assert_eq!(
            translate(&key(KeyCode::F(3))),
            Some(Command::OpenFilterMenu(FilterAxis::Node))
        );
        assert_eq!(translate(&key(KeyCode::Char('p'))), Some(Command::TogglePause));
    }

    #[test]
    fn release_and_unbound_keys_are_ignored() {
        let release = CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(translate(&release), None);
        assert_eq!(translate(&key(KeyCode::Char('x'))), None);
        assert_eq!(
            translate(&key_with(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn mouse_wheel_and_resize() {
        let wheel = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(&wheel), Some(Command::NavigateDown));
        assert_eq!(
            translate(&CrosstermEvent::Resize(120, 40)),
            Some(Command::Resize(120, 40))
        );
    }
}
