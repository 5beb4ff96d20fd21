use bibnav_engine::{Event, EventSource, Key, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Blocking reader of terminal events.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            match event::read()? {
                TermEvent::Key(key) => {
                    if let Some(event) = translate_key(key) {
                        return Ok(event);
                    }
                }
                TermEvent::Resize(width, height) => return Ok(Event::Resize { width, height }),
                _ => {}
            }
        }
    }
}

/// Map a terminal key to an engine event. Ctrl-C quits; other control
/// combinations and unsupported keys are dropped.
pub fn translate_key(key: KeyEvent) -> Option<Event> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Event::Quit),
            _ => None,
        };
    }

    let key = match key.code {
        KeyCode::Enter => Key::Char('\n'),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    Some(Event::Key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<Event> {
        translate_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_translates_navigation_keys() {
        assert_eq!(press(KeyCode::Char('j')), Some(Event::Key(Key::Char('j'))));
        assert_eq!(press(KeyCode::Enter), Some(Event::Key(Key::Char('\n'))));
        assert_eq!(press(KeyCode::PageDown), Some(Event::Key(Key::PageDown)));
        assert_eq!(press(KeyCode::Tab), None);
    }

    #[test]
    fn test_shifted_characters_pass_through() {
        let key = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(translate_key(key), Some(Event::Key(Key::Char('G'))));
    }

    #[test]
    fn test_ctrl_c_quits_and_releases_are_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_c), Some(Event::Quit));

        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_l), None);

        let release =
            KeyEvent::new_with_kind(KeyCode::Char('j'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(translate_key(release), None);
    }
}
