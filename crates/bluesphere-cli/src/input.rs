use crate::controls::Controls;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Keyboard commands available while tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleRingLink,
}

/// Spawn a thread that turns key presses into [`Command`]s.
///
/// - Esc, q, Q or Ctrl+C: quit
/// - r, R: toggle Ring Link
pub fn spawn_keyboard_monitor(controls: Arc<Controls>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !controls.is_shutdown() {
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && let Some(command) = command_for(&key_event)
            {
                debug!("Key command: {:?}", command);
                match command {
                    Command::Quit => {
                        controls.shutdown();
                        break;
                    }
                    Command::ToggleRingLink => controls.request_ring_link_toggle(),
                }
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn command_for(event: &KeyEvent) -> Option<Command> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::ToggleRingLink),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        for key in [
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(command_for(&key), Some(Command::Quit));
        }
    }

    #[test]
    fn test_ring_link_key() {
        let key = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(command_for(&key), Some(Command::ToggleRingLink));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let key = KeyEvent::new_with_kind(KeyCode::Char('r'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(command_for(&key), None);
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(command_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(command_for(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), None);
    }
}
