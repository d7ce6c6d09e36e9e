use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dicetray::prelude::{Command, Direction};

/// One line of key help per group, shown in the footer.
pub const HELP: &[(&str, &str)] = &[
    ("r/space", "roll"),
    ("+/-", "add/remove"),
    ("1-8", "set count"),
    ("arrows", "select"),
    ("x", "lock"),
    ("a/u", "lock/unlock all"),
    ("0", "reset"),
    ("v", "validate"),
    ("q", "quit"),
];

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(Command::Quit),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter => Command::Roll,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::AddDie,
        KeyCode::Char('-') | KeyCode::Char('_') => Command::RemoveDie,
        KeyCode::Char(c @ '1'..='8') => Command::SetCount(c.to_digit(10)? as usize),
        KeyCode::Up | KeyCode::Char('k') => Command::Select(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Command::Select(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Command::Select(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Command::Select(Direction::Right),
        KeyCode::Char('x') => Command::ToggleLock,
        KeyCode::Char('a') => Command::LockAll,
        KeyCode::Char('u') => Command::UnlockAll,
        KeyCode::Char('0') => Command::Reset,
        KeyCode::Char('v') => Command::Validate,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_digits_set_count() {
        assert_eq!(
            command_for(key(KeyCode::Char('1'))),
            Some(Command::SetCount(1))
        );
        assert_eq!(
            command_for(key(KeyCode::Char('8'))),
            Some(Command::SetCount(8))
        );
        assert_eq!(command_for(key(KeyCode::Char('9'))), None);
        assert_eq!(command_for(key(KeyCode::Char('0'))), Some(Command::Reset));
    }

    #[test]
    fn test_roll_and_navigation() {
        for code in [KeyCode::Char('r'), KeyCode::Char(' '), KeyCode::Enter] {
            assert_eq!(command_for(key(code)), Some(Command::Roll));
        }
        assert_eq!(
            command_for(key(KeyCode::Left)),
            Some(Command::Select(Direction::Left))
        );
        assert_eq!(
            command_for(key(KeyCode::Char('j'))),
            Some(Command::Select(Direction::Down))
        );
    }

    #[test]
    fn test_control_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c), Some(Command::Quit));
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_r), None);
        // shifted symbols still arrive as plain chars
        let plus = KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT);
        assert_eq!(command_for(plus), Some(Command::AddDie));
    }
}
