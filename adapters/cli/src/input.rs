//! Keyboard input decoding for line-buffered terminals.

use percent_maze_core::Direction;
use tracing::debug;

/// Player intent decoded from one key or word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Move(Direction),
    Wait,
    Restart,
    Quit,
}

/// Decodes every action in `line`.
///
/// Accepts WASD keys, arrow-key escape sequences, `.` to wait, `r` to
/// restart, `q` to quit, and the spelled-out words for each.
pub(crate) fn parse_line(line: &str) -> Vec<Action> {
    let mut actions = Vec::new();
    for token in line.split_whitespace() {
        if let Some(action) = parse_word(token) {
            actions.push(action);
        } else {
            parse_keys(token, &mut actions);
        }
    }
    actions
}

fn parse_word(token: &str) -> Option<Action> {
    let action = match token.to_ascii_lowercase().as_str() {
        "up" => Action::Move(Direction::Up),
        "down" => Action::Move(Direction::Down),
        "left" => Action::Move(Direction::Left),
        "right" => Action::Move(Direction::Right),
        "wait" => Action::Wait,
        "restart" => Action::Restart,
        "quit" | "exit" => Action::Quit,
        _ => return None,
    };
    Some(action)
}

fn parse_keys(token: &str, actions: &mut Vec<Action>) {
    let mut chars = token.chars();
    while let Some(key) = chars.next() {
        let action = match key.to_ascii_lowercase() {
            'w' => Action::Move(Direction::Up),
            'a' => Action::Move(Direction::Left),
            's' => Action::Move(Direction::Down),
            'd' => Action::Move(Direction::Right),
            '.' => Action::Wait,
            'r' => Action::Restart,
            'q' => Action::Quit,
            '\u{1b}' => {
                let arrow = match (chars.next(), chars.next()) {
                    (Some('['), Some('A')) => Direction::Up,
                    (Some('['), Some('B')) => Direction::Down,
                    (Some('['), Some('C')) => Direction::Right,
                    (Some('['), Some('D')) => Direction::Left,
                    _ => continue,
                };
                Action::Move(arrow)
            }
            other => {
                debug!(key = ?other, "ignoring unmapped key");
                continue;
            }
        };
        actions.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_words_mix() {
        assert_eq!(
            parse_line("wd left .q"),
            vec![
                Action::Move(Direction::Up),
                Action::Move(Direction::Right),
                Action::Move(Direction::Left),
                Action::Wait,
                Action::Quit,
            ]
        );
    }

    #[test]
    fn arrow_escape_sequences() {
        assert_eq!(
            parse_line("\u{1b}[A\u{1b}[D"),
            vec![Action::Move(Direction::Up), Action::Move(Direction::Left)]
        );
    }

    #[test]
    fn unknown_keys_are_skipped() {
        assert_eq!(parse_line("xyz R"), vec![Action::Restart]);
    }
}
