use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Line editing shared by every text input: printable characters append,
/// Backspace deletes, Ctrl+U clears, Ctrl+W drops the last word.
pub fn apply_text_input(target: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => target.clear(),
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            delete_last_word(target)
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => target.push(ch),
        KeyCode::Backspace => {
            target.pop();
        }
        _ => {}
    }
}

fn delete_last_word(value: &mut String) {
    let kept = value.trim_end().trim_end_matches(|ch: char| !ch.is_whitespace());
    let len = kept.len();
    value.truncate(len);
}

#[cfg(test)]
mod tests {
    use super::apply_text_input;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_and_backspace() {
        let mut value = String::new();
        apply_text_input(&mut value, key(KeyCode::Char('h')));
        apply_text_input(&mut value, key(KeyCode::Char('i')));
        assert_eq!(value, "hi");
        apply_text_input(&mut value, key(KeyCode::Backspace));
        assert_eq!(value, "h");
    }

    #[test]
    fn control_keys_edit_words() {
        let mut value = "type:meeting lead:jane ".to_string();
        apply_text_input(&mut value, ctrl('w'));
        assert_eq!(value, "type:meeting ");
        apply_text_input(&mut value, ctrl('x'));
        assert_eq!(value, "type:meeting ");
        apply_text_input(&mut value, ctrl('u'));
        assert!(value.is_empty());
    }
}
