//! Cursor-positioned editing of argument values.
//!
//! A deliberately small readline subset: the commands the interactive
//! client binds, applied as a pure function over `(text, caret)`.

/// One editing command, already decoded from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert a character at the caret.
    Insert(char),
    /// Delete the character before the caret.
    Backspace,
    /// Delete the character under the caret (ctrl-d).
    Delete,
    /// Caret to the start of the line (ctrl-a).
    Home,
    /// Caret to the end of the line (ctrl-e).
    End,
    /// Delete from the caret to the end of the line (ctrl-k).
    KillToEnd,
    /// Swap the characters around the caret (ctrl-t).
    Transpose,
    /// Caret to the start of the current or previous word (meta-b).
    WordLeft,
    /// Caret past the end of the current or next word (meta-f).
    WordRight,
    /// Delete to the end of the current or next word (meta-d).
    KillWord,
    /// Delete to the start of the current or previous word
    /// (meta-backspace).
    KillWordBack,
    /// Caret one character left.
    Left,
    /// Caret one character right.
    Right,
}

/// Apply one command to `text` with the caret at `pos` (in characters) and
/// return the updated text and caret.
///
/// ### Example
/// ```rust
/// use gqlb_tree::{edit, EditCommand};
///
/// let (text, pos) = edit("fo", 2, EditCommand::Insert('o'));
/// assert_eq!((text.as_str(), pos), ("foo", 3));
///
/// let (text, pos) = edit(&text, pos, EditCommand::WordLeft);
/// assert_eq!((text.as_str(), pos), ("foo", 0));
/// ```
pub fn edit(text: &str, pos: usize, command: EditCommand) -> (String, usize) {
    let mut chars: Vec<char> = text.chars().collect();
    let mut pos = pos.min(chars.len());

    match command {
        EditCommand::Insert(c) => {
            chars.insert(pos, c);
            pos += 1;
        }
        EditCommand::Backspace => {
            if pos > 0 {
                chars.remove(pos - 1);
                pos -= 1;
            }
        }
        EditCommand::Delete => {
            if pos < chars.len() {
                chars.remove(pos);
            }
        }
        EditCommand::Home => pos = 0,
        EditCommand::End => pos = chars.len(),
        EditCommand::KillToEnd => chars.truncate(pos),
        EditCommand::Transpose => {
            if chars.len() >= 2 && pos > 0 {
                if pos == chars.len() {
                    chars.swap(pos - 2, pos - 1);
                } else {
                    chars.swap(pos - 1, pos);
                    pos += 1;
                }
            }
        }
        EditCommand::WordLeft => pos = word_left(&chars, pos),
        EditCommand::WordRight => pos = word_right(&chars, pos),
        EditCommand::KillWord => {
            let end = word_right(&chars, pos);
            chars.drain(pos..end);
        }
        EditCommand::KillWordBack => {
            let start = word_left(&chars, pos);
            chars.drain(start..pos);
            pos = start;
        }
        EditCommand::Left => pos = pos.saturating_sub(1),
        EditCommand::Right => pos = (pos + 1).min(chars.len()),
    }

    (chars.into_iter().collect(), pos)
}

fn word_left(chars: &[char], mut pos: usize) -> usize {
    while pos > 0 && !chars[pos - 1].is_alphanumeric() {
        pos -= 1;
    }
    while pos > 0 && chars[pos - 1].is_alphanumeric() {
        pos -= 1;
    }

    pos
}

fn word_right(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && !chars[pos].is_alphanumeric() {
        pos += 1;
    }
    while pos < chars.len() && chars[pos].is_alphanumeric() {
        pos += 1;
    }

    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(text: &str, pos: usize, command: EditCommand) -> (String, usize) {
        edit(text, pos, command)
    }

    #[test]
    fn it_inserts_at_the_caret() {
        assert_eq!(apply("ac", 1, EditCommand::Insert('b')), ("abc".into(), 2));
        assert_eq!(apply("", 0, EditCommand::Insert('x')), ("x".into(), 1));
    }

    #[test]
    fn it_deletes_backwards_and_forwards() {
        assert_eq!(apply("abc", 2, EditCommand::Backspace), ("ac".into(), 1));
        assert_eq!(apply("abc", 0, EditCommand::Backspace), ("abc".into(), 0));
        assert_eq!(apply("abc", 1, EditCommand::Delete), ("ac".into(), 1));
        assert_eq!(apply("abc", 3, EditCommand::Delete), ("abc".into(), 3));
    }

    #[test]
    fn it_moves_to_line_ends() {
        assert_eq!(apply("abc", 2, EditCommand::Home), ("abc".into(), 0));
        assert_eq!(apply("abc", 1, EditCommand::End), ("abc".into(), 3));
    }

    #[test]
    fn it_kills_to_end_of_line() {
        assert_eq!(apply("abcdef", 3, EditCommand::KillToEnd), ("abc".into(), 3));
        assert_eq!(apply("abc", 3, EditCommand::KillToEnd), ("abc".into(), 3));
    }

    #[test]
    fn it_transposes_characters() {
        assert_eq!(apply("ab", 1, EditCommand::Transpose), ("ba".into(), 2));
        assert_eq!(apply("ab", 2, EditCommand::Transpose), ("ba".into(), 2));
        assert_eq!(apply("a", 1, EditCommand::Transpose), ("a".into(), 1));
        assert_eq!(apply("ab", 0, EditCommand::Transpose), ("ab".into(), 0));
    }

    #[test]
    fn it_moves_by_words() {
        assert_eq!(apply("foo bar", 7, EditCommand::WordLeft), ("foo bar".into(), 4));
        assert_eq!(apply("foo bar", 4, EditCommand::WordLeft), ("foo bar".into(), 0));
        assert_eq!(apply("foo bar", 0, EditCommand::WordRight), ("foo bar".into(), 3));
        assert_eq!(apply("foo bar", 3, EditCommand::WordRight), ("foo bar".into(), 7));
    }

    #[test]
    fn it_kills_words() {
        assert_eq!(apply("foo bar", 0, EditCommand::KillWord), (" bar".into(), 0));
        assert_eq!(apply("foo bar", 3, EditCommand::KillWord), ("foo".into(), 3));
        assert_eq!(apply("foo bar", 7, EditCommand::KillWordBack), ("foo ".into(), 4));
        assert_eq!(apply("foo bar", 4, EditCommand::KillWordBack), ("bar".into(), 0));
    }

    #[test]
    fn it_clamps_the_caret() {
        assert_eq!(apply("abc", 0, EditCommand::Left), ("abc".into(), 0));
        assert_eq!(apply("abc", 3, EditCommand::Right), ("abc".into(), 3));
        assert_eq!(apply("abc", 99, EditCommand::Left), ("abc".into(), 2));
    }
}
