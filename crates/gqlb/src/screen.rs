//! The crossterm backing of the tree's `Screen` trait, plus key decoding.

use std::io::{self, Stdout, Write};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use gqlb_tree::{Key, Screen, Style};

/// One decoded input event for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    PageUp,
    PageDown,
    Resize,
}

/// Raw-mode alternate-screen terminal. Restores the terminal on drop.
#[derive(Debug)]
pub struct TerminalScreen {
    out: Stdout,
}

impl TerminalScreen {
    pub fn enter() -> Result<Self> {
        let mut out = io::stdout();

        terminal::enable_raw_mode()?;
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;

        Ok(Self { out })
    }

    /// `(rows, columns)`.
    pub fn size(&self) -> (i32, i32) {
        let (columns, rows) = terminal::size().unwrap_or((80, 24));

        (rows as i32, columns as i32)
    }

    pub fn erase(&mut self) {
        let _ = queue!(self.out, terminal::Clear(terminal::ClearType::All));
    }

    pub fn move_to(&mut self, y: i32, x: i32) {
        if y >= 0 && x >= 0 {
            let _ = queue!(self.out, cursor::MoveTo(x as u16, y as u16));
        }
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        if visible {
            let _ = queue!(self.out, cursor::Show);
        } else {
            let _ = queue!(self.out, cursor::Hide);
        }
    }

    pub fn refresh(&mut self) {
        let _ = self.out.flush();
    }

    /// Block until the next event the controller cares about.
    pub fn next_input(&self) -> Result<Input> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(input) = decode(key) {
                        return Ok(input);
                    }
                }
                Event::Resize(..) => return Ok(Input::Resize),
                _ => {}
            }
        }
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = execute!(self.out, terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

impl Screen for TerminalScreen {
    fn addstr(&mut self, y: i32, x: i32, text: &str, style: Style) {
        if y < 0 || x < 0 {
            return;
        }

        let _ = queue!(self.out, cursor::MoveTo(x as u16, y as u16));

        match style {
            Style::Default => {}
            Style::Marker => {
                let _ = queue!(self.out, SetForegroundColor(Color::Yellow));
            }
            Style::Symbol | Style::Frame => {
                let _ = queue!(self.out, SetForegroundColor(Color::Cyan));
            }
            Style::Value => {
                let _ = queue!(self.out, SetForegroundColor(Color::Green));
            }
            Style::Dim => {
                let _ = queue!(self.out, SetForegroundColor(Color::DarkGrey));
            }
            Style::Error => {
                let _ = queue!(
                    self.out,
                    SetForegroundColor(Color::Red),
                    SetAttribute(Attribute::Bold)
                );
            }
        }

        let _ = queue!(self.out, Print(text), ResetColor);
        let _ = queue!(self.out, SetAttribute(Attribute::Reset));
    }
}

/// Map a crossterm key event onto the tree's key model. Events the tree has
/// no word for (function keys, media keys) decode to `None`.
fn decode(key: KeyEvent) -> Option<Input> {
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let decoded = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => return Some(Input::PageUp),
        KeyCode::PageDown => return Some(Input::PageDown),
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter => Key::Enter,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => {
            if alt {
                Key::MetaBackspace
            } else {
                Key::Backspace
            }
        }
        KeyCode::Char(c) => {
            if ctrl {
                Key::Ctrl(c)
            } else if alt {
                Key::Meta(c)
            } else if c == ' ' {
                Key::Space
            } else {
                Key::Char(c)
            }
        }
        _ => return None,
    };

    Some(Input::Key(decoded))
}
