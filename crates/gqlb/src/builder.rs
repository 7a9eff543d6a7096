//! The interactive loop: redraw, scrolling, titles, the status line, the
//! help overlay, and schema reloads. The tree does the actual editing; this
//! is the glue between it, the terminal and the database.

use anyhow::Result;
use gqlb_tree::{Cursor, Key, Screen, Style, Tree};

use crate::database::Database;
use crate::endpoint;
use crate::screen::{Input, TerminalScreen};

const HELP_TEXT: &str = "\
Move:              <Left>, <Right>, <Up> and <Down>
                   <Page-Up> and <Page-Down>
                   <Meta-<> and <Meta->>
                   <Tab>
Select:            <Space>
Variable:          v
Delete list item:  <Backspace>
Execute:           <Enter>
Reload schema:     r
Help:              h or ?
Quit:              q";

const HELP_NCOLS: i32 = 55;
const PAGE_LINES: usize = 10;

enum KeyAction {
    Pass,
    Finalize,
    Quit,
}

enum Outcome {
    Continue,
    Done(String),
    Quit,
}

pub struct QueryBuilder {
    endpoint: String,
    query_name: Option<String>,
    headers: Vec<(String, String)>,
    verify: bool,
    variables: Vec<String>,
    database: Database,
    tree: Option<Tree>,
    show_help: bool,
    show_fetching_schema: bool,
    y_offset: i32,
    error: Option<String>,
}

impl QueryBuilder {
    pub fn new(
        endpoint: String,
        query_name: Option<String>,
        headers: Vec<(String, String)>,
        verify: bool,
        variables: Vec<String>,
        database: Database,
    ) -> Self {
        let tree = database
            .read(&endpoint, query_name.as_deref())
            .ok()
            .and_then(|saved| Tree::from_json(&saved).ok());
        let show_fetching_schema = tree.is_none();

        Self {
            endpoint,
            query_name,
            headers,
            verify,
            variables,
            database,
            tree,
            show_help: false,
            show_fetching_schema,
            y_offset: 1,
            error: None,
        }
    }

    /// Run the builder until the user finalizes a query with Enter or
    /// quits. Either way the tree is written back to the database.
    pub fn run(&mut self) -> Result<Option<String>> {
        let result = {
            let mut screen = TerminalScreen::enter()?;

            self.refresh_view(&mut screen)?;

            loop {
                let input = screen.next_input()?;

                match self.update(&mut screen, input)? {
                    Outcome::Continue => {}
                    Outcome::Done(query) => break Some(query),
                    Outcome::Quit => break None,
                }
            }
        };

        self.write_tree()?;

        Ok(result)
    }

    fn update(&mut self, screen: &mut TerminalScreen, input: Input) -> Result<Outcome> {
        if self.show_help {
            match input {
                Input::Key(Key::Char('h' | '?')) => self.show_help = false,
                Input::Key(Key::Char('q')) => return Ok(Outcome::Quit),
                _ => {}
            }
        } else {
            match self.update_key(input) {
                KeyAction::Pass => {}
                KeyAction::Quit => return Ok(Outcome::Quit),
                KeyAction::Finalize => {
                    if let Some(outcome) = self.finalize() {
                        return Ok(outcome);
                    }
                }
            }
        }

        self.refresh_view(screen)?;

        Ok(Outcome::Continue)
    }

    /// Serialize and parse-check the query under the cursor. `None` keeps
    /// the loop going with the failure on the status line.
    fn finalize(&mut self) -> Option<Outcome> {
        let mut message = None;
        let mut finalized = None;

        if let Some(tree) = &mut self.tree {
            match tree.query() {
                Ok(text) => finalized = Some(text),
                Err(error) => {
                    message = Some(error.to_string());

                    if let Some(node) = error.node() {
                        tree.focus(node);
                    }
                }
            }
        }

        if let Some(text) = finalized {
            match parse_error(&text) {
                None => return Some(Outcome::Done(text)),
                Some(diagnostic) => message = Some(diagnostic),
            }
        }

        self.error = message;

        None
    }

    fn update_key(&mut self, input: Input) -> KeyAction {
        let Some(tree) = &mut self.tree else {
            return KeyAction::Pass;
        };

        match input {
            Input::PageUp => {
                for _ in 0..PAGE_LINES {
                    tree.key_up();
                }
            }
            Input::PageDown => {
                for _ in 0..PAGE_LINES {
                    tree.key_down();
                }
            }
            Input::Resize => {}
            Input::Key(key) => match key {
                Key::Up => tree.key_up(),
                Key::Down => tree.key_down(),
                Key::Left => tree.key_left(),
                Key::Right => tree.key_right(),
                Key::Space => tree.select(),
                Key::Enter => return KeyAction::Finalize,
                Key::Meta('<') => tree.go_to_begin(),
                Key::Meta('>') => tree.go_to_end(),
                key => {
                    if !tree.key(key) {
                        match key {
                            Key::Char('h' | '?') => self.show_help = true,
                            Key::Char('r') => self.show_fetching_schema = true,
                            Key::Char('q') => return KeyAction::Quit,
                            _ => {}
                        }
                    }
                }
            },
        }

        KeyAction::Pass
    }

    fn refresh_view(&mut self, screen: &mut TerminalScreen) -> Result<()> {
        if self.show_fetching_schema {
            self.fetch_schema(screen)?;
            self.show_fetching_schema = false;
        }

        if self.show_help {
            self.draw_help(screen);
        } else {
            self.draw_selector(screen);
        }

        Ok(())
    }

    /// Fetch the schema, rebuild the tree, and restore as much of the old
    /// state as the new schema allows.
    fn fetch_schema(&mut self, screen: &mut TerminalScreen) -> Result<()> {
        self.draw_fetching(screen);

        let schema = endpoint::fetch_schema(&self.endpoint, &self.headers, self.verify)?;
        let mut tree = Tree::from_introspection(schema)?;

        if let Some(old) = &self.tree {
            let _ = tree.restore(&old.to_json());
        }

        self.tree = Some(tree);

        Ok(())
    }

    fn draw_selector(&mut self, screen: &mut TerminalScreen) {
        let Some(mut tree) = self.tree.take() else {
            return;
        };

        let cursor = loop {
            screen.erase();
            let (y_max, x_max) = screen.size();
            draw_variables(screen, &self.variables, x_max);
            let (y, cursor) = tree.draw(screen, self.y_offset, 2);

            if y == self.y_offset {
                self.draw_frame(screen, &tree, &cursor, y_max, x_max, y);
                break cursor;
            }

            if cursor.y < 1 {
                self.y_offset += 10;

                if self.y_offset > 1 {
                    self.y_offset = 1;
                }
            } else if cursor.y >= y_max - 1 {
                self.y_offset -= (y - cursor.y).min(10);
            } else {
                self.draw_frame(screen, &tree, &cursor, y_max, x_max, y);
                break cursor;
            }
        };

        if cursor.y == 0 {
            screen.set_cursor_visible(false);
        } else {
            screen.set_cursor_visible(true);
            screen.move_to(cursor.y, cursor.x);
        }

        screen.refresh();
        self.tree = Some(tree);
    }

    fn draw_frame(
        &mut self,
        screen: &mut TerminalScreen,
        tree: &Tree,
        cursor: &Cursor,
        y_max: i32,
        x_max: i32,
        y: i32,
    ) {
        for i in 0..y {
            screen.addstr(i, 0, "│", Style::Frame);
        }

        screen.addstr(0, 0, &" ".repeat(x_max.max(0) as usize), Style::Default);
        screen.addstr(
            0,
            x_max - self.endpoint.chars().count() as i32,
            &self.endpoint,
            Style::Default,
        );

        let query_active = cursor.y_mutation.map_or(true, |header| cursor.y < header);

        draw_title(screen, 0, "Query", query_active.then_some(tree));

        if let Some(header) = cursor.y_mutation {
            screen.addstr((header - 1).max(0), 0, " ", Style::Default);
            draw_title(
                screen,
                header.max(0),
                "Mutation",
                (!query_active).then_some(tree),
            );
        }

        screen.addstr(y_max - 1, 0, &" ".repeat(x_max.max(0) as usize), Style::Default);

        if let Some(error) = self.error.take() {
            screen.addstr(y_max - 1, 0, &error, Style::Error);
        }
    }

    fn draw_help(&self, screen: &mut TerminalScreen) {
        screen.set_cursor_visible(false);
        screen.erase();

        let (y_max, x_max) = screen.size();
        let margin = ((x_max - HELP_NCOLS) / 2).max(0);
        let line = "─".repeat((HELP_NCOLS - 2) as usize);
        let mut row = ((y_max - 6) / 2).min(y_max / 3).max(0);

        screen.addstr(row, margin, &format!("┌{line}┐"), Style::Frame);
        screen.addstr(row, margin + 1, " Help ", Style::Default);
        row += 1;

        for help_line in HELP_TEXT.lines() {
            screen.addstr(row, margin, "│", Style::Frame);
            screen.addstr(row, margin + HELP_NCOLS - 1, "│", Style::Frame);
            screen.addstr(row, margin + 2, help_line, Style::Default);
            row += 1;
        }

        screen.addstr(row, margin, &format!("└{line}┘"), Style::Frame);
        screen.refresh();
    }

    fn draw_fetching(&self, screen: &mut TerminalScreen) {
        screen.set_cursor_visible(false);
        screen.erase();

        let message = format!("Fetching schema from '{}'...", self.endpoint);
        let (y_max, x_max) = screen.size();
        let col = ((x_max - message.chars().count() as i32 - 4) / 2).max(0);
        let row = ((y_max - 6) / 2).min(y_max / 3).max(0);
        let line = "─".repeat(message.chars().count());
        let space = " ".repeat(message.chars().count());

        screen.addstr(row, col, &format!("┌─{line}─┐"), Style::Frame);
        screen.addstr(row + 1, col, &format!("│ {space} │"), Style::Frame);
        screen.addstr(row + 2, col, &format!("│ {space} │"), Style::Frame);
        screen.addstr(row + 2, col + 2, &message, Style::Default);
        screen.addstr(row + 3, col, &format!("│ {space} │"), Style::Frame);
        screen.addstr(row + 4, col, &format!("└─{line}─┘"), Style::Frame);
        screen.refresh();
    }

    fn write_tree(&self) -> Result<()> {
        if let Some(tree) = &self.tree {
            self.database
                .write(&self.endpoint, self.query_name.as_deref(), &tree.to_json())?;
        }

        Ok(())
    }
}

fn draw_title(screen: &mut TerminalScreen, y: i32, kind: &str, tree: Option<&Tree>) {
    screen.addstr(y, 0, "╭─ ", Style::Frame);

    let mut x = 3;
    screen.addstr(y, x, kind, Style::Default);
    x += kind.chars().count() as i32;

    let Some(tree) = tree else { return };

    let cursor_type = tree.cursor_type().to_string();

    if cursor_type.is_empty() {
        return;
    }

    screen.addstr(y, x, " ─ ", Style::Frame);
    x += 3;
    screen.addstr(y, x, &cursor_type, Style::Default);
    x += cursor_type.chars().count() as i32;

    if let Some(description) = tree.cursor_description() {
        let first_line = description.lines().next().unwrap_or_default();

        if !first_line.is_empty() {
            screen.addstr(y, x, " ─ ", Style::Frame);
            screen.addstr(y, x + 3, first_line, Style::Default);
        }
    }
}

fn draw_variables(screen: &mut TerminalScreen, variables: &[String], x_max: i32) {
    if variables.is_empty() {
        return;
    }

    let width = variables
        .iter()
        .map(|variable| variable.chars().count())
        .max()
        .unwrap_or(0) as i32;
    let col = (x_max - width - 5).max(0);
    let mut row = 2;

    screen.addstr(row, col, "┌─ ", Style::Frame);
    screen.addstr(row, col + 3, "Variables ", Style::Default);
    screen.addstr(
        row,
        col + 13,
        &format!("{}┐", "─".repeat((width as usize).saturating_sub(10))),
        Style::Frame,
    );
    row += 1;

    for variable in variables {
        screen.addstr(row, col, "│", Style::Frame);
        screen.addstr(row, col + 2, variable, Style::Default);
        screen.addstr(row, col + width + 3, "│", Style::Frame);
        row += 1;
    }

    screen.addstr(
        row,
        col,
        &format!("└{}┘", "─".repeat(width as usize + 2)),
        Style::Frame,
    );
}

/// Parse the emitted operation; the first diagnostic, if any, goes to the
/// status line.
fn parse_error(text: &str) -> Option<String> {
    let parsed = apollo_parser::Parser::new(text).parse();

    parsed.errors().next().map(|error| error.message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accepts_well_formed_operations() {
        assert_eq!(parse_error("query Query {a {b c}}"), None);
    }

    #[test]
    fn it_reports_parse_diagnostics() {
        assert!(parse_error("query Query {a {b").is_some());
    }
}
