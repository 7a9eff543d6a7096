use crate::node::{NodeId, NodeKind};
use crate::tree::Tree;

/// Where drawn text goes. The terminal client implements this over its
/// backend; tests implement it over a character grid.
pub trait Screen {
    /// Place `text` at `(y, x)`. Out-of-range coordinates are ignored, which
    /// is what makes scrolling by drawing at a negative offset work.
    fn addstr(&mut self, y: i32, x: i32, text: &str, style: Style);
}

/// Rendering hints for a piece of drawn text. The backend decides what they
/// look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Default,
    /// Expansion and selection glyphs: `▼`, `▶`, `■`, `□`.
    Marker,
    /// Argument symbols: `■`, `□`, `●`, `$`.
    Symbol,
    /// Argument values.
    Value,
    /// De-emphasized text: deprecated names, completion hints.
    Dim,
    /// Window dressing drawn by the controller.
    Frame,
    /// The status line message.
    Error,
}

/// Where the cursor ended up in a draw pass.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    pub y: i32,
    pub x: i32,
    /// The y reserved for the "Mutation" header, when the schema has
    /// mutation fields.
    pub y_mutation: Option<i32>,
}

impl Tree {
    /// Render the tree with its top-left corner at `(y, x)` and report the y
    /// after the last drawn line together with the cursor position.
    ///
    /// Drawing under an expanded ancestor is one of the observations that
    /// materializes pending children.
    pub fn draw(&mut self, screen: &mut dyn Screen, y: i32, x: i32) -> (i32, Cursor) {
        let mut cursor = Cursor::default();
        let y_end = self.draw_node(self.root, screen, y, x, &mut cursor);

        (y_end, cursor)
    }

    fn draw_node(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        match &self.node(id).kind {
            NodeKind::Object(object) if object.is_root => self.draw_root(id, screen, y, x, cursor),
            NodeKind::Object(_) => self.draw_object(id, screen, y, x, cursor),
            NodeKind::Leaf(_) => self.draw_leaf(id, screen, y, x, cursor),
            NodeKind::ListItem(_) => self.draw_list_item(id, screen, y, x, cursor),
            _ => self.draw_argument(id, screen, y, x, cursor),
        }
    }

    fn draw_root(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        mut y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        let number_of_query_fields = match &self.node(id).kind {
            NodeKind::Object(object) => object.number_of_query_fields,
            _ => 0,
        };
        let fields = self.children_of(id).to_vec();

        for (i, &field) in fields.iter().enumerate() {
            if i == number_of_query_fields {
                y += 1;
                cursor.y_mutation = Some(y);
                y += 1;
            }

            y = self.draw_node(field, screen, y, x, cursor);
        }

        y
    }

    fn draw_object(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        mut y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        let (name, is_expanded, is_deprecated) = match &self.node(id).kind {
            NodeKind::Object(object) => (
                object.name.clone(),
                object.is_expanded,
                object.is_deprecated,
            ),
            _ => return y,
        };

        self.place_cursor(id, y, x, cursor);

        let glyph = if is_expanded { "▼" } else { "▶" };
        screen.addstr(y, x, glyph, Style::Marker);
        screen.addstr(y, x + 2, &name, name_style(is_deprecated));
        y += 1;

        if is_expanded {
            self.ensure_children(id);

            for field in self.children_of(id).to_vec() {
                y = self.draw_node(field, screen, y, x + 2, cursor);
            }
        }

        y
    }

    fn draw_leaf(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        mut y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        let (name, is_selected, is_deprecated) = match &self.node(id).kind {
            NodeKind::Leaf(leaf) => (leaf.name.clone(), leaf.is_selected, leaf.is_deprecated),
            _ => return y,
        };

        self.place_cursor(id, y, x, cursor);

        let glyph = if is_selected { "■" } else { "□" };
        screen.addstr(y, x, glyph, Style::Marker);
        screen.addstr(y, x + 2, &name, name_style(is_deprecated));
        y += 1;

        self.ensure_children(id);

        if self.node(id).child.is_some() {
            for argument in self.children_of(id).to_vec() {
                y = self.draw_node(argument, screen, y, x + 2, cursor);
            }
        }

        y
    }

    fn draw_argument(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        mut y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        let (name, symbol, is_variable, value, pos) = match self.node(id).kind.argument() {
            Some(base) => (
                base.name.clone(),
                base.symbol,
                base.is_variable,
                base.value.clone(),
                base.pos,
            ),
            None => return y,
        };

        if self.cursor == Some(id) {
            cursor.y = y;
            cursor.x = if self.cursor_at_input_field {
                x + width(&name) + 4 + pos as i32
            } else {
                x
            };
        }

        let glyph = if is_variable { "$" } else { symbol.glyph() };
        screen.addstr(y, x, glyph, Style::Symbol);
        screen.addstr(y, x + 2, &format!("{name}:"), Style::Default);

        let value_x = x + width(&name) + 4;
        let draw_value = is_variable
            || matches!(
                self.node(id).kind,
                NodeKind::Scalar(_) | NodeKind::Enum(_)
            );

        if draw_value {
            screen.addstr(y, value_x, &value, Style::Value);
        }

        if !is_variable {
            if let NodeKind::Enum(argument) = &self.node(id).kind {
                if !argument.members.iter().any(|member| member == &value) {
                    let hint: Vec<&str> = argument
                        .members
                        .iter()
                        .filter(|member| member.starts_with(&value))
                        .map(String::as_str)
                        .collect();

                    if !hint.is_empty() {
                        screen.addstr(
                            y,
                            value_x + width(&value) + 1,
                            &format!("({})", hint.join(", ")),
                            Style::Dim,
                        );
                    }
                }
            }
        }

        y += 1;

        self.ensure_children(id);

        if self.node(id).child.is_some() {
            for child in self.children_of(id).to_vec() {
                y = self.draw_node(child, screen, y, x + 2, cursor);
            }
        }

        y
    }

    fn draw_list_item(
        &mut self,
        id: NodeId,
        screen: &mut dyn Screen,
        mut y: i32,
        x: i32,
        cursor: &mut Cursor,
    ) -> i32 {
        let is_expanded = match &self.node(id).kind {
            NodeKind::ListItem(item) => item.is_expanded,
            _ => return y,
        };

        self.place_cursor(id, y, x, cursor);

        let glyph = if is_expanded { "▼" } else { "▶" };
        let label = if self.node(id).next.is_none() {
            "...".to_string()
        } else {
            format!("[{}]", self.item_index(id))
        };

        screen.addstr(y, x, glyph, Style::Marker);
        screen.addstr(y, x + 2, &label, Style::Default);
        y += 1;

        self.ensure_children(id);

        if let Some(inner) = self.node(id).child {
            y = self.draw_node(inner, screen, y, x + 2, cursor);
        }

        y
    }

    fn place_cursor(&self, id: NodeId, y: i32, x: i32, cursor: &mut Cursor) {
        if self.cursor == Some(id) {
            cursor.y = y;
            cursor.x = x;
        }
    }

    fn item_index(&self, id: NodeId) -> usize {
        let mut index = 0;
        let mut prev = self.node(id).prev;

        while let Some(p) = prev {
            index += 1;
            prev = self.node(p).prev;
        }

        index
    }
}

fn name_style(is_deprecated: bool) -> Style {
    if is_deprecated {
        Style::Dim
    } else {
        Style::Default
    }
}

fn width(text: &str) -> i32 {
    text.chars().count() as i32
}
