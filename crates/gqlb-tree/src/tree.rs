use gqlb_introspection::{FullType, Introspection};
use indexmap::IndexMap;

use crate::edit::{edit, EditCommand};
use crate::node::{Node, NodeId, NodeKind, Symbol};

/// A decoded key event, as handed to the tree by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Space,
    Enter,
    Backspace,
    Delete,
    Home,
    End,
    Ctrl(char),
    Meta(char),
    MetaBackspace,
    Char(char),
}

/// What `KeyRight` does to the cursor node.
#[derive(Debug, Clone, Copy)]
enum RightAction {
    Expand,
    StepIn,
    Nothing,
}

/// The schema-derived selection tree and its navigation state machine.
///
/// A tree owns its node arena, the introspection document it was built from,
/// and the single cursor. All mutation goes through cursor-routed key
/// events; drawing and serialization read the same state between events.
#[derive(Debug)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) schema: Introspection,
    pub(crate) types: IndexMap<String, FullType>,
    pub(crate) root: NodeId,
    pub(crate) cursor: Option<NodeId>,
    /// The edit sub-mode: typed characters go to the cursor argument's line
    /// editor instead of the tree keybinds. Shared by all arguments.
    pub(crate) cursor_at_input_field: bool,
}

impl Tree {
    pub(crate) fn empty(schema: Introspection, types: IndexMap<String, FullType>) -> Self {
        Self {
            nodes: Vec::new(),
            schema,
            types,
            root: NodeId(0),
            cursor: None,
            cursor_at_input_field: false,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The materialized children of a node, in display order. Empty for
    /// nodes without children or with a still-pending descriptor.
    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Object(object) => object.fields.ready().unwrap_or(&[]),
            NodeKind::Leaf(leaf) => leaf.arguments.ready().unwrap_or(&[]),
            NodeKind::Input(input) => input.fields.ready().unwrap_or(&[]),
            NodeKind::List(list) => &list.items,
            _ => &[],
        }
    }

    /// Stringified GraphQL type of the cursor node.
    pub fn cursor_type(&self) -> &str {
        self.cursor
            .map(|id| self.node(id).ty.as_str())
            .unwrap_or_default()
    }

    /// Schema description of the cursor node, if any.
    pub fn cursor_description(&self) -> Option<&str> {
        self.cursor.and_then(|id| self.node(id).description.as_deref())
    }

    /// Move the cursor to a given node, typically the offending node of a
    /// [`QueryError`](crate::QueryError). Ignores handles from another tree
    /// generation and the synthetic root.
    pub fn focus(&mut self, node: NodeId) {
        if node.index() < self.nodes.len() && node != self.root {
            self.cursor = Some(node);
        }
    }

    /// Move the cursor one visible line up.
    pub fn key_up(&mut self) {
        let Some(cursor) = self.cursor else { return };

        if let Some(prev) = self.node(cursor).prev {
            let last = self.last_visible(prev);
            self.cursor = Some(last);
        } else if let Some(parent) = self.node(cursor).parent {
            if parent != self.root {
                self.cursor = Some(parent);
            }
        }
    }

    /// Move the cursor one visible line down.
    pub fn key_down(&mut self) {
        let Some(cursor) = self.cursor else { return };

        self.ensure_children(cursor);

        if let Some(child) = self.node(cursor).child {
            self.cursor = Some(child);
        } else if let Some(next) = self.node(cursor).next {
            self.cursor = Some(next);
        } else if let Some(below) = self.first_below(cursor) {
            self.cursor = Some(below);
        }
    }

    /// Move the caret left in the edit sub-mode; otherwise collapse the
    /// cursor node or ascend to its parent.
    pub fn key_left(&mut self) {
        let Some(cursor) = self.cursor else { return };

        if self.cursor_at_input_field && self.apply_edit(cursor, EditCommand::Left) {
            return;
        }

        let collapsed = match &mut self.node_mut(cursor).kind {
            NodeKind::Object(object) if object.is_expanded && !object.is_root => {
                object.is_expanded = false;
                true
            }
            NodeKind::ListItem(item) if item.is_expanded => {
                item.is_expanded = false;
                true
            }
            _ => false,
        };

        if collapsed {
            self.ensure_children(cursor);
            return;
        }

        if let Some(parent) = self.node(cursor).parent {
            if parent != self.root {
                self.cursor = Some(parent);
            }
        }
    }

    /// Move the caret right in the edit sub-mode; otherwise expand the
    /// cursor node or step into its first child.
    pub fn key_right(&mut self) {
        let Some(cursor) = self.cursor else { return };

        if self.cursor_at_input_field && self.apply_edit(cursor, EditCommand::Right) {
            return;
        }

        match self.right_action(cursor) {
            RightAction::Expand => self.expand(cursor),
            RightAction::StepIn => self.step_into(cursor),
            RightAction::Nothing => {}
        }
    }

    /// Cursor to the first root field.
    pub fn go_to_begin(&mut self) {
        self.cursor = self.children_of(self.root).first().copied();
    }

    /// Cursor to the last visible line.
    pub fn go_to_end(&mut self) {
        if let Some(&last) = self.children_of(self.root).last() {
            let last = self.last_visible(last);
            self.cursor = Some(last);
        }
    }

    /// The space key: toggle selection or expansion of the cursor node; in
    /// the edit sub-mode, insert a space into the argument value.
    pub fn select(&mut self) {
        let Some(cursor) = self.cursor else { return };

        if let NodeKind::ListItem(item) = &self.node(cursor).kind {
            if item.is_expanded {
                self.collapse_list_item(cursor);
            } else {
                self.expand_list_item(cursor);
            }
            return;
        }

        let at_input = self.cursor_at_input_field;

        match &mut self.node_mut(cursor).kind {
            NodeKind::Object(object) if !object.is_root => {
                object.is_expanded = !object.is_expanded;
            }
            NodeKind::Leaf(leaf) => {
                leaf.is_selected = !leaf.is_selected;
            }
            kind => {
                if let Some(base) = kind.argument_mut() {
                    if at_input {
                        let (value, pos) = edit(&base.value, base.pos, EditCommand::Insert(' '));
                        base.value = value;
                        base.pos = pos;
                    } else if !base.is_variable && base.is_toggleable() {
                        base.symbol = base.symbol.toggled();
                    }
                }
            }
        }

        self.ensure_children(cursor);
    }

    /// Any key that is not a motion, Space or Enter. Returns `true` when the
    /// cursor node consumed it; the controller only acts on its own
    /// bindings (help, quit, reload) when this returns `false`.
    pub fn key(&mut self, key: Key) -> bool {
        let Some(cursor) = self.cursor else { return false };

        if self.node(cursor).kind.is_argument() {
            return self.argument_key(cursor, key);
        }

        if matches!(self.node(cursor).kind, NodeKind::ListItem(_)) && key == Key::Backspace {
            self.remove_list_item(cursor);
            return true;
        }

        false
    }

    fn argument_key(&mut self, cursor: NodeId, key: Key) -> bool {
        if key == Key::Tab {
            self.cursor_at_input_field = !self.cursor_at_input_field;
            return true;
        }

        if key == Key::Char('v') && self.variable_keybind(cursor) {
            self.toggle_variable(cursor);
            return true;
        }

        if self.cursor_at_input_field {
            if let Some(command) = edit_command(key) {
                self.apply_edit(cursor, command);
            }
            return true;
        }

        false
    }

    /// Whether `v` toggles variable mode right now, as opposed to being a
    /// literal character. Scalar and Enum arguments only toggle outside the
    /// edit sub-mode; Input and List arguments have no literal line at all,
    /// so they also toggle while editing until they are in variable mode
    /// (then `v` types into the variable name).
    fn variable_keybind(&self, cursor: NodeId) -> bool {
        if !self.cursor_at_input_field {
            return true;
        }

        match &self.node(cursor).kind {
            NodeKind::Input(input) => !input.base.is_variable,
            NodeKind::List(list) => !list.base.is_variable,
            _ => false,
        }
    }

    fn toggle_variable(&mut self, cursor: NodeId) {
        if let Some(base) = self.node_mut(cursor).kind.argument_mut() {
            base.is_variable = !base.is_variable;
        }

        self.ensure_children(cursor);
    }

    /// Recompute a node's `child` pointer from its visibility rule,
    /// materializing children on first exposure.
    pub(crate) fn ensure_children(&mut self, id: NodeId) {
        let visible = match &self.node(id).kind {
            NodeKind::Object(object) => !object.is_root && object.is_expanded,
            NodeKind::Leaf(leaf) => leaf.is_selected && !leaf.arguments.is_empty(),
            NodeKind::Scalar(_) | NodeKind::Enum(_) => false,
            NodeKind::Input(input) => input.base.is_emitted() && !input.base.is_variable,
            NodeKind::List(list) => list.base.is_emitted() && !list.base.is_variable,
            NodeKind::ListItem(item) => item.is_expanded,
        };

        let child = if !visible {
            None
        } else if matches!(self.node(id).kind, NodeKind::List(_)) {
            match &self.node(id).kind {
                NodeKind::List(list) => list.items.first().copied(),
                _ => None,
            }
        } else if matches!(self.node(id).kind, NodeKind::ListItem(_)) {
            self.materialize_item(id);
            match &self.node(id).kind {
                NodeKind::ListItem(item) => item.inner,
                _ => None,
            }
        } else {
            self.materialize(id);
            self.children_of(id).first().copied()
        };

        self.node_mut(id).child = child;
    }

    /// The last visible descendant of a node: follow visible children,
    /// always taking the last sibling.
    pub(crate) fn last_visible(&mut self, start: NodeId) -> NodeId {
        let mut id = start;

        loop {
            self.ensure_children(id);

            let mut child = match self.node(id).child {
                Some(child) => child,
                None => return id,
            };

            while let Some(next) = self.node(child).next {
                child = next;
            }

            id = child;
        }
    }

    /// The nearest next sibling of an ancestor, i.e. the line below a
    /// subtree's last line.
    fn first_below(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;

        match self.node(parent).next {
            Some(next) => Some(next),
            None => self.first_below(parent),
        }
    }

    fn right_action(&self, id: NodeId) -> RightAction {
        match &self.node(id).kind {
            NodeKind::Object(object) if !object.is_root => {
                if object.is_expanded {
                    RightAction::StepIn
                } else {
                    RightAction::Expand
                }
            }
            NodeKind::ListItem(item) => {
                if item.is_expanded {
                    RightAction::StepIn
                } else {
                    RightAction::Expand
                }
            }
            NodeKind::Leaf(leaf) => {
                if leaf.arguments.is_empty() {
                    RightAction::Nothing
                } else if leaf.is_selected {
                    RightAction::StepIn
                } else {
                    RightAction::Expand
                }
            }
            NodeKind::Input(input) => argument_right_action(&input.base),
            NodeKind::List(list) => argument_right_action(&list.base),
            _ => RightAction::Nothing,
        }
    }

    fn expand(&mut self, id: NodeId) {
        if matches!(self.node(id).kind, NodeKind::ListItem(_)) {
            self.expand_list_item(id);
            return;
        }

        match &mut self.node_mut(id).kind {
            NodeKind::Object(object) => object.is_expanded = true,
            NodeKind::Leaf(leaf) => leaf.is_selected = true,
            kind => {
                if let Some(base) = kind.argument_mut() {
                    base.symbol = Symbol::Selected;
                }
            }
        }

        self.ensure_children(id);
    }

    fn step_into(&mut self, id: NodeId) {
        self.ensure_children(id);

        if let Some(child) = self.node(id).child {
            self.cursor = Some(child);
        }
    }

    /// Expanding a trailing placeholder appends the next one, keeping the
    /// add-new affordance at the end of the list.
    fn expand_list_item(&mut self, item: NodeId) {
        let trailing = self.node(item).next.is_none();

        if let NodeKind::ListItem(it) = &mut self.node_mut(item).kind {
            it.is_expanded = true;
        }

        self.materialize_item(item);
        self.ensure_children(item);

        if trailing {
            if let Some(list) = self.node(item).parent {
                self.append_list_item(list);
            }
        }
    }

    fn collapse_list_item(&mut self, item: NodeId) {
        if let NodeKind::ListItem(it) = &mut self.node_mut(item).kind {
            it.is_expanded = false;
        }

        self.ensure_children(item);
    }

    /// Backspace on a non-trailing list item: unlink it and move the cursor
    /// to the item that takes its place. The trailing placeholder cannot be
    /// removed.
    fn remove_list_item(&mut self, item: NodeId) {
        let Some(next) = self.node(item).next else { return };
        let prev = self.node(item).prev;
        let parent = self.node(item).parent;

        if let Some(prev) = prev {
            self.node_mut(prev).next = Some(next);
        }
        self.node_mut(next).prev = prev;

        if let Some(list) = parent {
            if let NodeKind::List(l) = &mut self.node_mut(list).kind {
                l.items.retain(|&i| i != item);
            }
            self.ensure_children(list);
        }

        self.cursor = Some(next);
    }

    fn apply_edit(&mut self, id: NodeId, command: EditCommand) -> bool {
        let Some(base) = self.node_mut(id).kind.argument_mut() else {
            return false;
        };

        let (value, pos) = edit(&base.value, base.pos, command);
        base.value = value;
        base.pos = pos;

        true
    }
}

fn argument_right_action(base: &crate::node::ArgumentBase) -> RightAction {
    if base.is_variable {
        RightAction::Nothing
    } else if base.is_emitted() {
        RightAction::StepIn
    } else if base.is_toggleable() {
        RightAction::Expand
    } else {
        RightAction::Nothing
    }
}

fn edit_command(key: Key) -> Option<EditCommand> {
    match key {
        Key::Backspace => Some(EditCommand::Backspace),
        Key::Delete | Key::Ctrl('d') => Some(EditCommand::Delete),
        Key::Home | Key::Ctrl('a') => Some(EditCommand::Home),
        Key::End | Key::Ctrl('e') => Some(EditCommand::End),
        Key::Ctrl('k') => Some(EditCommand::KillToEnd),
        Key::Ctrl('t') => Some(EditCommand::Transpose),
        Key::Meta('b') => Some(EditCommand::WordLeft),
        Key::Meta('f') => Some(EditCommand::WordRight),
        Key::Meta('d') => Some(EditCommand::KillWord),
        Key::MetaBackspace => Some(EditCommand::KillWordBack),
        Key::Left => Some(EditCommand::Left),
        Key::Right => Some(EditCommand::Right),
        Key::Char(c) => Some(EditCommand::Insert(c)),
        _ => None,
    }
}
