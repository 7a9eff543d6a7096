use serde_json::{json, Map, Value};

use crate::error::RestoreError;
use crate::node::{NodeId, NodeKind, Symbol};
use crate::tree::Tree;

const VERSION: u64 = 1;

impl Tree {
    /// Serialize the user-visible state of the tree, bundled with the
    /// introspection document it was built from.
    ///
    /// Nodes emit sparse objects: a `type` tag plus only what differs from
    /// the defaults. A node with no state anywhere in its subtree serializes
    /// to `null` and its parent drops the entry.
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();

        doc.insert("version".to_string(), json!(VERSION));
        doc.insert(
            "schema".to_string(),
            serde_json::to_value(&self.schema).unwrap_or(Value::Null),
        );
        doc.insert(
            "root".to_string(),
            self.node_to_json(self.root).unwrap_or(Value::Null),
        );

        if self.cursor_at_input_field {
            doc.insert("cursor_at_input_field".to_string(), json!(true));
        }

        Value::Object(doc)
    }

    /// Rebuild a tree from a document produced by [`Tree::to_json`]: the
    /// bundled schema is built exactly like a fresh one, then the saved
    /// state is layered on top, best-effort.
    pub fn from_json(data: &Value) -> Result<Self, RestoreError> {
        let doc = data.as_object().ok_or(RestoreError::NotAnObject)?;
        check_version(doc)?;

        let schema = serde_json::from_value(doc.get("schema").cloned().unwrap_or(Value::Null))?;
        let mut tree = Tree::from_introspection(schema)?;
        tree.restore(data)?;

        Ok(tree)
    }

    /// Layer the state portion of a saved document onto this tree, ignoring
    /// the bundled schema. This is what the schema-reload key uses: build
    /// from the new schema, restore from the old state.
    ///
    /// Entries whose names no longer exist, or whose node tags disagree with
    /// this tree's kinds, are silently dropped.
    pub fn restore(&mut self, data: &Value) -> Result<(), RestoreError> {
        let doc = data.as_object().ok_or(RestoreError::NotAnObject)?;
        check_version(doc)?;

        self.cursor_at_input_field = doc
            .get("cursor_at_input_field")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if let Some(state) = doc.get("root") {
            let root = self.root;
            self.restore_node(root, state);
        }

        Ok(())
    }

    fn node_to_json(&self, id: NodeId) -> Option<Value> {
        let node = self.node(id);
        let mut map = Map::new();

        map.insert("type".to_string(), json!(node.kind.tag()));

        if self.cursor == Some(id) {
            map.insert("has_cursor".to_string(), json!(true));
        }

        match &node.kind {
            NodeKind::Object(object) => {
                if object.is_expanded && !object.is_root {
                    map.insert("is_expanded".to_string(), json!(true));
                }

                let (arguments, fields) = self.partitioned_children_json(id);

                if !arguments.is_empty() {
                    map.insert("arguments".to_string(), Value::Object(arguments));
                }
                if !fields.is_empty() {
                    map.insert("fields".to_string(), Value::Object(fields));
                }
            }
            NodeKind::Leaf(leaf) => {
                if leaf.is_selected {
                    map.insert("is_selected".to_string(), json!(true));
                }

                let (arguments, _) = self.partitioned_children_json(id);

                if !arguments.is_empty() {
                    map.insert("arguments".to_string(), Value::Object(arguments));
                }
            }
            NodeKind::Scalar(argument) => {
                base_to_json(&mut map, &argument.base);
            }
            NodeKind::Enum(argument) => {
                base_to_json(&mut map, &argument.base);
            }
            NodeKind::Input(argument) => {
                base_to_json(&mut map, &argument.base);

                let (fields, _) = self.partitioned_children_json(id);

                if !fields.is_empty() {
                    map.insert("fields".to_string(), Value::Object(fields));
                }
            }
            NodeKind::List(list) => {
                base_to_json(&mut map, &list.base);

                let items: Vec<Value> = list
                    .items
                    .iter()
                    .map(|&item| self.node_to_json(item).unwrap_or(Value::Null))
                    .collect();

                if items.iter().any(|item| !item.is_null()) {
                    map.insert("items".to_string(), Value::Array(items));
                }
            }
            NodeKind::ListItem(item) => {
                if item.is_expanded {
                    map.insert("is_expanded".to_string(), json!(true));
                }

                if let Some(inner) = item.inner {
                    let mut fields = Map::new();

                    if let (Some(name), Some(state)) =
                        (self.node(inner).kind.name(), self.node_to_json(inner))
                    {
                        fields.insert(name.to_string(), state);
                    }

                    if !fields.is_empty() {
                        map.insert("fields".to_string(), Value::Object(fields));
                    }
                }
            }
        }

        if map.len() == 1 {
            None
        } else {
            Some(Value::Object(map))
        }
    }

    /// Children with state, split into argument entries and selection
    /// entries, keyed by name. Pending descriptors hold no state by
    /// definition.
    fn partitioned_children_json(&self, id: NodeId) -> (Map<String, Value>, Map<String, Value>) {
        let mut arguments = Map::new();
        let mut fields = Map::new();

        for &child in self.children_of(id) {
            let Some(state) = self.node_to_json(child) else {
                continue;
            };
            let Some(name) = self.node(child).kind.name() else {
                continue;
            };

            if self.node(child).kind.is_argument() {
                arguments.insert(name.to_string(), state);
            } else {
                fields.insert(name.to_string(), state);
            }
        }

        (arguments, fields)
    }

    fn restore_node(&mut self, id: NodeId, state: &Value) {
        let Some(map) = state.as_object() else { return };

        let tag = map.get("type").and_then(Value::as_str).unwrap_or_default();
        if tag != self.node(id).kind.tag() {
            return;
        }

        if bool_entry(map, "has_cursor") && id != self.root {
            self.cursor = Some(id);
        }

        match tag {
            "object" => self.restore_object(id, map),
            "leaf" => self.restore_leaf(id, map),
            "scalar_argument" | "enum_argument" => {
                self.restore_base(id, map);
                self.ensure_children(id);
            }
            "input_argument" => self.restore_input(id, map),
            "list_argument" => self.restore_list(id, map),
            "list_item" => self.restore_list_item(id, map),
            _ => {}
        }
    }

    fn restore_object(&mut self, id: NodeId, map: &Map<String, Value>) {
        if bool_entry(map, "is_expanded") {
            if let NodeKind::Object(object) = &mut self.node_mut(id).kind {
                if !object.is_root {
                    object.is_expanded = true;
                }
            }
        }

        if bool_entry(map, "is_expanded")
            || map.contains_key("arguments")
            || map.contains_key("fields")
        {
            self.materialize(id);
        }

        self.restore_named_entries(id, map, "arguments", Some(true));
        self.restore_named_entries(id, map, "fields", Some(false));
        self.ensure_children(id);
    }

    fn restore_leaf(&mut self, id: NodeId, map: &Map<String, Value>) {
        if bool_entry(map, "is_selected") {
            if let NodeKind::Leaf(leaf) = &mut self.node_mut(id).kind {
                leaf.is_selected = true;
            }
        }

        if bool_entry(map, "is_selected") || map.contains_key("arguments") {
            self.materialize(id);
        }

        self.restore_named_entries(id, map, "arguments", None);
        self.ensure_children(id);
    }

    fn restore_input(&mut self, id: NodeId, map: &Map<String, Value>) {
        self.restore_base(id, map);

        if map.contains_key("fields") {
            self.materialize(id);
        }

        self.restore_named_entries(id, map, "fields", None);
        self.ensure_children(id);
    }

    fn restore_list(&mut self, id: NodeId, map: &Map<String, Value>) {
        self.restore_base(id, map);

        if let Some(items) = map.get("items").and_then(Value::as_array) {
            while self.children_of(id).len() < items.len() {
                self.append_list_item(id);
            }

            let ids = self.children_of(id).to_vec();

            for (entry, item) in items.iter().zip(ids) {
                if !entry.is_null() {
                    self.restore_node(item, entry);
                }
            }
        }

        self.ensure_children(id);
    }

    fn restore_list_item(&mut self, id: NodeId, map: &Map<String, Value>) {
        if bool_entry(map, "is_expanded") {
            if let NodeKind::ListItem(item) = &mut self.node_mut(id).kind {
                item.is_expanded = true;
            }
            // no trailing append here: the saved items array carries every
            // position, the old trailing placeholder included
            self.materialize_item(id);
        }

        if let Some(entries) = map.get("fields").and_then(Value::as_object) {
            self.materialize_item(id);

            let inner = match &self.node(id).kind {
                NodeKind::ListItem(item) => item.inner,
                _ => None,
            };

            if let Some(inner) = inner {
                for (name, sub) in entries {
                    if self.node(inner).kind.name() == Some(name.as_str()) {
                        self.restore_node(inner, sub);
                    }
                }
            }
        }

        self.ensure_children(id);
    }

    fn restore_named_entries(
        &mut self,
        id: NodeId,
        map: &Map<String, Value>,
        key: &str,
        want_argument: Option<bool>,
    ) {
        let Some(entries) = map.get(key).and_then(Value::as_object) else {
            return;
        };

        for (name, sub) in entries {
            if let Some(child) = self.child_by_name(id, name, want_argument) {
                self.restore_node(child, sub);
            }
        }
    }

    fn child_by_name(
        &self,
        id: NodeId,
        name: &str,
        want_argument: Option<bool>,
    ) -> Option<NodeId> {
        self.children_of(id).iter().copied().find(|&child| {
            let kind = &self.node(child).kind;

            kind.name() == Some(name)
                && want_argument.map_or(true, |want| kind.is_argument() == want)
        })
    }

    /// Shared argument state. `is_selected` is ignored for arguments the
    /// current schema marks required; the caret is clamped to the restored
    /// value.
    fn restore_base(&mut self, id: NodeId, map: &Map<String, Value>) {
        let is_selected = bool_entry(map, "is_selected");
        let is_variable = bool_entry(map, "is_variable");
        let value = map.get("value").and_then(Value::as_str).map(str::to_string);
        let pos = map.get("pos").and_then(Value::as_u64).unwrap_or(0) as usize;

        let Some(base) = self.node_mut(id).kind.argument_mut() else {
            return;
        };

        if is_selected && base.is_toggleable() {
            base.symbol = Symbol::Selected;
        }

        base.is_variable = is_variable;

        if let Some(value) = value {
            base.value = value;
        }

        base.pos = pos.min(base.value.chars().count());
    }
}

fn base_to_json(map: &mut Map<String, Value>, base: &crate::node::ArgumentBase) {
    if base.symbol == Symbol::Selected {
        map.insert("is_selected".to_string(), json!(true));
    }
    if base.is_variable {
        map.insert("is_variable".to_string(), json!(true));
    }
    if !base.value.is_empty() {
        map.insert("value".to_string(), json!(base.value));
    }
    if base.pos != 0 {
        map.insert("pos".to_string(), json!(base.pos));
    }
}

fn bool_entry(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn check_version(doc: &Map<String, Value>) -> Result<(), RestoreError> {
    match doc.get("version").and_then(Value::as_u64) {
        Some(VERSION) => Ok(()),
        Some(version) => Err(RestoreError::UnsupportedVersion(version)),
        None => Err(RestoreError::UnsupportedVersion(0)),
    }
}
