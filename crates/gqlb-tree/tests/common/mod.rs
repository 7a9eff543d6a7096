//! Shared fixtures: a character-grid screen and introspection JSON
//! builders, so tests read as schema + key events + expected output.
#![allow(dead_code)]

use gqlb_introspection::Introspection;
use gqlb_tree::{Screen, Style, Tree};
use serde_json::{json, Value};

pub struct FakeScreen {
    y_max: i32,
    x_max: i32,
    cells: Vec<Vec<char>>,
}

impl FakeScreen {
    pub fn new(y_max: i32, x_max: i32) -> Self {
        Self {
            y_max,
            x_max,
            cells: vec![vec![' '; x_max as usize]; y_max as usize],
        }
    }

    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }
}

impl Screen for FakeScreen {
    fn addstr(&mut self, y: i32, x: i32, text: &str, _style: Style) {
        if y < 0 || y >= self.y_max {
            return;
        }

        for (i, ch) in text.chars().enumerate() {
            let x = x + i as i32;

            if (0..self.x_max).contains(&x) {
                self.cells[y as usize][x as usize] = ch;
            }
        }
    }
}

/// Render the tree and overwrite the cursor cell with `X`, the way the
/// original tool's test suite pins cursor positions.
pub fn render(tree: &mut Tree) -> String {
    let mut screen = FakeScreen::new(40, 30);
    let (_, cursor) = tree.draw(&mut screen, 0, 0);
    screen.addstr(cursor.y, cursor.x, "X", Style::Default);

    screen.render()
}

pub fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

pub fn non_null(inner: Value) -> Value {
    json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
}

pub fn list(inner: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": inner })
}

pub fn field(name: &str, ty: Value) -> Value {
    json!({ "name": name, "args": [], "type": ty, "isDeprecated": false })
}

pub fn field_with_args(name: &str, ty: Value, args: Vec<Value>) -> Value {
    json!({ "name": name, "args": args, "type": ty, "isDeprecated": false })
}

pub fn arg(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty, "defaultValue": null })
}

pub fn object_type(name: &str, fields: Vec<Value>) -> Value {
    json!({ "kind": "OBJECT", "name": name, "fields": fields })
}

pub fn interface_type(name: &str, fields: Vec<Value>, possible: Vec<&str>) -> Value {
    let possible: Vec<Value> = possible.iter().map(|p| named("OBJECT", p)).collect();

    json!({ "kind": "INTERFACE", "name": name, "fields": fields, "possibleTypes": possible })
}

pub fn union_type(name: &str, possible: Vec<&str>) -> Value {
    let possible: Vec<Value> = possible.iter().map(|p| named("OBJECT", p)).collect();

    json!({ "kind": "UNION", "name": name, "possibleTypes": possible })
}

pub fn enum_type(name: &str, members: Vec<&str>) -> Value {
    let values: Vec<Value> = members.iter().map(|m| json!({ "name": m })).collect();

    json!({ "kind": "ENUM", "name": name, "enumValues": values })
}

pub fn input_type(name: &str, input_fields: Vec<Value>) -> Value {
    json!({ "kind": "INPUT_OBJECT", "name": name, "inputFields": input_fields })
}

/// An introspection document over the given type definitions. The built-in
/// scalars are always present; `Query` is the query root and `Mutation`, if
/// defined, the mutation root.
pub fn introspection(mut types: Vec<Value>) -> Introspection {
    for scalar in ["String", "ID", "Int", "Float", "Boolean"] {
        types.push(json!({ "kind": "SCALAR", "name": scalar }));
    }

    let mutation_type = if types.iter().any(|ty| ty["name"] == "Mutation") {
        json!({ "name": "Mutation" })
    } else {
        Value::Null
    };

    serde_json::from_value(json!({
        "__schema": {
            "queryType": { "name": "Query" },
            "mutationType": mutation_type,
            "types": types,
        }
    }))
    .expect("fixture deserializes")
}

pub fn load_tree(types: Vec<Value>) -> Tree {
    Tree::from_introspection(introspection(types)).expect("fixture builds")
}
