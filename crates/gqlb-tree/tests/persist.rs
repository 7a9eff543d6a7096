mod common;

use common::{
    arg, enum_type, field, field_with_args, list, load_tree, named, object_type, render,
};
use gqlb_tree::{Key, Tree};
use pretty_assertions::assert_eq;
use serde_json::json;

fn type_text(tree: &mut Tree, text: &str) {
    for c in text.chars() {
        tree.key(Key::Char(c));
    }
}

/// A session with a bit of everything: expansion, scalar and list values,
/// an enum variable, a caret mid-edit, the edit sub-mode left on.
fn edited_tree() -> Tree {
    let mut tree = load_tree(vec![
        object_type(
            "Query",
            vec![
                field_with_args(
                    "a",
                    named("OBJECT", "Foo"),
                    vec![
                        arg("x", named("SCALAR", "Int")),
                        arg("l", list(named("SCALAR", "String"))),
                    ],
                ),
                field_with_args(
                    "b",
                    named("SCALAR", "String"),
                    vec![arg("e", named("ENUM", "Color"))],
                ),
            ],
        ),
        object_type(
            "Foo",
            vec![
                field("c", named("SCALAR", "String")),
                field("d", named("SCALAR", "String")),
            ],
        ),
        enum_type("Color", vec!["RED", "GREEN"]),
    ]);

    tree.key_right();
    tree.key_down();
    tree.select();
    tree.key(Key::Tab);
    tree.key(Key::Char('4'));
    tree.key(Key::Tab);

    tree.key_down();
    tree.select();
    tree.key_down();
    tree.key_right();
    tree.key_down();
    tree.select();
    tree.key(Key::Tab);
    tree.key(Key::Char('g'));
    tree.key(Key::Tab);

    tree.key_down();
    tree.key_down();
    tree.select();

    tree.key_down();
    tree.key_down();
    tree.select();
    tree.key_down();
    tree.key(Key::Char('v'));
    tree.key(Key::Tab);
    type_text(&mut tree, "col");

    tree
}

#[test]
fn it_round_trips_a_session() {
    let mut tree = edited_tree();
    let expected = "query Query($col:Color) {a(x:4,l:[\"g\"]) {c} b(e:$col)}";
    assert_eq!(tree.query().unwrap(), expected);

    let saved = tree.to_json();
    assert_eq!(saved["version"], json!(1));
    assert_eq!(saved["cursor_at_input_field"], json!(true));

    let mut restored = Tree::from_json(&saved).unwrap();
    assert_eq!(restored.query().unwrap(), expected);
    assert_eq!(restored.cursor_type(), tree.cursor_type());
    assert_eq!(render(&mut restored), render(&mut tree));
}

#[test]
fn it_reserializes_to_the_same_document() {
    let tree = edited_tree();
    let saved = tree.to_json();

    let restored = Tree::from_json(&saved).unwrap();
    assert_eq!(restored.to_json(), saved);
}

#[test]
fn it_defaults_the_cursor_without_saved_state() {
    let tree = edited_tree();
    let mut saved = tree.to_json();
    saved["root"] = serde_json::Value::Null;

    let restored = Tree::from_json(&saved).unwrap();
    assert_eq!(restored.cursor_type(), "Foo");
}

#[test]
fn it_rejects_unsupported_versions() {
    let tree = edited_tree();
    let mut saved = tree.to_json();
    saved["version"] = json!(2);

    let error = Tree::from_json(&saved).unwrap_err();
    assert_eq!(error.to_string(), "Unsupported tree JSON version 2.");
}

#[test]
fn it_rejects_documents_without_a_version() {
    let error = Tree::from_json(&json!({})).unwrap_err();
    assert_eq!(error.to_string(), "Unsupported tree JSON version 0.");
}

#[test]
fn it_drops_state_for_removed_fields() {
    let mut old = load_tree(vec![object_type(
        "Query",
        vec![
            field("a", named("SCALAR", "String")),
            field("b", named("SCALAR", "String")),
        ],
    )]);
    old.select();
    old.key_down();
    old.select();
    let saved = old.to_json();

    // The schema lost field a; its saved state is silently dropped.
    let mut new = load_tree(vec![object_type(
        "Query",
        vec![field("b", named("SCALAR", "String"))],
    )]);
    new.restore(&saved).unwrap();

    assert_eq!(new.query().unwrap(), "query Query {b}");
}

#[test]
fn it_drops_state_when_a_field_changes_kind() {
    let mut old = load_tree(vec![
        object_type("Query", vec![field("a", named("OBJECT", "Foo"))]),
        object_type("Foo", vec![field("c", named("SCALAR", "String"))]),
    ]);
    old.key_right();
    old.key_down();
    old.select();
    let saved = old.to_json();

    // a went from object to scalar; the whole subtree is dropped, including
    // the saved cursor.
    let mut new = load_tree(vec![object_type(
        "Query",
        vec![field("a", named("SCALAR", "String"))],
    )]);
    new.restore(&saved).unwrap();

    assert_eq!(new.cursor_type(), "String");
    assert_eq!(new.query().unwrap_err().to_string(), "No fields selected.");
}

#[test]
fn it_restores_state_onto_a_reloaded_schema() {
    let mut tree = edited_tree();
    let saved = tree.to_json();

    // The reload path: build a fresh tree from the same introspection
    // document, then layer the old state onto it.
    let mut reloaded = load_tree(vec![
        object_type(
            "Query",
            vec![
                field_with_args(
                    "a",
                    named("OBJECT", "Foo"),
                    vec![
                        arg("x", named("SCALAR", "Int")),
                        arg("l", list(named("SCALAR", "String"))),
                    ],
                ),
                field_with_args(
                    "b",
                    named("SCALAR", "String"),
                    vec![arg("e", named("ENUM", "Color"))],
                ),
            ],
        ),
        object_type(
            "Foo",
            vec![
                field("c", named("SCALAR", "String")),
                field("d", named("SCALAR", "String")),
            ],
        ),
        enum_type("Color", vec!["RED", "GREEN"]),
    ]);
    reloaded.restore(&saved).unwrap();

    assert_eq!(reloaded.query().unwrap(), tree.query().unwrap());
    assert_eq!(render(&mut reloaded), render(&mut tree));
}

#[test]
fn it_keeps_required_arguments_required_on_restore() {
    // An argument that used to be optional and selected is now required;
    // the saved selection must not downgrade its symbol.
    let mut old = load_tree(vec![object_type(
        "Query",
        vec![field_with_args(
            "a",
            named("SCALAR", "String"),
            vec![arg("x", named("SCALAR", "Int"))],
        )],
    )]);
    old.select();
    old.key_down();
    old.select();
    old.key(Key::Tab);
    old.key(Key::Char('7'));
    let saved = old.to_json();

    let mut new = load_tree(vec![object_type(
        "Query",
        vec![field_with_args(
            "a",
            named("SCALAR", "String"),
            vec![arg(
                "x",
                json!({ "kind": "NON_NULL", "name": null,
                        "ofType": { "kind": "SCALAR", "name": "Int" } }),
            )],
        )],
    )]);
    new.restore(&saved).unwrap();

    // Required arguments always render ● and always emit.
    assert_eq!(
        render(&mut new),
        "■ a\n\
         \u{20} ● x: 7X"
    );
    assert_eq!(new.query().unwrap(), "query Query {a(x:7)}");
}
