//! SDL rendering of an introspection document, for `--print-schema`.

use apollo_encoder::{
    Argument, Directive, Document, EnumDefinition, EnumValue, FieldDefinition, InputField,
    InputObjectDefinition, InputValueDefinition, InterfaceDefinition, ObjectDefinition,
    ScalarDefinition, SchemaDefinition, Type_, UnionDefinition, Value,
};
use gqlb_introspection::{FieldInfo, FullType, Introspection, TypeKind, TypeRef};

/// Scalars every server defines; the reference printers leave them out of
/// the SDL and so do we.
const BUILT_IN_SCALARS: [&str; 5] = ["String", "ID", "Int", "Float", "Boolean"];

/// Render the schema as SDL, skipping introspection meta types and the
/// built-in scalars.
pub fn print_schema(schema: &Introspection) -> String {
    let mut document = Document::new();

    if let Some(definition) = schema_definition(schema) {
        document.schema(definition);
    }

    for ty in &schema.schema.types {
        let Some(name) = ty.name.as_deref() else {
            continue;
        };

        if name.starts_with("__") {
            continue;
        }

        match ty.kind {
            TypeKind::Scalar => {
                if !BUILT_IN_SCALARS.contains(&name) {
                    let mut definition = ScalarDefinition::new(name.to_string());

                    if let Some(description) = &ty.description {
                        definition.description(description.clone());
                    }

                    document.scalar(definition);
                }
            }
            TypeKind::Object => document.object(object_definition(name, ty)),
            TypeKind::Interface => document.interface(interface_definition(name, ty)),
            TypeKind::Union => document.union(union_definition(name, ty)),
            TypeKind::Enum => document.enum_(enum_definition(name, ty)),
            TypeKind::InputObject => document.input_object(input_object_definition(name, ty)),
            _ => {}
        }
    }

    document.to_string()
}

/// An explicit `schema { … }` block is only needed when a root operation
/// type departs from its conventional name.
fn schema_definition(schema: &Introspection) -> Option<SchemaDefinition> {
    let query = schema.schema.query_type.as_ref().map(|ty| ty.name.as_str());
    let mutation = schema.schema.mutation_type.as_ref().map(|ty| ty.name.as_str());
    let subscription = schema
        .schema
        .subscription_type
        .as_ref()
        .map(|ty| ty.name.as_str());

    let conventional = query.map_or(true, |name| name == "Query")
        && mutation.map_or(true, |name| name == "Mutation")
        && subscription.map_or(true, |name| name == "Subscription");

    if conventional {
        return None;
    }

    let mut definition = SchemaDefinition::new();

    if let Some(query) = query {
        definition.query(query.to_string());
    }
    if let Some(mutation) = mutation {
        definition.mutation(mutation.to_string());
    }
    if let Some(subscription) = subscription {
        definition.subscription(subscription.to_string());
    }

    Some(definition)
}

fn object_definition(name: &str, ty: &FullType) -> ObjectDefinition {
    let mut definition = ObjectDefinition::new(name.to_string());

    if let Some(description) = &ty.description {
        definition.description(description.clone());
    }

    for interface in ty.interfaces.iter().flatten() {
        if let Some(interface) = interface.unwrapped_name() {
            definition.interface(interface.to_string());
        }
    }

    for field in ty.fields.iter().flatten() {
        definition.field(field_definition(field));
    }

    definition
}

fn interface_definition(name: &str, ty: &FullType) -> InterfaceDefinition {
    let mut definition = InterfaceDefinition::new(name.to_string());

    if let Some(description) = &ty.description {
        definition.description(description.clone());
    }

    for interface in ty.interfaces.iter().flatten() {
        if let Some(interface) = interface.unwrapped_name() {
            definition.interface(interface.to_string());
        }
    }

    for field in ty.fields.iter().flatten() {
        definition.field(field_definition(field));
    }

    definition
}

fn union_definition(name: &str, ty: &FullType) -> UnionDefinition {
    let mut definition = UnionDefinition::new(name.to_string());

    if let Some(description) = &ty.description {
        definition.description(description.clone());
    }

    for possible in ty.possible_types.iter().flatten() {
        if let Some(member) = possible.unwrapped_name() {
            definition.member(member.to_string());
        }
    }

    definition
}

fn enum_definition(name: &str, ty: &FullType) -> EnumDefinition {
    let mut definition = EnumDefinition::new(name.to_string());

    if let Some(description) = &ty.description {
        definition.description(description.clone());
    }

    for value in ty.enum_values.iter().flatten() {
        let mut member = EnumValue::new(value.name.clone());

        if let Some(description) = &value.description {
            member.description(description.clone());
        }

        if value.is_deprecated {
            member.directive(deprecated_directive(value.deprecation_reason.clone()));
        }

        definition.value(member);
    }

    definition
}

fn input_object_definition(name: &str, ty: &FullType) -> InputObjectDefinition {
    let mut definition = InputObjectDefinition::new(name.to_string());

    if let Some(description) = &ty.description {
        definition.description(description.clone());
    }

    for input in ty.input_fields.iter().flatten() {
        let mut field = InputField::new(input.name.clone(), encode_type(&input.ty));

        if let Some(description) = &input.description {
            field.description(description.clone());
        }

        if let Some(default) = &input.default_value {
            field.default_value(default.clone());
        }

        definition.field(field);
    }

    definition
}

fn field_definition(field: &FieldInfo) -> FieldDefinition {
    let mut definition = FieldDefinition::new(field.name.clone(), encode_type(&field.ty));

    if let Some(description) = &field.description {
        definition.description(description.clone());
    }

    for argument in &field.args {
        let mut value = InputValueDefinition::new(argument.name.clone(), encode_type(&argument.ty));

        if let Some(description) = &argument.description {
            value.description(description.clone());
        }

        if let Some(default) = &argument.default_value {
            value.default_value(default.clone());
        }

        definition.arg(value);
    }

    if field.is_deprecated {
        definition.directive(deprecated_directive(field.deprecation_reason.clone()));
    }

    definition
}

/// Build a `@deprecated` directive, with a `reason` argument if one was given.
fn deprecated_directive(reason: Option<String>) -> Directive {
    let mut directive = Directive::new(String::from("deprecated"));

    if let Some(reason) = reason {
        directive.arg(Argument::new(String::from("reason"), Value::String(reason)));
    }

    directive
}

fn encode_type(ty: &TypeRef) -> Type_ {
    match (ty.kind, &ty.of_type) {
        (TypeKind::NonNull, Some(inner)) => Type_::NonNull {
            ty: Box::new(encode_type(inner)),
        },
        (TypeKind::List, Some(inner)) => Type_::List {
            ty: Box::new(encode_type(inner)),
        },
        _ => Type_::NamedType {
            name: ty.name.clone().unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Introspection {
        serde_json::from_value(json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "fields": [
                            {
                                "name": "search",
                                "args": [
                                    {
                                        "name": "contains",
                                        "type": { "kind": "SCALAR", "name": "String" },
                                        "defaultValue": "\"\""
                                    }
                                ],
                                "type": {
                                    "kind": "LIST", "name": null,
                                    "ofType": { "kind": "UNION", "name": "SearchResult" }
                                }
                            },
                            {
                                "name": "when",
                                "args": [],
                                "type": { "kind": "SCALAR", "name": "Date" },
                                "isDeprecated": true,
                                "deprecationReason": "Use search."
                            }
                        ]
                    },
                    {
                        "kind": "OBJECT",
                        "name": "Book",
                        "interfaces": [{ "kind": "INTERFACE", "name": "Titled" }],
                        "fields": [
                            {
                                "name": "title",
                                "args": [],
                                "type": {
                                    "kind": "NON_NULL", "name": null,
                                    "ofType": { "kind": "SCALAR", "name": "String" }
                                }
                            }
                        ]
                    },
                    {
                        "kind": "INTERFACE",
                        "name": "Titled",
                        "fields": [
                            { "name": "title", "args": [],
                              "type": { "kind": "SCALAR", "name": "String" } }
                        ],
                        "possibleTypes": [{ "kind": "OBJECT", "name": "Book" }]
                    },
                    {
                        "kind": "UNION",
                        "name": "SearchResult",
                        "possibleTypes": [
                            { "kind": "OBJECT", "name": "Book" },
                            { "kind": "OBJECT", "name": "Query" }
                        ]
                    },
                    { "kind": "ENUM", "name": "Color",
                      "enumValues": [{ "name": "RED" }, { "name": "GREEN" }] },
                    { "kind": "INPUT_OBJECT", "name": "Filter",
                      "inputFields": [
                          { "name": "contains",
                            "type": { "kind": "SCALAR", "name": "String" } }
                      ] },
                    { "kind": "SCALAR", "name": "Date", "description": "An ISO-8601 day." },
                    { "kind": "SCALAR", "name": "String" },
                    { "kind": "OBJECT", "name": "__Schema", "fields": [] }
                ]
            }
        }))
        .expect("fixture deserializes")
    }

    #[test]
    fn it_renders_every_definition_kind() {
        let sdl = print_schema(&fixture());

        assert!(sdl.contains("type Query"));
        assert!(sdl.contains("search(contains: String"));
        assert!(sdl.contains("[SearchResult]"));
        assert!(sdl.contains("@deprecated"));
        assert!(sdl.contains("type Book implements Titled"));
        assert!(sdl.contains("title: String!"));
        assert!(sdl.contains("interface Titled"));
        assert!(sdl.contains("union SearchResult = Book | Query"));
        assert!(sdl.contains("enum Color"));
        assert!(sdl.contains("input Filter"));
        assert!(sdl.contains("scalar Date"));
    }

    #[test]
    fn it_skips_meta_types_and_built_in_scalars() {
        let sdl = print_schema(&fixture());

        assert!(!sdl.contains("__Schema"));
        assert!(!sdl.contains("scalar String"));
        assert!(!sdl.contains("schema {"));
    }

    #[test]
    fn it_emits_parseable_sdl() {
        let sdl = print_schema(&fixture());
        let parsed = apollo_parser::Parser::new(&sdl).parse();

        assert_eq!(parsed.errors().count(), 0);
    }
}
