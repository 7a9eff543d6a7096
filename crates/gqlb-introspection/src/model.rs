use std::fmt;

use serde::{Deserialize, Serialize};

/// A complete introspection document: the `data` object of a response to the
/// standard `IntrospectionQuery`, i.e. `{"__schema": {...}}`.
///
/// ### Example
/// ```rust
/// let doc: gqlb_introspection::Introspection = serde_json::from_str(
///     r#"{"__schema": {"queryType": {"name": "Query"}, "types": []}}"#,
/// )
/// .unwrap();
///
/// assert_eq!(doc.schema.query_type.unwrap().name, "Query");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introspection {
    #[serde(rename = "__schema")]
    pub schema: SchemaInfo,
}

/// The `__schema` object: root operation type names plus every type the
/// server exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    #[serde(default)]
    pub query_type: Option<NamedType>,
    #[serde(default)]
    pub mutation_type: Option<NamedType>,
    #[serde(default)]
    pub subscription_type: Option<NamedType>,
    #[serde(default)]
    pub types: Vec<FullType>,
}

/// A bare `{"name": ...}` reference to a root operation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
}

/// One entry of `__schema.types`, as selected by the `FullType` fragment of
/// the standard introspection query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<FieldInfo>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValueInfo>>,
    #[serde(default)]
    pub interfaces: Option<Vec<TypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValueInfo>>,
    #[serde(default)]
    pub possible_types: Option<Vec<TypeRef>>,
}

/// A field of an object or interface type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<InputValueInfo>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

/// An argument of a field, or a field of an input object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValueInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A member of an enum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

/// A possibly wrapped type reference, nested through `ofType` like the
/// `TypeRef` fragment of the introspection query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Strip every `NON_NULL` and `LIST` wrapper, yielding the named type
    /// underneath.
    pub fn unwrapped(&self) -> &TypeRef {
        let mut ty = self;

        while let (TypeKind::NonNull | TypeKind::List, Some(inner)) = (ty.kind, &ty.of_type) {
            ty = inner;
        }

        ty
    }

    /// Strip a single outer `NON_NULL` wrapper, if present.
    pub fn strip_non_null(&self) -> &TypeRef {
        match (self.kind, &self.of_type) {
            (TypeKind::NonNull, Some(inner)) => inner,
            _ => self,
        }
    }

    /// Whether the outermost wrapper is `NON_NULL`.
    pub fn is_non_null(&self) -> bool {
        self.kind == TypeKind::NonNull
    }

    /// The name of the underlying named type, when the reference is not
    /// truncated.
    pub fn unwrapped_name(&self) -> Option<&str> {
        self.unwrapped().name.as_deref()
    }
}

/// Stringifies the reference in GraphQL type syntax, e.g. `[String!]!`.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.of_type) {
            (TypeKind::NonNull, Some(inner)) => write!(f, "{inner}!"),
            (TypeKind::List, Some(inner)) => write!(f, "[{inner}]"),
            _ => write!(f, "{}", self.name.as_deref().unwrap_or_default()),
        }
    }
}

/// The `__TypeKind` enum of the introspection schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    NonNull,
    List,
}

/// A GraphQL response error, reduced to its message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// The envelope of an introspection response: `data` and/or `errors`.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Introspection>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// An introspection response that did not carry a usable document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResponseError {
    #[error("introspection failed: {0}")]
    Errors(String),
    #[error("introspection response carried no data")]
    NoData,
}

impl Response {
    /// Extract the document, treating `errors` as fatal the way the
    /// original client does.
    pub fn into_result(self) -> Result<Introspection, ResponseError> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();

            return Err(ResponseError::Errors(messages.join("; ")));
        }

        self.data.ok_or(ResponseError::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str, kind: TypeKind) -> TypeRef {
        TypeRef {
            kind,
            name: Some(name.to_string()),
            of_type: None,
        }
    }

    fn wrap(kind: TypeKind, inner: TypeRef) -> TypeRef {
        TypeRef {
            kind,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    #[test]
    fn it_stringifies_wrapped_types() {
        let ty = wrap(
            TypeKind::NonNull,
            wrap(
                TypeKind::List,
                wrap(TypeKind::NonNull, named("String", TypeKind::Scalar)),
            ),
        );

        assert_eq!(ty.to_string(), "[String!]!");
        assert_eq!(ty.unwrapped_name(), Some("String"));
        assert!(ty.is_non_null());
    }

    #[test]
    fn it_strips_a_single_non_null() {
        let ty = wrap(TypeKind::NonNull, named("Int", TypeKind::Scalar));

        assert_eq!(ty.strip_non_null().to_string(), "Int");
        assert_eq!(named("Int", TypeKind::Scalar).strip_non_null().kind, TypeKind::Scalar);
    }

    #[test]
    fn it_deserializes_a_schema() {
        let doc: Introspection = serde_json::from_str(
            r#"{
                "__schema": {
                    "queryType": {"name": "Query"},
                    "mutationType": null,
                    "types": [
                        {
                            "kind": "OBJECT",
                            "name": "Query",
                            "description": null,
                            "fields": [
                                {
                                    "name": "activity",
                                    "description": "Recent activity.",
                                    "args": [],
                                    "type": {"kind": "OBJECT", "name": "Activity", "ofType": null},
                                    "isDeprecated": false,
                                    "deprecationReason": null
                                }
                            ]
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        let types = &doc.schema.types;
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name.as_deref(), Some("Query"));

        let field = &types[0].fields.as_ref().unwrap()[0];
        assert_eq!(field.name, "activity");
        assert_eq!(field.ty.to_string(), "Activity");
        assert!(!field.is_deprecated);
    }

    #[test]
    fn it_collects_response_errors() {
        let response: Response = serde_json::from_str(
            r#"{"errors": [{"message": "introspection is disabled"}]}"#,
        )
        .unwrap();

        let error = response.into_result().unwrap_err();
        assert_eq!(
            error.to_string(),
            "introspection failed: introspection is disabled"
        );
    }
}
