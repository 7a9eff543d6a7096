use crate::node::NodeId;

/// Errors raised while building a tree from an introspection document.
///
/// These are fatal: a schema that references a type it does not define
/// cannot be navigated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Type '{0}' not found in schema.")]
    TypeNotFound(String),
    #[error("Type reference in '{0}' has no name.")]
    UnnamedTypeRef(String),
}

/// A serialization failure, carrying the node it originated at so the
/// controller can move the cursor there.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct QueryError {
    kind: QueryErrorKind,
    node: Option<NodeId>,
}

impl QueryError {
    pub(crate) fn new(kind: QueryErrorKind, node: Option<NodeId>) -> Self {
        Self { kind, node }
    }

    /// What went wrong.
    pub fn kind(&self) -> &QueryErrorKind {
        &self.kind
    }

    /// The offending node, when the failure is attributable to one.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

/// The kinds of serialization failure, with their user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryErrorKind {
    #[error("No fields selected.")]
    NoFieldsSelected,
    #[error("No fields selected in '{0}'.")]
    NoFieldsSelectedIn(String),
    #[error("Missing variable name.")]
    MissingVariableName,
    #[error("Missing scalar value.")]
    MissingScalarValue,
    #[error("Missing enum value.")]
    MissingEnumValue,
    #[error("'{0}' is not an integer.")]
    NotAnInteger(String),
    #[error("'{0}' is not a float.")]
    NotAFloat(String),
    #[error("Boolean must be 'true' or 'false', not '{0}'.")]
    InvalidBoolean(String),
    #[error("Invalid enum value '{0}'.")]
    InvalidEnumValue(String),
    #[error("Variable '{0}' has more than one type.")]
    VariableHasMultipleTypes(String),
}

/// Errors raised while restoring a persisted tree.
///
/// Missing or renamed entries are not errors; they are silently dropped for
/// a best-effort restore. Only a document we cannot interpret at all fails.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Unsupported tree JSON version {0}.")]
    UnsupportedVersion(u64),
    #[error("Tree JSON is not an object.")]
    NotAnObject,
    #[error("Tree JSON carries no usable schema: {0}")]
    InvalidSchema(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
}
