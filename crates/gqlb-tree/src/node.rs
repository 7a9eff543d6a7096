use gqlb_introspection::{FieldInfo, InputValueInfo, TypeRef};

/// Handle to a node in a [`Tree`](crate::Tree)'s arena.
///
/// Ids are stable for the lifetime of the tree that issued them; removing a
/// list item unlinks its nodes but never reuses their slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the selection tree: sibling/parent links shared by every
/// variant, plus the variant payload.
///
/// `child` is the preferred "one step down" target of the state machine. It
/// is set exactly while the node's children are visible, so cursor motion
/// never lands on a hidden line.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    /// Stringified GraphQL type, wrappers included, e.g. `[String!]!`.
    pub(crate) ty: String,
    pub(crate) description: Option<String>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(ty: String, description: Option<String>, kind: NodeKind) -> Self {
        Self {
            parent: None,
            prev: None,
            next: None,
            child: None,
            ty,
            description,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Object(ObjectNode),
    Leaf(LeafNode),
    Scalar(ScalarArgument),
    Enum(EnumArgument),
    Input(InputArgument),
    List(ListArgument),
    ListItem(ListItemNode),
}

impl NodeKind {
    /// The persistence tag of this variant.
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            NodeKind::Object(_) => "object",
            NodeKind::Leaf(_) => "leaf",
            NodeKind::Scalar(_) => "scalar_argument",
            NodeKind::Enum(_) => "enum_argument",
            NodeKind::Input(_) => "input_argument",
            NodeKind::List(_) => "list_argument",
            NodeKind::ListItem(_) => "list_item",
        }
    }

    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Object(o) => Some(&o.name),
            NodeKind::Leaf(l) => Some(&l.name),
            NodeKind::Scalar(a) => Some(&a.base.name),
            NodeKind::Enum(a) => Some(&a.base.name),
            NodeKind::Input(a) => Some(&a.base.name),
            NodeKind::List(a) => Some(&a.base.name),
            NodeKind::ListItem(_) => None,
        }
    }

    /// Whether this variant serializes into a parent's argument list rather
    /// than its selection set.
    pub(crate) fn is_argument(&self) -> bool {
        self.argument().is_some()
    }

    pub(crate) fn argument(&self) -> Option<&ArgumentBase> {
        match self {
            NodeKind::Scalar(a) => Some(&a.base),
            NodeKind::Enum(a) => Some(&a.base),
            NodeKind::Input(a) => Some(&a.base),
            NodeKind::List(a) => Some(&a.base),
            _ => None,
        }
    }

    pub(crate) fn argument_mut(&mut self) -> Option<&mut ArgumentBase> {
        match self {
            NodeKind::Scalar(a) => Some(&mut a.base),
            NodeKind::Enum(a) => Some(&mut a.base),
            NodeKind::Input(a) => Some(&mut a.base),
            NodeKind::List(a) => Some(&mut a.base),
            _ => None,
        }
    }
}

/// A named selection on an object, interface or union type.
#[derive(Debug, Clone)]
pub(crate) struct ObjectNode {
    pub(crate) name: String,
    pub(crate) is_root: bool,
    pub(crate) is_union: bool,
    pub(crate) is_expanded: bool,
    pub(crate) is_deprecated: bool,
    /// Root only: fields before this index select into `query Query`, the
    /// rest into `mutation Mutation`.
    pub(crate) number_of_query_fields: usize,
    /// Index of the first implementor pseudo-field, once materialized.
    pub(crate) implementors_offset: Option<usize>,
    pub(crate) fields: FieldsState,
}

/// A scalar- or enum-returning selection.
#[derive(Debug, Clone)]
pub(crate) struct LeafNode {
    pub(crate) name: String,
    pub(crate) is_selected: bool,
    pub(crate) is_deprecated: bool,
    pub(crate) arguments: FieldsState,
}

/// Selection symbol of an argument line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Unselected,
    Selected,
    Required,
}

impl Symbol {
    pub(crate) fn glyph(self) -> &'static str {
        match self {
            Symbol::Unselected => "□",
            Symbol::Selected => "■",
            Symbol::Required => "●",
        }
    }

    pub(crate) fn toggled(self) -> Self {
        match self {
            Symbol::Unselected => Symbol::Selected,
            Symbol::Selected => Symbol::Unselected,
            Symbol::Required => Symbol::Required,
        }
    }
}

/// State shared by every argument variant: the selection symbol, variable
/// mode, and the editable text with its caret.
#[derive(Debug, Clone)]
pub(crate) struct ArgumentBase {
    pub(crate) name: String,
    pub(crate) is_optional: bool,
    pub(crate) has_default: bool,
    pub(crate) is_variable: bool,
    pub(crate) symbol: Symbol,
    pub(crate) value: String,
    pub(crate) pos: usize,
}

impl ArgumentBase {
    pub(crate) fn new(name: String, is_optional: bool, has_default: bool) -> Self {
        let symbol = if !is_optional && !has_default {
            Symbol::Required
        } else {
            Symbol::Unselected
        };

        Self {
            name,
            is_optional,
            has_default,
            is_variable: false,
            symbol,
            value: String::new(),
            pos: 0,
        }
    }

    /// Whether the `■`/`□` cycle is unlocked for this argument.
    pub(crate) fn is_toggleable(&self) -> bool {
        self.is_optional || self.has_default
    }

    /// Whether the argument contributes to the emitted query.
    pub(crate) fn is_emitted(&self) -> bool {
        self.symbol != Symbol::Unselected
    }
}

/// A scalar input value.
#[derive(Debug, Clone)]
pub(crate) struct ScalarArgument {
    pub(crate) base: ArgumentBase,
    /// The unwrapped type name: `Int`, `Float`, `Boolean`, `String`, `ID` or
    /// a custom scalar.
    pub(crate) inner_type: String,
}

impl ScalarArgument {
    pub(crate) fn is_string(&self) -> bool {
        matches!(self.inner_type.as_str(), "String" | "ID")
    }
}

/// An enum input value, with the legal members for completion and
/// validation.
#[derive(Debug, Clone)]
pub(crate) struct EnumArgument {
    pub(crate) base: ArgumentBase,
    pub(crate) members: Vec<String>,
}

/// A nested input object.
#[derive(Debug, Clone)]
pub(crate) struct InputArgument {
    pub(crate) base: ArgumentBase,
    pub(crate) fields: FieldsState,
}

/// A growable list input. `items` always ends with one trailing placeholder
/// item that acts as the add-new affordance.
#[derive(Debug, Clone)]
pub(crate) struct ListArgument {
    pub(crate) base: ArgumentBase,
    /// Element type, used to materialize item values lazily.
    pub(crate) item_type: TypeRef,
    pub(crate) items: Vec<NodeId>,
}

/// One entry of a [`ListArgument`]. The wrapped value node is created on
/// first expansion.
#[derive(Debug, Clone)]
pub(crate) struct ListItemNode {
    pub(crate) is_expanded: bool,
    pub(crate) inner: Option<NodeId>,
}

/// Children of an Object/Leaf/InputArgument: either the schema info needed
/// to build them, or the built node ids.
///
/// Keeping the descriptor un-built until first observation is what makes
/// self-referential schemas (`type Foo { foo: Foo }`) representable.
#[derive(Debug, Clone)]
pub(crate) enum FieldsState {
    Pending(FieldsDescriptor),
    Ready(Vec<NodeId>),
}

impl FieldsState {
    pub(crate) fn ready(&self) -> Option<&[NodeId]> {
        match self {
            FieldsState::Ready(ids) => Some(ids),
            FieldsState::Pending(_) => None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            FieldsState::Pending(desc) => {
                desc.arguments.is_empty() && desc.fields.is_empty() && desc.implementors.is_empty()
            }
            FieldsState::Ready(ids) => ids.is_empty(),
        }
    }
}

/// Schema info resolved at node creation, expanded into nodes on first
/// access. Arguments come first, then sub-fields, then implementor
/// pseudo-fields.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldsDescriptor {
    pub(crate) arguments: Vec<InputValueInfo>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) implementors: Vec<String>,
}
