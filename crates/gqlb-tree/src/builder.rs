use gqlb_introspection::{FieldInfo, FullType, InputValueInfo, Introspection, TypeKind, TypeRef};
use indexmap::IndexMap;

use crate::error::BuildError;
use crate::node::{
    ArgumentBase, EnumArgument, FieldsDescriptor, FieldsState, InputArgument, LeafNode,
    ListArgument, ListItemNode, Node, NodeId, NodeKind, ObjectNode, ScalarArgument,
};
use crate::tree::Tree;

impl Tree {
    /// Build a fresh tree from an introspection document.
    ///
    /// The root is a synthetic object whose children are the query fields
    /// followed by the mutation fields; the cursor starts on the first of
    /// them. Sub-fields of object-like types are materialized on first
    /// access, so recursive schemas build in finite time.
    ///
    /// Fails if the document references a type it does not define, or
    /// truncates a type reference before reaching a named type.
    pub fn from_introspection(schema: Introspection) -> Result<Self, BuildError> {
        let mut types: IndexMap<String, FullType> = IndexMap::new();

        for ty in &schema.schema.types {
            if let Some(name) = &ty.name {
                types.insert(name.clone(), ty.clone());
            }
        }

        validate_references(&types)?;

        let query_fields = operation_fields(&types, schema.schema.query_type.as_ref())?;
        let mutation_fields = operation_fields(&types, schema.schema.mutation_type.as_ref())?;

        let number_of_query_fields = query_fields.len();
        let mut fields = query_fields;
        fields.extend(mutation_fields);

        let mut tree = Tree::empty(schema, types);
        let root = tree.push(Node::new(
            String::new(),
            None,
            NodeKind::Object(ObjectNode {
                name: String::new(),
                is_root: true,
                is_union: false,
                is_expanded: true,
                is_deprecated: false,
                number_of_query_fields,
                implementors_offset: None,
                fields: FieldsState::Pending(FieldsDescriptor {
                    fields,
                    ..FieldsDescriptor::default()
                }),
            }),
        ));
        tree.root = root;
        tree.materialize(root);
        tree.cursor = tree.children_of(root).first().copied();

        Ok(tree)
    }

    /// Expand a pending fields descriptor into nodes: arguments, then
    /// sub-fields, then implementor pseudo-fields. Idempotent.
    pub(crate) fn materialize(&mut self, id: NodeId) {
        let desc = match self.take_pending(id) {
            Some(desc) => desc,
            None => return,
        };

        let mut ids = Vec::with_capacity(
            desc.arguments.len() + desc.fields.len() + desc.implementors.len(),
        );

        for argument in &desc.arguments {
            ids.push(self.build_argument(argument));
        }

        for field in &desc.fields {
            ids.push(self.build_field(field));
        }

        for implementor in &desc.implementors {
            ids.push(self.build_implementor(implementor));
        }

        self.link_children(id, &ids);

        if !desc.implementors.is_empty() {
            if let NodeKind::Object(object) = &mut self.node_mut(id).kind {
                object.implementors_offset =
                    Some(desc.arguments.len() + desc.fields.len());
            }
        }

        if let Some(state) = self.fields_state_mut(id) {
            *state = FieldsState::Ready(ids);
        }
    }

    /// Create the wrapped value node of a list item from the list's element
    /// type. Idempotent.
    pub(crate) fn materialize_item(&mut self, item: NodeId) {
        let already = match &self.node(item).kind {
            NodeKind::ListItem(it) => it.inner.is_some(),
            _ => true,
        };

        if already {
            return;
        }

        let item_type = match self.node(item).parent.map(|p| &self.node(p).kind) {
            Some(NodeKind::List(list)) => list.item_type.clone(),
            _ => return,
        };

        let info = InputValueInfo {
            name: "value".to_string(),
            description: None,
            ty: item_type,
            default_value: None,
        };
        let inner = self.build_argument(&info);
        self.node_mut(inner).parent = Some(item);

        if let NodeKind::ListItem(it) = &mut self.node_mut(item).kind {
            it.inner = Some(inner);
        }
    }

    /// Append the trailing placeholder item of a list argument.
    pub(crate) fn append_list_item(&mut self, list: NodeId) -> NodeId {
        let ty_label = match &self.node(list).kind {
            NodeKind::List(l) => l.item_type.to_string(),
            _ => String::new(),
        };

        let item = self.push(Node::new(
            ty_label,
            None,
            NodeKind::ListItem(ListItemNode {
                is_expanded: false,
                inner: None,
            }),
        ));
        self.node_mut(item).parent = Some(list);

        let last = match &self.node(list).kind {
            NodeKind::List(l) => l.items.last().copied(),
            _ => None,
        };

        if let Some(last) = last {
            self.node_mut(last).next = Some(item);
            self.node_mut(item).prev = Some(last);
        }

        if let NodeKind::List(l) = &mut self.node_mut(list).kind {
            l.items.push(item);
        }

        item
    }

    fn build_field(&mut self, info: &FieldInfo) -> NodeId {
        let ty_label = info.ty.to_string();
        let unwrapped = info.ty.unwrapped();
        let kind = unwrapped.kind;
        let type_name = unwrapped.name.clone().unwrap_or_default();

        let node_kind = match kind {
            TypeKind::Object | TypeKind::Interface | TypeKind::Union => {
                NodeKind::Object(ObjectNode {
                    name: info.name.clone(),
                    is_root: false,
                    is_union: kind == TypeKind::Union,
                    is_expanded: false,
                    is_deprecated: info.is_deprecated,
                    number_of_query_fields: 0,
                    implementors_offset: None,
                    fields: FieldsState::Pending(
                        self.object_descriptor(&type_name, info.args.clone()),
                    ),
                })
            }
            _ => NodeKind::Leaf(LeafNode {
                name: info.name.clone(),
                is_selected: false,
                is_deprecated: info.is_deprecated,
                arguments: FieldsState::Pending(FieldsDescriptor {
                    arguments: info.args.clone(),
                    ..FieldsDescriptor::default()
                }),
            }),
        };

        self.push(Node::new(ty_label, info.description.clone(), node_kind))
    }

    fn build_implementor(&mut self, name: &str) -> NodeId {
        let description = self.types.get(name).and_then(|ty| ty.description.clone());
        let object = ObjectNode {
            name: name.to_string(),
            is_root: false,
            is_union: false,
            is_expanded: false,
            is_deprecated: false,
            number_of_query_fields: 0,
            implementors_offset: None,
            fields: FieldsState::Pending(self.object_descriptor(name, Vec::new())),
        };

        self.push(Node::new(
            name.to_string(),
            description,
            NodeKind::Object(object),
        ))
    }

    pub(crate) fn build_argument(&mut self, info: &InputValueInfo) -> NodeId {
        let ty_label = info.ty.to_string();
        let base = ArgumentBase::new(
            info.name.clone(),
            !info.ty.is_non_null(),
            info.default_value.is_some(),
        );

        let stripped = info.ty.strip_non_null();
        let node_kind = if stripped.kind == TypeKind::List {
            let item_type = stripped
                .of_type
                .as_deref()
                .cloned()
                .unwrap_or_else(|| stripped.clone());

            NodeKind::List(ListArgument {
                base,
                item_type,
                items: Vec::new(),
            })
        } else {
            let unwrapped = info.ty.unwrapped();
            let type_name = unwrapped.name.clone().unwrap_or_default();

            match unwrapped.kind {
                TypeKind::InputObject => NodeKind::Input(InputArgument {
                    base,
                    fields: FieldsState::Pending(self.input_descriptor(&type_name)),
                }),
                TypeKind::Enum => NodeKind::Enum(EnumArgument {
                    base,
                    members: self.enum_members(&type_name),
                }),
                _ => NodeKind::Scalar(ScalarArgument {
                    base,
                    inner_type: type_name,
                }),
            }
        };

        let is_list = matches!(node_kind, NodeKind::List(_));
        let id = self.push(Node::new(ty_label, info.description.clone(), node_kind));

        if is_list {
            self.append_list_item(id);
        }

        id
    }

    /// The descriptor of an object-like type: its fields, plus implementor
    /// pseudo-fields for interfaces and unions.
    fn object_descriptor(
        &self,
        type_name: &str,
        arguments: Vec<InputValueInfo>,
    ) -> FieldsDescriptor {
        let Some(ty) = self.types.get(type_name) else {
            return FieldsDescriptor {
                arguments,
                ..FieldsDescriptor::default()
            };
        };

        let fields = match ty.kind {
            TypeKind::Object | TypeKind::Interface => ty.fields.clone().unwrap_or_default(),
            _ => Vec::new(),
        };
        let implementors = match ty.kind {
            TypeKind::Interface | TypeKind::Union => ty
                .possible_types
                .iter()
                .flatten()
                .filter_map(|possible| possible.unwrapped().name.clone())
                .collect(),
            _ => Vec::new(),
        };

        FieldsDescriptor {
            arguments,
            fields,
            implementors,
        }
    }

    fn input_descriptor(&self, type_name: &str) -> FieldsDescriptor {
        FieldsDescriptor {
            arguments: self
                .types
                .get(type_name)
                .and_then(|ty| ty.input_fields.clone())
                .unwrap_or_default(),
            ..FieldsDescriptor::default()
        }
    }

    fn enum_members(&self, type_name: &str) -> Vec<String> {
        self.types
            .get(type_name)
            .and_then(|ty| ty.enum_values.as_ref())
            .map(|values| values.iter().map(|value| value.name.clone()).collect())
            .unwrap_or_default()
    }

    fn fields_state_mut(&mut self, id: NodeId) -> Option<&mut FieldsState> {
        match &mut self.node_mut(id).kind {
            NodeKind::Object(object) => Some(&mut object.fields),
            NodeKind::Leaf(leaf) => Some(&mut leaf.arguments),
            NodeKind::Input(input) => Some(&mut input.fields),
            _ => None,
        }
    }

    fn take_pending(&mut self, id: NodeId) -> Option<FieldsDescriptor> {
        let state = self.fields_state_mut(id)?;

        if matches!(state, FieldsState::Ready(_)) {
            return None;
        }

        match std::mem::replace(state, FieldsState::Ready(Vec::new())) {
            FieldsState::Pending(desc) => Some(desc),
            FieldsState::Ready(_) => None,
        }
    }

    fn link_children(&mut self, parent: NodeId, ids: &[NodeId]) {
        for &id in ids {
            self.node_mut(id).parent = Some(parent);
        }

        for pair in ids.windows(2) {
            self.node_mut(pair[0]).next = Some(pair[1]);
            self.node_mut(pair[1]).prev = Some(pair[0]);
        }
    }
}

fn operation_fields(
    types: &IndexMap<String, FullType>,
    operation_type: Option<&gqlb_introspection::NamedType>,
) -> Result<Vec<FieldInfo>, BuildError> {
    let Some(operation_type) = operation_type else {
        return Ok(Vec::new());
    };

    let ty = types
        .get(&operation_type.name)
        .ok_or_else(|| BuildError::TypeNotFound(operation_type.name.clone()))?;

    Ok(ty.fields.clone().unwrap_or_default())
}

/// Reject schemas whose type references cannot all be resolved, so lazy
/// materialization never has to fail.
fn validate_references(types: &IndexMap<String, FullType>) -> Result<(), BuildError> {
    for ty in types.values() {
        for field in ty.fields.iter().flatten() {
            check_reference(types, &field.ty, &field.name)?;

            for argument in &field.args {
                check_reference(types, &argument.ty, &argument.name)?;
            }
        }

        for input_field in ty.input_fields.iter().flatten() {
            check_reference(types, &input_field.ty, &input_field.name)?;
        }

        let context = ty.name.as_deref().unwrap_or_default();

        for interface in ty.interfaces.iter().flatten() {
            check_reference(types, interface, context)?;
        }

        for possible in ty.possible_types.iter().flatten() {
            check_reference(types, possible, context)?;
        }
    }

    Ok(())
}

fn check_reference(
    types: &IndexMap<String, FullType>,
    ty: &TypeRef,
    context: &str,
) -> Result<(), BuildError> {
    let mut current = ty;

    while matches!(current.kind, TypeKind::NonNull | TypeKind::List) {
        match &current.of_type {
            Some(inner) => current = inner,
            None => return Err(BuildError::UnnamedTypeRef(context.to_string())),
        }
    }

    let name = current
        .name
        .as_deref()
        .ok_or_else(|| BuildError::UnnamedTypeRef(context.to_string()))?;

    if types.contains_key(name) {
        Ok(())
    } else {
        Err(BuildError::TypeNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar(name: &str) -> TypeRef {
        TypeRef {
            kind: TypeKind::Scalar,
            name: Some(name.to_string()),
            of_type: None,
        }
    }

    fn non_null(inner: TypeRef) -> TypeRef {
        TypeRef {
            kind: TypeKind::NonNull,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    fn argument(name: &str, ty: TypeRef, default_value: Option<&str>) -> InputValueInfo {
        InputValueInfo {
            name: name.to_string(),
            description: None,
            ty,
            default_value: default_value.map(str::to_string),
        }
    }

    #[test]
    fn it_classifies_argument_symbols() {
        let optional = ArgumentBase::new("a".to_string(), true, false);
        assert_eq!(optional.symbol, crate::node::Symbol::Unselected);
        assert!(optional.is_toggleable());

        let required = ArgumentBase::new("b".to_string(), false, false);
        assert_eq!(required.symbol, crate::node::Symbol::Required);
        assert!(!required.is_toggleable());

        let defaulted = ArgumentBase::new("c".to_string(), false, true);
        assert_eq!(defaulted.symbol, crate::node::Symbol::Unselected);
        assert!(defaulted.is_toggleable());
    }

    #[test]
    fn it_rejects_unresolved_type_references() {
        let mut types = IndexMap::new();
        types.insert(
            "Query".to_string(),
            FullType {
                kind: TypeKind::Object,
                name: Some("Query".to_string()),
                description: None,
                fields: Some(vec![FieldInfo {
                    name: "a".to_string(),
                    description: None,
                    args: vec![argument("b", non_null(scalar("Missing")), None)],
                    ty: scalar("String"),
                    is_deprecated: false,
                    deprecation_reason: None,
                }]),
                input_fields: None,
                interfaces: None,
                enum_values: None,
                possible_types: None,
            },
        );
        types.insert(
            "String".to_string(),
            FullType {
                kind: TypeKind::Scalar,
                name: Some("String".to_string()),
                description: None,
                fields: None,
                input_fields: None,
                interfaces: None,
                enum_values: None,
                possible_types: None,
            },
        );

        assert_eq!(
            validate_references(&types),
            Err(BuildError::TypeNotFound("Missing".to_string()))
        );
    }
}
