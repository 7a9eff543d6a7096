use indexmap::IndexMap;

use crate::error::{QueryError, QueryErrorKind};
use crate::node::{NodeId, NodeKind};
use crate::tree::Tree;

/// Variable name to stringified type, in first-seen order.
type Variables = IndexMap<String, String>;

/// How one entry of a fields collection contributes to the query.
enum Entry {
    SelectedLeaf(String),
    ExpandedObject,
    Argument(String),
    Skip,
}

impl Tree {
    /// Serialize the operation root that contains the cursor into an
    /// executable GraphQL document.
    ///
    /// Which side of the synthetic root the cursor's ancestor field lives on
    /// decides between `query Query` and `mutation Mutation`. Variable
    /// references collected along the way become the operation's variable
    /// definitions; two arguments naming the same variable must agree on its
    /// type.
    pub fn query(&mut self) -> Result<String, QueryError> {
        let Some(cursor) = self.cursor else {
            return Err(QueryError::new(QueryErrorKind::NoFieldsSelected, None));
        };

        let root_field = self.root_field_of(cursor);
        let fields = self.children_of(self.root).to_vec();
        let number_of_query_fields = match &self.node(self.root).kind {
            NodeKind::Object(object) => object.number_of_query_fields,
            _ => 0,
        };
        let index = fields.iter().position(|&f| f == root_field).unwrap_or(0);

        let (slice, operation) = if index < number_of_query_fields {
            (&fields[..number_of_query_fields], "query Query")
        } else {
            (&fields[number_of_query_fields..], "mutation Mutation")
        };
        let slice = slice.to_vec();

        let mut variables = Variables::new();
        let (items, _) = self.fields_query(&slice, &mut variables, None)?;

        if items.is_empty() {
            return Err(QueryError::new(QueryErrorKind::NoFieldsSelected, None));
        }

        let definitions = if variables.is_empty() {
            String::new()
        } else {
            let definitions: Vec<String> = variables
                .iter()
                .map(|(name, ty)| format!("${name}:{ty}"))
                .collect();

            format!("({})", definitions.join(","))
        };

        Ok(format!("{operation}{definitions} {{{}}}", items.join(" ")))
    }

    /// The root field whose subtree contains `id`.
    fn root_field_of(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            if parent == self.root {
                break;
            }

            id = parent;
        }

        id
    }

    /// Walk one fields collection: selected leaves and expanded objects
    /// become selection items, emitted arguments become `name:value` pairs.
    /// Entries at or past `implementors_offset` serialize as inline
    /// fragments.
    fn fields_query(
        &mut self,
        fields: &[NodeId],
        variables: &mut Variables,
        implementors_offset: Option<usize>,
    ) -> Result<(Vec<String>, Vec<String>), QueryError> {
        let mut items = Vec::new();
        let mut arguments = Vec::new();

        for (i, &field) in fields.iter().enumerate() {
            let entry = match &self.node(field).kind {
                NodeKind::Leaf(leaf) if leaf.is_selected => Entry::SelectedLeaf(leaf.name.clone()),
                NodeKind::Object(object) if object.is_expanded => Entry::ExpandedObject,
                kind => match kind.argument() {
                    Some(base) => Entry::Argument(base.name.clone()),
                    None => Entry::Skip,
                },
            };

            match entry {
                Entry::SelectedLeaf(name) => {
                    self.materialize(field);
                    let children = self.children_of(field).to_vec();
                    let (_, leaf_arguments) = self.fields_query(&children, variables, None)?;

                    items.push(format!("{name}{}", wrap_arguments(&leaf_arguments)));
                }
                Entry::ExpandedObject => {
                    let is_pseudo = implementors_offset.is_some_and(|offset| i >= offset);

                    if is_pseudo {
                        items.push(self.fragment_query(field, variables)?);
                    } else {
                        items.push(self.object_query(field, variables)?);
                    }
                }
                Entry::Argument(name) => {
                    if let Some(value) = self.argument_query(field, variables)? {
                        arguments.push(format!("{name}:{value}"));
                    }
                }
                Entry::Skip => {}
            }
        }

        Ok((items, arguments))
    }

    fn object_query(&mut self, id: NodeId, variables: &mut Variables) -> Result<String, QueryError> {
        self.materialize(id);

        let (name, is_union, implementors_offset) = match &self.node(id).kind {
            NodeKind::Object(object) => (
                object.name.clone(),
                object.is_union,
                object.implementors_offset,
            ),
            _ => return Ok(String::new()),
        };

        let children = self.children_of(id).to_vec();
        let (mut items, arguments) = self.fields_query(&children, variables, implementors_offset)?;

        if is_union {
            items.insert(0, "__typename".to_string());
        }

        if items.is_empty() {
            return Err(QueryError::new(
                QueryErrorKind::NoFieldsSelectedIn(name),
                Some(id),
            ));
        }

        Ok(format!(
            "{name}{} {{{}}}",
            wrap_arguments(&arguments),
            items.join(" ")
        ))
    }

    /// An implementor pseudo-field: `... on TypeName { … }`.
    fn fragment_query(
        &mut self,
        id: NodeId,
        variables: &mut Variables,
    ) -> Result<String, QueryError> {
        self.materialize(id);

        let (name, implementors_offset) = match &self.node(id).kind {
            NodeKind::Object(object) => (object.name.clone(), object.implementors_offset),
            _ => return Ok(String::new()),
        };

        let children = self.children_of(id).to_vec();
        let (items, _) = self.fields_query(&children, variables, implementors_offset)?;

        if items.is_empty() {
            return Err(QueryError::new(
                QueryErrorKind::NoFieldsSelectedIn(name),
                Some(id),
            ));
        }

        Ok(format!("... on {name} {{{}}}", items.join(" ")))
    }

    /// The value an argument contributes, or `None` when it is omitted.
    fn argument_query(
        &mut self,
        id: NodeId,
        variables: &mut Variables,
    ) -> Result<Option<String>, QueryError> {
        let Some(base) = self.node(id).kind.argument() else {
            return Ok(None);
        };
        let is_variable = base.is_variable;
        let is_emitted = base.is_emitted();
        let value = base.value.clone();

        if is_variable {
            if value.is_empty() {
                return Err(QueryError::new(QueryErrorKind::MissingVariableName, Some(id)));
            }

            let ty = self.node(id).ty.clone();

            match variables.get(&value) {
                Some(existing) if existing != &ty => {
                    return Err(QueryError::new(
                        QueryErrorKind::VariableHasMultipleTypes(value),
                        Some(id),
                    ));
                }
                Some(_) => {}
                None => {
                    variables.insert(value.clone(), ty);
                }
            }

            return Ok(Some(format!("${value}")));
        }

        if !is_emitted {
            return Ok(None);
        }

        if matches!(self.node(id).kind, NodeKind::Scalar(_)) {
            self.scalar_value(id).map(Some)
        } else if matches!(self.node(id).kind, NodeKind::Enum(_)) {
            self.enum_value(id).map(Some)
        } else if matches!(self.node(id).kind, NodeKind::Input(_)) {
            self.input_query(id, variables).map(Some)
        } else if matches!(self.node(id).kind, NodeKind::List(_)) {
            self.list_query(id, variables).map(Some)
        } else {
            Ok(None)
        }
    }

    fn scalar_value(&self, id: NodeId) -> Result<String, QueryError> {
        let NodeKind::Scalar(argument) = &self.node(id).kind else {
            return Ok(String::new());
        };
        let value = &argument.base.value;

        if argument.is_string() {
            return Ok(format!("\"{value}\""));
        }

        if value.is_empty() {
            return Err(QueryError::new(QueryErrorKind::MissingScalarValue, Some(id)));
        }

        match argument.inner_type.as_str() {
            "Int" => {
                if value.parse::<i64>().is_err() {
                    return Err(QueryError::new(
                        QueryErrorKind::NotAnInteger(value.clone()),
                        Some(id),
                    ));
                }
            }
            "Float" => {
                if !value.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                    return Err(QueryError::new(
                        QueryErrorKind::NotAFloat(value.clone()),
                        Some(id),
                    ));
                }
            }
            "Boolean" => {
                if value != "true" && value != "false" {
                    return Err(QueryError::new(
                        QueryErrorKind::InvalidBoolean(value.clone()),
                        Some(id),
                    ));
                }
            }
            _ => {}
        }

        Ok(value.clone())
    }

    fn enum_value(&self, id: NodeId) -> Result<String, QueryError> {
        let NodeKind::Enum(argument) = &self.node(id).kind else {
            return Ok(String::new());
        };
        let value = &argument.base.value;

        if value.is_empty() {
            return Err(QueryError::new(QueryErrorKind::MissingEnumValue, Some(id)));
        }

        if !argument.members.iter().any(|member| member == value) {
            return Err(QueryError::new(
                QueryErrorKind::InvalidEnumValue(value.clone()),
                Some(id),
            ));
        }

        Ok(value.clone())
    }

    fn input_query(&mut self, id: NodeId, variables: &mut Variables) -> Result<String, QueryError> {
        self.materialize(id);

        let children = self.children_of(id).to_vec();
        let (_, arguments) = self.fields_query(&children, variables, None)?;

        Ok(format!("{{{}}}", arguments.join(",")))
    }

    /// Expanded items contribute their value, or `null` while it is unset;
    /// collapsed items contribute nothing.
    fn list_query(&mut self, id: NodeId, variables: &mut Variables) -> Result<String, QueryError> {
        let items = match &self.node(id).kind {
            NodeKind::List(list) => list.items.clone(),
            _ => Vec::new(),
        };

        let mut parts = Vec::new();

        for item in items {
            let is_expanded = match &self.node(item).kind {
                NodeKind::ListItem(it) => it.is_expanded,
                _ => false,
            };

            if !is_expanded {
                continue;
            }

            self.materialize_item(item);

            let inner = match &self.node(item).kind {
                NodeKind::ListItem(it) => it.inner,
                _ => None,
            };

            match inner {
                Some(inner) => match self.argument_query(inner, variables)? {
                    Some(value) => parts.push(value),
                    None => parts.push("null".to_string()),
                },
                None => parts.push("null".to_string()),
            }
        }

        Ok(format!("[{}]", parts.join(", ")))
    }
}

fn wrap_arguments(arguments: &[String]) -> String {
    if arguments.is_empty() {
        String::new()
    } else {
        format!("({})", arguments.join(","))
    }
}
