//! Backend property metadata for the query-building strategy.
//!
//! The translator never knows the object model; it asks a
//! [`PropertyResolver`] what each dotted path is. [`Schema`] is a plain
//! in-memory resolver for tests, the CLI and small embedders.

use std::collections::{BTreeMap, HashMap};

use crate::error::UnknownProperty;

/// How a property relates its owner to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// A column of the owner
    Simple,
    /// 1:1 reference to another object
    Reference,
    /// 1:many collection of other objects
    Collection,
}

/// Type of a simple property's value, used to type query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Integer,
    Number,
    Boolean,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
        }
    }
}

/// Metadata of one resolved path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyHandle {
    pub name: String,
    /// Member name used in generated query text
    pub column: String,
    pub kind: PropertyKind,
    /// Whether the value (or each element) is an identifiable object
    pub identifiable: bool,
    /// Embedded objects are navigated like columns, without a join
    pub embedded: bool,
    pub value_type: ValueType,
    /// Type name of the referenced object or collection element
    pub item_type: Option<String>,
}

impl PropertyHandle {
    pub fn simple(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        PropertyHandle {
            column: name.clone(),
            name,
            kind: PropertyKind::Simple,
            identifiable: false,
            embedded: false,
            value_type,
            item_type: None,
        }
    }

    pub fn reference(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        PropertyHandle {
            kind: PropertyKind::Reference,
            identifiable: true,
            item_type: Some(item_type.into()),
            ..PropertyHandle::simple(name, ValueType::Text)
        }
    }

    pub fn collection(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        PropertyHandle {
            kind: PropertyKind::Collection,
            identifiable: true,
            item_type: Some(item_type.into()),
            ..PropertyHandle::simple(name, ValueType::Text)
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self.identifiable = false;
        self
    }

    pub fn is_collection(&self) -> bool {
        self.kind == PropertyKind::Collection
    }
}

/// Maps dotted paths to backend metadata.
pub trait PropertyResolver {
    /// The chain of handles for `path`, one per segment.
    fn resolve(&self, path: &[String]) -> Result<Vec<PropertyHandle>, UnknownProperty>;

    /// Property names of the type reached by `path` (the root type when
    /// empty), as expanded by `*`.
    fn properties(&self, path: &[String]) -> Result<Vec<String>, UnknownProperty>;

    /// The identity property of every identifiable type (`_`, short syntax).
    fn identity(&self) -> PropertyHandle {
        PropertyHandle::simple("id", ValueType::Text)
    }
}

/// Properties of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSchema {
    pub name: String,
    pub properties: BTreeMap<String, PropertyHandle>,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        TypeSchema {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn property(mut self, handle: PropertyHandle) -> Self {
        self.properties.insert(handle.name.clone(), handle);
        self
    }
}

/// An in-memory [`PropertyResolver`] over a set of types.
///
/// # Examples
///
/// ```
/// use gistql::resolver::{PropertyHandle, PropertyResolver, Schema, TypeSchema, ValueType};
///
/// let schema = Schema::new("User")
///     .with_type(TypeSchema::new("User")
///         .property(PropertyHandle::simple("name", ValueType::Text))
///         .property(PropertyHandle::collection("groups", "UserGroup")))
///     .with_type(TypeSchema::new("UserGroup")
///         .property(PropertyHandle::simple("name", ValueType::Text)));
///
/// let path = vec!["groups".to_string(), "name".to_string()];
/// assert_eq!(schema.resolve(&path).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    root: String,
    types: HashMap<String, TypeSchema>,
}

impl Schema {
    pub fn new(root: impl Into<String>) -> Self {
        Schema {
            root: root.into(),
            types: HashMap::new(),
        }
    }

    pub fn with_type(mut self, schema: TypeSchema) -> Self {
        self.types.insert(schema.name.clone(), schema);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn type_at(&self, path: &[String]) -> Result<&TypeSchema, UnknownProperty> {
        let unknown = || UnknownProperty::new(path.join("."));
        let mut current = self.types.get(&self.root).ok_or_else(unknown)?;
        for segment in path {
            let handle = current.properties.get(segment).ok_or_else(unknown)?;
            let item_type = handle.item_type.as_ref().ok_or_else(unknown)?;
            current = self.types.get(item_type).ok_or_else(unknown)?;
        }
        Ok(current)
    }
}

impl PropertyResolver for Schema {
    fn resolve(&self, path: &[String]) -> Result<Vec<PropertyHandle>, UnknownProperty> {
        let unknown = || UnknownProperty::new(path.join("."));
        if path.is_empty() {
            return Err(unknown());
        }
        let mut handles = Vec::with_capacity(path.len());
        let mut owner = self.types.get(&self.root).ok_or_else(unknown)?;

        for (i, segment) in path.iter().enumerate() {
            let handle = owner.properties.get(segment).ok_or_else(unknown)?;
            if i + 1 < path.len() {
                let item_type = handle.item_type.as_ref().ok_or_else(unknown)?;
                owner = self.types.get(item_type).ok_or_else(unknown)?;
            }
            handles.push(handle.clone());
        }
        Ok(handles)
    }

    fn properties(&self, path: &[String]) -> Result<Vec<String>, UnknownProperty> {
        Ok(self.type_at(path)?.properties.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    fn schema() -> Schema {
        Schema::new("User")
            .with_type(
                TypeSchema::new("User")
                    .property(PropertyHandle::simple("name", ValueType::Text))
                    .property(PropertyHandle::reference("owner", "User")),
            )
    }

    #[test]
    fn unknown_segment_reports_the_whole_path() {
        let err = schema().resolve(&path("owner.nope")).unwrap_err();
        assert_eq!(err.path, "owner.nope");
    }

    #[test]
    fn cannot_navigate_into_a_simple_property() {
        assert!(schema().resolve(&path("name.first")).is_err());
        assert_eq!(schema().resolve(&path("owner.name")).unwrap().len(), 2);
    }

    #[test]
    fn lists_properties_of_nested_types() {
        assert_eq!(schema().properties(&path("owner")).unwrap(), vec!["name", "owner"]);
    }
}
