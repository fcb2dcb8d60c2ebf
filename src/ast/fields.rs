/// A post-fetch function reshaping a selected field.
///
/// Transforms are written after a field name with `~` (or the older `::`)
/// and run left to right once the field's value has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// `~rename(alias)`: changes the output key, never the value
    Rename(String),

    /// `~hoist` / `~hoist(name)`
    ///
    /// Object values lift their members into the enclosing output object;
    /// any other value is emitted under `name`.
    Hoist(Option<String>),

    /// `~size`: length of a collection or string
    Size,

    /// `~ids`: collection of identifiable objects to their identity strings
    Ids,

    /// `~id-objects`: collection to `[{"id": ..}]`
    IdObjects,

    /// `~pluck` / `~pluck(property)`: collection to one member of each element
    /// (`id` when no property is given)
    Pluck(Option<String>),

    /// `~isEmpty`
    IsEmpty,

    /// `~isNotEmpty`
    IsNotEmpty,

    /// `~member(id)`: whether the collection has an element with that identity
    Member(String),

    /// `~not-member(id)`
    NotMember(String),
}

impl Transform {
    /// Builds a transform from its written name and arguments.
    ///
    /// Returns `None` for unknown names or a wrong number of arguments.
    pub fn from_parts(name: &str, mut args: Vec<String>) -> Option<Self> {
        let single = |args: &mut Vec<String>| (args.len() == 1).then(|| args.remove(0));
        let optional = |args: &mut Vec<String>| match args.len() {
            0 => Some(None),
            1 => Some(Some(args.remove(0))),
            _ => None,
        };
        let nullary = |args: &Vec<String>| args.is_empty();

        match name.to_ascii_lowercase().as_str() {
            "rename" => single(&mut args).map(Transform::Rename),
            "hoist" => optional(&mut args).map(Transform::Hoist),
            "size" if nullary(&args) => Some(Transform::Size),
            "ids" if nullary(&args) => Some(Transform::Ids),
            "id-objects" | "idobjects" if nullary(&args) => Some(Transform::IdObjects),
            "pluck" => optional(&mut args).map(Transform::Pluck),
            "isempty" | "is-empty" if nullary(&args) => Some(Transform::IsEmpty),
            "isnotempty" | "is-not-empty" if nullary(&args) => Some(Transform::IsNotEmpty),
            "member" => single(&mut args).map(Transform::Member),
            "not-member" | "notmember" => single(&mut args).map(Transform::NotMember),
            _ => None,
        }
    }
}

/// One requested field of a fields expression.
///
/// `name` is a property name, a numeric collection index, or one of the
/// reserved names [`FieldNode::KEY`], [`FieldNode::ROOT`], [`FieldNode::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub name: String,
    pub transforms: Vec<Transform>,
    pub children: Vec<FieldNode>,
    pub excluded: bool,
}

impl FieldNode {
    /// Identity / entry key
    pub const KEY: &'static str = "_";
    /// The root value itself
    pub const ROOT: &'static str = ".";
    /// All properties
    pub const ALL: &'static str = "*";

    pub fn new(name: impl Into<String>) -> Self {
        FieldNode {
            name: name.into(),
            transforms: Vec::new(),
            children: Vec::new(),
            excluded: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn with_child(mut self, child: FieldNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    pub fn is_key(&self) -> bool {
        self.name == Self::KEY
    }

    pub fn is_root(&self) -> bool {
        self.name == Self::ROOT
    }

    pub fn is_all(&self) -> bool {
        self.name == Self::ALL
    }

    /// Collection index when the name is numeric (`eats.0`).
    pub fn index(&self) -> Option<usize> {
        if self.name.bytes().all(|b| b.is_ascii_digit()) {
            self.name.parse().ok()
        } else {
            None
        }
    }

    /// The single index child of `eats.0`-style selections.
    pub fn index_child(&self) -> Option<(usize, &FieldNode)> {
        match self.children.as_slice() {
            [only] => only.index().map(|i| (i, only)),
            _ => None,
        }
    }

    /// Output key after applying `rename` (last one wins).
    pub fn output_key(&self) -> &str {
        self.transforms
            .iter()
            .rev()
            .find_map(|t| match t {
                Transform::Rename(alias) => Some(alias.as_str()),
                _ => None,
            })
            .unwrap_or(&self.name)
    }
}
