use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ast::{FilterValue, Operator};

/// Top-level boolean combinator of a filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Junction {
    #[default]
    And,
    Or,
}

impl Junction {
    pub fn opposite(self) -> Self {
        match self {
            Junction::And => Junction::Or,
            Junction::Or => Junction::And,
        }
    }
}

impl FromStr for Junction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Junction::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Junction::Or)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Junction::And => "AND",
            Junction::Or => "OR",
        })
    }
}

/// Group a filter belongs to. Filters without an `N:` prefix are in the
/// default group, which sorts before every explicit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum GroupId {
    #[default]
    Default,
    Explicit(u32),
}

/// A filter property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    /// `_`: the entry key or object identity
    Key,
    /// `.`: the root value
    Root,
    /// `a.b.0.c`
    Path(Vec<String>),
}

impl PropertyPath {
    pub fn segments(&self) -> &[String] {
        match self {
            PropertyPath::Path(segments) => segments,
            _ => &[],
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, PropertyPath::Key)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Key => f.write_str("_"),
            PropertyPath::Root => f.write_str("."),
            PropertyPath::Path(segments) => f.write_str(&segments.join(".")),
        }
    }
}

/// One atomic comparison: `property:operator:value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterNode {
    pub group: GroupId,
    pub property: PropertyPath,
    pub operator: Operator,
    pub value: FilterValue,
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.operator)?;
        match self.value {
            FilterValue::None => Ok(()),
            ref value => write!(f, ":{value}"),
        }
    }
}

/// All filters of a request, keyed by group.
///
/// Every default-group filter is its own top-level term; every explicit group
/// is a single top-level term whose members combine with the opposite of the
/// root junction. Top-level terms combine with the root junction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterGroup {
    pub root_junction: Junction,
    pub groups: BTreeMap<GroupId, Vec<FilterNode>>,
}

/// A top-level term of a [`FilterGroup`].
#[derive(Debug, Clone, Copy)]
pub enum Term<'a> {
    Single(&'a FilterNode),
    Group(Junction, &'a [FilterNode]),
}

impl FilterGroup {
    pub fn new(root_junction: Junction) -> Self {
        FilterGroup {
            root_junction,
            groups: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, filter: FilterNode) {
        self.groups.entry(filter.group).or_default().push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterNode> {
        self.groups.values().flatten()
    }

    /// The top-level terms in group order.
    pub fn terms(&self) -> impl Iterator<Item = Term<'_>> {
        let inner = self.root_junction.opposite();
        self.groups.iter().flat_map(move |(id, filters)| {
            let terms: Vec<Term<'_>> = match id {
                GroupId::Default => filters.iter().map(Term::Single).collect(),
                GroupId::Explicit(_) if filters.is_empty() => Vec::new(),
                GroupId::Explicit(_) => vec![Term::Group(inner, filters.as_slice())],
            };
            terms
        })
    }
}

impl FromIterator<FilterNode> for FilterGroup {
    fn from_iter<T: IntoIterator<Item = FilterNode>>(iter: T) -> Self {
        let mut group = FilterGroup::default();
        for filter in iter {
            group.push(filter);
        }
        group
    }
}
