//! Documentation content for the gistql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Fields,
    Transforms,
    Filters,
    Operators,
    Grouping,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "fields" | "field" | "syntax" => Some(Self::Fields),
            "transforms" | "transform" => Some(Self::Transforms),
            "filters" | "filter" => Some(Self::Filters),
            "operators" | "ops" => Some(Self::Operators),
            "grouping" | "groups" | "root-junction" => Some(Self::Grouping),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"GISTQL DOCUMENTATION

gistql selects which properties of an entry to return (fields) and which
entries to return (filter). Both are plain query parameter values.

DOCUMENTATION CATEGORIES

  fields            Field lists, nesting, exclusion, presets and reserved names
  transforms        Reshaping a field with ~size, ~rename(x), ~hoist and friends
  filters           property:operator:value, values and list literals
  operators         Every comparison operator and its negation
  grouping          Filter groups and the root junction
  errors            Error messages and the conflict report

QUICK REFERENCE

  fields=name,code                 Two properties
  fields=*,!code                   Everything except code
  fields=group[id,name]            Nested selection
  fields=users~size                Collection size
  filter=name:eq:Paul              Equality
  filter=_:in:[cat,dog]            Key in a list
  filter=1:a:eq:x&filter=1:b:eq:y  An alternative group

Run 'gistql doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Fields) => Ok(FIELDS_DOC),
        Some(DocCategory::Transforms) => Ok(TRANSFORMS_DOC),
        Some(DocCategory::Filters) => Ok(FILTERS_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Grouping) => Ok(GROUPING_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const FIELDS_DOC: &str = r#"FIELDS - Selecting Properties

FIELD LISTS
  name,code
    Comma separated property names. Every projected entry also carries its
    "key".

    Example:
      Input:  {"cat": {"name": "Miao", "age": 4}}
      Fields: name
      Output: {"key": "cat", "name": "Miao"}

NESTING
  group[id,name]    group(id,name)    group.id
    Brackets and parentheses are interchangeable. A dotted path nests the
    output the same way: owner.name gives {"owner": {"name": ..}}.
    On a collection, nested fields are selected from every element.

ELEMENTS
  eats.0
    A numeric name selects one element of a collection. The element takes
    the place of the collection: {"eats": {"id": "fish"}}.

EXCLUSION
  !code    -code
    Removes a property, also from the expansion of *. Only allowed at the
    top level; without * in the list, * is implied: !code means *,!code.

RESERVED NAMES
  _         The entry key (nested: the identity of the object)
  .         The whole value, projected under "value"
  *         Every property. :all is an alias; other presets are rejected.

QUOTING
  'first name'    "first name"
    Names with spaces or separators can be quoted.
"#;

const TRANSFORMS_DOC: &str = r#"TRANSFORMS - Reshaping a Field

A transform follows the field with ~ (or ::) and may take arguments in
parentheses. Several transforms apply left to right.

  ~rename(label)      Output the field under another name
  ~hoist              Merge an object's members into the parent
  ~hoist(label)       Same; non-objects are placed under label
  ~size               Length of a collection or text, 0 when absent
  ~isEmpty            true when the collection is empty or absent
  ~isNotEmpty         The opposite of ~isEmpty
  ~ids                The identities of the elements
  ~id-objects         The elements as [{"id": ..}]
  ~pluck              Like ~ids
  ~pluck(name)        One property of every element
  ~member(id)         true when an element has identity id
  ~not-member(id)     The opposite of ~member

    Example:
      Input:  {"horse": {"name": "Fury"}}
      Fields: .~hoist(name)
      Output: {"key": "horse", "name": "Fury"}
"#;

const FILTERS_DOC: &str = r#"FILTERS - Selecting Entries

SHAPE
  property:operator:value
    Unary operators (null, empty) take no value.

PROPERTIES
  _             The entry key
  name          A property of the value
  owner.name    A nested property; on collections every element is tried
  eats.0.id     A collection element

VALUES
  Anything after the second colon, taken as written, so values may contain
  colons: time:eq:12:30.

LISTS
  [a,b,c]
    Required by in. Items may be quoted: [cat,'dog, the']. For other
    operators [a] means a.

LENGTH COMPARISON
  A number compared against text or a collection compares its length.
  Values gathered from the elements of a collection (eats.kcal) are
  compared one by one instead.

    Example:
      name:eq:4         Paul and Mary match
      name:gt:4         Ringo and George match
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison

Every operator can be negated with a leading !. A negated filter matches
exactly the entries the plain one does not, except that a missing or null
property is neither empty nor !empty.

EQUALITY
  eq        Equal
  ieq       Equal ignoring case
  ne, neq   Not equal (!eq)

ORDER
  lt  le  gt  ge    (lte and gte are aliases)

PATTERNS
  like       Contains, case sensitive
  ilike      Contains, ignoring case
  $like      Starts with          $ilike    Starts with, ignoring case
  like$      Ends with            ilike$    Ends with, ignoring case
  startsWith and endsWith are aliases of $ilike and ilike$.
  In like and ilike, * matches any run of characters and ? any one
  character. Prefix and suffix patterns take every character as written.

MEMBERSHIP
  in        Value is one of a list: _:in:[cat,dog]

UNARY
  null      Property is missing or null
  empty     Text or collection is empty
"#;

const GROUPING_DOC: &str = r#"GROUPING - Combining Filters

ROOT JUNCTION
  rootJunction=AND (default)    rootJunction=OR
    How top-level filters combine.

GROUPS
  1:name:eq:x
    A numeric prefix puts a filter into a group. Members of a group combine
    with the opposite of the root junction, and the group combines with the
    other filters using the root junction.

    Example:
      filter=1:name:endsWith:3&filter=1:name:like:alpha&filter=code:eq:x
      means  (name ends with 3 OR name contains alpha) AND code = x

  The order of filters and groups never changes the result.
  0: is the default group, the same as no prefix.
  A prefix followed by an operator is a numeric property: 0:eq:x.

SEVERAL FILTERS IN ONE PARAMETER
  filter=name:eq:a,code:eq:b
    A comma starts a new filter only when property:operator follows it;
    otherwise it is part of the value: filter=name:eq:Smith, John.
"#;

const ERRORS_DOC: &str = r#"ERRORS - Rejected Requests

A request with any invalid parameter is rejected as a whole, before any
entry is read. The report is:

  {
    "httpStatus": "Conflict",
    "httpStatusCode": 409,
    "status": "ERROR",
    "message": "..."
  }

MESSAGES
  Illegal fields expression. Expected `,`, `[` or `]` at position 7 but found `'`
  Illegal filter `_:null`: key filters cannot be used with unary operators
  Illegal filter `name:foo:x`: unknown operator `foo`
  Unknown property `owner.nmae`
  Illegal value `XOR` for parameter `rootJunction`
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_docs() {
        for name in ["fields", "transforms", "filters", "operators", "grouping", "errors"] {
            assert!(get_doc_category(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn unknown_category() {
        assert!(matches!(
            get_doc_category("pipes"),
            Err(CliError::UnknownCategory(c)) if c == "pipes"
        ));
    }
}
