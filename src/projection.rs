//! Output shape of the in-memory strategy.
//!
//! ```text
//! fields=name           {"key":"cat","name":"Miao"}
//! fields=.~hoist(name)  {"key":"horse","name":"Fury"}
//! fields=*,!secret      every root member except `secret`
//! ```

use std::collections::{HashMap, HashSet};

use crate::{
    accessor::ValueAccessor,
    ast::FieldNode,
    transform::Shaped,
    value::Value,
};

/// Output key of the entry key and of `_`.
pub const KEY: &str = "key";
/// Output key of `.`.
pub const VALUE: &str = "value";

/// Applies a field list to one entry. The result always carries the entry
/// key; absent properties project as `null`.
pub fn project<A: ValueAccessor + ?Sized>(fields: &[FieldNode], entry: &A) -> Value {
    let mut out = HashMap::new();
    out.insert(KEY.to_string(), Value::from(entry.key()));
    select(fields, entry.value(), Some(entry.key()), &mut out);
    Value::Object(out)
}

/// Selects `nodes` from `source` into `out`. `key` is the entry key at the
/// top level; nested levels use the identity of their object.
fn select(nodes: &[FieldNode], source: &Value, key: Option<&str>, out: &mut HashMap<String, Value>) {
    let excluded: HashSet<&str> = nodes
        .iter()
        .filter(|n| n.excluded)
        .map(|n| n.name.as_str())
        .collect();

    for node in nodes {
        if node.excluded || excluded.contains(node.name.as_str()) {
            continue;
        }

        if node.is_all() {
            let listed: HashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
            if let Value::Object(members) = source {
                for (name, value) in members {
                    if !excluded.contains(name.as_str()) && !listed.contains(name.as_str()) {
                        out.insert(name.clone(), value.clone());
                    }
                }
            }
            continue;
        }

        field(node, source, key).emit(out);
    }
}

fn field(node: &FieldNode, source: &Value, key: Option<&str>) -> Shaped {
    if node.is_key() {
        let identity = key
            .map(Value::from)
            .or_else(|| source.identity().map(Value::String))
            .unwrap_or(Value::Null);
        return Shaped::new(KEY, identity).transform(&node.transforms);
    }
    if node.is_root() {
        let value = children(node, source.clone());
        return Shaped::new(VALUE, value).transform(&node.transforms);
    }

    let value = member(source, &node.name).unwrap_or(Value::Null);

    // `eats.0`: the element stands in for the collection
    if let Some((index, child)) = node.index_child() {
        let element = value.index(index).cloned().unwrap_or(Value::Null);
        let element = children(child, element);
        return Shaped::new(&node.name, element)
            .transform(&node.transforms)
            .transform(&child.transforms);
    }

    Shaped::new(&node.name, children(node, value)).transform(&node.transforms)
}

/// Narrows a value to the node's children; arrays are narrowed element-wise.
fn children(node: &FieldNode, value: Value) -> Value {
    if node.children.is_empty() {
        return value;
    }
    match value {
        Value::Object(_) => {
            let mut out = HashMap::new();
            select(&node.children, &value, None, &mut out);
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(_) => {
                        let mut out = HashMap::new();
                        select(&node.children, &item, None, &mut out);
                        Value::Object(out)
                    }
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

/// An object member, or an array element for numeric names.
fn member(source: &Value, name: &str) -> Option<Value> {
    match source {
        Value::Object(members) => members.get(name).cloned(),
        Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}
