//! Search, filtering, ordering, and projection over stored objects.
//!
//! List and grid endpoints fetch whole object sets from the store and shape
//! them here. Everything operates on `serde_json::Value` objects, matching
//! the storage representation.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

/// Keeps objects whose fields match every entry of the filter map exactly.
pub fn apply_filters<S: ::std::hash::BuildHasher>(
    objects: &[Value],
    filters: &HashMap<String, String, S>,
) -> Vec<Value> {
    if filters.is_empty() {
        return objects.to_vec();
    }

    objects
        .iter()
        .filter(|obj| {
            filters.iter().all(|(field, value)| {
                obj.get(field).is_some_and(|v| match v {
                    Value::String(s) => s == value,
                    Value::Number(n) => n.to_string() == *value,
                    Value::Bool(b) => b.to_string() == *value,
                    Value::Null => value.is_empty() || value == "null",
                    _ => false,
                })
            })
        })
        .cloned()
        .collect()
}

/// Keeps objects where any of the given fields contains the query,
/// case-insensitively. Numeric field values are matched on their decimal
/// rendering, so searching `"150"` finds an order totalling 150.00.
pub fn apply_search(objects: &[Value], fields: &[String], query: &str) -> Vec<Value> {
    if query.is_empty() || fields.is_empty() {
        return objects.to_vec();
    }

    let query_lower = query.to_lowercase();

    objects
        .iter()
        .filter(|obj| {
            fields.iter().any(|field| match obj.get(field.as_str()) {
                Some(Value::String(s)) => s.to_lowercase().contains(&query_lower),
                Some(Value::Number(n)) => n.to_string().contains(&query_lower),
                _ => false,
            })
        })
        .cloned()
        .collect()
}

/// Sorts objects by the given field. Prefix with `-` for descending order.
/// A `None` ordering leaves the input order untouched.
pub fn apply_ordering(mut objects: Vec<Value>, ordering: Option<&str>) -> Vec<Value> {
    let Some(ordering) = ordering else {
        return objects;
    };
    if ordering.is_empty() {
        return objects;
    }

    let (field, descending) = ordering
        .strip_prefix('-')
        .map_or((ordering, false), |stripped| (stripped, true));

    objects.sort_by(|a, b| {
        let cmp = compare_values(a.get(field), b.get(field));
        if descending {
            cmp.reverse()
        } else {
            cmp
        }
    });

    objects
}

/// Orders two optional JSON values: absent < present; same-type values
/// compare naturally, mixed types fall back to their string rendering.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(a_str), Some(b_str)) = (a.as_str(), b.as_str()) {
                a_str.cmp(b_str)
            } else if let (Some(a_num), Some(b_num)) = (a.as_f64(), b.as_f64()) {
                a_num
                    .partial_cmp(&b_num)
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else if let (Some(a_bool), Some(b_bool)) = (a.as_bool(), b.as_bool()) {
                a_bool.cmp(&b_bool)
            } else {
                a.to_string().cmp(&b.to_string())
            }
        }
    }
}

/// Projects objects onto the requested columns for a grid.
///
/// Values are rendered as display strings; a column an object does not carry
/// renders as `"-"`.
pub fn project_columns(objects: &[Value], columns: &[String]) -> Vec<Value> {
    objects
        .iter()
        .map(|obj| {
            let mut row = serde_json::Map::new();
            for col in columns {
                let rendered = match obj.get(col.as_str()) {
                    None | Some(Value::Null) => "-".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                row.insert(col.clone(), Value::String(rendered));
            }
            Value::Object(row)
        })
        .collect()
}

/// Collects the distinct values present for each filterable field, for the
/// list view's filter sidebar.
pub fn filter_choices(objects: &[Value], fields: &[String]) -> HashMap<String, Vec<String>> {
    let mut choices = HashMap::new();
    for field in fields {
        let mut values = BTreeSet::new();
        for obj in objects {
            match obj.get(field.as_str()) {
                Some(Value::String(s)) => {
                    values.insert(s.clone());
                }
                Some(Value::Bool(b)) => {
                    values.insert(b.to_string());
                }
                Some(Value::Number(n)) => {
                    values.insert(n.to_string());
                }
                _ => {}
            }
        }
        choices.insert(field.clone(), values.into_iter().collect());
    }
    choices
}
