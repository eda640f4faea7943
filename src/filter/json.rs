use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ValidationError;

use super::Filter;

impl Filter {
    /// Translates a JSON value into a filter.
    ///
    /// Strings become text, arrays become sequences, objects become mappings,
    /// numbers and booleans become text holding their JSON rendering. A
    /// top-level `null` means "no filter"; a nested `null` is rejected.
    pub fn from_json(value: &Value) -> Result<Option<Self>, ValidationError> {
        if value.is_null() {
            return Ok(None);
        }
        from_json_at(value, "$").map(Some)
    }
}

fn from_json_at(value: &Value, path: &str) -> Result<Filter, ValidationError> {
    match value {
        Value::Null => Err(ValidationError::InvalidFilter {
            reason: format!("null is not a filter value (at {path})"),
        }),
        Value::Bool(v) => Ok(Filter::Text(v.to_string())),
        Value::Number(v) => Ok(Filter::Text(v.to_string())),
        Value::String(v) => Ok(Filter::Text(v.clone())),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| from_json_at(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Filter::Sequence),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, item)| {
                from_json_at(item, &format!("{path}.{key}")).map(|f| (key.clone(), f))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Filter::Mapping),
    }
}
