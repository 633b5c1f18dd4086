use serde_json::{Map, Value};

use super::error::{JsonKind, Location, StripError};
use super::step::{Field, Selector, Step};

/// Removes the nodes addressed by `field` from `value`.
///
/// The last step decides what is removed. Earlier steps only descend:
/// wildcards at those steps never drop keys or elements, they choose which
/// subtrees get visited. A step whose filters do not hold for a candidate
/// leaves that candidate untouched.
///
/// Missing keys and `null` values end the walk silently. The value is
/// consumed, so on error nothing of the partially stripped document is
/// observable.
///
/// # Errors
///
/// Returns an error if:
/// - a literal index is out of bounds for the array it meets
/// - a literal segment that is not an integer meets an array
/// - steps remain but the current value is a scalar
///
/// # Example
///
/// ```rust
/// use equivalence_core::json::{Field, strip};
/// use serde_json::json;
///
/// let value = json!({"list": ["a", "b", "c"], "keep": true});
/// let stripped = strip(&Field::parse("list.1"), value).unwrap();
///
/// assert_eq!(stripped, json!({"list": ["a", "c"], "keep": true}));
/// ```
pub fn strip(field: &Field, value: Value) -> Result<Value, StripError> {
    let mut trail = Location::root();
    strip_steps(field.steps(), value, &mut trail)
}

fn strip_steps(steps: &[Step], value: Value, trail: &mut Location) -> Result<Value, StripError> {
    match steps {
        [] => Ok(value),
        [leaf] => strip_leaf(leaf, value, trail),
        [node, rest @ ..] => strip_node(node, rest, value, trail),
    }
}

fn strip_leaf(step: &Step, value: Value, trail: &Location) -> Result<Value, StripError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Object(map) => Ok(Value::Object(remove_from_object(step, map))),
        Value::Array(items) => remove_from_array(step, items, trail).map(Value::Array),
        scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
            Err(unsupported(step, &scalar, trail))
        }
    }
}

fn remove_from_object(step: &Step, mut map: Map<String, Value>) -> Map<String, Value> {
    match step.selector() {
        Selector::Wildcard => map
            .into_iter()
            .filter(|(_, value)| !step.applies_to(value))
            .collect(),
        selector => {
            let key = selector.object_key();
            if map
                .get(key.as_ref())
                .is_some_and(|value| step.applies_to(value))
            {
                map.remove(key.as_ref());
            }
            map
        }
    }
}

fn remove_from_array(
    step: &Step,
    mut items: Vec<Value>,
    trail: &Location,
) -> Result<Vec<Value>, StripError> {
    match step.selector() {
        Selector::Wildcard => Ok(items
            .into_iter()
            .filter(|item| !step.applies_to(item))
            .collect()),
        selector => {
            let index = literal_index(selector, items.len(), trail)?;
            if items.get(index).is_some_and(|item| step.applies_to(item)) {
                items.remove(index);
            }
            Ok(items)
        }
    }
}

fn strip_node(
    step: &Step,
    rest: &[Step],
    value: Value,
    trail: &mut Location,
) -> Result<Value, StripError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Object(map) => descend_object(step, rest, map, trail).map(Value::Object),
        Value::Array(items) => descend_array(step, rest, items, trail).map(Value::Array),
        scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
            Err(unsupported(step, &scalar, trail))
        }
    }
}

fn descend_object(
    step: &Step,
    rest: &[Step],
    mut map: Map<String, Value>,
    trail: &mut Location,
) -> Result<Map<String, Value>, StripError> {
    match step.selector() {
        Selector::Wildcard => map
            .into_iter()
            .map(|(key, value)| {
                if !step.applies_to(&value) {
                    return Ok((key, value));
                }
                trail.push(&key);
                let stripped = strip_steps(rest, value, trail)?;
                trail.pop();
                Ok((key, stripped))
            })
            .collect(),
        selector => {
            let key = selector.object_key();
            let Some(value) = map.remove(key.as_ref()) else {
                // Absent intermediate keys are not an error.
                return Ok(map);
            };
            let value = if step.applies_to(&value) {
                trail.push(&key);
                let stripped = strip_steps(rest, value, trail)?;
                trail.pop();
                stripped
            } else {
                value
            };
            map.insert(key.into_owned(), value);
            Ok(map)
        }
    }
}

fn descend_array(
    step: &Step,
    rest: &[Step],
    mut items: Vec<Value>,
    trail: &mut Location,
) -> Result<Vec<Value>, StripError> {
    match step.selector() {
        Selector::Wildcard => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !step.applies_to(&item) {
                    return Ok(item);
                }
                trail.push(index);
                let stripped = strip_steps(rest, item, trail)?;
                trail.pop();
                Ok(stripped)
            })
            .collect(),
        selector => {
            let index = literal_index(selector, items.len(), trail)?;
            if let Some(item) = items.get_mut(index)
                && step.applies_to(item)
            {
                let current = std::mem::take(item);
                trail.push(index);
                *item = strip_steps(rest, current, trail)?;
                trail.pop();
            }
            Ok(items)
        }
    }
}

fn literal_index(selector: &Selector, len: usize, trail: &Location) -> Result<usize, StripError> {
    let index = match selector {
        Selector::Index(index) => *index,
        other => {
            let segment = other.to_string();
            segment
                .parse::<usize>()
                .map_err(|_| StripError::MalformedIndex {
                    segment,
                    at: trail.clone(),
                })?
        }
    };

    if index >= len {
        return Err(StripError::IndexOutOfBounds {
            index,
            len,
            at: trail.clone(),
        });
    }
    Ok(index)
}

fn unsupported(step: &Step, value: &Value, trail: &Location) -> StripError {
    StripError::UnsupportedType {
        kind: JsonKind::of(value),
        segment: step.selector().to_string(),
        at: trail.clone(),
    }
}
