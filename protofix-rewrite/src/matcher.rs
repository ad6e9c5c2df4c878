//! Structural matching of a value tree against a pattern tree.

use crate::tree::Value;

/// Check whether `value` matches `pattern`.
///
/// The comparison is driven by the pattern: only attributes present on a
/// pattern node are compared, and a pattern attribute missing from the
/// value node is skipped rather than treated as a mismatch. Sequences must
/// have equal length and match element-wise.
pub fn matches(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Seq(values), Value::Seq(patterns)) => {
            values.len() == patterns.len()
                && values.iter().zip(patterns).all(|(v, p)| matches(v, p))
        }
        (Value::Leaf(v), Value::Leaf(p)) => v == p,
        (Value::Node(v), Value::Node(p)) => {
            v.kind() == p.kind()
                && p.fields().all(|(name, expected)| match v.field(name) {
                    Some(actual) => matches(actual, expected),
                    None => true,
                })
        }
        _ => false,
    }
}
