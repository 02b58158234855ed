//! Field Registry
//!
//! The streaming protocol never sends field names. Every data attribute is
//! keyed by a small integer, rendered as a string (`"0"`, `"1"`, ...), whose
//! meaning depends on the service that produced the message.
//!
//! A [`FieldRegistry`] is the static `(code, name)` table for one message
//! shape. Registries are plain data: each lives in its own module under
//! [`tables`] together with one [`Field`] constant per entry, so callers can
//! write `tables::quote::BID_PRICE` when selecting subscription fields.
//!
//! # Relabeling
//!
//! ```text
//! {"key": "GOOG", "1": 100.5, "2": 100.7}
//!         │ relabel_message
//!         ▼
//! {"key": "GOOG", "BID_PRICE": 100.5, "ASK_PRICE": 100.7}
//! ```
//!
//! Keys with no entry in the registry (`key`, `seq`, `delayed`, or names
//! produced by an earlier pass) are left untouched, so relabeling is
//! idempotent.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::{Map, Value};

pub mod tables;

// =============================================================================
// Field
// =============================================================================

/// A single named field and its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Field {
    code: u16,
    name: &'static str,
}

impl Field {
    /// Create a field definition.
    #[must_use]
    pub const fn new(code: u16, name: &'static str) -> Self {
        Self { code, name }
    }

    /// Numeric wire code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Semantic field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.code)
    }
}

// =============================================================================
// Field Registry
// =============================================================================

/// Ordered `(code, name)` table for one message shape.
///
/// The `{code: name}` key map used during relabeling is built on first use
/// and cached for the lifetime of the process.
pub struct FieldRegistry {
    label: &'static str,
    fields: &'static [Field],
    key_mapping: OnceLock<HashMap<String, &'static str>>,
}

impl FieldRegistry {
    /// Create a registry over a static field table.
    #[must_use]
    pub const fn new(label: &'static str, fields: &'static [Field]) -> Self {
        Self {
            label,
            fields,
            key_mapping: OnceLock::new(),
        }
    }

    /// Name of the message shape this registry describes.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Every defined field, in definition order.
    ///
    /// Used as the subscription field set when the caller does not pick one.
    #[must_use]
    pub const fn all_fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Whether `field` belongs to this registry.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Cached `{str(code): name}` mapping.
    pub fn key_mapping(&self) -> &HashMap<String, &'static str> {
        self.key_mapping.get_or_init(|| {
            self.fields
                .iter()
                .map(|f| (f.code.to_string(), f.name))
                .collect()
        })
    }

    /// Rename numeric-string keys of `msg` to field names, in place.
    pub fn relabel_message(&self, msg: &mut Map<String, Value>) {
        let mapping = self.key_mapping();
        let renames: Vec<(String, &'static str)> = msg
            .keys()
            .filter_map(|k| mapping.get(k).map(|name| (k.clone(), *name)))
            .collect();

        for (old, new) in renames {
            if let Some(value) = msg.remove(&old) {
                msg.insert(new.to_string(), value);
            }
        }
    }

    /// Relabel `value` if it is a JSON object; other values are ignored.
    pub fn relabel_value(&self, value: &mut Value) {
        if let Value::Object(map) = value {
            self.relabel_message(map);
        }
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("label", &self.label)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Render fields as the wire's ascending, comma-joined code list.
///
/// Duplicates collapse, so `[BID_PRICE, SYMBOL, BID_PRICE]` becomes `"0,1"`.
#[must_use]
pub fn join_field_codes(fields: &[Field]) -> String {
    let mut codes: Vec<u16> = fields.iter().map(Field::code).collect();
    codes.sort_unstable();
    codes.dedup();
    codes
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    static TEST_FIELDS: FieldRegistry = FieldRegistry::new(
        "TEST",
        &[Field::new(0, "SYMBOL"), Field::new(1, "BID_PRICE")],
    );

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn relabel_renames_numeric_keys() {
        let mut msg = object(json!({"0": "GOOG", "1": 100.5}));
        TEST_FIELDS.relabel_message(&mut msg);
        assert_eq!(
            Value::Object(msg),
            json!({"SYMBOL": "GOOG", "BID_PRICE": 100.5})
        );
    }

    #[test]
    fn relabel_leaves_unknown_keys() {
        let mut msg = object(json!({"key": "GOOG", "seq": 4, "delayed": false, "7": 1}));
        TEST_FIELDS.relabel_message(&mut msg);
        assert_eq!(
            Value::Object(msg),
            json!({"key": "GOOG", "seq": 4, "delayed": false, "7": 1})
        );
    }

    #[test]
    fn relabel_twice_is_noop() {
        let mut msg = object(json!({"0": "GOOG", "1": 100.5}));
        TEST_FIELDS.relabel_message(&mut msg);
        let once = msg.clone();
        TEST_FIELDS.relabel_message(&mut msg);
        assert_eq!(once, msg);
    }

    #[test]
    fn key_mapping_is_cached() {
        let first = std::ptr::from_ref(TEST_FIELDS.key_mapping());
        let second = std::ptr::from_ref(TEST_FIELDS.key_mapping());
        assert_eq!(first, second);
        assert_eq!(TEST_FIELDS.key_mapping().get("1"), Some(&"BID_PRICE"));
    }

    #[test]
    fn join_sorts_codes() {
        let fields = [Field::new(1, "BID_PRICE"), Field::new(0, "SYMBOL")];
        assert_eq!(join_field_codes(&fields), "0,1");
    }

    #[test]
    fn join_handles_multi_digit_codes_numerically() {
        let fields = [Field::new(10, "A"), Field::new(2, "B"), Field::new(1, "C")];
        assert_eq!(join_field_codes(&fields), "1,2,10");
    }

    proptest! {
        #[test]
        fn join_is_order_independent(mut codes in proptest::collection::vec(0u16..60, 1..20)) {
            let fields: Vec<Field> = codes.iter().map(|c| Field::new(*c, "F")).collect();
            let forward = join_field_codes(&fields);
            codes.reverse();
            let reversed: Vec<Field> = codes.iter().map(|c| Field::new(*c, "F")).collect();
            prop_assert_eq!(forward, join_field_codes(&reversed));
        }

        #[test]
        fn relabel_is_idempotent(
            values in proptest::collection::btree_map("[0-9]{1,2}|key|seq", any::<i64>(), 0..10)
        ) {
            let mut msg: Map<String, Value> =
                values.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
            tables::quote::REGISTRY.relabel_message(&mut msg);
            let once = msg.clone();
            tables::quote::REGISTRY.relabel_message(&mut msg);
            prop_assert_eq!(once, msg);
        }
    }
}
