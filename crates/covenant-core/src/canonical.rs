//! # Canonical Serialization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes used in digest computation across the attestation pipeline.
//!
//! ## Security invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`] or [`CanonicalBytes::from_value()`],
//! which apply the coercion pipeline before serialization. This makes the
//! "wrong serialization path" class of defects structurally impossible —
//! a signer or hasher that takes `&CanonicalBytes` instead of raw bytes
//! cannot accidentally hash an un-canonicalized payload.
//!
//! ## Rules
//!
//! 1. **Sort object keys at every depth** — `serde_json::Map` is `BTreeMap`-backed
//!    by default (no `preserve_order` feature anywhere in this workspace), so
//!    keys iterate in ascending code-point order at every level, not just the top.
//! 2. **Preserve list order** — arrays are never reordered.
//! 3. **Floats keep a fixed minimal decimal representation** — `serde_json`
//!    formats a `Number` built from `f64` with the shortest round-tripping
//!    decimal (via `ryu`), always including a decimal point, distinguishing
//!    `2.0` from the integer `2`. NaN and infinite values have no canonical
//!    form and are rejected.
//! 4. **Compact separators** — `serde_json::to_vec` emits no whitespace.
//! 5. **UTF-8, mandatory escapes only** — `serde_json` escapes only what JSON
//!    requires (quote, backslash, control characters); non-ASCII passes through.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonicalization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`] or
/// [`CanonicalBytes::from_value()`]. This single construction path ensures
/// every digest in the system is computed from properly canonicalized data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::NonFiniteFloat`] if any numeric value
    /// is NaN or infinite. Returns [`CanonicalizationError::SerializationFailed`]
    /// if serde serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from a pre-existing `serde_json::Value`.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let checked = reject_non_finite(value)?;
        let bytes = serde_json::to_vec(&checked)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Return the length of the canonical byte representation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the canonical byte representation is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively walk a JSON value and reject non-finite floats.
///
/// Object key sorting and list-order preservation need no code here: they
/// fall out of `serde_json::Map`'s `BTreeMap` backing and `Vec`'s identity
/// serialization respectively.
fn reject_non_finite(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(ref n) => {
            if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(CanonicalizationError::NonFiniteFloat(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k, reject_non_finite(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let out: Result<Vec<_>, _> = arr.into_iter().map(reject_non_finite).collect();
            Ok(Value::Array(out?))
        }
        other => Ok(other),
    }
}


/// Property-based tests verifying canonicalization invariants hold for the
/// full space of valid inputs, not just fixed vectors.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn arb_json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1_000_000_000i64..1_000_000_000i64).prop_map(|n| Value::Number(n.into())),
            "[a-zA-Z0-9 _-]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 64, 10, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_is_deterministic(value in arb_json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_is_idempotent(value in arb_json_value()) {
            let first = CanonicalBytes::new(&value).unwrap();
            let reparsed: Value = serde_json::from_slice(first.as_bytes()).unwrap();
            let second = CanonicalBytes::new(&reparsed).unwrap();
            prop_assert_eq!(first.as_bytes(), second.as_bytes());
        }

        #[test]
        fn canonical_keys_are_sorted(
            keys in prop::collection::btree_set("[a-z]{1,8}", 1..10),
            val in -100i64..100i64,
        ) {
            let obj: serde_json::Map<String, Value> = keys
                .iter()
                .map(|k| (k.clone(), Value::Number(val.into())))
                .collect();
            let value = Value::Object(obj);
            let cb = CanonicalBytes::new(&value).unwrap();
            let reparsed: serde_json::Map<String, Value> = serde_json::from_slice(cb.as_bytes()).unwrap();
            let result_keys: Vec<&String> = reparsed.keys().collect();
            let mut sorted_keys = result_keys.clone();
            sorted_keys.sort();
            prop_assert_eq!(result_keys, sorted_keys);
        }

        #[test]
        fn canonical_bytes_are_valid_utf8(value in arb_json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            prop_assert!(std::str::from_utf8(cb.as_bytes()).is_ok());
        }

        #[test]
        fn canonical_roundtrip_preserves_data(value in arb_json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let reparsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            let cb2 = CanonicalBytes::new(&reparsed).unwrap();
            prop_assert_eq!(cb.as_bytes(), cb2.as_bytes());
        }
    }
}
