//! Canonical environment fingerprinting.
//!
//! A result is reusable only for environments that hash to the same
//! fingerprint. The fingerprint is computed over the *used* SQL
//! projection of an environment (see `JParam::get_sql_data`), so two
//! environments that differ only in parameters nobody read still
//! collide.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// SHA-256 hex digest of the canonical JSON encoding of `env_sql`.
///
/// `BTreeMap` keeps keys sorted, and `serde_json::to_string` emits no
/// extraneous whitespace, so this is already the `sort_keys=true,
/// separators=(",", ":")` encoding the fingerprint depends on.
pub fn fingerprint(env_sql: &BTreeMap<String, serde_json::Value>) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(env_sql)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_contents_same_fingerprint_regardless_of_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("x".to_string(), serde_json::json!(1));
        a.insert("y".to_string(), serde_json::json!(2));

        let mut b = BTreeMap::new();
        b.insert("y".to_string(), serde_json::json!(2));
        b.insert("x".to_string(), serde_json::json!(1));

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn differing_contents_differ() {
        let mut a = BTreeMap::new();
        a.insert("x".to_string(), serde_json::json!(1));
        let mut b = BTreeMap::new();
        b.insert("x".to_string(), serde_json::json!(2));
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn fingerprint_is_a_hex_sha256() {
        let empty: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        let digest = fingerprint(&empty).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
