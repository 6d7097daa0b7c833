//! Deterministic cache key derivation.
//!
//! A request payload is first normalized into a canonical byte sequence,
//! then hashed with SHA-256 and combined with the agent identity:
//!
//! ```text
//! {namespace}:{agent}:v{version}:{64 lowercase hex chars}
//! ```
//!
//! Normalization converts the payload to a JSON value. A top-level object
//! becomes its fields sorted by key and joined by `&`; string fields render
//! as `key=value` and every other field as `key:=<canonical json>`. Keys and
//! string values have `%`, `&`, `=` and `:` percent-escaped so no two
//! distinct payloads share a rendering. Any other top-level value renders as
//! `:=<canonical json>`. Canonical JSON is compact with object keys sorted at
//! every depth. No Unicode normalization is applied.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{AgentIdentity, CacheKey, DEFAULT_NAMESPACE};

/// Canonical rendering of a request payload, the input to the content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest(String);

impl NormalizedRequest {
    /// Normalize any serializable payload.
    pub fn from_payload<P: Serialize + ?Sized>(payload: &P) -> CacheResult<Self> {
        let value = serde_json::to_value(payload)
            .map_err(|e| CacheError::KeyDerivation(format!("payload is not serializable: {e}")))?;
        Ok(Self::from_value(&value))
    }

    /// Normalize an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Self {
        let mut out = String::new();
        match value {
            Value::Object(map) => {
                let mut fields: Vec<(&String, &Value)> = map.iter().collect();
                fields.sort_unstable_by(|a, b| a.0.cmp(b.0));
                for (i, (key, field)) in fields.into_iter().enumerate() {
                    if i > 0 {
                        out.push('&');
                    }
                    push_escaped(&mut out, key);
                    if let Value::String(s) = field {
                        out.push('=');
                        push_escaped(&mut out, s);
                    } else {
                        out.push_str(":=");
                        write_canonical_json(&mut out, field);
                    }
                }
            }
            other => {
                out.push_str(":=");
                write_canonical_json(&mut out, other);
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Lowercase hex SHA-256 of the UTF-8 bytes.
    pub fn digest_hex(&self) -> String {
        format!("{:x}", Sha256::digest(self.as_bytes()))
    }
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            ':' => out.push_str("%3A"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
}

fn write_canonical_json(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        // Display for a string value is its JSON-escaped, quoted form.
        Value::String(_) => {
            let _ = write!(out, "{value}");
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_json(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}", Value::String(key.clone()));
                out.push(':');
                write_canonical_json(out, field);
            }
            out.push('}');
        }
    }
}

/// Derives cache keys for one namespace.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    namespace: String,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Derive the key for `payload` sent to `identity`.
    ///
    /// Fails with `KeyDerivation` if the identity cannot be embedded in a
    /// key or the payload cannot be serialized.
    pub fn derive<P: Serialize + ?Sized>(
        &self,
        identity: &AgentIdentity,
        payload: &P,
    ) -> CacheResult<CacheKey> {
        identity.validate()?;
        let normalized = NormalizedRequest::from_payload(payload)?;
        Ok(self.derive_normalized(identity, &normalized))
    }

    /// Derive the key for a payload that is already normalized.
    ///
    /// The identity is assumed valid.
    pub fn derive_normalized(
        &self,
        identity: &AgentIdentity,
        normalized: &NormalizedRequest,
    ) -> CacheKey {
        CacheKey::compose(&self.namespace, identity, &normalized.digest_hex())
    }
}
