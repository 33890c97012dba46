//! State namespaces
//!
//! A namespace scopes state and timers either to the whole pipeline or to a
//! single window. Window namespaces hold the window in encoded form so they
//! can be compared, hashed and used as storage keys without knowing the
//! window type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::coder::Coder;
use crate::error::{DecodeResult, DecodingError, EncodeResult, EncodingError};
use crate::time::Timestamp;
use crate::window::BoundedWindow;

const GLOBAL_KEY: &str = "/";

/// Scope of a piece of state or a timer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateNamespace {
    /// Pipeline-wide scope
    Global,
    /// Scope of one window
    Window(WindowNamespace),
}

/// Namespace derived from a concrete window
///
/// Two window namespaces are equal iff their encoded window payloads are
/// byte-identical. The boundary and key are derived from the payload and
/// carried along so readers don't need the window coder.
#[derive(Debug, Clone)]
pub struct WindowNamespace {
    payload: Vec<u8>,
    max_timestamp: Timestamp,
    key: String,
}

impl WindowNamespace {
    /// Assemble a namespace from already-decoded parts
    pub(crate) fn from_parts(payload: Vec<u8>, max_timestamp: Timestamp, key: String) -> Self {
        Self {
            payload,
            max_timestamp,
            key,
        }
    }

    /// Encoded window bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Last timestamp of the underlying window
    pub fn max_timestamp(&self) -> Timestamp {
        self.max_timestamp
    }

    /// Stable string key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Decode the underlying window
    pub fn decode_window<C: Coder>(&self, coder: &C) -> DecodeResult<C::Value> {
        coder
            .decode_from_slice(&self.payload)
            .map_err(|e| DecodingError::Window {
                source: Box::new(e),
            })
    }
}

impl PartialEq for WindowNamespace {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Eq for WindowNamespace {}

impl Hash for WindowNamespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
    }
}

impl StateNamespace {
    /// The singleton global namespace
    pub fn global() -> Self {
        StateNamespace::Global
    }

    /// Namespace for `window`, encoded with `coder`
    pub fn window<C>(coder: &C, window: &C::Value) -> EncodeResult<Self>
    where
        C: Coder,
        C::Value: BoundedWindow,
    {
        let payload = coder
            .encode_to_vec(window)
            .map_err(|e| EncodingError::Window {
                source: Box::new(e),
            })?;
        let key = window_key(&payload);
        Ok(StateNamespace::Window(WindowNamespace::from_parts(
            payload,
            window.max_timestamp(),
            key,
        )))
    }

    /// Parse a namespace back from its string key
    ///
    /// `"/"` is the global namespace; `"/<base64url>/"` is a window namespace
    /// whose payload is decoded with `coder`.
    pub fn from_string_key<C>(key: &str, coder: &C) -> DecodeResult<Self>
    where
        C: Coder,
        C::Value: BoundedWindow,
    {
        if key == GLOBAL_KEY {
            return Ok(StateNamespace::Global);
        }

        let encoded = key
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .ok_or_else(|| DecodingError::InvalidNamespaceKey {
                key: key.to_string(),
                reason: "expected '/' or '/<window>/'".to_string(),
            })?;

        let payload =
            URL_SAFE_NO_PAD
                .decode(encoded)
                .map_err(|e| DecodingError::InvalidNamespaceKey {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;

        let window = coder
            .decode_from_slice(&payload)
            .map_err(|e| DecodingError::Window {
                source: Box::new(e),
            })?;

        let key = window_key(&payload);
        Ok(StateNamespace::Window(WindowNamespace::from_parts(
            payload,
            window.max_timestamp(),
            key,
        )))
    }

    /// Stable string form, usable as a storage key
    pub fn string_key(&self) -> &str {
        match self {
            StateNamespace::Global => GLOBAL_KEY,
            StateNamespace::Window(ns) => ns.key(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, StateNamespace::Global)
    }

    /// Last timestamp of the window, if this namespace has one
    pub fn max_timestamp(&self) -> Option<Timestamp> {
        match self {
            StateNamespace::Global => None,
            StateNamespace::Window(ns) => Some(ns.max_timestamp()),
        }
    }

    /// Decode the window behind this namespace; `None` for the global scope
    pub fn decode_window<C: Coder>(&self, coder: &C) -> DecodeResult<Option<C::Value>> {
        match self {
            StateNamespace::Global => Ok(None),
            StateNamespace::Window(ns) => ns.decode_window(coder).map(Some),
        }
    }
}

impl fmt::Display for StateNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.string_key())
    }
}

/// Derive the string key of a window namespace from its payload
pub(crate) fn window_key(payload: &[u8]) -> String {
    format!("/{}/", URL_SAFE_NO_PAD.encode(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{GlobalWindow, GlobalWindowCoder, IntervalWindow, IntervalWindowCoder};
    use std::collections::HashSet;

    fn window(start: i64, end: i64) -> IntervalWindow {
        IntervalWindow::new(Timestamp::from_millis(start), Timestamp::from_millis(end)).unwrap()
    }

    fn window_ns(start: i64, end: i64) -> StateNamespace {
        StateNamespace::window(&IntervalWindowCoder, &window(start, end)).unwrap()
    }

    /// Window coder that refuses every value
    struct FailingCoder;

    impl Coder for FailingCoder {
        type Value = GlobalWindow;

        fn encode(&self, _value: &GlobalWindow, _out: &mut Vec<u8>) -> EncodeResult<()> {
            Err(EncodingError::Unrepresentable {
                what: "window",
                reason: "always fails".to_string(),
            })
        }

        fn decode(&self, _input: &mut &[u8]) -> DecodeResult<GlobalWindow> {
            Err(DecodingError::InvalidValue {
                what: "window",
                reason: "always fails".to_string(),
            })
        }
    }

    #[test]
    fn test_global_namespace() {
        let ns = StateNamespace::global();
        assert!(ns.is_global());
        assert_eq!(ns.string_key(), "/");
        assert_eq!(ns.max_timestamp(), None);
        assert_eq!(ns, StateNamespace::Global);
    }

    #[test]
    fn test_window_namespace_exposes_boundary() {
        let ns = window_ns(0, 100);
        assert!(!ns.is_global());
        assert_eq!(ns.max_timestamp(), Some(Timestamp::from_millis(99)));
    }

    #[test]
    fn test_window_namespace_equality_by_payload() {
        assert_eq!(window_ns(0, 100), window_ns(0, 100));
        assert_ne!(window_ns(0, 100), window_ns(100, 200));
        assert_ne!(window_ns(0, 100), StateNamespace::global());

        let set: HashSet<StateNamespace> =
            [window_ns(0, 100), window_ns(0, 100), window_ns(100, 200)]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_window_namespace_key_format() {
        let ns = window_ns(0, 100);
        let key = ns.string_key();
        assert!(key.starts_with('/') && key.ends_with('/'));
        assert!(key.len() > 2);
        assert_eq!(ns.to_string(), key);
    }

    #[test]
    fn test_global_window_namespace_differs_from_global() {
        let ns = StateNamespace::window(&GlobalWindowCoder, &GlobalWindow).unwrap();
        assert_eq!(ns.string_key(), "//");
        assert_ne!(ns, StateNamespace::global());
        assert_eq!(ns.max_timestamp(), Some(GlobalWindow::end_of_global_window()));
    }

    #[test]
    fn test_window_namespace_encoding_failure() {
        let err = StateNamespace::window(&FailingCoder, &GlobalWindow).unwrap_err();
        assert!(matches!(err, EncodingError::Window { .. }));
    }

    #[test]
    fn test_from_string_key_round_trip() {
        let ns = window_ns(-250, 750);
        let parsed = StateNamespace::from_string_key(ns.string_key(), &IntervalWindowCoder).unwrap();
        assert_eq!(parsed, ns);
        assert_eq!(parsed.string_key(), ns.string_key());
        assert_eq!(parsed.max_timestamp(), ns.max_timestamp());

        let global = StateNamespace::from_string_key("/", &IntervalWindowCoder).unwrap();
        assert!(global.is_global());
    }

    #[test]
    fn test_from_string_key_rejects_malformed() {
        for key in ["", "abc", "/abc", "abc/", "/!!!/"] {
            let err = StateNamespace::from_string_key(key, &IntervalWindowCoder).unwrap_err();
            assert!(
                matches!(err, DecodingError::InvalidNamespaceKey { .. }),
                "key {:?} gave {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_from_string_key_bad_window_payload() {
        // Valid base64 but far too short for an interval window
        let err = StateNamespace::from_string_key("/AA/", &IntervalWindowCoder).unwrap_err();
        assert!(matches!(err, DecodingError::Window { .. }));
    }

    #[test]
    fn test_decode_window() {
        let ns = window_ns(0, 100);
        assert_eq!(
            ns.decode_window(&IntervalWindowCoder).unwrap(),
            Some(window(0, 100))
        );
        assert_eq!(
            StateNamespace::global()
                .decode_window(&IntervalWindowCoder)
                .unwrap(),
            None
        );
    }
}
