//! Deterministic binary coders
//!
//! A [`Coder`] turns values into bytes and back. Coders are self-delimiting:
//! `decode` consumes exactly the bytes `encode` produced and leaves the rest
//! of the input untouched, so coders nest inside each other. The timer coder
//! relies on this to embed a caller-supplied window coder.
//!
//! ```rust
//! use stream_timers::coder::Coder;
//! use stream_timers::window::{IntervalWindow, IntervalWindowCoder};
//! use stream_timers::time::Timestamp;
//!
//! let window = IntervalWindow::new(Timestamp::from_millis(0), Timestamp::from_millis(100))?;
//! let bytes = IntervalWindowCoder.encode_to_vec(&window)?;
//! assert_eq!(IntervalWindowCoder.decode_from_slice(&bytes)?, window);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod wire;

use std::sync::Arc;

use crate::error::{DecodeResult, DecodingError, EncodeResult, EncodingError};

/// Encodes and decodes values of one type
pub trait Coder: Send + Sync {
    /// The type this coder handles
    type Value;

    /// Append the encoding of `value` to `out`
    fn encode(&self, value: &Self::Value, out: &mut Vec<u8>) -> EncodeResult<()>;

    /// Decode one value from the front of `input`, advancing it past the
    /// consumed bytes
    fn decode(&self, input: &mut &[u8]) -> DecodeResult<Self::Value>;

    /// Encode into a fresh buffer
    fn encode_to_vec(&self, value: &Self::Value) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(value, &mut out)?;
        Ok(out)
    }

    /// Decode a value that must span the whole slice
    fn decode_from_slice(&self, bytes: &[u8]) -> DecodeResult<Self::Value> {
        let mut input = bytes;
        let value = self.decode(&mut input)?;
        if !input.is_empty() {
            return Err(DecodingError::TrailingBytes {
                remaining: input.len(),
            });
        }
        Ok(value)
    }
}

impl<C: Coder + ?Sized> Coder for &C {
    type Value = C::Value;

    fn encode(&self, value: &Self::Value, out: &mut Vec<u8>) -> EncodeResult<()> {
        (**self).encode(value, out)
    }

    fn decode(&self, input: &mut &[u8]) -> DecodeResult<Self::Value> {
        (**self).decode(input)
    }
}

impl<C: Coder + ?Sized> Coder for Arc<C> {
    type Value = C::Value;

    fn encode(&self, value: &Self::Value, out: &mut Vec<u8>) -> EncodeResult<()> {
        (**self).encode(value, out)
    }

    fn decode(&self, input: &mut &[u8]) -> DecodeResult<Self::Value> {
        (**self).decode(input)
    }
}

/// Coder for sequences: a varint element count followed by each element
#[derive(Debug, Clone)]
pub struct VecCoder<C> {
    element: C,
    max_len: usize,
}

impl<C: Coder> VecCoder<C> {
    /// Create a sequence coder accepting at most `max_len` elements
    pub fn new(element: C, max_len: usize) -> Self {
        Self { element, max_len }
    }

    /// The element coder
    pub fn element_coder(&self) -> &C {
        &self.element
    }

    /// Largest element count accepted in either direction
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Encode a borrowed slice with the same layout as a `Vec`
    pub fn encode_slice(&self, values: &[C::Value], out: &mut Vec<u8>) -> EncodeResult<()> {
        if values.len() > self.max_len {
            return Err(EncodingError::LimitExceeded {
                what: "sequence",
                len: values.len(),
                limit: self.max_len,
            });
        }
        let start = out.len();
        wire::write_varint(out, values.len() as u64);
        for value in values {
            if let Err(e) = self.element.encode(value, out) {
                out.truncate(start);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<C: Coder> Coder for VecCoder<C> {
    type Value = Vec<C::Value>;

    fn encode(&self, values: &Self::Value, out: &mut Vec<u8>) -> EncodeResult<()> {
        self.encode_slice(values, out)
    }

    fn decode(&self, input: &mut &[u8]) -> DecodeResult<Self::Value> {
        let declared = wire::read_varint(input, "sequence length")?;
        if declared > self.max_len as u64 {
            return Err(DecodingError::LimitExceeded {
                what: "sequence",
                declared,
                limit: self.max_len,
            });
        }
        let count = declared as usize;
        // Every element takes at least one byte, so the input bounds a sane
        // preallocation.
        let mut values = Vec::with_capacity(count.min(input.len()));
        for _ in 0..count {
            values.push(self.element.decode(input)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;

    /// Minimal coder for exercising the trait plumbing
    struct InstantCoder;

    impl Coder for InstantCoder {
        type Value = Timestamp;

        fn encode(&self, value: &Timestamp, out: &mut Vec<u8>) -> EncodeResult<()> {
            wire::write_instant(out, *value);
            Ok(())
        }

        fn decode(&self, input: &mut &[u8]) -> DecodeResult<Timestamp> {
            wire::read_instant(input)
        }
    }

    #[test]
    fn test_decode_from_slice_rejects_trailing_bytes() {
        let mut bytes = InstantCoder.encode_to_vec(&Timestamp::from_millis(7)).unwrap();
        bytes.push(0);

        assert_eq!(
            InstantCoder.decode_from_slice(&bytes),
            Err(DecodingError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn test_coders_nest_back_to_back() {
        let mut bytes = Vec::new();
        InstantCoder.encode(&Timestamp::from_millis(1), &mut bytes).unwrap();
        InstantCoder.encode(&Timestamp::from_millis(2), &mut bytes).unwrap();

        let mut input = bytes.as_slice();
        assert_eq!(InstantCoder.decode(&mut input).unwrap().millis(), 1);
        assert_eq!(InstantCoder.decode(&mut input).unwrap().millis(), 2);
        assert!(input.is_empty());
    }

    #[test]
    fn test_vec_coder_sequence() {
        let coder = VecCoder::new(InstantCoder, 8);
        let values: Vec<Timestamp> = (0..5).map(Timestamp::from_millis).collect();

        let bytes = coder.encode_to_vec(&values).unwrap();
        assert_eq!(bytes[0], 5);
        assert_eq!(coder.decode_from_slice(&bytes).unwrap(), values);
    }

    #[test]
    fn test_vec_coder_empty() {
        let coder = VecCoder::new(InstantCoder, 8);
        let bytes = coder.encode_to_vec(&Vec::new()).unwrap();
        assert_eq!(bytes, vec![0]);
        assert!(coder.decode_from_slice(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_vec_coder_limits() {
        let coder = VecCoder::new(InstantCoder, 2);
        let values: Vec<Timestamp> = (0..3).map(Timestamp::from_millis).collect();

        assert!(matches!(
            coder.encode_to_vec(&values),
            Err(EncodingError::LimitExceeded { len: 3, limit: 2, .. })
        ));

        let unbounded = VecCoder::new(InstantCoder, 16);
        let bytes = unbounded.encode_to_vec(&values).unwrap();
        assert!(matches!(
            coder.decode_from_slice(&bytes),
            Err(DecodingError::LimitExceeded { declared: 3, limit: 2, .. })
        ));
    }

    #[test]
    fn test_vec_coder_truncated_element() {
        let coder = VecCoder::new(InstantCoder, 8);
        let mut bytes = coder
            .encode_to_vec(&vec![Timestamp::from_millis(1), Timestamp::from_millis(2)])
            .unwrap();
        bytes.truncate(bytes.len() - 3);

        assert!(matches!(
            coder.decode_from_slice(&bytes),
            Err(DecodingError::UnexpectedEof { what: "timestamp", .. })
        ));
    }

    /// Refuses negative timestamps
    struct NonNegativeCoder;

    impl Coder for NonNegativeCoder {
        type Value = Timestamp;

        fn encode(&self, value: &Timestamp, out: &mut Vec<u8>) -> EncodeResult<()> {
            if value.millis() < 0 {
                return Err(EncodingError::Unrepresentable {
                    what: "timestamp",
                    reason: "negative".to_string(),
                });
            }
            wire::write_instant(out, *value);
            Ok(())
        }

        fn decode(&self, input: &mut &[u8]) -> DecodeResult<Timestamp> {
            wire::read_instant(input)
        }
    }

    #[test]
    fn test_vec_coder_failed_element_leaves_output_untouched() {
        let coder = VecCoder::new(NonNegativeCoder, 8);
        let values = vec![
            Timestamp::from_millis(1),
            Timestamp::from_millis(2),
            Timestamp::from_millis(-1),
        ];

        let mut out = vec![0xaa, 0xbb];
        let err = coder.encode_slice(&values, &mut out).unwrap_err();
        assert!(matches!(err, EncodingError::Unrepresentable { .. }));
        assert_eq!(out, vec![0xaa, 0xbb]);
    }

    #[test]
    fn test_arc_coder_delegates() {
        let coder: Arc<dyn Coder<Value = Timestamp>> = Arc::new(InstantCoder);
        let bytes = coder.encode_to_vec(&Timestamp::from_millis(-3)).unwrap();
        assert_eq!(coder.decode_from_slice(&bytes).unwrap().millis(), -3);
    }
}
