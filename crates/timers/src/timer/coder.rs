//! Binary codec for timers
//!
//! Wire layout of one timer:
//!
//! ```text
//! +------+--------------------------------------+-----------+--------+
//! | ns   | window payload | varint len | key    | timestamp | domain |
//! | 1 B  | (window coder) |            | UTF-8  | 8 B BE    | 1 B    |
//! +------+--------------------------------------+-----------+--------+
//!          only present when ns == 1 (window-scoped)
//! ```
//!
//! Namespace codes: `0` global, `1` window. The timestamp uses the
//! order-preserving instant encoding from [`crate::coder::wire`]. The
//! smallest valid encoding is a global timer at ten bytes.
//!
//! The key is the namespace's string key, `"/" + base64url(payload) + "/"`.
//! Decoding rejects a key that disagrees with the payload in front of it.

use tracing::{debug, trace};

use super::data::TimerData;
use crate::coder::{wire, Coder, VecCoder};
use crate::config::CodecConfig;
use crate::error::{DecodeResult, DecodingError, EncodeResult, EncodingError, Result};
use crate::state::namespace::window_key;
use crate::state::{StateNamespace, WindowNamespace};
use crate::time::TimeDomain;
use crate::window::BoundedWindow;

const GLOBAL_NAMESPACE: u8 = 0;
const WINDOW_NAMESPACE: u8 = 1;

/// Length of the shortest valid timer encoding
pub const MIN_ENCODED_LEN: usize = 1 + wire::INSTANT_LEN + 1;

/// Coder for [`TimerData`], parameterised by the window coder used inside
/// window namespaces
#[derive(Debug, Clone)]
pub struct TimerDataCoder<C> {
    window_coder: C,
    config: CodecConfig,
}

impl<C> TimerDataCoder<C>
where
    C: Coder,
    C::Value: BoundedWindow,
{
    /// Create a timer coder with default limits
    pub fn of(window_coder: C) -> Self {
        Self {
            window_coder,
            config: CodecConfig::default(),
        }
    }

    /// Create a timer coder with explicit limits
    ///
    /// Fails with [`crate::error::TimerError::Configuration`] if `config`
    /// does not validate.
    pub fn with_config(window_coder: C, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window_coder,
            config,
        })
    }

    pub fn window_coder(&self) -> &C {
        &self.window_coder
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Coder for whole timer sets, bounded by `max_timer_set_len`
    pub fn timer_set_coder(&self) -> VecCoder<&Self> {
        VecCoder::new(self, self.config.max_timer_set_len)
    }

    /// Encode a pending timer set into one byte string
    pub fn encode_timer_set(&self, timers: &[TimerData]) -> EncodeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.timer_set_coder().encode_slice(timers, &mut out)?;
        trace!(timers = timers.len(), bytes = out.len(), "encoded timer set");
        Ok(out)
    }

    /// Decode a timer set written by [`Self::encode_timer_set`]
    pub fn decode_timer_set(&self, bytes: &[u8]) -> DecodeResult<Vec<TimerData>> {
        self.timer_set_coder()
            .decode_from_slice(bytes)
            .map_err(|e| {
                debug!(error = %e, bytes = bytes.len(), "failed to decode timer set");
                e
            })
    }

    fn encode_namespace(&self, namespace: &StateNamespace, out: &mut Vec<u8>) -> EncodeResult<()> {
        match namespace {
            StateNamespace::Global => {
                wire::write_u8(out, GLOBAL_NAMESPACE);
            }
            StateNamespace::Window(ns) => {
                wire::write_u8(out, WINDOW_NAMESPACE);
                // Go through the window coder so a namespace built with a
                // different coder is caught here rather than at decode time.
                let window = ns.decode_window(&self.window_coder).map_err(|e| {
                    EncodingError::Window {
                        source: Box::new(EncodingError::Unrepresentable {
                            what: "window namespace",
                            reason: e.to_string(),
                        }),
                    }
                })?;
                let payload_start = out.len();
                self.window_coder
                    .encode(&window, out)
                    .map_err(|e| EncodingError::Window {
                        source: Box::new(e),
                    })?;
                let key = window_key(&out[payload_start..]);
                wire::write_len_prefixed(out, key.as_bytes());
            }
        }
        Ok(())
    }

    fn decode_namespace(&self, input: &mut &[u8]) -> DecodeResult<StateNamespace> {
        match wire::read_u8(input, "namespace discriminator")? {
            GLOBAL_NAMESPACE => Ok(StateNamespace::Global),
            WINDOW_NAMESPACE => {
                let before = *input;
                let window = self
                    .window_coder
                    .decode(input)
                    .map_err(|e| DecodingError::Window {
                        source: Box::new(e),
                    })?;
                let consumed = before.len() - input.len();
                let (payload, _) = before.split_at(consumed);

                let key = wire::read_string(
                    input,
                    "namespace key",
                    self.config.max_namespace_key_bytes,
                )?;
                // Equal payloads must map to one storage key
                if key != window_key(payload) {
                    return Err(DecodingError::InvalidNamespaceKey {
                        key,
                        reason: "does not match the window payload".to_string(),
                    });
                }

                Ok(StateNamespace::Window(WindowNamespace::from_parts(
                    payload.to_vec(),
                    window.max_timestamp(),
                    key,
                )))
            }
            value => Err(DecodingError::InvalidDiscriminator {
                what: "namespace",
                value,
            }),
        }
    }
}

impl<C> Coder for TimerDataCoder<C>
where
    C: Coder,
    C::Value: BoundedWindow,
{
    type Value = TimerData;

    fn encode(&self, timer: &TimerData, out: &mut Vec<u8>) -> EncodeResult<()> {
        let start = out.len();
        let result = self.encode_namespace(timer.namespace(), out);
        if let Err(e) = result {
            // Leave no half-written timer behind
            out.truncate(start);
            return Err(e);
        }
        wire::write_instant(out, timer.timestamp());
        wire::write_u8(out, timer.domain().wire_code());
        Ok(())
    }

    fn decode(&self, input: &mut &[u8]) -> DecodeResult<TimerData> {
        let namespace = self.decode_namespace(input)?;
        let timestamp = wire::read_instant(input)?;
        let domain = TimeDomain::try_from(wire::read_u8(input, "time domain")?)?;
        Ok(TimerData::of(namespace, timestamp, domain))
    }
}
