//! Coders for the built-in window types

use super::types::{GlobalWindow, IntervalWindow};
use crate::coder::{wire, Coder};
use crate::error::{DecodeResult, DecodingError, EncodeResult};
use crate::time::Timestamp;

/// Coder for [`GlobalWindow`]; the singleton takes no bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalWindowCoder;

impl Coder for GlobalWindowCoder {
    type Value = GlobalWindow;

    fn encode(&self, _value: &GlobalWindow, _out: &mut Vec<u8>) -> EncodeResult<()> {
        Ok(())
    }

    fn decode(&self, _input: &mut &[u8]) -> DecodeResult<GlobalWindow> {
        Ok(GlobalWindow)
    }
}

/// Coder for [`IntervalWindow`]
///
/// Layout: the end timestamp (8 bytes, order preserving) followed by the
/// span `end - start` as a varint. Short windows cost one or two bytes past
/// the end timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalWindowCoder;

impl Coder for IntervalWindowCoder {
    type Value = IntervalWindow;

    fn encode(&self, value: &IntervalWindow, out: &mut Vec<u8>) -> EncodeResult<()> {
        wire::write_instant(out, value.end());
        wire::write_varint(out, value.span_millis());
        Ok(())
    }

    fn decode(&self, input: &mut &[u8]) -> DecodeResult<IntervalWindow> {
        let end = wire::read_instant(input)?;
        let span = wire::read_varint(input, "window span")?;

        let start = i128::from(end.millis()) - i128::from(span);
        let start = i64::try_from(start).map_err(|_| DecodingError::InvalidValue {
            what: "interval window",
            reason: format!("span {}ms reaches before the start of time from end {}", span, end),
        })?;

        IntervalWindow::new(Timestamp::from_millis(start), end).map_err(|e| {
            DecodingError::InvalidValue {
                what: "interval window",
                reason: e.to_string(),
            }
        })
    }
}
