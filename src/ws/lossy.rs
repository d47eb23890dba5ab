//! Lossy JSON decoding for text frames.
//!
//! JavaScript clients can send JSON strings holding unpaired UTF-16 surrogates
//! (`"\ud800"`), which `serde_json` rejects. Frames that fail to decode are
//! retried once with every lone surrogate escape replaced by U+FFFD.

use std::borrow::Cow;
use std::ops::Range;

use serde::de::DeserializeOwned;

const HIGH_SURROGATES: Range<u16> = 0xD800..0xDC00;
const LOW_SURROGATES: Range<u16> = 0xDC00..0xE000;
const REPLACEMENT_ESCAPE: &str = "\\ufffd";

/// Parses `text` as JSON, falling back to [`replace_lone_surrogates`] when
/// the strict parse fails.
///
/// # Errors
///
/// Returns the strict parse error when the text has no lone surrogate to
/// repair, otherwise the error of the repaired parse.
pub fn from_str_lossy<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let err = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    match replace_lone_surrogates(text) {
        Cow::Borrowed(_) => Err(err),
        Cow::Owned(repaired) => {
            tracing::trace!(error = %err, "retrying frame with lone surrogates replaced");
            serde_json::from_str(&repaired)
        }
    }
}

/// Rewrites `\uXXXX` escapes that encode an unpaired surrogate as `\ufffd`.
///
/// Well-formed surrogate pairs, other escapes, and escaped backslashes are
/// left untouched. Returns the input unchanged when nothing was replaced.
#[must_use]
pub fn replace_lone_surrogates(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut repaired: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;

    while let Some(&byte) = bytes.get(i) {
        if byte != b'\\' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) != Some(&b'u') {
            // Skip the escaped character, which may itself be a backslash.
            i += 2;
            continue;
        }
        let Some(unit) = hex_unit(bytes, i + 2) else {
            i += 2;
            continue;
        };

        let lone = if HIGH_SURROGATES.contains(&unit) {
            let paired = bytes.get(i + 6) == Some(&b'\\')
                && bytes.get(i + 7) == Some(&b'u')
                && hex_unit(bytes, i + 8).is_some_and(|low| LOW_SURROGATES.contains(&low));
            if paired {
                i += 12;
                continue;
            }
            true
        } else {
            LOW_SURROGATES.contains(&unit)
        };

        if lone {
            let out = repaired.get_or_insert_with(|| String::with_capacity(text.len()));
            out.push_str(text.get(copied..i).unwrap_or_default());
            out.push_str(REPLACEMENT_ESCAPE);
            copied = i + 6;
        }
        i += 6;
    }

    match repaired {
        Some(mut out) => {
            out.push_str(text.get(copied..).unwrap_or_default());
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Reads four hex digits starting at `start`.
fn hex_unit(bytes: &[u8], start: usize) -> Option<u16> {
    let digits = bytes.get(start..start + 4)?;
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let digits = std::str::from_utf8(digits).ok()?;
    u16::from_str_radix(digits, 16).ok()
}
