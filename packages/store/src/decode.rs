//! Query-value decoding.
//!
//! `+` becomes a space and `%XY` becomes the byte `0xXY`. The decoder never
//! fails: an escape whose hex pair is malformed decodes to the byte `0`, and
//! decoding carries on after it. Clients rely on this when they round-trip
//! values through the edit form, so the fallback is part of the format.

/// Decode a raw query value into a new owned buffer.
///
/// ```rust
/// use kvlite_store::url_decode;
///
/// assert_eq!(url_decode(b"a%20b+c"), b"a b c");
/// assert_eq!(url_decode(b"x%zzy"), b"x\0y");
/// ```
pub fn url_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'%' => {
                let end = (i + 3).min(input.len());
                out.push(parse_hex_pair(&input[i + 1..end]));
                i = end;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

/// Parse up to two hex digits. Empty input or any non-hex digit gives 0.
fn parse_hex_pair(digits: &[u8]) -> u8 {
    digits
        .iter()
        .try_fold(0u8, |acc, &d| {
            let nibble = (d as char).to_digit(16)? as u8;
            Some((acc << 4) | nibble)
        })
        .unwrap_or(0)
}
