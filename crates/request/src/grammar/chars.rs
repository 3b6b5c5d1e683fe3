//! Byte classes from RFC 7230 and RFC 3986.
//!
//! Everything here works on single ASCII bytes; any byte above `0x7f` fails
//! every class, which is how non-ASCII input gets rejected.

use crate::ensure;

/// `tchar` from RFC 7230 section 3.2.6.
#[inline]
pub(crate) fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[inline]
pub(crate) fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

#[inline]
pub(crate) fn is_sub_delim(b: u8) -> bool {
    matches!(b, b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=')
}

/// `pchar` without the `pct-encoded` alternative, which [`check_component`]
/// handles on its own.
#[inline]
pub(crate) fn is_pchar(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':' || b == b'@'
}

/// Characters of `path-abempty` / `absolute-path`: `pchar` plus the separator.
#[inline]
pub(crate) fn is_path_char(b: u8) -> bool {
    is_pchar(b) || b == b'/'
}

/// Characters of `query` and `fragment`.
#[inline]
pub(crate) fn is_query_char(b: u8) -> bool {
    is_pchar(b) || b == b'/' || b == b'?'
}

#[inline]
pub(crate) fn is_userinfo_char(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':'
}

#[inline]
pub(crate) fn is_reg_name_char(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b)
}

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub(crate) fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// Renders a byte for an error message.
pub(crate) fn describe(b: u8) -> String {
    if b.is_ascii_graphic() || b == b' ' { format!("'{}'", char::from(b)) } else { format!("0x{b:02x}") }
}

/// Checks every byte of `part` against `allowed`, accepting `%XX` escapes.
///
/// `offset` is where `part` starts in the full input and `what` names the
/// component; both only feed the error message.
pub(crate) fn check_component(part: &str, offset: usize, what: &str, allowed: fn(u8) -> bool) -> Result<(), String> {
    let bytes = part.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            let escaped = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            ensure!(escaped, format!("malformed percent-encoding in {what} at index {}", offset + i));
            i += 3;
            continue;
        }

        ensure!(allowed(b), format!("invalid character {} in {what} at index {}", describe(b), offset + i));
        i += 1;
    }
    Ok(())
}
