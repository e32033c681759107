//! Request-string tokenizing
//!
//! Splits raw request paths and query strings into [`KeyValueVec`]s,
//! percent-decodes values (RFC 3986) and splits `module:identifier` tokens.
//! Nothing here rejects input: malformed escapes pass through literally.

use percent_encoding::percent_decode_str;

use crate::kv_vec::KeyValueVec;

/// Split `s` on any character in `delims`, keeping empty segments.
///
/// The result always has one more element than there are delimiter
/// occurrences in `s`.
pub fn split_segments(s: &str, delims: &str) -> Vec<String> {
    s.split(|c: char| delims.contains(c))
        .map(str::to_owned)
        .collect()
}

/// RFC 3986 percent-decoding. `%XX` with two hex digits is decoded; any
/// other `%` sequence, including a truncated trailing one, is kept as is.
///
/// Decoded bytes that are not valid UTF-8 become U+FFFD, so `a%FFb`
/// yields `"a\u{FFFD}b"`.
pub fn percent_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Split `s` into segments on `delim1`, then each segment into a name and
/// a percent-decoded value on the first `delim2`.
///
/// ```
/// use restconf_path::tokenize::split_pairs;
///
/// let vec = split_pairs("/restconf/data/ietf-interfaces:interfaces/interface=eth%2F0", '/', '=');
/// assert_eq!(vec.len(), 4);
/// assert_eq!(vec.get(3).unwrap().name(), "interface");
/// assert_eq!(vec.get(3).unwrap().value(), "eth/0");
/// ```
///
/// Empty segments are dropped. A segment without `delim2` becomes a name
/// with an empty value. Leading blanks are trimmed from names that carry
/// a value.
pub fn split_pairs(s: &str, delim1: char, delim2: char) -> KeyValueVec {
    let mut vec = KeyValueVec::new();
    let mut delims = [0u8; 4];
    for segment in split_segments(s, delim1.encode_utf8(&mut delims)) {
        match segment.split_once(delim2) {
            Some((name, value)) => {
                let name = name.trim_start_matches([' ', '\t']);
                vec.push(name, &percent_decode(value));
            }
            None if !segment.is_empty() => {
                vec.push(&segment, "");
            }
            None => {}
        }
    }
    vec
}

/// Split a node identifier into its optional module prefix and local name
pub fn split_qualified(node_id: &str) -> (Option<&str>, &str) {
    match node_id.split_once(':') {
        Some((prefix, id)) => (Some(prefix), id),
        None => (None, node_id),
    }
}
