/// Whether the string is an RFC 3986 [segment](https://www.rfc-editor.org/rfc/rfc3986#section-3.3).
///
/// segment = *pchar
pub fn is_segment(value: &str) -> bool {
    is_pct_encoded_with(value, is_pchar)
}

/// Whether every character is accepted by `allowed`, where `%` must start a
/// `pct-encoded = "%" HEXDIG HEXDIG` triplet.
pub fn is_pct_encoded_with(value: &str, allowed: impl Fn(char) -> bool) -> bool {
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '%' {
            let (Some(a), Some(b)) = (chars.next(), chars.next()) else {
                return false;
            };

            if !a.is_ascii_hexdigit() || !b.is_ascii_hexdigit() {
                return false;
            }
        } else if !allowed(c) {
            return false;
        }
    }

    true
}

/// idchar = ALPHA / DIGIT / "." / "-" / "_" / pct-encoded
pub fn is_idchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'
}

/// param-char = ALPHA / DIGIT / "." / "-" / "_" / ":" / pct-encoded
pub fn is_param_char(c: char) -> bool {
    is_idchar(c) || c == ':'
}

/// pchar = unreserved / pct-encoded / sub-delims / ":" / "@"
pub fn is_pchar(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c) || c == ':' || c == '@'
}

/// unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~'
}

/// sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="
fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}
