//! Splitting of coalesced `Set-Cookie` header values.
//!
//! Transports may join several `Set-Cookie` headers into one value with
//! `", "`. A comma is also legal inside an `Expires` date, so a comma only
//! separates two cookies when the token after it is followed by `=` before
//! any `;` or `,`:
//!
//! ```text
//! a=1; Expires=Wed, 09 Jun 2021 10:18:14 GMT, b=2
//!                 ^ date comma               ^ separator
//! ```

/// Split one (possibly comma-joined) header value into individual
/// `key=value; Attr=Val` strings. Empty segments are dropped.
pub fn split_cookies_string(input: &str) -> Vec<String> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut cookies = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while pos < len {
        if bytes[pos] != b',' {
            pos += 1;
            continue;
        }

        let last_comma = pos;
        pos += 1;

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let next_start = pos;

        while pos < len && !matches!(bytes[pos], b'=' | b';' | b',') {
            pos += 1;
        }

        if pos < len && bytes[pos] == b'=' {
            push_segment(&mut cookies, &input[start..last_comma]);
            start = next_start;
        } else {
            // Not a separator: keep scanning right after this comma.
            pos = last_comma + 1;
        }
    }

    push_segment(&mut cookies, &input[start..]);
    cookies
}

/// Split every header value of a multi-valued `Set-Cookie` field.
pub fn split_set_cookie_headers<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| split_cookies_string(value.as_ref()))
        .collect()
}

fn push_segment(cookies: &mut Vec<String>, segment: &str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        cookies.push(segment.to_string());
    }
}
