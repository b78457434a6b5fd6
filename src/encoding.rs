//! Character encoding sniffing and body decoding.
//!
//! HTTP defaults `text/*` bodies to ISO-8859-1 when the header carries no
//! charset, which mislabels most real pages. When the declared charset is
//! missing or is that default, the body is decoded using the encoding
//! sniffed from its own meta declarations instead.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `<meta charset="...">`.
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`.
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Sniff the character encoding from the first 1024 bytes of an HTML body.
///
/// Checks `<meta charset>` then `<meta http-equiv="Content-Type">`, and
/// falls back to UTF-8 when neither declares a known charset.
#[must_use]
pub fn sniff_encoding(body: &[u8]) -> &'static Encoding {
    let head = &body[..body.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    for re in [&*CHARSET_META_RE, &*CONTENT_TYPE_CHARSET_RE] {
        if let Some(label) = re.captures(&head_str).and_then(|c| c.get(1)) {
            if let Some(encoding) = Encoding::for_label(label.as_str().as_bytes()) {
                return encoding;
            }
        }
    }

    UTF_8
}

/// Whether a declared transport charset is the HTTP fallback default rather
/// than an actual declaration worth trusting.
fn is_transport_default(label: &str) -> bool {
    label.eq_ignore_ascii_case("iso-8859-1") || label.eq_ignore_ascii_case("latin1")
}

/// Decode an HTTP body to a UTF-8 string.
///
/// `declared` is the charset from the `Content-Type` header, if any. When it
/// is absent, unknown, or the ISO-8859-1 transport default, the body's own
/// meta declarations decide. Decoding is lossy and never fails; invalid
/// sequences become U+FFFD.
#[must_use]
pub fn decode_body(body: &[u8], declared: Option<&str>) -> String {
    let encoding = match declared {
        Some(label) if !is_transport_default(label) => {
            Encoding::for_label(label.as_bytes()).unwrap_or_else(|| sniff_encoding(body))
        }
        _ => sniff_encoding(body),
    };

    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }

    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}
