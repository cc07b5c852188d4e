//! Download file names derived from the encoded text.

pub const MAX_STEM_CHARS: usize = 40;
pub const FALLBACK_STEM: &str = "qr";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Trim, replace each disallowed character with `_`, keep 40 characters.
///
/// The result matches `[A-Za-z0-9\-_.]{1,40}`; an empty result becomes `qr`.
pub fn sanitize_file_stem(text: &str) -> String {
    let stem: String = text
        .trim()
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .take(MAX_STEM_CHARS)
        .collect();

    if stem.is_empty() {
        FALLBACK_STEM.to_owned()
    } else {
        stem
    }
}

pub fn download_file_name(text: &str) -> String {
    format!("{}.png", sanitize_file_stem(text))
}
