/// Map every character outside `[A-Za-z0-9._-]` to `_`.
///
/// One underscore is emitted per replaced character, so `://` becomes `___`.
/// The mapping is idempotent: sanitizing a sanitized name returns it unchanged.
pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
