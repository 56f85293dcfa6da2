/// Returns true for the characters kept verbatim in a slug: ASCII letters,
/// digits and underscores.
fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Converts heading text into an anchor identifier.
///
/// Every maximal run of non-word characters becomes a single hyphen, except a
/// run touching the start or the end of the text, which is dropped. The result
/// is lowercased. Word characters are ASCII only, so accented letters and other
/// scripts count as separators.
///
/// Distinct headings can share a slug (`"Step 1!"` and `"Step 1?"` both give
/// `step-1`); no de-duplication is performed.
///
/// # Examples
///
/// ```
/// use mdpost_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  -- Setup --  "), "setup");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if is_word_char(ch) {
            // A run that started at index 0 leaves `slug` empty and is dropped.
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    // A trailing run never flushes its hyphen.
    slug
}

/// Normalizes an externally supplied document identifier before it is used
/// to locate a post on disk.
///
/// Strips everything outside `[A-Za-z0-9_-]` and lowercases the rest, which
/// removes path separators and dots.
pub fn sanitize_document_id(id: &str) -> String {
    id.chars()
        .filter(|ch| is_word_char(*ch) || *ch == '-')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}
