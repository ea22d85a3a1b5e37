//! Heading slugs.

/// Convert heading text to the anchor id shared by the outline and the
/// rendered heading.
///
/// Lower-cases, drops everything except ASCII word characters, whitespace and
/// hyphens, then joins the remaining words with single hyphens. Applying it to
/// its own output is a no-op.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
        // anything else is stripped without separating words
    }

    slug
}
