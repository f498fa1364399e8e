//! Plain-text helpers shared by the manuscript and backend modules.

/// Strip HTML tags from rich-text chapter content.
///
/// Tags are replaced by a space and runs of whitespace are collapsed, so
/// `<p>One</p><p>Two</p>` becomes `One Two`. Content without a `<` is
/// returned unchanged.
pub fn strip_html(content: &str) -> String {
    if !content.contains('<') {
        return content.to_string();
    }

    let mut plain = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => {
                in_tag = true;
                plain.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }

    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-separated words in the plain-text form of `content`.
pub fn count_words(content: &str) -> u64 {
    strip_html(content).split_whitespace().count() as u64
}

/// Turn a project name into an id: lowercase, whitespace runs become `-`,
/// anything else that is not alphanumeric or `-` is dropped.
///
/// Returns an empty string when nothing survives; callers pick a fallback.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>One</p><p>Two  words</p>"), "One Two words");
        assert_eq!(strip_html("no markup  here"), "no markup  here");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("<h1>Title</h1><p>It was a dark night.</p>"), 6);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My  Great Novel!"), "my-great-novel");
        assert_eq!(slugify("  ???  "), "");
        assert_eq!(slugify("Draft 2"), "draft-2");
    }
}
