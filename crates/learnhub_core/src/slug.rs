//! crates/learnhub_core/src/slug.rs
//!
//! Deterministic derivation of URL-safe slugs from course titles. Slugs are
//! computed at read time, never stored.

/// Lowercases the title, collapses every run of non-alphanumeric characters
/// into a single `-`, and trims leading/trailing dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("Intro to Web Dev!"), "intro-to-web-dev");
    }

    #[test]
    fn collapses_symbol_runs() {
        assert_eq!(slugify("Rust & Systems -- Programming"), "rust-systems-programming");
        assert_eq!(slugify("C++ for C# devs"), "c-for-c-devs");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(slugify("  ...Async Rust...  "), "async-rust");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn stable_across_calls() {
        let title = "Advanced Databases 101";
        assert_eq!(slugify(title), slugify(title));
        assert_eq!(slugify(title), "advanced-databases-101");
    }
}
