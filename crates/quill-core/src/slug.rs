//! URL slug derivation for categories and posts.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_SUFFIX: AtomicI64 = AtomicI64::new(0);

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Slug for a category name: lowercased, everything except ASCII word
/// characters and spaces removed, runs of spaces turned into `-`.
pub fn category_slug(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || *c == ' ')
        .collect();

    kept.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Human-readable part of a post slug, without the uniqueness suffix.
///
/// Punctuation is dropped, whitespace runs become a single `-`, and
/// leading/trailing separators are trimmed.
pub fn title_slug(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace() || *c == '-')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Next uniqueness suffix: the current time in milliseconds, bumped so
/// that no two calls in this process ever return the same value.
pub fn next_suffix() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_SUFFIX
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// Full post slug: `<title-slug>-<suffix>`.
pub fn post_slug(title: &str) -> String {
    let base = title_slug(title);
    let base = if base.is_empty() { "post" } else { base.as_str() };
    format!("{}-{}", base, next_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_category_slug() {
        assert_eq!(category_slug("Technology"), "technology");
        assert_eq!(category_slug("Food & Drink"), "food-drink");
        assert_eq!(category_slug("  Health  "), "health");
    }

    #[test]
    fn test_title_slug() {
        assert_eq!(title_slug("Hello, World!"), "hello-world");
        assert_eq!(title_slug("  Rust --  is   fun "), "rust-is-fun");
        assert_eq!(title_slug("snake_case stays"), "snake_case-stays");
        assert_eq!(title_slug("!!!"), "");
    }

    #[test]
    fn test_post_slug_shape() {
        let slug = post_slug("Hello, World!");
        let suffix = slug.strip_prefix("hello-world-").unwrap();
        assert!(!suffix.is_empty());
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_post_slug_for_punctuation_only_title() {
        assert!(post_slug("???").starts_with("post-"));
    }

    #[test]
    fn test_colliding_titles_get_unique_slugs() {
        let slugs: HashSet<String> = (0..500).map(|_| post_slug("Same Title")).collect();
        assert_eq!(slugs.len(), 500);
    }

    #[test]
    fn test_suffix_is_strictly_increasing_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..200).map(|_| next_suffix()).collect::<Vec<_>>()))
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let values = handle.join().unwrap();
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            all.extend(values);
        }
        assert_eq!(all.len(), 800);
    }
}
