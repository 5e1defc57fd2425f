//! URL-safe identifiers for project names

/// Separator placed between words of a slug
const SEPARATOR: char = '-';

/// Map a project name to a URL-safe identifier.
///
/// Lowercases, keeps ASCII alphanumerics, turns every other run of
/// characters into a single `-` and trims separators from both ends.
/// Total and idempotent: `slugify(&slugify(x)) == slugify(x)`.
///
/// Distinct names can collide (`"A B"` and `"a-b"`); callers must not
/// treat slugs as unique keys.
///
/// # Examples
/// ```
/// use statusboard_common::slug::slugify;
///
/// assert_eq!(slugify("Open Budget  Explorer!"), "open-budget-explorer");
/// assert_eq!(slugify("  311 Data "), "311-data");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Code for Philly"), "code-for-philly");
        assert_eq!(slugify("CityBikes"), "citybikes");
    }

    #[test]
    fn test_slugify_collapses_repeats() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("__hello__world__"), "hello-world");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Ñandú"), "caf-and");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn test_slugify_is_idempotent_and_whitespace_free() {
        let names = [
            "",
            "   ",
            "Open Budget",
            "Tabs\tand\nnewlines",
            "already-a-slug",
            "UPPER lower 123",
            "emoji 🚲 bike share",
            "--leading and trailing--",
        ];

        for name in names {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", name);
            assert!(!once.chars().any(char::is_whitespace));
            assert!(!once.starts_with(SEPARATOR) && !once.ends_with(SEPARATOR));
        }
    }

    #[test]
    fn test_same_name_same_slug() {
        assert_eq!(slugify("Food Finder"), slugify("Food Finder"));
        assert_eq!(slugify("Food Finder"), slugify("food-finder"));
    }
}
