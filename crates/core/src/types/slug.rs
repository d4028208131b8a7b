//! Slug and SKU derivation for products.

/// Derive a URL slug from a product name.
///
/// Lowercases the name, replaces every non-alphanumeric run with a single
/// hyphen, and trims leading/trailing hyphens.
///
/// ```
/// use velocart_core::slugify;
///
/// assert_eq!(slugify("Aurora 52\" Ceiling Fan"), "aurora-52-ceiling-fan");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Derive a SKU of the form `CAT-BRA-0001` from category, brand, and a
/// 1-based sequence number.
///
/// Takes the first three characters of category and brand, uppercased.
#[must_use]
pub fn derive_sku(category: &str, brand: &str, sequence: usize) -> String {
    let prefix = |s: &str| -> String { s.chars().take(3).flat_map(char::to_uppercase).collect() };
    format!("{}-{}-{:04}", prefix(category), prefix(brand), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Classic White Tee"), "classic-white-tee");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("Hi-Speed  (2024)!"), "hi-speed-2024");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  --Edge Case--  "), "edge-case");
    }

    #[test]
    fn test_slugify_empty_and_symbols_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_derive_sku() {
        assert_eq!(derive_sku("Fan", "Breeze", 1), "FAN-BRE-0001");
        assert_eq!(derive_sku("Lighting", "Lux", 42), "LIG-LUX-0042");
    }

    #[test]
    fn test_derive_sku_short_names() {
        assert_eq!(derive_sku("TV", "X", 7), "TV-X-0007");
    }
}
