/// Lowercases `input` and joins its whitespace-separated words with `-`.
pub fn slugify(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalises an explicit slug, or derives one from `name` when it is blank.
pub fn derive_slug(explicit: &str, name: &str) -> String {
    if explicit.trim().is_empty() {
        slugify(name)
    } else {
        slugify(explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_name_when_slug_is_blank() {
        assert_eq!(derive_slug("", "Acme"), "acme");
        assert_eq!(derive_slug("  ", "Mountain  Bikes "), "mountain-bikes");
    }

    #[test]
    fn normalises_an_explicit_slug() {
        assert_eq!(derive_slug(" Road Bikes", "ignored"), "road-bikes");
    }

    #[test]
    fn keeps_existing_hyphens() {
        assert_eq!(slugify("e-bike Parts"), "e-bike-parts");
    }
}
