/// Lowercases a string and folds the Spanish accented letters to their base
/// form, so that "Azúcar", "azucar" and "AZÚCAR" all compare equal.
///
/// Mirrors the normalization the ingredient table applies to its
/// `search_name` column: comparisons against stored rows only work if both
/// sides go through the same fold.
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_accent)
        .collect::<String>()
        .trim()
        .to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_accents_and_case() {
        assert_eq!(normalize("Azúcar Morena"), "azucar morena");
        assert_eq!(normalize("JAMÓN"), "jamon");
        assert_eq!(normalize("  piña  "), "pina");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("Café con Leche");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_normalize_keeps_punctuation() {
        assert_eq!(normalize("Pollo al ajillo (casero)"), "pollo al ajillo (casero)");
    }
}
