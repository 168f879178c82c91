/// Folds one character toward the canonical event-category alphabet.
///
/// Accented vowels (and n-tilde) map to their ASCII base, separators map to
/// `-`, everything else is lower-cased unchanged.
#[must_use]
pub const fn fold_char(ch: char) -> char {
    match ch {
        'á' | 'Á' | 'à' | 'À' => 'a',
        'é' | 'É' | 'è' | 'È' => 'e',
        'í' | 'Í' | 'ì' | 'Ì' => 'i',
        'ó' | 'Ó' | 'ò' | 'Ò' => 'o',
        'ú' | 'Ú' | 'ù' | 'Ù' | 'ü' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        '_' | ' ' => '-',
        _ => ch.to_ascii_lowercase(),
    }
}

/// Normalizes a raw event-category string for knowledge-base lookup:
/// trims, lower-cases, folds diacritics, and unifies separators.
#[must_use]
pub fn normalize_category(raw: &str) -> String {
    raw.trim().chars().map(fold_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_separators() {
        assert_eq!(normalize_category("PARTY"), "party");
        assert_eq!(normalize_category("Day Off"), "day-off");
        assert_eq!(normalize_category("day_off"), "day-off");
        assert_eq!(normalize_category("  trip  "), "trip");
    }

    #[test]
    fn folds_accented_characters_to_ascii_base() {
        assert_eq!(normalize_category("strÉss"), "stress");
        assert_eq!(normalize_category("ìllnéss"), "illness");
        assert_eq!(normalize_category("señor"), "senor");
        assert_eq!(normalize_category("Über"), "uber");
    }
}
