// Text normalization backing every fuzzy comparison in the search core.
// All matching is substring containment on case-folded, diacritic-stripped
// text; catalog data entry is too inconsistent for exact comparison.

/// Lowercases and strips the Latin diacritics that show up in Brazilian
/// catalog data. Characters outside the folding table pass through unchanged.
pub fn normalize(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

fn fold_char(c: char) -> impl Iterator<Item = char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    };
    folded.to_lowercase()
}

/// Splits `text` into normalized words strictly longer than `min_len`,
/// trimming punctuation off word edges.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            normalize(word.trim_matches(|c: char| !c.is_alphanumeric()))
        })
        .filter(|word| word.len() > min_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_case() {
        assert_eq!(normalize("Suspensão"), "suspensao");
        assert_eq!(normalize("Cerâmica"), "ceramica");
        assert_eq!(normalize("FREIO À DISCO"), "freio a disco");
    }

    #[test]
    fn passes_plain_ascii_through() {
        assert_eq!(normalize("onix 1.0 16v"), "onix 1.0 16v");
    }

    #[test]
    fn tokenize_drops_short_words_and_punctuation() {
        let words = tokenize("barulho ao frear, né?", 1);
        assert_eq!(words, vec!["barulho", "frear", "ne"]);
    }

    #[test]
    fn tokenize_min_len_is_strict() {
        // length must be strictly greater than min_len
        assert!(tokenize("ar", 2).is_empty());
        assert_eq!(tokenize("oleo", 2), vec!["oleo"]);
    }
}
