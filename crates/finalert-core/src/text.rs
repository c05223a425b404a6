//! Text helpers for matching Turkish source pages.

/// Lower-case `text` and fold Turkish letters to their ASCII base.
///
/// `"Çeyrek Altın"` becomes `"ceyrek altin"`, `"İngiliz"` becomes `"ingiliz"`.
pub fn fold_turkish(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ç' | 'Ç' => folded.push('c'),
            'ğ' | 'Ğ' => folded.push('g'),
            'ı' | 'İ' | 'I' => folded.push('i'),
            'ö' | 'Ö' => folded.push('o'),
            'ş' | 'Ş' => folded.push('s'),
            'ü' | 'Ü' => folded.push('u'),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_turkish() {
        assert_eq!(fold_turkish("Çeyrek Altın"), "ceyrek altin");
        assert_eq!(fold_turkish("İNGİLİZ STERLİNİ"), "ingiliz sterlini");
        assert_eq!(fold_turkish("Yarım"), "yarim");
        assert_eq!(fold_turkish("usd"), "usd");
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  Gram \n\t Altın "), "Gram Altın");
    }
}
