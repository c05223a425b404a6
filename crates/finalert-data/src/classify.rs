//! Map free-text instrument names from scraped pages to canonical symbols.

use finalert_core::text::fold_turkish;

/// Classify a currency row label such as "ABD Doları" or "İngiliz Sterlini".
pub fn classify_currency(name: &str) -> Option<&'static str> {
    let name = fold_turkish(name);

    if (name.contains("dolar") || name.contains("usd"))
        && !name.contains("kanada")
        && !name.contains("avustralya")
    {
        Some("USD")
    } else if name.contains("euro") || name.contains("eur") {
        Some("EUR")
    } else if name.contains("sterlin") || name.contains("gbp") || name.contains("ingiliz") {
        Some("GBP")
    } else {
        None
    }
}

/// Classify a gold row label such as "Gram Altın" or "Çeyrek Altın".
///
/// Rows marked closed ("kapalı") are skipped.
pub fn classify_metal(name: &str) -> Option<&'static str> {
    let name = fold_turkish(name);

    if name.contains("kapali") {
        return None;
    }

    if name.contains("gram") && name.contains("altin") {
        Some("gram")
    } else if name.contains("ceyrek") {
        Some("ceyrek")
    } else if name.contains("yarim") {
        Some("yarim")
    } else if name.contains("cumhuriyet") {
        Some("cumhuriyet")
    } else if name.contains("tam") {
        Some("tam")
    } else if name.contains("ons") {
        Some("ons")
    } else {
        None
    }
}

/// Classify a row of the mynet gold table.
///
/// That table lists the ounce twice, once in dollars ("ONS") and once in
/// lira ("ONS TL"). Only the lira row maps to `ons`.
pub fn classify_mynet_metal(name: &str) -> Option<&'static str> {
    match classify_metal(name)? {
        "ons" if !fold_turkish(name).contains("tl") => None,
        symbol => Some(symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_labels() {
        assert_eq!(classify_currency("ABD DOLARI"), Some("USD"));
        assert_eq!(classify_currency("Euro"), Some("EUR"));
        assert_eq!(classify_currency("İngiliz Sterlini"), Some("GBP"));
        assert_eq!(classify_currency("Kanada Doları"), None);
        assert_eq!(classify_currency("Avustralya Doları"), None);
        assert_eq!(classify_currency("İsviçre Frangı"), None);
    }

    #[test]
    fn test_metal_labels() {
        assert_eq!(classify_metal("Gram Altın"), Some("gram"));
        assert_eq!(classify_metal("Çeyrek Altın"), Some("ceyrek"));
        assert_eq!(classify_metal("Yarım Altın"), Some("yarim"));
        assert_eq!(classify_metal("Cumhuriyet Altını"), Some("cumhuriyet"));
        assert_eq!(classify_metal("Tam Altın"), Some("tam"));
        assert_eq!(classify_metal("Ons Altın"), Some("ons"));
        assert_eq!(classify_metal("Gram Altın (Kapalı Çarşı)"), None);
        assert_eq!(classify_metal("Gümüş"), None);
    }

    #[test]
    fn test_mynet_ounce_requires_lira() {
        assert_eq!(classify_mynet_metal("ONS"), None);
        assert_eq!(classify_mynet_metal("Ons Altın"), None);
        assert_eq!(classify_mynet_metal("ONS TL"), Some("ons"));
        assert_eq!(classify_mynet_metal("Gram Altın"), Some("gram"));
        assert_eq!(classify_mynet_metal("Gram Altın (Kapalı Çarşı)"), None);
    }
}
