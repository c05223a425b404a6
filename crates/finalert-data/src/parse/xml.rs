//! Central bank daily rates XML.

use super::html::selector;
use super::{decimal_text, insert_two_sided, QuoteParser};
use finalert_core::{AssetClass, QuoteMap};
use scraper::{Html, Selector};

/// Parser for the TCMB `today.xml` feed.
///
/// The document is read with the HTML parser, which lower-cases element and
/// attribute names, so `<Currency CurrencyCode="USD">` is matched as
/// `currency[currencycode="USD"]`.
#[derive(Debug, Clone)]
pub struct CentralBankXml {
    codes: Vec<String>,
}

impl CentralBankXml {
    pub fn new<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

impl QuoteParser for CentralBankXml {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let document = Html::parse_document(body);
        if document.select(&selector("currency[currencycode]")?).next().is_none() {
            return Err("no Currency elements in feed".to_string());
        }

        let buying_sel = selector("banknotebuying")?;
        let selling_sel = selector("banknoteselling")?;
        let mut quotes = QuoteMap::new();
        for code in &self.codes {
            let currency_sel = selector(&format!("currency[currencycode=\"{}\"]", code))?;
            let Some(currency) = document.select(&currency_sel).next() else {
                continue;
            };
            let read = |sel: &Selector| {
                currency
                    .select(sel)
                    .next()
                    .and_then(|el| decimal_text(&el.text().collect::<String>()))
            };
            insert_two_sided(&mut quotes, asset_class, code, read(&buying_sel), read(&selling_sel));
        }

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Tarih_Date Tarih="17.10.2026" Date="10/17/2026" Bulten_No="2026/198">
  <Currency CrossOrder="0" Kod="USD" CurrencyCode="USD">
    <Unit>1</Unit>
    <Isim>ABD DOLARI</Isim>
    <CurrencyName>US DOLLAR</CurrencyName>
    <ForexBuying>40.1234</ForexBuying>
    <ForexSelling>40.2001</ForexSelling>
    <BanknoteBuying>40.0953</BanknoteBuying>
    <BanknoteSelling>40.2604</BanknoteSelling>
  </Currency>
  <Currency CrossOrder="9" Kod="EUR" CurrencyCode="EUR">
    <Unit>1</Unit>
    <Isim>EURO</Isim>
    <BanknoteBuying>46.8102</BanknoteBuying>
    <BanknoteSelling>47.0001</BanknoteSelling>
  </Currency>
</Tarih_Date>"#;

    #[test]
    fn test_banknote_rates() {
        let parser = CentralBankXml::new(["USD", "EUR", "GBP"]);
        let quotes = parser.parse(AssetClass::Currency, FEED).unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["USD"].bid, Some(dec!(40.0953)));
        assert_eq!(quotes["USD"].ask, dec!(40.2604));
        assert_eq!(quotes["EUR"].ask, dec!(47.0001));
    }

    #[test]
    fn test_not_a_feed() {
        let parser = CentralBankXml::new(["USD"]);
        assert!(parser.parse(AssetClass::Currency, "<html></html>").is_err());
    }
}
