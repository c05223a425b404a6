//! HTML page parsers built on `scraper`.

use super::{insert_last, insert_two_sided, QuoteParser};
use finalert_core::text::squash_whitespace;
use finalert_core::{try_parse_price, AssetClass, QuoteMap};
use scraper::{ElementRef, Html, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector {:?}: {:?}", css, e))
}

fn element_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<String>())
}

/// Which cells of a matched row hold the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowValues {
    /// Buy and sell columns
    TwoSided { bid_col: usize, ask_col: usize },
    /// Last price column, optionally followed by a change-percent column
    Last {
        value_col: usize,
        change_col: Option<usize>,
    },
}

impl RowValues {
    fn max_col(&self) -> usize {
        match *self {
            RowValues::TwoSided { bid_col, ask_col } => bid_col.max(ask_col),
            RowValues::Last {
                value_col,
                change_col,
            } => value_col.max(change_col.unwrap_or(0)),
        }
    }

    fn apply(&self, quotes: &mut QuoteMap, asset_class: AssetClass, symbol: &str, cells: &[String]) {
        if cells.len() <= self.max_col() {
            return;
        }
        match *self {
            RowValues::TwoSided { bid_col, ask_col } => insert_two_sided(
                quotes,
                asset_class,
                symbol,
                try_parse_price(&cells[bid_col]),
                try_parse_price(&cells[ask_col]),
            ),
            RowValues::Last {
                value_col,
                change_col,
            } => insert_last(
                quotes,
                asset_class,
                symbol,
                try_parse_price(&cells[value_col]),
                change_col.and_then(|col| try_parse_price(&cells[col])),
            ),
        }
    }
}

/// Table rows identified by a free-text name cell.
///
/// Each row's name cell is passed to a classifier; rows it does not
/// recognize are ignored. The first row per symbol wins.
#[derive(Debug, Clone)]
pub struct NamedRowTable {
    container: String,
    cells: String,
    first_only: bool,
    name_col: usize,
    values: RowValues,
    classify: fn(&str) -> Option<&'static str>,
}

impl NamedRowTable {
    /// Read the first `<table>`, names in column 0, buy/sell in columns 1 and 2.
    pub fn new(classify: fn(&str) -> Option<&'static str>) -> Self {
        Self {
            container: "table".to_string(),
            cells: "td".to_string(),
            first_only: true,
            name_col: 0,
            values: RowValues::TwoSided {
                bid_col: 1,
                ask_col: 2,
            },
            classify,
        }
    }

    /// Set the name, buy, and sell column indices.
    pub fn with_columns(mut self, name_col: usize, bid_col: usize, ask_col: usize) -> Self {
        self.name_col = name_col;
        self.values = RowValues::TwoSided { bid_col, ask_col };
        self
    }

    /// Scan every element matching `container` instead of the first table.
    pub fn with_containers(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self.first_only = false;
        self
    }

    /// Selector for the cells of each row, for pages that mix `th` and `td`.
    pub fn with_cells(mut self, cells: impl Into<String>) -> Self {
        self.cells = cells.into();
        self
    }
}

impl QuoteParser for NamedRowTable {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let document = Html::parse_document(body);
        let container_sel = selector(&self.container)?;
        let row_sel = selector("tr")?;
        let cell_sel = selector(&self.cells)?;

        let containers: Vec<ElementRef<'_>> = document.select(&container_sel).collect();
        if containers.is_empty() {
            return Err(format!("no element matches {:?}", self.container));
        }
        let take = if self.first_only { 1 } else { containers.len() };

        let mut quotes = QuoteMap::new();
        for container in containers.into_iter().take(take) {
            for row in container.select(&row_sel) {
                let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
                let Some(name) = cells.get(self.name_col) else {
                    continue;
                };
                let Some(symbol) = (self.classify)(name) else {
                    continue;
                };
                self.values.apply(&mut quotes, asset_class, symbol, &cells);
            }
        }

        Ok(quotes)
    }
}

/// Table rows identified by an attribute such as `data-name="dolar"`.
#[derive(Debug, Clone)]
pub struct KeyedRows {
    attr: String,
    keys: Vec<(String, String)>,
    values: RowValues,
}

impl KeyedRows {
    /// Create a parser matching `tr[attr="key"]` for each `(key, symbol)` pair.
    pub fn new<K, S>(attr: impl Into<String>, keys: impl IntoIterator<Item = (K, S)>, values: RowValues) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            attr: attr.into(),
            keys: keys
                .into_iter()
                .map(|(key, symbol)| (key.into(), symbol.into()))
                .collect(),
            values,
        }
    }
}

impl QuoteParser for KeyedRows {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let document = Html::parse_document(body);
        let any_keyed = selector(&format!("tr[{}]", self.attr))?;
        if document.select(&any_keyed).next().is_none() {
            return Err(format!("no rows carry the {} attribute", self.attr));
        }

        let cell_sel = selector("td")?;
        let mut quotes = QuoteMap::new();
        for (key, symbol) in &self.keys {
            let row_sel = selector(&format!("tr[{}=\"{}\"]", self.attr, key))?;
            let Some(row) = document.select(&row_sel).next() else {
                continue;
            };
            let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
            self.values.apply(&mut quotes, asset_class, symbol, &cells);
        }

        Ok(quotes)
    }
}

/// Cards of the form `<div data-code="USD">` holding `span.value` buy and
/// sell figures.
#[derive(Debug, Clone)]
pub struct CodeCards {
    codes: Vec<String>,
}

impl CodeCards {
    pub fn new<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

impl QuoteParser for CodeCards {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let document = Html::parse_document(body);
        if document.select(&selector("div[data-code]")?).next().is_none() {
            return Err("no data-code cards on page".to_string());
        }

        let value_sel = selector("span.value")?;
        let mut quotes = QuoteMap::new();
        for code in &self.codes {
            let card_sel = selector(&format!("div[data-code=\"{}\"]", code))?;
            let Some(card) = document.select(&card_sel).next() else {
                continue;
            };
            let values: Vec<String> = card.select(&value_sel).map(element_text).collect();
            if values.len() < 2 {
                continue;
            }
            insert_two_sided(
                &mut quotes,
                asset_class,
                code,
                try_parse_price(&values[0]),
                try_parse_price(&values[1]),
            );
        }

        Ok(quotes)
    }
}
