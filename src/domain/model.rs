use serde::{Deserialize, Serialize};

/// One spreadsheet or delimited-file cell. Missing cells are `Empty`,
/// never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the cell as a lookup key. Workbook cells often hold
    /// identifiers as floats (EAN 5901234123457 comes back as a number),
    /// so integral numbers render without a fraction.
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
    }

    pub fn to_field(&self) -> String {
        self.as_key().unwrap_or_default()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// An in-memory table: ordered rows of cells, addressed positionally.
/// Row 0 may carry headers. Loaded, mutated and persisted once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Index of a header cell in row 0, by exact name.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.rows.first().and_then(|header| {
            header
                .iter()
                .position(|cell| cell.as_str().map(str::trim) == Some(name))
        })
    }

    /// Resolves header columns, appending any that are missing to the end
    /// of the header row. Returns one index per requested name.
    pub fn ensure_columns(&mut self, names: &[&str]) -> Vec<usize> {
        let mut next = self.width();
        names
            .iter()
            .map(|name| match self.header_index(name) {
                Some(idx) => idx,
                None => {
                    let idx = next;
                    self.set_cell(0, idx, CellValue::text(*name));
                    next += 1;
                    idx
                }
            })
            .collect()
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn remove_row(&mut self, row: usize) {
        if row < self.rows.len() {
            self.rows.remove(row);
        }
    }
}

/// Converts a spreadsheet column letter ("A", "L", "AJ") to a 0-based index.
pub fn column_index(letter: &str) -> Option<usize> {
    let letter = letter.trim();
    if letter.is_empty() {
        return None;
    }
    let mut index: usize = 0;
    for ch in letter.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (ch.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Outcome summary for one task run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskReport {
    pub rows_processed: usize,
    pub rows_failed: usize,
}

/// Shipping cost triple from the admin panel, per parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingCost {
    pub net: Option<f64>,
    pub gross: Option<f64>,
    pub vat: Option<f64>,
}

/// What the panel said about one parcel number. Only `NotFound` carries
/// the panel's explicit fault string; `NoResults` is an empty reply.
/// None of the non-`Found` cases is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CostLookup {
    Found(ShippingCost),
    NotFound,
    NoResults,
    NoPaymentData,
}

/// Parameters of one product, as returned by the panel products endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInfo {
    pub size_chart_name: String,
    pub auction_icon_url: String,
    pub image_urls: Vec<String>,
}

/// Fields drawn from the SKU list of one product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkuInfo {
    pub size_name: String,
    pub code_producer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OpinionKind {
    Product,
    Order,
}

impl OpinionKind {
    pub fn as_query(&self) -> &'static str {
        match self {
            OpinionKind::Product => "product",
            OpinionKind::Order => "order",
        }
    }
}

/// One opinion entry from the storefront feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Opinion {
    pub order_sn: String,
    pub create_date: String,
    pub product_id: Option<i64>,
    pub rating: String,
    pub content: String,
}
