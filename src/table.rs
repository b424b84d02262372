use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;

use crate::data::filter::FilteredView;
pub use crate::data::model::COLUMNS;

// ---------------------------------------------------------------------------
// Table rows: field name → cell value
// ---------------------------------------------------------------------------

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Empty,
}

impl CellValue {
    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Empty),
            },
            JsonValue::Bool(b) => CellValue::Text(b.to_string()),
            JsonValue::Null => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Ordering used by column sort: numbers numerically, text
    /// lexicographically, empty cells last.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Greater,
            (_, CellValue::Empty) => Ordering::Less,
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Text(_), _) => Ordering::Greater,
            (_, CellValue::Text(_)) => Ordering::Less,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Empty => Ok(()),
        }
    }
}

pub type TableRow = BTreeMap<String, CellValue>;

/// Expose the filtered rows verbatim, one field mapping per record.
pub fn project_rows(view: &FilteredView<'_>) -> Vec<TableRow> {
    view.records()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(JsonValue::Object(fields)) => Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
                    .collect::<TableRow>(),
            ),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Skipping row for {}: {e}", record.country);
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Column filter queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Split a leading comparison operator off a query.
fn split_op(query: &str) -> (Option<CmpOp>, &str) {
    const OPS: [(&str, CmpOp); 6] = [
        (">=", CmpOp::Ge),
        ("<=", CmpOp::Le),
        ("!=", CmpOp::Ne),
        (">", CmpOp::Gt),
        ("<", CmpOp::Lt),
        ("=", CmpOp::Eq),
    ];
    for (prefix, op) in OPS {
        if let Some(rest) = query.strip_prefix(prefix) {
            return (Some(op), rest.trim());
        }
    }
    (None, query)
}

/// Whether a cell passes a column filter query.
///
/// Numeric cells take `>`, `>=`, `<`, `<=`, `=`, `!=` or a bare number
/// (equality); a query that is not a number matches nothing. Text cells
/// match a case-insensitive substring, or compare whole values when an
/// operator is given.
pub fn cell_matches(cell: &CellValue, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let (op, operand) = split_op(query);

    match cell {
        CellValue::Empty => false,
        CellValue::Text(text) => {
            let text = text.to_lowercase();
            let operand = operand.to_lowercase();
            match op {
                None => text.contains(&operand),
                Some(op) => op.holds(text.as_str().cmp(operand.as_str())),
            }
        }
        number => {
            let (Some(value), Ok(target)) = (number.as_f64(), operand.parse::<f64>()) else {
                return false;
            };
            op.unwrap_or(CmpOp::Eq).holds(value.total_cmp(&target))
        }
    }
}

// ---------------------------------------------------------------------------
// Table view state: sort, per-column filter, paging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub sort: Option<(String, SortDirection)>,
    /// column → query text
    pub filters: BTreeMap<String, String>,
    pub page: usize,
    pub page_size: usize,
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        TableState {
            sort: None,
            filters: BTreeMap::new(),
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Header click: none → ascending → descending → none. Clicking a
    /// different column starts it ascending.
    pub fn cycle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some((col, SortDirection::Ascending)) if col == column => {
                Some((col, SortDirection::Descending))
            }
            Some((col, SortDirection::Descending)) if col == column => None,
            _ => Some((column.to_string(), SortDirection::Ascending)),
        };
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        match &self.sort {
            Some((col, dir)) if col == column => Some(*dir),
            _ => None,
        }
    }

    /// Replace a column's query and go back to the first page.
    pub fn set_filter(&mut self, column: &str, query: &str) {
        if query.trim().is_empty() {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), query.to_string());
        }
        self.page = 0;
    }

    /// Column filters, then a stable sort.
    pub fn apply(&self, rows: &[TableRow]) -> Vec<TableRow> {
        let mut out: Vec<TableRow> = rows
            .iter()
            .filter(|row| {
                self.filters.iter().all(|(col, query)| match row.get(col) {
                    Some(cell) => cell_matches(cell, query),
                    None => query.trim().is_empty(),
                })
            })
            .cloned()
            .collect();

        if let Some((col, dir)) = &self.sort {
            out.sort_by(|a, b| {
                let ord = match (a.get(col), b.get(col)) {
                    (Some(x), Some(y)) => x.sort_cmp(y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match dir {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        out
    }

    pub fn page_count(&self, n_rows: usize) -> usize {
        n_rows.div_ceil(self.page_size).max(1)
    }

    /// Keep the page index valid after the row count changed.
    pub fn clamp_page(&mut self, n_rows: usize) {
        self.page = self.page.min(self.page_count(n_rows) - 1);
    }

    /// Rows on the current page.
    pub fn page<'r>(&self, rows: &'r [TableRow]) -> &'r [TableRow] {
        let start = (self.page * self.page_size).min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        &rows[start..end]
    }
}
