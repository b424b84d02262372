use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Column names in display order, as they appear in source files.
pub const COLUMNS: [&str; 6] = ["country", "continent", "year", "lifeExp", "gdpPercap", "pop"];

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One country-year observation.
///
/// Field names on the wire follow the gapminder export (`lifeExp`,
/// `gdpPercap`, ...), so a CSV/JSON dump of the original DataFrame loads as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub continent: String,
    pub year: i64,
    #[serde(rename = "lifeExp")]
    pub life_exp: f64,
    #[serde(rename = "gdpPercap")]
    pub gdp_percap: f64,
    pub pop: i64,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed category indices.
///
/// Never mutated after construction; the UI holds it behind an `Arc` and
/// replaces the whole handle when a new file is opened.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records, in file order.
    pub records: Vec<Record>,
    /// Sorted set of continents present.
    pub continents: BTreeSet<String>,
    /// Sorted set of years present.
    pub years: BTreeSet<i64>,
}

impl Dataset {
    /// Build category indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let continents = records.iter().map(|r| r.continent.clone()).collect();
        let years = records.iter().map(|r| r.year).collect();
        Dataset {
            records,
            continents,
            years,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest year in the table, the slider's starting position.
    pub fn latest_year(&self) -> Option<i64> {
        self.years.last().copied()
    }

    /// Known years in ascending order, for slider indexing.
    pub fn year_list(&self) -> Vec<i64> {
        self.years.iter().copied().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        country: &str,
        continent: &str,
        year: i64,
        life_exp: f64,
        gdp_percap: f64,
        pop: i64,
    ) -> Record {
        Record {
            country: country.to_string(),
            continent: continent.to_string(),
            year,
            life_exp,
            gdp_percap,
            pop,
        }
    }

    /// The three-row table used throughout the engine tests.
    pub(crate) fn sample_dataset() -> Dataset {
        Dataset::from_records(vec![
            record("A", "Asia", 2007, 70.0, 5000.0, 1000),
            record("B", "Europe", 2007, 80.0, 30000.0, 500),
            record("C", "Asia", 2002, 65.0, 4000.0, 900),
        ])
    }

    #[test]
    fn indices_are_sorted_and_deduplicated() {
        let ds = sample_dataset();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.continents.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Asia", "Europe"]
        );
        assert_eq!(ds.year_list(), vec![2002, 2007]);
        assert_eq!(ds.latest_year(), Some(2007));
    }

    #[test]
    fn record_uses_gapminder_field_names() {
        let r = record("Chad", "Africa", 1952, 38.092, 1178.665927, 2682462);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["lifeExp"], 38.092);
        assert_eq!(json["gdpPercap"], 1178.665927);
        assert_eq!(json["pop"], 2682462);
    }
}
