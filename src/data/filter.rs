use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Selection: which continents and which year are picked
// ---------------------------------------------------------------------------

/// The pair of user selections driving the dashboard.
///
/// An empty continent set means "no continent filter" (show all), not
/// "show nothing". A `None` year stands for a year that could not be
/// parsed and matches no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub continents: BTreeSet<String>,
    pub year: Option<i64>,
}

impl Selection {
    pub fn new<I, S>(continents: I, year: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            continents: continents.into_iter().map(Into::into).collect(),
            year: Some(year),
        }
    }

    /// Build a selection from untyped control values. A year that is not an
    /// integer degrades to an empty result rather than an error.
    #[cfg(test)]
    pub fn from_raw(continents: &[&str], year: &str) -> Self {
        Selection {
            continents: continents.iter().map(|c| c.to_string()).collect(),
            year: year.trim().parse::<i64>().ok(),
        }
    }

    /// Startup selection: every continent ticked, latest year.
    pub fn initial(dataset: &Dataset) -> Self {
        match dataset.latest_year() {
            Some(year) => Selection::new(dataset.continents.iter().cloned(), year),
            None => Selection::default(),
        }
    }

    /// Whether a record passes this selection.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(year) = self.year else {
            return false;
        };
        record.year == year
            && (self.continents.is_empty() || self.continents.contains(&record.continent))
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the rows of a dataset passing a selection
// ---------------------------------------------------------------------------

/// Borrowed subset of a [`Dataset`], in original row order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row indices into the source dataset, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Matching records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

/// Select the rows of `dataset` matching `selection`.
///
/// Pure and stable: the result keeps dataset order and depends only on the
/// arguments. An unknown year simply yields an empty view.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.matches(r))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, sample_dataset};

    fn countries(view: &FilteredView<'_>) -> Vec<String> {
        view.records().map(|r| r.country.clone()).collect()
    }

    #[test]
    fn asia_2007_keeps_only_a() {
        let ds = sample_dataset();
        let view = filter(&ds, &Selection::new(["Asia"], 2007));
        assert_eq!(countries(&view), vec!["A"]);
    }

    #[test]
    fn empty_continents_means_all_continents() {
        let ds = sample_dataset();
        let view = filter(&ds, &Selection::new(Vec::<String>::new(), 2007));
        assert_eq!(countries(&view), vec!["A", "B"]);
    }

    #[test]
    fn unknown_year_is_empty_not_an_error() {
        let ds = sample_dataset();
        let view = filter(&ds, &Selection::new(["Asia"], 1999));
        assert!(view.is_empty());
    }

    #[test]
    fn malformed_year_degrades_to_empty() {
        let ds = sample_dataset();
        let view = filter(&ds, &Selection::from_raw(&["Asia"], "two thousand"));
        assert!(view.is_empty());

        let view = filter(&ds, &Selection::from_raw(&[], " 2007 "));
        assert_eq!(countries(&view), vec!["A", "B"]);
    }

    #[test]
    fn unfiltered_year_matches_exactly_that_year_in_order() {
        let ds = Dataset::from_records(vec![
            record("Z", "Oceania", 1952, 69.0, 10000.0, 8_000_000),
            record("Y", "Africa", 1957, 40.0, 900.0, 3_000_000),
            record("X", "Africa", 1952, 38.0, 800.0, 2_000_000),
            record("W", "Americas", 1952, 55.0, 4000.0, 9_000_000),
        ]);
        let view = filter(&ds, &Selection::new(Vec::<String>::new(), 1952));
        assert_eq!(view.indices(), &[0, 2, 3]);
        assert_eq!(countries(&view), vec!["Z", "X", "W"]);
    }

    #[test]
    fn result_is_sound_and_complete() {
        let ds = Dataset::from_records(vec![
            record("A", "Asia", 2007, 70.0, 5000.0, 1000),
            record("B", "Europe", 2007, 80.0, 30000.0, 500),
            record("C", "Asia", 2002, 65.0, 4000.0, 900),
            record("D", "Africa", 2007, 50.0, 1000.0, 700),
            record("E", "Europe", 2002, 78.0, 25000.0, 400),
            record("F", "Africa", 2007, 52.0, 1200.0, 800),
        ]);
        let selection = Selection::new(["Africa", "Europe"], 2007);
        let view = filter(&ds, &selection);

        for r in view.records() {
            assert_eq!(r.year, 2007);
            assert!(selection.continents.contains(&r.continent));
        }
        let expected: Vec<usize> = ds
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.year == 2007 && (r.continent == "Africa" || r.continent == "Europe")
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(view.indices(), expected.as_slice());
    }

    #[test]
    fn repeated_calls_agree() {
        let ds = sample_dataset();
        let selection = Selection::new(["Asia", "Europe"], 2007);
        let first = filter(&ds, &selection).indices().to_vec();
        let second = filter(&ds, &selection).indices().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn continent_outside_dataset_matches_nothing() {
        let ds = sample_dataset();
        let view = filter(&ds, &Selection::new(["Antarctica"], 2007));
        assert!(view.is_empty());
    }

    #[test]
    fn initial_selection_shows_latest_year_everywhere() {
        let ds = sample_dataset();
        let selection = Selection::initial(&ds);
        assert_eq!(selection.year, Some(2007));
        assert_eq!(selection.continents.len(), 2);
        assert_eq!(countries(&filter(&ds, &selection)), vec!["A", "B"]);
    }
}
