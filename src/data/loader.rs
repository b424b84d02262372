use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, GenericStringArray, OffsetSizeTrait, PrimitiveArray};
use arrow::datatypes::{ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record, COLUMNS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural problems with an input table. I/O and parser failures travel
/// as plain `anyhow` context instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: column '{column}' is null")]
    NullValue { row: usize, column: &'static str },
    #[error("column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: &'static str,
        found: String,
        expected: &'static str,
    },
    #[error("row {row}: column '{column}' value {value} is not an integer")]
    NotIntegral {
        row: usize,
        column: &'static str,
        value: f64,
    },
    #[error("dataset contains no rows")]
    Empty,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a country-year table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the gapminder column names
/// * `.json`    – `[{ "country": ..., "continent": ..., ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV file")?;
            load_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
}

fn finish(records: Vec<Record>) -> Result<Dataset> {
    let dataset = Dataset::from_records(records);
    if dataset.is_empty() {
        return Err(LoadError::Empty.into());
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a CSV table. Columns are matched by header name; extra columns
/// (`iso_alpha`, `iso_num`, ...) are ignored. Headers and cells are
/// trimmed, and a blank cell in a required column is a [`LoadError::NullValue`].
pub fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let mut positions = Vec::with_capacity(COLUMNS.len());
    for column in COLUMNS {
        let idx = headers
            .iter()
            .position(|h| h == column)
            .ok_or(LoadError::MissingColumn(column))?;
        positions.push((column, idx));
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        for &(column, idx) in &positions {
            if row.get(idx).unwrap_or("").is_empty() {
                return Err(LoadError::NullValue {
                    row: row_no,
                    column,
                }
                .into());
            }
        }
        let record: Record = row
            .deserialize(Some(&headers))
            .with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }

    finish(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "Afghanistan", "continent": "Asia", "year": 1952,
///     "lifeExp": 28.801, "gdpPercap": 779.4453145, "pop": 8425333 },
///   ...
/// ]
/// ```
pub fn load_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for column in COLUMNS {
            match obj.get(column) {
                None => return Err(LoadError::MissingColumn(column).into()),
                Some(JsonValue::Null) => {
                    return Err(LoadError::NullValue { row: i, column }.into())
                }
                Some(_) => {}
            }
        }
        let record: Record =
            serde_json::from_value(row.clone()).with_context(|| format!("Row {i}"))?;
        records.push(record);
    }

    finish(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat gapminder columns.
///
/// Accepted column types:
/// - `country`, `continent`: Utf8 or LargeUtf8
/// - `year`, `pop`: Int32 or Int64 (`pop` may also be an integral Float64,
///   which is what Pandas writes for nullable integers)
/// - `lifeExp`, `gdpPercap`: Float32, Float64 or an integer type
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let mut batch_records = records_from_batch(&batch, records.len())?;
        records.append(&mut batch_records);
    }

    finish(records)
}

/// Convert one Arrow batch to records. `first_row` offsets row numbers in
/// error messages so they stay file-global across batches.
pub fn records_from_batch(batch: &RecordBatch, first_row: usize) -> Result<Vec<Record>> {
    let country = string_column(batch, "country", first_row)?;
    let continent = string_column(batch, "continent", first_row)?;
    let year = int_column(batch, "year", first_row)?;
    let life_exp = float_column(batch, "lifeExp", first_row)?;
    let gdp_percap = float_column(batch, "gdpPercap", first_row)?;
    let pop = int_column(batch, "pop", first_row)?;

    let records = country
        .into_iter()
        .zip(continent)
        .zip(year)
        .zip(life_exp)
        .zip(gdp_percap)
        .zip(pop)
        .map(
            |(((((country, continent), year), life_exp), gdp_percap), pop)| Record {
                country,
                continent,
                year,
                life_exp,
                gdp_percap,
                pop,
            },
        )
        .collect();
    Ok(records)
}

// -- Arrow helpers --

fn column<'b>(batch: &'b RecordBatch, name: &'static str) -> Result<&'b ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumn(name).into())
}

fn type_error(column: &'static str, found: &DataType, expected: &'static str) -> anyhow::Error {
    LoadError::ColumnType {
        column,
        found: format!("{found:?}"),
        expected,
    }
    .into()
}

fn string_column(batch: &RecordBatch, name: &'static str, first_row: usize) -> Result<Vec<String>> {
    fn collect<O: OffsetSizeTrait>(
        arr: &GenericStringArray<O>,
        name: &'static str,
        first_row: usize,
    ) -> Result<Vec<String>> {
        (0..arr.len())
            .map(|row| {
                if arr.is_null(row) {
                    Err(LoadError::NullValue {
                        row: first_row + row,
                        column: name,
                    }
                    .into())
                } else {
                    Ok(arr.value(row).to_string())
                }
            })
            .collect()
    }

    let col = column(batch, name)?;
    match col.data_type() {
        DataType::Utf8 => collect(col.as_string::<i32>(), name, first_row),
        DataType::LargeUtf8 => collect(col.as_string::<i64>(), name, first_row),
        other => Err(type_error(name, other, "Utf8")),
    }
}

fn primitive_values<T: ArrowPrimitiveType>(
    arr: &PrimitiveArray<T>,
    name: &'static str,
    first_row: usize,
) -> Result<Vec<T::Native>> {
    (0..arr.len())
        .map(|row| {
            if arr.is_null(row) {
                Err(LoadError::NullValue {
                    row: first_row + row,
                    column: name,
                }
                .into())
            } else {
                Ok(arr.value(row))
            }
        })
        .collect()
}

fn int_column(batch: &RecordBatch, name: &'static str, first_row: usize) -> Result<Vec<i64>> {
    let col = column(batch, name)?;
    match col.data_type() {
        DataType::Int32 => Ok(primitive_values(col.as_primitive::<Int32Type>(), name, first_row)?
            .into_iter()
            .map(i64::from)
            .collect()),
        DataType::Int64 => primitive_values(col.as_primitive::<Int64Type>(), name, first_row),
        DataType::Float64 => primitive_values(col.as_primitive::<Float64Type>(), name, first_row)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_finite() && value.fract() == 0.0 {
                    Ok(value as i64)
                } else {
                    Err(LoadError::NotIntegral {
                        row: first_row + row,
                        column: name,
                        value,
                    }
                    .into())
                }
            })
            .collect(),
        other => Err(type_error(name, other, "Int32 or Int64")),
    }
}

fn float_column(batch: &RecordBatch, name: &'static str, first_row: usize) -> Result<Vec<f64>> {
    let col = column(batch, name)?;
    match col.data_type() {
        DataType::Float64 => primitive_values(col.as_primitive::<Float64Type>(), name, first_row),
        DataType::Float32 => Ok(primitive_values(col.as_primitive::<Float32Type>(), name, first_row)?
            .into_iter()
            .map(f64::from)
            .collect()),
        DataType::Int32 | DataType::Int64 => Ok(int_column(batch, name, first_row)?
            .into_iter()
            .map(|v| v as f64)
            .collect()),
        other => Err(type_error(name, other, "Float64")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};

    use super::*;

    const CSV: &str = "\
country,continent,year,lifeExp,pop,gdpPercap,iso_alpha,iso_num
Afghanistan,Asia,1952,28.801,8425333,779.4453145,AFG,4
Albania,Europe,1952,55.23,1282697,1601.056136,ALB,8
Afghanistan,Asia,1957,30.332,9240934,820.8530296,AFG,4
";

    #[test]
    fn csv_loads_by_header_name() {
        let ds = load_csv(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[1].country, "Albania");
        assert_eq!(ds.records[1].pop, 1282697);
        assert_eq!(ds.records[2].gdp_percap, 820.8530296);
        assert_eq!(ds.year_list(), vec![1952, 1957]);
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let err = load_csv("country,continent,year,lifeExp,pop\nA,Asia,2007,70,10\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn("gdpPercap"))
        ));
    }

    #[test]
    fn csv_bad_number_names_the_row() {
        let text = "country,continent,year,lifeExp,gdpPercap,pop\nA,Asia,2007,70,5000,1000\nB,Asia,soon,70,5000,1000\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn csv_blank_text_cell_is_null() {
        let text = "country,continent,year,lifeExp,gdpPercap,pop\nA,Asia,2007,70,5000,1000\n,Asia,2007,70,5000,1000\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NullValue { row: 1, column: "country" })
        ));

        let text = "country,continent,year,lifeExp,gdpPercap,pop\nA,  ,2007,70,5000,1000\n";
        let err = load_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NullValue { row: 0, column: "continent" })
        ));
    }

    #[test]
    fn csv_padded_headers_and_cells_are_trimmed() {
        let text = "country, continent , year,lifeExp,gdpPercap ,pop\n Chad , Africa,2007, 50.651,1704.063724,10238807\n";
        let ds = load_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.records[0].country, "Chad");
        assert_eq!(ds.records[0].continent, "Africa");
        assert_eq!(ds.records[0].life_exp, 50.651);
    }

    #[test]
    fn header_only_csv_is_empty_error() {
        let err = load_csv("country,continent,year,lifeExp,gdpPercap,pop\n".as_bytes()).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::Empty)));
    }

    #[test]
    fn json_records_orientation() {
        let text = r#"[
            {"country": "Chad", "continent": "Africa", "year": 2007,
             "lifeExp": 50.651, "gdpPercap": 1704.063724, "pop": 10238807},
            {"country": "Chile", "continent": "Americas", "year": 2007,
             "lifeExp": 78.553, "gdpPercap": 13171.63885, "pop": 16284741, "iso_alpha": "CHL"}
        ]"#;
        let ds = load_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].continent, "Americas");
        assert_eq!(ds.continents.len(), 2);
    }

    #[test]
    fn json_null_cell_is_reported() {
        let text = r#"[{"country": "Chad", "continent": null, "year": 2007,
            "lifeExp": 50.6, "gdpPercap": 1704.0, "pop": 10}]"#;
        let err = load_json(text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NullValue { row: 0, column: "continent" })
        ));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(load_json(r#"{"country": "Chad"}"#).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("table.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    fn batch(pop: ArrayRef) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("country", DataType::Utf8, false),
            Field::new("continent", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("lifeExp", DataType::Float64, false),
            Field::new("gdpPercap", DataType::Float64, false),
            Field::new("pop", pop.data_type().clone(), true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["Japan", "Kenya"])),
                Arc::new(StringArray::from(vec!["Asia", "Africa"])),
                Arc::new(Int32Array::from(vec![2007, 2007])),
                Arc::new(Float64Array::from(vec![82.603, 54.11])),
                Arc::new(Float64Array::from(vec![31656.06806, 1463.249282])),
                pop,
            ],
        )
        .unwrap()
    }

    #[test]
    fn arrow_batch_to_records() {
        let b = batch(Arc::new(Int64Array::from(vec![127467972, 35610177])));
        let records = records_from_batch(&b, 0).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country, "Japan");
        assert_eq!(records[0].year, 2007);
        assert_eq!(records[1].pop, 35610177);
    }

    #[test]
    fn arrow_integral_float_population_is_accepted() {
        let b = batch(Arc::new(Float64Array::from(vec![127467972.0, 35610177.0])));
        let records = records_from_batch(&b, 0).unwrap();
        assert_eq!(records[0].pop, 127467972);
    }

    #[test]
    fn arrow_null_population_reports_global_row() {
        let b = batch(Arc::new(Int64Array::from(vec![Some(1), None])));
        let err = records_from_batch(&b, 100).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NullValue { row: 101, column: "pop" })
        ));
    }
}
