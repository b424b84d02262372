use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic country-year table as CSV and Parquet")]
struct Cli {
    /// Output path without extension
    #[arg(default_value = "gapminder_sample")]
    stem: String,
}

/// Same columns as the gapminder export the viewer reads.
#[derive(Debug, Serialize)]
struct Row {
    country: String,
    continent: String,
    year: i64,
    #[serde(rename = "lifeExp")]
    life_exp: f64,
    #[serde(rename = "gdpPercap")]
    gdp_percap: f64,
    pop: i64,
}

/// SplitMix64: deterministic so the sample file is reproducible.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Box-Muller, cosine branch only.
        let radius = (-2.0 * self.next_f64().max(1e-15).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.next_f64();
        mean + std_dev * radius * angle.cos()
    }
}

/// (continent, countries, 1952 life expectancy, 1952 GDP per capita)
const CONTINENTS: [(&str, usize, f64, f64); 5] = [
    ("Africa", 12, 39.0, 1200.0),
    ("Americas", 8, 53.0, 4000.0),
    ("Asia", 10, 46.0, 1500.0),
    ("Europe", 10, 64.0, 5500.0),
    ("Oceania", 2, 69.0, 10000.0),
];

fn generate(rng: &mut SampleRng) -> Vec<Row> {
    let years: Vec<i64> = (0..12).map(|i| 1952 + 5 * i).collect();
    let mut rows = Vec::new();

    for &(continent, n_countries, base_life, base_gdp) in &CONTINENTS {
        for c in 0..n_countries {
            let country = format!("{continent} {}", c + 1);
            let mut life_exp = rng.gauss(base_life, 4.0);
            let mut gdp = base_gdp * rng.uniform(0.4, 2.5);
            let mut pop = rng.uniform(1e6, 6e7);
            let growth = rng.uniform(0.005, 0.035);

            for &year in &years {
                rows.push(Row {
                    country: country.clone(),
                    continent: continent.to_string(),
                    year,
                    life_exp: (life_exp * 1000.0).round() / 1000.0,
                    gdp_percap: (gdp * 10000.0).round() / 10000.0,
                    pop: pop.round() as i64,
                });
                life_exp = (life_exp + rng.gauss(1.6, 0.8)).min(83.0);
                gdp *= 1.0 + rng.gauss(growth * 5.0, 0.06);
                gdp = gdp.max(200.0);
                pop *= 1.0 + rng.uniform(0.03, 0.15);
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("lifeExp", DataType::Float64, false),
        Field::new("gdpPercap", DataType::Float64, false),
        Field::new("pop", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.continent.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.life_exp))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.gdp_percap))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.pop))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let Cli { stem } = Cli::parse();

    let mut rng = SampleRng(42);
    let rows = generate(&mut rng);

    let csv_path = format!("{stem}.csv");
    let parquet_path = format!("{stem}.parquet");
    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} country-year rows to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
