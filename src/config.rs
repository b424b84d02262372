use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "gapminder-viewer", version)]
#[command(about = "Life expectancy vs GDP per capita dashboard")]
pub struct Cli {
    /// Dataset to open at startup (.csv, .json or .parquet)
    pub path: Option<PathBuf>,

    /// Rows per table page
    #[arg(
        long,
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub page_size: usize,
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup configuration: window geometry, chart and table constants, and
/// an optional dataset to open immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub window_title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Largest marker diameter in points, reached by the most populous row.
    pub size_max: f64,
    /// Smallest marker diameter so tiny populations stay visible.
    pub size_min: f64,
    /// Rows per table page.
    pub page_size: usize,
    pub dataset_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_title: "Gapminder Viewer".to_string(),
            window_size: [1280.0, 900.0],
            min_window_size: [640.0, 480.0],
            size_max: 60.0,
            size_min: 2.0,
            page_size: 10,
            dataset_path: None,
        }
    }
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        Self {
            page_size: cli.page_size,
            dataset_path: cli.path,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<DashboardConfig, clap::Error> {
        let argv = std::iter::once("gapminder-viewer").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(DashboardConfig::from)
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.size_max, 60.0);
    }

    #[test]
    fn positional_path_and_page_size() {
        let config = parse(&["--page-size", "25", "gapminder.csv"]).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.dataset_path, Some(PathBuf::from("gapminder.csv")));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&["a.csv", "b.csv"]).is_err());
        assert!(parse(&["--page-size", "0"]).is_err());
        assert!(parse(&["--page-size"]).is_err());
        assert!(parse(&["--page-size", "ten"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
