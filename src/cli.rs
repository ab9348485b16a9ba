//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::filter::CategorySelection;

/// Category filter as given on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    #[default]
    All,
    Scale,
    Weighbridge,
}

impl From<CategoryArg> for CategorySelection {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => CategorySelection::All,
            CategoryArg::Scale => CategorySelection::ScaleOnly,
            CategoryArg::Weighbridge => CategorySelection::WeighbridgeOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "weigh-map")]
#[command(version)]
#[command(about = "Map viewer for market scale and weighbridge inspection records")]
#[command(long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/weigh-map/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Market scale dataset (.json or .csv)
    #[arg(long)]
    pub scale_data: Option<PathBuf>,

    /// Weighbridge dataset (.json or .csv)
    #[arg(long)]
    pub weighbridge_data: Option<PathBuf>,

    /// Regions shown when none are selected (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "all_regions")]
    pub default_regions: Vec<String>,

    /// Show every region when none are selected
    #[arg(long)]
    pub all_regions: bool,

    /// Print the count summary instead of opening the viewer
    #[arg(long)]
    pub summary: bool,

    /// Region to include in the summary (repeatable)
    #[arg(long = "region", requires = "summary")]
    pub regions: Vec<String>,

    /// Category to include in the summary (default: all)
    #[arg(long, value_enum, requires = "summary")]
    pub category: Option<CategoryArg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_flags() {
        let cli = Cli::parse_from([
            "weigh-map",
            "--summary",
            "--region",
            "臺北市",
            "--region",
            "新北市",
            "--category",
            "weighbridge",
        ]);
        assert!(cli.summary);
        assert_eq!(cli.regions, vec!["臺北市", "新北市"]);
        assert_eq!(
            CategorySelection::from(cli.category.unwrap_or_default()),
            CategorySelection::WeighbridgeOnly
        );
    }

    #[test]
    fn region_requires_summary() {
        assert!(Cli::try_parse_from(["weigh-map", "--region", "臺北市"]).is_err());
    }

    #[test]
    fn category_requires_summary() {
        assert!(Cli::try_parse_from(["weigh-map", "--category", "scale"]).is_err());
        let cli = Cli::parse_from(["weigh-map", "--summary"]);
        assert_eq!(cli.category, None);
    }

    #[test]
    fn default_regions_conflict_with_all_regions() {
        assert!(
            Cli::try_parse_from(["weigh-map", "--all-regions", "--default-regions", "a"]).is_err()
        );
    }
}
