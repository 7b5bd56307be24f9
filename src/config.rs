// Run configuration: everything that varied between snapshots of the
// dashboard is a knob here instead of a hard-coded constant.
use clap::ValueEnum;

/// How the human and canine series are matched in the correlation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoinKind {
    /// Keep only years present in both series.
    Inner,
    /// Keep the union of years; the missing side stays empty.
    Outer,
}

/// Inclusive year range; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearWindow {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearWindow {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min.map_or(true, |m| year >= m) && self.max.map_or(true, |m| year <= m)
    }
}

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Window applied to the human series, and to the canine/vector series
    /// when `filter_canine` is set.
    pub window: YearWindow,
    /// Year represented by the first case column of a regional row.
    pub base_year: i32,
    /// Whether the year window also applies to the canine and vector
    /// tables. Both policies exist among the source snapshots.
    pub filter_canine: bool,
    pub join: JoinKind,
    pub human_path: String,
    pub canine_path: String,
    pub vector_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: YearWindow::new(Some(2007), Some(2023)),
            base_year: 2007,
            filter_canine: false,
            join: JoinKind::Outer,
            human_path: "dados.csv".to_string(),
            canine_path: "caninos.csv".to_string(),
            vector_path: "vetores.csv".to_string(),
        }
    }
}
