use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

/// A decoded CSV file: rows of string cells, header and metadata noise
/// included. Column counts may differ between rows; arity is checked by the
/// series builders, not here.
pub type RawTable = Vec<Vec<String>>;

/// One year of the human case series.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct HumanRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Cases")]
    #[tabled(rename = "Cases")]
    pub cases: f64,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: f64,
    #[serde(rename = "Incidence")]
    #[tabled(rename = "Incidence")]
    pub incidence: f64,
    #[serde(rename = "Prevalence")]
    #[tabled(rename = "Prevalence")]
    pub prevalence: f64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: f64,
    #[serde(rename = "LethalityPct")]
    #[tabled(rename = "LethalityPct")]
    pub lethality_pct: f64,
}

/// One (region, year) cell of the unpivoted regional case table.
///
/// Coordinates come from the static region table and repeat on every record
/// of a region.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionalRecord {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Cases")]
    #[tabled(rename = "Cases")]
    pub cases: f64,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: f64,
}

/// One year of the canine surveillance series.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CanineRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Serologies")]
    #[tabled(rename = "Serologies")]
    pub serologies: f64,
    #[serde(rename = "Positives")]
    #[tabled(rename = "Positives")]
    pub positives: f64,
    #[serde(rename = "Culled")]
    #[tabled(rename = "Culled")]
    pub culled: f64,
    #[serde(rename = "SprayedHouseholds")]
    #[tabled(rename = "SprayedHouseholds")]
    pub sprayed_households: f64,
    #[serde(rename = "PositivityPct")]
    #[tabled(rename = "PositivityPct")]
    pub positivity_pct: f64,
}

/// One year of the vector-control series.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct VectorRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "SprayedHouseholds")]
    #[tabled(rename = "SprayedHouseholds")]
    pub sprayed_households: f64,
}

/// Human cases and canine positives matched by year.
///
/// A side with no record for the year stays `None` (empty CSV cell, JSON
/// null); the renderer draws the gap, we never substitute zero.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CorrelationRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "HumanCases")]
    #[tabled(rename = "HumanCases", display_with = "display_gap")]
    pub human_cases: Option<f64>,
    #[serde(rename = "CaninePositives")]
    #[tabled(rename = "CaninePositives", display_with = "display_gap")]
    pub canine_positives: Option<f64>,
}

fn display_gap(v: &Option<f64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}

/// Historical case total per region, the data behind the map sizing and the
/// ranking bars.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionTotalRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "TotalCases")]
    #[tabled(rename = "TotalCases")]
    pub total_cases: f64,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: f64,
}

/// KPI block serialized to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub generated_at: DateTime<Utc>,
    pub years_covered: usize,
    pub latest_year: Option<i32>,
    pub latest_year_cases: f64,
    pub avg_lethality_pct: f64,
    pub total_deaths: f64,
    pub total_regional_cases: f64,
    pub peak_region: Option<String>,
    pub failed_sources: Vec<String>,
}

/// Load diagnostics for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub failed_sources: Vec<String>,
}

/// The four normalized tables plus load diagnostics. Any table may be empty
/// when its source failed to load; consumers render what is there.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub human: Vec<HumanRecord>,
    pub regional: Vec<RegionalRecord>,
    pub canine: Vec<CanineRecord>,
    pub vector: Vec<VectorRecord>,
    pub report: LoadReport,
}
