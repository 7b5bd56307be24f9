// The normalization core: raw tables in, chart-ready series out.
//
// Every function here is a pure transform; file handling lives in `loader`
// and nothing in this module can fail, only produce fewer rows.
use crate::config::{JoinKind, PipelineConfig, YearWindow};
use crate::loader::SourceTables;
use crate::regions::REGIONS;
use crate::types::{
    CanineRecord, CorrelationRow, DashboardData, HumanRecord, LoadReport, RawTable,
    RegionTotalRow, RegionalRecord, SummaryStats, VectorRecord,
};
use crate::util::{mean, parse_number_or_zero, parse_year, NumberFormat};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Minimum arity of a human data row: year plus six value columns.
const HUMAN_MIN_COLUMNS: usize = 7;

/// Rows whose leading cell parses as a year inside `window`, in input order.
///
/// The exports carry no row-type tags; range membership is the only thing
/// that separates data rows from headers, footers and totals lines.
pub fn year_rows<'a>(table: &'a RawTable, window: &YearWindow) -> Vec<(i32, &'a [String])> {
    table
        .iter()
        .filter_map(|row| {
            let year = parse_year(row.first()?)?;
            window.contains(year).then_some((year, row.as_slice()))
        })
        .collect()
}

/// Annual human case series from the raw human export.
///
/// Column positions are the export's implicit schema: year, cases,
/// population, incidence, prevalence, deaths, lethality. Rows narrower than
/// that are dropped; unparseable value cells become 0. Sorted by year so no
/// file-ordering assumption leaks downstream.
pub fn build_human_series(table: &RawTable, window: &YearWindow) -> Vec<HumanRecord> {
    let mut out: Vec<HumanRecord> = year_rows(table, window)
        .into_iter()
        .filter(|(_, row)| row.len() >= HUMAN_MIN_COLUMNS)
        .map(|(year, row)| {
            let cell = |i: usize| parse_number_or_zero(&row[i], NumberFormat::DotDecimal);
            HumanRecord {
                year,
                cases: cell(1),
                population: cell(2),
                incidence: cell(3),
                prevalence: cell(4),
                deaths: cell(5),
                lethality_pct: cell(6),
            }
        })
        .collect();
    out.sort_by_key(|r| r.year);
    out
}

/// Unpivot the per-region rows of the human export into (region, year)
/// records.
///
/// For each configured region the first row whose leading cell contains the
/// region name (case-insensitive) is taken; a region without a matching row
/// simply contributes nothing. Column `i` of a matched row holds the case
/// count for `base_year + i - 1`.
pub fn build_regional_series(table: &RawTable, base_year: i32) -> Vec<RegionalRecord> {
    let mut out = Vec::new();
    for (region, latitude, longitude) in REGIONS {
        let needle = region.to_lowercase();
        let Some(row) = table.iter().find(|row| {
            row.first()
                .map_or(false, |cell| cell.to_lowercase().contains(&needle))
        }) else {
            continue;
        };
        for (offset, cell) in row.iter().skip(1).enumerate() {
            out.push(RegionalRecord {
                region: region.to_string(),
                year: base_year + offset as i32,
                cases: parse_number_or_zero(cell, NumberFormat::Brazilian),
                latitude,
                longitude,
            });
        }
    }
    out
}

/// Canine surveillance series from the semicolon-delimited export.
///
/// Rows are only dropped when the year cell does not parse (the header) or,
/// with `window` set, when the year falls outside it. The optional fifth
/// column is the sprayed-household count; absent means 0.
pub fn build_canine_series(table: &RawTable, window: Option<&YearWindow>) -> Vec<CanineRecord> {
    let mut out: Vec<CanineRecord> = table
        .iter()
        .filter_map(|row| {
            let year = parse_year(row.first()?)?;
            if let Some(w) = window {
                if !w.contains(year) {
                    return None;
                }
            }
            let cell = |i: usize| {
                row.get(i)
                    .map_or(0.0, |c| parse_number_or_zero(c, NumberFormat::Brazilian))
            };
            let serologies = cell(1);
            let positives = cell(2);
            // Guard: quiet years with zero serologies must not divide.
            let positivity_pct = if serologies > 0.0 {
                positives / serologies * 100.0
            } else {
                0.0
            };
            Some(CanineRecord {
                year,
                serologies,
                positives,
                culled: cell(3),
                sprayed_households: cell(4),
                positivity_pct,
            })
        })
        .collect();
    out.sort_by_key(|r| r.year);
    out
}

/// Vector-control series: year and sprayed households, same optional window
/// policy as the canine table.
pub fn build_vector_series(table: &RawTable, window: Option<&YearWindow>) -> Vec<VectorRecord> {
    let mut out: Vec<VectorRecord> = table
        .iter()
        .filter_map(|row| {
            let year = parse_year(row.first()?)?;
            if let Some(w) = window {
                if !w.contains(year) {
                    return None;
                }
            }
            let sprayed = row
                .get(1)
                .map_or(0.0, |c| parse_number_or_zero(c, NumberFormat::Brazilian));
            Some(VectorRecord {
                year,
                sprayed_households: sprayed,
            })
        })
        .collect();
    out.sort_by_key(|r| r.year);
    out
}

/// Match human cases with canine positives by year.
///
/// Each side holds at most one record per year, so this is a plain key
/// lookup with no conflict resolution. Missing sides stay `None`.
pub fn correlate(
    human: &[HumanRecord],
    canine: &[CanineRecord],
    kind: JoinKind,
) -> Vec<CorrelationRow> {
    let human_by_year: BTreeMap<i32, f64> = human.iter().map(|r| (r.year, r.cases)).collect();
    let canine_by_year: BTreeMap<i32, f64> = canine.iter().map(|r| (r.year, r.positives)).collect();

    let years: Vec<i32> = match kind {
        JoinKind::Outer => {
            let mut all: Vec<i32> = human_by_year
                .keys()
                .chain(canine_by_year.keys())
                .copied()
                .collect();
            all.sort_unstable();
            all.dedup();
            all
        }
        JoinKind::Inner => human_by_year
            .keys()
            .filter(|y| canine_by_year.contains_key(y))
            .copied()
            .collect(),
    };

    years
        .into_iter()
        .map(|year| CorrelationRow {
            year,
            human_cases: human_by_year.get(&year).copied(),
            canine_positives: canine_by_year.get(&year).copied(),
        })
        .collect()
}

/// Historical case total per region, sorted descending.
pub fn regional_totals(regional: &[RegionalRecord]) -> Vec<RegionTotalRow> {
    let mut acc: BTreeMap<&str, (f64, f64, f64)> = BTreeMap::new();
    for r in regional {
        let entry = acc
            .entry(r.region.as_str())
            .or_insert((0.0, r.latitude, r.longitude));
        entry.0 += r.cases;
    }
    let mut rows: Vec<RegionTotalRow> = acc
        .into_iter()
        .map(|(region, (total_cases, latitude, longitude))| RegionTotalRow {
            region: region.to_string(),
            total_cases,
            latitude,
            longitude,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_cases
            .partial_cmp(&a.total_cases)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// KPI block for the dashboard header.
pub fn summarize(data: &DashboardData) -> SummaryStats {
    let latest = data.human.last();
    let lethality: Vec<f64> = data.human.iter().map(|r| r.lethality_pct).collect();
    let totals = regional_totals(&data.regional);
    SummaryStats {
        generated_at: Utc::now(),
        years_covered: data.human.len(),
        latest_year: latest.map(|r| r.year),
        latest_year_cases: latest.map_or(0.0, |r| r.cases),
        avg_lethality_pct: mean(&lethality),
        total_deaths: data.human.iter().map(|r| r.deaths).sum(),
        total_regional_cases: data.regional.iter().map(|r| r.cases).sum(),
        peak_region: totals.first().map(|r| r.region.clone()),
        failed_sources: data.report.failed_sources.clone(),
    }
}

/// Assemble the four tables from the raw sources under one configuration.
pub fn build_dashboard(sources: SourceTables, config: &PipelineConfig) -> DashboardData {
    let canine_window = config.filter_canine.then_some(&config.window);
    DashboardData {
        human: build_human_series(&sources.human, &config.window),
        regional: build_regional_series(&sources.human, config.base_year),
        canine: build_canine_series(&sources.canine, canine_window),
        vector: build_vector_series(&sources.vector, canine_window),
        report: LoadReport {
            rows_read: sources.rows_read,
            failed_sources: sources.failed_sources,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn window(min: i32, max: i32) -> YearWindow {
        YearWindow::new(Some(min), Some(max))
    }

    #[test]
    fn human_row_parses_positionally() {
        let raw = table(&[
            &["Ano", "Casos", "Pop", "Inc", "Prev", "Obitos", "Let"],
            &["2023", "102", "2500000", "4.1", "0.0", "5", "4.9"],
        ]);
        let series = build_human_series(&raw, &window(2014, 2023));
        assert_eq!(series.len(), 1);
        let r = &series[0];
        assert_eq!(r.year, 2023);
        assert_eq!(r.cases, 102.0);
        assert_eq!(r.population, 2_500_000.0);
        assert_eq!(r.incidence, 4.1);
        assert_eq!(r.deaths, 5.0);
        assert_eq!(r.lethality_pct, 4.9);
    }

    #[test]
    fn window_excludes_out_of_range_and_unparseable_years() {
        let raw = table(&[
            &["Ano", "a", "b", "c", "d", "e", "f"],
            &["2006", "1", "1", "1", "1", "1", "1"],
            &["2015", "2", "1", "1", "1", "1", "1"],
            &["2024", "3", "1", "1", "1", "1", "1"],
            &["Total", "6", "3", "3", "3", "3", "3"],
        ]);
        let series = build_human_series(&raw, &window(2007, 2023));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, 2015);
    }

    #[test]
    fn narrow_human_rows_are_dropped_not_misread() {
        let raw = table(&[
            &["2020", "10", "100"],
            &["2021", "11", "100", "1.0", "0.0", "2", "18.2"],
        ]);
        let series = build_human_series(&raw, &window(2007, 2023));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, 2021);
    }

    #[test]
    fn human_series_is_sorted_by_year() {
        let raw = table(&[
            &["2022", "9", "1", "1", "1", "1", "1"],
            &["2020", "7", "1", "1", "1", "1", "1"],
            &["2021", "8", "1", "1", "1", "1", "1"],
        ]);
        let years: Vec<i32> = build_human_series(&raw, &window(2007, 2023))
            .iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
    }

    #[test]
    fn regional_unpivot_is_complete_with_constant_coordinates() {
        let cells: Vec<String> = std::iter::once("Barreiro".to_string())
            .chain((0..17).map(|i| (i + 1).to_string()))
            .collect();
        let raw: RawTable = vec![cells];
        let series = build_regional_series(&raw, 2007);
        let barreiro: Vec<&RegionalRecord> =
            series.iter().filter(|r| r.region == "Barreiro").collect();
        assert_eq!(barreiro.len(), 17);
        assert_eq!(barreiro.first().map(|r| r.year), Some(2007));
        assert_eq!(barreiro.last().map(|r| r.year), Some(2023));
        assert!(barreiro
            .iter()
            .all(|r| r.latitude == -19.974 && r.longitude == -44.022));
    }

    #[test]
    fn absent_region_contributes_zero_records() {
        let raw = table(&[&["Pampulha", "3", "4"]]);
        let series = build_regional_series(&raw, 2007);
        assert!(series.iter().all(|r| r.region == "Pampulha"));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn region_match_is_case_insensitive_substring_first_wins() {
        let raw = table(&[
            &["Regional NORTE (consolidado)", "5"],
            &["Norte", "9"],
        ]);
        let series = build_regional_series(&raw, 2007);
        let norte: Vec<&RegionalRecord> = series.iter().filter(|r| r.region == "Norte").collect();
        assert_eq!(norte.len(), 1);
        assert_eq!(norte[0].cases, 5.0);
    }

    #[test]
    fn regional_counts_use_brazilian_format() {
        let raw = table(&[&["Leste", "1.500", "80"]]);
        let series = build_regional_series(&raw, 2007);
        assert_eq!(series[0].cases, 1500.0);
        assert_eq!(series[1].cases, 80.0);
    }

    #[test]
    fn canine_row_normalizes_brazilian_numbers() {
        let raw = table(&[
            &["Ano", "Sorologias", "Positivos", "Eutanasiados", "Borrifados"],
            &["2020", "155.643", "320", "45", "12000"],
        ]);
        let series = build_canine_series(&raw, None);
        assert_eq!(series.len(), 1);
        let r = &series[0];
        assert_eq!(r.serologies, 155_643.0);
        assert_eq!(r.positives, 320.0);
        assert_eq!(r.culled, 45.0);
        assert_eq!(r.sprayed_households, 12_000.0);
        assert!((r.positivity_pct - 0.2056).abs() < 1e-3);
    }

    #[test]
    fn zero_serologies_yield_zero_positivity() {
        let raw = table(&[&["2021", "0", "0", "0", "5000"]]);
        let series = build_canine_series(&raw, None);
        assert_eq!(series[0].positivity_pct, 0.0);
        assert!(series[0].positivity_pct.is_finite());
    }

    #[test]
    fn canine_window_policy_is_optional() {
        let raw = table(&[
            &["2005", "10", "1", "0", "0"],
            &["2020", "10", "1", "0", "0"],
        ]);
        assert_eq!(build_canine_series(&raw, None).len(), 2);
        let filtered = build_canine_series(&raw, Some(&window(2007, 2023)));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].year, 2020);
    }

    #[test]
    fn four_column_canine_rows_default_sprayed_to_zero() {
        let raw = table(&[&["2019", "1.000", "20", "5"]]);
        let series = build_canine_series(&raw, None);
        assert_eq!(series[0].sprayed_households, 0.0);
        assert_eq!(series[0].serologies, 1000.0);
    }

    #[test]
    fn vector_series_parses_two_columns() {
        let raw = table(&[
            &["Ano", "Imoveis borrifados"],
            &["2020", "12.000"],
            &["2021", "5.000"],
        ]);
        let series = build_vector_series(&raw, None);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].sprayed_households, 12_000.0);
    }

    fn human(year: i32, cases: f64) -> HumanRecord {
        HumanRecord {
            year,
            cases,
            population: 0.0,
            incidence: 0.0,
            prevalence: 0.0,
            deaths: 0.0,
            lethality_pct: 0.0,
        }
    }

    fn canine(year: i32, positives: f64) -> CanineRecord {
        CanineRecord {
            year,
            serologies: 1.0,
            positives,
            culled: 0.0,
            sprayed_households: 0.0,
            positivity_pct: 0.0,
        }
    }

    #[test]
    fn outer_join_keeps_gaps_as_none() {
        let rows = correlate(
            &[human(2020, 10.0), human(2021, 12.0)],
            &[canine(2021, 300.0), canine(2022, 250.0)],
            JoinKind::Outer,
        );
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
        assert_eq!(rows[0].canine_positives, None);
        assert_eq!(rows[1].human_cases, Some(12.0));
        assert_eq!(rows[1].canine_positives, Some(300.0));
        assert_eq!(rows[2].human_cases, None);
    }

    #[test]
    fn inner_join_keeps_overlap_only() {
        let rows = correlate(
            &[human(2020, 10.0), human(2021, 12.0)],
            &[canine(2021, 300.0), canine(2022, 250.0)],
            JoinKind::Inner,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2021);
    }

    #[test]
    fn regional_totals_rank_descending() {
        let raw = table(&[&["Norte", "5", "7"], &["Leste", "20", "1"]]);
        let totals = regional_totals(&build_regional_series(&raw, 2007));
        assert_eq!(totals[0].region, "Leste");
        assert_eq!(totals[0].total_cases, 21.0);
        assert_eq!(totals[1].region, "Norte");
        assert_eq!(totals[1].total_cases, 12.0);
    }

    #[test]
    fn summary_reads_latest_year_and_mean_lethality() {
        let data = DashboardData {
            human: vec![
                HumanRecord {
                    lethality_pct: 4.0,
                    deaths: 3.0,
                    ..human(2022, 90.0)
                },
                HumanRecord {
                    lethality_pct: 6.0,
                    deaths: 5.0,
                    ..human(2023, 102.0)
                },
            ],
            ..DashboardData::default()
        };
        let summary = summarize(&data);
        assert_eq!(summary.latest_year, Some(2023));
        assert_eq!(summary.latest_year_cases, 102.0);
        assert_eq!(summary.avg_lethality_pct, 5.0);
        assert_eq!(summary.total_deaths, 8.0);
        assert_eq!(summary.peak_region, None);
    }
}
