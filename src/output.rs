use anyhow::Result;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Serialize rows to a CSV file; the header comes from the serde names.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Print a titled markdown preview of the first `max_rows` rows.
pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", Table::new(slice).with(Style::markdown()));
}

/// One consolidated notice when any data source failed to load. The rest of
/// the dashboard still renders from whatever did load.
pub fn print_load_notice(failed_sources: &[String]) {
    if failed_sources.is_empty() {
        return;
    }
    println!(
        "Warning: {} data source(s) unavailable: {}. Affected sections will be empty.\n",
        failed_sources.len(),
        failed_sources.join(", ")
    );
}
