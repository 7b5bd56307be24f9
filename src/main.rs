// Entry point and high-level CLI flow.
//
// Configuration comes from clap flags; the run itself is a small menu:
// - Option [1] loads and normalizes the data files, printing diagnostics.
// - Option [2] builds the dashboard tables, writes the exports and shows a
//   preview of each; afterwards the user can go back or exit.
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::EnvFilter;
use vigileish::config::{JoinKind, PipelineConfig, YearWindow};
use vigileish::types::DashboardData;
use vigileish::util::{format_int, format_number};
use vigileish::{loader, output, series};

#[derive(Parser)]
#[command(name = "vigileish")]
#[command(about = "Normalizes leishmaniasis surveillance CSV exports into dashboard tables", long_about = None)]
struct Cli {
    /// Human case export (separator auto-detected)
    #[arg(long, default_value = "dados.csv")]
    human_file: String,

    /// Canine serology export (semicolon-delimited)
    #[arg(long, default_value = "caninos.csv")]
    canine_file: String,

    /// Vector-control export (semicolon-delimited)
    #[arg(long, default_value = "vetores.csv")]
    vector_file: String,

    /// Lower bound of the year window
    #[arg(long, default_value_t = 2007)]
    min_year: i32,

    /// Upper bound of the year window
    #[arg(long, default_value_t = 2023)]
    max_year: i32,

    /// Disable the year window entirely (keep every parseable year)
    #[arg(long)]
    no_year_window: bool,

    /// Year represented by the first case column of a regional row
    #[arg(long, default_value_t = 2007)]
    base_year: i32,

    /// Apply the year window to the canine and vector tables too
    #[arg(long)]
    filter_canine: bool,

    /// Join used for the human/canine correlation table
    #[arg(long, value_enum, default_value = "outer")]
    join: JoinKind,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let window = if self.no_year_window {
            YearWindow::default()
        } else {
            YearWindow::new(Some(self.min_year), Some(self.max_year))
        };
        PipelineConfig {
            window,
            base_year: self.base_year,
            filter_canine: self.filter_canine,
            join: self.join,
            human_path: self.human_file,
            canine_path: self.canine_file,
            vector_path: self.vector_file,
        }
    }
}

// In-memory app state so the files are read once per run but the tables can
// be regenerated multiple times.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<DashboardData>,
}

/// Read a single line of input after printing the common prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after generating the tables.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the exports and normalize every series.
fn handle_load(config: &PipelineConfig) {
    let sources = loader::load_sources(config);
    let data = series::build_dashboard(sources, config);
    println!(
        "Processing exports... ({} raw rows read; {} human, {} regional, {} canine, {} vector records kept)",
        format_int(data.report.rows_read as i64),
        format_int(data.human.len() as i64),
        format_int(data.regional.len() as i64),
        format_int(data.canine.len() as i64),
        format_int(data.vector.len() as i64),
    );
    output::print_load_notice(&data.report.failed_sources);
    println!();
    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(data);
}

/// Handle option [2]: derive the dashboard tables, export them and print
/// previews.
fn handle_generate(config: &PipelineConfig) {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: no data loaded. Please load the files first (option 1).\n");
        return;
    };

    println!("Generating dashboard tables...\n");

    let correlation = series::correlate(&data.human, &data.canine, config.join);
    let totals = series::regional_totals(&data.regional);
    let summary = series::summarize(&data);

    if let Some(year) = summary.latest_year {
        println!(
            "Cases ({}): {}  |  Mean lethality: {}%  |  Peak region: {}",
            year,
            format_number(summary.latest_year_cases, 0),
            format_number(summary.avg_lethality_pct, 1),
            summary.peak_region.as_deref().unwrap_or("-"),
        );
        println!();
    }

    for (path, result) in [
        ("human_series.csv", output::write_csv("human_series.csv", &data.human)),
        ("canine_series.csv", output::write_csv("canine_series.csv", &data.canine)),
        ("regional_totals.csv", output::write_csv("regional_totals.csv", &totals)),
        ("correlation.csv", output::write_csv("correlation.csv", &correlation)),
        ("summary.json", output::write_json("summary.json", &summary)),
    ] {
        if let Err(e) = result {
            error!(file = path, error = %e, "write failed");
        }
    }

    output::preview_table("Human case series", &data.human, 3);
    output::preview_table("Regional totals", &totals, 9);
    output::preview_table("Canine surveillance series", &data.canine, 3);
    output::preview_table("Vector-control series", &data.vector, 3);
    output::preview_table("Human/canine correlation", &correlation, 3);
    println!("(Full tables exported next to the input files; KPIs in summary.json)\n");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();
    loop {
        println!("VigiLeish data pipeline");
        println!("[1] Load the data files");
        println!("[2] Generate dashboard tables\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&config);
            }
            "2" => {
                println!();
                handle_generate(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
