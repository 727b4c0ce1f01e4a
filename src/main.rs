use chempca::{analyze_file, AnalysisConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use structopt::StructOpt;

/// PCA and least-squares regression on a process dataset
#[derive(Debug, StructOpt)]
#[structopt(name = "chempca")]
struct CliOptions {
    /// CSV file with T, P, TC, SV and Idx columns
    #[structopt(name = "DATA_CSV", parse(from_os_str), default_value = "Data1.csv")]
    data_path: PathBuf,
    /// Print the whole report as JSON instead of text
    #[structopt(long)]
    json: bool,
    /// Write the cumulative explained variance chart as SVG to this path
    #[structopt(long, value_name = "PATH", parse(from_os_str))]
    chart: Option<PathBuf>,
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let config = AnalysisConfig::default().with_data_path(options.data_path);
    let report = analyze_file(&config)?;
    if options.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }
    if let Some(chart_path) = options.chart {
        report.render_cumulative_variance_chart(chart_path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let options = CliOptions::from_args();
    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("chempca: {}", e);
            ExitCode::FAILURE
        }
    }
}
