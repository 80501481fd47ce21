use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use weekly_forecast::{run_backtest_from_csv, GapPolicy, PipelineConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// ARIMA(5,1,5)
    Arima,
    /// SARIMA(5,1,5)(1,0,1,26)
    Sarima,
}

#[derive(Debug, Parser)]
#[clap(name = "weekly_forecast")]
#[clap(about = "Backtest a weekly forecast against the last weeks of a case series")]
#[clap(version)]
struct Args {
    /// Input CSV with entity, date and value columns
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the aligned backtest view
    #[arg(short, long, default_value = "backtest.csv")]
    output: PathBuf,

    /// Model preset, ignored when --config is given
    #[arg(long, value_enum, default_value = "arima")]
    preset: Preset,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity to forecast
    #[arg(long)]
    entity: Option<String>,

    /// Number of holdout weeks
    #[arg(long)]
    horizon: Option<usize>,

    /// Significance level of the confidence band
    #[arg(long)]
    alpha: Option<f64>,

    /// Fill missing weeks by linear interpolation instead of failing
    #[arg(long)]
    interpolate: bool,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => PipelineConfig::from_json_file(path)?,
            (None, Preset::Arima) => PipelineConfig::arima(),
            (None, Preset::Sarima) => PipelineConfig::sarima(),
        };

        if let Some(entity) = &self.entity {
            config.loader.entity = entity.clone();
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(alpha) = self.alpha {
            config.model.significance_level = alpha;
        }
        if self.interpolate {
            config.gap_policy = GapPolicy::Interpolate;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.pipeline_config()?;
    let report = run_backtest_from_csv(&args.input, &config)?;

    println!("{} for {}", report.model_name, report.view.entity());
    println!(
        "Forecast starts after {} ({} holdout weeks)",
        report.view.boundary().date,
        report.view.rows().len()
    );
    println!("sigma2: {:.4}  AIC: {:.2}", report.sigma2, report.aic);
    print!("{}", report.accuracy);

    report.view.write_csv(&args.output)?;
    println!("Backtest view written to {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(stage = err.stage().unwrap_or("setup"), "{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
