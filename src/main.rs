use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tripplanner::config::LoggingConfig;
use tripplanner::{
    Pace, SearchOptions, TripError, TripPlannerConfig, TripPlannerService, TripRequest, render,
};

/// Output format for the planned trip
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Day cards and a cost summary
    Text,
    /// The full itinerary as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tripplanner")]
#[command(author, version, about = "Plan day-by-day trips around a city within a budget")]
#[command(long_about = r#"
TripPlanner finds points of interest around a destination and spreads them
over the days of your trip, keeping an eye on the budget.

With a Gemini API key (TRIPPLANNER_PLANNER__API_KEY or GOOGLE_API_KEY) the
plan is drafted by a language model and checked before use; otherwise a
rule-based planner is used.

Example:
  tripplanner plan Paris --start 2025-06-02 --days 3 --budget 1200 \
      --group 2 --interests museums,food,architecture --pace moderate
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a trip
    Plan(PlanArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// City or region to visit
    destination: String,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    start: NaiveDate,

    /// Last day of the trip, inclusive (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE", conflicts_with = "days")]
    end: Option<NaiveDate>,

    /// Trip length in days, as an alternative to --end
    #[arg(short, long)]
    days: Option<u32>,

    /// Total budget for the whole group
    #[arg(short, long)]
    budget: f64,

    /// Number of travellers
    #[arg(short, long, default_value_t = 1)]
    group: u32,

    /// Interests, comma separated (museums, food, architecture, ...)
    #[arg(short, long, value_delimiter = ',')]
    interests: Vec<String>,

    /// relaxed, moderate or packed
    #[arg(short, long, default_value = "moderate")]
    pace: Pace,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the route as GeoJSON to this file
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,

    /// Search radius around the destination in meters
    #[arg(long)]
    radius: Option<u32>,

    /// Maximum number of candidate places
    #[arg(long)]
    limit: Option<usize>,
}

impl PlanArgs {
    fn end_date(&self) -> Result<NaiveDate> {
        match (self.end, self.days) {
            (Some(end), _) => Ok(end),
            (None, Some(0)) => Err(TripError::invalid_request("Trip must last at least one day").into()),
            (None, Some(days)) => self
                .start
                .checked_add_days(Days::new(u64::from(days - 1)))
                .ok_or_else(|| TripError::invalid_request("Trip end date is out of range").into()),
            (None, None) => Ok(self.start),
        }
    }

    fn request(&self) -> Result<TripRequest> {
        let request = TripRequest::builder(&self.destination, self.start, self.end_date()?)
            .budget(self.budget)
            .group_size(self.group)
            .interests(&self.interests)
            .pace(self.pace)
            .build()?;
        Ok(request)
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn plan(args: PlanArgs, config: &TripPlannerConfig) -> Result<()> {
    let request = args.request()?;
    debug!("Trip request: {:?}", request);

    let service = TripPlannerService::from_config(config)?;
    let options = SearchOptions {
        radius_m: args.radius,
        limit: args.limit,
    };
    let trip = service.plan_trip(&request, options).await?;

    if let Some(path) = &args.map {
        let geojson = render::map_geojson(&trip.itinerary, &trip.center);
        let body = serde_json::to_string_pretty(&geojson).context("Failed to encode map")?;
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write map to {}", path.display()))?;
        info!("Map written to {}", path.display());
    }

    match args.format {
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(&trip).context("Failed to encode itinerary")?;
            println!("{body}");
        }
        OutputFormat::Text => {
            println!(
                "{} - {} day(s) from {} ({})\n",
                request.destination(),
                trip.itinerary.num_days(),
                render::format_date(request.start_date()),
                trip.center.format_coordinates()
            );
            print!("{}", render::day_cards(&trip.itinerary));
            print!("{}", render::cost_summary(&trip.itinerary));
        }
    }

    Ok(())
}

fn show_config(config: &TripPlannerConfig, path: Option<&PathBuf>) -> Result<()> {
    let source = path
        .cloned()
        .or_else(TripPlannerConfig::get_config_path)
        .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
    println!("# config file: {source}");
    let body = serde_json::to_string_pretty(&config.masked()).context("Failed to encode configuration")?;
    println!("{body}");
    Ok(())
}

async fn run(cli: Cli, config: TripPlannerConfig) -> Result<()> {
    match cli.command {
        Some(Command::Plan(args)) => plan(args, &config).await,
        Some(Command::Config) => show_config(&config, cli.config.as_ref()),
        None => bail!("No command given. Run `tripplanner plan --help` to get started."),
    }
}

/// Print an error the way an end user should see it
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<TripError>() {
        Some(trip_err) => {
            eprintln!("Error: {}", trip_err.user_message());
            if let TripError::Config { message } = trip_err {
                eprintln!("  {message}");
            }
            debug!("Details: {err:#}");
        }
        None => eprintln!("Error: {err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match TripPlannerConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging, cli.verbose);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
