use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use burnout_guard_lib::commands::AppState;
use burnout_guard_lib::config::AppConfig;
use burnout_guard_lib::db::DbPool;
use burnout_guard_lib::error::{AppError, AppResult};
use burnout_guard_lib::models::assessment::FeatureInput;
use burnout_guard_lib::services::behavioral_tracker::BehavioralTracker;
use burnout_guard_lib::services::feature_assembler::FeatureAssembler;
use burnout_guard_lib::services::tracking_service::TrackingService;
use burnout_guard_lib::utils::logger::init_logging;

#[derive(Parser)]
#[command(name = "burnout-guard")]
#[command(about = "Burnout risk assessment service", version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "BURNOUT_GUARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web form and JSON API
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run a single assessment and print the report as JSON
    Assess {
        #[arg(long)]
        work_hours: Option<f64>,
        #[arg(long)]
        break_minutes: Option<f64>,
        #[arg(long)]
        meeting_hours: Option<f64>,
        #[arg(long)]
        completion_rate: Option<f64>,
        #[arg(long, allow_hyphen_values = true, conflicts_with = "text")]
        sentiment: Option<f64>,
        /// Free-text statement scored by the emotion analyzer
        #[arg(long)]
        text: Option<String>,
    },
    /// Print recent assessment history
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Draw simulated behavioral data for an employee
    Simulate { employee_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, mut config: AppConfig) -> AppResult<()> {
    match command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
                config.validate()?;
            }
            burnout_guard_lib::serve(config).await
        }
        Commands::Assess {
            work_hours,
            break_minutes,
            meeting_hours,
            completion_rate,
            sentiment,
            text,
        } => {
            let state = AppState::new(config)?;
            let mut input = FeatureInput {
                avg_work_hours_per_day: work_hours,
                avg_break_time_minutes: break_minutes,
                meeting_hours_per_week: meeting_hours,
                task_completion_rate: completion_rate,
                sentiment_score: sentiment,
            };

            let report = match text {
                Some(text) => {
                    input.sentiment_score = Some(0.0);
                    let (behavioral, productivity, _) = FeatureAssembler::parse_input(&input)?;
                    state
                        .assessments()
                        .assess_text(behavioral, productivity, text)
                        .await?
                }
                None => state.assessments().assess_input(&input)?,
            };
            print_json(&report)
        }
        Commands::History { limit } => {
            let db = DbPool::new(&config.database.path)?;
            let tracking = TrackingService::new(db, config.assessment.history_limit);
            print_json(&tracking.assessment_history(limit)?)
        }
        Commands::Simulate { employee_id } => {
            print_json(&BehavioralTracker::new().snapshot(&employee_id))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(AppError::from)?;
    println!("{rendered}");
    Ok(())
}
