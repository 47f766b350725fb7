use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use tracing::info;
use wellbeing::api::serve_api;
use wellbeing::cache::store_from_config;
use wellbeing::cache::CacheAside;
use wellbeing::config::AppConfig;
use wellbeing::database::Database;
use wellbeing::logging;
use wellbeing::models::NewEmployee;
use wellbeing::scoring;
use wellbeing::service::WellbeingService;
use wellbeing::WellbeingError;
use wellbeing::Result;

#[derive(Parser)]
#[command(name = "wellbeing")]
#[command(about = "Emotion score classification, reputation and cached aggregates")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML config file (defaults to config.toml, then config.example.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize database schema and indexes
    Init,
    /// Start the REST API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Classify one score with the configured thresholds
    Classify {
        #[arg(allow_hyphen_values = true)]
        score: f64,
    },
    /// Compute streak and reputation from scores, most recent first
    Reputation {
        #[arg(required = true, allow_hyphen_values = true, num_args = 1..)]
        scores: Vec<f64>,
    },
    /// Register an employee
    AddEmployee {
        name: String,
        email: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Show one employee and their current reputation
    Employee { id: i64 },
    /// Evict cached aggregates matching a glob pattern
    Invalidate {
        /// Glob pattern, e.g. "leaderboard:*"
        pattern: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Offline commands run without a config file
    let config = match &cli.command {
        Commands::Classify { .. } | Commands::Reputation { .. } => {
            load_config(cli.config.as_ref()).unwrap_or_default()
        }
        _ => load_config(cli.config.as_ref())?,
    };

    // Environment is set before the runtime starts its worker threads
    logging::apply_backtrace_setting(&config.logging);

    tokio::runtime::Runtime::new()?.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    if cli.verbose {
        logging::init_logging_with_level("debug")?;
    } else {
        logging::init_logging_with_config(Some(&config))?;
    }

    match cli.command {
        Commands::Init => {
            let database = Database::from_config(&config).await?;
            database.init_schema().await?;
            println!("✅ Database schema initialized");
        }
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.api.host.clone());
            let port = port.unwrap_or(config.api.port);
            let cors = cors || config.api.enable_cors;
            serve_api(&config, host, port, cors).await?;
        }
        Commands::Classify { score } => {
            let bucket = scoring::classify(score, config.thresholds())?;
            println!("{score} => {bucket}");
        }
        Commands::Reputation { scores } => {
            for &score in &scores {
                scoring::Score::new(score)?;
            }
            let streak = scoring::streak_with_min(
                &scores,
                config.scoring.positive_cutoff,
                config.scoring.min_streak,
            );
            let latest = scores[0];
            let bucket = scoring::classify(latest, config.thresholds())?;
            println!("Latest score: {latest} ({bucket})");
            println!("Streak:       {streak}");
            println!("Points:       {}", scoring::reputation(latest, streak));
        }
        Commands::AddEmployee {
            name,
            email,
            department,
            role,
        } => {
            let database = Arc::new(Database::from_config(&config).await?);
            database.verify_schema_or_error().await?;
            let cache = CacheAside::new(store_from_config(&config.redis)?);
            let service = WellbeingService::new(database, cache, config.clone());
            let employee = service
                .add_employee(NewEmployee {
                    name,
                    email,
                    department,
                    role,
                })
                .await?;
            println!("✅ Created employee {} ({})", employee.id, employee.name);
        }
        Commands::Employee { id } => {
            let database = Arc::new(Database::from_config(&config).await?);
            database.verify_schema_or_error().await?;
            let employee = database
                .get_employee(id)
                .await?
                .ok_or(WellbeingError::EmployeeNotFound(id))?;
            let cache = CacheAside::new(store_from_config(&config.redis)?);
            let service = WellbeingService::new(database, cache, config.clone());
            let report = service.employee_reputation(id).await?;

            println!("{} <{}>", employee.name, employee.email);
            println!(
                "Department:   {}",
                employee.department.as_deref().unwrap_or("-")
            );
            println!("Status:       {}", employee.status.as_str());
            match (report.latest_score, report.bucket) {
                (Some(score), Some(bucket)) => println!("Latest score: {score} ({bucket})"),
                _ => println!("Latest score: -"),
            }
            println!("Streak:       {}", report.streak);
            println!("Points:       {}", report.points);
        }
        Commands::Invalidate { pattern } => {
            let cache = CacheAside::new(store_from_config(&config.redis)?);
            let removed = cache.invalidate(&pattern).await;
            info!("Invalidated {} entries", removed);
            println!("🧹 Removed {removed} cache entries matching {pattern}");
        }
    }

    Ok(())
}
