mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::debug;

use config::Config;
use logscope_client::{CreateLogRequest, HttpBackend, LogBackend};
use logscope_session::{FilterSpec, SessionDriver};
use logscope_types::{LogLevel, RelativeRange, TimeWindow, parse_timestamp};

/// Logscope - browse schema/module partitioned operation logs
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds, overriding the config file
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log request flow to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List schemas
    Schemas,

    /// List the modules of a schema
    Modules {
        /// Schema id or name
        schema: String,
    },

    /// Show one page of filtered logs
    Logs(LogsArgs),

    /// Create a log record
    Create(CreateArgs),

    /// Create a schema, or return the existing one with that name
    CreateSchema { name: String },

    /// Look up a schema by name
    Schema { name: String },
}

#[derive(ClapArgs, Debug)]
struct LogsArgs {
    /// Schema id or name (defaults to the first schema)
    #[arg(long)]
    schema: Option<String>,

    /// Module name (defaults to the first module of the schema)
    #[arg(long)]
    module: Option<String>,

    #[arg(long)]
    level: Option<LogLevel>,

    #[arg(long)]
    service: Option<String>,

    #[arg(long)]
    source: Option<String>,

    /// Case-insensitive text to find in messages
    #[arg(long)]
    search: Option<String>,

    /// Start of the time range
    #[arg(long, value_parser = parse_time_arg, conflicts_with = "last")]
    from: Option<DateTime<Utc>>,

    /// End of the time range
    #[arg(long, value_parser = parse_time_arg, conflicts_with = "last")]
    to: Option<DateTime<Utc>>,

    /// Relative range ending now: 5m, 15m, 30m, 1h, 6h, 24h or all
    #[arg(long)]
    last: Option<RelativeRange>,

    #[arg(long, default_value = "1")]
    page: usize,

    /// Entries per page (defaults to the configured page size)
    #[arg(long)]
    page_size: Option<usize>,

    /// Print structured details under each entry
    #[arg(long)]
    details: bool,
}

#[derive(ClapArgs, Debug)]
struct CreateArgs {
    #[arg(long)]
    schema: String,
    #[arg(long)]
    module: String,
    /// Log message
    #[arg(long)]
    output: String,
    #[arg(long)]
    service: String,
    #[arg(long)]
    detail: Option<String>,
    #[arg(long)]
    error_info: Option<String>,
    #[arg(long)]
    client_ip: Option<String>,
    #[arg(long)]
    level: Option<String>,
    #[arg(long)]
    operator_id: Option<String>,
    #[arg(long)]
    operator: Option<String>,
    #[arg(long)]
    operator_ip: Option<String>,
    #[arg(long)]
    operator_equipment: Option<String>,
    #[arg(long)]
    operator_company: Option<String>,
    #[arg(long)]
    operator_project: Option<String>,
}

impl From<CreateArgs> for CreateLogRequest {
    fn from(args: CreateArgs) -> Self {
        Self {
            schema: args.schema,
            module: args.module,
            output: args.output,
            service: args.service,
            detail: args.detail,
            error_info: args.error_info,
            client_ip: args.client_ip,
            log_level: args.level,
            operator_id: args.operator_id,
            operator: args.operator,
            operator_ip: args.operator_ip,
            operator_equipment: args.operator_equipment,
            operator_company: args.operator_company,
            operator_project: args.operator_project,
        }
    }
}

fn parse_time_arg(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).ok_or_else(|| format!("unrecognized timestamp '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    debug!(?config, "configuration loaded");

    let backend = Arc::new(
        HttpBackend::new(&config.base_url, config.timeout())
            .with_context(|| format!("Cannot use backend at {}", config.base_url))?,
    );

    match args.command {
        Command::Schemas => {
            let mut driver = SessionDriver::new(backend, config.page_size);
            driver.mount();
            settle(&mut driver).await?;
            check_error(&driver)?;
            let session = driver.session();
            for schema in session.schemas() {
                println!(
                    "{}",
                    output::format_schema(schema, schema.id == session.selected_schema())
                );
            }
        }
        Command::Modules { schema } => {
            let mut driver = SessionDriver::new(backend, config.page_size);
            select(&mut driver, Some(&schema), None).await?;
            let session = driver.session();
            for module in session.modules() {
                println!(
                    "{}",
                    output::format_module(module, module.name == session.selected_module())
                );
            }
        }
        Command::Logs(logs) => {
            let page_size = logs.page_size.unwrap_or(config.page_size);
            let mut driver = SessionDriver::new(backend, page_size);
            select(&mut driver, logs.schema.as_deref(), logs.module.as_deref()).await?;

            let filter = build_filter(&logs, Utc::now());
            let session = driver.session_mut();
            if !filter.is_empty() {
                session.apply_filter(filter);
            }
            session.change_page(logs.page, page_size);

            let view = session.logs();
            for entry in view.display() {
                println!("{}", output::format_entry(entry));
                if logs.details {
                    if let Some(details) = output::format_details(entry) {
                        println!("{}", details);
                    }
                }
            }
            println!();
            println!(
                "{} / {}",
                session.selected_schema(),
                if session.selected_module().is_empty() {
                    "(all modules)"
                } else {
                    session.selected_module()
                }
            );
            println!("{}", output::format_summary(view));
            println!("{}", output::format_level_counts(&view.level_counts()));
            println!("services: {}", view.services().join(", "));
            println!("sources: {}", view.sources().join(", "));
        }
        Command::Create(create) => {
            let request = CreateLogRequest::from(create);
            let created = backend
                .create_log(&request)
                .await
                .context("Failed to create log")?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Command::CreateSchema { name } => {
            let created = backend
                .create_schema(&name)
                .await
                .with_context(|| format!("Failed to create schema '{}'", name))?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Command::Schema { name } => {
            let found = backend
                .get_schema(&name)
                .await
                .with_context(|| format!("Failed to look up schema '{}'", name))?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }

    Ok(())
}

/// Mount, then steer the cascade to the requested schema and module
async fn select(driver: &mut SessionDriver, schema: Option<&str>, module: Option<&str>) -> Result<()> {
    driver.mount();
    settle(driver).await?;
    check_error(driver)?;

    if let Some(key) = schema {
        let id = driver
            .session()
            .find_schema(key)
            .map(|s| s.id.clone())
            .with_context(|| format!("Schema '{}' not found", key))?;
        if id != driver.session().selected_schema() {
            driver.select_schema(id);
            settle(driver).await?;
            check_error(driver)?;
        }
    }

    if let Some(name) = module {
        if !driver.session().modules().iter().any(|m| m.name == name) {
            anyhow::bail!(
                "Module '{}' not found in schema '{}'",
                name,
                driver.session().selected_schema()
            );
        }
        if name != driver.session().selected_module() {
            driver.select_module(name);
            settle(driver).await?;
            check_error(driver)?;
        }
    }

    Ok(())
}

/// Apply fetch outcomes until the session is idle; Ctrl+C cancels
async fn settle(driver: &mut SessionDriver) -> Result<()> {
    let interrupted = tokio::select! {
        _ = driver.settle() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        driver.stop();
        anyhow::bail!("Interrupted");
    }
    Ok(())
}

fn check_error(driver: &SessionDriver) -> Result<()> {
    match driver.session().error() {
        Some(e) => Err(anyhow::Error::new(e.clone())),
        None => Ok(()),
    }
}

fn build_filter(args: &LogsArgs, now: DateTime<Utc>) -> FilterSpec {
    let time_range = match (args.last, args.from, args.to) {
        (Some(range), _, _) => range.window(now),
        (None, None, None) => None,
        (None, from, to) => Some(TimeWindow::new(
            from.unwrap_or(DateTime::<Utc>::MIN_UTC),
            to.unwrap_or(now),
        )),
    };

    FilterSpec {
        level: args.level,
        service: args.service.clone(),
        source: args.source.clone(),
        time_range,
        search_text: args.search.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn logs_args(extra: &[&str]) -> LogsArgs {
        let mut argv = vec!["logscope", "logs"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Logs(logs) => logs,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_logs_defaults() {
        let args = logs_args(&[]);
        assert_eq!(args.page, 1);
        assert!(args.page_size.is_none());
        assert!(build_filter(&args, Utc::now()).is_empty());
    }

    #[test]
    fn test_filter_from_flags() {
        let args = logs_args(&["--level", "warn", "--service", "gateway", "--search", "timeout"]);
        let filter = build_filter(&args, Utc::now());
        assert_eq!(filter.level, Some(LogLevel::Warning));
        assert_eq!(filter.service.as_deref(), Some("gateway"));
        assert_eq!(filter.search_text.as_deref(), Some("timeout"));
        assert!(filter.time_range.is_none());
    }

    #[test]
    fn test_relative_range() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let args = logs_args(&["--last", "1h"]);
        let window = build_filter(&args, now).time_range.unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap());
        assert_eq!(window.end, now);

        let args = logs_args(&["--last", "all"]);
        assert!(build_filter(&args, now).time_range.is_none());
    }

    #[test]
    fn test_open_ended_absolute_range() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let args = logs_args(&["--from", "2024-01-15 10:00:00"]);
        let window = build_filter(&args, now).time_range.unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
        assert_eq!(window.end, now);
    }

    #[test]
    fn test_last_conflicts_with_absolute_range() {
        let argv = ["logscope", "logs", "--last", "5m", "--from", "2024-01-15"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_create_args_map_to_request() {
        let argv = [
            "logscope", "create", "--schema", "login", "--module", "web", "--output", "signed in",
            "--service", "auth", "--level", "info", "--operator", "alice",
        ];
        let Command::Create(create) = Args::try_parse_from(argv).unwrap().command else {
            panic!("expected create command");
        };
        let request = CreateLogRequest::from(create);
        assert_eq!(request.schema, "login");
        assert_eq!(request.log_level.as_deref(), Some("info"));
        assert_eq!(request.operator.as_deref(), Some("alice"));
        assert!(request.detail.is_none());
        assert!(request.missing_field().is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["logscope", "schemas", "--base-url", "http://x:1", "-v"]).unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://x:1"));
        assert!(args.verbose);
    }
}
