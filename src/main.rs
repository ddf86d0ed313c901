use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::exit;
use tokio::task::JoinSet;

use tlsgrade::config::{Config, ConfigError, DEFAULT_CONFIG_FILE};
use tlsgrade::{ErrorReport, Grade, Inspector, Report, Target, TlsGradeError};

mod metrics;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hosts to check, as hostnames, host:port pairs or URLs
    #[arg(value_name = "HOST")]
    hosts: Vec<String>,

    /// Output format: json, text, summary
    #[arg(short, long)]
    output: Option<String>,

    /// Exit code to use when any host grades F or cannot be checked
    #[arg(long)]
    exit_code: Option<i32>,

    /// Configuration file (defaults to ./tlsgrade.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for hosts that do not name one
    #[arg(long)]
    port: Option<u16>,

    /// Connect and handshake timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Push results to a Prometheus Push Gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus Push Gateway address
    #[arg(long)]
    prometheus_address: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Checked(Report),
    Failed(ErrorReport),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if cli.generate_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            exit(2);
        }
    };

    let hosts = config.hosts.clone().unwrap_or_default();
    if hosts.is_empty() {
        eprintln!("No hosts given; pass them as arguments or set `hosts` in the config file");
        exit(2);
    }

    let outcomes = inspect_all(&config, hosts).await;

    match config.output.as_deref().unwrap_or("summary") {
        "json" => match serde_json::to_string_pretty(&outcomes) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize results: {}", e),
        },
        "text" => print_text(&outcomes),
        _ => print_summary(&outcomes),
    }

    if let Some(address) = config.prometheus_address().map(str::to_string) {
        let reports: Vec<Report> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                Outcome::Checked(report) => Some(report.clone()),
                Outcome::Failed(_) => None,
            })
            .collect();
        // The push gateway client blocks.
        let pushed = tokio::task::spawn_blocking(move || {
            metrics::prom::prometheus_metrics(&reports, &address)
        })
        .await;
        if let Err(e) = pushed {
            log::warn!("Prometheus push task failed: {}", e);
        }
    }

    let failing = outcomes.iter().any(|outcome| match outcome {
        Outcome::Checked(report) => report.grade == Grade::F,
        Outcome::Failed(_) => true,
    });
    if failing {
        exit(config.exit_code.unwrap_or(0));
    }
    exit(0);
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let file_config = match &cli.config {
        Some(path) => Some(Config::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Some(Config::from_file(DEFAULT_CONFIG_FILE)?)
        }
        None => None,
    };

    let cli_hosts = if cli.hosts.is_empty() {
        None
    } else {
        Some(cli.hosts.clone())
    };
    let cli_config = Config::from_cli_args(
        cli_hosts,
        cli.output.clone(),
        cli.exit_code,
        cli.port,
        cli.timeout,
        if cli.prometheus { Some(true) } else { None },
        cli.prometheus_address.clone(),
    );

    let mut config = Config::default();
    if let Some(file_config) = file_config {
        config = config.merge_with(file_config);
    }
    let config = config.merge_with(cli_config);
    config.validate()?;
    Ok(config)
}

/// Inspects every host concurrently and returns the outcomes in input order.
async fn inspect_all(config: &Config, hosts: Vec<String>) -> Vec<Outcome> {
    let default_port = config.port.unwrap_or(tlsgrade::connector::DEFAULT_PORT);
    let timeout = config.timeout();

    let mut tasks = JoinSet::new();
    for (index, host) in hosts.iter().cloned().enumerate() {
        tasks.spawn(async move {
            let outcome = match Target::parse(&host) {
                Ok(target) => {
                    let inspector = Inspector::new()
                        .with_port(target.port.unwrap_or(default_port))
                        .with_timeout(timeout);
                    inspect_one(&inspector, &target.hostname).await
                }
                Err(e) => failed(&host, &e),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<Outcome>> = hosts.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => log::error!("inspection task failed: {}", e),
        }
    }

    outcomes
        .into_iter()
        .zip(hosts.iter())
        .map(|(outcome, host)| {
            outcome.unwrap_or_else(|| Outcome::Failed(ErrorReport {
                hostname: host.clone(),
                error: "inspection task did not complete".to_string(),
                kind: tlsgrade::ErrorKind::Internal,
            }))
        })
        .collect()
}

async fn inspect_one(inspector: &Inspector, hostname: &str) -> Outcome {
    match inspector.inspect(hostname).await {
        Ok(report) => Outcome::Checked(report),
        Err(e) => failed(hostname, &e),
    }
}

fn failed(host: &str, error: &TlsGradeError) -> Outcome {
    log::error!("failed to check host {}: {}", host, error);
    Outcome::Failed(ErrorReport::new(host, error))
}

fn print_text(outcomes: &[Outcome]) {
    for outcome in outcomes {
        println!("--------------------------------------");
        match outcome {
            Outcome::Failed(error) => {
                println!("Hostname: {}", error.hostname);
                println!("Error ({}): {}", error.kind, error.error);
            }
            Outcome::Checked(report) => {
                let cert = &report.certificate;
                println!("Hostname: {}", report.hostname);
                println!("Grade: {}", report.grade);
                println!(
                    "Summary: {} passed, {} warnings, {} failed",
                    report.summary.passed, report.summary.warnings, report.summary.failed
                );
                println!("Subject: {}", cert.subject);
                println!("Issuer: {}", cert.issuer);
                println!("Valid from: {}", cert.valid_from);
                println!("Valid to: {}", cert.valid_to);
                println!("Days left: {}", cert.days_remaining);
                println!("Certificate S/N: {}", cert.serial_number);
                println!("Fingerprint (SHA-256): {}", cert.fingerprint);
                println!("Signature algorithm: {}", cert.signature_algorithm);
                match cert.key_size {
                    Some(bits) => println!("Key size: {} bits", bits),
                    None => println!("Key size: unknown"),
                }
                println!("Subject Alternative Names:");
                if let Some(sans) = &cert.subject_alt_names {
                    for san in sans.split(", ") {
                        println!("\t{}", san);
                    }
                }
                println!("Protocol: {}", report.connection.protocol);
                println!("Cipher: {}", report.connection.cipher);
                println!("Trusted: {}", report.connection.authorized);
                println!("Chain:");
                for (depth, link) in report.chain.iter().enumerate() {
                    let marker = if link.is_self_signed { " (self-signed)" } else { "" };
                    println!("\t{}: {}{}", depth, link.subject, marker);
                }
                println!("Validations:");
                for validation in &report.validations {
                    println!(
                        "\t[{}] {}: {}",
                        validation.status, validation.name, validation.message
                    );
                }
                println!("Checked at: {}", report.checked_at);
            }
        }
    }
}

fn print_summary(outcomes: &[Outcome]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Host", "Grade", "Passed", "Warnings", "Failed", "Days left", "Protocol",
    ]);
    for outcome in outcomes {
        match outcome {
            Outcome::Checked(report) => {
                table.add_row(vec![
                    report.hostname.clone(),
                    report.grade.to_string(),
                    report.summary.passed.to_string(),
                    report.summary.warnings.to_string(),
                    report.summary.failed.to_string(),
                    report.certificate.days_remaining.to_string(),
                    report.connection.protocol.clone(),
                ]);
            }
            Outcome::Failed(error) => {
                table.add_row(vec![
                    error.hostname.clone(),
                    format!("error: {}", error.kind),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]);
            }
        }
    }
    println!("{table}");
}
