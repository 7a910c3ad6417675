use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use gateway_probe::utils::config::{
    normalize_base_url, Credentials, ProbeConfig, DEFAULT_BASE_URL, DEFAULT_PASSWORD,
    DEFAULT_SSN_ID,
};
use gateway_probe::{report, runner};

#[derive(Parser)]
#[command(name = "gateway-probe")]
#[command(version)]
#[command(about = "Smoke-test the banking API gateway", long_about = None)]
struct Cli {
    /// Defaults to `run` against the local gateway
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe health, login, loan count and transaction count in order
    Run {
        /// Gateway base URL
        #[arg(short, long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// SSN id of the test customer
        #[arg(long, default_value = DEFAULT_SSN_ID)]
        ssn_id: String,

        /// Password of the test customer
        #[arg(long, default_value = DEFAULT_PASSWORD)]
        password: String,

        /// Exit with status 1 if any step did not pass
        #[arg(long, default_value = "false")]
        strict: bool,

        /// Write results.json and junit.xml
        #[arg(long, default_value = "false")]
        report: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Generate report from saved probe results
    Report {
        /// Path to results.json
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        None => run(ProbeConfig::default()).await?,

        Some(Commands::Run {
            base_url,
            ssn_id,
            password,
            strict,
            report,
            output,
        }) => {
            let config = ProbeConfig {
                base_url: normalize_base_url(&base_url),
                credentials: Credentials { ssn_id, password },
                strict,
                report_dir: report.then_some(output),
            };
            run(config).await?;
        }

        Some(Commands::Report {
            results,
            format,
            output,
        }) => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}

async fn run(config: ProbeConfig) -> anyhow::Result<()> {
    log::info!("Running probes against {}", config.base_url);
    let run = runner::run_probes(&config).await?;

    if config.strict && !run.all_passed() {
        let summary = run.summary();
        eprintln!(
            "{} {} of {} steps did not pass",
            "✗".red().bold(),
            summary.failed + summary.skipped,
            summary.total_steps
        );
        std::process::exit(1);
    }

    Ok(())
}
