mod config;
mod main_lib;
mod telegram;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use lotfolio_core::report::ReportServiceTrait;
use lotfolio_core::{Holding, JsonPortfolioStore, Portfolio, PortfolioStoreTrait};

use config::Config;
use main_lib::{build_service, init_tracing, save_report};
use telegram::TelegramNotifier;

#[derive(Parser)]
#[command(name = "lotfolio")]
#[command(about = "Moscow Exchange portfolio reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch market data and generate a report
    Report {
        /// Print only; do not write the report file
        #[arg(long, default_value_t = false)]
        no_save: bool,

        /// Also deliver the report via Telegram
        #[arg(long, default_value_t = false)]
        telegram: bool,
    },

    /// Portfolio commands
    Portfolio {
        #[command(subcommand)]
        cmd: PortfolioCmd,
    },
}

#[derive(Subcommand)]
enum PortfolioCmd {
    /// Print the stored portfolio
    Show,

    /// Replace the stored portfolio
    Set {
        /// Holdings as SYMBOL=LOTS
        #[arg(required = true)]
        holdings: Vec<String>,
    },

    /// Restore the default portfolio
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let store = JsonPortfolioStore::new(config.portfolio_path.clone());

    match cli.cmd {
        Commands::Report { no_save, telegram } => {
            let portfolio = store.load();
            let service = build_service(&config);
            let report = service.generate_report(&portfolio).await?;
            println!("{}", report);

            if !no_save {
                let path =
                    save_report(&config.reports_dir, &report, Utc::now(), config.utc_offset)?;
                tracing::info!("Report saved: {}", path.display());
            }

            if telegram {
                match &config.telegram {
                    Some(credentials) => {
                        let notifier =
                            TelegramNotifier::new(credentials.clone(), config.request_timeout);
                        if notifier.send_report(&report).await {
                            tracing::info!("Report sent to Telegram");
                        } else {
                            tracing::warn!("Failed to send report to Telegram");
                        }
                    }
                    None => tracing::warn!("Telegram credentials not set, skipping delivery"),
                }
            }
        }

        Commands::Portfolio { cmd } => match cmd {
            PortfolioCmd::Show => {
                print!("{}", store.load());
            }
            PortfolioCmd::Set { holdings } => {
                let holdings = holdings
                    .iter()
                    .map(|entry| entry.parse::<Holding>())
                    .collect::<lotfolio_core::Result<Vec<_>>>()?;
                let portfolio = Portfolio::from_holdings(holdings);
                if !store.save(&portfolio) {
                    bail!("Failed to save portfolio to {}", store.path().display());
                }
                print!("{}", portfolio);
            }
            PortfolioCmd::Reset => {
                let portfolio = Portfolio::default_portfolio();
                if !store.save(&portfolio) {
                    bail!("Failed to save portfolio to {}", store.path().display());
                }
                print!("{}", portfolio);
            }
        },
    }

    Ok(())
}
