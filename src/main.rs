//! Bridge deploy tool.
//!
//! Creates two devnet accounts, funds them, publishes the bridge token
//! module from a compiled binary, initializes it, and bridges an amount to
//! the second account.
//!
//! ```text
//! bridge-deploy build/AptEth/bytecode_modules/apt_eth.mv
//! ```

use clap::Parser;
use std::path::PathBuf;

use apt_eth_bridge::bridge::{AutoConfirm, BalanceLine, DeployReport, DeployScript, StdinPrompt};
use apt_eth_bridge::config;
use apt_eth_bridge::observability::init_logging;

#[derive(Parser)]
#[command(name = "bridge-deploy")]
#[command(about = "Publish the bridge token module and bridge a test amount", long_about = None)]
struct Cli {
    /// Path the compiled module binary will be copied to.
    module_path: PathBuf,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Full node REST URL.
    #[arg(long)]
    node_url: Option<String>,

    /// Faucet URL.
    #[arg(long)]
    faucet_url: Option<String>,

    /// Amount to bridge to the holder account.
    #[arg(long)]
    amount: Option<u64>,

    /// Do not wait for the operator before publishing.
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_env_file(None)?;

    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref(), |config| {
        if let Some(url) = cli.node_url {
            config.node.url = url;
        }
        if let Some(url) = cli.faucet_url {
            config.faucet.url = url;
        }
        if let Some(amount) = cli.amount {
            config.demo.bridge_amount = amount;
        }
    })?;

    init_logging(&config.observability);
    tracing::info!(
        node_url = %config.node.url,
        faucet_url = %config.faucet.url,
        module = %config.contract.module_name,
        "bridge-deploy starting"
    );

    let script = DeployScript::new(&config, cli.module_path)?;
    let report = if cli.yes {
        script.run(&mut AutoConfirm).await?
    } else {
        script.run(&mut StdinPrompt).await?
    };

    print_report(&report);

    if let Err(e) = report.bridge {
        return Err(e.into());
    }
    Ok(())
}

fn print_report(report: &DeployReport) {
    println!("\n=== Addresses ===");
    println!("Owner: {}", report.owner);
    println!("Holder: {}", report.holder);

    println!("\n=== Initial Balance ===");
    print_balances(&report.initial_balances);

    println!("\n=== Tx Hash ===");
    println!("publish: {}", report.publish_hash);
    println!("initialize: {}", report.initialize_hash);

    println!("\n=== Bridge ===");
    match &report.bridge {
        Ok(receipt) => {
            for step in &receipt.steps {
                println!("{}: {}", step.step, step.hash);
            }
        }
        Err(e) => {
            println!("Err: {}", e);
            for step in &e.committed {
                println!("committed {}: {}", step.step, step.hash);
            }
        }
    }

    println!("\n=== After Balance ===");
    print_balances(&report.final_balances);
}

fn print_balances(lines: &[BalanceLine]) {
    for line in lines {
        let amount = line
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!("{} {}: {}", line.label, line.coin, amount);
    }
}
