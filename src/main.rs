//! Token Registry CLI Application
//!
//! A command-line interface for issuing and managing fungible tokens.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use token_registry::api::{create_router, ApiState};
use token_registry::cli::{self, AppState};
use token_registry::token::{
    Msg, MsgEditToken, MsgIssueToken, MsgMintToken, MsgTransferTokenOwner, DO_NOT_MODIFY,
};

#[derive(Parser)]
#[command(name = "tokenreg")]
#[command(version)]
#[command(about = "A fungible token registry with symbol-priced fees", long_about = None)]
struct Cli {
    /// Data directory for registry storage
    #[arg(short, long, default_value = ".registry_data")]
    data_dir: PathBuf,

    /// JSON configuration file (pool names, native token, fee granularity)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new registry
    Init {
        /// Fund an account with native tokens, as address=amount in main units
        #[arg(short, long = "fund")]
        funds: Vec<String>,

        /// Overwrite an existing registry
        #[arg(long)]
        force: bool,
    },

    /// Issue a new token
    Issue {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        min_unit: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "0")]
        scale: u8,
        #[arg(long, default_value = "0")]
        initial_supply: u64,
        /// Zero derives the ceiling from --mintable
        #[arg(long, default_value = "0")]
        max_supply: u64,
        #[arg(long)]
        mintable: bool,
        /// Issuer, who pays the fee and owns the token
        #[arg(long)]
        owner: String,
    },

    /// Edit a token's name, ceiling or mintable flag
    Edit {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        owner: String,
        #[arg(long, default_value = DO_NOT_MODIFY)]
        name: String,
        /// Zero keeps the current ceiling
        #[arg(long, default_value = "0")]
        max_supply: u64,
        #[arg(long)]
        mintable: Option<bool>,
    },

    /// Mint more of a mintable token
    Mint {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        owner: String,
        /// Recipient; defaults to the owner
        #[arg(long)]
        to: Option<String>,
        /// Amount in main units
        #[arg(long)]
        amount: u64,
    },

    /// Hand a token over to a new owner
    TransferOwner {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Deliver a batch of messages from a JSON file
    Batch {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a token by symbol or min unit
    Token { denom: String },

    /// List tokens
    Tokens {
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show the issue and mint fees of a symbol
    Fees { symbol: String },

    /// Show the fee parameters
    Params {
        /// Replace the parameters with a JSON file
        #[arg(long)]
        set: Option<PathBuf>,
    },

    /// Show the balances of an account
    Balance { address: String },

    /// Export the registry as a genesis file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace the registry with a genesis file
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the read-only REST API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Handle init command separately (no saved state yet)
    if let Commands::Init { funds, force } = &cli.command {
        return cli::cmd_init(&cli.data_dir, config_path, funds, *force);
    }

    let mut state = match AppState::new(cli.data_dir.clone(), config_path) {
        Ok(state) => state,
        Err(e) => {
            log::warn!("Failed to load registry from {:?}: {}", cli.data_dir, e);
            println!("❌ No registry found. Run `tokenreg init` first.");
            return Err(e);
        }
    };

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Issue {
            symbol,
            min_unit,
            name,
            scale,
            initial_supply,
            max_supply,
            mintable,
            owner,
        } => {
            let msg = MsgIssueToken::new(
                &symbol,
                &min_unit,
                &name,
                scale,
                initial_supply,
                max_supply,
                mintable,
                &owner,
            );
            cli::cmd_deliver(&mut state, &[Msg::IssueToken(msg)])?;
        }

        Commands::Edit {
            symbol,
            owner,
            name,
            max_supply,
            mintable,
        } => {
            let msg = MsgEditToken::new(&name, &symbol, max_supply, mintable, &owner);
            cli::cmd_deliver(&mut state, &[Msg::EditToken(msg)])?;
        }

        Commands::Mint {
            symbol,
            owner,
            to,
            amount,
        } => {
            let msg = MsgMintToken::new(&symbol, &owner, to.as_deref(), amount);
            cli::cmd_deliver(&mut state, &[Msg::MintToken(msg)])?;
        }

        Commands::TransferOwner { symbol, from, to } => {
            let msg = MsgTransferTokenOwner::new(&from, &to, &symbol);
            cli::cmd_deliver(&mut state, &[Msg::TransferTokenOwner(msg)])?;
        }

        Commands::Batch { file } => {
            cli::cmd_batch(&mut state, &file)?;
        }

        Commands::Token { denom } => {
            cli::cmd_token(&state, &denom)?;
        }

        Commands::Tokens { owner } => {
            cli::cmd_tokens(&state, owner.as_deref())?;
        }

        Commands::Fees { symbol } => {
            cli::cmd_fees(&state, &symbol)?;
        }

        Commands::Params { set } => {
            cli::cmd_params(&mut state, set.as_deref())?;
        }

        Commands::Balance { address } => {
            cli::cmd_balance(&state, &address)?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }

        Commands::Serve { port } => {
            run_server(state, port)?;
        }
    }

    Ok(())
}

fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let api_state = ApiState::new(state.registry);
        let app = create_router(api_state);
        let addr = format!("0.0.0.0:{}", port);

        println!("🚀 Starting API server on http://{}", addr);
        println!();
        println!("📡 Available endpoints:");
        println!("   GET  /health                     - Health check");
        println!("   GET  /api/tokens?owner=          - List tokens");
        println!("   GET  /api/tokens/{{denom}}         - Token by symbol or min unit");
        println!("   GET  /api/fees/{{symbol}}          - Issue and mint fees");
        println!("   GET  /api/params                 - Fee parameters");
        println!("   GET  /api/balances/{{address}}     - Account balances");
        println!();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                println!("\n📴 Shutting down API server...");
            })
            .await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
