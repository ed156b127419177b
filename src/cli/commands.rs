//! CLI commands for the token registry
//!
//! Implements all command handlers for the CLI interface. State changes go
//! through batch delivery so the fee check applies, then the registry is
//! saved as a snapshot.

use crate::api::handlers::balances_of;
use crate::config::RegistryConfig;
use crate::core::coin::DecCoin;
use crate::core::params::Params;
use crate::ledger::{Bank, Permission};
use crate::registry::{
    default_genesis, validate_genesis, GenesisState, MemRegistry, MsgOutcome, Registry,
};
use crate::storage::{load_from_file, save_to_file, MemStore, Snapshot, Storage, StorageConfig};
use crate::token::Msg;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub registry: MemRegistry,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

fn load_config(config_path: Option<&Path>) -> CliResult<RegistryConfig> {
    match config_path {
        Some(path) => Ok(RegistryConfig::load(path)?),
        None => Ok(RegistryConfig::default()),
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Bank with the registry pool allowed to mint and burn
pub fn genesis_bank(config: &RegistryConfig) -> Bank {
    Bank::new()
        .with_pool(&config.module_name, &[Permission::Minter, Permission::Burner])
        .with_pool(&config.fee_collector_name, &[])
}

impl AppState {
    /// Load the saved registry from `data_dir`
    pub fn new(data_dir: PathBuf, config_path: Option<&Path>) -> CliResult<Self> {
        let config = load_config(config_path)?;
        let storage = open_storage(&data_dir)?;
        let registry = storage.load()?.restore(config)?;

        Ok(Self {
            registry,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        let snapshot = Snapshot::capture(&self.registry)?;
        self.storage.save(&snapshot)?;
        Ok(())
    }
}

/// Parse `address=amount`, the amount in main units of the native token
fn parse_fund(config: &RegistryConfig, entry: &str) -> CliResult<(String, DecCoin)> {
    let (address, amount) = entry
        .split_once('=')
        .ok_or_else(|| format!("invalid fund entry {}, expected address=amount", entry))?;
    let address = address.trim();
    if address.is_empty() {
        return Err(format!("invalid fund entry {}, missing address", entry).into());
    }
    Ok((
        address.to_string(),
        DecCoin::new(&config.native_token.symbol, amount.trim()),
    ))
}

/// Build a fresh registry from the default genesis and funded accounts
pub fn build_genesis_registry(config: RegistryConfig, funds: &[String]) -> CliResult<MemRegistry> {
    let mut bank = genesis_bank(&config);
    for entry in funds {
        let (address, amount) = parse_fund(&config, entry)?;
        let coin = config.native_token.to_min_coin(&amount)?;
        bank.fund(&address, &coin)?;
    }

    let genesis = default_genesis(&config);
    let mut registry = Registry::new(MemStore::new(), bank, config);
    registry.init_genesis(&genesis)?;
    Ok(registry)
}

/// Initialize a new registry
pub fn cmd_init(
    data_dir: &Path,
    config_path: Option<&Path>,
    funds: &[String],
    force: bool,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() && !force {
        println!("⚠️  Registry already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (the current state is kept as a backup)");
        return Ok(());
    }

    let config = load_config(config_path)?;
    let native = config.native_token.clone();
    let registry = build_genesis_registry(config, funds)?;
    storage.save(&Snapshot::capture(&registry)?)?;

    println!("✅ Registry initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🪙 Native token: {} ({})", native.symbol, native.min_unit);
    println!("   💰 Funded accounts: {}", funds.len());

    Ok(())
}

/// Deliver messages as one batch and save the result
pub fn cmd_deliver(state: &mut AppState, msgs: &[Msg]) -> CliResult<()> {
    let outcomes = state.registry.deliver_batch(msgs)?;

    let mut applied = 0;
    for (msg, outcome) in msgs.iter().zip(&outcomes) {
        match outcome {
            MsgOutcome::Applied(event) => {
                applied += 1;
                println!("✅ {}", event);
            }
            MsgOutcome::Skipped { route } => {
                println!("⏭️  {} skipped (route {})", msg.type_name(), route);
            }
            MsgOutcome::Failed(e) => {
                println!("❌ {} failed: {}", msg.type_name(), e);
            }
        }
    }

    if applied > 0 {
        state.save()?;
    }
    if applied == 0 && outcomes.iter().any(|o| matches!(o, MsgOutcome::Failed(_))) {
        return Err("no message was applied".into());
    }

    Ok(())
}

/// Deliver a batch read from a JSON file
pub fn cmd_batch(state: &mut AppState, path: &Path) -> CliResult<()> {
    let msgs: Vec<Msg> = load_from_file(path)?;
    println!("📬 Delivering {} message(s) from {:?}", msgs.len(), path);
    cmd_deliver(state, &msgs)
}

/// Show one token
pub fn cmd_token(state: &AppState, denom: &str) -> CliResult<()> {
    let token = state.registry.query_token(denom)?;
    let supply = state.registry.outstanding_supply(&token);

    println!("{}", token);
    println!("  Outstanding:       {}{}", supply, token.min_unit);
    Ok(())
}

/// List tokens, optionally of one owner
pub fn cmd_tokens(state: &AppState, owner: Option<&str>) -> CliResult<()> {
    let tokens = state.registry.query_tokens(owner)?;

    if tokens.is_empty() {
        println!("🪙 No tokens found.");
        return Ok(());
    }

    println!("🪙 Tokens ({}):", tokens.len());
    for token in tokens {
        println!(
            "   {} | {} | {} | scale {} | max {} | mintable {} | owner {}",
            token.symbol,
            token.min_unit,
            token.name,
            token.scale,
            token.max_supply,
            token.mintable,
            token.owner
        );
    }
    Ok(())
}

/// Show fees for a symbol
pub fn cmd_fees(state: &AppState, symbol: &str) -> CliResult<()> {
    println!("{}", state.registry.query_fees(symbol)?);
    Ok(())
}

/// Show the params, or replace them from a JSON file
pub fn cmd_params(state: &mut AppState, set: Option<&Path>) -> CliResult<()> {
    if let Some(path) = set {
        let json = std::fs::read_to_string(path)?;
        let params = Params::from_json(&json)?;
        let version = state.registry.set_params(params)?;
        state.save()?;
        println!("✅ Params updated (version {})", version);
    }

    let versioned = state.registry.versioned_params()?;
    println!("{}", versioned.params);
    println!("  Version:           {}", versioned.version);
    Ok(())
}

/// Show balances of an account
pub fn cmd_balance(state: &AppState, address: &str) -> CliResult<()> {
    let balances = balances_of(&state.registry, address);

    if balances.is_empty() {
        println!("💰 {} holds nothing", address);
        return Ok(());
    }

    println!("💰 Balances of {}:", address);
    for coin in balances {
        // Show main units when the denom belongs to a registered token
        match state.registry.get_token(&coin.denom) {
            Ok(token) => println!("   {} ({})", coin, token.to_main_coin(&coin)?),
            Err(_) => println!("   {}", coin),
        }
    }
    Ok(())
}

/// Export the registry genesis to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    let genesis = state.registry.export_genesis()?;
    save_to_file(&genesis, path)?;
    println!("📦 Exported {} token(s) to {:?}", genesis.tokens.len(), path);
    Ok(())
}

/// Replace the registry with a genesis file, keeping balances
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let genesis: GenesisState = load_from_file(path)?;

    if let Err(e) = validate_genesis(&genesis) {
        println!("❌ Imported genesis is invalid: {}", e);
        return Ok(());
    }

    let config = state.registry.config().clone();
    let bank = state.registry.ledger().clone();
    let mut registry = Registry::new(MemStore::new(), bank, config);
    registry.init_genesis(&genesis)?;

    state.registry = registry;
    state.save()?;

    println!("📥 Imported {} token(s) from {:?}", genesis.tokens.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::BalanceLedger;
    use crate::token::{MsgIssueToken, MsgTransferTokenOwner};

    fn create_test_state(dir: &Path) -> AppState {
        cmd_init(dir, None, &["alice=100000".to_string()], false).unwrap();
        AppState::new(dir.to_path_buf(), None).unwrap()
    }

    #[test]
    fn test_parse_fund() {
        let config = RegistryConfig::default();
        let (address, coin) = parse_fund(&config, "alice = 1.5").unwrap();
        assert_eq!(address, "alice");
        assert_eq!(config.native_token.to_min_coin(&coin).unwrap().amount, 1_500_000);

        assert!(parse_fund(&config, "alice").is_err());
        assert!(parse_fund(&config, "=5").is_err());
    }

    #[test]
    fn test_init_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(dir.path());

        assert!(state.registry.has_token("stake"));
        assert_eq!(
            state.registry.ledger().balance_of("alice", "ustake"),
            100_000_000_000
        );
    }

    #[test]
    fn test_deliver_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = create_test_state(dir.path());

        let msgs = vec![
            Msg::IssueToken(MsgIssueToken::new(
                "btc",
                "satoshi",
                "Bitcoin",
                8,
                21,
                21,
                false,
                "alice",
            )),
            Msg::TransferTokenOwner(MsgTransferTokenOwner::new("alice", "bob", "btc")),
        ];
        cmd_deliver(&mut state, &msgs).unwrap();

        let reloaded = AppState::new(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(reloaded.registry.get_token("btc").unwrap().owner, "bob");
        // Issue fee of 60000 stake
        assert_eq!(
            reloaded.registry.ledger().balance_of("alice", "ustake"),
            40_000_000_000
        );
    }

    #[test]
    fn test_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = create_test_state(dir.path());
        let path = dir.path().join("genesis.json");

        cmd_export(&state, &path).unwrap();
        cmd_import(&mut state, &path).unwrap();
        assert!(state.registry.has_token("ustake"));
    }
}
