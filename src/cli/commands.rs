//! CLI commands for the multisig wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::chain::Chain;
use crate::config::WalletConfig;
use crate::crypto::{Address, KeyPair};
use crate::multisig::{Amount, MultiSigWallet, Transaction, TxId};
use crate::storage::{Storage, StorageConfig};
use crate::units::format_amount;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub wallet: MultiSigWallet,
    pub chain: Chain,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialised data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "No wallet found in {:?}. Create one with: multisig init",
                data_dir
            )
            .into());
        }

        let (wallet, chain) = storage.load()?;

        Ok(Self {
            wallet,
            chain,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.wallet, &self.chain)?;
        Ok(())
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Interpret a payload argument: `0x`-prefixed hex, otherwise UTF-8 text
pub fn parse_payload(data: Option<&str>) -> CliResult<Vec<u8>> {
    match data {
        None => Ok(Vec::new()),
        Some(text) => match text.strip_prefix("0x") {
            Some(digits) => Ok(hex::decode(digits)?),
            None => Ok(text.as_bytes().to_vec()),
        },
    }
}

fn coins(amount: Amount) -> String {
    format!("{} coins", format_amount(amount))
}

/// Create a new wallet
pub fn cmd_init(
    data_dir: &Path,
    owners: Option<&str>,
    threshold: Option<usize>,
    config_file: Option<&Path>,
    label: Option<String>,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        return Ok(());
    }

    let mut config = match (config_file, owners) {
        (Some(path), _) => WalletConfig::load(path)?,
        (None, Some(list)) => {
            let threshold = threshold.ok_or("--threshold is required with --owners")?;
            WalletConfig::from_owner_list(list, threshold, None)?
        }
        (None, None) => return Err("either --owners or --config is required".into()),
    };
    if let Some(threshold) = threshold {
        config.required_approvals = threshold;
    }
    if label.is_some() {
        config.label = label;
    }
    config.validate()?;

    let wallet = MultiSigWallet::from_config(&config)?;
    storage.save(&wallet, &Chain::new())?;

    println!("✅ Multisig wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔐 Policy: {}", wallet.description());
    if let Some(l) = wallet.label() {
        println!("   🏷️  Label: {}", l);
    }
    println!("   👥 Owners:");
    for owner in wallet.owners() {
        println!("      └─ {}", owner);
    }

    Ok(())
}

/// Generate a new account identity
pub fn cmd_account_new() -> CliResult<()> {
    let key_pair = KeyPair::generate();

    println!("🔐 New account created!");
    println!("   📍 Address: {}", key_pair.address());
    println!("   🔑 Public Key: {}", key_pair.public_key_hex());
    println!("   🗝️  Private Key: {}", key_pair.private_key_hex());
    println!("\n   ⚠️  IMPORTANT: the private key is not stored anywhere. Back it up now.");

    Ok(())
}

/// Show the address belonging to a private key
pub fn cmd_account_from_key(private_key: &str) -> CliResult<()> {
    let key_pair = KeyPair::from_private_key_hex(private_key)?;
    println!("📍 Address: {}", key_pair.address());
    Ok(())
}

/// Mint funds into an account on the local chain
pub fn cmd_fund(state: &mut AppState, address: &Address, amount: Amount) -> CliResult<()> {
    state.chain.fund(address, amount, &state.wallet)?;
    state.save()?;

    println!("🚰 Funded {} with {}", address, coins(amount));
    println!("   New balance: {}", coins(state.chain.balance_of(address)));

    Ok(())
}

/// Show an account balance
pub fn cmd_balance(state: &AppState, address: &Address) -> CliResult<()> {
    if address == state.wallet.address() {
        println!("🏦 Custodied balance: {}", coins(state.wallet.balance()));
    } else {
        println!(
            "💰 Balance for {}: {}",
            address,
            coins(state.chain.balance_of(address))
        );
    }
    Ok(())
}

/// Send funds into the wallet
pub fn cmd_deposit(
    state: &mut AppState,
    from: &Address,
    amount: Amount,
    payload: &[u8],
) -> CliResult<()> {
    let custody = *state.wallet.address();
    state
        .chain
        .send(from, &custody, amount, payload, &mut state.wallet)?;
    state.save()?;

    println!("📥 Deposited {} from {}", coins(amount), from);
    println!("   Custodied balance: {}", coins(state.wallet.balance()));

    Ok(())
}

/// Propose a transaction
pub fn cmd_submit(
    state: &mut AppState,
    from: &Address,
    to: &Address,
    amount: Amount,
    payload: Vec<u8>,
) -> CliResult<()> {
    let id = state.wallet.submit(from, *to, amount, payload)?;
    state.save()?;

    println!("📝 Transaction {} submitted", id);
    println!("   To: {}", to);
    println!("   Amount: {}", coins(amount));
    println!(
        "   Needs {} approval(s) before it can execute",
        state.wallet.required_approvals()
    );

    Ok(())
}

/// Approve a transaction
pub fn cmd_approve(state: &mut AppState, from: &Address, id: TxId) -> CliResult<()> {
    state.wallet.approve(from, id)?;
    state.save()?;

    println!("👍 {} approved transaction {}", from, id);
    print_approval_progress(&state.wallet, id);

    Ok(())
}

/// Revoke an approval
pub fn cmd_revoke(state: &mut AppState, from: &Address, id: TxId) -> CliResult<()> {
    state.wallet.revoke(from, id)?;
    state.save()?;

    println!("↩️  {} revoked approval of transaction {}", from, id);
    print_approval_progress(&state.wallet, id);

    Ok(())
}

/// Execute an approved transaction
pub fn cmd_execute(state: &mut AppState, from: &Address, id: TxId) -> CliResult<()> {
    state.wallet.execute(from, id, &mut state.chain)?;
    state.save()?;

    let tx = state.wallet.transaction(id)?;
    println!("🚀 Transaction {} executed", id);
    println!("   Sent {} to {}", coins(tx.amount()), tx.target());
    println!(
        "   Custodied balance: {}",
        coins(state.wallet.balance())
    );

    Ok(())
}

fn print_approval_progress(wallet: &MultiSigWallet, id: TxId) {
    println!(
        "   Approvals: {}/{}{}",
        wallet.approval_count(id),
        wallet.required_approvals(),
        if wallet.is_executable(id) {
            " (ready to execute)"
        } else {
            ""
        }
    );
}

/// Show a single transaction
pub fn cmd_tx(state: &AppState, id: TxId) -> CliResult<()> {
    let tx = state.wallet.transaction(id)?;

    println!("🧾 Transaction {}", id);
    println!("   ├─ Status: {:?}", tx.status());
    println!("   ├─ Target: {}", tx.target());
    println!("   ├─ Amount: {}", coins(tx.amount()));
    println!("   ├─ Payload: 0x{}", hex::encode(tx.payload()));
    println!("   ├─ Digest: {}", tx.digest());
    println!("   ├─ Submitted by: {}", tx.submitted_by());
    println!(
        "   ├─ Submitted at: {}",
        tx.submitted_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   └─ Approvals ({}/{}):",
        state.wallet.approval_count(id),
        state.wallet.required_approvals()
    );
    for owner in state.wallet.approvers(id) {
        println!("      └─ {}", owner);
    }

    Ok(())
}

/// List transactions
pub fn cmd_txs(state: &AppState, pending_only: bool) -> CliResult<()> {
    let txs: Vec<&Transaction> = if pending_only {
        state.wallet.pending_transactions().collect()
    } else {
        state.wallet.transactions().collect()
    };

    if txs.is_empty() {
        println!("📭 No transactions.");
        return Ok(());
    }

    println!("📋 Transactions:");
    for tx in txs {
        println!(
            "   #{} | {:?} | {} → {} | {}/{} approvals",
            tx.id(),
            tx.status(),
            coins(tx.amount()),
            tx.target().short(),
            state.wallet.approval_count(tx.id()),
            state.wallet.required_approvals()
        );
    }

    Ok(())
}

/// Display wallet info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let wallet = &state.wallet;
    let stats = state.storage.stats()?;

    println!("🏦 Multisig Wallet Info");
    println!("   ├─ Address: {}", wallet.address());
    if let Some(label) = wallet.label() {
        println!("   ├─ Label: {}", label);
    }
    println!("   ├─ Policy: {}", wallet.description());
    println!("   ├─ Balance: {}", coins(wallet.balance()));
    println!("   ├─ Transactions: {}", wallet.transaction_count());
    println!("   ├─ Pending: {}", wallet.pending_transactions().count());
    println!(
        "   ├─ Created: {}",
        wallet.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!("   ├─ Backups: {}", stats.backup_count);
    println!("   └─ Owners:");
    for owner in wallet.owners() {
        println!("      └─ {}", owner);
    }

    Ok(())
}

/// Show recent events
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let events = state.wallet.events();

    if events.is_empty() {
        println!("📭 No events recorded.");
        return Ok(());
    }

    println!("📜 Events (most recent last):");
    let start = events.len().saturating_sub(count);
    for event in &events[start..] {
        println!(
            "   {} | {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.kind
        );
    }

    Ok(())
}

/// Export wallet to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.wallet, path)?;
    println!("📦 Wallet exported to {:?}", path);
    Ok(())
}

/// Import wallet from file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let wallet = crate::storage::load_from_file(path)?;

    state.wallet = wallet;
    state.save()?;

    println!("📥 Wallet imported from {:?}", path);
    println!("   Address: {}", state.wallet.address());
    println!("   Transactions: {}", state.wallet.transaction_count());

    Ok(())
}

/// Roll wallet and chain back to a backup
pub fn cmd_restore(state: &mut AppState, backup: usize) -> CliResult<()> {
    let (wallet, chain) = state.storage.restore_backup(backup)?;

    state.wallet = wallet;
    state.chain = chain;
    state.save()?;

    println!("⏪ Restored backup {} from {:?}", backup, state.data_dir);
    println!("   Transactions: {}", state.wallet.transaction_count());
    println!("   Custodied balance: {}", coins(state.wallet.balance()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::parse_amount;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn init_state(temp_dir: &tempfile::TempDir) -> AppState {
        let owners = format!("{},{},{}", addr(1), addr(2), addr(3));
        cmd_init(temp_dir.path(), Some(owners.as_str()), Some(2), None, None).unwrap();
        AppState::new(temp_dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(None).unwrap(), Vec::<u8>::new());
        assert_eq!(parse_payload(Some("some data")).unwrap(), b"some data");
        assert_eq!(parse_payload(Some("0x0aff")).unwrap(), vec![0x0a, 0xff]);
        assert!(parse_payload(Some("0xzz")).is_err());
    }

    #[test]
    fn test_state_requires_init() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(AppState::new(temp_dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_init_requires_owners() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(cmd_init(temp_dir.path(), None, Some(2), None, None).is_err());

        let owners = format!("{},{}", addr(1), addr(2));
        assert!(cmd_init(temp_dir.path(), Some(owners.as_str()), None, None, None).is_err());
        assert!(cmd_init(temp_dir.path(), Some(owners.as_str()), Some(3), None, None).is_err());
    }

    #[test]
    fn test_init_from_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("deploy.json");
        WalletConfig {
            owners: vec![addr(1), addr(2)],
            required_approvals: 1,
            label: Some("Ops".to_string()),
        }
        .save(&config_path)
        .unwrap();

        let data_dir = temp_dir.path().join("data");
        cmd_init(&data_dir, None, None, Some(config_path.as_path()), None).unwrap();

        let state = AppState::new(data_dir).unwrap();
        assert_eq!(state.wallet.description(), "1-of-2");
        assert_eq!(state.wallet.label(), Some("Ops"));
    }

    #[test]
    fn test_full_flow_persists_between_commands() {
        let temp_dir = tempfile::tempdir().unwrap();
        let value = parse_amount("0.1").unwrap();

        let mut state = init_state(&temp_dir);
        cmd_fund(&mut state, &addr(1), parse_amount("1").unwrap()).unwrap();
        cmd_deposit(&mut state, &addr(1), value, &[]).unwrap();
        cmd_submit(&mut state, &addr(1), &addr(3), value, b"x".to_vec()).unwrap();
        cmd_approve(&mut state, &addr(1), 0).unwrap();
        assert!(cmd_execute(&mut state, &addr(1), 0).is_err());

        // Reload from disk between steps
        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(state.wallet.is_approved(0, &addr(1)));
        cmd_approve(&mut state, &addr(2), 0).unwrap();
        cmd_execute(&mut state, &addr(2), 0).unwrap();

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(state.wallet.transaction(0).unwrap().executed());
        assert_eq!(state.chain.balance_of(&addr(3)), value);
        assert_eq!(state.wallet.balance(), 0);
    }

    #[test]
    fn test_export_import() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut state = init_state(&temp_dir);
        cmd_submit(&mut state, &addr(2), &addr(9), 5, vec![]).unwrap();

        let export_path = temp_dir.path().join("export.json");
        cmd_export(&state, &export_path).unwrap();

        cmd_submit(&mut state, &addr(2), &addr(9), 6, vec![]).unwrap();
        assert_eq!(state.wallet.transaction_count(), 2);

        cmd_import(&mut state, &export_path).unwrap();
        assert_eq!(state.wallet.transaction_count(), 1);
    }

    #[test]
    fn test_fund_custody_address_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut state = init_state(&temp_dir);
        let custody = *state.wallet.address();

        assert!(cmd_fund(&mut state, &custody, 500).is_err());

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(state.chain.balance_of(&custody), 0);
        assert_eq!(state.wallet.balance(), 0);
    }

    #[test]
    fn test_restore_backup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut state = init_state(&temp_dir);
        cmd_fund(&mut state, &addr(1), 1_000).unwrap();
        cmd_deposit(&mut state, &addr(1), 400, &[]).unwrap();

        // Backup 0 holds the state before the deposit
        cmd_restore(&mut state, 0).unwrap();
        assert_eq!(state.wallet.balance(), 0);
        assert_eq!(state.chain.balance_of(&addr(1)), 1_000);

        let state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(state.wallet.balance(), 0);
        assert_eq!(state.chain.balance_of(&addr(1)), 1_000);

        let mut state = state;
        assert!(cmd_restore(&mut state, 4).is_err());
    }
}
