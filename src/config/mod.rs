use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use ethers::types::Address;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint the wallet is connected to
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Endpoint the wallet may switch to when it is on the wrong chain
    #[serde(default)]
    pub target_rpc_url: Option<String>,

    /// Chain the contract is deployed on
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Hex private key of the signing account. Without it no wallet is available.
    #[serde(default)]
    pub wallet_private_key: Option<String>,

    /// Compiled contract artifact used by `deploy`
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rpc_url() -> String {
    "https://rpc.test2.btcs.network".to_string()
}

fn default_chain_id() -> u64 {
    1114
}

fn default_contract_address() -> String {
    "0xcc6EB31d8f2027ebd24CAA5C595c1C8f386c2096".to_string()
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("artifacts/contracts/TokenizedTimeTracking.sol/TokenizedTimeTracking.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("time_tracker.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Address of the deployed time-tracking contract
    pub fn contract_address(&self) -> Result<Address> {
        Address::from_str(&self.contract_address)
            .with_context(|| format!("CONTRACT_ADDRESS {} is not a valid address", self.contract_address))
    }
}

/// A chain id in the `0x`-prefixed form wallets use for switch requests
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{:X}", chain_id)
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
