use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use ethers::{
    abi::Abi,
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes},
};
use serde::Deserialize;
use tracing::info;

use super::chain_id_from;
use crate::config::Config;

/// The parts of a compiled contract artifact needed to deploy it.
#[derive(Debug, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: Option<String>,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading contract artifact {}", path.display()))?;
        let artifact: Artifact = serde_json::from_str(&raw)
            .with_context(|| format!("parsing contract artifact {}", path.display()))?;

        if artifact.bytecode.is_empty() {
            return Err(anyhow!("artifact {} has no bytecode", path.display()));
        }

        Ok(artifact)
    }
}

/// Deploy a fresh contract instance and return its address.
pub async fn deploy(config: &Config, artifact_path: &Path) -> Result<Address> {
    let artifact = Artifact::load(artifact_path)?;

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .with_context(|| format!("invalid RPC URL {}", config.rpc_url))?;
    let chain_id = chain_id_from(provider.get_chainid().await?)?;

    let key = config
        .wallet_private_key
        .as_deref()
        .ok_or_else(|| anyhow!("WALLET_PRIVATE_KEY must be set to deploy"))?;
    let deployer = key
        .parse::<LocalWallet>()
        .context("WALLET_PRIVATE_KEY is not a valid private key")?
        .with_chain_id(chain_id);

    println!("Deploying contract with account: {:?}", deployer.address());
    info!(
        contract = artifact.contract_name.as_deref().unwrap_or("TokenizedTimeTracking"),
        chain_id,
        "deploying"
    );

    let client = Arc::new(SignerMiddleware::new(provider, deployer));
    let factory = ContractFactory::new(artifact.abi, artifact.bytecode, client);
    let contract = factory.deploy(())?.send().await?;
    let address = contract.address();

    println!("Contract deployed at address: {:?}", address);
    Ok(address)
}
