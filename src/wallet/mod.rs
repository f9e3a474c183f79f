use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::Address,
};
use tracing::{info, warn};

use crate::config::{Config, chain_id_hex};
use crate::contract::{self, ChainContract, TimeTrackingContract};
use crate::error::{DashboardError, Result};

/// Account access and network selection, the way a browser wallet exposes them.
#[async_trait]
pub trait WalletProvider: Send {
    type Contract: TimeTrackingContract;

    /// Whether a wallet is present at all.
    fn is_available(&self) -> bool;

    /// The account the user authorized, or `AuthorizationDeclined`.
    async fn request_accounts(&mut self) -> Result<Address>;

    async fn chain_id(&self) -> Result<u64>;

    /// Ask the wallet to move to `chain_id`. A refusal is `WrongNetwork`.
    async fn switch_chain(&mut self, chain_id: u64) -> Result<()>;

    /// Contract handle at `address` that signs with the authorized account for `chain_id`.
    fn contract_at(&self, address: Address, chain_id: u64) -> Result<Self::Contract>;
}

/// Wallet backed by a private key from the environment.
///
/// Access to the account is only granted after [`LocalKeyWallet::authorize`].
pub struct LocalKeyWallet {
    signer: Option<LocalWallet>,
    provider: Provider<Http>,
    endpoints: HashMap<u64, String>,
    authorized: bool,
}

impl LocalKeyWallet {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let signer = match config.wallet_private_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(key.trim().parse::<LocalWallet>()?),
            _ => None,
        };

        let mut endpoints = HashMap::new();
        if let Some(url) = &config.target_rpc_url {
            endpoints.insert(config.chain_id, url.clone());
        }

        Ok(Self {
            signer,
            provider: Provider::<Http>::try_from(config.rpc_url.as_str())?,
            endpoints,
            authorized: false,
        })
    }

    /// The account that would be exposed on authorization.
    pub fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    pub fn authorize(&mut self) {
        self.authorized = true;
    }

    pub fn revoke(&mut self) {
        self.authorized = false;
    }
}

#[async_trait]
impl WalletProvider for LocalKeyWallet {
    type Contract = ChainContract;

    fn is_available(&self) -> bool {
        self.signer.is_some()
    }

    async fn request_accounts(&mut self) -> Result<Address> {
        let signer = self.signer.as_ref().ok_or(DashboardError::WalletNotDetected)?;
        if !self.authorized {
            return Err(DashboardError::AuthorizationDeclined);
        }
        Ok(signer.address())
    }

    async fn chain_id(&self) -> Result<u64> {
        contract::chain_id(&self.provider).await
    }

    async fn switch_chain(&mut self, chain_id: u64) -> Result<()> {
        let current = self.chain_id().await?;
        let rejected = DashboardError::WrongNetwork {
            expected: chain_id,
            actual: current,
        };

        let Some(url) = self.endpoints.get(&chain_id) else {
            warn!(chain = %chain_id_hex(chain_id), "no endpoint known for requested chain");
            return Err(rejected);
        };

        let provider = Provider::<Http>::try_from(url.as_str()).map_err(DashboardError::remote)?;
        if contract::chain_id(&provider).await? != chain_id {
            warn!(chain = %chain_id_hex(chain_id), %url, "endpoint serves a different chain");
            return Err(rejected);
        }

        info!(chain = %chain_id_hex(chain_id), %url, "switched network");
        self.provider = provider;
        Ok(())
    }

    fn contract_at(&self, address: Address, chain_id: u64) -> Result<ChainContract> {
        let signer = self.signer.clone().ok_or(DashboardError::WalletNotDetected)?;
        if !self.authorized {
            return Err(DashboardError::AuthorizationDeclined);
        }

        let client = SignerMiddleware::new(self.provider.clone(), signer.with_chain_id(chain_id));
        Ok(ChainContract::new(address, Arc::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat's first default account.
    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config(key: Option<&str>) -> Config {
        let mut vars = vec![("RPC_URL".to_string(), "http://127.0.0.1:8545".to_string())];
        if let Some(key) = key {
            vars.push(("WALLET_PRIVATE_KEY".to_string(), key.to_string()));
        }
        envy::from_iter(vars).unwrap()
    }

    #[tokio::test]
    async fn missing_key_means_no_wallet() {
        let mut wallet = LocalKeyWallet::from_config(&config(None)).unwrap();

        assert!(!wallet.is_available());
        assert!(matches!(wallet.request_accounts().await, Err(DashboardError::WalletNotDetected)));
    }

    #[tokio::test]
    async fn account_requires_authorization() {
        let mut wallet = LocalKeyWallet::from_config(&config(Some(KEY))).unwrap();
        assert!(wallet.is_available());
        assert!(matches!(wallet.request_accounts().await, Err(DashboardError::AuthorizationDeclined)));

        wallet.authorize();
        let account = wallet.request_accounts().await.unwrap();
        assert_eq!(Some(account), wallet.account());
        assert_eq!(
            format!("{:?}", account),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        wallet.revoke();
        assert!(wallet.contract_at(Address::zero(), 1114).is_err());
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(LocalKeyWallet::from_config(&config(Some("zz"))).is_err());
    }
}
