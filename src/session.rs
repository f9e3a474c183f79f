use ethers::types::Address;
use tracing::{info, warn};

use crate::config::chain_id_hex;
use crate::error::{DashboardError, Result};
use crate::wallet::WalletProvider;

/// Where the dashboard expects the contract to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTarget {
    pub chain_id: u64,
    pub contract: Address,
}

/// An authorized account on the expected chain, with a contract handle signing for it.
pub struct Session<C> {
    pub account: Address,
    pub chain_id: u64,
    pub contract: C,
}

/// Progress of a failed connect attempt, kept so the UI can flag the network.
#[derive(Debug)]
pub struct ConnectFailure {
    pub error: DashboardError,
    pub network_checked: bool,
    pub network_correct: bool,
}

impl From<DashboardError> for ConnectFailure {
    fn from(error: DashboardError) -> Self {
        Self {
            error,
            network_checked: false,
            network_correct: true,
        }
    }
}

pub async fn connect<W: WalletProvider>(
    wallet: &mut W,
    target: &NetworkTarget,
) -> std::result::Result<Session<W::Contract>, ConnectFailure> {
    if !wallet.is_available() {
        return Err(DashboardError::WalletNotDetected.into());
    }

    let account = wallet.request_accounts().await?;
    info!(?account, "wallet authorized");

    let chain_id = wallet.chain_id().await?;
    if chain_id != target.chain_id {
        warn!(
            current = %chain_id_hex(chain_id),
            expected = %chain_id_hex(target.chain_id),
            "wallet on wrong network, requesting switch"
        );
        ensure_switched(wallet, target, chain_id).await.map_err(|error| ConnectFailure {
            error,
            network_checked: true,
            network_correct: false,
        })?;
    }

    let contract = wallet.contract_at(target.contract, target.chain_id)?;
    info!(?account, contract = ?target.contract, "contract handle ready");

    Ok(Session {
        account,
        chain_id: target.chain_id,
        contract,
    })
}

async fn ensure_switched<W: WalletProvider>(wallet: &mut W, target: &NetworkTarget, actual: u64) -> Result<()> {
    let rejected = DashboardError::WrongNetwork {
        expected: target.chain_id,
        actual,
    };

    match wallet.switch_chain(target.chain_id).await {
        Ok(()) => {}
        Err(DashboardError::WrongNetwork { .. }) => return Err(rejected),
        Err(err) => return Err(err),
    }

    // Wallets can acknowledge a switch without moving.
    if wallet.chain_id().await? != target.chain_id {
        return Err(rejected);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockWallet, account};

    fn target() -> NetworkTarget {
        NetworkTarget {
            chain_id: 1114,
            contract: account(0xcc),
        }
    }

    #[tokio::test]
    async fn connects_on_expected_chain() {
        let mut wallet = MockWallet::new(account(1), 1114);

        let session = connect(&mut wallet, &target()).await.unwrap();

        assert_eq!(session.account, account(1));
        assert_eq!(session.chain_id, 1114);
        assert_eq!(wallet.contracts_built(), 1);
    }

    #[tokio::test]
    async fn absent_wallet_builds_nothing() {
        let mut wallet = MockWallet::absent();

        let failure = connect(&mut wallet, &target()).await.err().unwrap();

        assert!(matches!(failure.error, DashboardError::WalletNotDetected));
        assert_eq!(wallet.contracts_built(), 0);
    }

    #[tokio::test]
    async fn declined_authorization_builds_nothing() {
        let mut wallet = MockWallet::new(account(1), 1114).declining();

        let failure = connect(&mut wallet, &target()).await.err().unwrap();

        assert!(matches!(failure.error, DashboardError::AuthorizationDeclined));
        assert!(!failure.network_checked);
        assert_eq!(wallet.contracts_built(), 0);
    }

    #[tokio::test]
    async fn switches_network_when_allowed() {
        let mut wallet = MockWallet::new(account(1), 1).allowing_switch();

        let session = connect(&mut wallet, &target()).await.unwrap();

        assert_eq!(session.chain_id, 1114);
        assert_eq!(wallet.switch_requests(), vec![1114]);
    }

    #[tokio::test]
    async fn rejected_switch_aborts() {
        let mut wallet = MockWallet::new(account(1), 1);

        let failure = connect(&mut wallet, &target()).await.err().unwrap();

        assert!(matches!(
            failure.error,
            DashboardError::WrongNetwork { expected: 1114, actual: 1 }
        ));
        assert!(failure.network_checked);
        assert!(!failure.network_correct);
        assert_eq!(wallet.contracts_built(), 0);
    }
}
