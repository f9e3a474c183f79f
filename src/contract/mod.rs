pub mod deploy;

use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    contract::{ContractCall, abigen},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{Address, TxHash, U256},
};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::models::{FreelancerAssignment, NewTimeLog, Project, TimeLog};

abigen!(
    TokenizedTimeTracking,
    r#"[
        function createProject(string name, uint256 hourlyRate) external
        function addFreelancer(uint256 projectId, address freelancer) external
        function logTime(uint256 projectId, uint256 hours, uint256 minutes, string description) external
        function payFreelancer(address freelancer, uint256 logIndex) external payable
        function getTimeLog(address freelancer, uint256 index) external view returns (uint256 projectId, uint256 hours, uint256 minutes, string description, uint256 timestamp, bool paid)
        function getTimeLogCount(address freelancer) external view returns (uint256)
        function projects(uint256 index) external view returns (string name, uint256 hourlyRate, address owner)
        function projectCount() external view returns (uint256)
    ]"#
);

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Calls exposed by the deployed time-tracking contract.
///
/// Write calls resolve once the transaction is mined and return its hash.
#[async_trait]
pub trait TimeTrackingContract: Send + Sync {
    async fn create_project(&self, name: &str, hourly_rate: U256) -> Result<TxHash>;
    async fn add_freelancer(&self, assignment: &FreelancerAssignment) -> Result<TxHash>;
    async fn log_time(&self, entry: &NewTimeLog) -> Result<TxHash>;
    async fn pay_freelancer(&self, freelancer: Address, log_index: U256, value: U256) -> Result<TxHash>;

    async fn get_time_log(&self, freelancer: Address, index: U256) -> Result<TimeLog>;
    async fn get_time_log_count(&self, freelancer: Address) -> Result<U256>;
    async fn project(&self, id: U256) -> Result<Project>;
    async fn project_count(&self) -> Result<U256>;
}

/// Contract handle bound to a signer and a JSON-RPC provider.
pub struct ChainContract {
    inner: TokenizedTimeTracking<SignerClient>,
}

impl ChainContract {
    pub fn new(address: Address, client: Arc<SignerClient>) -> Self {
        Self {
            inner: TokenizedTimeTracking::new(address, client),
        }
    }
}

// Sends the call and waits for its receipt.
async fn submit<D>(call: ContractCall<SignerClient, D>) -> Result<TxHash>
where
    D: ethers::abi::Detokenize,
{
    let pending = call.send().await.map_err(DashboardError::remote)?;
    let tx_hash = *pending;
    debug!(?tx_hash, "transaction submitted, waiting for receipt");

    let receipt = pending
        .await
        .map_err(DashboardError::remote)?
        .ok_or(DashboardError::TransactionDropped(tx_hash))?;

    info!(tx_hash = ?receipt.transaction_hash, block = ?receipt.block_number, "transaction mined");
    Ok(receipt.transaction_hash)
}

#[async_trait]
impl TimeTrackingContract for ChainContract {
    async fn create_project(&self, name: &str, hourly_rate: U256) -> Result<TxHash> {
        submit(self.inner.create_project(name.to_string(), hourly_rate)).await
    }

    async fn add_freelancer(&self, assignment: &FreelancerAssignment) -> Result<TxHash> {
        submit(self.inner.add_freelancer(assignment.project_id, assignment.freelancer)).await
    }

    async fn log_time(&self, entry: &NewTimeLog) -> Result<TxHash> {
        submit(self.inner.log_time(
            entry.project_id,
            entry.hours,
            entry.minutes,
            entry.description.clone(),
        ))
        .await
    }

    async fn pay_freelancer(&self, freelancer: Address, log_index: U256, value: U256) -> Result<TxHash> {
        submit(self.inner.pay_freelancer(freelancer, log_index).value(value)).await
    }

    async fn get_time_log(&self, freelancer: Address, index: U256) -> Result<TimeLog> {
        let (project_id, hours, minutes, description, timestamp, paid) = self
            .inner
            .get_time_log(freelancer, index)
            .call()
            .await
            .map_err(DashboardError::remote)?;

        Ok(TimeLog {
            index,
            freelancer,
            project_id,
            hours,
            minutes,
            description,
            timestamp,
            paid,
        })
    }

    async fn get_time_log_count(&self, freelancer: Address) -> Result<U256> {
        self.inner
            .get_time_log_count(freelancer)
            .call()
            .await
            .map_err(DashboardError::remote)
    }

    async fn project(&self, id: U256) -> Result<Project> {
        let (name, hourly_rate, owner) = self
            .inner
            .projects(id)
            .call()
            .await
            .map_err(DashboardError::remote)?;

        Ok(Project {
            id,
            name,
            hourly_rate,
            owner,
        })
    }

    async fn project_count(&self) -> Result<U256> {
        self.inner
            .project_count()
            .call()
            .await
            .map_err(DashboardError::remote)
    }
}

/// Chain id reported by the endpoint behind `provider`.
pub async fn chain_id(provider: &Provider<Http>) -> Result<u64> {
    let id = provider.get_chainid().await.map_err(DashboardError::remote)?;
    chain_id_from(id)
}

/// Narrow a reported chain id; ids past 64 bits are rejected rather than truncated.
pub fn chain_id_from(id: U256) -> Result<u64> {
    u64::try_from(id).map_err(|e| DashboardError::remote(format!("chain id {} does not fit in 64 bits: {}", id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_fits_or_is_a_remote_error() {
        assert_eq!(chain_id_from(U256::from(1114u64)).unwrap(), 1114);

        let err = chain_id_from(U256::from(u64::MAX) + 1).unwrap_err();
        assert!(matches!(err, DashboardError::RemoteCall(_)));
    }
}
