use ethers::types::{Address, TxHash, U256};
use tracing::{info, instrument, warn};

use crate::contract::TimeTrackingContract;
use crate::error::{DashboardError, Result};
use crate::models::{FreelancerAssignment, NewTimeLog, Project, TimeLog, payment_amount};
use crate::session::{self, NetworkTarget};
use crate::wallet::WalletProvider;

/// A confirmed payment and the amount that was attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub tx_hash: TxHash,
    pub amount: U256,
}

/// A mined transaction, with the error from the list reload that followed it.
///
/// The transaction stands even when the reload fails; lists then keep their
/// previous contents.
#[derive(Debug)]
pub struct Confirmed<T> {
    pub value: T,
    pub refresh_error: Option<DashboardError>,
}

impl<T> Confirmed<T> {
    fn after_refresh(value: T, refresh: Result<()>) -> Self {
        let refresh_error = refresh.err();
        if let Some(err) = &refresh_error {
            warn!(%err, "transaction mined but lists were not reloaded");
        }
        Self { value, refresh_error }
    }
}

/// Connection state and the lists mirrored from the contract.
pub struct Dashboard<C> {
    target: NetworkTarget,
    account: Option<Address>,
    contract: Option<C>,
    network_correct: bool,
    projects: Vec<Project>,
    time_logs: Vec<TimeLog>,
}

impl<C: TimeTrackingContract> Dashboard<C> {
    pub fn new(target: NetworkTarget) -> Self {
        Self {
            target,
            account: None,
            contract: None,
            network_correct: true,
            projects: Vec::new(),
            time_logs: Vec::new(),
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some() && self.contract.is_some()
    }

    pub fn network_correct(&self) -> bool {
        self.network_correct
    }

    pub fn target(&self) -> &NetworkTarget {
        &self.target
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn time_logs(&self) -> &[TimeLog] {
        &self.time_logs
    }

    fn connected(&self) -> Result<(&C, Address)> {
        match (&self.contract, self.account) {
            (Some(contract), Some(account)) => Ok((contract, account)),
            _ => Err(DashboardError::NotConnected),
        }
    }

    /// Run the wallet handshake and, on success, load both lists.
    ///
    /// State is only touched once a contract handle exists, except for the
    /// network flag which reflects the last check.
    pub async fn connect<W>(&mut self, wallet: &mut W) -> Result<()>
    where
        W: WalletProvider<Contract = C>,
    {
        match session::connect(wallet, &self.target).await {
            Ok(session) => {
                self.network_correct = true;
                self.account = Some(session.account);
                self.contract = Some(session.contract);
                self.projects.clear();
                self.time_logs.clear();
            }
            Err(failure) => {
                if failure.network_checked {
                    self.network_correct = failure.network_correct;
                }
                warn!(error = %failure.error, "wallet connection failed");
                return Err(failure.error);
            }
        }

        self.refresh().await
    }

    /// Reload both lists; the first failure stops the refresh.
    pub async fn refresh(&mut self) -> Result<()> {
        self.fetch_logs().await?;
        self.fetch_projects().await
    }

    /// Replace the time logs with every log recorded for the connected account.
    #[instrument(skip(self))]
    pub async fn fetch_logs(&mut self) -> Result<()> {
        let (contract, account) = self.connected()?;

        let count = contract.get_time_log_count(account).await?;
        let mut logs = Vec::new();
        let mut index = U256::zero();
        while index < count {
            logs.push(contract.get_time_log(account, index).await?);
            index += U256::one();
        }

        info!(count = logs.len(), "time logs loaded");
        self.time_logs = logs;
        Ok(())
    }

    /// Replace the project list with the projects owned by the connected account.
    #[instrument(skip(self))]
    pub async fn fetch_projects(&mut self) -> Result<()> {
        let (contract, account) = self.connected()?;

        let count = contract.project_count().await?;
        let mut owned = Vec::new();
        let mut id = U256::zero();
        while id < count {
            let project = contract.project(id).await?;
            if project.is_owned_by(&account) {
                owned.push(project);
            }
            id += U256::one();
        }

        info!(total = %count, owned = owned.len(), "projects loaded");
        self.projects = owned;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_project(&mut self, name: &str, hourly_rate: U256) -> Result<Confirmed<TxHash>> {
        let (contract, _) = self.connected()?;
        if name.trim().is_empty() {
            return Err(DashboardError::MissingField("Project name"));
        }

        let tx_hash = contract.create_project(name, hourly_rate).await?;
        info!(?tx_hash, "project created");

        let refresh = self.fetch_projects().await;
        Ok(Confirmed::after_refresh(tx_hash, refresh))
    }

    #[instrument(skip(self))]
    pub async fn add_freelancer(&mut self, assignment: &FreelancerAssignment) -> Result<TxHash> {
        let (contract, _) = self.connected()?;

        let tx_hash = contract.add_freelancer(assignment).await?;
        info!(?tx_hash, "freelancer added");
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    pub async fn log_time(&mut self, entry: &NewTimeLog) -> Result<Confirmed<TxHash>> {
        let (contract, _) = self.connected()?;

        let tx_hash = contract.log_time(entry).await?;
        info!(?tx_hash, "time logged");

        let refresh = self.fetch_logs().await;
        Ok(Confirmed::after_refresh(tx_hash, refresh))
    }

    /// Pay a freelancer for one of their time logs.
    ///
    /// The amount is derived from the log and its project as read from the
    /// contract at call time, never from the local lists.
    #[instrument(skip(self))]
    pub async fn pay_freelancer(&mut self, freelancer: Address, log_index: U256) -> Result<Confirmed<Payment>> {
        let (contract, _) = self.connected()?;

        let log = contract.get_time_log(freelancer, log_index).await?;
        let project = contract.project(log.project_id).await?;
        let amount = payment_amount(project.hourly_rate, log.hours, log.minutes)?;

        let tx_hash = contract.pay_freelancer(freelancer, log_index, amount).await?;
        info!(?tx_hash, %amount, "freelancer paid");

        let refresh = self.fetch_logs().await;
        Ok(Confirmed::after_refresh(Payment { tx_hash, amount }, refresh))
    }
}
