//! In-memory stand-ins for the wallet and the deployed contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use crate::contract::TimeTrackingContract;
use crate::error::{DashboardError, Result};
use crate::models::{FreelancerAssignment, NewTimeLog, Project, TimeLog, payment_amount};
use crate::wallet::WalletProvider;

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

#[derive(Default)]
struct Ledger {
    projects: Vec<Project>,
    freelancers: Vec<FreelancerAssignment>,
    logs: HashMap<Address, Vec<TimeLog>>,
    clock: u64,
    tx_count: u64,
    fail_reads: bool,
    fail_reads_after_tx: bool,
    reverts: Option<String>,
}

impl Ledger {
    fn next_tx(&mut self) -> Result<TxHash> {
        if let Some(reason) = self.reverts.take() {
            return Err(DashboardError::RemoteCall(format!("execution reverted: {}", reason)));
        }
        self.tx_count += 1;
        self.clock += 60;
        if self.fail_reads_after_tx {
            self.fail_reads = true;
        }
        Ok(TxHash::from_low_u64_be(self.tx_count))
    }

    fn read(&self) -> Result<()> {
        if self.fail_reads {
            return Err(DashboardError::RemoteCall("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Contract double that mirrors the deployed contract's bookkeeping.
///
/// Handles cloned from one another share state; each signs as its own account.
#[derive(Clone)]
pub struct MockContract {
    sender: Address,
    ledger: Arc<Mutex<Ledger>>,
    reads: Arc<AtomicUsize>,
}

impl MockContract {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            ledger: Arc::new(Mutex::new(Ledger {
                clock: 1_700_000_000,
                ..Ledger::default()
            })),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Another handle on the same contract signing as `sender`.
    pub fn as_account(&self, sender: Address) -> Self {
        Self {
            sender,
            ledger: Arc::clone(&self.ledger),
            reads: Arc::clone(&self.reads),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.ledger.lock().unwrap().fail_reads = fail;
    }

    /// Let the next transaction through, then fail every read.
    pub fn fail_reads_after_next_tx(&self) {
        self.ledger.lock().unwrap().fail_reads_after_tx = true;
    }

    pub fn revert_next(&self, reason: &str) {
        self.ledger.lock().unwrap().reverts = Some(reason.to_string());
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn transactions(&self) -> u64 {
        self.ledger.lock().unwrap().tx_count
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeTrackingContract for MockContract {
    async fn create_project(&self, name: &str, hourly_rate: U256) -> Result<TxHash> {
        let mut ledger = self.ledger.lock().unwrap();
        let tx = ledger.next_tx()?;
        let id = U256::from(ledger.projects.len());
        ledger.projects.push(Project {
            id,
            name: name.to_string(),
            hourly_rate,
            owner: self.sender,
        });
        Ok(tx)
    }

    async fn add_freelancer(&self, assignment: &FreelancerAssignment) -> Result<TxHash> {
        let mut ledger = self.ledger.lock().unwrap();
        let owner = ledger
            .projects
            .get(assignment.project_id.as_usize())
            .map(|p| p.owner)
            .ok_or_else(|| DashboardError::remote("execution reverted: project does not exist"))?;
        if owner != self.sender {
            return Err(DashboardError::remote("execution reverted: not project owner"));
        }
        let tx = ledger.next_tx()?;
        ledger.freelancers.push(assignment.clone());
        Ok(tx)
    }

    async fn log_time(&self, entry: &NewTimeLog) -> Result<TxHash> {
        let mut ledger = self.ledger.lock().unwrap();
        let assigned = ledger
            .freelancers
            .iter()
            .any(|a| a.project_id == entry.project_id && a.freelancer == self.sender);
        if !assigned {
            return Err(DashboardError::remote("execution reverted: not a freelancer on this project"));
        }
        let tx = ledger.next_tx()?;
        let timestamp = U256::from(ledger.clock);
        let logs = ledger.logs.entry(self.sender).or_default();
        logs.push(TimeLog {
            index: U256::from(logs.len()),
            freelancer: self.sender,
            project_id: entry.project_id,
            hours: entry.hours,
            minutes: entry.minutes,
            description: entry.description.clone(),
            timestamp,
            paid: false,
        });
        Ok(tx)
    }

    async fn pay_freelancer(&self, freelancer: Address, log_index: U256, value: U256) -> Result<TxHash> {
        let mut ledger = self.ledger.lock().unwrap();
        let log = ledger
            .logs
            .get(&freelancer)
            .and_then(|logs| logs.get(log_index.as_usize()))
            .cloned()
            .ok_or_else(|| DashboardError::remote("execution reverted: invalid log index"))?;
        let project = ledger.projects[log.project_id.as_usize()].clone();
        if project.owner != self.sender {
            return Err(DashboardError::remote("execution reverted: not project owner"));
        }
        if log.paid {
            return Err(DashboardError::remote("execution reverted: already paid"));
        }
        if value != payment_amount(project.hourly_rate, log.hours, log.minutes)? {
            return Err(DashboardError::remote("execution reverted: incorrect payment amount"));
        }
        let tx = ledger.next_tx()?;
        if let Some(entry) = ledger
            .logs
            .get_mut(&freelancer)
            .and_then(|logs| logs.get_mut(log_index.as_usize()))
        {
            entry.paid = true;
        }
        Ok(tx)
    }

    async fn get_time_log(&self, freelancer: Address, index: U256) -> Result<TimeLog> {
        self.count_read();
        let ledger = self.ledger.lock().unwrap();
        ledger.read()?;
        ledger
            .logs
            .get(&freelancer)
            .and_then(|logs| logs.get(index.as_usize()))
            .cloned()
            .ok_or_else(|| DashboardError::remote("execution reverted: invalid log index"))
    }

    async fn get_time_log_count(&self, freelancer: Address) -> Result<U256> {
        self.count_read();
        let ledger = self.ledger.lock().unwrap();
        ledger.read()?;
        Ok(U256::from(ledger.logs.get(&freelancer).map_or(0, Vec::len)))
    }

    async fn project(&self, id: U256) -> Result<Project> {
        self.count_read();
        let ledger = self.ledger.lock().unwrap();
        ledger.read()?;
        ledger
            .projects
            .get(id.as_usize())
            .cloned()
            .ok_or_else(|| DashboardError::remote("execution reverted: invalid project id"))
    }

    async fn project_count(&self) -> Result<U256> {
        self.count_read();
        let ledger = self.ledger.lock().unwrap();
        ledger.read()?;
        Ok(U256::from(ledger.projects.len()))
    }
}

/// Scripted wallet: fixed account and chain, with switches and authorization toggled per test.
pub struct MockWallet {
    account: Option<Address>,
    chain_id: u64,
    approves: bool,
    allows_switch: bool,
    switches: Vec<u64>,
    built: AtomicUsize,
    contract: Option<MockContract>,
}

impl MockWallet {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self {
            account: Some(account),
            chain_id,
            approves: true,
            allows_switch: false,
            switches: Vec::new(),
            built: AtomicUsize::new(0),
            contract: None,
        }
    }

    pub fn absent() -> Self {
        Self {
            account: None,
            ..Self::new(Address::zero(), 0)
        }
    }

    pub fn declining(mut self) -> Self {
        self.approves = false;
        self
    }

    pub fn allowing_switch(mut self) -> Self {
        self.allows_switch = true;
        self
    }

    /// Hand out handles on `contract` instead of fresh ones.
    pub fn with_contract(mut self, contract: MockContract) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn contracts_built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub fn switch_requests(&self) -> Vec<u64> {
        self.switches.clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    type Contract = MockContract;

    fn is_available(&self) -> bool {
        self.account.is_some()
    }

    async fn request_accounts(&mut self) -> Result<Address> {
        let account = self.account.ok_or(DashboardError::WalletNotDetected)?;
        if !self.approves {
            return Err(DashboardError::AuthorizationDeclined);
        }
        Ok(account)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn switch_chain(&mut self, chain_id: u64) -> Result<()> {
        self.switches.push(chain_id);
        if !self.allows_switch {
            return Err(DashboardError::WrongNetwork {
                expected: chain_id,
                actual: self.chain_id,
            });
        }
        self.chain_id = chain_id;
        Ok(())
    }

    fn contract_at(&self, _address: Address, _chain_id: u64) -> Result<MockContract> {
        let account = self.account.ok_or(DashboardError::WalletNotDetected)?;
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.contract {
            Some(contract) => contract.as_account(account),
            None => MockContract::new(account),
        })
    }
}
