use ethers::types::TxHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No wallet detected. Set WALLET_PRIVATE_KEY to connect")]
    WalletNotDetected,

    #[error("Wallet authorization was declined")]
    AuthorizationDeclined,

    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}. Switch network manually")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Contract call failed: {0}")]
    RemoteCall(String),

    #[error("Transaction {0:?} was dropped before it was mined")]
    TransactionDropped(TxHash),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payment amount does not fit in 256 bits")]
    PaymentOverflow,
}

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl DashboardError {
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::RemoteCall(_) | DashboardError::TransactionDropped(_) => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn remote(err: impl std::fmt::Display) -> Self {
        DashboardError::RemoteCall(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_are_errors_everything_else_warns() {
        assert_eq!(DashboardError::remote("reverted").severity(), Severity::Error);
        assert_eq!(DashboardError::AuthorizationDeclined.severity(), Severity::Warning);
        assert_eq!(
            DashboardError::WrongNetwork { expected: 1114, actual: 1 }.severity(),
            Severity::Warning
        );
    }

    #[test]
    fn missing_field_names_the_field() {
        assert_eq!(DashboardError::MissingField("Project name").to_string(), "Project name is required");
    }
}
