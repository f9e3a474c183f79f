use chrono::{DateTime, Local};
use ethers::types::{Address, U256};

#[derive(Debug, Clone, PartialEq)]
pub struct TimeLog {
    pub index: U256,
    pub freelancer: Address,
    pub project_id: U256,
    pub hours: U256,
    pub minutes: U256,
    pub description: String,
    pub timestamp: U256,
    pub paid: bool,
}

impl TimeLog {
    pub fn logged_at(&self) -> Option<DateTime<Local>> {
        if self.timestamp > U256::from(i64::MAX as u64) {
            return None;
        }
        DateTime::from_timestamp(self.timestamp.as_u64() as i64, 0).map(|utc| utc.with_timezone(&Local))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeLog {
    pub project_id: U256,
    pub hours: U256,
    pub minutes: U256,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_at(timestamp: U256) -> TimeLog {
        TimeLog {
            index: U256::zero(),
            freelancer: Address::zero(),
            project_id: U256::zero(),
            hours: U256::from(1u64),
            minutes: U256::zero(),
            description: String::new(),
            timestamp,
            paid: false,
        }
    }

    #[test]
    fn converts_block_timestamp_to_local_time() {
        let logged = log_at(U256::from(1_700_000_000u64)).logged_at().unwrap();
        assert_eq!(logged.timestamp(), 1_700_000_000);
    }

    #[test]
    fn out_of_range_timestamp_has_no_date() {
        assert!(log_at(U256::MAX).logged_at().is_none());
    }
}
