use ethers::types::{Address, U256};

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: U256,
    pub name: String,
    pub hourly_rate: U256,
    pub owner: Address,
}

impl Project {
    /// Addresses compare as bytes, so hex letter case never matters here.
    pub fn is_owned_by(&self, account: &Address) -> bool {
        self.owner == *account
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreelancerAssignment {
    pub project_id: U256,
    pub freelancer: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ownership_ignores_address_case() {
        let lower = Address::from_str("0xcc6eb31d8f2027ebd24caa5c595c1c8f386c2096").unwrap();
        let upper = Address::from_str("0xCC6EB31D8F2027EBD24CAA5C595C1C8F386C2096").unwrap();
        let project = Project {
            id: U256::zero(),
            name: "Website".to_string(),
            hourly_rate: U256::from(3600u64),
            owner: upper,
        };

        assert!(project.is_owned_by(&lower));
        assert!(!project.is_owned_by(&Address::zero()));
    }
}
