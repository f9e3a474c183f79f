use ethers::{types::U256, utils::format_units};

use crate::error::{DashboardError, Result};

/// Wei owed for a time log: `hourly_rate * (hours * 60 + minutes) / 60`.
///
/// Integer division truncates the same way the contract's own accounting does,
/// so the attached value matches what `payFreelancer` checks.
pub fn payment_amount(hourly_rate: U256, hours: U256, minutes: U256) -> Result<U256> {
    let minutes_per_hour = U256::from(60u64);
    let total_minutes = hours
        .checked_mul(minutes_per_hour)
        .and_then(|h| h.checked_add(minutes))
        .ok_or(DashboardError::PaymentOverflow)?;

    let scaled = hourly_rate
        .checked_mul(total_minutes)
        .ok_or(DashboardError::PaymentOverflow)?;

    Ok(scaled / minutes_per_hour)
}

/// Render a wei amount in ether without trailing zeros.
pub fn format_ether(amount: U256) -> String {
    let formatted = match format_units(amount, "ether") {
        Ok(formatted) => formatted,
        Err(_) => return format!("{} wei", amount),
    };
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}
