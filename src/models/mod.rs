mod project;
mod time_log;
mod payment;

pub use project::{FreelancerAssignment, Project};
pub use time_log::{NewTimeLog, TimeLog};
pub use payment::{format_ether, payment_amount};
