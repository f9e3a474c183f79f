pub mod components;
pub mod connect;
pub mod projects;
pub mod time_logs;
pub mod action_wizard;
