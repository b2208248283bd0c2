pub mod chart;
pub mod customer;
pub mod dashboard;
pub mod document;
pub mod investment;
pub mod metrics;
pub mod policy;
pub mod raw;
pub mod session;
pub mod settings;
