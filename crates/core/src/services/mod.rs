pub mod bundle_service;
pub mod chart_service;
pub mod document_service;
pub mod format;
pub mod metrics_service;
pub mod policy_service;
pub mod session_service;
