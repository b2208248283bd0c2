pub mod registry;
pub mod traits;

pub mod functions;
pub mod http;
pub mod postgrest;
