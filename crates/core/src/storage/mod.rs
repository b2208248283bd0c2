pub mod encryption;
pub mod format;
pub mod kv;
pub mod manager;
