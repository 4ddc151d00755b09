pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod output;
pub mod password;
pub mod vault;
