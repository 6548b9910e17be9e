#[macro_use]
extern crate log;

pub mod connection;
pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod rpc;
pub mod storage;
pub mod types;

pub use banksim_types;
pub use connection::BankrunConnection;
pub use context::BanksimContext;
pub use engine::{BanksEngine, EngineLocker, LiteSvmEngine};
pub use error::{BanksimError, BanksimResult};
pub use jsonrpc_core;
pub use litesvm;
pub use rpc::LedgerConnection;

#[cfg(test)]
mod tests;
