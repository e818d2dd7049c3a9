pub mod config;
pub mod logging;

pub mod control;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod item;
pub mod layout;
pub mod ledger;
pub mod lookups;
pub mod retry;
pub mod source;
pub mod storage;
pub mod url_model;
pub mod worker;
