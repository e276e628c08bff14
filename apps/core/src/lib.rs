pub mod activation;
pub mod aggregator;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod discovery;
pub mod history;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod runtime;
pub mod search;
pub mod transport;
