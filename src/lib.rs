pub mod analyzers;
pub mod charts;
pub mod config;
pub mod error;
pub mod loaders;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod reconcile;
pub mod records;
pub mod session;
pub mod views;
