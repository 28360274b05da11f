pub mod aggregate;
pub mod allegation;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod disposition;
pub mod engine;
pub mod error;
pub mod features;
pub mod folds;
pub mod lawsuit;
pub mod manifest;
pub mod observation;
pub mod outcomes;
pub mod panel;
pub mod rng;
pub mod schema;
pub mod store;
pub mod types;
pub mod window;
