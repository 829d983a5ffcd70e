//! Gold price estimator: maps a calendar date to a model-ready feature vector
//! using a pre-computed forecast table, scales it with a fitted standard
//! scaler, and runs a pre-trained regressor to estimate the price per gram.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
