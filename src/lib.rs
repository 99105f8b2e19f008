pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod io;
pub mod review;
pub mod routes;
pub mod service;
pub mod store;
pub mod urls;
pub mod views;
