#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, authentication mechanisms, routing"]
#![doc = "configuration, database bootstrap, and error handling for the taskdeck"]
#![doc = "application. It is used by the main binary (`main.rs`) to construct and"]
#![doc = "run the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
