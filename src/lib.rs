pub mod app;
pub mod errors;
pub mod logging;
pub mod models;
pub mod secrets;
pub mod services;
pub mod state;

mod routes;
