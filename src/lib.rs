pub mod authorizer;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod stack;
pub mod state;
pub mod user;
