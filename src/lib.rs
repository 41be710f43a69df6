//! users-api - A small REST API over an in-memory collection of users

pub mod cli;
pub mod http_server;
pub mod users;
