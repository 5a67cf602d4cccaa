//! Web layer: request handlers behind the router

pub mod handlers;
