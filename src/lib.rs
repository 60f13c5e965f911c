//! Mobbex Relay - webhook reconciliation service for the Mobbex payment gateway.
//!
//! This library provides the core functionality for the relay: payload
//! normalization, token authentication, append-only transaction storage,
//! idempotent order mutation, and the outbound Mobbex API client.

pub mod config;
pub mod db;
pub mod error;
pub mod forwarder;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod plans;
pub mod token;
pub mod webhook;
