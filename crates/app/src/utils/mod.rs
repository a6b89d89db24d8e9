//! Utilities for the application context

pub mod health;
