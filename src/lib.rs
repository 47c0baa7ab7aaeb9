//! Library exports for the client follow-up application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod activities;
pub mod clients;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod model;
pub mod route;
pub mod theme;
