//! Core types, resources, and utilities shared across the application.

pub mod attributes;
pub mod components;
pub mod config;
pub mod error;
pub mod identity;
pub mod marks;
pub mod scene;
pub mod slots;
pub mod state;
