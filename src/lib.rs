// Pharmacy - Prescription and Inventory Backend
// Copyright (c) 2025 Pharmacy Contributors
// Licensed under the MIT License

//! # Pharmacy - Prescription and Inventory Backend
//!
//! A role-scoped records service for a pharmacy: doctors write prescriptions,
//! patients read their own, and pharmacists fulfill them against a medication
//! inventory.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`server`] - HTTP routes, extractors and error mapping (axum)
//! - [`auth`] - Password hashing, bearer tokens and identity resolution
//! - [`core`] - Prescription lifecycle and account registry
//! - [`adapters`] - Storage backends (PostgreSQL, in-memory)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pharmacy::adapters::database::create_store;
//! use pharmacy::auth::TokenIssuer;
//! use pharmacy::config::load_config;
//! use pharmacy::server::{build_router, AppState};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pharmacy.toml")?;
//! let store = create_store(&config)?;
//! let state = AppState::new(store, TokenIssuer::from_config(&config.auth));
//! let _router = build_router(state, &config.server.cors_allowed_origins);
//! # Ok(())
//! # }
//! ```
//!
//! ## Fulfillment
//!
//! Fulfilling a prescription decrements stock for every line and flips the
//! status to `fulfilled` as one atomic step. If any line's medication is out
//! of stock nothing changes:
//!
//! ```rust,no_run
//! use pharmacy::core::PrescriptionEngine;
//! use pharmacy::domain::{Pharmacist, PharmacyError};
//!
//! # async fn example(engine: PrescriptionEngine, pharmacist: Pharmacist) {
//! match engine.fulfill(&pharmacist, 42).await {
//!     Ok(prescription) => println!("fulfilled {}", prescription.id),
//!     Err(PharmacyError::OutOfStock { medication }) => println!("{medication} out of stock"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::PharmacyError`]; the HTTP layer
//! maps each variant to a status code and a `{"detail": ...}` body.

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
