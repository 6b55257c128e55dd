//! Footprint - household carbon footprint calculation and analytics.
//!
//! # Overview
//!
//! Footprint turns household activity (energy use, travel, consumption,
//! waste) into kg CO₂e using a catalog of emission factors, stores one
//! footprint record per user per month, and derives monthly and
//! population-wide views from those records.
//!
//! # Modules
//!
//! - [`model`]: Data types for factors, activities, records and summaries
//! - [`error`]: Classified calculation errors
//! - [`units`]: Fixed unit-conversion table
//! - [`catalog`]: Per-calculation factor catalog snapshots
//! - [`resolver`]: Activity entry to CO₂e resolution
//! - [`breakdown`]: Four-bucket category aggregation
//! - [`record`]: Footprint record construction
//! - [`analytics`]: Monthly summaries and month-over-month trend
//! - [`population`]: Population average and performer ranking
//! - [`cache`]: Versioned monthly analytics cache
//! - [`storage`]: SQLite storage layer
//! - [`engine`]: Orchestration over storage
//! - [`defaults`]: Starter factor catalog
//! - [`config`]: Environment configuration
//! - [`api`]: HTTP API handlers

pub mod analytics;
pub mod api;
pub mod breakdown;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod model;
pub mod population;
pub mod record;
pub mod resolver;
pub mod storage;
pub mod units;
