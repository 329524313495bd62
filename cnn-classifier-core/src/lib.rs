#![doc = "cnn-classifier-core: pipeline logic for the kidney-disease CNN classifier."]

//! This crate holds the configuration plumbing, the data ingestion stage and
//! the shared I/O helpers. The `cnn-classifier` binary is a thin CLI on top.
//!
//! # Usage
//! Build a [`pipeline::DataIngestionPipeline`] with a [`contract::Fetcher`]
//! (normally [`download::HttpFetcher`]) and call `run`.

pub mod common;
pub mod config;
pub mod configuration;
pub mod contract;
pub mod download;
pub mod error;
pub mod extract;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod settings;
