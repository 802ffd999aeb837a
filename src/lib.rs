//! Feed Digest - an RSS digest generator
//!
//! This crate polls a list of RSS feeds, merges items that share a GUID
//! across feeds, flags the ones that are new or published today and renders
//! the result as a markdown table.

pub mod aggregator;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetcher;
pub mod prior_report;
pub mod ranker;
pub mod renderer;
