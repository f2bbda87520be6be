//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies.
//!
//! Adapter categories:
//! - `api`: GitLab REST client for the license endpoint
//! - `metrics`: Prometheus descriptors, self-metrics and `/metrics` server

pub mod api;
pub mod metrics;
