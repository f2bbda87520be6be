//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LicenseSource`: Retrieval of the current license document

pub mod license_source;

pub use license_source::{FetchError, LicenseSource};
