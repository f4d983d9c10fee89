#![forbid(unsafe_code)]
//! tangle-core library.
//!
//! Dependency-aware component health: a static graph of interdependent
//! components, each with a caller-supplied health probe, analysed for
//! blocked prerequisites, cascade impact, dependency cycles and recovery
//! order.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per failure domain, each mapped to a
//!   stable [`ErrorCode`]. Probe failures never surface as errors.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`). The library
//!   never installs a subscriber.
//! - **Ordering**: every list in a result is in component definition order
//!   unless documented otherwise.

pub mod cascade;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod policy;
pub mod probe;
pub mod recovery;
pub mod report;
pub mod validate;

pub use engine::{Engine, EngineBuilder};
pub use error::{ErrorCode, GraphDefinitionError, PolicyError, QueryError};
pub use model::{
    CascadeOverride, ComponentSpec, ComponentSummary, DependencyValidation, HealthResult,
    HealthStatus,
};
pub use policy::{HealthPolicy, OverallHealth};
pub use probe::HealthProbe;
pub use recovery::{IterationBoundExceeded, RecoveryCheck};
pub use report::{ComponentReport, SystemHealthReport};
