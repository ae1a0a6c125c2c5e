//! Lumen CLI Library
//!
//! Desktop host for playback sessions: configuration loading, a simulated
//! streaming engine and the scripted session the `lumen` binary runs.
//!
//! This library exposes the components for testing purposes.

pub mod config;
pub mod error;
pub mod inspect;
pub mod session;
pub mod simulated;

pub use config::{CliConfig, SimulationSettings};
pub use error::{CliError, Result};
pub use session::{run_session, SessionReport};
pub use simulated::{LoggingSurface, SimulatedEngineFactory};
