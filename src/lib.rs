//! checkdoc - static documentation extractor for monitoring check templates
//!
//! This library extracts documentation from templated monitoring check
//! definitions without contacting any monitored system. It partially renders
//! each check template against a store of declared configuration defaults,
//! then resolves every variable that survives the partial render and parses
//! the alarm criteria mini-language into structured records.
//!
//! # Core Concepts
//!
//! - **Default Variable Store**: YAML variable files merged in sorted
//!   filename order, last definition wins
//! - **Partial Rendering**: template expressions whose variables have no
//!   provided value render back to themselves (`{{ name }}`), so the
//!   document structure survives while configurable values stay visible
//! - **Resolution**: every undeclared variable left in a rendered document
//!   must have a declared default, or the run fails loudly
//! - **Criteria**: alarm trigger logic parsed into status/condition/message
//!   records
//!
//! # Example Usage
//!
//! ```ignore
//! use checkdoc::config::CheckdocConfig;
//! use checkdoc::extract::Extractor;
//! use checkdoc::fs::RealFileSystem;
//! use std::path::PathBuf;
//!
//! let config = CheckdocConfig::for_root(PathBuf::from("/path/to/checkout"));
//! let extractor = Extractor::new(RealFileSystem::new(), config);
//!
//! for doc in extractor.extract()? {
//!     println!("Check: {}", doc.label);
//! }
//! # Ok::<(), checkdoc::extract::ExtractError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`vars`]: default variable store loading
//! - [`render`]: partial template rendering with unresolved-expression
//!   preservation
//! - [`document`]: check document parsing and templated-key recovery
//! - [`resolve`]: free-variable resolution against the variable store
//! - [`criteria`]: criteria mini-language parser
//! - [`extract`]: the extraction pipeline tying the above together
//! - [`output`]: serializable documentation records
//! - [`cli`]: command-line interface

// Public modules
pub mod cli;
pub mod config;
pub mod criteria;
pub mod document;
pub mod extract;
pub mod fs;
pub mod output;
pub mod render;
pub mod resolve;
pub mod util;
pub mod vars;

// Re-export key types for convenient access
pub use config::{CheckdocConfig, ConfigError};
pub use criteria::{parse_criteria, CriteriaRecord, Status};
pub use extract::{ExtractError, Extractor};
pub use output::{AlarmDetails, CheckDetails, CheckDoc};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use vars::{load_defaults, ConfigVariables};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
