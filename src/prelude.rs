//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the shinsei crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use shinsei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let schema_json = std::fs::read_to_string("path/to/forms.json")?;
//! let forms = FormSpec::list_from_json(&schema_json)?;
//!
//! let storage = FileStorage::open("drafts")?;
//! let config = PortalConfig::from_file("path/to/config.json")?;
//! let session = FormSession::start(forms[0].clone(), storage, &config);
//!
//! println!("{}", TreeFormatter::format(&session.render()));
//! # Ok(())
//! # }
//! ```

// Schema model
pub use crate::schema::{FieldKind, FieldSpec, FormSpec, IntoFormSpec};
pub use crate::value::{FieldValue, FormErrors, FormValues};

// Session and rendering
pub use crate::interpreter::{FormSession, Notice, SessionState, SubmitOutcome};
pub use crate::options::{OptionRequest, OptionResponse, Resolution};
pub use crate::render::{RenderNode, TreeFormatter};

// Drafts
pub use crate::draft::{DraftStorage, FileStorage, MemoryStorage};

// Collaborators
pub use crate::service::{ApplicationStatus, InMemoryPortal, PortalService, SubmissionPayload};

// Table view
pub use crate::table::{ColumnSet, SortState, TablePage, TableQuery, TableView};

// Configuration and errors
pub use crate::config::PortalConfig;
pub use crate::error::{DraftError, SchemaError, SessionError, TransportError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
