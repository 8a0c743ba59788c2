//! # Shinsei - Schema-Driven Application Form Engine
//!
//! **Shinsei** interprets insurance application forms described in JSON. A form
//! schema becomes a tree of fields with conditional visibility, dependent option
//! lists and per-field validation; the engine tracks what the user entered,
//! keeps a debounced draft, and produces a clean submission payload. Submitted
//! applications are browsed through a filter/sort/paginate table pipeline.
//!
//! ## Core Workflow
//!
//! The engine performs no network I/O itself. Everything that talks to a backend
//! goes through the [`service::PortalService`] trait, and option lists are
//! requested as plain values the host resolves. The primary workflow is:
//!
//! 1.  **Load a Schema**: Parse the backend's JSON with `FormSpec::from_json`, or implement
//!     `IntoFormSpec` for your own schema structs.
//! 2.  **Start a Session**: `FormSession::start` restores the form's draft from a `DraftStorage`.
//! 3.  **Edit**: Feed user input through `set_value`, resolve queued option requests, and call
//!     `tick` so the draft is written once the user pauses.
//! 4.  **Submit**: `submit` validates every visible field and hands the payload to the service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shinsei::prelude::*;
//! use std::time::Instant;
//!
//! fn main() -> Result<()> {
//!     let portal = InMemoryPortal::with_demo_data()?;
//!     let form = portal.fetch_form("health_insurance_application")?;
//!
//!     let mut session = FormSession::start(form, MemoryStorage::new(), &PortalConfig::default());
//!     let now = Instant::now();
//!
//!     session.set_value("country", "USA", now)?;
//!     // Fetches the state list that depends on the chosen country.
//!     session.resolve_options(&portal);
//!     session.set_value("state", "California", now)?;
//!
//!     println!("{}", TreeFormatter::format(&session.render()));
//!
//!     match session.submit(&portal)? {
//!         SubmitOutcome::Submitted(receipt) => println!("-> Stored as {}", receipt.id),
//!         SubmitOutcome::Invalid(errors) => {
//!             for (field, message) in &errors {
//!                 println!("-> {}: {}", field, message);
//!             }
//!         }
//!         SubmitOutcome::Failed(error) => println!("-> Submit failed: {}", error),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod draft;
pub mod error;
pub mod interpreter;
pub mod options;
pub mod prelude;
pub mod render;
pub mod schema;
pub mod service;
pub mod table;
pub mod validator;
pub mod value;
pub mod visibility;
