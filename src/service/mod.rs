use crate::error::TransportError;
use crate::schema::{FetchDescriptor, FormSpec};
use crate::value::FormValues;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod memory;

pub use memory::InMemoryPortal;

/// Endpoint the stock backend serves state lists from.
pub const STATES_ENDPOINT: &str = "/api/getStates";

/// A generic application row as returned by the submissions listing.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Review state of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

/// What gets handed to the backend when a clean form is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_id: String,
    pub data: FormValues,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub success: bool,
    pub id: String,
}

/// One page of the submissions listing: column names plus generic rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionsPage {
    pub columns: Vec<String>,
    pub data: Vec<Record>,
}

/// The data-fetching collaborator the portal talks to.
///
/// Caching, retries and transport live behind this trait; callers must not
/// assume any retry has happened and must surface every `Err` to the user.
pub trait PortalService {
    fn fetch_forms(&self) -> Result<Vec<FormSpec>, TransportError>;

    fn fetch_form(&self, form_id: &str) -> Result<FormSpec, TransportError>;

    fn fetch_states(&self, country: &str) -> Result<Vec<String>, TransportError>;

    /// Resolves a dynamic option list. The default understands the state-list endpoint only.
    fn fetch_options(
        &self,
        descriptor: &FetchDescriptor,
        dependency_value: &str,
    ) -> Result<Vec<String>, TransportError> {
        if descriptor.endpoint == STATES_ENDPOINT {
            self.fetch_states(dependency_value)
        } else {
            Err(TransportError::UnsupportedEndpoint(
                descriptor.endpoint.clone(),
            ))
        }
    }

    fn submit_form(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, TransportError>;

    fn fetch_submissions(
        &self,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<SubmissionsPage, TransportError>;

    fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), TransportError>;

    fn delete_application(&self, application_id: &str) -> Result<(), TransportError>;
}
