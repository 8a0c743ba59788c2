use super::*;
use crate::data;
use crate::value::group_thousands;
use chrono::TimeZone;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};

/// Column order of the submissions listing.
const COLUMNS: [&str; 8] = [
    "Full Name",
    "Insurance Type",
    "City",
    "Status",
    "Submitted Date",
    "Property Value",
    "Vehicle",
    "Country",
];

#[derive(Debug, Clone)]
struct StoredSubmission {
    id: String,
    form_id: String,
    data: Record,
    submitted_at: DateTime<Utc>,
    status: ApplicationStatus,
}

/// A self-contained `PortalService` backed by the stock catalog and an in-memory
/// submission list. Useful for demos and tests; a failure can be injected for
/// the next call to exercise error paths.
pub struct InMemoryPortal {
    forms: Vec<FormSpec>,
    submissions: RefCell<Vec<StoredSubmission>>,
    last_id: Cell<i64>,
    next_failure: RefCell<Option<TransportError>>,
}

impl InMemoryPortal {
    /// A portal serving `forms` with no submissions yet.
    pub fn new(forms: Vec<FormSpec>) -> Self {
        Self {
            forms,
            submissions: RefCell::new(Vec::new()),
            last_id: Cell::new(0),
            next_failure: RefCell::new(None),
        }
    }

    /// The stock catalog plus three seeded applications, one per status.
    pub fn with_demo_data() -> Result<Self, crate::error::SchemaError> {
        let portal = Self::new(data::demo_forms()?);
        let seeds = [
            (
                "1",
                "health_insurance_application",
                json!({
                    "first_name": "John", "last_name": "Doe", "dob": "1995-06-15",
                    "gender": "Male", "country": "USA", "state": "California",
                    "city": "Los Angeles", "smoker": "No"
                }),
                (2024, 1, 15, 10, 30),
                ApplicationStatus::Pending,
            ),
            (
                "2",
                "home_insurance_application",
                json!({
                    "home_owner": "Yes", "property_type": "House", "home_value": 450000,
                    "has_security_system": "Yes", "security_system_type": "Monitored"
                }),
                (2024, 1, 14, 14, 20),
                ApplicationStatus::Approved,
            ),
            (
                "3",
                "car_insurance_application",
                json!({
                    "car_owner": "Yes", "car_make": "Toyota", "car_model": "Camry",
                    "car_year": 2020, "accidents_last_5_years": "No"
                }),
                (2024, 1, 13, 9, 15),
                ApplicationStatus::Rejected,
            ),
        ];

        {
            let mut submissions = portal.submissions.borrow_mut();
            for (id, form_id, data, (y, mo, d, h, mi), status) in seeds {
                let submitted_at = Utc
                    .with_ymd_and_hms(y, mo, d, h, mi, 0)
                    .single()
                    .unwrap_or_else(Utc::now);
                submissions.push(StoredSubmission {
                    id: id.to_string(),
                    form_id: form_id.to_string(),
                    data: match data {
                        Value::Object(map) => map,
                        _ => Record::new(),
                    },
                    submitted_at,
                    status,
                });
            }
        }
        Ok(portal)
    }

    /// Makes the next service call fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        *self.next_failure.borrow_mut() = Some(error);
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.borrow().len()
    }

    pub fn status_of(&self, application_id: &str) -> Option<ApplicationStatus> {
        self.submissions
            .borrow()
            .iter()
            .find(|s| s.id == application_id)
            .map(|s| s.status)
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        match self.next_failure.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Millisecond timestamps as ids, bumped when two submissions share a millisecond.
    fn next_id(&self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last_id.get() + 1);
        self.last_id.set(id);
        id.to_string()
    }
}

impl PortalService for InMemoryPortal {
    fn fetch_forms(&self) -> Result<Vec<FormSpec>, TransportError> {
        self.check_failure()?;
        Ok(self.forms.clone())
    }

    fn fetch_form(&self, form_id: &str) -> Result<FormSpec, TransportError> {
        self.check_failure()?;
        self.forms
            .iter()
            .find(|f| f.form_id == form_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("form '{}'", form_id)))
    }

    fn fetch_states(&self, country: &str) -> Result<Vec<String>, TransportError> {
        self.check_failure()?;
        Ok(data::states_for(country))
    }

    fn submit_form(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, TransportError> {
        self.check_failure()?;
        if !self.forms.iter().any(|f| f.form_id == payload.form_id) {
            return Err(TransportError::Server {
                status: 400,
                message: format!("unknown form '{}'", payload.form_id),
            });
        }
        let data = match serde_json::to_value(&payload.data) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Record::new(),
            Err(e) => return Err(TransportError::Transport(e.to_string())),
        };
        let id = self.next_id();
        log::debug!("Stored submission {} for form '{}'", id, payload.form_id);
        self.submissions.borrow_mut().push(StoredSubmission {
            id: id.clone(),
            form_id: payload.form_id.clone(),
            data,
            submitted_at: payload.submitted_at,
            status: ApplicationStatus::Pending,
        });
        Ok(SubmitReceipt { success: true, id })
    }

    /// Returns the complete listing; `page` and `limit` are accepted but paging
    /// happens client-side in the table view.
    fn fetch_submissions(
        &self,
        _page: Option<usize>,
        _limit: Option<usize>,
    ) -> Result<SubmissionsPage, TransportError> {
        self.check_failure()?;
        let data = self.submissions.borrow().iter().map(project_row).collect();
        Ok(SubmissionsPage {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            data,
        })
    }

    fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), TransportError> {
        self.check_failure()?;
        let mut submissions = self.submissions.borrow_mut();
        let submission = submissions
            .iter_mut()
            .find(|s| s.id == application_id)
            .ok_or_else(|| TransportError::NotFound(format!("application '{}'", application_id)))?;
        submission.status = status;
        Ok(())
    }

    fn delete_application(&self, application_id: &str) -> Result<(), TransportError> {
        self.check_failure()?;
        let mut submissions = self.submissions.borrow_mut();
        let before = submissions.len();
        submissions.retain(|s| s.id != application_id);
        if submissions.len() == before {
            return Err(TransportError::NotFound(format!(
                "application '{}'",
                application_id
            )));
        }
        Ok(())
    }
}

/// Flattens a stored submission into a listing row.
fn project_row(submission: &StoredSubmission) -> Record {
    let text = |key: &str| field_text(&submission.data, key);
    let or_na = |value: Option<String>| value.unwrap_or_else(|| "N/A".to_string());

    let full_name = format!(
        "{} {}",
        text("first_name").unwrap_or_else(|| "N/A".to_string()),
        text("last_name").unwrap_or_default()
    )
    .trim()
    .to_string();
    let full_name = if full_name.is_empty() {
        "N/A".to_string()
    } else {
        full_name
    };

    let property_value = submission
        .data
        .get("home_value")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|n| *n != 0.0)
        .map(|n| format!("${}", group_thousands(n)));

    let vehicle = match (text("car_make"), text("car_model")) {
        (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        _ => None,
    };

    let mut row = Record::new();
    row.insert("id".to_string(), json!(submission.id));
    row.insert("Full Name".to_string(), json!(full_name));
    row.insert(
        "Insurance Type".to_string(),
        json!(data::insurance_type(&submission.form_id)),
    );
    row.insert("City".to_string(), json!(or_na(text("city"))));
    row.insert("Status".to_string(), json!(submission.status.as_str()));
    row.insert(
        "Submitted Date".to_string(),
        json!(submission.submitted_at.format("%Y-%m-%d").to_string()),
    );
    row.insert("Property Value".to_string(), json!(or_na(property_value)));
    row.insert("Vehicle".to_string(), json!(or_na(vehicle)));
    row.insert("Country".to_string(), json!(or_na(text("country"))));
    row
}

fn field_text(data: &Record, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
