use crate::config::PortalConfig;
use crate::draft::{Debouncer, DraftStorage, DraftStore};
use crate::error::{DraftError, SessionError, TransportError};
use crate::options::{OptionRequest, OptionResolver, OptionResponse, OptionStatus, Resolution};
use crate::render::{RenderNode, render_tree};
use crate::schema::{FieldKind, FieldSpec, FormSpec};
use crate::service::{PortalService, SubmissionPayload, SubmitReceipt};
use crate::validator::validate_form;
use crate::value::{FieldValue, FormErrors, FormValues};
use chrono::Utc;
use std::time::Instant;

mod state;

pub use state::{Notice, SessionState, SubmitOutcome};

const SUBMIT_SUCCESS: &str = "Application submitted successfully!";
const SUBMIT_FAILURE: &str = "Failed to submit application. Please try again.";

/// One user's pass through one form: input state, errors, option lists and drafts.
///
/// The session never performs I/O on its own apart from draft storage. Option
/// fetches are queued as `OptionRequest`s for the host to run (see
/// `take_option_requests` / `apply_options`), and submission is split into
/// `begin_submit` / `complete_submit` so the host decides how the payload
/// travels. `resolve_options` and `submit` do both halves synchronously against
/// a `PortalService`.
#[derive(Debug)]
pub struct FormSession<S> {
    form: FormSpec,
    state: SessionState,
    values: FormValues,
    errors: FormErrors,
    options: OptionResolver,
    pending: Vec<OptionRequest>,
    drafts: DraftStore<S>,
    debouncer: Debouncer,
    draft_saved: bool,
    notice: Option<Notice>,
    in_flight: bool,
}

impl<S: DraftStorage> FormSession<S> {
    /// Opens a session, restoring the form's draft if a readable one exists.
    pub fn start(form: FormSpec, storage: S, config: &PortalConfig) -> Self {
        let drafts = DraftStore::new(storage, &config.draft_key_prefix, &form.form_id);
        let mut session = Self {
            form,
            state: SessionState::Idle,
            values: FormValues::new(),
            errors: FormErrors::new(),
            options: OptionResolver::new(),
            pending: Vec::new(),
            drafts,
            debouncer: Debouncer::new(config.draft_quiet_period()),
            draft_saved: false,
            notice: None,
            in_flight: false,
        };

        session.restore_draft();
        session.request_initial_options();
        session.state = SessionState::Editing;
        log::debug!(
            "Started session for '{}' with {} restored values",
            session.form.form_id,
            session.values.len()
        );
        session
    }

    fn restore_draft(&mut self) {
        match self.drafts.load() {
            Ok(Some(values)) => {
                self.values = values;
                self.draft_saved = true;
            }
            Ok(None) => {}
            Err(DraftError::Malformed { key, reason }) => {
                log::warn!("Discarded unreadable draft '{}': {}", key, reason);
            }
            Err(e) => log::warn!("Could not read draft: {}", e),
        }
    }

    /// Dynamic selects whose dependency already has a value (from a draft) need their list.
    fn request_initial_options(&mut self) {
        for field in self.form.leaves() {
            if let Some(dynamic) = field.dynamic_options() {
                let dependency = self.values.get(&dynamic.depends_on);
                if let Some(request) = self.options.request(field, dependency) {
                    self.pending.push(request);
                }
            }
        }
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    /// Whether the current values are the ones last written to (or read from) the draft.
    pub fn draft_saved(&self) -> bool {
        self.draft_saved
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn option_status(&self, field_id: &str) -> &OptionStatus {
        self.options.status(field_id)
    }

    pub fn is_loading(&self, field_id: &str) -> bool {
        self.options.is_loading(field_id)
    }

    /// The options `field_id` offers right now, if it exists.
    pub fn options_for(&self, field_id: &str) -> Option<&[String]> {
        self.form
            .field(field_id)
            .map(|field| self.options.options_for(field))
    }

    pub fn draft_storage(&self) -> &S {
        self.drafts.storage()
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Editing {
            Ok(())
        } else {
            Err(SessionError::NotEditing(self.state.to_string()))
        }
    }

    fn input_field(&self, field_id: &str) -> Result<&FieldSpec, SessionError> {
        let field = self
            .form
            .field(field_id)
            .ok_or_else(|| SessionError::UnknownField(field_id.to_string()))?;
        if field.is_group() {
            return Err(SessionError::GroupField(field_id.to_string()));
        }
        Ok(field)
    }

    /// Records user input for one field.
    ///
    /// Clears that field's error without re-validating it, resets dependent
    /// selects when the value actually changed, and reschedules the draft save.
    pub fn set_value(
        &mut self,
        field_id: &str,
        value: impl Into<FieldValue>,
        now: Instant,
    ) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.input_field(field_id)?;
        if self.options.is_loading(field_id) {
            return Err(SessionError::OptionsLoading(field_id.to_string()));
        }

        let value = value.into();
        let changed = self.values.get(field_id) != Some(&value);
        self.values.insert(field_id.to_string(), value);
        self.errors.remove(field_id);
        if changed {
            self.refresh_dependents(field_id);
        }

        self.draft_saved = false;
        self.debouncer.touch(now);
        Ok(())
    }

    /// Checks or unchecks one option of a checkbox field, keeping selection order.
    pub fn toggle_option(
        &mut self,
        field_id: &str,
        option: &str,
        checked: bool,
        now: Instant,
    ) -> Result<(), SessionError> {
        let field = self.input_field(field_id)?;
        if !matches!(field.kind, FieldKind::Checkbox { .. })
            || !field.options().iter().any(|o| o == option)
        {
            return Err(SessionError::NotAnOption {
                field_id: field_id.to_string(),
                option: option.to_string(),
            });
        }

        let mut selected = match self.values.get(field_id) {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        };
        let present = selected.iter().any(|o| o == option);
        if checked && !present {
            selected.push(option.to_string());
        } else if !checked {
            selected.retain(|o| o != option);
        }
        self.set_value(field_id, FieldValue::List(selected), now)
    }

    /// Clears selects that depend on `field_id` and asks for their new option lists.
    /// Clearing cascades down chains of dependent selects.
    fn refresh_dependents(&mut self, field_id: &str) {
        let mut changed = vec![field_id.to_string()];
        while let Some(source) = changed.pop() {
            for dependent in self.form.dependents_of(&source) {
                if self.values.remove(&dependent.id).is_some() {
                    log::debug!("Cleared '{}' after '{}' changed", dependent.id, source);
                    changed.push(dependent.id.clone());
                }
                if let Some(request) = self.options.request(dependent, self.values.get(&source)) {
                    self.pending.push(request);
                }
            }
        }
    }

    /// Drains the option fetches the host still has to run.
    pub fn take_option_requests(&mut self) -> Vec<OptionRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Feeds a finished option fetch back in. Stale answers are ignored.
    pub fn apply_options(&mut self, response: OptionResponse) -> Resolution {
        let field_id = response.request.field_id.clone();
        let resolution = self.options.resolve(response);
        if let Resolution::Failed(error) = &resolution {
            log::warn!("Loading options for '{}' failed: {}", field_id, error);
            self.notice = Some(Notice::Error(format!(
                "Could not load options for {}: {}",
                field_id, error
            )));
        }
        resolution
    }

    /// Runs every queued option fetch against `service`. Returns how many were applied.
    pub fn resolve_options<P: PortalService + ?Sized>(&mut self, service: &P) -> usize {
        let mut applied = 0;
        for request in self.take_option_requests() {
            let result = service.fetch_options(&request.fetch, &request.dependency_value);
            if self.apply_options(OptionResponse { request, result }) == Resolution::Applied {
                applied += 1;
            }
        }
        applied
    }

    /// Drives the debounced auto-save. Returns `true` if a draft was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Editing || !self.debouncer.poll(now) {
            return false;
        }
        if self.values.is_empty() {
            return false;
        }
        match self.save_draft() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Auto-save failed: {}", e);
                false
            }
        }
    }

    /// Writes the current values as the form's draft right away.
    ///
    /// Only an editing session has a draft; once submitted this fails with
    /// `SessionError::NotEditing` and storage is left untouched.
    pub fn save_draft(&mut self) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.drafts.save(&self.values)?;
        self.debouncer.cancel();
        self.draft_saved = true;
        log::debug!("Saved draft '{}'", self.drafts.key());
        Ok(())
    }

    /// The form as it should be shown for the current state.
    pub fn render(&self) -> Vec<RenderNode> {
        render_tree(&self.form.fields, &self.values, &self.errors, &self.options)
    }

    /// Validates the whole form without touching the stored errors.
    pub fn validate(&self) -> FormErrors {
        validate_form(&self.form.fields, &self.values)
    }

    /// Validates every visible field and, if clean, hands out the payload to send.
    ///
    /// Returns `Ok(None)` when validation failed; the errors are then available
    /// through `errors()` and the session stays editable.
    pub fn begin_submit(&mut self) -> Result<Option<SubmissionPayload>, SessionError> {
        self.ensure_editing()?;
        self.state = SessionState::Submitting;
        self.errors = self.validate();

        if !self.errors.is_empty() {
            log::debug!(
                "Submit of '{}' blocked by {} invalid fields",
                self.form.form_id,
                self.errors.len()
            );
            self.state = SessionState::Editing;
            return Ok(None);
        }

        self.in_flight = true;
        Ok(Some(SubmissionPayload {
            form_id: self.form.form_id.clone(),
            data: self.values.clone(),
            submitted_at: Utc::now(),
        }))
    }

    /// Applies the collaborator's answer to the payload from `begin_submit`.
    pub fn complete_submit(
        &mut self,
        result: Result<SubmitReceipt, TransportError>,
    ) -> Result<SubmitOutcome, SessionError> {
        if !self.in_flight || self.state != SessionState::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.in_flight = false;

        let result = result.and_then(|receipt| {
            if receipt.success {
                Ok(receipt)
            } else {
                Err(TransportError::Rejected(format!("application {}", receipt.id)))
            }
        });

        match result {
            Ok(receipt) => {
                if let Err(e) = self.drafts.discard() {
                    log::warn!("Could not delete draft after submit: {}", e);
                }
                self.debouncer.cancel();
                self.values.clear();
                self.errors.clear();
                self.draft_saved = false;
                self.state = SessionState::Submitted;
                self.notice = Some(Notice::Success(SUBMIT_SUCCESS.to_string()));
                log::debug!("Submitted '{}' as {}", self.form.form_id, receipt.id);
                Ok(SubmitOutcome::Submitted(receipt))
            }
            Err(error) => {
                log::warn!("Submitting '{}' failed: {}", self.form.form_id, error);
                self.state = SessionState::Editing;
                self.notice = Some(Notice::Error(SUBMIT_FAILURE.to_string()));
                Ok(SubmitOutcome::Failed(error))
            }
        }
    }

    /// Validates and submits through `service` in one step.
    pub fn submit<P: PortalService + ?Sized>(
        &mut self,
        service: &P,
    ) -> Result<SubmitOutcome, SessionError> {
        match self.begin_submit()? {
            Some(payload) => self.complete_submit(service.submit_form(&payload)),
            None => Ok(SubmitOutcome::Invalid(self.errors.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_forms;
    use crate::draft::MemoryStorage;
    use crate::service::InMemoryPortal;
    use std::time::Duration;

    fn form(id: &str) -> FormSpec {
        demo_forms()
            .unwrap()
            .into_iter()
            .find(|f| f.form_id == id)
            .unwrap()
    }

    #[test]
    fn setting_a_value_clears_only_its_error() {
        let mut session = FormSession::start(
            form("car_insurance_application"),
            MemoryStorage::new(),
            &PortalConfig::default(),
        );
        let now = Instant::now();
        assert_eq!(session.begin_submit().unwrap(), None);
        assert!(session.error("car_make").is_some());
        assert!(session.error("car_model").is_some());

        session.set_value("car_make", "", now).unwrap();
        assert!(session.error("car_make").is_none());
        assert!(session.error("car_model").is_some());
    }

    #[test]
    fn groups_and_unknown_fields_reject_input() {
        let mut session = FormSession::start(
            form("car_insurance_application"),
            MemoryStorage::new(),
            &PortalConfig::default(),
        );
        let now = Instant::now();
        assert_eq!(
            session.set_value("vehicle_info", "x", now),
            Err(SessionError::GroupField("vehicle_info".to_string()))
        );
        assert_eq!(
            session.set_value("nope", "x", now),
            Err(SessionError::UnknownField("nope".to_string()))
        );
    }

    #[test]
    fn toggle_option_keeps_order() {
        let mut session = FormSession::start(
            form("home_insurance_application"),
            MemoryStorage::new(),
            &PortalConfig::default(),
        );
        let now = Instant::now();
        session
            .toggle_option("fire_safety", "Sprinkler System", true, now)
            .unwrap();
        session
            .toggle_option("fire_safety", "Smoke Detectors", true, now)
            .unwrap();
        session
            .toggle_option("fire_safety", "Sprinkler System", true, now)
            .unwrap();
        assert_eq!(
            session.value("fire_safety"),
            Some(&FieldValue::from(vec!["Sprinkler System", "Smoke Detectors"]))
        );

        session
            .toggle_option("fire_safety", "Sprinkler System", false, now)
            .unwrap();
        assert_eq!(
            session.value("fire_safety"),
            Some(&FieldValue::from(vec!["Smoke Detectors"]))
        );

        assert!(matches!(
            session.toggle_option("fire_safety", "Moat", true, now),
            Err(SessionError::NotAnOption { .. })
        ));
        assert!(matches!(
            session.toggle_option("property_type", "House", true, now),
            Err(SessionError::NotAnOption { .. })
        ));
    }

    #[test]
    fn loading_select_refuses_selection() {
        let mut session = FormSession::start(
            form("health_insurance_application"),
            MemoryStorage::new(),
            &PortalConfig::default(),
        );
        let now = Instant::now();
        session.set_value("country", "USA", now).unwrap();
        assert!(session.is_loading("state"));
        assert_eq!(
            session.set_value("state", "Texas", now),
            Err(SessionError::OptionsLoading("state".to_string()))
        );

        let portal = InMemoryPortal::with_demo_data().unwrap();
        assert_eq!(session.resolve_options(&portal), 1);
        session.set_value("state", "Texas", now).unwrap();
    }

    #[test]
    fn auto_save_waits_for_quiet_period() {
        let config = PortalConfig::builder()
            .draft_quiet_period(Duration::from_secs(2))
            .build();
        let mut storage = MemoryStorage::new();
        let mut session = FormSession::start(
            form("car_insurance_application"),
            &mut storage,
            &config,
        );
        let start = Instant::now();

        session.set_value("car_make", "T", start).unwrap();
        session
            .set_value("car_make", "To", start + Duration::from_millis(1000))
            .unwrap();
        assert!(!session.tick(start + Duration::from_millis(2500)));
        assert!(session.tick(start + Duration::from_millis(3000)));
        assert!(session.draft_saved());
        assert!(!session.tick(start + Duration::from_millis(9000)));
        drop(session);

        assert_eq!(
            storage.get("draft_car_insurance_application").unwrap().as_deref(),
            Some("{\"car_make\":\"To\"}")
        );
    }

    #[test]
    fn complete_without_begin_is_rejected() {
        let mut session = FormSession::start(
            form("car_insurance_application"),
            MemoryStorage::new(),
            &PortalConfig::default(),
        );
        assert_eq!(
            session.complete_submit(Ok(SubmitReceipt {
                success: true,
                id: "1".to_string()
            })),
            Err(SessionError::NotSubmitting)
        );
    }

    #[test]
    fn submitted_session_writes_no_draft() {
        let mut storage = MemoryStorage::new();
        let mut session = FormSession::start(
            form("car_insurance_application"),
            &mut storage,
            &PortalConfig::default(),
        );
        let now = Instant::now();
        for (id, value) in [
            ("car_owner", "No"),
            ("car_make", "Honda"),
            ("car_model", "Civic"),
            ("car_year", "2020"),
            ("accidents_last_5_years", "No"),
        ] {
            session.set_value(id, value, now).unwrap();
        }
        session.save_draft().unwrap();

        assert!(session.begin_submit().unwrap().is_some());
        let outcome = session
            .complete_submit(Ok(SubmitReceipt {
                success: true,
                id: "7".to_string(),
            }))
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));

        assert_eq!(
            session.save_draft(),
            Err(SessionError::NotEditing("submitted".to_string()))
        );
        assert!(!session.draft_saved());
        drop(session);

        assert!(storage.is_empty());
    }
}
