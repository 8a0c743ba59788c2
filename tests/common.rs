//! Common test utilities for building forms, sessions and table rows.
use shinsei::prelude::*;
use shinsei::service::Record;
use std::time::{Duration, Instant};

/// A compact form with one of everything: a group, a required text field, a
/// bounded number, a visibility rule and a country → state dependency.
#[allow(dead_code)]
pub const SIGNUP_FORM_JSON: &str = r#"{
    "formId": "signup",
    "title": "Sign Up",
    "fields": [
        {
            "id": "person",
            "label": "Person",
            "type": "group",
            "fields": [
                { "id": "name", "label": "Name", "type": "text", "required": true,
                  "validation": { "pattern": "^[A-Za-z ]+$" } },
                { "id": "age", "label": "Age", "type": "number", "required": true,
                  "validation": { "min": 18, "max": 120 } }
            ]
        },
        { "id": "has_pet", "label": "Has pet?", "type": "radio", "options": ["Yes", "No"] },
        { "id": "pet_name", "label": "Pet name", "type": "text", "required": true,
          "visibility": { "dependsOn": "has_pet", "condition": "equals", "value": "Yes" } },
        { "id": "country", "label": "Country", "type": "select",
          "options": ["USA", "Canada"], "required": true },
        { "id": "state", "label": "State", "type": "select", "required": true,
          "dynamicOptions": { "dependsOn": "country", "endpoint": "/api/getStates", "method": "GET" } }
    ]
}"#;

#[allow(dead_code)]
pub fn signup_form() -> FormSpec {
    FormSpec::from_json(SIGNUP_FORM_JSON).expect("Failed to parse signup form")
}

/// One of the stock insurance forms.
#[allow(dead_code)]
pub fn stock_form(form_id: &str) -> FormSpec {
    shinsei::data::demo_forms()
        .expect("Failed to load stock forms")
        .into_iter()
        .find(|f| f.form_id == form_id)
        .unwrap_or_else(|| panic!("No stock form '{}'", form_id))
}

#[allow(dead_code)]
pub fn demo_portal() -> InMemoryPortal {
    InMemoryPortal::with_demo_data().expect("Failed to build demo portal")
}

/// A session over in-memory storage with the default config.
#[allow(dead_code)]
pub fn fresh_session(form: FormSpec) -> FormSession<MemoryStorage> {
    FormSession::start(form, MemoryStorage::new(), &PortalConfig::default())
}

/// A fixed clock: `at(start, ms)` is `ms` milliseconds after `start`.
#[allow(dead_code)]
pub fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

/// Table rows shaped like the submissions listing.
#[allow(dead_code)]
pub fn listing_rows(count: usize) -> Vec<Record> {
    let statuses = ["pending", "approved", "rejected"];
    (0..count)
        .map(|i| {
            let value = serde_json::json!({
                "id": (i + 1).to_string(),
                "Full Name": format!("Applicant {:02}", i + 1),
                "Insurance Type": "Health",
                "City": if i % 2 == 0 { "Berlin" } else { "Toronto" },
                "Status": statuses[i % 3],
                "Submitted Date": format!("2024-01-{:02}", i % 28 + 1),
                "Premium": ((i * 37) % 100 + 1) * 10,
            });
            match value {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}
