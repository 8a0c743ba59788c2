use crate::error::TransportError;
use crate::schema::{FetchDescriptor, FieldSpec};
use crate::value::FieldValue;
use ahash::AHashMap;
use std::fmt;

/// Identity of one option fetch. Ids are never reused within a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch the host has to perform on behalf of a dynamic select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    pub id: RequestId,
    pub field_id: String,
    pub dependency_value: String,
    pub fetch: FetchDescriptor,
}

/// The host's answer to an `OptionRequest`.
#[derive(Debug, Clone)]
pub struct OptionResponse {
    pub request: OptionRequest,
    pub result: Result<Vec<String>, TransportError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionStatus {
    /// The dependency is empty; nothing to fetch.
    Idle,
    Loading { request: RequestId },
    Ready(Vec<String>),
    Failed(String),
}

/// What happened to a response handed to `OptionResolver::resolve`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied,
    /// Superseded by a newer request or dependency value; ignored.
    Stale,
    Failed(TransportError),
}

#[derive(Debug, Clone)]
struct OptionSlot {
    dependency_value: String,
    status: OptionStatus,
}

/// Tracks the option lists of dynamic selects and which fetch each is waiting on.
///
/// A response is only applied if it answers the slot's latest request *and* was
/// issued for the dependency value the slot currently holds, so a slow answer
/// for an old value can never replace the list of a newer one.
#[derive(Debug, Default)]
pub struct OptionResolver {
    slots: AHashMap<String, OptionSlot>,
    next_id: u64,
}

impl OptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `field` at a new dependency value, returning the fetch to run if one is needed.
    ///
    /// Empty dependencies fetch nothing. Asking again for the value that is already
    /// loading or loaded is a no-op, so at most one request is outstanding per field.
    pub fn request(
        &mut self,
        field: &FieldSpec,
        dependency_value: Option<&FieldValue>,
    ) -> Option<OptionRequest> {
        let dynamic = field.dynamic_options()?;
        let value = dependency_value
            .and_then(FieldValue::as_str)
            .unwrap_or_default();

        if value.is_empty() {
            self.slots.insert(
                field.id.clone(),
                OptionSlot {
                    dependency_value: String::new(),
                    status: OptionStatus::Idle,
                },
            );
            return None;
        }

        if let Some(slot) = self.slots.get(&field.id) {
            let settled = matches!(
                slot.status,
                OptionStatus::Loading { .. } | OptionStatus::Ready(_)
            );
            if settled && slot.dependency_value == value {
                return None;
            }
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.slots.insert(
            field.id.clone(),
            OptionSlot {
                dependency_value: value.to_string(),
                status: OptionStatus::Loading { request: id },
            },
        );
        log::debug!(
            "Requesting options {} for '{}' (depends on value '{}')",
            id,
            field.id,
            value
        );
        Some(OptionRequest {
            id,
            field_id: field.id.clone(),
            dependency_value: value.to_string(),
            fetch: dynamic.fetch.clone(),
        })
    }

    /// Applies a fetch result if it is still the one the field is waiting for.
    pub fn resolve(&mut self, response: OptionResponse) -> Resolution {
        let OptionResponse { request, result } = response;
        let Some(slot) = self.slots.get_mut(&request.field_id) else {
            return Resolution::Stale;
        };
        let current = matches!(slot.status, OptionStatus::Loading { request: id } if id == request.id);
        if !current || slot.dependency_value != request.dependency_value {
            log::debug!(
                "Ignoring stale options {} for '{}' (value '{}')",
                request.id,
                request.field_id,
                request.dependency_value
            );
            return Resolution::Stale;
        }

        match result {
            Ok(options) => {
                slot.status = OptionStatus::Ready(options);
                Resolution::Applied
            }
            Err(error) => {
                slot.status = OptionStatus::Failed(error.to_string());
                Resolution::Failed(error)
            }
        }
    }

    pub fn status(&self, field_id: &str) -> &OptionStatus {
        static IDLE: OptionStatus = OptionStatus::Idle;
        self.slots
            .get(field_id)
            .map(|slot| &slot.status)
            .unwrap_or(&IDLE)
    }

    pub fn is_loading(&self, field_id: &str) -> bool {
        matches!(self.status(field_id), OptionStatus::Loading { .. })
    }

    /// The options a field currently offers: its schema options, or the fetched
    /// list for a dynamic select (empty until loaded).
    pub fn options_for<'a>(&'a self, field: &'a FieldSpec) -> &'a [String] {
        if field.dynamic_options().is_none() {
            return field.options();
        }
        match self.status(&field.id) {
            OptionStatus::Ready(options) => options,
            _ => &[],
        }
    }
}
