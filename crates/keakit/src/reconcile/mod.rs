//! Reconciliation adapters.
//!
//! Each adapter drives one entity kind through the create / read / update /
//! delete / import lifecycle on a single host:
//!
//! | Step | Not found means |
//! |------|-----------------|
//! | create, update | error |
//! | read, import | `Ok(None)` |
//! | delete | `Ok(())` |
//!
//! Adapters hold no state beyond the client and host, so "never created" and
//! "deleted out of band" both read back as `None`.

mod option_def;
mod reservation;
mod subnet;

pub use option_def::{OptionDefKey, OptionDefLifecycle, OptionDefState};
pub use reservation::{ReservationLifecycle, ReservationRef, ReservationState};
pub use subnet::{SubnetLifecycle, SubnetState};

use crate::error::{Error, Result};
use crate::types::OptionData;
use serde::{Deserialize, Serialize};

/// Create, read, update, delete and import one kind of entity.
pub trait Lifecycle {
    /// Declared attributes.
    type Desired;
    /// Natural key used for lookups and deletion.
    type Key;
    /// Attributes as reported by the server.
    type Observed;

    /// Create the entity. Required fields are checked first.
    fn create(&self, desired: &Self::Desired) -> Result<Self::Observed>;

    /// Read the entity; `None` when the server has no such entity.
    fn read(&self, key: &Self::Key) -> Result<Option<Self::Observed>>;

    /// Re-send the full desired entity.
    fn update(&self, desired: &Self::Desired) -> Result<Self::Observed>;

    /// Delete the entity. Deleting an absent entity succeeds.
    fn delete(&self, key: &Self::Key) -> Result<()>;

    /// Take an existing entity under management by its import id.
    fn import(&self, id: &str) -> Result<Option<Self::Observed>>;
}

/// Fail with a validation error when `value` is blank.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

/// Compare two declared values the way they go on the wire.
fn same_trimmed(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

fn same_trimmed_all(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_trimmed(x, y))
}

fn trimmed_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

fn require_host(host: &str) -> Result<String> {
    require("hostname", host)?;
    Ok(host.trim().to_string())
}

/// A declared option value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Option code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Option name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Option value.
    pub data: String,
    /// Send even when not requested.
    #[serde(default)]
    pub always_send: bool,
}

impl OptionValue {
    fn validate(&self) -> Result<()> {
        if self.code.is_none() && self.name.trim().is_empty() {
            return Err(Error::validation("option_data", "each option needs a code or a name"));
        }
        Ok(())
    }

    /// Whether an observed option satisfies this declared one.
    ///
    /// The server fills in names and codes it knows; only the identifiers
    /// declared here take part in the comparison.
    #[must_use]
    pub fn satisfied_by(&self, observed: &Self) -> bool {
        let code_ok = self.code.is_none() || self.code == observed.code;
        let name_ok = self.name.is_empty() || self.name == observed.name;
        code_ok && name_ok && self.data == observed.data && self.always_send == observed.always_send
    }
}

impl From<&OptionValue> for OptionData {
    fn from(value: &OptionValue) -> Self {
        Self {
            code: value.code,
            data: value.data.clone(),
            name: value.name.clone(),
            space: None,
            always_send: value.always_send,
        }
    }
}

impl From<OptionData> for OptionValue {
    fn from(data: OptionData) -> Self {
        Self {
            code: data.code,
            name: data.name,
            data: data.data,
            always_send: data.always_send,
        }
    }
}

/// Whether every declared option is satisfied by exactly one observed option.
#[must_use]
pub fn options_converged(desired: &[OptionValue], observed: &[OptionValue]) -> bool {
    desired.len() == observed.len()
        && desired
            .iter()
            .all(|want| observed.iter().any(|have| want.satisfied_by(have)))
}
