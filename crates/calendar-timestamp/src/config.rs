//! Injectable zone configuration.
//!
//! The "local" zone is an explicit value rather than ambient process state.
//! [`ZoneConfig::default`] reads the host, tests and services can pin it.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::Disambiguation;
use crate::error::{CalendarError, Result};
use crate::zone;

/// Environment variable naming the local zone, checked by [`ZoneConfig::from_env`].
pub const LOCAL_ZONE_ENV: &str = "CALENDAR_TIMESTAMP_TZ";

/// Environment variable naming the [`Disambiguation`] policy, checked by
/// [`ZoneConfig::from_env`].
pub const DISAMBIGUATION_ENV: &str = "CALENDAR_TIMESTAMP_DISAMBIGUATION";

/// Which zone counts as "local", and how wall-clock times in DST gaps and
/// folds are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone attached when a constructor is given no zone.
    #[serde(default = "zone::system_local_zone")]
    pub local_zone: Tz,
    /// Policy used whenever a timestamp is rebuilt from wall-clock fields.
    #[serde(default)]
    pub disambiguation: Disambiguation,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::system()
    }
}

impl ZoneConfig {
    /// Host local zone, compatible disambiguation.
    pub fn system() -> Self {
        Self {
            local_zone: zone::system_local_zone(),
            disambiguation: Disambiguation::default(),
        }
    }

    /// A configuration whose local zone is `zone`.
    pub fn pinned(zone: Tz) -> Self {
        Self {
            local_zone: zone,
            disambiguation: Disambiguation::default(),
        }
    }

    /// The system configuration, overridden by [`LOCAL_ZONE_ENV`] and
    /// [`DISAMBIGUATION_ENV`] when set.
    ///
    /// # Errors
    ///
    /// [`CalendarError::UnknownTimezone`] if the zone variable names no zone,
    /// [`CalendarError::InvalidConfig`] if the policy variable is unrecognized.
    pub fn from_env() -> Result<Self> {
        let zone = std::env::var(LOCAL_ZONE_ENV).ok();
        let policy = std::env::var(DISAMBIGUATION_ENV).ok();
        let base = Self::system();
        let config = base.overridden(zone.as_deref(), policy.as_deref())?;
        tracing::debug!(
            zone = config.local_zone.name(),
            disambiguation = ?config.disambiguation,
            "zone config loaded from environment"
        );
        Ok(config)
    }

    /// Apply a zone name and a policy name on top of `self`, each only when
    /// present.
    fn overridden(self, zone: Option<&str>, policy: Option<&str>) -> Result<Self> {
        let mut config = self;
        if let Some(name) = zone {
            config = config.with_local_zone(name)?;
        }
        if let Some(policy) = policy {
            config.disambiguation = parse_disambiguation(policy)?;
        }
        Ok(config)
    }

    /// Decode a configuration such as
    /// `{"local_zone": "Europe/Berlin", "disambiguation": "reject"}`.
    /// Missing fields fall back to the system values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CalendarError::InvalidConfig(e.to_string()))
    }

    /// Replace the local zone with the zone named `name`.
    pub fn with_local_zone(self, name: &str) -> Result<Self> {
        Ok(Self {
            local_zone: zone::resolve_timezone(name)?,
            ..self
        })
    }

    pub fn with_disambiguation(self, disambiguation: Disambiguation) -> Self {
        Self {
            disambiguation,
            ..self
        }
    }
}

fn parse_disambiguation(s: &str) -> Result<Disambiguation> {
    match s.trim().to_ascii_lowercase().as_str() {
        "compatible" => Ok(Disambiguation::Compatible),
        "earlier" => Ok(Disambiguation::Earlier),
        "later" => Ok(Disambiguation::Later),
        "reject" => Ok(Disambiguation::Reject),
        other => Err(CalendarError::InvalidConfig(format!(
            "unknown disambiguation policy '{other}'"
        ))),
    }
}
