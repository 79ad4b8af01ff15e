//! Per-invocation aggregate of dependency probe outcomes.

use serde::Serialize;

use crate::probes::ProbeError;

pub const SERVICE_DATABASE: &str = "database";
pub const SERVICE_STORAGE: &str = "storage";
pub const SERVICE_IDENTITY: &str = "identity";

/// Reported health of one service or of the whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
}

impl Health {
    fn from_ok(ok: bool) -> Self {
        if ok {
            Health::Healthy
        } else {
            Health::Unhealthy
        }
    }

    pub fn is_healthy(self) -> bool {
        self == Health::Healthy
    }
}

/// Per-service mapping serialized into the `services` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub database: Health,
    pub storage: Health,
    pub identity: Health,
}

/// Outcome of one probe sequence.
///
/// `errors` holds one `"<service>: <message>"` entry per failed probe, in
/// database, storage, identity order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub services: ServiceHealth,
    pub errors: Vec<String>,
}

impl ServiceStatus {
    pub fn from_outcomes(
        database: Result<(), ProbeError>,
        storage: Result<(), ProbeError>,
        identity: Result<(), ProbeError>,
    ) -> Self {
        let outcomes = [
            (SERVICE_DATABASE, &database),
            (SERVICE_STORAGE, &storage),
            (SERVICE_IDENTITY, &identity),
        ];

        let errors = outcomes
            .iter()
            .filter_map(|(name, outcome)| {
                outcome
                    .as_ref()
                    .err()
                    .map(|e| format!("{}: {}", name, e))
            })
            .collect();

        Self {
            services: ServiceHealth {
                database: Health::from_ok(database.is_ok()),
                storage: Health::from_ok(storage.is_ok()),
                identity: Health::from_ok(identity.is_ok()),
            },
            errors,
        }
    }

    /// Healthy only when every service is.
    pub fn overall(&self) -> Health {
        let s = &self.services;
        Health::from_ok(
            s.database.is_healthy() && s.storage.is_healthy() && s.identity.is_healthy(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(msg: &str) -> Result<(), ProbeError> {
        Err(ProbeError::Unavailable(msg.to_string()))
    }

    #[test]
    fn test_all_ok_is_healthy() {
        let status = ServiceStatus::from_outcomes(Ok(()), Ok(()), Ok(()));
        assert_eq!(status.overall(), Health::Healthy);
        assert!(status.errors.is_empty());
    }

    #[test]
    fn test_every_failure_combination() {
        for mask in 0u8..8 {
            let outcome = |bit: u8| if mask & bit != 0 { down("x") } else { Ok(()) };
            let status = ServiceStatus::from_outcomes(outcome(1), outcome(2), outcome(4));

            let failures = mask.count_ones() as usize;
            assert_eq!(status.errors.len(), failures, "mask {:03b}", mask);
            assert_eq!(status.overall().is_healthy(), failures == 0);
        }
    }

    #[test]
    fn test_errors_keep_fixed_order() {
        let status = ServiceStatus::from_outcomes(down("table missing"), Ok(()), down("throttled"));
        assert_eq!(
            status.errors,
            vec!["database: table missing", "identity: throttled"]
        );
        assert_eq!(status.services.storage, Health::Healthy);
    }

    #[test]
    fn test_health_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Health::Unhealthy).unwrap(), "\"unhealthy\"");
    }
}
