//! Errors raised while editing a treatment plan.

use thiserror::Error;

use odonto_core::ServiceId;

/// Treatment plan errors.
#[derive(Error, Debug)]
pub enum PlanError {
    /// No line with this key in the current plan.
    #[error("no treatment plan line with key {0:?}")]
    LineNotFound(String),

    /// The service is not offered by the service catalog.
    #[error("service {0} is not in the service catalog")]
    UnknownService(ServiceId),

    /// The service catalog could not be read.
    #[error("service catalog error: {0}")]
    Catalog(String),
}
