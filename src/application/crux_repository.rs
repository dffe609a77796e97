// Repository trait for CrUX record access
use crate::domain::crux::QueryResponse;
use crate::domain::submission::FormFactor;
use async_trait::async_trait;

pub const NO_METRICS_MESSAGE: &str = "No metrics found in response";

/// Failures of a single CrUX query. `Display` is the message shown to the
/// user for that URL.
#[derive(Debug, thiserror::Error)]
pub enum CruxError {
    /// The request never produced a response (connect error, timeout).
    #[error("No result received from Google CrUX API")]
    Transport(String),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose body is not a CrUX record.
    #[error("No metrics found in response")]
    MalformedBody(String),
}

#[async_trait]
pub trait CruxRepository: Send + Sync {
    /// Query the 28-day record for one origin and device class
    async fn query_record(
        &self,
        origin: &str,
        form_factor: FormFactor,
    ) -> Result<QueryResponse, CruxError>;
}
