use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer
/// converts these into actual HTTP responses, keeping domain errors
/// decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `validation_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Build the JSON error envelope shared by every endpoint
///
/// The same shape is used for error responses and for the terminal
/// error frame of a failed event stream.
pub fn error_body<E: HttpError + ?Sized>(error: &E) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "type": error.error_type(),
            "message": error.client_message(),
        }
    })
}
