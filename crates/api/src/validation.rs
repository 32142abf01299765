use validator::Validate;

use crate::error::ApiError;

pub fn validate<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|err| {
        tracing::debug!(error = %err, "payload validation failed");
        ApiError::Validation(err.to_string())
    })
}
