//! JSON extractor with validation.

use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// Deserializes the body and runs its `Validate` rules.
///
/// Malformed JSON and rule violations are both rejected with 400 in the
/// standard error envelope; `details` names the offending fields.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;

        data.validate()
            .map_err(|e| ApiError::validation(field_details(&e)))?;

        Ok(ValidatedJson(data))
    }
}

/// Field errors as `{field: [{code, message, params}]}`; nested list errors
/// fall back to the flattened message.
fn field_details(errors: &ValidationErrors) -> Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();
    if details.is_empty() {
        Value::String(errors.to_string())
    } else {
        Value::Object(details)
    }
}
