//! Response envelope decoding.
//!
//! Every v4 API response is wrapped as
//! `{ "result": ..., "success": bool, "errors": [...], "messages": [...] }`.
//! A missing key is expected rather than exceptional: an absent, `null` or
//! empty-array `result` decodes to the target type's default, an absent
//! `success` to `false`.

use crate::transport::Response;
use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Decode the `result` member of a response, falling back to `T::default()`.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if the body is not valid JSON
/// or `result` does not have the shape of `T`.
pub fn result_or_default<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let body = response.json::<Value>()?;
    log_unsuccessful(&body);
    extract_result(body)
}

/// Decode the `success` flag of a response, falling back to `false`.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if the body is not valid JSON.
pub fn success_flag(response: Response) -> Result<bool> {
    let body = response.json::<Value>()?;
    log_unsuccessful(&body);
    Ok(body.get("success").and_then(Value::as_bool).unwrap_or(false))
}

fn extract_result<T>(mut body: Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match body.get_mut("result").map(Value::take) {
        None | Some(Value::Null) => Ok(T::default()),
        // Some endpoints report "nothing" as `[]` even where an object is expected.
        Some(Value::Array(items)) if items.is_empty() => Ok(T::default()),
        Some(result) => Ok(serde_json::from_value(result)?),
    }
}

fn log_unsuccessful(body: &Value) {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let errors = body.get("errors").cloned().unwrap_or(Value::Null);
        debug!(%errors, "API envelope reported success=false");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use reqwest::StatusCode;
    use serde_json::{json, Map};

    fn response(body: &str) -> Response {
        Response::new(StatusCode::OK, body)
    }

    #[test]
    fn result_is_returned_verbatim() {
        let body = json!({ "success": true, "result": [{ "id": "a" }, { "id": "b" }] });
        let result: Vec<Value> = result_or_default(response(&body.to_string())).unwrap();
        assert_eq!(result, vec![json!({ "id": "a" }), json!({ "id": "b" })]);
    }

    #[test]
    fn missing_result_defaults() {
        let result: Vec<Value> = result_or_default(response(r#"{"success":true}"#)).unwrap();
        assert!(result.is_empty());

        let result: Map<String, Value> = result_or_default(response("{}")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn null_result_defaults() {
        let result: Map<String, Value> =
            result_or_default(response(r#"{"success":false,"result":null,"errors":[]}"#)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn empty_array_result_defaults_for_objects() {
        let result: Map<String, Value> =
            result_or_default(response(r#"{"success":true,"result":[]}"#)).unwrap();
        assert!(result.is_empty());

        let result: Vec<Value> = result_or_default(response(r#"{"result":[]}"#)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn non_object_body_defaults() {
        let result: Vec<Value> = result_or_default(response("[]")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let err = result_or_default::<Vec<Value>>(response("<html>")).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = success_flag(response("")).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn mismatched_result_shape_is_a_decode_error() {
        let err = result_or_default::<Vec<Value>>(response(r#"{"result":"nope"}"#)).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn success_flag_reads_boolean() {
        assert!(success_flag(response(r#"{"success":true}"#)).unwrap());
        assert!(!success_flag(response(r#"{"success":false}"#)).unwrap());
        assert!(!success_flag(response(r#"{"result":{"id":"x"}}"#)).unwrap());
        assert!(!success_flag(response(r#"{"success":"yes"}"#)).unwrap());
    }
}
