//! Gateway error types

use aula_core::ErrorClass;

/// Gateway result type
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed (HTTP {status})")]
    Authentication { status: u16, detail: Option<String> },

    #[error("Rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Server error (HTTP {0})")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Authentication { .. } => ErrorClass::Authentication,
            Error::Rejected { .. } => ErrorClass::BusinessRule,
            Error::Transport(_) | Error::InvalidUrl(_) | Error::Status(_) | Error::Decode(_) => {
                ErrorClass::Transport
            }
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::Authentication { detail: Some(detail), .. } => detail.clone(),
            Error::Authentication { .. } => "Invalid credentials or session expired".to_string(),
            Error::Rejected { detail, .. } => detail.clone(),
            Error::Transport(_) | Error::InvalidUrl(_) => {
                "Could not reach the portal. Try again.".to_string()
            }
            Error::Status(_) | Error::Decode(_) => {
                "The portal returned an unexpected response. Try again.".to_string()
            }
        }
    }

    /// Classify a non-success status and its body
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = rejection_detail(body);
        match status {
            401 | 403 => Error::Authentication { status, detail },
            400..=499 => Error::Rejected {
                status,
                detail: detail.unwrap_or_else(|| format!("Request rejected (HTTP {status})")),
            },
            _ => Error::Status(status),
        }
    }
}

/// Pull the server's explanation out of an error body.
///
/// `detail` wins; otherwise the values of `errores` are joined with spaces.
fn rejection_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    if let Some(detail) = value.get("detail") {
        return match detail {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
    }

    let mut messages = Vec::new();
    collect_messages(value.get("errores")?, &mut messages);
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(" "))
    }
}

fn collect_messages(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_messages(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_messages(v, out)),
        serde_json::Value::Null => {}
        other => out.push(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses() {
        let err = Error::from_status(401, br#"{"detail":"Credenciales invalidas"}"#);
        assert_eq!(err.class(), ErrorClass::Authentication);
        assert_eq!(err.user_message(), "Credenciales invalidas");

        let err = Error::from_status(403, b"");
        assert_eq!(err.class(), ErrorClass::Authentication);
    }

    #[test]
    fn test_business_rule_detail() {
        let err = Error::from_status(409, br#"{"detail":"No quedan cupos"}"#);
        assert_eq!(err.class(), ErrorClass::BusinessRule);
        assert_eq!(err.user_message(), "No quedan cupos");
    }

    #[test]
    fn test_business_rule_errores_joined() {
        let err = Error::from_status(
            400,
            br#"{"errores":{"correos":"Correo invalido","alumno":["Requerido"]}}"#,
        );
        assert_eq!(err.class(), ErrorClass::BusinessRule);
        let message = err.user_message();
        assert!(message.contains("Correo invalido"));
        assert!(message.contains("Requerido"));
    }

    #[test]
    fn test_rejection_without_body() {
        let err = Error::from_status(422, b"<html>");
        assert_eq!(err.user_message(), "Request rejected (HTTP 422)");
    }

    #[test]
    fn test_server_errors_are_transport() {
        let err = Error::from_status(502, b"");
        assert_eq!(err.class(), ErrorClass::Transport);
    }
}
