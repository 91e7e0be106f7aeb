use thiserror::Error;

/// Errors produced by the RAG pipeline
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid pipeline parameters or a missing required input
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Failure reported by an embedding, index or generation backend
    #[error("{service} request failed{}: {message}", code_suffix(.code))]
    Service {
        /// Which collaborator failed (e.g. "gemini", "qdrant")
        service: String,
        /// Upstream status or error code, when one was reported
        code: Option<i32>,
        message: String,
    },

    /// No text or no chunks to work with
    #[error("Empty input: {0}")]
    EmptyInput(String),
}

fn code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with status {}", code),
        None => String::new(),
    }
}

impl RagError {
    /// Build a service error without an upstream code
    pub fn service(service: &str, message: impl Into<String>) -> Self {
        RagError::Service {
            service: service.to_string(),
            code: None,
            message: message.into(),
        }
    }

    /// Build a service error carrying an upstream code
    pub fn service_with_code(service: &str, code: i32, message: impl Into<String>) -> Self {
        RagError::Service {
            service: service.to_string(),
            code: Some(code),
            message: message.into(),
        }
    }

    /// Wrap a transport error from reqwest, keeping the HTTP status if any
    pub fn from_http(service: &str, err: reqwest::Error) -> Self {
        RagError::Service {
            service: service.to_string(),
            code: err.status().map(|s| i32::from(s.as_u16())),
            message: err.to_string(),
        }
    }

    /// Upstream code of a service error
    pub fn code(&self) -> Option<i32> {
        match self {
            RagError::Service { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = RagError::service_with_code("gemini", 503, "Service Unavailable");
        assert_eq!(
            err.to_string(),
            "gemini request failed with status 503: Service Unavailable"
        );
        assert_eq!(err.code(), Some(503));

        let err = RagError::service("qdrant", "connection refused");
        assert_eq!(err.to_string(), "qdrant request failed: connection refused");
        assert_eq!(err.code(), None);
    }
}
