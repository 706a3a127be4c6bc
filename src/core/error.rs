use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure code carried next to a human-readable `error`.
///
/// Serialized as the bare string (`"INVALID_VIN"`, `"API_ERROR"`, ...). Codes
/// reported by the VIN registry that fall outside this taxonomy are carried
/// verbatim in [`ErrorCode::Upstream`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    InvalidVin,
    VinNotFound,
    NoData,
    ApiError,
    InvalidUrl,
    Upstream(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidVin => "INVALID_VIN",
            ErrorCode::VinNotFound => "VIN_NOT_FOUND",
            ErrorCode::NoData => "NO_DATA",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::Upstream(code) => code.as_str(),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INVALID_VIN" => ErrorCode::InvalidVin,
            "VIN_NOT_FOUND" => ErrorCode::VinNotFound,
            "NO_DATA" => ErrorCode::NoData,
            "API_ERROR" => ErrorCode::ApiError,
            "INVALID_URL" => ErrorCode::InvalidUrl,
            _ => ErrorCode::Upstream(value),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

/// Failures raised by the I/O edges of the pipeline (registry, specs lookup,
/// scraping providers). Boundary functions convert these into result values.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no rendering provider configured; set SCRAPER_ENDPOINT to use rendered mode")]
    RenderingUnavailable,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ScoutError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScoutError::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            ScoutError::Transport { .. }
            | ScoutError::Status { .. }
            | ScoutError::Decode { .. }
            | ScoutError::RenderingUnavailable
            | ScoutError::Catalog(_) => ErrorCode::ApiError,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("trim catalog has no \"Other\" fallback entry")]
    MissingFallback,
    #[error("trim catalog \"Other\" fallback entry is empty")]
    EmptyFallback,
    #[error("trim catalog lists make \"{0}\" more than once")]
    DuplicateMake(String),
    #[error("trim catalog could not be read: {0}")]
    Unreadable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_strings() {
        for code in [
            ErrorCode::InvalidVin,
            ErrorCode::VinNotFound,
            ErrorCode::NoData,
            ErrorCode::ApiError,
            ErrorCode::InvalidUrl,
        ] {
            let s: String = code.clone().into();
            assert_eq!(ErrorCode::from(s), code);
        }
    }

    #[test]
    fn unknown_codes_are_carried_verbatim() {
        let code = ErrorCode::from("11".to_string());
        assert_eq!(code, ErrorCode::Upstream("11".into()));
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"11\"");
    }

    #[test]
    fn status_errors_map_to_api_error() {
        let err = ScoutError::Status {
            endpoint: "https://vpic.example".into(),
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.code(), ErrorCode::ApiError);
        assert!(err.to_string().contains("503"));
    }
}
