//! Application error types.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Application error that can be serialized for the front end.
#[derive(Debug)]
pub struct AppError {
    payload: HashMap<String, String>,
    kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Server not found
    ServerNotFound,
    /// Server is still starting
    ServerStarting,
    /// Server name missing or malformed
    InvalidServerName,
    /// Server id is not a valid identifier
    InvalidServerId,
    /// Game version not offered
    VersionNotSupported,
    /// Build variant not recognised
    InvalidBuild,
    /// Plugin not found
    PluginNotFound,
    /// Player not found
    PlayerNotFound,
    /// Uploaded build has the wrong file type
    InvalidUpload,
    /// Feature requires a higher plan
    PlanRequired,
    /// Required text field left blank
    FieldRequired,
    /// Tariff not found
    TariffNotFound,
    /// Payment widget not loaded
    PaymentWidgetUnavailable,
    /// A payment is already being processed
    PaymentInProgress,
    /// Configuration error
    Config,
    /// File system error
    Io,
    /// General error
    Other,
}

impl ErrorKind {
    pub fn code(&self) -> u32 {
        match self {
            Self::ServerNotFound => 1001,
            Self::ServerStarting => 1002,
            Self::InvalidServerName => 1003,
            Self::InvalidServerId => 1004,
            Self::VersionNotSupported => 1005,
            Self::InvalidBuild => 1006,
            Self::PluginNotFound => 1101,
            Self::PlayerNotFound => 1102,
            Self::InvalidUpload => 1103,
            Self::PlanRequired => 1104,
            Self::FieldRequired => 1105,
            Self::TariffNotFound => 3001,
            Self::PaymentWidgetUnavailable => 3002,
            Self::PaymentInProgress => 3003,
            Self::Config => 2001,
            Self::Io => 2002,
            Self::Other => 9999,
        }
    }
}

impl AppError {
    pub fn new(kind: ErrorKind, payload: HashMap<String, String>) -> Self {
        Self { payload, kind }
    }

    /// Create an error with a single "detail" key from a non-empty string,
    /// or an empty payload if the string is empty.
    fn with_detail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let payload = if detail.is_empty() {
            HashMap::new()
        } else {
            HashMap::from([("detail".to_string(), detail)])
        };
        Self::new(kind, payload)
    }

    fn with_field(kind: ErrorKind, key: &str, value: &str) -> Self {
        Self::new(kind, HashMap::from([(key.to_string(), value.to_string())]))
    }

    pub fn server_not_found(id: &str) -> Self {
        Self::with_field(ErrorKind::ServerNotFound, "id", id)
    }

    pub fn server_starting(id: &str) -> Self {
        Self::with_field(ErrorKind::ServerStarting, "id", id)
    }

    pub fn invalid_server_name(message: impl Into<String>) -> Self {
        Self::with_detail(ErrorKind::InvalidServerName, message)
    }

    pub fn invalid_server_id(id: &str) -> Self {
        Self::with_field(ErrorKind::InvalidServerId, "id", id)
    }

    pub fn version_not_supported(version: &str) -> Self {
        Self::with_field(ErrorKind::VersionNotSupported, "version", version)
    }

    pub fn invalid_build(build: &str) -> Self {
        Self::with_field(ErrorKind::InvalidBuild, "build", build)
    }

    pub fn plugin_not_found(name: &str) -> Self {
        Self::with_field(ErrorKind::PluginNotFound, "name", name)
    }

    pub fn player_not_found(name: &str) -> Self {
        Self::with_field(ErrorKind::PlayerNotFound, "name", name)
    }

    pub fn invalid_upload(file_name: &str) -> Self {
        Self::with_field(ErrorKind::InvalidUpload, "file", file_name)
    }

    pub fn plan_required(plan: &str) -> Self {
        Self::with_field(ErrorKind::PlanRequired, "plan", plan)
    }

    pub fn field_required(field: &str) -> Self {
        Self::with_field(ErrorKind::FieldRequired, "field", field)
    }

    pub fn tariff_not_found(id: &str) -> Self {
        Self::with_field(ErrorKind::TariffNotFound, "id", id)
    }

    pub fn payment_widget_unavailable() -> Self {
        Self::new(ErrorKind::PaymentWidgetUnavailable, HashMap::new())
    }

    pub fn payment_in_progress() -> Self {
        Self::new(ErrorKind::PaymentInProgress, HashMap::new())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::with_detail(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::with_detail(ErrorKind::Io, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::with_detail(ErrorKind::Other, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn payload(&self) -> &HashMap<String, String> {
        &self.payload
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.payload.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            let mut pairs: Vec<String> = self
                .payload
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            pairs.sort();
            write!(f, "{:?}: {}", self.kind, pairs.join(", "))
        }
    }
}

impl std::error::Error for AppError {}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct as _;
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("code", &self.kind.code())?;
        s.serialize_field("payload", &self.payload)?;
        s.end()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::other(err.to_string())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_and_payload() {
        let err = AppError::server_not_found("abc");
        let value = serde_json::to_value(&err).expect("serialize");
        assert_eq!(value["code"], serde_json::json!(1001));
        assert_eq!(value["payload"]["id"], serde_json::json!("abc"));
    }

    #[test]
    fn display_lists_payload_pairs() {
        let err = AppError::version_not_supported("1.8.9");
        assert_eq!(err.to_string(), "VersionNotSupported: version=1.8.9");
        assert_eq!(
            AppError::payment_widget_unavailable().to_string(),
            "PaymentWidgetUnavailable"
        );
    }

    #[test]
    fn empty_detail_yields_empty_payload() {
        let err = AppError::config("");
        assert!(err.payload().is_empty());
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
