use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebshellError>;

/// Every protocol violation the bus can report.
///
/// Call sites build one of these from structured fields and hand it to the
/// [`Reporter`](crate::Reporter), which decides whether it is silenced, logged or returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebshellError {
    #[error(
        "Feature {identifier} sent a message to shell handler \"{handler_id}\" which has not been declared; \
         declare it with `declare_shell_handler`"
    )]
    MissingShellHandler {
        identifier: String,
        handler_id: String,
    },

    #[error(
        "Feature {identifier} has no web handler \"{handler_id}\"; declare it with `declare_web_handler`"
    )]
    MissingWebHandler {
        identifier: String,
        handler_id: String,
    },

    #[error(
        "Feature {identifier} is not registered in this webshell; pass the same instance to the mount"
    )]
    MissingInShell { identifier: String },

    #[error("Feature {identifier} threw in the web runtime: {message}")]
    WebScriptError { identifier: String, message: String },

    #[error("Cannot inject script into the web view: {reason}")]
    CannotInjectScript { reason: String },

    #[error(
        "Prop \"{prop}\" is declared by both {previous_identifier} and {identifier}; \
         a prop name can belong to only one feature"
    )]
    DuplicatedRegisteredProp {
        prop: String,
        previous_identifier: String,
        identifier: String,
    },

    #[error("Invalid feature {identifier}: {reason}")]
    InvalidFeature { identifier: String, reason: String },
}

impl WebshellError {
    /// Stable name of the error kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            WebshellError::MissingShellHandler { .. } => "MISSING_SHELL_HANDLER",
            WebshellError::MissingWebHandler { .. } => "MISSING_WEB_HANDLER",
            WebshellError::MissingInShell { .. } => "MISSING_IN_SHELL",
            WebshellError::WebScriptError { .. } => "SCRIPT_ERROR",
            WebshellError::CannotInjectScript { .. } => "CANNOT_INJECT_SCRIPT",
            WebshellError::DuplicatedRegisteredProp { .. } => "DUPLICATED_REGISTERED_PROP",
            WebshellError::InvalidFeature { .. } => "INVALID_FEATURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_cite_structured_fields() {
        let err = WebshellError::DuplicatedRegisteredProp {
            prop: "onThing".into(),
            previous_identifier: "test.a".into(),
            identifier: "test.b".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("onThing"));
        assert!(msg.contains("test.a"));
        assert!(msg.contains("test.b"));
        assert!(!msg.contains("wins"));
        assert_eq!(err.kind(), "DUPLICATED_REGISTERED_PROP");
    }

    #[test]
    fn test_script_error_kind() {
        let err = WebshellError::WebScriptError {
            identifier: "test.a".into(),
            message: "boom".into(),
        };
        assert_eq!(err.kind(), "SCRIPT_ERROR");
        assert_eq!(err.to_string(), "Feature test.a threw in the web runtime: boom");
    }

    #[test]
    fn test_missing_shell_handler_message() {
        let err = WebshellError::MissingShellHandler {
            identifier: "test.hello".into(),
            handler_id: "other".into(),
        };
        assert!(err.to_string().contains("\"other\""));
        assert_eq!(err.kind(), "MISSING_SHELL_HANDLER");
    }
}
