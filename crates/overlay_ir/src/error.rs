//! Raw error shapes and their uniform projection.
//!
//! Errors reach the overlay in three shapes: a single error, an aggregate
//! wrapping several causes, or an array of diagnostics from a lower-level
//! compiler. [`ErrorLike`] is the closed set of those shapes; anything else
//! lands in [`ErrorLike::Unknown`] with whatever message could be salvaged.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::StackHeader;

/// Name used for records that have no error name of their own.
const DEFAULT_ERROR_NAME: &str = "Error";

/// A single thrown error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsError {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
}

impl JsError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        JsError {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Position attached to a compiler diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file: String,
    pub line: i64,
    pub column: i64,
}

/// One entry of a diagnostic array emitted by a lower-level compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub message: String,
    pub location: Option<DiagnosticLocation>,
}

impl CompilerDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        CompilerDiagnostic {
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: i64, column: i64) -> Self {
        self.location = Some(DiagnosticLocation {
            file: file.into(),
            line,
            column,
        });
        self
    }
}

/// Every error shape the overlay accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorLike {
    Single(JsError),
    /// An error wrapping several causes. `error` carries the outer name,
    /// message and stack.
    Aggregate {
        error: JsError,
        causes: Vec<ErrorLike>,
    },
    Diagnostics(Vec<CompilerDiagnostic>),
    /// A value that matched none of the known shapes.
    Unknown {
        message: String,
    },
}

impl ErrorLike {
    /// Decode an error that arrived as JSON.
    ///
    /// Shape detection happens exactly once, here. Arrays become diagnostic
    /// arrays, objects with an `errors` array become aggregates, objects with a
    /// `message` or `stack` become single errors. Anything else becomes
    /// [`ErrorLike::Unknown`]; decoding never fails.
    pub fn from_value(value: &Value) -> ErrorLike {
        WireError::deserialize(value).map_or_else(
            |_| ErrorLike::Unknown {
                message: String::new(),
            },
            ErrorLike::from,
        )
    }

    /// Project this value onto a single record, ignoring any causes.
    pub fn to_record(&self) -> ErrorRecord {
        match self {
            ErrorLike::Single(error) | ErrorLike::Aggregate { error, .. } => {
                ErrorRecord::from(error)
            }
            ErrorLike::Diagnostics(diagnostics) => diagnostics
                .first()
                .map_or_else(|| ErrorRecord::new(DEFAULT_ERROR_NAME, ""), ErrorRecord::from),
            ErrorLike::Unknown { message } => ErrorRecord::new(DEFAULT_ERROR_NAME, message.clone()),
        }
    }
}

impl From<JsError> for ErrorLike {
    fn from(error: JsError) -> Self {
        ErrorLike::Single(error)
    }
}

/// JSON error shapes, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireError {
    Diagnostics(Vec<WireDiagnosticEntry>),
    Aggregate {
        #[serde(flatten)]
        error: WireJsError,
        errors: Vec<WireError>,
    },
    Object(WireJsError),
    Text(String),
    Other(Value),
}

/// Fields of a thrown error. Values of the wrong type count as missing.
#[derive(Deserialize)]
struct WireJsError {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    stack: Option<String>,
}

impl WireJsError {
    fn is_error(&self) -> bool {
        self.message.is_some() || self.stack.is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDiagnosticEntry {
    Diagnostic(WireDiagnostic),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
struct WireDiagnostic {
    #[serde(default, deserialize_with = "lenient")]
    message: Option<String>,
    /// esbuild reports the message as `text`.
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    location: Option<WireLocation>,
}

#[derive(Deserialize)]
struct WireLocation {
    file: String,
    #[serde(default, deserialize_with = "lenient")]
    line: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    column: Option<i64>,
}

/// Accept any JSON value, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl From<WireError> for ErrorLike {
    fn from(wire: WireError) -> Self {
        match wire {
            WireError::Diagnostics(entries) => ErrorLike::Diagnostics(
                entries
                    .into_iter()
                    .map(|entry| match entry {
                        WireDiagnosticEntry::Diagnostic(diagnostic) => diagnostic.into(),
                        WireDiagnosticEntry::Other(IgnoredAny) => CompilerDiagnostic::default(),
                    })
                    .collect(),
            ),
            WireError::Aggregate { error, errors } => ErrorLike::Aggregate {
                error: error.into(),
                causes: errors.into_iter().map(ErrorLike::from).collect(),
            },
            WireError::Object(error) if error.is_error() => ErrorLike::Single(error.into()),
            WireError::Object(_) | WireError::Other(Value::Null) => ErrorLike::Unknown {
                message: String::new(),
            },
            WireError::Text(message) => ErrorLike::Unknown { message },
            WireError::Other(other) => ErrorLike::Unknown {
                message: other.to_string(),
            },
        }
    }
}

impl From<WireJsError> for JsError {
    fn from(wire: WireJsError) -> Self {
        JsError {
            name: wire.name.unwrap_or_else(|| DEFAULT_ERROR_NAME.to_owned()),
            message: wire.message.unwrap_or_default(),
            stack: wire.stack,
        }
    }
}

impl From<WireDiagnostic> for CompilerDiagnostic {
    fn from(wire: WireDiagnostic) -> Self {
        CompilerDiagnostic {
            message: wire.message.or(wire.text).unwrap_or_default(),
            location: wire.location.map(|loc| DiagnosticLocation {
                file: loc.file,
                line: loc.line.unwrap_or(0),
                column: loc.column.unwrap_or(0),
            }),
        }
    }
}

/// Uniform projection of any supported error shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorRecord {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorRecord {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }
}

impl From<&JsError> for ErrorRecord {
    fn from(error: &JsError) -> Self {
        ErrorRecord {
            name: error.name.clone(),
            message: error.message.clone(),
            stack: error.stack.clone(),
        }
    }
}

impl From<&CompilerDiagnostic> for ErrorRecord {
    /// The stack is synthesized as a single frame at the diagnostic's location.
    /// The message is folded onto the header line so none of its lines can
    /// be read back as a frame.
    fn from(diagnostic: &CompilerDiagnostic) -> Self {
        let stack = diagnostic.location.as_ref().map(|loc| {
            format!(
                "{}\n    at {}:{}:{}",
                StackHeader::new(DEFAULT_ERROR_NAME, single_line(&diagnostic.message)),
                loc.file,
                loc.line,
                loc.column
            )
        });
        ErrorRecord {
            name: DEFAULT_ERROR_NAME.to_owned(),
            message: diagnostic.message.clone(),
            stack,
        }
    }
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
