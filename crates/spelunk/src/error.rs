use std::path::PathBuf;

use thiserror::Error;

/// Boxed error used to carry causes from plug-ins and caller-defined extensions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by [`Spelunker`](crate::Spelunker) operations
pub type Result<T, E = SpelunkError> = std::result::Result<T, E>;

/// Errors produced while turning text into a [`SecretCoord`](crate::SecretCoord)
#[derive(Debug, Error)]
pub enum CoordError {
    /// The text is not a valid generic URI
    #[error("failed to parse coordinates ({input:?})")]
    ParseFailed {
        input: String,
        #[source]
        source: crate::coord::UriError,
    },

    /// No URI scheme
    #[error("coordinates have no type (URI scheme): {input:?}")]
    NoType { input: String },

    /// Empty authority and path
    #[error("coordinates point to no location (URI authority+path): {input:?}")]
    NoLocation { input: String },

    /// A query pair could not be unescaped
    #[error("failed to parse modifiers (pair: {pair:?} / token: {token:?})")]
    ModifierParseFailed {
        pair: String,
        token: String,
        #[source]
        source: crate::coord::UnescapeError,
    },
}

/// Errors returned by a [`SecretSource`](crate::SecretSource)
///
/// The first three variants are the standard lookup errors shared by every
/// source; the rest are specific to one or more built-in or plug-in sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Secret not found
    #[error("secret not found ({location:?})")]
    NotFound {
        location: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Secret found, but the requested key is not in it
    #[error("secret key not found ({location:?})")]
    KeyNotFound { location: String },

    /// Backend could not be reached or answered with an error
    #[error("could not fetch secret ({location:?})")]
    FetchFailed {
        location: String,
        #[source]
        source: BoxError,
    },

    /// Environment variable not set
    #[error("environment variable does not exist: {name:?}")]
    EnvMissing { name: String },

    /// Environment variable set, but not valid unicode
    #[error("environment variable is not valid unicode: {name:?}")]
    EnvNotUnicode { name: String },

    /// File exists but could not be opened
    #[error("failed to open secret file ({path:?})")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File opened but could not be read to the end
    #[error("failed to read secret file ({path:?})")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Secret bytes could not be decoded into a string
    #[error("failed to decode secret")]
    DecodeFailed {
        #[source]
        source: BoxError,
    },

    /// Location does not have the shape the source expects
    #[error("invalid secret location format: expected {expected}, got {location:?}")]
    InvalidLocation {
        location: String,
        expected: &'static str,
    },

    /// A name inside the location is not acceptable to the backend
    #[error("invalid {what} {name:?}")]
    InvalidName { what: &'static str, name: String },

    /// Error from a caller-defined source
    #[error(transparent)]
    Custom(BoxError),
}

impl SourceError {
    /// Create a not-found error without an underlying cause
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
            source: None,
        }
    }

    /// Create a fetch error wrapping the backend's cause
    pub fn fetch_failed(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::FetchFailed {
            location: location.into(),
            source: source.into(),
        }
    }

    /// Create a decode error wrapping the decoder's cause
    pub fn decode_failed(source: impl Into<BoxError>) -> Self {
        Self::DecodeFailed {
            source: source.into(),
        }
    }
}

/// Errors returned by a [`SecretModifier`](crate::SecretModifier)
#[derive(Debug, Error)]
pub enum ModifierError {
    /// Current value is not a JSON document
    #[error("secret is not a valid JSON")]
    NotJson(#[source] serde_json::Error),

    /// The JSONPath could not be parsed or selected nothing
    #[error("failed to apply JSONPath ({path:?})")]
    JsonPathFailed {
        path: String,
        #[source]
        source: BoxError,
    },

    /// The JSONPath matched, but the result cannot be turned into a string
    #[error("failed to match JSONPath: {reason}")]
    MatchFailed { reason: String },

    /// Error from a caller-defined modifier
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors returned by [`Spelunker`](crate::Spelunker)
#[derive(Debug, Error)]
pub enum SpelunkError {
    /// Coordinates could not be parsed
    #[error(transparent)]
    Coord(#[from] CoordError),

    /// No source registered for the scheme
    #[error("unsupported secret source type: {scheme:?}")]
    UnsupportedSource { scheme: String },

    /// No modifier registered for the key
    #[error("unsupported secret modifier type: {key:?}")]
    UnsupportedModifier { key: String },

    /// The source failed
    #[error("failed to dig-up secret from {scheme}://{location}")]
    DigUpFailed {
        scheme: String,
        location: String,
        #[source]
        source: SourceError,
    },

    /// A modifier failed
    #[error("failed to apply modifier {key:?}")]
    ModifierFailed {
        key: String,
        #[source]
        source: ModifierError,
    },
}

impl SpelunkError {
    /// The source error, when this is a [`SpelunkError::DigUpFailed`]
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            Self::DigUpFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The modifier error, when this is a [`SpelunkError::ModifierFailed`]
    pub fn modifier_error(&self) -> Option<&ModifierError> {
        match self {
            Self::ModifierFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
