use std::fmt;

/// Configuration-time errors. Registration panics carry one of these as
/// the payload; `RouterConfig::load` also reports plain I/O/parse
/// failures through the same enum via `anyhow`.
#[derive(Debug)]
#[allow(dead_code)]
pub enum RouterError {
    /// Pattern did not begin with `/`.
    MissingLeadingSlash(String),
    /// `:` or `*` segment had an empty name.
    EmptyParamName(String),
    /// `*name` was not the final segment of the pattern.
    CatchAllNotFinal(String),
    /// The same pattern was registered twice for one method.
    DuplicateRoute(String),
    /// A wildcard conflicts with a static child, or two wildcards with
    /// different names/sigils meet at the same node.
    WildcardConflict { pattern: String, at: String },
    /// `ServeFiles` was given a pattern that doesn't end in `/*filepath`.
    BadServeFilesPattern(String),
    Config(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::MissingLeadingSlash(p) => {
                write!(f, "path must begin with '/', got: '{p}'")
            }
            RouterError::EmptyParamName(p) => {
                write!(f, "parameter name must not be empty in pattern: '{p}'")
            }
            RouterError::CatchAllNotFinal(p) => {
                write!(f, "catch-all must be the final segment in pattern: '{p}'")
            }
            RouterError::DuplicateRoute(p) => write!(f, "route already registered: '{p}'"),
            RouterError::WildcardConflict { pattern, at } => write!(
                f,
                "'{pattern}' conflicts with an existing wildcard at '{at}'"
            ),
            RouterError::BadServeFilesPattern(p) => {
                write!(f, "ServeFiles pattern must end in '/*filepath', got: '{p}'")
            }
            RouterError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for RouterError {}
