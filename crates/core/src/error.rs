use crate::ast::Loc;

/// Exit status for a directive problem (malformed, unmatched, unterminated).
pub const EXIT_DIRECTIVE: i32 = 2;
/// Exit status for unreadable or unparsable input.
pub const EXIT_INPUT: i32 = 1;

/// Everything that can go wrong between reading a file and emitting the
/// rewritten tree. Directive kinds carry the location of the offending
/// marker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: cannot read input: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{loc}: {message}")]
    Lex { loc: Loc, message: String },

    #[error("{loc}: {message}")]
    Parse { loc: Loc, message: String },

    /// Interchange JSON that does not decode to a tree.
    #[error("{path}: invalid tree: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The argument of a directive is not a single bare identifier.
    #[error("{loc}: {directive} expects a single bare identifier naming an environment variable")]
    MalformedArgument { loc: Loc, directive: String },

    /// `ELSE` or `END` with no open `IFDEF`.
    #[error("{loc}: [%%{directive}] without a matching [%%IFDEF]")]
    UnmatchedDirective { loc: Loc, directive: String },

    /// An `IFDEF` still open when its structure ends. `loc` is the innermost
    /// unclosed `IFDEF`.
    #[error("{loc}: [%%IFDEF] is never closed by [%%END] ({depth} block(s) open)")]
    UnterminatedBlock { loc: Loc, depth: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn lex(file: &str, line: u32, message: impl Into<String>) -> Self {
        Error::Lex {
            loc: Loc::new(file, line),
            message: message.into(),
        }
    }

    pub fn parse(file: &str, line: u32, message: impl Into<String>) -> Self {
        Error::Parse {
            loc: Loc::new(file, line),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io { .. } => "io",
            Error::Lex { .. } => "lex",
            Error::Parse { .. } => "parse",
            Error::Json { .. } => "json",
            Error::MalformedArgument { .. } => "malformed_argument",
            Error::UnmatchedDirective { .. } => "unmatched_directive",
            Error::UnterminatedBlock { .. } => "unterminated_block",
        }
    }

    /// Source location, when the error points into a tree.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            Error::Lex { loc, .. }
            | Error::Parse { loc, .. }
            | Error::MalformedArgument { loc, .. }
            | Error::UnmatchedDirective { loc, .. }
            | Error::UnterminatedBlock { loc, .. } => Some(loc),
            Error::Io { .. } | Error::Json { .. } => None,
        }
    }

    pub fn is_directive_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedArgument { .. }
                | Error::UnmatchedDirective { .. }
                | Error::UnterminatedBlock { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_directive_error() {
            EXIT_DIRECTIVE
        } else {
            EXIT_INPUT
        }
    }

    /// Machine-readable form used by `--output json`. Always carries every
    /// key (null where not applicable).
    pub fn to_json_value(&self) -> serde_json::Value {
        let (file, line) = match self.loc() {
            Some(loc) => (
                serde_json::Value::from(loc.file.clone()),
                serde_json::Value::from(loc.line),
            ),
            None => (serde_json::Value::Null, serde_json::Value::Null),
        };
        serde_json::json!({
            "file":    file,
            "kind":    self.kind(),
            "line":    line,
            "message": self.to_string(),
        })
    }
}
