//! Error types for the Brawl interpreter.
//!
//! Every failure mode is fatal: the evaluator raises a `BrawlError`,
//! the error propagates to the embedding boundary, and the binary
//! renders it and exits non-zero. There is no recovery construct in
//! the language.
//!
//! # Error Categories
//!
//! - **Lexical**: malformed source text (unterminated literals,
//!   unknown character sequences)
//! - **Syntactic**: unexpected tokens during the parse/evaluate walk
//! - **Type**: operand or operation type mismatches
//! - **Arithmetic**: division and modulo by zero
//! - **Resource**: call-depth and symbol-table exhaustion
//! - **Lookup**: undefined identifiers

use std::fmt;

/// Result alias used throughout the interpreter.
pub type BrawlResult<T> = Result<T, BrawlError>;

/// A plain source position, used before any token exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The offending token plus evaluator state, captured at raise time.
#[derive(Debug, Clone, Default)]
pub struct TokenContext {
    /// Lexeme of the offending token.
    pub lexeme: String,
    /// Human-readable token kind.
    pub kind: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Call depth when the error was raised.
    pub depth: usize,
}

impl fmt::Display for TokenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Comprehensive error type for Brawl.
#[derive(Debug, Clone)]
pub enum BrawlError {
    // Lexical errors
    /// String literal with no closing quote.
    UnterminatedString { location: SourceLocation },

    /// Block comment with no closing `*/`.
    UnterminatedComment { location: SourceLocation },

    /// Character sequence that forms no token.
    UnknownSequence {
        text: String,
        location: SourceLocation,
    },

    /// Numeric literal outside the 64-bit signed range.
    NumberOutOfRange {
        text: String,
        location: SourceLocation,
    },

    // Syntactic errors
    /// Unexpected token during the parse/evaluate walk.
    UnexpectedToken {
        expected: String,
        context: TokenContext,
    },

    /// Assignment whose left side is not a bare identifier.
    InvalidAssignmentTarget { context: TokenContext },

    // Type errors
    /// Operand type mismatch.
    TypeMismatch {
        message: String,
        context: TokenContext,
    },

    /// Call applied to a value that is not a closure.
    NotCallable {
        type_name: &'static str,
        context: TokenContext,
    },

    /// Call with the wrong number of arguments.
    ArityMismatch {
        expected: usize,
        got: usize,
        context: TokenContext,
    },

    // Arithmetic errors
    /// Division by zero.
    DivisionByZero { context: TokenContext },

    /// Modulo by zero.
    ModuloByZero { context: TokenContext },

    // Resource errors
    /// Call depth exceeded the configured limit.
    StackOverflow {
        max_depth: usize,
        context: TokenContext,
    },

    /// Symbol table reached its capacity.
    SymbolTableFull {
        capacity: usize,
        location: SourceLocation,
    },

    // Lookup errors
    /// Identifier with no binding in the current or global frame.
    UndefinedIdentifier {
        name: String,
        context: TokenContext,
    },
}

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntactic,
    Type,
    Arithmetic,
    Resource,
    Lookup,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "lexical"),
            ErrorCategory::Syntactic => write!(f, "syntax"),
            ErrorCategory::Type => write!(f, "type"),
            ErrorCategory::Arithmetic => write!(f, "arithmetic"),
            ErrorCategory::Resource => write!(f, "resource"),
            ErrorCategory::Lookup => write!(f, "lookup"),
        }
    }
}

impl fmt::Display for BrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrawlError::UnterminatedString { location } => {
                write!(f, "[{}] Unterminated string literal", location)
            }
            BrawlError::UnterminatedComment { location } => {
                write!(f, "[{}] Unterminated block comment", location)
            }
            BrawlError::UnknownSequence { text, location } => {
                write!(f, "[{}] Unknown character sequence: '{}'", location, text)
            }
            BrawlError::NumberOutOfRange { text, location } => {
                write!(
                    f,
                    "[{}] Numeric literal out of 64-bit range: '{}'",
                    location, text
                )
            }
            BrawlError::UnexpectedToken { expected, context } => {
                write!(
                    f,
                    "[{}] Unexpected token: expected {}, found '{}'",
                    context, expected, context.lexeme
                )
            }
            BrawlError::InvalidAssignmentTarget { context } => {
                write!(f, "[{}] Invalid assignment target", context)
            }
            BrawlError::TypeMismatch { message, context } => {
                write!(f, "[{}] Type mismatch: {}", context, message)
            }
            BrawlError::NotCallable { type_name, context } => {
                write!(f, "[{}] Cannot call a value of type {}", context, type_name)
            }
            BrawlError::ArityMismatch {
                expected,
                got,
                context,
            } => {
                write!(
                    f,
                    "[{}] Wrong number of arguments: expected {}, got {}",
                    context, expected, got
                )
            }
            BrawlError::DivisionByZero { context } => {
                write!(f, "[{}] Division by zero", context)
            }
            BrawlError::ModuloByZero { context } => {
                write!(f, "[{}] Modulo by zero", context)
            }
            BrawlError::StackOverflow { max_depth, context } => {
                write!(
                    f,
                    "[{}] Stack overflow: exceeded maximum call depth of {}",
                    context, max_depth
                )
            }
            BrawlError::SymbolTableFull { capacity, location } => {
                write!(
                    f,
                    "[{}] Symbol table full: capacity {} exhausted",
                    location, capacity
                )
            }
            BrawlError::UndefinedIdentifier { name, context } => {
                write!(f, "[{}] Undefined identifier: '{}'", context, name)
            }
        }
    }
}

impl BrawlError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BrawlError::UnterminatedString { .. }
            | BrawlError::UnterminatedComment { .. }
            | BrawlError::UnknownSequence { .. }
            | BrawlError::NumberOutOfRange { .. } => ErrorCategory::Lexical,

            BrawlError::UnexpectedToken { .. } | BrawlError::InvalidAssignmentTarget { .. } => {
                ErrorCategory::Syntactic
            }

            BrawlError::TypeMismatch { .. }
            | BrawlError::NotCallable { .. }
            | BrawlError::ArityMismatch { .. } => ErrorCategory::Type,

            BrawlError::DivisionByZero { .. } | BrawlError::ModuloByZero { .. } => {
                ErrorCategory::Arithmetic
            }

            BrawlError::StackOverflow { .. } | BrawlError::SymbolTableFull { .. } => {
                ErrorCategory::Resource
            }

            BrawlError::UndefinedIdentifier { .. } => ErrorCategory::Lookup,
        }
    }

    /// The line/column the error points at.
    pub fn location(&self) -> SourceLocation {
        match self {
            BrawlError::UnterminatedString { location }
            | BrawlError::UnterminatedComment { location }
            | BrawlError::UnknownSequence { location, .. }
            | BrawlError::NumberOutOfRange { location, .. }
            | BrawlError::SymbolTableFull { location, .. } => *location,

            BrawlError::UnexpectedToken { context, .. }
            | BrawlError::InvalidAssignmentTarget { context }
            | BrawlError::TypeMismatch { context, .. }
            | BrawlError::NotCallable { context, .. }
            | BrawlError::ArityMismatch { context, .. }
            | BrawlError::DivisionByZero { context }
            | BrawlError::ModuloByZero { context }
            | BrawlError::StackOverflow { context, .. }
            | BrawlError::UndefinedIdentifier { context, .. } => {
                SourceLocation::new(context.line, context.column)
            }
        }
    }

    /// Token context, when the error was raised at a token.
    pub fn token_context(&self) -> Option<&TokenContext> {
        match self {
            BrawlError::UnexpectedToken { context, .. }
            | BrawlError::InvalidAssignmentTarget { context }
            | BrawlError::TypeMismatch { context, .. }
            | BrawlError::NotCallable { context, .. }
            | BrawlError::ArityMismatch { context, .. }
            | BrawlError::DivisionByZero { context }
            | BrawlError::ModuloByZero { context }
            | BrawlError::StackOverflow { context, .. }
            | BrawlError::UndefinedIdentifier { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Render the full report: red label, message, token context, the
    /// offending source line, and a caret under the column.
    pub fn render_report(&self, source_name: &str, source: &str) -> String {
        let location = self.location();
        let mut out = String::new();

        out.push_str(&format!("\x1b[1;91mError:\x1b[0m {}", self));
        match self.token_context() {
            Some(ctx) => out.push_str(&format!(
                " ( token: \x1b[32m{}\x1b[0m, kind: \x1b[1m{}\x1b[0m, file: \x1b[1m{}\x1b[0m, \
                 line: \x1b[1m{}\x1b[0m, column: \x1b[1m{}\x1b[0m, depth: \x1b[1m{}\x1b[0m )\n",
                ctx.lexeme, ctx.kind, source_name, ctx.line, ctx.column, ctx.depth
            )),
            None => out.push_str(&format!(
                " ( file: \x1b[1m{}\x1b[0m, line: \x1b[1m{}\x1b[0m, column: \x1b[1m{}\x1b[0m )\n",
                source_name, location.line, location.column
            )),
        }

        if let Some(line_text) = source.lines().nth(location.line.saturating_sub(1)) {
            out.push_str(line_text);
            out.push('\n');
            for _ in 1..location.column {
                out.push(' ');
            }
            out.push_str("^\n");
        }

        out
    }
}

impl std::error::Error for BrawlError {}
