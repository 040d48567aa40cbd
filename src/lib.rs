//! Brawl - a small functional scripting language.
//!
//! Brawl is higher-order, dynamically typed, eagerly evaluated, and
//! expression-oriented: first-class closures with by-value captured
//! environments, two-element tuples, 64-bit integers, booleans, and
//! strings. A source file is tokenized once and then parsed and
//! evaluated in a single pass over the token stream; there is no
//! AST.
//!
//! The fast paths: every function entity owns a memoization cache
//! for pure integer-only calls, gated by a one-time static body
//! inspection plus runtime demotion, and each `if` token caches its
//! branch end positions so skipped blocks are scanned only once.
//!
//! The embedding entry point is [`run_script`]; the `brawl` binary
//! is a thin wrapper around it.

pub mod error;
pub mod frame;
pub mod function;
pub mod interp;
pub mod io;
pub mod lexer;
pub mod memo;
pub mod symbol;
pub mod value;

pub use error::{BrawlError, BrawlResult, ErrorCategory, SourceLocation, TokenContext};
pub use frame::{Frame, FrameStack, MAX_CALL_DEPTH};
pub use function::{Function, FunctionTable};
pub use interp::{run_script, Interpreter, Outcome, RunConfig};
pub use io::PrintSink;
pub use lexer::{tokenize, Token, TokenKind};
pub use memo::{cache_key, CacheStats, CallCache, CACHE_SIZE, MAX_CACHE_PARAMS};
pub use symbol::{SymbolId, SymbolTable, SYMBOL_CAPACITY};
pub use value::{FnId, Value};
