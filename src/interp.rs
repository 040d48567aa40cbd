//! The evaluator: a single-pass parse/evaluate walk over the token
//! stream.
//!
//! There is no AST. The `Interpreter` owns the token vector and moves
//! one cursor through it, evaluating as it parses. Function calls
//! save the cursor, jump to the body's entry token, and restore on
//! return. Skipped `if` branches are scanned once and their end
//! positions cached on the `if` token, so later executions jump
//! directly.
//!
//! Short-circuit evaluation is implemented with a *shadow* mode: the
//! same descent routines walk the unevaluated operand's tokens with
//! every semantic action (lookups, calls, writes, output, type
//! checks) suppressed. That keeps the cursor honest without
//! materializing any program structure.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{BrawlError, BrawlResult, TokenContext};
use crate::frame::{FrameStack, MAX_CALL_DEPTH};
use crate::function::{Function, FunctionTable};
use crate::io::{cowsay, PrintSink};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::memo::MAX_CACHE_PARAMS;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{FnId, Value};

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Capture output instead of writing to stdout, so harnesses can
    /// assert on both the last value and the printed text.
    pub test_mode: bool,
    /// Bound on live call frames.
    pub max_call_depth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            max_call_depth: MAX_CALL_DEPTH,
        }
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct Outcome {
    /// Value of the last evaluated expression, if any statement
    /// produced one.
    pub value: Option<Value>,
    /// Captured output lines (empty unless `test_mode` was set).
    pub output: Vec<String>,
}

/// Tokenize and evaluate a complete source text.
///
/// This is the embedding entry point: the binary and the test
/// harnesses both go through it.
pub fn run_script(name: &str, source: &str, config: RunConfig) -> BrawlResult<Outcome> {
    let span = tracing::debug_span!("run", source = name);
    let _guard = span.enter();

    let mut interp = Interpreter::new(source, config)?;
    let value = interp.run()?;
    Ok(Outcome {
        value,
        output: interp.take_output(),
    })
}

/// Per-definition-site facts, computed on the first evaluation of a
/// `fn` literal and reused by every later evaluation of the same
/// site.
#[derive(Debug, Clone, Copy)]
struct FnSite {
    /// Cursor position just past the body.
    end: usize,
    /// Static cache-eligibility verdict for functions minted here.
    eligible: bool,
}

/// The interpreter: all run state in one reentrant value.
pub struct Interpreter {
    tokens: Vec<Token>,
    pos: usize,
    symbols: SymbolTable,
    frames: FrameStack,
    functions: FunctionTable,
    sink: PrintSink,
    /// Definition-site inspection results, keyed by body entry.
    sites: HashMap<usize, FnSite>,
    /// Functions currently on the call stack, outermost first.
    active_calls: Vec<FnId>,
    /// Non-zero while walking tokens without evaluating them.
    shadow: u32,
}

impl Interpreter {
    /// Tokenize `source` and prepare an interpreter for it.
    pub fn new(source: &str, config: RunConfig) -> BrawlResult<Self> {
        let mut symbols = SymbolTable::new();
        let tokens = tokenize(source, &mut symbols)?;
        let sink = if config.test_mode {
            PrintSink::capture()
        } else {
            PrintSink::stdout()
        };
        Ok(Self {
            tokens,
            pos: 0,
            symbols,
            frames: FrameStack::new(config.max_call_depth),
            functions: FunctionTable::new(),
            sink,
            sites: HashMap::new(),
            active_calls: Vec::new(),
            shadow: 0,
        })
    }

    /// Evaluate statements until end of input; the result is the
    /// value of the last evaluated expression.
    pub fn run(&mut self) -> BrawlResult<Option<Value>> {
        let mut last = None;
        while self.kind() != TokenKind::Eof {
            if let Some(value) = self.eval_statement()? {
                last = Some(value);
            }
        }
        Ok(last)
    }

    /// Drain the sink's captured output.
    pub fn take_output(&mut self) -> Vec<String> {
        self.sink.take_lines()
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    fn token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Move to the next token; the cursor never leaves `Eof`.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn context(&self, pos: usize) -> TokenContext {
        let token = &self.tokens[pos.min(self.tokens.len() - 1)];
        TokenContext {
            lexeme: token.lexeme.clone(),
            kind: token.kind.describe().to_string(),
            line: token.line,
            column: token.column,
            depth: self.frames.depth(),
        }
    }

    fn context_here(&self) -> TokenContext {
        self.context(self.pos)
    }

    fn expect(&mut self, kind: TokenKind) -> BrawlResult<()> {
        if self.kind() == kind {
            self.advance();
            Ok(())
        } else {
            Err(BrawlError::UnexpectedToken {
                expected: kind.describe().to_string(),
                context: self.context_here(),
            })
        }
    }

    fn type_error(&self, pos: usize, message: impl Into<String>) -> BrawlError {
        BrawlError::TypeMismatch {
            message: message.into(),
            context: self.context(pos),
        }
    }

    fn as_bool(&self, value: &Value, pos: usize) -> BrawlResult<bool> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(self.type_error(
                pos,
                format!("expected a boolean, found {}", other.type_name()),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn eval_statement(&mut self) -> BrawlResult<Option<Value>> {
        match self.kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(None)
            }
            TokenKind::Eof => Ok(None),
            TokenKind::Let => self.eval_let().map(Some),
            TokenKind::If => self.eval_if().map(Some),
            TokenKind::LBrace => self.eval_block().map(Some),
            _ => self.eval_expression().map(Some),
        }
    }

    /// `let NAME = EXPR` binds in the current frame; `let _ = EXPR`
    /// evaluates and discards.
    fn eval_let(&mut self) -> BrawlResult<Value> {
        self.expect(TokenKind::Let)?;
        match self.kind() {
            TokenKind::Identifier => {
                let sym = self.token().symbol.expect("identifier token has a symbol");
                self.advance();
                self.expect(TokenKind::Assign)?;
                let value = self.eval_expression()?;
                if self.shadow == 0 {
                    self.frames.current_mut().set(sym, value.clone());
                }
                Ok(value)
            }
            TokenKind::Wildcard => {
                self.advance();
                self.expect(TokenKind::Assign)?;
                self.eval_expression()
            }
            _ => Err(BrawlError::UnexpectedToken {
                expected: "identifier".to_string(),
                context: self.context_here(),
            }),
        }
    }

    /// `{ stmt* }`: the block's value is its last evaluated
    /// expression, or `false` when it contains none.
    fn eval_block(&mut self) -> BrawlResult<Value> {
        self.expect(TokenKind::LBrace)?;
        let mut last = Value::Bool(false);
        while self.kind() != TokenKind::RBrace {
            if self.kind() == TokenKind::Eof {
                return Err(BrawlError::UnexpectedToken {
                    expected: "'}'".to_string(),
                    context: self.context_here(),
                });
            }
            if let Some(value) = self.eval_statement()? {
                last = value;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(last)
    }

    /// Skip a balanced `{ ... }` block without evaluating it.
    fn skip_block(&mut self) -> BrawlResult<()> {
        self.expect(TokenKind::LBrace)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => {
                    return Err(BrawlError::UnexpectedToken {
                        expected: "'}'".to_string(),
                        context: self.context_here(),
                    });
                }
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// `if (cond) block [else block]`, with the end positions of both
    /// branches cached on the `if` token after first execution.
    fn eval_if(&mut self) -> BrawlResult<Value> {
        let if_pos = self.pos;
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond_pos = self.pos;
        let cond = self.eval_expression()?;
        self.expect(TokenKind::RParen)?;

        if self.shadow > 0 {
            self.skip_block()?;
            if self.kind() == TokenKind::Else {
                self.advance();
                self.skip_block()?;
            }
            return Ok(Value::Bool(false));
        }

        if self.as_bool(&cond, cond_pos)? {
            let value = self.eval_block()?;
            if let Some(end) = self.tokens[if_pos].then_end {
                self.pos = end;
            } else {
                if self.kind() == TokenKind::Else {
                    self.advance();
                    self.skip_block()?;
                }
                self.tokens[if_pos].then_end = Some(self.pos);
            }
            Ok(value)
        } else {
            if let Some(end) = self.tokens[if_pos].else_end {
                self.pos = end;
            } else {
                self.skip_block()?;
                self.tokens[if_pos].else_end = Some(self.pos);
            }
            if self.kind() == TokenKind::Else {
                self.advance();
                self.eval_block()
            } else {
                Ok(cond)
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions: the precedence ladder
    // ------------------------------------------------------------------

    /// Assignment level. Right-associative; the left side must be a
    /// bare, already-bound identifier.
    pub fn eval_expression(&mut self) -> BrawlResult<Value> {
        let lhs_pos = self.pos;
        let value = self.eval_or()?;

        if self.kind() == TokenKind::Assign {
            let lhs_is_bare_identifier =
                self.tokens[lhs_pos].kind == TokenKind::Identifier && self.pos == lhs_pos + 1;
            if !lhs_is_bare_identifier {
                return Err(BrawlError::InvalidAssignmentTarget {
                    context: self.context_here(),
                });
            }
            let sym = self.tokens[lhs_pos]
                .symbol
                .expect("identifier token has a symbol");
            self.advance();
            let rhs = self.eval_expression()?;
            if self.shadow == 0 && !self.frames.assign(sym, rhs.clone()) {
                return Err(BrawlError::UndefinedIdentifier {
                    name: self.symbols.name(sym).to_string(),
                    context: self.context(lhs_pos),
                });
            }
            return Ok(rhs);
        }

        Ok(value)
    }

    fn eval_or(&mut self) -> BrawlResult<Value> {
        let left_pos = self.pos;
        let mut left = self.eval_and()?;
        while self.kind() == TokenKind::OrOr {
            self.advance();
            if self.shadow > 0 {
                self.eval_and()?;
                continue;
            }
            if self.as_bool(&left, left_pos)? {
                // Result already decided: walk the right operand
                // without evaluating it.
                self.shadow += 1;
                let walked = self.eval_and();
                self.shadow -= 1;
                walked?;
                left = Value::Bool(true);
            } else {
                let right_pos = self.pos;
                let right = self.eval_and()?;
                left = Value::Bool(self.as_bool(&right, right_pos)?);
            }
        }
        Ok(left)
    }

    fn eval_and(&mut self) -> BrawlResult<Value> {
        let left_pos = self.pos;
        let mut left = self.eval_comparison()?;
        while self.kind() == TokenKind::AndAnd {
            self.advance();
            if self.shadow > 0 {
                self.eval_comparison()?;
                continue;
            }
            if self.as_bool(&left, left_pos)? {
                let right_pos = self.pos;
                let right = self.eval_comparison()?;
                left = Value::Bool(self.as_bool(&right, right_pos)?);
            } else {
                self.shadow += 1;
                let walked = self.eval_comparison();
                self.shadow -= 1;
                walked?;
                left = Value::Bool(false);
            }
        }
        Ok(left)
    }

    fn eval_comparison(&mut self) -> BrawlResult<Value> {
        let mut left = self.eval_additive()?;
        loop {
            let op = self.kind();
            if !matches!(
                op,
                TokenKind::Eq
                    | TokenKind::Neq
                    | TokenKind::Lt
                    | TokenKind::Lte
                    | TokenKind::Gt
                    | TokenKind::Gte
            ) {
                break;
            }
            let op_pos = self.pos;
            self.advance();
            let right = self.eval_additive()?;
            if self.shadow > 0 {
                continue;
            }
            left = self.apply_comparison(op, left, right, op_pos)?;
        }
        Ok(left)
    }

    fn apply_comparison(
        &self,
        op: TokenKind,
        left: Value,
        right: Value,
        op_pos: usize,
    ) -> BrawlResult<Value> {
        match op {
            TokenKind::Eq => {
                let equal = left
                    .checked_eq(&right)
                    .map_err(|message| self.type_error(op_pos, message))?;
                Ok(Value::Bool(equal))
            }
            TokenKind::Neq => {
                let equal = left
                    .checked_eq(&right)
                    .map_err(|message| self.type_error(op_pos, message))?;
                Ok(Value::Bool(!equal))
            }
            _ => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(match op {
                    TokenKind::Lt => a < b,
                    TokenKind::Lte => a <= b,
                    TokenKind::Gt => a > b,
                    TokenKind::Gte => a >= b,
                    _ => unreachable!("caller filters comparison operators"),
                })),
                _ => Err(self.type_error(
                    op_pos,
                    format!(
                        "comparison requires integers, found {} and {}",
                        left.type_name(),
                        right.type_name()
                    ),
                )),
            },
        }
    }

    fn eval_additive(&mut self) -> BrawlResult<Value> {
        let mut left = self.eval_term()?;
        loop {
            let op = self.kind();
            if !matches!(op, TokenKind::Plus | TokenKind::Minus) {
                break;
            }
            let op_pos = self.pos;
            self.advance();
            let right = self.eval_term()?;
            if self.shadow > 0 {
                continue;
            }
            left = match (op, &left, &right) {
                (TokenKind::Plus, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(*b)),
                (TokenKind::Plus, _, _) => self.concat(&left, &right, op_pos)?,
                (TokenKind::Minus, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(*b)),
                (TokenKind::Minus, _, _) => {
                    return Err(self.type_error(
                        op_pos,
                        format!(
                            "'-' requires integers, found {} and {}",
                            left.type_name(),
                            right.type_name()
                        ),
                    ));
                }
                _ => unreachable!("loop condition filters additive operators"),
            };
        }
        Ok(left)
    }

    /// `+` with a non-integer operand concatenates the operands'
    /// textual forms. Tuples and closures have none and are rejected.
    fn concat(&self, left: &Value, right: &Value, op_pos: usize) -> BrawlResult<Value> {
        let (Some(a), Some(b)) = (left.concat_fragment(), right.concat_fragment()) else {
            return Err(self.type_error(
                op_pos,
                format!(
                    "'+' cannot concatenate {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
            ));
        };
        Ok(Value::Str(format!("{}{}", a, b)))
    }

    fn eval_term(&mut self) -> BrawlResult<Value> {
        let mut left = self.eval_primary()?;
        loop {
            let op = self.kind();
            if !matches!(op, TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
                break;
            }
            let op_pos = self.pos;
            self.advance();
            let right = self.eval_primary()?;
            if self.shadow > 0 {
                continue;
            }
            let (a, b) = match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => (*a, *b),
                _ => {
                    return Err(self.type_error(
                        op_pos,
                        format!(
                            "'{}' requires integers, found {} and {}",
                            self.tokens[op_pos].lexeme,
                            left.type_name(),
                            right.type_name()
                        ),
                    ));
                }
            };
            left = match op {
                TokenKind::Star => Value::Int(a.wrapping_mul(b)),
                TokenKind::Slash => {
                    if b == 0 {
                        return Err(BrawlError::DivisionByZero {
                            context: self.context(op_pos),
                        });
                    }
                    Value::Int(a.wrapping_div(b))
                }
                TokenKind::Percent => {
                    if b == 0 {
                        return Err(BrawlError::ModuloByZero {
                            context: self.context(op_pos),
                        });
                    }
                    Value::Int(a.wrapping_rem(b))
                }
                _ => unreachable!("loop condition filters term operators"),
            };
        }
        Ok(left)
    }

    fn eval_primary(&mut self) -> BrawlResult<Value> {
        match self.kind() {
            TokenKind::Number | TokenKind::Str | TokenKind::True | TokenKind::False => {
                let value = self
                    .token()
                    .literal
                    .clone()
                    .expect("literal token carries its value");
                self.advance();
                Ok(value)
            }
            TokenKind::Identifier => self.eval_identifier(),
            TokenKind::Fn => self.eval_fn_literal(),
            TokenKind::First => self.eval_projection(true),
            TokenKind::Second => self.eval_projection(false),
            TokenKind::Print => self.eval_print(),
            TokenKind::Cowsay => self.eval_cowsay(),
            TokenKind::If => self.eval_if(),
            TokenKind::LParen => {
                self.advance();
                let first = self.eval_expression()?;
                if self.kind() == TokenKind::Comma {
                    self.advance();
                    let second = self.eval_expression()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(Value::tuple(first, second))
                } else {
                    self.expect(TokenKind::RParen)?;
                    Ok(first)
                }
            }
            _ => Err(BrawlError::UnexpectedToken {
                expected: "an expression".to_string(),
                context: self.context_here(),
            }),
        }
    }

    /// An identifier: a call when followed by `(`, otherwise the
    /// bound value. A closure referenced without `(...)` evaluates to
    /// itself.
    fn eval_identifier(&mut self) -> BrawlResult<Value> {
        let ident_pos = self.pos;
        let sym = self.token().symbol.expect("identifier token has a symbol");
        self.advance();

        if self.kind() == TokenKind::LParen {
            return self.eval_call(sym, ident_pos);
        }

        if self.shadow > 0 {
            return Ok(Value::Bool(false));
        }
        match self.frames.lookup(sym) {
            Some(value) => Ok(value.clone()),
            None => Err(BrawlError::UndefinedIdentifier {
                name: self.symbols.name(sym).to_string(),
                context: self.context(ident_pos),
            }),
        }
    }

    fn eval_call(&mut self, sym: SymbolId, ident_pos: usize) -> BrawlResult<Value> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.kind() != TokenKind::RParen {
            loop {
                args.push(self.eval_expression()?);
                if self.kind() == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        if self.shadow > 0 {
            return Ok(Value::Bool(false));
        }

        let callee = match self.frames.lookup(sym) {
            Some(value) => value.clone(),
            None => {
                return Err(BrawlError::UndefinedIdentifier {
                    name: self.symbols.name(sym).to_string(),
                    context: self.context(ident_pos),
                });
            }
        };
        match callee {
            Value::Closure(fid) => self.call_closure(fid, args, ident_pos),
            other => Err(BrawlError::NotCallable {
                type_name: other.type_name(),
                context: self.context(ident_pos),
            }),
        }
    }

    /// Invoke a function entity with already-evaluated arguments.
    fn call_closure(
        &mut self,
        fid: FnId,
        args: Vec<Value>,
        call_pos: usize,
    ) -> BrawlResult<Value> {
        let (entry, braced, params, captured) = {
            let function = self.functions.get(fid);
            (
                function.entry,
                function.braced,
                function.params.clone(),
                function.captured.clone(),
            )
        };

        if params.len() != args.len() {
            return Err(BrawlError::ArityMismatch {
                expected: params.len(),
                got: args.len(),
                context: self.context(call_pos),
            });
        }

        if !self.frames.try_push() {
            return Err(BrawlError::StackOverflow {
                max_depth: self.frames.max_depth(),
                context: self.context(call_pos),
            });
        }

        // Captured snapshot first, arguments over it.
        for (sym, value) in captured {
            self.frames.current_mut().set(sym, value);
        }
        for (param, arg) in params.iter().zip(args.iter()) {
            self.frames.current_mut().set(*param, arg.clone());
        }

        // A non-integer argument demotes the entity for good; only
        // all-integer argument vectors are ever keyed.
        let mut use_cache = self.functions.get(fid).cache_enabled;
        if use_cache && !args.iter().all(Value::is_int) {
            let function = self.functions.get_mut(fid);
            function.cache_enabled = false;
            let stats = function.cache.stats();
            use_cache = false;
            debug!(function = fid, %stats, "cache disabled: non-integer argument");
        }
        if use_cache {
            if let Some(result) = self.functions.get_mut(fid).cache.lookup(&args) {
                let stats = self.functions.get(fid).cache.stats();
                trace!(function = fid, %stats, "call served from cache");
                self.frames.pop();
                return Ok(result);
            }
        }

        trace!(function = fid, depth = self.frames.depth(), "entering call");
        let saved_pos = self.pos;
        self.pos = entry;
        self.active_calls.push(fid);
        let result = if braced {
            self.eval_block()
        } else {
            self.eval_expression()
        };
        self.active_calls.pop();
        let value = result?;
        self.frames.pop();
        self.pos = saved_pos;

        // The body may have demoted the entity (observable output);
        // re-check before recording.
        if use_cache && self.functions.get(fid).cache_enabled {
            self.functions.get_mut(fid).cache.store(args, value.clone());
        }
        Ok(value)
    }

    /// `fn (p1, ..., pn) => BODY` mints a function entity capturing
    /// the current frame.
    fn eval_fn_literal(&mut self) -> BrawlResult<Value> {
        self.expect(TokenKind::Fn)?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while self.kind() != TokenKind::RParen {
            match self.kind() {
                TokenKind::Identifier => {
                    params.push(self.token().symbol.expect("identifier token has a symbol"));
                    self.advance();
                }
                TokenKind::Comma => self.advance(),
                _ => {
                    return Err(BrawlError::UnexpectedToken {
                        expected: "parameter name".to_string(),
                        context: self.context_here(),
                    });
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;

        let entry = self.pos;
        let braced = self.kind() == TokenKind::LBrace;
        let site = self.inspect_site(entry, braced, &params)?;
        self.pos = site.end;

        if self.shadow > 0 {
            return Ok(Value::Bool(false));
        }

        let function = Function::new(entry, braced, params, self.frames.current(), site.eligible);
        let fid = self.functions.insert(function);
        trace!(function = fid, entry, eligible = site.eligible, "closure defined");
        Ok(Value::Closure(fid))
    }

    /// Locate the body's end and, the first time a site is seen, run
    /// the static cache-eligibility inspection over its tokens.
    fn inspect_site(
        &mut self,
        entry: usize,
        braced: bool,
        params: &[SymbolId],
    ) -> BrawlResult<FnSite> {
        if let Some(site) = self.sites.get(&entry) {
            return Ok(*site);
        }

        let end = if braced {
            let mut j = entry;
            let mut depth = 0usize;
            loop {
                match self.tokens[j].kind {
                    TokenKind::LBrace => depth += 1,
                    TokenKind::RBrace => {
                        depth -= 1;
                        if depth == 0 {
                            break j + 1;
                        }
                    }
                    TokenKind::Eof => {
                        return Err(BrawlError::UnexpectedToken {
                            expected: "'}'".to_string(),
                            context: self.context(j),
                        });
                    }
                    _ => {}
                }
                j += 1;
            }
        } else {
            // Bare-expression body: runs to `;`, or to the closer of
            // the construct the definition appeared in.
            let mut j = entry;
            let mut depth = 0usize;
            loop {
                match self.tokens[j].kind {
                    TokenKind::LBrace | TokenKind::LParen => depth += 1,
                    TokenKind::RBrace | TokenKind::RParen => {
                        if depth == 0 {
                            break j;
                        }
                        depth -= 1;
                    }
                    TokenKind::Comma | TokenKind::Semicolon if depth == 0 => break j,
                    TokenKind::Eof => break j,
                    _ => {}
                }
                j += 1;
            }
        };

        // Static eligibility: 1..=3 parameters, no output statement,
        // no write to a non-local name, no call to a known-ineligible
        // function. Runtime demotion backstops whatever this cannot
        // see (closures received as arguments, output in callees).
        let mut eligible = (1..=MAX_CACHE_PARAMS).contains(&params.len());
        let mut locals: HashSet<SymbolId> = params.iter().copied().collect();
        let mut j = entry;
        while j < end && eligible {
            match self.tokens[j].kind {
                TokenKind::Print | TokenKind::Cowsay => eligible = false,
                TokenKind::Let => {
                    if let Some(token) = self.tokens.get(j + 1) {
                        if token.kind == TokenKind::Identifier {
                            locals.insert(token.symbol.expect("identifier token has a symbol"));
                            j += 1;
                        }
                    }
                }
                TokenKind::Identifier => {
                    let sym = self.tokens[j].symbol.expect("identifier token has a symbol");
                    let next = self.tokens.get(j + 1).map(|t| t.kind);
                    if next == Some(TokenKind::Assign) && !locals.contains(&sym) {
                        eligible = false;
                    }
                    if next == Some(TokenKind::LParen) {
                        if let Some(Value::Closure(callee)) = self.frames.lookup(sym) {
                            if !self.functions.get(*callee).cache_enabled {
                                eligible = false;
                            }
                        }
                    }
                }
                _ => {}
            }
            j += 1;
        }

        let site = FnSite { end, eligible };
        self.sites.insert(entry, site);
        debug!(entry, eligible, "inspected function definition site");
        Ok(site)
    }

    /// `first(expr)` / `second(expr)`.
    fn eval_projection(&mut self, take_first: bool) -> BrawlResult<Value> {
        let kw_pos = self.pos;
        self.advance();
        self.expect(TokenKind::LParen)?;
        let value = self.eval_expression()?;
        self.expect(TokenKind::RParen)?;

        if self.shadow > 0 {
            return Ok(value);
        }
        match value {
            Value::Tuple(pair) => Ok(if take_first { pair.0 } else { pair.1 }),
            other => Err(self.type_error(
                kw_pos,
                format!(
                    "{} expects a tuple, found {}",
                    if take_first { "first" } else { "second" },
                    other.type_name()
                ),
            )),
        }
    }

    /// `print(expr)`: emit the textual form plus newline, yield the
    /// value.
    fn eval_print(&mut self) -> BrawlResult<Value> {
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::LParen)?;
        let value = self.eval_expression()?;
        self.expect(TokenKind::RParen)?;
        if self.shadow == 0 {
            self.demote_active_calls();
            self.sink.emit(&value.to_string());
        }
        Ok(value)
    }

    /// The secret statement. Same contract as `print`, louder.
    fn eval_cowsay(&mut self) -> BrawlResult<Value> {
        self.expect(TokenKind::Cowsay)?;
        self.expect(TokenKind::LParen)?;
        let value = self.eval_expression()?;
        self.expect(TokenKind::RParen)?;
        if self.shadow == 0 {
            self.demote_active_calls();
            self.sink.emit(&cowsay(&value.to_string()));
        }
        Ok(value)
    }

    /// Observable output poisons memoization for every function on
    /// the active call chain, permanently.
    fn demote_active_calls(&mut self) {
        for i in 0..self.active_calls.len() {
            let fid = self.active_calls[i];
            let function = self.functions.get_mut(fid);
            if function.cache_enabled {
                function.cache_enabled = false;
                let stats = function.cache.stats();
                debug!(
                    function = fid,
                    %stats,
                    "cache disabled: observable output in call chain"
                );
            }
        }
    }
}
