//! The table-driven shift-reduce parser.

use crate::definition::{ParseAction, ParseActionError, ParseTable};
use std::fmt;

/// A trait for abstracting token symbols.
pub trait Token<TSym> {
    /// The semantic value carried by this token.
    type Value;

    /// Return the terminal symbol corresponding to this token.
    fn as_symbol(&self) -> TSym;

    /// Whether this token is the explicit end-of-input marker.
    ///
    /// The parser stops pulling tokens after seeing such a marker, exactly
    /// as if the token stream had been exhausted.
    fn is_end_of_input(&self) -> bool {
        false
    }

    /// Convert this token into the value pushed on the value stack.
    fn into_value(self) -> Self::Value;
}

/// The callback invoked when a production rule is reduced.
pub trait Reducer<TReduce, TValue> {
    /// Synthesize a value from the values of the right-hand side,
    /// given in left-to-right order.
    fn reduce(&mut self, reduce: TReduce, args: Vec<TValue>) -> TValue;
}

impl<F, TReduce, TValue> Reducer<TReduce, TValue> for F
where
    F: FnMut(TReduce, Vec<TValue>) -> TValue,
{
    fn reduce(&mut self, reduce: TReduce, args: Vec<TValue>) -> TValue {
        (self)(reduce, args)
    }
}

/// The parser driven based on the generated parse table.
pub struct Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token<TDef::Terminal>,
{
    definition: TDef,
    state_stack: Vec<TDef::State>,
    value_stack: Vec<TTok::Value>,
}

impl<TDef, TTok> fmt::Debug for Parser<TDef, TTok>
where
    TDef: ParseTable + fmt::Debug,
    TDef::State: fmt::Debug,
    TTok: Token<TDef::Terminal>,
    TTok::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("definition", &self.definition)
            .field("state_stack", &self.state_stack)
            .field("value_stack", &self.value_stack)
            .finish()
    }
}

impl<TDef, TTok> Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token<TDef::Terminal>,
{
    /// Create an instance of `Parser` using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        let initial_state = definition.initial_state();
        Self {
            definition,
            state_stack: vec![initial_state],
            value_stack: vec![],
        }
    }

    /// Discard the stacks left by a previous parse.
    pub fn reset(&mut self) {
        self.state_stack.clear();
        self.state_stack.push(self.definition.initial_state());
        self.value_stack.clear();
    }

    /// Consume the token stream until the input is accepted, returning the
    /// value synthesized for the start symbol.
    ///
    /// The stacks are reset before parsing, so the same parser can be reused
    /// after both successful and failed parses.
    pub fn parse<I, E, R>(
        &mut self,
        tokens: I,
        reducer: &mut R,
    ) -> Result<TTok::Value, ParseError<TDef::State, TDef::Terminal, TTok, E>>
    where
        I: IntoIterator<Item = Result<TTok, E>>,
        R: Reducer<TDef::Reduce, TTok::Value>,
        TDef::State: fmt::Debug,
        TDef::Terminal: fmt::Debug,
        TTok: fmt::Debug,
        E: fmt::Display,
    {
        self.reset();

        let mut tokens = tokens.into_iter();
        let mut peeked_token: Option<TTok> = None;
        let mut reached_eoi = false;

        loop {
            let current = self
                .state_stack
                .last()
                .copied()
                .ok_or(ParseError::EmptyStateStack)?;

            if peeked_token.is_none() && !reached_eoi {
                match tokens.next().transpose().map_err(ParseError::Lexer)? {
                    Some(token) if !token.is_end_of_input() => peeked_token = Some(token),
                    _ => reached_eoi = true,
                }
            }
            let lookahead = peeked_token.as_ref().map(|t| t.as_symbol());

            match self.definition.action(current, lookahead) {
                ParseAction::Shift(next) => {
                    let token = peeked_token
                        .take()
                        .ok_or(ParseError::ParserDef(ParseActionError::IncorrectSymbol))?;
                    tracing::trace!(depth = self.state_stack.len(), "shift");
                    self.state_stack.push(next);
                    self.value_stack.push(token.into_value());
                }

                ParseAction::Reduce(reduce, lhs, n) => {
                    if n > self.value_stack.len() {
                        return Err(ParseError::EmptyValueStack);
                    }
                    if n >= self.state_stack.len() {
                        return Err(ParseError::EmptyStateStack);
                    }
                    let args = self.value_stack.split_off(self.value_stack.len() - n);
                    self.state_stack.truncate(self.state_stack.len() - n);

                    let top = self
                        .state_stack
                        .last()
                        .copied()
                        .ok_or(ParseError::EmptyStateStack)?;
                    let next = self
                        .definition
                        .goto(top, lhs)
                        .ok_or(ParseError::MissingGoto)?;

                    tracing::trace!(depth = self.state_stack.len(), n, "reduce");
                    let value = reducer.reduce(reduce, args);
                    self.state_stack.push(next);
                    self.value_stack.push(value);
                }

                ParseAction::Accept => {
                    if self.value_stack.len() != 1 {
                        return Err(ParseError::UnbalancedValueStack(self.value_stack.len()));
                    }
                    tracing::trace!("accept");
                    return self.value_stack.pop().ok_or(ParseError::EmptyValueStack);
                }

                ParseAction::Reject => {
                    let expected = self.definition.expected_terminals(current);
                    return Err(match peeked_token.take() {
                        Some(token) => ParseError::UnexpectedToken {
                            state: current,
                            token,
                            expected,
                        },
                        None => ParseError::UnexpectedEndOfInput {
                            state: current,
                            expected,
                        },
                    });
                }

                ParseAction::Error(err) => return Err(ParseError::ParserDef(err)),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<TState, TTerm, TTok, L>
where
    TState: fmt::Debug,
    TTerm: fmt::Debug,
    TTok: fmt::Debug,
    L: fmt::Display,
{
    #[error("from lexer: {}", _0)]
    Lexer(L),

    #[error("from parse table: {}", _0)]
    ParserDef(ParseActionError),

    #[error("unexpected token {token:?} in state {state:?} (expected: {expected:?})")]
    UnexpectedToken {
        state: TState,
        token: TTok,
        expected: Vec<Option<TTerm>>,
    },

    #[error("unexpected end of input in state {state:?} (expected: {expected:?})")]
    UnexpectedEndOfInput {
        state: TState,
        expected: Vec<Option<TTerm>>,
    },

    #[error("missing goto entry after reduction")]
    MissingGoto,

    #[error("empty state stack")]
    EmptyStateStack,

    #[error("empty value stack")]
    EmptyValueStack,

    #[error("the value stack holds {} values on accept", _0)]
    UnbalancedValueStack(usize),
}
