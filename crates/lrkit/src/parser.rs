//! Driving the runtime parser with a generated table.

use crate::{
    automaton::StateID,
    grammar::{RuleID, TerminalID},
    table::ParseTable,
    types::Map,
};
use lrkit_runtime::parser::Parser;
use std::fmt;

/// A token consisting of a terminal symbol and its literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<V> {
    pub kind: TerminalID,
    pub value: V,
}

impl<V> Token<V> {
    pub const fn new(kind: TerminalID, value: V) -> Self {
        Self { kind, value }
    }

    /// Create the explicit end-of-input marker.
    pub const fn end_of_input(value: V) -> Self {
        Self::new(TerminalID::EOI, value)
    }
}

impl<V> lrkit_runtime::parser::Token<TerminalID> for Token<V> {
    type Value = V;

    fn as_symbol(&self) -> TerminalID {
        self.kind
    }

    fn is_end_of_input(&self) -> bool {
        self.kind == TerminalID::EOI
    }

    fn into_value(self) -> V {
        self.value
    }
}

type Callback<'a, V> = Box<dyn Fn(Vec<V>) -> V + 'a>;

/// The semantic actions invoked on reductions, keyed by production rule.
pub struct SemanticActions<'a, V> {
    callbacks: Map<RuleID, Callback<'a, V>>,
}

impl<V> Default for SemanticActions<'_, V> {
    fn default() -> Self {
        Self {
            callbacks: Map::default(),
        }
    }
}

impl<V> fmt::Debug for SemanticActions<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.callbacks.keys()).finish()
    }
}

impl<'a, V> SemanticActions<'a, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the action for the specified rule, replacing the previous one.
    ///
    /// The callback receives the values of the right-hand side in order.
    pub fn on<F>(&mut self, rule: RuleID, f: F) -> &mut Self
    where
        F: Fn(Vec<V>) -> V + 'a,
    {
        self.callbacks.insert(rule, Box::new(f));
        self
    }

    /// Synthesize the value of a reduction.
    ///
    /// Rules without a registered action pass the first value through,
    /// or produce `V::default()` for an empty right-hand side.
    pub fn apply(&self, rule: RuleID, args: Vec<V>) -> V
    where
        V: Default,
    {
        match self.callbacks.get(&rule) {
            Some(f) => f(args),
            None => args.into_iter().next().unwrap_or_default(),
        }
    }
}

pub type ParseError<V, E> = lrkit_runtime::parser::ParseError<StateID, TerminalID, Token<V>, E>;

/// Parse the token stream with the table, returning the value of the start symbol.
pub fn parse<V, I, E>(
    table: &ParseTable,
    actions: &SemanticActions<'_, V>,
    tokens: I,
) -> Result<V, ParseError<V, E>>
where
    V: Default + fmt::Debug,
    I: IntoIterator<Item = Result<Token<V>, E>>,
    E: fmt::Display,
{
    let mut parser = Parser::new(table);
    parser.parse(tokens, &mut |rule: RuleID, args: Vec<V>| actions.apply(rule, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grammar::{Grammar, SymbolID::*},
        Config,
    };
    use std::convert::Infallible;

    // L := L , x | x | ε
    fn list_grammar() -> Grammar {
        Grammar::define(|g| {
            let comma = g.terminal(",")?;
            let x = g.terminal("x")?;
            let l = g.nonterminal("L")?;
            g.rule(l, [N(l), T(comma), T(x)], None)?;
            g.rule(l, [x], None)?;
            g.rule(l, [g.epsilon()], None)?;
            Ok(())
        })
        .unwrap()
    }

    fn tokens(g: &Grammar, input: &str) -> Vec<Result<Token<Vec<String>>, Infallible>> {
        input
            .split_whitespace()
            .map(|s| Ok(Token::new(g.terminal_id(s).unwrap(), vec![s.to_owned()])))
            .collect()
    }

    #[test]
    fn registered_actions_build_values() {
        let g = list_grammar();
        let table = Config::new().generate(&g).unwrap();
        let l = g.nonterminal_id("L").unwrap();
        let rules = g.productions(l);

        let mut actions = SemanticActions::new();
        actions.on(rules[0], |mut args: Vec<Vec<String>>| {
            let x = args.pop().unwrap();
            let _comma = args.pop();
            let mut list = args.pop().unwrap();
            list.extend(x);
            list
        });

        let parsed = parse(&table, &actions, tokens(&g, "x , x , x")).unwrap();
        assert_eq!(parsed, vec!["x", "x", "x"]);
    }

    #[test]
    fn unregistered_actions_pass_values_through() {
        let g = list_grammar();
        let table = Config::new().generate(&g).unwrap();
        let actions = SemanticActions::new();

        let parsed = parse(&table, &actions, tokens(&g, "x")).unwrap();
        assert_eq!(parsed, vec!["x"]);

        let parsed = parse(&table, &actions, tokens(&g, "")).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn end_of_input_token_terminates_stream() {
        let g = list_grammar();
        let table = Config::new().generate(&g).unwrap();
        let actions = SemanticActions::new();

        let mut input = tokens(&g, "x");
        input.push(Ok(Token::end_of_input(vec![])));
        input.extend(tokens(&g, ", x"));
        let parsed = parse(&table, &actions, input).unwrap();
        assert_eq!(parsed, vec!["x"]);
    }

    #[test]
    fn unexpected_token_reports_expected_terminals() {
        let g = list_grammar();
        let table = Config::new().generate(&g).unwrap();
        let actions = SemanticActions::new();
        let comma = g.terminal_id(",").unwrap();

        let err = parse(&table, &actions, tokens(&g, "x x")).unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                token, expected, ..
            } => {
                assert_eq!(token.kind, g.terminal_id("x").unwrap());
                assert!(expected.contains(&Some(comma)));
                assert!(expected.contains(&None));
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }
}
