//! The calculator grammar and its evaluation.

use crate::lexer;
use anyhow::Context as _;
use lrkit::{
    grammar::{Assoc, Grammar, GrammarDef, GrammarDefError, SymbolID::*, TerminalID},
    parser::{self, ParseError, SemanticActions, Token},
    table::{BuildError, ParseTable},
    Config,
};
use std::iter;

pub struct Calculator {
    grammar: Grammar,
    table: ParseTable,
    actions: SemanticActions<'static, f64>,
}

impl Calculator {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut actions = SemanticActions::new();
        let grammar = Grammar::define(|g| define_grammar(g, &mut actions))
            .context("invalid grammar definition")?;
        let table = config
            .generate(&grammar)
            .map_err(|err| describe_build_error(&grammar, err))
            .context("failed to generate the parse table")?;
        for resolution in table.resolutions() {
            tracing::debug!(
                "resolved conflict at {} on {}: {:?}",
                resolution.state,
                grammar.terminals[&resolution.terminal],
                resolution.reason,
            );
        }
        Ok(Self {
            grammar,
            table,
            actions,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn eval(&self, input: &str) -> anyhow::Result<f64> {
        let _span = tracing::trace_span!("eval").entered();

        let mut tokens = vec![];
        for lexeme in lexer::lex(input) {
            let lexeme = lexeme?;
            let kind = self
                .grammar
                .terminal_id(lexeme.terminal_name())
                .with_context(|| format!("undeclared terminal {}", lexeme.terminal_name()))?;
            tracing::trace!("token {:?}", lexeme);
            tokens.push(Ok::<_, lexer::LexError>(Token::new(kind, lexeme.value())));
        }

        parser::parse(&self.table, &self.actions, tokens).map_err(|err| match err {
            ParseError::UnexpectedToken {
                token, expected, ..
            } => anyhow::anyhow!(
                "unexpected {} (expected: {})",
                self.grammar.terminals[&token.kind],
                self.describe(&expected),
            ),
            ParseError::UnexpectedEndOfInput { expected, .. } => anyhow::anyhow!(
                "unexpected end of input (expected: {})",
                self.describe(&expected),
            ),
            err => anyhow::Error::new(err),
        })
    }

    fn describe(&self, expected: &[Option<TerminalID>]) -> String {
        let names: Vec<_> = expected
            .iter()
            .map(|t| match t {
                Some(t) => self.grammar.terminals[t].name(),
                None => "end of input",
            })
            .collect();
        names.join(", ")
    }
}

fn describe_build_error(grammar: &Grammar, err: BuildError) -> anyhow::Error {
    match err {
        BuildError::UnresolvedConflict {
            state,
            terminal,
            actions,
        } => {
            let actions: Vec<_> = actions
                .iter()
                .map(|action| action.display(grammar).to_string())
                .collect();
            anyhow::anyhow!(
                "unresolved conflict at {} on {}: {}",
                state,
                grammar.terminals[&terminal],
                actions.join(" / "),
            )
        }
        err => anyhow::Error::new(err),
    }
}

fn define_grammar(
    g: &mut GrammarDef,
    actions: &mut SemanticActions<'static, f64>,
) -> Result<(), GrammarDefError> {
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let num = g.terminal("NUM")?;

    let expr = g.nonterminal("EXPR")?;
    g.start_symbol(expr)?;

    g.precedence(Assoc::Left, [plus, minus])?;
    g.precedence(Assoc::Left, [star, slash])?;
    let prec_neg = g.precedence(Assoc::Right, iter::empty())?;

    let add = g.rule(expr, [N(expr), T(plus), N(expr)], None)?;
    let sub = g.rule(expr, [N(expr), T(minus), N(expr)], None)?;
    let mul = g.rule(expr, [N(expr), T(star), N(expr)], None)?;
    let div = g.rule(expr, [N(expr), T(slash), N(expr)], None)?;
    let paren = g.rule(expr, [T(lparen), N(expr), T(rparen)], None)?;
    let neg = g.rule(expr, [T(minus), N(expr)], Some(prec_neg))?;
    g.rule(expr, [num], None)?;

    actions
        .on(add, binop(|lhs, rhs| lhs + rhs))
        .on(sub, binop(|lhs, rhs| lhs - rhs))
        .on(mul, binop(|lhs, rhs| lhs * rhs))
        .on(div, binop(|lhs, rhs| lhs / rhs))
        .on(paren, |args| match args[..] {
            [_, inner, _] => inner,
            _ => f64::NAN,
        })
        .on(neg, |args| match args[..] {
            [_, operand] => -operand,
            _ => f64::NAN,
        });

    Ok(())
}

fn binop(f: fn(f64, f64) -> f64) -> impl Fn(Vec<f64>) -> f64 {
    move |args| match args[..] {
        [lhs, _, rhs] => f(lhs, rhs),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrkit::Algorithm;

    fn calculators() -> Vec<Calculator> {
        [
            Algorithm::LR0,
            Algorithm::SLR1,
            Algorithm::LALR1,
            Algorithm::LR1,
        ]
        .into_iter()
        .map(|algorithm| {
            let mut config = Config::new();
            config.set_algorithm(algorithm);
            Calculator::new(&config).unwrap()
        })
        .collect()
    }

    #[test]
    fn evaluate_with_precedence() {
        for calc in calculators() {
            assert_eq!(calc.eval("1 + 2 * 3").unwrap(), 7.0);
            assert_eq!(calc.eval("(1 + 2) * 3").unwrap(), 9.0);
            assert_eq!(calc.eval("8 - 4 - 2").unwrap(), 2.0);
            assert_eq!(calc.eval("8 / 2 / 2").unwrap(), 2.0);
            assert_eq!(calc.eval("-2 * 3").unwrap(), -6.0);
            assert_eq!(calc.eval("1 - -2").unwrap(), 3.0);
            assert_eq!(calc.eval("1.5 + 1").unwrap(), 2.5);
        }
    }

    #[test]
    fn conflicts_are_resolved_by_precedence() {
        let calc = Calculator::new(&Config::new()).unwrap();
        assert!(!calc.table().resolutions().is_empty());
    }

    #[test]
    fn report_conflicts_by_name() {
        // EXPR := EXPR PLUS EXPR | NUM, without precedence
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("PLUS")?;
            let num = g.terminal("NUM")?;
            let expr = g.nonterminal("EXPR")?;
            g.rule(expr, [N(expr), T(plus), N(expr)], None)?;
            g.rule(expr, [num], None)?;
            Ok(())
        })
        .unwrap();
        let err = Config::new().generate(&grammar).unwrap_err();

        let msg = describe_build_error(&grammar, err).to_string();
        assert!(msg.starts_with("unresolved conflict at S#"), "{}", msg);
        assert!(msg.contains(" on PLUS: "), "{}", msg);
        assert!(msg.contains("reduce(EXPR := EXPR PLUS EXPR)"), "{}", msg);
        assert!(!msg.contains("raw"), "{}", msg);
    }

    #[test]
    fn report_syntax_errors() {
        let calc = Calculator::new(&Config::new()).unwrap();

        let err = calc.eval("1 +").unwrap_err();
        assert!(err.to_string().starts_with("unexpected end of input"), "{}", err);

        let err = calc.eval("1 2").unwrap_err();
        assert!(err.to_string().starts_with("unexpected NUM"), "{}", err);

        let err = calc.eval("1 + x").unwrap_err();
        assert!(err.to_string().contains("unrecognized input"), "{}", err);
    }
}
