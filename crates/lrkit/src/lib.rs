//! A construction kit for table-driven LR parsers.

pub mod automaton;
pub mod first_follow;
pub mod grammar;
pub mod item;
pub mod lalr;
pub mod parser;
pub mod table;
pub mod types;
pub mod util;

use crate::{
    first_follow::{FirstSets, FollowSets},
    grammar::Grammar,
    table::{BuildError, ParseTable},
};

/// The construction method of the LR automaton.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Algorithm {
    /// LR(0) item sets, reducing on FOLLOW sets.
    LR0,
    /// LR(0) item sets, reducing on FOLLOW sets (Simple LR).
    SLR1,
    /// LR(1) item sets merged by their LR(0) cores.
    #[default]
    LALR1,
    /// Knuth's canonical LR(1) item sets.
    LR1,
}

#[derive(Debug, Clone)]
pub struct Config {
    algorithm: Algorithm,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            algorithm: Algorithm::LALR1,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    pub fn use_lr0(&mut self) -> &mut Self {
        self.set_algorithm(Algorithm::LR0)
    }

    pub fn use_slr1(&mut self) -> &mut Self {
        self.set_algorithm(Algorithm::SLR1)
    }

    /// Select DeRemer's LALR(1) method.
    ///
    /// This is the default, as it keeps the LR(0) state count while resolving
    /// most of the lookahead conflicts of canonical LR(1).
    pub fn use_lalr1(&mut self) -> &mut Self {
        self.set_algorithm(Algorithm::LALR1)
    }

    pub fn use_lr1(&mut self) -> &mut Self {
        self.set_algorithm(Algorithm::LR1)
    }

    /// Build the automaton for the grammar, without synthesizing the table.
    pub fn automaton(&self, grammar: &Grammar) -> automaton::Automaton {
        match self.algorithm {
            Algorithm::LR0 | Algorithm::SLR1 => automaton::lr0(grammar),
            Algorithm::LALR1 => lalr::merge(&automaton::lr1(grammar, &FirstSets::new(grammar))),
            Algorithm::LR1 => automaton::lr1(grammar, &FirstSets::new(grammar)),
        }
    }

    /// Derive the conflict-free parse table of the grammar.
    pub fn generate(&self, grammar: &Grammar) -> Result<ParseTable, BuildError> {
        let _span = tracing::debug_span!("generate", algorithm = ?self.algorithm).entered();

        let first = FirstSets::new(grammar);
        let raw = match self.algorithm {
            Algorithm::LR0 | Algorithm::SLR1 => {
                let follow = FollowSets::new(grammar, &first);
                let automaton = automaton::lr0(grammar);
                table::synthesize(grammar, &automaton, Some(&follow))
            }
            Algorithm::LALR1 => {
                let automaton = lalr::merge(&automaton::lr1(grammar, &first));
                table::synthesize(grammar, &automaton, None)
            }
            Algorithm::LR1 => {
                let automaton = automaton::lr1(grammar, &first);
                table::synthesize(grammar, &automaton, None)
            }
        };

        table::resolve(grammar, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;
    use tracing::Level;

    #[test]
    fn smoketest() {
        let _ = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .try_init();

        let grammar = Grammar::define(|def| {
            let equal = def.terminal("EQUAL")?;
            let plus = def.terminal("PLUS")?;
            let ident = def.terminal("ID")?;
            let num = def.terminal("NUM")?;

            let a = def.nonterminal("A")?;
            let e = def.nonterminal("E")?;
            let t = def.nonterminal("T")?;

            def.start_symbol(a)?;

            def.rule(a, [N(e), T(equal), N(e)], None)?;
            def.rule(a, [T(ident)], None)?;
            def.rule(e, [N(e), T(plus), N(t)], None)?;
            def.rule(e, [N(t)], None)?;
            def.rule(t, [T(num)], None)?;
            def.rule(t, [T(ident)], None)?;

            Ok(())
        })
        .unwrap();
        eprintln!("{}", grammar);

        let first = FirstSets::new(&grammar);
        eprintln!("{}", first.display(&grammar));
        eprintln!("{}", FollowSets::new(&grammar, &first).display(&grammar));

        for algorithm in [
            Algorithm::LR0,
            Algorithm::SLR1,
            Algorithm::LALR1,
            Algorithm::LR1,
        ] {
            let mut config = Config::new();
            config.set_algorithm(algorithm);
            eprintln!("{}", config.automaton(&grammar).display(&grammar));

            // `A := ID .` and `T := ID .` both reduce on the end of input under FOLLOW sets.
            let table = config.generate(&grammar);
            match algorithm {
                Algorithm::LR0 | Algorithm::SLR1 => {
                    assert!(matches!(table, Err(BuildError::UnresolvedConflict { .. })));
                }
                _ => {
                    let table = table.unwrap();
                    eprintln!("{}", table.display(&grammar));
                }
            }
        }
    }

    #[test]
    fn default_algorithm_is_lalr1() {
        assert_eq!(Config::default().algorithm(), Algorithm::LALR1);
        assert_eq!(Config::new().use_lr1().algorithm(), Algorithm::LR1);
    }
}
