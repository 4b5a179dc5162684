//! Calculation of FIRST and FOLLOW sets.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID},
    types::{Map, Set, TerminalSet},
    util::{display_fn, display_joined},
};
use std::fmt;

/// `First(A) ⊇ First(B)` for nonterminals, or `Follow(A) ⊇ Follow(B)`.
#[derive(Debug)]
struct Constraint {
    sup: NonterminalID,
    sub: NonterminalID,
}

/// Grow the sets until every constraint is satisfied.
fn solve(map: &mut Map<NonterminalID, TerminalSet>, constraints: &[Constraint]) {
    let mut changed = true;
    while changed {
        changed = false;
        for Constraint { sup, sub } in constraints {
            let subset = map[sub].clone();
            changed |= map[sup].union_with(&subset);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FirstSets {
    nulls: Set<NonterminalID>,
    // ε is not stored here; it is derived from `nulls`.
    map: Map<NonterminalID, TerminalSet>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let nulls = nulls_set(grammar);

        let mut map: Map<NonterminalID, TerminalSet> = grammar
            .nonterminals
            .keys()
            .map(|&n| (n, TerminalSet::default()))
            .collect();

        // X -> Y1 Y2 ... Yn:
        // walk Y1, Y2, ... up to the first non-nullable symbol Yk, and
        // require First(X) ⊇ First(Yi) for each i <= k.
        let mut constraints = vec![];
        for rule in grammar.rules.values() {
            for symbol in rule.right() {
                match *symbol {
                    SymbolID::T(t) => {
                        map[&rule.left()].insert(t);
                        break;
                    }
                    SymbolID::N(n) => {
                        if n != rule.left() {
                            constraints.push(Constraint {
                                sup: rule.left(),
                                sub: n,
                            });
                        }
                        if !nulls.contains(&n) {
                            break;
                        }
                    }
                }
            }
        }

        solve(&mut map, &constraints);

        tracing::debug!(
            nullables = nulls.len(),
            constraints = constraints.len(),
            "computed FIRST sets"
        );

        Self { nulls, map }
    }

    pub fn is_nullable(&self, n: NonterminalID) -> bool {
        self.nulls.contains(&n)
    }

    /// `First(symbol)`, containing ε when the symbol is nullable.
    pub fn first(&self, symbol: SymbolID) -> TerminalSet {
        match symbol {
            SymbolID::T(t) => Some(t).into_iter().collect(),
            SymbolID::N(n) => {
                let mut set = self.map[&n].clone();
                if self.is_nullable(n) {
                    set.insert(TerminalID::EPSILON);
                }
                set
            }
        }
    }

    /// `First(Y1 Y2 ... Yn)`, containing ε when the whole sequence is nullable.
    pub fn first_of_sequence(&self, symbols: &[SymbolID]) -> TerminalSet {
        let mut res = TerminalSet::default();
        if self.extend_first(&mut res, symbols) {
            res.insert(TerminalID::EPSILON);
        }
        res
    }

    /// `First(Y1 Y2 ... Yn a)` for each `a` in `lookaheads`.
    ///
    /// The result never contains ε.
    pub fn first_of_sequence_with(
        &self,
        symbols: &[SymbolID],
        lookaheads: &TerminalSet,
    ) -> TerminalSet {
        let mut res = TerminalSet::default();
        if self.extend_first(&mut res, symbols) {
            res.union_with(lookaheads);
            res.remove(TerminalID::EPSILON);
        }
        res
    }

    // Returns whether every symbol is nullable.
    fn extend_first(&self, res: &mut TerminalSet, symbols: &[SymbolID]) -> bool {
        for symbol in symbols {
            match *symbol {
                SymbolID::T(t) => {
                    res.insert(t);
                    return false;
                }
                SymbolID::N(n) => {
                    res.union_with(&self.map[&n]);
                    if !self.is_nullable(n) {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for &n in self.map.keys() {
                let names = self
                    .first(SymbolID::N(n))
                    .iter()
                    .map(|t| g.terminals[&t].name().to_owned())
                    .collect::<Vec<_>>();
                writeln!(f, "FIRST({}) = {{{}}}", g.nonterminals[&n], display_joined(&names, ", "))?;
            }
            Ok(())
        })
    }
}

/// Calculate the set of nullable symbols in this grammar.
fn nulls_set(grammar: &Grammar) -> Set<NonterminalID> {
    let mut nulls: Set<NonterminalID> = grammar
        .rules
        .values()
        .filter_map(|rule| rule.right().is_empty().then(|| rule.left()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in grammar.rules.values() {
            if nulls.contains(&rule.left()) {
                continue;
            }
            let is_rhs_nullable = rule
                .right()
                .iter()
                .all(|symbol| matches!(symbol, SymbolID::N(n) if nulls.contains(n)));
            if is_rhs_nullable {
                changed = true;
                nulls.insert(rule.left());
            }
        }
    }

    nulls
}

#[derive(Debug, PartialEq, Eq)]
pub struct FollowSets {
    map: Map<NonterminalID, TerminalSet>,
}

impl FollowSets {
    pub fn new(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut map: Map<NonterminalID, TerminalSet> = grammar
            .nonterminals
            .keys()
            .map(|&n| (n, TerminalSet::default()))
            .collect();
        map[&NonterminalID::START].insert(TerminalID::EOI);
        map[&grammar.start_symbol].insert(TerminalID::EOI);

        // A -> α B β:
        // Follow(B) ⊇ First(β) - {ε}, and Follow(B) ⊇ Follow(A) if β is nullable.
        let mut constraints = vec![];
        for rule in grammar.rules.values() {
            let right = rule.right();
            for (i, symbol) in right.iter().enumerate() {
                let b = match *symbol {
                    SymbolID::N(b) => b,
                    SymbolID::T(..) => continue,
                };
                let mut beta = first.first_of_sequence(&right[i + 1..]);
                let beta_nullable = beta.remove(TerminalID::EPSILON);
                map[&b].union_with(&beta);
                if beta_nullable && b != rule.left() {
                    constraints.push(Constraint {
                        sup: b,
                        sub: rule.left(),
                    });
                }
            }
        }

        solve(&mut map, &constraints);

        tracing::debug!(constraints = constraints.len(), "computed FOLLOW sets");

        Self { map }
    }

    pub fn get(&self, n: NonterminalID) -> &TerminalSet {
        &self.map[&n]
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (n, set) in &self.map {
                let names = set
                    .iter()
                    .map(|t| g.terminals[&t].name().to_owned())
                    .collect::<Vec<_>>();
                writeln!(f, "FOLLOW({}) = {{{}}}", g.nonterminals[n], display_joined(&names, ", "))?;
            }
            Ok(())
        })
    }
}
