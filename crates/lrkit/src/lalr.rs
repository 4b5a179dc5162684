//! Merging of LR(1) states sharing the same LR(0) cores.

use crate::{
    automaton::{Automaton, StateID},
    grammar::SymbolID,
    item::{ItemSet, LR0Item},
    types::Map,
};
use std::collections::BTreeSet;

/// Merge the isocore states of an LR(1) automaton into an LALR(1) one.
///
/// Merged states are numbered in the order their cores were first seen,
/// so the initial state stays `StateID::START`. Lookaheads of the same
/// core item are unioned, and both endpoints of every transition are
/// redirected to the merged states.
pub fn merge(automaton: &Automaton) -> Automaton {
    let mut isocores: Map<BTreeSet<LR0Item>, StateID> = Map::default();
    let mut renamed: Map<StateID, StateID> = Map::default();
    let mut states: Map<StateID, ItemSet> = Map::default();

    for (id, items) in automaton.states() {
        let next_id = StateID::from_index(isocores.len());
        let merged_id = *isocores.entry(items.core_set()).or_insert(next_id);
        renamed.insert(id, merged_id);

        let merged = states.entry(merged_id).or_default();
        for (core, lookaheads) in items.iter() {
            merged.insert(*core, lookaheads);
        }
    }

    let mut transitions: Map<StateID, Map<SymbolID, StateID>> = Map::default();
    for (&id, edges) in &automaton.transitions {
        let merged_edges = transitions.entry(renamed[&id]).or_default();
        for (symbol, next) in edges {
            merged_edges.insert(*symbol, renamed[next]);
        }
    }

    tracing::debug!(
        before = automaton.len(),
        after = states.len(),
        "merged isocore states"
    );

    Automaton {
        kind: automaton.kind(),
        states,
        transitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::{lr0, lr1},
        first_follow::FirstSets,
        grammar::{Grammar, SymbolID::*},
        types::Set,
    };

    // S := C C ; C := c C | d
    fn grammar() -> Grammar {
        Grammar::define(|g| {
            let c = g.terminal("c")?;
            let d = g.terminal("d")?;
            let s_ = g.nonterminal("S")?;
            let c_ = g.nonterminal("C")?;
            g.rule(s_, [N(c_), N(c_)], None)?;
            g.rule(c_, [T(c), N(c_)], None)?;
            g.rule(c_, [T(d)], None)?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn one_state_per_core() {
        let g = grammar();
        let first = FirstSets::new(&g);
        let canonical = lr1(&g, &first);
        let merged = merge(&canonical);

        assert_eq!(canonical.len(), 10);
        assert_eq!(merged.len(), lr0(&g).len());

        let cores: Set<_> = merged.states().map(|(_, items)| items.core_set()).collect();
        assert_eq!(cores.len(), merged.len());
        let lr1_cores: Set<_> = canonical.states().map(|(_, items)| items.core_set()).collect();
        assert_eq!(cores, lr1_cores);
    }

    #[test]
    fn lookaheads_are_unioned() {
        let g = grammar();
        let first = FirstSets::new(&g);
        let canonical = lr1(&g, &first);
        let merged = merge(&canonical);

        for (_, items) in canonical.states() {
            let (_, target) = merged
                .states()
                .find(|(_, merged)| merged.core_set() == items.core_set())
                .unwrap();
            for (core, lookaheads) in items.iter() {
                let unioned = target.lookaheads(core).unwrap();
                assert!(lookaheads.iter().all(|t| unioned.contains(t)));
            }
        }
    }

    #[test]
    fn transitions_are_redirected() {
        let g = grammar();
        let first = FirstSets::new(&g);
        let merged = merge(&lr1(&g, &first));

        for (id, items) in merged.states() {
            for core in items.cores() {
                if let Some(symbol) = core.peek_after_dot(&g) {
                    let next = merged.transition(id, symbol).unwrap();
                    assert!(merged.state(next).contains(&core.advance(&g).unwrap()));
                }
            }
        }
    }
}
