//! Construction of the canonical collection of item sets.

use crate::{
    first_follow::FirstSets,
    grammar::{Grammar, SymbolID, TerminalID},
    item::{ItemSet, LR0Item},
    types::{Map, Queue, Set, TerminalSet},
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u16);

impl StateID {
    /// The state containing the item `[$start := . S]`.
    pub const START: Self = Self(0);

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u16 {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u16::try_from(index).expect("too many states"))
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Whether the item sets carry lookahead symbols.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemKind {
    LR0,
    LR1,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Automaton {
    pub(crate) kind: ItemKind,
    pub(crate) states: Map<StateID, ItemSet>,
    pub(crate) transitions: Map<StateID, Map<SymbolID, StateID>>,
}

impl Automaton {
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &ItemSet)> + '_ {
        self.states.iter().map(|(id, items)| (*id, items))
    }

    pub fn state(&self, id: StateID) -> &ItemSet {
        &self.states[&id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Return the outgoing transitions of the specified state.
    pub fn transitions(&self, id: StateID) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.transitions
            .get(&id)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(symbol, next)| (*symbol, *next)))
    }

    pub fn transition(&self, id: StateID, symbol: SymbolID) -> Option<StateID> {
        self.transitions.get(&id)?.get(&symbol).copied()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, items)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", id)?;
                writeln!(f, "## items")?;
                write!(f, "{}", items.display(g))?;
                let mut edges = self.transitions(id).peekable();
                if edges.peek().is_some() {
                    writeln!(f, "## transitions")?;
                }
                for (symbol, next) in edges {
                    writeln!(f, "- {} => {:?}", g.symbol_name(symbol), next)?;
                }
            }
            Ok(())
        })
    }
}

/// Compute the closure of the specified item set.
///
/// With `first` set to `None`, lookaheads are ignored and the LR(0)
/// closure is computed. Otherwise a new item `[B := . γ, b]` is added
/// for every `b` in `First(β a)`.
pub fn closure(g: &Grammar, first: Option<&FirstSets>, items: &ItemSet) -> ItemSet {
    let mut closed = items.clone();

    // A core is revisited whenever its lookaheads grow.
    let mut pending: Queue<LR0Item> = closed.cores().collect();
    while let Some(core) = pending.pop() {
        let b = match core.peek_after_dot(g) {
            Some(SymbolID::N(b)) => b,
            _ => continue,
        };

        let lookaheads = match first {
            Some(first) => {
                let current = closed.lookaheads(&core).cloned().unwrap_or_default();
                first.first_of_sequence_with(core.tail(g), &current)
            }
            None => TerminalSet::default(),
        };

        for &rule in g.productions(b) {
            let item = LR0Item::new(rule, 0);
            if closed.insert(item, &lookaheads) {
                pending.push(item);
            }
        }
    }

    closed
}

/// Compute the closure of the items reached by moving the marker over `symbol`.
///
/// The result is empty when no item expects `symbol`.
pub fn goto(g: &Grammar, first: Option<&FirstSets>, items: &ItemSet, symbol: SymbolID) -> ItemSet {
    let mut kernels = ItemSet::new();
    for (core, lookaheads) in items.iter() {
        if core.peek_after_dot(g) != Some(symbol) {
            continue;
        }
        if let Some(next) = core.advance(g) {
            kernels.insert(next, lookaheads);
        }
    }
    if kernels.is_empty() {
        return kernels;
    }
    closure(g, first, &kernels)
}

/// Build the canonical collection of LR(0) item sets.
pub fn lr0(g: &Grammar) -> Automaton {
    canonical_collection(g, None)
}

/// Build the canonical collection of LR(1) item sets.
pub fn lr1(g: &Grammar, first: &FirstSets) -> Automaton {
    canonical_collection(g, Some(first))
}

fn canonical_collection(g: &Grammar, first: Option<&FirstSets>) -> Automaton {
    let kind = match first {
        Some(..) => ItemKind::LR1,
        None => ItemKind::LR0,
    };

    let mut initial = ItemSet::new();
    let lookaheads = match kind {
        ItemKind::LR1 => Some(TerminalID::EOI).into_iter().collect(),
        ItemKind::LR0 => TerminalSet::default(),
    };
    initial.insert(LR0Item::START, &lookaheads);

    // The index of an item set in this set is its state number.
    let mut states: Set<ItemSet> = Set::default();
    states.insert(closure(g, first, &initial));

    let mut transitions: Map<StateID, Map<SymbolID, StateID>> = Map::default();
    let mut pending = VecDeque::from([0usize]);
    while let Some(index) = pending.pop_front() {
        let current = StateID::from_index(index);
        let items = states[index].clone();

        let symbols: Set<SymbolID> = items
            .cores()
            .filter_map(|core| core.peek_after_dot(g))
            .collect();

        let mut edges = Map::default();
        for symbol in symbols {
            let next_items = goto(g, first, &items, symbol);
            let (next, inserted) = states.insert_full(next_items);
            if inserted {
                pending.push_back(next);
            }
            edges.insert(symbol, StateID::from_index(next));
        }

        tracing::trace!(
            state = ?current,
            items = items.len(),
            edges = edges.len(),
            "expanded state"
        );
        transitions.insert(current, edges);
    }

    tracing::debug!(?kind, states = states.len(), "built canonical collection");

    Automaton {
        kind,
        states: states
            .into_iter()
            .enumerate()
            .map(|(index, items)| (StateID::from_index(index), items))
            .collect(),
        transitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

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

    fn assert_unique_states(automaton: &Automaton) {
        let unique: Set<&ItemSet> = automaton.states().map(|(_, items)| items).collect();
        assert_eq!(unique.len(), automaton.len());
    }

    #[test]
    fn lr0_collection() {
        let g = grammar();
        let automaton = lr0(&g);
        assert_eq!(automaton.kind(), ItemKind::LR0);
        assert_eq!(automaton.len(), 7);
        assert_unique_states(&automaton);

        // [$start := . S], [S := . C C], [C := . c C], [C := . d]
        assert_eq!(automaton.state(StateID::START).len(), 4);
    }

    #[test]
    fn lr1_collection() {
        let g = grammar();
        let first = FirstSets::new(&g);
        let automaton = lr1(&g, &first);
        assert_eq!(automaton.kind(), ItemKind::LR1);
        assert_eq!(automaton.len(), 10);
        assert_unique_states(&automaton);

        // the closure items [C := . c C] carry the lookaheads {c, d}
        let c = g.terminal_id("c").unwrap();
        let d = g.terminal_id("d").unwrap();
        let start = automaton.state(StateID::START);
        let c_rule = g.productions(g.nonterminal_id("C").unwrap())[0];
        let expected: TerminalSet = [c, d].into_iter().collect();
        assert_eq!(start.lookaheads(&LR0Item::new(c_rule, 0)), Some(&expected));
    }

    #[test]
    fn transitions_cover_every_symbol_after_dot() {
        let g = grammar();
        let first = FirstSets::new(&g);
        for automaton in [lr0(&g), lr1(&g, &first)] {
            for (id, items) in automaton.states() {
                for core in items.cores() {
                    if let Some(symbol) = core.peek_after_dot(&g) {
                        let next = automaton.transition(id, symbol).unwrap();
                        assert!(automaton.state(next).contains(&core.advance(&g).unwrap()));
                    }
                }
            }
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let g = grammar();
        let first = FirstSets::new(&g);
        assert_eq!(lr0(&g), lr0(&g));
        assert_eq!(lr1(&g, &first), lr1(&g, &first));
        assert_eq!(
            lr1(&g, &first).display(&g).to_string(),
            lr1(&g, &first).display(&g).to_string()
        );
    }

    #[test]
    fn goto_on_unexpected_symbol_is_empty() {
        let g = grammar();
        let automaton = lr0(&g);
        let d = g.terminal_id("d").unwrap();
        let start = automaton.state(StateID::START);
        assert!(goto(&g, None, start, SymbolID::EOI).is_empty());
        assert!(!goto(&g, None, start, T(d)).is_empty());
    }
}
