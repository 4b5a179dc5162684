//! LR items and item sets.

use crate::{
    grammar::{Grammar, RuleID, SymbolID, TerminalID},
    types::TerminalSet,
    util::display_fn,
};
use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt,
};

/// A production rule with a marker position, e.g. `X := Y1 . Y2 Y3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub rule: RuleID,
    pub marker: u16,
}

impl LR0Item {
    /// `[$start := . S]`
    pub const START: Self = Self::new(RuleID::ACCEPT, 0);

    pub const fn new(rule: RuleID, marker: u16) -> Self {
        Self { rule, marker }
    }

    fn right<'g>(&self, g: &'g Grammar) -> &'g [SymbolID] {
        g.rule(self.rule).right()
    }

    /// Return the symbol right after the marker, or `None` at the end of the rule.
    pub fn peek_after_dot(&self, g: &Grammar) -> Option<SymbolID> {
        self.right(g).get(usize::from(self.marker)).copied()
    }

    /// Return the item whose marker is moved one symbol forward.
    pub fn advance(&self, g: &Grammar) -> Option<Self> {
        (!self.is_complete(g)).then(|| Self::new(self.rule, self.marker + 1))
    }

    /// Return the symbols following the one right after the marker,
    /// i.e. `β` for `[A := α . B β]`.
    pub fn tail<'g>(&self, g: &'g Grammar) -> &'g [SymbolID] {
        let right = self.right(g);
        let start = (usize::from(self.marker) + 1).min(right.len());
        &right[start..]
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        usize::from(self.marker) >= self.right(g).len()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let rule = g.rule(self.rule);
            write!(f, "[{} :=", g.nonterminals[&rule.left()])?;
            for (i, symbol) in rule.right().iter().enumerate() {
                if i == usize::from(self.marker) {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            if self.is_complete(g) {
                f.write_str(" .")?;
            }
            f.write_str("]")
        })
    }
}

/// An LR(0) item paired with a single lookahead terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR1Item {
    pub core: LR0Item,
    pub lookahead: TerminalID,
}

impl LR1Item {
    /// `β a` for the item `[A := α . B β, a]`.
    ///
    /// A complete item yields just the lookahead.
    pub fn tail_with_lookahead(&self, g: &Grammar) -> Vec<SymbolID> {
        let mut tail = self.core.tail(g).to_vec();
        tail.push(SymbolID::T(self.lookahead));
        tail
    }
}

/// A set of items, keyed by their LR(0) cores.
///
/// Each core carries the set of its lookaheads, which stays empty for
/// LR(0) automata. Two item sets are equal iff they contain the same LR(1)
/// items, so this type can be hashed to deduplicate states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: BTreeMap<LR0Item, TerminalSet>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with the specified lookaheads, returning whether the set grew.
    pub fn insert(&mut self, core: LR0Item, lookaheads: &TerminalSet) -> bool {
        match self.items.entry(core) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(lookaheads.clone());
                true
            }
            btree_map::Entry::Occupied(mut entry) => entry.get_mut().union_with(lookaheads),
        }
    }

    pub fn contains(&self, core: &LR0Item) -> bool {
        self.items.contains_key(core)
    }

    pub fn cores(&self) -> impl Iterator<Item = LR0Item> + '_ {
        self.items.keys().copied()
    }

    /// The LR(0) projection of this set, used to identify isocores.
    pub fn core_set(&self) -> BTreeSet<LR0Item> {
        self.cores().collect()
    }

    pub fn lr1_items(&self) -> impl Iterator<Item = LR1Item> + '_ {
        self.items.iter().flat_map(|(core, lookaheads)| {
            lookaheads.iter().map(move |lookahead| LR1Item {
                core: *core,
                lookahead,
            })
        })
    }

    pub fn lookaheads(&self, core: &LR0Item) -> Option<&TerminalSet> {
        self.items.get(core)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LR0Item, &TerminalSet)> + '_ {
        self.items.iter()
    }

    /// Return the number of LR(0) cores.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (core, lookaheads) in &self.items {
                write!(f, "- {}", core.display(g))?;
                if !lookaheads.is_empty() {
                    f.write_str("  [")?;
                    for (i, lookahead) in lookaheads.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        f.write_str(g.terminals[&lookahead].name())?;
                    }
                    f.write_str("]")?;
                }
                writeln!(f)?;
            }
            Ok(())
        })
    }
}
