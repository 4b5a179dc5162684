//! Synthesis of the action/goto tables with conflict resolution.

use crate::{
    automaton::{Automaton, ItemKind, StateID},
    first_follow::FollowSets,
    grammar::{Assoc, Grammar, GrammarDefError, NonterminalID, RuleID, SymbolID, TerminalID},
    types::{Map, TerminalSet},
    util::{display_fn, display_joined},
};
use lrkit_runtime::definition::{ParseAction, ParseActionError, ParseTable as ParseTableDef};
use std::{cmp::Ordering, fmt};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A grammar definition error, so that `Grammar::define` and
    /// `Config::generate` can share one `?` chain.
    #[error("malformed grammar")]
    MalformedGrammar(
        #[from]
        #[source]
        GrammarDefError,
    ),

    /// The IDs are raw; `Action::display` and `Grammar::terminals` give them names.
    #[error("unresolved conflict in state {state:?} on {terminal:?}: {actions:?}")]
    UnresolvedConflict {
        state: StateID,
        terminal: TerminalID,
        actions: Vec<Action>,
    },
}

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production rule.
    Reduce(RuleID),

    Accept,
}

impl Action {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            Self::Shift(next) => write!(f, "shift({:?})", next),
            Self::Reduce(rule) => write!(f, "reduce({})", g.rule(*rule).display(g)),
            Self::Accept => f.write_str("accept"),
        })
    }
}

/// A cell of the action table before conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Single(Action),
    /// Distinct actions in the order they were recorded.
    Conflicting(Vec<Action>),
}

impl Cell {
    fn add(&mut self, action: Action) {
        match self {
            Self::Single(current) if *current == action => (),
            Self::Single(current) => *self = Self::Conflicting(vec![*current, action]),
            Self::Conflicting(actions) => {
                if !actions.contains(&action) {
                    actions.push(action);
                }
            }
        }
    }

    pub fn actions(&self) -> &[Action] {
        match self {
            Self::Single(action) => std::slice::from_ref(action),
            Self::Conflicting(actions) => &actions[..],
        }
    }

    pub fn is_conflicting(&self) -> bool {
        matches!(self, Self::Conflicting(..))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct RawTableRow {
    pub actions: Map<TerminalID, Cell>,
    pub gotos: Map<NonterminalID, StateID>,
}

/// The action/goto tables as derived from an automaton, conflicts included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    rows: Map<StateID, RawTableRow>,
}

impl RawTable {
    pub fn rows(&self) -> impl Iterator<Item = (StateID, &RawTableRow)> + '_ {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// Iterate over the cells holding more than one action.
    pub fn conflicts(&self) -> impl Iterator<Item = (StateID, TerminalID, &[Action])> + '_ {
        self.rows.iter().flat_map(|(id, row)| {
            row.actions
                .iter()
                .filter(|(_, cell)| cell.is_conflicting())
                .map(move |(t, cell)| (*id, *t, cell.actions()))
        })
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, row)) in self.rows().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", id)?;
                writeln!(f, "## actions")?;
                for (t, cell) in &row.actions {
                    let actions = cell.actions().iter().map(|action| action.display(g));
                    write!(f, "- {} => {}", g.terminals[t], display_joined(actions, " | "))?;
                    if cell.is_conflicting() {
                        f.write_str("  (conflict)")?;
                    }
                    writeln!(f)?;
                }
                writeln!(f, "## gotos")?;
                for (n, next) in &row.gotos {
                    writeln!(f, "- {} => goto({:?})", g.nonterminals[n], next)?;
                }
            }
            Ok(())
        })
    }
}

/// Populate the action/goto tables from the automaton.
///
/// Complete items of an LR(0) automaton reduce on `FOLLOW(LHS)` when
/// `follow` is given, and on every terminal otherwise. Complete items of an
/// LR(1) automaton reduce on their own lookaheads and `follow` is unused.
pub fn synthesize(g: &Grammar, automaton: &Automaton, follow: Option<&FollowSets>) -> RawTable {
    let all_terminals: TerminalSet = g.input_terminals().collect();

    let mut rows = Map::default();
    for (id, items) in automaton.states() {
        let mut row = RawTableRow::default();
        let mut add = |t: TerminalID, action: Action| match row.actions.get_mut(&t) {
            Some(cell) => cell.add(action),
            None => {
                row.actions.insert(t, Cell::Single(action));
            }
        };

        for (symbol, next) in automaton.transitions(id) {
            match symbol {
                SymbolID::T(t) => add(t, Action::Shift(next)),
                SymbolID::N(..) => (),
            }
        }

        for (core, lookaheads) in items.iter() {
            if !core.is_complete(g) {
                continue;
            }
            if core.rule == RuleID::ACCEPT {
                add(TerminalID::EOI, Action::Accept);
                continue;
            }
            let lookaheads = match (automaton.kind(), follow) {
                (ItemKind::LR1, _) => lookaheads,
                (ItemKind::LR0, Some(follow)) => follow.get(g.rule(core.rule).left()),
                (ItemKind::LR0, None) => &all_terminals,
            };
            for t in lookaheads.iter() {
                add(t, Action::Reduce(core.rule));
            }
        }

        for (symbol, next) in automaton.transitions(id) {
            if let SymbolID::N(n) = symbol {
                row.gotos.insert(n, next);
            }
        }

        rows.insert(id, row);
    }

    let table = RawTable { rows };
    tracing::debug!(
        states = table.rows.len(),
        conflicts = table.conflicts().count(),
        "synthesized action/goto tables"
    );
    table
}

/// Why a conflicting cell was resolved to the chosen action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolutionReason {
    /// Reduce/reduce: the rule declared first wins.
    EarliestRule,
    /// Shift/reduce: the side with the higher priority wins.
    HigherPrecedence,
    /// Shift/reduce with the same priority, settled by associativity.
    Associativity(Assoc),
    /// Shift/reduce where either side has no precedence; shift wins.
    MissingPrecedence,
}

/// A record of a conflict resolved while building the table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Resolution {
    pub state: StateID,
    pub terminal: TerminalID,
    pub candidates: Vec<Action>,
    pub chosen: Action,
    pub reason: ResolutionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseTableRow {
    pub actions: Map<TerminalID, Action>,
    pub gotos: Map<NonterminalID, StateID>,
}

/// The conflict-free action/goto tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    rows: Map<StateID, ParseTableRow>,
    // LHS and RHS length of every rule, needed to perform reductions.
    reduces: Map<RuleID, (NonterminalID, usize)>,
    resolutions: Vec<Resolution>,
}

impl ParseTable {
    pub fn rows(&self) -> impl Iterator<Item = (StateID, &ParseTableRow)> + '_ {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn row(&self, id: StateID) -> Option<&ParseTableRow> {
        self.rows.get(&id)
    }

    pub fn action(&self, state: StateID, terminal: TerminalID) -> Option<Action> {
        self.rows.get(&state)?.actions.get(&terminal).copied()
    }

    pub fn goto(&self, state: StateID, symbol: NonterminalID) -> Option<StateID> {
        self.rows.get(&state)?.gotos.get(&symbol).copied()
    }

    /// The conflicts settled by precedence or rule order.
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions[..]
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, row)) in self.rows().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", id)?;
                writeln!(f, "## actions")?;
                for (t, action) in &row.actions {
                    writeln!(f, "- {} => {}", g.terminals[t], action.display(g))?;
                }
                writeln!(f, "## gotos")?;
                for (n, next) in &row.gotos {
                    writeln!(f, "- {} => goto({:?})", g.nonterminals[n], next)?;
                }
            }

            if !self.resolutions.is_empty() {
                writeln!(f, "\n#### Resolved conflicts")?;
            }
            for r in &self.resolutions {
                let candidates = r.candidates.iter().map(|action| action.display(g));
                writeln!(
                    f,
                    "- {:?} on {}: {} => {} ({:?})",
                    r.state,
                    g.terminals[&r.terminal],
                    display_joined(candidates, " | "),
                    r.chosen.display(g),
                    r.reason,
                )?;
            }
            Ok(())
        })
    }
}

impl ParseTableDef for ParseTable {
    type State = StateID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;
    type Reduce = RuleID;

    fn initial_state(&self) -> StateID {
        StateID::START
    }

    fn action(
        &self,
        current: StateID,
        lookahead: Option<TerminalID>,
    ) -> ParseAction<StateID, NonterminalID, RuleID> {
        let row = match self.rows.get(&current) {
            Some(row) => row,
            None => return ParseAction::Error(ParseActionError::IncorrectState),
        };
        let lookahead = lookahead.unwrap_or(TerminalID::EOI);
        match row.actions.get(&lookahead) {
            Some(Action::Shift(next)) => ParseAction::Shift(*next),
            Some(Action::Reduce(rule)) => match self.reduces.get(rule) {
                Some(&(left, n)) => ParseAction::Reduce(*rule, left, n),
                None => ParseAction::Error(ParseActionError::IncorrectSymbol),
            },
            Some(Action::Accept) => ParseAction::Accept,
            None => ParseAction::Reject,
        }
    }

    fn goto(&self, current: StateID, symbol: NonterminalID) -> Option<StateID> {
        ParseTable::goto(self, current, symbol)
    }

    fn expected_terminals(&self, current: StateID) -> Vec<Option<TerminalID>> {
        self.rows.get(&current).map_or_else(Vec::new, |row| {
            row.actions
                .keys()
                .map(|&t| (t != TerminalID::EOI).then_some(t))
                .collect()
        })
    }
}

/// Settle every conflicting cell, failing on the first one that cannot be resolved.
pub fn resolve(g: &Grammar, raw: RawTable) -> Result<ParseTable, BuildError> {
    let mut rows = Map::default();
    let mut resolutions = vec![];

    for (id, raw_row) in raw.rows {
        let mut row = ParseTableRow {
            actions: Map::default(),
            gotos: raw_row.gotos,
        };
        for (t, cell) in raw_row.actions {
            let action = match cell {
                Cell::Single(action) => action,
                Cell::Conflicting(actions) => {
                    let resolution = resolve_conflict(g, id, t, actions)?;
                    tracing::trace!(
                        state = ?id,
                        terminal = g.terminals[&t].name(),
                        reason = ?resolution.reason,
                        "resolved conflict"
                    );
                    let chosen = resolution.chosen;
                    resolutions.push(resolution);
                    chosen
                }
            };
            row.actions.insert(t, action);
        }
        rows.insert(id, row);
    }

    let reduces = g
        .rules
        .values()
        .map(|rule| (rule.id(), (rule.left(), rule.right().len())))
        .collect();

    tracing::debug!(
        states = rows.len(),
        resolutions = resolutions.len(),
        "resolved parse table"
    );

    Ok(ParseTable {
        rows,
        reduces,
        resolutions,
    })
}

fn resolve_conflict(
    g: &Grammar,
    state: StateID,
    terminal: TerminalID,
    actions: Vec<Action>,
) -> Result<Resolution, BuildError> {
    let unresolved = |actions: Vec<Action>| BuildError::UnresolvedConflict {
        state,
        terminal,
        actions,
    };

    if !g.has_precedence() || actions.contains(&Action::Accept) {
        return Err(unresolved(actions));
    }

    let mut shift = None;
    let mut reduce: Option<RuleID> = None;
    let mut reduces = 0;
    for action in &actions {
        match *action {
            Action::Shift(next) => shift = Some(next),
            Action::Reduce(rule) => {
                reduces += 1;
                reduce = Some(reduce.map_or(rule, |current| current.min(rule)));
            }
            Action::Accept => (),
        }
    }

    let (chosen, reason) = match (shift, reduce) {
        (Some(next), Some(rule)) => {
            let shift_prec = g.terminals[&terminal].precedence();
            let reduce_prec = g.rule(rule).precedence(g);
            match (shift_prec, reduce_prec) {
                (Some(p1), Some(p2)) => match Ord::cmp(&p1.priority, &p2.priority) {
                    Ordering::Greater => (Action::Shift(next), ResolutionReason::HigherPrecedence),
                    Ordering::Less => (Action::Reduce(rule), ResolutionReason::HigherPrecedence),
                    Ordering::Equal => match p1.assoc {
                        Assoc::Left => (Action::Reduce(rule), ResolutionReason::Associativity(p1.assoc)),
                        _ => (Action::Shift(next), ResolutionReason::Associativity(p1.assoc)),
                    },
                },
                _ => (Action::Shift(next), ResolutionReason::MissingPrecedence),
            }
        }
        (None, Some(rule)) if reduces > 1 => (Action::Reduce(rule), ResolutionReason::EarliestRule),
        _ => return Err(unresolved(actions)),
    };

    Ok(Resolution {
        state,
        terminal,
        candidates: actions,
        chosen,
        reason,
    })
}
