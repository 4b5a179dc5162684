//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::new(0);

    /// Reserved symbol that stands for the empty string.
    ///
    /// It never reaches a parse table: `GrammarDef::rule` strips it from
    /// right-hand sides, and it only shows up as a member of FIRST sets.
    pub const EPSILON: Self = Self::new(1);

    const OFFSET: u16 = 2;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self::new(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
    precedence: Option<Precedence>,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    /// The augmented start symbol.
    pub const START: Self = Self::new(0);
    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}
impl SymbolID {
    pub const EOI: Self = Self::T(TerminalID::EOI);
    pub const EPSILON: Self = Self::T(TerminalID::EPSILON);
}
impl From<TerminalID> for SymbolID {
    fn from(t: TerminalID) -> Self {
        Self::T(t)
    }
}
impl From<NonterminalID> for SymbolID {
    fn from(n: NonterminalID) -> Self {
        Self::N(n)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleID {
    raw: u16,
}

impl RuleID {
    /// The production `$start := S` added by augmentation.
    pub const ACCEPT: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }
}

impl fmt::Display for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R#{}", self.raw)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Rule {
    id: RuleID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    precedence: Option<Precedence>,
}
impl Rule {
    pub fn id(&self) -> RuleID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// Return the precedence used when this rule competes with a shift.
    ///
    /// An explicitly assigned precedence wins; otherwise the precedence of
    /// the rightmost terminal symbol is used.
    pub fn precedence(&self, g: &Grammar) -> Option<Precedence> {
        match self.precedence {
            Some(prec) => Some(prec),
            None => {
                for symbol in self.right.iter().rev() {
                    if let SymbolID::T(t) = symbol {
                        return g.terminals[t].precedence();
                    }
                }
                None
            }
        }
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.nonterminals[&self.left()])?;
            if self.right.is_empty() {
                f.write_str(" ε")?;
            }
            for symbol in self.right() {
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Precedence {
    pub priority: u16,
    pub assoc: Assoc,
}

impl Precedence {
    pub const fn new(priority: u16, assoc: Assoc) -> Self {
        Self { priority, assoc }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Nonassoc => write!(f, "nonassoc"),
        }
    }
}

/// The augmented grammar used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub rules: Map<RuleID, Rule>,
    pub start_symbol: NonterminalID,
    productions: Map<NonterminalID, Vec<RuleID>>,
    has_precedence: bool,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            if terminal.id() == TerminalID::EPSILON {
                continue;
            }
            write!(f, "{}", terminal)?;
            if let Some(prec) = terminal.precedence() {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for rule in self.rules.values() {
            write!(f, "{}: {}", rule.id(), rule.display(self))?;
            if let Some(prec) = &rule.precedence {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            rules: Map::default(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_rule_id: RuleID::OFFSET,
            next_priority: 0,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$eoi".into(),
                precedence: None,
            },
        );
        def.terminals.insert(
            TerminalID::EPSILON,
            Terminal {
                id: TerminalID::EPSILON,
                name: "ε".into(),
                precedence: None,
            },
        );

        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
            },
        );

        f(&mut def)?;

        def.end()
    }

    /// Return the production rules of the specified nonterminal symbol,
    /// in declaration order.
    pub fn productions(&self, n: NonterminalID) -> &[RuleID] {
        self.productions.get(&n).map_or(&[], |rules| &rules[..])
    }

    pub fn rule(&self, id: RuleID) -> &Rule {
        &self.rules[&id]
    }

    /// Whether a precedence table has been declared for this grammar.
    pub fn has_precedence(&self) -> bool {
        self.has_precedence
    }

    /// Iterate over the terminal symbols that may appear in the input,
    /// including the end of input.
    pub fn input_terminals(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.terminals
            .keys()
            .copied()
            .filter(|&t| t != TerminalID::EPSILON)
    }

    pub fn terminal_id(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.id() != TerminalID::EPSILON && t.name() == name)
            .map(|t| t.id())
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name() == name)
            .map(|n| n.id())
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].name(),
            SymbolID::N(n) => self.nonterminals[&n].name(),
        }
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_rule_id: u16,
    next_priority: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarDefError> {
        verify_name(name)?;
        if self.terminals.values().any(|t| t.name() == name) {
            return Err(GrammarDefError::DuplicateTerminal { name: name.into() });
        }

        let id = TerminalID::new(self.next_terminal_id);
        self.next_terminal_id += 1;

        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
                precedence: None,
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        verify_name(name)?;
        if self.nonterminals.values().any(|n| n.name() == name) {
            return Err(GrammarDefError::DuplicateNonterminal { name: name.into() });
        }

        let id = NonterminalID::new(self.next_nonterminal_id);
        self.next_nonterminal_id += 1;

        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
            },
        );

        Ok(id)
    }

    /// Declare a group of terminal symbols sharing the same precedence.
    ///
    /// Groups declared later bind tighter than the ones declared before.
    pub fn precedence<I>(&mut self, assoc: Assoc, terminals: I) -> Result<Precedence, GrammarDefError>
    where
        I: IntoIterator<Item = TerminalID>,
    {
        let prec = Precedence::new(self.next_priority, assoc);
        self.next_priority += 1;

        for t in terminals {
            if t == TerminalID::EOI || t == TerminalID::EPSILON {
                return Err(GrammarDefError::ReservedSymbol);
            }
            let terminal = self
                .terminals
                .get_mut(&t)
                .ok_or(GrammarDefError::UnknownSymbol)?;
            if terminal.precedence.is_some() {
                return Err(GrammarDefError::DuplicatePrecedence {
                    name: terminal.name.clone(),
                });
            }
            terminal.precedence = Some(prec);
        }

        Ok(prec)
    }

    /// Specify a production rule into this grammer.
    ///
    /// `SymbolID::EPSILON` may be used to spell out an empty right-hand side;
    /// it is removed from the stored production.
    pub fn rule<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        precedence: Option<Precedence>,
    ) -> Result<RuleID, GrammarDefError>
    where
        I: IntoIterator,
        I::Item: Into<SymbolID>,
    {
        if left == NonterminalID::START {
            return Err(GrammarDefError::ReservedSymbol);
        }
        if !self.nonterminals.contains_key(&left) {
            return Err(GrammarDefError::UnknownSymbol);
        }

        let mut right_ = Vec::new();
        for symbol in right {
            match symbol.into() {
                SymbolID::EPSILON => continue,
                SymbolID::EOI => return Err(GrammarDefError::ReservedSymbol),
                SymbolID::N(NonterminalID::START) => return Err(GrammarDefError::ReservedSymbol),
                SymbolID::T(t) if !self.terminals.contains_key(&t) => {
                    return Err(GrammarDefError::UnknownSymbol)
                }
                SymbolID::N(n) if !self.nonterminals.contains_key(&n) => {
                    return Err(GrammarDefError::UnknownSymbol)
                }
                symbol => right_.push(symbol),
            }
        }

        for rule in self.rules.values() {
            if rule.left == left && rule.right == right_ {
                return Err(GrammarDefError::DuplicateRule {
                    left: self.nonterminals[&left].name.clone(),
                });
            }
        }

        let id = RuleID::new(self.next_rule_id);
        self.next_rule_id += 1;
        self.rules.insert(
            id,
            Rule {
                id,
                left,
                right: right_,
                precedence,
            },
        );

        Ok(id)
    }

    /// Return the symbol that spells out the empty string.
    pub fn epsilon(&self) -> SymbolID {
        SymbolID::EPSILON
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        if symbol == NonterminalID::START {
            return Err(GrammarDefError::ReservedSymbol);
        }
        if !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarDefError::UnknownSymbol);
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // The first declared nonterminal is used when no start symbol is specified.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarDefError::EmptyGrammar)?,
        };

        let mut productions: Map<NonterminalID, Vec<RuleID>> = Map::default();
        productions.insert(NonterminalID::START, vec![RuleID::ACCEPT]);
        for rule in self.rules.values() {
            productions.entry(rule.left).or_default().push(rule.id);
        }

        let missing = |n: &NonterminalID| GrammarDefError::MissingRule {
            name: self.nonterminals[n].name.clone(),
        };
        if !productions.contains_key(&start) {
            return Err(missing(&start));
        }
        for rule in self.rules.values() {
            for symbol in &rule.right {
                if let SymbolID::N(n) = symbol {
                    if !productions.contains_key(n) {
                        return Err(missing(n));
                    }
                }
            }
        }
        for (id, nonterminal) in &self.nonterminals {
            if !productions.contains_key(id) {
                tracing::warn!(
                    "The nonterminal `{}' has no associated production rule",
                    nonterminal.name
                );
            }
        }

        let mut rules = Map::default();
        rules.insert(
            RuleID::ACCEPT,
            Rule {
                id: RuleID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
                precedence: None,
            },
        );
        rules.extend(self.rules);

        let has_precedence = self.next_priority > 0;

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            rules,
            start_symbol: start,
            productions,
            has_precedence,
        })
    }
}

/// The reasons why a grammar definition is rejected.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarDefError {
    #[error("incorrect symbol name: `{name}'")]
    InvalidName { name: String },

    #[error("the terminal `{name}' has already been declared")]
    DuplicateTerminal { name: String },

    #[error("the nonterminal `{name}' has already been declared")]
    DuplicateNonterminal { name: String },

    #[error("the precedence of `{name}' has already been declared")]
    DuplicatePrecedence { name: String },

    #[error("duplicate production rule detected for `{left}'")]
    DuplicateRule { left: String },

    #[error("the nonterminal `{name}' is used without any production rule")]
    MissingRule { name: String },

    #[error("the symbol is not declared in this grammar")]
    UnknownSymbol,

    #[error("reserved symbols cannot be used here")]
    ReservedSymbol,

    #[error("empty nonterminal symbols")]
    EmptyGrammar,
}

fn verify_name(name: &str) -> Result<(), GrammarDefError> {
    // `$`-prefixed names are reserved for the augmented symbols.
    if name.is_empty() || name.starts_with('$') || name.chars().any(char::is_whitespace) {
        return Err(GrammarDefError::InvalidName { name: name.into() });
    }
    Ok(())
}
