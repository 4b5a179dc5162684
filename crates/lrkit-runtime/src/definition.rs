//! Parse table abstraction.

/// The trait for abstracting a synthesized LR parse table.
pub trait ParseTable {
    /// The number to identify the state of LR automaton.
    type State: Copy;

    /// The number to identify the terminal symbols.
    type Terminal: Copy;

    /// The number to identify the nonterminal symbols.
    type Nonterminal: Copy;

    /// The context value corresponding to the matched production rule.
    type Reduce: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the action corresponding to the specified state number and
    /// lookahead symbol.
    ///
    /// If there is no lookahead symbol, a `None` is passsed as the end of input.
    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> ParseAction<Self::State, Self::Nonterminal, Self::Reduce>;

    /// Return the state to transition after reducing to `symbol`.
    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State>;

    /// Return the terminal symbols that have an action in the specified state.
    ///
    /// The end of input is represented as `None`.
    fn expected_terminals(&self, current: Self::State) -> Vec<Option<Self::Terminal>>;
}

macro_rules! impl_parse_table_for_pointer {
    ($($ptr:ty),*) => {$(
        impl<T: ?Sized> ParseTable for $ptr
        where
            T: ParseTable,
        {
            type State = T::State;
            type Terminal = T::Terminal;
            type Nonterminal = T::Nonterminal;
            type Reduce = T::Reduce;

            fn initial_state(&self) -> Self::State {
                (**self).initial_state()
            }

            fn action(
                &self,
                current: Self::State,
                lookahead: Option<Self::Terminal>,
            ) -> ParseAction<Self::State, Self::Nonterminal, Self::Reduce> {
                (**self).action(current, lookahead)
            }

            fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
                (**self).goto(current, symbol)
            }

            fn expected_terminals(&self, current: Self::State) -> Vec<Option<Self::Terminal>> {
                (**self).expected_terminals(current)
            }
        }
    )*};
}

impl_parse_table_for_pointer!(&T, std::rc::Rc<T>, std::sync::Arc<T>);

/// The action that the parser performs on a particular lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseAction<TState, TSymbol, TReduce> {
    /// Consume the lookahead symbol and move to the specified state.
    Shift(TState),

    /// Reduce the top `n` stack entries to the nonterminal `TSymbol`.
    Reduce(TReduce, TSymbol, usize),

    Accept,

    /// There is no action for the lookahead symbol.
    Reject,

    Error(ParseActionError),
}

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum ParseActionError {
    #[error("incorrect state")]
    IncorrectState,

    #[error("incorrect symbol")]
    IncorrectSymbol,
}
