//! Runtime support for parsers driven by `lrkit` parse tables.

pub mod definition;
pub mod parser;

pub use crate::{
    definition::{ParseAction, ParseActionError, ParseTable},
    parser::{ParseError, Parser, Reducer, Token},
};
