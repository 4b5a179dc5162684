use logos::Logos;

#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
pub enum Lexeme {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse().ok())]
    Num(f64),
}

impl Lexeme {
    /// The name of the terminal symbol declared for this lexeme.
    pub fn terminal_name(&self) -> &'static str {
        match self {
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Num(..) => "NUM",
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Num(n) => *n,
            _ => 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized input {slice:?} at {offset}")]
pub struct LexError {
    pub slice: String,
    pub offset: usize,
}

pub fn lex(input: &str) -> impl Iterator<Item = Result<Lexeme, LexError>> + '_ {
    let mut lexer = Lexeme::lexer(input);
    std::iter::from_fn(move || {
        let lexeme = lexer.next()?;
        Some(lexeme.map_err(|()| LexError {
            slice: lexer.slice().to_owned(),
            offset: lexer.span().start,
        }))
    })
}
