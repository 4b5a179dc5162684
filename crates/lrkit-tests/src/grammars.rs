//! Grammar definition for integration tests.

use lrkit::grammar::{Assoc, GrammarDef, GrammarDefError, SymbolID::*};

pub type GrammarFn = fn(&mut GrammarDef) -> Result<(), GrammarDefError>;

/// The conflict-free grammars used by the property tests and benchmarks.
pub const ALL: &[(&str, GrammarFn)] = &[
    ("s_cc", s_cc),
    ("arithmetic", arithmetic),
    ("g_simple2", g_simple2),
    ("g4", g4),
    ("nullable_list", nullable_list),
    ("expr_ll", expr_ll),
];

/// S := C C ; C := c C | d
pub fn s_cc(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let c = g.terminal("c")?;
    let d = g.terminal("d")?;

    let s_ = g.nonterminal("S")?;
    let c_ = g.nonterminal("C")?;

    g.rule(s_, [N(c_), N(c_)], None)?;
    g.rule(c_, [T(c), N(c_)], None)?;
    g.rule(c_, [T(d)], None)?;

    Ok(())
}

/// An ambiguous expression grammar disambiguated by precedence.
pub fn arithmetic(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let num = g.terminal("NUMBER")?;

    let expr = g.nonterminal("EXPR")?;

    g.precedence(Assoc::Left, [plus, minus])?;
    g.precedence(Assoc::Left, [star, slash])?;

    g.rule(expr, [N(expr), T(plus), N(expr)], None)?;
    g.rule(expr, [N(expr), T(minus), N(expr)], None)?;
    g.rule(expr, [N(expr), T(star), N(expr)], None)?;
    g.rule(expr, [N(expr), T(slash), N(expr)], None)?;
    g.rule(expr, [T(lparen), N(expr), T(rparen)], None)?;
    g.rule(expr, [num], None)?;

    Ok(())
}

/// The layered expression grammar, without precedence.
pub fn g_simple2(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    // declare terminal symbols.
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let plus = g.terminal("PLUS")?;
    let minus = g.terminal("MINUS")?;
    let star = g.terminal("STAR")?;
    let slash = g.terminal("SLASH")?;
    let num = g.terminal("NUM")?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("EXPR")?;
    let factor = g.nonterminal("FACTOR")?;
    let term = g.nonterminal("TERM")?;

    g.start_symbol(expr)?;

    // declare syntax rules.
    g.rule(expr, [N(expr), T(plus), N(factor)], None)?;
    g.rule(expr, [N(expr), T(minus), N(factor)], None)?;
    g.rule(expr, [N(factor)], None)?;

    g.rule(factor, [N(factor), T(star), N(term)], None)?;
    g.rule(factor, [N(factor), T(slash), N(term)], None)?;
    g.rule(factor, [N(term)], None)?;

    g.rule(term, [num], None)?;
    g.rule(term, [T(lparen), N(expr), T(rparen)], None)?;

    Ok(())
}

/// Pager's G2, which is LR(1) but not LALR(1).
///
/// `TYPE := ID .` and `NAME := ID .` share a core in two different contexts.
pub fn g2(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let comma = g.terminal("COMMA")?;
    let colon = g.terminal("COLON")?;
    let ident = g.terminal("ID")?;

    let def = g.nonterminal("DEF")?;
    let param_spec = g.nonterminal("PARAM_SPEC")?;
    let return_spec = g.nonterminal("RETURN_SPEC")?;
    let type_ = g.nonterminal("TYPE")?;
    let name = g.nonterminal("NAME")?;
    let name_list = g.nonterminal("NAME_LIST")?;

    g.rule(def, [N(param_spec), N(return_spec), T(comma)], None)?;
    g.rule(param_spec, [N(type_)], None)?;
    g.rule(param_spec, [N(name_list), T(colon), N(type_)], None)?;
    g.rule(return_spec, [N(type_)], None)?;
    g.rule(return_spec, [N(name), T(colon), N(type_)], None)?;
    g.rule(type_, [ident], None)?;
    g.rule(name, [ident], None)?;
    g.rule(name_list, [N(name)], None)?;
    g.rule(name_list, [N(name), T(comma), N(name_list)], None)?;

    Ok(())
}

/// E := E + T | T ; T := ( E ) | n
pub fn g4(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let plus = g.terminal("PLUS")?;
    let lparen = g.terminal("LPAREN")?;
    let rparen = g.terminal("RPAREN")?;
    let num = g.terminal("NUM")?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    g.rule(e, [N(e), T(plus), N(t)], None)?;
    g.rule(e, [N(t)], None)?;
    g.rule(t, [T(lparen), N(e), T(rparen)], None)?;
    g.rule(t, [num], None)?;

    Ok(())
}

/// L := L , x | x | ε
pub fn nullable_list(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let comma = g.terminal(",")?;
    let x = g.terminal("x")?;

    let l = g.nonterminal("L")?;

    g.rule(l, [N(l), T(comma), T(x)], None)?;
    g.rule(l, [x], None)?;
    g.rule(l, [g.epsilon()], None)?;

    Ok(())
}

/// The expression grammar with the left recursion removed.
pub fn expr_ll(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let plus = g.terminal("+")?;
    let star = g.terminal("*")?;
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let id = g.terminal("id")?;

    let e = g.nonterminal("E")?;
    let e_ = g.nonterminal("E'")?;
    let t = g.nonterminal("T")?;
    let t_ = g.nonterminal("T'")?;
    let f = g.nonterminal("F")?;

    g.rule(e, [N(t), N(e_)], None)?;
    g.rule(e_, [T(plus), N(t), N(e_)], None)?;
    g.rule(e_, [g.epsilon()], None)?;
    g.rule(t, [N(f), N(t_)], None)?;
    g.rule(t_, [T(star), N(f), N(t_)], None)?;
    g.rule(t_, [g.epsilon()], None)?;
    g.rule(f, [T(lparen), N(e), T(rparen)], None)?;
    g.rule(f, [id], None)?;

    Ok(())
}

/// S := A | B ; A := x ; B := x
///
/// A genuine reduce/reduce conflict.
pub fn reduce_reduce(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let x = g.terminal("x")?;

    let s = g.nonterminal("S")?;
    let a = g.nonterminal("A")?;
    let b = g.nonterminal("B")?;

    g.rule(s, [a], None)?;
    g.rule(s, [b], None)?;
    g.rule(a, [x], None)?;
    g.rule(b, [x], None)?;

    Ok(())
}

/// S := a A d | b B d | a B e | b A e ; A := c ; B := c
///
/// Merging the isocores introduces reduce/reduce conflicts.
pub fn lr1_not_lalr(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let a = g.terminal("a")?;
    let b = g.terminal("b")?;
    let c = g.terminal("c")?;
    let d = g.terminal("d")?;
    let e = g.terminal("e")?;

    let s_ = g.nonterminal("S")?;
    let a_ = g.nonterminal("A")?;
    let b_ = g.nonterminal("B")?;

    g.rule(s_, [T(a), N(a_), T(d)], None)?;
    g.rule(s_, [T(b), N(b_), T(d)], None)?;
    g.rule(s_, [T(a), N(b_), T(e)], None)?;
    g.rule(s_, [T(b), N(a_), T(e)], None)?;
    g.rule(a_, [c], None)?;
    g.rule(b_, [c], None)?;

    Ok(())
}

pub fn min_caml(g: &mut GrammarDef) -> Result<(), GrammarDefError> {
    let l_paren = g.terminal("LPAREN")?;
    let r_paren = g.terminal("RPAREN")?;
    let t_true = g.terminal("TRUE")?;
    let t_false = g.terminal("FALSE")?;
    let integer = g.terminal("INTEGER")?;
    let float = g.terminal("FLOAT")?;
    let ident = g.terminal("IDENT")?;
    let t_not = g.terminal("NOT")?;
    let plus = g.terminal("PLUS")?;
    let plus_dot = g.terminal("PLUS_DOT")?;
    let minus = g.terminal("MINUS")?;
    let minus_dot = g.terminal("MINUS_DOT")?;
    let star_dot = g.terminal("STAR_DOT")?;
    let slash_dot = g.terminal("SLASH_DOT")?;
    let equal = g.terminal("EQUAL")?;
    let less_greater = g.terminal("LESS_GREATER")?;
    let less = g.terminal("LESS")?;
    let greater = g.terminal("GREATER")?;
    let less_equal = g.terminal("LESS_EQUAL")?;
    let greater_equal = g.terminal("GREATER_EQUAL")?;
    let less_minus = g.terminal("LESS_MINUS")?;
    let comma = g.terminal("COMMA")?;
    let semicolon = g.terminal("SEMICOLON")?;
    let t_if = g.terminal("IF")?;
    let t_then = g.terminal("THEN")?;
    let t_else = g.terminal("ELSE")?;
    let t_let = g.terminal("LET")?;
    let t_rec = g.terminal("REC")?;
    let t_in = g.terminal("IN")?;
    let array_make = g.terminal("ARRAY_MAKE")?;
    let dot = g.terminal("DOT")?;

    let exp = g.nonterminal("EXPR")?;
    let simple_exp = g.nonterminal("SIMPLE_EXP")?;
    let app_exp = g.nonterminal("APP_EXP")?;
    let neg_exp = g.nonterminal("NEG_EXP")?;
    let mult_exp = g.nonterminal("MULT_EXP")?;
    let add_exp = g.nonterminal("ADD_EXP")?;
    let rel_exp = g.nonterminal("REL_EXP")?;
    let tuple_exp = g.nonterminal("TUPLE_EXP")?;
    let tuple_exp_rest = g.nonterminal("TUPLE_EXP_REST")?;
    let put_exp = g.nonterminal("PUT_EXP")?;
    let if_exp = g.nonterminal("IF_EXP")?;
    let let_exp = g.nonterminal("LET_EXP")?;
    let fundef = g.nonterminal("FUNDEF")?;
    let formal_args = g.nonterminal("FORMAL_ARGS")?;
    let actual_args = g.nonterminal("ACTUAL_ARGS")?;
    let pat = g.nonterminal("PAT")?;

    g.start_symbol(exp)?;

    g.rule(simple_exp, [T(l_paren), N(exp), T(r_paren)], None)?;
    g.rule(simple_exp, [l_paren, r_paren], None)?;
    g.rule(simple_exp, [t_true], None)?;
    g.rule(simple_exp, [t_false], None)?;
    g.rule(simple_exp, [integer], None)?;
    g.rule(simple_exp, [float], None)?;
    g.rule(simple_exp, [ident], None)?;
    g.rule(
        simple_exp,
        [N(simple_exp), T(dot), T(l_paren), N(exp), T(r_paren)],
        None,
    )?;

    g.rule(app_exp, [simple_exp], None)?;
    g.rule(app_exp, [N(simple_exp), N(actual_args)], None)?;
    g.rule(app_exp, [T(array_make), N(simple_exp), N(simple_exp)], None)?;
    g.rule(app_exp, [T(t_not), N(app_exp)], None)?;

    g.rule(neg_exp, [app_exp], None)?;
    g.rule(neg_exp, [T(minus), N(neg_exp)], None)?;
    g.rule(neg_exp, [T(minus_dot), N(neg_exp)], None)?;

    g.rule(mult_exp, [neg_exp], None)?;
    for op in [star_dot, slash_dot] {
        g.rule(mult_exp, [N(mult_exp), T(op), N(neg_exp)], None)?;
    }

    g.rule(add_exp, [mult_exp], None)?;
    for op in [plus, minus, plus_dot, minus_dot] {
        g.rule(add_exp, [N(add_exp), T(op), N(mult_exp)], None)?;
    }

    g.rule(rel_exp, [add_exp], None)?;
    for op in [equal, less_greater, less, greater, less_equal, greater_equal] {
        g.rule(rel_exp, [N(rel_exp), T(op), N(add_exp)], None)?;
    }

    g.rule(tuple_exp, [rel_exp], None)?;
    g.rule(tuple_exp, [N(rel_exp), T(comma), N(tuple_exp_rest)], None)?;
    g.rule(tuple_exp_rest, [rel_exp], None)?;
    g.rule(tuple_exp_rest, [N(rel_exp), T(comma), N(tuple_exp_rest)], None)?;

    g.rule(put_exp, [tuple_exp], None)?;
    g.rule(
        put_exp,
        [
            N(simple_exp),
            T(dot),
            T(l_paren),
            N(exp),
            T(r_paren),
            T(less_minus),
            N(exp),
        ],
        None,
    )?;

    g.rule(if_exp, [put_exp], None)?;
    g.rule(
        if_exp,
        [T(t_if), N(exp), T(t_then), N(exp), T(t_else), N(exp)],
        None,
    )?;

    g.rule(
        let_exp,
        [T(t_let), T(ident), T(equal), N(exp), T(t_in), N(exp)],
        None,
    )?;
    g.rule(let_exp, [T(t_let), T(t_rec), N(fundef), T(t_in), N(exp)], None)?;
    g.rule(
        let_exp,
        [
            T(t_let),
            T(l_paren),
            N(pat),
            T(r_paren),
            T(equal),
            N(exp),
            T(t_in),
            N(exp),
        ],
        None,
    )?;

    g.rule(fundef, [T(ident), N(formal_args), T(equal), N(exp)], None)?;

    g.rule(formal_args, [T(ident), N(formal_args)], None)?;
    g.rule(formal_args, [ident], None)?;

    g.rule(actual_args, [N(actual_args), N(simple_exp)], None)?;
    g.rule(actual_args, [simple_exp], None)?;

    g.rule(pat, [N(pat), T(comma), T(ident)], None)?;
    g.rule(pat, [ident, comma, ident], None)?;

    g.rule(exp, [if_exp], None)?;
    g.rule(exp, [N(if_exp), T(semicolon), N(exp)], None)?;
    g.rule(exp, [let_exp], None)?;

    Ok(())
}
