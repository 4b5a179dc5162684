use lrkit::{
    automaton,
    first_follow::FirstSets,
    grammar::{Grammar, RuleID},
    lalr,
    parser::{self, ParseError, SemanticActions, Token},
    table::{self, BuildError},
    types::Set,
    Algorithm, Config,
};
use lrkit_runtime::parser::Parser;
use lrkit_tests::grammars;
use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
};

const ALGORITHMS: [Algorithm; 4] = [
    Algorithm::LR0,
    Algorithm::SLR1,
    Algorithm::LALR1,
    Algorithm::LR1,
];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn config(algorithm: Algorithm) -> Config {
    let mut config = Config::new();
    config.set_algorithm(algorithm);
    config
}

fn define(f: grammars::GrammarFn) -> Grammar {
    Grammar::define(f).unwrap()
}

/// Tokenize whitespace-separated terminal names; the value is the name itself.
fn tokens(g: &Grammar, input: &str) -> Vec<Result<Token<String>, Infallible>> {
    input
        .split_whitespace()
        .map(|name| {
            let kind = g.terminal_id(name).unwrap();
            Ok(Token::new(kind, name.to_owned()))
        })
        .collect()
}

#[test]
fn smoketest_all_grammars() {
    init_tracing();
    for &(name, f) in grammars::ALL {
        let grammar = define(f);
        eprintln!("grammar {}:\n{}", name, grammar);
        for algorithm in ALGORITHMS {
            let table = config(algorithm)
                .generate(&grammar)
                .unwrap_or_else(|err| panic!("{} ({:?}): {}", name, algorithm, err));
            eprintln!("table ({:?}):\n---\n{}", algorithm, table.display(&grammar));
        }
    }
}

#[test]
fn scenario_s_cc() {
    init_tracing();
    let g = define(grammars::s_cc);
    for algorithm in ALGORITHMS {
        let table = config(algorithm).generate(&g).unwrap();
        let actions = SemanticActions::new();

        assert!(parser::parse(&table, &actions, tokens(&g, "c d d")).is_ok());

        let err = parser::parse(&table, &actions, tokens(&g, "c d")).unwrap_err();
        assert!(
            matches!(err, ParseError::UnexpectedEndOfInput { .. }),
            "{:?}: {:?}",
            algorithm,
            err
        );

        let err = parser::parse(&table, &actions, tokens(&g, "d d d")).unwrap_err();
        match err {
            ParseError::UnexpectedToken { token, .. } => assert_eq!(token.value, "d"),
            err => panic!("{:?}: unexpected error {:?}", algorithm, err),
        }

        // the table is still usable after failures
        assert!(parser::parse(&table, &actions, tokens(&g, "d c c d")).is_ok());
    }
}

#[test]
fn scenario_arithmetic() {
    init_tracing();
    let g = define(grammars::arithmetic);
    let expr = g.nonterminal_id("EXPR").unwrap();
    let rules = g.productions(expr);

    let reduced = RefCell::new(vec![]);
    let mut actions = SemanticActions::new();
    let binop = |op: &'static str, f: fn(i64, i64) -> i64| {
        let reduced = &reduced;
        move |args: Vec<i64>| {
            reduced.borrow_mut().push(op);
            f(args[0], args[2])
        }
    };
    actions
        .on(rules[0], binop("+", |a, b| a + b))
        .on(rules[1], binop("-", |a, b| a - b))
        .on(rules[2], binop("*", |a, b| a * b))
        .on(rules[3], binop("/", |a, b| a / b))
        .on(rules[4], |args| args[1]);

    let lex = |input: &str| -> Vec<Result<Token<i64>, Infallible>> {
        input
            .chars()
            .map(|c| {
                let token = match c {
                    '+' => Token::new(g.terminal_id("PLUS").unwrap(), 0),
                    '-' => Token::new(g.terminal_id("MINUS").unwrap(), 0),
                    '*' => Token::new(g.terminal_id("STAR").unwrap(), 0),
                    '/' => Token::new(g.terminal_id("SLASH").unwrap(), 0),
                    '(' => Token::new(g.terminal_id("LPAREN").unwrap(), 0),
                    ')' => Token::new(g.terminal_id("RPAREN").unwrap(), 0),
                    c => Token::new(
                        g.terminal_id("NUMBER").unwrap(),
                        i64::from(c.to_digit(10).unwrap()),
                    ),
                };
                Ok(token)
            })
            .collect()
    };

    for algorithm in ALGORITHMS {
        let table = config(algorithm).generate(&g).unwrap();

        reduced.borrow_mut().clear();
        assert_eq!(parser::parse(&table, &actions, lex("1+2*3")).unwrap(), 7);
        assert_eq!(*reduced.borrow(), ["*", "+"]);

        assert_eq!(parser::parse(&table, &actions, lex("2*3+1")).unwrap(), 7);
        assert_eq!(parser::parse(&table, &actions, lex("8-4-2")).unwrap(), 2);
        assert_eq!(parser::parse(&table, &actions, lex("8/2/2")).unwrap(), 2);
        assert_eq!(parser::parse(&table, &actions, lex("(1+2)*3")).unwrap(), 9);
    }
}

#[test]
fn scenario_reduce_reduce_conflict() {
    init_tracing();
    let g = define(grammars::reduce_reduce);
    for algorithm in ALGORITHMS {
        let err = config(algorithm).generate(&g).unwrap_err();
        assert!(
            matches!(err, BuildError::UnresolvedConflict { .. }),
            "{:?}: {:?}",
            algorithm,
            err
        );
    }
}

#[test]
fn merging_isocores_can_introduce_conflicts() {
    init_tracing();
    for f in [grammars::lr1_not_lalr as grammars::GrammarFn, grammars::g2] {
        let g = define(f);

        let table = Config::new().use_lr1().generate(&g).unwrap();
        assert!(table.resolutions().is_empty());

        let err = Config::new().use_lalr1().generate(&g).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedConflict { .. }));

        let first = FirstSets::new(&g);
        let merged = lalr::merge(&automaton::lr1(&g, &first));
        let raw = table::synthesize(&g, &merged, None);
        assert!(raw.conflicts().all(|(_, _, actions)| actions.len() == 2));
    }

    let g = define(grammars::lr1_not_lalr);
    let table = Config::new().use_lr1().generate(&g).unwrap();
    let actions = SemanticActions::new();
    for input in ["a c d", "b c d", "a c e", "b c e"] {
        assert!(parser::parse(&table, &actions, tokens(&g, input)).is_ok());
    }
}

#[test]
fn lalr_state_count_matches_distinct_cores() {
    for &(name, f) in grammars::ALL {
        let g = define(f);
        let first = FirstSets::new(&g);
        let canonical = automaton::lr1(&g, &first);
        let merged = lalr::merge(&canonical);

        let cores: Set<_> = canonical
            .states()
            .map(|(_, items)| items.core_set())
            .collect();
        assert_eq!(merged.len(), cores.len(), "{}", name);
        assert_eq!(merged.len(), automaton::lr0(&g).len(), "{}", name);
    }
}

#[test]
fn construction_is_reproducible() {
    for &(name, f) in grammars::ALL {
        let g = define(f);
        let first1 = FirstSets::new(&g);
        let first2 = FirstSets::new(&g);
        assert_eq!(first1, first2, "{}", name);

        let a1 = automaton::lr1(&g, &first1);
        let a2 = automaton::lr1(&g, &first2);
        assert_eq!(a1, a2, "{}", name);

        let unique: Set<_> = a1.states().map(|(_, items)| items).collect();
        assert_eq!(unique.len(), a1.len(), "{}", name);

        for algorithm in ALGORITHMS {
            let config = config(algorithm);
            assert_eq!(
                config.generate(&g).unwrap(),
                config.generate(&g).unwrap(),
                "{} ({:?})",
                name,
                algorithm
            );
        }
    }
}

#[test]
fn accepts_exactly_once_with_single_value() {
    let g = define(grammars::s_cc);
    for algorithm in ALGORITHMS {
        let table = config(algorithm).generate(&g).unwrap();

        let mut parser = Parser::new(&table);
        let reductions = Cell::new(0);
        let mut reducer = |rule: RuleID, args: Vec<String>| {
            reductions.set(reductions.get() + 1);
            let left = g.rule(rule).left();
            format!("{}({})", g.nonterminals[&left], args.join(" "))
        };

        let parsed = parser.parse(tokens(&g, "c d d"), &mut reducer).unwrap();
        assert_eq!(parsed, "S(C(c C(d)) C(d))");
        assert_eq!(reductions.get(), 4);

        // nothing is consumed past the accepting state
        let err = parser.parse(tokens(&g, "d d d"), &mut reducer).unwrap_err();
        assert!(matches!(err, lrkit_runtime::ParseError::UnexpectedToken { .. }));
    }
}

#[test]
fn nullable_productions() {
    let g = define(grammars::nullable_list);
    for algorithm in ALGORITHMS {
        let table = config(algorithm).generate(&g).unwrap();
        let actions = SemanticActions::new();
        for input in ["", "x", ", x", "x , x , x"] {
            assert!(
                parser::parse(&table, &actions, tokens(&g, input)).is_ok(),
                "{:?}: {:?}",
                algorithm,
                input
            );
        }
        let err = parser::parse(&table, &actions, tokens(&g, "x ,")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));
    }
}
