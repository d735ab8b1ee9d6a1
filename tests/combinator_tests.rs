// tests/combinator_tests.rs

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use braid::lexical::{end_of_input, literal, pattern, token};
use braid::outcome::{fail, succeed};
use braid::parser::lazy;
use braid::repetition::{
    at_least, between, exactly, one_or_more, separated_by_one_or_more, surrounded_with,
    zero_or_more, zero_or_one,
};
use braid::{
    BoxedParser, Cursor, Input, NoSuchElement, Outcome, OutcomeExt, ParseError, Parser, PatternInput,
    ReadSource, TokenError, TokenStream, Tokenizer,
};
use common::{tokenizer_over, ChunkedSource};

fn digit<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, String> {
    pattern("[0-9]")
}

fn statement<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Vec<String>> {
    separated_by_one_or_more(token("[a-z]+").or(token("[0-9]+")), token(";")).skip(token("\\."))
}

// ---
// Outcome
// ---

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_chain_threads_values_in_order() {
        let steps = RefCell::new(Vec::new());
        let result = succeed(1)
            .and_then(|v| {
                steps.borrow_mut().push(v);
                succeed(v + 1)
            })
            .and_then(|v| {
                steps.borrow_mut().push(v);
                succeed(v * 10)
            });
        assert_eq!(result.ok(), Some(20));
        assert_eq!(*steps.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_failure_surfaces_as_report() {
        let failed: Outcome<()> = fail(ParseError::expected("[0-9]+", 7));
        let report = failed.into_report().unwrap_err();
        assert_eq!(report.to_string(), "[0-9]+ expected at position 7");
    }
}

// ---
// Core combinators
// ---

#[cfg(test)]
mod core_tests {
    use super::*;

    #[test]
    fn test_sequence_threads_remaining_input_stepwise() {
        let positions = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&positions);
        let p = token::<Cursor>("[a-z]+").and_then(move |first| {
            let log = Rc::clone(&log);
            token("[a-z]+").map(move |second| {
                log.borrow_mut().push(second.len());
                format!("{first}-{second}")
            })
        });
        let (out, rest) = p.parse(Cursor::new("ab cde fg")).unwrap();
        assert_eq!(out, "ab-cde");
        assert_eq!(rest.position(), 6);
        assert_eq!(*positions.borrow(), vec![3]);
    }

    #[test]
    fn test_or_else_never_builds_alternative_after_success() {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let p = literal::<Cursor>("a").or_else(move || {
            counter.set(counter.get() + 1);
            literal("b")
        });
        for _ in 0..3 {
            p.parse(Cursor::new("a")).unwrap();
        }
        assert_eq!(built.get(), 0);
    }

    #[test]
    fn test_or_else_equals_alternative_alone_after_failure() {
        let alternative = || token::<Cursor>("[0-9]+");
        let combined = token::<Cursor>("[a-z]+").or_else(alternative);
        for text in ["  42", "", "7a", "!"] {
            let alone = alternative().parse(Cursor::new(text)).ok().map(|(o, r)| (o, r.position()));
            let both = combined.parse(Cursor::new(text)).ok().map(|(o, r)| (o, r.position()));
            assert_eq!(both, alone, "input {text:?}");
        }
    }

    #[test]
    fn test_failed_parse_reports_deepest_specific_cause() {
        let number = token::<Cursor>("[0-9]+").or_else_fail("number expected");
        let pair = surrounded_with(number, literal("("), literal(")")).or_else_fail("pair expected");
        let err = pair.parse(Cursor::new("(x)")).unwrap_err();
        assert_eq!(err.to_string(), "pair expected");
        assert!(matches!(
            err.deepest(),
            ParseError::Expected { pattern, position: 1 } if pattern == "[0-9]+"
        ));
    }

    #[test]
    fn test_recursive_grammar_with_lazy() {
        fn nested<'p>() -> BoxedParser<'p, Cursor<'p>, usize> {
            surrounded_with(lazy(nested), literal("("), literal(")"))
                .map(|depth| depth + 1)
                .or(braid::parser::succeed(0))
        }
        let (depth, rest) = nested().parse(Cursor::new("((()))")).unwrap();
        assert_eq!(depth, 3);
        assert!(rest.is_at_end());
    }
}

// ---
// Repetition algebra
// ---

#[cfg(test)]
mod repetition_tests {
    use super::*;

    #[test]
    fn test_zero_or_more_leaves_input_unchanged_on_immediate_failure() {
        let (items, rest) = zero_or_more(digit::<Cursor>()).parse(Cursor::new("abc")).unwrap();
        assert!(items.is_empty());
        assert_eq!(rest.position(), 0);
    }

    #[test]
    fn test_exactly_and_at_least_agree_when_count_is_exact() {
        for n in 0..5 {
            let text = "7".repeat(n);
            let a = exactly(digit::<Cursor>(), n).parse(Cursor::new(&text)).unwrap();
            let b = at_least(digit::<Cursor>(), n).parse(Cursor::new(&text)).unwrap();
            assert_eq!(a.0, b.0);
            assert_eq!(a.1.position(), b.1.position());
        }
    }

    #[test]
    fn test_between_is_greedy_within_bounds() {
        for k in 2..=5 {
            let text = format!("{}x", "1".repeat(k));
            let (items, _) = between(digit::<Cursor>(), 2, 5)
                .unwrap()
                .parse(Cursor::new(&text))
                .unwrap();
            assert_eq!(items.len(), k);
        }
    }

    #[test]
    fn test_between_rejects_inverted_bounds_at_construction() {
        let err = between(digit::<Cursor>(), 4, 2).err().unwrap();
        assert!(matches!(err, ParseError::InvalidArgument(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_optional_then_required() {
        let sign = zero_or_one(literal::<Cursor>("-"));
        let number = sign.seq(one_or_more(digit())).skip(end_of_input());
        let ((sign, digits), _) = number.parse(Cursor::new("-12")).unwrap();
        assert_eq!(sign.as_deref(), Some("-"));
        assert_eq!(digits.concat(), "12");
        assert!(number.parse(Cursor::new("-")).is_err());
    }

    #[test]
    fn test_separated_list_over_a_stream() {
        let tokenizer = RefCell::new(Tokenizer::new(ChunkedSource::new("1, 22 ,333,4444", 2)));
        let list = separated_by_one_or_more(token("[0-9]+"), token(","));
        let (items, rest) = list.parse(TokenStream::new(&tokenizer)).unwrap();
        assert_eq!(items, ["1", "22", "333", "4444"]);
        assert_eq!(rest.position(), 15);
    }
}

// ---
// Streams and backtracking
// ---

#[cfg(test)]
mod stream_tests {
    use super::*;

    #[test]
    fn test_failed_branch_leaves_no_trace_on_the_tokenizer() {
        let tokenizer = RefCell::new(Tokenizer::new(ReadSource::from_text("let x = 1")));
        let stream = TokenStream::new(&tokenizer);
        let assignment = token("let")
            .skip_left(token("[a-z]+"))
            .skip(token(":="));
        let declaration = token("let").skip_left(token("[a-z]+")).skip(token("="));
        let (name, rest) = assignment.or(declaration).parse(stream).unwrap();
        assert_eq!(name, "x");
        assert_eq!(rest.position(), 7);
    }

    #[test]
    fn test_oversized_attempt_is_fatal_not_backtracked() {
        let tokenizer = RefCell::new(tokenizer_over("123456789012 abc", 8));
        let p = pattern("[0-9]+").or(pattern("[0-9]"));
        let err = p.parse(TokenStream::new(&tokenizer)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Token(TokenError::NoSuchElement(NoSuchElement::TokenExceedsBuffer { .. }))
        ));
    }

    #[test]
    fn test_failed_sequence_does_not_advance_the_tokenizer() {
        let tokenizer = RefCell::new(tokenizer_over("ac", 8));
        let stream = TokenStream::new(&tokenizer);
        let ab = pattern("a").seq(pattern("b"));
        assert!(ab.parse(stream.clone()).is_err());
        assert_eq!(tokenizer.borrow().position(), 0);

        let three = exactly(token("[a-z]"), 3);
        assert!(three.parse(stream.clone()).is_err());
        assert_eq!(stream.position(), 0);
        assert_eq!(pattern("ac").parse(stream).unwrap().0, "ac");
    }

    #[test]
    fn test_failed_filter_does_not_advance_the_tokenizer() {
        let tokenizer = RefCell::new(Tokenizer::new(ReadSource::from_text("12345")));
        let stream = TokenStream::new(&tokenizer);
        let short = pattern("[0-9]+").filter(|digits| digits.len() < 3);
        assert!(matches!(
            short.parse(stream.clone()),
            Err(ParseError::NoMatchingElement)
        ));
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_committed_branch_is_not_retried() {
        let tokenizer = RefCell::new(Tokenizer::new(ReadSource::from_text("(7 ]")));
        let stream = TokenStream::new(&tokenizer);
        let group = literal("(")
            .skip_left(token("[0-9]+").skip(token(r"\)")).commit())
            .or(literal("(7"));
        let err = group.parse(stream.clone()).unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err.deepest(), ParseError::Token(TokenError::InputMismatch { .. })));
        assert!(stream.position() > 0);
    }

    #[test]
    fn test_same_grammar_over_cursor_and_stream() {
        let text = "abc; 12 ;de;3 .";
        let (from_cursor, _) = statement().parse(Cursor::new(text)).unwrap();
        let tokenizer = RefCell::new(Tokenizer::new(ChunkedSource::new(text, 3)));
        let (from_stream, _) = statement().parse(TokenStream::new(&tokenizer)).unwrap();
        assert_eq!(from_cursor, from_stream);
    }
}
