use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, not, recognize},
    multi::many0,
    sequence::{pair, terminated},
    IResult,
};

use crate::markup::markup_tag;
use crate::token::{Span, Token, TokenKind};

/// Contractions split off the end of a word.
const CLITICS: [&str; 7] = ["n't", "'re", "'ve", "'ll", "'s", "'m", "'d"];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_chars(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

/// `1,000`, `3.14`; a trailing letter turns the run into a word ("3rd").
fn number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(digit1, many0(pair(one_of(".,"), digit1)))),
        not(satisfy(is_word_char)),
    )(input)
}

/// `well-known`, `don't`, `O'Brien`
fn word_run(input: &str) -> IResult<&str, &str> {
    recognize(pair(word_chars, many0(pair(one_of("'-"), word_chars))))(input)
}

/// A clitic already separated by the writer: `John 's`.
fn detached_clitic(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(
            char('\''),
            alt((
                tag_no_case("re"),
                tag_no_case("ve"),
                tag_no_case("ll"),
                tag_no_case("s"),
                tag_no_case("m"),
                tag_no_case("d"),
            )),
        )),
        not(satisfy(is_word_char)),
    )(input)
}

fn multi_char_punct(input: &str) -> IResult<&str, &str> {
    alt((tag("..."), tag("--"), tag("``"), tag("''")))(input)
}

fn bracket(input: &str) -> IResult<&str, &str> {
    recognize(one_of("()"))(input)
}

fn any_symbol(input: &str) -> IResult<&str, &str> {
    recognize(satisfy(|c| !c.is_whitespace()))(input)
}

fn next_token(input: &str) -> IResult<&str, (&str, TokenKind)> {
    alt((
        map(markup_tag, |s| (s, TokenKind::Markup)),
        map(number, |s| (s, TokenKind::Number)),
        map(word_run, |s| (s, TokenKind::Word)),
        map(detached_clitic, |s| (s, TokenKind::Clitic)),
        map(multi_char_punct, |s| (s, TokenKind::Punctuation)),
        map(bracket, |s| (s, TokenKind::Bracket)),
        map(any_symbol, |s| (s, TokenKind::Punctuation)),
    ))(input)
}

/// Splits `word` into stem and trailing contraction, if it has one.
/// `"can't"` gives `("ca", Some("n't"))`.
pub fn split_clitic(word: &str) -> (&str, Option<&str>) {
    for clitic in CLITICS {
        if word.len() <= clitic.len() {
            continue;
        }
        let cut = word.len() - clitic.len();
        if let Some(tail) = word.get(cut..) {
            if tail.eq_ignore_ascii_case(clitic) {
                return (&word[..cut], Some(tail));
            }
        }
    }
    (word, None)
}

/// Penn Treebank style tokenization of raw text, with byte spans into `text`.
pub fn tokenize_with_spans(text: &str) -> Vec<Token<'_>> {
    let mut input = text;
    let mut result = Vec::new();

    loop {
        let (rest, _) = match multispace0::<&str, nom::error::Error<&str>>(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = rest;

        if input.is_empty() {
            break;
        }

        match next_token(input) {
            Ok((rest, (lexeme, kind))) => {
                let start = text.len() - input.len();
                let end = start + lexeme.len();

                match (kind, split_clitic(lexeme)) {
                    (TokenKind::Word, (stem, Some(clitic))) => {
                        let cut = start + stem.len();
                        result.push(Token::new(Span::new(start, cut), stem, TokenKind::Word));
                        result.push(Token::new(Span::new(cut, end), clitic, TokenKind::Clitic));
                    }
                    _ => result.push(Token::new(Span::new(start, end), lexeme, kind)),
                }
                input = rest;
            }
            Err(_) => {
                // Skip one char and keep going
                match input.chars().next() {
                    Some(c) => input = &input[c.len_utf8()..],
                    None => break,
                }
            }
        }
    }

    result
}

/// Token strings as the parser wants them, brackets escaped.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_spans(text)
        .iter()
        .map(|token| token.escaped().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sentence() {
        assert_eq!(
            tokenize("Hello, my name is Melroy."),
            vec!["Hello", ",", "my", "name", "is", "Melroy", "."]
        );
    }

    #[test]
    fn test_contractions() {
        assert_eq!(tokenize("I can't go"), vec!["I", "ca", "n't", "go"]);
        assert_eq!(tokenize("John's dog"), vec!["John", "'s", "dog"]);
        assert_eq!(tokenize("We'll see"), vec!["We", "'ll", "see"]);
        assert_eq!(tokenize("John 's"), vec!["John", "'s"]);
    }

    #[test]
    fn test_numbers_and_compounds() {
        assert_eq!(
            tokenize("It cost 1,000.50 on the 3rd well-known day"),
            vec!["It", "cost", "1,000.50", "on", "the", "3rd", "well-known", "day"]
        );
    }

    #[test]
    fn test_brackets_are_escaped() {
        assert_eq!(tokenize("a (b)"), vec!["a", "-RRB-", "b", "-LRB-"]);
    }

    #[test]
    fn test_markup_kept_whole() {
        let tokens = tokenize_with_spans("<b>bold</b> text...");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Markup,
                TokenKind::Word,
                TokenKind::Markup,
                TokenKind::Word,
                TokenKind::Punctuation,
            ]
        );
        assert_eq!(tokens[4].text, "...");
    }

    #[test]
    fn test_spans() {
        let text = "  don't  stop";
        let tokens = tokenize_with_spans(text);
        assert_eq!(tokens.len(), 3);
        for token in &tokens {
            assert_eq!(&text[token.span.start..token.span.end], token.text);
        }
        assert_eq!(tokens[1].span, Span::new(4, 7));
    }

    #[test]
    fn test_split_clitic_needs_a_stem() {
        assert_eq!(split_clitic("'s"), ("'s", None));
        assert_eq!(split_clitic("DON'T"), ("DO", Some("N'T")));
        assert_eq!(split_clitic("cats"), ("cats", None));
    }

    proptest! {
        #[test]
        fn test_spans_slice_input(text in "\\PC{0,40}") {
            let tokens = tokenize_with_spans(&text);
            let mut last = 0;
            for token in tokens {
                prop_assert!(token.span.start >= last);
                prop_assert!(!token.span.is_empty());
                prop_assert_eq!(&text[token.span.start..token.span.end], token.text);
                last = token.span.end;
            }
        }
    }
}
