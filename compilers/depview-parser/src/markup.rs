//! Markup tags riding along in a word list (`<b>`, `</b>`, `<br/>`).
//!
//! The parser never sees them. They are pulled out before parsing and put
//! back between the tokens of the dependency view at fractional positions.

use depview_graph::MarkupIndex;
use nom::{
    bytes::complete::take_while,
    character::complete::{char, satisfy},
    combinator::{all_consuming, opt, recognize},
    sequence::tuple,
    IResult,
};

/// `<name ...>`, `</name>` or `<name/>`; attribute values may not contain `>`.
pub(crate) fn markup_tag(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('<'),
        opt(char('/')),
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(|c: char| c != '<' && c != '>'),
        char('>'),
    )))(input)
}

pub fn is_markup(token: &str) -> bool {
    all_consuming(markup_tag)(token).is_ok()
}

/// Splits `words` into plain tokens and the markup between them.
///
/// Each tag is keyed by the 1-based position of the token before it, `0`
/// for tags in front of the first token.
pub fn strip_markup<S: AsRef<str>>(words: &[S]) -> (Vec<String>, MarkupIndex) {
    let mut tokens = Vec::with_capacity(words.len());
    let mut markup = MarkupIndex::new();

    for word in words {
        let word = word.as_ref();
        if is_markup(word) {
            let anchor = tokens.len() as u32;
            markup.entry(anchor).or_default().push(word.to_string());
        } else {
            tokens.push(word.to_string());
        }
    }

    (tokens, markup)
}
