#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::string::{String, ToString};

use depview_protocol::Lemmatizer;

/// One inflectional ending: `suffix` is replaced by `replacement` as long
/// as at least `min_stem` characters remain in front of it.
#[derive(Debug, Clone, Copy)]
struct Rule {
    suffix: &'static str,
    replacement: &'static str,
    min_stem: usize,
    undouble: bool,
}

const fn rule(suffix: &'static str, replacement: &'static str, min_stem: usize) -> Rule {
    Rule {
        suffix,
        replacement,
        min_stem,
        undouble: false,
    }
}

const fn bare(suffix: &'static str, min_stem: usize) -> Rule {
    Rule {
        suffix,
        replacement: "",
        min_stem,
        undouble: true,
    }
}

// Plural nouns and third person singular verbs share endings.
const PLURAL: &[Rule] = &[
    rule("ies", "y", 2),
    rule("sses", "ss", 1),
    rule("shes", "sh", 1),
    rule("ches", "ch", 1),
    rule("xes", "x", 1),
    rule("zzes", "zz", 1),
    rule("ss", "ss", 0),
    rule("us", "us", 0),
    rule("is", "is", 0),
    rule("s", "", 2),
];

const PAST: &[Rule] = &[
    rule("ied", "y", 2),
    rule("eed", "eed", 1),
    rule("ated", "ate", 1),
    rule("ized", "ize", 1),
    rule("ised", "ise", 1),
    rule("ued", "ue", 1),
    rule("ved", "ve", 1),
    bare("ed", 2),
];

const GERUND: &[Rule] = &[
    rule("ating", "ate", 1),
    rule("izing", "ize", 1),
    rule("ising", "ise", 1),
    rule("ving", "ve", 1),
    bare("ing", 3),
];

const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("'m", "be"),
    ("'re", "be"),
    ("'s", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("'ve", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("'ll", "will"),
    ("went", "go"),
    ("gone", "go"),
    ("said", "say"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("got", "get"),
    ("gotten", "get"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("gave", "give"),
    ("given", "give"),
    ("found", "find"),
    ("told", "tell"),
    ("ran", "run"),
    ("wrote", "write"),
    ("written", "write"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("left", "leave"),
    ("felt", "feel"),
    ("kept", "keep"),
    ("began", "begin"),
    ("begun", "begin"),
    ("brought", "bring"),
    ("bought", "buy"),
];

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
];

/// Rule-based English lemmatizer keyed on Penn Treebank tags.
///
/// Proper nouns keep their case; every other form is lowercased before
/// lookup. Tags without inflection rules return the lowercased word.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixLemmatizer;

impl SuffixLemmatizer {
    pub const fn new() -> Self {
        Self
    }
}

impl Lemmatizer for SuffixLemmatizer {
    fn lemmatize(&self, word: &str, tag: &str) -> String {
        let form = if tag.starts_with("NNP") {
            word.to_string()
        } else {
            word.to_lowercase()
        };

        if form == "n't" {
            return "not".to_string();
        }

        if tag.starts_with("VB") || tag == "MD" {
            if let Some(lemma) = lookup(IRREGULAR_VERBS, &form) {
                return lemma.to_string();
            }
        }

        let rules = match tag {
            "NNS" => {
                if let Some(lemma) = lookup(IRREGULAR_NOUNS, &form) {
                    return lemma.to_string();
                }
                PLURAL
            }
            "NNPS" | "VBZ" => PLURAL,
            "VBD" | "VBN" => PAST,
            "VBG" => GERUND,
            _ => return form,
        };

        strip(&form, rules).unwrap_or(form)
    }
}

fn lookup(table: &[(&'static str, &'static str)], form: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(surface, _)| *surface == form)
        .map(|(_, lemma)| *lemma)
}

fn strip(form: &str, rules: &[Rule]) -> Option<String> {
    for rule in rules {
        let Some(stem) = form.strip_suffix(rule.suffix) else {
            continue;
        };
        if stem.chars().count() < rule.min_stem {
            continue;
        }

        let mut lemma = String::with_capacity(stem.len() + rule.replacement.len());
        lemma.push_str(stem);
        lemma.push_str(rule.replacement);
        if rule.undouble {
            undouble(&mut lemma);
        }
        return Some(lemma);
    }
    None
}

/// "stopp" -> "stop", "runn" -> "run"; leaves "fall", "miss", "add" alone.
fn undouble(lemma: &mut String) {
    let mut tail = lemma.chars().rev();
    if let (Some(last), Some(prev)) = (tail.next(), tail.next()) {
        let doubled_consonant =
            last == prev && last.is_ascii_alphabetic() && !"aeioulsfz".contains(last);
        if doubled_consonant && lemma.chars().count() > 3 {
            lemma.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use proptest::prelude::*;

    fn lemma(word: &str, tag: &str) -> String {
        SuffixLemmatizer::new().lemmatize(word, tag)
    }

    #[test]
    fn test_nouns() {
        assert_eq!(lemma("cats", "NNS"), "cat");
        assert_eq!(lemma("flies", "NNS"), "fly");
        assert_eq!(lemma("boxes", "NNS"), "box");
        assert_eq!(lemma("glasses", "NNS"), "glass");
        assert_eq!(lemma("children", "NNS"), "child");
        assert_eq!(lemma("Name", "NN"), "name");
        assert_eq!(lemma("Melroy", "NNP"), "Melroy");
    }

    #[test]
    fn test_verbs() {
        assert_eq!(lemma("is", "VBZ"), "be");
        assert_eq!(lemma("walks", "VBZ"), "walk");
        assert_eq!(lemma("walked", "VBD"), "walk");
        assert_eq!(lemma("stopped", "VBD"), "stop");
        assert_eq!(lemma("created", "VBN"), "create");
        assert_eq!(lemma("running", "VBG"), "run");
        assert_eq!(lemma("bring", "VBP"), "bring");
        assert_eq!(lemma("added", "VBD"), "add");
        assert_eq!(lemma("n't", "RB"), "not");
    }

    #[test]
    fn test_punctuation_passes_through() {
        assert_eq!(lemma(",", ","), ",");
        assert_eq!(lemma("(", "-LRB-"), "(");
    }

    proptest! {
        #[test]
        fn test_never_panics(word in "\\PC{0,12}", tag in "(NNS|NNPS|VBZ|VBD|VBN|VBG|NN|JJ|Z)") {
            let _ = lemma(&word, &tag);
        }

        #[test]
        fn test_regular_plural(stem in "[a-z]{2,7}t") {
            let plural = format!("{}s", stem);
            prop_assert_eq!(lemma(&plural, "NNS"), stem);
        }

        #[test]
        fn test_uninflected_tags_only_lowercase(word in "[A-Za-z]{1,10}") {
            prop_assert_eq!(lemma(&word, "JJ"), word.to_lowercase());
        }
    }
}
