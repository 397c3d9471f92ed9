//! Content expressions: the nesting rules a node type imposes on its children.
//!
//! An expression is a sequence of terms. Each term names a node type or a
//! group, or a parenthesised `|` choice of names, followed by an optional
//! quantifier:
//!
//! ```text
//! block+                         one or more members of group `block`
//! (table_cell | table_header)*   any number of cells
//! heading paragraph?             a heading, then an optional paragraph
//! ```
//!
//! Expressions are lexed with [Logos] and compiled against the schema's type
//! table, so matching works on type indices instead of names.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

use crate::error::{ModelError, Result};

/// Token kinds of the content expression language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum ExprToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("|")]
    Pipe,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,
}

/// One quantified position in a content expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Term {
    /// Type indices accepted at this position, in schema order.
    pub(crate) choices: Vec<usize>,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

impl Term {
    fn accepts(&self, type_index: Option<usize>) -> bool {
        type_index.is_some_and(|index| self.choices.contains(&index))
    }
}

/// A compiled content expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContentExpr {
    pub(crate) terms: Vec<Term>,
}

impl ContentExpr {
    /// Compile `expr`, resolving each name to the type indices it stands for.
    pub(crate) fn parse(
        expr: &str,
        resolve: impl Fn(&str) -> Option<Vec<usize>>,
    ) -> Result<Self> {
        let invalid = |reason: String| ModelError::InvalidContentExpr {
            expr: expr.to_string(),
            reason,
        };

        let mut tokens = Vec::new();
        let mut lexer = ExprToken::lexer(expr);
        while let Some(result) = lexer.next() {
            match result {
                Ok(kind) => tokens.push((kind, lexer.slice())),
                Err(()) => {
                    return Err(invalid(format!("unexpected character {:?}", lexer.slice())));
                }
            }
        }

        let lookup = |name: &str| {
            resolve(name).ok_or_else(|| invalid(format!("unknown node type or group {name}")))
        };

        let mut terms = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let mut choices = Vec::new();
            match tokens[i] {
                (ExprToken::Name, name) => {
                    i += 1;
                    choices.extend(lookup(name)?);
                }
                (ExprToken::LParen, _) => {
                    i += 1;
                    loop {
                        match tokens.get(i) {
                            Some((ExprToken::Name, name)) => {
                                choices.extend(lookup(name)?);
                                i += 1;
                            }
                            _ => return Err(invalid("expected a name inside parentheses".into())),
                        }
                        match tokens.get(i) {
                            Some((ExprToken::Pipe, _)) => i += 1,
                            Some((ExprToken::RParen, _)) => {
                                i += 1;
                                break;
                            }
                            _ => return Err(invalid("unclosed parenthesis".into())),
                        }
                    }
                }
                (_, text) => return Err(invalid(format!("unexpected {text:?}"))),
            }

            let mut seen = Vec::with_capacity(choices.len());
            choices.retain(|index| {
                let fresh = !seen.contains(index);
                seen.push(*index);
                fresh
            });

            let quantifier = match tokens.get(i).map(|(kind, _)| *kind) {
                Some(ExprToken::Star) => Some((0, None)),
                Some(ExprToken::Plus) => Some((1, None)),
                Some(ExprToken::Question) => Some((0, Some(1))),
                _ => None,
            };
            if quantifier.is_some() {
                i += 1;
            }
            let (min, max) = quantifier.unwrap_or((1, Some(1)));

            terms.push(Term { choices, min, max });
        }

        Ok(Self { terms })
    }

    /// An empty expression admits no children: the type is a leaf.
    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// First type the expression would accept, used to tell inline content
    /// from block content.
    pub(crate) fn first_choice(&self) -> Option<usize> {
        self.terms.first().and_then(|term| term.choices.first().copied())
    }

    /// Whether a sequence of child types satisfies the expression.
    ///
    /// `None` entries are children whose type is not part of the schema and
    /// never match.
    pub(crate) fn matches(&self, children: &[Option<usize>]) -> bool {
        self.match_from(0, children)
    }

    fn match_from(&self, term_index: usize, children: &[Option<usize>]) -> bool {
        let Some(term) = self.terms.get(term_index) else {
            return children.is_empty();
        };

        let mut available = 0;
        while available < children.len()
            && term.max.is_none_or(|max| available < max)
            && term.accepts(children[available])
        {
            available += 1;
        }
        if available < term.min {
            return false;
        }

        (term.min..=available)
            .rev()
            .any(|taken| self.match_from(term_index + 1, &children[taken..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // paragraph=0 heading=1 table=2 table_cell=3 table_header=4; group block = [0, 1, 2]
    fn resolve(name: &str) -> Option<Vec<usize>> {
        match name {
            "paragraph" => Some(vec![0]),
            "heading" => Some(vec![1]),
            "table" => Some(vec![2]),
            "table_cell" => Some(vec![3]),
            "table_header" => Some(vec![4]),
            "block" => Some(vec![0, 1, 2]),
            _ => None,
        }
    }

    fn compile(expr: &str) -> ContentExpr {
        ContentExpr::parse(expr, resolve).unwrap()
    }

    #[rstest]
    #[case("block+", &[], false)]
    #[case("block+", &[Some(0)], true)]
    #[case("block+", &[Some(0), Some(2), Some(1)], true)]
    #[case("block+", &[Some(3)], false)]
    #[case("block*", &[], true)]
    #[case("(table_cell | table_header)*", &[Some(3), Some(4), Some(3)], true)]
    #[case("(table_cell | table_header)*", &[Some(3), Some(0)], false)]
    #[case("heading paragraph?", &[Some(1)], true)]
    #[case("heading paragraph?", &[Some(1), Some(0)], true)]
    #[case("heading paragraph?", &[Some(1), Some(0), Some(0)], false)]
    #[case("paragraph* paragraph", &[Some(0), Some(0)], true)]
    #[case("block+", &[None], false)]
    fn matches_child_sequences(
        #[case] expr: &str,
        #[case] children: &[Option<usize>],
        #[case] expected: bool,
    ) {
        assert_eq!(compile(expr).matches(children), expected, "{expr} vs {children:?}");
    }

    #[test]
    fn group_choices_are_deduplicated() {
        let expr = compile("(block | paragraph)+");
        assert_eq!(expr.terms[0].choices, vec![0, 1, 2]);
    }

    #[test]
    fn empty_expression_is_leaf() {
        let expr = compile("");
        assert!(expr.is_empty());
        assert!(expr.matches(&[]));
        assert!(!expr.matches(&[Some(0)]));
    }

    #[rstest]
    #[case("(paragraph")]
    #[case("(paragraph |)")]
    #[case("unknown+")]
    #[case("paragraph, heading")]
    #[case("+")]
    fn rejects_malformed_expressions(#[case] expr: &str) {
        let err = ContentExpr::parse(expr, resolve).unwrap_err();
        assert!(matches!(err, ModelError::InvalidContentExpr { .. }), "{err}");
    }
}
