use std::str::FromStr;

use crate::token::Token;

/// Tie-break for tokens of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthOrder {
    /// Keep input order.
    #[default]
    Stable,
    Lexical,
}

impl FromStr for LengthOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(LengthOrder::Stable),
            "lexical" => Ok(LengthOrder::Lexical),
            _ => Err(format!(
                "invalid length order: {:?} (expected \"stable\" or \"lexical\")",
                s
            )),
        }
    }
}

/// Every occurrence of every token, shortest first.
pub fn sort_by_length(tokens: &[Token], order: LengthOrder) -> Vec<Token> {
    let mut sorted = tokens.to_vec();
    match order {
        // `sort_by_key` is stable.
        LengthOrder::Stable => sorted.sort_by_key(Token::char_len),
        LengthOrder::Lexical => {
            sorted.sort_by(|a, b| a.char_len().cmp(&b.char_len()).then_with(|| a.cmp(b)))
        }
    }
    sorted
}

pub fn stable_sort_by_length(tokens: &[Token]) -> Vec<Token> {
    sort_by_length(tokens, LengthOrder::Stable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{deserialize, serialize};

    fn sorted(text: &str, order: LengthOrder) -> String {
        serialize(sort_by_length(&deserialize(text), order))
    }

    #[test]
    fn shortest_first_with_stable_ties() {
        assert_eq!(sorted("bb a ccc d", LengthOrder::Stable), "a d bb ccc");
        assert_eq!(sorted("d ccc a bb", LengthOrder::Stable), "d a bb ccc");
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(sorted("aa b aa b", LengthOrder::Stable), "b b aa aa");
    }

    #[test]
    fn lexical_ties() {
        assert_eq!(sorted("zz d yy a", LengthOrder::Lexical), "a d yy zz");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // "дом" is 6 bytes but 3 characters.
        assert_eq!(sorted("abcd дом ab", LengthOrder::Stable), "ab дом abcd");
    }

    #[test]
    fn empty_input() {
        assert!(stable_sort_by_length(&[]).is_empty());
        assert_eq!(sorted("", LengthOrder::Lexical), "");
    }

    #[test]
    fn output_is_an_ordered_permutation() {
        let input = deserialize("the quick brown fox jumps over the lazy dog again and again");
        let output = stable_sort_by_length(&input);

        let mut a = input.clone();
        let mut b = output.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);

        assert!(output.windows(2).all(|w| w[0].char_len() <= w[1].char_len()));

        // Equal-length tokens keep their relative input order.
        for len in 1..=6 {
            let from_input: Vec<_> = input.iter().filter(|t| t.char_len() == len).collect();
            let from_output: Vec<_> = output.iter().filter(|t| t.char_len() == len).collect();
            assert_eq!(from_input, from_output);
        }
    }
}
