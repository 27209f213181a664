use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::token::{serialize, Token};

/// How a `(token, count)` entry is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rendering {
    /// `cat(2)`
    #[default]
    Parenthesized,
    /// `cat 2`
    Spaced,
}

impl Rendering {
    pub fn as_str(&self) -> &str {
        match self {
            Rendering::Parenthesized => "parenthesized",
            Rendering::Spaced => "spaced",
        }
    }

    fn entry(&self, token: &Token, count: usize) -> String {
        match self {
            Rendering::Parenthesized => format!("{}({})", token, count),
            Rendering::Spaced => format!("{} {}", token, count),
        }
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rendering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parenthesized" | "paren" => Ok(Rendering::Parenthesized),
            "spaced" | "pairs" => Ok(Rendering::Spaced),
            _ => Err(format!(
                "invalid rendering: {:?} (expected \"parenthesized\" or \"spaced\")",
                s
            )),
        }
    }
}

/// Order of the distinct entries in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniqueOrder {
    #[default]
    FirstOccurrence,
    /// Shortest first, ties broken lexicographically.
    LengthThenLexical,
}

impl FromStr for UniqueOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "first-occurrence" => Ok(UniqueOrder::FirstOccurrence),
            "length" | "length-then-lexical" => Ok(UniqueOrder::LengthThenLexical),
            _ => Err(format!(
                "invalid order: {:?} (expected \"first\" or \"length\")",
                s
            )),
        }
    }
}

/// How input tokens are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compaction {
    /// Every token counts once, exactly as read.
    #[default]
    Fresh,
    /// Tokens already in the rendered entry form carry their count forward,
    /// so compacting compacted output reproduces it.
    Accumulate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactOptions {
    pub rendering: Rendering,
    pub order: UniqueOrder,
    pub compaction: Compaction,
}

/// Occurrence counts of distinct tokens, in first-occurrence order.
///
/// The order list is authoritative: `HashMap` iteration order says nothing about
/// which token appeared first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<Token, usize>,
    order: Vec<Token>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        FrequencyTable::default()
    }

    pub fn from_tokens<'a, I>(tokens: I) -> FrequencyTable
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let mut table = FrequencyTable::new();
        for token in tokens {
            table.record(token, 1);
        }
        table
    }

    /// Adds `n` occurrences of `token`, appending it to the order if unseen.
    ///
    /// Counts saturate at `usize::MAX`.
    pub fn record(&mut self, token: &Token, n: usize) {
        match self.counts.get_mut(token.as_str()) {
            Some(count) => *count = count.saturating_add(n),
            None => {
                self.counts.insert(token.clone(), n);
                self.order.push(token.clone());
            }
        }
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts
            .values()
            .fold(0usize, |total, n| total.saturating_add(*n))
    }

    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, usize)> + '_ {
        self.order
            .iter()
            .map(move |token| (token, self.counts.get(token.as_str()).copied().unwrap_or(0)))
    }

    pub fn entries(&self, order: UniqueOrder) -> Vec<(&Token, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        if order == UniqueOrder::LengthThenLexical {
            entries.sort_by(|(a, _), (b, _)| {
                a.char_len().cmp(&b.char_len()).then_with(|| a.cmp(b))
            });
        }
        entries
    }

    pub fn render(&self, rendering: Rendering, order: UniqueOrder) -> String {
        serialize(
            self.entries(order)
                .into_iter()
                .map(|(token, count)| rendering.entry(token, count)),
        )
    }
}

/// Splits a parenthesized entry such as `cat(2)` into `("cat", 2)`.
fn parse_parenthesized(token: &Token) -> Option<(Token, usize)> {
    let inner = token.as_str().strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let (word, digits) = (&inner[..open], &inner[open + 1..]);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count = digits.parse::<usize>().ok().filter(|n| *n > 0)?;
    Some((Token::new(word).ok()?, count))
}

fn parse_count(token: &Token) -> Option<usize> {
    let s = token.as_str();
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Counts entries that may already be rendered with `rendering`.
fn accumulate(tokens: &[Token], rendering: Rendering) -> FrequencyTable {
    let mut table = FrequencyTable::new();

    match rendering {
        Rendering::Parenthesized => {
            for token in tokens {
                match parse_parenthesized(token) {
                    Some((word, count)) => table.record(&word, count),
                    None => table.record(token, 1),
                }
            }
        }
        Rendering::Spaced => {
            let mut iter = tokens.iter().peekable();
            while let Some(token) = iter.next() {
                match iter.peek().and_then(|next| parse_count(next)) {
                    Some(count) => {
                        iter.next();
                        table.record(token, count);
                    }
                    None => table.record(token, 1),
                }
            }
        }
    }

    table
}

/// Collapses `tokens` into distinct entries with their repetition counts.
pub fn compact(tokens: &[Token], options: &CompactOptions) -> FrequencyTable {
    match options.compaction {
        Compaction::Fresh => FrequencyTable::from_tokens(tokens),
        Compaction::Accumulate => accumulate(tokens, options.rendering),
    }
}

/// `["cat", "dog", "cat", "ant"]` becomes `"cat(2) dog(1) ant(1)"`.
pub fn compact_with_frequency(tokens: &[Token]) -> String {
    FrequencyTable::from_tokens(tokens).render(Rendering::Parenthesized, UniqueOrder::FirstOccurrence)
}
