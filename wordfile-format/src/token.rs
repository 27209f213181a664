use std::{borrow::Borrow, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTokenError {
    Empty,
    ContainsWhitespace,
}

impl std::error::Error for InvalidTokenError {}

impl fmt::Display for InvalidTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl InvalidTokenError {
    pub fn as_str(&self) -> &str {
        match self {
            InvalidTokenError::Empty => "no token provided",
            InvalidTokenError::ContainsWhitespace => "whitespace found in token",
        }
    }
}

/// A maximal run of non-whitespace characters.
///
/// Equality is exact and case-sensitive. Length is counted in characters, not bytes.
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Token(String);

impl Token {
    pub fn new<S: Into<String>>(value: S) -> std::result::Result<Token, InvalidTokenError> {
        let value = value.into();

        if value.is_empty() {
            return Err(InvalidTokenError::Empty);
        }

        if value.chars().any(char::is_whitespace) {
            return Err(InvalidTokenError::ContainsWhitespace);
        }

        Ok(Token(value))
    }

    /// Callers guarantee `value` came out of a whitespace split.
    pub(crate) fn from_split(value: &str) -> Token {
        debug_assert!(!value.is_empty() && !value.chars().any(char::is_whitespace));
        Token(value.to_string())
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline(always)]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Token {
    type Err = InvalidTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::new(s)
    }
}

/// Joins tokens with exactly one space and no surrounding whitespace.
pub fn serialize<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token.as_ref());
    }
    out
}

/// Splits serialized text back into its tokens. Any whitespace run is a separator.
pub fn deserialize(text: &str) -> Vec<Token> {
    text.split_whitespace().map(Token::from_split).collect()
}
