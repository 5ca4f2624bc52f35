//! Transition tokens
//!
//! Every activation request mints a new token. A finalize step may only
//! change state when the token it carries is still the current one.

use std::fmt;

/// Opaque, strictly increasing request marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(u64);

impl Token {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Per-instance token source
#[derive(Debug, Default)]
pub struct TokenCounter {
    current: Token,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate everything minted so far
    pub fn mint(&mut self) -> Token {
        self.current = Token(self.current.0 + 1);
        self.current
    }

    pub fn current(&self) -> Token {
        self.current
    }

    pub fn is_current(&self, token: Token) -> bool {
        token == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_monotonic() {
        let mut tokens = TokenCounter::new();
        let a = tokens.mint();
        let b = tokens.mint();
        assert!(b > a);
        assert!(tokens.is_current(b));
        assert!(!tokens.is_current(a));
    }
}
