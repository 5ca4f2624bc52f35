//! DOMTokenList (classList)
//!
//! Space-separated token list backing the `class` attribute.

/// Ordered, duplicate-free class tokens of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a `class` attribute value. Repeated tokens collapse.
    pub fn from_string(s: &str) -> Self {
        s.split_whitespace().fold(Self::new(), |mut list, token| {
            list.add(token);
            list
        })
    }

    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// `false` when the token was already there or is empty
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// `false` when the token was not there
    pub fn remove(&mut self, token: &str) -> bool {
        match self.tokens.iter().position(|t| t == token) {
            Some(at) => {
                self.tokens.remove(at);
                true
            }
            None => false,
        }
    }

    /// Flip (or force) a token. Returns whether it is present afterwards.
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or(!self.contains(token));
        if on {
            self.add(token);
        } else {
            self.remove(token);
        }
        on
    }

    /// Serialized attribute value
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        let list = DOMTokenList::from_string("tab  tab--wide is-active tab");
        assert_eq!(list.length(), 3);
        assert!(list.contains("tab--wide"));
        assert_eq!(list.value(), "tab tab--wide is-active");
    }

    #[test]
    fn test_add_remove() {
        let mut list = DOMTokenList::new();
        assert!(list.add("foo"));
        assert!(!list.add("foo"));
        assert!(!list.add(""));

        assert!(list.remove("foo"));
        assert!(!list.remove("foo"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut list = DOMTokenList::new();

        assert!(list.toggle("active", None));
        assert!(list.contains("active"));

        assert!(!list.toggle("active", None));
        assert!(list.toggle("active", Some(true)));
        assert!(list.toggle("active", Some(true)));
        assert_eq!(list.length(), 1);
    }
}
