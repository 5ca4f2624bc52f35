//! Inline style declarations
//!
//! Ordered `property: value` pairs backing the `style` attribute.

/// Inline CSS declaration block (`element.style`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Malformed declarations are skipped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for decl in text.split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            let prop = prop.trim();
            let value = value.trim();
            if !prop.is_empty() && !value.is_empty() {
                style.set_property(prop, value);
            }
        }
        style
    }

    /// Get a property value
    pub fn get_property(&self, prop: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(prop))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property; an empty value removes it, like the CSSOM does
    pub fn set_property(&mut self, prop: &str, value: &str) {
        if value.is_empty() {
            self.remove_property(prop);
            return;
        }
        match self.declarations.iter_mut().find(|(p, _)| p.eq_ignore_ascii_case(prop)) {
            Some((_, v)) => *v = value.to_string(),
            None => self.declarations.push((prop.to_ascii_lowercase(), value.to_string())),
        }
    }

    /// Remove a property, returning its previous value
    pub fn remove_property(&mut self, prop: &str) -> Option<String> {
        let pos = self.declarations.iter().position(|(p, _)| p.eq_ignore_ascii_case(prop))?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize back to `style` attribute text
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = StyleDeclaration::parse("display:none; ;color : red;bogus");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get_property("DISPLAY"), Some("none"));
        assert_eq!(style.css_text(), "display: none; color: red;");
    }

    #[test]
    fn test_empty_value_removes() {
        let mut style = StyleDeclaration::parse("height: 20px");
        style.set_property("height", "");
        assert!(style.is_empty());
    }
}
