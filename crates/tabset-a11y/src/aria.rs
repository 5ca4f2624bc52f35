//! ARIA Support
//!
//! Roles and states used by tab lists, tab panels and accordion headers.

use std::fmt;
use std::str::FromStr;

use crate::A11yError;
use crate::focus::TabIndex;

/// Every attribute the widget may write. Used to snapshot and restore host
/// markup when the widget is disabled.
pub const WIDGET_ATTRIBUTES: &[&str] = &[
    "role",
    "aria-selected",
    "aria-expanded",
    "aria-controls",
    "aria-labelledby",
    "aria-hidden",
    "tabindex",
];

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Tab,
    TabList,
    TabPanel,
    Button,
    Region,
    Presentation,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::Button => "button",
            Self::Region => "region",
            Self::Presentation => "presentation",
        }
    }

    /// Check if role is an interactive widget
    pub fn is_widget(&self) -> bool {
        matches!(self, Self::Tab | Self::Button)
    }
}

impl FromStr for AriaRole {
    type Err = A11yError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "tab" => Self::Tab,
            "tablist" => Self::TabList,
            "tabpanel" => Self::TabPanel,
            "button" => Self::Button,
            "region" => Self::Region,
            "none" | "presentation" => Self::Presentation,
            _ => return Err(A11yError::InvalidRole(s.to_string())),
        })
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARIA state/property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AriaState {
    Selected(bool),
    Expanded(bool),
    Hidden(bool),
    Controls(String),
    LabelledBy(String),
}

impl AriaState {
    /// Attribute name and serialized value
    pub fn to_attribute(&self) -> (&'static str, String) {
        match self {
            Self::Selected(v) => ("aria-selected", v.to_string()),
            Self::Expanded(v) => ("aria-expanded", v.to_string()),
            Self::Hidden(v) => ("aria-hidden", v.to_string()),
            Self::Controls(id) => ("aria-controls", id.clone()),
            Self::LabelledBy(id) => ("aria-labelledby", id.clone()),
        }
    }
}

/// ARIA attributes for one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AriaAttributes {
    pub role: Option<AriaRole>,
    pub states: Vec<AriaState>,
    pub tab_index: Option<TabIndex>,
}

impl AriaAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Container of tab triggers
    pub fn tab_list() -> Self {
        Self {
            role: Some(AriaRole::TabList),
            ..Self::default()
        }
    }

    /// A tab trigger. Only the selected tab is in the tab sequence.
    pub fn tab(selected: bool, panel_id: Option<&str>) -> Self {
        let mut states = vec![AriaState::Selected(selected)];
        if let Some(id) = panel_id {
            states.push(AriaState::Controls(id.to_string()));
        }
        Self {
            role: Some(AriaRole::Tab),
            states,
            tab_index: Some(if selected { TabIndex::Sequential(0) } else { TabIndex::NotFocusable }),
        }
    }

    /// A tab panel
    pub fn tab_panel(visible: bool, trigger_id: Option<&str>) -> Self {
        let mut states = vec![AriaState::Hidden(!visible)];
        if let Some(id) = trigger_id {
            states.push(AriaState::LabelledBy(id.to_string()));
        }
        Self {
            role: Some(AriaRole::TabPanel),
            states,
            tab_index: Some(TabIndex::Sequential(0)),
        }
    }

    /// An accordion header. Every header stays focusable.
    pub fn accordion_header(expanded: bool, panel_id: Option<&str>) -> Self {
        let mut states = vec![AriaState::Expanded(expanded)];
        if let Some(id) = panel_id {
            states.push(AriaState::Controls(id.to_string()));
        }
        Self {
            role: Some(AriaRole::Button),
            states,
            tab_index: Some(TabIndex::Sequential(0)),
        }
    }

    /// An accordion body
    pub fn accordion_panel(expanded: bool, trigger_id: Option<&str>) -> Self {
        let mut states = vec![AriaState::Hidden(!expanded)];
        if let Some(id) = trigger_id {
            states.push(AriaState::LabelledBy(id.to_string()));
        }
        Self {
            role: Some(AriaRole::Region),
            states,
            tab_index: None,
        }
    }

    /// Flatten to `(name, value)` pairs in a stable order
    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(self.states.len() + 2);
        if let Some(role) = self.role {
            out.push(("role", role.as_str().to_string()));
        }
        out.extend(self.states.iter().map(AriaState::to_attribute));
        if let Some(index) = self.tab_index {
            out.push(("tabindex", index.to_string()));
        }
        out
    }

    /// Check if selected
    pub fn is_selected(&self) -> Option<bool> {
        self.states.iter().find_map(|s| match s {
            AriaState::Selected(v) => Some(*v),
            _ => None,
        })
    }

    /// Check if expanded
    pub fn is_expanded(&self) -> Option<bool> {
        self.states.iter().find_map(|s| match s {
            AriaState::Expanded(v) => Some(*v),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!("Tab".parse::<AriaRole>().unwrap(), AriaRole::Tab);
        assert_eq!("none".parse::<AriaRole>().unwrap(), AriaRole::Presentation);
        assert!("banner".parse::<AriaRole>().is_err());
        assert!(AriaRole::Tab.is_widget());
        assert!(!AriaRole::TabPanel.is_widget());
    }

    #[test]
    fn test_tab_attributes() {
        let attrs = AriaAttributes::tab(true, Some("panel-1")).to_attributes();
        assert_eq!(
            attrs,
            vec![
                ("role", "tab".to_string()),
                ("aria-selected", "true".to_string()),
                ("aria-controls", "panel-1".to_string()),
                ("tabindex", "0".to_string()),
            ]
        );

        let unselected = AriaAttributes::tab(false, None);
        assert_eq!(unselected.is_selected(), Some(false));
        assert!(unselected.to_attributes().contains(&("tabindex", "-1".to_string())));
    }

    #[test]
    fn test_written_attributes_are_all_tracked() {
        let sets = [
            AriaAttributes::tab_list(),
            AriaAttributes::tab(true, Some("p")),
            AriaAttributes::tab_panel(false, Some("t")),
            AriaAttributes::accordion_header(true, Some("p")),
            AriaAttributes::accordion_panel(true, Some("t")),
        ];
        for set in &sets {
            for (name, _) in set.to_attributes() {
                assert!(WIDGET_ATTRIBUTES.contains(&name), "{name} not tracked");
            }
        }
    }
}
