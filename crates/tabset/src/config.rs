//! Instance configuration
//!
//! Options are resolved once at mount from container attributes (an
//! optional JSON blob first, then individual attributes on top) and can be
//! patched later with [`PartialOptions`].

use serde::Deserialize;

use crate::TabsError;
use crate::markers;

/// Fallback timeout for tab fades
pub const DEFAULT_TRANSITION_MS: u64 = 300;
/// Fallback timeout for accordion height animations
pub const DEFAULT_ACCORDION_MS: u64 = 300;

/// Which pointer interaction activates a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Click,
    Hover,
}

/// What a matching breakpoint gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsiveAction {
    /// Match renders the instance as an accordion, otherwise as tabs
    #[default]
    Accordion,
    /// Match enables the instance, otherwise it is disabled
    Enable,
}

/// Responsive breakpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    /// Explicit media query
    Query(String),
    /// Viewport narrower than this many px
    Below(u32),
    /// Viewport wider than this many px
    Above(u32),
}

impl Breakpoint {
    /// Media query the host evaluates
    pub fn media_query(&self) -> String {
        match self {
            Self::Query(q) => q.clone(),
            Self::Below(px) => format!("(max-width: {}px)", px.saturating_sub(1)),
            Self::Above(px) => format!("(min-width: {}px)", px.saturating_add(1)),
        }
    }
}

/// Fully resolved options of one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: TriggerMode,
    /// Identifier of the initially active trigger
    pub default_tab: Option<String>,
    /// Overlay crossfade for tab switches
    pub crossfade: bool,
    /// Fallback timeout (ms) for tab fades
    pub transition_duration: u64,
    /// Autoplay interval (ms); unset or non-positive disables autoplay
    pub autoplay_delay: Option<i64>,
    /// Allow several expanded accordion panels
    pub accordion_multiple: bool,
    /// Fallback timeout (ms) for accordion height animations
    pub accordion_duration: u64,
    pub breakpoint: Option<Breakpoint>,
    pub responsive: ResponsiveAction,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: TriggerMode::Click,
            default_tab: None,
            crossfade: false,
            transition_duration: DEFAULT_TRANSITION_MS,
            autoplay_delay: None,
            accordion_multiple: false,
            accordion_duration: DEFAULT_ACCORDION_MS,
            breakpoint: None,
            responsive: ResponsiveAction::Accordion,
        }
    }
}

impl Options {
    /// Resolve options from container attributes
    pub fn from_attributes(attr: impl Fn(&str) -> Option<String>) -> Result<Self, TabsError> {
        let mut options = Self::default();
        if let Some(json) = attr(markers::OPT_JSON) {
            options.merge(PartialOptions::from_json(&json)?);
        }
        options.merge(PartialOptions::from_attributes(&attr)?);
        Ok(options)
    }

    /// Autoplay period, if autoplay is on
    pub fn autoplay_interval(&self) -> Option<u64> {
        self.autoplay_delay.filter(|&ms| ms > 0).map(|ms| ms as u64)
    }

    /// Apply every field set in `patch`
    pub fn merge(&mut self, patch: PartialOptions) {
        let PartialOptions {
            mode,
            default_tab,
            crossfade,
            transition_duration,
            autoplay_delay,
            accordion_multiple,
            accordion_duration,
            breakpoint,
            responsive,
        } = patch;

        if let Some(v) = mode {
            self.mode = v;
        }
        if let Some(v) = default_tab {
            self.default_tab = Some(v);
        }
        if let Some(v) = crossfade {
            self.crossfade = v;
        }
        if let Some(v) = transition_duration {
            self.transition_duration = v;
        }
        if let Some(v) = autoplay_delay {
            self.autoplay_delay = Some(v);
        }
        if let Some(v) = accordion_multiple {
            self.accordion_multiple = v;
        }
        if let Some(v) = accordion_duration {
            self.accordion_duration = v;
        }
        if let Some(v) = breakpoint {
            self.breakpoint = Some(v);
        }
        if let Some(v) = responsive {
            self.responsive = v;
        }
    }
}

/// A partial options patch (`setOptions`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialOptions {
    pub mode: Option<TriggerMode>,
    pub default_tab: Option<String>,
    pub crossfade: Option<bool>,
    pub transition_duration: Option<u64>,
    pub autoplay_delay: Option<i64>,
    pub accordion_multiple: Option<bool>,
    pub accordion_duration: Option<u64>,
    pub breakpoint: Option<Breakpoint>,
    pub responsive: Option<ResponsiveAction>,
}

impl PartialOptions {
    /// Parse a JSON options object (`{"crossfade": true, ...}`)
    pub fn from_json(json: &str) -> Result<Self, TabsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the individual option attributes. Absent attributes stay unset.
    pub fn from_attributes(attr: &impl Fn(&str) -> Option<String>) -> Result<Self, TabsError> {
        let mut patch = Self::default();

        if let Some(v) = attr(markers::OPT_MODE) {
            patch.mode = Some(match v.trim().to_ascii_lowercase().as_str() {
                "" | "click" => TriggerMode::Click,
                "hover" => TriggerMode::Hover,
                _ => return Err(TabsError::invalid(markers::OPT_MODE, &v)),
            });
        }
        if let Some(v) = attr(markers::OPT_DEFAULT) {
            let v = v.trim();
            if !v.is_empty() {
                patch.default_tab = Some(v.to_string());
            }
        }
        if let Some(v) = attr(markers::OPT_CROSSFADE) {
            patch.crossfade = Some(parse_bool(markers::OPT_CROSSFADE, &v)?);
        }
        if let Some(v) = attr(markers::OPT_DURATION) {
            patch.transition_duration = Some(parse_number(markers::OPT_DURATION, &v)?);
        }
        if let Some(v) = attr(markers::OPT_AUTOPLAY) {
            patch.autoplay_delay = Some(parse_number(markers::OPT_AUTOPLAY, &v)?);
        }
        if let Some(v) = attr(markers::OPT_ACCORDION_MULTIPLE) {
            patch.accordion_multiple = Some(parse_bool(markers::OPT_ACCORDION_MULTIPLE, &v)?);
        }
        if let Some(v) = attr(markers::OPT_ACCORDION_DURATION) {
            patch.accordion_duration = Some(parse_number(markers::OPT_ACCORDION_DURATION, &v)?);
        }

        // An explicit query wins over thresholds
        if let Some(v) = attr(markers::OPT_BREAKPOINT).filter(|v| !v.trim().is_empty()) {
            patch.breakpoint = Some(Breakpoint::Query(v.trim().to_string()));
        } else if let Some(v) = attr(markers::OPT_BELOW) {
            patch.breakpoint = Some(Breakpoint::Below(parse_number(markers::OPT_BELOW, &v)?));
        } else if let Some(v) = attr(markers::OPT_ABOVE) {
            patch.breakpoint = Some(Breakpoint::Above(parse_number(markers::OPT_ABOVE, &v)?));
        }

        if let Some(v) = attr(markers::OPT_RESPONSIVE) {
            patch.responsive = Some(match v.trim().to_ascii_lowercase().as_str() {
                "" | "accordion" => ResponsiveAction::Accordion,
                "enable" => ResponsiveAction::Enable,
                _ => return Err(TabsError::invalid(markers::OPT_RESPONSIVE, &v)),
            });
        }

        Ok(patch)
    }
}

/// Boolean attribute: bare presence means true
fn parse_bool(name: &str, value: &str) -> Result<bool, TabsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(TabsError::invalid(name, value)),
    }
}

/// Numeric attribute, with an optional `ms` suffix
fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, TabsError> {
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix("ms").unwrap_or(trimmed).trim();
    digits.parse().map_err(|_| TabsError::invalid(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let options = Options::from_attributes(attrs(&[])).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.autoplay_interval(), None);
    }

    #[test]
    fn test_attributes() {
        let options = Options::from_attributes(attrs(&[
            ("data-tabs-mode", "hover"),
            ("data-tabs-default", " b "),
            ("data-tabs-crossfade", ""),
            ("data-tabs-duration", "450ms"),
            ("data-tabs-autoplay", "1000"),
            ("data-tabs-accordion-multiple", "false"),
            ("data-tabs-below", "768"),
        ]))
        .unwrap();

        assert_eq!(options.mode, TriggerMode::Hover);
        assert_eq!(options.default_tab.as_deref(), Some("b"));
        assert!(options.crossfade);
        assert_eq!(options.transition_duration, 450);
        assert_eq!(options.autoplay_interval(), Some(1000));
        assert!(!options.accordion_multiple);
        assert_eq!(options.breakpoint, Some(Breakpoint::Below(768)));
    }

    #[test]
    fn test_non_positive_autoplay_disables() {
        let options = Options::from_attributes(attrs(&[("data-tabs-autoplay", "-5")])).unwrap();
        assert_eq!(options.autoplay_delay, Some(-5));
        assert_eq!(options.autoplay_interval(), None);
    }

    #[test]
    fn test_json_blob_then_attributes() {
        let options = Options::from_attributes(attrs(&[
            ("data-tabs-options", r#"{"crossfade": true, "transitionDuration": 100, "breakpoint": {"above": 1024}}"#),
            ("data-tabs-duration", "200"),
        ]))
        .unwrap();

        assert!(options.crossfade);
        assert_eq!(options.transition_duration, 200);
        assert_eq!(options.breakpoint, Some(Breakpoint::Above(1024)));
    }

    #[test]
    fn test_invalid_values() {
        let err = Options::from_attributes(attrs(&[("data-tabs-duration", "soon")])).unwrap_err();
        assert!(matches!(err, TabsError::InvalidOption { .. }));

        let err = Options::from_attributes(attrs(&[("data-tabs-options", "{oops")])).unwrap_err();
        assert!(matches!(err, TabsError::InvalidOptionsJson(_)));

        assert!(Options::from_attributes(attrs(&[("data-tabs-crossfade", "maybe")])).is_err());
    }

    #[test]
    fn test_breakpoint_queries() {
        assert_eq!(Breakpoint::Below(768).media_query(), "(max-width: 767px)");
        assert_eq!(Breakpoint::Above(768).media_query(), "(min-width: 769px)");
        let query = Breakpoint::Query("(orientation: portrait)".into());
        assert_eq!(query.media_query(), "(orientation: portrait)");
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut options = Options {
            crossfade: true,
            ..Options::default()
        };
        options.merge(PartialOptions {
            autoplay_delay: Some(500),
            ..PartialOptions::default()
        });
        assert!(options.crossfade);
        assert_eq!(options.autoplay_interval(), Some(500));
    }
}
