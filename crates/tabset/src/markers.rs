//! Attribute and class names
//!
//! Everything the widget reads from or writes to host markup.

/// Container marker
pub const CONTAINER: &str = "data-tabs";
/// Trigger marker, value is the optional identifier
pub const TRIGGER: &str = "data-tabs-trigger";
/// Panel marker, value is the optional identifier
pub const PANEL: &str = "data-tabs-panel";
/// Optional element that gets `role="tablist"`
pub const LIST: &str = "data-tabs-list";
/// Accordion slot, value is the optional panel identifier
pub const SLOT: &str = "data-tabs-slot";
/// Set on slots the widget synthesized
pub const SLOT_AUTO: &str = "data-tabs-slot-auto";
/// Crossfade overlay host
pub const WRAPPER: &str = "data-tabs-wrapper";
/// Element hosting an embedded carousel
pub const SLIDER: &str = "data-tabs-slider";

// Options
pub const OPT_MODE: &str = "data-tabs-mode";
pub const OPT_DEFAULT: &str = "data-tabs-default";
pub const OPT_CROSSFADE: &str = "data-tabs-crossfade";
pub const OPT_DURATION: &str = "data-tabs-duration";
pub const OPT_AUTOPLAY: &str = "data-tabs-autoplay";
pub const OPT_ACCORDION_MULTIPLE: &str = "data-tabs-accordion-multiple";
pub const OPT_ACCORDION_DURATION: &str = "data-tabs-accordion-duration";
pub const OPT_BREAKPOINT: &str = "data-tabs-breakpoint";
pub const OPT_BELOW: &str = "data-tabs-below";
pub const OPT_ABOVE: &str = "data-tabs-above";
pub const OPT_RESPONSIVE: &str = "data-tabs-responsive";
pub const OPT_JSON: &str = "data-tabs-options";

// Classes
pub const READY_CLASS: &str = "tabs-ready";
pub const ACCORDION_CLASS: &str = "tabs-accordion";
pub const ACTIVE_CLASS: &str = "is-active";
pub const VISIBLE_CLASS: &str = "is-visible";
pub const OPEN_CLASS: &str = "is-open";

/// Inline style properties the widget may set on panels and wrappers
pub const WIDGET_STYLES: &[&str] = &[
    "display",
    "opacity",
    "height",
    "overflow",
    "position",
    "top",
    "left",
    "width",
    "pointer-events",
];
