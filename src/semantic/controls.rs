//! Registry of GUI control kinds
//!
//! Each kind has a fixed table of properties and events. Adding a control
//! is an edit here plus a variant in [`ControlKind`]; the resolver and the
//! code generator read everything else from the table.

use crate::ast::{ControlKind, ValueKind};

/// A property a control or window accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
    /// Member assigned in the generated code
    pub target: &'static str,
}

/// An event a control can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    pub name: &'static str,
    /// Event wired in the generated code
    pub target: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    pub kind: ControlKind,
    /// Keyword used in source
    pub tag: &'static str,
    /// Class instantiated in the generated code
    pub class_name: &'static str,
    pub properties: &'static [PropertySpec],
    pub events: &'static [EventSpec],
    /// Size applied when the source gives none; `None` sizes to content
    pub default_size: Option<(i32, i32)>,
}

const fn property(name: &'static str, kind: ValueKind, required: bool, target: &'static str) -> PropertySpec {
    PropertySpec { name, kind, required, target }
}

/// Position and size, accepted by every control
pub const GEOMETRY: &[PropertySpec] = &[
    property("x", ValueKind::Number, false, "Left"),
    property("y", ValueKind::Number, false, "Top"),
    property("width", ValueKind::Number, false, "Width"),
    property("height", ValueKind::Number, false, "Height"),
];

pub const WINDOW_PROPERTIES: &[PropertySpec] = &[
    property("title", ValueKind::String, false, "Text"),
    property("width", ValueKind::Number, false, "ClientSize.Width"),
    property("height", ValueKind::Number, false, "ClientSize.Height"),
];

pub const DEFAULT_WINDOW_TITLE: &str = "Nova App";
pub const DEFAULT_WINDOW_WIDTH: i32 = 400;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;

/// Controls without an explicit position are stacked from the top-left
pub const LAYOUT_MARGIN: i32 = 12;
pub const LAYOUT_ROW_HEIGHT: i32 = 36;

const TEXT_REQUIRED: PropertySpec = property("text", ValueKind::String, true, "Text");

static REGISTRY: [ControlSpec; 4] = [
    ControlSpec {
        kind: ControlKind::Label,
        tag: "label",
        class_name: "Label",
        properties: &[TEXT_REQUIRED],
        events: &[],
        default_size: None,
    },
    ControlSpec {
        kind: ControlKind::Button,
        tag: "button",
        class_name: "Button",
        properties: &[TEXT_REQUIRED],
        events: &[EventSpec { name: "on_click", target: "Click" }],
        default_size: Some((100, 30)),
    },
    ControlSpec {
        kind: ControlKind::TextBox,
        tag: "textbox",
        class_name: "TextBox",
        properties: &[property("text", ValueKind::String, false, "Text")],
        events: &[EventSpec { name: "on_change", target: "TextChanged" }],
        default_size: Some((200, 24)),
    },
    ControlSpec {
        kind: ControlKind::CheckBox,
        tag: "checkbox",
        class_name: "CheckBox",
        properties: &[TEXT_REQUIRED, property("checked", ValueKind::Bool, false, "Checked")],
        events: &[EventSpec { name: "on_change", target: "CheckedChanged" }],
        default_size: None,
    },
];

impl ControlKind {
    /// Registry entry for a source keyword such as `button`
    pub fn from_tag(tag: &str) -> Option<ControlKind> {
        REGISTRY.iter().find(|spec| spec.tag == tag).map(|spec| spec.kind)
    }

    pub fn spec(self) -> &'static ControlSpec {
        // REGISTRY has exactly one entry per variant, in declaration order
        &REGISTRY[self as usize]
    }
}

impl ControlSpec {
    /// Own properties first, then the shared geometry properties
    pub fn property(&self, name: &str) -> Option<&'static PropertySpec> {
        self.properties.iter().chain(GEOMETRY.iter()).find(|p| p.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&'static EventSpec> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn required_properties(&self) -> impl Iterator<Item = &'static PropertySpec> {
        self.properties.iter().filter(|p| p.required)
    }
}

/// Source keywords of every registered control, for error messages
pub fn known_tags() -> Vec<&'static str> {
    REGISTRY.iter().map(|spec| spec.tag).collect()
}

pub fn window_property(name: &str) -> Option<&'static PropertySpec> {
    WINDOW_PROPERTIES.iter().find(|p| p.name == name)
}
