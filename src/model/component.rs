use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::value::AnimatedValue;

/// Stable unique identifier of a component instance.
///
/// Assigned at creation and immutable for the component's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub Uuid);

impl ComponentId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component type discriminator selecting the capability set.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ComponentType {
    /// Top-level container holding one arrangement of blocks.
    Scenario,
    /// Paged container placed on the scenario surface.
    Block,
    /// One page of a block, active over a time window.
    Page,
    /// Secondary audio/video element synchronized to the main media.
    Media,
    /// Time-driven pointer overlay.
    Cursor,
    /// Raster image element.
    Image,
    /// Rich-text element.
    Text,
    /// Vector graphics element.
    #[serde(rename = "SVG")]
    Svg,
    /// Transport control surface.
    Controller,
    /// Control toggling the visibility of associated blocks.
    BlockToggler,
    /// Plain content wrapper inside a page.
    Content,
    /// Lottie-style animation element.
    Animation,
    /// Surface the main media renders into.
    VideoRenderer,
}

impl ComponentType {
    /// Every component type, in schema-composition order.
    pub const ALL: [ComponentType; 13] = [
        ComponentType::Scenario,
        ComponentType::Block,
        ComponentType::Page,
        ComponentType::Media,
        ComponentType::Cursor,
        ComponentType::Image,
        ComponentType::Text,
        ComponentType::Svg,
        ComponentType::Controller,
        ComponentType::BlockToggler,
        ComponentType::Content,
        ComponentType::Animation,
        ComponentType::VideoRenderer,
    ];

    /// The owning reference-list field for this type, if it is a container.
    ///
    /// Entries in an owning list are parent/child edges: deleting the parent
    /// cascades through them.
    pub fn owned_reference_field(self) -> Option<&'static str> {
        match self {
            ComponentType::Scenario | ComponentType::Page => Some("children_ids"),
            ComponentType::Block => Some("pages_ids"),
            _ => None,
        }
    }

    /// The non-owning association field for this type, if any.
    ///
    /// The BlockToggler→Block edge is many-to-many: severed on delete, never
    /// cascaded.
    pub fn association_reference_field(self) -> Option<&'static str> {
        match self {
            ComponentType::BlockToggler => Some("block_ids"),
            _ => None,
        }
    }

    /// Component types admissible in this type's owning reference list.
    pub fn allowed_children(self) -> &'static [ComponentType] {
        match self {
            ComponentType::Scenario => &[
                ComponentType::Block,
                ComponentType::Media,
                ComponentType::Controller,
                ComponentType::VideoRenderer,
                ComponentType::BlockToggler,
            ],
            ComponentType::Block => &[ComponentType::Page],
            ComponentType::Page => &[
                ComponentType::Content,
                ComponentType::Cursor,
                ComponentType::Image,
                ComponentType::Svg,
                ComponentType::Text,
                ComponentType::Animation,
                ComponentType::Media,
            ],
            _ => &[],
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComponentType::Svg => "SVG",
            other => {
                return write!(f, "{other:?}");
            }
        };
        write!(f, "{s}")
    }
}

/// Media element kind, selecting conditional schema defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTag {
    /// Audio-only element.
    Audio,
    /// Video element.
    Video,
}

/// Travel direction of a cursor overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// Left-to-right travel.
    Right,
    /// Right-to-left travel.
    Left,
    /// Bottom-to-top travel.
    Top,
    /// Top-to-bottom travel.
    Bottom,
}

/// Geometric form of a cursor overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorForm {
    /// Straight-line travel.
    Linear,
    /// Travel around a circle.
    Circular,
}

/// A persisted visual/behavioral entity in the authored presentation tree.
///
/// Which optional fields are meaningful is decided by the capability set of
/// [`Component::kind`] (see [`crate::capabilities`]); consumers must branch on
/// capability, never on the type name. The schema layer guarantees that a
/// stored component only carries fields its type composes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable unique id.
    pub id: ComponentId,
    /// Type discriminator.
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Top-left position in pixels (Positionable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    /// Width/height in pixels, each >= 1 (Resizable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<[f64; 2]>,

    /// Start of the active window in media seconds (Timeable).
    #[serde(rename = "start-time", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    /// End of the active window in media seconds (Timeable).
    #[serde(rename = "end-time", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,

    /// Authored visibility toggle (Hideable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    /// CSS-style background color (Backgroundable).
    #[serde(
        rename = "background-color",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
    /// Background image source (Backgroundable).
    #[serde(
        rename = "background-image",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<String>,

    /// Border width in pixels (Borderable).
    #[serde(rename = "border-width", default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Border color (Borderable).
    #[serde(rename = "border-color", default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Border corner radius in pixels (Borderable).
    #[serde(
        rename = "border-radius",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub border_radius: Option<f64>,

    /// Scalar or keyframed opacity in `[0, 1]` (Animatable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<AnimatedValue>,
    /// Scalar-pair or keyframed `[x, y]` translation (Animatable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<AnimatedValue>,
    /// Scalar-pair or keyframed `[x, y]` scale (Animatable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<AnimatedValue>,

    /// Media element kind (Media only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<MediaTag>,
    /// External source path or URL (Media, Image, SVG, Animation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Text content (Text, Content).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Cursor travel direction (Cursor only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<CursorDirection>,
    /// Cursor geometric form (Cursor only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<CursorForm>,
    /// Play the animation backwards (Animation only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed: Option<bool>,

    /// Ordered child ids (Scenario, Page).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children_ids: Vec<ComponentId>,
    /// Ordered page ids (Block).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages_ids: Vec<ComponentId>,
    /// Associated block ids (BlockToggler); many-to-many, non-owning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_ids: Vec<ComponentId>,
}

impl Component {
    /// The ids in this component's owning reference list, in order.
    pub fn owned_child_ids(&self) -> &[ComponentId] {
        match self.kind.owned_reference_field() {
            Some("children_ids") => &self.children_ids,
            Some("pages_ids") => &self.pages_ids,
            _ => &[],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/component.rs"]
mod tests;
