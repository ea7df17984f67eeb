use crate::model::component::ComponentType;

/// An optional trait a component type may possess.
///
/// Each capability contributes schema fields (see [`crate::SchemaSet`]) and
/// derived-property behavior (the projection functions re-exported at the
/// crate root). Capability membership is a static property of the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Has a pixel `position`.
    Positionable,
    /// Has a pixel `dimension`; updates round it to whole pixels.
    Resizable,
    /// Has `start-time`/`end-time` bounding an active window.
    Timeable,
    /// Has an authored `hidden` toggle.
    Hideable,
    /// Has `background-color`/`background-image`.
    Backgroundable,
    /// Has `border-width`/`border-color`/`border-radius`.
    Borderable,
    /// Has keyframable `opacity`/`translate`/`scale`.
    Animatable,
}

/// Capability set of `kind`.
///
/// This single table is the authority consulted by schema composition and by
/// property derivation alike, replacing per-consumer capability flags.
pub fn capabilities(kind: ComponentType) -> &'static [Capability] {
    use Capability::*;
    match kind {
        ComponentType::Scenario => &[],
        ComponentType::Block => &[Positionable, Resizable, Hideable, Backgroundable, Borderable],
        ComponentType::Page => &[Backgroundable, Timeable],
        ComponentType::Media => &[Positionable, Resizable, Hideable, Borderable, Animatable],
        ComponentType::Cursor => &[
            Positionable,
            Resizable,
            Hideable,
            Backgroundable,
            Borderable,
            Timeable,
        ],
        ComponentType::Image => &[
            Positionable,
            Resizable,
            Hideable,
            Backgroundable,
            Borderable,
            Timeable,
            Animatable,
        ],
        ComponentType::Text => &[
            Positionable,
            Resizable,
            Hideable,
            Backgroundable,
            Borderable,
            Timeable,
            Animatable,
        ],
        ComponentType::Svg => &[
            Positionable,
            Resizable,
            Hideable,
            Borderable,
            Timeable,
            Animatable,
        ],
        ComponentType::Controller => &[Positionable, Resizable, Hideable, Borderable],
        ComponentType::BlockToggler => {
            &[Positionable, Resizable, Hideable, Backgroundable, Borderable]
        }
        ComponentType::Content => &[Backgroundable, Borderable],
        ComponentType::Animation => &[
            Positionable,
            Resizable,
            Hideable,
            Borderable,
            Timeable,
            Animatable,
        ],
        ComponentType::VideoRenderer => &[Positionable, Resizable, Hideable, Borderable],
    }
}

/// Whether `kind` possesses `cap`.
pub fn has_capability(kind: ComponentType, cap: Capability) -> bool {
    capabilities(kind).contains(&cap)
}
