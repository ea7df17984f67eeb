//! metascore is the core engine behind time-synchronized interactive
//! presentations: media playback augmented with overlaid, time-triggered
//! visual components.
//!
//! The crate covers the model and runtime; rendering, persistence transport,
//! and editing UX are host collaborators behind narrow seams.
//!
//! # Architecture
//!
//! 1. **Model + schema**: typed [`Component`] entities whose fields are
//!    composed from capability mixins ([`Capability`]), validated against
//!    per-type schemas ([`SchemaSet`]).
//! 2. **Store**: the [`ComponentStore`] owns the id-indexed component graph;
//!    parent/child relations are id references, resolved on demand.
//! 3. **Cue engine**: a [`CueRuntime`] fires [`Trigger`] callbacks as media
//!    time crosses registered windows, arming precise timers inside a
//!    half-second pre-roll to compensate for coarse `timeupdate` granularity.
//! 4. **Derived properties**: pure functions ([`active`], [`opacity_at`], …)
//!    map `(component, time)` to display-facing values.
//! 5. **Behavior runtime**: authored behavior graphs compile
//!    ([`compile`]) against whitelisted modules and execute in a
//!    [`BehaviorRuntime`] bound to the store, cue runtime, and transport.
//!
//! The whole engine is single-threaded and cooperative: the host drives it
//! from media time updates and host-clock advancement.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod behavior;
mod cue;
mod eval;
mod foundation;
mod model;
mod schema;
mod store;

pub use behavior::compile::{Program, compile};
pub use behavior::context::{BehaviorContext, Module, ScriptValue};
pub use behavior::model::{
    ActionDef, BehaviorDef, BehaviorSheet, BinaryOp, ExprDef, TriggerDef, UnaryOp,
};
pub use behavior::reactivity::{Reactivity, WatcherId};
pub use behavior::runtime::{BehaviorRuntime, HostCommand, World};
pub use cue::engine::{
    CuePointId, CueRuntime, PRE_ROLL_SECONDS, Trigger, TriggerCallback,
};
pub use cue::transport::{MediaController, MediaTransport, ThenCallback};
pub use eval::properties::{
    BackgroundStyle, BorderStyle, active, background, border, dimension, hidden, opacity_at,
    position, scale_at, translate_at,
};
pub use foundation::error::{MetascoreError, MetascoreResult};
pub use model::capability::{Capability, capabilities, has_capability};
pub use model::component::{
    Component, ComponentId, ComponentType, CursorDirection, CursorForm, MediaTag,
};
pub use model::value::{AnimValue, AnimatedValue, Keyframe, Value, ValueVec, sample_keyframes};
pub use schema::compose::{FieldKind, FieldSpec, Schema, SchemaSet};
pub use schema::validate::{SchemaErrors, SchemaPathElem, SchemaViolation, validate};
pub use store::persist::{PersistenceClient, load_store, restore_store, save_store};
pub use store::tree::ComponentStore;
