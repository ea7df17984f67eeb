//! Serde model of the authored behavior graph.
//!
//! A behavior pairs one trigger block with the ordered action blocks it runs.
//! Conditions and variable values are expression trees evaluated by the
//! compiled bytecode VM (see [`crate::behavior::compile`]).

use serde::{Deserialize, Serialize};

use crate::model::component::ComponentId;

/// A set of authored behaviors compiled together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSheet {
    /// The behaviors, in authoring order.
    #[serde(default)]
    pub behaviors: Vec<BehaviorDef>,
}

/// One behavior: a trigger block plus the actions it runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorDef {
    /// Author-facing behavior identifier.
    pub id: String,
    /// The trigger block.
    pub trigger: TriggerDef,
    /// Action blocks run when the trigger fires, in order.
    #[serde(default)]
    pub actions: Vec<ActionDef>,
}

/// Trigger block kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TriggerDef {
    /// Fires once when the presentation starts.
    Startup,
    /// Fires when the named component is clicked.
    ComponentClick {
        /// Target component.
        component: ComponentId,
    },
    /// Fires when the named key is pressed.
    KeyPressed {
        /// Key name, e.g. `"ArrowRight"`.
        key: String,
    },
    /// Fires when media time enters the named component's active window.
    TimeWindowEnter {
        /// Target Timeable component.
        component: ComponentId,
    },
    /// Fires when the condition transitions from false to true.
    ConditionBecomesTrue {
        /// Watched expression.
        condition: ExprDef,
    },
}

/// Action block kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionDef {
    /// Start playback, optionally over a range.
    PlayMedia {
        /// Range start in seconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<f64>,
        /// Range end in seconds (exclusive).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<f64>,
    },
    /// Pause playback.
    PauseMedia,
    /// Stop playback and rewind.
    StopMedia,
    /// Seek to an absolute time.
    SetMediaTime {
        /// Target time in seconds.
        time: f64,
    },
    /// Clear a component's hidden flag.
    ShowComponent {
        /// Target Hideable component.
        component: ComponentId,
    },
    /// Set a component's hidden flag.
    HideComponent {
        /// Target Hideable component.
        component: ComponentId,
    },
    /// Flip a component's hidden flag.
    ToggleComponent {
        /// Target Hideable component.
        component: ComponentId,
    },
    /// Ask the host to navigate to a URL.
    OpenUrl {
        /// Target URL.
        url: String,
    },
    /// Assign an expression result to a variable.
    SetVariable {
        /// Variable name; module names are reserved.
        name: String,
        /// Value expression.
        value: ExprDef,
    },
    /// Append an expression result to a list variable.
    AppendToList {
        /// Variable name; created as an empty list when absent.
        name: String,
        /// Value expression.
        value: ExprDef,
    },
}

/// Expression tree used by conditions and variable values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExprDef {
    /// Numeric literal.
    Number {
        /// The literal.
        value: f64,
    },
    /// Boolean literal.
    Bool {
        /// The literal.
        value: bool,
    },
    /// String literal.
    Text {
        /// The literal.
        value: String,
    },
    /// Read a context variable.
    Variable {
        /// Variable name.
        name: String,
    },
    /// Current media time in seconds.
    MediaTime,
    /// Unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        expr: Box<ExprDef>,
    },
    /// Binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<ExprDef>,
        /// Right operand.
        rhs: Box<ExprDef>,
    },
}

/// Unary expression operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    /// Numeric negation.
    Neg,
    /// Boolean negation.
    Not,
}

/// Binary expression operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// Numeric addition.
    Add,
    /// Numeric subtraction.
    Sub,
    /// Numeric multiplication.
    Mul,
    /// Numeric division.
    Div,
    /// Equality on any value.
    Eq,
    /// Inequality on any value.
    Ne,
    /// Numeric less-than.
    Lt,
    /// Numeric less-or-equal.
    Le,
    /// Numeric greater-than.
    Gt,
    /// Numeric greater-or-equal.
    Ge,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
}
