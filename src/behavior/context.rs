//! Behavior execution context: whitelisted modules and variable scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{MetascoreError, MetascoreResult};

/// Value manipulated by behavior variables and expressions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptValue {
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// String.
    Text(String),
    /// Ordered list.
    List(Vec<ScriptValue>),
}

impl ScriptValue {
    /// Numeric view, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Condition truthiness: false/zero/empty are falsy, everything else
    /// truthy.
    pub fn truthy(&self) -> bool {
        match self {
            ScriptValue::Bool(b) => *b,
            ScriptValue::Number(n) => *n != 0.0,
            ScriptValue::Text(s) => !s.is_empty(),
            ScriptValue::List(l) => !l.is_empty(),
        }
    }
}

/// Whitelisted modules installable into a behavior context.
///
/// Each module reserves its name against user variables and gates the
/// trigger/action kinds that proxy to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// Component queries, visibility actions, URL navigation.
    App,
    /// Media transport and ranged playback.
    Media,
    /// Key-press triggers.
    Keyboard,
    /// Condition watchers.
    Reactivity,
}

impl Module {
    /// Every module, in installation order.
    pub const ALL: [Module; 4] = [Module::App, Module::Media, Module::Keyboard, Module::Reactivity];

    /// The reserved global name of this module.
    pub fn name(self) -> &'static str {
        match self {
            Module::App => "app",
            Module::Media => "media",
            Module::Keyboard => "keyboard",
            Module::Reactivity => "reactivity",
        }
    }
}

/// Execution context for compiled behaviors.
///
/// Holds the installed module set and the user variable scope. Installing a
/// module reserves its name; a variable may never shadow a module.
#[derive(Clone, Debug, Default)]
pub struct BehaviorContext {
    installed: Vec<Module>,
    vars: BTreeMap<String, ScriptValue>,
}

impl BehaviorContext {
    /// An empty context with no modules installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with every module installed.
    pub fn with_all_modules() -> Self {
        let mut ctx = Self::new();
        for module in Module::ALL {
            // Installation into a fresh scope cannot collide.
            let _ = ctx.install(module);
        }
        ctx
    }

    /// Install a module, reserving its name against the variable scope.
    pub fn install(&mut self, module: Module) -> MetascoreResult<()> {
        if self.vars.contains_key(module.name()) {
            return Err(MetascoreError::behavior(format!(
                "cannot install module '{}': a variable already uses the name",
                module.name()
            )));
        }
        if !self.installed.contains(&module) {
            self.installed.push(module);
        }
        Ok(())
    }

    /// Whether `module` has been installed.
    pub fn is_installed(&self, module: Module) -> bool {
        self.installed.contains(&module)
    }

    /// Whether `name` is reserved by an installed module.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.installed.iter().any(|m| m.name() == name)
    }

    /// Assign a variable, rejecting reserved names.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: ScriptValue,
    ) -> MetascoreResult<()> {
        let name = name.into();
        if self.is_reserved(&name) {
            return Err(MetascoreError::behavior(format!(
                "'{name}' is a reserved module name"
            )));
        }
        self.vars.insert(name, value);
        Ok(())
    }

    /// Read a variable.
    pub fn variable(&self, name: &str) -> Option<&ScriptValue> {
        self.vars.get(name)
    }

    /// Clear the variable scope, keeping installed modules.
    pub fn clear_variables(&mut self) {
        self.vars.clear();
    }
}
