//! Behavior graph compilation and the expression VM.
//!
//! Compilation resolves every trigger and action against the installed module
//! set and lowers expressions to stack bytecode, so that a behavior
//! referencing an unavailable module fails here rather than mid-playback.

use crate::behavior::context::{BehaviorContext, Module, ScriptValue};
use crate::behavior::model::{
    ActionDef, BehaviorDef, BehaviorSheet, BinaryOp, ExprDef, TriggerDef, UnaryOp,
};
use crate::foundation::error::{MetascoreError, MetascoreResult};
use crate::model::component::ComponentId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Op {
    PushConst(u16),
    LoadVar(u16),
    LoadTime,
    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Compiled expression: a flat op sequence over a constant pool and a
/// variable-name table.
#[derive(Clone, Debug, Default)]
pub struct Bytecode {
    pub(crate) ops: Vec<Op>,
    pub(crate) consts: Vec<ScriptValue>,
    pub(crate) var_names: Vec<String>,
}

#[derive(Clone, Debug)]
pub(crate) enum CompiledTrigger {
    Startup,
    Click(ComponentId),
    Key(String),
    TimeWindow(ComponentId),
    Condition(Bytecode),
}

#[derive(Clone, Debug)]
pub(crate) enum CompiledAction {
    PlayMedia { from: Option<f64>, to: Option<f64> },
    PauseMedia,
    StopMedia,
    SetMediaTime(f64),
    ShowComponent(ComponentId),
    HideComponent(ComponentId),
    ToggleComponent(ComponentId),
    OpenUrl(String),
    SetVariable { name: String, value: Bytecode },
    AppendToList { name: String, value: Bytecode },
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledBehavior {
    pub(crate) id: String,
    pub(crate) trigger: CompiledTrigger,
    pub(crate) actions: Vec<CompiledAction>,
}

/// A compiled behavior sheet, ready to bind to a runtime.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub(crate) units: Vec<CompiledBehavior>,
}

impl Program {
    /// Number of compiled behaviors.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the program has no behaviors.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Compile a behavior sheet against a context's installed modules.
pub fn compile(sheet: &BehaviorSheet, ctx: &BehaviorContext) -> MetascoreResult<Program> {
    let mut units = Vec::with_capacity(sheet.behaviors.len());
    for def in &sheet.behaviors {
        units.push(compile_behavior(def, ctx)?);
    }
    Ok(Program { units })
}

fn compile_behavior(def: &BehaviorDef, ctx: &BehaviorContext) -> MetascoreResult<CompiledBehavior> {
    let trigger = match &def.trigger {
        TriggerDef::Startup => CompiledTrigger::Startup,
        TriggerDef::ComponentClick { component } => {
            require_module(ctx, Module::App, &def.id)?;
            CompiledTrigger::Click(*component)
        }
        TriggerDef::KeyPressed { key } => {
            require_module(ctx, Module::Keyboard, &def.id)?;
            CompiledTrigger::Key(key.clone())
        }
        TriggerDef::TimeWindowEnter { component } => {
            require_module(ctx, Module::Media, &def.id)?;
            CompiledTrigger::TimeWindow(*component)
        }
        TriggerDef::ConditionBecomesTrue { condition } => {
            require_module(ctx, Module::Reactivity, &def.id)?;
            CompiledTrigger::Condition(compile_expr(condition, ctx)?)
        }
    };

    let mut actions = Vec::with_capacity(def.actions.len());
    for action in &def.actions {
        actions.push(compile_action(action, ctx, &def.id)?);
    }

    Ok(CompiledBehavior {
        id: def.id.clone(),
        trigger,
        actions,
    })
}

fn compile_action(
    action: &ActionDef,
    ctx: &BehaviorContext,
    behavior: &str,
) -> MetascoreResult<CompiledAction> {
    Ok(match action {
        ActionDef::PlayMedia { from, to } => {
            require_module(ctx, Module::Media, behavior)?;
            CompiledAction::PlayMedia {
                from: *from,
                to: *to,
            }
        }
        ActionDef::PauseMedia => {
            require_module(ctx, Module::Media, behavior)?;
            CompiledAction::PauseMedia
        }
        ActionDef::StopMedia => {
            require_module(ctx, Module::Media, behavior)?;
            CompiledAction::StopMedia
        }
        ActionDef::SetMediaTime { time } => {
            require_module(ctx, Module::Media, behavior)?;
            CompiledAction::SetMediaTime(*time)
        }
        ActionDef::ShowComponent { component } => {
            require_module(ctx, Module::App, behavior)?;
            CompiledAction::ShowComponent(*component)
        }
        ActionDef::HideComponent { component } => {
            require_module(ctx, Module::App, behavior)?;
            CompiledAction::HideComponent(*component)
        }
        ActionDef::ToggleComponent { component } => {
            require_module(ctx, Module::App, behavior)?;
            CompiledAction::ToggleComponent(*component)
        }
        ActionDef::OpenUrl { url } => {
            require_module(ctx, Module::App, behavior)?;
            CompiledAction::OpenUrl(url.clone())
        }
        ActionDef::SetVariable { name, value } => {
            check_assignable(ctx, name, behavior)?;
            CompiledAction::SetVariable {
                name: name.clone(),
                value: compile_expr(value, ctx)?,
            }
        }
        ActionDef::AppendToList { name, value } => {
            check_assignable(ctx, name, behavior)?;
            CompiledAction::AppendToList {
                name: name.clone(),
                value: compile_expr(value, ctx)?,
            }
        }
    })
}

fn require_module(ctx: &BehaviorContext, module: Module, behavior: &str) -> MetascoreResult<()> {
    if !ctx.is_installed(module) {
        return Err(MetascoreError::behavior(format!(
            "behavior '{behavior}' requires module '{}' which is not installed",
            module.name()
        )));
    }
    Ok(())
}

fn check_assignable(ctx: &BehaviorContext, name: &str, behavior: &str) -> MetascoreResult<()> {
    if ctx.is_reserved(name) {
        return Err(MetascoreError::behavior(format!(
            "behavior '{behavior}' assigns '{name}', a reserved module name"
        )));
    }
    Ok(())
}

/// Lower an expression tree to stack bytecode.
pub(crate) fn compile_expr(expr: &ExprDef, ctx: &BehaviorContext) -> MetascoreResult<Bytecode> {
    let mut bc = Bytecode::default();
    lower(expr, ctx, &mut bc)?;
    Ok(bc)
}

fn lower(expr: &ExprDef, ctx: &BehaviorContext, bc: &mut Bytecode) -> MetascoreResult<()> {
    match expr {
        ExprDef::Number { value } => push_const(bc, ScriptValue::Number(*value))?,
        ExprDef::Bool { value } => push_const(bc, ScriptValue::Bool(*value))?,
        ExprDef::Text { value } => push_const(bc, ScriptValue::Text(value.clone()))?,
        ExprDef::Variable { name } => {
            if ctx.is_reserved(name) {
                return Err(MetascoreError::behavior(format!(
                    "'{name}' is a reserved module name, not a variable"
                )));
            }
            let idx = match bc.var_names.iter().position(|n| n == name) {
                Some(i) => i,
                None => {
                    bc.var_names.push(name.clone());
                    bc.var_names.len() - 1
                }
            };
            let idx = u16::try_from(idx)
                .map_err(|_| MetascoreError::behavior("too many variables in one expression"))?;
            bc.ops.push(Op::LoadVar(idx));
        }
        ExprDef::MediaTime => bc.ops.push(Op::LoadTime),
        ExprDef::Unary { op, expr } => {
            lower(expr, ctx, bc)?;
            bc.ops.push(match op {
                UnaryOp::Neg => Op::Neg,
                UnaryOp::Not => Op::Not,
            });
        }
        ExprDef::Binary { op, lhs, rhs } => {
            lower(lhs, ctx, bc)?;
            lower(rhs, ctx, bc)?;
            bc.ops.push(match op {
                BinaryOp::Add => Op::Add,
                BinaryOp::Sub => Op::Sub,
                BinaryOp::Mul => Op::Mul,
                BinaryOp::Div => Op::Div,
                BinaryOp::Eq => Op::Eq,
                BinaryOp::Ne => Op::Ne,
                BinaryOp::Lt => Op::Lt,
                BinaryOp::Le => Op::Le,
                BinaryOp::Gt => Op::Gt,
                BinaryOp::Ge => Op::Ge,
                BinaryOp::And => Op::And,
                BinaryOp::Or => Op::Or,
            });
        }
    }
    Ok(())
}

fn push_const(bc: &mut Bytecode, value: ScriptValue) -> MetascoreResult<()> {
    let idx = u16::try_from(bc.consts.len())
        .map_err(|_| MetascoreError::behavior("too many constants in one expression"))?;
    bc.consts.push(value);
    bc.ops.push(Op::PushConst(idx));
    Ok(())
}

/// Execute compiled bytecode against a variable loader and the current media
/// time.
pub(crate) fn eval(
    bc: &Bytecode,
    load_var: impl Fn(&str) -> Option<ScriptValue>,
    media_time: f64,
) -> MetascoreResult<ScriptValue> {
    let mut stack: Vec<ScriptValue> = Vec::with_capacity(16);

    for op in &bc.ops {
        match op {
            Op::PushConst(idx) => {
                let c = bc
                    .consts
                    .get(*idx as usize)
                    .ok_or_else(|| MetascoreError::behavior("const index out of range"))?;
                stack.push(c.clone());
            }
            Op::LoadVar(idx) => {
                let name = bc
                    .var_names
                    .get(*idx as usize)
                    .ok_or_else(|| MetascoreError::behavior("variable index out of range"))?;
                let value = load_var(name).ok_or_else(|| {
                    MetascoreError::behavior(format!("undefined variable '{name}'"))
                })?;
                stack.push(value);
            }
            Op::LoadTime => stack.push(ScriptValue::Number(media_time)),

            Op::Neg => {
                let v = pop_number(&mut stack)?;
                stack.push(ScriptValue::Number(-v));
            }
            Op::Not => {
                let v = pop_bool(&mut stack)?;
                stack.push(ScriptValue::Bool(!v));
            }
            Op::Add => bin_number(&mut stack, |a, b| a + b)?,
            Op::Sub => bin_number(&mut stack, |a, b| a - b)?,
            Op::Mul => bin_number(&mut stack, |a, b| a * b)?,
            Op::Div => bin_number(&mut stack, |a, b| a / b)?,

            Op::Eq => bin_any(&mut stack, |a, b| a == b)?,
            Op::Ne => bin_any(&mut stack, |a, b| a != b)?,
            Op::Lt => bin_cmp(&mut stack, |a, b| a < b)?,
            Op::Le => bin_cmp(&mut stack, |a, b| a <= b)?,
            Op::Gt => bin_cmp(&mut stack, |a, b| a > b)?,
            Op::Ge => bin_cmp(&mut stack, |a, b| a >= b)?,

            Op::And => {
                let b = pop_bool(&mut stack)?;
                let a = pop_bool(&mut stack)?;
                stack.push(ScriptValue::Bool(a && b));
            }
            Op::Or => {
                let b = pop_bool(&mut stack)?;
                let a = pop_bool(&mut stack)?;
                stack.push(ScriptValue::Bool(a || b));
            }
        }
    }

    if stack.len() != 1 {
        return Err(MetascoreError::behavior(format!(
            "stack has {} values at end of program",
            stack.len()
        )));
    }
    stack
        .pop()
        .ok_or_else(|| MetascoreError::behavior("empty stack at end of program"))
}

fn pop_number(stack: &mut Vec<ScriptValue>) -> MetascoreResult<f64> {
    match stack.pop() {
        Some(ScriptValue::Number(v)) => Ok(v),
        Some(other) => Err(MetascoreError::behavior(format!(
            "expected a number, got {other:?}"
        ))),
        None => Err(MetascoreError::behavior("stack underflow")),
    }
}

fn pop_bool(stack: &mut Vec<ScriptValue>) -> MetascoreResult<bool> {
    match stack.pop() {
        Some(ScriptValue::Bool(v)) => Ok(v),
        Some(other) => Err(MetascoreError::behavior(format!(
            "expected a boolean, got {other:?}"
        ))),
        None => Err(MetascoreError::behavior("stack underflow")),
    }
}

fn bin_number(
    stack: &mut Vec<ScriptValue>,
    f: impl FnOnce(f64, f64) -> f64,
) -> MetascoreResult<()> {
    let b = pop_number(stack)?;
    let a = pop_number(stack)?;
    stack.push(ScriptValue::Number(f(a, b)));
    Ok(())
}

fn bin_cmp(
    stack: &mut Vec<ScriptValue>,
    f: impl FnOnce(f64, f64) -> bool,
) -> MetascoreResult<()> {
    let b = pop_number(stack)?;
    let a = pop_number(stack)?;
    stack.push(ScriptValue::Bool(f(a, b)));
    Ok(())
}

fn bin_any(
    stack: &mut Vec<ScriptValue>,
    f: impl FnOnce(&ScriptValue, &ScriptValue) -> bool,
) -> MetascoreResult<()> {
    let b = stack
        .pop()
        .ok_or_else(|| MetascoreError::behavior("stack underflow"))?;
    let a = stack
        .pop()
        .ok_or_else(|| MetascoreError::behavior("stack underflow"))?;
    stack.push(ScriptValue::Bool(f(&a, &b)));
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/compile.rs"]
mod tests;
