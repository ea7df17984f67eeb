use super::*;

fn num(value: f64) -> ExprDef {
    ExprDef::Number { value }
}

fn binary(op: BinaryOp, lhs: ExprDef, rhs: ExprDef) -> ExprDef {
    ExprDef::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn eval_expr(expr: &ExprDef, time: f64) -> MetascoreResult<ScriptValue> {
    let ctx = BehaviorContext::with_all_modules();
    let bc = compile_expr(expr, &ctx)?;
    eval(&bc, |_| None, time)
}

#[test]
fn arithmetic_lowers_and_evaluates() {
    let expr = binary(
        BinaryOp::Mul,
        binary(BinaryOp::Add, num(2.0), num(3.0)),
        num(4.0),
    );
    assert_eq!(eval_expr(&expr, 0.0).unwrap(), ScriptValue::Number(20.0));
}

#[test]
fn media_time_is_read_through_load_time() {
    let expr = binary(BinaryOp::Ge, ExprDef::MediaTime, num(5.0));
    assert_eq!(eval_expr(&expr, 6.0).unwrap(), ScriptValue::Bool(true));
    assert_eq!(eval_expr(&expr, 4.0).unwrap(), ScriptValue::Bool(false));
}

#[test]
fn variables_resolve_through_the_loader() {
    let ctx = BehaviorContext::with_all_modules();
    let expr = binary(
        BinaryOp::Add,
        ExprDef::Variable {
            name: "count".to_owned(),
        },
        num(1.0),
    );
    let bc = compile_expr(&expr, &ctx).unwrap();

    let loaded = eval(
        &bc,
        |name| (name == "count").then_some(ScriptValue::Number(9.0)),
        0.0,
    )
    .unwrap();
    assert_eq!(loaded, ScriptValue::Number(10.0));

    let err = eval(&bc, |_| None, 0.0).unwrap_err();
    assert!(err.to_string().contains("undefined variable"));
}

#[test]
fn reserved_names_cannot_be_read_as_variables() {
    let ctx = BehaviorContext::with_all_modules();
    let expr = ExprDef::Variable {
        name: "media".to_owned(),
    };
    let err = compile_expr(&expr, &ctx).unwrap_err();
    assert!(matches!(err, MetascoreError::Behavior(_)));
}

#[test]
fn equality_works_on_text() {
    let expr = binary(
        BinaryOp::Eq,
        ExprDef::Text {
            value: "intro".to_owned(),
        },
        ExprDef::Text {
            value: "intro".to_owned(),
        },
    );
    assert_eq!(eval_expr(&expr, 0.0).unwrap(), ScriptValue::Bool(true));
}

#[test]
fn type_mismatches_surface_as_behavior_errors() {
    let expr = binary(
        BinaryOp::Add,
        num(1.0),
        ExprDef::Bool { value: true },
    );
    let err = eval_expr(&expr, 0.0).unwrap_err();
    assert!(matches!(err, MetascoreError::Behavior(_)));
}

#[test]
fn actions_require_their_module_at_compile_time() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "b1".to_owned(),
            trigger: TriggerDef::Startup,
            actions: vec![ActionDef::PlayMedia {
                from: None,
                to: None,
            }],
        }],
    };

    let bare = BehaviorContext::new();
    let err = compile(&sheet, &bare).unwrap_err();
    assert!(err.to_string().contains("module 'media'"));

    let full = BehaviorContext::with_all_modules();
    assert_eq!(compile(&sheet, &full).unwrap().len(), 1);
}

#[test]
fn triggers_require_their_module_at_compile_time() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "b1".to_owned(),
            trigger: TriggerDef::KeyPressed {
                key: "ArrowRight".to_owned(),
            },
            actions: Vec::new(),
        }],
    };
    let bare = BehaviorContext::new();
    let err = compile(&sheet, &bare).unwrap_err();
    assert!(err.to_string().contains("module 'keyboard'"));
}

#[test]
fn assigning_a_reserved_name_is_a_compile_error() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "b1".to_owned(),
            trigger: TriggerDef::Startup,
            actions: vec![ActionDef::SetVariable {
                name: "app".to_owned(),
                value: num(1.0),
            }],
        }],
    };
    let err = compile(&sheet, &BehaviorContext::with_all_modules()).unwrap_err();
    assert!(err.to_string().contains("reserved module name"));
}

#[test]
fn behavior_sheets_deserialize_from_authored_json() {
    let sheet: BehaviorSheet = serde_json::from_value(serde_json::json!({
        "behaviors": [{
            "id": "goto-chapter",
            "trigger": {"kind": "component-click", "component": "8c8c98c5-2291-4d4d-bb0e-8657dcbc1c5e"},
            "actions": [
                {"kind": "play-media", "from": 5.0, "to": 8.0},
                {"kind": "set-variable", "name": "chapter", "value": {"kind": "number", "value": 2.0}}
            ]
        }]
    }))
    .unwrap();

    assert_eq!(sheet.behaviors.len(), 1);
    assert!(matches!(
        sheet.behaviors[0].trigger,
        TriggerDef::ComponentClick { .. }
    ));
    assert!(matches!(
        sheet.behaviors[0].actions[0],
        ActionDef::PlayMedia {
            from: Some(_),
            to: Some(_)
        }
    ));
}
