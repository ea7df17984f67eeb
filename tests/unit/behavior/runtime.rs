use super::*;
use crate::behavior::compile::compile;
use crate::behavior::context::Module;
use crate::behavior::model::{ActionDef, BehaviorDef, BehaviorSheet, BinaryOp, ExprDef, TriggerDef};

struct StubMedia {
    time: f64,
    playing: bool,
}

impl MediaTransport for StubMedia {
    fn current_time(&self) -> f64 {
        self.time
    }
    fn duration(&self) -> f64 {
        60.0
    }
    fn seek(&mut self, time: f64) {
        self.time = time;
    }
    fn play(&mut self) {
        self.playing = true;
    }
    fn pause(&mut self) {
        self.playing = false;
    }
    fn is_playing(&self) -> bool {
        self.playing
    }
}

struct Fixture {
    store: ComponentStore,
    cues: CueRuntime,
    controller: MediaController,
    media: StubMedia,
    commands: Vec<HostCommand>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: ComponentStore::new().unwrap(),
            cues: CueRuntime::new(),
            controller: MediaController::new(),
            media: StubMedia {
                time: 0.0,
                playing: false,
            },
            commands: Vec::new(),
        }
    }

    fn world(&mut self) -> World<'_> {
        World {
            store: &mut self.store,
            cues: &mut self.cues,
            controller: &mut self.controller,
            media: &mut self.media,
            commands: &mut self.commands,
        }
    }
}

fn runtime_for(sheet: BehaviorSheet) -> BehaviorRuntime {
    let ctx = BehaviorContext::with_all_modules();
    let program = compile(&sheet, &ctx).unwrap();
    BehaviorRuntime::new(program, ctx)
}

fn set_var(name: &str, value: f64) -> ActionDef {
    ActionDef::SetVariable {
        name: name.to_owned(),
        value: ExprDef::Number { value },
    }
}

#[test]
fn startup_behaviors_run_exactly_once() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "init".to_owned(),
            trigger: TriggerDef::Startup,
            actions: vec![ActionDef::OpenUrl {
                url: "about:start".to_owned(),
            }],
        }],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();

    rt.on_startup(&mut fx.world());
    rt.on_startup(&mut fx.world());
    assert_eq!(fx.commands.len(), 1);
}

#[test]
fn startup_variables_land_in_the_context() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "init".to_owned(),
            trigger: TriggerDef::Startup,
            actions: vec![set_var("chapter", 3.0)],
        }],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();
    rt.on_startup(&mut fx.world());
    assert_eq!(
        rt.context().variable("chapter"),
        Some(&ScriptValue::Number(3.0))
    );
}

#[test]
fn click_toggles_a_component() {
    let mut fx = Fixture::new();
    let block = fx
        .store
        .insert(serde_json::json!({"type": "Block"}))
        .unwrap()
        .id;

    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "toggle".to_owned(),
            trigger: TriggerDef::ComponentClick { component: block },
            actions: vec![ActionDef::ToggleComponent { component: block }],
        }],
    };
    let mut rt = runtime_for(sheet);
    rt.on_startup(&mut fx.world());

    rt.on_click(&mut fx.world(), block);
    assert_eq!(fx.store.get(block).unwrap().hidden, Some(true));
    rt.on_click(&mut fx.world(), block);
    assert_eq!(fx.store.get(block).unwrap().hidden, Some(false));
}

#[test]
fn key_press_starts_ranged_playback() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "jump".to_owned(),
            trigger: TriggerDef::KeyPressed {
                key: "ArrowRight".to_owned(),
            },
            actions: vec![ActionDef::PlayMedia {
                from: Some(5.0),
                to: Some(8.0),
            }],
        }],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();
    rt.on_startup(&mut fx.world());

    rt.on_key(&mut fx.world(), "ArrowRight");
    assert!(fx.media.playing);
    assert_eq!(fx.media.time, 5.0);
}

#[test]
fn time_window_enter_edge_triggers() {
    let mut fx = Fixture::new();
    let page = fx
        .store
        .insert(serde_json::json!({"type": "Page", "start-time": 5.0, "end-time": 10.0}))
        .unwrap()
        .id;

    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "enter".to_owned(),
            trigger: TriggerDef::TimeWindowEnter { component: page },
            actions: vec![ActionDef::OpenUrl {
                url: "about:enter".to_owned(),
            }],
        }],
    };
    let mut rt = runtime_for(sheet);
    rt.on_startup(&mut fx.world());

    for t in [4.0, 5.1, 6.0] {
        fx.media.time = t;
        rt.on_time_update(&mut fx.world());
    }
    assert_eq!(fx.commands.len(), 1, "fires on entry, not per tick");

    // Leaving and re-entering fires again.
    fx.media.time = 12.0;
    rt.on_time_update(&mut fx.world());
    fx.media.time = 6.0;
    rt.on_time_update(&mut fx.world());
    assert_eq!(fx.commands.len(), 2);
}

#[test]
fn conditions_fire_on_the_false_to_true_edge() {
    let sheet = BehaviorSheet {
        behaviors: vec![
            BehaviorDef {
                id: "arm".to_owned(),
                trigger: TriggerDef::Startup,
                actions: vec![set_var("go", 0.0)],
            },
            BehaviorDef {
                id: "watch".to_owned(),
                trigger: TriggerDef::ConditionBecomesTrue {
                    condition: ExprDef::Binary {
                        op: BinaryOp::Eq,
                        lhs: Box::new(ExprDef::Variable {
                            name: "go".to_owned(),
                        }),
                        rhs: Box::new(ExprDef::Number { value: 1.0 }),
                    },
                },
                actions: vec![ActionDef::OpenUrl {
                    url: "about:go".to_owned(),
                }],
            },
            BehaviorDef {
                id: "set".to_owned(),
                trigger: TriggerDef::KeyPressed {
                    key: "g".to_owned(),
                },
                actions: vec![set_var("go", 1.0)],
            },
            BehaviorDef {
                id: "unset".to_owned(),
                trigger: TriggerDef::KeyPressed {
                    key: "u".to_owned(),
                },
                actions: vec![set_var("go", 0.0)],
            },
        ],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();
    rt.on_startup(&mut fx.world());
    assert_eq!(fx.commands.len(), 0);

    rt.on_key(&mut fx.world(), "g");
    rt.flush(&mut fx.world());
    assert_eq!(fx.commands.len(), 1);

    // Still true: no re-fire without a falling edge.
    rt.flush(&mut fx.world());
    rt.notify_data_changed();
    rt.flush(&mut fx.world());
    assert_eq!(fx.commands.len(), 1);

    rt.on_key(&mut fx.world(), "u");
    rt.flush(&mut fx.world());
    rt.on_key(&mut fx.world(), "g");
    rt.flush(&mut fx.world());
    assert_eq!(fx.commands.len(), 2);
}

#[test]
fn append_to_list_builds_a_list_variable() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "collect".to_owned(),
            trigger: TriggerDef::KeyPressed {
                key: "a".to_owned(),
            },
            actions: vec![ActionDef::AppendToList {
                name: "seen".to_owned(),
                value: ExprDef::MediaTime,
            }],
        }],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();
    rt.on_startup(&mut fx.world());

    fx.media.time = 1.0;
    rt.on_key(&mut fx.world(), "a");
    fx.media.time = 2.0;
    rt.on_key(&mut fx.world(), "a");

    assert_eq!(
        rt.context().variable("seen"),
        Some(&ScriptValue::List(vec![
            ScriptValue::Number(1.0),
            ScriptValue::Number(2.0)
        ]))
    );
}

#[test]
fn reset_tears_down_watchers_and_is_idempotent() {
    let sheet = BehaviorSheet {
        behaviors: vec![BehaviorDef {
            id: "watch".to_owned(),
            trigger: TriggerDef::ConditionBecomesTrue {
                condition: ExprDef::Bool { value: true },
            },
            actions: vec![ActionDef::OpenUrl {
                url: "about:fire".to_owned(),
            }],
        }],
    };
    let mut rt = runtime_for(sheet);
    let mut fx = Fixture::new();

    // Safe with zero watchers, before startup ever ran.
    rt.reset();

    rt.on_startup(&mut fx.world());
    assert_eq!(rt.watcher_count(), 1);
    assert_eq!(fx.commands.len(), 1);

    rt.reset();
    rt.reset();
    assert_eq!(rt.watcher_count(), 0);

    rt.notify_data_changed();
    rt.flush(&mut fx.world());
    assert_eq!(fx.commands.len(), 1, "no watcher survives reset");

    // The runtime can be started again after a reset.
    rt.on_startup(&mut fx.world());
    assert_eq!(rt.watcher_count(), 1);
    assert_eq!(fx.commands.len(), 2);
}

#[test]
fn module_surface_is_the_whitelist() {
    let ctx = BehaviorContext::with_all_modules();
    for module in Module::ALL {
        assert!(ctx.is_installed(module));
    }
}
