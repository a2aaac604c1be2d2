mod common;

use folio3d::config::{SceneConfig, Variant};
use folio3d::headless::{self, HeadlessConfig, RunOptions};
use folio3d::scripted_input::ScriptedInputPlayer;
use folio3d_testkit::{read_trace, MemorySink};
use serde_json::json;

const OPEN_MENU: &str = r#"{
    "steps": [
        { "duration": 0.1, "pointer": { "kind": "move", "x": 640.0, "y": 360.0 } },
        { "duration": 3.0, "pointer": { "kind": "click", "x": 640.0, "y": 360.0 } }
    ]
}"#;

#[test]
fn scripted_click_opens_the_menu_and_traces_it() {
    let controller = common::controller(Variant::Menu);
    let script = ScriptedInputPlayer::from_json(OPEN_MENU).unwrap();
    let mut sink = MemorySink::new();

    let summary = headless::run_with(
        controller,
        Some(script),
        RunOptions {
            frames: 600,
            viewport: (1280, 720),
            exit_when_script_finished: true,
        },
        &mut sink,
    )
    .unwrap();

    assert_eq!(summary.phase, "open");
    assert!(summary.frames < 600, "script end should stop the run");
    assert!(summary.physics_steps > 0);

    let hover = sink.of_kind("hover_changed").next().unwrap();
    assert_eq!(hover.payload["name"], json!("menu_sphere"));
    assert_eq!(sink.of_kind("chain_triggered").count(), 1);
    assert_eq!(sink.of_kind("stage_started").count(), 5);
    let completed = sink.of_kind("chain_completed").next().unwrap();
    assert_eq!(completed.payload, json!({ "chain": "menu", "reverse": false }));

    let last = sink.events.last().unwrap();
    assert_eq!(last.kind, "summary");
    assert_eq!(last.payload["phase"], json!("open"));
}

#[test]
fn run_writes_a_jsonl_trace() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    std::fs::write(&script, OPEN_MENU).unwrap();
    let trace = dir.path().join("out/trace.jsonl");

    let mut scene = SceneConfig::default();
    scene.assets.root = dir.path().join("no-assets");
    let summary = headless::run(HeadlessConfig {
        scene,
        variant: Variant::Pulse,
        frames: 30,
        width: 1280,
        height: 720,
        scripted_input: Some(script),
        trace: Some(trace.clone()),
        exit_when_script_finished: false,
    })
    .unwrap();
    assert_eq!(summary.frames, 30);
    assert_eq!(summary.phase, "pulse");

    let records = read_trace(&trace).unwrap();
    let halved: Vec<_> = records.iter().filter(|r| r.kind == "scale_halved").collect();
    assert_eq!(halved.len(), 1);
    assert_eq!(halved[0].payload["scale"], json!(0.5));
    assert_eq!(records.last().unwrap().kind, "summary");
}

#[test]
fn missing_script_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = headless::run(HeadlessConfig {
        scene: SceneConfig::default(),
        variant: Variant::Menu,
        frames: 1,
        width: 320,
        height: 240,
        scripted_input: Some(dir.path().join("missing.json")),
        trace: None,
        exit_when_script_finished: false,
    });
    assert!(result.is_err());
}
