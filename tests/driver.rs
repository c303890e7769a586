use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use prodnet::analysis::log_diagnostics;
use prodnet::engine::{Driver, FirstChooser, RandomChooser, SimulationEngine};
use prodnet::net::io::read_net;
use prodnet::net::{Net, Place, Transition};
use prodnet::report::SimulationReport;

fn demo_net() -> Net {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/assembly_line.json");
    read_net(path).unwrap()
}

fn cycle() -> Net {
    let mut net = Net::empty();
    net.add_place(Place::new_with_capacity("a", "A", 1, 1));
    net.add_place(Place::new_with_capacity("b", "B", 0, 1));
    net.add_transition(Transition::new("t_ab", "AB"));
    net.add_transition(Transition::new("t_ba", "BA"));
    net.add_input_arc("a", "t_ab", 1);
    net.add_output_arc("t_ab", "b", 1);
    net.add_input_arc("b", "t_ba", 1);
    net.add_output_arc("t_ba", "a", 1);
    net
}

#[test]
fn assembly_line_runs_to_deadlock() {
    let net = demo_net();
    assert!(net.validate().is_ok());
    let diagnostics = log_diagnostics(&net);
    assert!(diagnostics.isolated_places.is_empty());
    assert_eq!(diagnostics.warnings.len(), 1);
    assert!(diagnostics.warnings[0].contains("finished-products"));

    let mut engine = SimulationEngine::new(net);
    assert!(engine.play());
    let mut driver = Driver::new(engine, FirstChooser);

    // 前段总是优先，缓冲区容量 8 截断了多余的 7 个托肯。
    assert_eq!(driver.run_for(1000), 46);
    let engine = driver.into_engine();
    assert!(!engine.simulation_state().is_running());

    let marking = engine.marking();
    assert_eq!(marking.tokens("raw-materials"), Some(0));
    assert_eq!(marking.tokens("intermediate-buffer"), Some(0));
    assert_eq!(marking.tokens("finished-products"), Some(8));
    assert_eq!(marking.tokens("station-1-ready"), Some(1));
    assert_eq!(marking.tokens("station-2-ready"), Some(1));

    let metrics = engine.metrics();
    assert_eq!(metrics.total_produced, 23);
    assert_eq!(metrics.efficiency, 50.0);
    assert_eq!(metrics.average_wait_time, 0.0);
    assert_eq!(
        metrics.bottlenecks,
        vec![
            "raw-materials",
            "station-1-working",
            "intermediate-buffer",
            "station-2-working"
        ]
    );

    let analysis = engine.analyze();
    assert!(analysis.is_live);
    assert!(analysis.is_bounded);
    assert!(analysis.has_deadlock);
    assert!(analysis.conflicts.is_empty());
    assert_eq!(engine.fire_counts()["start-processing-1"], 15);
    assert_eq!(engine.fire_counts()["finish-processing-2"], 8);

    let report = SimulationReport::capture(&engine);
    assert_eq!(report.step, 46);
    assert_eq!(report.history_len, 46);
    assert!(report.enabled.is_empty());
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut engine = SimulationEngine::new(demo_net());
        assert!(engine.play());
        let mut driver = Driver::new(engine, RandomChooser::seeded(seed));
        let fired = driver.run_for(40);
        (fired, driver.engine().marking())
    };
    assert_eq!(run(17), run(17));
}

#[tokio::test]
async fn run_stops_on_deadlock() {
    let mut net = Net::empty();
    net.add_place(Place::new("src", "Source", 3));
    net.add_place(Place::new("sink", "Sink", 0));
    net.add_transition(Transition::new("move", "Move"));
    net.add_input_arc("src", "move", 1);
    net.add_output_arc("move", "sink", 1);

    let mut engine = SimulationEngine::new(net);
    engine.set_speed(0);
    assert!(engine.play());

    let (_tx, rx) = watch::channel(false);
    let mut driver = Driver::new(engine, FirstChooser);
    assert_eq!(driver.run(rx).await, 3);
    assert!(!driver.engine().simulation_state().is_running());
    assert_eq!(driver.engine().marking().tokens("sink"), Some(3));
}

#[tokio::test]
async fn stop_signal_cancels_pending_tick() {
    let mut engine = SimulationEngine::new(cycle());
    engine.set_speed(60_000);
    assert!(engine.play());

    let (tx, rx) = watch::channel(false);
    let mut driver = Driver::new(engine, FirstChooser);
    let (fired, _) = tokio::join!(driver.run(rx), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send(true).unwrap();
    });

    assert_eq!(fired, 0);
    assert!(!driver.engine().simulation_state().is_running());
    assert_eq!(driver.engine().simulation_state().step(), 0);
}

#[tokio::test]
async fn dropped_sender_stops_the_loop() {
    let mut engine = SimulationEngine::new(cycle());
    assert!(engine.play());

    let (tx, rx) = watch::channel(false);
    drop(tx);
    let mut driver = Driver::new(engine, FirstChooser);
    assert_eq!(driver.run(rx).await, 0);
    assert!(!driver.engine().simulation_state().is_running());
}

#[tokio::test]
async fn run_is_idle_when_not_playing() {
    let engine = SimulationEngine::new(cycle());
    let (_tx, rx) = watch::channel(false);
    let mut driver = Driver::new(engine, FirstChooser);
    assert_eq!(driver.run(rx).await, 0);
    assert_eq!(driver.engine().simulation_state().step(), 0);
}
