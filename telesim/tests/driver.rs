use std::{
    thread,
    time::{Duration, Instant},
};
use telesim::{NodeId, PacketRate, SimContext, SimulationConfig, SimulationError};

const INTERVAL: Duration = Duration::from_millis(5);

fn id(label: &str) -> NodeId {
    label.parse().unwrap()
}

/// wait until the driver executed at least `steps` ticks
fn wait_for_steps(context: &SimContext, steps: u64) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while context.stats().unwrap().simulation_step.into_u64() < steps {
        assert!(Instant::now() < deadline, "driver did not tick in time");
        thread::sleep(INTERVAL);
    }
}

#[test]
fn stopped_driver_does_not_tick() {
    let context = SimContext::new(SimulationConfig::default(), INTERVAL).unwrap();

    thread::sleep(INTERVAL * 10);

    let stats = context.stats().unwrap();
    assert!(!stats.is_running);
    assert_eq!(stats.simulation_step.into_u64(), 0);

    context.shutdown().unwrap();
}

#[test]
fn running_driver_ticks_until_paused() {
    let context = SimContext::new(SimulationConfig::default(), INTERVAL).unwrap();

    context.start().unwrap();
    wait_for_steps(&context, 3);
    context.pause().unwrap();

    let paused = context.stats().unwrap();
    assert!(!paused.is_running);
    assert!(
        paused.summary.total_packets_transmitted <= paused.summary.total_packets_generated
    );

    thread::sleep(INTERVAL * 10);
    assert_eq!(
        context.stats().unwrap().simulation_step,
        paused.simulation_step
    );

    context.shutdown().unwrap();
}

#[test]
fn manual_ticks_and_reset() {
    let context = SimContext::new(SimulationConfig::default(), INTERVAL).unwrap();

    let first = context.tick().unwrap();
    let second = context.tick().unwrap();
    assert_eq!(first.requested, 17);
    assert_eq!(second.step.into_u64(), 2);

    assert!(context.advance_time_slot().unwrap());
    assert_eq!(context.stats().unwrap().current_time, "04:00");

    context.reset().unwrap();
    let stats = context.stats().unwrap();
    assert_eq!(stats.simulation_step.into_u64(), 0);
    assert_eq!(stats.current_time, "00:00");
    assert_eq!(stats.summary.total_packets_generated, 0);

    context.shutdown().unwrap();
}

#[test]
fn administrative_updates() {
    let context = SimContext::new(SimulationConfig::default(), INTERVAL).unwrap();

    context
        .set_node_rate(id("A"), PacketRate::new(50))
        .unwrap();
    context.set_link_capacity(id("A"), id("C"), 10).unwrap();

    let report = context.tick().unwrap();
    // 00:00 slot with A at 50: 50 + 3 + 4 + 3 + 2
    assert_eq!(report.requested, 62);

    let stats = context.stats().unwrap();
    let a_c = stats
        .links
        .iter()
        .find(|link| link.from == id("A") && link.to == id("C"))
        .unwrap();
    assert_eq!(a_c.capacity, 10);
    assert!(a_c.current_load <= 10);

    let error = context
        .set_node_rate(id("Z"), PacketRate::new(1))
        .unwrap_err();
    assert_eq!(
        error.downcast_ref::<SimulationError>(),
        Some(&SimulationError::NodeNotFound { node: id("Z") })
    );

    let error = context
        .set_node_rate(id("A"), PacketRate::new(u64::MAX))
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SimulationError>(),
        Some(SimulationError::InvalidRate { .. })
    ));
    // the rejected rate never reaches a tick
    assert_eq!(context.tick().unwrap().requested, 62);

    let error = context.set_link_capacity(id("A"), id("B"), 0).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SimulationError>(),
        Some(SimulationError::InvalidCapacity(_))
    ));

    context.shutdown().unwrap();
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(SimContext::new(SimulationConfig::empty(), INTERVAL).is_err());
    assert!(SimContext::new(SimulationConfig::default(), Duration::ZERO).is_err());
}

#[test]
fn concurrent_readers_see_completed_ticks() {
    let context = SimContext::new(SimulationConfig::default(), INTERVAL).unwrap();
    context.start().unwrap();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..20 {
                    let stats = context.stats().unwrap();
                    let generated: u64 =
                        stats.nodes.iter().map(|node| node.packets_generated).sum();
                    let received: u64 = stats.nodes.iter().map(|node| node.packets_received).sum();
                    assert!(received <= generated);
                    assert!(
                        stats.summary.total_packets_transmitted
                            <= stats.summary.total_packets_generated
                    );
                    thread::sleep(Duration::from_millis(1));
                }
            });
        }
    });

    context.shutdown().unwrap();
}
