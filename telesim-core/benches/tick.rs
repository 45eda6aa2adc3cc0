use criterion::{
    BenchmarkGroup, Criterion, Throughput, black_box, criterion_group, criterion_main,
    measurement::WallTime,
};
use telesim_core::{
    config::SimulationConfig,
    measure::{Capacity, PacketRate},
    node::NodeId,
    simulation::Simulation,
};

const RATE: u64 = 20;
const CAPACITY: u64 = 50;

fn id(index: usize) -> NodeId {
    NodeId::new(format!("N{index}")).unwrap()
}

fn default_day(c: &mut Criterion) {
    let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();

    // busiest slot of the default day
    for _ in 0..3 {
        simulation.advance_time_slot();
    }

    c.bench_function("tick_default_peak", |b| {
        b.iter(|| black_box(simulation.tick()))
    });
    c.bench_function("stats_default_peak", |b| {
        b.iter(|| black_box(simulation.stats()))
    });
}

fn bench_ring_size(group: &mut BenchmarkGroup<'_, WallTime>, size: usize) {
    // a ring with a chord every 4 nodes
    let mut config = SimulationConfig::empty();
    for index in 0..size {
        config.add_node(id(index));
    }
    let capacity = Capacity::new(CAPACITY).unwrap();
    for index in 0..size {
        config
            .configure_link(id(index), id((index + 1) % size))
            .set_capacity(capacity)
            .apply();
        if index % 4 == 0 {
            config
                .configure_link(id(index), id((index + size / 2) % size))
                .set_capacity(capacity)
                .apply();
        }
    }
    let mut slot = config.add_time_slot("peak");
    for index in 0..size {
        slot = slot.set_rate(id(index), PacketRate::new(RATE));
    }
    slot.apply();

    let mut simulation = Simulation::new(config).unwrap();

    let num_packets = size as u64 * RATE;
    group.throughput(Throughput::Elements(num_packets));
    group.bench_function(format!("{size} nodes"), |b| {
        b.iter(|| black_box(simulation.tick()))
    });
}

fn ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_ring");

    for size in [10, 50, 100, 200] {
        bench_ring_size(&mut group, size);
    }

    group.finish();
}

criterion_group!(benches, default_day, ring);
criterion_main!(benches);
