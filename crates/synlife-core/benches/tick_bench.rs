use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use glam::Vec2;
use std::time::Duration;
use synlife_core::{Simulation, SimulationConfig};
use synlife_creature::{Action, EntityId, Observation, Policy};

const DT: f32 = 0.1;

/// Moves every creature and scans when the field reads high
struct Forager;

impl Policy for Forager {
    fn act(&mut self, _id: EntityId, observation: &Observation) -> Action {
        Action {
            move_intent: 1.0,
            turn_intent: observation.phi_gradient.x.clamp(-1.0, 1.0),
            scan: observation.phi > 0.3,
            reproduce: observation.energy > 0.8,
        }
    }
}

fn populated(capacity: usize) -> Simulation {
    let mut config = SimulationConfig::demo();
    config.population.capacity = capacity;
    config.population.initial_population = capacity;
    let mut sim = Simulation::new(config);
    sim.spawn_founders();
    let h = sim.config().arena.half_extent();
    for i in 0..capacity * 2 {
        let t = i as f32 / (capacity * 2) as f32;
        sim.place_food(Vec2::new(t * 2.0 * h - h, (t * 37.0).sin() * h), 10.0);
    }
    sim
}

fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(5));

    let steps: usize = std::env::var("SYNLIFE_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(100);

    for &capacity in &[20_usize, 100, 500] {
        group.bench_function(format!("steps{}_creatures{}", steps, capacity), |b| {
            b.iter_batched(
                || populated(capacity),
                |mut sim| {
                    for _ in 0..steps {
                        sim.tick(DT, &mut Forager);
                    }
                    sim
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_field_sampling(c: &mut Criterion) {
    let mut config = SimulationConfig::default();
    config.phi_field.enable_back_action = true;
    let mut sim = Simulation::new(config);
    for i in 0..16 {
        sim.field_mut()
            .trigger_back_action(Vec2::new(i as f32 * 3.0 - 24.0, 0.0));
    }

    c.bench_function("phi_field_gradient", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x = (x + 0.37) % 50.0;
            sim.field().sample_phi_gradient(Vec2::new(x - 25.0, 1.0), 0.5)
        });
    });
}

criterion_group!(benches, bench_ticks, bench_field_sampling);
criterion_main!(benches);
