use std::time::Duration;

use ripsim::algorithms::dijkstra;
use ripsim::config::{LinkConfig, TopologyConfig};
use ripsim::live::{self, LiveConfig};
use ripsim::sim::Emulator;

fn links(pairs: &[(usize, usize, u32)]) -> Vec<LinkConfig> {
    pairs
        .iter()
        .map(|&(a, b, cost)| LinkConfig { a, b, cost })
        .collect()
}

fn ring(n: usize) -> TopologyConfig {
    TopologyConfig {
        nodes: n,
        links: (0..n)
            .map(|i| LinkConfig {
                a: i,
                b: (i + 1) % n,
                cost: (i as u32 % 3) + 1,
            })
            .collect(),
    }
}

fn mesh() -> TopologyConfig {
    TopologyConfig {
        nodes: 6,
        links: links(&[
            (0, 1, 4),
            (0, 2, 9),
            (1, 2, 1),
            (1, 3, 8),
            (2, 4, 3),
            (3, 4, 2),
            (3, 5, 6),
            (4, 5, 11),
        ]),
    }
}

fn assert_matches_reference(config: &TopologyConfig, seed: u64) {
    let topology = config.build().unwrap();
    let reference = dijkstra::all_pairs(&topology);

    let mut emulator = Emulator::new(&topology, seed);
    emulator.run();

    for (label, table) in emulator.tables().iter().enumerate() {
        assert_eq!(
            table.self_row(),
            &reference[label][..],
            "node {label} self row diverges from the centralized reference"
        );
    }
}

#[test]
fn sim_converges_to_shortest_paths_on_classic_topology() {
    assert_matches_reference(&TopologyConfig::classic(), 0);
}

#[test]
fn sim_converges_on_ring_and_mesh() {
    assert_matches_reference(&ring(8), 5);
    assert_matches_reference(&mesh(), 5);
}

#[test]
fn delivery_order_does_not_change_the_outcome() {
    let topology = mesh().build().unwrap();
    let mut first = Emulator::new(&topology, 0);
    first.run();
    let baseline = first.into_tables();

    // Each seed perturbs timestamps differently, so packets are
    // delivered in a different order; the converged tables must not
    // care.
    for seed in 1..12 {
        let mut emulator = Emulator::new(&topology, seed);
        emulator.run();
        assert_eq!(
            emulator.into_tables(),
            baseline,
            "seed {seed} produced different converged tables"
        );
    }
}

#[test]
fn converged_rows_are_never_more_optimistic_than_reality() {
    let topology = ring(7).build().unwrap();
    let reference = dijkstra::all_pairs(&topology);

    let mut emulator = Emulator::new(&topology, 9);
    emulator.run();

    for (label, table) in emulator.tables().iter().enumerate() {
        for dest in 0..topology.num_nodes() {
            assert!(
                table.cost_to(dest) >= reference[label][dest],
                "node {label} claims a cost to {dest} below the physical optimum"
            );
        }
    }
}

#[test]
fn sim_terminates_on_a_partitioned_topology() {
    // Two islands; rumors must stop flowing once each island settles.
    let config = TopologyConfig {
        nodes: 5,
        links: links(&[(0, 1, 2), (1, 2, 2), (3, 4, 1)]),
    };
    let topology = config.build().unwrap();
    let mut emulator = Emulator::new(&topology, 4);
    emulator.run();

    let tables = emulator.tables();
    assert_eq!(tables[0].cost_to(2), 4);
    assert_eq!(tables[0].cost_to(3), topology.infinity());
    assert_eq!(tables[4].cost_to(3), 1);
    assert_eq!(tables[4].cost_to(0), topology.infinity());
}

#[tokio::test]
async fn live_mode_reproduces_the_classic_scenario() {
    let topology = TopologyConfig::classic().build().unwrap();
    let config = LiveConfig {
        base_port: 24600,
        quiet_period: Duration::from_millis(400),
    };
    let tables = live::run(&topology, &config).await.unwrap();

    assert_eq!(tables[0].self_row(), &[0, 1, 2, 4]);
    assert_eq!(tables[2].self_row(), &[2, 1, 0, 2]);
}

#[tokio::test]
async fn live_mode_matches_the_deterministic_result() {
    let config = mesh();
    let topology = config.build().unwrap();

    let mut emulator = Emulator::new(&topology, 0);
    emulator.run();
    let expected = emulator.into_tables();

    let live_config = LiveConfig {
        base_port: 24700,
        quiet_period: Duration::from_millis(400),
    };
    let live_tables = live::run(&topology, &live_config).await.unwrap();

    for (sim_table, live_table) in expected.iter().zip(&live_tables) {
        assert_eq!(sim_table.self_row(), live_table.self_row());
    }
}
