use creature_brain::{
    AgentSnapshot, Controller, EnvironmentConfig, ErrorKind, Feature, Neighbor, Point, Sex,
    ThinkError, Topology, WeightVector, init_weights,
};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use std::f64::consts::PI;

fn env() -> EnvironmentConfig {
    EnvironmentConfig {
        grid_size: 200.0,
        visibility_radius: 30.0,
        max_energy: 1000.0,
        max_turn_angle: PI / 4.0,
        max_speed: 3.0,
    }
}

fn busy_agent(id: u64, weights: WeightVector) -> AgentSnapshot {
    AgentSnapshot {
        id,
        x: 20.0,
        y: 30.0,
        angle: -1.2,
        energy: 250.0,
        prev_x: 19.0,
        prev_y: 31.0,
        prev_angle: -1.0,
        prev_energy: 260.0,
        just_reproduced: true,
        sex: Sex::Male,
        wander_angle: 2.0,
        wander_strength: 0.9,
        recent_path: vec![
            Point::new(10.0, 40.0),
            Point::new(15.0, 35.0),
            Point::new(20.0, 30.0),
        ],
        food: vec![Point::new(25.0, 30.0), Point::new(20.0, 10.0)],
        obstacles: vec![Point::new(21.0, 30.0)],
        creatures: vec![Neighbor {
            x: 18.0,
            y: 33.0,
            sex: Sex::Female,
        }],
        weights,
    }
}

#[test]
fn zero_weights_ignore_the_senses() {
    let controller = Controller::new(Topology::default(), env());
    let zeros = WeightVector::from(vec![0.0; controller.topology().n_weights()]);
    let mut rng = ChaCha12Rng::seed_from_u64(0);

    let idle = AgentSnapshot {
        id: 1,
        energy: 1000.0,
        prev_energy: 1000.0,
        weights: zeros.clone(),
        ..Default::default()
    };
    for agent in [idle, busy_agent(2, zeros)] {
        let decision = controller.think(&agent, &mut rng).unwrap();
        assert_eq!(decision.angle_delta, 0.0);
        assert_eq!(decision.speed, 1.5);
        assert_eq!(decision.mate_intent, Some(0.5));
    }
}

#[test]
fn batch_preserves_order_and_ids() {
    let topology = Topology::default();
    let mut rng = ChaCha12Rng::seed_from_u64(42);
    let agents: Vec<_> = [7, 2, 9]
        .into_iter()
        .map(|id| busy_agent(id, init_weights(&topology, &mut rng)))
        .collect();

    let controller = Controller::new(topology, env());
    let decisions = controller.think_batch(&agents, 5);
    let ids: Vec<u64> = decisions.iter().map(|d| d.as_ref().unwrap().id).collect();
    assert_eq!(ids, vec![7, 2, 9]);

    for (agent, decision) in agents.iter().zip(&decisions) {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let single = controller.think(agent, &mut rng).unwrap();
        assert_eq!(decision.as_ref().unwrap(), &single);
    }
}

#[test]
fn one_bad_agent_does_not_spoil_the_batch() {
    let topology = Topology::default();
    let mut rng = ChaCha12Rng::seed_from_u64(1);
    let good = init_weights(&topology, &mut rng);
    let agents = vec![
        busy_agent(1, good.clone()),
        busy_agent(2, WeightVector::from(vec![0.1; 3])),
        AgentSnapshot {
            energy: f64::NAN,
            ..busy_agent(3, good.clone())
        },
        busy_agent(4, good),
    ];

    let controller = Controller::new(topology, env());
    let decisions = controller.think_batch(&agents, 0);
    assert_eq!(decisions.len(), 4);
    assert!(decisions[0].is_ok());
    assert_eq!(
        decisions[1].as_ref().unwrap_err().kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        decisions[2].as_ref().unwrap_err().kind(),
        ErrorKind::DegenerateInput
    );
    assert!(decisions[3].is_ok());
    assert_eq!(
        decisions[0].as_ref().unwrap().speed,
        decisions[3].as_ref().unwrap().speed
    );
}

#[test]
fn noisy_batches_are_reproducible() {
    let mut features = Feature::FULL.to_vec();
    features.insert(20, Feature::Noise);
    let topology = Topology::new(features, 9, 3).unwrap();

    let mut rng = ChaCha12Rng::seed_from_u64(3);
    let agents: Vec<_> = (0..16)
        .map(|id| busy_agent(id, init_weights(&topology, &mut rng)))
        .collect();

    let controller = Controller::new(topology, env());
    let first = controller.think_batch(&agents, 99);
    let second = controller.think_batch(&agents, 99);
    assert_eq!(first, second);

    let reseeded = controller.think_batch(&agents, 100);
    assert_ne!(first, reseeded);
}

fn food_seeker(food: Point) -> AgentSnapshot {
    let topology = Topology::default();
    let food_angle_idx = topology
        .features()
        .iter()
        .position(|&f| f == Feature::FoodAngle)
        .unwrap();

    // Hidden neuron 0 copies the food angle, output 0 copies hidden neuron 0.
    let mut weights = vec![0.0; topology.n_weights()];
    weights[food_angle_idx] = 1.0;
    weights[topology.n_hidden_weights()] = 1.0;

    AgentSnapshot {
        id: 11,
        energy: 500.0,
        prev_energy: 500.0,
        food: vec![food],
        weights: weights.into(),
        ..Default::default()
    }
}

#[test]
fn turns_toward_food() {
    let controller = Controller::new(Topology::default(), env());
    let mut rng = ChaCha12Rng::seed_from_u64(0);

    let ahead = controller
        .think(&food_seeker(Point::new(10.0, 0.0)), &mut rng)
        .unwrap();
    assert_eq!(ahead.angle_delta, 0.0);

    let left = controller
        .think(&food_seeker(Point::new(10.0, 5.0)), &mut rng)
        .unwrap();
    assert!(left.angle_delta > 0.0);

    let right = controller
        .think(&food_seeker(Point::new(10.0, -5.0)), &mut rng)
        .unwrap();
    assert!(right.angle_delta < 0.0);
    assert!((left.angle_delta + right.angle_delta).abs() < 1e-12);
}

#[test]
fn mismatched_weights_are_never_replaced() {
    let controller = Controller::new(Topology::default(), env());
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let agent = busy_agent(5, WeightVector::from(vec![0.0; 200]));
    let err = controller.think(&agent, &mut rng).unwrap_err();
    assert_eq!(
        err,
        ThinkError::WeightCount {
            expected: 216,
            actual: 200,
        }
    );
    assert!(err.to_string().contains("216"));
}
