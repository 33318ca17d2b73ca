use creature_brain::manager::DecisionRecord;
use creature_brain::{AgentSnapshot, Point, Sex, WeightVector};
use std::{env, fs, fs::File, io::BufReader, path::Path, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_creature-brain"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn read_msgpack<T: serde::de::DeserializeOwned>(file: &Path) -> T {
    let reader = BufReader::new(File::open(file).expect("failed to open file"));
    rmp_serde::from_read(reader).expect("failed to deserialize file")
}

fn write_msgpack<T: serde::Serialize>(file: &Path, value: &T) {
    let bytes = rmp_serde::to_vec_named(value).expect("failed to serialize value");
    fs::write(file, bytes).expect("failed to write file");
}

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "seed = 1234\n"
        + "\n"
        + "[topology]\n"
        + "preset = \"full\"\n"
        + "\n"
        + "[environment]\n"
        + "gridSize = 100.0\n"
        + "visibilityRadius = 20.0\n"
        + "maxEnergy = 1000.0\n"
        + "maxTurnAngle = 0.5\n"
        + "maxSpeed = 2.0\n"
        + "\n"
        + "[mutation]\n"
        + "step = 0.1\n"
        + "bound = 1.0\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--work-dir", test_dir_str, "init", "--count", "3"]);
    let weight_vecs: Vec<WeightVector> = read_msgpack(&test_dir.join("weights.msgpack"));
    assert_eq!(weight_vecs.len(), 3);
    assert!(weight_vecs.iter().all(|w| w.len() == 9 * 21 + 3 * 9));

    run_bin(&[
        "--work-dir",
        test_dir_str,
        "mutate",
        "--input",
        "weights.msgpack",
        "--output",
        "children.msgpack",
        "--seed",
        "7",
    ]);
    let children: Vec<WeightVector> = read_msgpack(&test_dir.join("children.msgpack"));
    assert_eq!(children.len(), 3);
    for (child, parent) in children.iter().zip(&weight_vecs) {
        assert_eq!(child.len(), parent.len());
        assert!(child.as_slice().iter().all(|w| (-1.0..=1.0).contains(w)));
    }

    let agent = |id: u64, weights: WeightVector| AgentSnapshot {
        id,
        x: 50.0,
        y: 50.0,
        energy: 400.0,
        prev_x: 49.0,
        prev_y: 50.0,
        prev_energy: 405.0,
        sex: Sex::Female,
        recent_path: vec![Point::new(45.0, 50.0), Point::new(50.0, 50.0)],
        food: vec![Point::new(55.0, 52.0)],
        weights,
        ..Default::default()
    };
    let tick = vec![
        agent(7, children[0].clone()),
        agent(2, WeightVector::from(vec![0.5; 4])),
        agent(9, children[2].clone()),
    ];
    write_msgpack(&test_dir.join("tick-0000.msgpack"), &tick);

    run_bin(&["--work-dir", test_dir_str, "think"]);
    let decisions_path = test_dir.join("decisions-0000.msgpack");
    let records: Vec<DecisionRecord> = read_msgpack(&decisions_path);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![7, 2, 9]);
    assert!(records[0].decision.is_some() && records[0].error.is_none());
    assert!(records[1].decision.is_none() && records[1].error.is_some());
    assert!(records[2].decision.is_some() && records[2].error.is_none());

    run_bin(&["--work-dir", test_dir_str, "clean"]);
    assert!(!decisions_path.exists());

    run_bin(&["--work-dir", test_dir_str, "think"]);
    let again: Vec<DecisionRecord> = read_msgpack(&decisions_path);
    assert_eq!(again, records);

    run_bin(&["--work-dir", test_dir_str, "clean"]);

    fs::remove_dir_all(&test_dir).ok();
}
