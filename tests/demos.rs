use std::{fs, path::PathBuf};

use machine_learning::SgdAgentConfig;
use seql::{ExperimentConfig, OptimizerSpec, demos};

fn small_config(dir: &str) -> ExperimentConfig {
    let output_dir = std::env::temp_dir().join(dir);
    fs::create_dir_all(&output_dir).unwrap();

    ExperimentConfig {
        ntrain: 40,
        ntest: 40,
        degree: 2,
        timesteps: vec![0, 3],
        grid_size: 10,
        agent: SgdAgentConfig {
            nepochs: 5,
            ..Default::default()
        },
        optimizer: OptimizerSpec::GradientDescentWithMomentum {
            learning_rate: 0.01,
            momentum: 0.9,
        },
        output_dir,
        ..Default::default()
    }
}

fn read(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn regression_demo_writes_an_svg() {
    let config = small_config("seql-regression-demo");

    let path = demos::regression(&config).unwrap();

    assert_eq!(path, config.output_dir.join("regression.svg"));
    let svg = read(&path);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("sgd, t = 3"));
}

#[test]
fn classification_demo_writes_an_svg() {
    let config = small_config("seql-classification-demo");

    let path = demos::classification(&config).unwrap();

    let svg = read(&path);
    assert!(svg.contains("<rect"));
    assert!(svg.contains("t = 0"));
}

#[test]
fn classification_demo_needs_two_features() {
    let config = ExperimentConfig {
        nfeatures: 3,
        ..small_config("seql-classification-3d")
    };

    assert!(demos::classification(&config).is_err());
}

#[test]
fn classification_demo_rejects_a_constant_only_model() {
    let config = ExperimentConfig {
        degree: 0,
        ..small_config("seql-classification-degree-0")
    };

    let err = demos::classification(&config).unwrap_err();
    assert!(format!("{err:#}").contains("degree"));
}
