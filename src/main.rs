use std::{env, fs};

use anyhow::Context;
use log::info;
use seql::{ExperimentConfig, demos};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };

    info!(
        seed = config.seed, degree = config.degree, nsteps = config.nsteps();
        "running with optimizer {:?}",
        config.optimizer
    );

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("cannot create '{}'", config.output_dir.display())
    })?;

    demos::regression(&config).context("regression demo failed")?;
    demos::classification(&config).context("classification demo failed")?;

    Ok(())
}
