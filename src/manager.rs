use crate::brain::Controller;
use crate::config::Config;
use crate::types::{AgentSnapshot, MovementDecision};
use crate::weights::{Mutation, WeightVector, init_weights};
use anyhow::{Context, Result};
use glob::glob;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Outcome for one agent of a tick, stored in the same position as the
/// agent in the tick file.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: u64,
    pub decision: Option<MovementDecision>,
    pub error: Option<String>,
}

/// File-based workflow over a working directory holding `config.toml`.
pub struct Manager {
    work_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let cfg = Config::from_file(work_dir.join("config.toml"))
            .context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { work_dir, cfg })
    }

    /// Write `count` freshly initialized weight vectors to `weights.msgpack`.
    pub fn init_weights(&self, count: usize, seed: Option<u64>) -> Result<()> {
        let mut rng = self.rng(seed).context("failed to construct rng")?;

        let weight_vecs: Vec<WeightVector> = (0..count)
            .map(|_| init_weights(&self.cfg.topology, &mut rng))
            .collect();

        let file = self.weights_file();
        write_file(&file, &weight_vecs)?;
        log::info!("wrote {count} weight vectors to {file:?}");

        Ok(())
    }

    /// Read weight vectors from `input` and write mutated copies to `output`.
    ///
    /// Relative paths are resolved against the working directory.
    pub fn mutate_weights<P: AsRef<Path>>(
        &self,
        input: P,
        output: P,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut rng = self.rng(seed).context("failed to construct rng")?;
        let mutation = Mutation::new(self.cfg.mutation).context("failed to construct mutation")?;

        let input = self.work_dir.join(input);
        let parents: Vec<WeightVector> = read_file(&input)?;

        let n_weights = self.cfg.topology.n_weights();
        let n_mismatched = parents.iter().filter(|w| w.len() != n_weights).count();
        if n_mismatched > 0 {
            log::warn!("{n_mismatched} weight vectors do not fit the configured topology");
        }

        let children: Vec<WeightVector> = parents
            .iter()
            .map(|parent| mutation.mutate(parent, &mut rng))
            .collect();

        let output = self.work_dir.join(output);
        write_file(&output, &children)?;
        log::info!("wrote {} mutated weight vectors to {output:?}", children.len());

        Ok(())
    }

    /// Decide every pending tick.
    ///
    /// A tick `tick-NNNN.msgpack` is pending until `decisions-NNNN.msgpack`
    /// exists next to it.
    pub fn answer_ticks(&self) -> Result<()> {
        let controller = Controller::new(self.cfg.topology.clone(), self.cfg.environment);

        let tick_files = self.tick_files().context("failed to list tick files")?;
        for (tick_idx, tick_file) in tick_files {
            let decisions_file = self.decisions_file(tick_idx);
            if decisions_file.exists() {
                continue;
            }

            let agents: Vec<AgentSnapshot> = read_file(&tick_file)?;

            let seed = self
                .tick_seed(tick_idx)
                .context("failed to derive tick seed")?;
            let results = controller.think_batch(&agents, seed);

            let mut n_failed = 0;
            let records: Vec<DecisionRecord> = agents
                .iter()
                .zip(results)
                .map(|(agent, result)| match result {
                    Ok(decision) => DecisionRecord {
                        id: agent.id,
                        decision: Some(decision),
                        error: None,
                    },
                    Err(error) => {
                        n_failed += 1;
                        DecisionRecord {
                            id: agent.id,
                            decision: None,
                            error: Some(error.to_string()),
                        }
                    }
                })
                .collect();

            write_file(&decisions_file, &records)?;
            log::info!(
                "decided tick {tick_idx} ({} agents, {n_failed} failed)",
                records.len()
            );
        }

        Ok(())
    }

    /// Remove every decisions file.
    pub fn clean(&self) -> Result<()> {
        let pattern = self.work_dir.join("decisions-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut count = 0;
        for file in glob(pattern)
            .context("failed to glob decisions files")?
            .filter_map(Result::ok)
        {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            count += 1;
        }
        log::info!("removed {count} decisions files");
        Ok(())
    }

    fn rng(&self, seed: Option<u64>) -> Result<ChaCha12Rng> {
        let rng = match seed.or(self.cfg.seed) {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };
        Ok(rng)
    }

    fn tick_seed(&self, tick_idx: usize) -> Result<u64> {
        let mut rng = self.rng(None)?;
        rng.set_stream(tick_idx as u64);
        Ok(rng.next_u64())
    }

    fn tick_files(&self) -> Result<Vec<(usize, PathBuf)>> {
        let pattern = self.work_dir.join("tick-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files = Vec::new();
        for file in glob(pattern)
            .context("failed to glob tick files")?
            .filter_map(Result::ok)
        {
            let tick_idx = parse_tick_idx(&file)
                .with_context(|| format!("failed to parse tick index of {file:?}"))?;
            files.push((tick_idx, file));
        }
        files.sort();
        Ok(files)
    }

    fn weights_file(&self) -> PathBuf {
        self.work_dir.join("weights.msgpack")
    }

    fn decisions_file(&self, tick_idx: usize) -> PathBuf {
        self.work_dir.join(format!("decisions-{tick_idx:04}.msgpack"))
    }
}

/// Index of a `tick-NNNN.msgpack` file.
///
/// Only the zero-padded spelling is accepted, so that two files can never
/// share an index.
fn parse_tick_idx(file: &Path) -> Option<usize> {
    let digits = file.file_stem()?.to_str()?.strip_prefix("tick-")?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let tick_idx: usize = digits.parse().ok()?;
    (format!("{tick_idx:04}") == digits).then_some(tick_idx)
}

fn read_file<T: DeserializeOwned>(file: &Path) -> Result<T> {
    let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(reader);
    decode::from_read(&mut reader).with_context(|| format!("failed to deserialize {file:?}"))
}

fn write_file<T: Serialize + ?Sized>(file: &Path, value: &T) -> Result<()> {
    let writer = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(writer);
    encode::write_named(&mut writer, value)
        .with_context(|| format!("failed to serialize {file:?}"))?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_names_must_be_zero_padded() {
        let parse = |name: &str| parse_tick_idx(Path::new(name));
        assert_eq!(parse("tick-0000.msgpack"), Some(0));
        assert_eq!(parse("tick-0001.msgpack"), Some(1));
        assert_eq!(parse("tick-12345.msgpack"), Some(12345));

        assert_eq!(parse("tick-1.msgpack"), None);
        assert_eq!(parse("tick-00001.msgpack"), None);
        assert_eq!(parse("tick-+001.msgpack"), None);
        assert_eq!(parse("tick-abcd.msgpack"), None);
        assert_eq!(parse("decisions-0001.msgpack"), None);
    }
}
