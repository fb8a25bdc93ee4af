use std::io::Write;
use crate::melody_pipeline::common::error::Result;
use crate::melody_pipeline::config::MelodyConfig;
use crate::melody_pipeline::melody::Score;

pub trait ScoreWriter {
    fn write_score(&self, score: &Score, output: &mut dyn Write, config: &MelodyConfig) -> Result<()>;
}
