use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::RenderConfig;
use crate::workdir::WorkDir;

/// Everything a stage may read or use besides the previous stages' artifacts.
#[derive(Debug)]
pub struct PipelineContext {
    pub config: RenderConfig,
    /// Randomness for background sampling; seeded from `config.seed` when set.
    pub rng: StdRng,
    pub workdir: WorkDir,
}

impl PipelineContext {
    pub fn new(config: RenderConfig, workdir: WorkDir) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            workdir,
        }
    }
}
