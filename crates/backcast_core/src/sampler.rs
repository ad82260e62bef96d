//! Standard-normal sampling for the Monte Carlo engine
//!
//! Randomness is an explicit component: the engine asks a [`SamplerSource`] for
//! one sampler per batch, so a run's output depends only on the source and the
//! batch layout, never on thread scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Upper bound on `|z|` from [`BoxMuller`]: the radius at the smallest `u1`,
/// `sqrt(-2 ln 2^-53) ≈ 8.57`.
pub const BOX_MULLER_MAX_ABS: f64 = 8.6;

/// Source of independent N(0, 1) draws
pub trait NormalSampler {
    fn next_standard_normal(&mut self) -> f64;
}

/// Box–Muller transform over any uniform generator.
///
/// Each pair of uniforms yields two normals; the second is kept for the next
/// call.
#[derive(Debug, Clone)]
pub struct BoxMuller<R> {
    rng: R,
    spare: Option<f64>,
}

impl<R: Rng> BoxMuller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, spare: None }
    }
}

impl BoxMuller<SmallRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NormalSampler for BoxMuller<R> {
    fn next_standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // u1 in (0, 1] keeps ln finite
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = std::f64::consts::TAU * u2;
        self.spare = Some(radius * theta.sin());
        radius * theta.cos()
    }
}

/// Hands out one sampler per unit of parallel work.
///
/// `stream` identifies the unit (the batch index); the same stream must always
/// produce the same sequence.
pub trait SamplerSource: Sync {
    type Sampler: NormalSampler;

    fn sampler_for(&self, stream: u64) -> Self::Sampler;
}

/// Seeded Box–Muller streams over `SmallRng`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededSource {
    seed: u64,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Source with a seed drawn from the thread-local generator
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SamplerSource for SeededSource {
    type Sampler = BoxMuller<SmallRng>;

    fn sampler_for(&self, stream: u64) -> Self::Sampler {
        BoxMuller::seeded(mix_seed(self.seed, stream))
    }
}

/// SplitMix64 finalizer over `(seed, stream)` so adjacent streams start far apart
fn mix_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
