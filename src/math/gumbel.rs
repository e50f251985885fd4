use rand::distributions::Open01;
use rand::Rng;

use crate::math::dual::Dual;

/// Added to every probability before the logarithm.
pub const LOG_EPS: f64 = 1e-9;

/// Gumbel-Softmax sampler with a straight-through estimator.
///
/// Each returned row is a hard one-hot vector in value, while its tangents are those
/// of the tempered softmax over `log(p + eps) + gumbel`. As the temperature goes to
/// zero the soft sample converges to the hard one.
#[derive(Debug, Clone, Copy)]
pub struct RelaxedCategorical {
    temperature: f64,
}

impl Default for RelaxedCategorical {
    fn default() -> Self {
        Self { temperature: 1.0 }
    }
}

impl RelaxedCategorical {
    pub fn new(temperature: f64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            temperature.is_finite() && temperature > 0.0,
            "temperature must be finite and > 0 (got {})",
            temperature
        );
        Ok(Self { temperature })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Draw the soft sample and its hard counterpart for one distribution.
    pub fn draw<R: Rng + ?Sized>(&self, probs: &[Dual], rng: &mut R) -> RelaxedDraw {
        let soft = self.soft_sample(probs, rng);
        let hard = hard_index(probs, &soft);
        RelaxedDraw { soft, hard }
    }

    /// Draw one relaxed sample for a single distribution.
    pub fn sample_row<R: Rng + ?Sized>(&self, probs: &[Dual], rng: &mut R) -> Vec<Dual> {
        self.draw(probs, rng).straight_through()
    }

    /// Row-wise sampling over a probability matrix.
    pub fn sample<R: Rng + ?Sized>(&self, rows: &[Vec<Dual>], rng: &mut R) -> Vec<Vec<Dual>> {
        rows.iter().map(|row| self.sample_row(row, rng)).collect()
    }

    /// Two-way `[p, 1 - p]` draw: whether the first category won, then the
    /// straight-through components of both categories.
    pub fn bernoulli<R: Rng + ?Sized>(&self, p: Dual, rng: &mut R) -> (bool, Dual, Dual) {
        let row = self.sample_row(&[p, 1.0 - p], rng);
        (row[0].re > 0.5, row[0], row[1])
    }

    fn soft_sample<R: Rng + ?Sized>(&self, probs: &[Dual], rng: &mut R) -> Vec<Dual> {
        let logits: Vec<Dual> = probs
            .iter()
            .map(|p| {
                let u: f64 = rng.sample(Open01);
                let gumbel = -(-u.ln()).ln();
                ((*p + LOG_EPS).ln() + gumbel) / self.temperature
            })
            .collect();
        let max = logits.iter().map(|l| l.re).fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<Dual> = logits.iter().map(|l| (*l - max).exp()).collect();
        let total: Dual = exps.iter().copied().sum();
        exps.into_iter().map(|e| e / total).collect()
    }
}

/// One draw before the straight-through combination.
#[derive(Debug, Clone)]
pub struct RelaxedDraw {
    pub soft: Vec<Dual>,
    /// Row-wise argmax of `soft`; `None` only when every probability is zero.
    pub hard: Option<usize>,
}

impl RelaxedDraw {
    pub fn straight_through(&self) -> Vec<Dual> {
        self.soft
            .iter()
            .enumerate()
            .map(|(k, s)| Dual::straight_through(if Some(k) == self.hard { 1.0 } else { 0.0 }, *s))
            .collect()
    }
}

// Categories with zero input probability are never chosen.
fn hard_index(probs: &[Dual], soft: &[Dual]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, (p, s)) in probs.iter().zip(soft).enumerate() {
        if p.re <= 0.0 {
            continue;
        }
        match best {
            Some((_, v)) if v >= s.re => {}
            _ => best = Some((k, s.re)),
        }
    }
    best.map(|(k, _)| k)
}
