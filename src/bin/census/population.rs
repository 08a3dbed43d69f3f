// Synthetic Population: seedable count source for scenario runs
// Evolves per-category counts turn by turn and can inject query failures

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use census_engine::{Category, CategoryGroup, CountSource, MobileCategory, SourceError};

use std::collections::HashMap;

/// A scripted blow to the population at a given tick.
#[derive(Debug, Clone, Copy)]
pub struct Raid {
    pub tick: u64,
    /// Fraction of support units killed (0.0..=1.0).
    pub support_loss: f64,
    /// Fraction of every structure category destroyed.
    pub structure_loss: f64,
}

pub struct Population {
    rng: ChaCha8Rng,
    counts: HashMap<Category, u32>,
    /// Expected support units trained per tick.
    growth: f64,
    /// Per-unit chance of dying each tick.
    attrition: f64,
    /// Chance that any single count query fails.
    failure_rate: f64,
    pub failures_injected: u32,
}

impl Population {
    pub fn new(rng: ChaCha8Rng, support: u32, soldiers: u32, structures: u32) -> Self {
        let mut counts = HashMap::new();
        for category in Category::all() {
            let n = match category {
                Category::Mobile(MobileCategory::SupportUnit) => support,
                Category::Mobile(MobileCategory::Siege) => soldiers / 10,
                Category::Mobile(_) => soldiers,
                Category::Static(_) => structures,
            };
            counts.insert(category, n);
        }
        Self {
            rng,
            counts,
            growth: 0.0,
            attrition: 0.0,
            failure_rate: 0.0,
            failures_injected: 0,
        }
    }

    pub fn with_dynamics(mut self, growth: f64, attrition: f64, failure_rate: f64) -> Self {
        self.growth = growth;
        self.attrition = attrition;
        self.failure_rate = failure_rate;
        self
    }

    pub fn support(&self) -> u32 {
        self.counts.get(&Category::SUPPORT_UNIT).copied().unwrap_or(0)
    }

    /// Advance the population by one tick.
    pub fn evolve(&mut self) {
        let births = poisson_sample(&mut self.rng, self.growth);
        let support = self.support();
        let deaths = binomial_sample(&mut self.rng, support, self.attrition);
        self.counts
            .insert(Category::SUPPORT_UNIT, (support + births).saturating_sub(deaths));
    }

    pub fn apply_raid(&mut self, raid: &Raid) {
        let support = self.support();
        let lost = (support as f64 * raid.support_loss).round() as u32;
        self.counts.insert(Category::SUPPORT_UNIT, support.saturating_sub(lost));
        for category in CategoryGroup::Static.categories() {
            if let Some(n) = self.counts.get_mut(&category) {
                *n -= (*n as f64 * raid.structure_loss).round() as u32;
            }
        }
    }
}

impl CountSource for Population {
    fn count(&mut self, category: Category) -> Result<u32, SourceError> {
        if self.failure_rate > 0.0 && self.rng.gen::<f64>() < self.failure_rate {
            self.failures_injected += 1;
            return Err(SourceError::Unavailable(format!("injected failure for {}", category)));
        }
        Ok(self.counts.get(&category).copied().unwrap_or(0))
    }
}

/// Poisson sample via Knuth's algorithm (fine for small lambda).
pub fn poisson_sample(rng: &mut ChaCha8Rng, lambda: f64) -> u32 {
    if lambda <= 0.0 {
        return 0;
    }
    let l = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.gen::<f64>();
        if p <= l {
            return k;
        }
        k += 1;
    }
}

fn binomial_sample(rng: &mut ChaCha8Rng, n: u32, p: f64) -> u32 {
    if p <= 0.0 {
        return 0;
    }
    (0..n).filter(|_| rng.gen::<f64>() < p).count() as u32
}
