use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tridigit_db::models::Draw;

const PERIOD_FORMAT: &str = "%Y%m%d%H%M%S";

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = Local::now().date_naive();
    today.year() as u64 * 10_000 + today.month() as u64 * 100 + today.day() as u64
}

/// `count` tirages aléatoires, un par minute, le dernier à la minute `end`.
pub fn generate_sample(count: usize, seed: u64, end: NaiveDateTime) -> Result<Vec<Draw>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let end = end.with_second(0).unwrap_or(end);
    let mut draws = Vec::with_capacity(count);
    for i in 0..count {
        let at = end - Duration::minutes((count - 1 - i) as i64);
        let period = at.format(PERIOD_FORMAT).to_string();
        draws.push(Draw::new(
            period,
            rng.random_range(0..10),
            rng.random_range(0..10),
            rng.random_range(0..10),
        )?);
    }
    Ok(draws)
}
