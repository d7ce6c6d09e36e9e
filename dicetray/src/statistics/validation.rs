use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    rules::dice::{FACES, MAX_DICE, MIN_DICE},
    simulation::logging::RollLog,
    statistics::frequencies::Frequencies,
};

/// Below this many thrown dice the chi-square approximation is not trusted.
pub const MIN_SAMPLES: usize = 5 * FACES as usize;

/// Goodness-of-fit threshold: histories less likely than this under a fair
/// die are reported as invalid.
pub const SIGNIFICANCE: f64 = 0.001;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub samples: usize,
    pub chi_square: Option<f64>,
    pub p_value: Option<f64>,
}

impl ValidationReport {
    pub fn summary(&self) -> String {
        let verdict = if self.is_valid { "passed" } else { "failed" };
        let mut out = format!("Randomness check {verdict} over {} dice", self.samples);
        if let Some(p) = self.p_value {
            out.push_str(&format!(" (p = {p:.3})"));
        }
        if let Some(first) = self.errors.first().or(self.warnings.first()) {
            out.push_str(": ");
            out.push_str(first);
        }
        out
    }
}

/// Pearson's chi-square statistic of `freq` against a fair six-sided die.
pub fn chi_square(freq: &Frequencies) -> f64 {
    let n = freq.total() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let expected = n / f64::from(FACES);
    freq.iter()
        .map(|(_, observed)| {
            let d = observed as f64 - expected;
            d * d / expected
        })
        .sum()
}

/// Probability of a statistic at least as extreme as `chi_square` for a fair die.
pub fn p_value(chi_square: f64) -> anyhow::Result<f64> {
    let dist = ChiSquared::new(f64::from(FACES - 1))?;
    Ok(dist.sf(chi_square))
}

/// Sanity-checks a roll history and tests the faces of every thrown die for
/// uniformity. Locked dice are excluded since they were not re-drawn.
pub fn validate_history(log: &RollLog) -> anyhow::Result<ValidationReport> {
    let mut report = ValidationReport {
        is_valid: true,
        ..Default::default()
    };

    if log.is_empty() {
        report.warnings.push("No history to validate.".to_string());
        return Ok(report);
    }

    let mut previous: Option<(u64, usize)> = None;
    for record in log.entries() {
        let count = record.results.len();
        if !(MIN_DICE..=MAX_DICE).contains(&count) {
            report
                .errors
                .push(format!("Roll #{} has {count} dice.", record.roll_number));
        }
        if let Some(die) = record.rolled.iter().find(|d| d.index() >= count) {
            report.errors.push(format!(
                "Roll #{} threw die {die} which is not on the board.",
                record.roll_number
            ));
        }
        if let Some((number, previous_count)) = previous {
            if record.roll_number != number + 1 {
                report.errors.push(format!(
                    "Roll #{} follows roll #{number}.",
                    record.roll_number
                ));
            }
            if count != previous_count {
                report.warnings.push(format!(
                    "Dice count changed from {previous_count} to {count} at roll #{}.",
                    record.roll_number
                ));
            }
        }
        previous = Some((record.roll_number, count));
    }

    let freq: Frequencies = log.entries().iter().flat_map(|r| r.rolled_faces()).collect();
    report.samples = freq.total();

    if report.samples < MIN_SAMPLES {
        report.warnings.push(format!(
            "Only {} dice thrown; at least {MIN_SAMPLES} needed for a uniformity test.",
            report.samples
        ));
    } else {
        let stat = chi_square(&freq);
        let p = p_value(stat)?;
        report.chi_square = Some(stat);
        report.p_value = Some(p);
        if p < SIGNIFICANCE {
            report.errors.push(format!(
                "Face distribution is not uniform (chi-square {stat:.2}, p = {p:.5})."
            ));
        }
    }

    report.is_valid = report.errors.is_empty();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use statrs::assert_almost_eq;

    use super::*;
    use crate::{
        rules::dice::{DieId, Face},
        simulation::logging::RollRecord,
        statistics::frequencies::compute_sum,
    };

    fn record(roll_number: u64, values: &[u8]) -> RollRecord {
        let results: Vec<Face> = values.iter().map(|v| Face::new(*v).unwrap()).collect();
        RollRecord {
            roll_number,
            rolled: (0..results.len()).map(DieId).collect(),
            sum: compute_sum(&results),
            results,
            at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_warns() -> anyhow::Result<()> {
        let report = validate_history(&RollLog::default())?;
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["No history to validate.".to_string()]);
        Ok(())
    }

    #[test]
    fn test_chi_square_of_perfect_histogram_is_zero() {
        let freq: Frequencies = Face::ALL.into_iter().cycle().take(60).collect();
        assert_almost_eq!(chi_square(&freq), 0.0, 1e-12);
    }

    #[test]
    fn test_p_value_at_known_critical_value() -> anyhow::Result<()> {
        // 11.0705 is the 95th percentile of chi-square with 5 degrees of freedom.
        assert_almost_eq!(p_value(11.0705)?, 0.05, 1e-4);
        Ok(())
    }

    #[test]
    fn test_uniform_history_passes() -> anyhow::Result<()> {
        let mut log = RollLog::default();
        for n in 1..=20 {
            log.log(record(n, &[1, 2, 3, 4, 5, 6]));
        }
        let report = validate_history(&log)?;
        assert!(report.is_valid, "{report:?}");
        assert_eq!(report.samples, 120);
        assert!(report.p_value.unwrap() > 0.99);
        Ok(())
    }

    #[test]
    fn test_loaded_die_fails() -> anyhow::Result<()> {
        let mut log = RollLog::default();
        for n in 1..=20 {
            log.log(record(n, &[6, 6, 6, 6, 6, 1]));
        }
        let report = validate_history(&log)?;
        assert!(!report.is_valid);
        assert!(report.p_value.unwrap() < SIGNIFICANCE);
        Ok(())
    }

    #[test]
    fn test_malformed_history() -> anyhow::Result<()> {
        let mut log = RollLog::default();
        log.log(record(1, &[1, 2]));
        log.log(record(3, &[4, 5, 6]));
        let mut bad = record(4, &[2]);
        bad.rolled.push(DieId(3));
        log.log(bad);
        let report = validate_history(&log)?;
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("Dice count changed")));
        assert!(report.warnings.iter().any(|w| w.contains("Only 6 dice")));
        Ok(())
    }
}
