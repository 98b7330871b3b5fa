//! Non-parametric and contingency hypothesis tests.
//!
//! - [`kruskal_wallis`]: compares the distribution of a value across k
//!   independent groups using ranks (tie-corrected H statistic).
//! - [`chi_square_independence`]: tests independence of the row and column
//!   variables of an r×c contingency table. Tables with one degree of freedom
//!   use the Yates continuity correction.
//!
//! Both tests report p-values from the χ² distribution via
//! [`chi_square_sf`].

use serde::{Deserialize, Serialize};

use crate::measure::{Measure, UndefinedReason};

/// Result of a test whose statistic follows a χ² distribution under the null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

impl TestResult {
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Kruskal–Wallis H test.
///
/// Undefined when fewer than two groups are given, any group is empty, or all
/// values are tied.
///
/// # Examples
///
/// ```
/// use asdscreen_stats::hypothesis::kruskal_wallis;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let c = [7.0, 8.0, 9.0];
/// let result = *kruskal_wallis(&[&a, &b, &c]).value().unwrap();
/// assert!((result.statistic - 7.2).abs() < 1e-9);
/// assert_eq!(result.degrees_of_freedom, 2);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kruskal_wallis(groups: &[&[f64]]) -> Measure<TestResult> {
    if groups.len() < 2 || groups.iter().any(|g| g.is_empty()) {
        return Measure::Undefined(UndefinedReason::ZeroDenominator);
    }

    let mut pooled = groups
        .iter()
        .enumerate()
        .flat_map(|(gi, g)| g.iter().map(move |&v| (v, gi)))
        .collect::<Vec<_>>();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pooled.len();
    let mut rank_sums = vec![0.0; groups.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && pooled[end].0 == pooled[start].0 {
            end += 1;
        }
        // ranks are 1-based; tied values share the average rank
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &(_, gi) in &pooled[start..end] {
            rank_sums[gi] += avg_rank;
        }
        let t = (end - start) as f64;
        tie_term += t.powi(3) - t;
        start = end;
    }

    let n_f = n as f64;
    let correction = 1.0 - tie_term / (n_f.powi(3) - n_f);
    if correction <= 0.0 {
        return Measure::Undefined(UndefinedReason::ZeroVariance);
    }

    let h = 12.0 / (n_f * (n_f + 1.0))
        * groups
            .iter()
            .zip(&rank_sums)
            .map(|(g, r)| r * r / g.len() as f64)
            .sum::<f64>()
        - 3.0 * (n_f + 1.0);
    let statistic = h / correction;
    let degrees_of_freedom = groups.len() - 1;

    Measure::finite(statistic).map(|statistic| TestResult {
        statistic,
        degrees_of_freedom,
        p_value: chi_square_sf(statistic, degrees_of_freedom),
    })
}

/// Pearson's χ² test of independence for an r×c table of counts.
///
/// Rows and columns whose marginal total is zero are dropped first; the test
/// is undefined if fewer than two rows or columns remain.
///
/// # Examples
///
/// ```
/// use asdscreen_stats::hypothesis::chi_square_independence;
///
/// let table = vec![vec![10, 20], vec![30, 40]];
/// let result = *chi_square_independence(&table).value().unwrap();
/// // Yates-corrected for a 2x2 table
/// assert!((result.statistic - 0.446_428_571).abs() < 1e-6);
/// assert_eq!(result.degrees_of_freedom, 1);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn chi_square_independence(table: &[Vec<u64>]) -> Measure<TestResult> {
    let n_cols = table.iter().map(Vec::len).max().unwrap_or(0);
    let cell = |r: &Vec<u64>, c: usize| r.get(c).copied().unwrap_or(0);

    let rows = table
        .iter()
        .filter(|r| r.iter().sum::<u64>() > 0)
        .collect::<Vec<_>>();
    let cols = (0..n_cols)
        .filter(|&c| rows.iter().map(|r| cell(r, c)).sum::<u64>() > 0)
        .collect::<Vec<_>>();
    if rows.len() < 2 || cols.len() < 2 {
        return Measure::Undefined(UndefinedReason::DegenerateTable);
    }

    let row_totals = rows
        .iter()
        .map(|r| cols.iter().map(|&c| cell(r, c)).sum::<u64>() as f64)
        .collect::<Vec<_>>();
    let col_totals = cols
        .iter()
        .map(|&c| rows.iter().map(|r| cell(r, c)).sum::<u64>() as f64)
        .collect::<Vec<_>>();
    let total = row_totals.iter().sum::<f64>();
    let degrees_of_freedom = (rows.len() - 1) * (cols.len() - 1);

    let mut statistic = 0.0;
    for (r, row_total) in rows.iter().zip(&row_totals) {
        for (&c, col_total) in cols.iter().zip(&col_totals) {
            let expected = row_total * col_total / total;
            let mut diff = (cell(r, c) as f64 - expected).abs();
            if degrees_of_freedom == 1 {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff * diff / expected;
        }
    }

    Measure::finite(statistic).map(|statistic| TestResult {
        statistic,
        degrees_of_freedom,
        p_value: chi_square_sf(statistic, degrees_of_freedom),
    })
}

/// Survival function `P(X > x)` of the χ² distribution with `df` degrees of freedom.
///
/// ```
/// use asdscreen_stats::hypothesis::chi_square_sf;
///
/// // with two degrees of freedom the survival function is exp(-x/2)
/// assert!((chi_square_sf(2.0, 2) - (-1.0f64).exp()).abs() < 1e-10);
/// assert!((chi_square_sf(3.841_458_8, 1) - 0.05).abs() < 1e-6);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn chi_square_sf(x: f64, df: usize) -> f64 {
    if x <= 0.0 || df == 0 {
        return 1.0;
    }
    regularized_gamma_q(df as f64 / 2.0, x / 2.0)
}

const EPS: f64 = 1e-15;
const FPMIN: f64 = 1e-300;
const MAX_ITER: usize = 500;

/// Upper regularized incomplete gamma function `Q(a, x)`.
fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
    .clamp(0.0, 1.0)
}

#[expect(clippy::cast_precision_loss)]
fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

// Modified Lentz evaluation.
#[expect(clippy::cast_precision_loss)]
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..MAX_ITER {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural logarithm of the gamma function (Lanczos approximation).
#[expect(clippy::cast_precision_loss)]
fn ln_gamma(x: f64) -> f64 {
    use std::f64::consts::PI;

    if x < 0.5 {
        // reflection formula
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}
