//! Tests of whether the age groups differ.

use std::collections::BTreeMap;

use asdscreen_dataset::{group::AgeGroup, record::NormalizedRecord};
use asdscreen_stats::{
    hypothesis::{TestResult, chi_square_independence, kruskal_wallis},
    measure::Measure,
};
use serde::{Deserialize, Serialize};

/// Group × binary-variable contingency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub groups: Vec<AgeGroup>,
    /// Column labels: the `false` column first.
    pub columns: [String; 2],
    /// `counts[i]` holds the `false` and `true` counts of `groups[i]`.
    pub counts: Vec<[u64; 2]>,
    /// Counts as percentages of their row total; undefined for an empty row.
    pub row_percentages: Vec<[Measure<f64>; 2]>,
}

impl ContingencyTable {
    #[expect(clippy::cast_precision_loss)]
    fn tally<F>(
        groups: &BTreeMap<AgeGroup, &[NormalizedRecord]>,
        columns: [&str; 2],
        value: F,
    ) -> Self
    where
        F: Fn(&NormalizedRecord) -> Option<bool>,
    {
        let counts = groups
            .values()
            .map(|records| {
                records
                    .iter()
                    .filter_map(&value)
                    .fold([0, 0], |mut row, v| {
                        row[usize::from(v)] += 1;
                        row
                    })
            })
            .collect::<Vec<[u64; 2]>>();
        let row_percentages = counts
            .iter()
            .map(|row| {
                let total = (row[0] + row[1]) as f64;
                row.map(|c| Measure::ratio(c as f64, total).map(|p| p * 100.0))
            })
            .collect();
        Self {
            groups: groups.keys().copied().collect(),
            columns: columns.map(str::to_owned),
            counts,
            row_percentages,
        }
    }
}

/// A contingency table and its χ² test of independence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndependenceTest {
    pub table: ContingencyTable,
    pub test: Measure<TestResult>,
}

impl IndependenceTest {
    fn new(table: ContingencyTable) -> Self {
        let rows = table.counts.iter().map(|r| r.to_vec()).collect::<Vec<_>>();
        Self {
            test: chi_square_independence(&rows),
            table,
        }
    }
}

/// Cross-group tests over every analyzed group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossGroupTests {
    /// Kruskal–Wallis test of the total score across groups.
    pub score_kruskal_wallis: Measure<TestResult>,
    /// Group × screening outcome.
    pub outcome_by_group: IndependenceTest,
    /// Group × born with jaundice.
    pub jaundice_by_group: IndependenceTest,
}

impl CrossGroupTests {
    #[must_use]
    pub fn compute(groups: &BTreeMap<AgeGroup, &[NormalizedRecord]>) -> Self {
        let scores = groups
            .values()
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| r.score.map(f64::from))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let score_slices = scores.iter().map(Vec::as_slice).collect::<Vec<_>>();

        Self {
            score_kruskal_wallis: kruskal_wallis(&score_slices),
            outcome_by_group: IndependenceTest::new(ContingencyTable::tally(
                groups,
                ["negative", "positive"],
                |r| r.outcome,
            )),
            jaundice_by_group: IndependenceTest::new(ContingencyTable::tally(
                groups,
                ["no", "yes"],
                |r| r.jaundice,
            )),
        }
    }
}
