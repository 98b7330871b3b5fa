//! Plain-text summary of a comparative model.

use std::io::{self, Write};

use anyhow::Context;
use asdscreen_analysis::{
    comparison::IndependenceTest, metric::MetricKey, report::ComparativeModel, risk::RiskFactor,
};
use asdscreen_dataset::{group::AgeGroup, record::ItemId, vocabulary::Gender};
use asdscreen_stats::{hypothesis::TestResult, measure::Measure};
use clap::Args;

use crate::{command::SourceArg, util::MeasureCell};

/// Number of features listed per group in the importance table.
const TOP_FEATURES: usize = 5;

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    pub source: SourceArg,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let model = arg.source.run_pipeline()?;
    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &model).context("Failed to write summary")?;
    Ok(())
}

fn write_summary<W>(w: &mut W, model: &ComparativeModel) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        w,
        "AQ-10 Screening Summary ({})",
        model.generated_at().format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(w, "==========================================")?;
    for missing in model.missing_groups() {
        writeln!(w, "  missing group {}: {}", missing.group, missing.reason)?;
    }
    writeln!(w)?;

    write_datasets(w, model)?;
    write_metric_table(
        w,
        model,
        "Detection",
        &[
            ("overall", MetricKey::DetectionRate),
            ("male", MetricKey::GenderDetectionRate(Gender::Male)),
            ("female", MetricKey::GenderDetectionRate(Gender::Female)),
            ("holdout acc", MetricKey::HoldoutAccuracy),
        ],
        3,
    )?;
    write_metric_table(
        w,
        model,
        "Score",
        &[
            ("mean", MetricKey::MeanScore),
            ("std dev", MetricKey::ScoreStdDev),
            ("P25", MetricKey::ScorePercentile(25)),
            ("median", MetricKey::MedianScore),
            ("P75", MetricKey::ScorePercentile(75)),
        ],
        2,
    )?;

    let discrimination = ItemId::all()
        .map(|id| (id.to_string(), MetricKey::ItemDiscrimination(id)))
        .collect::<Vec<_>>();
    let discrimination = discrimination
        .iter()
        .map(|(label, key)| (label.as_str(), *key))
        .collect::<Vec<_>>();
    write_metric_table(w, model, "Item discriminative power", &discrimination, 3)?;

    let risk = RiskFactor::ALL
        .iter()
        .flat_map(|&f| {
            [
                (format!("RR {f}"), MetricKey::RelativeRisk(f)),
                (format!("OR {f}"), MetricKey::OddsRatio(f)),
            ]
        })
        .collect::<Vec<_>>();
    let risk = risk
        .iter()
        .map(|(label, key)| (label.as_str(), *key))
        .collect::<Vec<_>>();
    write_metric_table(w, model, "Risk factors", &risk, 2)?;

    write_importance(w, model)?;
    write_cross_group(w, model)?;
    Ok(())
}

fn write_datasets<W>(w: &mut W, model: &ComparativeModel) -> io::Result<()>
where
    W: Write,
{
    writeln!(w, "Datasets")?;
    writeln!(
        w,
        "  {:<12} {:>8} {:>9} {:>9} {:>9} {:>9}",
        "Group", "Records", "Complete", "Skipped", "Excluded", "Expected"
    )?;
    writeln!(w, "  {}", "-".repeat(61))?;
    for (group, report) in model.groups() {
        let dataset = &report.dataset;
        let expected = dataset
            .size_check
            .map_or("-".to_owned(), |c| c.expected.to_string());
        writeln!(
            w,
            "  {:<12} {:>8} {:>9} {:>9} {:>9} {:>9}",
            group,
            dataset.records,
            dataset.complete_cases,
            dataset.load_failures,
            dataset.normalization_failures.total(),
            expected,
        )?;
    }
    writeln!(w)
}

/// One row per metric, one column per group.
fn write_metric_table<W>(
    w: &mut W,
    model: &ComparativeModel,
    title: &str,
    rows: &[(&str, MetricKey)],
    precision: usize,
) -> io::Result<()>
where
    W: Write,
{
    writeln!(w, "{title}")?;
    write!(w, "  {:<24}", "")?;
    for group in AgeGroup::ALL {
        write!(w, " {group:>11}")?;
    }
    writeln!(w)?;
    writeln!(w, "  {}", "-".repeat(24 + 12 * AgeGroup::ALL.len()))?;
    for (label, key) in rows {
        write!(w, "  {label:<24}")?;
        for measure in model.compare(key).values() {
            write!(w, " {:>11}", MeasureCell::new(measure, precision))?;
        }
        writeln!(w)?;
    }
    writeln!(w)
}

fn write_importance<W>(w: &mut W, model: &ComparativeModel) -> io::Result<()>
where
    W: Write,
{
    writeln!(w, "Variable importance (standardized coefficients)")?;
    for (group, report) in model.groups() {
        match &report.importance {
            Measure::Value(ranking) => {
                let top = ranking
                    .features
                    .iter()
                    .take(TOP_FEATURES)
                    .map(|f| format!("{}={}", f.feature, MeasureCell::new(&f.coefficient, 2)))
                    .collect::<Vec<_>>();
                writeln!(w, "  {group:<12} {}", top.join("  "))?;
            }
            Measure::Undefined(reason) => writeln!(w, "  {group:<12} undefined ({reason})")?,
            Measure::Unavailable(sample) => writeln!(
                w,
                "  {group:<12} unavailable ({} complete cases, {} required)",
                sample.actual, sample.threshold
            )?,
            Measure::NotComputed => writeln!(w, "  {group:<12} not computed")?,
        }
    }
    writeln!(w)
}

fn write_cross_group<W>(w: &mut W, model: &ComparativeModel) -> io::Result<()>
where
    W: Write,
{
    let tests = model.comparisons();
    writeln!(w, "Cross-group tests")?;
    write_test(w, "score (Kruskal-Wallis)", &tests.score_kruskal_wallis)?;
    write_independence(w, "outcome (chi-square)", &tests.outcome_by_group)?;
    write_independence(w, "jaundice (chi-square)", &tests.jaundice_by_group)?;
    Ok(())
}

fn write_test<W>(w: &mut W, label: &str, test: &Measure<TestResult>) -> io::Result<()>
where
    W: Write,
{
    match test {
        Measure::Value(t) => writeln!(
            w,
            "  {label:<24} stat={:.3} df={} p={:.4}{}",
            t.statistic,
            t.degrees_of_freedom,
            t.p_value,
            if t.is_significant(0.05) { " *" } else { "" }
        ),
        Measure::Undefined(reason) => writeln!(w, "  {label:<24} undefined ({reason})"),
        Measure::Unavailable(_) | Measure::NotComputed => writeln!(w, "  {label:<24} -"),
    }
}

fn write_independence<W>(w: &mut W, label: &str, test: &IndependenceTest) -> io::Result<()>
where
    W: Write,
{
    write_test(w, label, &test.test)?;
    let table = &test.table;
    for (group, percentages) in table.groups.iter().zip(&table.row_percentages) {
        writeln!(
            w,
            "    {group:<12} {} {:>7}%  {} {:>7}%",
            table.columns[0],
            MeasureCell::new(&percentages[0], 1),
            table.columns[1],
            MeasureCell::new(&percentages[1], 1),
        )?;
    }
    Ok(())
}
