use std::{io::Write as _, path::PathBuf};

use anyhow::Context;
use asdscreen_analysis::{metric::MetricKey, report::ComparativeModel};
use asdscreen_dataset::group::AgeGroup;
use asdscreen_stats::measure::Measure;
use clap::Args;

use crate::util::{self, MeasureCell};

#[derive(Debug, Clone, Args)]
pub(crate) struct QueryArg {
    /// Comparative model JSON written by `analyze`
    pub model: PathBuf,

    /// Metric key, e.g. `detection_rate`, `item_discrimination:A3`, `relative_risk:jaundice`
    pub metric: MetricKey,

    /// Only print this group (child, adolescent or adult)
    #[arg(long)]
    pub group: Option<AgeGroup>,
}

pub(crate) fn run(arg: &QueryArg) -> anyhow::Result<()> {
    let model = util::read_model_file(&arg.model)?;
    let mut stdout = std::io::stdout().lock();
    for line in render(&model, &arg.metric, arg.group) {
        writeln!(stdout, "{line}").context("Failed to write to stdout")?;
    }
    Ok(())
}

fn render(model: &ComparativeModel, key: &MetricKey, group: Option<AgeGroup>) -> Vec<String> {
    let groups = match group {
        Some(group) => vec![group],
        None => AgeGroup::ALL.to_vec(),
    };
    groups
        .into_iter()
        .map(|group| {
            let measure = model.metric(group, key);
            let detail = match measure {
                Measure::Undefined(reason) => format!(" ({reason})"),
                Measure::Unavailable(sample) => {
                    format!(" ({} < {})", sample.actual, sample.threshold)
                }
                _ => String::new(),
            };
            format!(
                "{group:<12} {key} = {}{detail}",
                MeasureCell::new(&measure, 4)
            )
        })
        .collect()
}
