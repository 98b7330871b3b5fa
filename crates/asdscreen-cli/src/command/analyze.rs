use std::path::PathBuf;

use clap::Args;

use crate::{command::SourceArg, util::Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    pub source: SourceArg,

    /// Output file path (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let model = arg.source.run_pipeline()?;
    for missing in model.missing_groups() {
        log::warn!("{} group missing from the model: {}", missing.group, missing.reason);
    }
    Output::save_json(&model, arg.output.as_deref())
}
