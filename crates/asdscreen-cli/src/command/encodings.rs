use std::path::PathBuf;

use asdscreen_dataset::encoding::EncodingSet;
use clap::Args;

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct EncodingsArg {
    /// Output file path (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EncodingsArg) -> anyhow::Result<()> {
    Output::save_json(&EncodingSet::reference(), arg.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::read_json_file;

    #[test]
    fn test_dumped_encodings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encodings.json");
        run(&EncodingsArg {
            output: Some(path.clone()),
        })
        .unwrap();
        let loaded = EncodingSet::from_path(&path).unwrap();
        assert_eq!(loaded, EncodingSet::reference());
        let raw: serde_json::Value = read_json_file("encodings", &path).unwrap();
        assert_eq!(raw["adult"]["expected_records"], 704);
    }
}
