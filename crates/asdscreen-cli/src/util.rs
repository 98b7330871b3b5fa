use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use asdscreen_analysis::report::ComparativeModel;
use asdscreen_stats::measure::Measure;

/// Destination of a JSON document: stdout or a file.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::stdout(),
        };
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            log::info!("wrote {}", path.display());
        }
        Ok(())
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a comparative model written by `analyze`
pub fn read_model_file<P>(path: P) -> anyhow::Result<ComparativeModel>
where
    P: AsRef<Path>,
{
    read_json_file("model", path)
}

/// Table cell for a [`Measure<f64>`] with a fixed precision.
///
/// Values are right-aligned numbers; non-values render as short labels so
/// that an undefined statistic never reads as a number.
pub struct MeasureCell<'a> {
    pub measure: &'a Measure<f64>,
    pub precision: usize,
}

impl<'a> MeasureCell<'a> {
    pub fn new(measure: &'a Measure<f64>, precision: usize) -> Self {
        Self { measure, precision }
    }
}

impl fmt::Display for MeasureCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.measure {
            Measure::Value(v) => format!("{v:.prec$}", prec = self.precision),
            Measure::Undefined(_) => "undef".to_owned(),
            Measure::Unavailable(sample) => format!("n<{}", sample.threshold),
            Measure::NotComputed => "-".to_owned(),
        };
        f.pad(&text)
    }
}

#[cfg(test)]
mod tests {
    use asdscreen_stats::measure::{InsufficientSample, UndefinedReason};

    use super::*;

    #[test]
    fn test_measure_cell() {
        let cell = |m: Measure<f64>| format!("{:>8}", MeasureCell::new(&m, 2));
        assert_eq!(cell(Measure::Value(0.1234)), "    0.12");
        assert_eq!(
            cell(Measure::Undefined(UndefinedReason::ZeroReference)),
            "   undef"
        );
        assert_eq!(
            cell(Measure::Unavailable(InsufficientSample {
                threshold: 30,
                actual: 4
            })),
            "    n<30"
        );
        assert_eq!(cell(Measure::NotComputed), "       -");
    }

    #[test]
    fn test_save_and_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.json");
        Output::save_json(&[1, 2, 3], Some(path.as_path())).unwrap();
        let value: Vec<u32> = read_json_file("test", &path).unwrap();
        assert_eq!(value, [1, 2, 3]);
        assert!(read_json_file::<Vec<u32>, _>("test", dir.path().join("absent.json")).is_err());
    }
}
