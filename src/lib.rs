use chrono::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};
pub mod chart;
pub mod display;
pub mod error;
pub mod plot;

pub use error::{Error, LoadError, RenderError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_INPUT: &str = "line-count.dat";
pub const DEFAULT_OUTPUT: &str = "line_count_growth.png";

pub const CHART_TITLE: &str = "Growth of Lines of Code Over Time";
pub const X_DESC: &str = "Date";
pub const Y_DESC: &str = "Lines of Code";
pub const SOURCE_LABEL: &str = "Lines of code in source files";
pub const TEST_LABEL: &str = "Lines of code in test files";

/// width and height in pixels of the rendered figure
pub const FIGURE_SIZE: (u32, u32) = (1200, 600);

/// One date-stamped pair of line counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub date: NaiveDate,
    pub source_lines: u64,
    pub test_lines: u64,
}

/// The main struct for the line count time series,
/// kept column-wise and in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub date: Vec<NaiveDate>,
    pub source_lines: Vec<u64>,
    pub test_lines: Vec<u64>,
}

impl LineCounts {
    pub fn new(capacity: usize) -> LineCounts {
        LineCounts {
            date: Vec::with_capacity(capacity),
            source_lines: Vec::with_capacity(capacity),
            test_lines: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, m: Measurement) {
        self.date.push(m.date);
        self.source_lines.push(m.source_lines);
        self.test_lines.push(m.test_lines);
    }

    pub fn len(&self) -> usize {
        self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Measurement> {
        Some(Measurement {
            date: *self.date.get(i)?,
            source_lines: *self.source_lines.get(i)?,
            test_lines: *self.test_lines.get(i)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Measurement> + '_ {
        self.date
            .iter()
            .zip(self.source_lines.iter())
            .zip(self.test_lines.iter())
            .map(|((&date, &source_lines), &test_lines)| Measurement {
                date,
                source_lines,
                test_lines,
            })
    }

    /// Init a LineCounts from the space separated `line-count.dat` file.
    /// Any malformed line aborts the whole load.
    pub fn from_dat(fin: &Path) -> Result<LineCounts, LoadError> {
        let file = File::open(fin).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                path: fin.to_path_buf(),
            },
            _ => LoadError::Io {
                path: fin.to_path_buf(),
                source: e,
            },
        })?;
        let linecounts = LineCounts::from_reader(BufReader::new(file))?;
        info!("read {} measurements from {}", linecounts.len(), fin.display());
        Ok(linecounts)
    }

    /// Parses `<date> <source_lines> <test_lines>` lines, skipping blank ones.
    pub fn from_reader<R: BufRead>(buf: R) -> Result<LineCounts, LoadError> {
        let mut linecounts = LineCounts::new(1024);
        for (i, l) in buf.lines().enumerate() {
            let line = i + 1;
            let l = l.map_err(|source| LoadError::Read { line, source })?;
            if l.trim().is_empty() {
                continue;
            }
            linecounts.push(parse_line(&l, line)?);
        }
        if linecounts.is_empty() {
            return Err(LoadError::Empty);
        }
        debug!("parsed {} rows", linecounts.len());
        Ok(linecounts)
    }
}

fn parse_line(l: &str, line: usize) -> Result<Measurement, LoadError> {
    let fields: Vec<&str> = l.split_whitespace().collect();
    let (d, s, t) = match fields[..] {
        [d, s, t] => (d, s, t),
        _ => {
            return Err(LoadError::FieldCount {
                line,
                found: fields.len(),
            })
        }
    };
    let date = NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|source| LoadError::Date {
        line,
        value: d.to_string(),
        source,
    })?;
    Ok(Measurement {
        date,
        source_lines: parse_count(s, "source_lines", line)?,
        test_lines: parse_count(t, "test_lines", line)?,
    })
}

fn parse_count(v: &str, column: &'static str, line: usize) -> Result<u64, LoadError> {
    v.parse().map_err(|source| LoadError::Count {
        line,
        column,
        value: v.to_string(),
        source,
    })
}

impl std::fmt::Display for LineCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "date source_lines test_lines")?;
        for m in self.rows() {
            writeln!(
                f,
                "{} {} {}",
                m.date.format(DATE_FORMAT),
                m.source_lines,
                m.test_lines
            )?
        }
        Ok(())
    }
}

/// Loads `datin`, plots it to `pngout` and, if asked and possible, shows the figure.
/// Nothing is written when the load fails.
pub fn run(datin: &Path, pngout: &Path, show: bool) -> Result<(), Error> {
    let linecounts = LineCounts::from_dat(datin)?;
    linecounts.plot_png(pngout)?;
    info!("saved figure to {}", pngout.display());
    if !show {
        return Ok(());
    }
    if !display::display_available() {
        info!("no display available, skipping the interactive figure");
        return Ok(());
    }
    let rgb = linecounts.plot_rgb()?;
    display::show_rgb(CHART_TITLE, &rgb, FIGURE_SIZE)?;
    Ok(())
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut s_iter = s.iter();
    let (mut min, mut max) = match s_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in s_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// label format for the date axis, from the span of the data:
/// coarser for longer histories, down to hours for the first week
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    if d > chrono::Duration::days(3 * 365) {
        "%Y"
    } else if d > chrono::Duration::days(180) {
        "%Y-%m"
    } else if d > chrono::Duration::weeks(1) {
        "%Y-%m-%d"
    } else {
        "%m-%d %H"
    }
}
