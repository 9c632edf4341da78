//! Writes labelled segments out as `time,value` text files, one per segment.

use crate::{
    classification::{Label, Segment},
    lightcurve::{Real, Timestamp},
};
use proba2gi_common::{FILE_TIMESTAMP_FORMAT, TIMESTAMP_FORMAT};
use std::{
    fs::File,
    io::{BufWriter, Error, Write},
    path::{Path, PathBuf},
};

pub(crate) trait SavablePoint {
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error>;
}

impl SavablePoint for (Timestamp, Real) {
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error> {
        writeln!(file, "{0},{1}", self.0.format(TIMESTAMP_FORMAT), self.1)
    }
}

pub trait SaveToFileFilter<I>
where
    I: Iterator,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator<Item = (Timestamp, Real)>,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "time,value")?;
        for item in self {
            item.write_to_file(&mut file)?;
        }
        file.flush()
    }
}

/// File name for a segment, e.g. `20110215_034500_w3_s1_between_spikes.csv`,
/// stamped with the segment's first sample (or `empty` if it has none).
pub fn segment_file_name(segment: &Segment, label: Label) -> PathBuf {
    let stamp = segment.series.first().map_or_else(
        || "empty".to_owned(),
        |time| time.format(FILE_TIMESTAMP_FORMAT).to_string(),
    );
    PathBuf::from(format!(
        "{stamp}_w{}_s{}_{label}.csv",
        segment.parent_index, segment.position_index
    ))
}

/// Saves `segment` under `directory`, returning the path written.
pub fn save_segment(directory: &Path, segment: &Segment, label: Label) -> Result<PathBuf, Error> {
    let path = directory.join(segment_file_name(segment, label));
    segment.series.iter().save_to_file(&path)?;
    Ok(path)
}
