use std::io::Write;
use std::sync::Mutex;

use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::core::error::Result;
use crate::core::result::SquirlsResult;

/// Consumer of the scored variants. Called concurrently from worker threads in no particular order.
#[cfg_attr(test, automock)]
pub trait ResultSink: Send + Sync {
    fn add(&self, result: &SquirlsResult) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Output row: VCF-like variant fields, the max pathogenicity and, optionally, per-transcript scores.
pub struct SquirlsRecord<'a> {
    result: &'a SquirlsResult,
    transcripts: bool,
}

impl<'a> SquirlsRecord<'a> {
    pub fn new(result: &'a SquirlsResult, transcripts: bool) -> Self {
        Self { result, transcripts }
    }
}

impl Serialize for SquirlsRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let variant = self.result.variant();
        let (pos, reference, alternate) = variant.vcf_fields();

        let mut state = serializer.serialize_struct("SquirlsRecord", if self.transcripts { 6 } else { 5 })?;
        state.serialize_field("contig", variant.contig())?;
        state.serialize_field("pos", &pos)?;
        state.serialize_field("ref", &reference)?;
        state.serialize_field("alt", &alternate)?;
        state.serialize_field("max_pathogenicity", &format!("{:.3}", self.result.max_pathogenicity()))?;
        if self.transcripts {
            let scores = self
                .result
                .transcripts()
                .iter()
                .map(|x| format!("{}={:.3}", x.accession(), x.max_pathogenicity()))
                .join("|");
            state.serialize_field("transcripts", &scores)?;
        }
        state.end()
    }
}

/// Tab separated output, rows are written in the order they are received.
pub struct TsvSink<W: Write> {
    writer: Mutex<csv::Writer<W>>,
    transcripts: bool,
}

impl<W: Write> TsvSink<W> {
    pub fn new(saveto: W, transcripts: bool) -> Self {
        let writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(saveto);
        Self { writer: Mutex::new(writer), transcripts }
    }

    pub fn into_inner(self) -> Result<W> {
        let writer = self.writer.into_inner().unwrap_or_else(|x| x.into_inner());
        writer.into_inner().map_err(|x| x.into_error().into())
    }
}

impl<W: Write + Send> ResultSink for TsvSink<W> {
    fn add(&self, result: &SquirlsResult) -> Result<()> {
        // a panicked writer thread doesn't invalidate already written rows
        let mut writer = self.writer.lock().unwrap_or_else(|x| x.into_inner());
        writer.serialize(SquirlsRecord::new(result, self.transcripts))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().unwrap_or_else(|x| x.into_inner()).flush()?;
        Ok(())
    }
}

/// Keeps all results in memory.
#[derive(Default)]
pub struct CollectingSink {
    results: Mutex<Vec<SquirlsResult>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.lock().map_or(0, |x| x.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_results(self) -> Vec<SquirlsResult> {
        self.results.into_inner().unwrap_or_else(|x| x.into_inner())
    }
}

impl ResultSink for CollectingSink {
    fn add(&self, result: &SquirlsResult) -> Result<()> {
        self.results.lock().unwrap_or_else(|x| x.into_inner()).push(result.clone());
        Ok(())
    }
}
