use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use chrono::{DateTime, Local};
use csv::StringRecord;
use log::info;
use crate::lib::breakpoints::BreakpointRecord;
use crate::lib::copy_ratio::{
    CalledCopyRatioSegment, CalledCopyRatioSegmentCollection, CopyRatio, CopyRatioCollection,
    SampleMetadata, SegmentCall,
};
use crate::lib::error::Error;
use crate::lib::event::CandidateEvent;
use crate::lib::evidence::{AlignedContig, EvidenceLink};
use crate::lib::interval::{SequenceDictionary, StrandDirection, StrandedInterval, SvInterval};

/// the "no value" symbol of all our tables
const EMPTY_FIELD: &str = ".";

/// Opens a tab-separated table. Lines starting with '#' are comments,
/// the number of columns is checked per reader.
fn tsv_reader(
    path: &Path
) -> Result<csv::Reader<File>,Error> {
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    Ok(
        csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(file)
    )
}

/// Iterates the records of a table, attaching the line number to each one
fn read_records<F, T>(
    path   : &Path,
    mut f  : F
) -> Result<Vec<T>,Error>
where
    F: FnMut(&StringRecord, &Parser) -> Result<Option<T>,Error>,
{
    let mut reader = tsv_reader(path)?;
    let mut result = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line   = record.position().map(|x| x.line()).unwrap_or(0);
        let parser = Parser { path, line };
        if let Some(x) = f(&record, &parser)? {
            result.push(x);
        }
    };
    Ok(result)
}

/// Field level parsing with the position for error reporting
struct Parser<'a> {
    path: &'a Path,
    line: u64,
}

impl<'a> Parser<'a> {
    fn error(&self, msg: String) -> Error {
        Error::Parse { path: self.path.to_path_buf(), line: self.line, msg }
    }

    fn expect_columns(&self, record: &StringRecord, n: usize) -> Result<(),Error> {
        if record.len() != n {
            return Err(self.error(format!("expected {} tab-separated columns, found {}", n, record.len())));
        }
        Ok(())
    }

    fn field<'r>(&self, record: &'r StringRecord, idx: usize) -> Result<&'r str,Error> {
        record.get(idx).ok_or_else(|| self.error(format!("missing column {}", idx + 1)))
    }

    fn parse<T: FromStr>(&self, record: &StringRecord, idx: usize) -> Result<T,Error> {
        let value = self.field(record, idx)?;
        value.parse::<T>().map_err(|_| self.error(format!("could not parse {:?} in column {}", value, idx + 1)))
    }

    fn strand(&self, record: &StringRecord, idx: usize) -> Result<StrandDirection,Error> {
        let value = self.field(record, idx)?;
        StrandDirection::from_symbol(value).ok_or_else(|| self.error(format!("unknown strand {:?}", value)))
    }

    fn flag(&self, record: &StringRecord, idx: usize) -> Result<bool,Error> {
        match self.field(record, idx)? {
            "1" | "true" | "TRUE" | "yes" => Ok(true),
            "0" | "false" | "FALSE" | "no" => Ok(false),
            x => Err(self.error(format!("expected a boolean, found {:?}", x))),
        }
    }
}

/// Reads the chromosome file (`name\tlength` per line) into a dictionary
/// keeping the order of the file. Duplicated names are an error.
///
/// Unittest: TRUE
///
pub fn parse_chrom_file(
    path: &Path
) -> Result<SequenceDictionary,Error> {
    let mut dictionary = SequenceDictionary::new();
    let pairs = read_records(path, |record, parser| {
        parser.expect_columns(record, 2)?;
        Ok(Some((parser.field(record, 0)?.to_string(), parser.parse::<u64>(record, 1)?)))
    })?;
    for (name, length) in pairs {
        dictionary.add_sequence(name, length)?;
    };
    info!("Read {} chromosomes from {:?}", dictionary.len(), path);
    Ok(dictionary)
}

/// Reads breakend records: `id mate_id contig pos contig_names`.
/// A "." marks a missing mate or no supporting contigs, contig names
/// are separated by ';'.
///
/// Unittest: TRUE
///
pub fn read_breakpoints(
    path: &Path
) -> Result<Vec<BreakpointRecord>,Error> {
    let result = read_records(path, |record, parser| {
        parser.expect_columns(record, 5)?;
        let mate_id = match parser.field(record, 1)? {
            EMPTY_FIELD => None,
            x           => Some(x.to_string()),
        };
        let contig_names = match parser.field(record, 4)? {
            EMPTY_FIELD => Vec::new(),
            x           => x.split(';').filter(|n| !n.is_empty()).map(String::from).collect(),
        };
        Ok(Some(BreakpointRecord {
            id: parser.field(record, 0)?.to_string(),
            mate_id,
            contig: parser.field(record, 2)?.to_string(),
            start: parser.parse::<u64>(record, 3)?,
            contig_names,
        }))
    })?;
    info!("Read {} breakpoints from {:?}", result.len(), path);
    Ok(result)
}

/// Reads evidence links:
/// `contigL startL endL strandL contigR startR endR strandR split_reads read_pairs`
///
/// Unittest: TRUE
///
pub fn read_evidence_links(
    path       : &Path,
    dictionary : &SequenceDictionary
) -> Result<Vec<EvidenceLink>,Error> {
    let result = read_records(path, |record, parser| {
        parser.expect_columns(record, 10)?;
        let left = SvInterval::try_new(
            dictionary.resolve(parser.field(record, 0)?)?,
            parser.parse::<u64>(record, 1)?,
            parser.parse::<u64>(record, 2)?,
        )?;
        let right = SvInterval::try_new(
            dictionary.resolve(parser.field(record, 4)?)?,
            parser.parse::<u64>(record, 5)?,
            parser.parse::<u64>(record, 6)?,
        )?;
        Ok(Some(EvidenceLink::new(
            StrandedInterval::new(left, parser.strand(record, 3)?),
            StrandedInterval::new(right, parser.strand(record, 7)?),
            parser.parse::<u32>(record, 8)?,
            parser.parse::<u32>(record, 9)?,
        )))
    })?;
    info!("Read {} evidence links from {:?}", result.len(), path);
    Ok(result)
}

/// Reads aligned assembled contigs: `name contig start end mapped`
pub fn read_aligned_contigs(
    path: &Path
) -> Result<Vec<AlignedContig>,Error> {
    let result = read_records(path, |record, parser| {
        parser.expect_columns(record, 5)?;
        Ok(Some(AlignedContig {
            name: parser.field(record, 0)?.to_string(),
            contig: parser.field(record, 1)?.to_string(),
            start: parser.parse::<u64>(record, 2)?,
            end: parser.parse::<u64>(record, 3)?,
            mapped: parser.flag(record, 4)?,
        }))
    })?;
    info!("Read {} aligned contigs from {:?}", result.len(), path);
    Ok(result)
}

/// Header lines of copy-ratio tables start with '@'.
/// The sample name is taken from a `SM:` tag if one is present.
fn sample_from_header(
    record   : &StringRecord,
    metadata : &mut SampleMetadata
) -> bool {
    match record.get(0) {
        Some(x) if x.starts_with('@') => {
            if let Some(name) = record.iter().find_map(|x| x.strip_prefix("SM:")) {
                metadata.sample_name = name.to_string();
            }
            true
        },
        _ => false,
    }
}

/// Reads copy-ratio bins: `contig start end log2`
///
/// Unittest: TRUE
///
pub fn read_copy_ratios(
    path: &Path
) -> Result<CopyRatioCollection,Error> {
    let mut metadata = SampleMetadata::default();
    let records = read_records(path, |record, parser| {
        if sample_from_header(record, &mut metadata) {
            return Ok(None);
        }
        parser.expect_columns(record, 4)?;
        Ok(Some(CopyRatio {
            contig: parser.field(record, 0)?.to_string(),
            start: parser.parse::<u64>(record, 1)?,
            end: parser.parse::<u64>(record, 2)?,
            log2_copy_ratio: parser.parse::<f64>(record, 3)?,
        }))
    })?;
    info!("Read {} copy ratio bins of sample {:?} from {:?}", records.len(), metadata.sample_name, path);
    Ok(CopyRatioCollection { metadata, records })
}

/// Reads called segments: `contig start end num_points mean_log2 call`
/// with the call being one of "+", "-" or "0"
///
/// Unittest: TRUE
///
pub fn read_copy_ratio_segments(
    path: &Path
) -> Result<CalledCopyRatioSegmentCollection,Error> {
    let mut metadata = SampleMetadata::default();
    let records = read_records(path, |record, parser| {
        if sample_from_header(record, &mut metadata) {
            return Ok(None);
        }
        parser.expect_columns(record, 6)?;
        let symbol = parser.field(record, 5)?;
        let call   = SegmentCall::from_symbol(symbol)
            .ok_or_else(|| parser.error(format!("unknown segment call {:?}", symbol)))?;
        Ok(Some(CalledCopyRatioSegment {
            contig: parser.field(record, 0)?.to_string(),
            start: parser.parse::<u64>(record, 1)?,
            end: parser.parse::<u64>(record, 2)?,
            num_points: parser.parse::<u32>(record, 3)?,
            mean_log2_copy_ratio: parser.parse::<f64>(record, 4)?,
            call,
        }))
    })?;
    info!("Read {} copy ratio segments from {:?}", records.len(), path);
    Ok(CalledCopyRatioSegmentCollection { metadata, records })
}

/// Writes the calls as tab-separated table, preceded by `##` lines with
/// the program version, the date and the command line.
///
/// Unittest: TRUE
///
pub fn write_events_tsv<W: Write>(
    out        : W,
    events     : &[CandidateEvent],
    dictionary : &SequenceDictionary,
    version    : &str,
    command    : &str
) -> Result<(),Error> {
    let now: DateTime<Local> = Local::now();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(out);
    writer.write_record(["##", "depth_sv_caller:", version])?;
    writer.write_record(["##", "date:", now.to_rfc2822().as_str()])?;
    writer.write_record(["##", "command:", command])?;
    writer.write_record([
        "#contig",
        "start",
        "end",
        "svtype",
        "score",
        "rp_support",
        "sr_support",
        "contig_support",
        "rp_counter",
        "sr_counter",
        "mean_log2",
        "cr_bins",
        "breakpoints",
    ])?;
    for event in events.iter() {
        let contig = dictionary
            .sequence_name(event.interval.contig)
            .ok_or_else(|| Error::UnknownContig(event.interval.contig.to_string()))?;
        let breakpoints = match &event.breakpoints {
            Some(x) => format!("{}-{}", x.start, x.end),
            None    => String::from(EMPTY_FIELD),
        };
        writer.write_record(&[
            contig.to_string(),
            event.interval.start.to_string(),
            event.interval.end.to_string(),
            event.sv_type.to_string(),
            format!("{:.4}", event.score),
            event.read_pair_evidence.to_string(),
            event.split_read_evidence.to_string(),
            event.contig_evidence.to_string(),
            event.read_pair_counter_evidence.to_string(),
            event.split_read_counter_evidence.to_string(),
            format!("{:.4}", event.mean_log2_copy_ratio),
            event.copy_ratio_bins.to_string(),
            breakpoints,
        ])?;
    };
    writer.flush().map_err(|e| Error::io(e, "<output>"))?;
    Ok(())
}
