use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use log::{debug,warn};
use crate::lib::error::Error;
use crate::lib::interval::{SequenceDictionary, SvInterval};

/// The essential information of a single breakend record
/// as provided by the upstream assembly based caller.
/// Positions are 1-based.
#[derive(Debug,Clone,Default,PartialEq,Eq)]
pub struct BreakpointRecord {
    // the BND ID
    pub id: String,
    // the matching mate BND ID, if any
    pub mate_id: Option<String>,
    // the reference contig name
    pub contig: String,
    // position of the breakend
    pub start: u64,
    // names of the assembled contigs supporting the breakend
    pub contig_names: Vec<String>,
}

/// Two mated breakends on the same contig. `start` always holds the
/// upstream breakend, so `start <= end`, and the supporting contig names
/// are kept per side.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct BreakpointPair {
    pub contig: u32,
    pub start: u64,
    pub end: u64,
    pub left_contig_names: Vec<String>,
    pub right_contig_names: Vec<String>,
}

impl BreakpointPair {
    pub fn interval(&self) -> SvInterval {
        SvInterval::new(self.contig, self.start, self.end)
    }

    pub fn left_point(&self) -> SvInterval {
        SvInterval::point(self.contig, self.start)
    }

    pub fn right_point(&self) -> SvInterval {
        SvInterval::point(self.contig, self.end)
    }

    /// true if one of the two sides names the assembled contig
    pub fn has_supporting_contig(&self, name: &str) -> bool {
        self.left_contig_names.iter().chain(self.right_contig_names.iter()).any(|x| x == name)
    }
}


/// Pairs breakend records through their ID and MATEID fields in a single pass.
/// Records without a mate are ignored, records waiting for their mate are parked.
/// If two records reference each other inconsistently (A names B as mate but
/// B names somebody else) the input is broken and we fail with `MateMismatch`,
/// independent of which of both came first.
/// Mates on different contigs are no intrachromosomal pairs and are dropped.
/// Records whose mate never showed up are reported as a warning, a second
/// record with the ID of a parked one is an error.
///
/// Unittest: TRUE
///
pub fn pair_breakpoints(
    records    : &[BreakpointRecord],
    dictionary : &SequenceDictionary
) -> Result<Vec<BreakpointPair>,Error> {
    // parked records by their ID, insertion ordered to report them reproducibly
    let mut unpaired  : IndexMap<&str,&BreakpointRecord> = IndexMap::new();
    // mate ID -> ID of the parked record claiming it
    let mut claimed   : FxHashMap<&str,&str> = FxHashMap::default();
    let mut pairs     : Vec<BreakpointPair> = Vec::with_capacity(records.len() / 2);
    let mut interchrom = 0_u64;

    for record in records {
        let mate = match &record.mate_id {
            Some(x) => x.as_str(),
            None    => {
                debug!("No MATEID encountered for {}", record.id);
                continue
            }
        };
        if let Some(other) = unpaired.shift_remove(mate) {
            if !is_breakpoint_pair(record, other) {
                return Err(mate_mismatch(record, other));
            }
            claimed.remove(record.id.as_str());
            if record.contig != other.contig {
                debug!("Mates {} and {} are on different contigs", record.id, other.id);
                interchrom += 1;
                continue
            }
            let contig = dictionary.resolve(&record.contig)?;
            let (first, second) = if record.start < other.start {
                (record, other)
            } else {
                (other, record)
            };
            let pair = BreakpointPair {
                contig,
                start: first.start,
                end: second.start,
                left_contig_names: first.contig_names.clone(),
                right_contig_names: second.contig_names.clone(),
            };
            debug!("Paired {} and {} into {:?}", first.id, second.id, pair);
            pairs.push(pair);
        } else if let Some(other) = claimed.get(record.id.as_str()).and_then(|x| unpaired.get(*x)) {
            // somebody waits for this record but it names another mate
            return Err(mate_mismatch(record, other));
        } else {
            if unpaired.contains_key(record.id.as_str()) {
                return Err(Error::DuplicateBreakpointId(record.id.clone()));
            }
            unpaired.insert(record.id.as_str(), record);
            claimed.insert(mate, record.id.as_str());
        }
    };
    if interchrom != 0 {
        warn!("There were {} breakpoint pairs spanning two contigs which were ignored.", interchrom);
    }
    if !unpaired.is_empty() {
        warn!("There were {} unpaired breakpoint variants with a MATEID attribute.", unpaired.len());
    }
    Ok(pairs)
}

/// true if both records name each other as mate
fn is_breakpoint_pair(
    first  : &BreakpointRecord,
    second : &BreakpointRecord
) -> bool {
    first.mate_id.as_deref() == Some(second.id.as_str())
        && second.mate_id.as_deref() == Some(first.id.as_str())
}

fn mate_mismatch(
    first  : &BreakpointRecord,
    second : &BreakpointRecord
) -> Error {
    Error::MateMismatch {
        first  : format!("{}:{}:{}->{}", first.contig, first.start, first.id, first.mate_id.as_deref().unwrap_or(".")),
        second : format!("{}:{}:{}->{}", second.contig, second.start, second.id, second.mate_id.as_deref().unwrap_or(".")),
    }
}
