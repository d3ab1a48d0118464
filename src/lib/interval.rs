use rustc_hash::FxHashMap;
use std::cmp;
use std::convert::TryFrom;
use std::fmt;
use std::ops::Range;
use crate::lib::error::Error;

/// this describes possible directions of one side
/// of a read-pair link. For a link we always know the
/// orientation of the reads but stay compatible with
/// sources where the direction could not be determined
#[derive(Debug,Clone,Copy,Hash,Eq,PartialEq,Default)]
pub enum StrandDirection {
    Fwd,
    Rev,
    #[default]
    Unknown,
}

impl StrandDirection {
    /// parses the usual "+", "-" and "." notation
    pub fn from_symbol(symbol: &str) -> Option<StrandDirection> {
        match symbol {
            "+" | "1"  => Some(StrandDirection::Fwd),
            "-" | "-1" => Some(StrandDirection::Rev),
            "."        => Some(StrandDirection::Unknown),
            _          => None,
        }
    }
}


/// A genomic interval on a contig which is identified by
/// its index in the sequence dictionary.
/// Positions are 1-based and the end is inclusive, therefore
/// a single base has a length of 1.
/// The derived ordering is (contig, start, end).
#[derive(Debug,Clone,Copy,Hash,Eq,PartialEq,PartialOrd,Ord)]
pub struct SvInterval {
    // index of the contig in the dictionary
    pub contig: u32,
    // first base, 1-based
    pub start: u64,
    // last base, inclusive
    pub end: u64,
}

impl SvInterval {
    /// Panics if start > end, use `try_new` for
    /// coordinates which come from the outside
    pub fn new(contig: u32, start: u64, end: u64) -> SvInterval {
        assert!(start <= end, "ERROR: interval start {} is larger than end {}!", start, end);
        SvInterval { contig, start, end }
    }

    pub fn try_new(contig: u32, start: u64, end: u64) -> Result<SvInterval, Error> {
        if start > end {
            return Err(Error::InvalidInterval { contig, start, end });
        }
        Ok(SvInterval { contig, start, end })
    }

    /// a single base interval
    pub fn point(contig: u32, pos: u64) -> SvInterval {
        SvInterval { contig, start: pos, end: pos }
    }

    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn midpoint(&self) -> u64 {
        (self.start + self.end) / 2
    }

    /// true if both share at least one base on the same contig
    pub fn overlaps(&self, other: &SvInterval) -> bool {
        self.contig == other.contig && self.start <= other.end && other.start <= self.end
    }

    /// number of shared bases, 0 on different contigs
    pub fn overlap_len(&self, other: &SvInterval) -> u64 {
        if !self.overlaps(other) {
            return 0;
        }
        cmp::min(self.end, other.end) - cmp::max(self.start, other.start) + 1
    }

    /// The intersection divided by the length of the longer of both intervals.
    /// Symmetric, and 1.0 only for identical intervals.
    pub fn reciprocal_overlap_fraction(&self, other: &SvInterval) -> f64 {
        let overlap = self.overlap_len(other);
        if overlap == 0 {
            return 0.0;
        }
        overlap as f64 / cmp::max(self.length(), other.length()) as f64
    }

    /// Extends both ends by `amount` but never beyond the first base
    /// or the last base of the contig. Contigs without a known length
    /// are only clamped at the start.
    pub fn pad(&self, amount: u64, dictionary: &SequenceDictionary) -> SvInterval {
        let start = cmp::max(1, self.start.saturating_sub(amount));
        let mut end = self.end.saturating_add(amount);
        if let Some(length) = dictionary.sequence_length(self.contig) {
            end = cmp::min(end, length);
        }
        // only happens for intervals which already exceeded the contig
        let start = cmp::min(start, end);
        SvInterval { contig: self.contig, start, end }
    }

    /// half-open range as needed by the interval tree
    pub fn to_range(&self) -> Range<u64> {
        self.start..self.end.saturating_add(1)
    }
}

impl fmt::Display for SvInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}


/// An interval together with the orientation of the
/// reads which were observed on it
#[derive(Debug,Clone,Copy,Hash,Eq,PartialEq)]
pub struct StrandedInterval {
    pub interval: SvInterval,
    pub strand: StrandDirection,
}

impl StrandedInterval {
    pub fn new(interval: SvInterval, strand: StrandDirection) -> StrandedInterval {
        StrandedInterval { interval, strand }
    }
}


/// The ordered set of contigs of the reference.
/// Contig names are resolved once into their index which is then used
/// by all intervals of a run.
#[derive(Debug,Clone,Default)]
pub struct SequenceDictionary {
    names   : Vec<String>,
    lengths : Vec<u64>,
    index   : FxHashMap<String,u32>,
}

impl SequenceDictionary {
    pub fn new() -> SequenceDictionary {
        SequenceDictionary::default()
    }

    /// builds the dictionary from (name,length) pairs in the provided order
    pub fn from_pairs<I, S>(pairs: I) -> Result<SequenceDictionary, Error>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut dictionary = SequenceDictionary::new();
        for (name, length) in pairs {
            dictionary.add_sequence(name, length)?;
        }
        Ok(dictionary)
    }

    /// appends a contig and returns its index
    pub fn add_sequence<S: Into<String>>(&mut self, name: S, length: u64) -> Result<u32, Error> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::Parameter(format!("chromosome {} twice encountered", name)));
        }
        let idx = u32::try_from(self.names.len())
            .map_err(|_| Error::Parameter(String::from("too many contigs in dictionary")))?;
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        self.lengths.push(length);
        Ok(idx)
    }

    pub fn sequence_index(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    /// like `sequence_index` but an unknown contig is an error
    pub fn resolve(&self, name: &str) -> Result<u32, Error> {
        self.sequence_index(name).ok_or_else(|| Error::UnknownContig(name.to_string()))
    }

    pub fn sequence_length(&self, index: u32) -> Option<u64> {
        self.lengths.get(index as usize).copied()
    }

    pub fn sequence_name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
