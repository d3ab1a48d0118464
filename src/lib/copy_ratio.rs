use std::fmt;
use log::debug;
use crate::lib::error::Error;
use crate::lib::interval::{SequenceDictionary, SvInterval};
use crate::lib::interval_tree::SvIntervalTree;

/// sample information shared by all records of a collection
#[derive(Debug,Clone,Default,PartialEq,Eq)]
pub struct SampleMetadata {
    pub sample_name: String,
}

/// A single depth-of-coverage bin with its denoised log2 copy ratio.
/// Coordinates are 1-based, inclusive.
#[derive(Debug,Clone,PartialEq)]
pub struct CopyRatio {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub log2_copy_ratio: f64,
}

/// the call made by the segmentation for a segment
#[derive(Debug,Clone,Copy,Hash,Eq,PartialEq)]
pub enum SegmentCall {
    Amplification,
    Deletion,
    Neutral,
}

impl SegmentCall {
    /// parses the "+", "-", "0" notation of the segment caller
    pub fn from_symbol(symbol: &str) -> Option<SegmentCall> {
        match symbol {
            "+" => Some(SegmentCall::Amplification),
            "-" => Some(SegmentCall::Deletion),
            "0" => Some(SegmentCall::Neutral),
            _   => None,
        }
    }
}

impl fmt::Display for SegmentCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentCall::Amplification => write!(f, "+"),
            SegmentCall::Deletion      => write!(f, "-"),
            SegmentCall::Neutral       => write!(f, "0"),
        }
    }
}

/// A called copy-ratio segment as produced by the
/// external segmentation, coordinates 1-based inclusive
#[derive(Debug,Clone,PartialEq)]
pub struct CalledCopyRatioSegment {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    // number of bins in the segment
    pub num_points: u32,
    pub mean_log2_copy_ratio: f64,
    pub call: SegmentCall,
}

/// copy-ratio bins of one sample
#[derive(Debug,Clone,Default,PartialEq)]
pub struct CopyRatioCollection {
    pub metadata: SampleMetadata,
    pub records: Vec<CopyRatio>,
}

/// called segments of one sample
#[derive(Debug,Clone,Default,PartialEq)]
pub struct CalledCopyRatioSegmentCollection {
    pub metadata: SampleMetadata,
    pub records: Vec<CalledCopyRatioSegment>,
}

/// An interval index over copy-ratio data together with
/// the metadata of the collection it came from
#[derive(Debug,Clone,Default)]
pub struct CopyRatioIndex<T> {
    pub metadata: SampleMetadata,
    pub tree: SvIntervalTree<T>,
}

impl<T> CopyRatioIndex<T> {
    pub fn overlappers<'a>(&'a self, query: &SvInterval) -> impl Iterator<Item = &'a T> + 'a {
        self.tree.overlappers(query).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl CopyRatio {
    pub fn interval(&self, dictionary: &SequenceDictionary) -> Result<SvInterval,Error> {
        SvInterval::try_new(dictionary.resolve(&self.contig)?, self.start, self.end)
    }
}

impl CalledCopyRatioSegment {
    pub fn interval(&self, dictionary: &SequenceDictionary) -> Result<SvInterval,Error> {
        SvInterval::try_new(dictionary.resolve(&self.contig)?, self.start, self.end)
    }
}

impl CopyRatioCollection {
    /// Keeps only the bins which, after padding by `padding`, overlap any of the
    /// provided evidence trees. Everything else is far away from any candidate
    /// and not needed. Metadata is carried over.
    ///
    /// Unittest: TRUE
    ///
    pub fn overlapping_evidence(
        &self,
        evidence_trees : &[&dyn EvidenceOverlap],
        padding        : u64,
        dictionary     : &SequenceDictionary
    ) -> Result<CopyRatioIndex<CopyRatio>,Error> {
        let mut tree : SvIntervalTree<CopyRatio> = SvIntervalTree::new();
        for ratio in &self.records {
            let interval = ratio.interval(dictionary)?;
            let padded   = interval.pad(padding, dictionary);
            if evidence_trees.iter().any(|x| x.has_overlapper(&padded)) {
                tree.put(interval, ratio.clone());
            }
        };
        debug!("Kept {} of {} copy ratio bins close to evidence", tree.len(), self.records.len());
        Ok(CopyRatioIndex {
            metadata: self.metadata.clone(),
            tree,
        })
    }
}

impl CalledCopyRatioSegmentCollection {
    /// indexes all segments for overlap queries
    pub fn overlap_detector(
        &self,
        dictionary : &SequenceDictionary
    ) -> Result<CopyRatioIndex<CalledCopyRatioSegment>,Error> {
        let mut tree : SvIntervalTree<CalledCopyRatioSegment> = SvIntervalTree::new();
        for segment in &self.records {
            tree.put(segment.interval(dictionary)?, segment.clone());
        };
        Ok(CopyRatioIndex {
            metadata: self.metadata.clone(),
            tree,
        })
    }
}

/// Anything which can tell if it holds something overlapping an interval.
/// Lets us filter bins against trees of different payloads in one go.
pub trait EvidenceOverlap {
    fn has_overlapper(&self, query: &SvInterval) -> bool;
}

impl<T> EvidenceOverlap for SvIntervalTree<T> {
    fn has_overlapper(&self, query: &SvInterval) -> bool {
        SvIntervalTree::has_overlapper(self, query)
    }
}


#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;

    fn test_dictionary() -> SequenceDictionary {
        SequenceDictionary::from_pairs(vec![("chr1", 1000000_u64), ("chr2", 1000000_u64)]).unwrap()
    }

    fn bin(contig: &str, start: u64, end: u64, log2: f64) -> CopyRatio {
        CopyRatio { contig: contig.to_string(), start, end, log2_copy_ratio: log2 }
    }

    #[test]
    fn filter_bins_near_evidence(){
        let dict = test_dictionary();
        let collection = CopyRatioCollection {
            metadata: SampleMetadata { sample_name: String::from("S1") },
            records: vec![
                bin("chr1", 1, 1000, 0.0),
                bin("chr1", 5001, 6000, 0.5),
                bin("chr1", 20001, 21000, 0.1),
                bin("chr2", 5001, 6000, 0.5),
            ],
        };
        let mut breakpoints : SvIntervalTree<u8> = SvIntervalTree::new();
        breakpoints.put(SvInterval::new(0, 7000, 8000), 0);
        let mut links : SvIntervalTree<u8> = SvIntervalTree::new();
        links.put(SvInterval::new(1, 100, 200), 0);

        let index = collection.overlapping_evidence(&[&breakpoints, &links], 1000, &dict).unwrap();
        assert_eq!(index.metadata.sample_name, "S1");
        // chr1:5001-6000 padded reaches 7000, chr1:1-1000 is too far, chr2 bin too far from 100-200
        assert_eq!(index.len(), 1);
        let kept : Vec<&CopyRatio> = index.overlappers(&SvInterval::new(0, 1, 100000)).collect();
        assert_eq!(kept[0].start, 5001);

        let index = collection.overlapping_evidence(&[&breakpoints, &links], 5000, &dict).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn bins_on_unknown_contigs_fail(){
        let dict = test_dictionary();
        let collection = CopyRatioCollection {
            metadata: SampleMetadata::default(),
            records: vec![bin("chrM", 1, 100, 0.0)],
        };
        let empty : SvIntervalTree<u8> = SvIntervalTree::new();
        assert!(collection.overlapping_evidence(&[&empty], 0, &dict).is_err());
    }

    #[test]
    fn segment_detector(){
        let dict = test_dictionary();
        let segments = CalledCopyRatioSegmentCollection {
            metadata: SampleMetadata::default(),
            records: vec![
                CalledCopyRatioSegment { contig: String::from("chr1"), start: 1, end: 5000, num_points: 5, mean_log2_copy_ratio: 0.0, call: SegmentCall::Neutral },
                CalledCopyRatioSegment { contig: String::from("chr1"), start: 5001, end: 9000, num_points: 4, mean_log2_copy_ratio: 0.58, call: SegmentCall::Amplification },
            ],
        };
        let detector = segments.overlap_detector(&dict).unwrap();
        let hits : Vec<SegmentCall> = detector.overlappers(&SvInterval::new(0, 4000, 6000)).map(|x| x.call).collect();
        assert_eq!(hits, vec![SegmentCall::Neutral, SegmentCall::Amplification]);
        assert_eq!(SegmentCall::from_symbol("+"), Some(SegmentCall::Amplification));
        assert_eq!(SegmentCall::Deletion.to_string(), "-");
    }
}
