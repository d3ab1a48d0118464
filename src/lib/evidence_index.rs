use log::info;
use crate::lib::breakpoints::{pair_breakpoints, BreakpointPair, BreakpointRecord};
use crate::lib::copy_ratio::{
    CalledCopyRatioSegment, CalledCopyRatioSegmentCollection, CopyRatio, CopyRatioCollection,
    CopyRatioIndex, EvidenceOverlap,
};
use crate::lib::error::Error;
use crate::lib::evidence::{build_contig_tree, build_link_tree, classify_links, AlignedContig, EvidenceLink};
use crate::lib::interval::SequenceDictionary;
use crate::lib::interval_tree::SvIntervalTree;

/// link trees are built without padding, paddings are applied on the query side
const LINK_TREE_PADDING: u64 = 0;

/// All read-only indices the caller and the event factories search.
/// Built once, never modified afterwards.
#[derive(Debug)]
pub struct EvidenceIndex {
    pub dictionary: SequenceDictionary,
    // one spanning interval per link
    pub intrachromosomal_links: SvIntervalTree<EvidenceLink>,
    // two entries per link, one for each side
    pub interchromosomal_links: SvIntervalTree<EvidenceLink>,
    pub contig_tree: SvIntervalTree<AlignedContig>,
    pub copy_ratios: CopyRatioIndex<CopyRatio>,
    pub copy_ratio_segments: CopyRatioIndex<CalledCopyRatioSegment>,
    pub breakpoint_pairs: Vec<BreakpointPair>,
}

/// Collects the inputs of the `EvidenceIndex`.
/// Every input has to be provided, an empty collection is fine
/// but a missing one aborts the build.
#[derive(Debug,Default)]
pub struct EvidenceIndexBuilder {
    breakpoints: Option<Vec<BreakpointRecord>>,
    assembled_contigs: Option<Vec<AlignedContig>>,
    links: Option<Vec<EvidenceLink>>,
    copy_ratios: Option<CopyRatioCollection>,
    copy_ratio_segments: Option<CalledCopyRatioSegmentCollection>,
    dictionary: Option<SequenceDictionary>,
}

impl EvidenceIndexBuilder {
    pub fn new() -> EvidenceIndexBuilder {
        EvidenceIndexBuilder::default()
    }

    pub fn breakpoints(mut self, breakpoints: Vec<BreakpointRecord>) -> Self {
        self.breakpoints = Some(breakpoints);
        self
    }

    pub fn assembled_contigs(mut self, contigs: Vec<AlignedContig>) -> Self {
        self.assembled_contigs = Some(contigs);
        self
    }

    pub fn evidence_links(mut self, links: Vec<EvidenceLink>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn copy_ratios(mut self, copy_ratios: CopyRatioCollection) -> Self {
        self.copy_ratios = Some(copy_ratios);
        self
    }

    pub fn copy_ratio_segments(mut self, segments: CalledCopyRatioSegmentCollection) -> Self {
        self.copy_ratio_segments = Some(segments);
        self
    }

    pub fn dictionary(mut self, dictionary: SequenceDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Builds all trees. `hmm_padding` is the distance within which copy-ratio
    /// bins have to be to any breakpoint pair or link to be kept.
    pub fn build(self, hmm_padding: u64) -> Result<EvidenceIndex,Error> {
        let breakpoints = self.breakpoints.ok_or(Error::MissingInput("breakpoints"))?;
        let contigs     = self.assembled_contigs.ok_or(Error::MissingInput("assembled contigs"))?;
        let links       = self.links.ok_or(Error::MissingInput("evidence target links"))?;
        let copy_ratios = self.copy_ratios.ok_or(Error::MissingInput("copy ratios"))?;
        let segments    = self.copy_ratio_segments.ok_or(Error::MissingInput("copy ratio segments"))?;
        let dictionary  = self.dictionary.ok_or(Error::MissingInput("sequence dictionary"))?;

        info!("Building interval trees...");
        let (intrachromosomal, interchromosomal) = classify_links(links);
        // the trees are independent of each other
        let ((intrachromosomal_links, interchromosomal_links), contig_tree) = rayon::join(
            || rayon::join(
                || build_link_tree(&intrachromosomal, LINK_TREE_PADDING, false, &dictionary),
                || build_link_tree(&interchromosomal, LINK_TREE_PADDING, true, &dictionary),
            ),
            || build_contig_tree(&contigs, &dictionary),
        );
        let contig_tree = contig_tree?;
        info!(
            "Indexed {} intrachromosomal and {} interchromosomal links, {} aligned contigs",
            intrachromosomal.len(),
            interchromosomal.len(),
            contig_tree.len()
        );

        let breakpoint_pairs = pair_breakpoints(&breakpoints, &dictionary)?;
        info!("Found {} intrachromosomal breakpoint pairs", breakpoint_pairs.len());

        let breakpoint_tree = build_breakpoint_tree(&breakpoint_pairs);
        let evidence_trees : [&dyn EvidenceOverlap; 3] = [&breakpoint_tree, &intrachromosomal_links, &interchromosomal_links];
        let copy_ratios = copy_ratios.overlapping_evidence(&evidence_trees, hmm_padding, &dictionary)?;
        let copy_ratio_segments = segments.overlap_detector(&dictionary)?;
        info!("Kept {} copy ratio bins and {} segments", copy_ratios.len(), copy_ratio_segments.len());

        Ok(EvidenceIndex {
            dictionary,
            intrachromosomal_links,
            interchromosomal_links,
            contig_tree,
            copy_ratios,
            copy_ratio_segments,
            breakpoint_pairs,
        })
    }
}

/// every breakpoint pair under the interval it spans
fn build_breakpoint_tree(
    pairs: &[BreakpointPair]
) -> SvIntervalTree<&BreakpointPair> {
    let mut tree = SvIntervalTree::new();
    for pair in pairs {
        tree.put(pair.interval(), pair);
    };
    tree
}


#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use crate::lib::copy_ratio::SampleMetadata;
    use crate::lib::interval::{StrandDirection, StrandedInterval, SvInterval};

    fn test_dictionary() -> SequenceDictionary {
        SequenceDictionary::from_pairs(vec![("chr1", 1000000_u64), ("chr2", 1000000_u64)]).unwrap()
    }

    fn bin(contig: &str, start: u64, end: u64) -> CopyRatio {
        CopyRatio { contig: contig.to_string(), start, end, log2_copy_ratio: 0.0 }
    }

    fn full_builder() -> EvidenceIndexBuilder {
        let links = vec![
            EvidenceLink::new(
                StrandedInterval::new(SvInterval::new(0, 10000, 10100), StrandDirection::Rev),
                StrandedInterval::new(SvInterval::new(0, 20000, 20100), StrandDirection::Fwd),
                2, 3),
            EvidenceLink::new(
                StrandedInterval::new(SvInterval::new(0, 500000, 500100), StrandDirection::Fwd),
                StrandedInterval::new(SvInterval::new(1, 700000, 700100), StrandDirection::Fwd),
                0, 4),
        ];
        let breakpoints = vec![
            BreakpointRecord { id: String::from("A"), mate_id: Some(String::from("B")), contig: String::from("chr2"), start: 100000, contig_names: vec![] },
            BreakpointRecord { id: String::from("B"), mate_id: Some(String::from("A")), contig: String::from("chr2"), start: 150000, contig_names: vec![] },
        ];
        EvidenceIndexBuilder::new()
            .breakpoints(breakpoints)
            .assembled_contigs(vec![])
            .evidence_links(links)
            .copy_ratios(CopyRatioCollection {
                metadata: SampleMetadata { sample_name: String::from("S1") },
                records: vec![
                    bin("chr1", 15001, 16000),
                    bin("chr1", 300001, 301000),
                    bin("chr2", 120001, 121000),
                    bin("chr2", 700001, 701000),
                    bin("chr2", 900001, 901000),
                ],
            })
            .copy_ratio_segments(CalledCopyRatioSegmentCollection::default())
            .dictionary(test_dictionary())
    }

    #[test]
    fn build_all_trees(){
        let index = full_builder().build(1000).unwrap();
        assert_eq!(index.intrachromosomal_links.len(), 1);
        assert_eq!(index.interchromosomal_links.len(), 2);
        assert!(index.contig_tree.is_empty());
        assert_eq!(index.breakpoint_pairs.len(), 1);
        // bins inside the link, the breakpoint pair and the interchromosomal right side
        assert_eq!(index.copy_ratios.len(), 3);
        assert_eq!(index.copy_ratios.metadata.sample_name, "S1");
    }

    #[test]
    fn missing_input_fails(){
        let builder = EvidenceIndexBuilder::new()
            .breakpoints(vec![])
            .assembled_contigs(vec![])
            .evidence_links(vec![])
            .copy_ratios(CopyRatioCollection::default())
            .dictionary(test_dictionary());
        assert!(matches!(builder.build(0), Err(Error::MissingInput("copy ratio segments"))));
        assert!(matches!(EvidenceIndexBuilder::new().build(0), Err(Error::MissingInput(_))));
    }
}
