use log::{debug,warn};
use crate::lib::error::Error;
use crate::lib::interval::{SequenceDictionary, StrandedInterval, SvInterval};
use crate::lib::interval_tree::SvIntervalTree;

/// One aggregated unit of discordant read-pair and split-read evidence
/// which connects two stranded intervals of the genome.
/// The left side is expected to be upstream of the right side when both
/// are on the same contig.
#[derive(Debug,Clone,Hash,PartialEq,Eq)]
pub struct EvidenceLink {
    // upstream side of the link
    pub left: StrandedInterval,
    // downstream side of the link
    pub right: StrandedInterval,
    // number of split reads spanning the junction
    pub split_reads: u32,
    // number of discordant read pairs
    pub read_pairs: u32,
}

impl EvidenceLink {
    pub fn new(left: StrandedInterval, right: StrandedInterval, split_reads: u32, read_pairs: u32) -> EvidenceLink {
        EvidenceLink { left, right, split_reads, read_pairs }
    }

    pub fn is_intrachromosomal(&self) -> bool {
        self.left.interval.contig == self.right.interval.contig
    }

    /// total number of observations the link aggregates
    pub fn evidence_count(&self) -> u32 {
        self.split_reads.saturating_add(self.read_pairs)
    }
}


/// An assembled contig aligned against the reference.
/// Coordinates are 1-based, inclusive.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct AlignedContig {
    // name of the assembled contig
    pub name: String,
    // reference contig it aligned to
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub mapped: bool,
}


/// splits links into (intrachromosomal, interchromosomal)
/// keeping the input order within both
pub fn classify_links(
    links: Vec<EvidenceLink>
) -> (Vec<EvidenceLink>,Vec<EvidenceLink>) {
    links.into_iter().partition(|link| link.is_intrachromosomal())
}

/// Builds an interval tree of evidence links. The intervals are padded
/// before insertion.
/// With `separate_left_right` each link is inserted twice, once for the left
/// and once for the right interval, so both ends can be queried on their own.
/// This is the only option for interchromosomal links.
/// Otherwise a single interval from the start of the left to the end of the
/// right interval is inserted, and links with both ends on different
/// contigs are skipped.
///
/// Unittest: TRUE
///
pub fn build_link_tree(
    links               : &[EvidenceLink],
    padding             : u64,
    separate_left_right : bool,
    dictionary          : &SequenceDictionary
) -> SvIntervalTree<EvidenceLink> {
    let mut tree : SvIntervalTree<EvidenceLink> = SvIntervalTree::new();
    let mut skipped = 0_u64;
    for link in links {
        let left  = link.left.interval;
        let right = link.right.interval;
        if separate_left_right {
            tree.put(left.pad(padding, dictionary), link.clone());
            tree.put(right.pad(padding, dictionary), link.clone());
        } else if link.is_intrachromosomal() {
            let spanning = match SvInterval::try_new(left.contig, left.start, right.end) {
                Ok(x)  => x,
                Err(_) => {
                    debug!("Skipping link with right end {} upstream of left start {}", right, left);
                    skipped += 1;
                    continue
                }
            };
            tree.put(spanning.pad(padding, dictionary), link.clone());
        } else {
            skipped += 1;
        }
    };
    if skipped != 0 {
        debug!("{} links could not be inserted as a single spanning interval", skipped);
    }
    tree
}

/// Builds the tree of aligned assembled contigs, unmapped ones are ignored.
/// A mapped contig on a reference sequence missing from the dictionary
/// is an error.
///
/// Unittest: TRUE
///
pub fn build_contig_tree(
    contigs    : &[AlignedContig],
    dictionary : &SequenceDictionary
) -> Result<SvIntervalTree<AlignedContig>,Error> {
    let mut tree : SvIntervalTree<AlignedContig> = SvIntervalTree::new();
    let mut unmapped = 0_u64;
    for contig in contigs {
        if !contig.mapped {
            unmapped += 1;
            continue
        }
        let idx      = dictionary.resolve(&contig.contig)?;
        let interval = SvInterval::try_new(idx, contig.start, contig.end)?;
        tree.put(interval, contig.clone());
    };
    if unmapped != 0 {
        warn!("Ignored {} unmapped assembled contigs", unmapped);
    }
    Ok(tree)
}


#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use crate::lib::interval::StrandDirection;

    fn link(lc: u32, ls: u64, le: u64, rc: u32, rs: u64, re: u64) -> EvidenceLink {
        EvidenceLink::new(
            StrandedInterval::new(SvInterval::new(lc, ls, le), StrandDirection::Rev),
            StrandedInterval::new(SvInterval::new(rc, rs, re), StrandDirection::Fwd),
            1,
            3,
        )
    }

    fn test_dictionary() -> SequenceDictionary {
        SequenceDictionary::from_pairs(vec![("chr1", 100000_u64), ("chr2", 100000_u64), ("chr3", 100000_u64)]).unwrap()
    }

    #[test]
    fn classify_keeps_order(){
        let links = vec![
            link(0, 1, 10, 0, 100, 110),
            link(0, 1, 10, 1, 100, 110),
            link(2, 5, 10, 2, 500, 510),
            link(1, 5, 10, 2, 500, 510),
        ];
        let (intra, inter) = classify_links(links.clone());
        assert_eq!(intra, vec![links[0].clone(), links[2].clone()]);
        assert_eq!(inter, vec![links[1].clone(), links[3].clone()]);
        assert_eq!(links[0].evidence_count(), 4);
    }

    #[test]
    fn spanning_link_tree(){
        let dict  = test_dictionary();
        let links = vec![link(2, 500, 600, 2, 5500, 5600)];
        let tree  = build_link_tree(&links, 0, false, &dict);
        assert_eq!(tree.len(), 1);
        let entries : Vec<(&SvInterval,&EvidenceLink)> = tree.iter().collect();
        assert_eq!(*entries[0].0, SvInterval::new(2, 500, 5600));
        assert_eq!(*entries[0].1, links[0]);
        // the middle of the link is covered as well
        assert!(tree.has_overlapper(&SvInterval::point(2, 3000)));
    }

    #[test]
    fn spanning_link_tree_skips_interchromosomal(){
        let dict  = test_dictionary();
        let links = vec![link(0, 500, 600, 1, 5500, 5600)];
        let tree  = build_link_tree(&links, 0, false, &dict);
        assert!(tree.is_empty());
    }

    #[test]
    fn separate_link_tree_with_padding(){
        let dict  = test_dictionary();
        let links = vec![link(0, 500, 600, 1, 5500, 5600)];
        let tree  = build_link_tree(&links, 100, true, &dict);
        assert_eq!(tree.len(), 2);
        let keys : Vec<SvInterval> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![SvInterval::new(0, 400, 700), SvInterval::new(1, 5400, 5700)]);
        assert!(!tree.has_overlapper(&SvInterval::point(0, 3000)));
    }

    #[test]
    fn contig_tree_skips_unmapped(){
        let dict    = test_dictionary();
        let contigs = vec![
            AlignedContig { name: String::from("asm1"), contig: String::from("chr1"), start: 100, end: 400, mapped: true },
            AlignedContig { name: String::from("asm2"), contig: String::from("chr1"), start: 100, end: 400, mapped: false },
        ];
        let tree = build_contig_tree(&contigs, &dict).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.has_overlapper(&SvInterval::point(0, 400)));
        let unknown = vec![
            AlignedContig { name: String::from("asm3"), contig: String::from("chrUn"), start: 1, end: 4, mapped: true },
        ];
        assert!(build_contig_tree(&unknown, &dict).is_err());
    }
}
