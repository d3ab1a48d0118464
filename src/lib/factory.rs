use std::sync::Arc;
use itertools::Itertools;
use log::debug;
use statistical::mean;
use crate::lib::breakpoints::BreakpointPair;
use crate::lib::copy_ratio::SegmentCall;
use crate::lib::event::{evidence_score, CandidateEvent, SVType};
use crate::lib::evidence::EvidenceLink;
use crate::lib::evidence_index::EvidenceIndex;
use crate::lib::interval::{StrandDirection, SvInterval};
use crate::lib::params::CallerArguments;

/// Builds one kind of event from the evidence around a pair of intervals.
/// The caller asks every registered factory and keeps the best scoring event,
/// so new event types only need a new implementation of this trait.
pub trait EventFactory {
    fn sv_type(&self) -> SVType;

    /// Tries to build an event. `left` and `right` are the regions of the two
    /// junction ends, `call` the interval the event would be reported on and
    /// `evidence_padding` the slack added around `left` and `right` when
    /// searching for evidence. `None` if the evidence is not sufficient.
    fn try_create(
        &self,
        left             : &SvInterval,
        right            : &SvInterval,
        call             : &SvInterval,
        breakpoints      : Option<&BreakpointPair>,
        evidence_padding : u64
    ) -> Option<CandidateEvent>;
}


/// Calls tandem duplications: a copy gain on the call interval, everted
/// read pairs (left end reverse, right end forward) joining both ends and
/// assembled contigs over the breakpoints.
pub struct TandemDuplicationFactory {
    evidence  : Arc<EvidenceIndex>,
    arguments : CallerArguments,
}

/// evidence counts gathered for one candidate
#[derive(Debug,Default)]
struct LinkEvidence {
    supporting      : Vec<EvidenceLink>,
    read_pairs      : u32,
    split_reads     : u32,
    counter_pairs   : u32,
    counter_splits  : u32,
}

impl TandemDuplicationFactory {
    pub fn new(evidence: Arc<EvidenceIndex>, arguments: CallerArguments) -> TandemDuplicationFactory {
        TandemDuplicationFactory { evidence, arguments }
    }

    /// everted pairs are the signature of a tandem duplication
    fn is_supporting_link(
        link  : &EvidenceLink,
        left  : &SvInterval,
        right : &SvInterval
    ) -> bool {
        link.left.strand == StrandDirection::Rev
            && link.right.strand == StrandDirection::Fwd
            && link.left.interval.overlaps(left)
            && link.right.interval.overlaps(right)
    }

    /// Sorts the links near the candidate into supporting and counter evidence.
    /// Counter evidence are intrachromosomal links which touch one of the ends
    /// but do not join them in the duplication orientation, plus interchromosomal
    /// links starting at one of the ends.
    fn collect_link_evidence(
        &self,
        left  : &SvInterval,
        right : &SvInterval,
        call  : &SvInterval
    ) -> LinkEvidence {
        let mut result = LinkEvidence::default();
        let touches = |interval: &SvInterval| interval.overlaps(left) || interval.overlaps(right);
        let search = SvInterval::new(call.contig, std::cmp::min(left.start, call.start), std::cmp::max(right.end, call.end));

        for (_, link) in self.evidence.intrachromosomal_links.overlappers(&search) {
            if Self::is_supporting_link(link, left, right) {
                result.read_pairs  = result.read_pairs.saturating_add(link.read_pairs);
                result.split_reads = result.split_reads.saturating_add(link.split_reads);
                result.supporting.push(link.clone());
            } else if touches(&link.left.interval) || touches(&link.right.interval) {
                result.counter_pairs  = result.counter_pairs.saturating_add(link.read_pairs);
                result.counter_splits = result.counter_splits.saturating_add(link.split_reads);
            }
        };
        // both ends are on the call contig and an interchromosomal link has only
        // one entry there, so a tree entry met by both queries is counted once
        // while equal links from the input stay separate
        let inter : Vec<&EvidenceLink> = self.evidence.interchromosomal_links
            .overlappers(left)
            .chain(self.evidence.interchromosomal_links.overlappers(right))
            .map(|(_, link)| link)
            .unique_by(|link| *link as *const EvidenceLink)
            .collect();
        for link in inter {
            result.counter_pairs  = result.counter_pairs.saturating_add(link.read_pairs);
            result.counter_splits = result.counter_splits.saturating_add(link.split_reads);
        };
        result
    }

    /// distinct assembled contigs over one of the ends which the breakpoints name
    fn count_supporting_contigs(
        &self,
        left        : &SvInterval,
        right       : &SvInterval,
        breakpoints : Option<&BreakpointPair>
    ) -> u32 {
        let pair = match breakpoints {
            Some(x) => x,
            None    => return 0,
        };
        self.evidence.contig_tree
            .overlappers(left)
            .chain(self.evidence.contig_tree.overlappers(right))
            .map(|(_, contig)| contig.name.as_str())
            .filter(|name| pair.has_supporting_contig(name))
            .unique()
            .count() as u32
    }

    /// Mean log2 copy ratio and number of the bins on the call interval
    /// padded by `padding`, `None` without bins
    fn copy_ratio_on_interval(
        &self,
        call    : &SvInterval,
        padding : u64
    ) -> Option<(f64,u32)> {
        let padded = call.pad(padding, &self.evidence.dictionary);
        let ratios : Vec<f64> = self.evidence.copy_ratios
            .overlappers(&padded)
            .map(|x| x.log2_copy_ratio)
            .collect();
        if ratios.is_empty() {
            return None;
        }
        Some((mean(&ratios), ratios.len() as u32))
    }

    /// fraction of the call interval covered by segments called as amplified
    fn amplified_fraction(
        &self,
        call: &SvInterval
    ) -> f64 {
        let dictionary = &self.evidence.dictionary;
        let covered : u64 = self.evidence.copy_ratio_segments
            .overlappers(call)
            .filter(|x| x.call == SegmentCall::Amplification)
            .filter_map(|x| x.interval(dictionary).ok())
            .map(|x| x.overlap_len(call))
            .sum();
        // segments of a sane segmentation do not overlap each other
        f64::min(1.0, covered as f64 / call.length() as f64)
    }
}

impl EventFactory for TandemDuplicationFactory {
    fn sv_type(&self) -> SVType {
        SVType::DupTandem
    }

    fn try_create(
        &self,
        left             : &SvInterval,
        right            : &SvInterval,
        call             : &SvInterval,
        breakpoints      : Option<&BreakpointPair>,
        evidence_padding : u64
    ) -> Option<CandidateEvent> {
        let dictionary = &self.evidence.dictionary;
        let (mean_log2, bins) = match self.copy_ratio_on_interval(call, evidence_padding) {
            Some(x) => x,
            None    => {
                debug!("No copy ratio bins on {}", call);
                return None;
            }
        };
        if mean_log2 < self.arguments.min_duplication_log2_ratio {
            debug!("Mean log2 copy ratio {} on {} too low for a duplication", mean_log2, call);
            return None;
        }
        let amplified = self.amplified_fraction(call);
        if amplified < self.arguments.min_segment_coverage {
            debug!("Only {} of {} covered by amplified segments", amplified, call);
            return None;
        }

        let padded_left  = left.pad(evidence_padding, dictionary);
        let padded_right = right.pad(evidence_padding, dictionary);
        let links   = self.collect_link_evidence(&padded_left, &padded_right, call);
        let contigs = self.count_supporting_contigs(&padded_left, &padded_right, breakpoints);

        let supporting = links.read_pairs.saturating_add(links.split_reads).saturating_add(contigs);
        if supporting < self.arguments.min_link_evidence {
            debug!("Only {} supporting observations for duplication on {}", supporting, call);
            return None;
        }
        let opposing = links.counter_pairs.saturating_add(links.counter_splits);
        let score    = evidence_score(supporting, opposing, self.arguments.counter_evidence_pseudocount);
        debug!("Tandem duplication on {} with support {} against {} scored {}", call, supporting, opposing, score);

        Some(CandidateEvent {
            interval: *call,
            sv_type: SVType::DupTandem,
            read_pair_evidence: links.read_pairs,
            split_read_evidence: links.split_reads,
            contig_evidence: contigs,
            read_pair_counter_evidence: links.counter_pairs,
            split_read_counter_evidence: links.counter_splits,
            mean_log2_copy_ratio: mean_log2,
            copy_ratio_bins: bins,
            score,
            supporting_links: links.supporting,
            breakpoints: breakpoints.cloned(),
        })
    }
}
