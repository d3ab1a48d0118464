use std::fmt;
use crate::lib::breakpoints::BreakpointPair;
use crate::lib::evidence::EvidenceLink;
use crate::lib::interval::SvInterval;

/// The event types an `EventFactory` can produce
#[derive(Debug,Clone,Copy,Eq,Hash,PartialEq)]
pub enum SVType {
    DupTandem,
}

impl SVType {
    /// the SVTYPE tag as used in VCF
    pub fn vcf_tag(&self) -> &'static str {
        match self {
            SVType::DupTandem => "DUP:TANDEM",
        }
    }
}

impl fmt::Display for SVType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vcf_tag())
    }
}

/// log(supporting + pseudocount) - log(opposing + pseudocount)
///
/// Strictly increasing in `supporting`, strictly decreasing in `opposing`
/// and 0 if both are equal. The pseudocount must be positive.
pub fn evidence_score(
    supporting  : u32,
    opposing    : u32,
    pseudocount : f64
) -> f64 {
    (supporting as f64 + pseudocount).ln() - (opposing as f64 + pseudocount).ln()
}


/// A scored candidate structural variant built from all evidence
/// found around one pair of breakpoint intervals
#[derive(Debug,Clone,PartialEq)]
pub struct CandidateEvent {
    pub interval: SvInterval,
    pub sv_type: SVType,
    // supporting observations
    pub read_pair_evidence: u32,
    pub split_read_evidence: u32,
    pub contig_evidence: u32,
    // observations which contradict the event
    pub read_pair_counter_evidence: u32,
    pub split_read_counter_evidence: u32,
    // mean log2 copy ratio of the bins on the interval
    pub mean_log2_copy_ratio: f64,
    pub copy_ratio_bins: u32,
    pub score: f64,
    pub supporting_links: Vec<EvidenceLink>,
    pub breakpoints: Option<BreakpointPair>,
}

impl CandidateEvent {
    pub fn supporting_evidence(&self) -> u32 {
        self.read_pair_evidence + self.split_read_evidence + self.contig_evidence
    }

    pub fn opposing_evidence(&self) -> u32 {
        self.read_pair_counter_evidence + self.split_read_counter_evidence
    }

    /// the score recomputed with another pseudocount
    pub fn score_with(&self, pseudocount: f64) -> f64 {
        evidence_score(self.supporting_evidence(), self.opposing_evidence(), pseudocount)
    }
}
