use crate::lib::error::Error;

/// All thresholds and paddings which steer the caller.
/// The defaults mirror the command line defaults of `depth_sv_caller`.
#[derive(Debug,Clone,PartialEq)]
pub struct CallerArguments {
    /// calls on intervals shorter than this are never attempted
    pub min_sv_size: u64,
    /// a candidate is dropped if an accepted call overlaps it reciprocally by at least this fraction
    pub max_candidate_reciprocal_overlap: f64,
    /// added to both evidence counts before scoring, must be > 0
    pub counter_evidence_pseudocount: f64,
    /// padding around breakpoint positions when searching evidence
    pub breakpoint_padding: u64,
    /// padding around link intervals when searching evidence
    pub evidence_link_padding: u64,
    /// copy-ratio bins further away than this from any evidence are discarded
    pub hmm_padding: u64,
    /// minimum number of supporting observations for a call
    pub min_link_evidence: u32,
    /// minimum fraction of the call covered by amplified segments
    pub min_segment_coverage: f64,
    /// minimum mean log2 copy ratio of the bins on a duplication
    pub min_duplication_log2_ratio: f64,
}

impl Default for CallerArguments {
    fn default() -> Self {
        CallerArguments {
            min_sv_size: 1000,
            max_candidate_reciprocal_overlap: 0.9,
            counter_evidence_pseudocount: 1.0,
            breakpoint_padding: 50,
            evidence_link_padding: 150,
            hmm_padding: 50000,
            min_link_evidence: 2,
            min_segment_coverage: 0.5,
            min_duplication_log2_ratio: 0.2,
        }
    }
}

impl CallerArguments {
    /// rejects values for which scoring or de-duplication are not defined
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.counter_evidence_pseudocount.is_finite() && self.counter_evidence_pseudocount > 0.0) {
            return Err(Error::Parameter(format!(
                "counter evidence pseudocount must be a positive number, got {}",
                self.counter_evidence_pseudocount
            )));
        }
        if !(self.max_candidate_reciprocal_overlap > 0.0 && self.max_candidate_reciprocal_overlap <= 1.0) {
            return Err(Error::Parameter(format!(
                "maximum candidate reciprocal overlap must be in (0,1], got {}",
                self.max_candidate_reciprocal_overlap
            )));
        }
        if !(0.0..=1.0).contains(&self.min_segment_coverage) {
            return Err(Error::Parameter(format!(
                "minimum segment coverage must be in [0,1], got {}",
                self.min_segment_coverage
            )));
        }
        if !self.min_duplication_log2_ratio.is_finite() {
            return Err(Error::Parameter(String::from("minimum duplication log2 ratio must be finite")));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid(){
        assert!(CallerArguments::default().validate().is_ok());
    }

    #[test]
    fn reject_bad_values(){
        let mut args = CallerArguments::default();
        args.counter_evidence_pseudocount = 0.0;
        assert!(args.validate().is_err());
        args.counter_evidence_pseudocount = f64::NAN;
        assert!(args.validate().is_err());

        let mut args = CallerArguments::default();
        args.max_candidate_reciprocal_overlap = 0.0;
        assert!(args.validate().is_err());
        args.max_candidate_reciprocal_overlap = 1.5;
        assert!(args.validate().is_err());
        args.max_candidate_reciprocal_overlap = 1.0;
        assert!(args.validate().is_ok());

        let mut args = CallerArguments::default();
        args.min_segment_coverage = -0.1;
        assert!(args.validate().is_err());
    }
}
