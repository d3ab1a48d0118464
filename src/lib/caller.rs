use std::sync::Arc;
use log::{debug,info};
use crate::lib::breakpoints::BreakpointPair;
use crate::lib::error::Error;
use crate::lib::event::CandidateEvent;
use crate::lib::evidence_index::{EvidenceIndex, EvidenceIndexBuilder};
use crate::lib::factory::{EventFactory, TandemDuplicationFactory};
use crate::lib::interval::SvInterval;
use crate::lib::interval_tree::SvIntervalTree;
use crate::lib::params::CallerArguments;

/// The calls accepted so far. A new call is only accepted if nothing in
/// here overlaps it reciprocally by `max_overlap` or more, so the first
/// call over a region wins. Checking and inserting happen in one step.
#[derive(Debug)]
pub struct AcceptedCalls {
    tree        : SvIntervalTree<CandidateEvent>,
    max_overlap : f64,
}

impl AcceptedCalls {
    pub fn new(max_overlap: f64) -> AcceptedCalls {
        AcceptedCalls {
            tree: SvIntervalTree::new(),
            max_overlap,
        }
    }

    /// true if an accepted call already covers nearly the same region
    pub fn is_claimed(&self, interval: &SvInterval) -> bool {
        self.tree.has_reciprocal_overlapper(interval, self.max_overlap)
    }

    /// Inserts the event under its own interval unless that region is
    /// claimed already. Returns whether the event was accepted.
    pub fn try_claim(&mut self, event: CandidateEvent) -> bool {
        if self.is_claimed(&event.interval) {
            debug!("Dropping {} on {}, region already called", event.sv_type, event.interval);
            return false;
        }
        self.tree.put(event.interval, event);
        true
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// all accepted calls ordered by interval
    pub fn into_events(self) -> Vec<CandidateEvent> {
        self.tree.into_sorted_values()
    }
}


/// Calls large events by fusing breakpoint pairs, evidence links and copy ratios.
/// Breakpoint pairs are searched first, then the intrachromosomal links; a
/// region called by a breakpoint pair is not called again from a link.
pub struct DepthBasedSvCaller {
    evidence  : Arc<EvidenceIndex>,
    factories : Vec<Box<dyn EventFactory>>,
    arguments : CallerArguments,
}

impl DepthBasedSvCaller {
    /// Builds all evidence trees from the inputs collected in `builder` and
    /// registers the tandem duplication factory. Fails on invalid arguments,
    /// missing inputs or inconsistent breakpoint mates.
    pub fn new(
        builder   : EvidenceIndexBuilder,
        arguments : CallerArguments
    ) -> Result<DepthBasedSvCaller,Error> {
        arguments.validate()?;
        let evidence = Arc::new(builder.build(arguments.hmm_padding)?);
        info!("Initializing event factories...");
        let tandem_duplications = TandemDuplicationFactory::new(Arc::clone(&evidence), arguments.clone());
        Ok(DepthBasedSvCaller {
            evidence,
            factories: vec![Box::new(tandem_duplications)],
            arguments,
        })
    }

    /// Uses an already built index and a custom set of factories.
    /// The order of `factories` decides ties between equally scored events.
    pub fn with_factories(
        evidence  : Arc<EvidenceIndex>,
        factories : Vec<Box<dyn EventFactory>>,
        arguments : CallerArguments
    ) -> Result<DepthBasedSvCaller,Error> {
        arguments.validate()?;
        Ok(DepthBasedSvCaller { evidence, factories, arguments })
    }

    pub fn evidence(&self) -> &EvidenceIndex {
        &self.evidence
    }

    /// Runs the breakpoint pass and then the link pass and returns
    /// all accepted calls ordered by interval.
    pub fn call_events(&self) -> Vec<CandidateEvent> {
        let mut called = AcceptedCalls::new(self.arguments.max_candidate_reciprocal_overlap);

        info!("Searching {} breakpoint pairs...", self.evidence.breakpoint_pairs.len());
        for pair in &self.evidence.breakpoint_pairs {
            let event = self.highest_scoring_event_on_interval(
                &pair.left_point(),
                &pair.right_point(),
                &pair.interval(),
                &called,
                Some(pair),
                self.arguments.breakpoint_padding
            );
            if let Some(x) = event {
                called.try_claim(x);
            }
        }
        let from_breakpoints = called.len();
        info!("Called {} events from breakpoint pairs", from_breakpoints);

        info!("Searching {} evidence links...", self.evidence.intrachromosomal_links.len());
        for (_, link) in self.evidence.intrachromosomal_links.iter() {
            let left  = link.left.interval;
            let right = link.right.interval;
            let call  = match SvInterval::try_new(left.contig, left.midpoint(), right.midpoint()) {
                Ok(x)  => x,
                Err(_) => {
                    debug!("Link {} -> {} has its right end upstream, skipped", left, right);
                    continue
                }
            };
            let event = self.highest_scoring_event_on_interval(
                &left,
                &right,
                &call,
                &called,
                None,
                self.arguments.evidence_link_padding
            );
            if let Some(x) = event {
                called.try_claim(x);
            }
        }
        info!("Called {} events from evidence links", called.len() - from_breakpoints);

        called.into_events()
    }

    /// The best scoring event over all factories, `None` if the region is
    /// already called or no factory produced anything. On equal scores the
    /// event of the earlier registered factory is kept.
    fn highest_scoring_event_on_interval(
        &self,
        left             : &SvInterval,
        right            : &SvInterval,
        call             : &SvInterval,
        called           : &AcceptedCalls,
        breakpoints      : Option<&BreakpointPair>,
        evidence_padding : u64
    ) -> Option<CandidateEvent> {
        if called.is_claimed(call) {
            debug!("Candidate {} overlaps an accepted call", call);
            return None;
        }
        let mut best : Option<CandidateEvent> = None;
        for event in self.events_on_interval(left, right, call, breakpoints, evidence_padding) {
            let better = match &best {
                Some(x) => event.score > x.score,
                None    => true,
            };
            if better {
                best = Some(event);
            }
        }
        best
    }

    /// asks every factory for an event on the interval
    fn events_on_interval(
        &self,
        left             : &SvInterval,
        right            : &SvInterval,
        call             : &SvInterval,
        breakpoints      : Option<&BreakpointPair>,
        evidence_padding : u64
    ) -> Vec<CandidateEvent> {
        if left.contig != right.contig {
            return Vec::new();
        }
        if call.length() < self.arguments.min_sv_size {
            debug!("Candidate {} shorter than {}", call, self.arguments.min_sv_size);
            return Vec::new();
        }
        self.factories
            .iter()
            .filter_map(|factory| {
                let event = factory.try_create(left, right, call, breakpoints, evidence_padding);
                if event.is_none() {
                    debug!("No {} on {}", factory.sv_type(), call);
                }
                event
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::lib::breakpoints::BreakpointRecord;
    use crate::lib::copy_ratio::{CalledCopyRatioSegmentCollection, CopyRatioCollection};
    use crate::lib::event::SVType;
    use crate::lib::evidence::EvidenceLink;
    use crate::lib::interval::{SequenceDictionary, StrandDirection, StrandedInterval};

    /// accepts everything, optionally on a shifted interval
    struct FixedFactory {
        score    : f64,
        shift    : u64,
        invoked  : Rc<Cell<u32>>,
        tag      : u32,
    }

    impl EventFactory for FixedFactory {
        fn sv_type(&self) -> SVType {
            SVType::DupTandem
        }

        fn try_create(
            &self,
            _left            : &SvInterval,
            _right           : &SvInterval,
            call             : &SvInterval,
            breakpoints      : Option<&BreakpointPair>,
            _evidence_padding: u64
        ) -> Option<CandidateEvent> {
            self.invoked.set(self.invoked.get() + 1);
            Some(CandidateEvent {
                interval: SvInterval::new(call.contig, call.start + self.shift, call.end + self.shift),
                sv_type: SVType::DupTandem,
                read_pair_evidence: self.tag,
                split_read_evidence: 0,
                contig_evidence: 0,
                read_pair_counter_evidence: 0,
                split_read_counter_evidence: 0,
                mean_log2_copy_ratio: 0.58,
                copy_ratio_bins: 1,
                score: self.score,
                supporting_links: Vec::new(),
                breakpoints: breakpoints.cloned(),
            })
        }
    }

    fn test_dictionary() -> SequenceDictionary {
        SequenceDictionary::from_pairs(vec![("chr1", 1000000_u64), ("chr2", 1000000_u64)]).unwrap()
    }

    fn bnd(id: &str, mate: &str, contig: &str, start: u64) -> BreakpointRecord {
        BreakpointRecord {
            id: id.to_string(),
            mate_id: Some(mate.to_string()),
            contig: contig.to_string(),
            start,
            contig_names: vec![],
        }
    }

    fn everted(contig: u32, ls: u64, le: u64, rs: u64, re: u64) -> EvidenceLink {
        EvidenceLink::new(
            StrandedInterval::new(SvInterval::new(contig, ls, le), StrandDirection::Rev),
            StrandedInterval::new(SvInterval::new(contig, rs, re), StrandDirection::Fwd),
            1,
            4,
        )
    }

    fn index(breakpoints: Vec<BreakpointRecord>, links: Vec<EvidenceLink>) -> Arc<EvidenceIndex> {
        let index = EvidenceIndexBuilder::new()
            .breakpoints(breakpoints)
            .assembled_contigs(vec![])
            .evidence_links(links)
            .copy_ratios(CopyRatioCollection::default())
            .copy_ratio_segments(CalledCopyRatioSegmentCollection::default())
            .dictionary(test_dictionary())
            .build(0)
            .unwrap();
        Arc::new(index)
    }

    fn fixed(score: f64, tag: u32, invoked: &Rc<Cell<u32>>) -> Box<dyn EventFactory> {
        Box::new(FixedFactory { score, shift: 0, invoked: Rc::clone(invoked), tag })
    }

    #[test]
    fn accepted_calls_dedup(){
        let invoked = Rc::new(Cell::new(0));
        let factory = FixedFactory { score: 1.0, shift: 0, invoked, tag: 0 };
        let mut called = AcceptedCalls::new(0.9);
        let first  = factory.try_create(&SvInterval::point(0, 1), &SvInterval::point(0, 1), &SvInterval::new(0, 1, 10000), None, 0).unwrap();
        let second = factory.try_create(&SvInterval::point(0, 1), &SvInterval::point(0, 1), &SvInterval::new(0, 501, 10000), None, 0).unwrap();
        let third  = factory.try_create(&SvInterval::point(0, 1), &SvInterval::point(0, 1), &SvInterval::new(0, 2001, 10000), None, 0).unwrap();
        assert!(called.try_claim(first));
        assert!(!called.try_claim(second));
        assert!(called.try_claim(third));
        assert_eq!(called.len(), 2);
    }

    #[test]
    fn short_candidates_never_reach_factory(){
        let invoked = Rc::new(Cell::new(0));
        let evidence = index(vec![bnd("A", "B", "chr1", 1000), bnd("B", "A", "chr1", 1500)], vec![]);
        let mut args = CallerArguments::default();
        args.min_sv_size = 1000;
        let caller = DepthBasedSvCaller::with_factories(evidence, vec![fixed(1.0, 0, &invoked)], args).unwrap();
        assert!(caller.call_events().is_empty());
        assert_eq!(invoked.get(), 0);
    }

    #[test]
    fn breakpoints_win_over_links(){
        let invoked = Rc::new(Cell::new(0));
        // breakpoint call 10000-20000, link call 10500-20000 shares 95%
        let evidence = index(
            vec![bnd("A", "B", "chr1", 10000), bnd("B", "A", "chr1", 20000)],
            vec![everted(0, 10400, 10600, 19900, 20100)],
        );
        let caller = DepthBasedSvCaller::with_factories(evidence, vec![fixed(1.0, 0, &invoked)], CallerArguments::default()).unwrap();
        let events = caller.call_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].interval, SvInterval::new(0, 10000, 20000));
        assert!(events[0].breakpoints.is_some());
        // the link candidate was rejected before the factory was asked
        assert_eq!(invoked.get(), 1);
    }

    #[test]
    fn distinct_regions_all_called_in_order(){
        let invoked = Rc::new(Cell::new(0));
        let evidence = index(
            vec![bnd("A", "B", "chr2", 10000), bnd("B", "A", "chr2", 20000)],
            vec![everted(0, 50000, 50100, 60000, 60100), everted(0, 1000, 1100, 8000, 8100)],
        );
        let caller = DepthBasedSvCaller::with_factories(evidence, vec![fixed(1.0, 0, &invoked)], CallerArguments::default()).unwrap();
        let events = caller.call_events();
        let intervals : Vec<SvInterval> = events.iter().map(|x| x.interval).collect();
        assert_eq!(intervals, vec![
            SvInterval::new(0, 1050, 8050),
            SvInterval::new(0, 50050, 60050),
            SvInterval::new(1, 10000, 20000),
        ]);
        assert!(events[0].breakpoints.is_none());
    }

    #[test]
    fn highest_score_wins_first_on_ties(){
        let invoked  = Rc::new(Cell::new(0));
        let evidence = index(vec![bnd("A", "B", "chr1", 10000), bnd("B", "A", "chr1", 20000)], vec![]);
        let factories = vec![fixed(1.0, 1, &invoked), fixed(2.0, 2, &invoked), fixed(2.0, 3, &invoked)];
        let caller = DepthBasedSvCaller::with_factories(evidence, factories, CallerArguments::default()).unwrap();
        let events = caller.call_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].read_pair_evidence, 2);
        assert_eq!(invoked.get(), 3);
    }

    #[test]
    fn adjusted_intervals_are_deduplicated(){
        let invoked = Rc::new(Cell::new(0));
        // the factory moves every call by 2000, the second candidate passes the first
        // check but its moved interval lands on the first call
        let evidence = index(
            vec![
                bnd("A", "B", "chr1", 10000), bnd("B", "A", "chr1", 20000),
                bnd("C", "D", "chr1", 10100), bnd("D", "C", "chr1", 20100),
            ],
            vec![],
        );
        let factory : Box<dyn EventFactory> = Box::new(FixedFactory { score: 1.0, shift: 2000, invoked: Rc::clone(&invoked), tag: 0 });
        let caller = DepthBasedSvCaller::with_factories(evidence, vec![factory], CallerArguments::default()).unwrap();
        let events = caller.call_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].interval, SvInterval::new(0, 12000, 22000));
        assert_eq!(invoked.get(), 2);
    }

    #[test]
    fn invalid_arguments_fail(){
        let evidence = index(vec![], vec![]);
        let mut args = CallerArguments::default();
        args.counter_evidence_pseudocount = -1.0;
        assert!(DepthBasedSvCaller::with_factories(evidence, vec![], args).is_err());
    }
}
