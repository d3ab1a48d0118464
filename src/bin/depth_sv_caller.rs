//! ## depth_sv_caller ##
//! ---------------------
//! This tool calls large tandem duplications. It combines paired breakends,
//! discordant read-pair/split-read links and the copy ratios of a read depth
//! caller and reports every region at most once.
use clap::{app_from_crate,crate_name,crate_description,crate_authors,crate_version,value_t,Arg,ArgMatches};
use std::env;
use std::fs::File;
use std::io;
use std::path::Path;
// our library which is within the same project
extern crate depthsv;
use depthsv::lib::caller::DepthBasedSvCaller;
use depthsv::lib::error::Error;
use depthsv::lib::evidence_index::EvidenceIndexBuilder;
use depthsv::lib::params::CallerArguments;
use depthsv::lib::tsv_io::{
    parse_chrom_file, read_aligned_contigs, read_breakpoints, read_copy_ratio_segments,
    read_copy_ratios, read_evidence_links, write_events_tsv,
};

extern crate pretty_env_logger;
#[macro_use] extern crate log;


fn main() {
    pretty_env_logger::init();

    // clap does not hand out the command line, we keep it for the header
    let args: Vec<String> = env::args().collect();
    let args_string = args.join(" ");
    let defaults = CallerArguments::default();
    let min_sv_size       = defaults.min_sv_size.to_string();
    let max_overlap       = defaults.max_candidate_reciprocal_overlap.to_string();
    let pseudocount       = defaults.counter_evidence_pseudocount.to_string();
    let bp_padding        = defaults.breakpoint_padding.to_string();
    let link_padding      = defaults.evidence_link_padding.to_string();
    let hmm_padding       = defaults.hmm_padding.to_string();
    let min_evidence      = defaults.min_link_evidence.to_string();
    let min_seg_coverage  = defaults.min_segment_coverage.to_string();
    let min_log2          = defaults.min_duplication_log2_ratio.to_string();

    let matches = app_from_crate!()
    .about("This tool calls large tandem duplications from paired breakends, \
        discordant read-pair links and copy ratios. \n\
        All inputs are tab-separated tables with 1-based, inclusive coordinates. \n\
        Breakpoint pairs are searched first, afterwards the links. A region is reported only once.")
    .arg(Arg::with_name("CHROM")
            .short("c")
            .long("chroms")
            .value_name("FILE")
            .help("tab-separated file with name in 1st column and chrom length in second column")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("BREAKPOINTS")
            .short("b")
            .long("breakpoints")
            .value_name("FILE")
            .help("breakends: id, mate id, contig, position, supporting contig names (';' separated)")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("LINKS")
            .short("l")
            .long("links")
            .value_name("FILE")
            .help("evidence links: contig, start, end, strand of both sides, split reads, read pairs")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("CONTIGS")
            .short("a")
            .long("assembled-contigs")
            .value_name("FILE")
            .help("aligned assembled contigs: name, contig, start, end, mapped")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("COPY_RATIOS")
            .short("r")
            .long("copy-ratios")
            .value_name("FILE")
            .help("copy ratio bins: contig, start, end, log2 copy ratio")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("SEGMENTS")
            .short("s")
            .long("segments")
            .value_name("FILE")
            .help("called copy ratio segments: contig, start, end, points, mean log2 copy ratio, call (+,-,0)")
            .takes_value(true)
            .required(true))
    .arg(Arg::with_name("OUTFILE")
            .short("o")
            .long("output")
            .value_name("FILE")
            .help("write to outfile instead stdout")
            .takes_value(true)
            .required(false))
    .arg(Arg::with_name("MIN_SIZE")
            .long("min-size")
            .value_name("int")
            .help("minimal size of a called event in bp")
            .takes_value(true)
            .default_value(&min_sv_size))
    .arg(Arg::with_name("MAX_OVERLAP")
            .long("max-overlap")
            .value_name("float")
            .help("candidates overlapping a called event reciprocally by this fraction are dropped")
            .takes_value(true)
            .default_value(&max_overlap))
    .arg(Arg::with_name("PSEUDOCOUNT")
            .long("pseudocount")
            .value_name("float")
            .help("pseudocount added to supporting and counter evidence for scoring")
            .takes_value(true)
            .default_value(&pseudocount))
    .arg(Arg::with_name("BP_PADDING")
            .long("breakpoint-padding")
            .value_name("int")
            .help("padding around breakends when searching evidence")
            .takes_value(true)
            .default_value(&bp_padding))
    .arg(Arg::with_name("LINK_PADDING")
            .long("link-padding")
            .value_name("int")
            .help("padding around link ends when searching evidence")
            .takes_value(true)
            .default_value(&link_padding))
    .arg(Arg::with_name("HMM_PADDING")
            .long("hmm-padding")
            .value_name("int")
            .help("copy ratio bins further than this from any breakpoint or link are discarded")
            .takes_value(true)
            .default_value(&hmm_padding))
    .arg(Arg::with_name("MIN_EVIDENCE")
            .long("min-evidence")
            .value_name("int")
            .help("minimal number of supporting reads and contigs of a call")
            .takes_value(true)
            .default_value(&min_evidence))
    .arg(Arg::with_name("MIN_SEG_COVERAGE")
            .long("min-segment-coverage")
            .value_name("float")
            .help("fraction of a call which has to be covered by amplified segments")
            .takes_value(true)
            .default_value(&min_seg_coverage))
    .arg(Arg::with_name("MIN_LOG2")
            .long("min-log2")
            .value_name("float")
            .help("minimal mean log2 copy ratio of a duplication")
            .takes_value(true)
            .default_value(&min_log2))
    .get_matches();

    if let Err(e) = run(&matches, &args_string) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// the caller parameters from the command line
fn caller_arguments(
    matches: &ArgMatches
) -> CallerArguments {
    CallerArguments {
        min_sv_size: value_t!(matches, "MIN_SIZE", u64).unwrap_or_else(|e| e.exit()),
        max_candidate_reciprocal_overlap: value_t!(matches, "MAX_OVERLAP", f64).unwrap_or_else(|e| e.exit()),
        counter_evidence_pseudocount: value_t!(matches, "PSEUDOCOUNT", f64).unwrap_or_else(|e| e.exit()),
        breakpoint_padding: value_t!(matches, "BP_PADDING", u64).unwrap_or_else(|e| e.exit()),
        evidence_link_padding: value_t!(matches, "LINK_PADDING", u64).unwrap_or_else(|e| e.exit()),
        hmm_padding: value_t!(matches, "HMM_PADDING", u64).unwrap_or_else(|e| e.exit()),
        min_link_evidence: value_t!(matches, "MIN_EVIDENCE", u32).unwrap_or_else(|e| e.exit()),
        min_segment_coverage: value_t!(matches, "MIN_SEG_COVERAGE", f64).unwrap_or_else(|e| e.exit()),
        min_duplication_log2_ratio: value_t!(matches, "MIN_LOG2", f64).unwrap_or_else(|e| e.exit()),
    }
}

/// reads the inputs, calls and writes the events
fn run(
    matches : &ArgMatches,
    command : &str
) -> Result<(),Error> {
    let arguments = caller_arguments(matches);
    // all of them are required, clap checked that
    let path = |name: &str| Path::new(matches.value_of(name).unwrap_or_default()).to_path_buf();

    let dictionary  = parse_chrom_file(&path("CHROM"))?;
    let breakpoints = read_breakpoints(&path("BREAKPOINTS"))?;
    let links       = read_evidence_links(&path("LINKS"), &dictionary)?;
    let contigs     = read_aligned_contigs(&path("CONTIGS"))?;
    let copy_ratios = read_copy_ratios(&path("COPY_RATIOS"))?;
    let segments    = read_copy_ratio_segments(&path("SEGMENTS"))?;

    let builder = EvidenceIndexBuilder::new()
        .breakpoints(breakpoints)
        .assembled_contigs(contigs)
        .evidence_links(links)
        .copy_ratios(copy_ratios)
        .copy_ratio_segments(segments)
        .dictionary(dictionary);
    let caller = DepthBasedSvCaller::new(builder, arguments)?;
    let events = caller.call_events();
    info!("Reporting {} events", events.len());
    debug!("Events: {:?}", events);

    let dictionary = &caller.evidence().dictionary;
    match matches.value_of("OUTFILE") {
        Some(x) => {
            let file = File::create(x).map_err(|e| Error::io(e, x))?;
            write_events_tsv(file, &events, dictionary, crate_version!(), command)
        },
        None => write_events_tsv(io::stdout(), &events, dictionary, crate_version!(), command),
    }
}
