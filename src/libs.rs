//! # Depth based structural variant libraries
//!
//! Author: Emanuel Schmid-Siegert
//!
//! This libraries collect the structures and functions to call large
//! tandem duplications by combining three kinds of evidence:
//!  - paired breakends from an assembly based caller
//!  - discordant read pairs and split reads aggregated into links
//!  - copy ratios and their segmentation from a read depth caller
//!
//! Breakpoint pairs are searched first as they are the most precise,
//! afterwards the links. Every region is called at most once.
//! Everything is indexed per contig in interval trees (rust-bio) which
//! are built once and afterwards only read.
//!
//! The modules are split into
//!  - interval, interval_tree: coordinates, contigs and the per contig trees
//!  - evidence, breakpoints, copy_ratio: the input evidence and its indexing
//!  - evidence_index, factory, caller: the calling itself
//!  - tsv_io: reading and writing the tab-separated tables of the binary
//!

/// all modules of the depth based caller
pub mod lib {
    /// errors which abort the construction of the caller
    pub mod error;
    /// 1-based closed intervals, strands and the sequence dictionary
    pub mod interval;
    /// per contig interval trees
    pub mod interval_tree;
    /// read pair and split read links, assembled contigs
    pub mod evidence;
    /// pairing of breakends via their mate IDs
    pub mod breakpoints;
    /// copy ratio bins and called segments
    pub mod copy_ratio;
    /// parameters of the caller
    pub mod params;
    /// scored candidate events
    pub mod event;
    /// the read-only evidence trees and their builder
    pub mod evidence_index;
    /// event factories
    pub mod factory;
    /// the caller itself
    pub mod caller;
    /// tab-separated input and output
    pub mod tsv_io;
}
