//! Core collection engine.
//!
//! The pipeline runs leaf-first: the matcher locates tag calls in raw
//! source text, the tag module parses and classifies them, resolution and
//! filtering decide placement, grouping deep-merges translations into
//! per-namespace aggregates, and the writer persists whatever actually
//! changed. Regeneration is an independent pass over the same matcher
//! output that keeps in-source configuration consistent with resolution.

pub mod collect;
pub mod export;
pub mod literal;
pub mod matcher;
pub mod merge;
pub mod pipeline;
pub mod regenerate;
pub mod resolve;
pub mod tag;
pub mod writer;

pub use collect::NamespaceAggregates;
pub use export::{EXPORT_FILE_NAME, ExportSnapshot};
pub use matcher::TagMatcher;
pub use merge::{MergeError, TranslationTree, merge};
pub use pipeline::{Pipeline, PipelineOptions, RunReport, SourceFile};
pub use regenerate::regenerate_file;
pub use resolve::{FileStemResolver, LiteralResolver, NamespaceResolver, ResolveContext};
pub use tag::{ArgPosition, ProcessedTag, TagConfig, TagMatch, TagPlacement, Validity};
pub use writer::{Collector, JsonCollector, write_collections};
