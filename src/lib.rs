//! Anicompare – reconciliation of pairwise genome similarity results.
//!
//! Three external tools estimate how similar two genome assemblies are, each
//! writing its own loosely structured delimited output:
//! * a whole-genome aligner summary (`file1,file2,aligned_bases,AvgIdentity,SNPs`),
//! * a fast average nucleotide identity estimator (`file1 file2 ANI mappings total_fragments`),
//! * a sketch based distance estimator reported as identity (`file1 file2 ANI`).
//!
//! The pipeline brings them onto common ground:
//! * [`identity`] – pulls the accession code (`GCA_000009765`) out of a filename field.
//! * [`pair`] – the order independent [`pair::PairKey`] every reader keys by.
//! * [`metrics`] – one fixed-arity tuple type per tool behind [`metrics::MetricTuple`].
//! * [`reader`] – parses a tool's file (or directory of files) into a
//!   [`reader::SourceMapping`], setting aside records without codes.
//! * [`reconcile`] – inner joins two or three mappings and derives the differences.
//! * [`export`] – writes any keyed mapping as headerless semicolon separated rows.
//! * [`blast`] – unrelated to the above; gathers search result files into one report.
//! * [`settings`] – file and environment configuration for the binary.
//! * [`pipeline`] – the `compare` and `extract` runs built from the pieces above.
//!
//! ## Quick Start
//! ```
//! use anicompare::identity::extract_code;
//! use anicompare::metrics::{FastAni, Mash};
//! use anicompare::pair::PairKey;
//! use anicompare::reader::SourceMapping;
//! use anicompare::reconcile::Reconciler;
//!
//! let a = extract_code("GCA_000009765_Streptomyces_avermitilis").unwrap();
//! let b = extract_code("GCA_000203835_Streptomyces_coelicolor").unwrap();
//! let fastani: SourceMapping<FastAni> = [(
//!     PairKey::new(a.clone(), b.clone()),
//!     FastAni { ani: 90.5, mappings: 900, total_fragments: 1000 },
//! )].into_iter().collect();
//! let mash: SourceMapping<Mash> = [(PairKey::new(b, a), Mash { ani: 88.25 })]
//!     .into_iter()
//!     .collect();
//! let result = Reconciler::new().join(&fastani, 0).join(&mash, 0).reconcile().unwrap();
//! let record = result.merged.values().next().unwrap();
//! assert_eq!(record.differences(), &[2.25]);
//! ```
//!
//! ## Scaling
//! Everything is read fully into memory before joining: all sources' records
//! are held at once. This suits the tens of thousands of pairs a typical batch
//! produces; inputs far beyond that would need a streaming join.

pub mod blast;
pub mod error;
pub mod export;
pub mod identity;
pub mod metrics;
pub mod pair;
pub mod pipeline;
pub mod reader;
pub mod reconcile;
pub mod settings;
