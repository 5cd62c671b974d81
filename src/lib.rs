//! `callset` is a crate for loading, normalizing, and comparing variant
//! callsets stored as VCF text.
//!
//! The crate is organized around a small number of facilities:
//!
//! - Reading and writing VCF text through the [`Reader`] and [`Writer`]
//!   facilities. Each data line becomes a canonical [`Record`].
//! - Exploding multi-allelic sites and multi-nucleotide variants into one row
//!   per allele (and per position) via the [`expand`] module.
//! - Looking up INFO and FORMAT/sample values with allele-aware slicing via
//!   the [`field`] module.
//! - Testing membership within a set of genomic regions via the
//!   [`region::Index`] facility.
//! - Computing concordance and differences between callsets via the
//!   [`algebra`] module.
//!
//! ## Loading a callset
//!
//! Most users will want to load an entire file at once as a [`Callset`]. The
//! header of the file is kept so the callset can be written back out
//! unchanged.
//!
//! ```
//! use callset::Callset;
//!
//! let data = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";
//! let data = format!("{data}1\t100\t.\tA\tG,T\t50\tPASS\tDP=10\n");
//!
//! let callset = Callset::try_from_reader(callset::Reader::new(data.as_bytes()))?;
//! assert_eq!(callset.records().len(), 1);
//!
//! // Splitting the multi-allelic site yields one record per allele.
//! let expanded = callset.expanded();
//! assert_eq!(expanded.len(), 2);
//! assert_eq!(expanded[0].alternate(), "G");
//! assert_eq!(expanded[1].alternate(), "T");
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Region membership
//!
//! A [`region::Index`] is built once from a BED-style region file and can then
//! be queried many times.
//!
//! ```
//! use callset::region::index::Builder;
//!
//! let data = b"chr1\t9\t20\n";
//! let index = Builder.try_build_from(&data[..])?;
//!
//! assert!(index.contains("1", 10, 1));
//! assert!(index.contains("1", 20, 1));
//! assert!(!index.contains("1", 21, 1));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod algebra;
pub mod callset;
pub mod expand;
pub mod external;
pub mod field;
pub mod filter;
pub mod header;
pub mod reader;
pub mod record;
pub mod region;
pub mod stats;
pub mod writer;

pub use callset::Callset;
pub use header::Header;
pub use record::Record;

pub use self::reader::Reader;
pub use self::writer::Writer;
