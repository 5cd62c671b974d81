//! A command-line interface to the `callset` crate.
//!
//! ```shell
//! cargo run --release --bin=callset --features=binaries -- stats calls.vcf.gz
//! ```
//!
//! Each subcommand loads one or more VCF files (optionally gzip-compressed)
//! and either reports on them or writes a derived VCF. Derived VCFs are
//! written to standard output unless `--output` is given.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use callset::algebra;
use callset::algebra::Key;
use callset::external;
use callset::external::MultiAllelicMode;
use callset::region::index::Builder;
use callset::stats;
use callset::stats::Source;
use callset::Callset;
use callset::Record;
use clap::Parser;
use clap::Subcommand;
use clap_verbosity_flag::Verbosity;
use tabled::settings::object::Rows;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////////////
// Arguments
////////////////////////////////////////////////////////////////////////////////////////

#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

#[derive(Subcommand)]
enum Command {
    /// Reports allele-fraction summaries for the first sample of a VCF.
    Stats {
        /// The VCF to summarize.
        vcf: PathBuf,

        /// The allele-fraction thresholds to report (defaults to 0.1, 0.05,
        /// and 0.2).
        #[arg(short, long)]
        threshold: Vec<f64>,

        /// Only consider records whose filter status is `PASS`.
        #[arg(long, default_value_t = false)]
        pass_only: bool,

        /// Where allele fractions come from: `depth` (AD / DP) or `caller`
        /// (the sample's `AF` or `FA`).
        #[arg(short, long, default_value_t = Source::default())]
        source: Source,
    },

    /// Reports the variants shared by two VCFs and those unique to each.
    Concordance {
        /// The first VCF.
        first: PathBuf,

        /// The second VCF.
        second: PathBuf,

        /// List every variant in addition to the counts.
        #[arg(short, long, default_value_t = false)]
        list: bool,
    },

    /// Writes the records of the first VCF that are absent from the second.
    Subtract {
        /// The VCF to subtract from.
        first: PathBuf,

        /// The VCF to subtract.
        second: PathBuf,

        /// The columns that make up the composite key (defaults to `CHROM`,
        /// `POS`, `REF`, and `ALT`).
        #[arg(short, long = "key")]
        keys: Vec<Key>,

        /// Where to write the result.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Writes the records of a VCF that fall within a set of regions.
    Intersect {
        /// The VCF to filter.
        vcf: PathBuf,

        /// The BED-style region file.
        regions: PathBuf,

        /// Where to write the result.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Writes a VCF with multi-allelic sites split and MNVs exploded.
    Expand {
        /// The VCF to expand.
        vcf: PathBuf,

        /// Where to write the result.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalizes a VCF with `bcftools norm`.
    Normalize {
        /// The VCF to normalize.
        vcf: PathBuf,

        /// The reference FASTA.
        #[arg(short, long)]
        reference: PathBuf,

        /// Where to write the result.
        #[arg(short, long)]
        output: PathBuf,

        /// The directory holding the `bcftools` executable.
        #[arg(long)]
        bcftools_dir: Option<PathBuf>,

        /// How multi-allelic sites are handled (e.g., `-both` or `+snps`).
        #[arg(long, allow_hyphen_values = true, default_value_t = MultiAllelicMode::default())]
        mode: MultiAllelicMode,

        /// Leave multi-allelic sites alone.
        #[arg(long, default_value_t = false, conflicts_with = "mode")]
        no_mode: bool,
    },

    /// Intersects a VCF with a BED file using `bedtools intersectBed`.
    BedtoolsIntersect {
        /// The VCF to intersect.
        vcf: PathBuf,

        /// The BED file.
        bed: PathBuf,

        /// Where to write the result.
        #[arg(short, long)]
        output: PathBuf,

        /// The directory holding the `intersectBed` executable.
        #[arg(long)]
        bedtools_dir: Option<PathBuf>,
    },
}

////////////////////////////////////////////////////////////////////////////////////////
// Helpers
////////////////////////////////////////////////////////////////////////////////////////

/// Loads a callset, attaching the path to any error.
fn load(path: &Path) -> Result<Callset> {
    Callset::try_from_path(path).with_context(|| format!("reading `{}`", path.display()))
}

/// Writes records beneath the header of `callset` to `output` (or standard
/// output).
fn write(callset: &Callset, records: &[Record], output: Option<&Path>) -> Result<()> {
    let inner: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating `{}`", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    callset::callset::write(callset.header(), records, inner).context("writing records")?;

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Subcommands
////////////////////////////////////////////////////////////////////////////////////////

/// Prints allele-fraction summaries as a table.
fn report_stats(
    vcf: &Path,
    thresholds: Vec<f64>,
    pass_only: bool,
    source: Source,
) -> Result<()> {
    let callset = load(vcf)?;

    let sample = match callset.header().first_sample() {
        Some(sample) => sample.to_string(),
        None => bail!("`{}` has no sample columns", vcf.display()),
    };

    let records = match pass_only {
        true => callset.pass_only(),
        false => callset.records().to_vec(),
    };
    let records = callset::expand::expand(records);

    let thresholds = match thresholds.is_empty() {
        true => stats::DEFAULT_THRESHOLDS.to_vec(),
        false => thresholds,
    };

    info!("summarizing sample `{sample}`");
    let summaries = stats::summarize(&records, &sample, source, &thresholds)
        .with_context(|| format!("computing allele fractions for `{sample}`"))?;

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["AF >=", "SNVs", "Indels", "MNVs"]);

    for summary in summaries {
        builder.push_record([
            summary.threshold().to_string(),
            summary.snvs().to_string(),
            summary.indels().to_string(),
            summary.mnvs().to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::right())
        .to_string();

    println!("{table}");

    Ok(())
}

/// Prints the concordance of two callsets.
fn report_concordance(first: &Path, second: &Path, list: bool) -> Result<()> {
    let a = load(first)?;
    let b = load(second)?;

    let concordance = algebra::concordance(&a.expanded(), &b.expanded());

    let sets = [
        ("concordant", concordance.concordant()),
        ("only in first", concordance.discordant_first()),
        ("only in second", concordance.discordant_second()),
    ];

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Set", "Variants"]);

    for (name, set) in &sets {
        builder.push_record([name.to_string(), set.len().to_string()]);
    }

    println!("{}", builder.build().with(Style::rounded()));

    if list {
        for (name, set) in sets {
            for key in set {
                println!("{name}\t{key}");
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(std::io::stderr)
            .init(),
    };

    match args.command {
        Command::Stats {
            vcf,
            threshold,
            pass_only,
            source,
        } => report_stats(&vcf, threshold, pass_only, source),
        Command::Concordance {
            first,
            second,
            list,
        } => report_concordance(&first, &second, list),
        Command::Subtract {
            first,
            second,
            keys,
            output,
        } => {
            let a = load(&first)?;
            let b = load(&second)?;
            write(&a, &a.subtract(&b, &keys), output.as_deref())
        }
        Command::Intersect {
            vcf,
            regions,
            output,
        } => {
            let callset = load(&vcf)?;
            let index = Builder
                .try_build_from_path(&regions)
                .with_context(|| format!("reading regions from `{}`", regions.display()))?;

            write(
                &callset,
                &algebra::intersect(callset.records(), &index),
                output.as_deref(),
            )
        }
        Command::Expand { vcf, output } => {
            let callset = load(&vcf)?;
            write(&callset, &callset.expanded(), output.as_deref())
        }
        Command::Normalize {
            vcf,
            reference,
            output,
            bcftools_dir,
            mode,
            no_mode,
        } => {
            let mut normalizer =
                external::Normalizer::new(reference).with_mode((!no_mode).then_some(mode));

            if let Some(dir) = bcftools_dir {
                normalizer = normalizer.with_bcftools_dir(dir);
            }

            normalizer
                .run(&vcf, &output)
                .with_context(|| format!("normalizing `{}`", vcf.display()))
        }
        Command::BedtoolsIntersect {
            vcf,
            bed,
            output,
            bedtools_dir,
        } => {
            let mut intersector = external::Intersector::default();

            if let Some(dir) = bedtools_dir {
                intersector = intersector.with_bedtools_dir(dir);
            }

            intersector
                .run(&vcf, &bed, &output)
                .with_context(|| {
                    format!("intersecting `{}` with `{}`", vcf.display(), bed.display())
                })
        }
    }
}
