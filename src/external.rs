//! Wrappers around the external normalization and intersection tools.
//!
//! Neither tool is reimplemented here: each wrapper only builds the command
//! line, runs it with its standard output redirected to a file, and reports
//! failures.

use std::fs::File;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;
use std::str::FromStr;

use tracing::debug;
use tracing::info;

/// The name of the `bcftools` executable.
pub const BCFTOOLS: &str = "bcftools";

/// The name of the `bedtools` intersection executable.
pub const INTERSECT_BED: &str = "intersectBed";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to running an external tool.
#[derive(Debug)]
pub enum Error {
    /// The executable does not exist.
    MissingExecutable(PathBuf),

    /// The tool exited unsuccessfully.
    NonZeroExit {
        /// The tool that was run.
        tool: String,

        /// The exit status.
        status: ExitStatus,
    },

    /// An I/O error.
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingExecutable(path) => {
                write!(f, "executable `{}` does not exist", path.display())
            }
            Error::NonZeroExit { tool, status } => {
                write!(f, "`{tool}` failed with {status}")
            }
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Multi-allelic modes
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a [`MultiAllelicMode`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseModeError {
    /// The mode did not start with `-` or `+`.
    InvalidDirection(String),

    /// The variant types were not one of `snps`, `indels`, `both` or `any`.
    InvalidScope(String),
}

impl std::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseModeError::InvalidDirection(value) => write!(
                f,
                "invalid multi-allelic mode `{value}`: expected a leading `-` (split) or `+` \
                 (join)"
            ),
            ParseModeError::InvalidScope(value) => write!(
                f,
                "invalid multi-allelic mode `{value}`: expected one of `snps`, `indels`, `both` \
                 or `any`"
            ),
        }
    }
}

impl std::error::Error for ParseModeError {}

/// The variant types affected by a [`MultiAllelicMode`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scope {
    /// SNVs only.
    Snps,

    /// Indels only.
    Indels,

    /// SNVs and indels, kept in separate records when joining.
    #[default]
    Both,

    /// SNVs and indels, merged into a single record when joining.
    Any,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Snps => write!(f, "snps"),
            Scope::Indels => write!(f, "indels"),
            Scope::Both => write!(f, "both"),
            Scope::Any => write!(f, "any"),
        }
    }
}

/// Whether `bcftools norm` splits multi-allelic sites or joins bi-allelic
/// sites.
///
/// # Examples
///
/// ```
/// use callset::external::MultiAllelicMode;
/// use callset::external::Scope;
///
/// assert_eq!(MultiAllelicMode::default().to_string(), "-both");
/// assert_eq!("+snps".parse(), Ok(MultiAllelicMode::Join(Scope::Snps)));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MultiAllelicMode {
    /// Split multi-allelic sites into bi-allelic records.
    Split(Scope),

    /// Join bi-allelic sites into multi-allelic records.
    Join(Scope),
}

impl Default for MultiAllelicMode {
    fn default() -> Self {
        Self::Split(Scope::Both)
    }
}

impl std::fmt::Display for MultiAllelicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultiAllelicMode::Split(scope) => write!(f, "-{scope}"),
            MultiAllelicMode::Join(scope) => write!(f, "+{scope}"),
        }
    }
}

impl FromStr for MultiAllelicMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (split, scope) = match (s.strip_prefix('-'), s.strip_prefix('+')) {
            (Some(scope), _) => (true, scope),
            (_, Some(scope)) => (false, scope),
            _ => return Err(ParseModeError::InvalidDirection(s.to_string())),
        };

        let scope = match scope {
            "snps" => Scope::Snps,
            "indels" => Scope::Indels,
            "both" => Scope::Both,
            "any" => Scope::Any,
            _ => return Err(ParseModeError::InvalidScope(s.to_string())),
        };

        match split {
            true => Ok(Self::Split(scope)),
            false => Ok(Self::Join(scope)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Normalization
////////////////////////////////////////////////////////////////////////////////////////

/// Left-aligns and normalizes a VCF with `bcftools norm`.
#[derive(Clone, Debug)]
pub struct Normalizer {
    /// The reference FASTA.
    reference: PathBuf,

    /// The directory holding the `bcftools` executable. When unset, the
    /// executable is looked up on the `PATH`.
    bcftools_dir: Option<PathBuf>,

    /// How multi-allelic sites are handled. When unset, they are left alone.
    mode: Option<MultiAllelicMode>,
}

impl Normalizer {
    /// Creates a normalizer against a reference FASTA that splits all
    /// multi-allelic sites.
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            bcftools_dir: None,
            mode: Some(MultiAllelicMode::default()),
        }
    }

    /// Sets the directory holding the `bcftools` executable.
    pub fn with_bcftools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bcftools_dir = Some(dir.into());
        self
    }

    /// Sets how multi-allelic sites are handled.
    pub fn with_mode(mut self, mode: Option<MultiAllelicMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Builds the command that normalizes `input`.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::external::Normalizer;
    ///
    /// let command = Normalizer::new("hs37d5.fa").command("calls.vcf");
    /// let args = command
    ///     .get_args()
    ///     .map(|arg| arg.to_string_lossy().into_owned())
    ///     .collect::<Vec<_>>();
    ///
    /// assert_eq!(command.get_program(), "bcftools");
    /// assert_eq!(
    ///     args,
    ///     vec!["norm", "-f", "hs37d5.fa", "-O", "v", "-c", "s", "-m", "-both", "calls.vcf"]
    /// );
    /// ```
    pub fn command(&self, input: impl AsRef<Path>) -> Command {
        let mut command = Command::new(executable(self.bcftools_dir.as_deref(), BCFTOOLS));

        command
            .arg("norm")
            .arg("-f")
            .arg(&self.reference)
            .args(["-O", "v", "-c", "s"]);

        if let Some(mode) = self.mode {
            command.arg("-m").arg(mode.to_string());
        }

        command.arg(input.as_ref());
        command
    }

    /// Normalizes `input`, writing the result to `output`.
    pub fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let input = input.as_ref();
        info!("normalizing {}", input.display());

        let command = self.command(input);
        run(command, self.bcftools_dir.is_some(), output.as_ref())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Intersection
////////////////////////////////////////////////////////////////////////////////////////

/// Intersects a VCF with a region file using `bedtools intersectBed`.
#[derive(Clone, Debug, Default)]
pub struct Intersector {
    /// The directory holding the `intersectBed` executable. When unset, the
    /// executable is looked up on the `PATH`.
    bedtools_dir: Option<PathBuf>,
}

impl Intersector {
    /// Sets the directory holding the `intersectBed` executable.
    pub fn with_bedtools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bedtools_dir = Some(dir.into());
        self
    }

    /// Builds the command that intersects `vcf` with `regions`.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::external::Intersector;
    ///
    /// let command = Intersector::default()
    ///     .with_bedtools_dir("/opt/bedtools/bin")
    ///     .command("calls.vcf", "targets.bed");
    /// let args = command
    ///     .get_args()
    ///     .map(|arg| arg.to_string_lossy().into_owned())
    ///     .collect::<Vec<_>>();
    ///
    /// assert_eq!(command.get_program(), "/opt/bedtools/bin/intersectBed");
    /// assert_eq!(args, vec!["-a", "calls.vcf", "-b", "targets.bed", "-header"]);
    /// ```
    pub fn command(&self, vcf: impl AsRef<Path>, regions: impl AsRef<Path>) -> Command {
        let mut command = Command::new(executable(self.bedtools_dir.as_deref(), INTERSECT_BED));

        command
            .arg("-a")
            .arg(vcf.as_ref())
            .arg("-b")
            .arg(regions.as_ref())
            .arg("-header");

        command
    }

    /// Intersects `vcf` with `regions`, writing the result to `output`.
    pub fn run(
        &self,
        vcf: impl AsRef<Path>,
        regions: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<()> {
        let (vcf, regions) = (vcf.as_ref(), regions.as_ref());
        info!("intersecting {} with {}", vcf.display(), regions.display());

        let command = self.command(vcf, regions);
        run(command, self.bedtools_dir.is_some(), output.as_ref())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Helpers
////////////////////////////////////////////////////////////////////////////////////////

/// Resolves the path of an executable.
fn executable(dir: Option<&Path>, name: &str) -> PathBuf {
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Runs a command with its standard output redirected to `output`.
///
/// When `explicit` is set, the program is a full path and is checked for
/// existence before anything is written.
fn run(mut command: Command, explicit: bool, output: &Path) -> Result<()> {
    let program = PathBuf::from(command.get_program());

    if explicit && !program.exists() {
        return Err(Error::MissingExecutable(program));
    }

    debug!("running {:?}", command);

    let out = File::create(output).map_err(Error::Io)?;
    let status = command
        .stdout(Stdio::from(out))
        .stderr(Stdio::inherit())
        .status()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::MissingExecutable(program.clone()),
            _ => Error::Io(err),
        })?;

    if !status.success() {
        return Err(Error::NonZeroExit {
            tool: program.display().to_string(),
            status,
        });
    }

    info!("wrote {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn parse_modes() {
        assert_eq!(
            "-indels".parse::<MultiAllelicMode>(),
            Ok(MultiAllelicMode::Split(Scope::Indels))
        );
        assert_eq!(
            "+any".parse::<MultiAllelicMode>(),
            Ok(MultiAllelicMode::Join(Scope::Any))
        );

        let err = "both".parse::<MultiAllelicMode>().unwrap_err();
        assert!(matches!(err, ParseModeError::InvalidDirection(_)));

        let err = "-all".parse::<MultiAllelicMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid multi-allelic mode `-all`: expected one of `snps`, `indels`, `both` or `any`"
        );
    }

    #[test]
    fn normalizer_without_mode() {
        let command = Normalizer::new("ref.fa")
            .with_bcftools_dir("/opt/bcftools")
            .with_mode(None)
            .command("in.vcf");

        let args = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        assert_eq!(command.get_program(), "/opt/bcftools/bcftools");
        assert_eq!(args, vec!["norm", "-f", "ref.fa", "-O", "v", "-c", "s", "in.vcf"]);
    }

    #[test]
    fn missing_executable() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("external")?;
        let output = dir.path().join("out.vcf");

        let err = Intersector::default()
            .with_bedtools_dir(dir.path().join("missing"))
            .run("in.vcf", "in.bed", &output)
            .unwrap_err();

        assert!(matches!(err, Error::MissingExecutable(_)));
        assert!(!output.exists());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn exit_status() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = TempDir::new("external")?;
        let output = dir.path().join("out.vcf");

        let install = |script: &str| -> io::Result<()> {
            let path = dir.path().join(INTERSECT_BED);
            std::fs::write(&path, script)?;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        };

        install("#!/bin/sh\necho \"$@\"\n")?;
        Intersector::default()
            .with_bedtools_dir(dir.path())
            .run("in.vcf", "in.bed", &output)?;
        assert_eq!(
            std::fs::read_to_string(&output)?,
            "-a in.vcf -b in.bed -header\n"
        );

        install("#!/bin/sh\nexit 3\n")?;
        let err = Intersector::default()
            .with_bedtools_dir(dir.path())
            .run("in.vcf", "in.bed", &output)
            .unwrap_err();
        assert!(matches!(&err, Error::NonZeroExit { status, .. } if status.code() == Some(3)));

        Ok(())
    }
}
