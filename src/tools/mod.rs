//! External tools driven by the pipeline.
//!
//! Each tool is described by a [`ToolInvocation`]: an executable plus an
//! explicit argument list (never a shell string) and the files it must
//! produce. [`runner::ToolRunner`] executes invocations.
//!
//! | Tool | Default executable | Override |
//! |------|--------------------|----------|
//! | Read retriever | `prefetch`, `fastq-dump` | `RESEQ_PREFETCH_BIN`, `RESEQ_FASTQ_DUMP_BIN` |
//! | Assembler | `spades.py` | `RESEQ_SPADES_BIN` |
//! | Annotator | `prokka` | `RESEQ_PROKKA_BIN` |
//! | Index builder | `bowtie2-build` | `RESEQ_BOWTIE2_BUILD_BIN` |
//! | Read mapper | `tophat2` | `RESEQ_TOPHAT_BIN` |
//! | Quantifier | `cufflinks` | `RESEQ_CUFFLINKS_BIN` |

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod runner;

pub const PREFETCH_ENV_BIN: &str = "RESEQ_PREFETCH_BIN";
pub const FASTQ_DUMP_ENV_BIN: &str = "RESEQ_FASTQ_DUMP_BIN";
pub const SPADES_ENV_BIN: &str = "RESEQ_SPADES_BIN";
pub const PROKKA_ENV_BIN: &str = "RESEQ_PROKKA_BIN";
pub const BOWTIE2_BUILD_ENV_BIN: &str = "RESEQ_BOWTIE2_BUILD_BIN";
pub const TOPHAT_ENV_BIN: &str = "RESEQ_TOPHAT_BIN";
pub const CUFFLINKS_ENV_BIN: &str = "RESEQ_CUFFLINKS_BIN";

/// Executables used for each external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub prefetch: String,
    pub fastq_dump: String,
    pub spades: String,
    pub prokka: String,
    pub bowtie2_build: String,
    pub tophat: String,
    pub cufflinks: String,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            prefetch: "prefetch".to_string(),
            fastq_dump: "fastq-dump".to_string(),
            spades: "spades.py".to_string(),
            prokka: "prokka".to_string(),
            bowtie2_build: "bowtie2-build".to_string(),
            tophat: "tophat2".to_string(),
            cufflinks: "cufflinks".to_string(),
        }
    }
}

impl ToolSet {
    /// Defaults, overridden by any non-empty `RESEQ_<TOOL>_BIN` variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let defaults = Self::default();
        Self {
            prefetch: pick(PREFETCH_ENV_BIN, defaults.prefetch),
            fastq_dump: pick(FASTQ_DUMP_ENV_BIN, defaults.fastq_dump),
            spades: pick(SPADES_ENV_BIN, defaults.spades),
            prokka: pick(PROKKA_ENV_BIN, defaults.prokka),
            bowtie2_build: pick(BOWTIE2_BUILD_ENV_BIN, defaults.bowtie2_build),
            tophat: pick(TOPHAT_ENV_BIN, defaults.tophat),
            cufflinks: pick(CUFFLINKS_ENV_BIN, defaults.cufflinks),
        }
    }
}

/// A single external tool run: executable, arguments and expected outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Short name used in diagnostics
    pub name: &'static str,
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Variable that overrides `program`, reported when it cannot be found
    pub env_var: &'static str,
    pub expected_outputs: Vec<PathBuf>,
}

impl ToolInvocation {
    pub fn new(name: &'static str, program: impl AsRef<OsStr>, env_var: &'static str) -> Self {
        Self {
            name,
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            env_var,
            expected_outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Record a file or directory the tool must leave behind
    #[must_use]
    pub fn expects(mut self, path: impl AsRef<Path>) -> Self {
        self.expected_outputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Space-joined command line, for logs only (never executed by a shell)
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// `prefetch <accession> -O <out_dir>`
pub fn prefetch(tools: &ToolSet, accession: &str, out_dir: &Path, sra: &Path) -> ToolInvocation {
    ToolInvocation::new("prefetch", &tools.prefetch, PREFETCH_ENV_BIN)
        .arg(accession)
        .arg("-O")
        .arg(out_dir)
        .expects(sra)
}

/// `fastq-dump -I --outdir <out_dir> <sra>`
pub fn fastq_dump(tools: &ToolSet, sra: &Path, out_dir: &Path, fastq: &Path) -> ToolInvocation {
    ToolInvocation::new("fastq-dump", &tools.fastq_dump, FASTQ_DUMP_ENV_BIN)
        .arg("-I")
        .arg("--outdir")
        .arg(out_dir)
        .arg(sra)
        .expects(fastq)
}

/// `spades.py -k <k1,k2,..> -t <threads> -s <reads> -o <out_dir>`
pub fn spades(
    tools: &ToolSet,
    kmer_sizes: &[u32],
    threads: usize,
    reads: &Path,
    out_dir: &Path,
) -> ToolInvocation {
    let kmers = kmer_sizes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");

    ToolInvocation::new("SPAdes", &tools.spades, SPADES_ENV_BIN)
        .arg("-k")
        .arg(kmers)
        .arg("-t")
        .arg(threads.to_string())
        .arg("-s")
        .arg(reads)
        .arg("-o")
        .arg(out_dir)
        .expects(out_dir.join("contigs.fasta"))
}

/// `prokka --outdir <out_dir> --prefix <prefix> --genus <genus> --cpus <threads> --force <contigs>`
pub fn prokka(
    tools: &ToolSet,
    out_dir: &Path,
    prefix: &str,
    genus: &str,
    threads: usize,
    contigs: &Path,
) -> ToolInvocation {
    ToolInvocation::new("Prokka", &tools.prokka, PROKKA_ENV_BIN)
        .arg("--outdir")
        .arg(out_dir)
        .arg("--prefix")
        .arg(prefix)
        .arg("--genus")
        .arg(genus)
        .arg("--cpus")
        .arg(threads.to_string())
        .arg("--force")
        .arg(contigs)
        .expects(out_dir)
}

/// `bowtie2-build <reference> <index_prefix>`
pub fn bowtie2_build(tools: &ToolSet, reference: &Path, index_prefix: &Path) -> ToolInvocation {
    let first_index_file = PathBuf::from(format!("{}.1.bt2", index_prefix.display()));

    ToolInvocation::new("bowtie2-build", &tools.bowtie2_build, BOWTIE2_BUILD_ENV_BIN)
        .arg(reference)
        .arg(index_prefix)
        .expects(first_index_file)
}

/// `tophat2 -p <threads> -o <out_dir> <index_prefix> <reads>`
pub fn tophat(
    tools: &ToolSet,
    threads: usize,
    out_dir: &Path,
    index_prefix: &Path,
    reads: &Path,
) -> ToolInvocation {
    ToolInvocation::new("TopHat", &tools.tophat, TOPHAT_ENV_BIN)
        .arg("-p")
        .arg(threads.to_string())
        .arg("-o")
        .arg(out_dir)
        .arg(index_prefix)
        .arg(reads)
        .expects(out_dir.join("accepted_hits.bam"))
}

/// `cufflinks -p <threads> -o <out_dir> <alignments>`
pub fn cufflinks(
    tools: &ToolSet,
    threads: usize,
    out_dir: &Path,
    alignments: &Path,
) -> ToolInvocation {
    ToolInvocation::new("Cufflinks", &tools.cufflinks, CUFFLINKS_ENV_BIN)
        .arg("-p")
        .arg(threads.to_string())
        .arg("-o")
        .arg(out_dir)
        .arg(alignments)
        .expects(out_dir.join("genes.fpkm_tracking"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_tool_set_overrides() {
        let env: HashMap<&str, &str> = [
            (SPADES_ENV_BIN, " /opt/spades/bin/spades.py "),
            (PROKKA_ENV_BIN, ""),
        ]
        .into_iter()
        .collect();

        let tools = ToolSet::from_lookup(|key| env.get(key).map(ToString::to_string));

        assert_eq!(tools.spades, "/opt/spades/bin/spades.py");
        // Empty values fall back to the default
        assert_eq!(tools.prokka, "prokka");
        assert_eq!(tools.cufflinks, "cufflinks");
    }

    #[test]
    fn test_spades_invocation() {
        let tools = ToolSet::default();
        let invocation = spades(
            &tools,
            &[55, 77, 99, 127],
            4,
            Path::new("results/SRR8185310.fastq"),
            Path::new("results/SPAdes"),
        );

        assert_eq!(
            invocation.command_line(),
            "spades.py -k 55,77,99,127 -t 4 -s results/SRR8185310.fastq -o results/SPAdes"
        );
        assert_eq!(
            invocation.expected_outputs,
            vec![PathBuf::from("results/SPAdes/contigs.fasta")]
        );
    }

    #[test]
    fn test_prokka_invocation() {
        let invocation = prokka(
            &ToolSet::default(),
            Path::new("results/prokka"),
            "annotation",
            "Escherichia",
            2,
            Path::new("results/long_contigs.fasta"),
        );

        assert_eq!(
            invocation.to_string(),
            "prokka --outdir results/prokka --prefix annotation --genus Escherichia --cpus 2 --force results/long_contigs.fasta"
        );
    }

    #[test]
    fn test_path_with_spaces_stays_one_argument() {
        let invocation = cufflinks(
            &ToolSet::default(),
            8,
            Path::new("my results/cufflinks"),
            Path::new("my results/tophat/accepted_hits.bam"),
        );

        assert_eq!(invocation.args.len(), 5);
        assert_eq!(invocation.args[3], OsString::from("my results/cufflinks"));
    }

    #[test]
    fn test_bowtie2_build_expects_index() {
        let invocation = bowtie2_build(
            &ToolSet::default(),
            Path::new("results/NC_000913.fna"),
            Path::new("results/index/NC_000913"),
        );

        assert_eq!(
            invocation.expected_outputs,
            vec![PathBuf::from("results/index/NC_000913.1.bt2")]
        );
    }

    #[test]
    fn test_read_retrieval_invocations() {
        let tools = ToolSet::default();
        let results = Path::new("results");
        let sra = Path::new("results/SRR8185310/SRR8185310.sra");

        assert_eq!(
            prefetch(&tools, "SRX5005282", results, sra).command_line(),
            "prefetch SRX5005282 -O results"
        );
        assert_eq!(
            fastq_dump(&tools, sra, results, Path::new("results/SRR8185310.fastq")).command_line(),
            "fastq-dump -I --outdir results results/SRR8185310/SRR8185310.sra"
        );
    }
}
