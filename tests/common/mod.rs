//! Stand-in executables for the external tools.
//!
//! Each stub is a small shell script that appends its arguments to
//! `calls.log` in the stub directory and writes the files the real tool
//! would produce, with fixed content.

#![allow(dead_code)] // Each test binary uses a different subset

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use reseq_pipeline::tools::{
    ToolSet, BOWTIE2_BUILD_ENV_BIN, CUFFLINKS_ENV_BIN, FASTQ_DUMP_ENV_BIN, PREFETCH_ENV_BIN,
    PROKKA_ENV_BIN, SPADES_ENV_BIN, TOPHAT_ENV_BIN,
};

/// Annotation report written by the annotator stub
pub const ANNOTATION_REPORT: &str = "organism: Escherichia coli strain\n\
                                     contigs: 2\n\
                                     bases: 3501\n\
                                     CDS: 4000\n\
                                     rRNA: 7\n\
                                     tRNA: 90\n";

/// Contig lengths in the assembler stub's output; two are longer than 1000
pub const CONTIG_LENGTHS: [usize; 4] = [2500, 1000, 1001, 300];

pub struct StubTools {
    pub dir: PathBuf,
    pub tools: ToolSet,
}

impl StubTools {
    /// Every stub invocation so far, one line each
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// `(variable, executable)` pairs for running the binary
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            (PREFETCH_ENV_BIN, self.tools.prefetch.clone()),
            (FASTQ_DUMP_ENV_BIN, self.tools.fastq_dump.clone()),
            (SPADES_ENV_BIN, self.tools.spades.clone()),
            (PROKKA_ENV_BIN, self.tools.prokka.clone()),
            (BOWTIE2_BUILD_ENV_BIN, self.tools.bowtie2_build.clone()),
            (TOPHAT_ENV_BIN, self.tools.tophat.clone()),
            (CUFFLINKS_ENV_BIN, self.tools.cufflinks.clone()),
        ]
    }
}

fn contig_fasta() -> String {
    CONTIG_LENGTHS
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            let sequence = "ACGT".repeat(len / 4) + &"A".repeat(len % 4);
            format!(">NODE_{}_length_{len}\n{sequence}\n", i + 1)
        })
        .collect()
}

/// Write an executable `#!/bin/sh` script that logs its call, then runs `body`
pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let log = dir.join("calls.log");
    let script = format!(
        "#!/bin/sh\nset -e\necho \"{name} $*\" >> '{}'\n{body}\n",
        log.display()
    );
    fs::write(&path, script).unwrap();

    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).unwrap();

    path.display().to_string()
}

/// Parses `-o`/`--outdir`/`--prefix` and leaves the final argument in `$last`
const PARSE_ARGS: &str = r#"out=""
prefix=""
last=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o|--outdir) out="$2"; shift 2 ;;
    --prefix) prefix="$2"; shift 2 ;;
    *) last="$1"; shift ;;
  esac
done"#;

/// Write stubs for every tool into `dir`
pub fn install(dir: &Path) -> StubTools {
    fs::create_dir_all(dir).unwrap();

    let contigs = dir.join("contigs.fasta");
    fs::write(&contigs, contig_fasta()).unwrap();
    let report = dir.join("report.txt");
    fs::write(&report, ANNOTATION_REPORT).unwrap();

    let tools = ToolSet {
        // prefetch <accession> -O <dir>
        prefetch: write_script(
            dir,
            "prefetch",
            r#"mkdir -p "$3/$1"
: > "$3/$1/$1.sra""#,
        ),
        // fastq-dump -I --outdir <dir> <sra>
        fastq_dump: write_script(
            dir,
            "fastq-dump",
            r#"run=$(basename "$4" .sra)
printf '@read1\nACGTACGT\n+\nIIIIIIII\n' > "$3/$run.fastq""#,
        ),
        spades: write_script(
            dir,
            "spades.py",
            &format!(
                "{PARSE_ARGS}\nmkdir -p \"$out\"\ncp '{}' \"$out/contigs.fasta\"",
                contigs.display()
            ),
        ),
        prokka: write_script(
            dir,
            "prokka",
            &format!(
                "{PARSE_ARGS}\nmkdir -p \"$out\"\ncp '{}' \"$out/$prefix.txt\"\n: > \"$out/$prefix.gff\"",
                report.display()
            ),
        ),
        // bowtie2-build <reference> <prefix>
        bowtie2_build: write_script(dir, "bowtie2-build", r#": > "$2.1.bt2""#),
        tophat: write_script(
            dir,
            "tophat2",
            &format!("{PARSE_ARGS}\nmkdir -p \"$out\"\n: > \"$out/accepted_hits.bam\""),
        ),
        cufflinks: write_script(
            dir,
            "cufflinks",
            &format!(
                "{PARSE_ARGS}\nmkdir -p \"$out\"\nprintf '{}' > \"$out/genes.fpkm_tracking\"",
                r"tracking_id\tclass_code\tlocus\tFPKM\tFPKM_status\nCUFF.1\t-\tNC_000913:190-255\t5.2\tOK\nCUFF.2\t-\tNC_000913:337-2799\t0\tOK\nCUFF.1\t-\tNC_000913:3000-3100\t12.75\tOK\n"
            ),
        ),
    };

    StubTools {
        dir: dir.to_path_buf(),
        tools,
    }
}

/// Inputs the pipeline expects to find in the results directory up front:
/// the assembly reads (so they are not fetched) and the reference genome.
pub fn seed_results(results: &Path) {
    fs::create_dir_all(results).unwrap();
    fs::write(
        results.join("SRR8185310.fastq"),
        "@read1\nACGTACGT\n+\nIIIIIIII\n",
    )
    .unwrap();
    fs::write(results.join("NC_000913.fna"), ">NC_000913.3\nACGTACGTACGT\n").unwrap();
}
