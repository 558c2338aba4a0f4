use annolane::{AnnotatorConfig, FileInputs, default_workers};
use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;

/// Runtime configuration for the `annolane` binary.
///
/// Every option can also be supplied through the environment variable named
/// in its description, or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "annolane",
    version,
    about = "Annotates variants in input order using striped worker lanes"
)]
pub struct CliArgs {
    /// Primary input: a VCF file (`*.vcf` or `*.vcf.gz`).
    ///
    /// Environment variable: `ANNOLANE_VCF`
    #[arg(long, env = "ANNOLANE_VCF")]
    pub vcf: PathBuf,

    /// Pre-computed predictions for the VCF records, one JSON object per
    /// line (`*.json` or `*.jsonl`, optionally gzipped as `*.gz`).
    ///
    /// Records must appear in the same order as in the VCF. Without this
    /// file every record is resolved through the predictor.
    ///
    /// Environment variable: `ANNOLANE_VEP_JSON`
    #[arg(long, env = "ANNOLANE_VEP_JSON")]
    pub vep_json: Option<PathBuf>,

    /// Copy-number variants, annotated after the VCF records.
    ///
    /// Environment variable: `ANNOLANE_CNV`
    #[arg(long, env = "ANNOLANE_CNV")]
    pub cnv: Option<PathBuf>,

    /// Number of worker lanes. Defaults to four per logical CPU.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS")]
    pub workers: Option<usize>,

    /// Position of the first record to emit. Earlier records are skipped,
    /// which resumes an interrupted run.
    ///
    /// Environment variable: `START_POSITION`
    #[arg(long, env = "START_POSITION", default_value_t = 0)]
    pub start_position: u64,

    /// Output file for the JSON lines. Defaults to stdout. A name ending in
    /// `.gz` is written gzip-compressed. The first line holds the run
    /// metadata.
    ///
    /// Environment variable: `ANNOLANE_OUTPUT`
    #[arg(short, long, env = "ANNOLANE_OUTPUT")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: FileInputs,
    pub annotator: AnnotatorConfig,
    pub output: Option<PathBuf>,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let workers = args.workers.unwrap_or_else(default_workers);
        if workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.output.as_ref() == Some(&args.vcf) {
            bail!("Output {} would overwrite the VCF input", args.vcf.display());
        }

        let annotator = AnnotatorConfig::new(workers).with_start_position(args.start_position);
        annotator.validate()?;

        let inputs = FileInputs {
            vcf: args.vcf,
            vep_json: args.vep_json,
            cnv: args.cnv,
        };
        inputs.validate()?;

        Ok(Self {
            inputs,
            annotator,
            output: args.output,
        })
    }
}
