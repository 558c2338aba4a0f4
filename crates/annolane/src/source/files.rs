use super::{CnvReader, PrimaryStream, Streams, VariantSource, VcfReader, VepJsonReader};
use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

const GZIP_SUFFIX: &str = ".gz";

/// The files a run reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInputs {
    /// Primary variants. Must end in `.vcf` or `.vcf.gz`.
    pub vcf: PathBuf,
    /// Pre-computed predictions paired with the VCF records. Must end in
    /// `.json` or `.jsonl`, optionally followed by `.gz`. Without it, every
    /// record goes to the predictor.
    pub vep_json: Option<PathBuf>,
    /// Copy-number variants, read after the VCF records are exhausted. Read
    /// through gzip when the name ends in `.gz`.
    pub cnv: Option<PathBuf>,
}

impl FileInputs {
    /// Checks that every configured file exists and is named as expected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] or [`Error::BadInputName`] for the
    /// first offending file.
    pub fn validate(&self) -> Result<()> {
        require(&self.vcf, &[".vcf", ".vcf.gz"], ".vcf")?;
        if let Some(path) = &self.vep_json {
            require(path, &[".json", ".jsonl", ".json.gz", ".jsonl.gz"], ".json")?;
        }
        if let Some(path) = &self.cnv {
            require(path, &[], "")?;
        }
        Ok(())
    }
}

fn require(path: &Path, suffixes: &[&str], expected: &'static str) -> Result<()> {
    if !path.is_file() {
        return Err(Error::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if !suffixes.is_empty() && !suffixes.iter().any(|s| name.ends_with(s)) {
        return Err(Error::BadInputName {
            path: path.to_path_buf(),
            expected,
        });
    }
    Ok(())
}

fn is_gzip(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(GZIP_SUFFIX))
}

/// Opens `path` for line reading, decompressing `*.gz` files on the fly.
fn open(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|e| Error::Input {
        context: format!("{}: {e}", path.display()),
    })?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A [`VariantSource`] that re-opens the input files for every lane.
#[derive(Clone, Debug)]
pub struct FileSource {
    inputs: FileInputs,
}

impl FileSource {
    /// # Errors
    ///
    /// Fails if [`FileInputs::validate`] does.
    pub fn new(inputs: FileInputs) -> Result<Self> {
        inputs.validate()?;
        Ok(Self { inputs })
    }

    pub const fn inputs(&self) -> &FileInputs {
        &self.inputs
    }
}

impl VariantSource for FileSource {
    fn open(&self) -> Result<Streams> {
        let vcf = VcfReader::new(open(&self.inputs.vcf)?, self.inputs.vcf.display().to_string());
        let primary: PrimaryStream = match &self.inputs.cnv {
            Some(path) => {
                let cnv = CnvReader::new(open(path)?, path.display().to_string());
                Box::new(vcf.chain(cnv))
            }
            None => Box::new(vcf),
        };

        let secondary = match &self.inputs.vep_json {
            Some(path) => Some(Box::new(VepJsonReader::new(
                open(path)?,
                path.display().to_string(),
            )) as super::SecondaryStream),
            None => None,
        };

        Ok(Streams { primary, secondary })
    }
}
