use annolane::{Annotated, AnnotatorConfig, FileInputs, PairedRecord, ResolveError, Resolver};
use flate2::{Compression, write::GzEncoder};
use serde_json::{Value, json};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Destination of the JSON lines. Files named `*.gz` are gzip-compressed.
pub enum Sink {
    Plain(BufWriter<Box<dyn Write>>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    /// Creates `path`, replacing any existing file, or writes to stdout when
    /// no path is given.
    pub fn create(path: Option<&Path>) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Plain(BufWriter::new(Box::new(io::stdout().lock()))));
        };
        let file = File::create(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Self::Gzip(GzEncoder::new(
                BufWriter::new(file),
                Compression::default(),
            )))
        } else {
            Ok(Self::Plain(BufWriter::new(Box::new(file))))
        }
    }

    /// Flushes buffered lines and, for gzip output, writes the trailer.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut out) => out.flush(),
            Self::Gzip(gz) => gz.finish()?.flush(),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(out) => out.write(buf),
            Self::Gzip(gz) => gz.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(out) => out.flush(),
            Self::Gzip(gz) => gz.flush(),
        }
    }
}

/// Describes the run. Written as the first line of the output, ahead of the
/// records, so that a file can be traced back to its inputs.
pub fn metadata(inputs: &FileInputs, annotator: &AnnotatorConfig) -> Value {
    let display = |path: &Path| path.display().to_string();
    json!({
        "metadata": {
            "tool": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "inputs": {
                "vcf": display(&inputs.vcf),
                "vep_json": inputs.vep_json.as_deref().map(display),
                "cnv": inputs.cnv.as_deref().map(display),
            },
            "workers": annotator.workers,
            "start_position": annotator.start_position,
        }
    })
}

/// Emits the attached prediction unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl Resolver for PassThrough {
    type Output = Value;

    fn resolve(&self, record: &PairedRecord) -> Result<Value, ResolveError> {
        record
            .prediction()
            .map(|prediction| prediction.body.clone())
            .ok_or_else(|| ResolveError::Resolver("record has no prediction".to_owned()))
    }
}

/// Renders one result as a JSON object.
///
/// Annotated records carry their payload under `annotation`; failed records
/// carry the failure message under `error`.
pub fn to_json(item: Annotated<Value>) -> serde_json::Result<Value> {
    let mut line = json!({
        "position": item.position,
        "kind": item.variant.kind(),
        "locus": item.variant.locus().to_string(),
        "variant": serde_json::to_value(&item.variant)?,
    });
    match item.outcome {
        Ok(annotation) => line["annotation"] = annotation,
        Err(e) => line["error"] = Value::String(e.to_string()),
    }
    Ok(line)
}

pub fn write_value<W: Write>(out: &mut W, value: &Value) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

pub fn write_line<W: Write>(out: &mut W, item: Annotated<Value>) -> anyhow::Result<()> {
    write_value(out, &to_json(item)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use annolane::{Chromosome, Locus, Prediction, Variant, VcfVariant};
    use flate2::read::GzDecoder;
    use std::{io::Read, path::PathBuf};

    fn variant() -> Variant {
        VcfVariant::new(
            Chromosome::Numbered(12),
            25_245_350,
            Some("rs121913529".to_owned()),
            "C".to_owned(),
            vec!["A".to_owned()],
        )
        .into()
    }

    #[test]
    fn pass_through_returns_the_prediction_body() {
        let mut record = PairedRecord::unpaired(variant());
        assert!(PassThrough.resolve(&record).is_err());

        let body = json!({ "most_severe_consequence": "missense_variant" });
        record
            .attach(Prediction::new(
                Locus::new(Chromosome::Numbered(12), 25_245_350, 25_245_350),
                None,
                body.clone(),
            ))
            .unwrap();
        assert_eq!(PassThrough.resolve(&record).unwrap(), body);
    }

    #[test]
    fn lines_carry_annotation_or_error() {
        let mut out = Vec::new();
        write_line(
            &mut out,
            Annotated {
                position: 0,
                variant: variant(),
                outcome: Ok(json!({ "gene": "KRAS" })),
            },
        )
        .unwrap();
        write_line(
            &mut out,
            Annotated {
                position: 1,
                variant: variant(),
                outcome: Err(ResolveError::Predictor("timed out".to_owned())),
            },
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["position"], 0);
        assert_eq!(lines[0]["kind"], "vcf");
        assert_eq!(lines[0]["locus"], "chr12:25245350-25245350");
        assert_eq!(lines[0]["annotation"]["gene"], "KRAS");
        assert_eq!(lines[1]["error"], "Predictor failed: timed out");
        assert!(lines[1].get("annotation").is_none());
    }

    fn inputs() -> FileInputs {
        FileInputs {
            vcf: PathBuf::from("/data/sample.vcf.gz"),
            vep_json: Some(PathBuf::from("/data/sample.vep.json")),
            cnv: None,
        }
    }

    #[test]
    fn metadata_describes_the_run() {
        let line = metadata(&inputs(), &AnnotatorConfig::new(8).with_start_position(120));
        let metadata = &line["metadata"];
        assert_eq!(metadata["tool"], "annolane-cli");
        assert_eq!(metadata["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(metadata["inputs"]["vcf"], "/data/sample.vcf.gz");
        assert_eq!(metadata["inputs"]["vep_json"], "/data/sample.vep.json");
        assert!(metadata["inputs"]["cnv"].is_null());
        assert_eq!(metadata["workers"], 8);
        assert_eq!(metadata["start_position"], 120);
    }

    #[test]
    fn gz_output_is_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl.gz");

        let mut sink = Sink::create(Some(path.as_path())).unwrap();
        assert!(matches!(sink, Sink::Gzip(_)));
        write_value(&mut sink, &metadata(&inputs(), &AnnotatorConfig::new(2))).unwrap();
        write_line(
            &mut sink,
            Annotated {
                position: 0,
                variant: variant(),
                outcome: Ok(json!({ "gene": "KRAS" })),
            },
        )
        .unwrap();
        sink.finish().unwrap();

        let mut text = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].get("metadata").is_some());
        assert_eq!(lines[1]["annotation"]["gene"], "KRAS");
    }

    #[test]
    fn plain_output_is_written_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut sink = Sink::create(Some(path.as_path())).unwrap();
        assert!(matches!(sink, Sink::Plain(_)));
        write_value(&mut sink, &json!({ "metadata": {} })).unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"metadata\":{}}\n");
    }
}
