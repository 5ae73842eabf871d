//! Command-line printer for Annotated Gigaword annotation layers.
//!
//! Each format maps to a `Prefs` preset plus an encoder; the reader only
//! does the parsing work the chosen format needs.

use agiga::writers;
use agiga::{DependencyForm, DocumentReader, Prefs, SentenceReader};
use clap::{Parser, ValueEnum};
use log::info;
use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    /// Words only, one sentence per line
    Words,
    /// Lemmas only, one sentence per line
    Lemmas,
    /// Part-of-speech tags
    Pos,
    /// Named entity types
    Ner,
    /// Basic dependency parses in CONLL-X format
    BasicDeps,
    /// Collapsed dependency parses in CONLL-X format
    ColDeps,
    /// Collapsed and propagated dependency parses in CONLL-X format
    ColCcprocDeps,
    /// Phrase structure parses
    PhraseStructure,
    /// Coreference resolution as SGML similar to MUC
    Coref,
    /// Headlines and datelines
    Headlines,
    /// TREC-format text without any annotation (batch: input dir, output dir)
    Trectext,
    /// **For use in testing this API only**
    ForTestingOnly,
}

#[derive(Parser)]
#[command(
    name = "agiga-print",
    about = "Print human-readable versions of Annotated Gigaword XML annotations"
)]
struct Args {
    #[arg(value_enum)]
    format: Format,
    /// A .xml or .xml.gz corpus file; for trectext, an input directory
    input: PathBuf,
    /// Output directory (trectext only)
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.format {
        Format::Words => {
            let mut prefs = Prefs::none();
            prefs.word = true;
            print_sentences(&args.input, prefs, &mut out, writers::write_words)?;
        }
        Format::Lemmas => {
            let mut prefs = Prefs::none();
            prefs.lemma = true;
            print_sentences(&args.input, prefs, &mut out, writers::write_lemmas)?;
        }
        Format::Pos => {
            let mut prefs = Prefs::none();
            prefs.word = true;
            prefs.pos = true;
            print_sentences(&args.input, prefs, &mut out, writers::write_pos_tags)?;
        }
        Format::Ner => {
            let mut prefs = Prefs::none();
            prefs.word = true;
            prefs.ner = true;
            print_sentences(&args.input, prefs, &mut out, writers::write_ner_tags)?;
        }
        Format::BasicDeps => print_deps(&args.input, DependencyForm::Basic, &mut out)?,
        Format::ColDeps => print_deps(&args.input, DependencyForm::Collapsed, &mut out)?,
        Format::ColCcprocDeps => {
            print_deps(&args.input, DependencyForm::CollapsedCcprocessed, &mut out)?
        }
        Format::PhraseStructure => {
            let mut prefs = Prefs::none();
            prefs.parse = true;
            print_sentences(&args.input, prefs, &mut out, writers::write_parse)?;
        }
        Format::Coref => print_coref(&args.input, &mut out)?,
        Format::Headlines => print_headlines(&args.input, &mut out)?,
        Format::Trectext => {
            let output = args
                .output
                .ok_or("trectext requires an output directory argument")?;
            let summary = agiga::batch::convert_trectext_dir(&args.input, &output)?;
            info!(
                "Converted {} files ({} failed), {} docs",
                summary.files - summary.failed,
                summary.failed,
                summary.docs
            );
        }
        Format::ForTestingOnly => print_for_testing_only(&args.input, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn print_sentences<W, F>(
    input: &Path,
    prefs: Prefs,
    out: &mut W,
    write: F,
) -> Result<(), Box<dyn Error>>
where
    W: Write,
    F: Fn(&agiga::Sentence, &mut W) -> io::Result<()>,
{
    let mut reader = SentenceReader::from_file(input, prefs)?;
    info!("Parsing XML for file: {}", reader.file_id());
    for sent in reader.by_ref() {
        write(&sent?, out)?;
    }
    info!("Number of docs: {}", reader.num_docs());
    info!("Number of sentences: {}", reader.num_sents());
    Ok(())
}

fn print_deps<W: Write>(
    input: &Path,
    form: DependencyForm,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    print_sentences(input, Prefs::conll(form), out, |sent, w| {
        writers::write_conll_deps(sent, form, w)
    })
}

fn print_coref<W: Write>(input: &Path, out: &mut W) -> Result<(), Box<dyn Error>> {
    let mut prefs = Prefs::none();
    prefs.word = true;
    prefs.coref = true;

    let mut reader = DocumentReader::from_file(input, prefs)?;
    info!("Parsing XML for file: {}", reader.file_id());
    for doc in reader.by_ref() {
        writers::write_muc_coref(&doc?, out)?;
    }
    info!("Number of docs: {}", reader.num_docs());
    Ok(())
}

fn print_headlines<W: Write>(input: &Path, out: &mut W) -> Result<(), Box<dyn Error>> {
    let mut prefs = Prefs::none();
    prefs.headline = true;
    prefs.dateline = true;

    let mut reader = DocumentReader::from_file(input, prefs)?;
    info!("Parsing XML for file: {}", reader.file_id());
    for doc in reader.by_ref() {
        let doc = doc?;
        if let Some(headline) = &doc.headline {
            writeln!(out, "HEADLINE: {}", headline)?;
        }
        if let Some(dateline) = &doc.dateline {
            writeln!(out, "DATELINE: {}", dateline)?;
        }
    }
    info!("Number of docs: {}", reader.num_docs());
    Ok(())
}

/// Exercise every annotation layer and encoder over a full-field decode.
fn print_for_testing_only<W: Write>(input: &Path, out: &mut W) -> Result<(), Box<dyn Error>> {
    let mut reader = DocumentReader::from_file(input, Prefs::all(true))?;
    info!("Parsing XML for file: {}", reader.file_id());
    for doc in reader.by_ref() {
        let doc = doc?;
        info!("Parsing doc: id={} type={:?}", doc.id, doc.doc_type);
        for sent in &doc.sents {
            writers::write_words(sent, out)?;
            writers::write_lemmas(sent, out)?;
            writers::write_pos_tags(sent, out)?;
            writers::write_ner_tags(sent, out)?;
            writers::write_tags(sent, out, true, true, true)?;
            for form in DependencyForm::ALL {
                writers::write_conll_deps(sent, form, out)?;
            }
            writers::write_parse(sent, out)?;
        }
        writers::write_muc_coref(&doc, out)?;
        writers::write_trec(&doc, out)?;
    }
    info!("Number of docs: {}", reader.num_docs());
    info!("Number of sentences: {}", reader.num_sents());
    Ok(())
}
