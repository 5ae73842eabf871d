//! Streaming corpus reader
//!
//! A single-pass, pull-based decoder over the Annotated Gigaword XML
//! hierarchy (FILE -> DOC -> sentences -> tokens, plus per-sentence
//! dependency sections and per-document coreference sections). The decoder
//! advances exactly as far as needed to produce the next requested entity;
//! elements whose fields are disabled by `Prefs` are skipped wholesale with
//! `read_to_end_into`, so multi-gigabyte inputs stream in constant memory.
//!
//! `SentenceReader` and `DocumentReader` wrap the decoder as iterators over
//! completed sentences and documents. Both are forward-only and not
//! restartable; open a fresh reader to re-read a file.

use crate::model::{CorefChain, Dep, DependencyForm, Document, Mention, Sentence, Token};
use crate::prefs::Prefs;
use atoi::atoi;
use flate2::read::MultiGzDecoder;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

/// Error during corpus decoding. Fatal for the current file; entities
/// already yielded remain valid.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("bad attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("unexpected end of stream {0}")]
    Truncated(&'static str),

    #[error("malformed annotation: {0}")]
    Malformed(String),
}

impl From<quick_xml::escape::EscapeError> for DecodeError {
    fn from(e: quick_xml::escape::EscapeError) -> Self {
        DecodeError::Xml(quick_xml::Error::from(e))
    }
}

/// Document-level fields gathered while streaming a DOC element.
#[derive(Debug, Default)]
struct DocHeader {
    id: String,
    doc_type: Option<String>,
    headline: Option<String>,
    dateline: Option<String>,
    chains: Vec<CorefChain>,
}

/// One step of decoder progress.
enum DecodeStep {
    /// A sentence closed; yielded in textual order within its document.
    Sentence(Sentence),
    /// The enclosing DOC closed; carries everything but the sentences.
    DocumentEnd(DocHeader),
    Eof,
}

/// The streaming decoder underlying both iterators.
pub struct CorpusReader<R: BufRead> {
    xml: Reader<R>,
    prefs: Prefs,
    file_id: String,
    num_docs: usize,
    num_sents: usize,
    doc: Option<DocHeader>,
    sents_in_doc: usize,
    finished: bool,
}

impl CorpusReader<Box<dyn BufRead>> {
    /// Open a corpus file, transparently decompressing `.gz` inputs.
    pub fn from_file(path: &Path, prefs: Prefs) -> Result<Self, DecodeError> {
        let file = File::open(path)?;
        let is_gz = path.extension().is_some_and(|e| e == "gz");
        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::with_capacity(
                1 << 20,
                MultiGzDecoder::new(file),
            ))
        } else {
            Box::new(BufReader::new(file))
        };
        Self::from_reader(reader, prefs)
    }
}

impl CorpusReader<Cursor<String>> {
    /// Create a reader over in-memory XML, mainly for tests.
    pub fn from_str(text: &str, prefs: Prefs) -> Result<Self, DecodeError> {
        Self::from_reader(Cursor::new(text.to_string()), prefs)
    }
}

impl<R: BufRead> CorpusReader<R> {
    /// Wrap an already-open byte stream. Consumes the stream up to the
    /// opening FILE element so `file_id` is available immediately.
    pub fn from_reader(reader: R, prefs: Prefs) -> Result<Self, DecodeError> {
        let mut xml = Reader::from_reader(reader);
        xml.config_mut().trim_text(true);

        let mut this = CorpusReader {
            xml,
            prefs,
            file_id: String::new(),
            num_docs: 0,
            num_sents: 0,
            doc: None,
            sents_in_doc: 0,
            finished: false,
        };
        this.read_file_open()?;
        Ok(this)
    }

    /// The id attribute of the corpus FILE element.
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Documents successfully yielded so far.
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Sentences successfully yielded so far, cumulative across documents.
    pub fn num_sents(&self) -> usize {
        self.num_sents
    }

    fn read_file_open(&mut self) -> Result<(), DecodeError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if e.name().as_ref() != b"FILE" {
                        return Err(DecodeError::Malformed(format!(
                            "expected FILE root element, found {}",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    self.file_id = attr_value(&e, b"id")?.unwrap_or_default();
                    return Ok(());
                }
                Event::Eof => return Err(DecodeError::Truncated("before corpus root")),
                _ => {}
            }
        }
    }

    /// Advance to the next completed sentence or document boundary.
    fn next_step(&mut self) -> Result<DecodeStep, DecodeError> {
        if self.finished {
            return Ok(DecodeStep::Eof);
        }
        match self.next_step_inner() {
            Ok(step) => {
                if matches!(step, DecodeStep::Eof) {
                    self.finished = true;
                }
                Ok(step)
            }
            Err(e) => {
                // A decode error is fatal for this file.
                self.finished = true;
                Err(e)
            }
        }
    }

    fn next_step_inner(&mut self) -> Result<DecodeStep, DecodeError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"DOC" => {
                        self.doc = Some(DocHeader {
                            id: attr_value(&e, b"id")?.unwrap_or_default(),
                            doc_type: attr_value(&e, b"type")?,
                            ..DocHeader::default()
                        });
                        self.sents_in_doc = 0;
                    }
                    b"HEADLINE" => {
                        let text = self.read_gated_text(&e, self.prefs.headline)?;
                        if let Some(doc) = self.doc.as_mut() {
                            doc.headline = text;
                        }
                    }
                    b"DATELINE" => {
                        let text = self.read_gated_text(&e, self.prefs.dateline)?;
                        if let Some(doc) = self.doc.as_mut() {
                            doc.dateline = text;
                        }
                    }
                    b"sentences" => {} // container, descend
                    b"sentence" => {
                        let idx = self.sents_in_doc;
                        let sent = self.read_sentence(idx)?;
                        self.sents_in_doc += 1;
                        self.num_sents += 1;
                        return Ok(DecodeStep::Sentence(sent));
                    }
                    b"coreferences" => {
                        if self.prefs.coref && self.doc.is_some() {
                            let chains = self.read_coreferences()?;
                            if let Some(doc) = self.doc.as_mut() {
                                doc.chains = chains;
                            }
                        } else {
                            skip_element(&mut self.xml, &e)?;
                        }
                    }
                    // Unknown elements are skipped whole; the schema is
                    // fixed but inputs carry sections we never consume.
                    _ => skip_element(&mut self.xml, &e)?,
                },
                Event::End(e) => {
                    if e.name().as_ref() == b"DOC" {
                        let doc = self.doc.take().ok_or_else(|| {
                            DecodeError::Malformed("DOC close without open".to_string())
                        })?;
                        self.num_docs += 1;
                        return Ok(DecodeStep::DocumentEnd(doc));
                    }
                }
                Event::Eof => {
                    if self.doc.is_some() {
                        return Err(DecodeError::Truncated("inside document"));
                    }
                    return Ok(DecodeStep::Eof);
                }
                _ => {}
            }
        }
    }

    /// Read a leaf element's text if `wanted`, otherwise skip past it.
    /// Disabled fields cost a subtree skip, never text assembly.
    fn read_gated_text(
        &mut self,
        start: &BytesStart,
        wanted: bool,
    ) -> Result<Option<String>, DecodeError> {
        if wanted {
            Ok(Some(read_leaf_text(&mut self.xml)?))
        } else {
            skip_element(&mut self.xml, start)?;
            Ok(None)
        }
    }

    fn read_sentence(&mut self, idx: usize) -> Result<Sentence, DecodeError> {
        let mut sent = Sentence::new(idx);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    match name.as_ref() {
                        b"tokens" => self.read_tokens(&mut sent)?,
                        b"parse" => {
                            if self.prefs.parse {
                                sent.parse = read_leaf_text(&mut self.xml)?.trim().to_string();
                            } else {
                                skip_element(&mut self.xml, &e)?;
                            }
                        }
                        tag => match DependencyForm::ALL
                            .iter()
                            .find(|f| f.xml_name().as_bytes() == tag)
                        {
                            Some(&form) if self.prefs.deps(form) => {
                                self.read_deps(form, &mut sent)?
                            }
                            _ => skip_element(&mut self.xml, &e)?,
                        },
                    }
                }
                Event::End(e) if e.name().as_ref() == b"sentence" => {
                    self.check_dep_indices(&sent)?;
                    return Ok(sent);
                }
                Event::End(_) => {}
                Event::Eof => return Err(DecodeError::Truncated("inside sentence")),
                _ => {}
            }
        }
    }

    fn read_tokens(&mut self, sent: &mut Sentence) -> Result<(), DecodeError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if e.name().as_ref() == b"token" {
                        // Indices are positional, 1-based, and assigned even
                        // when no token field is requested.
                        let idx = sent.tokens.len() + 1;
                        let token = self.read_token(idx)?;
                        sent.tokens.push(token);
                    } else {
                        skip_element(&mut self.xml, &e)?;
                    }
                }
                Event::End(e) if e.name().as_ref() == b"tokens" => return Ok(()),
                Event::End(_) => {}
                Event::Eof => return Err(DecodeError::Truncated("inside tokens")),
                _ => {}
            }
        }
    }

    fn read_token(&mut self, idx: usize) -> Result<Token, DecodeError> {
        let mut token = Token {
            idx,
            ..Token::default()
        };
        let mut begin: Option<usize> = None;
        let mut end: Option<usize> = None;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"word" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.word)? {
                            token.word = text;
                        }
                    }
                    b"lemma" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.lemma)? {
                            token.lemma = text;
                        }
                    }
                    b"POS" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.pos)? {
                            token.pos = text;
                        }
                    }
                    b"NER" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.ner)? {
                            token.ner = text;
                        }
                    }
                    b"CharacterOffsetBegin" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.offsets)? {
                            begin = Some(parse_index(&text)?);
                        }
                    }
                    b"CharacterOffsetEnd" => {
                        if let Some(text) = self.read_gated_text(&e, self.prefs.offsets)? {
                            end = Some(parse_index(&text)?);
                        }
                    }
                    _ => skip_element(&mut self.xml, &e)?,
                },
                Event::End(e) if e.name().as_ref() == b"token" => {
                    if let (Some(b), Some(e)) = (begin, end) {
                        token.offsets = Some((b, e));
                    }
                    return Ok(token);
                }
                Event::End(_) => {}
                Event::Eof => return Err(DecodeError::Truncated("inside token")),
                _ => {}
            }
        }
    }

    fn read_deps(&mut self, form: DependencyForm, sent: &mut Sentence) -> Result<(), DecodeError> {
        let mut buf = Vec::new();
        let mut rel = String::new();
        let mut gov: Option<usize> = None;
        let mut dep: Option<usize> = None;
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"dep" => {
                        rel = attr_value(&e, b"type")?.unwrap_or_default();
                        gov = None;
                        dep = None;
                    }
                    b"governor" => {
                        let text = read_leaf_text(&mut self.xml)?;
                        gov = Some(parse_index(&text)?);
                    }
                    b"dependent" => {
                        let text = read_leaf_text(&mut self.xml)?;
                        dep = Some(parse_index(&text)?);
                    }
                    _ => skip_element(&mut self.xml, &e)?,
                },
                Event::End(e) => match e.name().as_ref() {
                    b"dep" => {
                        let (gov, dep) = match (gov.take(), dep.take()) {
                            (Some(g), Some(d)) => (g, d),
                            _ => {
                                return Err(DecodeError::Malformed(format!(
                                    "dep in {} missing governor or dependent",
                                    form.xml_name()
                                )));
                            }
                        };
                        sent.push_dep(
                            form,
                            Dep {
                                gov,
                                dep,
                                rel: std::mem::take(&mut rel),
                            },
                        );
                    }
                    tag if tag == form.xml_name().as_bytes() => return Ok(()),
                    _ => {}
                },
                Event::Eof => return Err(DecodeError::Truncated("inside dependencies")),
                _ => {}
            }
        }
    }

    fn read_coreferences(&mut self) -> Result<Vec<CorefChain>, DecodeError> {
        let mut chains = Vec::new();
        let mut chain = CorefChain::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"coreference" => chain = CorefChain::default(),
                    b"mention" => {
                        let representative =
                            attr_value(&e, b"representative")?.as_deref() == Some("true");
                        let mention = self.read_mention(representative)?;
                        chain.mentions.push(mention);
                    }
                    _ => skip_element(&mut self.xml, &e)?,
                },
                Event::End(e) => match e.name().as_ref() {
                    b"coreference" => chains.push(std::mem::take(&mut chain)),
                    b"coreferences" => return Ok(chains),
                    _ => {}
                },
                Event::Eof => return Err(DecodeError::Truncated("inside coreferences")),
                _ => {}
            }
        }
    }

    fn read_mention(&mut self, representative: bool) -> Result<Mention, DecodeError> {
        let mut sent: Option<usize> = None;
        let mut start: Option<usize> = None;
        let mut end: Option<usize> = None;
        let mut head: Option<usize> = None;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.xml.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let slot = match e.name().as_ref() {
                        b"sentence" => &mut sent,
                        b"start" => &mut start,
                        b"end" => &mut end,
                        b"head" => &mut head,
                        _ => {
                            skip_element(&mut self.xml, &e)?;
                            continue;
                        }
                    };
                    let text = read_leaf_text(&mut self.xml)?;
                    *slot = Some(parse_index(&text)?);
                }
                Event::End(e) if e.name().as_ref() == b"mention" => {
                    let (sent, start, end) = match (sent, start, end) {
                        (Some(s), Some(a), Some(b)) if s >= 1 => (s, a, b),
                        _ => {
                            return Err(DecodeError::Malformed(
                                "mention missing sentence/start/end".to_string(),
                            ));
                        }
                    };
                    return Ok(Mention {
                        // 1-based sentence id in the markup, 0-based in the model.
                        sent: sent - 1,
                        start,
                        end,
                        head: head.unwrap_or(start),
                        representative,
                    });
                }
                Event::End(_) => {}
                Event::Eof => return Err(DecodeError::Truncated("inside mention")),
                _ => {}
            }
        }
    }

    /// Guarantee the collaborator contract: every edge index is a valid
    /// token index for this sentence.
    fn check_dep_indices(&self, sent: &Sentence) -> Result<(), DecodeError> {
        let n = sent.tokens.len();
        for form in DependencyForm::ALL {
            for d in sent.deps(form) {
                if d.dep == 0 || d.dep > n || d.gov > n {
                    return Err(DecodeError::Malformed(format!(
                        "dependency ({}, {}) out of range for {}-token sentence",
                        d.gov, d.dep, n
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Skip an element and its entire subtree.
fn skip_element<R: BufRead>(xml: &mut Reader<R>, start: &BytesStart) -> Result<(), DecodeError> {
    let end = start.to_end().into_owned();
    let mut buf = Vec::new();
    xml.read_to_end_into(end.name(), &mut buf)?;
    Ok(())
}

/// Collect the text content of an element, unescaped, ignoring any nested
/// markup boundaries.
fn read_leaf_text<R: BufRead>(xml: &mut Reader<R>) -> Result<String, DecodeError> {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf)? {
            Event::Text(t) => out.push_str(&t.unescape()?),
            Event::CData(t) => out.push_str(&String::from_utf8_lossy(&t)),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(out);
                }
                depth -= 1;
            }
            Event::Eof => return Err(DecodeError::Truncated("inside element text")),
            _ => {}
        }
    }
}

/// Look up one attribute by name, unescaped.
fn attr_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>, DecodeError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parse a non-negative decimal index from element text.
fn parse_index(text: &str) -> Result<usize, DecodeError> {
    atoi::<usize>(text.trim().as_bytes())
        .ok_or_else(|| DecodeError::Malformed(format!("expected integer, found {:?}", text)))
}

/// Iterator over sentences, flattening document boundaries.
pub struct SentenceReader<R: BufRead> {
    inner: CorpusReader<R>,
}

impl SentenceReader<Box<dyn BufRead>> {
    pub fn from_file(path: &Path, prefs: Prefs) -> Result<Self, DecodeError> {
        Ok(SentenceReader {
            inner: CorpusReader::from_file(path, prefs)?,
        })
    }
}

impl SentenceReader<Cursor<String>> {
    pub fn from_str(text: &str, prefs: Prefs) -> Result<Self, DecodeError> {
        Ok(SentenceReader {
            inner: CorpusReader::from_str(text, prefs)?,
        })
    }
}

impl<R: BufRead> SentenceReader<R> {
    pub fn file_id(&self) -> &str {
        self.inner.file_id()
    }

    pub fn num_docs(&self) -> usize {
        self.inner.num_docs()
    }

    pub fn num_sents(&self) -> usize {
        self.inner.num_sents()
    }
}

impl<R: BufRead> Iterator for SentenceReader<R> {
    type Item = Result<Sentence, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next_step() {
                Ok(DecodeStep::Sentence(sent)) => return Some(Ok(sent)),
                Ok(DecodeStep::DocumentEnd(_)) => continue,
                Ok(DecodeStep::Eof) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Iterator over whole documents, each with its sentences and chains.
pub struct DocumentReader<R: BufRead> {
    inner: CorpusReader<R>,
    pending: Vec<Sentence>,
}

impl DocumentReader<Box<dyn BufRead>> {
    pub fn from_file(path: &Path, prefs: Prefs) -> Result<Self, DecodeError> {
        Ok(DocumentReader {
            inner: CorpusReader::from_file(path, prefs)?,
            pending: Vec::new(),
        })
    }
}

impl DocumentReader<Cursor<String>> {
    pub fn from_str(text: &str, prefs: Prefs) -> Result<Self, DecodeError> {
        Ok(DocumentReader {
            inner: CorpusReader::from_str(text, prefs)?,
            pending: Vec::new(),
        })
    }
}

impl<R: BufRead> DocumentReader<R> {
    pub fn file_id(&self) -> &str {
        self.inner.file_id()
    }

    pub fn num_docs(&self) -> usize {
        self.inner.num_docs()
    }

    pub fn num_sents(&self) -> usize {
        self.inner.num_sents()
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = Result<Document, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next_step() {
                Ok(DecodeStep::Sentence(sent)) => self.pending.push(sent),
                Ok(DecodeStep::DocumentEnd(header)) => {
                    return Some(Ok(Document {
                        id: header.id,
                        doc_type: header.doc_type,
                        headline: header.headline,
                        dateline: header.dateline,
                        sents: std::mem::take(&mut self.pending),
                        coref_chains: header.chains,
                    }));
                }
                Ok(DecodeStep::Eof) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    pub(crate) const SAMPLE: &str = r#"<FILE id="afp_eng_199405">
<DOC id="AFP_ENG_19940512.0005" type="story">
<HEADLINE>Dog barks at night</HEADLINE>
<DATELINE>PARIS, May 12</DATELINE>
<sentences>
<sentence id="1">
<tokens>
<token id="1">
<word>The</word><lemma>the</lemma>
<CharacterOffsetBegin>0</CharacterOffsetBegin>
<CharacterOffsetEnd>3</CharacterOffsetEnd>
<POS>DT</POS><NER>O</NER>
</token>
<token id="2">
<word>dog</word><lemma>dog</lemma>
<CharacterOffsetBegin>4</CharacterOffsetBegin>
<CharacterOffsetEnd>7</CharacterOffsetEnd>
<POS>NN</POS><NER>O</NER>
</token>
<token id="3">
<word>barks</word><lemma>bark</lemma>
<CharacterOffsetBegin>8</CharacterOffsetBegin>
<CharacterOffsetEnd>13</CharacterOffsetEnd>
<POS>VBZ</POS><NER>O</NER>
</token>
</tokens>
<parse>(ROOT (S (NP (DT The) (NN dog)) (VP (VBZ barks))))</parse>
<basic-dependencies>
<dep type="root"><governor>0</governor><dependent>3</dependent></dep>
<dep type="nsubj"><governor>3</governor><dependent>2</dependent></dep>
<dep type="det"><governor>2</governor><dependent>1</dependent></dep>
</basic-dependencies>
<collapsed-dependencies>
<dep type="root"><governor>0</governor><dependent>3</dependent></dep>
<dep type="nsubj"><governor>3</governor><dependent>2</dependent></dep>
</collapsed-dependencies>
<collapsed-ccprocessed-dependencies>
<dep type="root"><governor>0</governor><dependent>3</dependent></dep>
</collapsed-ccprocessed-dependencies>
</sentence>
<sentence id="2">
<tokens>
<token id="1"><word>It</word><lemma>it</lemma><POS>PRP</POS><NER>O</NER></token>
<token id="2"><word>sleeps</word><lemma>sleep</lemma><POS>VBZ</POS><NER>O</NER></token>
</tokens>
<parse>(ROOT (S (NP (PRP It)) (VP (VBZ sleeps))))</parse>
<basic-dependencies>
<dep type="root"><governor>0</governor><dependent>2</dependent></dep>
<dep type="nsubj"><governor>2</governor><dependent>1</dependent></dep>
</basic-dependencies>
</sentence>
</sentences>
<coreferences>
<coreference>
<mention representative="true"><sentence>1</sentence><start>1</start><end>3</end><head>2</head></mention>
<mention><sentence>2</sentence><start>1</start><end>2</end><head>1</head></mention>
</coreference>
</coreferences>
</DOC>
<DOC id="AFP_ENG_19940512.0010" type="multi">
<sentences>
<sentence id="1">
<tokens>
<token id="1"><word>Hello</word><lemma>hello</lemma><POS>UH</POS><NER>O</NER></token>
</tokens>
<parse>(ROOT (INTJ (UH Hello)))</parse>
<basic-dependencies>
<dep type="root"><governor>0</governor><dependent>1</dependent></dep>
</basic-dependencies>
</sentence>
</sentences>
</DOC>
</FILE>
"#;

    #[test]
    fn test_full_decode() {
        let docs: Vec<_> = DocumentReader::from_str(SAMPLE, Prefs::all(true))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(docs.len(), 2);
        let doc = &docs[0];
        assert_eq!(doc.id, "AFP_ENG_19940512.0005");
        assert_eq!(doc.doc_type.as_deref(), Some("story"));
        assert_eq!(doc.headline.as_deref(), Some("Dog barks at night"));
        assert_eq!(doc.dateline.as_deref(), Some("PARIS, May 12"));
        assert_eq!(doc.sents.len(), 2);

        let sent = &doc.sents[0];
        assert_eq!(sent.idx, 0);
        assert_eq!(sent.tokens.len(), 3);
        assert_eq!(sent.tokens[0].word, "The");
        assert_eq!(sent.tokens[0].lemma, "the");
        assert_eq!(sent.tokens[0].pos, "DT");
        assert_eq!(sent.tokens[0].ner, "O");
        assert_eq!(sent.tokens[0].offsets, Some((0, 3)));
        assert_eq!(sent.tokens[2].idx, 3);
        assert!(sent.parse.starts_with("(ROOT"));

        assert_eq!(sent.deps(DependencyForm::Basic).len(), 3);
        assert_eq!(sent.deps(DependencyForm::Collapsed).len(), 2);
        assert_eq!(sent.deps(DependencyForm::CollapsedCcprocessed).len(), 1);
        let root = &sent.deps(DependencyForm::Basic)[0];
        assert_eq!((root.gov, root.dep, root.rel.as_str()), (0, 3, "root"));

        assert_eq!(doc.coref_chains.len(), 1);
        let chain = &doc.coref_chains[0];
        assert_eq!(chain.mentions.len(), 2);
        let rep = chain.representative().unwrap();
        assert_eq!((rep.sent, rep.start, rep.end), (0, 1, 3));

        // Second document has no headline or coref section.
        assert_eq!(docs[1].headline, None);
        assert!(docs[1].coref_chains.is_empty());
    }

    #[test]
    fn test_disabled_fields_stay_unset() {
        let mut prefs = Prefs::none();
        prefs.word = true;

        let sents: Vec<_> = SentenceReader::from_str(SAMPLE, prefs)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(sents.len(), 3);
        for sent in &sents {
            for tok in &sent.tokens {
                assert!(!tok.word.is_empty());
                assert!(tok.lemma.is_empty());
                assert!(tok.pos.is_empty());
                assert!(tok.ner.is_empty());
                assert_eq!(tok.offsets, None);
            }
            assert!(sent.parse.is_empty());
            for form in DependencyForm::ALL {
                assert!(sent.deps(form).is_empty());
            }
        }
    }

    #[test]
    fn test_enabled_fields_match_reference_decode() {
        // A partial decode must agree, field for field, with a full decode
        // of the same input on every field it enables.
        let full: Vec<_> = SentenceReader::from_str(SAMPLE, Prefs::all(true))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let mut prefs = Prefs::none();
        prefs.lemma = true;
        prefs.pos = true;
        prefs.set_deps(DependencyForm::Collapsed, true);
        let partial: Vec<_> = SentenceReader::from_str(SAMPLE, prefs)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(full.len(), partial.len());
        for (f, p) in full.iter().zip(&partial) {
            for (ft, pt) in f.tokens.iter().zip(&p.tokens) {
                assert_eq!(ft.lemma, pt.lemma);
                assert_eq!(ft.pos, pt.pos);
                assert!(pt.word.is_empty());
            }
            assert_eq!(
                f.deps(DependencyForm::Collapsed),
                p.deps(DependencyForm::Collapsed)
            );
            assert!(p.deps(DependencyForm::Basic).is_empty());
        }
    }

    #[test]
    fn test_token_indices_without_token_fields() {
        // Even with nothing requested, tokens are still indexed 1..n.
        let sents: Vec<_> = SentenceReader::from_str(SAMPLE, Prefs::none())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(sents[0].tokens.len(), 3);
        let indices: Vec<_> = sents[0].tokens.iter().map(|t| t.idx).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_counts_agree_across_prefs() {
        let mut full = SentenceReader::from_str(SAMPLE, Prefs::all(true)).unwrap();
        let mut minimal = SentenceReader::from_str(SAMPLE, Prefs::none()).unwrap();
        let full_count = full.by_ref().count();
        let min_count = minimal.by_ref().count();

        assert_eq!(full_count, min_count);
        assert_eq!(full.num_sents(), minimal.num_sents());
        assert_eq!(full.num_docs(), minimal.num_docs());
        assert_eq!(full.num_docs(), 2);
        assert_eq!(full.num_sents(), 3);
    }

    #[test]
    fn test_file_id_available_before_iteration() {
        let reader = SentenceReader::from_str(SAMPLE, Prefs::none()).unwrap();
        assert_eq!(reader.file_id(), "afp_eng_199405");
    }

    #[test]
    fn test_document_reader_counts() {
        let mut reader = DocumentReader::from_str(SAMPLE, Prefs::all(true)).unwrap();
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.num_docs(), 2);
        assert_eq!(reader.num_sents(), 3);
    }

    #[test]
    fn test_truncated_input_is_fatal() {
        // Cut the sample off in the middle of the first sentence.
        let cut = &SAMPLE[..SAMPLE.find("<parse>").unwrap()];
        let results: Vec<_> = SentenceReader::from_str(cut, Prefs::all(true))
            .unwrap()
            .collect();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_dep_index_out_of_range() {
        let bad = r#"<FILE id="x"><DOC id="d"><sentences><sentence id="1">
<tokens><token id="1"><word>hi</word></token></tokens>
<basic-dependencies>
<dep type="root"><governor>0</governor><dependent>9</dependent></dep>
</basic-dependencies>
</sentence></sentences></DOC></FILE>"#;

        let results: Vec<_> = SentenceReader::from_str(bad, Prefs::all(true))
            .unwrap()
            .collect();
        assert!(matches!(results[0], Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_non_corpus_root_rejected() {
        let err = SentenceReader::from_str("<html><body/></html>", Prefs::none());
        assert!(matches!(err, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_gzip_round_trip_matches_plain() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("corpus.xml");
        std::fs::write(&plain, SAMPLE).unwrap();

        let gz = dir.path().join("corpus.xml.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::fast());
        enc.write_all(SAMPLE.as_bytes()).unwrap();
        enc.finish().unwrap();

        let plain_count = SentenceReader::from_file(&plain, Prefs::all(true))
            .unwrap()
            .count();
        let gz_count = SentenceReader::from_file(&gz, Prefs::all(true))
            .unwrap()
            .count();

        assert_eq!(plain_count, 3);
        assert_eq!(plain_count, gz_count);
    }
}
