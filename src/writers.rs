//! Format encoders
//!
//! Stateless functions mapping model entities to output text: token lines,
//! CONLL-X dependency tables, MUC-style coreference SGML, TREC document
//! records, and verbatim phrase-structure blocks. Nothing here mutates the
//! model; normalization of absent-vs-blank fields happens only at this
//! boundary.

use crate::model::{DependencyForm, Document, Sentence};
use std::io::{self, Write};

/// Space-joined surface forms, one line per sentence.
pub fn write_words<W: Write>(sent: &Sentence, w: &mut W) -> io::Result<()> {
    write_joined(sent, w, |i| sent.tokens[i].word.as_str())
}

/// Space-joined lemmas, one line per sentence.
pub fn write_lemmas<W: Write>(sent: &Sentence, w: &mut W) -> io::Result<()> {
    write_joined(sent, w, |i| sent.tokens[i].lemma.as_str())
}

/// `word/POS` pairs, space-joined, one line per sentence.
pub fn write_pos_tags<W: Write>(sent: &Sentence, w: &mut W) -> io::Result<()> {
    write_tags(sent, w, false, true, false)
}

/// `word/NER` pairs, space-joined, one line per sentence.
pub fn write_ner_tags<W: Write>(sent: &Sentence, w: &mut W) -> io::Result<()> {
    write_tags(sent, w, false, false, true)
}

/// Slash-joined token annotations with selectable layers, in the fixed
/// order word/lemma/POS/NER.
pub fn write_tags<W: Write>(
    sent: &Sentence,
    w: &mut W,
    lemma: bool,
    pos: bool,
    ner: bool,
) -> io::Result<()> {
    for (i, tok) in sent.tokens.iter().enumerate() {
        if i > 0 {
            write!(w, " ")?;
        }
        write!(w, "{}", tok.word)?;
        if lemma {
            write!(w, "/{}", tok.lemma)?;
        }
        if pos {
            write!(w, "/{}", tok.pos)?;
        }
        if ner {
            write!(w, "/{}", tok.ner)?;
        }
    }
    writeln!(w)
}

fn write_joined<'a, W: Write, F>(sent: &'a Sentence, w: &mut W, field: F) -> io::Result<()>
where
    F: Fn(usize) -> &'a str,
{
    for i in 0..sent.tokens.len() {
        if i > 0 {
            write!(w, " ")?;
        }
        write!(w, "{}", field(i))?;
    }
    writeln!(w)
}

/// CONLL-X dependency table for one form: a row per token, blank line after
/// the sentence. Tokens outside the dependency graph carry `_` in both the
/// governor and relation columns; that sentinel is part of the format.
pub fn write_conll_deps<W: Write>(
    sent: &Sentence,
    form: DependencyForm,
    w: &mut W,
) -> io::Result<()> {
    let n = sent.tokens.len();
    let mut edges: Vec<Option<(usize, &str)>> = vec![None; n];
    for dep in sent.deps(form) {
        edges[dep.dep - 1] = Some((dep.gov, dep.rel.as_str()));
    }

    for (i, tok) in sent.tokens.iter().enumerate() {
        let word = underscore_if_empty(&tok.word);
        let lemma = underscore_if_empty(&tok.lemma);
        let pos = underscore_if_empty(&tok.pos);
        match edges[i] {
            Some((gov, rel)) => writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t_\t{}\t{}\t_\t_",
                tok.idx, word, lemma, pos, pos, gov, rel
            )?,
            None => writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t_\t_\t_\t_\t_",
                tok.idx, word, lemma, pos, pos
            )?,
        }
    }
    writeln!(w)
}

fn underscore_if_empty(s: &str) -> &str {
    if s.is_empty() { "_" } else { s }
}

/// Verbatim bracketed phrase-structure text, one sentence per block.
pub fn write_parse<W: Write>(sent: &Sentence, w: &mut W) -> io::Result<()> {
    writeln!(w, "{}", sent.parse)
}

/// MUC-style coreference SGML over the whole document: every mention span
/// is wrapped in a COREF tag carrying its chain id, the representative
/// mention flagged with `REP="true"`.
///
/// Nesting is deterministic: where spans overlap at a token, the span that
/// extends further opens first (ties broken by chain id), and closing tags
/// shut the innermost open span first.
pub fn write_muc_coref<W: Write>(doc: &Document, w: &mut W) -> io::Result<()> {
    for (si, sent) in doc.sents.iter().enumerate() {
        let n = sent.tokens.len();
        // (chain, start, end, rep) per boundary token.
        let mut opens: Vec<Vec<(usize, usize, usize, bool)>> = vec![Vec::new(); n + 1];
        let mut closes: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); n + 1];

        for (ci, chain) in doc.coref_chains.iter().enumerate() {
            for m in &chain.mentions {
                if m.sent != si || m.start == 0 || m.start > n || m.end <= m.start {
                    continue;
                }
                let end = m.end.min(n + 1);
                opens[m.start].push((ci, m.start, end, m.representative));
                closes[end - 1].push((ci, m.start, end));
            }
        }
        for slot in opens.iter_mut() {
            // Longer span first so outer tags open before inner ones.
            slot.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        }
        for slot in closes.iter_mut() {
            // Innermost (latest-opened) span closes first.
            slot.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        }

        for (i, tok) in sent.tokens.iter().enumerate() {
            let pos = i + 1;
            if i > 0 {
                write!(w, " ")?;
            }
            for &(ci, _, _, rep) in &opens[pos] {
                write!(w, "<COREF ID=\"{}\"{}>", ci, if rep { " REP=\"true\"" } else { "" })?;
            }
            write!(w, "{}", tok.word)?;
            for _ in &closes[pos] {
                write!(w, "</COREF>")?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Normalize an optional headline/dateline/type for output: absent, blank,
/// or the literal "null" all become the empty string.
pub fn presence(value: Option<&str>) -> &str {
    match value {
        None => "",
        Some(s) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("null") {
                ""
            } else {
                t
            }
        }
    }
}

/// Rewrite one surface token for TREC output: bracket tokens become literal
/// parentheses, escaped slashes become spaces. Idempotent.
fn trec_token(word: &str) -> String {
    if word.eq_ignore_ascii_case("-LRB-") {
        "(".to_string()
    } else if word.eq_ignore_ascii_case("-RRB-") {
        ")".to_string()
    } else {
        word.replace("\\/", " ")
    }
}

/// Build the TREC record for one document.
pub fn trec_record(doc: &Document) -> String {
    let title = presence(doc.headline.as_deref());
    let date = presence(doc.dateline.as_deref());
    let doc_type = presence(doc.doc_type.as_deref());

    let mut text = String::new();
    for sent in &doc.sents {
        for tok in &sent.tokens {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&trec_token(&tok.word));
        }
    }

    format!(
        "<DOC>\n<DOCNO>{}</DOCNO>\n<TITLE>{}</TITLE>\n<DATE>{}</DATE>\n<TYPE>{}</TYPE>\n<TEXT>\n{}\n</TEXT>\n</DOC>\n\n",
        doc.id, title, date, doc_type, text
    )
}

/// Write one TREC record. The record is built whole before any byte is
/// written, so a failed write never leaves a partial record boundary
/// inside this call's output.
pub fn write_trec<W: Write>(doc: &Document, w: &mut W) -> io::Result<()> {
    w.write_all(trec_record(doc).as_bytes())
}
