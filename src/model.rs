//! Annotation data model
//!
//! Value types for tokens, dependency edges, sentences, coreference chains,
//! and documents. Entities are built incrementally by the reader and are
//! read-only once yielded; unrequested fields stay in their unset state
//! (empty string / empty vec) rather than being conflated with "truly empty".

/// The three alternative dependency annotations attached to each sentence.
///
/// These are independent edge sets in the source markup, not read-time
/// transformations of one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyForm {
    Basic,
    Collapsed,
    CollapsedCcprocessed,
}

impl DependencyForm {
    pub const ALL: [DependencyForm; 3] = [
        DependencyForm::Basic,
        DependencyForm::Collapsed,
        DependencyForm::CollapsedCcprocessed,
    ];

    /// Element name carrying this form's edges in the corpus markup.
    pub fn xml_name(self) -> &'static str {
        match self {
            DependencyForm::Basic => "basic-dependencies",
            DependencyForm::Collapsed => "collapsed-dependencies",
            DependencyForm::CollapsedCcprocessed => "collapsed-ccprocessed-dependencies",
        }
    }

    /// Position in per-form arrays (`Prefs::deps`, `Sentence::deps`).
    pub fn index(self) -> usize {
        match self {
            DependencyForm::Basic => 0,
            DependencyForm::Collapsed => 1,
            DependencyForm::CollapsedCcprocessed => 2,
        }
    }
}

/// One token of a sentence.
///
/// `idx` is 1-based and assigned in textual order, independent of which
/// fields were requested; dependency edges and coreference mentions refer
/// to tokens by this index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub idx: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
    pub ner: String,
    /// Character offsets (begin, end) into the original document text.
    pub offsets: Option<(usize, usize)>,
}

/// A labeled dependency edge. `gov` and `dep` are 1-based token indices;
/// `gov == 0` denotes the virtual root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dep {
    pub gov: usize,
    pub dep: usize,
    pub rel: String,
}

/// One sentence: tokens in textual order, per-form dependency edge sets,
/// and the verbatim bracketed phrase-structure string.
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    /// 0-based index within the enclosing document.
    pub idx: usize,
    pub tokens: Vec<Token>,
    deps: [Vec<Dep>; 3],
    /// Bracketed parse text, verbatim; empty when not requested.
    pub parse: String,
}

impl Sentence {
    pub fn new(idx: usize) -> Self {
        Sentence {
            idx,
            ..Sentence::default()
        }
    }

    /// Edge set for one dependency form. Empty when the form was not
    /// requested or the sentence has no edges for it.
    pub fn deps(&self, form: DependencyForm) -> &[Dep] {
        &self.deps[form.index()]
    }

    pub fn push_dep(&mut self, form: DependencyForm, dep: Dep) {
        self.deps[form.index()].push(dep);
    }
}

/// A coreferent mention span. `sent` is a 0-based index into the document's
/// sentences; `start` is a 1-based token index and `end` is exclusive, as in
/// the source markup. `head` is the 1-based head token of the span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub sent: usize,
    pub start: usize,
    pub end: usize,
    pub head: usize,
    pub representative: bool,
}

/// A document-scoped coreference chain: mentions in document order.
#[derive(Debug, Clone, Default)]
pub struct CorefChain {
    pub mentions: Vec<Mention>,
}

impl CorefChain {
    /// The representative mention: the first one flagged as such, or the
    /// first mention in document order if none is flagged.
    pub fn representative(&self) -> Option<&Mention> {
        self.mentions
            .iter()
            .find(|m| m.representative)
            .or_else(|| self.mentions.first())
    }
}

/// A complete document with its sentences and coreference chains.
///
/// `doc_type`, `headline`, and `dateline` are `None` when the markup omits
/// them; a present-but-blank value stays `Some` in the model and is only
/// normalized at the output boundary.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub id: String,
    pub doc_type: Option<String>,
    pub headline: Option<String>,
    pub dateline: Option<String>,
    pub sents: Vec<Sentence>,
    pub coref_chains: Vec<CorefChain>,
}
