//! Agiga: streaming reader for Annotated Gigaword corpora
//!
//! Decodes gzip-compressed, XML-annotated newswire in a single lazy pass
//! and re-emits selected annotation layers in downstream formats:
//! token/lemma/POS/NER lines, CONLL-X dependency tables, MUC-style
//! coreference SGML, TREC document records, and phrase-structure trees.
//! Field selection (`Prefs`) prunes parsing work so multi-gigabyte inputs
//! stream in constant memory.

pub mod batch; // Parallel directory-to-directory TREC conversion
pub mod model; // Annotation value types
pub mod prefs; // Field selection consulted by the reader
pub mod reader; // Streaming XML decoder and sentence/document iterators
pub mod writers; // Output format encoders

// Re-exports for convenience
pub use model::{CorefChain, Dep, DependencyForm, Document, Mention, Sentence, Token};
pub use prefs::Prefs;
pub use reader::{CorpusReader, DecodeError, DocumentReader, SentenceReader};
