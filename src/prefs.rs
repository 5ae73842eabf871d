//! Field selection for the streaming reader
//!
//! A `Prefs` value declares, up front, which annotation layers the reader
//! must populate. The reader consults it once per element and skips the
//! extraction work for everything else. Configure it fully before handing
//! it to a reader; readers never see later mutation.

use crate::model::DependencyForm;

/// Which fields to populate during decoding.
///
/// All switches are plain booleans; there are no invalid states. The
/// default requests everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefs {
    pub word: bool,
    pub lemma: bool,
    pub pos: bool,
    pub ner: bool,
    pub offsets: bool,
    pub parse: bool,
    pub coref: bool,
    pub headline: bool,
    pub dateline: bool,
    /// One switch per dependency form, indexed by `DependencyForm::index`.
    pub deps: [bool; 3],
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs::all(true)
    }
}

impl Prefs {
    /// Bulk setter: every switch on or off.
    pub fn all(on: bool) -> Self {
        Prefs {
            word: on,
            lemma: on,
            pos: on,
            ner: on,
            offsets: on,
            parse: on,
            coref: on,
            headline: on,
            dateline: on,
            deps: [on; 3],
        }
    }

    pub fn none() -> Self {
        Prefs::all(false)
    }

    /// Preset for CONLL-X dependency export of a single form: word, POS,
    /// and that form's edges; everything else off.
    pub fn conll(form: DependencyForm) -> Self {
        let mut prefs = Prefs::none();
        prefs.word = true;
        prefs.pos = true;
        prefs.deps[form.index()] = true;
        prefs
    }

    pub fn set_deps(&mut self, form: DependencyForm, on: bool) {
        self.deps[form.index()] = on;
    }

    pub fn deps(&self, form: DependencyForm) -> bool {
        self.deps[form.index()]
    }

    /// True if any per-token field is requested. When false the reader
    /// still indexes tokens but extracts nothing from them.
    pub fn any_token_field(&self) -> bool {
        self.word || self.lemma || self.pos || self.ner || self.offsets
    }
}
