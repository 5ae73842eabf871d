use agiga::{DocumentReader, Prefs, SentenceReader};
use divan::{Bencher, black_box};
use std::fmt::Write as _;

fn main() {
    divan::main();
}

/// Build a synthetic corpus: `docs` documents of `sents` ten-token
/// sentences each, with parse, all three dependency forms, and coref.
fn make_corpus(docs: usize, sents: usize) -> String {
    let mut xml = String::from("<FILE id=\"bench\">\n");
    for d in 0..docs {
        let _ = write!(xml, "<DOC id=\"DOC.{d}\" type=\"story\">\n<HEADLINE>Headline {d}</HEADLINE>\n<sentences>\n");
        for s in 0..sents {
            let _ = write!(xml, "<sentence id=\"{}\">\n<tokens>\n", s + 1);
            for t in 1..=10 {
                let _ = write!(
                    xml,
                    "<token id=\"{t}\"><word>w{t}</word><lemma>l{t}</lemma><POS>NN</POS><NER>O</NER></token>\n"
                );
            }
            xml.push_str("</tokens>\n<parse>(ROOT (NP (NN w1)))</parse>\n");
            for form in [
                "basic-dependencies",
                "collapsed-dependencies",
                "collapsed-ccprocessed-dependencies",
            ] {
                let _ = write!(xml, "<{form}>\n");
                let _ = write!(
                    xml,
                    "<dep type=\"root\"><governor>0</governor><dependent>1</dependent></dep>\n"
                );
                for t in 2..=10 {
                    let _ = write!(
                        xml,
                        "<dep type=\"dep\"><governor>1</governor><dependent>{t}</dependent></dep>\n"
                    );
                }
                let _ = write!(xml, "</{form}>\n");
            }
            xml.push_str("</sentence>\n");
        }
        xml.push_str("</sentences>\n<coreferences>\n<coreference>\n");
        xml.push_str("<mention representative=\"true\"><sentence>1</sentence><start>1</start><end>2</end><head>1</head></mention>\n");
        xml.push_str("</coreference>\n</coreferences>\n</DOC>\n");
    }
    xml.push_str("</FILE>\n");
    xml
}

#[divan::bench]
fn decode_all_fields(bencher: Bencher) {
    let corpus = make_corpus(20, 20);
    bencher.bench_local(|| {
        let reader = SentenceReader::from_str(black_box(&corpus), Prefs::all(true)).unwrap();
        for sent in reader {
            black_box(sent.unwrap());
        }
    });
}

#[divan::bench]
fn decode_words_only(bencher: Bencher) {
    let corpus = make_corpus(20, 20);
    let mut prefs = Prefs::none();
    prefs.word = true;
    bencher.bench_local(|| {
        let reader = SentenceReader::from_str(black_box(&corpus), prefs).unwrap();
        for sent in reader {
            black_box(sent.unwrap());
        }
    });
}

#[divan::bench]
fn decode_documents(bencher: Bencher) {
    let corpus = make_corpus(20, 20);
    bencher.bench_local(|| {
        let reader = DocumentReader::from_str(black_box(&corpus), Prefs::all(true)).unwrap();
        for doc in reader {
            black_box(doc.unwrap());
        }
    });
}
