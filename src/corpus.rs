use std::{io::Read, path::Path};

use crate::error::Result;

/// Read a corpus of state texts from a tab-separated file
///
/// See [`from_reader`] for the format.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let texts = collect(reader)?;
    log::info!("loaded {} texts from {}", texts.len(), path.display());
    Ok(texts)
}

/// Read a corpus of state texts from tab-separated data
///
/// There is no header and records may differ in width. Every non-empty field, after trimming,
/// is one text; a typical record is a room name followed by its descriptions.
pub fn from_reader<R: Read>(rdr: R) -> Result<Vec<String>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(rdr);
    collect(reader)
}

fn collect<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record?;
        texts.extend(
            record
                .iter()
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(String::from),
        );
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, feature::Vocabulary};

    const DATA: &str = "Living\tThis room has a couch.\tYou see a TV.\n\
                        Kitchen\tThe fridge hums.\n\
                        \n\
                        Quest\t\tYou are hungry.\n";

    #[test]
    fn ragged_records_and_empty_fields() {
        let texts = from_reader(DATA.as_bytes()).unwrap();
        assert_eq!(
            texts,
            [
                "Living",
                "This room has a couch.",
                "You see a TV.",
                "Kitchen",
                "The fridge hums.",
                "Quest",
                "You are hungry.",
            ]
        );
    }

    #[test]
    fn corpus_builds_vocabulary() {
        let texts = from_reader(DATA.as_bytes()).unwrap();
        let vocab = Vocabulary::build(&texts).unwrap();
        assert!(vocab.index_of("fridge").is_some());
        assert!(vocab.index_of("living").is_some());
    }

    #[test]
    fn missing_file_is_corpus_error() {
        let result = load("does/not/exist.tsv");
        assert!(matches!(result, Err(Error::Corpus(_))));
    }
}
