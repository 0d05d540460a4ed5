//! An in-process map/reduce callback pair used by the end-to-end word
//! count demo and its tests: `map` splits a file's contents on whitespace
//! and emits one `(word, "1")` per occurrence; `reduce` sums them.

use mr_proto::KeyValue;

pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| KeyValue {
            key: w.to_string(),
            value: "1".to_string(),
        })
        .collect()
}

pub fn reduce(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}
