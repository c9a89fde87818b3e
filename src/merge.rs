//! Configuration merging
//!
//! Documents are applied in the order given. Each top-level key of a later
//! document replaces the earlier value wholesale; nested mappings are not
//! merged recursively.

use crate::document::ConfigDocument;

pub fn merge_documents(documents: &[ConfigDocument]) -> ConfigDocument {
    let mut merged = ConfigDocument::new();
    for (position, doc) in documents.iter().enumerate() {
        for (key, value) in doc {
            if merged.insert(key.clone(), value.clone()).is_some() {
                tracing::debug!("Key '{}' overridden by document #{}", key, position + 1);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Value;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn later_document_wins() {
        let merged = merge_documents(&[doc(json!({"a": 1})), doc(json!({"a": 2}))]);
        assert_eq!(Value::Object(merged), json!({"a": 2}));

        let merged = merge_documents(&[doc(json!({"a": 2})), doc(json!({"a": 1}))]);
        assert_eq!(Value::Object(merged), json!({"a": 1}));
    }

    #[test]
    fn disjoint_keys_are_unioned() {
        let merged = merge_documents(&[doc(json!({"a": 1})), doc(json!({"b": 2}))]);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert!(merge_documents(&[]).is_empty());
    }

    #[test]
    fn nested_values_are_replaced_not_merged() {
        let merged = merge_documents(&[
            doc(json!({"db": {"host": "a", "port": 5432}})),
            doc(json!({"db": {"host": "b"}})),
        ]);
        assert_eq!(Value::Object(merged), json!({"db": {"host": "b"}}));
    }

    #[test]
    fn first_occurrence_keeps_its_position() {
        let merged = merge_documents(&[
            doc(json!({"a": 1, "b": 1})),
            doc(json!({"c": 2, "a": 3})),
        ]);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let inputs = vec![doc(json!({"a": 1})), doc(json!({"a": 2}))];
        let before = inputs.clone();
        let _ = merge_documents(&inputs);
        assert_eq!(inputs, before);
    }
}
