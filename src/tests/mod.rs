//! Document-level tests over the fixture files and small inline documents.


use std::fs;
use std::path::{Path, PathBuf};

use crate::snapshot::{DocumentSnapshot, SnapshotBuilder, SnapshotId};
use crate::{
    AnnotatedDocument, AnnotationError, DependencyKind, MentionId, MentionSource, ReaderConfig,
    ReferenceIdx,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Load a fixture file from the fixtures directory.
fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn annotated(config: ReaderConfig) -> AnnotatedDocument {
    AnnotatedDocument::from_xml(&load_fixture("obama-merkel.xml"), config)
        .expect("fixture should read")
}

fn disambiguated() -> AnnotatedDocument {
    AnnotatedDocument::from_sources(
        Some(&load_fixture("obama-merkel.xml")),
        Some(&load_fixture("obama-merkel.json")),
        ReaderConfig::default(),
    )
    .expect("fixtures should read")
}

fn reference_summary(doc: &AnnotatedDocument) -> String {
    doc.references()
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            format!(
                "{} {} -> {} [{}]",
                r.id,
                doc.reference_text(ReferenceIdx(idx)).unwrap_or_default(),
                r.kb_identifier.as_deref().unwrap_or("-"),
                r.types.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_sentences_and_tokens() {
    let doc = annotated(ReaderConfig::default());
    assert_eq!(doc.sentences().len(), 2);
    assert_eq!(doc.token_count(), 12);
    assert_eq!(
        doc.sentences()[0].as_text(),
        "Barack Obama met Angela Merkel in Berlin ."
    );
    assert_eq!(doc.sentence(2).unwrap().as_text(), "He praised her .");
    assert!(doc.sentence(0).is_none());
    assert_eq!(doc.token_at_offset(34).map(|t| t.word.as_str()), Some("Berlin"));
    assert_eq!(doc.text_len(), 57);
    assert!(doc.tokens().all(|t| !t.is_root()));
}

#[test]
fn test_cyclic_edge_is_dropped() {
    let doc = annotated(ReaderConfig::default());
    let obama = doc.sentence(1).unwrap().token(2).unwrap();
    assert_eq!(obama.children.len(), 1);
    assert_eq!(obama.children[0].relation, "nn");
    assert_eq!(obama.parents[0].relation, "nsubj");
}

#[test]
fn test_dependency_tree_rendering() {
    let doc = annotated(ReaderConfig::default());
    assert_eq!(
        doc.sentence(2).unwrap().dependency_tree(),
        "\t<root> T2 praised [VBD] (-)\n\
         \t\t<nsubj> T1 He [PRP] (-)\n\
         \t\t<dobj> T3 her [PRP] (-)\n\
         \t\t<punct> T4 . [.] (-)\n"
    );
}

#[test]
fn test_dependency_variant_selection() {
    let collapsed = annotated(ReaderConfig::default());
    let berlin = collapsed.sentence(1).unwrap().token(7).unwrap();
    assert_eq!(berlin.parents[0].relation, "prep_in");

    let basic = annotated(ReaderConfig {
        dependencies: DependencyKind::Basic,
        ..ReaderConfig::default()
    });
    let berlin = basic.sentence(1).unwrap().token(7).unwrap();
    assert_eq!((berlin.parents[0].relation.as_str(), berlin.parents[0].token), ("pobj", 6));
    assert_eq!(
        basic.sentence(1).unwrap().shortest_path(2, 7),
        Some(vec![2, 3, 6, 7])
    );
}

#[test]
fn test_entities() {
    let doc = annotated(ReaderConfig::default());
    let entities: Vec<_> = doc
        .entities()
        .map(|e| (e.ner.as_str(), e.tokens.clone(), e.head))
        .collect();
    assert_eq!(
        entities,
        vec![
            ("PERSON", vec![1, 2], 2),
            ("PERSON", vec![4, 5], 5),
            ("LOCATION", vec![7], 7),
        ]
    );
    let merkel = doc.sentence(1).unwrap().token(4).unwrap();
    assert_eq!(merkel.entity_idx, Some(1));
}

#[test]
fn test_coreference_chains() {
    let doc = annotated(ReaderConfig::default());
    let chains = doc.coreferences();
    // the 7-token chain is discarded and reserves no id
    assert_eq!(chains.len(), 2);
    assert_eq!(chains.iter().map(|c| c.id).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(chains[1].signature(), (1, 5));
}

#[test]
fn test_references_merge_entities_and_chains() {
    let doc = annotated(ReaderConfig::default());
    insta::assert_snapshot!(reference_summary(&doc), @r###"
    0 Barack Obama -> - []
    1 Angela Merkel -> - []
    2 Berlin -> - []
    "###);

    let he = doc.sentence(2).unwrap().token(1).unwrap();
    let reference = doc.reference_of(he.mention.unwrap()).unwrap();
    assert_eq!(reference.id, 0);
    assert_eq!(reference.mentions, vec![MentionId(0), MentionId(1)]);

    assert_eq!(
        doc.sentence(1).unwrap().references,
        vec![ReferenceIdx(0), ReferenceIdx(1), ReferenceIdx(2)]
    );
    assert_eq!(doc.sentence(2).unwrap().references, vec![ReferenceIdx(0), ReferenceIdx(1)]);
    assert_eq!(doc.mentions()[4].source.label(), "LOCATION");
    assert_eq!(doc.mentions()[1].source, MentionSource::Coreference);
}

#[test]
fn test_every_mention_has_one_reference() {
    let doc = disambiguated();
    for (idx, reference) in doc.references().iter().enumerate() {
        assert!(!reference.mentions.is_empty());
        assert!(reference.mentions.contains(&reference.representative));
        for id in &reference.mentions {
            assert_eq!(doc.mention(*id).unwrap().reference, Some(ReferenceIdx(idx)));
        }
    }
    let listed: usize = doc.references().iter().map(|r| r.mentions.len()).sum();
    assert_eq!(listed, doc.mentions().len());
}

#[test]
fn test_kept_references_are_disjoint() {
    let doc = annotated(ReaderConfig::default());
    let mut seen = std::collections::HashSet::new();
    for mention in doc.mentions() {
        for token in &mention.tokens {
            assert!(seen.insert((mention.sentence_id, *token)));
        }
    }
}

#[test]
fn test_disambiguation() {
    let doc = disambiguated();
    insta::assert_snapshot!(reference_summary(&doc), @r###"
    0 Barack Obama -> YAGO:Barack_Obama [person, politician]
    1 Angela Merkel -> YAGO:Angela_Merkel [person]
    2 Berlin -> YAGO:Berlin [city]
    3 praised -> YAGO:Praise [act]
    "###);
    assert_eq!(doc.disambiguated_count(), 4);

    // "met" has no metadata and "in" no candidate; neither gets a mention
    assert_eq!(doc.mentions().len(), 6);
    let praised = &doc.mentions()[5];
    assert_eq!(praised.source, MentionSource::Offset);
    assert_eq!(praised.tokens, vec![2]);
    assert_eq!(
        doc.sentence(2).unwrap().references,
        vec![ReferenceIdx(0), ReferenceIdx(1), ReferenceIdx(3)]
    );

    let he = doc.mentions()[1].kb.as_ref().unwrap();
    assert_eq!(he.kb_identifier, "YAGO:Barack_Obama");
    assert!((he.disambiguation_score - 0.3).abs() < 1e-9);
}

#[test]
fn test_reapplying_disambiguation_rebuilds_the_list() {
    let mut doc = disambiguated();
    doc.read_disambiguation_json(&load_fixture("obama-merkel.json"))
        .unwrap();
    assert_eq!(doc.disambiguated_count(), 4);
    assert_eq!(doc.mentions().len(), 6);
}

#[test]
fn test_new_disambiguation_replaces_identities() {
    let mut doc = disambiguated();
    let json = r#"{"mentions": [{"offset": 34, "length": 6,
        "bestEntity": {"kbIdentifier": "YAGO:Berlin", "disambiguationScore": "0.5"}}],
        "entityMetadata": {"YAGO:Berlin": {"type": ["YAGO_city"]}}}"#;
    doc.read_disambiguation_json(json).unwrap();

    let listed: Vec<u32> = doc.disambiguated_references().map(|r| r.id).collect();
    assert_eq!(listed, vec![2]);
    let obama = &doc.references()[0];
    assert!(!obama.is_disambiguated());
    assert!(obama.types.is_empty());
    assert!(doc.mentions()[1].kb.is_none());
    assert_eq!(
        doc.references().iter().filter(|r| r.is_disambiguated()).count(),
        doc.disambiguated_count()
    );
}

#[test]
fn test_disambiguation_offset_overflow() {
    let json = r#"{"mentions": [{"offset": 18446744073709551615, "length": 1,
        "bestEntity": {"kbIdentifier": "YAGO:X", "disambiguationScore": 1}}],
        "entityMetadata": {"YAGO:X": {"type": []}}}"#;
    let err = AnnotatedDocument::from_sources(
        Some(&load_fixture("obama-merkel.xml")),
        Some(json),
        ReaderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnnotationError::OffsetPastEnd { text_len: 57, .. }));
}

#[test]
fn test_disambiguation_past_end_of_text() {
    let json = r#"{"mentions": [{"offset": 90, "length": 4,
        "bestEntity": {"kbIdentifier": "YAGO:X", "disambiguationScore": 1}}],
        "entityMetadata": {"YAGO:X": {"type": []}}}"#;
    let err = AnnotatedDocument::from_sources(
        Some(&load_fixture("obama-merkel.xml")),
        Some(json),
        ReaderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnnotationError::OffsetPastEnd { offset: 90, text_len: 57 }
    ));
}

#[test]
fn test_load_from_files() {
    let doc = AnnotatedDocument::load(
        Some(&fixture_path("obama-merkel.xml")),
        Some(&fixture_path("obama-merkel.json")),
        ReaderConfig::default(),
    )
    .unwrap();
    assert_eq!(doc.disambiguated_count(), 4);

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("reader.toml");
    fs::write(&config_path, "dependencies = \"basic\"\nread_parse = true\n").unwrap();
    let config = ReaderConfig::from_toml_file(&config_path).unwrap();
    let doc = AnnotatedDocument::load(Some(&fixture_path("obama-merkel.xml")), None, config)
        .unwrap();
    assert_eq!(doc.config().dependencies, DependencyKind::Basic);
    assert_eq!(doc.disambiguated_count(), 0);
}

#[test]
fn test_constituency_parse() {
    let without = annotated(ReaderConfig::default());
    assert!(without.sentence(1).unwrap().parse.is_none());

    let doc = annotated(ReaderConfig::default().with_read_parse(true));
    for sentence in doc.sentences() {
        let parse = sentence.parse.as_ref().unwrap();
        assert_eq!(parse.words().join(" "), sentence.as_text());
    }
}

#[test]
fn test_snapshot() {
    let doc = disambiguated();
    let snapshot = SnapshotBuilder::new(&doc).with_tokens().build();

    assert_eq!(snapshot.sentences.len(), 2);
    assert_eq!(snapshot.sentences[0].tokens.len(), 8);
    // the cyclic edge is not part of the snapshot
    assert_eq!(snapshot.sentences[0].dependencies.len(), 7);
    assert_eq!(snapshot.mention_count(), 6);
    assert_eq!(snapshot.disambiguated.len(), 4);

    let obama = snapshot.find_reference(&SnapshotId::reference(0)).unwrap();
    assert_eq!(obama.text, "Barack Obama");
    assert_eq!(obama.mentions[1].text, "He");
    assert_eq!(obama.mentions[1].source, "COREF");

    let ron = snapshot.to_ron_string().unwrap();
    assert_eq!(DocumentSnapshot::from_ron_string(&ron).unwrap(), snapshot);
    let json = snapshot.to_json_string().unwrap();
    assert_eq!(DocumentSnapshot::from_json_string(&json).unwrap(), snapshot);

    // same input, same snapshot
    assert_eq!(DocumentSnapshot::from_document(&disambiguated()), SnapshotBuilder::new(&doc).build());
}

#[test]
fn test_document_display() {
    let doc = annotated(ReaderConfig::default());
    let rendered = doc.to_string();
    assert!(rendered.starts_with("S0 (null sentence)\n\nS1\n\tT0 ROOT\n\tT1 Barack [NNP] (PERSON)\n"));
    assert!(rendered.ends_with("\tT4 . [.] (-)\n\n"));
}
