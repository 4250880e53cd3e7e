use kiln::ingest::{ingest, Collector, MemorySource, Page, Reply};
use kiln::normalize::{OutputOptions, RawRecord, RecordMapper, TypeStyle};
use kiln::{IngestError, MapperConfig};
use serde_json::{json, Value};
use std::io::Write;

fn raw(value: Value) -> RawRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_renamed_columns_produce_canonical_wire_shape() {
    let mut source = MemorySource::new(vec![Reply::Page(Page::last(vec![raw(json!({
        "id": "rec1",
        "fields": {"Template_id": "tpl-42", "TYPE": "Beer Mat", "requires_photo": "true"}
    }))]))]);

    let response = ingest(&mut source, &Collector::default(), &RecordMapper::default()).unwrap();
    let doc = serde_json::to_value(&response).unwrap();

    assert_eq!(
        doc,
        json!({
            "records": [{
                "template_id": "tpl-42",
                "name": "",
                "TYPE": "Beer Mat",
                "type": "beer-mat",
                "fields": [],
                "layout": null,
                "requires_photo": true,
                "requires_text": true,
                "optional": false,
                "optional_photo": false,
                "optional_text": false,
                "base_image": null,
                "typeMeta": {"title": null, "instructions_md": "", "requirements": []}
            }]
        })
    );
}

#[test]
fn test_multi_page_order_is_preserved_end_to_end() {
    let pages = vec![
        vec![
            raw(json!({"id": "r1", "fields": {"template_id": "one"}})),
            raw(json!({"id": "r2", "fields": {"Template ID": "two"}})),
        ],
        vec![raw(json!({"id": "r3", "fields": {}}))],
        vec![raw(json!({"id": "r4", "fields": {"slug": "four"}}))],
    ];
    let mut source = MemorySource::from_record_pages(pages);

    let response = ingest(&mut source, &Collector::default(), &RecordMapper::default()).unwrap();
    let ids: Vec<_> = response.records.iter().map(|r| r.template_id.as_str()).collect();
    assert_eq!(ids, ["one", "two", "r3", "four"]);
}

#[test]
fn test_one_malformed_row_does_not_block_the_batch() {
    let mut source = MemorySource::from_record_pages(vec![vec![
        raw(json!({"id": "bad", "fields": {
            "fields_json": "[{\"key\": ",
            "layout_spec": "{{{",
            "base_image": {"unexpected": "shape"},
            "requirements_json": 17,
            "requires_text": ["nonsense"]
        }})),
        raw(json!({"id": "good", "fields": {"fields_json": [{"key": "photo", "type": "image"}]}})),
    ]]);

    let response = ingest(&mut source, &Collector::default(), &RecordMapper::default()).unwrap();
    let bad = &response.records[0];
    assert!(bad.fields.is_empty());
    assert_eq!(bad.layout, None);
    assert_eq!(bad.base_image, None);
    assert!(bad.type_meta.requirements.is_empty());
    assert!(!bad.requires_text);

    assert_eq!(response.records[1].fields, vec![json!({"key": "photo", "type": "image"})]);
}

#[test]
fn test_upstream_failure_fails_the_whole_call() {
    let mut source = MemorySource::new(vec![
        Reply::Page(Page::new(vec![raw(json!({"id": "r1"}))], Some("c2".to_string()))),
        Reply::Page(Page::new(vec![raw(json!({"id": "r2"}))], Some("c3".to_string()))),
        Reply::Failure {
            status: 422,
            body: "{\"error\":{\"type\":\"UNKNOWN_FIELD_NAME\"}}".to_string(),
        },
    ]);

    let err = ingest(&mut source, &Collector::default(), &RecordMapper::default()).unwrap_err();
    match err {
        IngestError::Upstream { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("UNKNOWN_FIELD_NAME"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[test]
fn test_query_options_shape_output() {
    let options = OutputOptions::from_query([("slug", "true"), ("type", "raw"), ("slugify_id", "1")]);
    assert_eq!(options.type_style, TypeStyle::Raw);
    let mapper = RecordMapper::new(options, MapperConfig::default());

    let mut source = MemorySource::from_record_pages(vec![vec![raw(json!({
        "id": "rec1",
        "fields": {"name": "Mat", "Type": "Beer Mat", "template_id": "Summer Mat"}
    }))]]);
    let response = ingest(&mut source, &Collector::default(), &mapper).unwrap();
    let doc = serde_json::to_value(&response.records[0]).unwrap();

    assert_eq!(doc["template_id"], "tpl-summer-mat");
    assert_eq!(doc["type"], "Beer Mat");
    assert_eq!(doc["slug"], json!({"type": "Beer Mat"}));
}

#[test]
fn test_requires_defaults_are_configurable() {
    let config = MapperConfig {
        requires_photo_default: false,
        requires_text_default: false,
        ..MapperConfig::default()
    };
    let mapper = RecordMapper::new(OutputOptions::default(), config);
    let record = mapper.map(&raw(json!({"id": "rec1", "fields": {"optional": "yes"}})));

    assert!(!record.requires_photo);
    assert!(!record.requires_text);
    assert!(record.optional);
}

#[test]
fn test_pages_file_replay() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let pages = json!([
        {"records": [{"id": "rec1", "fields": {"Name": "First"}}], "offset": "itr/rec1"},
        {"records": [{"id": "rec2", "fields": {"Name": "Second", "layout_spec": "{\"layout\":{\"elements\":[{\"k\":1}]}}"}}]}
    ]);
    write!(file, "{}", pages).unwrap();

    let mut source = MemorySource::from_file(file.path()).unwrap();
    let response = ingest(&mut source, &Collector::default(), &RecordMapper::default()).unwrap();

    assert_eq!(source.requests(), &[None, Some("itr/rec1".to_string())]);
    let names: Vec<_> = response.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["First", "Second"]);
    let layout = serde_json::to_value(&response.records[1].layout).unwrap();
    assert_eq!(layout, json!({"elements": [{"k": 1}]}));
}

#[test]
fn test_pages_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let err = MemorySource::from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read pages file"));
}
