use datasource_core::{DataItem, SearchContext, Topic};
use serde_json::{json, Value};

#[test]
fn topic_uses_interchange_tags() {
    let topic = Topic::new("What is a lifetime?", "https://so.example/q/7", 7).with_site("stackoverflow");
    let value = serde_json::to_value(&topic).expect("encode");
    assert_eq!(
        value,
        json!({
            "topic": "What is a lifetime?",
            "source_url": "https://so.example/q/7",
            "site": "stackoverflow",
            "topic_id": 7
        })
    );
    let back: Topic = serde_json::from_value(value).expect("decode");
    assert_eq!(back, topic);
}

#[test]
fn data_item_keeps_legacy_answer_id_tag() {
    let item = DataItem::new("<p>Borrow it.</p>", "https://so.example/a/9", 9);
    let value = serde_json::to_value(&item).expect("encode");
    assert_eq!(value["answer_id"], json!(9));
    assert!(value.get("item_id").is_none());
    let back: DataItem = serde_json::from_value(value).expect("decode");
    assert_eq!(back, item);
}

#[test]
fn empty_site_is_omitted_and_decodes_to_none() {
    let mut topic = Topic::new("t", "https://wiki.example/t", 3);
    topic.site = Some(String::new());
    let encoded = serde_json::to_string(&topic).expect("encode");
    assert!(!encoded.contains("site"), "{encoded}");

    let back: Topic = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(back.site, None);

    let item: DataItem = serde_json::from_value(json!({
        "data_text": "x",
        "source_url": "https://wiki.example/t#1",
        "site": "",
        "answer_id": 1
    }))
    .expect("decode");
    assert_eq!(item.site, None);
}

#[test]
fn missing_ids_are_rejected() {
    let result: Result<Topic, _> = serde_json::from_value(json!({ "topic": "t", "source_url": "u" }));
    assert!(result.is_err());
}

#[test]
fn search_context_optional_fields_default() {
    let ctx: SearchContext = serde_json::from_value(json!({ "question_text": "tokio select" })).expect("decode");
    assert_eq!(ctx, SearchContext::new("tokio select"));
    assert!(ctx.is_anonymous());

    let full = SearchContext::new("q").with_tags(["rust"]).with_asker(5).with_embedding(vec![0.25, -1.5]);
    let value: Value = serde_json::to_value(&full).expect("encode");
    assert_eq!(value["asked_by"], json!(5));
    let back: SearchContext = serde_json::from_value(value).expect("decode");
    assert_eq!(back, full);
}
