use super::*;

fn response(user: &str, option: Option<i64>) -> Response {
    Response {
        user: user.to_string(),
        timestamp: Utc::now(),
        response: None,
        option,
        option_text: None,
    }
}

#[tokio::test]
async fn initial_slide_is_empty() {
    let storage = Storage::new();
    let slide = storage.current_slide().await;
    assert_eq!(slide, CurrentSlide::default());
    assert!(slide.current_slide.is_empty());
}

#[tokio::test]
async fn set_slide_overwrites_previous_value() {
    let storage = Storage::new();
    storage.set_slide("Intro").await.expect("slide");
    let second = storage.set_slide("Slide3").await.expect("slide");

    let current = storage.current_slide().await;
    assert_eq!(current.current_slide, "Slide3");
    assert_eq!(current.timestamp, second.timestamp);
}

#[tokio::test]
async fn blank_slide_name_is_rejected() {
    let storage = Storage::new();
    storage.set_slide("Intro").await.expect("slide");

    let err = storage.set_slide("  ").await.expect_err("should fail");
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(storage.current_slide().await.current_slide, "Intro");
}

#[tokio::test]
async fn save_element_requires_id_type_and_title() {
    let storage = Storage::new();
    for (id, kind, title) in [("", "poll", "t"), ("p1", "", "t"), ("p1", "poll", "")] {
        let err = storage
            .save_element(id, kind, title, Vec::new())
            .await
            .expect_err("should fail");
        assert!(matches!(err, StoreError::Validation(_)));
    }
    assert!(storage.list_elements().await.is_empty());
}

#[tokio::test]
async fn whitespace_only_fields_count_as_missing() {
    let storage = Storage::new();
    for (id, kind, title) in [(" ", "poll", "t"), ("p1", "\t", "t"), ("p1", "poll", "  ")] {
        let err = storage
            .save_element(id, kind, title, Vec::new())
            .await
            .expect_err("should fail");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    let element = storage
        .save_element(" p1 ", "poll", " Pick one ", Vec::new())
        .await
        .expect("save");
    assert_eq!(element.id, ElementId::new(" p1 "));
    assert_eq!(element.title, " Pick one ");
}

#[tokio::test]
async fn save_element_overwrites_existing_id() {
    let storage = Storage::new();
    storage
        .save_element("p1", "poll", "First", vec!["A".into()])
        .await
        .expect("save");
    storage
        .save_element("p1", "vote", "Second", vec!["X".into(), "Y".into()])
        .await
        .expect("save");

    let elements = storage.list_elements().await;
    assert_eq!(elements.len(), 1);
    let element = &elements[&ElementId::new("p1")];
    assert_eq!(element.title, "Second");
    assert_eq!(element.options, vec!["X".to_string(), "Y".to_string()]);
}

#[tokio::test]
async fn missing_element_is_not_found() {
    let storage = Storage::new();
    let err = storage
        .element(&ElementId::new("nope"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = storage
        .delete_element(&ElementId::new("nope"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn append_returns_running_count_and_keeps_order() {
    let storage = Storage::new();
    let id = ElementId::new("q1");
    for (expected, user) in ["u1", "u2", "u3"].into_iter().enumerate() {
        let count = storage
            .append_response(&id, response(user, None), AppendPolicy::Permissive)
            .await
            .expect("append");
        assert_eq!(count, expected + 1);
    }

    let users: Vec<_> = storage
        .responses(&id)
        .await
        .into_iter()
        .map(|r| r.user)
        .collect();
    assert_eq!(users, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn append_requires_element_id_and_user() {
    let storage = Storage::new();
    let err = storage
        .append_response(&ElementId::new(""), response("u1", None), AppendPolicy::Permissive)
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Validation(_)));

    let err = storage
        .append_response(&ElementId::new("p1"), response(" ", None), AppendPolicy::Permissive)
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(storage.counts().await.responses, 0);
}

#[tokio::test]
async fn strict_policy_rejects_unknown_element() {
    let storage = Storage::new();
    let ghost = ElementId::new("ghost");

    let count = storage
        .append_response(&ghost, response("u1", None), AppendPolicy::Permissive)
        .await
        .expect("permissive append");
    assert_eq!(count, 1);

    let err = storage
        .append_response(&ghost, response("u2", None), AppendPolicy::RequireElement)
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(storage.responses(&ghost).await.len(), 1);
}

#[tokio::test]
async fn unknown_element_lists_no_responses() {
    let storage = Storage::new();
    assert!(storage.responses(&ElementId::new("none")).await.is_empty());
}

#[tokio::test]
async fn delete_cascades_to_responses() {
    let storage = Storage::new();
    let id = ElementId::new("p1");
    storage
        .save_element("p1", "poll", "Pick", vec!["A".into(), "B".into()])
        .await
        .expect("save");
    for user in ["u1", "u2"] {
        storage
            .append_response(&id, response(user, Some(0)), AppendPolicy::Permissive)
            .await
            .expect("append");
    }

    let deleted = storage.delete_element(&id).await.expect("delete");
    assert_eq!(deleted.element.id, id);
    assert_eq!(deleted.responses_removed, 2);
    assert!(storage.responses(&id).await.is_empty());
    assert!(storage.list_elements().await.is_empty());
}

#[tokio::test]
async fn clear_all_empties_every_element() {
    let storage = Storage::new();
    for id in ["a", "b"] {
        storage
            .append_response(&ElementId::new(id), response("u", None), AppendPolicy::Permissive)
            .await
            .expect("append");
    }

    assert_eq!(storage.clear_all_responses().await, 2);
    assert_eq!(storage.counts().await.responses, 0);
}

#[tokio::test]
async fn counts_sum_responses_across_elements() {
    let storage = Storage::new();
    storage
        .save_element("p1", "poll", "Pick", vec!["A".into()])
        .await
        .expect("save");
    for id in ["p1", "p1", "ghost"] {
        storage
            .append_response(&ElementId::new(id), response("u", Some(0)), AppendPolicy::Permissive)
            .await
            .expect("append");
    }

    let counts = storage.counts().await;
    assert_eq!(counts.elements, 1);
    assert_eq!(counts.responses, 3);
}

#[tokio::test]
async fn element_with_responses_reads_both_sides() {
    let storage = Storage::new();
    let id = ElementId::new("p1");
    storage
        .save_element("p1", "poll", "Pick", vec!["A".into()])
        .await
        .expect("save");
    storage
        .append_response(&id, response("u1", Some(0)), AppendPolicy::Permissive)
        .await
        .expect("append");

    let (element, responses) = storage.element_with_responses(&id).await.expect("read");
    assert_eq!(element.title, "Pick");
    assert_eq!(responses.len(), 1);

    storage
        .append_response(&ElementId::new("ghost"), response("u1", None), AppendPolicy::Permissive)
        .await
        .expect("append");
    let err = storage
        .element_with_responses(&ElementId::new("ghost"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::NotFound(_)));
}
