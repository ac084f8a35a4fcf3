use docgen_renderer::{
    renderer_test::{MockDocumentRenderer, MockRenderResult},
    Artifact, DocumentRenderer, GenerationRequest, RenderContext, RenderError,
};

fn request(template_id: &str, tenant: &str) -> GenerationRequest {
    let mut context = RenderContext::new();
    context.insert("tenant".to_string(), tenant.to_string());
    GenerationRequest::new(template_id, context)
}

#[tokio::test]
async fn mock_renderer_tracks_requests_and_returns_results() {
    let renderer = MockDocumentRenderer::new();

    let artifact1 = Artifact::pdf(b"%PDF-1.7 lease".to_vec());
    let artifact3 = Artifact::pdf(b"%PDF-1.7 notice".to_vec()).with_file_url("https://files/3");

    renderer
        .enqueue(artifact1.clone())
        .enqueue(MockRenderResult::error(RenderError::InvalidInput(
            "render error".to_string(),
        )))
        .enqueue(artifact3.clone());

    let res1 = renderer
        .render(request("lease", "Alice"))
        .await
        .expect("first render should succeed");
    assert_eq!(res1, artifact1);
    assert_eq!(renderer.tracked_requests(), vec![request("lease", "Alice")]);

    let err = renderer
        .render(request("lease", "Bob"))
        .await
        .expect_err("second render should error");
    match err {
        RenderError::InvalidInput(msg) => assert_eq!(msg, "render error"),
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(renderer.tracked_requests().len(), 2);

    let res3 = renderer
        .render(request("notice", "Carol"))
        .await
        .expect("third render should succeed");
    assert_eq!(res3, artifact3);
    let tracked = renderer.tracked_requests();
    assert_eq!(tracked.len(), 3);
    assert_eq!(tracked[2], request("notice", "Carol"));

    renderer.reset();
    assert!(renderer.tracked_requests().is_empty());

    renderer.enqueue(Artifact::pdf(b"%PDF-1.7 after reset".to_vec()));
    renderer.restore();

    let err = renderer
        .render(request("lease", "Alice"))
        .await
        .expect_err("render after restore should fail");
    match err {
        RenderError::Invariant(provider, message) => {
            assert_eq!(provider, "mock");
            assert_eq!(message, "no mocked render results available");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn mock_renderer_deferred_result_resolves_later() {
    let renderer = MockDocumentRenderer::new();
    let deferred = renderer.enqueue_deferred();

    let render = renderer.render(request("lease", "Alice"));
    let resolve = async {
        tokio::task::yield_now().await;
        assert!(deferred.resolve(Ok(Artifact::pdf(b"%PDF-1.7 late".to_vec()))));
    };

    let (result, ()) = tokio::join!(render, resolve);
    assert_eq!(
        result.expect("deferred render should succeed").data,
        b"%PDF-1.7 late".to_vec()
    );
}

#[tokio::test]
async fn mock_renderer_deferred_result_dropped_is_an_error() {
    let renderer = MockDocumentRenderer::new();
    drop(renderer.enqueue_deferred());

    let err = renderer
        .render(request("lease", "Alice"))
        .await
        .expect_err("dropped deferred render should fail");
    assert!(matches!(err, RenderError::Invariant("mock", _)));
}
