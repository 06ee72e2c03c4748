//! End-to-end integration tests for SourceChat.
//!
//! These run the real extractor and provider against a local mock server,
//! exercising the full path from a submission to the recorded transcript.

use std::sync::Arc;
use std::time::Duration;

use sourcechat_config::AppConfig;
use sourcechat_core::error::{CompletionError, ExtractionError, SessionError};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use sourcechat_core::message::{Role, SourceRef};
use sourcechat_core::source::PdfUpload;
use sourcechat_extract::{DocumentExtractor, WebExtractor};
use sourcechat_providers::OpenAiCompatProvider;
use sourcechat_session::{CacheOutcome, Session, SessionSettings, Submission, transcript};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// ── Helpers ──────────────────────────────────────────────────────────────

fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "deepseek-chat",
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
    })
}

fn session_against(server: &MockServer, max_chars: usize) -> Session {
    let provider = OpenAiCompatProvider::new(
        "deepseek",
        server.uri(),
        "sk-test",
        Duration::from_secs(5),
    )
    .unwrap();
    let web = WebExtractor::new(Duration::from_secs(5), "sourcechat-e2e").unwrap();
    let extractor = DocumentExtractor::new(web, max_chars);
    Session::new(
        Arc::new(provider),
        Arc::new(extractor),
        SessionSettings::default(),
    )
}

async fn mount_page(server: &MockServer, route: &str, html: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn sent_messages(request: &Request) -> Vec<serde_json::Value> {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    body["messages"].as_array().unwrap().clone()
}

async fn completion_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/chat/completions")
        .collect()
}

/// A single-page PDF showing `line` in Helvetica.
fn one_page_pdf(line: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_plain_question_without_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("General answer.")))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_against(&server, 8000);
    let reply = session
        .submit(Submission::new("What is this about?"))
        .await
        .unwrap();

    assert_eq!(reply.answer, "General answer.");
    assert_eq!(reply.usage.unwrap().total_tokens, 120);

    let requests = completion_requests(&server).await;
    let messages = sent_messages(&requests[0]);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["content"], "What is this about?");

    let roles: Vec<Role> = session.history().turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant]);
}

#[tokio::test]
async fn e2e_url_grounding_is_fetched_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/page",
        "<html><head><script>track()</script></head>\
         <body><h1>Example Domain</h1>\n<p>This domain is for examples.</p></body></html>",
        1,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("It is an example.")))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let mut session = session_against(&server, 8000);

    let first = session
        .submit(Submission::new("Summarize").with_url(url.clone()))
        .await
        .unwrap();
    assert_eq!(first.cache, Some(CacheOutcome::Miss));

    let second = session
        .submit(Submission::new("Who owns it?").with_url(url.clone()))
        .await
        .unwrap();
    assert_eq!(second.cache, Some(CacheOutcome::Hit));

    let requests = completion_requests(&server).await;
    let first_messages = sent_messages(&requests[0]);
    assert_eq!(
        first_messages[1]["content"],
        "Based on this content: Example Domain This domain is for examples.\n\nPlease answer: Summarize"
    );

    // History is replayed as bare questions; content rides only on the newest.
    let second_messages = sent_messages(&requests[1]);
    assert_eq!(second_messages.len(), 4);
    assert_eq!(second_messages[1]["content"], "Summarize");
    assert_eq!(second_messages[2]["content"], "It is an example.");
    assert!(
        second_messages[3]["content"]
            .as_str()
            .unwrap()
            .ends_with("Please answer: Who owns it?")
    );

    assert_eq!(session.cache().identifiers(), vec![url.as_str()]);
}

#[tokio::test]
async fn e2e_long_page_is_truncated_at_sentence() {
    let server = MockServer::start().await;
    let body = format!("<p>{}</p>", "Short sentence here. ".repeat(50));
    mount_page(&server, "/long", &body, 1).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Please answer: How long?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Long.")))
        .mount(&server)
        .await;

    let mut session = session_against(&server, 100);
    session
        .submit(Submission::new("How long?").with_url(format!("{}/long", server.uri())))
        .await
        .unwrap();

    let requests = completion_requests(&server).await;
    let content = sent_messages(&requests[0])[1]["content"]
        .as_str()
        .unwrap()
        .to_string();
    let grounding = content
        .strip_prefix("Based on this content: ")
        .and_then(|rest| rest.split("\n\nPlease answer:").next())
        .unwrap();
    assert!(grounding.chars().count() <= 100);
    assert!(grounding.ends_with('.'));
}

#[tokio::test]
async fn e2e_fetch_failure_rolls_back_without_calling_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_against(&server, 8000);
    let err = session
        .submit(Submission::new("Anything?").with_url(format!("{}/gone", server.uri())))
        .await
        .unwrap_err();

    match err {
        SessionError::Extraction(ExtractionError::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected HTTP extraction error, got {other:?}"),
    }
    assert!(session.history().is_empty());
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn e2e_pdf_grounding_is_extracted_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Quarterly.")))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session_against(&server, 8000);
    let upload = PdfUpload::new("notes.pdf", one_page_pdf("quarterly revenue grew"));

    let first = session
        .submit(Submission::new("What grew?").with_pdf(upload.clone()))
        .await
        .unwrap();
    assert_eq!(first.cache, Some(CacheOutcome::Miss));
    assert_eq!(first.source, Some(SourceRef::pdf("notes.pdf")));

    let second = session
        .submit(Submission::new("By how much?").with_pdf(upload))
        .await
        .unwrap();
    assert_eq!(second.cache, Some(CacheOutcome::Hit));

    let requests = completion_requests(&server).await;
    let grounded = sent_messages(&requests[0])[1]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(grounded.starts_with("Based on this content: "));
    assert!(grounded.contains("quarterly revenue grew"));
    assert!(grounded.ends_with("Please answer: What grew?"));

    assert_eq!(session.cache().identifiers(), vec!["notes.pdf"]);
    assert_eq!(
        session.history().turns()[0].display_content(),
        "Source: PDF - notes.pdf\nQuestion: What grew?"
    );
}

#[tokio::test]
async fn e2e_invalid_pdf_reports_and_rolls_back() {
    let server = MockServer::start().await;
    let mut session = session_against(&server, 8000);

    let upload = PdfUpload::new("notes.pdf", b"definitely not a pdf".to_vec());
    let err = session
        .submit(Submission::new("What is inside?").with_pdf(upload))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Error reading PDF: "));
    assert!(session.history().is_empty());
    assert!(!session.cache().contains_identifier("notes.pdf"));
}

#[tokio::test]
async fn e2e_provider_error_keeps_session_usable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("first try"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"message": "Service temporarily unavailable"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("second try"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Back online.")))
        .mount(&server)
        .await;

    let mut session = session_against(&server, 8000);

    let err = session
        .submit(Submission::new("first try"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Completion(CompletionError::Api { status: Some(500), .. })
    ));
    assert!(err.to_string().contains("Service temporarily unavailable"));
    assert!(session.history().is_empty());

    let reply = session.submit(Submission::new("second try")).await.unwrap();
    assert_eq!(reply.answer, "Back online.");
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn e2e_clear_then_export_transcript() {
    let server = MockServer::start().await;
    mount_page(&server, "/doc", "<p>Doc text.</p>", 2).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Answer.")))
        .mount(&server)
        .await;

    let url = format!("{}/doc", server.uri());
    let mut session = session_against(&server, 8000);
    session
        .submit(Submission::new("One?").with_url(url.clone()))
        .await
        .unwrap();

    session.reset();
    assert!(session.history().is_empty());
    assert!(session.cache().is_empty());

    // After a reset the page is fetched again.
    session
        .submit(Submission::new("Two?").with_url(url.clone()))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chat.txt");
    transcript::write(session.history().turns(), &out).unwrap();
    assert_eq!(
        std::fs::read_to_string(out).unwrap(),
        format!("USER: Source: URL - {url}\nQuestion: Two?\n\nASSISTANT: Answer.")
    );
}

#[tokio::test]
async fn e2e_session_from_config_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"model\":\"custom-model\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Configured.")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "api_key = \"sk-file\"\n\n[provider]\nbase_url = \"{}\"\nmodel = \"custom-model\"\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = AppConfig::load_from(&config_path).unwrap();
    let provider = OpenAiCompatProvider::from_config(
        &config.provider,
        &config.http,
        config.api_key.clone().unwrap(),
    )
    .unwrap();
    let extractor = DocumentExtractor::from_config(&config).unwrap();
    let mut session = Session::new(
        Arc::new(provider),
        Arc::new(extractor),
        SessionSettings::from_config(&config),
    );

    let reply = session.submit(Submission::new("Hello")).await.unwrap();
    assert_eq!(reply.answer, "Configured.");
}
