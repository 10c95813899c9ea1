use std::sync::Arc;

use httpmock::prelude::*;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use zeptomail_client::{AddEmailTemplateReq, Error, Transport, ZeptoMail};

fn transport(server: &MockServer, credential: &str) -> Transport {
    Transport::new(
        &format!("{}/v1.1", server.base_url()),
        "agent-1",
        credential,
        reqwest::Client::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn caller_headers_override_defaults() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1.1/mailagents/agent-1/templates")
                .header("Authorization", "Zoho-oauthtoken override")
                .header("Content-Type", "application/vnd.custom+json")
                .header("X-Tester", "zeptomail-client");
            then.status(200).body(r#"{"message":"OK"}"#);
        })
        .await;

    let t = transport(&server, "Zoho-oauthtoken original");
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/vnd.custom+json"),
    );
    headers.insert(
        HeaderName::from_static("x-tester"),
        HeaderValue::from_static("zeptomail-client"),
    );
    headers.insert(
        reqwest::header::AUTHORIZATION,
        HeaderValue::from_static("Zoho-oauthtoken override"),
    );

    let req = AddEmailTemplateReq {
        template_name: "n".into(),
        template_alias: "a".into(),
        subject: "s".into(),
        html_body: "b".into(),
        ..Default::default()
    };
    let endpoint = t.endpoint("/mailagents/{agent}/templates", &[]);
    let rv: zeptomail_client::WrappedResponse<serde_json::Value> = t
        .invoke(
            &CancellationToken::new(),
            reqwest::Method::POST,
            endpoint,
            headers,
            Some(&req),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rv.data["message"], "OK");
}

#[tokio::test]
async fn zero_payload_is_sent_without_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1.1/email");
            then.status(201);
        })
        .await;

    let t = transport(&server, "Zoho-enczapikey abc");
    let endpoint = t.endpoint("/email", &[]);
    // a default payload counts as absent, so it is neither validated nor sent
    let rv: zeptomail_client::WrappedResponse<serde_json::Value> = t
        .invoke(
            &CancellationToken::new(),
            reqwest::Method::POST,
            endpoint,
            HeaderMap::new(),
            Some(&AddEmailTemplateReq::default()),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rv.status(), 201);
    assert!(rv.data.is_null());
}

#[tokio::test]
async fn single_credential_mode_uses_send_key_everywhere() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1.1/mailagents/agent-1/templates/k1")
                .header("Authorization", "Zoho-enczapikey abc");
            then.status(200).body(r#"{"data":{"template_key":"k1"},"message":"OK"}"#);
        })
        .await;

    let zepto = ZeptoMail::builder()
        .base_url(format!("{}/v1.1", server.base_url()))
        .mail_agent("agent-1")
        .send_token("abc")
        .single_credential()
        .build()
        .unwrap();

    let rv = zepto
        .template()
        .get_email_template(&CancellationToken::new(), "k1")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rv.data.data.template_key, "k1");
}

#[tokio::test]
async fn shared_transport_serves_concurrent_calls() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/v1.1/mailagents/agent-1/templates/");
            then.status(200).body(r#"{"message":"OK","object":"templates"}"#);
        })
        .await;

    let t = Arc::new(transport(&server, "Zoho-oauthtoken tok"));
    let zepto = ZeptoMail::from_transport(t);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let zepto = zepto.clone();
        tasks.push(tokio::spawn(async move {
            zepto
                .template()
                .get_email_template(&CancellationToken::new(), &format!("k{i}"))
                .await
        }));
    }
    for task in tasks {
        let rv = task.await.unwrap().unwrap();
        assert_eq!(rv.data.object, "templates");
    }

    assert_eq!(mock.hits_async().await, 8);
}

#[tokio::test]
async fn connection_failure_is_request_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let zepto = ZeptoMail::builder()
        .base_url(format!("http://127.0.0.1:{port}/v1.1"))
        .send_token("abc")
        .build()
        .unwrap();

    let err = zepto
        .template()
        .list_email_templates(&CancellationToken::new(), 0, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { response: None, .. }));
    assert!(err.to_string().starts_with("request failed"));
    assert!(!err.is_local());
}

#[tokio::test]
async fn truncated_body_keeps_partial_response() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 100\r\n\r\n{\"da")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let zepto = ZeptoMail::builder()
        .base_url(format!("http://127.0.0.1:{port}/v1.1"))
        .mail_agent("agent-1")
        .send_token("abc")
        .build()
        .unwrap();

    let err = zepto
        .template()
        .list_email_templates(&CancellationToken::new(), 0, 10)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(err.to_string().starts_with("request failed"));
    let raw = err.raw_response().expect("partial response");
    assert_eq!(raw.status(), 201);
    assert!(raw.body().is_empty());
    assert_eq!(raw.url().path(), "/v1.1/mailagents/agent-1/templates");
}
