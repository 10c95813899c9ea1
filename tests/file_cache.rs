use httpmock::prelude::*;
use tokio_util::sync::CancellationToken;
use zeptomail_client::{EmailAttachment, Error, FileCacheUploadReq, ZeptoMail};

fn client(server: &MockServer) -> ZeptoMail {
    ZeptoMail::builder()
        .base_url(format!("{}/v1.1", server.base_url()))
        .send_token("abc")
        .build()
        .unwrap()
}

#[tokio::test]
async fn upload_sends_raw_text_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1.1/files")
                .query_param("name", "test.ico")
                .header("Authorization", "Zoho-enczapikey abc")
                .header("Content-Type", "text/plain")
                .body("raw file bytes");
            then.status(201).body(
                r#"{"file_cache_key":"ea36f19a.1f1d6a1ac","data":[],"message":"OK","object":"file","request_id":"2d6f"}"#,
            );
        })
        .await;

    let req = FileCacheUploadReq::new("test.ico", &b"raw file bytes"[..]);
    let rv = client(&server)
        .file_cache()
        .upload(&CancellationToken::new(), &req)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(rv.status(), 201);
    assert!(rv.data.error.is_none());
    assert_eq!(rv.data.message, "OK");
    assert_eq!(rv.data.object, "file");
    assert!(!rv.data.file_cache_key.is_empty());

    let attachment = EmailAttachment::from_file_cache(rv.data.file_cache_key, "test.ico");
    assert_eq!(attachment.file_cache_key.as_deref(), Some("ea36f19a.1f1d6a1ac"));
}

#[tokio::test]
async fn upload_escapes_file_name() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1.1/files")
                .query_param("name", "notes&v2.txt");
            then.status(201).body(r#"{"file_cache_key":"k","object":"file"}"#);
        })
        .await;

    let req = FileCacheUploadReq::new("notes&v2.txt", "text");
    let rv = client(&server)
        .file_cache()
        .upload(&CancellationToken::new(), &req)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        rv.raw_response.url().query(),
        Some("name=notes%26v2.txt")
    );
}

#[tokio::test]
async fn upload_without_name_is_rejected_locally() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/v1.1/files");
            then.status(201);
        })
        .await;

    let req = FileCacheUploadReq::new("", "text");
    let err = client(&server)
        .file_cache()
        .upload(&CancellationToken::new(), &req)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(ref v) if v.has_field("file_name")));
    assert_eq!(mock.hits_async().await, 0);
}
