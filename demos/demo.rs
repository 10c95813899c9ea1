//! Sends one HTML email and uploads a file, using credentials from the
//! environment (`ZEPTO_MAIL_AGENT`, `ZEPTO_MAIL_TOKEN`, `ZEPTO_MAIL_MGMT_TOKEN`).
//!
//! ```sh
//! ZEPTO_MAIL_TOKEN=... cargo run --example demo -- sender@example.com receiver@example.com
//! ```

use tokio_util::sync::CancellationToken;
use zeptomail_client::{
    BaseEmailOption, BaseSendEmail, ClientBuilder, EmailAddress, EmailAttachment,
    FileCacheUploadReq, SendHtmlEmailReq,
};

#[tokio::main]
async fn main() -> Result<(), zeptomail_client::Error> {
    let mut args = std::env::args().skip(1);
    let (Some(from), Some(to)) = (args.next(), args.next()) else {
        eprintln!("usage: demo <from-address> <to-address>");
        std::process::exit(2);
    };

    let zepto = ClientBuilder::from_env().build()?;
    let cancel = CancellationToken::new();

    let upload = zepto
        .file_cache()
        .upload(&cancel, &FileCacheUploadReq::new("hello.txt", "Hello from the file cache\n"))
        .await?;
    println!("upload: {} {}", upload.status(), upload.raw_response.text());

    let req = SendHtmlEmailReq {
        base: BaseSendEmail {
            from: EmailAddress::from(from.as_str()),
            to: vec![EmailAddress::from(to.as_str()).into()],
            ..Default::default()
        },
        options: BaseEmailOption {
            attachments: vec![EmailAttachment::from_file_cache(
                upload.data.file_cache_key,
                "hello.txt",
            )],
            ..Default::default()
        },
        subject: "zeptomail-client demo".into(),
        html_body: "<p>It works.</p>".into(),
        ..Default::default()
    };

    let rv = zepto.email().send_html_email(&cancel, &req).await?;
    match &rv.data.error {
        None => println!("sent: request_id={}", rv.data.request_id),
        Some(err) => println!("rejected ({}): {} {}", rv.status(), err.code, err.message),
    }
    Ok(())
}
