use bytes::BytesMut;
use micro_request::{HttpMessage, Request, UrlPolicy};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let template = match Request::builder()
        .uri("https://api.example.com/v1/search?q=rust#results")
        .header("Accept", "application/json")
        .header("User-Agent", "micro-request-demo")
        .build()
    {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, "failed to build template");
            return;
        }
    };

    for page in 1..=3 {
        let request = template.with_url(&format!("/v1/search?q=rust&page={page}")).expect("valid url");
        let mut head = BytesMut::new();
        if let Err(e) = request.encode_head(&mut head) {
            error!(cause = %e, "failed to encode request head");
            continue;
        }
        info!(uri = %request.absolute_uri().expect("template has a uri"), "request head:\n{}", String::from_utf8_lossy(&head));
    }

    // rejected: a url must not carry a scheme or authority
    if let Err(e) = template.with_url("https://evil.example.net/steal") {
        info!(cause = %e, "url rejected");
    }

    // unless asked to strip them
    let stripped = template.with_url_policy("https://evil.example.net/v1/other", UrlPolicy::Strip).expect("strippable url");
    info!(uri = %stripped.absolute_uri().expect("template has a uri"), "stripped foreign origin");

    if let Err(e) = stripped.with_method("GE T") {
        info!(value = e.value(), reason = e.reason(), "method rejected");
    }
}
