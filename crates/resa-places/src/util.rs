/// HTTP client with compressed responses enabled, shared by every outbound call.
pub fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .gzip(true)
        .brotli(true)
        .build()
        .unwrap_or_default()
}
