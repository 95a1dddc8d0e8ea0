pub mod reqwest;

#[derive(Debug, Clone)]
pub struct CrossPlatformHttpClient {
    client: ::reqwest::Client,
}
