use crate::app_config::AppConfig;
use reqwest::Client;
use thiserror::Error;

pub fn new_client(config: &AppConfig) -> Result<Client, HttpClientError> {
    let client = Client::builder()
        .timeout(config.http().timeout())
        .user_agent(config.http().user_agent())
        .build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum HttpClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
