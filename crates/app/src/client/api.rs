//! HTTP client for the JSON API.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::client::{
    ClientError,
    models::{ErrorEnvelope, JobReport, LoginRequest, LoginResponse, StartJob, StartJobResponse},
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sign in and keep the issued bearer token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .post(self.base_url.join("auth/login")?)
            .json(&LoginRequest { email, password });

        let response: LoginResponse = send(request).await?;

        self.token = Some(response.token);

        Ok(())
    }

    pub async fn start_job(&self, job: &StartJob) -> Result<Uuid, ClientError> {
        let request = self
            .authorized(self.http.post(self.base_url.join("jobs")?))?
            .json(job);

        let response: StartJobResponse = send(request).await?;

        Ok(response.job_id)
    }

    pub async fn get_job(&self, job: Uuid) -> Result<JobReport, ClientError> {
        let request =
            self.authorized(self.http.get(self.base_url.join(&format!("jobs/{job}"))?))?;

        send(request).await
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotSignedIn)?;

        Ok(request.bearer_auth(token))
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }

    Err(api_error(response).await)
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();

    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            kind: envelope.error.kind,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            kind: "unknown".to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        },
    }
}
