use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, multipart};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::application::remote::{
    ImageAttachment, RemoteBlogApi, RemoteBlogRecord, RemoteError, RemotePostFields,
};
use crate::infra::error::InfraError;

/// reqwest-backed client for the remote blog service.
///
/// One attempt per call, fixed timeout, no retries. Failures come back as
/// [`RemoteError`] values; nothing from the transport layer escapes as a
/// panic or an unhandled error type.
#[derive(Clone, Debug)]
pub struct RemoteBlogClient {
    http: Client,
    base: Url,
    data_timeout: Duration,
    stat_timeout: Duration,
}

/// Listings arrive either enveloped or bare depending on the deployment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Envelope { results: Vec<RemoteBlogRecord> },
    Bare(Vec<RemoteBlogRecord>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountBody {
    Envelope { count: u64 },
    Bare(u64),
}

impl RemoteBlogClient {
    pub fn new(
        base_url: &Url,
        data_timeout: Duration,
        stat_timeout: Duration,
    ) -> Result<Self, InfraError> {
        let base = base_url
            .join("/")
            .map_err(|err| InfraError::configuration(format!("invalid remote base URL: {err}")))?;
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            base,
            data_timeout,
            stat_timeout,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("foglio/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|err| RemoteError::Transport(format!("invalid request URL: {err}")))
    }

    fn transport(err: reqwest::Error) -> RemoteError {
        RemoteError::Transport(err.to_string())
    }

    /// Attach the post payload either as a plain form or, when an image is
    /// present, as a multipart body with the image as a binary part.
    fn payload(
        request: RequestBuilder,
        fields: &RemotePostFields,
        image: Option<&ImageAttachment>,
    ) -> Result<RequestBuilder, RemoteError> {
        match image {
            Some(image) => {
                let mut form = multipart::Form::new();
                for (key, value) in fields.as_form_pairs() {
                    form = form.text(key, value);
                }
                let part = multipart::Part::bytes(image.bytes.to_vec())
                    .file_name(image.filename.clone())
                    .mime_str(&image.content_type)
                    .map_err(|err| {
                        RemoteError::Malformed(format!("invalid image content type: {err}"))
                    })?;
                Ok(request.multipart(form.part("image", part)))
            }
            None => Ok(request.form(&fields.as_form_pairs())),
        }
    }

    async fn scan_listing(&self, slug: &str) -> Result<Option<RemoteBlogRecord>, RemoteError> {
        let records = self.list().await?;
        Ok(records.into_iter().find(|record| record.slug == slug))
    }
}

#[async_trait]
impl RemoteBlogApi for RemoteBlogClient {
    async fn create(
        &self,
        fields: &RemotePostFields,
        image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError> {
        let url = self.url("blogs/")?;
        let request = self.http.post(url).timeout(self.data_timeout);
        let response = Self::payload(request, fields, image)?
            .send()
            .await
            .map_err(Self::transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                debug!(status = status.as_u16(), body, "remote create rejected");
                Err(RemoteError::Rejected {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn list(&self) -> Result<Vec<RemoteBlogRecord>, RemoteError> {
        let url = self.url("blogs/")?;
        let response = self
            .http
            .get(url)
            .timeout(self.data_timeout)
            .send()
            .await
            .map_err(Self::transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "remote listing rejected");
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(Self::transport)?;
        let body: ListBody = serde_json::from_slice(&bytes)
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;

        Ok(match body {
            ListBody::Envelope { results } => results,
            ListBody::Bare(records) => records,
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<RemoteBlogRecord>, RemoteError> {
        let url = self.url(&format!("blogs/slug/{slug}/"))?;
        match self.http.get(url).timeout(self.data_timeout).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                let record = response
                    .json::<RemoteBlogRecord>()
                    .await
                    .map_err(|err| RemoteError::Malformed(err.to_string()))?;
                Ok(Some(record))
            }
            // The slug endpoint is not guaranteed to exist on every
            // deployment; scan the full listing instead.
            Ok(response) => {
                debug!(
                    status = response.status().as_u16(),
                    slug, "direct slug lookup unavailable, scanning listing"
                );
                self.scan_listing(slug).await
            }
            Err(err) => {
                debug!(error = %err, slug, "direct slug lookup failed, scanning listing");
                self.scan_listing(slug).await
            }
        }
    }

    async fn update(
        &self,
        id: i64,
        fields: &RemotePostFields,
        image: Option<&ImageAttachment>,
    ) -> Result<(), RemoteError> {
        let url = self.url(&format!("blogs/{id}/"))?;
        let request = self.http.put(url).timeout(self.data_timeout);
        let response = Self::payload(request, fields, image)?
            .send()
            .await
            .map_err(Self::transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => {
                debug!(status = status.as_u16(), id, "remote update rejected");
                Err(RemoteError::Rejected {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        let url = self.url(&format!("blogs/{id}/"))?;
        let response = self
            .http
            .delete(url)
            .timeout(self.data_timeout)
            .send()
            .await
            .map_err(Self::transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => {
                debug!(status = status.as_u16(), id, "remote delete rejected");
                Err(RemoteError::Rejected {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn count(&self) -> Result<u64, RemoteError> {
        let url = self.url("blogs/count/")?;
        let response = self
            .http
            .get(url)
            .timeout(self.stat_timeout)
            .send()
            .await
            .map_err(Self::transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(Self::transport)?;
        let body: CountBody = serde_json::from_slice(&bytes)
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;

        Ok(match body {
            CountBody::Envelope { count } => count,
            CountBody::Bare(count) => count,
        })
    }
}
