use std::fmt;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use content_sync::{
    Authorization, ContentProvider, GroupId, Locale, ObjectKind, ProviderError, RemoteObject,
    RemotePage, UpdatePayload, UpdateStatus,
};

use crate::region::Region;
use crate::wire::{
    ApiError, Attribution, ContentBlockResponse, ContentBlockUpsertBody, EmailUpsertBody,
    ListResponse,
};

const ACCOUNT_HEADER: &str = "X-CleverTap-Account-Id";
const PASSCODE_HEADER: &str = "X-CleverTap-Passcode";

/// Statuses a GET is retried on.
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Configuration for a CleverTap account.
#[derive(Clone)]
pub struct ClevertapConfig {
    pub account_id: String,
    pub passcode: String,
    pub region: Region,
    /// Overrides the region host, for tests and proxies.
    pub api_base_url: Option<String>,
    /// Partner name sent when checking credentials.
    pub partner: String,
    /// Identity published variants are attributed to.
    pub partner_email: String,
    /// Locales offered for translation. The remote has no locale listing.
    pub locales: Vec<Locale>,
}

impl ClevertapConfig {
    pub fn new(account_id: impl Into<String>, passcode: impl Into<String>, region: Region) -> Self {
        Self {
            account_id: account_id.into(),
            passcode: passcode.into(),
            region,
            api_base_url: None,
            partner: "lokalise".into(),
            partner_email: "lokalise@clevertap.com".into(),
            locales: Vec::new(),
        }
    }
}

impl fmt::Debug for ClevertapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClevertapConfig")
            .field("account_id", &self.account_id)
            .field("passcode", &"<redacted>")
            .field("region", &self.region)
            .field("api_base_url", &self.api_base_url)
            .field("partner", &self.partner)
            .field("locales", &self.locales.len())
            .finish()
    }
}

/// Reads and writes templates and content blocks of one CleverTap account.
pub struct ClevertapClient {
    config: ClevertapConfig,
    base_url: String,
    client: reqwest::Client,
}

impl ClevertapClient {
    pub fn new(config: ClevertapConfig) -> Result<Self, ProviderError> {
        if config.account_id.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "account id must not be empty".into(),
            ));
        }

        let base_url = config
            .api_base_url
            .as_deref()
            .unwrap_or(config.region.host())
            .trim_end_matches('/')
            .to_owned();
        tracing::debug!(region = %config.region, %base_url, "using CleverTap host");

        Ok(Self {
            config,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }

    /// Build a URL with percent-encoded query parameters.
    fn url_with_query(&self, path: &str, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        Url::parse_with_params(&self.url(path), params)
            .map(String::from)
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid URL for {path}: {e}")))
    }

    fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCOUNT_HEADER, &self.config.account_id)
            .header(PASSCODE_HEADER, &self.config.passcode)
            .header("content-type", "application/json")
    }

    fn attribution(&self) -> Attribution<'_> {
        Attribution {
            partner: &self.config.partner_email,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, request: &str) -> Result<T, ProviderError> {
        let mut attempt = 1;
        loop {
            let response = self
                .build_request(Method::GET, url)
                .send()
                .await
                .map_err(|e| ProviderError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            if RETRY_STATUSES.contains(&status) && attempt < MAX_ATTEMPTS {
                tracing::debug!(request, status, attempt, "retrying request");
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
                continue;
            }

            return read_response(response, request).await;
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        request: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .build_request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        read_response(response, request).await
    }
}

async fn read_response<T: DeserializeOwned>(
    response: Response,
    request: &str,
) -> Result<T, ProviderError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized {
            request: request.to_owned(),
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .ok()
            .and_then(|error| error.msg);
        return Err(ProviderError::Status {
            status: status.as_u16(),
            request: request.to_owned(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(format!("{request}: {e}")))
}

#[async_trait::async_trait]
impl ContentProvider for ClevertapClient {
    fn label(&self) -> &str {
        "clevertap"
    }

    async fn authorize(&self) -> Result<Authorization, ProviderError> {
        let url = self.url_with_query("/v1/connect", &[("partner", self.config.partner.as_str())])?;
        self.get(&url, "authorizeCredentials").await
    }

    async fn list_page(
        &self,
        kind: ObjectKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<RemotePage, ProviderError> {
        let (path, request) = match kind {
            ObjectKind::Email => ("/v1/email/templates/localise/", "getEmailTemplates"),
            ObjectKind::ContentBlock => ("/v1/contentBlock/localise/list", "getContentBlocks"),
        };
        let page_number = page_number.to_string();
        let page_size = page_size.to_string();
        let url = self.url_with_query(
            path,
            &[("pageNumber", page_number.as_str()), ("pageSize", page_size.as_str())],
        )?;

        let response: ListResponse = self.get(&url, request).await?;
        Ok(RemotePage {
            total: response.total,
            objects: response.into_objects(),
        })
    }

    async fn fetch_by_group_id(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        locale: Option<&str>,
    ) -> Result<RemoteObject, ProviderError> {
        // Reads always return the base object; locale variants are write-only.
        tracing::trace!(%group_id, %kind, ?locale, "fetching object");

        match kind {
            ObjectKind::Email => {
                let url = self.url_with_query(
                    "/v1/email/templates/localise",
                    &[("templateId", group_id.as_str())],
                )?;
                self.get(&url, "getEmailTemplateById").await
            }
            ObjectKind::ContentBlock => {
                let url = self.url_with_query(
                    "/v1/contentBlock/localise/list",
                    &[("templateId", group_id.as_str())],
                )?;
                let response: ContentBlockResponse = self.get(&url, "getContentBlockById").await?;
                response
                    .into_object(group_id)
                    .ok_or_else(|| ProviderError::Status {
                        status: 404,
                        request: "getContentBlockById".into(),
                        message: Some(format!("content block {group_id} not found")),
                    })
            }
        }
    }

    async fn update_group_locale(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        payload: &UpdatePayload,
    ) -> Result<UpdateStatus, ProviderError> {
        tracing::debug!(%group_id, %kind, locale = %payload.locale, "upserting locale variant");

        match kind {
            ObjectKind::Email => {
                let body = EmailUpsertBody::new(group_id, payload, self.attribution());
                let url = self.url("/v1/email/templates/localise/upsert");
                self.post(&url, &body, "updateEmailTemplate").await
            }
            ObjectKind::ContentBlock => {
                let body = ContentBlockUpsertBody::new(group_id, payload, self.attribution());
                let url = self.url("/v1/contentBlock/localise/upsert");
                self.post(&url, &body, "updateContentBlock").await
            }
        }
    }

    async fn list_locales(&self) -> Result<Vec<Locale>, ProviderError> {
        Ok(self.config.locales.clone())
    }
}
