//! HTTP plumbing for the Keep service.
//!
//! Two endpoints are used: the Google auth endpoint, which trades the
//! long-lived master token for a short-lived OAuth token, and the notes
//! `changes` endpoint, which both uploads dirty nodes and downloads
//! everything that changed since a given version.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::node::{format_timestamp, Node};
use crate::error::MoverError;
use crate::secrets::Secret;

pub const DEFAULT_AUTH_URL: &str = "https://android.clients.google.com/auth";
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/notes/v1/";

const OAUTH_SERVICE: &str =
    "oauth2:https://www.googleapis.com/auth/memento https://www.googleapis.com/auth/reminders";
const KEEP_APP: &str = "com.google.android.keep";
const KEEP_CLIENT_SIG: &str = "38918a453d07199354f8b19af05ec6562ced5788";
const AUTH_USER_AGENT: &str = "GoogleAuth/1.4";
const API_USER_AGENT: &str = concat!("tickmove/", env!("CARGO_PKG_VERSION"));

/// Capabilities the service expects an Android client to announce.
const CAPABILITIES: [&str; 11] = [
    "NC", "PI", "LB", "AN", "SH", "DR", "TR", "IN", "SNB", "MI", "CO",
];

/// Endpoints and device identity used when talking to the service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_url: String,
    pub android_id: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        let (high, _) = uuid::Uuid::new_v4().as_u64_pair();
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            android_id: format!("{high:016x}"),
        }
    }
}

/// One page of the `changes` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesPage {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub to_version: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub force_full_resync: bool,
    #[serde(default)]
    pub upgrade_recommended: bool,
}

/// Authenticated client for the notes API.
pub struct KeepApi {
    http: reqwest::Client,
    endpoints: Endpoints,
    email: String,
    master_token: Secret,
    oauth_token: String,
    session_id: String,
}

impl KeepApi {
    /// Exchange the master token and return a ready client.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Authentication` if the service rejects the
    /// master token and `MoverError::Network` if it cannot be reached.
    pub async fn login(
        http: reqwest::Client,
        endpoints: Endpoints,
        email: &str,
        master_token: &Secret,
    ) -> Result<Self, MoverError> {
        let oauth_token = exchange_token(&http, &endpoints, email, master_token).await?;
        let now = Utc::now();
        let (random, _) = uuid::Uuid::new_v4().as_u64_pair();

        Ok(Self {
            http,
            endpoints,
            email: email.to_string(),
            master_token: master_token.clone(),
            oauth_token,
            session_id: format!("s--{}--{:010}", now.timestamp_millis(), random % 10_000_000_000),
        })
    }

    /// Send `nodes` and fetch one page of changes after `target_version`.
    ///
    /// An expired OAuth token is re-exchanged once.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Network` for connection failures, throttling and
    /// server errors, `MoverError::Authentication` if the token cannot be
    /// renewed, and `MoverError::Remote` for any other rejection.
    pub async fn changes(
        &mut self,
        nodes: &[Node],
        target_version: Option<&str>,
    ) -> Result<ChangesPage, MoverError> {
        let body = self.changes_body(nodes, target_version);

        let mut response = self.post_changes(&body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("OAuth token expired, exchanging master token again");
            self.oauth_token =
                exchange_token(&self.http, &self.endpoints, &self.email, &self.master_token)
                    .await?;
            response = self.post_changes(&body).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MoverError::Authentication(
                "notes API rejected a freshly issued token".to_string(),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(MoverError::Network(format!("notes API returned {status}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MoverError::Remote(format!(
                "notes API returned {status}: {}",
                text.trim()
            )));
        }

        let page: ChangesPage = response.json().await?;
        if page.upgrade_recommended {
            tracing::warn!("notes API recommends a client upgrade");
        }
        Ok(page)
    }

    fn changes_body(&self, nodes: &[Node], target_version: Option<&str>) -> serde_json::Value {
        let capabilities: Vec<_> = CAPABILITIES.iter().map(|c| json!({ "type": c })).collect();
        let mut body = json!({
            "nodes": nodes,
            "clientTimestamp": format_timestamp(Utc::now()),
            "requestHeader": {
                "clientSessionId": self.session_id,
                "clientPlatform": "ANDROID",
                "clientVersion": {
                    "major": "9",
                    "minor": "9",
                    "build": "9",
                    "revision": "9"
                },
                "capabilities": capabilities,
            },
        });
        if let Some(version) = target_version {
            body["targetVersion"] = json!(version);
        }
        body
    }

    async fn post_changes(&self, body: &serde_json::Value) -> Result<reqwest::Response, MoverError> {
        let url = format!("{}changes", self.endpoints.api_url);
        Ok(self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("OAuth {}", self.oauth_token))
            .header(USER_AGENT, API_USER_AGENT)
            .json(body)
            .send()
            .await?)
    }
}

/// Trade the master token for an OAuth token.
async fn exchange_token(
    http: &reqwest::Client,
    endpoints: &Endpoints,
    email: &str,
    master_token: &Secret,
) -> Result<String, MoverError> {
    let form = [
        ("accountType", "HOSTED_OR_GOOGLE"),
        ("Email", email),
        ("has_permission", "1"),
        ("EncryptedPasswd", master_token.expose()),
        ("service", OAUTH_SERVICE),
        ("source", "android"),
        ("androidId", endpoints.android_id.as_str()),
        ("app", KEEP_APP),
        ("client_sig", KEEP_CLIENT_SIG),
        ("device_country", "us"),
        ("operatorCountry", "us"),
        ("lang", "en"),
        ("sdk_version", "17"),
    ];

    let response = http
        .post(&endpoints.auth_url)
        .header(USER_AGENT, AUTH_USER_AGENT)
        .form(&form)
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await?;
    let fields = parse_auth_response(&text);

    if let Some(token) = fields.get("Auth") {
        return Ok((*token).to_string());
    }
    if status.is_server_error() {
        return Err(MoverError::Network(format!("auth endpoint returned {status}")));
    }
    match fields.get("Error") {
        Some(reason) => Err(MoverError::Authentication(format!(
            "{email} rejected by the auth endpoint: {reason}"
        ))),
        None => Err(MoverError::Authentication(format!(
            "auth endpoint returned {status} without a token"
        ))),
    }
}

/// Parse the `key=value` lines the auth endpoint answers with.
fn parse_auth_response(text: &str) -> HashMap<&str, &str> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let fields = parse_auth_response("SID=abc\nLSID=def\nAuth=ya29.token==\nExpiry=0\n");
        assert_eq!(fields.get("Auth"), Some(&"ya29.token=="));
        assert_eq!(fields.get("SID"), Some(&"abc"));
    }

    #[test]
    fn test_parse_auth_error() {
        let fields = parse_auth_response("Error=BadAuthentication\n");
        assert_eq!(fields.get("Error"), Some(&"BadAuthentication"));
        assert!(!fields.contains_key("Auth"));
    }

    #[test]
    fn test_changes_page_defaults() {
        let page: ChangesPage = serde_json::from_str(r#"{"toVersion":"7"}"#).unwrap();
        assert!(page.nodes.is_empty());
        assert!(!page.truncated);
        assert_eq!(page.to_version.as_deref(), Some("7"));
    }
}
