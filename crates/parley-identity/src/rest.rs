//! HTTP client for a hosted auth + Postgres-REST backend.
//!
//! Auth endpoints (`/auth/v1/...`) follow the GoTrue wire format; profile
//! rows are read and written through the `/rest/v1/profiles` table endpoint.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::provider::IdentityProvider;
use crate::session::SessionCell;
use crate::types::{
    AuthEvent, AuthSession, NewProfile, Profile, SessionChange, SignUpAttributes, SignUpOutcome,
    User,
};
use crate::{IdentityError, Result};

// ─── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: WireMetadata,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    expires_at: Option<i64>,
    user: WireUser,
}

/// Sign-up answers with a session when no confirmation is required, or with
/// the bare user object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireSignUp {
    Session(WireSession),
    User(WireUser),
}

#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl WireError {
    fn into_message(self, status: reqwest::StatusCode) -> String {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

impl From<WireUser> for User {
    fn from(w: WireUser) -> Self {
        User {
            id: w.id,
            email: w.email.unwrap_or_default(),
            display_name: w.user_metadata.display_name.filter(|s| !s.is_empty()),
            phone: w.user_metadata.phone.filter(|s| !s.is_empty()),
            created_at: w.created_at,
        }
    }
}

impl From<WireSession> for AuthSession {
    fn from(w: WireSession) -> Self {
        AuthSession {
            access_token: w.access_token,
            refresh_token: w.refresh_token,
            expires_at: w
                .expires_at
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            user: w.user.into(),
        }
    }
}

// ─── RestIdentityProvider ─────────────────────────────────────────────────

pub struct RestIdentityProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    session: SessionCell,
}

impl RestIdentityProvider {
    /// `base_url` is the project URL without a trailing path, e.g.
    /// `https://abc.example.co`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(IdentityError::NotConfigured("base url is empty".into()));
        }
        Ok(RestIdentityProvider {
            base_url,
            api_key,
            client: Client::new(),
            session: SessionCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the project key, and a bearer token: the user's when signed
    /// in, else the project key itself.
    async fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let mut req = req;
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }
        let bearer = match self.session.get().await {
            Some(s) => Some(s.access_token),
            None => self.api_key.clone(),
        };
        match bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read_body(resp: Response) -> Result<std::result::Result<String, String>> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(Ok(body));
        }
        let wire: WireError = serde_json::from_str(&body).unwrap_or_default();
        Ok(Err(wire.into_message(status)))
    }

    fn decode<T: for<'de> Deserialize<'de>>(body: String) -> Result<T> {
        serde_json::from_str(&body).map_err(|source| IdentityError::Decode { body, source })
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome> {
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "data": {
                "display_name": attributes.display_name,
                "phone": attributes.phone,
            },
        });
        let req = self.client.post(self.url("/auth/v1/signup")).json(&payload);
        let resp = self.authorize(req).await.send().await?;
        let body = Self::read_body(resp).await?.map_err(IdentityError::Auth)?;

        match Self::decode::<WireSignUp>(body)? {
            WireSignUp::Session(wire) => {
                let session: AuthSession = wire.into();
                self.session.set(session.clone(), AuthEvent::SignedIn).await;
                Ok(SignUpOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                })
            }
            WireSignUp::User(user) => Ok(SignUpOutcome {
                user: Some(user.into()),
                session: None,
            }),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let req = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&payload);
        let resp = self.authorize(req).await.send().await?;
        let body = Self::read_body(resp).await?.map_err(IdentityError::Auth)?;
        let session: AuthSession = Self::decode::<WireSession>(body)?.into();
        self.session.set(session.clone(), AuthEvent::SignedIn).await;
        Ok(session)
    }

    async fn sign_in_with_otp(&self, email: &str) -> Result<()> {
        let payload = serde_json::json!({ "email": email, "create_user": true });
        let req = self.client.post(self.url("/auth/v1/otp")).json(&payload);
        let resp = self.authorize(req).await.send().await?;
        Self::read_body(resp).await?.map_err(IdentityError::Auth)?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        if self.session.get().await.is_none() {
            return Ok(());
        }
        let req = self.client.post(self.url("/auth/v1/logout"));
        match self.authorize(req).await.send().await {
            Ok(resp) if !resp.status().is_success() => {
                warn!(
                    status = %resp.status(),
                    "identity: remote logout rejected; clearing local session"
                );
            }
            Err(e) => {
                warn!(error = %e, "identity: remote logout failed; clearing local session");
            }
            Ok(_) => {}
        }
        self.session.clear().await;
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.session.get().await
    }

    async fn refresh_session(&self) -> Result<AuthSession> {
        let refresh_token = self
            .session
            .get()
            .await
            .and_then(|s| s.refresh_token)
            .ok_or_else(|| IdentityError::Auth("no active session".into()))?;
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let req = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&payload);
        let resp = self.authorize(req).await.send().await?;
        let body = Self::read_body(resp).await?.map_err(IdentityError::Auth)?;
        let session: AuthSession = Self::decode::<WireSession>(body)?.into();
        self.session
            .set(session.clone(), AuthEvent::TokenRefreshed)
            .await;
        debug!(user_id = %session.user.id, "identity: access token refreshed");
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.session.subscribe()
    }

    async fn insert_profile(&self, user_id: &str, profile: NewProfile) -> Result<()> {
        let row = serde_json::json!([{ "id": user_id, "isPremium": profile.is_premium }]);
        let req = self
            .client
            .post(self.url("/rest/v1/profiles"))
            .header("Prefer", "return=minimal")
            .json(&row);
        let resp = self.authorize(req).await.send().await?;
        Self::read_body(resp)
            .await?
            .map_err(IdentityError::ProfileWrite)?;
        debug!(user_id, "identity: profile row inserted");
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let filter = format!("eq.{user_id}");
        let req = self
            .client
            .get(self.url("/rest/v1/profiles"))
            .query(&[("id", filter.as_str()), ("select", "*")]);
        let resp = self.authorize(req).await.send().await?;
        let body = Self::read_body(resp).await?.map_err(IdentityError::Auth)?;
        let rows: Vec<Profile> = Self::decode(body)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| IdentityError::ProfileNotFound(user_id.to_string()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SESSION_BODY: &str = r#"{
        "access_token": "tok-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1767225600,
        "refresh_token": "ref-1",
        "user": {
            "id": "user-1",
            "email": "ada@example.com",
            "user_metadata": { "display_name": "Ada", "phone": "" },
            "created_at": "2026-01-01T00:00:00Z"
        }
    }"#;

    fn provider(server: &mockito::ServerGuard) -> RestIdentityProvider {
        RestIdentityProvider::new(server.url(), Some("anon-key".into())).unwrap()
    }

    #[test]
    fn empty_base_url_is_not_configured() {
        assert!(matches!(
            RestIdentityProvider::new("", None),
            Err(IdentityError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn password_sign_in_stores_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .match_header("apikey", "anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SESSION_BODY)
            .create_async()
            .await;

        let p = provider(&server);
        let mut rx = p.subscribe();
        let session = p
            .sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.access_token, "tok-1");
        assert_eq!(session.user.display_name.as_deref(), Some("Ada"));
        assert_eq!(session.user.phone, None);
        assert_eq!(session.expires_at.unwrap().timestamp(), 1_767_225_600);
        assert_eq!(p.current_session().await, Some(session));
        assert_eq!(rx.recv().await.unwrap().event, AuthEvent::SignedIn);
    }

    #[tokio::test]
    async fn auth_error_message_is_propagated_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
            )
            .create_async()
            .await;

        let err = provider(&server)
            .sign_in_with_password("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Auth(ref m) if m == "Invalid login credentials"));
    }

    #[tokio::test]
    async fn sign_up_returning_bare_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "email": "ada@example.com",
                "data": { "display_name": "Ada" }
            })))
            .with_status(200)
            .with_body(
                r#"{"id":"user-1","email":"ada@example.com","user_metadata":{}}"#,
            )
            .create_async()
            .await;

        let p = provider(&server);
        let outcome = p
            .sign_up(
                "ada@example.com",
                "hunter22",
                SignUpAttributes {
                    display_name: "Ada".into(),
                    phone: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.user.unwrap().id, "user-1");
        assert!(outcome.session.is_none());
        assert!(p.current_session().await.is_none());
    }

    #[tokio::test]
    async fn sign_up_returning_session_signs_in() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;

        let p = provider(&server);
        let outcome = p
            .sign_up("ada@example.com", "hunter22", SignUpAttributes::default())
            .await
            .unwrap();
        assert!(outcome.session.is_some());
        assert!(p.current_session().await.is_some());
    }

    #[tokio::test]
    async fn sign_up_rejection_uses_msg_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(422)
            .with_body(r#"{"code":422,"msg":"User already registered"}"#)
            .create_async()
            .await;

        let err = provider(&server)
            .sign_up("ada@example.com", "hunter22", SignUpAttributes::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn otp_posts_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/otp")
            .match_body(Matcher::PartialJson(
                serde_json::json!({ "email": "ada@example.com" }),
            ))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        provider(&server)
            .sign_in_with_otp("ada@example.com")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sign_out_clears_even_when_remote_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;
        server
            .mock("POST", "/auth/v1/logout")
            .match_header("authorization", "Bearer tok-1")
            .with_status(500)
            .create_async()
            .await;

        let p = provider(&server);
        p.sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap();
        p.sign_out().await.unwrap();
        assert!(p.current_session().await.is_none());
    }

    #[tokio::test]
    async fn refresh_exchanges_refresh_token() {
        let refreshed_body = SESSION_BODY
            .replace("tok-1", "tok-2")
            .replace("ref-1", "ref-2");
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .with_status(200)
            .with_body(SESSION_BODY)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .match_body(Matcher::Json(
                serde_json::json!({ "refresh_token": "ref-1" }),
            ))
            .with_status(200)
            .with_body(refreshed_body)
            .create_async()
            .await;

        let p = provider(&server);
        p.sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap();
        let mut rx = p.subscribe();
        let session = p.refresh_session().await.unwrap();

        refresh.assert_async().await;
        assert_eq!(session.access_token, "tok-2");
        assert_eq!(session.refresh_token.as_deref(), Some("ref-2"));
        assert_eq!(p.current_session().await, Some(session));
        assert_eq!(rx.recv().await.unwrap().event, AuthEvent::TokenRefreshed);
    }

    #[tokio::test]
    async fn refresh_without_session_is_auth_error() {
        let server = mockito::Server::new_async().await;
        let err = provider(&server).refresh_session().await.unwrap_err();
        assert!(matches!(err, IdentityError::Auth(_)));
    }

    #[tokio::test]
    async fn profile_insert_failure_is_profile_write_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/profiles")
            .with_status(409)
            .with_body(
                r#"{"message":"duplicate key value violates unique constraint"}"#,
            )
            .create_async()
            .await;

        let err = provider(&server)
            .insert_profile("user-1", NewProfile { is_premium: false })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::ProfileWrite(ref m) if m.contains("duplicate key")));
    }

    #[tokio::test]
    async fn profile_insert_sends_camel_case_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/profiles")
            .match_header("prefer", "return=minimal")
            .match_body(Matcher::Json(
                serde_json::json!([{ "id": "user-1", "isPremium": false }]),
            ))
            .with_status(201)
            .create_async()
            .await;

        provider(&server)
            .insert_profile("user-1", NewProfile { is_premium: false })
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_profile_found_and_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.user-1".into()))
            .with_status(200)
            .with_body(r#"[{"id":"user-1","isPremium":true}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.user-2".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let p = provider(&server);
        assert!(p.get_profile("user-1").await.unwrap().is_premium);
        assert!(matches!(
            p.get_profile("user-2").await.unwrap_err(),
            IdentityError::ProfileNotFound(_)
        ));
    }
}
