//! Wire implementation of [`Provider`] over the hosted service's REST
//! endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;

use tenderdesk_shared::membership::MembershipType;

use super::{
    AdminStatus, AdminUserRow, AuthSession, AuthUser, JoinedUserRow, Provider, ProviderError,
    StoredObject,
};
use crate::config;

pub struct Http {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl Http {
    pub fn new(config: &config::Service) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Deserialize a success body, or map the service's error body
    /// into a [`ProviderError::Service`].
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            return Err(service_error(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }
        response
            .json()
            .await
            .map_err(|err| ProviderError::Malformed(err.to_string()))
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(service_error(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ))
        }
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        name: &str,
        body: serde_json::Value,
        bearer: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .request(Method::POST, &format!("/rest/v1/rpc/{name}"), bearer)
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }
}

/// Extract the message the service reports in its error bodies.
fn service_error(status: u16, body: String) -> ProviderError {
    #[derive(serde::Deserialize)]
    struct Thrown {
        #[serde(alias = "message", alias = "error_description", alias = "msg")]
        error: String,
    }

    let message = serde_json::from_str::<Thrown>(&body)
        .map(|thrown| thrown.error)
        .unwrap_or(body);
    ProviderError::Service { status, message }
}

#[async_trait]
impl Provider for Http {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        let response = self
            .request(Method::POST, "/auth/v1/token?grant_type=password", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<String, ProviderError> {
        // the authorize endpoint is a browser redirect; hand the URL back
        Ok(format!(
            "{}/auth/v1/authorize?provider={provider}",
            self.base_url
        ))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), ProviderError> {
        let response = self
            .request(Method::POST, "/auth/v1/signup", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .request(Method::POST, "/auth/v1/logout", access_token)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let response = self
            .request(Method::GET, "/auth/v1/user", access_token)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, ProviderError> {
        let response = self
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        let response = self
            .request(Method::POST, "/auth/v1/recover", &self.anon_key)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        let response = self
            .request(Method::PUT, "/auth/v1/user", access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, ProviderError> {
        let Some(key) = self.service_role_key.as_deref() else {
            return Err(ProviderError::Service {
                status: 401,
                message: "service role key not configured".to_string(),
            });
        };

        #[derive(serde::Deserialize)]
        struct Listed {
            users: Vec<AuthUser>,
        }

        let response = self
            .client
            .get(format!("{}/auth/v1/admin/users", self.base_url))
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;
        Self::parse::<Listed>(response).await.map(|list| list.users)
    }

    async fn is_admin(&self, access_token: &str) -> Result<bool, ProviderError> {
        self.rpc("is_admin", json!({}), access_token).await
    }

    async fn admin_status(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<AdminStatus, ProviderError> {
        self.rpc(
            "get_admin_status",
            json!({ "user_id": user_id }),
            access_token,
        )
        .await
    }

    async fn users_with_admin_status(
        &self,
        access_token: &str,
    ) -> Result<Vec<JoinedUserRow>, ProviderError> {
        self.rpc("get_users_with_admin_status", json!({}), access_token)
            .await
    }

    async fn update_user_membership(
        &self,
        access_token: &str,
        user_id: &str,
        membership_type: MembershipType,
    ) -> Result<(), ProviderError> {
        let response = self
            .request(
                Method::POST,
                "/rest/v1/rpc/update_user_membership",
                access_token,
            )
            .json(&json!({
                "user_id": user_id,
                "membership_type": membership_type,
            }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn admin_user_by_id(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<AdminUserRow>, ProviderError> {
        let response = self
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/admin_users?select=id,email,is_admin,membership_type,membership_expiry&id=eq.{user_id}&limit=1"
                ),
                access_token,
            )
            .send()
            .await?;
        let rows: Vec<AdminUserRow> = Self::parse(response).await?;
        // zero rows is an answer, not an error
        Ok(rows.into_iter().next())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, ProviderError> {
        let response = self
            .request(
                Method::POST,
                &format!("/storage/v1/object/{bucket}/{key}"),
                access_token,
            )
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, "3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(StoredObject {
            path: key.to_string(),
        })
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }
}
