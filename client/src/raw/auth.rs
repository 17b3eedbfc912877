use reqwest::{RequestBuilder, Response};

use tenderdesk_shared::auth::{
    CheckResult, ForgotPasswordDescriptor, IdentityResult, LoginDescriptor, LoginResult,
    OAuthCallbackDescriptor, RedirectResult, RegisterDescriptor, Role, UpdatePasswordDescriptor,
};

pub struct Login {
    pub email: String,
    pub password: String,
    pub provider: Option<String>,
}

#[async_trait::async_trait]
impl super::Request for Login {
    type Output = LoginResult;
    const URL_SUFFIX: &'static str = "/api/auth/login";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&LoginDescriptor {
            email: self.email.clone(),
            password: self.password.clone(),
            provider: self.provider.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

/// Hands the tokens from a provider redirect to the gateway.
pub struct OAuthCallback {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
}

#[async_trait::async_trait]
impl super::Request for OAuthCallback {
    type Output = LoginResult;
    const URL_SUFFIX: &'static str = "/api/auth/callback";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&OAuthCallbackDescriptor {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_in: self.expires_in,
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct Check {
    pub token: String,
}

#[async_trait::async_trait]
impl super::Request for Check {
    type Output = CheckResult;
    const URL_SUFFIX: &'static str = "/api/auth/check";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.header("Token", &self.token))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct Logout {
    pub token: String,
}

#[async_trait::async_trait]
impl super::Request for Logout {
    type Output = RedirectResult;
    const URL_SUFFIX: &'static str = "/api/auth/logout";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.header("Token", &self.token))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct Register {
    pub email: String,
    pub password: String,
}

#[async_trait::async_trait]
impl super::Request for Register {
    type Output = RedirectResult;
    const URL_SUFFIX: &'static str = "/api/auth/register";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&RegisterDescriptor {
            email: self.email.clone(),
            password: self.password.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct ForgotPassword {
    pub email: String,
}

#[async_trait::async_trait]
impl super::Request for ForgotPassword {
    type Output = RedirectResult;
    const URL_SUFFIX: &'static str = "/api/auth/forgot-password";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&ForgotPasswordDescriptor {
            email: self.email.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct UpdatePassword {
    pub token: String,
    pub password: String,
}

#[async_trait::async_trait]
impl super::Request for UpdatePassword {
    type Output = RedirectResult;
    const URL_SUFFIX: &'static str = "/api/auth/update-password";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.header("Token", &self.token).json(&UpdatePasswordDescriptor {
            password: self.password.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct Permissions {
    pub token: Option<String>,
}

#[async_trait::async_trait]
impl super::Request for Permissions {
    type Output = Vec<Role>;
    const URL_SUFFIX: &'static str = "/api/auth/permissions";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(match &self.token {
            Some(token) => req.header("Token", token),
            None => req,
        })
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct Identity {
    pub token: Option<String>,
}

#[async_trait::async_trait]
impl super::Request for Identity {
    type Output = Option<IdentityResult>;
    const URL_SUFFIX: &'static str = "/api/auth/identity";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(match &self.token {
            Some(token) => req.header("Token", token),
            None => req,
        })
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}
