use std::fmt::Formatter;

pub mod auth;
pub mod membership;
pub mod resource;

#[async_trait::async_trait]
pub trait Request {
    type Output;

    const URL_SUFFIX: &'static str;
    const METHOD: reqwest::Method = reqwest::Method::POST;

    fn make_req(&self, req: reqwest::RequestBuilder) -> anyhow::Result<reqwest::RequestBuilder>;

    async fn parse_res(&mut self, response: reqwest::Response) -> anyhow::Result<Self::Output>;
}

/// Error body the gateway attaches to non-success responses.
#[derive(serde::Deserialize, Debug)]
pub struct GatewayError {
    pub error: String,
    /// Set when the gateway wants the UI somewhere else, typically
    /// back to the login screen after a denial.
    #[serde(default)]
    pub redirect_to: Option<String>,

    #[serde(skip)]
    status_code: u16,
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code, self.error)
    }
}

impl std::error::Error for GatewayError {}

/// Calls a [`Request`] and return its output.
pub async fn call<T: Request>(
    mut req: T,
    cx: &crate::Context,
) -> anyhow::Result<<T as Request>::Output> {
    let response = req
        .make_req(
            cx.req_client
                .request(T::METHOD, format!("{}{}", cx.url_prefix, T::URL_SUFFIX)),
        )?
        .send()
        .await?;
    let status = response.status();

    if !status.is_success() {
        let mut thrown = response
            .json::<GatewayError>()
            .await
            .unwrap_or_else(|_| GatewayError {
                error: status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
                redirect_to: None,
                status_code: 0,
            });
        thrown.status_code = status.as_u16();
        return Err(anyhow::Error::new(thrown));
    }

    req.parse_res(response).await
}
