use std::path::Path;

use reqwest::{RequestBuilder, Response};

pub struct Upload {
    pub token: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(serde::Deserialize, Debug)]
pub struct Uploaded {
    pub path: String,
    pub public_url: String,
}

impl Upload {
    /// Read a file from disk into an upload request.
    pub async fn from_file(
        token: String,
        path: &Path,
        content_type: String,
    ) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self {
            token,
            filename,
            content_type,
            bytes,
        })
    }
}

#[async_trait::async_trait]
impl super::Request for Upload {
    type Output = Uploaded;
    const URL_SUFFIX: &'static str = "/api/resource/upload";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .query(&[("filename", &self.filename)])
            .header("Token", &self.token)
            .header(reqwest::header::CONTENT_TYPE, &self.content_type)
            .body(self.bytes.clone()))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}
