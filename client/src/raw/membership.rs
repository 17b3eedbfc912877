use reqwest::{RequestBuilder, Response};

use tenderdesk_shared::membership::{
    MembershipType, UpdateMembershipDescriptor, UserRow, UsersResult,
};

pub struct ListUsers {
    pub token: String,
}

#[async_trait::async_trait]
impl super::Request for ListUsers {
    type Output = Vec<UserRow>;
    const URL_SUFFIX: &'static str = "/api/users/list";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.header("Token", &self.token))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<UsersResult>().await?.users)
    }
}

pub struct UpdateMembership {
    pub token: String,
    pub user_id: String,
    pub membership_type: MembershipType,
}

#[async_trait::async_trait]
impl super::Request for UpdateMembership {
    type Output = Vec<UserRow>;
    const URL_SUFFIX: &'static str = "/api/users/membership";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .header("Token", &self.token)
            .json(&UpdateMembershipDescriptor {
                user_id: self.user_id.clone(),
                membership_type: self.membership_type,
            }))
    }

    /// The rows handed back are the authoritative post-update list.
    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<UsersResult>().await?.users)
    }
}
