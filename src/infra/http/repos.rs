//! Backend endpoints behind the application repository traits.

use async_trait::async_trait;
use murales_api_types::{
    ApproveRequest, CreateMuralRequest, CreateMuralResponse, DataResponse, FilterValuesResponse,
    ListResponse, LoginPayload, LoginRequest, LoginResponse, Mural, MuralStatus, MuralSummary,
    MuralWithDetails, NewMural, RejectRequest,
};
use reqwest::Method;

use super::client::{ApiClient, ApiRequest};
use crate::application::repos::{
    AuthRepo, FilterOptionsRepo, ModerationRepo, MuralsRepo, RepoError,
};
use crate::domain::filters::MuralQuery;

#[async_trait]
impl MuralsRepo for ApiClient {
    async fn list_murals(&self, query: &MuralQuery) -> Result<ListResponse<Mural>, RepoError> {
        let request = ApiRequest::get(&["murals"]).query(query.to_query_pairs());
        Ok(self.fetch(&request).await?)
    }

    async fn map_murals(&self) -> Result<Vec<Mural>, RepoError> {
        let response: DataResponse<Vec<Mural>> =
            self.fetch(&ApiRequest::get(&["murals", "map"])).await?;
        Ok(response.data)
    }

    async fn get_mural(&self, id: &str) -> Result<Mural, RepoError> {
        let response: DataResponse<Mural> = self.fetch(&ApiRequest::get(&["murals", id])).await?;
        Ok(response.data)
    }

    async fn create_mural(&self, mural: NewMural) -> Result<CreateMuralResponse, RepoError> {
        let request =
            ApiRequest::new(Method::POST, &["murals"]).json(&CreateMuralRequest { mural })?;
        Ok(self.fetch(&request).await?)
    }
}

#[async_trait]
impl FilterOptionsRepo for ApiClient {
    async fn provinces(&self) -> Result<Vec<String>, RepoError> {
        let response: FilterValuesResponse = self
            .fetch(&ApiRequest::get(&["filters", "provinces"]))
            .await?;
        Ok(response.data)
    }

    async fn municipalities(&self, province: &str) -> Result<Vec<String>, RepoError> {
        let request = ApiRequest::get(&["filters", "municipalities"])
            .query(vec![("province", province.to_string())]);
        let response: FilterValuesResponse = self.fetch(&request).await?;
        Ok(response.data)
    }

    async fn neighborhoods(
        &self,
        province: &str,
        municipality: Option<&str>,
    ) -> Result<Vec<String>, RepoError> {
        let mut pairs = vec![("province", province.to_string())];
        if let Some(municipality) = municipality.filter(|m| !m.is_empty()) {
            pairs.push(("municipality", municipality.to_string()));
        }
        let request = ApiRequest::get(&["filters", "neighborhoods"]).query(pairs);
        let response: FilterValuesResponse = self.fetch(&request).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl ModerationRepo for ApiClient {
    async fn list_submissions(
        &self,
        status: MuralStatus,
        page: u32,
    ) -> Result<ListResponse<MuralWithDetails>, RepoError> {
        let request = ApiRequest::get(&["admin", "murals"]).query(vec![
            ("status", status.as_str().to_string()),
            ("page", page.to_string()),
        ]);
        Ok(self.fetch(&request).await?)
    }

    async fn summary(&self) -> Result<MuralSummary, RepoError> {
        let response: DataResponse<MuralSummary> = self
            .fetch(&ApiRequest::get(&["admin", "murals", "summary"]))
            .await?;
        Ok(response.data)
    }

    async fn approve(&self, id: &str, request: ApproveRequest) -> Result<(), RepoError> {
        let request =
            ApiRequest::new(Method::PUT, &["admin", "murals", id, "approve"]).json(&request)?;
        Ok(self.send(&request).await?)
    }

    async fn reject(&self, id: &str, request: RejectRequest) -> Result<(), RepoError> {
        let request =
            ApiRequest::new(Method::PUT, &["admin", "murals", id, "reject"]).json(&request)?;
        Ok(self.send(&request).await?)
    }
}

#[async_trait]
impl AuthRepo for ApiClient {
    async fn login(&self, request: LoginRequest) -> Result<LoginPayload, RepoError> {
        let request = ApiRequest::new(Method::POST, &["admin", "auth", "login"])
            .json(&request)?
            .anonymous();
        let response: LoginResponse = self.fetch(&request).await?;
        Ok(response.data)
    }
}
