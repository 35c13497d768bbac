//! Administrative endpoints

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::fetch::ApiClient;

/// Filters for `GET /admin/users`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl UserQuery {
    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Filters for `GET /admin/youtube/requests`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeRequestQuery {
    pub status: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl YoutubeRequestQuery {
    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Client for the `/admin` endpoints
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn users(&self, query: &UserQuery) -> Result<Value> {
        self.api
            .get("/admin/users")?
            .query_pairs(query.pairs())
            .execute_value()
            .await
    }

    pub async fn user(&self, user_id: &str) -> Result<Value> {
        self.api
            .get("/admin/users")?
            .segment(user_id)
            .execute_value()
            .await
    }

    pub async fn block_user(&self, user_id: &str) -> Result<Value> {
        self.user_action(user_id, "block").await
    }

    pub async fn unblock_user(&self, user_id: &str) -> Result<Value> {
        self.user_action(user_id, "unblock").await
    }

    pub async fn force_logout(&self, user_id: &str) -> Result<Value> {
        self.user_action(user_id, "force-logout").await
    }

    pub async fn credit_wallet(&self, user_id: &str, amount: f64, reason: &str) -> Result<Value> {
        self.api
            .post("/admin/users")?
            .segment(user_id)
            .segment("wallet-credit")
            .json(&json!({ "amount": amount, "reason": reason }))?
            .execute_value()
            .await
    }

    pub async fn debit_wallet(&self, user_id: &str, amount: f64, reason: &str) -> Result<Value> {
        self.api
            .post("/admin/users")?
            .segment(user_id)
            .segment("wallet-debit")
            .json(&json!({ "amount": amount, "reason": reason }))?
            .execute_value()
            .await
    }

    pub async fn youtube_requests(&self, query: &YoutubeRequestQuery) -> Result<Value> {
        self.api
            .get("/admin/youtube/requests")?
            .query_pairs(query.pairs())
            .execute_value()
            .await
    }

    pub async fn mark_youtube_done(&self, request_id: &str, notes: Option<&str>) -> Result<Value> {
        self.api
            .post("/admin/youtube")?
            .segment(request_id)
            .segment("done")
            .json(&json!({ "notes": notes }))?
            .execute_value()
            .await
    }

    pub async fn undo_youtube(&self, request_id: &str, reason: Option<&str>) -> Result<Value> {
        self.api
            .post("/admin/youtube")?
            .segment(request_id)
            .segment("undo")
            .json(&json!({ "reason": reason }))?
            .execute_value()
            .await
    }

    async fn user_action(&self, user_id: &str, action: &str) -> Result<Value> {
        self.api
            .post("/admin/users")?
            .segment(user_id)
            .segment(action)
            .execute_value()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_filters_become_query_pairs() {
        let query = UserQuery {
            search: Some("asha".to_string()),
            limit: Some(50),
            ..Default::default()
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("search".to_string(), "asha".to_string()),
                ("limit".to_string(), "50".to_string())
            ]
        );
        assert!(YoutubeRequestQuery::default().pairs().is_empty());
    }
}
