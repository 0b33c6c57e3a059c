//! Request builders for the backend routes the portal uses.

use serde_json::json;

use crate::backend::client::{ApiRequest, MultipartBody};

pub fn profile() -> ApiRequest {
    ApiRequest::get("/profile/")
}

pub fn articles() -> ApiRequest {
    ApiRequest::get("/articles/")
}

pub fn article(id: &str) -> ApiRequest {
    ApiRequest::get(format!("/articles/{id}/"))
}

pub fn submit_article(body: MultipartBody) -> ApiRequest {
    ApiRequest::post_multipart("/articles/", body)
}

pub fn submit_revision(id: &str, body: MultipartBody) -> ApiRequest {
    ApiRequest::post_multipart(format!("/articles/{id}/submit-revision/"), body)
}

pub fn request_revision(id: &str, notes: &str) -> ApiRequest {
    ApiRequest::post_json(format!("/articles/{id}/request_revision/"), json!({ "notes": notes }))
}

pub fn reject_article(id: &str, notes: &str) -> ApiRequest {
    ApiRequest::post_json(format!("/articles/{id}/reject_article/"), json!({ "notes": notes }))
}

pub fn accept_article(id: &str, body: MultipartBody) -> ApiRequest {
    ApiRequest::post_multipart(format!("/articles/{id}/accept_article/"), body)
}

pub fn create_service_order(body: MultipartBody) -> ApiRequest {
    ApiRequest::post_multipart("/service-orders/", body)
}

pub fn services() -> ApiRequest {
    ApiRequest::get("/services/")
}

pub fn service(slug: &str) -> ApiRequest {
    ApiRequest::get(format!("/services/{slug}/"))
}

pub fn dashboard_summary() -> ApiRequest {
    ApiRequest::get("/dashboard-summary/")
}

pub fn journals() -> ApiRequest {
    ApiRequest::get("/journals/")
}

pub fn users() -> ApiRequest {
    ApiRequest::get("/users/")
}

pub fn admin_articles() -> ApiRequest {
    ApiRequest::get("/admin/articles/")
}

pub fn audit_logs() -> ApiRequest {
    ApiRequest::get("/audit-logs/")
}

pub fn financial_report() -> ApiRequest {
    ApiRequest::get("/financial-report/")
}

pub fn system_settings() -> ApiRequest {
    ApiRequest::get("/system-settings/")
}
