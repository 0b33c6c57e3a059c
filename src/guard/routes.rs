//! Declarative page table: every client route, who may open it, and whether it shows
//! up in the navigation menu.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::dto::Role;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    Register,
    PublicSearch,
    Rankings,
    PaymentStatus,
    Root,
    Dashboard,
    Profile,
    SubmitArticle,
    MyArticles,
    ArticleDetail,
    Calendar,
    AiDocumentUtilities,
    PlagiarismCheck,
    Services,
    AssignedArticles,
    ArticleReview,
    JournalManagement,
    JournalIssueManagement,
    FinancialOverview,
    UserManagement,
    ArticleOverview,
    AuditLog,
    SystemSettings,
    WriterDashboard,
    WriterArticles,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

#[derive(Debug)]
pub struct RouteSpec {
    pub page: Page,
    pub pattern: &'static str,
    pub access: Access,
    pub menu_label: Option<&'static str>,
}

pub const AUTHORS: &[Role] = &[Role::Client];
pub const EDITORS: &[Role] = &[Role::JournalManager];
pub const ADMINS: &[Role] = &[Role::Admin];
pub const WRITERS: &[Role] = &[Role::Writer];
pub const JOURNAL_STAFF: &[Role] = &[Role::JournalManager, Role::Admin];
pub const FINANCE: &[Role] = &[Role::Accountant, Role::Admin];

const fn route(page: Page, pattern: &'static str, access: Access, menu_label: Option<&'static str>) -> RouteSpec {
    RouteSpec {
        page,
        pattern,
        access,
        menu_label,
    }
}

pub static ROUTES: &[RouteSpec] = &[
    route(Page::Login, "/login", Access::Public, None),
    route(Page::Register, "/register", Access::Public, None),
    route(Page::PublicSearch, "/search", Access::Public, None),
    route(Page::Rankings, "/rankings", Access::Public, None),
    route(Page::PaymentStatus, "/payment-status", Access::Public, None),
    route(Page::Root, "/", Access::Authenticated, None),
    route(Page::Dashboard, "/dashboard", Access::Authenticated, Some("Dashboard")),
    route(Page::SubmitArticle, "/submit-article", Access::Roles(AUTHORS), Some("Submit article")),
    route(Page::MyArticles, "/my-articles", Access::Roles(AUTHORS), Some("My articles")),
    route(Page::ArticleDetail, "/my-articles/:articleId", Access::Roles(AUTHORS), None),
    route(Page::Calendar, "/calendar", Access::Roles(AUTHORS), Some("Calendar")),
    route(Page::AiDocumentUtilities, "/ai-doc-utils", Access::Roles(AUTHORS), Some("AI document utilities")),
    route(Page::AiDocumentUtilities, "/ai-document-utilities", Access::Roles(AUTHORS), None),
    route(Page::PlagiarismCheck, "/plagiarism-check", Access::Roles(AUTHORS), Some("Plagiarism check")),
    route(Page::Services, "/services", Access::Roles(AUTHORS), Some("Services")),
    route(Page::AssignedArticles, "/assigned-articles", Access::Roles(EDITORS), Some("Assigned articles")),
    route(Page::ArticleReview, "/assigned-articles/:articleId", Access::Roles(EDITORS), None),
    route(Page::JournalManagement, "/journal-management", Access::Roles(JOURNAL_STAFF), Some("Journal management")),
    route(Page::JournalIssueManagement, "/journal-issue-management/:journalId", Access::Roles(EDITORS), None),
    route(Page::FinancialOverview, "/financial-overview", Access::Roles(FINANCE), Some("Financial overview")),
    route(Page::UserManagement, "/user-management", Access::Roles(ADMINS), Some("User management")),
    route(Page::ArticleOverview, "/article-overview", Access::Roles(ADMINS), Some("Article overview")),
    route(Page::AuditLog, "/audit-log", Access::Roles(ADMINS), Some("Audit log")),
    route(Page::SystemSettings, "/system-settings", Access::Roles(ADMINS), Some("System settings")),
    route(Page::WriterDashboard, "/writer/dashboard", Access::Roles(WRITERS), Some("Writer dashboard")),
    route(Page::WriterArticles, "/writer/articles", Access::Roles(WRITERS), Some("Writer articles")),
    route(Page::Profile, "/profile", Access::Authenticated, Some("Profile")),
];

/// Anything unknown still lives inside the authenticated shell.
static NOT_FOUND: RouteSpec = route(Page::NotFound, "*", Access::Authenticated, None);

#[derive(Debug)]
pub struct RouteMatch {
    pub spec: &'static RouteSpec,
    pub params: BTreeMap<String, String>,
}

/// Accepts `#/path?query`, `/path/` and `path` alike.
pub fn normalize(raw: &str) -> String {
    let path = raw.trim().trim_start_matches('#');
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

pub fn resolve(raw: &str) -> RouteMatch {
    let path = normalize(raw);
    ROUTES
        .iter()
        .find_map(|spec| {
            match_pattern(spec.pattern, &path).map(|params| RouteMatch { spec, params })
        })
        .unwrap_or_else(|| RouteMatch {
            spec: &NOT_FOUND,
            params: BTreeMap::new(),
        })
}

/// Menu entries the role is allowed to open, in table order.
pub fn menu_for(role: Role) -> impl Iterator<Item = &'static RouteSpec> {
    ROUTES.iter().filter(move |spec| {
        spec.menu_label.is_some()
            && match spec.access {
                Access::Public => false,
                Access::Authenticated => true,
                Access::Roles(roles) => roles.contains(&role),
            }
    })
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), (*actual).to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}
