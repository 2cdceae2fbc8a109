//! Row structs and API-facing views.
//!
//! Rows mirror table columns. Views are the JSON shapes handlers return:
//! camelCase field names with related entities (category, owning profile's
//! public user fields) inlined, matching the API contract.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub university: String,
    pub major: String,
    pub graduation_year: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub student_id: Uuid,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct GigRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: String,
    pub client_id: Uuid,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogRow {
    pub id: Uuid,
    pub action: String,
    pub user_id: Uuid,
    pub gig_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Public slice of a user inlined into owned resources.
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub name: String,
    pub email: String,
}

/// `{id, name}` reference used by messaging responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub university: String,
    pub major: String,
    pub graduation_year: i32,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: Option<String>,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub student_id: Uuid,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: CategoryRow,
    pub student: StudentWithUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GigView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: String,
    pub client_id: Uuid,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client: ClientWithUser,
    pub category: CategoryRow,
}

/// Gig detail with its activity trail inlined, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GigDetailView {
    #[serde(flatten)]
    pub gig: GigView,
    pub activity_logs: Vec<ActivityLogWithReview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogView {
    pub id: Uuid,
    pub action: String,
    pub user_id: Uuid,
    pub gig_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogWithReview {
    #[serde(flatten)]
    pub log: ActivityLogView,
    pub review: Option<ReviewView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub activity_log_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Review with the activity log and its author inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithActivity {
    #[serde(flatten)]
    pub review: ReviewView,
    pub activity_log: ActivityLogWithUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogWithUser {
    #[serde(flatten)]
    pub log: ActivityLogView,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub conversation_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sender: UserRef,
}

/// One entry in the caller's conversation list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub user: UserRef,
    pub last_message: String,
    pub updated_at: DateTime<Utc>,
}

/// Conversation with both participants, returned on creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: Uuid,
    pub participants: Vec<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller's own profile, role sub-profile inlined.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientProfile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub university: String,
    pub major: String,
    pub graduation_year: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub company: Option<String>,
}
