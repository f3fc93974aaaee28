use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{FromRequestParts, Multipart, Path, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const STUDENT_TOKEN: &str = "student-token";
pub const STAFF_TOKEN: &str = "staff-token";
pub const ADMIN_TOKEN: &str = "admin-token";

// --- DTOs ---

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Complaint {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub student_id: u64,
    pub assigned_to: Option<u64>,
}

#[derive(Deserialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub student_id: u64,
}

#[derive(Deserialize)]
pub struct ComplaintUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub status: Option<ComplaintStatus>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub requested_by: u64,
    pub assigned_to: Option<u64>,
}

#[derive(Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: Priority,
    pub requested_by: u64,
}

#[derive(Deserialize)]
pub struct RequestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<RequestStatus>,
}

/// Caller role, derived from the bearer token. Also the role stored on staff
/// records.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl Role {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            STUDENT_TOKEN => Some(Role::Student),
            STAFF_TOKEN => Some(Role::Staff),
            ADMIN_TOKEN => Some(Role::Admin),
            _ => None,
        }
    }

    fn require(self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Staff {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub active: bool,
}

#[derive(Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

#[derive(Deserialize)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct Assignment {
    pub staff_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub complaint_id: u64,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

// --- errors ---

/// Handler failure, rendered as `{"message": ...}`.
#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Role {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(Role::from_token)
            .ok_or(AppError::Unauthorized)
    }
}

// --- state ---

#[derive(Default)]
pub struct Store {
    complaints: BTreeMap<u64, Complaint>,
    requests: BTreeMap<u64, MaintenanceRequest>,
    staff: BTreeMap<u64, Staff>,
    attachments: Vec<Attachment>,
    next_id: BTreeMap<&'static str, u64>,
}

impl Store {
    /// Per-resource ids, starting at 1.
    fn next_id(&mut self, resource: &'static str) -> u64 {
        let id = self.next_id.entry(resource).or_insert(0);
        *id += 1;
        *id
    }

    fn require_staff(&self, staff_id: u64) -> Result<(), AppError> {
        if self.staff.contains_key(&staff_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("staff {staff_id}")))
        }
    }

    /// Record an upload. The complaint may have been deleted while the body
    /// was streaming, so its existence is checked here, under the write lock.
    fn add_attachment(
        &mut self,
        complaint_id: u64,
        filename: String,
        content_type: String,
        size: u64,
    ) -> Result<Attachment, AppError> {
        if !self.complaints.contains_key(&complaint_id) {
            return Err(AppError::NotFound(format!("complaint {complaint_id}")));
        }
        let attachment = Attachment {
            id: self.next_id("attachments"),
            complaint_id,
            filename,
            content_type,
            size,
        };
        self.attachments.push(attachment.clone());
        Ok(attachment)
    }
}

pub type Db = Arc<RwLock<Store>>;

const STAFF_ROLES: &[Role] = &[Role::Staff, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/complaints", get(list_complaints).post(create_complaint))
        .route(
            "/complaints/{id}",
            get(get_complaint).patch(update_complaint).delete(delete_complaint),
        )
        .route("/complaints/{id}/assign", patch(assign_complaint))
        .route("/complaints/{id}/attachments", post(upload_attachment))
        .route("/requests", get(list_requests).post(create_request))
        .route(
            "/requests/{id}",
            get(get_request)
                .put(replace_request)
                .patch(update_request)
                .delete(delete_request),
        )
        .route("/requests/{id}/assign", patch(assign_request))
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/{id}", get(get_staff).put(update_staff).delete(delete_staff))
        .with_state(db);

    Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock facilities API listening");
    }
    axum::serve(listener, app()).await
}

// --- complaints ---

async fn list_complaints(State(db): State<Db>, _role: Role) -> Json<Vec<Complaint>> {
    Json(db.read().await.complaints.values().cloned().collect())
}

async fn create_complaint(
    State(db): State<Db>,
    _role: Role,
    Json(input): Json<NewComplaint>,
) -> (StatusCode, Json<Complaint>) {
    let mut store = db.write().await;
    let complaint = Complaint {
        id: store.next_id("complaints"),
        title: input.title,
        description: input.description,
        category: input.category,
        location: input.location,
        status: ComplaintStatus::Open,
        student_id: input.student_id,
        assigned_to: None,
    };
    store.complaints.insert(complaint.id, complaint.clone());
    (StatusCode::CREATED, Json(complaint))
}

async fn get_complaint(State(db): State<Db>, _role: Role, Path(id): Path<u64>) -> Result<Json<Complaint>, AppError> {
    let store = db.read().await;
    store
        .complaints
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("complaint {id}")))
}

async fn update_complaint(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<ComplaintUpdate>,
) -> Result<Json<Complaint>, AppError> {
    role.require(STAFF_ROLES)?;
    let mut store = db.write().await;
    let complaint = store
        .complaints
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("complaint {id}")))?;
    if let Some(title) = input.title {
        complaint.title = title;
    }
    if let Some(description) = input.description {
        complaint.description = description;
    }
    if let Some(category) = input.category {
        complaint.category = category;
    }
    if let Some(location) = input.location {
        complaint.location = location;
    }
    if let Some(status) = input.status {
        complaint.status = status;
    }
    Ok(Json(complaint.clone()))
}

async fn assign_complaint(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<Assignment>,
) -> Result<Json<Complaint>, AppError> {
    role.require(STAFF_ROLES)?;
    let mut store = db.write().await;
    store.require_staff(input.staff_id)?;
    let complaint = store
        .complaints
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("complaint {id}")))?;
    complaint.assigned_to = Some(input.staff_id);
    if complaint.status == ComplaintStatus::Open {
        complaint.status = ComplaintStatus::InProgress;
    }
    Ok(Json(complaint.clone()))
}

async fn delete_complaint(State(db): State<Db>, role: Role, Path(id): Path<u64>) -> Result<StatusCode, AppError> {
    role.require(ADMIN_ONLY)?;
    let mut store = db.write().await;
    store
        .complaints
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("complaint {id}")))?;
    store.attachments.retain(|a| a.complaint_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_attachment(
    State(db): State<Db>,
    _role: Role,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Attachment>), AppError> {
    if !db.read().await.complaints.contains_key(&id) {
        return Err(AppError::NotFound(format!("complaint {id}")));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let attachment = db
            .write()
            .await
            .add_attachment(id, filename, content_type, bytes.len() as u64)?;
        return Ok((StatusCode::CREATED, Json(attachment)));
    }

    Err(AppError::BadRequest("missing \"file\" field".to_string()))
}

// --- requests ---

async fn list_requests(State(db): State<Db>, _role: Role) -> Json<Vec<MaintenanceRequest>> {
    Json(db.read().await.requests.values().cloned().collect())
}

async fn create_request(
    State(db): State<Db>,
    _role: Role,
    Json(input): Json<NewRequest>,
) -> (StatusCode, Json<MaintenanceRequest>) {
    let mut store = db.write().await;
    let request = MaintenanceRequest {
        id: store.next_id("requests"),
        title: input.title,
        description: input.description,
        location: input.location,
        priority: input.priority,
        status: RequestStatus::Pending,
        requested_by: input.requested_by,
        assigned_to: None,
    };
    store.requests.insert(request.id, request.clone());
    (StatusCode::CREATED, Json(request))
}

async fn get_request(
    State(db): State<Db>,
    _role: Role,
    Path(id): Path<u64>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    let store = db.read().await;
    store
        .requests
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("request {id}")))
}

async fn replace_request(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<NewRequest>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    role.require(STAFF_ROLES)?;
    let mut store = db.write().await;
    let request = store
        .requests
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {id}")))?;
    request.title = input.title;
    request.description = input.description;
    request.location = input.location;
    request.priority = input.priority;
    request.requested_by = input.requested_by;
    Ok(Json(request.clone()))
}

async fn update_request(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<RequestUpdate>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    role.require(STAFF_ROLES)?;
    let mut store = db.write().await;
    let request = store
        .requests
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {id}")))?;
    if let Some(title) = input.title {
        request.title = title;
    }
    if let Some(description) = input.description {
        request.description = description;
    }
    if let Some(location) = input.location {
        request.location = location;
    }
    if let Some(priority) = input.priority {
        request.priority = priority;
    }
    if let Some(status) = input.status {
        request.status = status;
    }
    Ok(Json(request.clone()))
}

async fn assign_request(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<Assignment>,
) -> Result<Json<MaintenanceRequest>, AppError> {
    role.require(STAFF_ROLES)?;
    let mut store = db.write().await;
    store.require_staff(input.staff_id)?;
    let request = store
        .requests
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {id}")))?;
    request.assigned_to = Some(input.staff_id);
    if request.status == RequestStatus::Pending {
        request.status = RequestStatus::Assigned;
    }
    Ok(Json(request.clone()))
}

async fn delete_request(State(db): State<Db>, role: Role, Path(id): Path<u64>) -> Result<StatusCode, AppError> {
    role.require(ADMIN_ONLY)?;
    let mut store = db.write().await;
    store
        .requests
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::NotFound(format!("request {id}")))
}

// --- staff ---

async fn list_staff(State(db): State<Db>, role: Role) -> Result<Json<Vec<Staff>>, AppError> {
    role.require(STAFF_ROLES)?;
    Ok(Json(db.read().await.staff.values().cloned().collect()))
}

async fn get_staff(State(db): State<Db>, role: Role, Path(id): Path<u64>) -> Result<Json<Staff>, AppError> {
    role.require(STAFF_ROLES)?;
    let store = db.read().await;
    store
        .staff
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("staff {id}")))
}

async fn create_staff(
    State(db): State<Db>,
    role: Role,
    Json(input): Json<NewStaff>,
) -> Result<(StatusCode, Json<Staff>), AppError> {
    role.require(ADMIN_ONLY)?;
    let mut store = db.write().await;
    let staff = Staff {
        id: store.next_id("staff"),
        name: input.name,
        email: input.email,
        role: input.role,
        department: input.department,
        active: true,
    };
    store.staff.insert(staff.id, staff.clone());
    Ok((StatusCode::CREATED, Json(staff)))
}

async fn update_staff(
    State(db): State<Db>,
    role: Role,
    Path(id): Path<u64>,
    Json(input): Json<StaffUpdate>,
) -> Result<Json<Staff>, AppError> {
    role.require(ADMIN_ONLY)?;
    let mut store = db.write().await;
    let staff = store
        .staff
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("staff {id}")))?;
    if let Some(name) = input.name {
        staff.name = name;
    }
    if let Some(email) = input.email {
        staff.email = email;
    }
    if let Some(role) = input.role {
        staff.role = role;
    }
    if let Some(department) = input.department {
        staff.department = department;
    }
    if let Some(active) = input.active {
        staff.active = active;
    }
    Ok(Json(staff.clone()))
}

async fn delete_staff(State(db): State<Db>, role: Role, Path(id): Path<u64>) -> Result<StatusCode, AppError> {
    role.require(ADMIN_ONLY)?;
    let mut store = db.write().await;
    store
        .staff
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::NotFound(format!("staff {id}")))
}
