//! Per-resource wrappers around `ApiClient`.
//!
//! Each service binds one REST resource's paths and methods to typed
//! request/response shapes. No validation, retries or caching happen here.

use serde::de::IgnoredAny;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::multipart::FormData;
use crate::types::{
    Assignment, Attachment, Complaint, ComplaintUpdate, MaintenanceRequest, NewComplaint, NewRequest, NewStaff,
    RequestUpdate, Staff, StaffUpdate,
};

#[derive(Debug, Clone)]
pub struct ComplaintService {
    client: ApiClient,
}

impl ComplaintService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Complaint>, ApiError> {
        self.client.get("/complaints")?.into_content()
    }

    pub fn get(&self, id: u64) -> Result<Complaint, ApiError> {
        self.client.get(&format!("/complaints/{id}"))?.into_content()
    }

    pub fn create(&self, input: &NewComplaint) -> Result<Complaint, ApiError> {
        self.client.post("/complaints", input)?.into_content()
    }

    pub fn update(&self, id: u64, input: &ComplaintUpdate) -> Result<Complaint, ApiError> {
        self.client.patch(&format!("/complaints/{id}"), input)?.into_content()
    }

    pub fn assign(&self, id: u64, staff_id: u64) -> Result<Complaint, ApiError> {
        self.client
            .patch(&format!("/complaints/{id}/assign"), &Assignment { staff_id })?
            .into_content()
    }

    pub fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/complaints/{id}"))?;
        Ok(())
    }

    pub fn upload_attachment(&self, id: u64, form: FormData) -> Result<Attachment, ApiError> {
        self.client
            .post_form(&format!("/complaints/{id}/attachments"), form)?
            .into_content()
    }
}

#[derive(Debug, Clone)]
pub struct RequestService {
    client: ApiClient,
}

impl RequestService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<MaintenanceRequest>, ApiError> {
        self.client.get("/requests")?.into_content()
    }

    pub fn get(&self, id: u64) -> Result<MaintenanceRequest, ApiError> {
        self.client.get(&format!("/requests/{id}"))?.into_content()
    }

    pub fn create(&self, input: &NewRequest) -> Result<MaintenanceRequest, ApiError> {
        self.client.post("/requests", input)?.into_content()
    }

    pub fn update(&self, id: u64, input: &RequestUpdate) -> Result<MaintenanceRequest, ApiError> {
        self.client.patch(&format!("/requests/{id}"), input)?.into_content()
    }

    /// Replace every editable field of a request.
    pub fn replace(&self, id: u64, input: &NewRequest) -> Result<MaintenanceRequest, ApiError> {
        self.client.put(&format!("/requests/{id}"), input)?.into_content()
    }

    pub fn assign(&self, id: u64, staff_id: u64) -> Result<MaintenanceRequest, ApiError> {
        self.client
            .patch(&format!("/requests/{id}/assign"), &Assignment { staff_id })?
            .into_content()
    }

    pub fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/requests/{id}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StaffService {
    client: ApiClient,
}

impl StaffService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Staff>, ApiError> {
        self.client.get("/staff")?.into_content()
    }

    pub fn get(&self, id: u64) -> Result<Staff, ApiError> {
        self.client.get(&format!("/staff/{id}"))?.into_content()
    }

    pub fn create(&self, input: &NewStaff) -> Result<Staff, ApiError> {
        self.client.post("/staff", input)?.into_content()
    }

    pub fn update(&self, id: u64, input: &StaffUpdate) -> Result<Staff, ApiError> {
        self.client.put(&format!("/staff/{id}"), input)?.into_content()
    }

    pub fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/staff/{id}"))?;
        Ok(())
    }
}
