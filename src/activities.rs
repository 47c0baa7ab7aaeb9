//! Activity log module
//!
//! [`ActivityLog`] owns the per-client follow-up view: the activity
//! collection for the scoped client, the owning client's display name, and
//! the create/edit form. The scope comes from the route; mutations without
//! a scope fail fast before any gateway call.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::AppError;
use crate::gateway::{Filter, Gateway, Order, Table};
use crate::model::{Activity, ActivityForm, ActivityLogView, ActivityPayload, ACTIVITY_FIELDS};
use crate::theme::Theme;

pub struct ActivityLog {
    gateway: Arc<dyn Gateway>,
    client_id: Option<String>,
    activities: Vec<Activity>,
    client_name: String,
    form: ActivityForm,
    editing: Option<String>,
}

impl ActivityLog {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        ActivityLog {
            gateway,
            client_id: None,
            activities: Vec::new(),
            client_name: String::new(),
            form: ActivityForm::default(),
            editing: None,
        }
    }

    /// Points the log at a client. Moving to a different client resets the
    /// collection, the display name and the form; re-entering the same
    /// client keeps them.
    pub fn scope_to(&mut self, client_id: &str) {
        if self.client_id.as_deref() == Some(client_id) {
            return;
        }
        self.client_id = Some(client_id.to_string());
        self.activities.clear();
        self.client_name.clear();
        self.form = ActivityForm::default();
        self.editing = None;
    }

    /// Replaces the cached collection with the scoped client's activities,
    /// newest date first. Without a scope this is a no-op.
    pub fn load(&mut self) -> Result<(), AppError> {
        let Some(client_id) = self.client_id.clone() else {
            return Ok(());
        };
        let rows = self.gateway.select(
            Table::Activities,
            Some(&Filter::eq("client_id", client_id)),
            Some(&Order::desc("date")),
        )?;
        self.activities = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        Ok(())
    }

    /// Looks up the scoped client's company name for display. The lookup
    /// must match exactly one record; on any failure the name stays blank.
    pub fn load_client_name(&mut self) -> Result<(), AppError> {
        let Some(client_id) = self.client_id.clone() else {
            return Ok(());
        };
        let row = self
            .gateway
            .select_single(Table::Clients, &Filter::eq("id", client_id))?;
        self.client_name = row
            .get("company_name")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(())
    }

    /// Creates or updates an activity from the submitted form, attaching
    /// the scoping client id to the stored record. Type, result and date
    /// are required. On success the form resets and the collection reloads;
    /// on failure the form keeps the submitted values.
    pub fn submit(&mut self, form: ActivityForm) -> Result<(), AppError> {
        self.form = form;

        let Some(client_id) = self.client_id.clone() else {
            return Err(AppError::MissingScope(
                "لم يتم تحديد الزبون، لا يمكن حفظ المتابعة.".to_string(),
            ));
        };

        if self.form.activity_type.is_empty()
            || self.form.result.is_empty()
            || self.form.date.is_empty()
        {
            return Err(AppError::Validation(
                "يرجى تعبئة نوع المتابعة والنتيجة والتاريخ.".to_string(),
            ));
        }

        let date = NaiveDate::parse_from_str(&self.form.date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("صيغة التاريخ غير صحيحة.".to_string()))?;

        let notes = self.form.notes.trim();
        let payload = ActivityPayload {
            client_id,
            activity_type: self.form.activity_type.clone(),
            result: self.form.result.clone(),
            date,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        };
        let record = serde_json::to_value(&payload)?;

        match self.editing.clone() {
            Some(id) => {
                self.gateway
                    .update(Table::Activities, record, &Filter::eq("id", id))?;
                tracing::info!(date = %date, "activity updated");
            }
            None => {
                self.gateway.insert(Table::Activities, record)?;
                tracing::info!(date = %date, "activity created");
            }
        }

        self.form = ActivityForm::default();
        self.editing = None;
        self.load()
    }

    /// Copies a cached activity into the form and marks it as the edit
    /// target.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), AppError> {
        let activity = self
            .activities
            .iter()
            .find(|activity| activity.id == id)
            .ok_or_else(|| AppError::NotFound("المتابعة غير موجودة.".to_string()))?;
        self.form = ActivityForm::from_activity(activity);
        self.editing = Some(id.to_string());
        Ok(())
    }

    /// Deletes an already-confirmed activity and reloads the collection.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        if self.client_id.is_none() {
            return Err(AppError::MissingScope(
                "لم يتم تحديد الزبون، لا يمكن حذف المتابعة.".to_string(),
            ));
        }
        self.gateway
            .delete(Table::Activities, &Filter::eq("id", id))?;
        tracing::info!(id, "activity deleted");
        self.load()
    }

    pub fn view(&self, theme: Theme) -> ActivityLogView {
        ActivityLogView {
            theme,
            client_id: self.client_id.clone(),
            client_name: self.client_name.clone(),
            editing: self.editing.clone(),
            fields: ACTIVITY_FIELDS,
            form: self.form.clone(),
            activities: self.activities.clone(),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn form(&self) -> &ActivityForm {
        &self.form
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }
}
