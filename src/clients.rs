//! Client list module
//!
//! [`ClientDirectory`] owns the client list view's state: the cached
//! collection as last fetched from the gateway, the search term, the single
//! expanded row, and the create/edit form. Every mutation goes through the
//! gateway and is followed by a full reload; the cache is never patched
//! locally.

use std::sync::Arc;

use crate::error::AppError;
use crate::gateway::{Filter, Gateway, Order, Table};
use crate::model::{Client, ClientForm, ClientListView, CLIENT_FIELDS};
use crate::theme::Theme;

pub struct ClientDirectory {
    gateway: Arc<dyn Gateway>,
    clients: Vec<Client>,
    search: String,
    expanded: Option<String>,
    show_form: bool,
    form: ClientForm,
    editing: Option<String>,
}

impl ClientDirectory {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        ClientDirectory {
            gateway,
            clients: Vec::new(),
            search: String::new(),
            expanded: None,
            show_form: false,
            form: ClientForm::default(),
            editing: None,
        }
    }

    /// Replaces the cached collection with all clients ordered by company
    /// name. On failure the previous cache is left untouched.
    pub fn load(&mut self) -> Result<(), AppError> {
        let rows = self
            .gateway
            .select(Table::Clients, None, Some(&Order::asc("company_name")))?;
        self.clients = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        Ok(())
    }

    /// The cached subset whose company name or city contains the search
    /// term, ignoring case. Pure; preserves the cached order.
    pub fn filtered(&self) -> Vec<&Client> {
        let term = self.search.to_lowercase();
        self.clients
            .iter()
            .filter(|client| {
                client.company_name.to_lowercase().contains(&term)
                    || client
                        .city
                        .as_deref()
                        .is_some_and(|city| city.to_lowercase().contains(&term))
            })
            .collect()
    }

    pub fn set_search(&mut self, term: String) {
        self.search = term;
    }

    pub fn toggle_form(&mut self) {
        self.show_form = !self.show_form;
    }

    /// Expands the given client, collapsing whichever was open before.
    /// Toggling the already-expanded client collapses it.
    pub fn toggle_expanded(&mut self, id: &str) {
        self.expanded = if self.expanded.as_deref() == Some(id) {
            None
        } else {
            Some(id.to_string())
        };
    }

    /// Copies a cached client into the form and marks it as the edit
    /// target. Works from the cache only; no fresh fetch.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), AppError> {
        let client = self
            .clients
            .iter()
            .find(|client| client.id == id)
            .ok_or_else(|| AppError::NotFound("العميل غير موجود.".to_string()))?;
        self.form = ClientForm::from_client(client);
        self.editing = Some(id.to_string());
        self.show_form = true;
        Ok(())
    }

    /// Creates or updates a client from the submitted form.
    ///
    /// The company name is required after trimming. In create mode the name
    /// is also rejected when it matches a cached client's name ignoring
    /// case; the check runs against the cache only, so a concurrent writer
    /// can still slip a duplicate past it. On success the form resets and
    /// the collection reloads; on failure the form keeps the submitted
    /// values for retry.
    pub fn submit(&mut self, form: ClientForm) -> Result<(), AppError> {
        self.form = form;

        let name = self.form.company_name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("اسم الشركة مطلوب.".to_string()));
        }

        match self.editing.clone() {
            Some(id) => {
                let patch = serde_json::to_value(self.form.clean())?;
                self.gateway
                    .update(Table::Clients, patch, &Filter::eq("id", id))?;
                tracing::info!(company = %name, "client updated");
                self.form = ClientForm::default();
                self.editing = None;
                self.show_form = false;
            }
            None => {
                let folded = name.to_lowercase();
                let duplicate = self
                    .clients
                    .iter()
                    .any(|client| client.company_name.trim().to_lowercase() == folded);
                if duplicate {
                    return Err(AppError::Duplicate("هذه الشركة مضافة مسبقًا.".to_string()));
                }

                let record = serde_json::to_value(self.form.clean())?;
                self.gateway.insert(Table::Clients, record)?;
                tracing::info!(company = %name, "client created");
                // The form clears but stays visible for the next entry.
                self.form = ClientForm::default();
            }
        }

        self.load()
    }

    /// Deletes an already-confirmed client and reloads the collection. On
    /// failure no local state changes.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        self.gateway.delete(Table::Clients, &Filter::eq("id", id))?;
        tracing::info!(id, "client deleted");
        self.load()
    }

    pub fn view(&self, theme: Theme) -> ClientListView {
        ClientListView {
            theme,
            search: self.search.clone(),
            show_form: self.show_form,
            editing: self.editing.clone(),
            fields: CLIENT_FIELDS,
            form: self.form.clone(),
            expanded: self.expanded.clone(),
            clients: self.filtered().into_iter().cloned().collect(),
            total: self.clients.len(),
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn form(&self) -> &ClientForm {
        &self.form
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn show_form(&self) -> bool {
        self.show_form
    }
}
