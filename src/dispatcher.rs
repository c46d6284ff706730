/// Message dispatcher: wire requests from extension pages → store calls

use crate::backend::StorageArea;
use crate::error::{GoLinkError, Result};
use crate::mapping::Mapping;
use crate::storage::{ExportBundle, ImportBundle, ImportReport};
use crate::store::MappingStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const UNKNOWN_ACTION: &str = "Unknown action";

/// A request `{action, ...payload}` from a popup, create or debug page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    SaveMapping {
        short_name: String,
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
    GetMapping {
        short_name: String,
    },
    GetAllMappings,
    DeleteMapping {
        short_name: String,
    },
    ClearMappings,
    ExportMappings,
    ImportMappings {
        data: Value,
    },
    #[serde(other)]
    Unknown,
}

/// Reply sent back over the message channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Mapping(Mapping),
    /// `null` when the short name is not mapped
    Lookup(Option<Mapping>),
    Mappings(BTreeMap<String, Mapping>),
    Success { success: bool },
    Exported(ExportBundle),
    Imported(ImportReport),
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<Result<Response>> for Response {
    fn from(result: Result<Response>) -> Self {
        result.unwrap_or_else(|e| Response::error(e.to_string()))
    }
}

/// Exposes the store to extension pages.
///
/// Each call is its own future, so replies may complete out of order.
/// Nothing a caller sends makes the dispatcher fail; every problem comes
/// back as `{error}`.
pub struct MessageDispatcher<S> {
    store: Rc<MappingStore<S>>,
}

impl<S: StorageArea> MessageDispatcher<S> {
    pub fn new(store: Rc<MappingStore<S>>) -> Self {
        MessageDispatcher { store }
    }

    /// Decode a raw message and run it
    pub async fn dispatch(&self, message: Value) -> Response {
        let action = message
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let Some(action) = action else {
            log::warn!("Message without an action: {message}");
            return Response::error(UNKNOWN_ACTION);
        };

        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.execute(request).await,
            Err(e) => {
                log::warn!("Malformed {action} request: {e}");
                Response::error(format!("Invalid {action} request: {e}"))
            }
        }
    }

    pub async fn execute(&self, request: Request) -> Response {
        log::debug!("Handling {request:?}");

        let response = match request {
            Request::SaveMapping {
                short_name,
                url,
                description,
            } => self
                .store
                .save(&short_name, &url, description.as_deref().unwrap_or_default())
                .await
                .map(Response::Mapping),
            Request::GetMapping { short_name } => {
                self.store.get(&short_name).await.map(Response::Lookup)
            }
            Request::GetAllMappings => self.store.get_all().await.map(Response::Mappings),
            Request::DeleteMapping { short_name } => self
                .store
                .delete(&short_name)
                .await
                .map(|()| Response::Success { success: true }),
            Request::ClearMappings => self
                .store
                .clear()
                .await
                .map(|()| Response::Success { success: true }),
            Request::ExportMappings => self.store.export().await.map(Response::Exported),
            Request::ImportMappings { data } => self.import(data).await.map(Response::Imported),
            Request::Unknown => {
                log::warn!("Unknown action");
                return Response::error(UNKNOWN_ACTION);
            }
        };

        if let Err(e) = &response {
            log::error!("Request failed: {e}");
        }
        Response::from(response)
    }

    async fn import(&self, data: Value) -> Result<ImportReport> {
        let bundle: ImportBundle = serde_json::from_value(data).map_err(|e| {
            GoLinkError::InvalidImport(format!("expected a GoLinks export file: {e}"))
        })?;
        self.store.import(bundle).await
    }
}
