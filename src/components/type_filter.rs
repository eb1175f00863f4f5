//! Boat type filter
//!
//! Loads the boat categories once, exposes them as drop-down options headed by
//! "All Types", and emits one `search` event per user change.

use crate::error::{FetchError, ServiceError};
use crate::events::{EventSink, UiEvent};
use crate::model::{BoatType, SearchOption, ALL_TYPES_VALUE};
use crate::service::SharedService;
use std::future::Future;
use tracing::{debug, warn};

/// Map boat types to options, prefixed by the "All Types" sentinel
pub fn build_search_options(types: &[BoatType]) -> Vec<SearchOption> {
    std::iter::once(SearchOption::all_types())
        .chain(
            types
                .iter()
                .map(|t| SearchOption::new(t.name.clone(), t.id.clone())),
        )
        .collect()
}

pub struct TypeFilterSource {
    sink: EventSink,
    /// `None` until a fetch succeeds; a failed fetch discards any partial list
    options: Option<Vec<SearchOption>>,
    selected_boat_type_id: String,
    error: Option<FetchError>,
}

impl TypeFilterSource {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            options: None,
            selected_boat_type_id: ALL_TYPES_VALUE.to_string(),
            error: None,
        }
    }

    /// The boat type request, or `None` once the types are loaded
    pub fn types_request(
        &self,
        service: &SharedService,
    ) -> Option<impl Future<Output = Result<Vec<BoatType>, ServiceError>> + Send + 'static> {
        if self.is_loaded() {
            return None;
        }
        let service = service.clone();
        Some(async move { service.list_boat_types().await })
    }

    /// Load the boat types; a no-op once loaded
    #[cfg(test)]
    pub async fn fetch(&mut self, service: &SharedService) -> Result<(), FetchError> {
        match self.types_request(service) {
            Some(request) => self.apply_types(request.await),
            None => Ok(()),
        }
    }

    /// Apply a `list_boat_types` response
    pub fn apply_types(
        &mut self,
        result: Result<Vec<BoatType>, ServiceError>,
    ) -> Result<(), FetchError> {
        if self.is_loaded() {
            debug!("Boat types already loaded, ignoring response");
            return Ok(());
        }

        match result {
            Ok(types) => {
                debug!(count = types.len(), "Boat types loaded");
                self.options = Some(build_search_options(&types));
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load boat types");
                let err = FetchError::from(e);
                self.options = None;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The user picked an option
    ///
    /// Values outside the option list are rejected without emitting.
    pub fn on_user_change(&mut self, value: &str) -> Result<(), FetchError> {
        if !self.is_valid_value(value) {
            warn!(value, "Ignoring selection of unknown boat type");
            return Err(FetchError::UnknownBoatType(value.to_string()));
        }

        self.selected_boat_type_id = value.to_string();
        self.sink.emit(UiEvent::Search {
            boat_type_id: self.selected_boat_type_id.clone(),
        });
        Ok(())
    }

    fn is_valid_value(&self, value: &str) -> bool {
        value == ALL_TYPES_VALUE || self.options().iter().any(|o| o.value == value)
    }

    pub fn is_loaded(&self) -> bool {
        self.options.is_some()
    }

    /// Current options (empty until loaded)
    pub fn options(&self) -> &[SearchOption] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Ids of the loaded boat types, sentinel excluded
    pub fn known_type_ids(&self) -> Vec<String> {
        self.options()
            .iter()
            .filter(|o| o.value != ALL_TYPES_VALUE)
            .map(|o| o.value.clone())
            .collect()
    }

    pub fn selected_boat_type_id(&self) -> &str {
        &self.selected_boat_type_id
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }
}
