//! Scripted data service for component tests
//!
//! Every call is recorded; each operation answers with whatever the test set.

use super::BoatDataService;
use crate::error::ServiceError;
use crate::model::{BoatRecord, BoatType, RowEditBatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListBoatTypes,
    SearchBoats(String),
    SearchBoatsNear(f64, f64, String),
    UpdateBoats(RowEditBatch),
}

pub struct ScriptedService {
    types: Mutex<Result<Vec<BoatType>, ServiceError>>,
    boats: Mutex<HashMap<String, Vec<BoatRecord>>>,
    search_error: Mutex<Option<ServiceError>>,
    near: Mutex<Result<String, ServiceError>>,
    update: Mutex<Result<(), ServiceError>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self {
            types: Mutex::new(Ok(Vec::new())),
            boats: Mutex::new(HashMap::new()),
            search_error: Mutex::new(None),
            near: Mutex::new(Ok("[]".to_string())),
            update: Mutex::new(Ok(())),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(self, types: Vec<BoatType>) -> Self {
        *self.types.lock().unwrap() = Ok(types);
        self
    }

    /// Rows answered for `search_boats(boat_type_id)`
    pub fn with_boats(self, boat_type_id: &str, boats: Vec<BoatRecord>) -> Self {
        self.boats
            .lock()
            .unwrap()
            .insert(boat_type_id.to_string(), boats);
        self
    }

    pub fn with_near_payload(self, payload: &str) -> Self {
        *self.near.lock().unwrap() = Ok(payload.to_string());
        self
    }

    pub fn fail_types(&self, err: ServiceError) {
        *self.types.lock().unwrap() = Err(err);
    }

    pub fn fail_search(&self, err: Option<ServiceError>) {
        *self.search_error.lock().unwrap() = err;
    }

    pub fn fail_near(&self, err: ServiceError) {
        *self.near.lock().unwrap() = Err(err);
    }

    pub fn set_update_result(&self, result: Result<(), ServiceError>) {
        *self.update.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SearchBoats(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BoatDataService for ScriptedService {
    async fn list_boat_types(&self) -> Result<Vec<BoatType>, ServiceError> {
        self.record(Call::ListBoatTypes);
        self.types.lock().unwrap().clone()
    }

    async fn search_boats(&self, boat_type_id: &str) -> Result<Vec<BoatRecord>, ServiceError> {
        self.record(Call::SearchBoats(boat_type_id.to_string()));
        if let Some(err) = self.search_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .boats
            .lock()
            .unwrap()
            .get(boat_type_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_boats_near(
        &self,
        latitude: f64,
        longitude: f64,
        boat_type_id: &str,
    ) -> Result<String, ServiceError> {
        self.record(Call::SearchBoatsNear(
            latitude,
            longitude,
            boat_type_id.to_string(),
        ));
        self.near.lock().unwrap().clone()
    }

    async fn update_boats(&self, batch: &RowEditBatch) -> Result<(), ServiceError> {
        self.record(Call::UpdateBoats(batch.clone()));
        self.update.lock().unwrap().clone()
    }
}
