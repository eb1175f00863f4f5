// Boat catalog data model
//
// Records travel in the data service's field naming (`Price__c`,
// `Geolocation__Latitude__s`, ...). Serde renames map them onto Rust names so
// the rest of the crate never sees the wire spelling.

use serde::{Deserialize, Serialize};

/// Label of the sentinel option that clears the type filter
pub const ALL_TYPES_LABEL: &str = "All Types";

/// Value of the sentinel option: the empty string means "all types"
pub const ALL_TYPES_VALUE: &str = "";

/// A selectable boat category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoatType {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

impl BoatType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One catalog row as returned by the data service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoatRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Length__c", default)]
    pub length: Option<f64>,
    #[serde(rename = "Price__c", default)]
    pub price: Option<f64>,
    #[serde(rename = "Description__c", default)]
    pub description: Option<String>,
    #[serde(rename = "Picture__c", default)]
    pub picture_url: Option<String>,
    #[serde(rename = "Geolocation__Latitude__s", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Geolocation__Longitude__s", default)]
    pub longitude: Option<f64>,
}

impl BoatRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Active search filter
///
/// `None` and `Some("")` both mean "all types".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub selected_type_id: Option<String>,
}

impl FilterState {
    /// The value sent to the data service ("" when unfiltered)
    pub fn boat_type_id(&self) -> &str {
        self.selected_type_id.as_deref().unwrap_or(ALL_TYPES_VALUE)
    }

    pub fn is_all_types(&self) -> bool {
        self.boat_type_id().is_empty()
    }
}

/// A partial row edit: the Id plus whichever editable columns changed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowEdit {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Length__c", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(rename = "Price__c", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(
        rename = "Description__c",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl RowEdit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Fold a later edit of the same row into this one (later fields win)
    pub fn merge(&mut self, later: RowEdit) {
        debug_assert_eq!(self.id, later.id);
        if later.name.is_some() {
            self.name = later.name;
        }
        if later.length.is_some() {
            self.length = later.length;
        }
        if later.price.is_some() {
            self.price = later.price;
        }
        if later.description.is_some() {
            self.description = later.description;
        }
    }

    /// Write the edited fields onto a full record
    pub fn apply_to(&self, record: &mut BoatRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(length) = self.length {
            record.length = Some(length);
        }
        if let Some(price) = self.price {
            record.price = Some(price);
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
    }
}

/// Edited rows submitted together in one save
///
/// Serializes as `{"data": [...]}`, the update entrypoint's request shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowEditBatch {
    pub data: Vec<RowEdit>,
}

impl RowEditBatch {
    /// Build a batch keyed by Id: repeated edits of one row are merged,
    /// first-seen order is kept.
    pub fn from_edits(edits: impl IntoIterator<Item = RowEdit>) -> Self {
        let mut data: Vec<RowEdit> = Vec::new();
        for edit in edits {
            merge_edit(&mut data, edit);
        }
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|edit| edit.id.as_str())
    }
}

/// Merge an edit into a list keyed by Id
pub fn merge_edit(edits: &mut Vec<RowEdit>, edit: RowEdit) {
    match edits.iter_mut().find(|existing| existing.id == edit.id) {
        Some(existing) => existing.merge(edit),
        None => edits.push(edit),
    }
}

/// A point of interest on the near-me map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One entry of the type filter drop-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOption {
    pub label: String,
    pub value: String,
}

impl SearchOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The "All Types" sentinel option
    pub fn all_types() -> Self {
        Self::new(ALL_TYPES_LABEL, ALL_TYPES_VALUE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Currency,
}

/// Results table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub field_name: &'static str,
    pub kind: ColumnKind,
    pub editable: bool,
}

pub const BOAT_COLUMNS: [Column; 4] = [
    Column {
        label: "Name",
        field_name: "Name",
        kind: ColumnKind::Text,
        editable: true,
    },
    Column {
        label: "Length",
        field_name: "Length__c",
        kind: ColumnKind::Text,
        editable: true,
    },
    Column {
        label: "Price",
        field_name: "Price__c",
        kind: ColumnKind::Currency,
        editable: true,
    },
    Column {
        label: "Description",
        field_name: "Description__c",
        kind: ColumnKind::Text,
        editable: true,
    },
];

impl Column {
    /// Display value of this column for a record
    pub fn display(&self, boat: &BoatRecord) -> String {
        match self.field_name {
            "Name" => boat.name.clone(),
            "Length__c" => boat.length.map(|l| format!("{l}")).unwrap_or_default(),
            "Price__c" => boat
                .price
                .map(|p| match self.kind {
                    ColumnKind::Currency => format!("${p:.2}"),
                    ColumnKind::Text => format!("{p}"),
                })
                .unwrap_or_default(),
            "Description__c" => boat.description.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }
}
