//! Parameterized Cosmos SQL queries
//!
//! Values never appear in the query text: every condition references a
//! named parameter and the value travels in the `parameters` array.

use serde::Serialize;
use serde_json::Value;

use crate::models::{equipment::DOCUMENT_TYPE, Equipment, EquipmentFilter};

/// Alias of the container in every generated query
const ALIAS: &str = "c";

/// Query body in the shape the SQL API expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub query: String,
    pub parameters: Vec<SqlParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}

impl SqlQuery {
    /// Bound value of a parameter, if present
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Builds `SELECT * FROM c WHERE ... [ORDER BY ...]`.
///
/// Field names are compile-time constants; values are always bound.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    parameters: Vec<SqlParameter>,
    order_by: Option<&'static str>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, name: &'static str, value: impl Into<Value>) -> String {
        let param = format!("@{}", name);
        self.parameters.push(SqlParameter {
            name: param.clone(),
            value: value.into(),
        });
        param
    }

    /// `c.field = @name`
    pub fn eq(mut self, field: &'static str, name: &'static str, value: impl Into<Value>) -> Self {
        let param = self.bind(name, value);
        self.conditions.push(format!("{}.{} = {}", ALIAS, field, param));
        self
    }

    /// `CONTAINS(LOWER(c.field), LOWER(@name))`
    pub fn contains_ignore_case(
        mut self,
        field: &'static str,
        name: &'static str,
        value: impl Into<Value>,
    ) -> Self {
        let param = self.bind(name, value);
        self.conditions.push(format!(
            "CONTAINS(LOWER({}.{}), LOWER({}))",
            ALIAS, field, param
        ));
        self
    }

    pub fn order_by(mut self, field: &'static str) -> Self {
        self.order_by = Some(field);
        self
    }

    pub fn build(self) -> SqlQuery {
        let mut query = format!("SELECT * FROM {}", ALIAS);
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        if let Some(field) = self.order_by {
            query.push_str(&format!(" ORDER BY {}.{}", ALIAS, field));
        }
        SqlQuery {
            query,
            parameters: self.parameters,
        }
    }
}

/// Equipment documents matching a filter set, ordered by equipment id
pub fn equipment_query(filter: &EquipmentFilter) -> SqlQuery {
    let mut builder = QueryBuilder::new().eq("documentType", "documentType", DOCUMENT_TYPE);

    if let Some(ref status) = filter.status {
        builder = builder.eq("status", "status", status.as_str());
    }
    if let Some(ref equipment_type) = filter.equipment_type {
        builder = builder.eq("equipmentType", "equipmentType", equipment_type.as_str());
    }
    if let Some(ref location) = filter.location {
        builder = builder.contains_ignore_case("location", "location", location.as_str());
    }

    builder.order_by("equipmentId").build()
}

/// Single equipment document by its synthetic id
pub fn document_by_id_query(equipment_id: i64) -> SqlQuery {
    QueryBuilder::new()
        .eq("id", "id", Equipment::document_id(equipment_id))
        .build()
}
