//! Ping Maps policy location queries

use crate::types::activity::QueryParams;

/// Query for the policy location and policy breakdown endpoints.
///
/// Besides the SOV id and an optional bounding box, the server accepts a
/// long tail of attribute filters (`wind_tier`, `const__code_air`,
/// `limits__total_limit__gte`, ...); those are passed through as given.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyQuery {
    pub sovid: String,
    pub bounds: Option<BoundingBox>,
    pub limit: Option<u32>,
    pub show_points_sooner: Option<bool>,
    pub filters: Vec<(String, String)>,
    /// Breakdown only: fields to aggregate.
    pub fields: Vec<String>,
}

/// Latitude/longitude window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat1: f64,
    pub lng1: f64,
    pub lat2: f64,
    pub lng2: f64,
}

impl PolicyQuery {
    pub fn new(sovid: impl Into<String>) -> Self {
        Self {
            sovid: sovid.into(),
            bounds: None,
            limit: None,
            show_points_sooner: None,
            filters: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = vec![("sovid".to_string(), self.sovid.clone())];
        if let Some(b) = self.bounds {
            params.extend([
                ("lat1".to_string(), b.lat1.to_string()),
                ("lng1".to_string(), b.lng1.to_string()),
                ("lat2".to_string(), b.lat2.to_string()),
                ("lng2".to_string(), b.lng2.to_string()),
            ]);
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sooner) = self.show_points_sooner {
            params.push(("show_points_sooner".to_string(), sooner.to_string()));
        }
        params.extend(self.filters.iter().cloned());
        params.extend(self.fields.iter().map(|f| ("fields".to_string(), f.clone())));
        params
    }
}
