//! Rider profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use velocart_core::{DocumentId, GeoPoint, RiderId, RiderStatus, UserId, VehicleType};

/// A rider profile: one per user who has elected the rider role.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub id: RiderId,
    pub user_id: UserId,
    pub vehicle_type: VehicleType,
    pub vehicle_number: Option<String>,
    pub license_number: Option<String>,
    /// Last reported position; absent until the rider first reports in.
    #[serde(skip)]
    pub latitude: Option<f64>,
    #[serde(skip)]
    pub longitude: Option<f64>,
    pub is_available: bool,
    pub rating: f64,
    pub total_deliveries: i32,
    pub status: RiderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rider {
    /// The rider's last reported position, if any.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude),
            _ => None,
        }
    }
}

/// An identity or vehicle document uploaded by a rider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RiderDocument {
    #[serde(skip_deserializing)]
    pub id: DocumentId,
    #[serde(rename = "type")]
    #[sqlx(rename = "doc_type")]
    pub doc_type: String,
    pub url: String,
    #[serde(default)]
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rider(lat: Option<f64>, lon: Option<f64>) -> Rider {
        Rider {
            id: RiderId::new(1),
            user_id: UserId::new(2),
            vehicle_type: VehicleType::Motorcycle,
            vehicle_number: Some("DHK-1234".to_owned()),
            license_number: None,
            latitude: lat,
            longitude: lon,
            is_available: true,
            rating: 0.0,
            total_deliveries: 0,
            status: RiderStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_location_requires_both_coordinates() {
        assert!(sample_rider(None, None).location().is_none());
        assert!(sample_rider(Some(23.7), None).location().is_none());
        assert!(sample_rider(Some(23.7), Some(90.4)).location().is_some());
    }

    #[test]
    fn test_document_type_field_name() {
        let json = r#"{"type":"license","url":"https://cdn.example.com/license.png"}"#;
        let doc: RiderDocument = serde_json::from_str(json).expect("deserialize");
        assert_eq!(doc.doc_type, "license");
        assert!(!doc.verified);
    }
}
