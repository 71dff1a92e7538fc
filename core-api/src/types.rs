//! Wire types for the LeafGuard backend API.
//!
//! Field names follow the backend's JSON conventions (`_id`, camelCase);
//! the Rust side stays snake_case through serde renames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated user's profile as the backend reports it.
///
/// The token never travels inside this struct; it is split off at the auth
/// boundary so the profile can be cached and logged (id only) safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_subscribed: bool,
    pub remaining_free_scans: u32,
}

/// Login/registration response: a profile plus the issued bearer token.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: Option<String>,
}

// The token must never leak through Debug output.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("profile", &self.profile)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Result of a disease-identification request.
///
/// Produced once per successful detect call; never merged with prior
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub disease: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub preventions: Vec<String>,
    pub image_url: String,
    /// Server-reported free scans left after this detection.
    pub remaining_scans: u32,
}

/// Payload for saving a scan to the user's history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScan {
    pub disease: String,
    pub confidence: f64,
    pub description: String,
    pub symptoms: Vec<String>,
    pub recommendations: Vec<String>,
    pub preventions: Vec<String>,
    pub image_url: String,
    pub plant_name: String,
}

/// A scan record from the user's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedScan {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub disease: String,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub preventions: Vec<String>,
    pub image_url: String,
    #[serde(default)]
    pub plant_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry from the static disease list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseInfo {
    pub name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<String>,
    #[serde(default)]
    pub preventions: Vec<String>,
}

/// A purchasable subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub features: Vec<String>,
}

/// Outcome of subscribing to a plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    #[serde(default)]
    pub subscription: serde_json::Value,
    pub user: UserProfile,
}

/// Current subscription state for the authenticated user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
    pub remaining_free_scans: u32,
    #[serde(default)]
    pub subscription: serde_json::Value,
}

/// Outcome of cancelling the active subscription.
#[derive(Debug, Clone)]
pub struct CancellationSummary {
    pub message: String,
    pub is_subscribed: bool,
    pub remaining_free_scans: u32,
}

/// Partial profile update; `None` fields are left unchanged server-side.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Display for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProfileUpdate(name: {}, email: {}, password: {})",
            self.name.is_some(),
            self.email.is_some(),
            self.password.is_some()
        )
    }
}

/// `{ success, data }` wrapper the backend uses on most collection and
/// detection endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    #[allow(dead_code)]
    pub success: bool,
    pub data: T,
}

/// `{ success, message, data }` wrapper used by the cancel endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CancelEnvelope {
    #[serde(default)]
    pub message: String,
    pub data: CancelData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CancelData {
    pub is_subscribed: bool,
    pub remaining_free_scans: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_wire_names() {
        let json = r#"{
            "_id": "663d2e",
            "name": "Ada",
            "email": "ada@leafguard.com",
            "role": "Farmer",
            "isSubscribed": false,
            "remainingFreeScans": 3
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "663d2e");
        assert_eq!(profile.role, "Farmer");
        assert!(!profile.is_subscribed);
        assert_eq!(profile.remaining_free_scans, 3);

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["_id"], "663d2e");
        assert_eq!(back["remainingFreeScans"], 3);
    }

    #[test]
    fn test_auth_session_flattens_profile() {
        let json = r#"{
            "_id": "663d2e",
            "name": "Ada",
            "email": "ada@leafguard.com",
            "role": "Farmer",
            "isSubscribed": true,
            "remainingFreeScans": 0,
            "token": "jwt-value"
        }"#;

        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.profile.name, "Ada");
        assert_eq!(session.token.as_deref(), Some("jwt-value"));
    }

    #[test]
    fn test_auth_session_debug_redacts_token() {
        let session: AuthSession = serde_json::from_str(
            r#"{"_id":"1","name":"n","email":"e@x.y","role":"user",
                "isSubscribed":false,"remainingFreeScans":3,"token":"top-secret"}"#,
        )
        .unwrap();

        let debug = format!("{:?}", session);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("top-secret"));
    }

    #[test]
    fn test_detection_result_from_backend_payload() {
        let json = r#"{
            "disease": "Leaf Spot",
            "confidence": 0.95,
            "description": "Fungal infection",
            "symptoms": ["Brown spots"],
            "recommendations": ["Remove affected leaves"],
            "preventions": ["Avoid overhead watering"],
            "imageUrl": "/uploads/plant-123.jpg",
            "remainingScans": 2
        }"#;

        let result: DetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.disease, "Leaf Spot");
        assert!((result.confidence - 0.95).abs() < f64::EPSILON);
        assert_eq!(result.image_url, "/uploads/plant-123.jpg");
        assert_eq!(result.remaining_scans, 2);
    }

    #[test]
    fn test_saved_scan_tolerates_missing_optionals() {
        let json = r#"{
            "_id": "abc",
            "disease": "Rust",
            "confidence": 0.75,
            "imageUrl": "/uploads/x.jpg",
            "createdAt": "2025-05-01T10:00:00Z"
        }"#;

        let scan: SavedScan = serde_json::from_str(json).unwrap();
        assert_eq!(scan.id, "abc");
        assert!(scan.plant_name.is_none());
        assert!(scan.symptoms.is_empty());
        assert_eq!(scan.created_at.timestamp(), 1746093600);
    }

    #[test]
    fn test_envelope_unwraps_data() {
        let json = r#"{"success": true, "data": [{"id":"free","name":"Free Plan","price":0.0,"features":[]}]}"#;
        let envelope: Envelope<Vec<SubscriptionPlan>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].id, "free");
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("New Name".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["name"], "New Name");
        assert!(json.get("email").is_none());
        assert!(json.get("password").is_none());
    }
}
