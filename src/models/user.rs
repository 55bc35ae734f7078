use serde::{Deserialize, Serialize};

use super::{Zone, flag, null_as_empty};

/// The signed-in portal user as reported by the backend at login.
///
/// Read-only for the dashboard: role flags decide default filters and
/// which filters may be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub zone_id: Option<i64>,
    #[serde(default)]
    pub mehfil_directory_id: Option<i64>,
    #[serde(default)]
    pub region_id: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub is_super_admin: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_region_admin: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_all_region_admin: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_zone_admin: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_mehfil_admin: bool,
    #[serde(default)]
    pub zone: Option<Zone>,
}

impl User {
    /// Human-readable role, highest privilege first.
    pub fn role_label(&self) -> &'static str {
        if self.is_super_admin {
            "Super Admin"
        } else if self.is_all_region_admin {
            "All Regions Admin"
        } else if self.is_region_admin {
            "Region Admin"
        } else if self.is_zone_admin {
            "Zone Admin"
        } else if self.is_mehfil_admin {
            "Mehfil Admin"
        } else {
            "Karkun"
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.email } else { &self.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_user_with_integer_flags() {
        let json = r#"{
            "id": 9,
            "name": "Ahmed",
            "email": "ahmed@example.org",
            "zone_id": 3,
            "mehfil_directory_id": 7,
            "region_id": null,
            "is_super_admin": 0,
            "is_mehfil_admin": 1,
            "zone": {"id": 3, "title_en": "Multan", "city_en": "Multan", "country_en": "Pakistan"}
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.zone_id, Some(3));
        assert_eq!(user.mehfil_directory_id, Some(7));
        assert!(user.is_mehfil_admin);
        assert!(!user.is_super_admin);
        assert!(!user.is_zone_admin);
        assert_eq!(user.zone.as_ref().map(|z| z.title_en.as_str()), Some("Multan"));
        assert_eq!(user.role_label(), "Mehfil Admin");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User { email: "x@example.org".into(), ..Default::default() };
        assert_eq!(user.display_name(), "x@example.org");
    }
}
