//! Business settings singleton

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// The single configuration record of the business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Settings {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    pub company_email: Option<String>,
    /// Public path of the uploaded logo, e.g. `/uploads/<file>.png`
    pub logo_path: Option<String>,
    /// Percentage, 0 to 100
    pub tax_rate: Decimal,
    pub default_currency: String,
    pub quotation_validity_days: i32,
    pub theme_color: Option<String>,
    pub dark_mode: bool,
    pub compact_mode: bool,
    pub email_notifications: bool,
    pub auto_save_drafts: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: None,
            company_address: None,
            company_phone: None,
            company_email: None,
            logo_path: None,
            tax_rate: Decimal::ZERO,
            default_currency: "LKR".to_string(),
            quotation_validity_days: 30,
            theme_color: None,
            dark_mode: false,
            compact_mode: false,
            email_notifications: false,
            auto_save_drafts: false,
            updated_at: None,
        }
    }
}

impl Settings {
    /// Apply the fields present in `patch`
    pub fn apply(&mut self, patch: &UpdateSettings) {
        if let Some(ref value) = patch.company_name {
            self.company_name = Some(value.clone());
        }
        if let Some(ref value) = patch.company_address {
            self.company_address = Some(value.clone());
        }
        if let Some(ref value) = patch.company_phone {
            self.company_phone = Some(value.clone());
        }
        if let Some(ref value) = patch.company_email {
            self.company_email = Some(value.clone());
        }
        if let Some(ref value) = patch.theme_color {
            self.theme_color = Some(value.clone());
        }
        if let Some(ref value) = patch.default_currency {
            self.default_currency = value.clone();
        }
        if let Some(value) = patch.tax_rate {
            self.tax_rate = value;
        }
        if let Some(value) = patch.quotation_validity_days {
            self.quotation_validity_days = value;
        }
        if let Some(value) = patch.dark_mode {
            self.dark_mode = value;
        }
        if let Some(value) = patch.compact_mode {
            self.compact_mode = value;
        }
        if let Some(value) = patch.email_notifications {
            self.email_notifications = value;
        }
        if let Some(value) = patch.auto_save_drafts {
            self.auto_save_drafts = value;
        }
    }
}

/// Partial settings update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSettings {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub company_email: Option<String>,
    pub tax_rate: Option<Decimal>,
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub default_currency: Option<String>,
    #[validate(range(min = 1, max = 365, message = "Validity must be between 1 and 365 days"))]
    pub quotation_validity_days: Option<i32>,
    pub theme_color: Option<String>,
    pub dark_mode: Option<bool>,
    pub compact_mode: Option<bool>,
    pub email_notifications: Option<bool>,
    pub auto_save_drafts: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut settings = Settings {
            company_name: Some("SinghaBuild".to_string()),
            ..Settings::default()
        };
        let patch = UpdateSettings {
            company_phone: Some("011-2345678".to_string()),
            dark_mode: Some(true),
            ..UpdateSettings::default()
        };
        settings.apply(&patch);

        assert_eq!(settings.company_name.as_deref(), Some("SinghaBuild"));
        assert_eq!(settings.company_phone.as_deref(), Some("011-2345678"));
        assert!(settings.dark_mode);
        assert_eq!(settings.default_currency, "LKR");
    }

    #[test]
    fn test_validation() {
        let patch = UpdateSettings {
            default_currency: Some("RUPEES".to_string()),
            ..UpdateSettings::default()
        };
        assert!(patch.validate().is_err());
        let patch = UpdateSettings {
            quotation_validity_days: Some(0),
            ..UpdateSettings::default()
        };
        assert!(patch.validate().is_err());
    }
}
