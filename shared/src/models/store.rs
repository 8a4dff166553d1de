//! Store (tenant) Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::PaymentMethod;
use crate::error::AppError;
use crate::order::money::MAX_PRICE;

/// Subscription plan of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Free,
    Basic,
    Premium,
}

impl SubscriptionPlan {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Premium => "premium",
        }
    }
}

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Trial period, may carry an expiry
    Trial,
    /// Paid and running
    Active,
    /// Payment failed or suspended by a super admin
    Suspended,
    /// Subscription ended
    Cancelled,
}

impl SubscriptionStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(Self::Trial),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Opening hours for one weekday (0 = Sunday)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub day: u8,
    /// "HH:MM", local to the store timezone
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub closed: bool,
}

/// Named delivery area with its own fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub name: String,
    pub fee: Decimal,
    #[serde(default)]
    pub minimum_order: Option<Decimal>,
}

/// Operational settings (stored as JSONB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Percentage, e.g. 10 = 10%
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Fallback delivery fee when no zone is given
    #[serde(default)]
    pub delivery_fee: Decimal,
    /// Minimum subtotal for delivery orders
    #[serde(default)]
    pub minimum_order: Decimal,
    #[serde(default = "default_true")]
    pub accepts_dine_in: bool,
    #[serde(default = "default_true")]
    pub accepts_takeaway: bool,
    #[serde(default)]
    pub accepts_delivery: bool,
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
    #[serde(default)]
    pub delivery_zones: Vec<DeliveryZone>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_true() -> bool {
    true
}

fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![PaymentMethod::Cash, PaymentMethod::Card]
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            timezone: default_timezone(),
            tax_rate: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            minimum_order: Decimal::ZERO,
            accepts_dine_in: true,
            accepts_takeaway: true,
            accepts_delivery: false,
            payment_methods: default_payment_methods(),
            opening_hours: Vec::new(),
            delivery_zones: Vec::new(),
        }
    }
}

fn is_fee(amount: Decimal) -> bool {
    (Decimal::ZERO..=MAX_PRICE).contains(&amount)
}

impl StoreSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AppError::validation(
                "currency must be a 3-letter ISO code",
            ));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
            return Err(AppError::validation("tax_rate must be between 0 and 100"));
        }
        if !is_fee(self.delivery_fee) || !is_fee(self.minimum_order) {
            return Err(AppError::validation(format!(
                "delivery_fee and minimum_order must be between 0 and {MAX_PRICE}"
            )));
        }
        if self.payment_methods.is_empty() {
            return Err(AppError::validation(
                "at least one payment method is required",
            ));
        }
        for hours in &self.opening_hours {
            if hours.day > 6 {
                return Err(AppError::validation("opening_hours.day must be 0..=6"));
            }
            if !is_hh_mm(&hours.open) || !is_hh_mm(&hours.close) {
                return Err(AppError::validation(
                    "opening_hours times must be HH:MM",
                ));
            }
        }
        for zone in &self.delivery_zones {
            if zone.name.trim().is_empty()
                || !is_fee(zone.fee)
                || zone.minimum_order.is_some_and(|m| !is_fee(m))
            {
                return Err(AppError::validation(format!(
                    "delivery zones need a name and fees between 0 and {MAX_PRICE}"
                )));
            }
        }
        Ok(())
    }

    /// Delivery fee and minimum for the named zone, falling back to the store defaults
    pub fn delivery_terms(&self, zone: Option<&str>) -> Result<(Decimal, Decimal), AppError> {
        match zone {
            Some(name) => {
                let zone = self
                    .delivery_zones
                    .iter()
                    .find(|z| z.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| {
                        AppError::validation(format!("Unknown delivery zone '{name}'"))
                    })?;
                Ok((zone.fee, zone.minimum_order.unwrap_or(self.minimum_order)))
            }
            None => Ok((self.delivery_fee, self.minimum_order)),
        }
    }
}

fn is_hh_mm(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().is_ok_and(|h| h < 24)
        && m.parse::<u8>().is_ok_and(|m| m < 60)
}

/// Branding shown by the customer app (stored as JSONB)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCustomization {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
}

impl StoreCustomization {
    pub fn validate(&self) -> Result<(), AppError> {
        for color in [&self.primary_color, &self.secondary_color]
            .into_iter()
            .flatten()
        {
            let hex = color.strip_prefix('#').unwrap_or("");
            if !(hex.len() == 6 || hex.len() == 3) || !hex.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(AppError::validation(format!(
                    "'{color}' is not a hex color"
                )));
            }
        }
        Ok(())
    }
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub subdomain: Option<String>,
    pub owner_id: Option<i64>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    /// Unix millis; `None` means open-ended
    pub subscription_expires_at: Option<i64>,
    pub settings: StoreSettings,
    pub customization: StoreCustomization,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Store {
    /// Whether the store may serve customers and its admins at `now` (Unix millis)
    pub fn is_operational(&self, now: i64) -> bool {
        if !self.is_active {
            return false;
        }
        let not_expired = self.subscription_expires_at.is_none_or(|exp| exp > now);
        match self.subscription_status {
            SubscriptionStatus::Active | SubscriptionStatus::Trial => not_expired,
            SubscriptionStatus::Suspended | SubscriptionStatus::Cancelled => false,
        }
    }
}

/// Customer-facing view of a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicStore {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub accepts_dine_in: bool,
    pub accepts_takeaway: bool,
    pub accepts_delivery: bool,
    pub payment_methods: Vec<PaymentMethod>,
    pub opening_hours: Vec<OpeningHours>,
    pub delivery_zones: Vec<DeliveryZone>,
    pub customization: StoreCustomization,
}

impl From<Store> for PublicStore {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            slug: store.slug,
            description: store.description,
            phone: store.phone,
            address: store.address,
            currency: store.settings.currency,
            accepts_dine_in: store.settings.accepts_dine_in,
            accepts_takeaway: store.settings.accepts_takeaway,
            accepts_delivery: store.settings.accepts_delivery,
            payment_methods: store.settings.payment_methods,
            opening_hours: store.settings.opening_hours,
            delivery_zones: store.settings.delivery_zones,
            customization: store.customization,
        }
    }
}

/// New owner account created together with a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOwnerCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Create store payload (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    /// Derived from `name` when omitted
    pub slug: Option<String>,
    pub subdomain: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub plan: Option<SubscriptionPlan>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub subscription_expires_at: Option<i64>,
    /// Either an existing user to promote, or a new owner account
    pub owner_id: Option<i64>,
    pub owner: Option<StoreOwnerCreate>,
    pub settings: Option<StoreSettings>,
    pub customization: Option<StoreCustomization>,
}

/// Update store payload (super admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub subdomain: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub settings: Option<StoreSettings>,
    pub customization: Option<StoreCustomization>,
}

/// Update own store payload (store admin); plan and status are not editable here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettingsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub settings: Option<StoreSettings>,
    pub customization: Option<StoreCustomization>,
}

/// Subscription change payload (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub plan: Option<SubscriptionPlan>,
    pub status: Option<SubscriptionStatus>,
    /// `Some(None)` is not expressible in JSON; send `clear_expiry` to remove it
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub clear_expiry: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(status: SubscriptionStatus, expires_at: Option<i64>, is_active: bool) -> Store {
        Store {
            id: 1,
            name: "Luigi".into(),
            slug: "luigi".into(),
            subdomain: None,
            owner_id: None,
            description: None,
            phone: None,
            email: None,
            address: None,
            plan: SubscriptionPlan::Basic,
            subscription_status: status,
            subscription_expires_at: expires_at,
            settings: StoreSettings::default(),
            customization: StoreCustomization::default(),
            is_active,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_operational_rules() {
        let now = 1_000;
        assert!(store(SubscriptionStatus::Active, None, true).is_operational(now));
        assert!(store(SubscriptionStatus::Trial, Some(2_000), true).is_operational(now));
        assert!(!store(SubscriptionStatus::Trial, Some(500), true).is_operational(now));
        assert!(!store(SubscriptionStatus::Active, Some(1_000), true).is_operational(now));
        assert!(!store(SubscriptionStatus::Suspended, None, true).is_operational(now));
        assert!(!store(SubscriptionStatus::Cancelled, None, true).is_operational(now));
        assert!(!store(SubscriptionStatus::Active, None, false).is_operational(now));
    }

    #[test]
    fn test_status_db_roundtrip() {
        for s in ["trial", "active", "suspended", "cancelled"] {
            assert_eq!(SubscriptionStatus::from_db(s).unwrap().as_db(), s);
        }
        for p in ["free", "basic", "premium"] {
            assert_eq!(SubscriptionPlan::from_db(p).unwrap().as_db(), p);
        }
        assert!(SubscriptionStatus::from_db("ACTIVE").is_none());
    }

    #[test]
    fn test_settings_defaults_from_empty_json() {
        let settings: StoreSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, StoreSettings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = StoreSettings {
            tax_rate: Decimal::new(101, 0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        settings.tax_rate = Decimal::new(8, 0);
        settings.currency = "usd".into();
        assert!(settings.validate().is_err());

        settings.currency = "EUR".into();
        settings.opening_hours.push(OpeningHours {
            day: 1,
            open: "9:00".into(),
            close: "22:00".into(),
            closed: false,
        });
        assert!(settings.validate().is_err());

        settings.opening_hours[0].open = "09:00".into();
        assert!(settings.validate().is_ok());

        settings.payment_methods.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_delivery_terms() {
        let settings = StoreSettings {
            delivery_fee: Decimal::new(300, 2),
            minimum_order: Decimal::new(1000, 2),
            delivery_zones: vec![DeliveryZone {
                name: "Centro".into(),
                fee: Decimal::new(150, 2),
                minimum_order: None,
            }],
            ..Default::default()
        };

        assert_eq!(
            settings.delivery_terms(None).unwrap(),
            (Decimal::new(300, 2), Decimal::new(1000, 2))
        );
        assert_eq!(
            settings.delivery_terms(Some("centro")).unwrap(),
            (Decimal::new(150, 2), Decimal::new(1000, 2))
        );
        assert!(settings.delivery_terms(Some("Nowhere")).is_err());
    }

    #[test]
    fn test_customization_colors() {
        let mut custom = StoreCustomization {
            primary_color: Some("#ff6600".into()),
            secondary_color: Some("#FFF".into()),
            ..Default::default()
        };
        assert!(custom.validate().is_ok());

        custom.primary_color = Some("orange".into());
        assert!(custom.validate().is_err());
    }

    #[test]
    fn test_public_store_hides_subscription() {
        let public = PublicStore::from(store(SubscriptionStatus::Active, None, true));
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("plan").is_none());
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["currency"], "USD");
    }

    #[test]
    fn test_settings_fees_are_bounded() {
        let too_much = MAX_PRICE + Decimal::ONE;
        let settings = StoreSettings {
            delivery_fee: too_much,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = StoreSettings {
            minimum_order: too_much,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let mut settings = StoreSettings {
            delivery_zones: vec![DeliveryZone {
                name: "Centro".into(),
                fee: MAX_PRICE,
                minimum_order: Some(too_much),
            }],
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        settings.delivery_zones[0].minimum_order = Some(MAX_PRICE);
        assert!(settings.validate().is_ok());
    }
}
