//! Named regulation rules and their typed views.
//!
//! Rules are stored as an opaque `name -> {key: number}` map. Each consumer
//! parses the keys it cares about into a typed kind at use time; a flight
//! that references no rule, or a rule that does not exist, gets the
//! unconstrained default.

use aerodesk_core::repository::RuleRepository;
use aerodesk_core::{CoreError, CoreResult};
use aerodesk_shared::Rule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const MIN_FLIGHT_TIME: &str = "min_flight_time";
pub const MAX_TRANSIT_AIRPORTS: &str = "max_transit_airports";
pub const MIN_STOP: &str = "min";
pub const MAX_STOP: &str = "max";
pub const PRICE_MULTIPLIER: &str = "price_multiplier";
pub const MAX_BOOKING_DAYS: &str = "max_booking_days_before_departure";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule {rule}: value of {key} must be a finite number")]
    NonFinite { rule: String, key: String },

    #[error("rule {rule}: {key} must not be negative")]
    Negative { rule: String, key: String },

    #[error("rule {rule}: {key} must be a whole number")]
    NotIntegral { rule: String, key: String },
}

impl From<RuleError> for CoreError {
    fn from(err: RuleError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

fn non_negative(rule: &Rule, key: &str) -> Result<Option<f64>, RuleError> {
    match rule.value(key) {
        None => Ok(None),
        Some(v) if !v.is_finite() => Err(RuleError::NonFinite {
            rule: rule.name.clone(),
            key: key.to_string(),
        }),
        Some(v) if v < 0.0 => Err(RuleError::Negative {
            rule: rule.name.clone(),
            key: key.to_string(),
        }),
        Some(v) => Ok(Some(v)),
    }
}

fn whole(rule: &Rule, key: &str) -> Result<Option<i64>, RuleError> {
    match non_negative(rule, key)? {
        None => Ok(None),
        Some(v) if v.fract() != 0.0 => Err(RuleError::NotIntegral {
            rule: rule.name.clone(),
            key: key.to_string(),
        }),
        Some(v) => Ok(Some(v as i64)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightTimeRule {
    pub min_flight_time: Option<i64>,
}

impl FlightTimeRule {
    pub fn from_rule(rule: &Rule) -> Result<Self, RuleError> {
        Ok(Self {
            min_flight_time: whole(rule, MIN_FLIGHT_TIME)?,
        })
    }
}

/// Bounds on transit stops. Stop bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateRule {
    pub max_transit_airports: Option<usize>,
    pub min_stop: Option<i64>,
    pub max_stop: Option<i64>,
}

impl IntermediateRule {
    pub fn from_rule(rule: &Rule) -> Result<Self, RuleError> {
        Ok(Self {
            max_transit_airports: whole(rule, MAX_TRANSIT_AIRPORTS)?.map(|v| v as usize),
            min_stop: whole(rule, MIN_STOP)?,
            max_stop: whole(rule, MAX_STOP)?,
        })
    }
}

/// Per-class price multipliers: `price_multiplier_<class>` wins over the
/// plain `price_multiplier` fallback, which wins over 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketClassRule {
    pub fallback: Option<f64>,
    pub multipliers: BTreeMap<String, f64>,
}

impl TicketClassRule {
    pub fn from_rule(rule: &Rule) -> Result<Self, RuleError> {
        let prefix = format!("{}_", PRICE_MULTIPLIER);
        let mut multipliers = BTreeMap::new();
        for key in rule.values.keys() {
            if let Some(class) = key.strip_prefix(&prefix) {
                if let Some(m) = non_negative(rule, key)? {
                    multipliers.insert(class.to_string(), m);
                }
            }
        }

        Ok(Self {
            fallback: non_negative(rule, PRICE_MULTIPLIER)?,
            multipliers,
        })
    }

    pub fn multiplier(&self, class_label: &str) -> f64 {
        self.multipliers
            .get(class_label)
            .copied()
            .or(self.fallback)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindowRule {
    /// Days after departure that booking stays open. 0 closes booking at departure.
    pub max_days: i64,
}

impl BookingWindowRule {
    pub fn from_rule(rule: &Rule) -> Result<Self, RuleError> {
        Ok(Self {
            max_days: whole(rule, MAX_BOOKING_DAYS)?.unwrap_or(0),
        })
    }
}

#[derive(Clone)]
pub struct RuleStore {
    repo: Arc<dyn RuleRepository>,
}

impl RuleStore {
    pub fn new(repo: Arc<dyn RuleRepository>) -> Self {
        Self { repo }
    }

    pub async fn upsert(
        &self,
        name: &str,
        code: &str,
        detail: Option<String>,
        values: BTreeMap<String, f64>,
    ) -> CoreResult<Rule> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RuleError::EmptyName.into());
        }
        if let Some(key) = values.iter().find(|(_, v)| !v.is_finite()).map(|(k, _)| k) {
            return Err(RuleError::NonFinite {
                rule: name.to_string(),
                key: key.clone(),
            }
            .into());
        }

        let rule = Rule::new(name.to_string(), code.to_string(), detail, values);
        let stored = self.repo.upsert_rule(&rule).await?;
        info!("Rule {} stored ({} values)", stored.name, stored.values.len());
        Ok(stored)
    }

    pub async fn get(&self, name: &str) -> CoreResult<Rule> {
        self.repo
            .get_rule(name)
            .await?
            .ok_or_else(|| CoreError::not_found("Rule", name))
    }

    pub async fn delete(&self, name: &str) -> CoreResult<()> {
        if !self.repo.delete_rule(name).await? {
            return Err(CoreError::not_found("Rule", name));
        }
        info!("Rule {} deleted", name);
        Ok(())
    }

    pub async fn list_all(&self) -> CoreResult<Vec<Rule>> {
        Ok(self.repo.list_rules().await?)
    }

    async fn resolve(&self, name: Option<&str>) -> CoreResult<Option<Rule>> {
        match name {
            Some(name) => Ok(self.repo.get_rule(name).await?),
            None => Ok(None),
        }
    }

    pub async fn flight_time(&self, name: Option<&str>) -> CoreResult<FlightTimeRule> {
        match self.resolve(name).await? {
            Some(rule) => Ok(FlightTimeRule::from_rule(&rule)?),
            None => Ok(FlightTimeRule::default()),
        }
    }

    pub async fn intermediate(&self, name: Option<&str>) -> CoreResult<IntermediateRule> {
        match self.resolve(name).await? {
            Some(rule) => Ok(IntermediateRule::from_rule(&rule)?),
            None => Ok(IntermediateRule::default()),
        }
    }

    pub async fn ticket_class(&self, name: Option<&str>) -> CoreResult<TicketClassRule> {
        match self.resolve(name).await? {
            Some(rule) => Ok(TicketClassRule::from_rule(&rule)?),
            None => Ok(TicketClassRule::default()),
        }
    }

    pub async fn booking_window(&self, name: Option<&str>) -> CoreResult<BookingWindowRule> {
        match self.resolve(name).await? {
            Some(rule) => Ok(BookingWindowRule::from_rule(&rule)?),
            None => Ok(BookingWindowRule::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerodesk_store::InMemoryRuleRepository;

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn store() -> RuleStore {
        RuleStore::new(Arc::new(InMemoryRuleRepository::new()))
    }

    #[test]
    fn test_ticket_class_multiplier_fallbacks() {
        let rule = Rule::new(
            "ticket_class".into(),
            "TC".into(),
            None,
            values(&[("price_multiplier_1", 1.5), ("price_multiplier", 1.2)]),
        );
        let typed = TicketClassRule::from_rule(&rule).unwrap();
        assert_eq!(typed.multiplier("1"), 1.5);
        assert_eq!(typed.multiplier("2"), 1.2);
        assert_eq!(TicketClassRule::default().multiplier("1"), 1.0);
    }

    #[test]
    fn test_negative_and_fractional_values_rejected() {
        let rule = Rule::new(
            "flight_time".into(),
            "FT".into(),
            None,
            values(&[("min_flight_time", -5.0)]),
        );
        assert_eq!(
            FlightTimeRule::from_rule(&rule),
            Err(RuleError::Negative {
                rule: "flight_time".into(),
                key: "min_flight_time".into()
            })
        );

        let rule = Rule::new(
            "intermediate".into(),
            "IM".into(),
            None,
            values(&[("max_transit_airports", 1.5)]),
        );
        assert!(matches!(
            IntermediateRule::from_rule(&rule),
            Err(RuleError::NotIntegral { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_rule_is_unconstrained() {
        let store = store();
        assert_eq!(
            store.flight_time(Some("nope")).await.unwrap(),
            FlightTimeRule::default()
        );
        assert_eq!(store.booking_window(None).await.unwrap().max_days, 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_name() {
        let store = store();
        let first = store
            .upsert("flight_time", "FT", None, values(&[("min_flight_time", 30.0)]))
            .await
            .unwrap();
        let second = store
            .upsert("flight_time", "FT", None, values(&[("min_flight_time", 45.0)]))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(
            store.flight_time(Some("flight_time")).await.unwrap().min_flight_time,
            Some(45)
        );
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_bad_input() {
        let store = store();
        let err = store.upsert("  ", "X", None, BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let err = store
            .upsert("ticket_class", "TC", None, values(&[("price_multiplier", f64::NAN)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_rule() {
        let store = store();
        assert!(matches!(
            store.get("flight_time").await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("flight_time").await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
