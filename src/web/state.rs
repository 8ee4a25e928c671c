use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::{AppConfig, ServerSettings};
use crate::error::FeasibilityError;
use crate::models::{Defaults, ParameterSet};
use crate::rates::{CachedRate, RateProvider, RateQuote, SharedRate};

type ScenarioMap = HashMap<Uuid, (Instant, ParameterSet)>;

pub struct AppState {
    /// Scenarios keyed by session id, stamped with their last update.
    scenarios: Mutex<ScenarioMap>,
    rate: CachedRate<SharedRate>,
    defaults: Defaults,
    session_ttl: Duration,
    max_sessions: usize,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, FeasibilityError> {
        let quote = match &config.exchange_rate {
            Some(settings) => settings.to_provider()?.get_rate(),
            None => RateQuote::unavailable(),
        };
        Ok(Self {
            scenarios: Mutex::new(HashMap::new()),
            rate: CachedRate::new(SharedRate::new(quote)),
            defaults: config.defaults.clone(),
            session_ttl: Duration::from_secs(config.server.session_ttl_secs),
            max_sessions: config.server.max_sessions.max(1),
        })
    }

    /// State with built-in defaults and no exchange rate.
    pub fn new_in_memory() -> Self {
        let server = ServerSettings::default();
        Self {
            scenarios: Mutex::new(HashMap::new()),
            rate: CachedRate::new(SharedRate::new(RateQuote::unavailable())),
            defaults: Defaults::default(),
            session_ttl: Duration::from_secs(server.session_ttl_secs),
            max_sessions: server.max_sessions,
        }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn get_scenario(&self, id: &Uuid) -> Option<ParameterSet> {
        let mut map = self.scenarios.lock().expect("scenarios mutex poisoned");
        evict_expired(&mut map, self.session_ttl);
        map.get(id).map(|(_, params)| params.clone())
    }

    pub fn insert_scenario(&self, id: Uuid, params: ParameterSet) {
        let mut map = self.scenarios.lock().expect("scenarios mutex poisoned");
        evict_expired(&mut map, self.session_ttl);
        if map.len() >= self.max_sessions {
            evict_oldest(&mut map);
        }
        map.insert(id, (Instant::now(), params));
    }

    /// Replace a stored scenario with `update(current)` and refresh its
    /// timestamp. Returns `None` when the id is unknown or expired.
    pub fn update_scenario<F>(&self, id: &Uuid, update: F) -> Option<ParameterSet>
    where
        F: FnOnce(&ParameterSet) -> ParameterSet,
    {
        let mut map = self.scenarios.lock().expect("scenarios mutex poisoned");
        evict_expired(&mut map, self.session_ttl);
        let entry = map.get_mut(id)?;
        let next = update(&entry.1);
        *entry = (Instant::now(), next.clone());
        Some(next)
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.lock().expect("scenarios mutex poisoned").len()
    }

    pub fn exchange_rate(&self) -> RateQuote {
        self.rate.get_rate()
    }

    pub fn set_exchange_rate(&self, quote: RateQuote) -> Result<(), FeasibilityError> {
        self.rate.provider().set(quote)?;
        self.rate.invalidate();
        Ok(())
    }

    /// The rate for a request: the one it supplied, else the stored quote.
    pub fn effective_rate(&self, requested: Option<f64>) -> Option<f64> {
        requested.or_else(|| self.exchange_rate().rate)
    }
}

fn evict_expired(map: &mut ScenarioMap, ttl: Duration) {
    map.retain(|_, (touched, _)| touched.elapsed() < ttl);
}

fn evict_oldest(map: &mut ScenarioMap) {
    if let Some(oldest_id) = map.iter().min_by_key(|(_, (t, _))| *t).map(|(id, _)| *id) {
        map.remove(&oldest_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(max_sessions: usize, session_ttl_secs: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.max_sessions = max_sessions;
        config.server.session_ttl_secs = session_ttl_secs;
        config
    }

    #[test]
    fn test_insert_and_get() {
        let state = AppState::new_in_memory();
        let id = Uuid::new_v4();
        state.insert_scenario(id, ParameterSet::new());
        assert_eq!(state.get_scenario(&id), Some(ParameterSet::new()));
        assert!(state.get_scenario(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let state = AppState::new(&config_with(2, 3600)).unwrap();
        let first = Uuid::new_v4();
        state.insert_scenario(first, ParameterSet::new());
        std::thread::sleep(Duration::from_millis(2));
        state.insert_scenario(Uuid::new_v4(), ParameterSet::new());
        std::thread::sleep(Duration::from_millis(2));
        state.insert_scenario(Uuid::new_v4(), ParameterSet::new());
        assert_eq!(state.scenario_count(), 2);
        assert!(state.get_scenario(&first).is_none());
    }

    #[test]
    fn test_expired_sessions_dropped() {
        let state = AppState::new(&config_with(10, 0)).unwrap();
        let id = Uuid::new_v4();
        state.insert_scenario(id, ParameterSet::new());
        assert!(state.get_scenario(&id).is_none());
    }

    #[test]
    fn test_update_scenario() {
        let state = AppState::new_in_memory();
        let id = Uuid::new_v4();
        state.insert_scenario(id, ParameterSet::new());
        let updated = state
            .update_scenario(&id, |p| ParameterSet {
                far_ratio: Some(2.0),
                ..p.clone()
            })
            .unwrap();
        assert_eq!(updated.far_ratio, Some(2.0));
        assert_eq!(state.get_scenario(&id).unwrap().far_ratio, Some(2.0));
        assert!(state.update_scenario(&Uuid::new_v4(), |p| p.clone()).is_none());
    }

    #[test]
    fn test_exchange_rate_from_config_and_override() {
        let config = AppConfig::from_toml_str("[exchange_rate]\nrate = 33.5").unwrap();
        let state = AppState::new(&config).unwrap();
        assert_eq!(state.exchange_rate().rate, Some(33.5));
        assert_eq!(state.effective_rate(None), Some(33.5));
        assert_eq!(state.effective_rate(Some(40.0)), Some(40.0));

        state
            .set_exchange_rate(RateQuote {
                rate: Some(35.0),
                as_of_date: None,
                source: "manual".to_string(),
            })
            .unwrap();
        assert_eq!(state.effective_rate(None), Some(35.0));
    }
}
