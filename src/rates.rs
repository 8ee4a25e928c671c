use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeasibilityError;

/// Default refresh interval for a cached quote (30 minutes).
pub const DEFAULT_RATE_TTL_SECS: u64 = 30 * 60;

/// A USD to TRY exchange-rate quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate: Option<f64>,
    pub as_of_date: Option<String>,
    pub source: String,
}

impl RateQuote {
    /// A quote with no rate, used when nothing has been supplied.
    pub fn unavailable() -> Self {
        Self {
            rate: None,
            as_of_date: None,
            source: "none".to_string(),
        }
    }

    /// Reject rates that cannot be used for conversion.
    pub fn validate(&self) -> Result<(), FeasibilityError> {
        match self.rate {
            Some(r) if !r.is_finite() || r <= 0.0 => Err(FeasibilityError::ValidationError(
                format!("exchange rate must be positive, got {r}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Source of exchange-rate quotes.
pub trait RateProvider {
    fn get_rate(&self) -> RateQuote;
}

/// A manually supplied quote.
#[derive(Debug, Clone)]
pub struct FixedRate {
    quote: RateQuote,
}

impl FixedRate {
    pub fn new(rate: f64, source: impl Into<String>) -> Result<Self, FeasibilityError> {
        Self::from_quote(RateQuote {
            rate: Some(rate),
            as_of_date: None,
            source: source.into(),
        })
    }

    pub fn from_quote(quote: RateQuote) -> Result<Self, FeasibilityError> {
        quote.validate()?;
        Ok(Self { quote })
    }
}

impl RateProvider for FixedRate {
    fn get_rate(&self) -> RateQuote {
        self.quote.clone()
    }
}

/// A quote that can be replaced at runtime, e.g. by an API call.
#[derive(Debug)]
pub struct SharedRate {
    quote: Mutex<RateQuote>,
}

impl SharedRate {
    pub fn new(quote: RateQuote) -> Self {
        Self {
            quote: Mutex::new(quote),
        }
    }

    /// Replace the current quote after validating it.
    pub fn set(&self, quote: RateQuote) -> Result<(), FeasibilityError> {
        quote.validate()?;
        *self.quote.lock().expect("rate mutex poisoned") = quote;
        Ok(())
    }
}

impl RateProvider for SharedRate {
    fn get_rate(&self) -> RateQuote {
        self.quote.lock().expect("rate mutex poisoned").clone()
    }
}

/// Wraps a provider and asks it for a new quote at most once per TTL.
pub struct CachedRate<P> {
    provider: P,
    ttl: Duration,
    cached: Mutex<Option<(Instant, RateQuote)>>,
}

impl<P: RateProvider> CachedRate<P> {
    pub fn new(provider: P) -> Self {
        Self::with_ttl(provider, Duration::from_secs(DEFAULT_RATE_TTL_SECS))
    }

    pub fn with_ttl(provider: P, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Drop the cached quote so the next read goes to the provider.
    pub fn invalidate(&self) {
        *self.cached.lock().expect("rate cache mutex poisoned") = None;
    }
}

impl<P: RateProvider> RateProvider for CachedRate<P> {
    fn get_rate(&self) -> RateQuote {
        let mut cached = self.cached.lock().expect("rate cache mutex poisoned");
        if let Some((fetched, quote)) = cached.as_ref() {
            if fetched.elapsed() < self.ttl {
                return quote.clone();
            }
        }
        let quote = self.provider.get_rate();
        debug!(rate = ?quote.rate, source = %quote.source, "refreshed exchange rate");
        *cached = Some((Instant::now(), quote.clone()));
        quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Cell<u32>,
    }

    impl RateProvider for CountingProvider {
        fn get_rate(&self) -> RateQuote {
            self.calls.set(self.calls.get() + 1);
            RateQuote {
                rate: Some(30.0 + self.calls.get() as f64),
                as_of_date: Some("2026-10-16".to_string()),
                source: "test".to_string(),
            }
        }
    }

    #[test]
    fn test_fixed_rate_returns_quote() {
        let provider = FixedRate::new(34.5, "manual").unwrap();
        let quote = provider.get_rate();
        assert_eq!(quote.rate, Some(34.5));
        assert_eq!(quote.source, "manual");
    }

    #[test]
    fn test_fixed_rate_rejects_non_positive() {
        assert!(FixedRate::new(0.0, "manual").is_err());
        assert!(FixedRate::new(-3.0, "manual").is_err());
        assert!(FixedRate::new(f64::NAN, "manual").is_err());
    }

    #[test]
    fn test_unavailable_quote_is_valid() {
        let quote = RateQuote::unavailable();
        assert!(quote.rate.is_none());
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn test_cached_rate_reuses_within_ttl() {
        let cached = CachedRate::new(CountingProvider {
            calls: Cell::new(0),
        });
        let first = cached.get_rate();
        let second = cached.get_rate();
        assert_eq!(first, second);
        assert_eq!(cached.provider.calls.get(), 1);
    }

    #[test]
    fn test_cached_rate_refreshes_after_ttl() {
        let cached = CachedRate::with_ttl(
            CountingProvider {
                calls: Cell::new(0),
            },
            Duration::ZERO,
        );
        let first = cached.get_rate();
        let second = cached.get_rate();
        assert_ne!(first.rate, second.rate);
        assert_eq!(cached.provider.calls.get(), 2);
    }

    #[test]
    fn test_shared_rate_set_and_invalidate() {
        let cached = CachedRate::new(SharedRate::new(RateQuote::unavailable()));
        assert_eq!(cached.get_rate().rate, None);

        cached
            .provider()
            .set(RateQuote {
                rate: Some(34.0),
                as_of_date: None,
                source: "manual".to_string(),
            })
            .unwrap();
        assert_eq!(cached.get_rate().rate, None);

        cached.invalidate();
        assert_eq!(cached.get_rate().rate, Some(34.0));
    }

    #[test]
    fn test_shared_rate_rejects_invalid() {
        let shared = SharedRate::new(RateQuote::unavailable());
        let bad = RateQuote {
            rate: Some(-1.0),
            as_of_date: None,
            source: "manual".to_string(),
        };
        assert!(shared.set(bad).is_err());
        assert_eq!(shared.get_rate(), RateQuote::unavailable());
    }
}
