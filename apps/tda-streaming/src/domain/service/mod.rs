//! Service Catalog
//!
//! Every stream the server can push is a *service*. Each service has a
//! static [`ServiceDescriptor`] declaring how its payload fields are laid out
//! and which operations it accepts.
//!
//! | Service | Layout | Subscribable |
//! |---------|--------|--------------|
//! | `QUOTE`, `OPTION`, `LEVELONE_*` | flat | yes |
//! | `CHART_EQUITY`, `CHART_FUTURES` | flat | yes |
//! | `TIMESALE_*` | flat (shared) | yes |
//! | `NEWS_HEADLINE` | flat | yes |
//! | `ACCT_ACTIVITY` | flat | yes, keyed by stream key |
//! | `LISTED_BOOK`, `NASDAQ_BOOK`, `OPTIONS_BOOK` | nested book | yes |
//! | `ADMIN` | none | no |
//! | `HEARTBEAT` | none | no, never dispatched |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{FieldRegistry, tables};

// =============================================================================
// Service
// =============================================================================

/// A named stream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Service {
    /// Session administration (login, logout, quality of service).
    Admin,
    /// Server keep-alive; synthesised for bare heartbeat entries.
    Heartbeat,
    /// Account activity for the logged-in account.
    #[serde(rename = "ACCT_ACTIVITY")]
    AccountActivity,
    /// Level one equity quotes.
    Quote,
    /// Level one option quotes.
    Option,
    /// Level one futures quotes.
    #[serde(rename = "LEVELONE_FUTURES")]
    LevelOneFutures,
    /// Level one forex quotes.
    #[serde(rename = "LEVELONE_FOREX")]
    LevelOneForex,
    /// Level one futures option quotes.
    #[serde(rename = "LEVELONE_FUTURES_OPTIONS")]
    LevelOneFuturesOptions,
    /// Minute candles for equities.
    ChartEquity,
    /// Minute candles for futures.
    ChartFutures,
    /// Equity time and sales.
    TimesaleEquity,
    /// Futures time and sales.
    TimesaleFutures,
    /// Option time and sales.
    TimesaleOptions,
    /// News headlines.
    NewsHeadline,
    /// NYSE order book.
    ListedBook,
    /// NASDAQ order book.
    NasdaqBook,
    /// Options order book.
    OptionsBook,
}

impl Service {
    /// Every service in the catalog.
    pub const ALL: [Self; 17] = [
        Self::Admin,
        Self::Heartbeat,
        Self::AccountActivity,
        Self::Quote,
        Self::Option,
        Self::LevelOneFutures,
        Self::LevelOneForex,
        Self::LevelOneFuturesOptions,
        Self::ChartEquity,
        Self::ChartFutures,
        Self::TimesaleEquity,
        Self::TimesaleFutures,
        Self::TimesaleOptions,
        Self::NewsHeadline,
        Self::ListedBook,
        Self::NasdaqBook,
        Self::OptionsBook,
    ];

    /// Wire name of the service.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Heartbeat => "HEARTBEAT",
            Self::AccountActivity => "ACCT_ACTIVITY",
            Self::Quote => "QUOTE",
            Self::Option => "OPTION",
            Self::LevelOneFutures => "LEVELONE_FUTURES",
            Self::LevelOneForex => "LEVELONE_FOREX",
            Self::LevelOneFuturesOptions => "LEVELONE_FUTURES_OPTIONS",
            Self::ChartEquity => "CHART_EQUITY",
            Self::ChartFutures => "CHART_FUTURES",
            Self::TimesaleEquity => "TIMESALE_EQUITY",
            Self::TimesaleFutures => "TIMESALE_FUTURES",
            Self::TimesaleOptions => "TIMESALE_OPTIONS",
            Self::NewsHeadline => "NEWS_HEADLINE",
            Self::ListedBook => "LISTED_BOOK",
            Self::NasdaqBook => "NASDAQ_BOOK",
            Self::OptionsBook => "OPTIONS_BOOK",
        }
    }

    /// Static descriptor for this service.
    #[must_use]
    pub fn descriptor(&self) -> &'static ServiceDescriptor {
        match self {
            Self::Admin => &ADMIN,
            Self::Heartbeat => &HEARTBEAT,
            Self::AccountActivity => &ACCOUNT_ACTIVITY,
            Self::Quote => &QUOTE,
            Self::Option => &OPTION,
            Self::LevelOneFutures => &LEVELONE_FUTURES,
            Self::LevelOneForex => &LEVELONE_FOREX,
            Self::LevelOneFuturesOptions => &LEVELONE_FUTURES_OPTIONS,
            Self::ChartEquity => &CHART_EQUITY,
            Self::ChartFutures => &CHART_FUTURES,
            Self::TimesaleEquity => &TIMESALE_EQUITY,
            Self::TimesaleFutures => &TIMESALE_FUTURES,
            Self::TimesaleOptions => &TIMESALE_OPTIONS,
            Self::NewsHeadline => &NEWS_HEADLINE,
            Self::ListedBook => &LISTED_BOOK,
            Self::NasdaqBook => &NASDAQ_BOOK,
            Self::OptionsBook => &OPTIONS_BOOK,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a service name is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service: {0}")]
pub struct UnknownService(pub String);

impl FromStr for Service {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

// =============================================================================
// Command
// =============================================================================

/// Request command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    /// Admin login handshake.
    Login,
    /// Admin logout.
    Logout,
    /// Admin quality-of-service change.
    Qos,
    /// Subscribe, replacing any prior subscription for the service.
    Subs,
    /// Append symbols to the existing subscription.
    Add,
    /// Remove symbols from the subscription.
    Unsubs,
}

impl Command {
    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Qos => "QOS",
            Self::Subs => "SUBS",
            Self::Add => "ADD",
            Self::Unsubs => "UNSUBS",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Quality of Service
// =============================================================================

/// Server-side update rate for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QosLevel {
    /// 500 ms between updates.
    Express,
    /// 750 ms between updates.
    RealTime,
    /// 1,000 ms between updates (server default).
    #[default]
    Fast,
    /// 1,500 ms between updates.
    Moderate,
    /// 3,000 ms between updates.
    Slow,
    /// 5,000 ms between updates.
    Delayed,
}

impl QosLevel {
    /// Wire code sent in the `qoslevel` parameter.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Express => "0",
            Self::RealTime => "1",
            Self::Fast => "2",
            Self::Moderate => "3",
            Self::Slow => "4",
            Self::Delayed => "5",
        }
    }

    /// Parse from a level name (`"express"`, `"REAL_TIME"`) or wire code.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "0" | "EXPRESS" => Some(Self::Express),
            "1" | "REAL_TIME" | "REALTIME" => Some(Self::RealTime),
            "2" | "FAST" => Some(Self::Fast),
            "3" | "MODERATE" => Some(Self::Moderate),
            "4" | "SLOW" => Some(Self::Slow),
            "5" | "DELAYED" => Some(Self::Delayed),
            _ => None,
        }
    }
}

// =============================================================================
// Service Descriptor
// =============================================================================

/// How a service's content entries are relabeled.
#[derive(Debug, Clone, Copy)]
pub enum FieldLayout {
    /// No data fields (admin, heartbeat).
    None,
    /// One flat registry for every content entry.
    Flat(&'static FieldRegistry),
    /// Order book: top-level fields, then each price level, then each
    /// per-exchange entry within a level.
    Book,
}

/// Static description of a service.
#[derive(Debug)]
pub struct ServiceDescriptor {
    /// The service described.
    pub service: Service,
    /// Field layout of content entries.
    pub layout: FieldLayout,
    /// Whether SUBS/ADD/UNSUBS are accepted.
    pub subscribable: bool,
    /// Whether handlers may be registered.
    pub dispatchable: bool,
}

impl ServiceDescriptor {
    const fn data(service: Service, layout: FieldLayout) -> Self {
        Self {
            service,
            layout,
            subscribable: true,
            dispatchable: true,
        }
    }

    /// Registry that validates subscription fields.
    ///
    /// Book services subscribe with their top-level fields.
    #[must_use]
    pub fn registry(&self) -> Option<&'static FieldRegistry> {
        match self.layout {
            FieldLayout::None => None,
            FieldLayout::Flat(registry) => Some(registry),
            FieldLayout::Book => Some(&tables::book::REGISTRY),
        }
    }

    /// Relabel one content entry in place.
    pub fn relabel(&self, entry: &mut Value) {
        match self.layout {
            FieldLayout::None => {}
            FieldLayout::Flat(registry) => registry.relabel_value(entry),
            FieldLayout::Book => relabel_book(entry),
        }
    }
}

/// Relabel an order book entry outer-to-inner.
///
/// Inner stages find the nested lists by their relabeled names, so the top
/// level must be renamed first.
fn relabel_book(entry: &mut Value) {
    tables::book::REGISTRY.relabel_value(entry);

    relabel_levels(
        entry,
        tables::book::BIDS.name(),
        &tables::book_bid::REGISTRY,
        tables::book_bid::BIDS.name(),
        &tables::book_bid_exchange::REGISTRY,
    );
    relabel_levels(
        entry,
        tables::book::ASKS.name(),
        &tables::book_ask::REGISTRY,
        tables::book_ask::ASKS.name(),
        &tables::book_ask_exchange::REGISTRY,
    );
}

fn relabel_levels(
    entry: &mut Value,
    side: &str,
    level_registry: &FieldRegistry,
    exchanges: &str,
    exchange_registry: &FieldRegistry,
) {
    let Some(Value::Array(levels)) = entry.get_mut(side) else {
        return;
    };

    for level in levels {
        level_registry.relabel_value(level);

        if let Some(Value::Array(per_exchange)) = level.get_mut(exchanges) {
            for exchange in per_exchange {
                exchange_registry.relabel_value(exchange);
            }
        }
    }
}

static ADMIN: ServiceDescriptor = ServiceDescriptor {
    service: Service::Admin,
    layout: FieldLayout::None,
    subscribable: false,
    dispatchable: true,
};
static HEARTBEAT: ServiceDescriptor = ServiceDescriptor {
    service: Service::Heartbeat,
    layout: FieldLayout::None,
    subscribable: false,
    dispatchable: false,
};
static ACCOUNT_ACTIVITY: ServiceDescriptor = ServiceDescriptor::data(
    Service::AccountActivity,
    FieldLayout::Flat(&tables::account_activity::REGISTRY),
);
static QUOTE: ServiceDescriptor =
    ServiceDescriptor::data(Service::Quote, FieldLayout::Flat(&tables::quote::REGISTRY));
static OPTION: ServiceDescriptor =
    ServiceDescriptor::data(Service::Option, FieldLayout::Flat(&tables::option::REGISTRY));
static LEVELONE_FUTURES: ServiceDescriptor = ServiceDescriptor::data(
    Service::LevelOneFutures,
    FieldLayout::Flat(&tables::futures::REGISTRY),
);
static LEVELONE_FOREX: ServiceDescriptor = ServiceDescriptor::data(
    Service::LevelOneForex,
    FieldLayout::Flat(&tables::forex::REGISTRY),
);
static LEVELONE_FUTURES_OPTIONS: ServiceDescriptor = ServiceDescriptor::data(
    Service::LevelOneFuturesOptions,
    FieldLayout::Flat(&tables::futures_options::REGISTRY),
);
static CHART_EQUITY: ServiceDescriptor = ServiceDescriptor::data(
    Service::ChartEquity,
    FieldLayout::Flat(&tables::chart_equity::REGISTRY),
);
static CHART_FUTURES: ServiceDescriptor = ServiceDescriptor::data(
    Service::ChartFutures,
    FieldLayout::Flat(&tables::chart_futures::REGISTRY),
);
static TIMESALE_EQUITY: ServiceDescriptor = ServiceDescriptor::data(
    Service::TimesaleEquity,
    FieldLayout::Flat(&tables::timesale::REGISTRY),
);
static TIMESALE_FUTURES: ServiceDescriptor = ServiceDescriptor::data(
    Service::TimesaleFutures,
    FieldLayout::Flat(&tables::timesale::REGISTRY),
);
static TIMESALE_OPTIONS: ServiceDescriptor = ServiceDescriptor::data(
    Service::TimesaleOptions,
    FieldLayout::Flat(&tables::timesale::REGISTRY),
);
static NEWS_HEADLINE: ServiceDescriptor = ServiceDescriptor::data(
    Service::NewsHeadline,
    FieldLayout::Flat(&tables::news_headline::REGISTRY),
);
static LISTED_BOOK: ServiceDescriptor =
    ServiceDescriptor::data(Service::ListedBook, FieldLayout::Book);
static NASDAQ_BOOK: ServiceDescriptor =
    ServiceDescriptor::data(Service::NasdaqBook, FieldLayout::Book);
static OPTIONS_BOOK: ServiceDescriptor =
    ServiceDescriptor::data(Service::OptionsBook, FieldLayout::Book);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_names_round_trip() {
        for service in Service::ALL {
            assert_eq!(service.as_str().parse::<Service>(), Ok(service));
            assert_eq!(service.descriptor().service, service);
        }
    }

    #[test]
    fn service_serde_matches_wire_name() {
        for service in Service::ALL {
            let json = serde_json::to_value(service).unwrap();
            assert_eq!(json, Value::String(service.as_str().to_string()));
        }
    }

    #[test]
    fn unknown_service_fails() {
        assert!("CHART_HISTORY".parse::<Service>().is_err());
    }

    #[test]
    fn admin_and_heartbeat_are_not_subscribable() {
        assert!(!Service::Admin.descriptor().subscribable);
        assert!(!Service::Heartbeat.descriptor().subscribable);
        assert!(!Service::Heartbeat.descriptor().dispatchable);
        assert!(Service::Quote.descriptor().subscribable);
    }

    #[test]
    fn qos_parsing() {
        assert_eq!(QosLevel::from_str_case_insensitive("express"), Some(QosLevel::Express));
        assert_eq!(QosLevel::from_str_case_insensitive("REAL_TIME"), Some(QosLevel::RealTime));
        assert_eq!(QosLevel::from_str_case_insensitive("5"), Some(QosLevel::Delayed));
        assert_eq!(QosLevel::from_str_case_insensitive("turbo"), None);
        assert_eq!(QosLevel::Moderate.code(), "3");
    }

    #[test]
    fn flat_relabel_uses_service_registry() {
        let mut entry = json!({"key": "ES", "1": 4000.25, "2": 4000.5});
        Service::LevelOneFutures.descriptor().relabel(&mut entry);
        assert_eq!(entry, json!({"key": "ES", "BID_PRICE": 4000.25, "ASK_PRICE": 4000.5}));
    }

    #[test]
    fn book_relabel_recurses_into_levels_and_exchanges() {
        let mut entry = json!({
            "key": "GOOG",
            "1": 1_590_532_470_149_u64,
            "2": [
                {"0": 1424.0, "1": 300, "2": 2, "3": [
                    {"0": "NSDQ", "1": 200, "2": 1_590_532_470_114_u64},
                    {"0": "ARCX", "1": 100, "2": 1_590_532_469_949_u64}
                ]}
            ],
            "3": [
                {"0": 1424.5, "1": 100, "2": 1, "3": [
                    {"0": "NSDQ", "1": 100, "2": 1_590_532_470_149_u64}
                ]}
            ]
        });

        Service::NasdaqBook.descriptor().relabel(&mut entry);

        assert_eq!(entry["BOOK_TIME"], json!(1_590_532_470_149_u64));
        let bid = &entry["BIDS"][0];
        assert_eq!(bid["BID_PRICE"], json!(1424.0));
        assert_eq!(bid["NUM_BIDS"], json!(2));
        assert_eq!(bid["BIDS"][1]["EXCHANGE"], json!("ARCX"));
        assert_eq!(bid["BIDS"][1]["BID_VOLUME"], json!(100));
        let ask = &entry["ASKS"][0];
        assert_eq!(ask["ASK_PRICE"], json!(1424.5));
        assert_eq!(ask["ASKS"][0]["ASK_VOLUME"], json!(100));
        assert_eq!(ask["ASKS"][0]["SEQUENCE"], json!(1_590_532_470_149_u64));
    }

    #[test]
    fn book_relabel_tolerates_missing_sides() {
        let mut entry = json!({"key": "GOOG", "1": 1});
        Service::ListedBook.descriptor().relabel(&mut entry);
        assert_eq!(entry, json!({"key": "GOOG", "BOOK_TIME": 1}));
    }
}
