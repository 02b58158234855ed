//! Field tables for every streaming message shape.
//!
//! Each module exposes one [`Field`] constant per entry and a `REGISTRY`
//! static listing them in code order. Several services share a layout
//! (the three time-and-sales feeds, the three order books), in which case
//! they share the module.

use super::{Field, FieldRegistry};

macro_rules! field_table {
    ($label:literal; $($name:ident = $code:literal),+ $(,)?) => {
        $(
            #[allow(missing_docs)]
            pub const $name: Field = Field::new($code, stringify!($name));
        )+

        /// Every field of this message shape, in code order.
        pub static REGISTRY: FieldRegistry = FieldRegistry::new($label, &[$($name),+]);
    };
}

/// Level one equity quotes (`QUOTE`).
pub mod quote {
    use super::{Field, FieldRegistry};

    field_table! {
        "QUOTE";
        SYMBOL = 0,
        BID_PRICE = 1,
        ASK_PRICE = 2,
        LAST_PRICE = 3,
        BID_SIZE = 4,
        ASK_SIZE = 5,
        ASK_ID = 6,
        BID_ID = 7,
        TOTAL_VOLUME = 8,
        LAST_SIZE = 9,
        TRADE_TIME = 10,
        QUOTE_TIME = 11,
        HIGH_PRICE = 12,
        LOW_PRICE = 13,
        BID_TICK = 14,
        CLOSE_PRICE = 15,
        EXCHANGE_ID = 16,
        MARGINABLE = 17,
        SHORTABLE = 18,
        ISLAND_BID_DEPRECATED = 19,
        ISLAND_ASK_DEPRECATED = 20,
        ISLAND_VOLUME_DEPRECATED = 21,
        QUOTE_DAY = 22,
        TRADE_DAY = 23,
        VOLATILITY = 24,
        DESCRIPTION = 25,
        LAST_ID = 26,
        DIGITS = 27,
        OPEN_PRICE = 28,
        NET_CHANGE = 29,
        HIGH_52_WEEK = 30,
        LOW_52_WEEK = 31,
        PE_RATIO = 32,
        DIVIDEND_AMOUNT = 33,
        DIVIDEND_YIELD = 34,
        ISLAND_BID_SIZE_DEPRECATED = 35,
        ISLAND_ASK_SIZE_DEPRECATED = 36,
        NAV = 37,
        FUND_PRICE = 38,
        EXCHANGE_NAME = 39,
        DIVIDEND_DATE = 40,
        IS_REGULAR_MARKET_QUOTE = 41,
        IS_REGULAR_MARKET_TRADE = 42,
        REGULAR_MARKET_LAST_PRICE = 43,
        REGULAR_MARKET_LAST_SIZE = 44,
        REGULAR_MARKET_TRADE_TIME = 45,
        REGULAR_MARKET_TRADE_DAY = 46,
        REGULAR_MARKET_NET_CHANGE = 47,
        SECURITY_STATUS = 48,
        MARK = 49,
        QUOTE_TIME_IN_LONG = 50,
        TRADE_TIME_IN_LONG = 51,
        REGULAR_MARKET_TRADE_TIME_IN_LONG = 52,
    }
}

/// Level one option quotes (`OPTION`).
pub mod option {
    use super::{Field, FieldRegistry};

    field_table! {
        "OPTION";
        SYMBOL = 0,
        DESCRIPTION = 1,
        BID_PRICE = 2,
        ASK_PRICE = 3,
        LAST_PRICE = 4,
        HIGH_PRICE = 5,
        LOW_PRICE = 6,
        CLOSE_PRICE = 7,
        TOTAL_VOLUME = 8,
        OPEN_INTEREST = 9,
        VOLATILITY = 10,
        QUOTE_TIME = 11,
        TRADE_TIME = 12,
        MONEY_INTRINSIC_VALUE = 13,
        QUOTE_DAY = 14,
        TRADE_DAY = 15,
        EXPIRATION_YEAR = 16,
        MULTIPLIER = 17,
        DIGITS = 18,
        OPEN_PRICE = 19,
        BID_SIZE = 20,
        ASK_SIZE = 21,
        LAST_SIZE = 22,
        NET_CHANGE = 23,
        STRIKE_PRICE = 24,
        CONTRACT_TYPE = 25,
        UNDERLYING = 26,
        EXPIRATION_MONTH = 27,
        DELIVERABLES = 28,
        TIME_VALUE = 29,
        EXPIRATION_DAY = 30,
        DAYS_TO_EXPIRATION = 31,
        DELTA = 32,
        GAMMA = 33,
        THETA = 34,
        VEGA = 35,
        RHO = 36,
        SECURITY_STATUS = 37,
        THEORETICAL_OPTION_VALUE = 38,
        UNDERLYING_PRICE = 39,
        UV_EXPIRATION_TYPE = 40,
        MARK = 41,
    }
}

/// Level one futures quotes (`LEVELONE_FUTURES`).
pub mod futures {
    use super::{Field, FieldRegistry};

    field_table! {
        "LEVELONE_FUTURES";
        SYMBOL = 0,
        BID_PRICE = 1,
        ASK_PRICE = 2,
        LAST_PRICE = 3,
        BID_SIZE = 4,
        ASK_SIZE = 5,
        ASK_ID = 6,
        BID_ID = 7,
        TOTAL_VOLUME = 8,
        LAST_SIZE = 9,
        QUOTE_TIME = 10,
        TRADE_TIME = 11,
        HIGH_PRICE = 12,
        LOW_PRICE = 13,
        CLOSE_PRICE = 14,
        EXCHANGE_ID = 15,
        DESCRIPTION = 16,
        LAST_ID = 17,
        OPEN_PRICE = 18,
        NET_CHANGE = 19,
        FUTURE_PERCENT_CHANGE = 20,
        EXCHANGE_NAME = 21,
        SECURITY_STATUS = 22,
        OPEN_INTEREST = 23,
        MARK = 24,
        TICK = 25,
        TICK_AMOUNT = 26,
        PRODUCT = 27,
        FUTURE_PRICE_FORMAT = 28,
        FUTURE_TRADING_HOURS = 29,
        FUTURE_IS_TRADABLE = 30,
        FUTURE_MULTIPLIER = 31,
        FUTURE_IS_ACTIVE = 32,
        FUTURE_SETTLEMENT_PRICE = 33,
        FUTURE_ACTIVE_SYMBOL = 34,
        FUTURE_EXPIRATION_DATE = 35,
    }
}

/// Level one futures option quotes (`LEVELONE_FUTURES_OPTIONS`).
pub mod futures_options {
    use super::{Field, FieldRegistry};

    field_table! {
        "LEVELONE_FUTURES_OPTIONS";
        SYMBOL = 0,
        BID_PRICE = 1,
        ASK_PRICE = 2,
        LAST_PRICE = 3,
        BID_SIZE = 4,
        ASK_SIZE = 5,
        ASK_ID = 6,
        BID_ID = 7,
        TOTAL_VOLUME = 8,
        LAST_SIZE = 9,
        QUOTE_TIME = 10,
        TRADE_TIME = 11,
        HIGH_PRICE = 12,
        LOW_PRICE = 13,
        CLOSE_PRICE = 14,
        EXCHANGE_ID = 15,
        DESCRIPTION = 16,
        LAST_ID = 17,
        OPEN_PRICE = 18,
        NET_CHANGE = 19,
        FUTURE_PERCENT_CHANGE = 20,
        EXCHANGE_NAME = 21,
        SECURITY_STATUS = 22,
        OPEN_INTEREST = 23,
        MARK = 24,
        TICK = 25,
        TICK_AMOUNT = 26,
        PRODUCT = 27,
        FUTURE_PRICE_FORMAT = 28,
        FUTURE_TRADING_HOURS = 29,
        FUTURE_IS_TRADEABLE = 30,
        FUTURE_MULTIPLIER = 31,
        FUTURE_IS_ACTIVE = 32,
        FUTURE_SETTLEMENT_PRICE = 33,
        FUTURE_ACTIVE_SYMBOL = 34,
        FUTURE_EXPIRATION_DATE = 35,
    }
}

/// Level one forex quotes (`LEVELONE_FOREX`).
pub mod forex {
    use super::{Field, FieldRegistry};

    field_table! {
        "LEVELONE_FOREX";
        SYMBOL = 0,
        BID_PRICE = 1,
        ASK_PRICE = 2,
        LAST_PRICE = 3,
        BID_SIZE = 4,
        ASK_SIZE = 5,
        TOTAL_VOLUME = 6,
        LAST_SIZE = 7,
        QUOTE_TIME = 8,
        TRADE_TIME = 9,
        HIGH_PRICE = 10,
        LOW_PRICE = 11,
        CLOSE_PRICE = 12,
        EXCHANGE_ID = 13,
        DESCRIPTION = 14,
        OPEN_PRICE = 15,
        NET_CHANGE = 16,
        PERCENT_CHANGE = 17,
        EXCHANGE_NAME = 18,
        DIGITS = 19,
        SECURITY_STATUS = 20,
        TICK = 21,
        TICK_AMOUNT = 22,
        PRODUCT = 23,
        TRADING_HOURS = 24,
        IS_TRADABLE = 25,
        MARKET_MAKER = 26,
        HIGH_52_WEEK = 27,
        LOW_52_WEEK = 28,
        MARK = 29,
    }
}

/// Minute candles for equities (`CHART_EQUITY`).
pub mod chart_equity {
    use super::{Field, FieldRegistry};

    field_table! {
        "CHART_EQUITY";
        SYMBOL = 0,
        OPEN_PRICE = 1,
        HIGH_PRICE = 2,
        LOW_PRICE = 3,
        CLOSE_PRICE = 4,
        VOLUME = 5,
        SEQUENCE = 6,
        CHART_TIME = 7,
        CHART_DAY = 8,
    }
}

/// Minute candles for futures (`CHART_FUTURES`).
pub mod chart_futures {
    use super::{Field, FieldRegistry};

    field_table! {
        "CHART_FUTURES";
        SYMBOL = 0,
        CHART_TIME = 1,
        OPEN_PRICE = 2,
        HIGH_PRICE = 3,
        LOW_PRICE = 4,
        CLOSE_PRICE = 5,
        VOLUME = 6,
    }
}

/// Time and sales prints (`TIMESALE_EQUITY`, `TIMESALE_FUTURES`, `TIMESALE_OPTIONS`).
pub mod timesale {
    use super::{Field, FieldRegistry};

    field_table! {
        "TIMESALE";
        SYMBOL = 0,
        TRADE_TIME = 1,
        LAST_PRICE = 2,
        LAST_SIZE = 3,
        LAST_SEQUENCE = 4,
    }
}

/// News headlines (`NEWS_HEADLINE`).
pub mod news_headline {
    use super::{Field, FieldRegistry};

    field_table! {
        "NEWS_HEADLINE";
        SYMBOL = 0,
        ERROR_CODE = 1,
        STORY_DATETIME = 2,
        HEADLINE_ID = 3,
        STATUS = 4,
        HEADLINE = 5,
        STORY_ID = 6,
        COUNT_FOR_KEYWORD = 7,
        KEYWORD_ARRAY = 8,
        IS_HOT = 9,
        STORY_SOURCE = 10,
    }
}

/// Account activity notifications (`ACCT_ACTIVITY`).
pub mod account_activity {
    use super::{Field, FieldRegistry};

    field_table! {
        "ACCT_ACTIVITY";
        SUBSCRIPTION_KEY = 0,
        ACCOUNT = 1,
        MESSAGE_TYPE = 2,
        MESSAGE_DATA = 3,
    }
}

/// Top level of an order book message (`LISTED_BOOK`, `NASDAQ_BOOK`, `OPTIONS_BOOK`).
pub mod book {
    use super::{Field, FieldRegistry};

    field_table! {
        "BOOK";
        SYMBOL = 0,
        BOOK_TIME = 1,
        BIDS = 2,
        ASKS = 3,
    }
}

/// One bid price level inside an order book message.
pub mod book_bid {
    use super::{Field, FieldRegistry};

    field_table! {
        "BOOK_BID";
        BID_PRICE = 0,
        TOTAL_VOLUME = 1,
        NUM_BIDS = 2,
        BIDS = 3,
    }
}

/// One exchange's contribution to a bid price level.
pub mod book_bid_exchange {
    use super::{Field, FieldRegistry};

    field_table! {
        "BOOK_BID_EXCHANGE";
        EXCHANGE = 0,
        BID_VOLUME = 1,
        SEQUENCE = 2,
    }
}

/// One ask price level inside an order book message.
pub mod book_ask {
    use super::{Field, FieldRegistry};

    field_table! {
        "BOOK_ASK";
        ASK_PRICE = 0,
        TOTAL_VOLUME = 1,
        NUM_ASKS = 2,
        ASKS = 3,
    }
}

/// One exchange's contribution to an ask price level.
pub mod book_ask_exchange {
    use super::{Field, FieldRegistry};

    field_table! {
        "BOOK_ASK_EXCHANGE";
        EXCHANGE = 0,
        ASK_VOLUME = 1,
        SEQUENCE = 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&quote::REGISTRY, 53 ; "quote")]
    #[test_case(&option::REGISTRY, 42 ; "option")]
    #[test_case(&futures::REGISTRY, 36 ; "futures")]
    #[test_case(&futures_options::REGISTRY, 36 ; "futures options")]
    #[test_case(&forex::REGISTRY, 30 ; "forex")]
    #[test_case(&chart_equity::REGISTRY, 9 ; "chart equity")]
    #[test_case(&chart_futures::REGISTRY, 7 ; "chart futures")]
    #[test_case(&timesale::REGISTRY, 5 ; "timesale")]
    #[test_case(&news_headline::REGISTRY, 11 ; "news headline")]
    #[test_case(&account_activity::REGISTRY, 4 ; "account activity")]
    #[test_case(&book::REGISTRY, 4 ; "book")]
    fn codes_are_contiguous_from_zero(registry: &FieldRegistry, len: usize) {
        let fields = registry.all_fields();
        assert_eq!(fields.len(), len);
        for (idx, field) in fields.iter().enumerate() {
            assert_eq!(usize::from(field.code()), idx, "{registry:?} gap at {field}");
        }
    }

    #[test]
    fn constants_carry_their_own_names() {
        assert_eq!(quote::BID_PRICE.name(), "BID_PRICE");
        assert_eq!(quote::BID_PRICE.code(), 1);
        assert_eq!(book_ask_exchange::ASK_VOLUME.code(), 1);
    }
}
