use rust_decimal::Decimal;

use crate::models::ResolvedToken;

/// Native-asset placeholder address understood by the 1inch API.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Decimal count assumed for addresses missing from the registry.
pub const DEFAULT_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub address: &'static str,
    pub decimals: u32,
    pub coingecko_id: &'static str,
}

/// Mainnet tokens the quote client can resolve by symbol.
pub const KNOWN_TOKENS: [TokenInfo; 5] = [
    TokenInfo {
        symbol: "ETH",
        address: NATIVE_TOKEN_ADDRESS,
        decimals: 18,
        coingecko_id: "ethereum",
    },
    TokenInfo {
        symbol: "WETH",
        address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        decimals: 18,
        coingecko_id: "weth",
    },
    TokenInfo {
        symbol: "USDC",
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        decimals: 6,
        coingecko_id: "usd-coin",
    },
    TokenInfo {
        symbol: "USDT",
        address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
        decimals: 6,
        coingecko_id: "tether",
    },
    TokenInfo {
        symbol: "DAI",
        address: "0x6B175474E89094C44Da98b954EedeAC495271d0F",
        decimals: 18,
        coingecko_id: "dai",
    },
];

/// Price-only ids for symbols that are priced but not quotable by symbol.
const EXTRA_PRICE_IDS: [(&str, &str); 4] = [
    ("WBTC", "wrapped-bitcoin"),
    ("UNI", "uniswap"),
    ("LINK", "chainlink"),
    ("AAVE", "aave"),
];

/// `0x` followed by exactly 40 hex digits.
pub fn is_hex_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn lookup_symbol(symbol: &str) -> Option<&'static TokenInfo> {
    KNOWN_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
}

pub fn lookup_address(address: &str) -> Option<&'static TokenInfo> {
    KNOWN_TOKENS
        .iter()
        .find(|t| t.address.eq_ignore_ascii_case(address.trim()))
}

/// Resolve an address or symbol to an address plus decimal count.
/// Returns `None` for symbols outside the registry.
pub fn resolve(token: &str) -> Option<ResolvedToken> {
    let token = token.trim();
    if is_hex_address(token) {
        let decimals = match lookup_address(token) {
            Some(info) => info.decimals,
            None => {
                tracing::debug!(token, "Token not in registry, assuming 18 decimals");
                DEFAULT_DECIMALS
            }
        };
        return Some(ResolvedToken {
            address: token.to_string(),
            decimals,
        });
    }

    lookup_symbol(token).map(|info| ResolvedToken {
        address: info.address.to_string(),
        decimals: info.decimals,
    })
}

pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.trim();
    lookup_symbol(symbol).map(|t| t.coingecko_id).or_else(|| {
        EXTRA_PRICE_IDS
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, id)| *id)
    })
}

fn ten_pow(decimals: u32) -> Option<Decimal> {
    10u64.checked_pow(decimals).map(Decimal::from)
}

/// Human amount → smallest units, truncated to an integer.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<Decimal> {
    amount
        .checked_mul(ten_pow(decimals)?)
        .map(|v| v.trunc().normalize())
}

/// Smallest units → human amount.
pub fn from_base_units(amount: Decimal, decimals: u32) -> Option<Decimal> {
    amount.checked_div(ten_pow(decimals)?).map(|v| v.normalize())
}
