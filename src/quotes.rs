//! Motivational quote generator

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// Quotes served by `GET /api/quote`
pub const QUOTES: [&str; 5] = [
    "The only way to do great work is to love what you do. – Steve Jobs",
    "Strive not to be a success, but rather to be of value. – Albert Einstein",
    "The future belongs to those who believe in the beauty of their dreams. – Eleanor Roosevelt",
    "The mind is everything. What you think you become. – Buddha",
    "Don't watch the clock; do what it does. Keep going. – Sam Levenson",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: String,
}

/// Pick one entry of `quotes` uniformly at random.
pub fn pick_quote(quotes: &[&'static str]) -> crate::Result<&'static str> {
    if quotes.is_empty() {
        return Err(GatewayError::internal("quote list is empty"));
    }
    let index = rand::rng().random_range(0..quotes.len());
    Ok(quotes[index])
}

pub fn random_quote_from(quotes: &[&'static str]) -> crate::Result<QuoteResponse> {
    pick_quote(quotes).map(|quote| QuoteResponse {
        quote: quote.to_string(),
    })
}
