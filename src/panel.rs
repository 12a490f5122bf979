//! Client-side panels for the three gateway endpoints
//!
//! Each panel owns a [`PanelState`] and moves through
//! `Idle -> Loading -> Success | Error`, returning to `Loading` on every
//! refetch. Fetches run as spawned tasks so `Loading` is observable; the
//! result is applied when the owner settles the panel. Panels never share
//! state; the [`Hub`] mounts one at a time.

use std::fmt;
use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ClientError, GatewayClient};
use crate::currency::{ConversionResponse, Currency, SOURCE_CURRENCY};
use crate::quotes::QuoteResponse;
use crate::weather::WeatherReport;

const QUOTE_ERROR: &str = "Failed to load quote.";
const WEATHER_ERROR: &str = "Failed to load weather data.";
const CONVERSION_ERROR: &str = "Conversion failed. Please try again.";
const INTERRUPTED_ERROR: &str = "Request was interrupted.";

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Idle,
    Loading,
    Success(T),
    /// Short user-facing message
    Error(String),
}

impl<T> PanelState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            PanelState::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            PanelState::Error(message) => Some(message),
            _ => None,
        }
    }
}

type Fetch<T> = JoinHandle<Result<T, String>>;

/// State holder enforcing the panel transitions
///
/// Dropping a panel detaches its running fetch; the request completes in the
/// background and its result is discarded.
#[derive(Debug)]
pub struct Panel<T> {
    state: PanelState<T>,
    pending: Option<Fetch<T>>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            state: PanelState::Idle,
            pending: None,
        }
    }
}

impl<T> Panel<T> {
    #[must_use]
    pub fn state(&self) -> &PanelState<T> {
        &self.state
    }

    /// Enter `Loading`, dropping previous content. Returns `false` while a
    /// fetch is already running; the trigger is disabled in that state.
    pub fn begin(&mut self) -> bool {
        if self.state.is_loading() {
            return false;
        }
        self.state = PanelState::Loading;
        true
    }

    /// Settle a running fetch. Ignored unless the panel is loading.
    pub fn finish(&mut self, result: Result<T, String>) {
        if !self.state.is_loading() {
            debug!("Discarding result for a panel that is not loading");
            return;
        }
        self.state = match result {
            Ok(data) => PanelState::Success(data),
            Err(message) => PanelState::Error(message),
        };
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn render_status(&self, lines: &mut Vec<String>, loading_text: &str) {
        match &self.state {
            PanelState::Loading => lines.push(loading_text.to_string()),
            PanelState::Error(message) => lines.push(format!("Error: {message}")),
            PanelState::Idle | PanelState::Success(_) => {}
        }
    }

    fn render_button(&self, lines: &mut Vec<String>, idle: &str, busy: &str) {
        if self.state.is_loading() {
            lines.push(format!("[{busy}] (disabled)"));
        } else {
            lines.push(format!("[{idle}]"));
        }
    }
}

impl<T: Send + 'static> Panel<T> {
    /// Enter `Loading` and spawn `fetch`. Returns `false` while loading.
    pub fn start<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, String>> + Send + 'static,
    {
        if !self.begin() {
            return false;
        }
        self.pending = Some(tokio::spawn(fetch));
        true
    }

    /// Wait for the running fetch, if any, and apply its result
    pub async fn settle(&mut self) {
        let Some(fetch) = self.pending.take() else {
            return;
        };
        let result = fetch.await.unwrap_or_else(|e| {
            warn!("Panel fetch did not complete: {}", e);
            Err(INTERRUPTED_ERROR.to_string())
        });
        self.finish(result);
    }
}

#[derive(Debug, Default)]
pub struct QuotePanel {
    panel: Panel<QuoteResponse>,
}

impl QuotePanel {
    #[must_use]
    pub fn state(&self) -> &PanelState<QuoteResponse> {
        self.panel.state()
    }

    /// Start fetching a new quote. Returns `false` if a fetch was already running.
    pub fn refresh(&mut self, client: &GatewayClient) -> bool {
        let client = client.clone();
        self.panel.start(async move {
            client.quote().await.map_err(|e| {
                warn!("Fetch error: {}", e);
                QUOTE_ERROR.to_string()
            })
        })
    }

    pub async fn settle(&mut self) {
        self.panel.settle().await;
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Motivational Quote Generator".to_string()];
        self.panel.render_status(&mut lines, "Generating inspiration...");
        if let Some(data) = self.panel.state().data() {
            lines.push(format!("\"{}\"", data.quote));
        }
        self.panel
            .render_button(&mut lines, "Get New Quote", "Thinking...");
        lines
    }
}

#[derive(Debug, Default)]
pub struct WeatherPanel {
    city: Option<String>,
    panel: Panel<WeatherReport>,
}

impl WeatherPanel {
    #[must_use]
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            panel: Panel::default(),
        }
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> &PanelState<WeatherReport> {
        self.panel.state()
    }

    pub fn refresh(&mut self, client: &GatewayClient) -> bool {
        let client = client.clone();
        let city = self.city.clone();
        self.panel.start(async move {
            client.weather(city.as_deref()).await.map_err(|e| {
                warn!("Fetch error: {}", e);
                WEATHER_ERROR.to_string()
            })
        })
    }

    pub async fn settle(&mut self) {
        self.panel.settle().await;
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Current Weather".to_string()];
        self.panel.render_status(&mut lines, "Loading weather...");
        if let Some(report) = self.panel.state().data() {
            lines.push(report.city.clone());
            lines.push(format!("Temperature: {}", report.temperature));
            lines.push(format!("Wind: {}", report.wind_speed));
            lines.push(format!("Condition: {}", report.condition.label()));
        }
        self.panel.render_button(&mut lines, "Refresh", "Loading...");
        lines
    }
}

#[derive(Debug, Default)]
pub struct CurrencyPanel {
    panel: Panel<ConversionResponse>,
}

impl CurrencyPanel {
    #[must_use]
    pub fn state(&self) -> &PanelState<ConversionResponse> {
        self.panel.state()
    }

    /// Start converting `amount` INR into `target`.
    ///
    /// Rejections from the gateway show its validation message; any other
    /// failure shows a generic one.
    pub fn submit(&mut self, client: &GatewayClient, amount: f64, target: Currency) -> bool {
        let client = client.clone();
        self.panel.start(async move {
            client.convert(amount, target).await.map_err(|e| {
                warn!("Fetch error: {}", e);
                conversion_message(&e)
            })
        })
    }

    pub async fn settle(&mut self) {
        self.panel.settle().await;
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("{SOURCE_CURRENCY} Currency Converter")];
        self.panel.render_status(&mut lines, "Converting...");
        if let Some(result) = self.panel.state().data() {
            lines.push(format!(
                "{} {} = {} {}",
                result.amount, result.from, result.converted, result.to
            ));
            lines.push(format!("Rate: 1 {} = {} {}", result.from, result.rate, result.to));
        }
        self.panel.render_button(&mut lines, "Convert", "Converting...");
        lines
    }
}

fn conversion_message(error: &ClientError) -> String {
    error
        .client_message()
        .map_or_else(|| CONVERSION_ERROR.to_string(), str::to_string)
}

/// Navigation entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelKind {
    #[default]
    Weather,
    Currency,
    Quotes,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Weather, PanelKind::Currency, PanelKind::Quotes];

    /// Whether mounting the panel starts a fetch on its own
    #[must_use]
    pub fn fetches_on_mount(self) -> bool {
        !matches!(self, PanelKind::Currency)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PanelKind::Weather => "Weather",
            PanelKind::Currency => "Currency",
            PanelKind::Quotes => "Quotes",
        })
    }
}

/// The mounted panel
#[derive(Debug)]
pub enum ActivePanel {
    Weather(WeatherPanel),
    Currency(CurrencyPanel),
    Quotes(QuotePanel),
}

impl ActivePanel {
    fn fresh(kind: PanelKind, city: Option<&str>) -> Self {
        match kind {
            PanelKind::Weather => ActivePanel::Weather(
                city.map_or_else(WeatherPanel::default, WeatherPanel::for_city),
            ),
            PanelKind::Currency => ActivePanel::Currency(CurrencyPanel::default()),
            PanelKind::Quotes => ActivePanel::Quotes(QuotePanel::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PanelKind {
        match self {
            ActivePanel::Weather(_) => PanelKind::Weather,
            ActivePanel::Currency(_) => PanelKind::Currency,
            ActivePanel::Quotes(_) => PanelKind::Quotes,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        match self {
            ActivePanel::Weather(panel) => panel.state().is_loading(),
            ActivePanel::Currency(panel) => panel.state().is_loading(),
            ActivePanel::Quotes(panel) => panel.state().is_loading(),
        }
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        match self {
            ActivePanel::Weather(panel) => panel.render(),
            ActivePanel::Currency(panel) => panel.render(),
            ActivePanel::Quotes(panel) => panel.render(),
        }
    }
}

/// Single-page shell switching between the three panels
pub struct Hub {
    client: GatewayClient,
    city: Option<String>,
    active: ActivePanel,
}

impl Hub {
    /// Create the hub with the default panel selected but not yet mounted
    #[must_use]
    pub fn new(client: GatewayClient) -> Self {
        Self {
            client,
            city: None,
            active: ActivePanel::fresh(PanelKind::default(), None),
        }
    }

    /// Label the weather panel with `city` instead of the gateway default
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        let city = city.into();
        if self.active_kind() == PanelKind::Weather && !self.active.is_loading() {
            self.active = ActivePanel::fresh(PanelKind::Weather, Some(city.as_str()));
        }
        self.city = Some(city);
        self
    }

    /// Create the hub and start mounting the default panel
    #[must_use]
    pub fn open(client: GatewayClient) -> Self {
        let mut hub = Self::new(client);
        hub.show(PanelKind::default());
        hub
    }

    #[must_use]
    pub fn active_kind(&self) -> PanelKind {
        self.active.kind()
    }

    #[must_use]
    pub fn active(&self) -> &ActivePanel {
        &self.active
    }

    /// Mount `kind` with fresh state and start its mount fetch if it has one.
    ///
    /// A fetch still running on the previous panel is left to finish on its
    /// own; its result never reaches the new panel.
    pub fn show(&mut self, kind: PanelKind) {
        debug!("Switching to {} panel", kind);
        self.active = ActivePanel::fresh(kind, self.city.as_deref());
        if kind.fetches_on_mount() {
            self.refresh();
        }
    }

    /// Re-run the mounted panel's fetch. Returns `false` while it is loading
    /// or when the panel only fetches on submit.
    pub fn refresh(&mut self) -> bool {
        match &mut self.active {
            ActivePanel::Weather(panel) => panel.refresh(&self.client),
            ActivePanel::Quotes(panel) => panel.refresh(&self.client),
            ActivePanel::Currency(_) => false,
        }
    }

    /// Submit a conversion on the currency panel. Returns `false` when another
    /// panel is mounted or a conversion is already running.
    pub fn submit(&mut self, amount: f64, target: Currency) -> bool {
        match &mut self.active {
            ActivePanel::Currency(panel) => panel.submit(&self.client, amount, target),
            _ => false,
        }
    }

    /// Wait for the mounted panel's running fetch and apply its result
    pub async fn settle(&mut self) {
        match &mut self.active {
            ActivePanel::Weather(panel) => panel.settle().await,
            ActivePanel::Currency(panel) => panel.settle().await,
            ActivePanel::Quotes(panel) => panel.settle().await,
        }
    }

    #[must_use]
    pub fn render_nav(&self) -> String {
        PanelKind::ALL
            .iter()
            .map(|kind| {
                if *kind == self.active_kind() {
                    format!("[{kind}]")
                } else {
                    kind.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![self.render_nav()];
        lines.extend(self.active.render());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_transitions() {
        let mut panel: Panel<u32> = Panel::default();
        assert_eq!(panel.state(), &PanelState::Idle);

        assert!(panel.begin());
        assert!(panel.state().is_loading());
        assert!(!panel.begin());

        panel.finish(Ok(7));
        assert_eq!(panel.state().data(), Some(&7));

        assert!(panel.begin());
        assert_eq!(panel.state().data(), None);
        panel.finish(Err("boom".to_string()));
        assert_eq!(panel.state().error(), Some("boom"));

        assert!(panel.begin());
        assert_eq!(panel.state().error(), None);
    }

    #[test]
    fn test_finish_without_begin_is_ignored() {
        let mut panel: Panel<u32> = Panel::default();
        panel.finish(Ok(1));
        assert_eq!(panel.state(), &PanelState::Idle);
    }

    #[tokio::test]
    async fn test_spawned_fetch_stays_loading_until_settled() {
        let mut panel: Panel<u32> = Panel::default();
        assert!(panel.start(async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(5)
        }));
        assert!(panel.state().is_loading());
        assert!(panel.is_pending());
        assert!(!panel.start(async { Ok(1) }));

        panel.settle().await;
        assert_eq!(panel.state().data(), Some(&5));
        assert!(!panel.is_pending());

        // nothing running: settling again is a no-op
        panel.settle().await;
        assert_eq!(panel.state().data(), Some(&5));
    }

    #[test]
    fn test_hub_city_labels_weather_panel() {
        let hub = Hub::new(GatewayClient::new("http://localhost:3001")).with_city("Paris");
        let ActivePanel::Weather(panel) = hub.active() else {
            panic!("weather panel expected");
        };
        assert_eq!(panel.city(), Some("Paris"));
        assert_eq!(panel.state(), &PanelState::Idle);
    }

    #[test]
    fn test_quote_panel_render_loading() {
        let mut panel = QuotePanel::default();
        panel.panel.begin();
        let lines = panel.render();
        assert!(lines.contains(&"Generating inspiration...".to_string()));
        assert!(lines.contains(&"[Thinking...] (disabled)".to_string()));
    }

    #[test]
    fn test_quote_panel_render_error() {
        let mut panel = QuotePanel::default();
        panel.panel.begin();
        panel.panel.finish(Err(QUOTE_ERROR.to_string()));
        let lines = panel.render();
        assert!(lines.contains(&"Error: Failed to load quote.".to_string()));
        assert!(lines.contains(&"[Get New Quote]".to_string()));
    }

    #[test]
    fn test_mount_behaviour() {
        assert!(PanelKind::Weather.fetches_on_mount());
        assert!(PanelKind::Quotes.fetches_on_mount());
        assert!(!PanelKind::Currency.fetches_on_mount());
        assert_eq!(PanelKind::default(), PanelKind::Weather);
    }

    #[test]
    fn test_conversion_message_prefers_gateway_text() {
        let rejected = ClientError::Status {
            status: 400,
            message: Some("Invalid amount: Must be a positive number.".to_string()),
        };
        assert_eq!(
            conversion_message(&rejected),
            "Invalid amount: Must be a positive number."
        );

        let failed = ClientError::Status {
            status: 500,
            message: Some("Conversion service error.".to_string()),
        };
        assert_eq!(conversion_message(&failed), CONVERSION_ERROR);
    }

    #[test]
    fn test_nav_marks_active_panel() {
        let hub = Hub::new(GatewayClient::new("http://localhost:3001"));
        assert_eq!(hub.render_nav(), "[Weather] | Currency | Quotes");
    }
}
