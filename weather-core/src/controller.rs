//! The weather card's presentation logic.
//!
//! [`ViewController`] owns its render target and the current [`ViewState`].
//! Every trigger goes through [`ViewController::dispatch`], which updates the
//! view and returns at most one [`Effect`] for the runtime to carry out.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    clock::{Clock, SystemClock, format_display},
    error::WeatherError,
    model::{WeatherQuery, WeatherResult},
    view::{Attribute, Element, RenderTarget},
};

/// The single visible presentation mode. `None` in the controller is idle.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Result(WeatherResult),
}

/// What to do with a completion that belongs to an older trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RacePolicy {
    /// Completions older than the latest trigger are dropped.
    #[default]
    LatestRequestWins,
    /// Every completion is applied; whichever resolves last is shown.
    LastResolvedWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Submit,
    PageLoad,
}

/// A fetch the controller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub origin: Origin,
    pub query: WeatherQuery,
}

impl FetchTicket {
    pub fn complete(self, outcome: Result<WeatherResult, WeatherError>) -> Completion {
        Completion { ticket: self, outcome }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: FetchTicket,
    pub outcome: Result<WeatherResult, WeatherError>,
}

#[derive(Debug)]
pub enum Event {
    PageLoaded,
    Submitted(String),
    FetchFinished(Completion),
    ClockTick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchTicket),
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub default_city: WeatherQuery,
    pub icon_base_url: String,
    pub race_policy: RacePolicy,
}

pub struct ViewController<R, C = SystemClock> {
    target: R,
    clock: C,
    settings: ViewSettings,
    state: Option<ViewState>,
    latest_seq: u64,
}

impl<R: RenderTarget, C: Clock> ViewController<R, C> {
    pub fn new(target: R, clock: C, settings: ViewSettings) -> Self {
        Self {
            target,
            clock,
            settings,
            state: None,
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> Option<&ViewState> {
        self.state.as_ref()
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn into_target(self) -> R {
        self.target
    }

    pub fn dispatch(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::PageLoaded => Some(self.on_page_load()),
            Event::Submitted(raw) => self.on_submit(&raw),
            Event::FetchFinished(completion) => {
                self.on_fetch_finished(completion);
                None
            }
            Event::ClockTick => {
                self.refresh_clock();
                None
            }
        }
    }

    /// Handle the search form. Blank input shows an error without fetching.
    pub fn on_submit(&mut self, raw: &str) -> Option<Effect> {
        match WeatherQuery::parse(raw) {
            Ok(query) => Some(self.begin_fetch(query, Origin::Submit)),
            Err(err) => {
                // Still a trigger: anything in flight is now out of date.
                self.latest_seq += 1;
                self.show_error(err.user_message());
                None
            }
        }
    }

    pub fn on_page_load(&mut self) -> Effect {
        let query = self.settings.default_city.clone();
        self.begin_fetch(query, Origin::PageLoad)
    }

    pub fn on_fetch_finished(&mut self, completion: Completion) {
        let Completion { ticket, outcome } = completion;

        if self.settings.race_policy == RacePolicy::LatestRequestWins
            && ticket.seq < self.latest_seq
        {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                city = %ticket.query,
                "dropping stale weather completion"
            );
            return;
        }

        match (outcome, ticket.origin) {
            (Ok(weather), origin) => {
                self.show_result(&weather);
                if origin == Origin::Submit {
                    self.target.set_text(Element::CityInput, "");
                }
            }
            (Err(err), Origin::Submit) => {
                info!(city = %ticket.query, error = %err, "weather lookup failed");
                self.show_error(err.user_message());
            }
            (Err(err), Origin::PageLoad) => {
                error!(city = %ticket.query, error = %err, "failed to load default weather");
                self.hide_loading();
                self.state = None;
            }
        }
    }

    pub fn refresh_clock(&mut self) {
        let now = format_display(&self.clock.now());
        self.target.set_text(Element::DateTime, &now);
    }

    fn begin_fetch(&mut self, query: WeatherQuery, origin: Origin) -> Effect {
        self.latest_seq += 1;
        self.show_loading();

        Effect::Fetch(FetchTicket { seq: self.latest_seq, origin, query })
    }

    fn show_loading(&mut self) {
        self.target.set_visible(Element::Loader, true);
        self.target.set_visible(Element::SearchButtonLoader, true);
        self.target.set_visible(Element::WeatherCard, false);
        self.target.set_visible(Element::ErrorMessage, false);
        self.state = Some(ViewState::Loading);
    }

    fn hide_loading(&mut self) {
        self.target.set_visible(Element::Loader, false);
        self.target.set_visible(Element::SearchButtonLoader, false);
    }

    fn show_error(&mut self, message: &str) {
        self.target.set_text(Element::ErrorMessage, message);
        self.target.set_visible(Element::ErrorMessage, true);
        self.target.set_visible(Element::WeatherCard, false);
        self.hide_loading();
        self.state = Some(ViewState::Error(message.to_string()));
    }

    fn show_result(&mut self, weather: &WeatherResult) {
        let t = &mut self.target;
        t.set_text(Element::CityName, &weather.location_label());
        t.set_text(Element::Temperature, &weather.temperature_c.to_string());
        t.set_text(Element::Condition, &weather.condition_text);
        t.set_text(Element::Humidity, &weather.humidity_label());
        t.set_text(Element::WindSpeed, &weather.wind_label());
        t.set_attribute(
            Element::WeatherIcon,
            Attribute::Src,
            &weather.icon_url(&self.settings.icon_base_url),
        );
        t.set_attribute(Element::WeatherIcon, Attribute::Alt, &weather.condition_text);

        self.refresh_clock();

        self.target.set_visible(Element::ErrorMessage, false);
        self.hide_loading();
        self.target.set_visible(Element::WeatherCard, true);
        self.state = Some(ViewState::Result(weather.clone()));
    }
}
