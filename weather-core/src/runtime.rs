//! The event loop that drives a [`ViewController`].
//!
//! All view mutation happens on the task running [`Runtime::run`]. Fetches run
//! in a [`JoinSet`] owned by the loop, so a slow provider never blocks input or
//! the clock, and a fetch that dies still settles the view.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error};

use crate::{
    clock::Clock,
    controller::{Completion, Effect, Event, ViewController},
    error::WeatherError,
    provider::WeatherProvider,
    view::RenderTarget,
};

pub const CLOCK_PERIOD: Duration = Duration::from_secs(60);

pub struct Runtime<R, C> {
    controller: ViewController<R, C>,
    provider: Arc<dyn WeatherProvider>,
    clock_period: Duration,
    load_default: bool,
}

impl<R: RenderTarget, C: Clock> Runtime<R, C> {
    pub fn new(controller: ViewController<R, C>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            controller,
            provider,
            clock_period: CLOCK_PERIOD,
            load_default: true,
        }
    }

    pub fn with_clock_period(mut self, period: Duration) -> Self {
        self.clock_period = period;
        self
    }

    /// Start without fetching the default city.
    pub fn without_page_load(mut self) -> Self {
        self.load_default = false;
        self
    }

    /// Run until `input` closes and every outstanding fetch has settled.
    ///
    /// Each line received on `input` is treated as a search submission.
    pub async fn run(mut self, mut input: mpsc::Receiver<String>) -> ViewController<R, C> {
        let mut fetches: JoinSet<Completion> = JoinSet::new();
        let mut ticker = time::interval_at(Instant::now() + self.clock_period, self.clock_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut input_open = true;

        self.controller.refresh_clock();
        if self.load_default {
            let effect = self.controller.dispatch(Event::PageLoaded);
            self.perform(effect, &mut fetches);
        }
        self.controller.target_mut().flush();

        while input_open || !fetches.is_empty() {
            let event = tokio::select! {
                line = input.recv(), if input_open => match line {
                    Some(raw) => Event::Submitted(raw),
                    None => {
                        debug!(in_flight = fetches.len(), "input closed");
                        input_open = false;
                        continue;
                    }
                },
                Some(joined) = fetches.join_next(), if !fetches.is_empty() => match joined {
                    Ok(completion) => Event::FetchFinished(completion),
                    Err(err) => {
                        error!(error = %err, "weather fetch task was lost");
                        continue;
                    }
                },
                _ = ticker.tick() => Event::ClockTick,
            };

            let effect = self.controller.dispatch(event);
            self.perform(effect, &mut fetches);
            self.controller.target_mut().flush();
        }

        self.controller
    }

    fn perform(&self, effect: Option<Effect>, fetches: &mut JoinSet<Completion>) {
        let Some(Effect::Fetch(ticket)) = effect else {
            return;
        };

        let provider = Arc::clone(&self.provider);
        debug!(seq = ticket.seq, city = %ticket.query, "starting weather fetch");

        fetches.spawn(async move {
            let query = ticket.query.clone();
            // The provider call gets its own task so a panic still completes the ticket.
            let outcome = tokio::spawn(async move { provider.fetch_weather(&query).await })
                .await
                .unwrap_or_else(|err| Err(WeatherError::from(err)));

            ticket.complete(outcome)
        });
    }
}
