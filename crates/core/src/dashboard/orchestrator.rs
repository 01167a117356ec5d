use std::{fmt::Display, future::Future, sync::Arc, time::Duration};

use chrono::Locale;
use parking_lot::RwLock;
use tokio::{
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    client::{FetchError, GeoWeatherError, QuoteSource},
    clock::{self, ClockReading, TimeSource, TICK_PERIOD},
    session::{normalize_submission, SessionStore},
};

use super::{
    services::DashboardServices,
    state::{DashboardState, Session},
};

/// Minimum time the splash placeholder stays up after mount.
pub const SPLASH_DURATION: Duration = Duration::from_secs(2);

/// Live dashboard: owns the view-model and every task feeding it.
///
/// Must be mounted from inside a tokio runtime. Dropping it unmounts.
pub struct Dashboard {
    shared: Arc<Shared>,
    quotes: Arc<dyn QuoteSource>,
    session: Arc<dyn SessionStore>,
}

struct Shared {
    inner: RwLock<Inner>,
    teardown: CancellationToken,
    revision: watch::Sender<u64>,
}

struct Inner {
    view: DashboardState,
    mounted: bool,
    quote_generation: u64,
    quote_cancel: CancellationToken,
}

/// Extra condition a result must meet to be committed.
#[derive(Debug, Clone, Copy)]
enum Freshness {
    Any,
    QuoteGeneration(u64),
}

impl Freshness {
    fn accepts(self, inner: &Inner) -> bool {
        match self {
            Freshness::Any => true,
            Freshness::QuoteGeneration(generation) => inner.quote_generation == generation,
        }
    }
}

/// Failure of one source task; expected failures are logged quietly.
trait SourceError: Display {
    fn is_expected(&self) -> bool {
        false
    }
}

impl SourceError for FetchError {}

impl SourceError for GeoWeatherError {
    fn is_expected(&self) -> bool {
        self.is_position_unavailable()
    }
}

impl Shared {
    /// Apply `apply` unless torn down or superseded. The mounted check and the
    /// write happen under the same lock, so nothing lands after `unmount`.
    fn commit(
        &self,
        slice: &'static str,
        freshness: Freshness,
        apply: impl FnOnce(&mut DashboardState),
    ) -> bool {
        {
            let mut inner = self.inner.write();
            if !inner.mounted {
                debug!(slice, "Dropping update after teardown");
                return false;
            }
            if !freshness.accepts(&inner) {
                debug!(slice, "Dropping superseded update");
                return false;
            }
            apply(&mut inner.view);
        }
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        true
    }
}

impl Dashboard {
    /// Build the initial state and start every source concurrently.
    pub fn mount(
        services: DashboardServices,
        session: Arc<dyn SessionStore>,
        time_source: Arc<dyn TimeSource>,
        locale: Locale,
    ) -> Self {
        let now = time_source.now();
        let display_name = match session.get() {
            Ok(name) => name.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Failed to read session; starting logged out");
                String::new()
            }
        };
        let view = DashboardState::new(
            ClockReading::at(now),
            clock::date_info(now, locale),
            Session { display_name },
        );
        let logged_in = view.session.is_logged_in();

        let teardown = CancellationToken::new();
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            inner: RwLock::new(Inner {
                view,
                mounted: true,
                quote_generation: 0,
                quote_cancel: teardown.child_token(),
            }),
            teardown,
            revision,
        });

        let dashboard = Self {
            shared,
            quotes: Arc::clone(&services.quotes),
            session,
        };
        info!(logged_in, "Dashboard mounted");

        dashboard.spawn_clock(time_source, clock::first_tick_delay(now));
        dashboard.spawn_splash();

        let timezone = Arc::clone(&services.timezone);
        dashboard.spawn_fetch(
            "timezone",
            Freshness::Any,
            dashboard.shared.teardown.clone(),
            async move { timezone.fetch_timezone().await },
            |state, info| state.timezone = Some(info),
        );

        let namedays = Arc::clone(&services.namedays);
        dashboard.spawn_fetch(
            "nameday",
            Freshness::Any,
            dashboard.shared.teardown.clone(),
            async move { namedays.fetch_nameday().await },
            |state, nameday| state.nameday = Some(nameday),
        );

        let geo_weather = services.geo_weather.clone();
        dashboard.spawn_fetch(
            "conditions",
            Freshness::Any,
            dashboard.shared.teardown.clone(),
            async move { geo_weather.fetch().await },
            |state, conditions| state.conditions = Some(conditions),
        );

        dashboard.refresh_quote();
        dashboard
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.shared.inner.read().view.clone()
    }

    /// Revision counter bumped after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// False once `unmount` has run.
    pub fn is_mounted(&self) -> bool {
        self.shared.inner.read().mounted
    }

    /// Fetch another quote, superseding any request still in flight.
    pub fn refresh_quote(&self) {
        let (generation, token) = {
            let mut inner = self.shared.inner.write();
            if !inner.mounted {
                return;
            }
            inner.quote_cancel.cancel();
            inner.quote_generation += 1;
            inner.quote_cancel = self.shared.teardown.child_token();
            (inner.quote_generation, inner.quote_cancel.clone())
        };
        debug!(generation, "Requesting quote");

        let quotes = Arc::clone(&self.quotes);
        self.spawn_fetch(
            "quote",
            Freshness::QuoteGeneration(generation),
            token,
            async move { quotes.fetch_quote().await },
            |state, quote| state.quote = Some(quote),
        );
    }

    /// Submit the name-capture input. Blank input keeps the gate closed.
    pub fn login(&self, input: &str) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let Some(name) = normalize_submission(input) else {
            debug!("Blank name submitted; staying logged out");
            return false;
        };
        if let Err(err) = self.session.set(&name) {
            warn!(error = %err, "Failed to persist session");
        }
        info!(name = %name, "Logged in");
        self.shared.commit("session", Freshness::Any, |state| {
            state.session.display_name = name;
        })
    }

    /// Forget the display name and return to the capture gate.
    pub fn logout(&self) {
        if let Err(err) = self.session.clear() {
            warn!(error = %err, "Failed to clear session");
        }
        if self.shared.commit("session", Freshness::Any, |state| {
            state.session.display_name.clear();
        }) {
            info!("Logged out");
        }
    }

    /// Stop timers and ignore any response still in flight. Idempotent.
    pub fn unmount(&self) {
        {
            let mut inner = self.shared.inner.write();
            if !inner.mounted {
                return;
            }
            inner.mounted = false;
        }
        self.shared.teardown.cancel();
        info!("Dashboard unmounted");
    }

    fn spawn_clock(&self, time_source: Arc<dyn TimeSource>, first_delay: Duration) {
        let shared = Arc::clone(&self.shared);
        let token = self.shared.teardown.clone();
        let start = Instant::now() + first_delay;
        tokio::spawn(async move {
            let mut ticker = time::interval_at(start, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let reading = ClockReading::at(time_source.now());
                        debug!(
                            time = %reading.time_label,
                            background = reading.background().asset_name(),
                            "Clock tick"
                        );
                        shared.commit("clock", Freshness::Any, |state| state.apply_clock(reading));
                    }
                }
            }
        });
    }

    fn spawn_splash(&self) {
        let shared = Arc::clone(&self.shared);
        let token = self.shared.teardown.clone();
        let deadline = Instant::now() + SPLASH_DURATION;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep_until(deadline) => {
                    if shared.commit("splash", Freshness::Any, |state| state.loading = false) {
                        debug!("Splash window closed");
                    }
                }
            }
        });
    }

    fn spawn_fetch<T, E, Fut, F>(
        &self,
        slice: &'static str,
        freshness: Freshness,
        token: CancellationToken,
        fetch: Fut,
        apply: F,
    ) where
        T: Send + 'static,
        E: SourceError + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        F: FnOnce(&mut DashboardState, T) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!(slice, "Fetch abandoned");
                    return;
                }
                result = fetch => result,
            };
            match result {
                Ok(value) => {
                    if shared.commit(slice, freshness, |state| apply(state, value)) {
                        info!(slice, "Slice updated");
                    }
                }
                Err(err) if err.is_expected() => {
                    debug!(slice, reason = %err, "Source unavailable; slice left unset")
                }
                Err(err) => warn!(slice, error = %err, "Source failed; slice left unset"),
            }
        });
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{
            testing::{
                failure, sample_nameday, sample_place, sample_quote, sample_timezone,
                sample_weather, FixedPosition, Scripted,
            },
            GeoWeatherClient, GeolocationError,
        },
        clock::{Background, PartOfDay},
        models::{Coordinate, NamedayInfo, PlaceInfo, Quote, TimezoneInfo, WeatherInfo},
        session::MemorySessionStore,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use parking_lot::Mutex;

    struct ManualTime(Mutex<NaiveDateTime>);

    impl ManualTime {
        fn set(&self, hour: u32, minute: u32, second: u32) {
            *self.0.lock() = at(hour, minute, second);
        }
    }

    impl TimeSource for ManualTime {
        fn now(&self) -> NaiveDateTime {
            *self.0.lock()
        }
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    struct Harness {
        timezone: Arc<Scripted<TimezoneInfo>>,
        quotes: Arc<Scripted<Quote>>,
        namedays: Arc<Scripted<NamedayInfo>>,
        weather: Arc<Scripted<WeatherInfo>>,
        places: Arc<Scripted<PlaceInfo>>,
        position: Result<Coordinate, GeolocationError>,
        session: Arc<MemorySessionStore>,
        time: Arc<ManualTime>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                timezone: Arc::new(Scripted::new()),
                quotes: Arc::new(Scripted::new()),
                namedays: Arc::new(Scripted::new()),
                weather: Arc::new(Scripted::new()),
                places: Arc::new(Scripted::new()),
                position: Ok(Coordinate::new(48.1486, 17.1077)),
                session: Arc::new(MemorySessionStore::new()),
                time: Arc::new(ManualTime(Mutex::new(at(10, 0, 45)))),
            }
        }

        fn failing() -> Self {
            let harness = Self::new();
            harness.timezone.push_ready(failure());
            harness.quotes.push_ready(failure());
            harness.namedays.push_ready(failure());
            harness.weather.push_ready(failure());
            harness.places.push_ready(failure());
            harness
        }

        fn mount(&self) -> Dashboard {
            let services = DashboardServices {
                timezone: self.timezone.clone(),
                quotes: self.quotes.clone(),
                namedays: self.namedays.clone(),
                geo_weather: GeoWeatherClient::new(
                    Arc::new(FixedPosition(self.position)),
                    self.weather.clone(),
                    self.places.clone(),
                ),
            };
            Dashboard::mount(
                services,
                self.session.clone(),
                self.time.clone(),
                Locale::en_US,
            )
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mount_computes_clock_date_and_session_synchronously() {
        let mut harness = Harness::new();
        harness.session = Arc::new(MemorySessionStore::with_name("Bob"));
        let dashboard = harness.mount();

        let state = dashboard.snapshot();
        assert_eq!(state.clock.time_label, "10:00");
        assert_eq!(state.clock.part_of_day, PartOfDay::Morning);
        assert_eq!(state.background, Background::Sunrise);
        assert_eq!(state.date.weekday_name, "Thursday");
        assert_eq!(state.date.month_name, "March");
        assert_eq!(state.session.display_name, "Bob");
        assert!(state.loading);
        assert!(state.timezone.is_none());
        assert!(state.quote.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn splash_closes_at_two_seconds_even_when_every_fetch_fails() {
        let harness = Harness::failing();
        let dashboard = harness.mount();

        time::sleep(Duration::from_millis(1999)).await;
        let state = dashboard.snapshot();
        assert!(state.loading);
        assert!(state.timezone.is_none());
        assert!(state.quote.is_none());
        assert!(state.nameday.is_none());
        assert!(state.conditions.is_none());

        time::sleep(Duration::from_millis(2)).await;
        assert!(!dashboard.snapshot().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn splash_does_not_wait_for_hung_fetches() {
        let harness = Harness::new();
        let dashboard = harness.mount();

        time::sleep(SPLASH_DURATION + Duration::from_millis(1)).await;
        let state = dashboard.snapshot();
        assert!(!state.loading);
        assert!(state.timezone.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_ticks_align_to_minute_boundaries() {
        let harness = Harness::new();
        let dashboard = harness.mount();
        harness.time.set(10, 1, 0);

        time::sleep(Duration::from_secs(14)).await;
        assert_eq!(dashboard.snapshot().clock.time_label, "10:00");
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(dashboard.snapshot().clock.time_label, "10:01");

        harness.time.set(12, 2, 0);
        time::sleep(Duration::from_secs(58)).await;
        assert_eq!(dashboard.snapshot().clock.time_label, "10:01");
        time::sleep(Duration::from_secs(2)).await;
        let state = dashboard.snapshot();
        assert_eq!(state.clock.time_label, "12:02");
        assert_eq!(state.clock.part_of_day, PartOfDay::Afternoon);
        assert_eq!(state.background, Background::Afternoon);
    }

    #[tokio::test(start_paused = true)]
    async fn weather_waits_for_place_before_committing() {
        let harness = Harness::new();
        let weather_tx = harness.weather.push_deferred();
        let place_tx = harness.places.push_deferred();
        let dashboard = harness.mount();
        settle().await;

        let _ = weather_tx.send(Ok(sample_weather()));
        settle().await;
        assert!(dashboard.snapshot().conditions.is_none());

        let _ = place_tx.send(Ok(sample_place()));
        settle().await;
        let state = dashboard.snapshot();
        assert_eq!(state.weather(), Some(&sample_weather()));
        assert_eq!(state.place(), Some(&sample_place()));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_place_never_commits_weather() {
        let harness = Harness::new();
        harness.weather.push_ready(Ok(sample_weather()));
        let place_tx = harness.places.push_deferred();
        let dashboard = harness.mount();
        settle().await;

        let _ = place_tx.send(failure());
        settle().await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(dashboard.snapshot().conditions.is_none());
        assert!(dashboard.snapshot().weather_line().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn denied_position_skips_weather_entirely() {
        let mut harness = Harness::new();
        harness.position = Err(GeolocationError::PermissionDenied);
        harness.weather.push_ready(Ok(sample_weather()));
        harness.places.push_ready(Ok(sample_place()));
        let dashboard = harness.mount();
        settle().await;

        assert!(dashboard.snapshot().conditions.is_none());
        assert_eq!(harness.weather.calls(), 0);
        assert_eq!(harness.places.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_order_does_not_change_final_state() {
        async fn run(reverse: bool) -> DashboardState {
            let harness = Harness::new();
            let timezone = harness.timezone.push_deferred();
            let quote = harness.quotes.push_deferred();
            let nameday = harness.namedays.push_deferred();
            let weather = harness.weather.push_deferred();
            let place = harness.places.push_deferred();
            let dashboard = harness.mount();
            settle().await;

            let mut steps: Vec<Box<dyn FnOnce()>> = vec![
                Box::new(move || {
                    let _ = timezone.send(Ok(sample_timezone()));
                }),
                Box::new(move || {
                    let _ = quote.send(Ok(sample_quote("Luck is what happens")));
                }),
                Box::new(move || {
                    let _ = nameday.send(Ok(sample_nameday()));
                }),
                Box::new(move || {
                    let _ = weather.send(Ok(sample_weather()));
                }),
                Box::new(move || {
                    let _ = place.send(Ok(sample_place()));
                }),
            ];
            if reverse {
                steps.reverse();
            }
            for step in steps {
                step();
                settle().await;
            }
            dashboard.snapshot()
        }

        let forward = run(false).await;
        let backward = run(true).await;
        assert_eq!(forward, backward);
        assert_eq!(forward.timezone, Some(sample_timezone()));
        assert_eq!(forward.nameday, Some(sample_nameday()));
        assert!(forward.conditions.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_ignores_late_responses_and_stops_timers() {
        let harness = Harness::new();
        let timezone_tx = harness.timezone.push_deferred();
        let dashboard = harness.mount();
        settle().await;
        let revisions = dashboard.subscribe();

        dashboard.unmount();
        dashboard.unmount();
        assert!(!dashboard.is_mounted());

        let _ = timezone_tx.send(Ok(sample_timezone()));
        settle().await;
        harness.time.set(11, 30, 0);
        time::sleep(Duration::from_secs(90)).await;

        let state = dashboard.snapshot();
        assert!(state.timezone.is_none());
        assert!(state.loading);
        assert_eq!(state.clock.time_label, "10:00");
        assert!(!revisions.has_changed().unwrap_or(true));
        assert!(!dashboard.login("Al"));
        assert_eq!(harness.session.get().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_supersedes_in_flight_quote() {
        let harness = Harness::new();
        let first = harness.quotes.push_deferred();
        let second = harness.quotes.push_deferred();
        let dashboard = harness.mount();
        settle().await;

        dashboard.refresh_quote();
        settle().await;
        assert_eq!(harness.quotes.calls(), 2);

        let _ = second.send(Ok(sample_quote("newer")));
        settle().await;
        let _ = first.send(Ok(sample_quote("older")));
        settle().await;

        assert_eq!(
            dashboard.snapshot().quote.map(|quote| quote.content),
            Some("newer".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_a_committed_quote() {
        let harness = Harness::new();
        harness.quotes.push_ready(Ok(sample_quote("first")));
        harness.quotes.push_ready(Ok(sample_quote("second")));
        let dashboard = harness.mount();
        settle().await;
        assert_eq!(
            dashboard.snapshot().quote.map(|quote| quote.content),
            Some("first".to_string())
        );

        dashboard.refresh_quote();
        settle().await;
        assert_eq!(
            dashboard.snapshot().quote.map(|quote| quote.content),
            Some("second".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_is_rejected_at_commit() {
        let harness = Harness::new();
        let dashboard = harness.mount();
        dashboard.refresh_quote();

        let stale = dashboard.shared.commit("quote", Freshness::QuoteGeneration(1), |state| {
            state.quote = Some(sample_quote("stale"));
        });
        assert!(!stale);
        assert!(dashboard.snapshot().quote.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn commit_after_unmount_is_refused() {
        let harness = Harness::new();
        let dashboard = harness.mount();
        let before = dashboard.snapshot();
        let revisions = dashboard.subscribe();
        dashboard.unmount();

        let committed = dashboard.shared.commit("timezone", Freshness::Any, |state| {
            state.timezone = Some(sample_timezone());
        });
        assert!(!committed);
        assert_eq!(dashboard.snapshot(), before);
        assert!(!revisions.has_changed().unwrap_or(true));
    }

    #[test]
    fn missing_position_is_an_expected_failure() {
        let denied = GeoWeatherError::Geolocation(GeolocationError::PermissionDenied);
        let unavailable = GeoWeatherError::Geolocation(GeolocationError::Unavailable);
        let fetch = GeoWeatherError::Fetch(FetchError::MissingApiKey);
        assert!(denied.is_expected());
        assert!(unavailable.is_expected());
        assert!(!fetch.is_expected());
        assert!(!FetchError::Payload("boom".to_string()).is_expected());
    }

    #[tokio::test(start_paused = true)]
    async fn session_gate_accepts_only_non_blank_names() {
        let harness = Harness::new();
        let dashboard = harness.mount();

        assert!(!dashboard.login(""));
        assert!(!dashboard.login("   "));
        assert_eq!(harness.session.get().unwrap(), None);
        assert!(!dashboard.snapshot().session.is_logged_in());

        assert!(dashboard.login("Al"));
        assert_eq!(dashboard.snapshot().session.display_name, "Al");
        assert_eq!(harness.session.get().unwrap().as_deref(), Some("Al"));
        assert_eq!(dashboard.snapshot().greeting_line(), "Good Morning, Al");

        dashboard.logout();
        assert_eq!(dashboard.snapshot().session.display_name, "");
        assert_eq!(harness.session.get().unwrap(), None);
    }
}
