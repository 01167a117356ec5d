//! Scriptable fakes for the service traits.

use std::{
    collections::VecDeque,
    future,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::models::{Coordinate, NamedayInfo, PlaceInfo, Quote, TimezoneInfo, WeatherInfo};

use super::{
    geo::{GeolocationError, Geolocator},
    http::FetchError,
    nameday::NamedaySource,
    quote::QuoteSource,
    timezone::TimezoneSource,
    weather::{PlaceSource, WeatherSource},
};

pub(crate) type Reply<T> = Result<T, FetchError>;

enum Step<T> {
    Ready(Reply<T>),
    Deferred(oneshot::Receiver<Reply<T>>),
}

/// Answers calls in order from a queue of scripted replies.
///
/// An exhausted script never resolves, which models a hung request.
pub(crate) struct Scripted<T> {
    steps: Mutex<VecDeque<Step<T>>>,
    calls: AtomicUsize,
}

impl<T: Send> Scripted<T> {
    pub(crate) fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn push_ready(&self, reply: Reply<T>) {
        self.steps.lock().push_back(Step::Ready(reply));
    }

    pub(crate) fn push_deferred(&self) -> oneshot::Sender<Reply<T>> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().push_back(Step::Deferred(rx));
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Reply<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Ready(reply)) => reply,
            Some(Step::Deferred(rx)) => match rx.await {
                Ok(reply) => reply,
                Err(_) => future::pending().await,
            },
            None => future::pending().await,
        }
    }
}

#[async_trait]
impl TimezoneSource for Scripted<TimezoneInfo> {
    async fn fetch_timezone(&self) -> Result<TimezoneInfo, FetchError> {
        self.next().await
    }
}

#[async_trait]
impl QuoteSource for Scripted<Quote> {
    async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        self.next().await
    }
}

#[async_trait]
impl NamedaySource for Scripted<NamedayInfo> {
    async fn fetch_nameday(&self) -> Result<NamedayInfo, FetchError> {
        self.next().await
    }
}

#[async_trait]
impl WeatherSource for Scripted<WeatherInfo> {
    async fn current_weather(&self, _at: Coordinate) -> Result<WeatherInfo, FetchError> {
        self.next().await
    }
}

#[async_trait]
impl PlaceSource for Scripted<PlaceInfo> {
    async fn reverse_geocode(&self, _at: Coordinate) -> Result<PlaceInfo, FetchError> {
        self.next().await
    }
}

pub(crate) struct FixedPosition(pub(crate) Result<Coordinate, GeolocationError>);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.0
    }
}

pub(crate) fn failure<T>() -> Reply<T> {
    Err(FetchError::Payload("scripted failure".to_string()))
}

pub(crate) fn sample_timezone() -> TimezoneInfo {
    TimezoneInfo {
        abbreviation: "CET".to_string(),
        region_label: "Bratislava, Europe".to_string(),
        day_of_year: 67,
    }
}

pub(crate) fn sample_quote(content: &str) -> Quote {
    Quote {
        author: "Seneca".to_string(),
        content: content.to_string(),
    }
}

pub(crate) fn sample_nameday() -> NamedayInfo {
    NamedayInfo {
        name: "Tomáš".to_string(),
    }
}

pub(crate) fn sample_weather() -> WeatherInfo {
    WeatherInfo {
        temp_c: 8.0,
        temp_f: 46.4,
        condition_text: "Light rain".to_string(),
        icon_url: "https://cdn.weatherapi.com/weather/64x64/day/296.png".to_string(),
    }
}

pub(crate) fn sample_place() -> PlaceInfo {
    PlaceInfo {
        city: "Bratislava".to_string(),
        country: "Slovakia".to_string(),
    }
}
