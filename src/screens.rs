//! Per-screen loading: concurrent fetches, all-or-nothing application and
//! shaping into the documents the front end shows.
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{AwardStats, FallbackPolicy, NotableRole, TributeDefaults};
use crate::credits::{self, release_year, SortMode};
use crate::images::{ImageSize, ImageUrls};
use crate::tmdb::{CreditRecord, MovieDetailRecord, PersonRecord, TmdbApi};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum ScreenState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

/// Proof that a fetch was started under a given activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    generation: u64,
}

/// Owns one screen's state. Results from an activation that is no longer
/// current are dropped instead of applied.
///
/// The JSON service builds each document per request and never holds one;
/// interactive front ends and `credits_dump` keep their screens in a slot.
#[derive(Debug)]
pub struct ScreenSlot<T> {
    generation: AtomicU64,
    state: Mutex<ScreenState<T>>,
}

impl<T> Default for ScreenSlot<T> {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: Mutex::new(ScreenState::Loading),
        }
    }
}

impl<T: Clone> ScreenSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn activate(&self) -> Activation {
        let mut state = self.state.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = ScreenState::Loading;
        Activation { generation }
    }

    /// The user left the screen; anything still in flight becomes stale.
    pub fn deactivate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, activation: Activation) -> bool {
        self.generation.load(Ordering::SeqCst) == activation.generation
    }

    /// Returns whether the result was applied.
    pub async fn apply(&self, activation: Activation, result: Result<T>) -> bool {
        let mut state = self.state.lock().await;
        if !self.is_current(activation) {
            debug!(
                generation = activation.generation,
                "Discarding result for inactive screen"
            );
            return false;
        }
        *state = match result {
            Ok(value) => ScreenState::Ready(value),
            Err(e) => ScreenState::Failed(format!("{:#}", e)),
        };
        true
    }

    /// Activates, awaits the load and applies it.
    pub async fn load<F>(&self, fut: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        let activation = self.activate().await;
        let result = fut.await;
        self.apply(activation, result).await
    }

    pub async fn snapshot(&self) -> ScreenState<T> {
        self.state.lock().await.clone()
    }
}

/// One row of the filmography list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmCard {
    pub id: u32,
    pub title: String,
    pub year: String,
    pub character: Option<String>,
    pub rating: f64,
    pub poster_url: Option<String>,
}

impl FilmCard {
    pub fn from_credit(credit: &CreditRecord, images: &ImageUrls) -> Self {
        Self {
            id: credit.id,
            title: credit.title.clone(),
            year: release_year(&credit.release_date).to_string(),
            character: credit.character.clone().filter(|c| !c.is_empty()),
            rating: credit.vote_average,
            poster_url: images.build(credit.poster_path.as_deref(), ImageSize::W185),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmographyView {
    pub sort: SortMode,
    pub query: String,
    pub count: usize,
    pub films: Vec<FilmCard>,
}

/// A person's cast credits, deduplicated once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Filmography {
    credits: Vec<CreditRecord>,
}

impl Filmography {
    pub fn new(cast: Vec<CreditRecord>) -> Self {
        Self {
            credits: credits::dedup_by_identity(cast),
        }
    }

    pub fn credits(&self) -> &[CreditRecord] {
        &self.credits
    }

    pub fn view(&self, query: &str, sort: SortMode, images: &ImageUrls) -> FilmographyView {
        let shaped = credits::shape(self.credits.clone(), query, sort);
        let films: Vec<FilmCard> = shaped
            .iter()
            .map(|c| FilmCard::from_credit(c, images))
            .collect();
        FilmographyView {
            sort,
            query: query.to_string(),
            count: films.len(),
            films,
        }
    }
}

pub async fn load_filmography(api: &dyn TmdbApi, person_id: u32) -> Result<Filmography> {
    let credits = api
        .fetch_person_credits(person_id)
        .await
        .with_context(|| format!("Failed to load credits for person {}", person_id))?;
    let raw = credits.cast.len();
    let filmography = Filmography::new(credits.cast);
    debug!(
        person_id,
        raw,
        unique = filmography.credits().len(),
        "Loaded filmography"
    );
    Ok(filmography)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TributeView {
    pub name: String,
    pub birth_year: String,
    pub death_year: String,
    pub biography: String,
    pub profile_url: Option<String>,
    pub film_count: usize,
    pub awards: AwardStats,
    pub quote: String,
    pub notable_roles: Vec<NotableRole>,
    pub memorial: String,
    /// True when TMDB failed and the defaults are shown instead.
    pub placeholder: bool,
}

impl TributeView {
    pub fn placeholder(defaults: &TributeDefaults) -> Self {
        Self {
            name: defaults.name.clone(),
            birth_year: defaults.birth_year.clone(),
            death_year: defaults.death_year.clone(),
            biography: defaults.biography.clone(),
            profile_url: None,
            film_count: 0,
            awards: defaults.awards,
            quote: defaults.quote.clone(),
            notable_roles: defaults.notable_roles.clone(),
            memorial: defaults.memorial.clone(),
            placeholder: true,
        }
    }

    fn from_records(
        person: &PersonRecord,
        cast: &[CreditRecord],
        defaults: &TributeDefaults,
        images: &ImageUrls,
    ) -> Self {
        let film_count = cast.iter().map(|c| c.id).collect::<HashSet<_>>().len();
        Self {
            name: non_empty_or(&person.name, &defaults.name),
            birth_year: year_or(person.birthday.as_deref(), &defaults.birth_year),
            death_year: year_or(person.deathday.as_deref(), &defaults.death_year),
            biography: non_empty_or(&person.biography, &defaults.biography),
            profile_url: images.profile(person.profile_path.as_deref()),
            film_count,
            awards: defaults.awards,
            quote: defaults.quote.clone(),
            notable_roles: defaults.notable_roles.clone(),
            memorial: defaults.memorial.clone(),
            placeholder: false,
        }
    }
}

fn year_or(date: Option<&str>, fallback: &str) -> String {
    match date.map(release_year) {
        Some(year) if !year.is_empty() => year.to_string(),
        _ => fallback.to_string(),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

pub async fn load_tribute(
    api: &dyn TmdbApi,
    person_id: u32,
    policy: FallbackPolicy,
    defaults: &TributeDefaults,
    images: &ImageUrls,
) -> Result<TributeView> {
    let fetched = tokio::try_join!(
        api.fetch_person_detail(person_id),
        api.fetch_person_credits(person_id),
    );
    match fetched {
        Ok((person, credits)) => Ok(TributeView::from_records(
            &person,
            &credits.cast,
            defaults,
            images,
        )),
        Err(e) => match policy {
            FallbackPolicy::Placeholder => {
                warn!("Tribute fetch failed, showing placeholder: {}", e);
                Ok(TributeView::placeholder(defaults))
            }
            FallbackPolicy::Error => {
                Err(anyhow::Error::new(e).context(format!("Failed to load person {}", person_id)))
            }
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    pub id: u32,
    pub title: String,
    pub tagline: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub rating: Option<String>,
    pub genres: Vec<String>,
    pub overview: Option<String>,
    /// Who the featured person played in this movie, if they are in the cast.
    pub character: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl MovieView {
    fn from_records(
        detail: MovieDetailRecord,
        character: Option<String>,
        images: &ImageUrls,
    ) -> Self {
        let year = Some(release_year(&detail.release_date).to_string()).filter(|y| !y.is_empty());
        Self {
            id: detail.id,
            poster_url: images.build(detail.poster_path.as_deref(), ImageSize::W342),
            backdrop_url: images.build(detail.backdrop_path.as_deref(), ImageSize::W1280),
            title: detail.title,
            tagline: detail.tagline.filter(|t| !t.trim().is_empty()),
            year,
            runtime: runtime_label(detail.runtime),
            rating: rating_label(detail.vote_average),
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            overview: Some(detail.overview).filter(|o| !o.trim().is_empty()),
            character,
        }
    }
}

pub fn runtime_label(minutes: u32) -> Option<String> {
    if minutes == 0 {
        return None;
    }
    Some(format!("{}h {}m", minutes / 60, minutes % 60))
}

pub fn rating_label(rating: f64) -> Option<String> {
    if rating > 0.0 {
        Some(format!("{:.1}", rating))
    } else {
        None
    }
}

pub async fn load_movie(
    api: &dyn TmdbApi,
    movie_id: u32,
    featured_person_id: u32,
    images: &ImageUrls,
) -> Result<MovieView> {
    if movie_id == 0 {
        return Err(anyhow!("Movie not found"));
    }
    let (detail, credits) = tokio::try_join!(
        api.fetch_movie_detail(movie_id),
        api.fetch_movie_credits(movie_id),
    )
    .with_context(|| format!("Failed to load movie {}", movie_id))?;
    let character = credits
        .cast
        .into_iter()
        .find(|c| c.id == featured_person_id)
        .and_then(|c| c.character)
        .filter(|c| !c.is_empty());
    Ok(MovieView::from_records(detail, character, images))
}
