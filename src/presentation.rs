//! Text rendering of the country list and country cards.

use std::fmt::Write;

use tracing::{error, info};

use crate::{
    Client, Data, Error, Result,
    client::QueryResponse,
    queries::{self, CountriesQuery, Country, CountryQuery, Language},
};

pub const LIST_TITLE: &str = "Countries Around the World";

/// List title, with the result count appended only when it is non-zero.
pub fn header(no_of_results: Option<u64>) -> String {
    match no_of_results {
        Some(count) if count > 0 => format!("{LIST_TITLE} ({count})"),
        _ => LIST_TITLE.to_string(),
    }
}

#[derive(Debug)]
pub enum ListState {
    Loading,
    Ready {
        data: Data,
        countries: Vec<Country>,
    },
    Failed(Error),
}

pub struct CountryList {
    client: Client,
    display_limit: usize,
    state: ListState,
    mounted: bool,
}

impl CountryList {
    pub fn new(client: Client, display_limit: usize) -> Self {
        CountryList {
            client,
            display_limit,
            state: ListState::Loading,
            mounted: false,
        }
    }

    /// Fetches the list once. Later calls keep the settled state.
    pub async fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        self.state = match self.fetch_countries().await {
            Ok((data, countries)) => {
                info!(
                    countries = countries.len(),
                    no_of_results = ?data.no_of_results(),
                    "countries loaded"
                );
                ListState::Ready { data, countries }
            }
            Err(e) => {
                error!(error = %e, "error fetching countries");
                ListState::Failed(e)
            }
        };
    }

    async fn fetch_countries(&self) -> Result<(Data, Vec<Country>)> {
        let response = self.client.query(queries::get_countries()?).await?;
        let data = response.into_data()?;
        let CountriesQuery { countries } = data.decode()?;
        Ok((data, countries))
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            ListState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&Data> {
        match &self.state {
            ListState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Every fetched country, including those beyond the display limit.
    pub fn countries(&self) -> &[Country] {
        match &self.state {
            ListState::Ready { countries, .. } => countries,
            _ => &[],
        }
    }

    pub fn header(&self) -> String {
        header(self.data().and_then(Data::no_of_results))
    }

    /// Cards for the first `display_limit` countries.
    pub fn cards(&self) -> Vec<CountryCard> {
        self.countries()
            .iter()
            .take(self.display_limit)
            .cloned()
            .map(CountryCard::new)
            .collect()
    }

    pub fn render(&self) -> String {
        match &self.state {
            ListState::Loading => "Loading countries...\n".to_string(),
            ListState::Failed(e) => format!("Error loading countries\n{}\n", e.message()),
            ListState::Ready { .. } => {
                let mut out = format!("{}\n\n", self.header());
                for card in self.cards() {
                    out.push_str(&card.render());
                    out.push('\n');
                }
                out
            }
        }
    }
}

#[derive(Debug)]
enum Details {
    Hidden,
    Loading,
    Loaded(Option<Country>),
    Failed(Error),
}

/// One country with a show/hide details toggle. Details are only queried
/// while shown.
#[derive(Debug)]
pub struct CountryCard {
    country: Country,
    details: Details,
}

impl CountryCard {
    pub fn new(country: Country) -> Self {
        CountryCard {
            country,
            details: Details::Hidden,
        }
    }

    pub fn country(&self) -> &Country {
        &self.country
    }

    pub fn is_showing_details(&self) -> bool {
        !matches!(self.details, Details::Hidden)
    }

    pub fn toggle_details(&mut self) {
        self.details = match self.details {
            Details::Hidden => Details::Loading,
            _ => Details::Hidden,
        };
    }

    /// Runs the detail query if details are shown and not yet loaded.
    pub async fn load_details(&mut self, client: &Client) {
        if !matches!(self.details, Details::Loading) {
            return;
        }

        self.details = match self.fetch_country(client).await {
            Ok(country) => Details::Loaded(country),
            Err(e) => {
                error!(code = %self.country.code, error = %e, "error fetching country");
                Details::Failed(e)
            }
        };
    }

    async fn fetch_country(&self, client: &Client) -> Result<Option<Country>> {
        let operation = queries::get_country(&self.country.code)?;
        let data = client
            .query(operation)
            .await
            .and_then(QueryResponse::into_data)?;
        let CountryQuery { country } = data.decode()?;
        Ok(country)
    }

    pub fn button_label(&self) -> &'static str {
        match self.details {
            Details::Loading => "Loading...",
            Details::Hidden => "Show Details",
            _ => "Hide Details",
        }
    }

    pub fn languages(&self) -> Option<&[Language]> {
        match &self.details {
            Details::Loaded(Some(country)) => country.languages.as_deref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.details {
            Details::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        let country = &self.country;
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {} ({})", country.emoji, country.name, country.code);
        let _ = writeln!(out, "  Capital: {}", or_na(country.capital.as_deref()));
        let _ = writeln!(out, "  Currency: {}", or_na(country.currency.as_deref()));
        let _ = writeln!(out, "  [{}]", self.button_label());

        if let Some(e) = self.error() {
            let _ = writeln!(out, "  Error: {}", e.message());
        }
        if let Some(languages) = self.languages() {
            let _ = writeln!(out, "  Languages:");
            for language in languages {
                let _ = writeln!(out, "    - {}", language.name);
            }
        }
        out
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => "N/A",
    }
}
