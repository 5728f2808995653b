use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::warn;

use crate::error::FetchError;
use crate::models::{Salary, Vacancy};

/// The job boards we can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    HeadHunter,
    SuperJob,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::HeadHunter => "HeadHunter",
            Provider::SuperJob => "SuperJob",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "hh" => Some(Provider::HeadHunter),
            "sj" => Some(Provider::SuperJob),
            _ => None,
        }
    }

    fn base_url(&self) -> &'static str {
        match self {
            Provider::HeadHunter => "https://api.hh.ru",
            Provider::SuperJob => "https://api.superjob.ru/2.0",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Deserialize)]
struct HhResponse {
    items: Vec<HhItem>,
}

#[derive(Debug, Deserialize)]
struct HhItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    alternate_url: String,
    salary: Option<HhSalary>,
    snippet: Option<HhSnippet>,
}

#[derive(Debug, Deserialize)]
struct HhSalary {
    from: Option<i64>,
    to: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HhSnippet {
    responsibility: Option<String>,
}

impl HhItem {
    fn into_vacancy(self) -> Vacancy {
        let salary = match self.salary {
            Some(bounds) => salary_from_bounds(bounds.from, bounds.to),
            None => Salary::Unspecified,
        };
        // Snippet fields carry <highlighttext> markup around the search terms
        let description = self
            .snippet
            .and_then(|snippet| snippet.responsibility)
            .map(|text| flatten_html(&text))
            .unwrap_or_default();
        Vacancy::new(self.name, self.alternate_url, salary, description)
    }
}

#[derive(Debug, Deserialize)]
struct SjResponse {
    objects: Vec<SjItem>,
}

#[derive(Debug, Deserialize)]
struct SjItem {
    #[serde(default)]
    profession: String,
    #[serde(default)]
    link: String,
    // SuperJob sends 0 for an unset bound
    #[serde(default)]
    payment_from: i64,
    #[serde(default)]
    payment_to: i64,
    #[serde(default)]
    candidat: String,
}

impl SjItem {
    fn into_vacancy(self) -> Vacancy {
        let nonzero = |bound: i64| (bound > 0).then_some(bound);
        let salary = salary_from_bounds(nonzero(self.payment_from), nonzero(self.payment_to));
        Vacancy::new(self.profession, self.link, salary, self.candidat)
    }
}

fn salary_from_bounds(from: Option<i64>, to: Option<i64>) -> Salary {
    match (from, to) {
        (Some(min), Some(max)) => Salary::Range { min, max },
        (Some(amount), None) | (None, Some(amount)) => Salary::Exact(amount),
        (None, None) => Salary::Unspecified,
    }
}

fn flatten_html(text: &str) -> String {
    let plain = html2text::from_read(text.as_bytes(), 500);
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One search client for every provider; the per-provider differences are
/// the endpoint, the credential header, and the response field mapping.
pub struct VacancyClient {
    client: Client,
    superjob_api_key: Option<String>,
}

impl VacancyClient {
    pub fn new(superjob_api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            superjob_api_key,
        })
    }

    pub async fn fetch(
        &self,
        provider: Provider,
        search_query: &str,
    ) -> Result<Vec<Vacancy>, FetchError> {
        let url = format!(
            "{}/vacancies?text={}",
            provider.base_url(),
            urlencoding::encode(search_query)
        );

        let mut request = self.client.get(&url);
        if provider == Provider::SuperJob {
            let key = self
                .superjob_api_key
                .as_deref()
                .ok_or(FetchError::MissingCredential(provider))?;
            request = request.header("X-Api-App-Id", key);
        }

        let response = request.send().await.map_err(|source| {
            warn!(%provider, error = %source, "vacancy fetch failed");
            FetchError::Transport { provider, source }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            warn!(%provider, %status, "vacancy fetch rejected");
            return Err(FetchError::Status {
                provider,
                status,
                body,
            });
        }

        let vacancies = match provider {
            Provider::HeadHunter => {
                let data = response
                    .json::<HhResponse>()
                    .await
                    .map_err(|source| FetchError::Transport { provider, source })?;
                data.items.into_iter().map(HhItem::into_vacancy).collect()
            }
            Provider::SuperJob => {
                let data = response
                    .json::<SjResponse>()
                    .await
                    .map_err(|source| FetchError::Transport { provider, source })?;
                data.objects.into_iter().map(SjItem::into_vacancy).collect()
            }
        };

        Ok(vacancies)
    }
}
