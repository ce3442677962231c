//! Static job catalog and substring search
//!
//! The catalog is a fixed, ordered list created once and never mutated.
//! Search is a case-insensitive containment test over title, company,
//! description and location; results keep catalog order.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single job posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: Cow<'static, str>,
    pub company: Option<Cow<'static, str>>,
    pub location: Option<Cow<'static, str>>,
    /// Free-form, e.g. "USD 3k - 5k" or "A convenir"
    pub salary: Option<Cow<'static, str>>,
    pub description: Option<Cow<'static, str>>,
    pub url: Cow<'static, str>,
}

impl JobListing {
    /// Whether `needle` (already lower-cased) occurs in any searchable field
    ///
    /// Missing optional fields behave like empty strings.
    pub fn matches(&self, needle: &str) -> bool {
        [
            Some(&self.title),
            self.company.as_ref(),
            self.description.as_ref(),
            self.location.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

const fn listing(
    title: &'static str,
    company: &'static str,
    location: &'static str,
    salary: &'static str,
    description: &'static str,
    url: &'static str,
) -> JobListing {
    JobListing {
        title: Cow::Borrowed(title),
        company: Some(Cow::Borrowed(company)),
        location: Some(Cow::Borrowed(location)),
        salary: Some(Cow::Borrowed(salary)),
        description: Some(Cow::Borrowed(description)),
        url: Cow::Borrowed(url),
    }
}

/// The sample postings served by `/jobs/search`
pub static SAMPLE_JOBS: [JobListing; 4] = [
    listing(
        "Desarrollador Frontend React",
        "TechNova",
        "Remoto - LATAM",
        "USD 2.5k - 4k",
        "Construye interfaces modernas con React, Tailwind y Vite.",
        "https://example.com/jobs/frontend-react",
    ),
    listing(
        "Analista de Datos",
        "DataFlow",
        "Bogotá, Colombia (Híbrido)",
        "COP 8M - 12M",
        "Modelado, dashboards y storytelling con datos.",
        "https://example.com/jobs/data-analyst",
    ),
    listing(
        "Diseñador UI/UX Senior",
        "Magneto Labs",
        "Medellín, Colombia (Remoto)",
        "A convenir",
        "Crea experiencias limpias y accesibles para productos digitales.",
        "https://example.com/jobs/uiux-senior",
    ),
    listing(
        "Backend Engineer Python",
        "CloudWare",
        "Remoto",
        "USD 3k - 5k",
        "APIs con FastAPI, MongoDB y arquitectura escalable.",
        "https://example.com/jobs/backend-python",
    ),
];

/// Search response body: `{"jobs": [...]}`
#[derive(Debug, Serialize)]
pub struct SearchResults<'a> {
    pub jobs: Vec<&'a JobListing>,
}

/// Read-only, ordered set of listings
#[derive(Debug, Clone)]
pub struct Catalog {
    listings: Cow<'static, [JobListing]>,
}

impl Catalog {
    /// Catalog over caller-supplied listings
    pub fn new(listings: Vec<JobListing>) -> Self {
        Self {
            listings: Cow::Owned(listings),
        }
    }

    /// Catalog over [`SAMPLE_JOBS`]
    pub fn sample() -> Self {
        Self {
            listings: Cow::Borrowed(&SAMPLE_JOBS),
        }
    }

    pub fn listings(&self) -> &[JobListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Filter listings by query
    ///
    /// `None` and `Some("")` return every listing.
    pub fn search(&self, query: Option<&str>) -> SearchResults<'_> {
        let jobs = match query {
            None | Some("") => self.listings.iter().collect(),
            Some(q) => {
                let needle = q.to_lowercase();
                self.listings.iter().filter(|job| job.matches(&needle)).collect()
            }
        };
        SearchResults { jobs }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<'a>(results: &SearchResults<'a>) -> Vec<&'a str> {
        results.jobs.iter().map(|j| j.title.as_ref()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let catalog = Catalog::sample();

        for query in [None, Some("")] {
            let results = catalog.search(query);
            assert_eq!(results.jobs.len(), 4);
            assert!(results.jobs.iter().zip(SAMPLE_JOBS.iter()).all(|(a, b)| *a == b));
        }
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let catalog = Catalog::sample();
        assert_eq!(titles(&catalog.search(Some("Python"))), vec!["Backend Engineer Python"]);
        assert_eq!(titles(&catalog.search(Some("pYtHoN"))), vec!["Backend Engineer Python"]);
    }

    #[test]
    fn test_location_match_keeps_order() {
        let catalog = Catalog::sample();
        assert_eq!(
            titles(&catalog.search(Some("Colombia"))),
            vec!["Analista de Datos", "Diseñador UI/UX Senior"]
        );
    }

    #[test]
    fn test_non_ascii_query() {
        let catalog = Catalog::sample();
        assert_eq!(titles(&catalog.search(Some("BOGOTÁ"))), vec!["Analista de Datos"]);
        assert_eq!(titles(&catalog.search(Some("diseñador"))), vec!["Diseñador UI/UX Senior"]);
    }

    #[test]
    fn test_company_and_description_match() {
        let catalog = Catalog::sample();
        assert_eq!(titles(&catalog.search(Some("cloudware"))), vec!["Backend Engineer Python"]);
        assert_eq!(
            titles(&catalog.search(Some("tailwind"))),
            vec!["Desarrollador Frontend React"]
        );
    }

    #[test]
    fn test_salary_and_url_are_not_searched() {
        let catalog = Catalog::sample();
        assert!(catalog.search(Some("convenir")).jobs.is_empty());
        assert!(catalog.search(Some("example.com")).jobs.is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let catalog = Catalog::sample();
        let results = catalog.search(Some("zzz-no-match"));
        assert!(results.jobs.is_empty());
        assert_eq!(serde_json::to_string(&results).unwrap(), r#"{"jobs":[]}"#);
    }

    #[test]
    fn test_every_result_matches() {
        let catalog = Catalog::sample();
        for query in ["re", "Remoto", "datos", "a", "LATAM", "ux", "MAGNETO", "zzz"] {
            let needle = query.to_lowercase();
            let contains = |field: Option<&str>| field.unwrap_or("").to_lowercase().contains(&needle);
            let expected: Vec<&str> = SAMPLE_JOBS
                .iter()
                .filter(|job| {
                    contains(Some(job.title.as_ref()))
                        || contains(job.company.as_deref())
                        || contains(job.description.as_deref())
                        || contains(job.location.as_deref())
                })
                .map(|job| job.title.as_ref())
                .collect();

            assert_eq!(titles(&catalog.search(Some(query))), expected, "query {query:?}");
        }
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let catalog = Catalog::new(vec![JobListing {
            title: "Soporte".into(),
            company: None,
            location: None,
            salary: None,
            description: None,
            url: "https://example.com/jobs/soporte".into(),
        }]);

        assert_eq!(catalog.search(Some("soporte")).jobs.len(), 1);
        assert!(catalog.search(Some("remoto")).jobs.is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let catalog = Catalog::sample();
        let first = serde_json::to_string(&catalog.search(Some("Colombia"))).unwrap();
        let second = serde_json::to_string(&catalog.search(Some("Colombia"))).unwrap();
        assert_eq!(first, second);
        assert_eq!(catalog.len(), 4);
    }
}
