// src/spell/mod.rs
use anyhow::{ensure, Result};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::fetch::{FetchError, PageSource};

pub mod title;

/// Written in place of a name whenever resolution fails.
pub const NOT_FOUND: &str = "Spell Not Found";

/// Numeric spell identifier as used in the site's URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpellId(pub u64);

impl SpellId {
    /// Parse a table cell of the shape `digits` or `digits.0+` (spreadsheet exports often
    /// write ids as `"133.0"`). Signs, exponents and other fractions are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let (int, frac) = match s.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (s, None),
        };
        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if let Some(frac) = frac {
            if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
                return None;
            }
        }
        int.parse().ok().map(SpellId)
    }
}

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a spell could not be named.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundReason {
    #[error("not a spell id: {0:?}")]
    InvalidId(String),
    #[error("status code {0}")]
    Status(u16),
    #[error("no title found")]
    NoTitle,
    #[error("title is empty after stripping")]
    EmptyName,
    #[error(transparent)]
    Network(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound(NotFoundReason),
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The value to store in the table: the name, or [`NOT_FOUND`].
    pub fn into_display_name(self) -> String {
        match self {
            Resolution::Found(name) => name,
            Resolution::NotFound(_) => NOT_FOUND.to_string(),
        }
    }
}

/// Turns spell ids into display names by scraping `{base}/classic/spell={id}`.
pub struct Resolver<S> {
    source: S,
    base: Url,
}

impl<S: PageSource> Resolver<S> {
    pub fn new(source: S, base: Url) -> Result<Self> {
        ensure!(
            !base.cannot_be_a_base(),
            "base url {} cannot carry a path",
            base
        );
        Ok(Self { source, base })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn spell_url(&self, id: SpellId) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // checked in `new`
        if let Ok(mut segs) = url.path_segments_mut() {
            segs.pop_if_empty()
                .push("classic")
                .push(&format!("spell={}", id));
        }
        url
    }

    /// Resolve a raw `SpellID` cell. Never fails; every problem becomes `NotFound`.
    pub fn resolve(&self, raw_id: &str) -> Resolution {
        match SpellId::parse(raw_id) {
            Some(id) => self.resolve_id(id),
            None => {
                warn!(raw_id, "Error: not a valid spell ID");
                Resolution::NotFound(NotFoundReason::InvalidId(raw_id.to_string()))
            }
        }
    }

    pub fn resolve_id(&self, id: SpellId) -> Resolution {
        info!(spell_id = %id, "Fetching spell name");
        let resolution = self.lookup(id);
        match &resolution {
            Resolution::Found(name) => info!(spell_id = %id, name = %name, "Found"),
            Resolution::NotFound(reason) => {
                warn!(spell_id = %id, reason = %reason, "Error: spell not found")
            }
        }
        resolution
    }

    fn lookup(&self, id: SpellId) -> Resolution {
        let url = self.spell_url(id);
        let page = match self.source.fetch(&url) {
            Ok(page) => page,
            Err(e) => return Resolution::NotFound(e.into()),
        };
        if !page.is_ok() {
            return Resolution::NotFound(NotFoundReason::Status(page.status));
        }
        let Some(raw_title) = title::document_title(&page.body) else {
            return Resolution::NotFound(NotFoundReason::NoTitle);
        };
        let name = title::spell_name(&raw_title);
        if name.is_empty() {
            Resolution::NotFound(NotFoundReason::EmptyName)
        } else {
            Resolution::Found(name)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::Page;
    use std::{cell::RefCell, collections::HashMap};

    /// Canned responses keyed by url path; unknown paths fail like a dropped connection.
    #[derive(Default)]
    pub(crate) struct FakeSite {
        pages: HashMap<String, Result<Page, FetchError>>,
        pub(crate) requests: RefCell<Vec<String>>,
    }

    impl FakeSite {
        pub(crate) fn page(mut self, id: u64, status: u16, body: &str) -> Self {
            self.pages
                .insert(format!("/classic/spell={}", id), Ok(Page::new(status, body)));
            self
        }

        pub(crate) fn spell(self, id: u64, name: &str) -> Self {
            let body = format!(
                "<html><head><title>{} - Spell - Classic World of Warcraft</title></head></html>",
                name
            );
            self.page(id, 200, &body)
        }

        pub(crate) fn failing(mut self, id: u64, err: FetchError) -> Self {
            self.pages.insert(format!("/classic/spell={}", id), Err(err));
            self
        }
    }

    impl PageSource for FakeSite {
        fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages
                .get(url.path())
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Connect("connection refused".into())))
        }
    }

    pub(crate) fn base() -> Url {
        Url::parse("https://www.wowhead.com").unwrap()
    }

    #[test]
    fn parses_ids() {
        assert_eq!(SpellId::parse("133"), Some(SpellId(133)));
        assert_eq!(SpellId::parse(" 2139 "), Some(SpellId(2139)));
        assert_eq!(SpellId::parse("133.0"), Some(SpellId(133)));
        assert_eq!(SpellId::parse("133.5"), None);
        assert_eq!(SpellId::parse("-4"), None);
        assert_eq!(SpellId::parse(""), None);
        assert_eq!(SpellId::parse("fireball"), None);
        assert_eq!(SpellId::parse("1e3"), None);
        assert_eq!(SpellId::parse("+7"), None);
        assert_eq!(SpellId::parse("1000.0e0"), None);
        assert_eq!(SpellId::parse("133."), None);
        assert_eq!(SpellId::parse("99999999999999999999"), None);
    }

    #[test]
    fn builds_spell_url() {
        let r = Resolver::new(FakeSite::default(), base()).unwrap();
        assert_eq!(
            r.spell_url(SpellId(133)).as_str(),
            "https://www.wowhead.com/classic/spell=133"
        );

        let r = Resolver::new(
            FakeSite::default(),
            Url::parse("http://127.0.0.1:9000/mirror/").unwrap(),
        )
        .unwrap();
        assert_eq!(
            r.spell_url(SpellId(7)).as_str(),
            "http://127.0.0.1:9000/mirror/classic/spell=7"
        );
    }

    #[test]
    fn rejects_cannot_be_a_base() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(Resolver::new(FakeSite::default(), url).is_err());
    }

    #[test]
    fn resolves_fireball() {
        let r = Resolver::new(FakeSite::default().spell(133, "Fireball"), base()).unwrap();
        let res = r.resolve("133");
        assert_eq!(res, Resolution::Found("Fireball".into()));
        assert_eq!(res.into_display_name(), "Fireball");
    }

    #[test]
    fn not_found_status() {
        let r = Resolver::new(FakeSite::default().page(1, 404, "gone"), base()).unwrap();
        let res = r.resolve("1");
        assert_eq!(res, Resolution::NotFound(NotFoundReason::Status(404)));
        assert_eq!(res.into_display_name(), NOT_FOUND);
    }

    #[test]
    fn non_200_success_status_is_not_found() {
        let r = Resolver::new(
            FakeSite::default().page(
                133,
                203,
                "<title>Fireball - Spell - Classic World of Warcraft</title>",
            ),
            base(),
        )
        .unwrap();
        assert_eq!(
            r.resolve("133"),
            Resolution::NotFound(NotFoundReason::Status(203))
        );
    }

    #[test]
    fn missing_title_is_not_found() {
        let r = Resolver::new(
            FakeSite::default().page(2, 200, "<html><body>nothing</body></html>"),
            base(),
        )
        .unwrap();
        assert_eq!(
            r.resolve("2"),
            Resolution::NotFound(NotFoundReason::NoTitle)
        );
    }

    #[test]
    fn empty_title_is_not_found() {
        let r = Resolver::new(
            FakeSite::default().page(3, 200, "<title> - Spell - Classic World of Warcraft</title>"),
            base(),
        )
        .unwrap();
        assert_eq!(
            r.resolve("3").into_display_name(),
            NOT_FOUND
        );
    }

    #[test]
    fn network_failure_is_not_found() {
        let r = Resolver::new(
            FakeSite::default().failing(4, FetchError::Timeout("deadline".into())),
            base(),
        )
        .unwrap();
        assert_eq!(
            r.resolve("4"),
            Resolution::NotFound(NotFoundReason::Network(FetchError::Timeout(
                "deadline".into()
            )))
        );
    }

    #[test]
    fn invalid_id_makes_no_request() {
        let r = Resolver::new(FakeSite::default(), base()).unwrap();
        assert_eq!(
            r.resolve("abc"),
            Resolution::NotFound(NotFoundReason::InvalidId("abc".into()))
        );
        assert!(r.source().requests.borrow().is_empty());
    }
}
