//! Reading the rolling index and the current-edition page.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::domain::IsoDate;

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));
static COMPACT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])(\d{8})(?:[^0-9]|$)").expect("compact-date pattern is valid")
});
static RELEASE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)release\s+date\s*:?\s*([a-z]+\.?\s+\d{1,2},?\s+\d{4})")
        .expect("release-date pattern is valid")
});

/// An index link naming one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionLink {
    pub date: IsoDate,
    pub url: String,
}

/// Every `YYYYMMDD` link on an index page, newest first, resolved against
/// `page_url`.
pub fn edition_links(html: &str, page_url: &str) -> Vec<EditionLink> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let mut seen = BTreeSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&LINK) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(date) = COMPACT_DATE
            .captures(href)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| IsoDate::parse_compact(digits.as_str()).ok())
        else {
            continue;
        };
        if !seen.insert(date) {
            continue;
        }
        let url = base
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map(String::from)
            .unwrap_or_else(|| href.to_owned());
        links.push(EditionLink { date, url });
    }

    links.sort_by(|left, right| right.date.cmp(&left.date));
    links
}

pub fn link_for(html: &str, page_url: &str, date: IsoDate) -> Option<EditionLink> {
    edition_links(html, page_url)
        .into_iter()
        .find(|link| link.date == date)
}

/// The date a page declares after "Release Date:".
pub fn declared_release_date(html: &str) -> Option<IsoDate> {
    let document = Html::parse_document(html);
    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ");
    let captures = RELEASE_DATE.captures(&text)?;
    IsoDate::find_in_text(captures.get(1)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><body><ul>
        <li><a href="/releases/h41/20251231/">December 31, 2025</a></li>
        <li><a href="/releases/h41/20260108/">January 8, 2026</a></li>
        <li><a href="20251224/default.htm">December 24, 2025</a></li>
        <li><a href="/releases/h41/20260108/">duplicate</a></li>
        <li><a href="/releases/h41/current/">Current</a></li>
        <li><a href="/releases/h41/202601081/">Malformed</a></li>
    </ul></body></html>"#;

    fn date(text: &str) -> IsoDate {
        IsoDate::parse(text).expect("valid date")
    }

    #[test]
    fn index_links_are_deduplicated_newest_first_and_absolute() {
        let links = edition_links(INDEX, "https://www.federalreserve.gov/releases/h41/");
        let dates: Vec<IsoDate> = links.iter().map(|link| link.date).collect();

        assert_eq!(
            dates,
            vec![date("2026-01-08"), date("2025-12-31"), date("2025-12-24")]
        );
        assert_eq!(
            links[0].url,
            "https://www.federalreserve.gov/releases/h41/20260108/"
        );
        assert_eq!(
            links[2].url,
            "https://www.federalreserve.gov/releases/h41/20251224/default.htm"
        );
    }

    #[test]
    fn missing_date_has_no_link() {
        let base = "https://www.federalreserve.gov/releases/h41/";
        assert!(link_for(INDEX, base, date("2026-01-01")).is_none());
        assert!(link_for(INDEX, base, date("2025-12-31")).is_some());
    }

    #[test]
    fn release_date_is_read_from_page_text() {
        let html = "<html><body><p>Release Date:&nbsp;January 8, 2026</p></body></html>";
        assert_eq!(declared_release_date(html), Some(date("2026-01-08")));
        assert_eq!(declared_release_date("<p>Weekly release</p>"), None);
    }
}
