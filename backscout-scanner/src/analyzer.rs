use crate::error::{Result, ScanError};
use scraper::{Html, Selector};

/// What the crawler needs from a fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Text of the document body, used for relevance scoring.
    pub text: String,
    /// Raw `href` values of every anchor, in document order.
    pub links: Vec<String>,
}

pub struct PageAnalyzer {
    body_selector: Selector,
    anchor_selector: Selector,
    keywords: Vec<String>,
}

impl PageAnalyzer {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body_selector = Selector::parse("body")
            .map_err(|e| ScanError::ParseError(format!("invalid body selector: {}", e)))?;
        let anchor_selector = Selector::parse("a")
            .map_err(|e| ScanError::ParseError(format!("invalid anchor selector: {}", e)))?;

        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            body_selector,
            anchor_selector,
            keywords,
        })
    }

    pub fn analyze(&self, body: &[u8]) -> Result<PageContent> {
        // Legacy-charset pages keep their markup; only the odd bytes become U+FFFD.
        let html = String::from_utf8_lossy(body);

        let document = Html::parse_document(&html);

        let text = document
            .select(&self.body_selector)
            .flat_map(|body| body.text())
            .collect::<String>();

        // Anchors without an href are skipped, not reported.
        let links = document
            .select(&self.anchor_selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(|href| href.to_string())
            .collect();

        Ok(PageContent { text, links })
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
