use std::time::Duration;

use reqwest::{Client, header};
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::RenderError;
use crate::{DocumentHandle, Renderer};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/143.0.0.0 Safari/537.36";

/// How often a page is re-read while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Renderer backed by a plain HTTP session: the rendered document is the
/// markup the server returns. Cookies persist across navigations.
pub struct HttpRenderer {
    client: Client,
    poll_interval: Duration,
}

impl HttpRenderer {
    pub fn launch(request_timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(request_timeout)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        debug!("http renderer session started");
        Ok(Self {
            client,
            poll_interval: POLL_INTERVAL,
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, RenderError> {
        let navigation = |e: reqwest::Error| RenderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(navigation)?
            .error_for_status()
            .map_err(navigation)?;
        resp.text().await.map_err(navigation)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|_| RenderError::Selector(selector.to_string()))
}

fn has_match(markup: &str, selector: &str) -> Result<bool, RenderError> {
    let selector = parse_selector(selector)?;
    Ok(Html::parse_document(markup).select(&selector).next().is_some())
}

#[async_trait::async_trait]
impl Renderer for HttpRenderer {
    async fn navigate(&mut self, url: &str) -> Result<DocumentHandle, RenderError> {
        let markup = self.fetch(url).await?;
        debug!(url, bytes = markup.len(), "navigated");
        Ok(DocumentHandle::new(url, markup))
    }

    async fn wait_for_selector(
        &mut self,
        doc: &mut DocumentHandle,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        parse_selector(selector)?;
        let poll = async {
            loop {
                if has_match(&doc.markup, selector)? {
                    return Ok::<(), RenderError>(());
                }
                tokio::time::sleep(self.poll_interval).await;
                doc.markup = self.fetch(&doc.url).await?;
            }
        };
        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            }),
        }
    }

    async fn close(self) -> Result<(), RenderError> {
        debug!("http renderer session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_listing_container() {
        let sel = ".movie-showtimes";
        assert!(has_match(r#"<div class="movie-showtimes"></div>"#, sel).unwrap());
        assert!(!has_match(r#"<div class="loading"></div>"#, sel).unwrap());
    }

    #[test]
    fn rejects_bad_selector() {
        assert!(matches!(parse_selector("div[["), Err(RenderError::Selector(_))));
    }

    #[tokio::test]
    async fn wait_times_out_when_container_never_appears() {
        // The re-read is scheduled after the bound, so no request is made.
        let mut renderer = HttpRenderer::launch(Duration::from_secs(5)).unwrap();
        renderer.poll_interval = Duration::from_secs(60);
        let mut doc = DocumentHandle::new("http://127.0.0.1:9/", "<p>loading</p>");
        let err = renderer
            .wait_for_selector(&mut doc, ".movie-showtimes", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Timeout { .. }));
    }
}
