use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, Request, Response, Url};

/// Transport used for remote CSV snapshots.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// Plain GET asking for CSV; servers that ignore `Accept` still work.
    async fn get_csv(&self, url: Url) -> reqwest::Result<Response> {
        let mut req = Request::new(Method::GET, url);
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("text/csv, */*;q=0.8"));
        self.execute(req).await
    }
}
