use super::types::{
    Genre, Movie, MovieQuery, MoviesResponse, RatingEntry, RatingsResponse, SortOrder,
    YearsResponse,
};
use futures::StreamExt;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound on a response body. A full page of 50 movies is well under this.
const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024; // 2MB

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid base URL '{0}': expected http(s)://host[:port][/path]")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// True when the backend answered 404 for the resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::HttpStatus(404))
    }
}

/// Client for the movie catalog REST API.
///
/// Cheap to clone: the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct MovieApi {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl MovieApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url, timeout)
    }

    /// Build on top of an existing `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /movies/all?page&year&genre&search`
    pub async fn list_movies(&self, query: &MovieQuery) -> Result<MoviesResponse, ApiError> {
        let url = self.endpoint(&["movies", "all"], &query.to_pairs())?;
        self.get_json(url).await
    }

    /// `GET /movies/:id`
    pub async fn movie(&self, imdb_id: &str) -> Result<Movie, ApiError> {
        let url = self.endpoint(&["movies", imdb_id], &[])?;
        self.get_json(url).await
    }

    /// `GET /movies/year/:year?page&sort`
    pub async fn movies_by_year(
        &self,
        year: i32,
        page: u32,
        sort: SortOrder,
    ) -> Result<MoviesResponse, ApiError> {
        let year = year.to_string();
        let url = self.endpoint(
            &["movies", "year", &year],
            &[("page", page.to_string()), ("sort", sort.as_str().to_string())],
        )?;
        self.get_json(url).await
    }

    /// `GET /movies/genre/:genre?page`
    pub async fn movies_by_genre(&self, genre: &str, page: u32) -> Result<MoviesResponse, ApiError> {
        let url = self.endpoint(&["movies", "genre", genre], &[("page", page.to_string())])?;
        self.get_json(url).await
    }

    /// `GET /movies/search?q&page`
    pub async fn search(&self, query: &str, page: u32) -> Result<MoviesResponse, ApiError> {
        let url = self.endpoint(
            &["movies", "search"],
            &[("q", query.to_string()), ("page", page.to_string())],
        )?;
        self.get_json(url).await
    }

    /// `GET /years/all`, unwrapped to the year list.
    pub async fn years(&self) -> Result<Vec<i32>, ApiError> {
        let url = self.endpoint(&["years", "all"], &[])?;
        let body: YearsResponse = self.get_json(url).await?;
        Ok(body.years)
    }

    /// `GET /genres/all`
    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let url = self.endpoint(&["genres", "all"], &[])?;
        self.get_json(url).await
    }

    /// `GET /ratings/:id`
    pub async fn ratings(&self, imdb_id: &str) -> Result<Vec<RatingEntry>, ApiError> {
        let url = self.endpoint(&["ratings", imdb_id], &[])?;
        let body: RatingsResponse = self.get_json(url).await?;
        Ok(body.into_vec())
    }

    /// `GET /heartbeat`. Returns the backend's status text.
    pub async fn heartbeat(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["heartbeat"], &[])?;
        let body = self.get_text(url).await?;
        // Some deployments answer with a JSON string rather than plain text
        let text = serde_json::from_str::<String>(&body).unwrap_or(body);
        Ok(text.trim().to_string())
    }

    /// Join path segments onto the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET with the configured timeout covering both headers and body.
    async fn get_text(&self, url: Url) -> Result<String, ApiError> {
        tracing::debug!(url = %url, "GET");
        let started = std::time::Instant::now();

        let result = tokio::time::timeout(self.timeout, async {
            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/json")
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(ApiError::HttpStatus(response.status().as_u16()));
            }

            read_limited_text(response, MAX_RESPONSE_SIZE).await
        })
        .await
        .map_err(|_| ApiError::Timeout(self.timeout))?;

        match &result {
            Ok(body) => tracing::debug!(
                url = %url,
                bytes = body.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request completed"
            ),
            Err(e) => tracing::warn!(url = %url, error = %e, "Request failed"),
        }
        result
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|_| ApiError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() || url.host().is_none()
    {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

async fn read_limited_text(response: reqwest::Response, limit: usize) -> Result<String, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| ApiError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> MovieApi {
        MovieApi::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_validation() {
        assert!(parse_base_url("http://localhost:3001").is_ok());
        assert!(parse_base_url("https://movies.example.com/api/").is_ok());
        assert!(matches!(
            parse_base_url("localhost:3001"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = MovieApi::new("http://localhost:3001/api/", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["movies", "all"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/movies/all");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = MovieApi::new("http://localhost:3001", Duration::from_secs(1)).unwrap();
        let url = api
            .endpoint(&["movies", "genre", "Science Fiction"], &[("page", "1".into())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/movies/genre/Science%20Fiction?page=1"
        );
    }

    #[tokio::test]
    async fn test_genres_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genres/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 18, "name": "Drama"}, {"id": 35, "name": "Comedy"}]"#,
            ))
            .mount(&server)
            .await;

        let genres = api_for(&server).genres().await.unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].name, "Comedy");
    }

    #[tokio::test]
    async fn test_http_404_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = api_for(&server).movie("tt0000000").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "HTTP error: status 404");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/years/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = api_for(&server).years().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)))
            .mount(&server)
            .await;

        let err = api_for(&server).heartbeat().await.unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("ok")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let api = MovieApi::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = api.heartbeat().await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_heartbeat_plain_and_json_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/heartbeat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"alive\""))
            .mount(&server)
            .await;

        assert_eq!(api_for(&server).heartbeat().await.unwrap(), "alive");
    }
}
