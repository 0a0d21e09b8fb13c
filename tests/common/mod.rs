//! Shared helpers for the Search Job client integration tests.
//!
//! Every test starts its own wiremock server and points a client at it with
//! [`client_for`].

#[allow(unused_imports)]
pub use serde_json::json;
#[allow(unused_imports)]
pub use sumo_search::{SessionCookie, SessionCookies, SumoClient, SumoError};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "accessToken";

/// Client with the fixed test token, aimed at the mock server root.
pub fn client_for(server: &MockServer) -> SumoClient {
    SumoClient::new(TEST_TOKEN, &server.uri()).expect("mock server uri is a valid endpoint")
}

/// Cookies as the start call would hand them back.
#[allow(dead_code)]
pub fn session_cookies() -> SessionCookies {
    SessionCookies::new(vec![
        SessionCookie {
            name: "JSESSIONID".to_string(),
            value: "abc123".to_string(),
        },
        SessionCookie {
            name: "AWSELB".to_string(),
            value: "node-7".to_string(),
        },
    ])
}
