// Server information endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::transport::HttpTransport;

pub const LOGIN_INFO_PATH: &str = "/api/info/login";

impl<T: HttpTransport> ApiClient<T> {
    /// Probe the login/status endpoint. `dns` is `true` while the resolver
    /// is running with blocking enabled.
    ///
    /// `GET /api/info/login`
    pub async fn get_login_info(&self) -> Result<Value, Error> {
        debug!("probing blocking status");
        self.execute(LOGIN_INFO_PATH, &[]).await
    }
}
