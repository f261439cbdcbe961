use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;

use crate::error::AuthError;
use crate::error::Result;

const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Response to the initial device-code request (`spec.md` §4.8).
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    interval: Option<u64>,
}

/// Step 1: request a device code. The caller is responsible for displaying
/// `verification_uri` + `user_code` to the user before polling.
pub fn request_device_code(client: &reqwest::blocking::Client, client_id: &str) -> Result<DeviceCode> {
    let resp = client
        .post(DEVICE_CODE_URL)
        .header("Accept", "application/json")
        .form(&[("client_id", client_id), ("scope", "read:user")])
        .send()
        .map_err(|e| AuthError::Request(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(AuthError::Request(format!(
            "device code request returned {}",
            resp.status()
        )));
    }
    let body: DeviceCodeResponse = resp.json().map_err(|e| AuthError::Request(e.to_string()))?;
    Ok(DeviceCode {
        device_code: body.device_code,
        user_code: body.user_code,
        verification_uri: body.verification_uri,
        expires_in: body.expires_in,
        interval: body.interval,
    })
}

/// Step 2: poll the token endpoint at the server-advertised interval until
/// the user authorizes, the code expires, or the user explicitly denies.
/// Blocking, single-threaded (`spec.md` §5: model streaming and auth are
/// both synchronous).
pub fn poll_for_token(
    client: &reqwest::blocking::Client,
    client_id: &str,
    device: &DeviceCode,
) -> Result<String> {
    let deadline = Instant::now() + Duration::from_secs(device.expires_in);
    let mut interval = Duration::from_secs(device.interval.max(1));

    loop {
        if Instant::now() >= deadline {
            return Err(AuthError::Expired);
        }
        thread::sleep(interval);

        let resp = client
            .post(TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", client_id),
                ("device_code", device.device_code.as_str()),
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
            ])
            .send()
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let body: TokenResponse = resp.json().map_err(|e| AuthError::Request(e.to_string()))?;

        if let Some(token) = body.access_token {
            return Ok(token);
        }
        match body.error.as_deref() {
            Some("authorization_pending") => continue,
            Some("slow_down") => {
                interval += Duration::from_secs(body.interval.unwrap_or(5));
                continue;
            }
            Some("access_denied") => return Err(AuthError::Denied),
            Some("expired_token") => return Err(AuthError::Expired),
            Some(other) => return Err(AuthError::Request(other.to_string())),
            None => return Err(AuthError::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_code_deserializes_github_shape() {
        let json = r#"{
            "device_code": "d-1",
            "user_code": "ABCD-1234",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900,
            "interval": 5
        }"#;
        let resp: DeviceCodeResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(resp.user_code, "ABCD-1234");
        assert_eq!(resp.interval, 5);
    }
}
