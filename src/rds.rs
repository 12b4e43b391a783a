use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER;
use ring::hmac;
use sha2::{Digest, Sha256};

use crate::{
    config::AwsConfig,
    provider::{ProviderError, SnapshotDescriptor, SnapshotProvider},
};

const API_VERSION: &str = "2014-10-31";
const SERVICE: &str = "rds";
const CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
// The error code RDS uses when a DescribeDBSnapshots filter matches nothing.
const NOT_FOUND_CODE: &str = "DBSnapshotNotFound";
// DescribeDBSnapshots accepts 20 through 100 records per page.
const MAX_RECORDS: &str = "100";

/// A client for the RDS control plane, scoped to one region and one set of
/// credentials.
pub struct RdsClient {
    http: reqwest::Client,
    host: String,
    region: String,
    access_key: String,
    secret_key: String,
}

enum QueryError {
    Api { code: String, message: String },
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> QueryError {
        QueryError::Transport(err)
    }
}

impl From<QueryError> for ProviderError {
    fn from(err: QueryError) -> ProviderError {
        match err {
            QueryError::Api { message, .. } => ProviderError::Api(message),
            QueryError::Transport(err) => ProviderError::Transport(err),
        }
    }
}

impl RdsClient {
    pub fn new(config: &AwsConfig) -> Self {
        RdsClient {
            http: reqwest::Client::new(),
            host: format!("rds.{}.amazonaws.com", config.region),
            region: config.region.to_string(),
            access_key: config.access_key.to_string(),
            secret_key: config.secret_key.to_string(),
        }
    }

    /// Issue one signed Query API call and return the raw response body.
    async fn query(&self, action: &str, params: &[(&str, &str)]) -> Result<String, QueryError> {
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            form.append_pair("Action", action);
            form.append_pair("Version", API_VERSION);
            for (key, value) in params {
                form.append_pair(key, value);
            }
            form.finish()
        };

        let now = Utc::now();
        let authorization = sign_request(
            &body,
            &self.host,
            &self.region,
            SERVICE,
            &self.access_key,
            &self.secret_key,
            &now,
        );

        let resp = self
            .http
            .post(format!("https://{}/", self.host))
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Date", amz_date(&now))
            .header("Authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let code = xml_text(&text, "Code").unwrap_or_default();
        let message = match xml_text(&text, "Message") {
            Some(message) => message,
            None => format!("{} failed with status {}", action, status),
        };

        Err(QueryError::Api { code, message })
    }
}

#[async_trait::async_trait]
impl SnapshotProvider for RdsClient {
    async fn find_snapshot(&self, name: &str) -> Result<SnapshotDescriptor, ProviderError> {
        let params = [("DBSnapshotIdentifier", name), ("MaxRecords", MAX_RECORDS)];

        match self.query("DescribeDBSnapshots", &params).await {
            Ok(text) => match xml_text(&text, "DBSnapshotIdentifier") {
                Some(identifier) => Ok(SnapshotDescriptor {
                    identifier,
                    status: xml_text(&text, "Status"),
                }),
                None => Err(ProviderError::NotFound(name.to_string())),
            },
            Err(QueryError::Api { ref code, .. }) if code == NOT_FOUND_CODE => {
                Err(ProviderError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_snapshot(&self, name: &str) -> Result<(), ProviderError> {
        self.query("DeleteDBSnapshot", &[("DBSnapshotIdentifier", name)])
            .await?;

        Ok(())
    }

    async fn copy_snapshot(&self, source: &str, target: &str) -> Result<(), ProviderError> {
        let params = [
            ("SourceDBSnapshotIdentifier", source),
            ("TargetDBSnapshotIdentifier", target),
        ];
        self.query("CopyDBSnapshot", &params).await?;

        Ok(())
    }
}

fn amz_date(t: &DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Compute the Signature Version 4 `Authorization` header for a form-encoded
/// POST to `https://{host}/`.
fn sign_request(
    body: &str,
    host: &str,
    region: &str,
    service: &str,
    access_key: &str,
    secret_key: &str,
    t: &DateTime<Utc>,
) -> String {
    let date = t.format("%Y%m%d").to_string();
    let timestamp = amz_date(t);

    let payload_hash = HEXLOWER.encode(Sha256::digest(body.as_bytes()).as_slice());
    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-date:{}\n",
        CONTENT_TYPE, host, timestamp
    );
    let signed_headers = "content-type;host;x-amz-date";
    let canonical_request = format!(
        "POST\n/\n\n{}\n{}\n{}",
        canonical_headers, signed_headers, payload_hash
    );

    let scope = format!("{}/{}/{}/aws4_request", date, region, service);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        timestamp,
        scope,
        HEXLOWER.encode(Sha256::digest(canonical_request.as_bytes()).as_slice())
    );

    let mut key = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes());
    for part in [region, service, "aws4_request"] {
        key = hmac_sha256(&key, part.as_bytes());
    }
    let signature = HEXLOWER.encode(&hmac_sha256(&key, string_to_sign.as_bytes()));

    format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        access_key, scope, signed_headers, signature
    )
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Pull the text of the first `<tag>...</tag>` out of a response body. The
/// Query API only ever hands us a handful of flat fields, so this does not try
/// to be a real XML parser.
fn xml_text(body: &str, tag: &str) -> Option<String> {
    let pattern = format!("<{}>([^<]*)</{}>", tag, tag);
    let re = regex::Regex::new(&pattern).ok()?;
    let raw = re.captures(body).map(|caps| caps[1].to_string())?;

    Some(xml_unescape(&raw))
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
