//! Jenkins REST API client.

use std::time::Duration;

use async_trait::async_trait;
use buildwatch_core::{CiServer, FetchError, Job, TriggerError};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

/// Fields requested from `/api/json`.
pub const JOBS_TREE: &str = "jobs[name,url,lastBuild[number,result,building]]";

/// Jenkins API client authenticated with a user API token.
pub struct JenkinsClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    api_token: SecretString,
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<Job>,
}

impl JenkinsClient {
    /// Create a client for the Jenkins instance at `base_url`.
    pub fn new(
        base_url: &str,
        user: impl Into<String>,
        api_token: SecretString,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("BuildWatch")
            .build()?;

        Ok(Self::with_client(client, base_url, user, api_token))
    }

    /// Create with a custom HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        user: impl Into<String>,
        api_token: SecretString,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.into(),
            api_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn trigger_url(&self, job_name: &str) -> String {
        format!(
            "{}/job/{}/build",
            self.base_url,
            urlencoding::encode(job_name)
        )
    }
}

#[async_trait]
impl CiServer for JenkinsClient {
    fn name(&self) -> &'static str {
        "jenkins"
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError> {
        let url = format!("{}/api/json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("tree", JOBS_TREE)])
            .basic_auth(&self.user, Some(self.api_token.expose_secret()))
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let list: JobList = serde_json::from_str(&body)?;

        debug!(jobs = list.jobs.len(), "Fetched Jenkins jobs");
        Ok(list.jobs)
    }

    async fn trigger_build(&self, job_name: &str) -> Result<(), TriggerError> {
        let response = self
            .client
            .post(self.trigger_url(job_name))
            .basic_auth(&self.user, Some(self.api_token.expose_secret()))
            .send()
            .await
            .map_err(|e| TriggerError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED => {
                info!(job = %job_name, "Triggered Jenkins build");
                Ok(())
            }
            status => Err(TriggerError::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildwatch_core::{BuildResult, LastBuild};
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> JenkinsClient {
        JenkinsClient::new(
            &server.uri(),
            "bot",
            SecretString::from("api-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .and(query_param("tree", JOBS_TREE))
            .and(basic_auth("bot", "api-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_class": "hudson.model.Hudson",
                "jobs": [
                    {
                        "name": "deploy",
                        "url": format!("{}/job/deploy/", base),
                        "lastBuild": {"number": 5, "building": true, "result": null}
                    },
                    {
                        "name": "lint",
                        "url": format!("{}/job/lint/", base),
                        "lastBuild": {"number": 9, "building": false, "result": "SUCCESS"}
                    },
                    {
                        "name": "empty",
                        "url": format!("{}/job/empty/", base),
                        "lastBuild": null
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let jobs = client(&server).list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].last_build, Some(LastBuild::building(5)));
        assert_eq!(
            jobs[1].last_build,
            Some(LastBuild::finished(9, BuildResult::Success))
        );
        assert!(jobs[2].last_build.is_none());
    }

    #[tokio::test]
    async fn test_list_jobs_missing_jobs_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let jobs = client(&server).list_jobs().await.unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_list_jobs_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).list_jobs().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401 }));
    }

    #[tokio::test]
    async fn test_list_jobs_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobs": [{"name": "deploy", "url": "x", "lastBuild": {"building": true}}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_jobs().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_list_jobs_unreachable() {
        let jenkins = JenkinsClient::new(
            "http://127.0.0.1:1",
            "bot",
            SecretString::from("api-token".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = jenkins.list_jobs().await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }

    #[tokio::test]
    async fn test_trigger_build_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/deploy/build"))
            .and(basic_auth("bot", "api-token"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).trigger_build("deploy").await.unwrap();
    }

    #[tokio::test]
    async fn test_trigger_build_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/deploy/build"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).trigger_build("deploy").await.unwrap_err();
        assert!(matches!(err, TriggerError::Rejected { status: 500 }));
    }

    #[tokio::test]
    async fn test_trigger_build_ok_is_not_accepted() {
        // Jenkins answers 201 when a build is queued; anything else is a failure.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/deploy/build"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server).trigger_build("deploy").await.unwrap_err();
        assert!(matches!(err, TriggerError::Rejected { status: 200 }));
    }

    #[test]
    fn test_trigger_url_encodes_job_name() {
        let jenkins = JenkinsClient::with_client(
            reqwest::Client::new(),
            "https://ci.example.com/jenkins/",
            "bot",
            SecretString::from("t".to_string()),
        );
        assert_eq!(jenkins.base_url(), "https://ci.example.com/jenkins");
        assert_eq!(
            jenkins.trigger_url("nightly build"),
            "https://ci.example.com/jenkins/job/nightly%20build/build"
        );
    }
}
