//! Remote script listing and download through the GitHub contents API.
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::config::LauncherSettings;
use crate::errors::DockhandError;

/// One item of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    pub name: String,
    pub path: String,
    pub download_url: String,
}

/// Files ending in `.sh`, excluding `self_name`, sorted by name.
pub fn filter_scripts(entries: Vec<ContentEntry>, self_name: &str) -> Vec<RemoteScript> {
    let mut scripts: Vec<RemoteScript> = entries
        .into_iter()
        .filter(|e| e.kind == "file" && e.name.ends_with(".sh") && e.name != self_name)
        .filter_map(|e| {
            let download_url = e.download_url?;
            Some(RemoteScript {
                name: e.name,
                path: e.path,
                download_url,
            })
        })
        .collect();
    scripts.sort_by(|a, b| a.name.cmp(&b.name));
    scripts
}

pub trait ScriptSource {
    /// Where scripts come from, e.g. `owner/repo@main:scripts`.
    fn describe(&self) -> String;
    fn list(&self) -> Result<Vec<ContentEntry>, DockhandError>;
    fn download(&self, script: &RemoteScript) -> Result<Vec<u8>, DockhandError>;
}

pub struct GithubSource {
    client: reqwest::blocking::Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    path: String,
    token: Option<String>,
}

const USER_AGENT: &str = concat!("dockhand/", env!("CARGO_PKG_VERSION"));

impl GithubSource {
    pub fn from_settings(settings: &LauncherSettings, timeout: Duration) -> Result<Self, DockhandError> {
        let (owner, repo) = settings.repo_parts()?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            owner,
            repo,
            branch: settings.branch.clone(),
            path: settings.path.trim_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/contents/{path}?ref={branch}` with each path segment
    /// percent-encoded.
    pub fn contents_url(&self) -> Result<url::Url, DockhandError> {
        let mut raw = format!(
            "{}/repos/{}/{}/contents",
            self.api_base,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo)
        );
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            raw.push('/');
            raw.push_str(&urlencoding::encode(segment));
        }
        let mut url = url::Url::parse(&raw)
            .map_err(|e| DockhandError::Config(format!("invalid GitHub API URL '{raw}': {e}")))?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }

    fn get(&self, url: &str, accept: &str) -> Result<reqwest::blocking::Response, DockhandError> {
        let mut req = self.client.get(url).header(reqwest::header::ACCEPT, accept);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        tracing::debug!(url, "GET");
        let resp = req
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(DockhandError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

impl ScriptSource for GithubSource {
    fn describe(&self) -> String {
        if self.path.is_empty() {
            format!("{}/{}@{}", self.owner, self.repo, self.branch)
        } else {
            format!("{}/{}@{}:{}", self.owner, self.repo, self.branch, self.path)
        }
    }

    fn list(&self) -> Result<Vec<ContentEntry>, DockhandError> {
        let url = self.contents_url()?;
        let resp = self.get(url.as_str(), "application/vnd.github+json")?;
        let body = resp
            .text()
            .with_context(|| format!("failed to read response from {url}"))?;
        parse_listing(&body)
    }

    fn download(&self, script: &RemoteScript) -> Result<Vec<u8>, DockhandError> {
        let resp = self.get(&script.download_url, "application/octet-stream")?;
        let bytes = resp
            .bytes()
            .with_context(|| format!("failed to read {}", script.download_url))?;
        Ok(bytes.to_vec())
    }
}

/// Contents API body: an array of entries. A single object means `path` named a file.
pub fn parse_listing(body: &str) -> Result<Vec<ContentEntry>, DockhandError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| DockhandError::Message(format!("unexpected contents API response: {e}")))?;
    if !value.is_array() {
        return Err(DockhandError::Config(
            "launcher path does not name a directory in the repository".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| DockhandError::Message(format!("unexpected contents API response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: &str) -> ContentEntry {
        ContentEntry {
            name: name.to_string(),
            path: name.to_string(),
            kind: kind.to_string(),
            download_url: Some(format!("https://raw.example/{name}")),
        }
    }

    #[test]
    fn keeps_sorted_shell_files_only() {
        let entries = vec![
            entry("zeta.sh", "file"),
            entry("setup.sh", "file"),
            entry("README.md", "file"),
            entry("lib.sh", "dir"),
            entry("alpha.sh", "file"),
        ];
        let names: Vec<String> = filter_scripts(entries, "setup.sh")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alpha.sh".to_string(), "zeta.sh".to_string()]);
    }

    #[test]
    fn parses_github_listing() {
        let body = r#"[
            {"name":"install.sh","path":"scripts/install.sh","type":"file","size":10,
             "download_url":"https://raw.githubusercontent.com/o/r/main/scripts/install.sh"},
            {"name":"lib","path":"scripts/lib","type":"dir","download_url":null}
        ]"#;
        let entries = parse_listing(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind, "dir");
        assert!(entries[1].download_url.is_none());
    }

    #[test]
    fn object_body_is_not_a_directory() {
        let err = parse_listing(r#"{"name":"x.sh","type":"file"}"#).unwrap_err();
        assert!(matches!(err, DockhandError::Config(_)), "{err:?}");
    }

    #[test]
    fn contents_url_encodes_path_and_branch() {
        let settings = LauncherSettings {
            repo: Some("acme/home-lab".to_string()),
            branch: "feature/x y".to_string(),
            path: "/my scripts/fedora/".to_string(),
            ..LauncherSettings::default()
        };
        let src = GithubSource::from_settings(&settings, Duration::from_secs(5)).unwrap();
        assert_eq!(
            src.contents_url().unwrap().as_str(),
            "https://api.github.com/repos/acme/home-lab/contents/my%20scripts/fedora?ref=feature%2Fx+y"
        );
        assert_eq!(src.describe(), "acme/home-lab@feature/x y:my scripts/fedora");
    }
}
