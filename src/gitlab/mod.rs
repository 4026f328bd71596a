// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitLab REST v4 client.
//!
//! ```text
//! ClientContext::builder()
//!   .url() .private_token() .timeout() .per_page()
//!        |
//!        v
//! GitlabClient::new(&ctx)            (one reqwest::Client per context)
//!        |
//!        +--> get / post / put / delete ----> non-2xx => GitlabError::Api
//!        |
//!        +--> Pages<T>  page=1 ... x-next-page="" (lazy, restartable)
//!        |
//!        +--> GitlabSource   RefLister + Comparator for the diff pipeline
//!        +--> walk::collect_group_projects   flat group tree listing
//! ```
//!
//! Project and group identifiers are either numeric ids or full paths;
//! both are percent-encoded into a single path segment.

mod source;
pub mod types;
pub mod walk;

#[cfg(test)]
mod tests;

use std::marker::PhantomData;
use std::time::Duration;

use bon::Builder;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{ConfigError, GitlabError, NetworkError, RepoResult};

pub use source::GitlabSource;
use types::{
    BranchInfo, CompareInfo, GroupInfo, MergeMethodUpdate, MirrorUpdate, NewBranch, NewGroup,
    NewMirror, NewProject, NewProtection, NewTag, ProjectInfo, ProtectedBranch, RemoteMirror,
    TagInfo, User,
};

/// Header carrying the next page number of a paginated listing.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Everything needed to talk to one GitLab server.
#[derive(Debug, Clone, Builder)]
pub struct ClientContext {
    /// Server URL, e.g. `https://git.example.com/gitlab`.
    #[builder(into)]
    url: String,
    #[builder(into)]
    private_token: String,
    #[builder(default = Duration::from_secs(30))]
    timeout: Duration,
    #[builder(default = 100)]
    per_page: u32,
}

/// Authenticated GitLab API handle.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    http: Client,
    server: Url,
    api: Url,
    per_page: u32,
}

impl GitlabClient {
    /// Build a client for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, the token is not a valid
    /// header value, or the HTTP client cannot be constructed.
    pub fn new(ctx: &ClientContext) -> RepoResult<Self> {
        let mut server =
            Url::parse(&ctx.url).map_err(|e| NetworkError::InvalidUrl(format!("{}: {e}", ctx.url)))?;
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }
        let api = server
            .join("api/v4/")
            .map_err(|e| NetworkError::InvalidUrl(format!("{server}: {e}")))?;

        let mut token = HeaderValue::from_str(&ctx.private_token).map_err(|_| {
            ConfigError::InvalidValue {
                section: "gitlab".to_string(),
                key: "private_token".to_string(),
                message: "not a valid header value".to_string(),
            }
        })?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("PRIVATE-TOKEN", token);

        let http = Client::builder()
            .user_agent(format!("repolab/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(ctx.timeout)
            .build()
            .map_err(NetworkError::from)?;

        Ok(Self {
            http,
            server,
            api,
            per_page: ctx.per_page.clamp(1, 100),
        })
    }

    /// Server URL with a trailing slash.
    #[must_use]
    pub const fn server(&self) -> &Url {
        &self.server
    }

    fn endpoint(&self, path: &str) -> RepoResult<Url> {
        self.api
            .join(path)
            .map_err(|e| NetworkError::InvalidUrl(format!("{}{path}: {e}", self.api)).into())
    }

    async fn execute(request: RequestBuilder, url: &Url) -> RepoResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout {
                    url: url.to_string(),
                }
            } else {
                NetworkError::Reqwest(e)
            }
        })?;

        let status = response.status();
        trace!(%url, status = status.as_u16(), "gitlab response");
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GitlabError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            message: message.trim().to_string(),
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> RepoResult<T> {
        let body = response.bytes().await.map_err(NetworkError::from)?;
        serde_json::from_slice(&body).map_err(|e| {
            GitlabError::Malformed {
                url: url.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> RepoResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = Self::execute(self.http.get(url.clone()).query(query), &url).await?;
        Self::decode(response, &url).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RepoResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = Self::execute(self.http.post(url.clone()).json(body), &url).await?;
        Self::decode(response, &url).await
    }

    async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RepoResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "PUT");
        let response = Self::execute(self.http.put(url.clone()).json(body), &url).await?;
        Self::decode(response, &url).await
    }

    async fn delete(&self, path: &str) -> RepoResult<()> {
        let url = self.endpoint(path)?;
        debug!(%url, "DELETE");
        Self::execute(self.http.delete(url.clone()), &url).await?;
        Ok(())
    }

    /// One page of a listing and the number of the page after it.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        page: u32,
    ) -> RepoResult<(Vec<T>, Option<u32>)> {
        let url = self.endpoint(path)?;
        let request = self
            .http
            .get(url.clone())
            .query(query)
            .query(&[("per_page", self.per_page), ("page", page)]);
        let response = Self::execute(request, &url).await?;
        let next = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let items = Self::decode(response, &url).await?;
        Ok((items, next))
    }

    fn pages<T: DeserializeOwned>(&self, path: String, query: &[(&str, &str)]) -> Pages<'_, T> {
        Pages {
            client: self,
            path,
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            next: Some(1),
            _item: PhantomData,
        }
    }

    // --- endpoints ---

    /// Verify the token by fetching the current user.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 401 for a bad token.
    pub async fn authenticate(&self) -> RepoResult<User> {
        self.get("user", &[]).await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 404 if the project does not exist.
    pub async fn project(&self, id: &str) -> RepoResult<ProjectInfo> {
        self.get(&format!("projects/{}", encode(id)), &[]).await
    }

    #[must_use]
    pub fn tags(&self, project: &str) -> Pages<'_, TagInfo> {
        self.pages(format!("projects/{}/repository/tags", encode(project)), &[])
    }

    #[must_use]
    pub fn branches(&self, project: &str) -> Pages<'_, BranchInfo> {
        self.pages(format!("projects/{}/repository/branches", encode(project)), &[])
    }

    /// Commits in `to` that are not in `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is unknown to the server.
    pub async fn compare(&self, project: &str, from: &str, to: &str) -> RepoResult<CompareInfo> {
        self.get(
            &format!("projects/{}/repository/compare", encode(project)),
            &[("from", from), ("to", to)],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 404 if the group does not exist.
    pub async fn group(&self, id: &str) -> RepoResult<GroupInfo> {
        self.get(&format!("groups/{}", encode(id)), &[]).await
    }

    #[must_use]
    pub fn subgroups(&self, group_id: u64) -> Pages<'_, GroupInfo> {
        self.pages(format!("groups/{group_id}/subgroups"), &[])
    }

    /// Projects owned by a group, shared projects excluded.
    #[must_use]
    pub fn group_projects(&self, group_id: u64) -> Pages<'_, ProjectInfo> {
        self.pages(
            format!("groups/{group_id}/projects"),
            &[("with_shared", "false")],
        )
    }

    /// Every project visible to the token.
    #[must_use]
    pub fn all_projects(&self) -> Pages<'_, ProjectInfo> {
        self.pages("projects".to_string(), &[("order_by", "id"), ("sort", "asc")])
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 400 if the group exists.
    pub async fn create_group(&self, name: &str, path: &str, parent_id: u64) -> RepoResult<GroupInfo> {
        self.post(
            "groups",
            &NewGroup {
                name,
                path,
                parent_id,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 400 if the project exists.
    pub async fn create_project(
        &self,
        name: &str,
        namespace_id: u64,
        merge_method: Option<&str>,
    ) -> RepoResult<ProjectInfo> {
        self.post(
            "projects",
            &NewProject {
                name,
                path: name,
                namespace_id,
                merge_method,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 400 if the branch exists.
    pub async fn create_branch(&self, project: &str, branch: &str, from: &str) -> RepoResult<BranchInfo> {
        self.post(
            &format!("projects/{}/repository/branches", encode(project)),
            &NewBranch { branch, from },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 400 if the tag exists.
    pub async fn create_tag(&self, project: &str, tag: &str, from: &str) -> RepoResult<TagInfo> {
        self.post(
            &format!("projects/{}/repository/tags", encode(project)),
            &NewTag {
                tag_name: tag,
                from,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 404 if the branch is not protected.
    pub async fn protected_branch(&self, project: &str, branch: &str) -> RepoResult<ProtectedBranch> {
        self.get(
            &format!(
                "projects/{}/protected_branches/{}",
                encode(project),
                encode(branch)
            ),
            &[],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 409 if a rule already exists.
    pub async fn protect_branch(
        &self,
        project: &str,
        branch: &str,
        push_access_level: u8,
        merge_access_level: u8,
    ) -> RepoResult<ProtectedBranch> {
        self.post(
            &format!("projects/{}/protected_branches", encode(project)),
            &NewProtection {
                name: branch,
                push_access_level,
                merge_access_level,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 404 if the branch is not protected.
    pub async fn unprotect_branch(&self, project: &str, branch: &str) -> RepoResult<()> {
        self.delete(&format!(
            "projects/{}/protected_branches/{}",
            encode(project),
            encode(branch)
        ))
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the server rejects the merge method.
    pub async fn set_merge_method(&self, project: &str, merge_method: &str) -> RepoResult<ProjectInfo> {
        self.put(
            &format!("projects/{}", encode(project)),
            &MergeMethodUpdate { merge_method },
        )
        .await
    }

    #[must_use]
    pub fn remote_mirrors(&self, project: &str) -> Pages<'_, RemoteMirror> {
        self.pages(format!("projects/{}/remote_mirrors", encode(project)), &[])
    }

    /// Add an enabled push mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the mirror URL.
    pub async fn create_remote_mirror(&self, project: &str, url: &str) -> RepoResult<RemoteMirror> {
        self.post(
            &format!("projects/{}/remote_mirrors", encode(project)),
            &NewMirror { url, enabled: true },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`GitlabError::Api`] with status 404 if the mirror is gone.
    pub async fn enable_remote_mirror(&self, project: &str, mirror_id: u64) -> RepoResult<RemoteMirror> {
        self.put(
            &format!("projects/{}/remote_mirrors/{mirror_id}", encode(project)),
            &MirrorUpdate { enabled: true },
        )
        .await
    }
}

/// Lazy page sequence of a GitLab listing.
///
/// Pages are fetched on demand; [`Pages::restart`] rewinds to the first page.
#[derive(Debug)]
pub struct Pages<'a, T> {
    client: &'a GitlabClient,
    path: String,
    query: Vec<(String, String)>,
    next: Option<u32>,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Pages<'_, T> {
    /// Fetch the next page; `None` once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn next_page(&mut self) -> RepoResult<Option<Vec<T>>> {
        let Some(page) = self.next else {
            return Ok(None);
        };
        let (items, next) = self.client.get_page(&self.path, &self.query, page).await?;
        self.next = next;
        Ok(Some(items))
    }

    pub const fn restart(&mut self) {
        self.next = Some(1);
    }

    /// Every item from the first page to the last.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn collect_all(&mut self) -> RepoResult<Vec<T>> {
        self.restart();
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

/// Percent-encode an id or path into one URL path segment.
fn encode(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}
