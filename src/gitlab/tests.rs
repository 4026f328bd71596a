// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::types::{GroupInfo, ProjectInfo, access};
use super::walk::{GroupSource, collect_group_projects, split_group_list};
use super::{ClientContext, GitlabClient, GitlabSource};
use crate::diff::{Comparator, RefLister, RevisionId};
use crate::error::RepoResult;
use crate::manifest::Project;

fn client_for(server: &MockServer) -> GitlabClient {
    let ctx = ClientContext::builder()
        .url(format!("{}/gitlab", server.uri()))
        .private_token("secret")
        .per_page(2)
        .build();
    GitlabClient::new(&ctx).expect("client")
}

fn manifest_project(server: &MockServer) -> Project {
    Project {
        name: "platform/app".to_string(),
        path: "app".to_string(),
        revision: "main".to_string(),
        remote: "origin".to_string(),
        remote_url: format!("{}/gitlab/root/platform/app.git", server.uri()),
        groups: Vec::new(),
    }
}

#[tokio::test]
async fn test_authenticate_sends_private_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gitlab/api/v4/user"))
        .and(header("PRIVATE-TOKEN", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "username": "bot"})))
        .expect(1)
        .mount(&server)
        .await;

    let user = client_for(&server).authenticate().await.expect("user");
    assert_eq!(user.username, "bot");
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gitlab/api/v4/projects/root%2Fmissing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"404 Project Not Found\"}"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .project("root/missing")
        .await
        .expect_err("missing project");
    assert!(err.is_not_found());
    assert!(err.to_string().contains("404 Project Not Found"), "{err}");
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gitlab/api/v4/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).authenticate().await.expect_err("not json");
    assert_eq!(err.http_status(), None);
    assert!(err.to_string().contains("malformed response"), "{err}");
}

#[tokio::test]
async fn test_pages_follow_next_page_and_restart() {
    let server = MockServer::start().await;
    let branches = "/gitlab/api/v4/projects/root%2Fapp/repository/branches";
    Mock::given(method("GET"))
        .and(path(branches))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .set_body_json(json!([
                    {"name": "main", "commit": {"id": "a1"}},
                    {"name": "dev", "commit": {"id": "a2"}}
                ])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(branches))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(json!([{"name": "rel", "commit": {"id": "a3"}}])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut pages = client.branches("root/app");
    let first = pages.next_page().await.expect("page 1").expect("some");
    assert_eq!(first.len(), 2);
    let second = pages.next_page().await.expect("page 2").expect("some");
    assert_eq!(second[0].name, "rel");
    assert!(pages.next_page().await.expect("end").is_none());

    let all = pages.collect_all().await.expect("restart");
    let names: Vec<_> = all.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["main", "dev", "rel"]);
}

#[tokio::test]
async fn test_protect_branch_posts_access_levels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gitlab/api/v4/projects/root%2Fapp/protected_branches"))
        .and(body_json(json!({
            "name": "master",
            "push_access_level": 0,
            "merge_access_level": 40
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "master",
            "push_access_levels": [{"access_level": 0}],
            "merge_access_levels": [{"access_level": 40}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rule = client_for(&server)
        .protect_branch("root/app", "master", access::NO_ACCESS, access::MAINTAINER)
        .await
        .expect("protected");
    assert!(rule.grants(access::NO_ACCESS, access::MAINTAINER));
    assert!(!rule.grants(access::DEVELOPER, access::MAINTAINER));
}

#[tokio::test]
async fn test_source_lists_refs_and_compares() {
    let server = MockServer::start().await;
    let base = "/gitlab/api/v4/projects/root%2Fplatform%2Fapp";
    Mock::given(method("GET"))
        .and(path(base))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "name": "app",
            "path": "app",
            "path_with_namespace": "root/platform/app",
            "web_url": "https://git.example.com/root/platform/app"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/repository/tags")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "v1", "commit": {"id": "t1"}}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/repository/branches")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "main", "commit": {"id": "b1"}}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{base}/repository/compare")))
        .and(query_param("from", "t1"))
        .and(query_param("to", "b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": {"id": "b1", "short_id": "b1", "created_at": "2024-01-01T10:00:00.000+08:00"},
            "commits": [{
                "id": "b1",
                "short_id": "b1",
                "title": "fix",
                "author_name": "Alice",
                "author_email": "alice@example.com",
                "committer_name": "Bob",
                "created_at": "2024-01-01T10:00:00.000+08:00",
                "committed_date": "2024-01-01T10:00:00.000+08:00",
                "web_url": "https://git.example.com/root/platform/app/-/commit/b1"
            }],
            "diffs": [{"new_path": "README"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let source = GitlabSource::new(&client);
    let project = manifest_project(&server);
    assert_eq!(source.locate(&project), "root/platform/app");

    let listing = source.list_refs(&project).await.expect("refs");
    assert_eq!(listing.web_url, "https://git.example.com/root/platform/app");
    let refs: Vec<_> = listing.refs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    assert_eq!(refs, ["refs/heads/main=b1", "refs/tags/v1=t1"]);

    let comparison = source
        .compare(&project, &RevisionId::new("t1"), &RevisionId::new("b1"))
        .await
        .expect("compare");
    assert!(comparison.has_changes);
    assert_eq!(comparison.commits.len(), 1);
    assert_eq!(comparison.commits[0].project_name, "platform/app");
    assert_eq!(
        comparison.head.map(|h| h.to_rfc3339()),
        Some("2024-01-01T10:00:00+08:00".to_string())
    );
}

#[test]
fn test_split_group_list() {
    assert_eq!(
        split_group_list("root/a, root/b\troot/c,,"),
        ["root/a", "root/b", "root/c"]
    );
    assert!(split_group_list(" , ").is_empty());
}

struct FakeTree {
    groups: HashMap<u64, (GroupInfo, Vec<u64>, Vec<u64>)>,
}

fn group(id: u64, full_path: &str) -> GroupInfo {
    GroupInfo {
        id,
        name: full_path.rsplit('/').next().unwrap_or(full_path).to_string(),
        path: full_path.rsplit('/').next().unwrap_or(full_path).to_string(),
        full_path: full_path.to_string(),
        parent_id: None,
    }
}

fn project(id: u64) -> ProjectInfo {
    ProjectInfo {
        id,
        name: format!("p{id}"),
        path: format!("p{id}"),
        path_with_namespace: format!("root/p{id}"),
        web_url: String::new(),
        empty_repo: false,
        default_branch: None,
    }
}

impl GroupSource for FakeTree {
    async fn group(&self, full_path: &str) -> RepoResult<GroupInfo> {
        self.groups
            .values()
            .find(|(g, _, _)| g.full_path == full_path)
            .map(|(g, _, _)| g.clone())
            .ok_or_else(|| crate::error::bail_out(format!("no group {full_path}")))
    }

    async fn subgroups(&self, group_id: u64) -> RepoResult<Vec<GroupInfo>> {
        Ok(self.groups[&group_id]
            .1
            .iter()
            .map(|id| self.groups[id].0.clone())
            .collect())
    }

    async fn projects(&self, group_id: u64) -> RepoResult<Vec<ProjectInfo>> {
        Ok(self.groups[&group_id].2.iter().copied().map(project).collect())
    }
}

#[tokio::test]
async fn test_group_walk_is_depth_first_in_server_order() {
    let tree = FakeTree {
        groups: HashMap::from([
            (1, (group(1, "root"), vec![2, 3], vec![1, 2])),
            (2, (group(2, "root/a"), vec![4], vec![3])),
            (3, (group(3, "root/b"), vec![], vec![5])),
            (4, (group(4, "root/a/c"), vec![], vec![4])),
        ]),
    };

    let projects = collect_group_projects(&tree, &["root".to_string(), "root/a".to_string()])
        .await
        .expect("walk");
    let ids: Vec<_> = projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);

    let missing = collect_group_projects(&tree, &["nope".to_string()]).await;
    assert!(missing.is_err());
}
