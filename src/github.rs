//! The GitHub GraphQL calls the notifier needs, on top of the Octocrab library

use async_trait::async_trait;
use log::debug;
use octocrab::{Octocrab, OctocrabBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::utils::split_repo_full_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    Open,
    Closed,
}

/// An existing issue, as returned by the search query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub url: String,
}

/// The remote issue tracker operations used by the reconciler
#[async_trait]
pub trait IssueTracker {
    /// Resolve the node id of an `owner/name` repository
    async fn repository_id(&self, repo_full_name: &str) -> Result<String>;

    /// Resolve the node id of the label called exactly `label_name`, if it exists
    async fn label_id(&self, repo_full_name: &str, label_name: &str) -> Result<Option<String>>;

    /// Return the first issue matched by an issue search query
    async fn find_issue(&self, search_query: &str) -> Result<Option<Issue>>;

    /// Create an issue and return its URL
    async fn create_issue(
        &self,
        repository_id: &str,
        title: &str,
        body: &str,
        label_id: Option<&str>,
    ) -> Result<String>;

    /// Overwrite an issue's title, body and labels and return its URL
    async fn update_issue(
        &self,
        issue_id: &str,
        title: &str,
        body: &str,
        label_id: Option<&str>,
    ) -> Result<String>;
}

const REPOSITORY_ID_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
  }
}"#;

const LABEL_ID_QUERY: &str = r#"
query($owner: String!, $name: String!, $labelName: String!) {
  repository(owner: $owner, name: $name) {
    labels(first: 10, query: $labelName) {
      nodes {
        id
        name
      }
    }
  }
}"#;

const SEARCH_ISSUE_QUERY: &str = r#"
query($query: String!) {
  search(query: $query, type: ISSUE, first: 1) {
    nodes {
      ... on Issue {
        id
        number
        title
        body
        state
        url
      }
    }
  }
}"#;

const CREATE_ISSUE_MUTATION: &str = r#"
mutation($input: CreateIssueInput!) {
  createIssue(input: $input) {
    issue {
      url
    }
  }
}"#;

const UPDATE_ISSUE_MUTATION: &str = r#"
mutation($input: UpdateIssueInput!) {
  updateIssue(input: $input) {
    issue {
      url
    }
  }
}"#;

/// The envelope of every GraphQL response
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryIdData {
    repository: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
struct NodeId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LabelsData {
    repository: Option<LabelsRepository>,
}

#[derive(Debug, Deserialize)]
struct LabelsRepository {
    labels: Option<Nodes<Label>>,
}

#[derive(Debug, Deserialize)]
struct Label {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: Nodes<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueData {
    create_issue: IssuePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueData {
    update_issue: IssuePayload,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    issue: IssueUrl,
}

#[derive(Debug, Deserialize)]
struct IssueUrl {
    url: String,
}

/// Unwrap the `data` of a GraphQL response, turning reported errors into [`Error::GraphQl`]
fn decode<T: DeserializeOwned>(response: GraphQlResponse) -> Result<T> {
    if let Some(errors) = response.errors {
        if !errors.is_empty() {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GraphQl(messages.join("; ")));
        }
    }
    let data = response.data.ok_or(Error::MissingData("data"))?;
    serde_json::from_value(data).map_err(|e| Error::GraphQl(e.to_string()))
}

fn labels_variables(repo_full_name: &str, label_name: &str) -> Result<Value> {
    let (owner, name) = split_repo_full_name(repo_full_name)?;
    Ok(json!({ "owner": owner, "name": name, "labelName": label_name }))
}

fn find_label(data: LabelsData, label_name: &str) -> Result<Option<String>> {
    let repository = data.repository.ok_or(Error::MissingData("repository"))?;
    Ok(repository
        .labels
        .map(|labels| labels.nodes)
        .unwrap_or_default()
        .into_iter()
        .find(|label| label.name == label_name)
        .map(|label| label.id))
}

/// Search results can contain nodes for other types, which come back as `{}`
fn first_issue(data: SearchData) -> Result<Option<Issue>> {
    match data.search.nodes.into_iter().next() {
        None => Ok(None),
        Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
        Some(node) => serde_json::from_value(node)
            .map(Some)
            .map_err(|e| Error::GraphQl(format!("Unexpected issue in search results: {e}"))),
    }
}

fn label_ids(label_id: Option<&str>) -> Vec<&str> {
    label_id.into_iter().collect()
}

/// An [`IssueTracker`] talking to the GitHub GraphQL API
pub struct GitHubTracker {
    octocrab: Octocrab,
}

impl GitHubTracker {
    pub fn new(access_token: &str) -> Result<GitHubTracker> {
        let octocrab = OctocrabBuilder::default()
            .personal_token(access_token.to_owned())
            .build()?;
        Ok(GitHubTracker { octocrab })
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        debug!("GraphQL {} {}", query.trim(), variables);
        let payload = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse = self.octocrab.graphql(&payload).await?;
        decode(response)
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn repository_id(&self, repo_full_name: &str) -> Result<String> {
        let (owner, name) = split_repo_full_name(repo_full_name)?;
        let data: RepositoryIdData = self
            .query(REPOSITORY_ID_QUERY, json!({ "owner": owner, "name": name }))
            .await?;
        data.repository
            .map(|repository| repository.id)
            .ok_or(Error::MissingData("repository"))
    }

    async fn label_id(&self, repo_full_name: &str, label_name: &str) -> Result<Option<String>> {
        let variables = labels_variables(repo_full_name, label_name)?;
        let data: LabelsData = self.query(LABEL_ID_QUERY, variables).await?;
        find_label(data, label_name)
    }

    async fn find_issue(&self, search_query: &str) -> Result<Option<Issue>> {
        let data: SearchData = self
            .query(SEARCH_ISSUE_QUERY, json!({ "query": search_query }))
            .await?;
        first_issue(data)
    }

    async fn create_issue(
        &self,
        repository_id: &str,
        title: &str,
        body: &str,
        label_id: Option<&str>,
    ) -> Result<String> {
        let input = json!({
            "repositoryId": repository_id,
            "title": title,
            "body": body,
            "labelIds": label_ids(label_id),
        });
        let data: CreateIssueData = self
            .query(CREATE_ISSUE_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.create_issue.issue.url)
    }

    async fn update_issue(
        &self,
        issue_id: &str,
        title: &str,
        body: &str,
        label_id: Option<&str>,
    ) -> Result<String> {
        let input = json!({
            "id": issue_id,
            "title": title,
            "body": body,
            "labelIds": label_ids(label_id),
        });
        let data: UpdateIssueData = self
            .query(UPDATE_ISSUE_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.update_issue.issue.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn response(value: Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_reports_errors() {
        let err = decode::<SearchData>(response(json!({
            "data": null,
            "errors": [
                { "message": "Could not resolve to a Repository" },
                { "message": "Something else" }
            ]
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL error: Could not resolve to a Repository; Something else"
        );
    }

    #[test]
    fn test_decode_missing_data() {
        let err = decode::<SearchData>(response(json!({}))).unwrap_err();
        assert!(matches!(err, Error::MissingData("data")));
    }

    #[test]
    fn test_first_issue() {
        let data: SearchData = decode(response(json!({
            "data": {
                "search": {
                    "nodes": [{
                        "id": "I_kwDOA",
                        "number": 42,
                        "title": "[nvchecker] foo can be bump to 1.1",
                        "body": "oldver: 1.0",
                        "state": "CLOSED",
                        "url": "https://github.com/microcai/gentoo-zh/issues/42"
                    }]
                }
            }
        })))
        .unwrap();
        let issue = first_issue(data).unwrap().unwrap();
        assert_eq!(issue.number, 42);
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.body, "oldver: 1.0");
    }

    #[test]
    fn test_first_issue_ignores_non_issue_nodes() {
        let data: SearchData = decode(response(json!({
            "data": { "search": { "nodes": [{}] } }
        })))
        .unwrap();
        assert!(first_issue(data).unwrap().is_none());

        let data: SearchData = decode(response(json!({
            "data": { "search": { "nodes": [] } }
        })))
        .unwrap();
        assert!(first_issue(data).unwrap().is_none());
    }

    #[test]
    fn test_first_issue_reports_malformed_issue() {
        let data: SearchData = decode(response(json!({
            "data": {
                "search": {
                    "nodes": [{
                        "id": "I_kwDOA",
                        "number": 42,
                        "title": "[nvchecker] foo can be bump to 1.1",
                        "body": "oldver: 1.0",
                        "state": "LOCKED",
                        "url": "https://github.com/microcai/gentoo-zh/issues/42"
                    }]
                }
            }
        })))
        .unwrap();
        let err = first_issue(data).unwrap_err();
        assert!(matches!(err, Error::GraphQl(_)));

        let data: SearchData = decode(response(json!({
            "data": { "search": { "nodes": [{ "id": "I_kwDOA", "number": 42 }] } }
        })))
        .unwrap();
        assert!(first_issue(data).is_err());
    }

    #[test]
    fn test_find_label_exact_match() {
        let data: LabelsData = decode(response(json!({
            "data": {
                "repository": {
                    "labels": {
                        "nodes": [
                            { "id": "LA_1", "name": "nvchecker-ignore" },
                            { "id": "LA_2", "name": "nvchecker" }
                        ]
                    }
                }
            }
        })))
        .unwrap();
        assert_eq!(
            find_label(data, "nvchecker").unwrap(),
            Some("LA_2".to_string())
        );
    }

    #[test]
    fn test_find_label_absent() {
        let data: LabelsData = decode(response(json!({
            "data": { "repository": { "labels": { "nodes": [] } } }
        })))
        .unwrap();
        assert_eq!(find_label(data, "nvchecker").unwrap(), None);
    }

    #[test]
    fn test_labels_variables() {
        let variables = labels_variables("microcai/gentoo-zh", "nvchecker").unwrap();
        assert_eq!(
            variables,
            json!({ "owner": "microcai", "name": "gentoo-zh", "labelName": "nvchecker" })
        );
        assert!(labels_variables("gentoo-zh", "nvchecker").is_err());
    }

    #[test]
    fn test_label_ids() {
        assert_eq!(label_ids(Some("LA_2")), vec!["LA_2"]);
        assert!(label_ids(None).is_empty());
    }

    #[tokio::test]
    #[ignore = "Don't run this test unless you have a valid GitHub token in the GITHUB_TOKEN environment variable"]
    async fn test_github_repository_id() {
        let github_token = env::var("GITHUB_TOKEN").unwrap();
        let tracker = GitHubTracker::new(&github_token).unwrap();

        let id = tracker.repository_id("microcai/gentoo-zh").await.unwrap();
        assert!(!id.is_empty());
    }
}
