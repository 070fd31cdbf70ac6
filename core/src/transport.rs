//! Blocking HTTP transport for `TodoClient`.
//!
//! `TodoApiClient` pairs a `TodoClient` with a `ureq` agent and performs the
//! round-trip between each `build_*` and `parse_*` call. The agent is
//! configured to hand back 4xx/5xx responses as data so status handling stays
//! in `TodoClient`.

use todo_types::{CreateTodo, Todo, UpdateTodo};
use ureq::Agent;

use crate::client::{self, TodoClient, DEFAULT_BASE_URL};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct TodoApiClient {
    client: TodoClient,
    agent: Agent,
}

impl Default for TodoApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoApiClient {
    pub fn new(base_url: &str) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            client: TodoClient::new(base_url),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.execute(client::LIST_TODOS, self.client.build_list_todos())?;
        self.client.parse_list_todos(response)
    }

    pub fn get_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let response = self.execute(client::GET_TODO, self.client.build_get_todo(id))?;
        self.client.parse_get_todo(response)
    }

    pub fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.execute(client::CREATE_TODO, request)?;
        self.client.parse_create_todo(response)
    }

    pub fn update_todo(&self, id: i64, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.execute(client::UPDATE_TODO, request)?;
        self.client.parse_update_todo(response)
    }

    pub fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        let response = self.execute(client::DELETE_TODO, self.client.build_delete_todo(id))?;
        self.client.parse_delete_todo(response)
    }

    fn execute(&self, operation: &'static str, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = req.method.as_str(), url = %req.url, "sending request");
        let transport = |source: ureq::Error| ApiError::Transport {
            operation,
            source: Box::new(source),
        };

        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&req.url);
                for (name, value) in &req.headers {
                    builder = builder.header(name, value);
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&req.url);
                for (name, value) in &req.headers {
                    builder = builder.header(name, value);
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Patch => {
                let mut builder = if req.method == HttpMethod::Post {
                    self.agent.post(&req.url)
                } else {
                    self.agent.patch(&req.url)
                };
                for (name, value) in &req.headers {
                    builder = builder.header(name, value);
                }
                match &req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(transport)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(transport)?;
        tracing::debug!(status, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_service() {
        assert_eq!(TodoApiClient::default().base_url(), "http://localhost:3001");
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = TodoApiClient::new(&format!("http://127.0.0.1:{port}"));
        let err = api.list_todos().unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
        assert_eq!(err.status(), None);
    }
}
