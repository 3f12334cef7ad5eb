use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const USERS_JSON: &str = include_str!("../data/users.json");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

#[derive(Deserialize)]
pub struct UserFilter {
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct Md5Query {
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Md5Answer {
    pub md5: String,
    pub original: String,
}

pub type Users = Arc<Vec<User>>;

/// The bundled demo users, ids 1 to 10.
pub fn users() -> Result<Vec<User>, serde_json::Error> {
    serde_json::from_str(USERS_JSON)
}

pub fn md5_hex(text: &str) -> String {
    format!("{:x}", Md5::digest(text.as_bytes()))
}

pub fn app(users: Vec<User>) -> Router {
    let users: Users = Arc::new(users);
    Router::new()
        .route("/", get(md5_of_text))
        .route("/md5", get(md5_of_text))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .with_state(users)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let users = users().map_err(std::io::Error::other)?;
    axum::serve(listener, app(users)).await
}

async fn list_users(State(users): State<Users>, Query(filter): Query<UserFilter>) -> Json<Vec<User>> {
    let matching = users
        .iter()
        .filter(|u| filter.username.as_deref().is_none_or(|name| u.username == name))
        .cloned()
        .collect();
    Json(matching)
}

async fn get_user(
    State(users): State<Users>,
    Path(id): Path<u32>,
) -> Result<Json<User>, (StatusCode, Json<Value>)> {
    users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            tracing::debug!(id, "unknown user");
            (StatusCode::NOT_FOUND, Json(json!({})))
        })
}

async fn md5_of_text(Query(query): Query<Md5Query>) -> Result<Json<Md5Answer>, (StatusCode, Json<Value>)> {
    match query.text {
        Some(text) => Ok(Json(Md5Answer {
            md5: md5_hex(&text),
            original: text,
        })),
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Argument 'text' must be set." })),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_users_parse() {
        let users = users().unwrap();
        assert_eq!(users.len(), 10);
        assert_eq!(users[0].name, "Leanne Graham");
        assert_eq!(users[1].name, "Ervin Howell");
        assert_eq!(users[2].name, "Clementine Bauch");
    }

    #[test]
    fn full_records_serialize_camel_case_company() {
        let users = users().unwrap();
        let json = serde_json::to_value(&users[0]).unwrap();
        assert_eq!(json["company"]["catchPhrase"], "Multi-layered client-server neural-net");
        assert_eq!(json["address"]["geo"]["lat"], "-37.3159");
    }

    #[test]
    fn partial_records_omit_missing_sections() {
        let users = users().unwrap();
        let json = serde_json::to_value(&users[9]).unwrap();
        assert_eq!(json["name"], "Clementina DuBuque");
        assert!(json.get("address").is_none());
        assert!(json.get("company").is_none());
    }

    #[test]
    fn md5_of_testcase() {
        assert_eq!(md5_hex("testcase"), "7489a25fc99976f06fecb807991c61cf");
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
