mod common;

use axum::http::StatusCode;
use common::{ids, names, spawn_app};
use serde_json::json;

const TAGS_URL: &str = "/api/recipe/tags";
const INGREDIENTS_URL: &str = "/api/recipe/ingredients";

#[tokio::test]
async fn test_login_required() {
    let app = spawn_app().await;

    let (status, _) = app.get(TAGS_URL, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get(INGREDIENTS_URL, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_tags_ordered_by_name_desc() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    app.create_recipe(
        &token,
        json!({
            "title": "Mixed",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{ "name": "Dessert" }, { "name": "Vegan" }],
        }),
    )
    .await;

    let (status, body) = app.get(TAGS_URL, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]), vec!["Vegan", "Dessert"]);
}

#[tokio::test]
async fn test_tags_limited_to_user() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;
    let other = app.login_as("other@example.com").await;

    app.create_recipe(
        &other,
        json!({ "title": "Fruity", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "Fruity" }] }),
    )
    .await;
    app.create_recipe(
        &token,
        json!({ "title": "Comfort", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "Comfort Food" }] }),
    )
    .await;

    let (_, body) = app.get(TAGS_URL, Some(&token)).await;

    assert_eq!(names(&body["data"]), vec!["Comfort Food"]);
}

#[tokio::test]
async fn test_update_tag() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let recipe = app
        .create_recipe(
            &token,
            json!({ "title": "Dinner", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "After Dinner" }] }),
        )
        .await;
    let tag_id = recipe["tags"][0]["id"].clone();

    let (status, body) = app
        .patch(&format!("{TAGS_URL}/{tag_id}"), &token, json!({ "name": "Dessert" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": tag_id, "name": "Dessert" }));

    let (_, detail) = app
        .get(&format!("/api/recipe/recipes/{}", recipe["id"]), Some(&token))
        .await;
    assert_eq!(names(&detail["data"]["tags"]), vec!["Dessert"]);
}

#[tokio::test]
async fn test_put_tag_requires_name() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let recipe = app
        .create_recipe(
            &token,
            json!({ "title": "Dinner", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "Supper" }] }),
        )
        .await;
    let url = format!("{TAGS_URL}/{}", recipe["tags"][0]["id"]);

    let (status, _) = app.put(&url, &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&url, &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Supper");
}

#[tokio::test]
async fn test_rename_to_existing_name_fails() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let recipe = app
        .create_recipe(
            &token,
            json!({
                "title": "Both",
                "time_minutes": 5,
                "price": "1.00",
                "ingredients": [{ "name": "Salt" }, { "name": "Pepper" }],
            }),
        )
        .await;
    let pepper = recipe["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["name"] == "Pepper")
        .unwrap()["id"]
        .clone();

    let (status, body) = app
        .put(
            &format!("{INGREDIENTS_URL}/{pepper}"),
            &token,
            json!({ "name": "Salt" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_delete_tag() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let recipe = app
        .create_recipe(
            &token,
            json!({ "title": "Breakfast", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "Breakfast" }] }),
        )
        .await;

    let (status, _) = app
        .delete(&format!("{TAGS_URL}/{}", recipe["tags"][0]["id"]), &token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tags) = app.get(TAGS_URL, Some(&token)).await;
    assert_eq!(tags["data"], json!([]));

    let (status, detail) = app
        .get(&format!("/api/recipe/recipes/{}", recipe["id"]), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["tags"], json!([]));
}

#[tokio::test]
async fn test_other_users_ingredient_is_not_found() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;
    let other = app.login_as("other@example.com").await;

    let recipe = app
        .create_recipe(
            &other,
            json!({ "title": "Theirs", "time_minutes": 5, "price": "1.00", "ingredients": [{ "name": "Kale" }] }),
        )
        .await;
    let url = format!("{INGREDIENTS_URL}/{}", recipe["ingredients"][0]["id"]);

    let (status, _) = app.patch(&url, &token, json!({ "name": "Spinach" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&url, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_ingredients_assigned_to_recipes() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let recipe = app
        .create_recipe(
            &token,
            json!({ "title": "Apple Crumble", "time_minutes": 5, "price": "10.00", "ingredients": [{ "name": "Apples" }] }),
        )
        .await;
    let apples = recipe["ingredients"][0]["id"].as_i64().unwrap();

    // Unlink a second ingredient so it exists but is unassigned
    let second = app
        .create_recipe(
            &token,
            json!({ "title": "Toast", "time_minutes": 2, "price": "1.00", "ingredients": [{ "name": "Turkey" }] }),
        )
        .await;
    app.patch(
        &format!("/api/recipe/recipes/{}", second["id"]),
        &token,
        json!({ "ingredients": [] }),
    )
    .await;

    let (_, all) = app.get(INGREDIENTS_URL, Some(&token)).await;
    assert_eq!(names(&all["data"]), vec!["Turkey", "Apples"]);

    let (status, body) = app
        .get(&format!("{INGREDIENTS_URL}?assigned_only=1"), Some(&token))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["data"]), vec![apples]);

    let (_, body) = app
        .get(&format!("{INGREDIENTS_URL}?assigned_only=0"), Some(&token))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_filtered_tags_unique() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    app.create_recipe(
        &token,
        json!({ "title": "Pancakes", "time_minutes": 5, "price": "5.00", "tags": [{ "name": "Breakfast" }] }),
    )
    .await;
    app.create_recipe(
        &token,
        json!({ "title": "Porridge", "time_minutes": 3, "price": "2.00", "tags": [{ "name": "Breakfast" }] }),
    )
    .await;
    let lunch = app
        .create_recipe(
            &token,
            json!({ "title": "Wrap", "time_minutes": 3, "price": "2.00", "tags": [{ "name": "Lunch" }] }),
        )
        .await;
    app.patch(
        &format!("/api/recipe/recipes/{}", lunch["id"]),
        &token,
        json!({ "tags": [] }),
    )
    .await;

    let (_, body) = app
        .get(&format!("{TAGS_URL}?assigned_only=1"), Some(&token))
        .await;

    assert_eq!(names(&body["data"]), vec!["Breakfast"]);
}

#[tokio::test]
async fn test_assigned_only_is_not_owner_scoped() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;
    let other = app.login_as("other@example.com").await;

    app.create_recipe(
        &other,
        json!({ "title": "Theirs", "time_minutes": 5, "price": "1.00", "tags": [{ "name": "Foreign" }] }),
    )
    .await;

    let (_, owned) = app.get(TAGS_URL, Some(&token)).await;
    assert_eq!(owned["data"], json!([]));

    let (_, assigned) = app
        .get(&format!("{TAGS_URL}?assigned_only=1"), Some(&token))
        .await;
    assert_eq!(names(&assigned["data"]), vec!["Foreign"]);
}

#[tokio::test]
async fn test_assigned_only_rejects_non_integer() {
    let app = spawn_app().await;
    let token = app.login_as("user@example.com").await;

    let (status, _) = app
        .get(&format!("{TAGS_URL}?assigned_only=yes"), Some(&token))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
