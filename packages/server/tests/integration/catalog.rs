use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::json;

use crate::common::{FilePart, MAX_UPLOAD, TestApp, TestResponse, routes};

fn days_from_now(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

fn png(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}

mod fairs {
    use super::*;

    #[tokio::test]
    async fn fairs_are_listed_by_date_with_expected_merchants() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.active_merchant("a@vilaagro.test").await;
        app.active_merchant("b@vilaagro.test").await;
        app.create_fair(&admin.token, "2030-05-18").await;
        app.create_fair(&admin.token, "2030-05-11").await;

        let res = app.get_without_token(routes::FAIRS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let fairs = res.body.as_array().unwrap();
        assert_eq!(fairs.len(), 2);
        assert_eq!(fairs[0]["date"], "2030-05-11");
        assert_eq!(fairs[1]["date"], "2030-05-18");
        assert_eq!(fairs[0]["expectedMerchants"], 2);
        assert_eq!(fairs[0]["status"], "SCHEDULED");
    }

    #[tokio::test]
    async fn month_filter_restricts_the_list() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_fair(&admin.token, "2030-04-27").await;
        app.create_fair(&admin.token, "2030-05-04").await;
        app.create_fair(&admin.token, "2030-05-31").await;
        app.create_fair(&admin.token, "2030-06-01").await;

        let res = app
            .get_without_token(&format!("{}?month=5&year=2030", routes::FAIRS))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let half = app
            .get_without_token(&format!("{}?month=5", routes::FAIRS))
            .await;
        assert_eq!(half.status, 400);
    }

    #[tokio::test]
    async fn next_fair_skips_past_dates() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let none = app.get_without_token(routes::NEXT_FAIR).await;
        assert_eq!(none.status, 404);

        app.create_fair(&admin.token, &days_from_now(-7)).await;
        let later = app.create_fair(&admin.token, &days_from_now(14)).await;
        let sooner = app.create_fair(&admin.token, &days_from_now(7)).await;

        let res = app.get_without_token(routes::NEXT_FAIR).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.id(), sooner);
        assert_ne!(res.id(), later);
    }

    #[tokio::test]
    async fn update_keeps_status_when_omitted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app.create_fair(&admin.token, "2030-05-11").await;

        let cancelled = app
            .put(
                &routes::fair(id),
                &json!({
                    "date": "2030-05-11",
                    "startTime": "08:00",
                    "endTime": "13:00",
                    "status": "CANCELLED",
                }),
                &admin.token,
            )
            .await;
        assert_eq!(cancelled.status, 200, "{}", cancelled.text);
        assert_eq!(cancelled.body["status"], "CANCELLED");

        let moved = app
            .put(
                &routes::fair(id),
                &json!({
                    "date": "2030-05-12",
                    "startTime": "09:00",
                    "endTime": "14:00",
                    "notes": "Rain date",
                }),
                &admin.token,
            )
            .await;
        assert_eq!(moved.status, 200, "{}", moved.text);
        assert_eq!(moved.body["date"], "2030-05-12");
        assert_eq!(moved.body["notes"], "Rain date");
        assert_eq!(moved.body["status"], "CANCELLED");
    }

    #[tokio::test]
    async fn merchants_cannot_manage_fairs() {
        let app = TestApp::spawn().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .post(
                routes::FAIRS,
                &json!({"date": "2030-05-11", "startTime": "08:00", "endTime": "13:00"}),
                &merchant.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn a_fair_with_attractions_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;
        let attraction = schedule(&app, &admin.token, fair, artist, "10:00:00", "11:00:00")
            .await
            .id();

        let res = app.delete(&routes::fair(fair), &admin.token).await;
        assert_eq!(res.status, 409);

        app.delete(&routes::attraction(attraction), &admin.token).await;
        let res = app.delete(&routes::fair(fair), &admin.token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.get_without_token(&routes::fair(fair)).await.status, 404);
    }
}

async fn schedule(
    app: &TestApp,
    token: &str,
    fair: uuid::Uuid,
    artist: uuid::Uuid,
    start: &str,
    end: &str,
) -> TestResponse {
    app.post(
        routes::ATTRACTIONS,
        &json!({
            "fairId": fair,
            "artistId": artist,
            "timeStart": start,
            "timeEnd": end,
        }),
        token,
    )
    .await
}

mod attractions {
    use super::*;

    #[tokio::test]
    async fn attractions_embed_fair_and_artist() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;

        let res = schedule(&app, &admin.token, fair, artist, "10:00:00", "11:30:00").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["timeStart"], "10:00:00");
        assert_eq!(TestResponse::uuid_of(&res.body["fair"]["id"]), fair);
        assert_eq!(res.body["artist"]["name"], "Trio Forrozeiro");
    }

    #[tokio::test]
    async fn start_must_precede_end() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;

        let res = schedule(&app, &admin.token, fair, artist, "11:00:00", "10:00:00").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_fair_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;

        let res = schedule(
            &app,
            &admin.token,
            uuid::Uuid::now_v7(),
            artist,
            "10:00:00",
            "11:00:00",
        )
        .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn fair_attractions_are_ordered_by_start_time() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let other = app.create_fair(&admin.token, "2030-05-18").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;
        schedule(&app, &admin.token, fair, artist, "12:00:00", "13:00:00").await;
        schedule(&app, &admin.token, fair, artist, "09:00:00", "10:00:00").await;
        schedule(&app, &admin.token, other, artist, "08:00:00", "09:00:00").await;

        let res = app.get_without_token(&routes::fair_attractions(fair)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let starts: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["timeStart"].as_str().unwrap())
            .collect();
        assert_eq!(starts, ["09:00:00", "12:00:00"]);
    }

    #[tokio::test]
    async fn upcoming_excludes_past_fairs() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let past = app.create_fair(&admin.token, &days_from_now(-7)).await;
        let future = app.create_fair(&admin.token, &days_from_now(7)).await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;
        schedule(&app, &admin.token, past, artist, "10:00:00", "11:00:00").await;
        schedule(&app, &admin.token, future, artist, "10:00:00", "11:00:00").await;

        let all = app.get_without_token(routes::ATTRACTIONS).await;
        assert_eq!(all.body.as_array().unwrap().len(), 2);

        let upcoming = app.get_without_token(routes::UPCOMING_ATTRACTIONS).await;
        assert_eq!(upcoming.status, 200, "{}", upcoming.text);
        let list = upcoming.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(TestResponse::uuid_of(&list[0]["fair"]["id"]), future);
    }

    #[tokio::test]
    async fn update_moves_the_slot() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;
        let id = schedule(&app, &admin.token, fair, artist, "10:00:00", "11:00:00")
            .await
            .id();

        let res = app
            .put(
                &routes::attraction(id),
                &json!({
                    "fairId": fair,
                    "artistId": artist,
                    "timeStart": "15:00:00",
                    "timeEnd": "16:00:00",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["timeStart"], "15:00:00");
    }
}

mod artists {
    use super::*;

    #[tokio::test]
    async fn banner_is_served_with_its_content_type() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let image = png(256);

        let created = app
            .multipart(
                Method::POST,
                routes::ARTISTS,
                &[("name", "Banda Raiz"), ("genre", "MPB")],
                vec![FilePart {
                    field: "banner",
                    file_name: "banda.png",
                    mime: "image/png",
                    bytes: image.clone(),
                }],
                &admin.token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["hasBanner"], true);

        let banner = app.get_without_token(&routes::artist_banner(created.id())).await;
        assert_eq!(banner.status, 200);
        assert_eq!(banner.header("content-type"), Some("image/png"));
        assert_eq!(banner.bytes, image);
    }

    #[tokio::test]
    async fn artist_without_banner_has_none_to_serve() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app.create_artist(&admin.token, "Trio Forrozeiro").await;

        let res = app.get_without_token(&routes::artist_banner(id)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn non_image_banner_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .multipart(
                Method::POST,
                routes::ARTISTS,
                &[("name", "Banda Raiz")],
                vec![FilePart {
                    field: "banner",
                    file_name: "notes.txt",
                    mime: "text/plain",
                    bytes: b"not an image".to_vec(),
                }],
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn oversized_banner_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .multipart(
                Method::POST,
                routes::ARTISTS,
                &[("name", "Banda Raiz")],
                vec![FilePart {
                    field: "banner",
                    file_name: "huge.png",
                    mime: "image/png",
                    bytes: png(MAX_UPLOAD as usize + 1),
                }],
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 413);
    }

    #[tokio::test]
    async fn missing_name_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .multipart(Method::POST, routes::ARTISTS, &[("genre", "MPB")], vec![], &admin.token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn update_changes_only_sent_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app.create_artist(&admin.token, "Trio Forrozeiro").await;

        let res = app
            .multipart(
                Method::PUT,
                &routes::artist(id),
                &[("name", "Trio Pé de Serra")],
                vec![],
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Trio Pé de Serra");
        assert_eq!(res.body["genre"], "Forró");
    }

    #[tokio::test]
    async fn scheduled_artist_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let fair = app.create_fair(&admin.token, "2030-05-11").await;
        let artist = app.create_artist(&admin.token, "Trio Forrozeiro").await;
        schedule(&app, &admin.token, fair, artist, "10:00:00", "11:00:00").await;

        let res = app.delete(&routes::artist(artist), &admin.token).await;
        assert_eq!(res.status, 409);

        let unscheduled = app.create_artist(&admin.token, "Banda Raiz").await;
        let res = app.delete(&routes::artist(unscheduled), &admin.token).await;
        assert_eq!(res.status, 204);

        let names: Vec<String> = app
            .get_without_token(routes::ARTISTS)
            .await
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Trio Forrozeiro"]);
    }
}
