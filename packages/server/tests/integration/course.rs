use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestResponse, routes};

fn hours_from_now(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn titles(res: &TestResponse) -> Vec<String> {
    res.body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}

mod management {
    use super::*;

    #[tokio::test]
    async fn courses_require_a_session() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::COURSES).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn admin_creates_updates_and_deletes() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;

        let updated = app
            .put(
                &routes::course(id),
                &json!({
                    "title": "Compostagem doméstica",
                    "description": "Updated agenda",
                    "datetime": "2030-03-11T14:00:00Z",
                }),
                &admin.token,
            )
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.body["title"], "Compostagem doméstica");
        assert_eq!(updated.body["enrolledCount"], 0);

        let deleted = app.delete(&routes::course(id), &admin.token).await;
        assert_eq!(deleted.status, 204);
        assert_eq!(app.get(&routes::course(id), &admin.token).await.status, 404);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post(
                routes::COURSES,
                &json!({
                    "title": "   ",
                    "description": "Hands-on session",
                    "datetime": "2030-03-10T14:00:00Z",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn merchants_cannot_create_courses() {
        let app = TestApp::spawn().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .post(
                routes::COURSES,
                &json!({
                    "title": "Compostagem",
                    "description": "Hands-on session",
                    "datetime": "2030-03-10T14:00:00Z",
                }),
                &merchant.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn upcoming_hides_past_courses() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_course(&admin.token, "Past", &hours_from_now(-48)).await;
        app.create_course(&admin.token, "Later", &hours_from_now(72)).await;
        app.create_course(&admin.token, "Soon", &hours_from_now(24)).await;

        let all = app.get(routes::COURSES, &admin.token).await;
        assert_eq!(titles(&all), ["Past", "Soon", "Later"]);

        let upcoming = app.get(routes::UPCOMING_COURSES, &admin.token).await;
        assert_eq!(upcoming.status, 200, "{}", upcoming.text);
        assert_eq!(titles(&upcoming), ["Soon", "Later"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_course(&admin.token, "Horta Orgânica", "2030-03-10T14:00:00Z")
            .await;
        app.create_course(&admin.token, "Queijos artesanais", "2030-03-11T14:00:00Z")
            .await;
        app.create_course(&admin.token, "Desconto 100% real", "2030-03-12T14:00:00Z")
            .await;

        let res = app.get(&routes::course_search("horta"), &admin.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(titles(&res), ["Horta Orgânica"]);

        let wildcard = app.get(&routes::course_search("%25"), &admin.token).await;
        assert_eq!(titles(&wildcard), ["Desconto 100% real"]);

        let blank = app.get(&routes::course_search("%20"), &admin.token).await;
        assert_eq!(blank.status, 400);
    }
}

mod enrollment {
    use super::*;

    #[tokio::test]
    async fn merchant_enrolls_once_and_can_cancel() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;

        let res = app
            .post(&routes::enrollment(id), &json!({}), &merchant.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(TestResponse::uuid_of(&res.body["userId"]), merchant.user_id);

        let again = app
            .post(&routes::enrollment(id), &json!({}), &merchant.token)
            .await;
        assert_eq!(again.status, 409);

        let course = app.get(&routes::course(id), &admin.token).await;
        assert_eq!(course.body["enrolledCount"], 1);

        let mine = app.get(routes::MY_ENROLLMENTS, &merchant.token).await;
        assert_eq!(titles(&mine), ["Compostagem"]);

        let cancelled = app.delete(&routes::enrollment(id), &merchant.token).await;
        assert_eq!(cancelled.status, 204);
        let mine = app.get(routes::MY_ENROLLMENTS, &merchant.token).await;
        assert!(mine.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admins_cannot_enroll() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;

        let res = app.post(&routes::enrollment(id), &json!({}), &admin.token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admins_are_refused_before_the_course_is_looked_up() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post(&routes::enrollment(Uuid::now_v7()), &json!({}), &admin.token)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn deleted_account_cannot_enroll() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;
        let deleted = app.delete(&routes::user(merchant.user_id), &admin.token).await;
        assert_eq!(deleted.status, 204);

        let res = app
            .post(&routes::enrollment(id), &json!({}), &merchant.token)
            .await;

        assert_eq!(res.status, 404, "{}", res.text);
        let course = app.get(&routes::course(id), &admin.token).await;
        assert_eq!(course.body["enrolledCount"], 0);
    }

    #[tokio::test]
    async fn cancelling_without_enrollment_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;

        let res = app.delete(&routes::enrollment(id), &merchant.token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let app = TestApp::spawn().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .post(&routes::enrollment(uuid::Uuid::now_v7()), &json!({}), &merchant.token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_course_drops_its_enrollments() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;
        let id = app
            .create_course(&admin.token, "Compostagem", "2030-03-10T14:00:00Z")
            .await;
        app.post(&routes::enrollment(id), &json!({}), &merchant.token)
            .await;

        let res = app.delete(&routes::course(id), &admin.token).await;
        assert_eq!(res.status, 204);

        let mine = app.get(routes::MY_ENROLLMENTS, &merchant.token).await;
        assert!(mine.body.as_array().unwrap().is_empty());
    }
}
