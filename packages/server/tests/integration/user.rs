use ::common::{AccountStatus, UserType};
use serde_json::json;

use crate::common::{PASSWORD, TestApp, TestResponse, routes};

fn emails(res: &TestResponse) -> Vec<String> {
    res.body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap().to_string())
        .collect()
}

mod admin_management {
    use super::*;

    #[tokio::test]
    async fn pending_queue_lists_oldest_first() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.insert_user("first@vilaagro.test", UserType::Gastronomo, AccountStatus::Pending)
            .await;
        app.insert_user("second@vilaagro.test", UserType::ProdutorRural, AccountStatus::Pending)
            .await;
        app.insert_user("done@vilaagro.test", UserType::ProdutorRural, AccountStatus::Approved)
            .await;

        let res = app.get(routes::PENDING_USERS, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(emails(&res), ["first@vilaagro.test", "second@vilaagro.test"]);
    }

    #[tokio::test]
    async fn user_views_never_expose_the_password_hash() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app.get(routes::USERS, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(!res.text.contains("password"));
    }

    #[tokio::test]
    async fn merchants_cannot_list_users() {
        let app = TestApp::spawn().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let res = app.get(routes::USERS, &merchant.token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn created_accounts_default_to_pending() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post(
                routes::USERS,
                &json!({
                    "name": "Maria",
                    "email": "Maria@VilaAgro.test",
                    "password": PASSWORD,
                    "type": "PRODUTOR_ARTESANAL",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "PENDING");
        assert_eq!(res.body["email"], "maria@vilaagro.test");

        let taken = app
            .post(
                routes::USERS,
                &json!({
                    "name": "Maria 2",
                    "email": "maria@vilaagro.test",
                    "password": PASSWORD,
                    "type": "GASTRONOMO",
                }),
                &admin.token,
            )
            .await;
        assert_eq!(taken.status, 409);
        assert_eq!(taken.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;

        let res = app
            .put(&routes::user(u.user_id), &json!({"name": "Renamed"}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Renamed");
        assert_eq!(res.body["email"], "u@vilaagro.test");
        assert_eq!(res.body["type"], "PRODUTOR_RURAL");
    }

    #[tokio::test]
    async fn status_change_notifies_with_reason() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;

        let res = app
            .put(
                &routes::user_status(u.user_id),
                &json!({"status": "DISAPPROVED", "reason": "Missing documents"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "DISAPPROVED");

        let notes = app.get(routes::NOTIFICATIONS, &u.token).await;
        let note = &notes.body[0];
        assert_eq!(note["type"], "APPROVAL");
        assert!(note["message"].as_str().unwrap().contains("Missing documents"));
    }

    #[tokio::test]
    async fn active_cannot_be_set_directly() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;

        let res = app
            .put(&routes::user_status(u.user_id), &json!({"status": "ACTIVE"}), &admin.token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn leaving_active_releases_the_sale_point() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app
            .put(&routes::user_status(u.user_id), &json!({"status": "INACTIVE"}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["salePointId"].is_null());
        let point = app.get_without_token(&routes::sale_point(s)).await;
        assert!(point.body["allocatedUser"].is_null());
    }

    #[tokio::test]
    async fn delete_removes_the_account_but_not_yourself() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;

        let own = app.delete(&routes::user(admin.user_id), &admin.token).await;
        assert_eq!(own.status, 409);

        let res = app.delete(&routes::user(u.user_id), &admin.token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.get(&routes::user(u.user_id), &admin.token).await.status, 404);

        let gone = app.get(routes::ME, &u.token).await;
        assert_eq!(gone.status, 404);
    }
}

mod self_service {
    use super::*;

    #[tokio::test]
    async fn profile_update_changes_name_and_email() {
        let app = TestApp::spawn().await;
        let u = app.active_merchant("u@vilaagro.test").await;
        app.active_merchant("taken@vilaagro.test").await;

        let res = app
            .put(
                routes::PROFILE,
                &json!({"name": "Novo Nome", "email": "New@VilaAgro.test"}),
                &u.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Novo Nome");
        assert_eq!(res.body["email"], "new@vilaagro.test");

        let clash = app
            .put(routes::PROFILE, &json!({"email": "taken@vilaagro.test"}), &u.token)
            .await;
        assert_eq!(clash.status, 409);
        assert_eq!(clash.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn password_change_requires_the_current_password() {
        let app = TestApp::spawn().await;
        let u = app.active_merchant("u@vilaagro.test").await;

        let wrong = app
            .put(
                routes::PASSWORD,
                &json!({"currentPassword": "not-my-password", "newPassword": "brand-new-pass"}),
                &u.token,
            )
            .await;
        assert_eq!(wrong.status, 400);

        let short = app
            .put(
                routes::PASSWORD,
                &json!({"currentPassword": PASSWORD, "newPassword": "short"}),
                &u.token,
            )
            .await;
        assert_eq!(short.status, 400);

        let ok = app
            .put(
                routes::PASSWORD,
                &json!({"currentPassword": PASSWORD, "newPassword": "brand-new-pass"}),
                &u.token,
            )
            .await;
        assert_eq!(ok.status, 204, "{}", ok.text);

        let old = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "u@vilaagro.test", "password": PASSWORD}),
            )
            .await;
        assert_eq!(old.status, 401);
        let new = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "u@vilaagro.test", "password": "brand-new-pass"}),
            )
            .await;
        assert_eq!(new.status, 200);
    }

    #[tokio::test]
    async fn termination_deactivates_and_notifies_admins() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app
            .post(
                routes::TERMINATION,
                &json!({"reason": "Moving away", "details": "Relocating in June"}),
                &u.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "INACTIVE");
        assert!(res.body["salePointId"].is_null());

        let notes = app.get(routes::NOTIFICATIONS, &admin.token).await;
        let note = notes
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["title"] == "Termination request")
            .expect("admin notification");
        assert_eq!(note["type"], "SYSTEM");
        assert!(note["message"].as_str().unwrap().contains("Moving away"));
    }

    #[tokio::test]
    async fn admins_cannot_request_termination() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post(routes::TERMINATION, &json!({"reason": "Bored"}), &admin.token)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod statements {
    use super::*;

    #[tokio::test]
    async fn admin_posts_and_everyone_reads_newest_first() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        for message in ["First notice", "Second notice"] {
            let res = app
                .post(
                    routes::STATEMENTS,
                    &json!({"message": message, "stereotype": "Informativo"}),
                    &admin.token,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app.get(routes::STATEMENTS, &merchant.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body[0]["message"], "Second notice");
        assert_eq!(res.body[1]["message"], "First notice");
        assert_eq!(TestResponse::uuid_of(&res.body[0]["admin"]["id"]), admin.user_id);
    }

    #[tokio::test]
    async fn only_admins_write_statements() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let denied = app
            .post(routes::STATEMENTS, &json!({"message": "Hi"}), &merchant.token)
            .await;
        assert_eq!(denied.status, 403);

        let id = app
            .post(routes::STATEMENTS, &json!({"message": "Hi"}), &admin.token)
            .await
            .id();
        let updated = app
            .put(&routes::statement(id), &json!({"message": "Hello"}), &admin.token)
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.body["message"], "Hello");
        assert!(updated.body["stereotype"].is_null());

        let deleted = app.delete(&routes::statement(id), &admin.token).await;
        assert_eq!(deleted.status, 204);
        assert_eq!(app.get(&routes::statement(id), &admin.token).await.status, 404);
    }
}

mod notifications {
    use super::*;

    async fn notify_status(app: &TestApp, admin_token: &str, user_id: uuid::Uuid, status: &str) {
        let res = app
            .put(&routes::user_status(user_id), &json!({"status": status}), admin_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn unread_count_and_mark_read() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;
        notify_status(&app, &admin.token, u.user_id, "APPROVED").await;
        notify_status(&app, &admin.token, u.user_id, "PENDING").await;

        let count = app.get(routes::UNREAD_COUNT, &u.token).await;
        assert_eq!(count.body["count"], 2);

        let list = app.get(routes::NOTIFICATIONS, &u.token).await;
        let id = TestResponse::uuid_of(&list.body[0]["id"]);
        let read = app
            .put(&routes::notification_read(id), &json!({}), &u.token)
            .await;
        assert_eq!(read.status, 200, "{}", read.text);
        assert_eq!(read.body["isRead"], true);

        let count = app.get(routes::UNREAD_COUNT, &u.token).await;
        assert_eq!(count.body["count"], 1);
    }

    #[tokio::test]
    async fn another_users_notification_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;
        let other = app.active_merchant("o@vilaagro.test").await;
        notify_status(&app, &admin.token, u.user_id, "APPROVED").await;
        let list = app.get(routes::NOTIFICATIONS, &u.token).await;
        let id = TestResponse::uuid_of(&list.body[0]["id"]);

        let res = app
            .put(&routes::notification_read(id), &json!({}), &other.token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn read_all_reports_how_many_changed() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;
        notify_status(&app, &admin.token, u.user_id, "APPROVED").await;
        notify_status(&app, &admin.token, u.user_id, "PENDING").await;

        let res = app.put(routes::READ_ALL, &json!({}), &u.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["updated"], 2);

        let again = app.put(routes::READ_ALL, &json!({}), &u.token).await;
        assert_eq!(again.body["updated"], 0);
        assert_eq!(app.get(routes::UNREAD_COUNT, &u.token).await.body["count"], 0);
    }
}
