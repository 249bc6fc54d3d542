use ::common::{AccountStatus, UserType};
use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;
use vilaagro_server::config::AttendanceConfig;

use crate::common::{FilePart, MAX_UPLOAD, Session, TestApp, TestResponse, routes};

fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days)).to_string()
}

async fn justify(
    app: &TestApp,
    absence_id: Uuid,
    description: &str,
    file: Option<FilePart<'_>>,
    token: &str,
) -> TestResponse {
    app.multipart(
        Method::POST,
        &routes::justify(absence_id),
        &[("description", description)],
        file.into_iter().collect(),
        token,
    )
    .await
}

mod registering {
    use super::*;

    #[tokio::test]
    async fn only_active_merchants_get_absences() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let b = app.merchant("b@vilaagro.test", AccountStatus::Pending).await;

        let res = app
            .register_absences(&admin.token, "2024-01-10", &[a.user_id, b.user_id])
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let created = res.body.as_array().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(TestResponse::uuid_of(&created[0]["userId"]), a.user_id);
        assert_eq!(created[0]["type"], "REGISTERED");
        assert_eq!(created[0]["isAccepted"], false);
        assert_eq!(created[0]["standing"], "NO_JUSTIFICATION");
    }

    #[tokio::test]
    async fn unknown_and_repeated_ids_are_skipped() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .register_absences(
                &admin.token,
                "2024-01-10",
                &[a.user_id, Uuid::now_v7(), a.user_id],
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        let again = app
            .register_absences(&admin.token, "2024-01-10", &[a.user_id])
            .await;
        assert_eq!(again.status, 201, "{}", again.text);
        assert!(again.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn merchants_cannot_register_absences() {
        let app = TestApp::spawn().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let res = app.register_absences(&a.token, "2024-01-10", &[a.user_id]).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn empty_user_list_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app.register_absences(&admin.token, "2024-01-10", &[]).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn admin_can_list_a_merchants_absences() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        app.register_absences(&admin.token, "2024-01-10", &[a.user_id])
            .await;
        app.register_absences(&admin.token, "2024-01-17", &[a.user_id])
            .await;

        let res = app.get(&routes::user_absences(a.user_id), &admin.token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let dates: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, ["2024-01-17", "2024-01-10"]);

        let mine = app.get(routes::MY_ABSENCES, &a.token).await;
        assert_eq!(mine.body.as_array().unwrap().len(), 2);
    }
}

mod notifying {
    use super::*;

    #[tokio::test]
    async fn deleted_account_cannot_notify() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let deleted = app.delete(&routes::user(a.user_id), &admin.token).await;
        assert_eq!(deleted.status, 204);

        let res = app
            .post(
                routes::NOTIFY_ABSENCE,
                &json!({"date": "2024-02-03", "reason": "Harvest delayed"}),
                &a.token,
            )
            .await;

        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn merchant_notifies_with_a_reason() {
        let app = TestApp::spawn().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .post(
                routes::NOTIFY_ABSENCE,
                &json!({"date": "2024-02-03", "reason": "Harvest delayed"}),
                &a.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["type"], "NOTIFIED");
        assert_eq!(res.body["standing"], "PENDING_REVIEW");
        assert_eq!(res.body["justification"]["description"], "Harvest delayed");
        assert!(res.body["justification"]["isApproved"].is_null());
    }

    #[tokio::test]
    async fn notifying_twice_for_the_same_date_conflicts() {
        let app = TestApp::spawn().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let body = json!({"date": "2024-02-03", "reason": "Sick"});

        let first = app.post(routes::NOTIFY_ABSENCE, &body, &a.token).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app.post(routes::NOTIFY_ABSENCE, &body, &a.token).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

mod justifying {
    use super::*;

    async fn absence_for(app: &TestApp, admin_token: &str, user_id: Uuid) -> Uuid {
        let res = app
            .register_absences(admin_token, "2024-01-10", &[user_id])
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        TestResponse::uuid_of(&res.body[0]["id"])
    }

    #[tokio::test]
    async fn owner_can_justify_with_an_annex() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;

        let res = justify(
            &app,
            absence_id,
            "Medical appointment",
            Some(FilePart {
                field: "file",
                file_name: "atestado.pdf",
                mime: "application/pdf",
                bytes: b"%PDF-1.4 certificate".to_vec(),
            }),
            &a.token,
        )
        .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["hasAnnex"], true);
        assert_eq!(res.body["annexFilename"], "atestado.pdf");
        let justification_id = res.id();

        let annex = app.get(&routes::annex(justification_id), &a.token).await;
        assert_eq!(annex.status, 200);
        assert_eq!(annex.bytes, b"%PDF-1.4 certificate");
        assert!(
            annex
                .header("content-disposition")
                .unwrap()
                .starts_with("attachment;")
        );

        let by_admin = app.get(&routes::annex(justification_id), &admin.token).await;
        assert_eq!(by_admin.status, 200);
    }

    #[tokio::test]
    async fn someone_elses_absence_is_forbidden() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let b = app.active_merchant("b@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;

        let res = justify(&app, absence_id, "Not mine", None, &b.token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn unknown_absence_is_not_found() {
        let app = TestApp::spawn().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let res = justify(&app, Uuid::now_v7(), "Ghost", None, &a.token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn blank_description_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;

        let res = justify(&app, absence_id, "   ", None, &a.token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_annex_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;

        let res = justify(
            &app,
            absence_id,
            "Too big",
            Some(FilePart {
                field: "file",
                file_name: "scan.pdf",
                mime: "application/pdf",
                bytes: vec![0u8; MAX_UPLOAD as usize + 1],
            }),
            &a.token,
        )
        .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn resubmitting_while_pending_replaces_the_text() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;

        let first = justify(&app, absence_id, "First draft", None, &a.token).await;
        let second = justify(&app, absence_id, "Final text", None, &a.token).await;

        assert_eq!(second.status, 201, "{}", second.text);
        assert_eq!(second.id(), first.id());
        assert_eq!(second.body["description"], "Final text");
    }

    #[tokio::test]
    async fn reviewed_justification_is_immutable() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let absence_id = absence_for(&app, &admin.token, a.user_id).await;
        let submitted = justify(&app, absence_id, "Flat tyre", None, &a.token).await;
        let review = app
            .put(
                &routes::review(submitted.id()),
                &json!({"isApproved": false}),
                &admin.token,
            )
            .await;
        assert_eq!(review.status, 200, "{}", review.text);

        let res = justify(&app, absence_id, "Second try", None, &a.token).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

mod reviewing {
    use super::*;

    async fn pending_justification(app: &TestApp, admin_token: &str, merchant: &Session) -> Uuid {
        let absences = app
            .register_absences(admin_token, "2024-01-10", &[merchant.user_id])
            .await;
        let absence_id = TestResponse::uuid_of(&absences.body[0]["id"]);
        justify(app, absence_id, "Family emergency", None, &merchant.token)
            .await
            .id()
    }

    #[tokio::test]
    async fn approval_marks_the_absence_accepted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let justification_id =
            pending_justification(&app, &admin.token, &a).await;

        let pending = app.get(routes::PENDING_JUSTIFICATIONS, &admin.token).await;
        assert_eq!(pending.body.as_array().unwrap().len(), 1);

        let res = app
            .put(
                &routes::review(justification_id),
                &json!({"isApproved": true}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["isAccepted"], true);
        assert_eq!(res.body["standing"], "ACCEPTED");
        assert_eq!(res.body["justification"]["isApproved"], true);
        assert_eq!(
            TestResponse::uuid_of(&res.body["justification"]["approvedByAdminId"]),
            admin.user_id
        );

        let pending = app.get(routes::PENDING_JUSTIFICATIONS, &admin.token).await;
        assert!(pending.body.as_array().unwrap().is_empty());

        let notes = app.get(routes::NOTIFICATIONS, &a.token).await;
        assert_eq!(notes.body[0]["type"], "ABSENCE");
    }

    #[tokio::test]
    async fn rejection_stays_distinguishable_from_pending() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let justification_id =
            pending_justification(&app, &admin.token, &a).await;

        let res = app
            .put(
                &routes::review(justification_id),
                &json!({"isApproved": false, "reason": "No proof"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["isAccepted"], false);
        assert_eq!(res.body["standing"], "REJECTED");
        assert_eq!(res.body["justification"]["isApproved"], false);
        assert_eq!(res.body["justification"]["reviewReason"], "No proof");
    }

    #[tokio::test]
    async fn repeating_a_decision_is_idempotent_but_flipping_it_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let justification_id =
            pending_justification(&app, &admin.token, &a).await;
        let path = routes::review(justification_id);

        let first = app.put(&path, &json!({"isApproved": true}), &admin.token).await;
        assert_eq!(first.status, 200, "{}", first.text);

        let same = app.put(&path, &json!({"isApproved": true}), &admin.token).await;
        assert_eq!(same.status, 200, "{}", same.text);

        let flip = app.put(&path, &json!({"isApproved": false}), &admin.token).await;
        assert_eq!(flip.status, 409);
        assert_eq!(flip.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn merchants_cannot_review() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        let justification_id =
            pending_justification(&app, &admin.token, &a).await;

        let res = app
            .put(
                &routes::review(justification_id),
                &json!({"isApproved": true}),
                &a.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod summary {
    use super::*;

    #[tokio::test]
    async fn empty_history_is_compliant() {
        let app = TestApp::spawn().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let res = app.get(routes::SUMMARY, &a.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["totalAbsences"], 0);
        assert_eq!(res.body["consecutiveAbsences"], 0);
        assert_eq!(res.body["isCompliant"], true);
    }

    #[tokio::test]
    async fn three_weekly_absences_break_compliance() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        for days in [21, 14, 7] {
            let res = app
                .register_absences(&admin.token, &days_ago(days), &[a.user_id])
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app.get(routes::SUMMARY, &a.token).await;

        assert_eq!(res.body["totalAbsences"], 3);
        assert_eq!(res.body["unjustifiedAbsences"], 3);
        assert_eq!(res.body["consecutiveAbsences"], 3);
        assert_eq!(res.body["isCompliant"], false);
    }

    #[tokio::test]
    async fn accepted_and_pending_justifications_are_counted_apart() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;

        let accepted = app
            .post(
                routes::NOTIFY_ABSENCE,
                &json!({"date": days_ago(40), "reason": "Doctor"}),
                &a.token,
            )
            .await;
        let justification_id = TestResponse::uuid_of(&accepted.body["justification"]["id"]);
        app.put(
            &routes::review(justification_id),
            &json!({"isApproved": true}),
            &admin.token,
        )
        .await;
        app.post(
            routes::NOTIFY_ABSENCE,
            &json!({"date": days_ago(10), "reason": "Rain"}),
            &a.token,
        )
        .await;
        app.register_absences(&admin.token, &days_ago(3), &[a.user_id])
            .await;

        let res = app.get(routes::SUMMARY, &a.token).await;

        assert_eq!(res.body["totalAbsences"], 3);
        assert_eq!(res.body["justifiedAbsences"], 1);
        assert_eq!(res.body["pendingJustifications"], 1);
        assert_eq!(res.body["unjustifiedAbsences"], 1);
        assert_eq!(res.body["consecutiveAbsences"], 2);
        assert_eq!(res.body["isCompliant"], true);
    }

    #[tokio::test]
    async fn old_absences_count_without_a_window() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        app.register_absences(&admin.token, &days_ago(400), &[a.user_id])
            .await;

        let res = app.get(routes::SUMMARY, &a.token).await;

        assert_eq!(res.body["totalAbsences"], 1);
        assert_eq!(res.body["unjustifiedAbsences"], 1);
    }

    #[tokio::test]
    async fn absences_outside_a_configured_window_are_ignored() {
        let app = TestApp::spawn_with_attendance(AttendanceConfig {
            summary_window_days: Some(365),
            ..AttendanceConfig::default()
        })
        .await;
        let admin = app.admin().await;
        let a = app.active_merchant("a@vilaagro.test").await;
        app.register_absences(&admin.token, &days_ago(400), &[a.user_id])
            .await;
        app.register_absences(&admin.token, &days_ago(30), &[a.user_id])
            .await;

        let res = app.get(routes::SUMMARY, &a.token).await;

        assert_eq!(res.body["totalAbsences"], 1);
    }

    #[tokio::test]
    async fn admins_are_never_recorded_absent() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let other = app
            .insert_user("ops@vilaagro.test", UserType::Admin, AccountStatus::Active)
            .await;

        let res = app
            .register_absences(&admin.token, &days_ago(1), &[other])
            .await;

        assert!(res.body.as_array().unwrap().is_empty());
    }
}
