use ::common::AccountStatus;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestResponse, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn sale_points_are_listed_publicly_by_name() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_sale_point(&admin.token, "Banca 02").await;
        app.create_sale_point(&admin.token, "Banca 01").await;

        let res = app.get_without_token(routes::SALE_POINTS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Banca 01", "Banca 02"]);
        assert!(res.body[0]["allocatedUser"].is_null());
    }

    #[tokio::test]
    async fn merchants_cannot_create_sale_points() {
        let app = TestApp::spawn().await;
        let merchant = app.active_merchant("a@vilaagro.test").await;

        let res = app
            .post(routes::SALE_POINTS, &json!({"name": "Banca"}), &merchant.token)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn unknown_address_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post(
                routes::SALE_POINTS,
                &json!({"name": "Banca", "addressId": Uuid::now_v7()}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn update_and_delete_a_vacant_sale_point() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let id = app.create_sale_point(&admin.token, "Banca").await;

        let res = app
            .put(&routes::sale_point(id), &json!({"name": "Banca 07"}), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Banca 07");

        let res = app.delete(&routes::sale_point(id), &admin.token).await;
        assert_eq!(res.status, 204);

        let res = app.get_without_token(&routes::sale_point(id)).await;
        assert_eq!(res.status, 404);
    }
}

mod allocation {
    use super::*;

    #[tokio::test]
    async fn allocating_an_approved_merchant_activates_them() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;

        let res = app
            .post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            TestResponse::uuid_of(&res.body["allocatedUser"]["id"]),
            u.user_id
        );

        let me = app.get(routes::ME, &u.token).await;
        assert_eq!(me.body["status"], "ACTIVE");
        assert_eq!(TestResponse::uuid_of(&me.body["salePointId"]), s);

        let notes = app.get(routes::NOTIFICATIONS, &u.token).await;
        assert_eq!(notes.body[0]["type"], "APPROVAL");
    }

    #[tokio::test]
    async fn a_merchant_cannot_hold_two_sale_points() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s1 = app.create_sale_point(&admin.token, "Banca 01").await;
        let s2 = app.create_sale_point(&admin.token, "Banca 02").await;
        let first = app
            .post(&routes::allocate(s1), &json!({"userId": u.user_id}), &admin.token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);

        let res = app
            .post(&routes::allocate(s2), &json!({"userId": u.user_id}), &admin.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn an_occupied_sale_point_cannot_be_reallocated() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let v = app.merchant("v@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app
            .post(&routes::allocate(s), &json!({"userId": v.user_id}), &admin.token)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn pending_merchants_cannot_be_allocated() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Pending).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;

        let res = app
            .post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn deallocation_frees_the_point_and_deactivates_the_merchant() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app.delete(&routes::allocate(s), &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "INACTIVE");
        assert!(res.body["salePointId"].is_null());

        let point = app.get_without_token(&routes::sale_point(s)).await;
        assert!(point.body["allocatedUser"].is_null());

        let again = app.delete(&routes::allocate(s), &admin.token).await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn an_occupied_sale_point_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app.delete(&routes::sale_point(s), &admin.token).await;

        assert_eq!(res.status, 409);
    }
}

mod public_merchants {
    use super::*;

    #[tokio::test]
    async fn only_active_merchants_are_listed_with_their_sale_point() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let u = app.merchant("u@vilaagro.test", AccountStatus::Approved).await;
        let pending = app.merchant("p@vilaagro.test", AccountStatus::Pending).await;
        let s = app.create_sale_point(&admin.token, "Banca 01").await;
        app.post(&routes::allocate(s), &json!({"userId": u.user_id}), &admin.token)
            .await;

        let res = app.get_without_token(routes::PUBLIC_MERCHANTS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(TestResponse::uuid_of(&list[0]["id"]), u.user_id);
        assert_eq!(list[0]["salePointName"], "Banca 01");
        assert!(list[0].get("email").is_none());

        let hidden = app
            .get_without_token(&routes::public_merchant(pending.user_id))
            .await;
        assert_eq!(hidden.status, 404);

        let shown = app.get_without_token(&routes::public_merchant(u.user_id)).await;
        assert_eq!(shown.status, 200, "{}", shown.text);
        assert_eq!(shown.body["salePointName"], "Banca 01");
    }
}

mod addresses {
    use super::*;

    fn address() -> serde_json::Value {
        json!({
            "street": "Rua das Flores",
            "neighborhood": "Centro",
            "number": "120",
            "cep": "29100-000",
            "city": "Vila Velha",
        })
    }

    #[tokio::test]
    async fn admin_crud_with_public_listing() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let created = app.post(routes::ADDRESSES, &address(), &admin.token).await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();

        let list = app.get_without_token(routes::ADDRESSES).await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().unwrap().len(), 1);

        let mut changed = address();
        changed["street"] = json!("Avenida Central");
        let updated = app.put(&routes::address(id), &changed, &admin.token).await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.body["street"], "Avenida Central");

        let deleted = app.delete(&routes::address(id), &admin.token).await;
        assert_eq!(deleted.status, 204);
        let gone = app.get(&routes::address(id), &admin.token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn malformed_cep_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let mut body = address();
        body["cep"] = json!("2910");

        let res = app.post(routes::ADDRESSES, &body, &admin.token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn sale_point_can_reference_an_address() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let address_id = app.post(routes::ADDRESSES, &address(), &admin.token).await.id();

        let res = app
            .post(
                routes::SALE_POINTS,
                &json!({"name": "Banca", "addressId": address_id}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(TestResponse::uuid_of(&res.body["addressId"]), address_id);
    }
}
