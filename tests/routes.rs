use actix_identity::{Identity, IdentityMiddleware};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, test, web};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, Level};
use onetwenty_crm::auth::token::{claims_for, encode_token};
use onetwenty_crm::domain::auth::AuthenticatedUser;
use onetwenty_crm::domain::tenant::{NewTenant, NewTenantAdmin};
use onetwenty_crm::domain::types::{EmailAddress, TenantName, UserName};
use onetwenty_crm::domain::user::Role;
use onetwenty_crm::models::config::{IntegrationsConfig, ServerConfig, SmtpConfig};
use onetwenty_crm::repository::{DieselRepository, TenantWriter, UserReader, UserWriter};
use onetwenty_crm::routes::alert_level_to_str;
use onetwenty_crm::routes::team::change_role;
use tera::{Context, Tera};

mod common;

const SECRET: &str = "routes-test-secret-routes-test-secret-routes-test-secret-routes-test";

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 8080,
        database_url: ":memory:".to_string(),
        templates_dir: "templates/**/*".to_string(),
        secret: SECRET.to_string(),
        totp_issuer: "1twenty".to_string(),
        bcrypt_cost: 4,
        session_ttl_hours: 1,
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 25,
            username: String::new(),
            password: String::new(),
            from_email: "crm@example.com".to_string(),
            from_name: "CRM".to_string(),
            starttls: false,
        },
        integrations: IntegrationsConfig {
            amplemarket_base_url: "http://localhost".to_string(),
            google_calendar_base_url: "http://localhost".to_string(),
            hunter_base_url: "http://localhost".to_string(),
        },
    }
}

fn templates() -> Tera {
    Tera::new("templates/**/*").expect("templates parse")
}

fn signed_in_context(roles: &[&str]) -> Context {
    let user = AuthenticatedUser {
        sub: "1".to_string(),
        email: "ada@engines.example".to_string(),
        name: "Ada".to_string(),
        tenant_id: 10,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
    };
    let mut context = Context::new();
    context.insert("alerts", &vec![("Saved.".to_string(), "success")]);
    context.insert("current_user", &user);
    context.insert("current_page", "na");
    context
}

#[std::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[std::prelude::v1::test]
fn test_signin_page_renders_without_a_user() {
    let mut context = Context::new();
    context.insert("alerts", &Vec::<(String, &str)>::new());

    let html = templates().render("auth/signin.html", &context).unwrap();
    assert!(html.contains("action=\"/auth/signin\""));
}

#[std::prelude::v1::test]
fn test_admin_links_follow_role() {
    let tera = templates();

    let admin = tera
        .render("main/not_assigned.html", &signed_in_context(&["crm", "crm_admin"]))
        .unwrap();
    assert!(admin.contains("href=\"/sync\""));
    assert!(admin.contains("alert-success"));

    let member = tera
        .render("main/not_assigned.html", &signed_in_context(&["crm", "crm_member"]))
        .unwrap();
    assert!(!member.contains("href=\"/sync\""));
    assert!(member.contains("href=\"/settings/security\""));
}

#[actix_web::test]
async fn test_demoted_admin_is_refused_in_open_session() {
    let test_db = common::TestDb::new("test_demoted_admin_is_refused_in_open_session.db");
    let repo = DieselRepository::new(test_db.pool());
    let (tenant, admin) = repo
        .create_tenant_with_admin(
            &NewTenant::new(TenantName::new("Acme").unwrap()).unwrap(),
            &NewTenantAdmin {
                email: EmailAddress::new("admin@acme.com").unwrap(),
                name: UserName::new("Admin").unwrap(),
                password_hash: "hash".to_string(),
            },
        )
        .unwrap();

    let token = encode_token(&claims_for(&admin, 1), SECRET).unwrap();
    let key = Key::from(SECRET.as_bytes());
    let app = test::init_service(
        App::new()
            .wrap(
                FlashMessagesFramework::builder(CookieMessageStore::builder(key.clone()).build())
                    .build(),
            )
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config()))
            .route(
                "/signin-as-admin",
                web::get().to(move |req: HttpRequest| {
                    let token = token.clone();
                    async move {
                        match Identity::login(&req.extensions(), token) {
                            Ok(_) => HttpResponse::Ok().finish(),
                            Err(_) => HttpResponse::InternalServerError().finish(),
                        }
                    }
                }),
            )
            .service(change_role),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/signin-as-admin").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "id")
        .expect("session cookie")
        .into_owned();

    repo.update_user_role(admin.id, tenant.id, Role::Member)
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/team/role")
        .cookie(session)
        .set_form([("user_id", admin.id.get().to_string()), ("role", "admin".to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/na");
    let stored = repo.get_user_by_id(admin.id).unwrap().unwrap();
    assert_eq!(stored.role, Role::Member);
}
