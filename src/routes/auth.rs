use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::auth::token::{claims_for, encode_token};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::forms::auth::{DisableTotpForm, SignInForm, SignUpForm, TotpCodeForm, TwoFactorForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    action_error, anonymous_context, base_context, page_error, redirect, render_template,
};
use crate::services::auth::{self as auth_service, SignInOutcome};
use crate::services::ServiceError;

/// Session key holding the user that passed the password check but not 2FA yet.
const PENDING_USER_KEY: &str = "pending_user_id";

const SECURITY_PAGE: &str = "/settings/security";

/// Stores the signed session token in the identity cookie.
fn establish_session(req: &HttpRequest, user: &User, config: &ServerConfig) -> HttpResponse {
    let claims = claims_for(user, config.session_ttl_hours);
    let token = match encode_token(&claims, &config.secret) {
        Ok(token) => token,
        Err(err) => {
            log::error!("Failed to sign session token: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(err) = Identity::login(&req.extensions(), token) {
        log::error!("Failed to start session for user {}: {err}", user.id);
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("User {} signed in", user.id);
    redirect("/")
}

#[get("/auth/signin")]
pub async fn signin_page(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_template(&tera, "auth/signin.html", &anonymous_context(&flash_messages))
}

#[post("/auth/signin")]
pub async fn signin(
    req: HttpRequest,
    session: Session,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<SignInForm>,
) -> impl Responder {
    match auth_service::sign_in(repo.get_ref(), form) {
        Ok(SignInOutcome::Authenticated(user)) => establish_session(&req, &user, &server_config),
        Ok(SignInOutcome::TwoFactorRequired(user_id)) => {
            if let Err(err) = session.insert(PENDING_USER_KEY, user_id.get()) {
                log::error!("Failed to store pending sign-in: {err}");
                return HttpResponse::InternalServerError().finish();
            }
            redirect("/auth/2fa")
        }
        Err(err) => action_error(err, "/auth/signin", "sign in"),
    }
}

#[get("/auth/2fa")]
pub async fn two_factor_page(
    session: Session,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match session.get::<i32>(PENDING_USER_KEY) {
        Ok(Some(_)) => render_template(
            &tera,
            "auth/two_factor.html",
            &anonymous_context(&flash_messages),
        ),
        _ => redirect("/auth/signin"),
    }
}

#[post("/auth/2fa")]
pub async fn two_factor(
    req: HttpRequest,
    session: Session,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<TwoFactorForm>,
) -> impl Responder {
    let pending = match session.get::<i32>(PENDING_USER_KEY) {
        Ok(Some(id)) => UserId::new(id),
        _ => return redirect("/auth/signin"),
    };
    let Ok(user_id) = pending else {
        session.remove(PENDING_USER_KEY);
        return redirect("/auth/signin");
    };

    match auth_service::complete_two_factor(repo.get_ref(), user_id, form, Utc::now()) {
        Ok(user) => {
            session.remove(PENDING_USER_KEY);
            establish_session(&req, &user, &server_config)
        }
        Err(ServiceError::Unauthorized) => {
            session.remove(PENDING_USER_KEY);
            redirect("/auth/signin")
        }
        Err(err) => action_error(err, "/auth/2fa", "verify the code"),
    }
}

#[get("/auth/signup")]
pub async fn signup_page(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_template(&tera, "auth/signup.html", &anonymous_context(&flash_messages))
}

#[post("/auth/signup")]
pub async fn signup(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<SignUpForm>,
) -> impl Responder {
    match auth_service::sign_up(repo.get_ref(), form, server_config.bcrypt_cost) {
        Ok(user) => {
            FlashMessage::success("Welcome! Your workspace is ready.").send();
            establish_session(&req, &user, &server_config)
        }
        Err(err) => action_error(err, "/auth/signup", "create the account"),
    }
}

#[get("/settings/security")]
pub async fn security_page(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match auth_service::load_security_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("totp_enabled", &data.totp_enabled);
            context.insert("backup_codes_left", &data.backup_codes_left);
            render_template(&tera, "settings/security.html", &context)
        }
        Err(err) => page_error(err, "/", "security settings"),
    }
}

#[post("/settings/security/totp/setup")]
pub async fn begin_totp_setup(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match auth_service::begin_totp_setup(repo.get_ref(), &user, &server_config.totp_issuer) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("secret", &data.secret);
            context.insert("otpauth_url", &data.otpauth_url);
            context.insert("qr_svg", &data.qr_svg);
            render_template(&tera, "settings/totp_setup.html", &context)
        }
        Err(err) => action_error(err, SECURITY_PAGE, "start two-factor setup"),
    }
}

fn backup_codes_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    codes: &[String],
) -> HttpResponse {
    let mut context = base_context(flash_messages, user, "settings");
    context.insert("codes", codes);
    render_template(tera, "settings/backup_codes.html", &context)
}

#[post("/settings/security/totp/confirm")]
pub async fn confirm_totp_setup(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<TotpCodeForm>,
) -> impl Responder {
    match auth_service::confirm_totp_setup(
        repo.get_ref(),
        &user,
        form,
        Utc::now(),
        server_config.bcrypt_cost,
    ) {
        Ok(data) => {
            FlashMessage::success("Two-factor authentication is on.").send();
            backup_codes_page(&tera, &flash_messages, &user, &data.codes)
        }
        Err(err) => action_error(err, SECURITY_PAGE, "enable two-factor authentication"),
    }
}

#[post("/settings/security/backup-codes")]
pub async fn regenerate_backup_codes(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<TotpCodeForm>,
) -> impl Responder {
    match auth_service::regenerate_backup_codes(
        repo.get_ref(),
        &user,
        form,
        Utc::now(),
        server_config.bcrypt_cost,
    ) {
        Ok(data) => backup_codes_page(&tera, &flash_messages, &user, &data.codes),
        Err(err) => action_error(err, SECURITY_PAGE, "regenerate backup codes"),
    }
}

#[post("/settings/security/totp/disable")]
pub async fn disable_totp(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<DisableTotpForm>,
) -> impl Responder {
    match auth_service::disable_totp(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Two-factor authentication is off.").send();
            redirect(SECURITY_PAGE)
        }
        Err(err) => action_error(err, SECURITY_PAGE, "disable two-factor authentication"),
    }
}
