use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::service::NewAccount;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received signup request for username: {}", req.username);

    if req.name.is_empty()
        || req.username.is_empty()
        || req.email.is_empty()
        || req.password.is_empty()
    {
        return Err(AppError::ValidationError(
            "name, username, email and password must not be empty".into(),
        ));
    }

    let account = NewAccount {
        name: req.name,
        username: req.username.clone(),
        email: req.email,
        password: req.password,
        verified: req.verified,
        roles: req.roles,
    };

    match state.auth_service.signup(account).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse {
            message: "Verification code has been sent to your email address. \
                      Please click it to register successfully."
                .to_string(),
        })),
        Err(e) => {
            error!("Signup failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn signin(
    req: web::Json<SigninRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received signin request for username: {}", req.username);
    match state.auth_service.signin(&req.username, &req.password).await {
        Ok(session) => Ok(HttpResponse::Ok().json(SessionResponse {
            token: session.token,
            username: session.username,
        })),
        Err(e) => {
            error!("Signin failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn confirm_account(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();
    match state.auth_service.confirm_account(&token).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse {
            message: "User registered successfully!".to_string(),
        })),
        Err(e) => {
            error!("Account confirmation failed: {}", e);
            Err(e)
        }
    }
}
