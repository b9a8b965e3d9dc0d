use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::dashboard_href;
use super::users::USER_TYPES;
use crate::error::{AppError, ClientError};
use crate::models::CreateUserRequest;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "dashboard/new_user.html")]
struct NewUserTemplate {
    form: NewUserForm,
    user_types: Vec<&'static str>,
    error: Option<String>,
    back_href: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Checkbox: present when ticked.
    pub is_active: Option<String>,
}

impl NewUserForm {
    fn to_request(&self) -> CreateUserRequest {
        CreateUserRequest {
            user_type: self.user_type.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            avatar_url: self.avatar_url.trim().to_string(),
            is_active: self.is_active.is_some(),
        }
    }

    /// Entered values to show again, minus the passwords.
    fn redisplay(self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self
        }
    }
}

fn render_form(state: &SharedState, form: NewUserForm, error: Option<String>) -> Html<String> {
    let template = NewUserTemplate {
        form,
        user_types: USER_TYPES.to_vec(),
        error,
        back_href: dashboard_href(&state.store.api_params().to_query()),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn new_user_page(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    if !state.store.api().is_authenticated() {
        return Err(AppError::Unauthorized("Please login first".to_string()));
    }
    let form = NewUserForm {
        is_active: Some("on".to_string()),
        ..NewUserForm::default()
    };
    Ok(render_form(&state, form, None))
}

pub async fn create_user_submit(
    State(state): State<SharedState>,
    Form(form): Form<NewUserForm>,
) -> Result<Response, AppError> {
    let request = form.to_request();

    // Local checks stay in the form and never reach the store.
    if let Err(msg) = request.validate() {
        let err = ClientError::Validation(msg);
        let page = render_form(&state, form.redisplay(), Some(err.to_string()));
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match state.store.create_user(&request).await {
        Ok(_) => {
            let back = dashboard_href(&state.store.api_params().to_query());
            Ok(Redirect::to(&back).into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            let page = render_form(&state, form.redisplay(), Some(e.to_string()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}
