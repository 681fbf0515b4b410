//! ログイン / セッション管理モジュール

mod authenticator;
mod cookies;

pub use authenticator::{
    find_login_failure, has_captcha, AuthState, Credentials, SessionAuthenticator, LOGIN_PATH,
};
pub use cookies::SessionCookies;
