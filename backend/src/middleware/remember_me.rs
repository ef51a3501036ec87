//! Persistent login cookies.
//!
//! Sessions are browser-session cookies unless the user ticks "remember me".
//! The login handler then tags its response with [`RememberLogin`]; this
//! middleware stamps the session cookie with `Max-Age` and sets a
//! `remember_me` marker cookie so later rewrites of the session cookie keep
//! the same lifetime. [`ForgetLogin`] (logout, or a login without the box
//! ticked) clears the marker.
//!
//! Wrap it outside the session middleware so it sees the session cookie.

use std::task::{Context, Poll};

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderValue, SET_COOKIE};
use actix_web::{Error, HttpMessage};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

/// Name of the marker cookie recording that the user asked to be remembered.
pub const REMEMBER_COOKIE_NAME: &str = "remember_me";

/// Response extension: keep this login across browser restarts.
#[derive(Debug, Clone, Copy)]
pub struct RememberLogin;

/// Response extension: drop any earlier remember request.
#[derive(Debug, Clone, Copy)]
pub struct ForgetLogin;

/// Middleware factory extending remembered sessions.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use actix_web::cookie::time::Duration;
/// use medlink::middleware::RememberMe;
///
/// let app = App::new().wrap(RememberMe::new("session", Duration::days(30)));
/// ```
#[derive(Clone, Debug)]
pub struct RememberMe {
    session_cookie: &'static str,
    duration: Duration,
    secure: bool,
    same_site: SameSite,
}

impl RememberMe {
    /// Remember sessions stored in `session_cookie` for `duration`.
    pub fn new(session_cookie: &'static str, duration: Duration) -> Self {
        Self {
            session_cookie,
            duration,
            secure: true,
            same_site: SameSite::Lax,
        }
    }

    /// Match the marker cookie's attributes to the session cookie.
    #[must_use]
    pub fn with_cookie_attributes(mut self, secure: bool, same_site: SameSite) -> Self {
        self.secure = secure;
        self.same_site = same_site;
        self
    }

    fn marker(&self) -> Cookie<'static> {
        Cookie::build(REMEMBER_COOKIE_NAME, "1")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.duration)
            .finish()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RememberMe
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RememberMeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RememberMeMiddleware {
            service,
            config: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RememberMe`].
pub struct RememberMeMiddleware<S> {
    service: S,
    config: RememberMe,
}

/// What the response asked for, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Remember,
    Forget,
    Keep,
}

impl<S, B> Service<ServiceRequest> for RememberMeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let remembered = req.cookie(REMEMBER_COOKIE_NAME).is_some();
        let config = self.config.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let decision = {
                let extensions = res.response().extensions();
                if extensions.get::<RememberLogin>().is_some() {
                    Decision::Remember
                } else if extensions.get::<ForgetLogin>().is_some() {
                    Decision::Forget
                } else {
                    Decision::Keep
                }
            };

            match decision {
                Decision::Remember => {
                    if let Err(error) = res.response_mut().add_cookie(&config.marker()) {
                        warn!(%error, "failed to set remember-me marker");
                    }
                    extend_session_cookie(&mut res, &config);
                }
                Decision::Forget if remembered => {
                    if let Err(error) = res.response_mut().add_removal_cookie(&config.marker()) {
                        warn!(%error, "failed to clear remember-me marker");
                    }
                }
                Decision::Forget => {}
                Decision::Keep if remembered => extend_session_cookie(&mut res, &config),
                Decision::Keep => {}
            }
            Ok(res)
        })
    }
}

/// Give the session cookie a `Max-Age` unless it already has one (a removal
/// cookie carries `Max-Age=0`).
fn extend_session_cookie<B>(res: &mut ServiceResponse<B>, config: &RememberMe) {
    let headers = res.response_mut().headers_mut();
    let values: Vec<HeaderValue> = headers.get_all(SET_COOKIE).cloned().collect();
    if values.is_empty() {
        return;
    }
    headers.remove(SET_COOKIE);
    for value in values {
        headers.append(SET_COOKIE, with_max_age(value, config));
    }
}

fn with_max_age(value: HeaderValue, config: &RememberMe) -> HeaderValue {
    let Ok(raw) = value.to_str() else {
        return value;
    };
    let mut cookie = match Cookie::parse(raw.to_owned()) {
        Ok(cookie) => cookie,
        Err(error) => {
            warn!(%error, "unparseable Set-Cookie header left untouched");
            return value;
        }
    };
    if cookie.name() != config.session_cookie || cookie.max_age().is_some() {
        return value;
    }
    cookie.set_max_age(config.duration);
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(extended) => {
            debug!(max_age = config.duration.whole_seconds(), "session cookie extended");
            extended
        }
        Err(error) => {
            warn!(%error, "failed to encode extended session cookie");
            value
        }
    }
}
