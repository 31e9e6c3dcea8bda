//! Route protection as a pure function of the session snapshot.

use crate::models::Role;
use crate::session::AuthSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    /// Not signed in, or signed in with a role the front end does not know.
    RedirectToSignin { next: Option<String> },
    /// Signed in, but this route belongs to another role.
    RedirectToHome(Role),
}

impl GateDecision {
    /// Where to send the browser, `None` for [`GateDecision::Render`].
    pub fn location(&self) -> Option<String> {
        match self {
            GateDecision::Render => None,
            GateDecision::RedirectToSignin { next } => Some(signin_location(next.as_deref())),
            GateDecision::RedirectToHome(role) => Some(role.home_path().to_string()),
        }
    }
}

/// Decides whether `session` may see `requested_path`, guarded by `allowed`.
///
/// An empty `allowed` list admits any signed-in user with a known role.
pub fn authorize(
    session: Option<&AuthSession>,
    allowed: &[Role],
    requested_path: &str,
) -> GateDecision {
    let Some(session) = session else {
        return GateDecision::RedirectToSignin {
            next: safe_next(Some(requested_path)).map(str::to_string),
        };
    };

    let role = match session.role() {
        Ok(role) => role,
        Err(unknown) => {
            tracing::warn!(user_id = %session.user.id, role = %unknown.0, "Session carries an unknown role");
            return GateDecision::RedirectToSignin { next: None };
        }
    };

    if allowed.is_empty() || allowed.contains(&role) {
        GateDecision::Render
    } else {
        GateDecision::RedirectToHome(role)
    }
}

/// Accepts `next` only when it is a local absolute path.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

pub fn signin_location(next: Option<&str>) -> String {
    match safe_next(next) {
        Some(next) => match serde_urlencoded::to_string([("next", next)]) {
            Ok(query) => format!("/signin?{}", query),
            Err(_) => "/signin".to_string(),
        },
        None => "/signin".to_string(),
    }
}
