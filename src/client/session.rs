// src/client/session.rs

use serde::{Deserialize, Serialize};

use crate::models::{PublicUser, Role};

/// Body returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  pub user: PublicUser,
}

/// The signed-in identity of one client: a bearer token and the profile it belongs to.
#[derive(Debug, Clone, Default)]
pub struct Session {
  token: Option<String>,
  user: Option<PublicUser>,
}

impl Session {
  pub fn new() -> Self {
    Self::default()
  }

  /// Resumes a session from a previously stored token; the profile is fetched later.
  pub fn with_token(token: impl Into<String>) -> Self {
    Self {
      token: Some(token.into()),
      user: None,
    }
  }

  pub fn establish(&mut self, auth: AuthResponse) {
    self.token = Some(auth.token);
    self.user = Some(auth.user);
  }

  pub fn set_user(&mut self, user: PublicUser) {
    self.user = Some(user);
  }

  pub fn logout(&mut self) {
    self.token = None;
    self.user = None;
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn user(&self) -> Option<&PublicUser> {
    self.user.as_ref()
  }

  pub fn is_authenticated(&self) -> bool {
    self.token.is_some()
  }

  pub fn is_admin(&self) -> bool {
    self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn establish_and_logout() {
    let mut session = Session::new();
    assert!(!session.is_authenticated());

    session.establish(AuthResponse {
      token: "t0k3n".into(),
      user: PublicUser {
        id: Uuid::new_v4(),
        name: "Admin".into(),
        email: "admin@quickglow.local".into(),
        role: Role::Admin,
      },
    });
    assert_eq!(session.token(), Some("t0k3n"));
    assert!(session.is_admin());

    session.logout();
    assert!(session.token().is_none());
    assert!(session.user().is_none());
    assert!(!session.is_admin());
  }

  #[test]
  fn resumed_session_is_not_admin_until_profile_loads() {
    let session = Session::with_token("abc");
    assert!(session.is_authenticated());
    assert!(!session.is_admin());
  }
}
