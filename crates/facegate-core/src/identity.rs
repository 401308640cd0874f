//! The identity backend that turns a login identifier into a one-time login
//! artifact.

use std::future::Future;

use crate::session::LoginArtifact;

pub trait LoginLinkIssuer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Request a single-use, time-boxed login link for `login_identifier`.
  /// This is the only call that grants authorization.
  fn issue_login_link<'a>(
    &'a self,
    login_identifier: &'a str,
  ) -> impl Future<Output = Result<LoginArtifact, Self::Error>> + Send + 'a;
}
