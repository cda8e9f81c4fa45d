use std::sync::Arc;

use chrono::Duration;

use atelier_domain::access::Scope;
use atelier_domain::id::UserId;
use atelier_domain::user::Role;

use crate::domain::repository::{Mailer, TokenRepository, UserRepository};
use crate::domain::types::{IssuedToken, MailTemplate, NewUser, OutgoingMail, User};
use crate::error::StoreServiceError;
use crate::usecase::authenticate::Authenticator;
use crate::usecase::credential;
use crate::usecase::token::TokenIssuer;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUserUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub issuer: TokenIssuer<T>,
    pub mailer: Arc<dyn Mailer>,
    pub initial_balance: i64,
    pub activation_ttl: Duration,
}

impl<U: UserRepository, T: TokenRepository> RegisterUserUseCase<U, T> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, StoreServiceError> {
        credential::check_new_password(&input.password)?;
        let credential = credential::set(&input.password).await?;

        let user = self
            .users
            .create(&NewUser {
                name: input.name,
                email: normalize_email(&input.email),
                credential,
                balance: self.initial_balance,
                role: Role::User,
            })
            .await?;

        let token = self
            .issuer
            .issue(user.id, Scope::Activation, self.activation_ttl)
            .await?;
        self.mailer.enqueue(OutgoingMail {
            to: user.email.clone(),
            template: MailTemplate::Welcome,
            user_id: user.id,
            token: token.plaintext,
        });

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── ActivateUser ─────────────────────────────────────────────────────────────

pub struct ActivateUserUseCase<U: UserRepository, T: TokenRepository> {
    pub authenticator: Authenticator<T, U>,
    pub users: U,
    pub issuer: TokenIssuer<T>,
}

impl<U: UserRepository, T: TokenRepository> ActivateUserUseCase<U, T> {
    pub async fn execute(&self, token: &str) -> Result<User, StoreServiceError> {
        let mut user = self
            .authenticator
            .authenticate(token, Scope::Activation)
            .await?;
        self.users.activate(user.id).await?;
        self.issuer.revoke_all(user.id, Scope::Activation).await?;
        user.activated = true;
        tracing::info!(user_id = %user.id, "user activated");
        Ok(user)
    }
}

// ── RequestActivationToken ───────────────────────────────────────────────────

pub struct RequestActivationTokenUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub issuer: TokenIssuer<T>,
    pub mailer: Arc<dyn Mailer>,
    pub activation_ttl: Duration,
}

impl<U: UserRepository, T: TokenRepository> RequestActivationTokenUseCase<U, T> {
    /// Mail a new activation token. Already-active accounts get nothing.
    pub async fn execute(&self, email: &str) -> Result<(), StoreServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(StoreServiceError::UserNotFound)?;
        if user.activated {
            return Ok(());
        }
        let token = self
            .issuer
            .issue(user.id, Scope::Activation, self.activation_ttl)
            .await?;
        self.mailer.enqueue(OutgoingMail {
            to: user.email,
            template: MailTemplate::Activation,
            user_id: user.id,
            token: token.plaintext,
        });
        Ok(())
    }
}

// ── Login / Logout ───────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub issuer: TokenIssuer<T>,
    pub auth_ttl: Duration,
}

impl<U: UserRepository, T: TokenRepository> LoginUseCase<U, T> {
    /// Unknown email and wrong password are the same error.
    pub async fn execute(&self, input: LoginInput) -> Result<IssuedToken, StoreServiceError> {
        let Some(user) = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
        else {
            // Unknown accounts cost one verification too.
            credential::verify_decoy(&input.password).await?;
            return Err(StoreServiceError::InvalidCredentials);
        };

        if !credential::matches(&user.credential, &input.password).await? {
            return Err(StoreServiceError::InvalidCredentials);
        }

        self.issuer
            .issue(user.id, Scope::Authentication, self.auth_ttl)
            .await
    }
}

pub struct LogoutUseCase<T: TokenRepository> {
    pub issuer: TokenIssuer<T>,
}

impl<T: TokenRepository> LogoutUseCase<T> {
    /// Revokes every authentication token of the user, not only the presented one.
    pub async fn execute(&self, user_id: UserId) -> Result<(), StoreServiceError> {
        self.issuer.revoke_all(user_id, Scope::Authentication).await
    }
}

// ── Password reset ───────────────────────────────────────────────────────────

pub struct RequestPasswordResetUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub issuer: TokenIssuer<T>,
    pub mailer: Arc<dyn Mailer>,
    pub reset_ttl: Duration,
}

impl<U: UserRepository, T: TokenRepository> RequestPasswordResetUseCase<U, T> {
    pub async fn execute(&self, email: &str) -> Result<(), StoreServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(StoreServiceError::UserNotFound)?;
        if !user.activated {
            return Err(StoreServiceError::InactiveAccount);
        }
        let token = self
            .issuer
            .issue(user.id, Scope::PasswordReset, self.reset_ttl)
            .await?;
        self.mailer.enqueue(OutgoingMail {
            to: user.email,
            template: MailTemplate::PasswordReset,
            user_id: user.id,
            token: token.plaintext,
        });
        Ok(())
    }
}

pub struct ResetPasswordInput {
    pub token: String,
    pub password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository, T: TokenRepository> {
    pub authenticator: Authenticator<T, U>,
    pub users: U,
}

impl<U: UserRepository, T: TokenRepository> ResetPasswordUseCase<U, T> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), StoreServiceError> {
        credential::check_new_password(&input.password)?;
        let user = self
            .authenticator
            .authenticate(&input.token, Scope::PasswordReset)
            .await?;

        let credential = credential::set(&input.password).await?;
        self.users.reset_credential(user.id, &credential).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, user_id: UserId) -> Result<(), StoreServiceError> {
        if !self.users.delete(user_id).await? {
            return Err(StoreServiceError::UserNotFound);
        }
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}
