//! # Registrar (user registration and login)
//!
//! `registrar` is a small HTTP API that registers users and checks their
//! credentials. Records live in an in-process credential store for the lifetime
//! of the process; nothing is persisted.
//!
//! ## Endpoints
//!
//! - `GET /` returns a fixed welcome message.
//! - `POST /register` validates `{username, email, type, password}`, hashes the
//!   password with a fresh salt (Argon2id) and stores `{email, role, salt, hash}`.
//! - `POST /login` looks up the record whose email equals the supplied `username`
//!   and verifies the password against the stored hash.
//! - `GET /health` reports name, version and build commit.
//!
//! ## Credentials
//!
//! Login failures never reveal whether the account exists: an unknown email and a
//! wrong password both return `401` with the same message. Registration is an
//! atomic insert-if-absent, so two concurrent registrations of the same email
//! cannot both succeed.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
