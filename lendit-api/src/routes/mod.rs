/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `contracts`: Contract lifecycle endpoints
/// - `items`: Item listing endpoints
/// - `users`: User lookup endpoints
/// - `roles`: Role management endpoints

pub mod auth;
pub mod contracts;
pub mod health;
pub mod items;
pub mod roles;
pub mod users;
