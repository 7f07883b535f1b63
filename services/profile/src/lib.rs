//! Profile backend-for-frontend
//!
//! Serves the signed-in user's profile as one flat document built from the
//! token claims, the stored user record and today's generation count, and
//! accepts partial profile updates with inline photo uploads.

pub mod accounts;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;
pub mod usage;
pub mod validation;
