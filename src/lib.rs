//! Biz365 onboarding: first-launch company setup wizard.

pub mod cli;
pub mod config;
pub mod error;
pub mod onboarding;
