//! Marketing Assist — guided business-profile dialog with keyword suggestions.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod error;
pub mod faq;
pub mod llm;
pub mod trends;
