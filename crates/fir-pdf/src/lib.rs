//! PDF handling for the FIR document service
//!
//! This crate provides the two PDF concerns of the service:
//! - `extract`: page-by-page text extraction from uploaded PDFs
//! - `fir`: fixed-template First Information Report layout
//!
//! Drawing goes through a small `canvas` over lopdf content streams,
//! with text measured against the built-in Helvetica metrics.

pub mod canvas;
pub mod error;
pub mod extract;
pub mod fir;
pub mod metrics;

pub use canvas::{Canvas, Font, PageSize};
pub use error::PdfError;
pub use extract::{extract_text_from_mem, extract_text_from_path, extract_upload};
pub use fir::{FirForm, FirLayout, FirRenderer, RenderedFir};
